//! HTTP request handlers, grouped by resource.

pub mod devices;
pub mod inspections;
pub mod messages;
pub mod notification;
pub mod requests;
