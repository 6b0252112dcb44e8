//! Domain layer for the renovation-request engine.
//!
//! This crate has no internal dependencies and holds everything the API,
//! repository, and event layers need to agree on: the request status state
//! machine, inspection ledger rules, the resubmission diff generator,
//! role/capability mapping, the channel message protocol, and the shared
//! error taxonomy.

pub mod channel;
pub mod deeplink;
pub mod error;
pub mod inspection;
pub mod lifecycle;
pub mod resubmit;
pub mod roles;
pub mod types;
