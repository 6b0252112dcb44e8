//! Token validation for the external session/identity provider.

pub mod jwt;
