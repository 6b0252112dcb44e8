//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the operations that create or rewrite rows

pub mod inspection;
pub mod message;
pub mod notification;
pub mod request;
pub mod staff;
