//! Service layer for business logic
//!
//! Shared by the library API and the CLI.

mod link_service;

pub use link_service::*;
