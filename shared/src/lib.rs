//! Shared types and models for the Agri Advisor platform
//!
//! This crate holds the request/response types, validation rules and fixed
//! catalogs used by the backend. It has no I/O of its own.

pub mod catalog;
pub mod models;
pub mod types;
pub mod validation;

pub use catalog::*;
pub use models::*;
pub use types::*;
pub use validation::*;
