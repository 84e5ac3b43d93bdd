//! Domain layer for the Socratic tutor harness
//!
//! This module contains the experiment's data model and the ports through
//! which the services reach the LLM provider, the problem bank and the
//! session store.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
