//! Infrastructure layer module
//!
//! Adapters behind the domain ports and process-level concerns:
//! - Claude Messages API gateway
//! - Problem bank files
//! - JSON session store
//! - Configuration management
//! - Logging infrastructure

pub mod claude;
pub mod config;
pub mod dataset;
pub mod logging;
pub mod sessions;
