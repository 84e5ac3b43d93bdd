//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - Pretty or JSON terminal output on stderr
//! - Rolling JSON log files

pub mod logger;

pub use logger::LoggerImpl;
