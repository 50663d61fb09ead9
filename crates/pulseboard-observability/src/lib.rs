//! Pulseboard Observability
//!
//! Structured logging for the client binaries. Logs go to stderr so that
//! dashboard output on stdout stays clean.

pub mod logging;

pub use logging::{LoggingError, build_filter, init, parse_level};
