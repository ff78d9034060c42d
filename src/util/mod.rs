//! Utility modules for patchsmith

pub mod http;
pub mod logging;

pub use http::build_client;
pub use logging::{init_logging, LogFormat, LoggingConfig};
