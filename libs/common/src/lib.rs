//! Flow Utilities shared library
//!
//! Provides the ambient pieces shared by the binaries:
//! - logging initialisation
//! - configuration loading
//! - basic error type

pub mod config;
pub mod config_loader;
pub mod error;
pub mod logging;

pub use config::{load_config, load_config_from_file, FlowConfig, LoggingConfig};
pub use error::{Error, Result};
