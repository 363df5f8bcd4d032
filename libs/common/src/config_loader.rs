//! Configuration loading helper functions
//! Resolve single values outside the figment stack (command-line overrides)

use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, warn};

/// Get configuration value with priority: explicit > ENV > default
///
/// # Arguments
/// * `explicit` - Value given on the command line
/// * `env_var` - Environment variable name to check
/// * `default` - Value to use as fallback, usually from the loaded config
pub fn get_config_value<T>(explicit: Option<T>, env_var: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    // Priority 1: explicit value
    if let Some(val) = explicit {
        debug!("Using {} from command line", env_var);
        return val;
    }

    // Priority 2: Environment variable
    if let Ok(env_str) = std::env::var(env_var) {
        match env_str.parse::<T>() {
            Ok(val) => {
                debug!("Using {} from environment: {}", env_var, env_str);
                return val;
            },
            Err(e) => {
                warn!("Failed to parse {} from environment: {}", env_var, e);
            },
        }
    }

    // Priority 3: Default value
    debug!("Using configured value for {}", env_var);
    default
}

/// Get string configuration value with priority: explicit > ENV > default
///
/// Empty strings count as unset.
pub fn get_string_config(explicit: Option<String>, env_var: &str, default: String) -> String {
    if let Some(val) = explicit {
        if !val.is_empty() {
            debug!("Using {} from command line", env_var);
            return val;
        }
    }

    if let Ok(env_val) = std::env::var(env_var) {
        if !env_val.is_empty() {
            debug!("Using {} from environment", env_var);
            return env_val;
        }
    }

    debug!("Using configured value for {}", env_var);
    default
}
