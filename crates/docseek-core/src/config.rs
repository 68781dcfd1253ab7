//! Environment variable helpers shared by every `from_env()` constructor.
//!
//! Unset or empty variables fall back to the caller's default. Set but
//! unparseable values are configuration errors, not silent defaults.

use std::str::FromStr;

use crate::error::{Error, Result};

/// Read and parse an environment variable.
///
/// Returns `Ok(None)` when the variable is unset or blank.
pub fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("{}={:?}: {}", key, raw, e))),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(Error::Config(format!("{}: {}", key, e))),
    }
}

/// Read an environment variable, falling back to `default` when unset.
pub fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(env_parse(key)?.unwrap_or(default))
}

/// Read a boolean flag. Accepts `1/0`, `true/false`, `yes/no`, `on/off`.
pub fn env_flag(key: &str, default: bool) -> Result<bool> {
    match env_parse::<String>(key)? {
        None => Ok(default),
        Some(v) => parse_flag(&v)
            .ok_or_else(|| Error::Config(format!("{}={:?}: expected a boolean", key, v))),
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a string variable, falling back to `default` when unset or blank.
pub fn env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
