//! Configuration Module
//!
//! Loads cache options from untyped sources: JSON documents and environment
//! variables. Values that are present but not non-negative numbers (or
//! booleans, for flags) are rejected with `CacheError::Configuration`.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{CacheError, Result};

/// Cache options as they appear in external configuration.
///
/// JSON keys follow the conventional option names: `max`, `maxAge`
/// (milliseconds), `stale`, `updateAgeOnGet` and `noDisposeOnSet`. Missing
/// keys take their defaults; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Capacity in weight units (0 = unlimited)
    pub max: u64,
    /// Cache-wide TTL in milliseconds (0 = disabled)
    #[serde(rename = "maxAge")]
    pub max_age_ms: u64,
    /// Allow one final read of a stale value
    pub stale: bool,
    /// Refresh entry age on get
    pub update_age_on_get: bool,
    /// Skip disposal of values replaced by set
    pub no_dispose_on_set: bool,
}

impl CacheConfig {
    /// Parses options from a JSON object.
    ///
    /// # Errors
    /// `CacheError::Configuration` if the document is malformed or any option
    /// has the wrong type (for example `{"max": true}` or `{"maxAge": -1}`).
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CacheError::Configuration(format!("invalid cache options: {}", e)))
    }

    /// Loads options from environment variables.
    ///
    /// # Environment Variables
    /// - `LRU_MAX` - Capacity (default: 0, unlimited)
    /// - `LRU_MAX_AGE_MS` - Cache-wide TTL in milliseconds (default: 0, disabled)
    /// - `LRU_STALE` - Allow stale reads (default: false)
    /// - `LRU_UPDATE_AGE_ON_GET` - Refresh age on get (default: false)
    /// - `LRU_NO_DISPOSE_ON_SET` - Skip disposal on replace (default: false)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads options through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            max: number(&lookup, "LRU_MAX")?.unwrap_or(defaults.max),
            max_age_ms: number(&lookup, "LRU_MAX_AGE_MS")?.unwrap_or(defaults.max_age_ms),
            stale: flag(&lookup, "LRU_STALE")?.unwrap_or(defaults.stale),
            update_age_on_get: flag(&lookup, "LRU_UPDATE_AGE_ON_GET")?
                .unwrap_or(defaults.update_age_on_get),
            no_dispose_on_set: flag(&lookup, "LRU_NO_DISPOSE_ON_SET")?
                .unwrap_or(defaults.no_dispose_on_set),
        })
    }

    /// The cache-wide TTL as a `Duration`.
    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms)
    }
}

fn number<F, T>(lookup: &F, name: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            CacheError::Configuration(format!(
                "{} must be a non-negative number, got {:?}",
                name, raw
            ))
        }),
    }
}

fn flag<F>(lookup: &F, name: &str) -> Result<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).as_deref().map(str::trim) {
        None => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(CacheError::Configuration(format!(
            "{} must be a boolean, got {:?}",
            name, other
        ))),
    }
}
