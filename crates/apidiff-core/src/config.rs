//! Engine configuration.
//!
//! Every field has a default, so an empty TOML table (or no file at all)
//! yields the standard behaviour.

use crate::errors::{ApiDiffError, Result};
use serde::{Deserialize, Serialize};

/// Tunables for canonicalisation and differencing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Key prefix that marks a vendor-extension property
    pub extension_prefix: String,
    /// Extra response header names (case-insensitive) never compared.
    /// `content-type` is always skipped whatever this holds.
    pub ignored_response_headers: Vec<String>,
    /// Worker threads used for schema-diff calls; 1 runs them inline
    pub schema_diff_parallelism: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            extension_prefix: "x-".to_string(),
            ignored_response_headers: Vec::new(),
            schema_diff_parallelism: 1,
        }
    }
}

impl EngineConfig {
    /// Check the configuration is usable.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the extension prefix is empty or parallelism is zero.
    pub fn validate(&self) -> Result<()> {
        if self.extension_prefix.is_empty() {
            return Err(ApiDiffError::InvalidConfig {
                reason: "extension_prefix must not be empty".to_string(),
            });
        }
        if self.schema_diff_parallelism == 0 {
            return Err(ApiDiffError::InvalidConfig {
                reason: "schema_diff_parallelism must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_extension(&self, key: &str) -> bool {
        key.starts_with(&self.extension_prefix)
    }

    pub fn is_ignored_header(&self, name: &str) -> bool {
        self.ignored_response_headers
            .iter()
            .any(|ignored| ignored.eq_ignore_ascii_case(name))
    }
}
