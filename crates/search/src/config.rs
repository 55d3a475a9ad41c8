//! Search configuration via `nimbus-search.toml`
//!
//! Every field has a default, so an empty file (or no file at all) gives
//! the console's standard behavior. To change settings, edit the file and
//! rebuild the orchestrator.

use nimbus_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "nimbus-search.toml";

/// Longest accepted debounce window
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Largest accepted page size
pub const MAX_PAGE_SIZE: u32 = 500;

/// Federated search configuration
///
/// # Example
///
/// ```toml
/// debounce_ms = 500
/// page_size = 25
/// entity_priority = ["Linode", "Volume"]
/// disabled_entities = ["Image"]
/// # max_pages_per_entity = 4
/// # fetch_timeout_ms = 10000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a query settles
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Entities listed first in results, in this order
    #[serde(default)]
    pub entity_priority: Vec<String>,
    /// Entities never queried
    #[serde(default)]
    pub disabled_entities: Vec<String>,
    /// Maximum pages loaded per entity, unlimited when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages_per_entity: Option<u32>,
    /// Per-request limit; a slower fetch fails with a timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_timeout_ms: Option<u64>,
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_page_size() -> u32 {
    25
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            page_size: default_page_size(),
            entity_priority: Vec::new(),
            disabled_entities: Vec::new(),
            max_pages_per_entity: None,
            fetch_timeout_ms: None,
        }
    }
}

impl SearchConfig {
    /// Debounce window
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Per-request fetch limit, if any
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an out-of-range field.
    pub fn validate(&self) -> Result<()> {
        if self.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(Error::config(format!(
                "debounce_ms must be at most {}, got {}",
                MAX_DEBOUNCE_MS, self.debounce_ms
            )));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::config(format!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        if self.max_pages_per_entity == Some(0) {
            return Err(Error::config("max_pages_per_entity must be at least 1"));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Nimbus federated search configuration
#
# Quiet period after the last keystroke before a query is sent (default: 500)
debounce_ms = 500

# Records requested per page, 1 to 500 (default: 25)
page_size = 25

# Entities listed first in results, in this order.
# Every other entity follows in registration order.
entity_priority = []

# Entities never queried.
disabled_entities = []

# Maximum pages loaded per entity (default: unlimited).
# max_pages_per_entity = 4

# Per-request limit in milliseconds (default: none).
# fetch_timeout_ms = 10000
"#
    }

    /// Parse and validate config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SearchConfig = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse search config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(msg) => Error::config(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}
