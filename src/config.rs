//! Configuration for track description, verification and caching.
//!
//! Settings are read from TOML. Every table is optional and falls back to
//! its defaults, so an empty file is a valid configuration.
//!
//! ```toml
//! placeholder = "—"
//!
//! [verify]
//! enabled = true
//!
//! [limits]
//! max_member_bytes = 536870912
//!
//! [cache]
//! payload_dir = "/var/cache/aifm"
//! ```

use crate::container::DEFAULT_MAX_MEMBER_BYTES;
use crate::error::{AifmError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Placeholder rendered for unknown metadata values
pub const DEFAULT_PLACEHOLDER: &str = "—";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AifmConfig {
    /// Text shown for metadata fields the manifest does not provide
    pub placeholder: String,
    pub verify: VerifyConfig,
    pub limits: LimitsConfig,
    pub cache: CacheConfig,
}

impl Default for AifmConfig {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            verify: VerifyConfig::default(),
            limits: LimitsConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifyConfig {
    /// When false, outcomes are `UNKNOWN` and marked unavailable
    pub enabled: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Largest uncompressed member the reader will inflate
    pub max_member_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_member_bytes: DEFAULT_MAX_MEMBER_BYTES,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Where extracted payload audio goes; a temporary directory when unset
    pub payload_dir: Option<PathBuf>,
}

impl AifmConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if self.limits.max_member_bytes == 0 {
            return Err(AifmError::InvalidConfig(
                "limits.max_member_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
