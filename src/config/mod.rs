//! Site configuration for `quire.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── layout     # [layout]
//! │   ├── routes     # [routes]
//! │   └── site       # [site]
//! ├── error.rs       # ConfigError, ConfigDiagnostics
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! Every section is optional; an empty file yields the built-in site.

mod error;
pub mod section;

pub use error::{ConfigDiagnostic, ConfigDiagnostics, ConfigError};
pub use section::{ContentRoute, LayoutSection, PageRoute, RoutesSection, SiteSection};

use serde::{Deserialize, Serialize};

use crate::log;

/// Root configuration structure representing `quire.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site name, default header, reserved ids
    #[serde(default)]
    pub site: SiteSection,

    /// Route table
    #[serde(default)]
    pub routes: RoutesSection,

    /// Fade, debounce and spacing
    #[serde(default)]
    pub layout: LayoutSection,
}

impl SiteConfig {
    /// Parse configuration from a TOML string, ignoring unknown keys.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Parse, warn about unknown keys, and validate.
    pub fn from_str_checked(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let (config, ignored) = Self::parse_with_ignored(content)?;
        if !ignored.is_empty() {
            Self::warn_unknown_fields(&ignored, origin);
        }
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let origin = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        Self::from_str_checked(&content, &origin)
    }

    /// Parse TOML content, collecting any unknown fields.
    pub fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn warn_unknown_fields(fields: &[String], origin: &str) {
        log!("warning"; "unknown fields in {}, ignoring: {}", origin, fields.join(", "));
    }

    /// Validate every section, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();
        self.site.validate(&mut diag);
        self.routes.validate(&mut diag);
        self.layout.validate(&mut diag);
        diag.into_result().map_err(ConfigError::Diagnostics)
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from TOML.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
