//! Validation settings.
//!
//! Callers that want to tune validation can embed a `[validation]` table in
//! their own TOML configuration and hand the text to
//! [`ValidationConfig::from_toml_str`]:
//!
//! ```toml
//! [validation]
//! max_composition_depth = 4
//! check_coupling = true
//! check_parity = false
//! ```
//!
//! The crate itself never reads files or environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default nesting bound for recursive compositions.
pub const DEFAULT_MAX_COMPOSITION_DEPTH: usize = 8;

/// Root of a TOML document that may carry a `[validation]` table.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    validation: ValidationConfig,
}

/// Knobs for species validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum nesting of sub-groups inside a composition, e.g. `Si(CH3)4` has depth 2.
    pub max_composition_depth: usize,

    /// Check angular momentum coupling rules of atomic terms (e.g. J in |L-S|..L+S).
    pub check_coupling: bool,

    /// Check that term parities agree with their shell configurations.
    pub check_parity: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_composition_depth: DEFAULT_MAX_COMPOSITION_DEPTH,
            check_coupling: true,
            check_parity: true,
        }
    }
}

impl ValidationConfig {
    /// Structural checks only; physical consistency checks are skipped.
    pub fn structural_only() -> Self {
        Self {
            check_coupling: false,
            check_parity: false,
            ..Self::default()
        }
    }

    /// Parse the `[validation]` table from a TOML string. Missing keys keep
    /// their defaults; a missing table yields [`ValidationConfig::default`].
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(content).context("Failed to parse TOML configuration")?;

        if file.validation.max_composition_depth == 0 {
            anyhow::bail!("max_composition_depth must be at least 1");
        }

        Ok(file.validation)
    }
}
