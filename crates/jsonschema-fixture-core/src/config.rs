//! Configuration for normalization and generation.

use serde::{Deserialize, Serialize};

/// Options shared by the normalizer and the generator.
///
/// ## Serialization Format
///
/// Fields are serialized in `kebab-case` (e.g., `default-max`), matching the
/// CLI flag names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct GenerateOptions {
    /// Implicit upper bound used wherever a schema leaves one out:
    /// `maximum`, `maxLength`, `maxItems`, and unbounded pattern
    /// repetition (`*`, `+`, `{n,}`). Default: 10.
    pub default_max: u32,
    /// Report contradictory nodes (empty `type`, empty `enum`, patterns that
    /// cannot be synthesized) as errors instead of degrading silently.
    pub strict: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            default_max: 10,
            strict: false,
        }
    }
}

impl GenerateOptions {
    /// Same options with strict mode switched on.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }
}
