//! Generation configuration
//!
//! The boundary handed to the code-generation layer together with the
//! finished notebook: output directory, target namespace, and per-generator
//! string/boolean options keyed by generator name.
//!
//! ## Example config file (generation.toml):
//! ```toml
//! output_dir = "generated"
//! namespace = "shop.model"
//!
//! [generators.rust]
//! strings = { module = "model" }
//! flags = { derive_serde = true }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options for one generator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorOptions {
    #[serde(default)]
    pub strings: BTreeMap<String, String>,
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
}

/// Configuration handed to the generation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Directory generated artifacts are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Target namespace for generated code
    #[serde(default)]
    pub namespace: String,
    /// Per-generator options, keyed by generator name
    #[serde(default)]
    pub generators: BTreeMap<String, GeneratorOptions>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            namespace: String::new(),
            generators: BTreeMap::new(),
        }
    }
}

impl GenerationConfig {
    /// Parse a TOML config document
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml(&fs::read_to_string(path)?)
    }

    /// String option of one generator, if set
    pub fn string_option(&self, generator: &str, key: &str) -> Option<&str> {
        self.generators
            .get(generator)?
            .strings
            .get(key)
            .map(String::as_str)
    }

    /// Boolean option of one generator, defaulting to false
    pub fn flag(&self, generator: &str, key: &str) -> bool {
        self.generators
            .get(generator)
            .and_then(|g| g.flags.get(key).copied())
            .unwrap_or(false)
    }
}
