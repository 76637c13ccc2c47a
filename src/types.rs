//! Core data types shared across the crate
//!
//! - **Configuration**: [`PathTreeConfig`] - everything fixed at tree construction
//! - **Probe verdicts**: [`CaseSensitivity`] - tri-state filesystem case behaviour
//! - **Reporting**: [`TreeStats`] - node counts for a finished run
//!
//! ## Examples
//!
//! ```rust
//! use classfile_paths::types::{CaseSensitivity, PathTreeConfig};
//! use std::path::PathBuf;
//!
//! let config = PathTreeConfig {
//!     file_extension: ".java".to_string(),
//!     case_sensitivity: CaseSensitivity::Insensitive,
//!     ..PathTreeConfig::new(PathBuf::from("out"))
//! };
//! assert_eq!(config.max_component_bytes, 245);
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Longest allowed name component in bytes. Ten bytes below the common
/// 255-byte limit, leaving room for a `.N` disambiguation suffix.
pub const DEFAULT_MAX_COMPONENT_BYTES: usize = 245;

/// Default extension appended to class file names
pub const DEFAULT_FILE_EXTENSION: &str = ".smali";

/// Whether a directory distinguishes names differing only by letter case
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSensitivity {
    /// Not yet probed
    #[default]
    Unknown,
    /// `Foo` and `foo` are distinct files
    Sensitive,
    /// `Foo` and `foo` name the same file
    Insensitive,
}

impl CaseSensitivity {
    /// True only for a confirmed case-sensitive filesystem
    pub fn is_sensitive(self) -> bool {
        self == CaseSensitivity::Sensitive
    }

    /// True once a verdict has been reached
    pub fn is_known(self) -> bool {
        self != CaseSensitivity::Unknown
    }
}

/// Configuration fixed for the lifetime of a [`PathTree`](crate::PathTree)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathTreeConfig {
    /// Root directory all allocated paths live under
    pub output_dir: PathBuf,
    /// Extension appended to class names, including the leading dot
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
    /// Byte budget for a single name component
    #[serde(default = "default_max_component_bytes")]
    pub max_component_bytes: usize,
    /// `Unknown` probes lazily per virtual group; anything else is forced
    #[serde(default)]
    pub case_sensitivity: CaseSensitivity,
    /// `None` probes the output root at construction; `Some` forces the answer
    #[serde(default)]
    pub escape_reserved_names: Option<bool>,
}

fn default_file_extension() -> String {
    DEFAULT_FILE_EXTENSION.to_string()
}

fn default_max_component_bytes() -> usize {
    DEFAULT_MAX_COMPONENT_BYTES
}

impl PathTreeConfig {
    /// Defaults for everything but the output directory
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            file_extension: default_file_extension(),
            max_component_bytes: DEFAULT_MAX_COMPONENT_BYTES,
            case_sensitivity: CaseSensitivity::Unknown,
            escape_reserved_names: None,
        }
    }

    /// Load a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write this config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Node counts for a tree, as returned by [`PathTree::stats`](crate::PathTree::stats)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Package directories, not counting the root
    pub packages: usize,
    /// Allocated class files
    pub classes: usize,
    /// Virtual groups created by case-folding collisions
    pub virtual_groups: usize,
    /// Entries whose on-disk name carries a `.N` suffix
    pub disambiguated: usize,
}
