//! The path tree: public entry point for allocation
//!
//! A [`PathTree`] is created once per decompilation run with a fixed output
//! directory and file extension. Every [`allocate`](PathTree::allocate)
//! resolves a class identifier one segment at a time, creating nodes on
//! first reference, and returns the path the class should be written to.
//! Nothing is created on disk apart from short-lived probe files.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use classfile_paths::{ClassIdentifier, PathTree};
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tree = PathTree::new(PathBuf::from("./out"), ".java")?;
//!
//! let id: ClassIdentifier = "Lcom/example/Foo;".parse()?;
//! let path = tree.allocate(&id)?;
//! assert!(path.ends_with("com/example/Foo.java"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! `PathTree` is `Send + Sync`. Concurrent callers contend only on the
//! directory nodes they share, never on a tree-wide lock.

use crate::error::{PathError, Result};
use crate::identifier::ClassIdentifier;
use crate::node::{Counters, PackageNode, ResolveContext};
use crate::probe::{DiskProbe, FsProbe};
use crate::shorten::utf8_len;
use crate::types::{CaseSensitivity, PathTreeConfig, TreeStats, DEFAULT_FILE_EXTENSION, DEFAULT_MAX_COMPONENT_BYTES};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Smallest component budget accepted by the builder
const MIN_COMPONENT_BYTES: usize = 8;

/// Room kept next to the extension for a `.N` suffix (up to five digits)
const SUFFIX_HEADROOM: usize = 6;

/// Allocator of unique class file paths under one output directory
#[derive(Debug)]
pub struct PathTree {
    root: PackageNode,
    config: PathTreeConfig,
    probe: Arc<dyn FsProbe>,
    escape_reserved_names: bool,
    counters: Counters,
}

impl PathTree {
    /// Create a tree with default settings
    ///
    /// Probes the output directory (or its nearest existing ancestor) for
    /// reserved device name handling. Case sensitivity is probed lazily,
    /// only where two names actually collide.
    ///
    /// # Errors
    ///
    /// [`PathError::InvalidConfiguration`] if the extension leaves no room
    /// for a class name within the component budget.
    pub fn new(output_dir: PathBuf, file_extension: impl Into<String>) -> Result<Self> {
        PathTreeBuilder::new().file_extension(file_extension).build(output_dir)
    }

    /// Allocate the path for `identifier`
    ///
    /// Distinct identifiers always receive distinct paths, and every
    /// component of the result fits `max_component_bytes`. Allocating the
    /// same identifier again returns the path it got the first time; the
    /// caller decides whether that duplicate is a problem.
    #[instrument(level = "trace", skip_all, fields(identifier = %identifier))]
    pub fn allocate(&self, identifier: &ClassIdentifier) -> Result<PathBuf> {
        let ctx = ResolveContext {
            extension: &self.config.file_extension,
            max_component_bytes: self.config.max_component_bytes,
            escape_reserved_names: self.escape_reserved_names,
            probe: self.probe.as_ref(),
            forced_case: self.config.case_sensitivity,
            counters: &self.counters,
        };

        let path = self.root.resolve(&ctx, identifier.segments(), 0)?;
        trace!("Allocated {} -> {:?}", identifier, path);
        Ok(path)
    }

    /// Parse a descriptor such as `Lcom/example/Foo;` and allocate it
    ///
    /// Malformed descriptors fail before the tree is touched.
    pub fn allocate_descriptor(&self, descriptor: &str) -> Result<PathBuf> {
        let identifier = ClassIdentifier::parse(descriptor)?;
        self.allocate(&identifier)
    }

    /// Allocate many identifiers in parallel
    ///
    /// Results are in input order. Uniqueness holds as for sequential calls,
    /// but which of two case-colliding names receives the suffix depends on
    /// scheduling.
    pub fn allocate_all(&self, identifiers: &[ClassIdentifier]) -> Vec<Result<PathBuf>> {
        identifiers.par_iter().map(|id| self.allocate(id)).collect()
    }

    /// Root directory of all allocated paths
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Extension appended to class names
    pub fn file_extension(&self) -> &str {
        &self.config.file_extension
    }

    /// Whether reserved device names get escaped in this tree
    pub fn escapes_reserved_names(&self) -> bool {
        self.escape_reserved_names
    }

    /// Configuration this tree was built with
    pub fn config(&self) -> &PathTreeConfig {
        &self.config
    }

    /// Count the nodes allocated so far
    pub fn stats(&self) -> TreeStats {
        self.counters.snapshot()
    }
}

/// Builder for [`PathTree`] with custom settings
///
/// ```rust
/// use classfile_paths::{CaseSensitivity, PathTreeBuilder};
/// use std::path::PathBuf;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let tree = PathTreeBuilder::new()
///     .file_extension(".java")
///     .case_sensitivity(CaseSensitivity::Insensitive)
///     .escape_reserved_names(false)
///     .build(PathBuf::from("out"))?;
///
/// tree.allocate_descriptor("Lcom/example/Foo;")?;
/// let path = tree.allocate_descriptor("Lcom/example/foo;")?;
/// assert!(path.ends_with("com/example/foo.2.java"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PathTreeBuilder {
    file_extension: String,
    max_component_bytes: usize,
    case_sensitivity: CaseSensitivity,
    escape_reserved_names: Option<bool>,
    probe: Option<Arc<dyn FsProbe>>,
}

impl Default for PathTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PathTreeBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            max_component_bytes: DEFAULT_MAX_COMPONENT_BYTES,
            case_sensitivity: CaseSensitivity::Unknown,
            escape_reserved_names: None,
            probe: None,
        }
    }

    /// Start from a loaded configuration; `build` still takes the output directory
    pub fn from_config(config: &PathTreeConfig) -> Self {
        Self {
            file_extension: config.file_extension.clone(),
            max_component_bytes: config.max_component_bytes,
            case_sensitivity: config.case_sensitivity,
            escape_reserved_names: config.escape_reserved_names,
            probe: None,
        }
    }

    /// Set the extension appended to class names, including the dot
    pub fn file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }

    /// Set the byte budget for a single name component
    pub fn max_component_bytes(mut self, bytes: usize) -> Self {
        self.max_component_bytes = bytes;
        self
    }

    /// Force a case sensitivity verdict instead of probing
    ///
    /// `CaseSensitivity::Unknown` restores lazy probing.
    pub fn case_sensitivity(mut self, case_sensitivity: CaseSensitivity) -> Self {
        self.case_sensitivity = case_sensitivity;
        self
    }

    /// Force reserved device name escaping on or off instead of probing
    pub fn escape_reserved_names(mut self, escape: bool) -> Self {
        self.escape_reserved_names = Some(escape);
        self
    }

    /// Replace the filesystem probe
    pub fn probe(mut self, probe: Arc<dyn FsProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Build the tree rooted at `output_dir`
    pub fn build(self, output_dir: PathBuf) -> Result<PathTree> {
        if self.max_component_bytes < MIN_COMPONENT_BYTES {
            return Err(PathError::InvalidConfiguration(format!(
                "max_component_bytes must be at least {MIN_COMPONENT_BYTES}, got {}",
                self.max_component_bytes
            )));
        }
        // a name byte, the shortening marker and a suffix must fit next to the extension
        if utf8_len(&self.file_extension) + 2 + SUFFIX_HEADROOM > self.max_component_bytes {
            return Err(PathError::InvalidConfiguration(format!(
                "file extension {:?} leaves no room for a name within {} bytes",
                self.file_extension, self.max_component_bytes
            )));
        }
        if self.file_extension.contains(['/', '\\']) {
            return Err(PathError::InvalidConfiguration(format!(
                "file extension {:?} contains a path separator",
                self.file_extension
            )));
        }

        let probe = self.probe.unwrap_or_else(|| Arc::new(DiskProbe));
        let escape_reserved_names = self
            .escape_reserved_names
            .unwrap_or_else(|| probe.rejects_reserved_names(&output_dir, &self.file_extension));

        debug!(
            "Path tree at {:?} (extension {:?}, escape reserved names: {})",
            output_dir, self.file_extension, escape_reserved_names
        );

        Ok(PathTree {
            root: PackageNode::new(output_dir.clone(), String::new(), String::new()),
            config: PathTreeConfig {
                output_dir,
                file_extension: self.file_extension,
                max_component_bytes: self.max_component_bytes,
                case_sensitivity: self.case_sensitivity,
                escape_reserved_names: self.escape_reserved_names,
            },
            probe,
            escape_reserved_names,
            counters: Counters::default(),
        })
    }
}
