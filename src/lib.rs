//! # classfile-paths - unique output paths for decompiled class trees
//!
//! Allocates a guaranteed-unique file path for every class a decompiler
//! emits, so that no two classes ever overwrite each other on disk.
//!
//! ## Overview
//!
//! Class names such as `Lcom/example/Foo;` map naturally onto directories
//! and files, but several filesystem quirks break the naive mapping:
//!
//! - **Case folding**: on case-insensitive volumes `Foo` and `foo` are the
//!   same file. Colliding names are grouped and, where the volume really is
//!   case-insensitive, later arrivals get a `.N` suffix (`foo.2.smali`).
//!   Names that only meet after escaping or shortening are grouped the
//!   same way, and a suffixed name is never handed out again.
//! - **Length limits**: components longer than 245 bytes are shortened from
//!   the middle, leaving headroom for the suffix.
//! - **Reserved device names**: `CON`, `AUX`, `COM1` and similar get a
//!   trailing `#` when the volume rejects them.
//!
//! Filesystem behaviour is detected empirically and cached: reserved names
//! once per tree, case sensitivity once per collision group and only when a
//! collision actually occurs. Nothing is written besides those probe files;
//! the tree only computes paths.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use classfile_paths::PathTree;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tree = PathTree::new(PathBuf::from("./decompiled"), ".java")?;
//!
//! let foo = tree.allocate_descriptor("Lcom/example/Foo;")?;
//! let other = tree.allocate_descriptor("Lcom/example/foo;")?;
//! assert_ne!(foo, other);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! [`PathTree`] is shared by reference between decompiling workers. Each
//! directory node carries its own lock, so workers only serialize where
//! their classes share a directory. [`PathTree::allocate_all`] runs a batch
//! on the rayon pool.
//!
//! ## Module Organization
//!
//! - [`identifier`]: descriptor parsing and validation
//! - [`tree`]: the allocator and its builder
//! - [`probe`]: filesystem probes for case sensitivity and reserved names
//! - [`shorten`]: byte-budget shortening of single components
//! - [`types`]: configuration and statistics
//! - [`error`]: error types

pub mod error;
pub mod identifier;
pub mod probe;
pub mod shorten;
pub mod tree;
pub mod types;

// Internal modules (not part of public API)
mod collections;
mod node;

pub use error::{PathError, Result};
pub use identifier::ClassIdentifier;
pub use probe::{DiskProbe, FixedProbe, FsProbe};
pub use tree::{PathTree, PathTreeBuilder};
pub use types::{CaseSensitivity, PathTreeConfig, TreeStats};
