//! In-memory mirror of the output directory
//!
//! The tree is a sum type with one `resolve` per variant:
//!
//! - [`PackageNode`]: a directory. Its index maps the case-folded on-disk
//!   name of every entry it holds to that entry, so names that differ only
//!   by case land on the same key.
//! - [`VirtualGroupNode`]: takes over a key once two different segments
//!   meet there, whether they differ by case, by a part removed while
//!   shortening, or by kind (class file vs package directory). Its entries
//!   are keyed by the original segment and kind. Every newcomer whose name
//!   is already taken gets a `.N` suffix, and the suffixed name is
//!   reserved in the parent index so no later segment can claim it.
//! - [`ClassNode`]: an allocated file path; terminal and immutable.
//!
//! Entries are matched on the segment as submitted, never on the escaped
//! or shortened on-disk name, since two different segments may rewrite to
//! the same name.
//!
//! Each package owns its own lock. It is held while the package's index
//! (and any group inside it) is consulted or updated, and released before
//! descending, so unrelated subtrees resolve in parallel. Nodes are never
//! removed; a node promoted into a group stays alive inside it, which keeps
//! any concurrent descent into it valid.

use crate::collections::HashMap;
use crate::error::{PathError, Result};
use crate::probe::{escape_reserved_name, FsProbe};
use crate::shorten::fit_component;
use crate::types::{CaseSensitivity, TreeStats};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Running totals of created nodes
#[derive(Debug, Default)]
pub(crate) struct Counters {
    packages: AtomicUsize,
    classes: AtomicUsize,
    virtual_groups: AtomicUsize,
    disambiguated: AtomicUsize,
}

impl Counters {
    pub fn snapshot(&self) -> TreeStats {
        TreeStats {
            packages: self.packages.load(Ordering::Relaxed),
            classes: self.classes.load(Ordering::Relaxed),
            virtual_groups: self.virtual_groups.load(Ordering::Relaxed),
            disambiguated: self.disambiguated.load(Ordering::Relaxed),
        }
    }
}

/// Per-allocation settings threaded through resolution
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolveContext<'a> {
    /// Appended to the terminal segment
    pub extension: &'a str,
    /// Byte budget of one on-disk name, suffix and extension included
    pub max_component_bytes: usize,
    /// Append the reserved marker to device names
    pub escape_reserved_names: bool,
    /// Used by virtual groups that still need a case verdict
    pub probe: &'a dyn FsProbe,
    /// A known value here replaces probing altogether
    pub forced_case: CaseSensitivity,
    pub counters: &'a Counters,
}

impl ResolveContext<'_> {
    /// On-disk name for `segment`: escaped, then shortened so that it fits
    /// the budget together with the optional `.N` suffix and, for class
    /// names, the extension.
    fn disk_name(&self, segment: &str, terminal: bool, suffix: Option<usize>) -> String {
        let base = if self.escape_reserved_names {
            escape_reserved_name(segment)
        } else {
            segment.to_string()
        };

        let mut tail = suffix.map(|n| format!(".{n}")).unwrap_or_default();
        if terminal {
            tail.push_str(self.extension);
        }

        let mut name = fit_component(&base, &tail, self.max_component_bytes);
        name.push_str(&tail);
        name
    }
}

/// Index key of an on-disk name
fn fold(name: &str) -> String {
    name.to_lowercase()
}

/// A node of the path tree
#[derive(Debug, Clone)]
pub(crate) enum PathNode {
    Package(Arc<PackageNode>),
    Group(Arc<VirtualGroupNode>),
    Class(Arc<ClassNode>),
}

impl PathNode {
    fn new_entry(ctx: &ResolveContext<'_>, parent: &Path, file_name: String, segment: &str, terminal: bool) -> Self {
        let path = parent.join(&file_name);
        let segment = segment.to_string();
        if terminal {
            ctx.counters.classes.fetch_add(1, Ordering::Relaxed);
            PathNode::Class(Arc::new(ClassNode {
                path,
                name: file_name,
                segment,
            }))
        } else {
            ctx.counters.packages.fetch_add(1, Ordering::Relaxed);
            PathNode::Package(Arc::new(PackageNode::new(path, file_name, segment)))
        }
    }

    /// Absolute path of this node
    pub fn path(&self) -> &Path {
        match self {
            PathNode::Package(p) => &p.path,
            PathNode::Group(g) => &g.path,
            PathNode::Class(c) => &c.path,
        }
    }

    /// Name relative to the parent directory
    pub fn name(&self) -> &str {
        match self {
            PathNode::Package(p) => &p.name,
            PathNode::Group(g) => &g.name,
            PathNode::Class(c) => &c.name,
        }
    }

    /// Segment and kind this entry was allocated for; groups have none
    fn identity(&self) -> Option<(String, bool)> {
        match self {
            PathNode::Package(p) => Some((p.segment.clone(), false)),
            PathNode::Class(c) => Some((c.segment.clone(), true)),
            PathNode::Group(_) => None,
        }
    }

    fn is_entry_for(&self, segment: &str, terminal: bool) -> bool {
        match self {
            PathNode::Package(p) => !terminal && p.segment == segment,
            PathNode::Class(c) => terminal && c.segment == segment,
            PathNode::Group(_) => false,
        }
    }

    /// Continue resolution in an entry that matched `segments[index]`
    fn enter(&self, ctx: &ResolveContext<'_>, segments: &[String], index: usize) -> Result<PathBuf> {
        let terminal = index + 1 == segments.len();
        match (self, terminal) {
            (PathNode::Class(c), true) => Ok(c.path.clone()),
            (PathNode::Package(p), false) => p.resolve(ctx, segments, index + 1),
            _ => Err(PathError::internal(format!(
                "{:?} entered for segment {:?} of the wrong kind",
                self.path(),
                segments[index]
            ))),
        }
    }
}

/// An allocated class file
#[derive(Debug)]
pub(crate) struct ClassNode {
    path: PathBuf,
    name: String,
    segment: String,
}

/// A package directory
#[derive(Debug)]
pub(crate) struct PackageNode {
    path: PathBuf,
    name: String,
    segment: String,
    /// Keyed by case-folded on-disk name
    children: Mutex<HashMap<String, PathNode>>,
}

impl PackageNode {
    pub fn new(path: PathBuf, name: String, segment: String) -> Self {
        Self {
            path,
            name,
            segment,
            children: Mutex::new(HashMap::default()),
        }
    }

    /// Resolve `segments[index..]` below this directory
    pub fn resolve(&self, ctx: &ResolveContext<'_>, segments: &[String], index: usize) -> Result<PathBuf> {
        let segment = segments[index].as_str();
        let terminal = index + 1 == segments.len();
        let name = ctx.disk_name(segment, terminal, None);
        let key = fold(&name);

        let next = {
            let mut children = self.children.lock();
            match children.get(&key).cloned() {
                None => {
                    let child = PathNode::new_entry(ctx, &self.path, name, segment, terminal);
                    trace!("New entry {:?}", child.path());
                    children.insert(key, child.clone());
                    child
                }
                Some(PathNode::Group(group)) => group.claim(ctx, &mut children, segment, terminal),
                Some(existing) if existing.is_entry_for(segment, terminal) => existing,
                Some(existing) => {
                    debug!(
                        "{:?} and {:?} collide in {:?}; creating virtual group",
                        existing.name(),
                        name,
                        self.path
                    );
                    ctx.counters.virtual_groups.fetch_add(1, Ordering::Relaxed);
                    let group = Arc::new(VirtualGroupNode::new(self.path.clone(), key.clone(), existing));
                    children.insert(key, PathNode::Group(Arc::clone(&group)));
                    group.claim(ctx, &mut children, segment, terminal)
                }
            }
        };

        next.enter(ctx, segments, index)
    }
}

#[derive(Debug)]
struct GroupState {
    /// Keyed by original segment and whether it names a class
    entries: HashMap<(String, bool), PathNode>,
    case_sensitivity: CaseSensitivity,
}

/// Entries of one directory whose on-disk names fold to the same key
#[derive(Debug)]
pub(crate) struct VirtualGroupNode {
    /// The directory holding the group's entries
    path: PathBuf,
    /// The shared folded name
    name: String,
    state: Mutex<GroupState>,
}

impl VirtualGroupNode {
    /// Group anchored at `parent`, seeded with the entry that was there first
    fn new(parent: PathBuf, folded_name: String, first: PathNode) -> Self {
        let mut entries = HashMap::default();
        if let Some(identity) = first.identity() {
            entries.insert(identity, first);
        }
        Self {
            path: parent,
            name: folded_name,
            state: Mutex::new(GroupState {
                entries,
                case_sensitivity: CaseSensitivity::Unknown,
            }),
        }
    }

    /// Find or create the entry for `segment`
    ///
    /// Called with the parent's index locked; suffixed names are reserved
    /// in `siblings` before the lock is released.
    fn claim(
        &self,
        ctx: &ResolveContext<'_>,
        siblings: &mut HashMap<String, PathNode>,
        segment: &str,
        terminal: bool,
    ) -> PathNode {
        let mut state = self.state.lock();
        let identity = (segment.to_string(), terminal);
        if let Some(existing) = state.entries.get(&identity) {
            return existing.clone();
        }

        let name = ctx.disk_name(segment, terminal, None);
        let exact_taken = state.entries.values().any(|e| e.name() == name);

        let (file_name, suffixed) = if !exact_taken && self.is_case_sensitive(&mut state, ctx) {
            (name, false)
        } else {
            let first = state.entries.len() + 1;
            let file_name = (first..)
                .map(|n| ctx.disk_name(segment, terminal, Some(n)))
                .find(|candidate| !siblings.contains_key(&fold(candidate)))
                .unwrap_or(name);
            (file_name, true)
        };

        let child = PathNode::new_entry(ctx, &self.path, file_name, segment, terminal);
        trace!("New grouped entry {:?} for {:?}", child.path(), segment);
        if suffixed {
            ctx.counters.disambiguated.fetch_add(1, Ordering::Relaxed);
            siblings.insert(fold(child.name()), child.clone());
        }
        state.entries.insert(identity, child.clone());
        child
    }

    /// Cached verdict, probing the filesystem the first time it is needed
    fn is_case_sensitive(&self, state: &mut GroupState, ctx: &ResolveContext<'_>) -> bool {
        if ctx.forced_case.is_known() {
            return ctx.forced_case.is_sensitive();
        }
        if !state.case_sensitivity.is_known() {
            state.case_sensitivity = ctx.probe.case_sensitivity(&self.path);
            debug!("Virtual group {:?} in {:?} is {:?}", self.name, self.path, state.case_sensitivity);
        }
        state.case_sensitivity.is_sensitive()
    }
}
