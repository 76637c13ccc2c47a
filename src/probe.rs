//! Filesystem behaviour probes
//!
//! Two properties of the output filesystem change how names are allocated:
//!
//! - **Case sensitivity**: on case-insensitive volumes `Foo.smali` and
//!   `foo.smali` are one file, so colliding names need a numeric suffix.
//! - **Reserved device names**: Windows refuses regular files named `CON`,
//!   `AUX`, `COM1` and friends, so such names get a trailing marker.
//!
//! Both are detected empirically by writing small scratch files, since the
//! answer depends on the mounted volume rather than the host OS. Probe I/O
//! failures never propagate: they resolve to the verdict that avoids
//! collisions and are logged with `warn!`.
//!
//! [`FsProbe`] is the seam; [`DiskProbe`] does real I/O and [`FixedProbe`]
//! returns preset answers.

use crate::types::CaseSensitivity;
use std::fmt::Debug;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Appended to segment names that collide with a reserved device name
pub const RESERVED_NAME_MARKER: char = '#';

const RESERVED_NAMES: [&str; 4] = ["CON", "PRN", "AUX", "NUL"];
const RESERVED_NUMBERED: [&str; 2] = ["COM", "LPT"];

/// Names written when checking whether the volume rejects device names
const RESERVED_PROBE_NAMES: [&str; 5] = ["aux", "con", "com1", "com9", "lpt1"];

const PROBE_CONTENT: &[u8] = b"test";

/// Check whether `name` is a Windows device name, ignoring case
pub fn is_reserved_name(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    if RESERVED_NAMES.contains(&upper.as_str()) {
        return true;
    }
    RESERVED_NUMBERED.iter().any(|prefix| {
        upper
            .strip_prefix(prefix)
            .is_some_and(|n| n.len() == 1 && matches!(n.as_bytes()[0], b'1'..=b'9'))
    })
}

/// Append [`RESERVED_NAME_MARKER`] when `name` is a reserved device name
pub fn escape_reserved_name(name: &str) -> String {
    if is_reserved_name(name) {
        format!("{name}{RESERVED_NAME_MARKER}")
    } else {
        name.to_string()
    }
}

/// Closest ancestor of `path` (including itself) that exists as a directory
pub fn nearest_existing_dir(path: &Path) -> Option<PathBuf> {
    path.ancestors()
        .map(|p| if p.as_os_str().is_empty() { Path::new(".") } else { p })
        .find(|p| p.is_dir())
        .map(Path::to_path_buf)
}

/// Source of filesystem behaviour verdicts
pub trait FsProbe: Send + Sync + Debug {
    /// Determine whether `dir` distinguishes names that differ only by case.
    /// Must return `Sensitive` or `Insensitive`, never `Unknown`.
    fn case_sensitivity(&self, dir: &Path) -> CaseSensitivity;

    /// Determine whether `dir` refuses files named after reserved devices
    fn rejects_reserved_names(&self, dir: &Path, extension: &str) -> bool;
}

/// Probe that answers by writing scratch files to disk
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskProbe;

impl FsProbe for DiskProbe {
    fn case_sensitivity(&self, dir: &Path) -> CaseSensitivity {
        let Some(dir) = nearest_existing_dir(dir) else {
            warn!("No existing directory to probe case sensitivity under {:?}; assuming insensitive", dir);
            return CaseSensitivity::Insensitive;
        };
        case_verdict(&dir, probe_case_sensitivity(&dir))
    }

    fn rejects_reserved_names(&self, dir: &Path, extension: &str) -> bool {
        let Some(dir) = nearest_existing_dir(dir) else {
            warn!("No existing directory to probe reserved names under {:?}; escaping them", dir);
            return true;
        };
        reserved_verdict(&dir, probe_reserved_names(&dir, extension))
    }
}

/// Map a case probe outcome to a verdict; failures mean insensitive
fn case_verdict(dir: &Path, outcome: io::Result<bool>) -> CaseSensitivity {
    let verdict = match outcome {
        Ok(true) => CaseSensitivity::Sensitive,
        Ok(false) => CaseSensitivity::Insensitive,
        Err(e) => {
            warn!("Case sensitivity probe failed in {:?}: {}; assuming insensitive", dir, e);
            CaseSensitivity::Insensitive
        }
    };
    debug!("Case sensitivity of {:?}: {:?}", dir, verdict);
    verdict
}

/// Map a reserved name probe outcome to a verdict; failures mean escape
fn reserved_verdict(dir: &Path, outcome: io::Result<()>) -> bool {
    match outcome {
        Ok(()) => {
            trace!("Reserved device names are plain files in {:?}", dir);
            false
        }
        Err(e) => {
            debug!("Reserved device names rejected in {:?}: {}", dir, e);
            true
        }
    }
}

/// Write and remove one file per reserved name, failing on the first refusal
fn probe_reserved_names(dir: &Path, extension: &str) -> io::Result<()> {
    for name in RESERVED_PROBE_NAMES {
        let path = dir.join(format!("{name}{extension}"));
        if path.exists() {
            continue;
        }
        fs::write(&path, PROBE_CONTENT)?;
        fs::remove_file(&path)?;
    }
    Ok(())
}

/// Removes probe files when dropped, whichever way the probe exits
struct ProbeFiles<'a> {
    paths: [&'a Path; 2],
}

impl Drop for ProbeFiles<'_> {
    fn drop(&mut self) {
        for path in self.paths {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to remove probe file {:?}: {}", path, e);
                }
            }
        }
    }
}

/// Returns `Ok(true)` when `dir` is case-sensitive
fn probe_case_sensitivity(dir: &Path) -> io::Result<bool> {
    let (lower, upper) = (1u32..)
        .map(|n| (dir.join(format!("case_probe.{n}")), dir.join(format!("CASE_PROBE.{n}"))))
        .find(|(lower, upper)| !lower.exists() && !upper.exists())
        .ok_or_else(|| io::Error::other("exhausted probe file names"))?;

    let _cleanup = ProbeFiles {
        paths: [lower.as_path(), upper.as_path()],
    };

    let mut file = OpenOptions::new().write(true).create_new(true).open(&lower)?;
    file.write_all(PROBE_CONTENT)?;
    file.sync_all()?;
    drop(file);

    if upper.exists() {
        return Ok(false);
    }

    match OpenOptions::new().write(true).create_new(true).open(&upper) {
        Ok(_) => return Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
        Err(e) => return Err(e),
    }

    // exists() and create_new disagree; settle it by reading through the other name
    match File::open(&upper) {
        Ok(mut file) => {
            let mut content = Vec::new();
            file.read_to_end(&mut content)?;
            if content != PROBE_CONTENT {
                warn!("Probe file {:?} has unexpected content; assuming insensitive", upper);
            }
            Ok(false)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(e),
    }
}

/// Probe with preset answers, for forcing behaviour regardless of the disk
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe {
    /// Verdict returned for every case sensitivity probe
    pub case_sensitivity: CaseSensitivity,
    /// Verdict returned for the reserved name probe
    pub rejects_reserved_names: bool,
}

impl FsProbe for FixedProbe {
    fn case_sensitivity(&self, _dir: &Path) -> CaseSensitivity {
        match self.case_sensitivity {
            CaseSensitivity::Unknown => CaseSensitivity::Insensitive,
            known => known,
        }
    }

    fn rejects_reserved_names(&self, _dir: &Path, _extension: &str) -> bool {
        self.rejects_reserved_names
    }
}
