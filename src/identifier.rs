//! Structural class identifiers
//!
//! Class names arrive in descriptor form: a leading `L`, `/`-separated
//! package segments, and a trailing `;` (`Lcom/example/Foo;`). Parsing
//! splits them into an ordered list of non-empty segments whose last
//! element is the bare class name. The file extension is appended later,
//! during resolution, never here.
//!
//! ```rust
//! use classfile_paths::ClassIdentifier;
//!
//! let id: ClassIdentifier = "Lcom/example/Foo;".parse().unwrap();
//! assert_eq!(id.segments(), ["com", "example", "Foo"]);
//! assert_eq!(id.class_name(), "Foo");
//! assert_eq!(id.to_string(), "Lcom/example/Foo;");
//! ```

use crate::error::{PathError, Result};
use std::fmt;
use std::str::FromStr;

const TYPE_MARKER: char = 'L';
const TERMINATOR: char = ';';
const SEPARATOR: char = '/';

/// A validated class name split into package segments and a class name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassIdentifier {
    segments: Vec<String>,
}

impl ClassIdentifier {
    /// Parse a descriptor-form class name such as `Lcom/example/Foo;`
    ///
    /// # Errors
    ///
    /// [`PathError::InvalidIdentifier`] when the leading `L` or trailing `;`
    /// is missing, a package segment is empty (leading or doubled `/`), or
    /// the class name itself is empty.
    pub fn parse(descriptor: &str) -> Result<Self> {
        let inner = descriptor
            .strip_prefix(TYPE_MARKER)
            .and_then(|rest| rest.strip_suffix(TERMINATOR))
            .ok_or_else(|| {
                PathError::invalid_identifier(descriptor, "expected leading 'L' and trailing ';'")
            })?;

        let mut segments: Vec<String> = inner.split(SEPARATOR).map(str::to_string).collect();
        let class_name = segments.pop().unwrap_or_default();

        if segments.iter().any(String::is_empty) {
            return Err(PathError::invalid_identifier(descriptor, "empty package segment"));
        }
        if class_name.is_empty() {
            return Err(PathError::invalid_identifier(descriptor, "empty class name"));
        }

        segments.push(class_name);
        Ok(Self { segments })
    }

    /// Build an identifier from already-split segments
    ///
    /// The last segment is the class name. Segments must be non-empty and
    /// must not contain `/`.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        let joined = segments.join("/");

        if segments.is_empty() {
            return Err(PathError::invalid_identifier(joined, "no segments"));
        }
        if let Some(bad) = segments.iter().find(|s| s.contains(SEPARATOR)) {
            return Err(PathError::invalid_identifier(
                joined.clone(),
                format!("segment {bad:?} contains '/'"),
            ));
        }
        if segments.iter().any(String::is_empty) {
            return Err(PathError::invalid_identifier(joined, "empty segment"));
        }

        Ok(Self { segments })
    }

    /// Build an identifier from a dotted binary name such as `com.example.Foo$Inner`
    pub fn from_binary_name(name: &str) -> Result<Self> {
        Self::parse(&format!("{TYPE_MARKER}{};", name.replace('.', "/")))
    }

    /// All segments, package parts first, class name last
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Package segments (everything but the class name)
    pub fn package(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The bare class name
    pub fn class_name(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }
}

impl fmt::Display for ClassIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TYPE_MARKER}{}{TERMINATOR}", self.segments.join("/"))
    }
}

impl FromStr for ClassIdentifier {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
