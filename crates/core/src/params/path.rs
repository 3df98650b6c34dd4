//! Dot-separated parameter paths
//!
//! A `ParamPath` addresses a node inside a parameter tree relative to the
//! synthetic `parameters` root:
//!
//! | Syntax | Meaning | Example |
//! |--------|---------|---------|
//! | `key` | First child named `key` | `index` |
//! | `a.b` | Nested child | `corpus.path` |
//! | `key[n]` | n-th repeated child named `key` | `field[1].name` |
//! | (empty) | The root container | `` |
//! | `parameters` | The root container, also as a leading segment | `parameters.index` |

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::node::ROOT_NAME;

/// Maximum number of segments in a parameter path
pub const MAX_PATH_SEGMENTS: usize = 64;

/// Error type for parameter path parsing and path-directed mutation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParamPathError {
    /// The root container cannot hold a value
    #[error("the root path cannot be assigned")]
    RootNotAssignable,
    /// Empty key in path
    #[error("empty key in path at position {0}")]
    EmptyKey(usize),
    /// Unclosed bracket
    #[error("unclosed bracket starting at position {0}")]
    UnclosedBracket(usize),
    /// Invalid repeat index
    #[error("invalid index at position {0}: {1}")]
    InvalidIndex(usize, String),
    /// Unexpected character
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
    /// Path exceeds maximum length
    #[error("path length {length} exceeds maximum of {max} segments")]
    TooLong {
        /// Actual path length
        length: usize,
        /// Maximum allowed length
        max: usize,
    },
    /// Repeat index points past the end of the repeated group
    #[error("index out of bounds for '{key}': {index} > {len}")]
    IndexOutOfBounds {
        /// Element name
        key: String,
        /// The requested index
        index: usize,
        /// Number of existing repeated children
        len: usize,
    },
}

/// A single path segment: an element name plus an optional repeat index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    /// Element name
    pub key: String,
    /// Position among same-named siblings (`None` = first / all)
    pub index: Option<usize>,
}

impl PathSegment {
    /// Segment selecting children named `key`
    pub fn key(key: impl Into<String>) -> Self {
        PathSegment {
            key: key.into(),
            index: None,
        }
    }

    /// Segment selecting the `index`-th child named `key`
    pub fn indexed(key: impl Into<String>, index: usize) -> Self {
        PathSegment {
            key: key.into(),
            index: Some(index),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{}]", self.key, i),
            None => write!(f, "{}", self.key),
        }
    }
}

/// A path into a parameter tree
///
/// ```
/// use docket_core::params::ParamPath;
///
/// let path: ParamPath = "corpus.path".parse().unwrap();
/// assert_eq!(path.len(), 2);
/// assert_eq!(path.to_string(), "corpus.path");
///
/// let second: ParamPath = "field[1].name".parse().unwrap();
/// assert_eq!(second.segments()[0].index, Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ParamPath {
    segments: Vec<PathSegment>,
}

impl ParamPath {
    /// The root path (empty path)
    pub fn root() -> Self {
        ParamPath {
            segments: Vec::new(),
        }
    }

    /// Append a key segment (builder style)
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::key(key));
        self
    }

    /// Get the path segments
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the root path
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether this is the root path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Split into parent path and final segment
    pub fn split_last(&self) -> Option<(ParamPath, &PathSegment)> {
        let (last, parent) = self.segments.split_last()?;
        Some((
            ParamPath {
                segments: parent.to_vec(),
            },
            last,
        ))
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == ':'
}

impl FromStr for ParamPath {
    type Err = ParamPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(ParamPath::root());
        }

        let chars: Vec<char> = s.chars().collect();
        let mut segments = Vec::new();
        let mut i = 0;

        loop {
            let key_start = i;
            while i < chars.len() && is_name_char(chars[i]) {
                i += 1;
            }
            if i == key_start {
                return match chars.get(i) {
                    None | Some('.') | Some('[') => Err(ParamPathError::EmptyKey(i)),
                    Some(&c) => Err(ParamPathError::UnexpectedChar(c, i)),
                };
            }
            let key: String = chars[key_start..i].iter().collect();

            let mut index = None;
            if i < chars.len() && chars[i] == '[' {
                let bracket = i;
                i += 1;
                let idx_start = i;
                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(ParamPathError::UnclosedBracket(bracket));
                }
                let idx_str: String = chars[idx_start..i].iter().collect();
                let idx = idx_str
                    .parse::<usize>()
                    .map_err(|_| ParamPathError::InvalidIndex(idx_start, idx_str))?;
                index = Some(idx);
                i += 1;
            }
            segments.push(PathSegment { key, index });

            match chars.get(i) {
                None => break,
                Some('.') => i += 1,
                Some(&c) => return Err(ParamPathError::UnexpectedChar(c, i)),
            }
        }

        // The root element name addresses the container, not a child
        if segments.first().map_or(false, |seg| seg.key == ROOT_NAME && seg.index.is_none()) {
            segments.remove(0);
        }

        if segments.len() > MAX_PATH_SEGMENTS {
            return Err(ParamPathError::TooLong {
                length: segments.len(),
                max: MAX_PATH_SEGMENTS,
            });
        }

        Ok(ParamPath { segments })
    }
}

impl fmt::Display for ParamPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}
