//! Dotted version numbers (`1.0.74`).

use std::fmt;
use std::str::FromStr;

/// A pod version: one or more non-negative integer segments.
///
/// Ordering compares segment by segment; when one version is a prefix of
/// the other, the shorter one sorts first (`1.0 < 1.0.1`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Version {
    segments: Vec<u32>,
}

/// Error when a version string is malformed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseVersionError {
    input: String,
}

impl fmt::Display for ParseVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid version '{}'", self.input)
    }
}

impl std::error::Error for ParseVersionError {}

impl Version {
    /// The version reported by pods that declare none.
    pub fn zero() -> Self {
        Self { segments: vec![0] }
    }

    /// Build from raw segments; returns `None` for an empty list.
    pub fn from_segments(segments: Vec<u32>) -> Option<Self> {
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    pub fn segments(&self) -> &[u32] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<u32> {
        self.segments.get(index).copied()
    }

    pub fn major(&self) -> u32 {
        self.segments.first().copied().unwrap_or(0)
    }

    pub fn minor(&self) -> Option<u32> {
        self.segment(1)
    }

    pub fn build(&self) -> Option<u32> {
        self.segment(2)
    }

    pub fn patch(&self) -> Option<u32> {
        self.segment(3)
    }

    /// True if every segment of `self` equals the same segment of `other`.
    ///
    /// `1.2` is a prefix of `1.2.7` but not of `1.3` or `1`.
    pub fn is_prefix_of(&self, other: &Version) -> bool {
        self.segments.len() <= other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a == b)
    }
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionError {
            input: s.to_string(),
        };
        let mut segments = Vec::new();
        for part in s.split('.') {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            segments.push(part.parse::<u32>().map_err(|_| err())?);
        }
        Ok(Self { segments })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}
