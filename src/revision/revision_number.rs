//! RevisionNumber - Sequential revision identity
//!
//! Revision numbers start at 1 and increase by one per sealed revision.
//! `RevisionRef` is what callers pass in: `-1` on the wire means "latest".

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The number of a sealed revision.
///
/// The first revision of every resource is `RevisionNumber::FIRST`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct RevisionNumber(u32);

/// Revision 0 does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("revision numbers start at 1")]
pub struct ZeroRevision;

impl RevisionNumber {
    /// The first revision of any resource.
    pub const FIRST: RevisionNumber = RevisionNumber(1);

    /// Creates a revision number.
    ///
    /// Returns `None` for 0, which is not a valid revision.
    pub fn new(value: u32) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Returns the underlying value.
    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The revision immediately before this one, if any.
    pub fn previous(&self) -> Option<Self> {
        Self::new(self.0 - 1)
    }

    /// The revision immediately after this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns true for the first revision.
    #[inline]
    pub fn is_first(&self) -> bool {
        self.0 == 1
    }
}

impl TryFrom<u32> for RevisionNumber {
    type Error = ZeroRevision;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ZeroRevision)
    }
}

impl From<RevisionNumber> for u32 {
    fn from(number: RevisionNumber) -> Self {
        number.0
    }
}

impl fmt::Display for RevisionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A revision as requested by a caller.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RevisionRef {
    /// Whatever the most recent revision is when the request is served.
    Latest,
    /// An exact revision number.
    Exact(RevisionNumber),
}

impl RevisionRef {
    /// Raw value used by callers to ask for the latest revision.
    pub const LATEST_RAW: i64 = -1;

    /// Maps the reference onto a concrete number given the current latest.
    pub fn resolve(self, most_recent: RevisionNumber) -> RevisionNumber {
        match self {
            RevisionRef::Latest => most_recent,
            RevisionRef::Exact(number) => number,
        }
    }
}

impl From<RevisionNumber> for RevisionRef {
    fn from(number: RevisionNumber) -> Self {
        RevisionRef::Exact(number)
    }
}

impl TryFrom<i64> for RevisionRef {
    type Error = i64;

    /// `-1` maps to `Latest`, positive values to an exact revision.
    /// Any other value is handed back as the error.
    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        if raw == Self::LATEST_RAW {
            return Ok(RevisionRef::Latest);
        }
        u32::try_from(raw)
            .ok()
            .and_then(RevisionNumber::new)
            .map(RevisionRef::Exact)
            .ok_or(raw)
    }
}

impl fmt::Display for RevisionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevisionRef::Latest => write!(f, "latest"),
            RevisionRef::Exact(number) => write!(f, "{}", number),
        }
    }
}
