//! Timeline - Ordered history of sealed revisions
//!
//! Revision `n` lives at index `n - 1`. Timestamps are non-decreasing, which
//! is what makes the binary-search lookups below valid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RevisionNumber;

/// Number and creation time of one sealed revision.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RevisionInfo {
    /// Revision number.
    pub number: RevisionNumber,
    /// Time at which the revision was sealed.
    pub timestamp: DateTime<Utc>,
}

/// The sealed revisions of one resource, in commit order.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    revisions: Vec<RevisionInfo>,
}

impl Timeline {
    /// Creates an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the next revision sealed at `timestamp`.
    ///
    /// Returns `None` without appending if `timestamp` is earlier than the
    /// latest revision's timestamp.
    pub fn push(&mut self, timestamp: DateTime<Utc>) -> Option<RevisionNumber> {
        let number = match self.latest() {
            Some(latest) if timestamp < latest.timestamp => return None,
            Some(latest) => latest.number.next(),
            None => RevisionNumber::FIRST,
        };
        self.revisions.push(RevisionInfo { number, timestamp });
        Some(number)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    /// Returns all revisions in commit order.
    pub fn revisions(&self) -> &[RevisionInfo] {
        &self.revisions
    }

    /// Returns the most recent revision.
    pub fn latest(&self) -> Option<RevisionInfo> {
        self.revisions.last().copied()
    }

    /// Looks up one revision by number.
    pub fn get(&self, number: RevisionNumber) -> Option<RevisionInfo> {
        self.revisions.get(number.value() as usize - 1).copied()
    }

    /// Latest revision whose timestamp is not after `point_in_time`.
    ///
    /// `None` when `point_in_time` precedes the first revision.
    pub fn floor(&self, point_in_time: DateTime<Utc>) -> Option<RevisionInfo> {
        let idx = self
            .revisions
            .partition_point(|r| r.timestamp <= point_in_time);
        idx.checked_sub(1).map(|i| self.revisions[i])
    }

    /// Revision whose timestamp is closest to `point_in_time`.
    ///
    /// Ties go to the later revision. The answer is always either the floor
    /// or the revision right after it, so it may lie after `point_in_time`.
    pub fn nearest(&self, point_in_time: DateTime<Utc>) -> Option<RevisionInfo> {
        let idx = self
            .revisions
            .partition_point(|r| r.timestamp <= point_in_time);

        let below = idx.checked_sub(1).map(|i| self.revisions[i]);
        let above = self.revisions.get(idx).copied();

        match (below, above) {
            (Some(b), Some(a)) => {
                if point_in_time - b.timestamp < a.timestamp - point_in_time {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (Some(b), None) => Some(b),
            (None, a) => a,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn timeline(stamps: &[i64]) -> Timeline {
        let mut t = Timeline::new();
        for s in stamps {
            t.push(at(*s)).unwrap();
        }
        t
    }

    fn number(info: Option<RevisionInfo>) -> Option<u32> {
        info.map(|r| r.number.value())
    }

    #[test]
    fn test_push_assigns_sequential_numbers() {
        let mut t = Timeline::new();
        assert_eq!(t.push(at(10)).map(|r| r.value()), Some(1));
        assert_eq!(t.push(at(20)).map(|r| r.value()), Some(2));
        assert_eq!(t.push(at(20)).map(|r| r.value()), Some(3));
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn test_push_rejects_time_going_backwards() {
        let mut t = timeline(&[10, 20]);
        assert!(t.push(at(15)).is_none());
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_floor_lookup() {
        let t = timeline(&[10, 20, 30]);
        assert_eq!(number(t.floor(at(5))), None);
        assert_eq!(number(t.floor(at(10))), Some(1));
        assert_eq!(number(t.floor(at(25))), Some(2));
        assert_eq!(number(t.floor(at(30))), Some(3));
        assert_eq!(number(t.floor(at(99))), Some(3));
    }

    #[test]
    fn test_nearest_lookup() {
        let t = timeline(&[10, 20, 30]);
        assert_eq!(number(t.nearest(at(5))), Some(1));
        assert_eq!(number(t.nearest(at(22))), Some(2));
        assert_eq!(number(t.nearest(at(25))), Some(3));
        assert_eq!(number(t.nearest(at(28))), Some(3));
        assert_eq!(number(t.nearest(at(99))), Some(3));
    }

    #[test]
    fn test_nearest_is_never_more_than_one_past_floor() {
        let t = timeline(&[10, 20, 30, 45, 46, 90]);
        for s in 10..120 {
            let floor = t.floor(at(s)).unwrap().number.value();
            let nearest = t.nearest(at(s)).unwrap().number.value();
            assert!(nearest == floor || nearest == floor + 1, "t={}", s);
        }
    }

    #[test]
    fn test_empty_timeline() {
        let t = Timeline::new();
        assert!(t.is_empty());
        assert!(t.latest().is_none());
        assert!(t.floor(at(1)).is_none());
        assert!(t.nearest(at(1)).is_none());
    }
}
