use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Error returned when an interval's end does not come after its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid interval: end {end} must be after start {start}")]
pub struct InvalidInterval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Half-open time interval `[start, end)` within a single day.
///
/// The constructor enforces `start < end`, and deserialization goes
/// through the same check, so a value of this type always denotes a
/// non-empty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInterval", into = "RawInterval")]
pub struct TimeInterval {
    start: NaiveTime,
    end: NaiveTime,
}

/// Unvalidated wire form of [`TimeInterval`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawInterval {
    start: NaiveTime,
    end: NaiveTime,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = InvalidInterval;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        TimeInterval::new(raw.start, raw.end)
    }
}

impl From<TimeInterval> for RawInterval {
    fn from(interval: TimeInterval) -> Self {
        RawInterval {
            start: interval.start,
            end: interval.end,
        }
    }
}

impl TimeInterval {
    /// Create a new interval, rejecting empty or inverted ranges.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, InvalidInterval> {
        if end <= start {
            return Err(InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// True iff the two intervals share at least one instant.
    ///
    /// Two intervals fail to overlap only when one ends at or before the
    /// other begins, so an interval ending at `T` and one starting at `T`
    /// are both schedulable.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Interval length in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

impl std::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn iv(sh: u32, sm: u32, eh: u32, em: u32) -> TimeInterval {
        TimeInterval::new(t(sh, sm), t(eh, em)).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        let err = TimeInterval::new(t(10, 0), t(9, 0)).unwrap_err();
        assert_eq!(err.start, t(10, 0));
        assert_eq!(err.end, t(9, 0));
    }

    #[test]
    fn test_new_rejects_empty_range() {
        assert!(TimeInterval::new(t(9, 0), t(9, 0)).is_err());
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = iv(9, 0, 11, 0);
        let b = iv(10, 0, 12, 0);
        assert_eq!(a.overlaps(&b), b.overlaps(&a));
        assert!(a.overlaps(&b));
    }

    #[test]
    fn test_no_overlap_at_shared_boundary() {
        // 09:00-10:00 and 10:00-11:00 are both schedulable
        let first = iv(9, 0, 10, 0);
        let second = iv(10, 0, 11, 0);
        assert!(!first.overlaps(&second));
        assert!(!second.overlaps(&first));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = iv(9, 0, 12, 0);
        let inner = iv(10, 0, 11, 0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_disjoint_intervals_do_not_overlap() {
        let morning = iv(9, 0, 10, 0);
        let afternoon = iv(14, 0, 15, 30);
        assert!(!morning.overlaps(&afternoon));
    }

    #[test]
    fn test_duration_minutes() {
        assert_eq!(iv(9, 0, 10, 30).duration_minutes(), 90);
    }

    #[test]
    fn test_display_format() {
        assert_eq!(iv(9, 5, 10, 0).to_string(), "09:05-10:00");
    }

    #[test]
    fn test_serde_roundtrip_keeps_invariant() {
        let interval = iv(9, 0, 10, 0);
        let json = serde_json::to_string(&interval).unwrap();
        let back: TimeInterval = serde_json::from_str(&json).unwrap();
        assert_eq!(back, interval);
    }

    #[test]
    fn test_deserialize_rejects_inverted_range() {
        let json = r#"{"start":"11:00:00","end":"10:00:00"}"#;
        let result: Result<TimeInterval, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
