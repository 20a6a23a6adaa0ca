//! Venue/date conflict detection.
//!
//! The caller supplies the non-cancelled sessions already booked at one
//! `(venue, date)` slot (the store query excludes cancelled rows) and the
//! candidate interval. All colliding sessions are returned, not just the
//! first, so the admin UI can show which bookings are in the way.

use crate::api::SessionId;
use crate::models::interval::TimeInterval;
use crate::models::session::Session;

/// Return every existing session whose interval overlaps `candidate`.
///
/// `exclude` omits one session from the comparison set; used when editing
/// a session so it never conflicts with itself. An empty result means the
/// candidate is safe to persist for that venue and date.
pub fn find_conflicts<'a>(
    candidate: &TimeInterval,
    existing: &'a [Session],
    exclude: Option<SessionId>,
) -> Vec<&'a Session> {
    existing
        .iter()
        .filter(|session| Some(session.id) != exclude)
        .filter(|session| !session.cancelled)
        .filter(|session| session.interval.overlaps(candidate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BatchId, VenueId};
    use chrono::{NaiveDate, NaiveTime};

    fn iv(sh: u32, eh: u32) -> TimeInterval {
        TimeInterval::new(
            NaiveTime::from_hms_opt(sh, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(eh, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn session(id: i64, interval: TimeInterval, cancelled: bool) -> Session {
        Session {
            id: SessionId::new(id),
            batch_id: BatchId::new(1),
            venue_id: VenueId::new(1),
            date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            interval,
            topic: "Aptitude".to_string(),
            trainer: "R. Iyer".to_string(),
            cancelled,
        }
    }

    #[test]
    fn test_empty_slot_has_no_conflicts() {
        assert!(find_conflicts(&iv(9, 10), &[], None).is_empty());
    }

    #[test]
    fn test_overlapping_session_is_reported() {
        let existing = vec![session(1, iv(9, 10), false)];
        let conflicts = find_conflicts(&iv(9, 11), &existing, None);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].id, SessionId::new(1));
    }

    #[test]
    fn test_all_collisions_are_returned() {
        let existing = vec![
            session(1, iv(9, 10), false),
            session(2, iv(10, 12), false),
            session(3, iv(14, 15), false),
        ];
        let conflicts = find_conflicts(&iv(9, 11), &existing, None);
        let ids: Vec<i64> = conflicts.iter().map(|s| s.id.value()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_back_to_back_sessions_do_not_conflict() {
        let existing = vec![session(1, iv(9, 10), false)];
        assert!(find_conflicts(&iv(10, 11), &existing, None).is_empty());
    }

    #[test]
    fn test_cancelled_sessions_never_conflict() {
        let existing = vec![session(1, iv(9, 10), true)];
        assert!(find_conflicts(&iv(9, 10), &existing, None).is_empty());
    }

    #[test]
    fn test_excluded_session_is_skipped() {
        let existing = vec![session(1, iv(9, 10), false)];
        let conflicts = find_conflicts(&iv(9, 10), &existing, Some(SessionId::new(1)));
        assert!(conflicts.is_empty());
    }
}
