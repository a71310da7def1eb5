//! Missed-booking tracking and penalty blocks.

use chrono::{DateTime, Months, Utc};
use dashmap::DashMap;

use crate::bookings::types::UserStanding;
use crate::policy::BookingPolicy;
use crate::rules::evaluator::{block_end, is_blocked};

#[derive(Debug, Clone, Default)]
struct Standing {
    misses: Vec<DateTime<Utc>>,
    block_start: Option<DateTime<Utc>>,
}

impl Standing {
    fn prune(&mut self, now: DateTime<Utc>) {
        let cutoff = month_before(now);
        self.misses.retain(|at| *at > cutoff);
    }
}

fn month_before(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(1)).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Per-user trailing-month miss counters and block windows.
#[derive(Default)]
pub struct PenaltyTracker {
    standings: DashMap<String, Standing>,
}

impl PenaltyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a miss at `now`. Returns true when it started a new block.
    pub fn record_miss(&self, user_id: &str, now: DateTime<Utc>, policy: &BookingPolicy) -> bool {
        let mut standing = self.standings.entry(user_id.to_string()).or_default();
        standing.misses.push(now);
        standing.prune(now);

        let threshold = policy.penalty.max_missed_bookings_per_month as usize;
        if standing.misses.len() >= threshold && !is_blocked(policy, now, standing.block_start) {
            standing.block_start = Some(now);
            tracing::warn!(
                user_id = %user_id,
                misses = standing.misses.len(),
                until = ?block_end(policy, now),
                "User blocked after missed bookings"
            );
            return true;
        }
        false
    }

    pub fn block_start(&self, user_id: &str) -> Option<DateTime<Utc>> {
        self.standings.get(user_id).and_then(|s| s.block_start)
    }

    pub fn standing(&self, user_id: &str, now: DateTime<Utc>, policy: &BookingPolicy) -> UserStanding {
        let (missed_this_month, block_start) = match self.standings.get(user_id) {
            Some(s) => {
                let cutoff = month_before(now);
                (s.misses.iter().filter(|at| **at > cutoff).count(), s.block_start)
            }
            None => (0, None),
        };

        let blocked = is_blocked(policy, now, block_start);
        let blocked_until = block_start
            .filter(|_| blocked)
            .and_then(|start| block_end(policy, start));

        UserStanding {
            user_id: user_id.to_string(),
            missed_this_month,
            block_start,
            blocked,
            blocked_until,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_block_after_threshold() {
        let policy = BookingPolicy::default();
        let tracker = PenaltyTracker::new();

        assert!(!tracker.record_miss("u1", now(), &policy));
        assert!(!tracker.record_miss("u1", now() + Duration::days(1), &policy));
        assert!(tracker.record_miss("u1", now() + Duration::days(2), &policy));

        assert_eq!(tracker.block_start("u1"), Some(now() + Duration::days(2)));
        assert!(tracker.block_start("u2").is_none());
    }

    #[test]
    fn test_old_misses_fall_out_of_window() {
        let policy = BookingPolicy::default();
        let tracker = PenaltyTracker::new();

        tracker.record_miss("u1", now(), &policy);
        tracker.record_miss("u1", now() + Duration::days(1), &policy);
        assert!(!tracker.record_miss("u1", now() + Duration::days(40), &policy));

        let standing = tracker.standing("u1", now() + Duration::days(40), &policy);
        assert_eq!(standing.missed_this_month, 1);
        assert!(standing.blocked_until.is_none());
    }

    #[test]
    fn test_miss_during_block_does_not_extend_it() {
        let policy = BookingPolicy::default();
        let tracker = PenaltyTracker::new();
        for day in 0..3 {
            tracker.record_miss("u1", now() + Duration::days(day), &policy);
        }
        let started = tracker.block_start("u1");

        assert!(!tracker.record_miss("u1", now() + Duration::days(4), &policy));
        assert_eq!(tracker.block_start("u1"), started);
    }

    #[test]
    fn test_standing_reports_block_until() {
        let policy = BookingPolicy::default();
        let tracker = PenaltyTracker::new();
        for _ in 0..3 {
            tracker.record_miss("u1", now(), &policy);
        }

        let standing = tracker.standing("u1", now() + Duration::days(1), &policy);
        assert_eq!(standing.missed_this_month, 3);
        assert!(standing.blocked);
        assert_eq!(standing.blocked_until, Some(now() + Duration::weeks(2)));

        let later = tracker.standing("u1", now() + Duration::weeks(3), &policy);
        assert_eq!(later.block_start, Some(now()));
        assert!(!later.blocked);
        assert!(later.blocked_until.is_none());
    }

    #[test]
    fn test_block_past_calendar_end_never_expires() {
        let mut policy = BookingPolicy::default();
        policy.penalty.max_missed_bookings_per_month = 1;
        policy.penalty.block_duration_weeks = u32::MAX;
        let tracker = PenaltyTracker::new();

        assert!(tracker.record_miss("u1", now(), &policy));
        assert!(!tracker.record_miss("u1", now() + Duration::days(1), &policy));

        let standing = tracker.standing("u1", now() + Duration::weeks(520), &policy);
        assert!(standing.blocked);
        assert!(standing.blocked_until.is_none());
        assert_eq!(standing.block_start, Some(now()));
    }
}
