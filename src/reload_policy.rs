//! Reload policy - decides when the summary should be fetched again
//!
//! A policy is a cadence class, not a duration. `ReloadPolicy::date` turns it
//! into a concrete wake instant, and `wake_at` applies the minimum-delay clamp
//! that keeps the poll loop from spinning.

use chrono::{DateTime, TimeDelta, TimeZone, Timelike, Utc};

/// Shortest sleep the poll loop accepts before substituting the fallback delay
pub const MINIMUM_SLEEP: TimeDelta = TimeDelta::seconds(1);

/// Delay used while the user is actively reviewing
pub const FAST_SLEEP: TimeDelta = TimeDelta::seconds(15);

/// Steady-state idle delay
pub const REGULAR_SLEEP: TimeDelta = TimeDelta::minutes(5);

/// Delay after a transient failure, and the clamp substitute
pub const FALLBACK_SLEEP: TimeDelta = TimeDelta::minutes(15);

/// Window during which user activity counts as recent
pub const RECENT_ACTIVITY: TimeDelta = TimeDelta::minutes(5);

/// Cadence class governing when the next poll happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReloadPolicy {
    /// Do not reschedule automatically
    None,
    /// Next batch is known; check again at the top of the next hour
    NextHour,
    /// Idle polling
    Regular,
    /// The user is active; poll quickly to reflect progress
    Fast,
    /// Retry after a transient failure
    Fallback,
}

impl ReloadPolicy {
    /// Pick a policy from the next known availability time and recent activity.
    ///
    /// First matching rule wins: a future `next_reviews_at` means `NextHour`,
    /// activity within the last five minutes means `Fast`, otherwise `Regular`.
    pub fn decide(
        next_reviews_at: Option<DateTime<Utc>>,
        last_activity_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        if next_reviews_at.is_some_and(|next| next > now) {
            ReloadPolicy::NextHour
        } else if last_activity_at.is_some_and(|last| now - last < RECENT_ACTIVITY) {
            ReloadPolicy::Fast
        } else {
            ReloadPolicy::Regular
        }
    }

    /// Concrete wake instant for this policy, measured from `since`.
    ///
    /// `NextHour` uses the hour boundaries of `calendar`, so zones with a
    /// non-whole-hour offset wake at their own minute zero.
    pub fn date<Tz: TimeZone>(&self, since: DateTime<Utc>, calendar: &Tz) -> Option<DateTime<Utc>> {
        match self {
            ReloadPolicy::None => None,
            ReloadPolicy::NextHour => next_hour_after(since + MINIMUM_SLEEP, calendar),
            ReloadPolicy::Regular => Some(since + REGULAR_SLEEP),
            ReloadPolicy::Fast => Some(since + FAST_SLEEP),
            ReloadPolicy::Fallback => Some(since + FALLBACK_SLEEP),
        }
    }

    /// Wake instant with the minimum-delay clamp applied.
    ///
    /// Returns `None` only for `ReloadPolicy::None`. Any other policy whose
    /// date is missing or not more than `MINIMUM_SLEEP` ahead of `now` wakes
    /// after `FALLBACK_SLEEP` instead.
    pub fn wake_at<Tz: TimeZone>(&self, now: DateTime<Utc>, calendar: &Tz) -> Option<DateTime<Utc>> {
        if *self == ReloadPolicy::None {
            return None;
        }

        match self.date(now, calendar) {
            Some(date) if date - now > MINIMUM_SLEEP => Some(date),
            _ => Some(now + FALLBACK_SLEEP),
        }
    }

    /// Whether the loop keeps polling on its own
    pub fn reschedules(&self) -> bool {
        *self != ReloadPolicy::None
    }
}

impl std::fmt::Display for ReloadPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReloadPolicy::None => "none",
            ReloadPolicy::NextHour => "next-hour",
            ReloadPolicy::Regular => "regular",
            ReloadPolicy::Fast => "fast",
            ReloadPolicy::Fallback => "fallback",
        };
        write!(f, "{}", name)
    }
}

/// First minute-zero boundary of `calendar` strictly after `after`
fn next_hour_after<Tz: TimeZone>(after: DateTime<Utc>, calendar: &Tz) -> Option<DateTime<Utc>> {
    let local = after.with_timezone(calendar);
    let hour_start = local.with_minute(0)?.with_second(0)?.with_nanosecond(0)?;
    Some((hour_start + TimeDelta::hours(1)).with_timezone(&Utc))
}
