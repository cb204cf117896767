//! Review state derived from a fetched summary, and the value published to
//! consumers after every poll cycle.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{FetchErrorKind, SummaryPayload};

/// Reviews available at the evaluation instant plus the next known batch time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSnapshot {
    pub available_subject_ids: BTreeSet<i64>,
    pub next_reviews_at: Option<DateTime<Utc>>,
}

impl ReviewSnapshot {
    /// Fold every batch available at or before `now` into the available set.
    ///
    /// `next_reviews_at` is taken from the source as-is.
    pub fn from_summary(summary: &SummaryPayload, now: DateTime<Utc>) -> Self {
        let available_subject_ids = summary
            .reviews
            .iter()
            .filter(|batch| batch.available_at <= now)
            .flat_map(|batch| batch.subject_ids.iter().copied())
            .collect();

        Self {
            available_subject_ids,
            next_reviews_at: summary.next_reviews_at,
        }
    }

    pub fn available_count(&self) -> usize {
        self.available_subject_ids.len()
    }

    pub fn has_available(&self) -> bool {
        !self.available_subject_ids.is_empty()
    }
}

/// Published review count state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReviewCountInfo {
    /// Nothing loaded, or no credential configured
    #[default]
    Unloaded,
    /// The last fetch failed
    Error { kind: FetchErrorKind },
    /// The last fetch succeeded
    Loaded(ReviewSnapshot),
}

impl ReviewCountInfo {
    /// True when both states are loaded and this one's available set is a
    /// strict subset of `previous`, meaning reviews were completed in between.
    pub fn has_reviewed_subjects(&self, previous: &ReviewCountInfo) -> bool {
        match (previous, self) {
            (ReviewCountInfo::Loaded(previous), ReviewCountInfo::Loaded(next)) => {
                next.available_subject_ids.len() < previous.available_subject_ids.len()
                    && next.available_subject_ids.is_subset(&previous.available_subject_ids)
            }
            _ => false,
        }
    }

    pub fn snapshot(&self) -> Option<&ReviewSnapshot> {
        match self {
            ReviewCountInfo::Loaded(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ReviewCountInfo::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn loaded(ids: &[i64]) -> ReviewCountInfo {
        ReviewCountInfo::Loaded(ReviewSnapshot {
            available_subject_ids: ids.iter().copied().collect(),
            next_reviews_at: None,
        })
    }

    #[test]
    fn test_from_summary_folds_past_batches() {
        let now = Utc::now();
        let next = now + TimeDelta::hours(3);
        let summary = SummaryPayload::new(now)
            .with_next_reviews_at(next)
            .with_batch(now - TimeDelta::seconds(10), [1, 2])
            .with_batch(now + TimeDelta::seconds(10), [3]);

        let snapshot = ReviewSnapshot::from_summary(&summary, now);

        assert_eq!(snapshot.available_subject_ids, BTreeSet::from([1, 2]));
        assert_eq!(snapshot.next_reviews_at, Some(next));
        assert_eq!(snapshot.available_count(), 2);
    }

    #[test]
    fn test_from_summary_includes_batch_due_exactly_now() {
        let now = Utc::now();
        let summary = SummaryPayload::new(now).with_batch(now, [7]);
        let snapshot = ReviewSnapshot::from_summary(&summary, now);
        assert!(snapshot.available_subject_ids.contains(&7));
    }

    #[test]
    fn test_from_summary_unions_overlapping_batches() {
        let now = Utc::now();
        let summary = SummaryPayload::new(now)
            .with_batch(now - TimeDelta::hours(2), [1, 2])
            .with_batch(now - TimeDelta::hours(1), [2, 3]);

        let snapshot = ReviewSnapshot::from_summary(&summary, now);
        assert_eq!(snapshot.available_subject_ids, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_from_summary_passes_next_reviews_through() {
        // An already-past next_reviews_at is not recomputed
        let now = Utc::now();
        let stale = now - TimeDelta::minutes(30);
        let summary = SummaryPayload::new(now).with_next_reviews_at(stale);
        let snapshot = ReviewSnapshot::from_summary(&summary, now);
        assert_eq!(snapshot.next_reviews_at, Some(stale));
        assert!(!snapshot.has_available());
    }

    #[test]
    fn test_has_reviewed_subjects_strict_subset() {
        assert!(loaded(&[1]).has_reviewed_subjects(&loaded(&[1, 2, 3])));
        assert!(loaded(&[]).has_reviewed_subjects(&loaded(&[4])));
    }

    #[test]
    fn test_has_reviewed_subjects_unchanged() {
        assert!(!loaded(&[1, 2, 3]).has_reviewed_subjects(&loaded(&[1, 2, 3])));
    }

    #[test]
    fn test_has_reviewed_subjects_not_subset() {
        assert!(!loaded(&[1, 2, 4]).has_reviewed_subjects(&loaded(&[1, 2, 3])));
        assert!(!loaded(&[1, 2, 3, 4]).has_reviewed_subjects(&loaded(&[1, 2, 3])));
    }

    #[test]
    fn test_has_reviewed_subjects_requires_two_loaded_states() {
        let error = ReviewCountInfo::Error {
            kind: FetchErrorKind::Network,
        };
        assert!(!loaded(&[1]).has_reviewed_subjects(&ReviewCountInfo::Unloaded));
        assert!(!loaded(&[1]).has_reviewed_subjects(&error));
        assert!(!ReviewCountInfo::Unloaded.has_reviewed_subjects(&loaded(&[1, 2])));
    }

    #[test]
    fn test_default_is_unloaded() {
        assert_eq!(ReviewCountInfo::default(), ReviewCountInfo::Unloaded);
        assert!(ReviewCountInfo::default().snapshot().is_none());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_value(ReviewCountInfo::Error {
            kind: FetchErrorKind::Unauthorized,
        })
        .unwrap();
        assert_eq!(json["state"], "error");
        assert_eq!(json["kind"], "unauthorized");
    }
}
