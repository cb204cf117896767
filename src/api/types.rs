//! Data shapes consumed from the remote API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upstream snapshot of due and upcoming review batches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryPayload {
    pub data_updated_at: DateTime<Utc>,
    pub next_reviews_at: Option<DateTime<Utc>>,
    pub reviews: Vec<ReviewBatch>,
}

impl SummaryPayload {
    pub fn new(data_updated_at: DateTime<Utc>) -> Self {
        Self {
            data_updated_at,
            next_reviews_at: None,
            reviews: Vec::new(),
        }
    }

    pub fn with_next_reviews_at(mut self, next_reviews_at: DateTime<Utc>) -> Self {
        self.next_reviews_at = Some(next_reviews_at);
        self
    }

    pub fn with_batch(mut self, available_at: DateTime<Utc>, subject_ids: impl IntoIterator<Item = i64>) -> Self {
        self.reviews.push(ReviewBatch {
            available_at,
            subject_ids: subject_ids.into_iter().collect(),
        });
        self
    }
}

/// Subjects that become reviewable at the same instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewBatch {
    pub available_at: DateTime<Utc>,
    pub subject_ids: Vec<i64>,
}

/// Account details returned when a token is validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    pub level: u32,
}
