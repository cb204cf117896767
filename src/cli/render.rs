//! Terminal rendering of review states.

use chrono::{DateTime, Local, Utc};
use colored::*;
use reviewcount::review_state::ReviewCountInfo;

/// One-line summary of a published state
pub fn describe(info: &ReviewCountInfo) -> String {
    match info {
        ReviewCountInfo::Unloaded => "Not logged in (run `reviewcount login <TOKEN>`)".to_string(),
        ReviewCountInfo::Error { kind } => format!("Error checking reviews: {}", kind),
        ReviewCountInfo::Loaded(snapshot) => {
            let count = snapshot.available_count();
            let next = snapshot
                .next_reviews_at
                .map(|next| format!("Next reviews: {}", local_time(next)));
            match (count, next) {
                (0, Some(next)) => next,
                (0, None) => "No reviews scheduled".to_string(),
                (1, next) => with_next("1 review available".to_string(), next),
                (count, next) => with_next(format!("{} reviews available", count), next),
            }
        }
    }
}

fn with_next(line: String, next: Option<String>) -> String {
    match next {
        Some(next) => format!("{}. {}", line, next),
        None => line,
    }
}

/// Colored form of [`describe`] for interactive output
pub fn colored_line(info: &ReviewCountInfo) -> ColoredString {
    let line = describe(info);
    match info {
        ReviewCountInfo::Unloaded => line.yellow(),
        ReviewCountInfo::Error { .. } => line.red(),
        ReviewCountInfo::Loaded(snapshot) if snapshot.has_available() => line.green().bold(),
        ReviewCountInfo::Loaded(_) => line.cyan(),
    }
}

pub fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
