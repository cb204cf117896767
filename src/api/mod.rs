//! Review service API - summary fetching behind a trait
//!
//! This module provides:
//! - Payload types for the summary and user endpoints
//! - `SummaryFetcher` trait for API abstraction
//! - `WaniKaniClient` implementation over reqwest
//! - `MockSummaryFetcher` for tests

pub mod client;
pub mod error;
pub mod types;
pub mod wanikani;

pub use client::{MockSummaryFetcher, SummaryFetcher};
pub use error::{FetchError, FetchErrorKind};
pub use types::{ReviewBatch, SummaryPayload, UserInfo};
pub use wanikani::{WaniKaniClient, WaniKaniConfig};
