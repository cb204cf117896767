//! reviewcount - adaptive polling of the WaniKani review summary
//!
//! Fetches the review summary, publishes how many reviews are available,
//! and picks the next poll time from what it learned: the top of the next
//! hour when the next batch is known, quickly while the user is reviewing,
//! and a slow retry after transient failures.

pub mod api;
pub mod clock;
pub mod connectivity;
pub mod credentials;
pub mod error;
pub mod reload_policy;
pub mod review_state;
pub mod scheduler;

pub use error::{Result, ReviewCountError};
