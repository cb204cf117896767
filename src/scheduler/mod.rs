//! Adaptive reload scheduler
//!
//! The scheduler runs a repeating cycle:
//! 1. Read the API token; without one, publish `Unloaded` and stop
//! 2. Fetch the summary and derive the review snapshot
//! 3. Pick a reload policy from the snapshot, recent activity, or the error
//! 4. Publish the new state and sleep until the policy's wake time
//!
//! External triggers restart the cycle; only one cycle is ever live.

pub mod poll_loop;
pub mod status;

pub use poll_loop::ReviewScheduler;
pub use status::LoopStatus;
