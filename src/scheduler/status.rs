//! Lifecycle of the poll loop

use serde::{Deserialize, Serialize};

/// Whether a poll cycle is live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopStatus {
    /// No live cycle; waiting for an explicit trigger
    Idle,
    /// A cycle is fetching or sleeping until its next wake time
    Polling,
    /// Shut down; triggers are ignored
    Stopped,
}

impl LoopStatus {
    /// Check if this is a terminal state (no more cycles will run)
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopStatus::Stopped)
    }
}

impl std::fmt::Display for LoopStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopStatus::Idle => write!(f, "idle"),
            LoopStatus::Polling => write!(f, "polling"),
            LoopStatus::Stopped => write!(f, "stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!LoopStatus::Idle.is_terminal());
        assert!(!LoopStatus::Polling.is_terminal());
        assert!(LoopStatus::Stopped.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(LoopStatus::Polling.to_string(), "polling");
    }
}
