//! Security event severity levels.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Severity level for security events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecuritySeverity {
    /// Low-impact events that may warrant review.
    Low,
    /// Medium-impact events requiring attention.
    Medium,
    /// High-impact events requiring immediate review.
    High,
    /// Critical security events.
    Critical,
}

impl SecuritySeverity {
    /// Numeric value for comparison (higher = more severe).
    pub fn level(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Critical => 3,
        }
    }

    /// Check if this severity meets a minimum threshold.
    pub fn meets_threshold(&self, threshold: Self) -> bool {
        self.level() >= threshold.level()
    }
}

impl PartialOrd for SecuritySeverity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SecuritySeverity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level().cmp(&other.level())
    }
}

impl Default for SecuritySeverity {
    fn default() -> Self {
        Self::Low
    }
}
