//! Activity severity levels.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{Display, EnumIter, EnumString};

/// Severity attached to an activity log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ActivitySeverity {
    /// Routine operations.
    #[default]
    Info,
    /// Something worth a second look.
    Warning,
    /// A failed operation.
    Error,
    /// Security relevant or destructive events.
    Critical,
}

impl ActivitySeverity {
    /// Numeric rank (higher = more severe).
    pub fn level(&self) -> u8 {
        match self {
            Self::Info => 0,
            Self::Warning => 1,
            Self::Error => 2,
            Self::Critical => 3,
        }
    }

    /// Check if this severity meets a minimum threshold.
    pub fn meets_threshold(&self, threshold: Self) -> bool {
        self.level() >= threshold.level()
    }
}

impl PartialOrd for ActivitySeverity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ActivitySeverity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level().cmp(&other.level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_ordering_follows_level() {
        let all: Vec<_> = ActivitySeverity::iter().collect();
        let mut sorted = all.clone();
        sorted.sort();
        assert_eq!(all, sorted);
        assert!(ActivitySeverity::Critical > ActivitySeverity::Warning);
    }

    #[test]
    fn test_threshold() {
        assert!(ActivitySeverity::Error.meets_threshold(ActivitySeverity::Warning));
        assert!(ActivitySeverity::Info.meets_threshold(ActivitySeverity::Info));
        assert!(!ActivitySeverity::Info.meets_threshold(ActivitySeverity::Error));
    }

    #[test]
    fn test_string_forms() {
        assert_eq!(ActivitySeverity::Warning.to_string(), "warning");
        assert_eq!(ActivitySeverity::from_str("CRITICAL").unwrap(), ActivitySeverity::Critical);
        assert_eq!(serde_json::to_string(&ActivitySeverity::Error).unwrap(), "\"error\"");
    }
}
