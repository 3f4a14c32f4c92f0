use serde::{Deserialize, Serialize};

/// Declaration order is urgency order, so `Ord` sorts low → critical.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    pub fn weight(self) -> f64 {
        match self {
            TaskPriority::Low => 0.2,
            TaskPriority::Medium => 0.5,
            TaskPriority::High => 0.8,
            TaskPriority::Critical => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Critical => "critical",
        }
    }

    pub fn is_high(self) -> bool {
        matches!(self, TaskPriority::High | TaskPriority::Critical)
    }
}
