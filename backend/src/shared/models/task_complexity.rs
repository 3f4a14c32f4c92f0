use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskComplexity {
    Simple,
    #[default]
    Medium,
    Complex,
}

impl TaskComplexity {
    /// Score adjustment: simple work gets a nudge up, complex work down.
    pub fn adjustment(self) -> f64 {
        match self {
            TaskComplexity::Simple => 0.1,
            TaskComplexity::Medium => 0.0,
            TaskComplexity::Complex => -0.1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskComplexity::Simple => "simple",
            TaskComplexity::Medium => "medium",
            TaskComplexity::Complex => "complex",
        }
    }
}
