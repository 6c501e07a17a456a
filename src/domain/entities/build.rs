//! Remote project build identity and status

use serde::{Deserialize, Serialize};

/// Identifier of a provisioned remote build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildId(pub u64);

impl std::fmt::Display for BuildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Status of a remote build as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    Pending,
    Enqueued,
    Building,
    Success,
    Failure,
    /// Any other status string; treated as terminal
    Other(String),
}

impl BuildStatus {
    /// Parse the backend's upper-case status string
    pub fn parse(status: &str) -> Self {
        match status.to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "ENQUEUED" | "QUEUED" => Self::Enqueued,
            "BUILDING" | "IN_PROGRESS" => Self::Building,
            "SUCCESS" => Self::Success,
            "FAILURE" | "FAILED" => Self::Failure,
            _ => Self::Other(status.to_string()),
        }
    }

    /// Whether polling can stop
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Enqueued | Self::Building)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Enqueued => write!(f, "ENQUEUED"),
            Self::Building => write!(f, "BUILDING"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Failure => write!(f, "FAILURE"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}
