use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a prediction or training.
///
/// `starting -> processing -> {succeeded | failed | canceled}`. Transitions
/// are only ever observed from server responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    /// Waiting for a worker
    Starting,
    /// Running
    Processing,
    /// Finished with output
    Succeeded,
    /// Finished with an error
    Failed,
    /// Stopped on request
    Canceled,
    /// A status this client does not know
    Unknown(String),
}

impl Status {
    /// Parse a raw status string. Unrecognized values are kept verbatim.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "starting" => Self::Starting,
            "processing" => Self::Processing,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Starting => "starting",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Unknown(raw) => raw,
        }
    }

    /// `starting` or `processing`.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Starting | Self::Processing)
    }

    /// `succeeded`, `failed` or `canceled`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    /// Human readable description.
    pub fn description(&self) -> String {
        match self {
            Self::Starting => "Starting execution".to_string(),
            Self::Processing => "Processing".to_string(),
            Self::Succeeded => "Completed successfully".to_string(),
            Self::Failed => "Failed".to_string(),
            Self::Canceled => "Canceled".to_string(),
            Self::Unknown(raw) => format!("Unknown status: {raw}"),
        }
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
