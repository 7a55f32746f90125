use serde::Serialize;

/// Connection state as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Closed,
    Error { code: String, reason: Option<String> },
}

impl ConnectionStatus {
    /// Status line text; `None` hides the status line.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Connecting => Some("Connecting...".to_owned()),
            Self::Connected => None,
            Self::Closed => Some("Connection closed".to_owned()),
            Self::Error { code, reason: Some(reason) } => Some(format!("Error: {code} ({reason})")),
            Self::Error { code, reason: None } => Some(format!("Error: {code}")),
        }
    }
}
