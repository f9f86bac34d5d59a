use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Form input the user can fix and resubmit
    #[error("{0}")]
    Validation(String),
    /// HTTP or socket failure
    #[error("{0}")]
    Network(String),
    /// Payload that could not be encoded or decoded
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("DOM error: {0}")]
    Dom(String),
}

impl ClientError {
    /// Wrap a transport failure with the operation that hit it
    pub fn network(context: &str, detail: impl std::fmt::Display) -> Self {
        ClientError::Network(format!("{}: {}", context, detail))
    }
}
