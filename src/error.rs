use thiserror::Error;

/// Failures talking to one of the remote endpoints.
///
/// These never escape an event handler: the orchestrator and the
/// notification dispatcher log them and fold them into an outcome.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Request could not be sent or the response could not be received.
    #[error("request to {endpoint} failed: {reason}")]
    Network { endpoint: String, reason: String },

    /// Endpoint answered with a non-success status.
    #[error("{endpoint} responded with HTTP {status}")]
    Http { endpoint: String, status: u16 },

    /// Response body was not in the expected shape.
    #[error("unexpected response from {endpoint}: {reason}")]
    Parse { endpoint: String, reason: String },
}

/// Contact data rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("both email and phone are empty")]
    MissingContact,

    #[error("invalid email format: {0}")]
    InvalidEmail(String),

    #[error("page is missing the {0} query parameter")]
    MissingPageIdentity(&'static str),
}

/// No email or phone field could be found in the searched scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("scope has no trackable email or phone field")]
pub struct NotTrackable;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Identification(#[from] NotTrackable),

    #[error("invalid page fixture: {0}")]
    Fixture(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
