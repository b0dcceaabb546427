//! Bridge error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Host is not an absolute URL.
    #[error("invalid host `{0}`: {1}")]
    InvalidHost(String, #[source] url::ParseError),

    /// Host cannot carry a path (e.g. `mailto:`).
    #[error("host `{0}` cannot be used as a base URL")]
    NotABase(String),

    /// Message could not be parsed or serialized.
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    /// The transport refused or lost the message.
    #[error("failed to deliver message: {0}")]
    Send(String),
}
