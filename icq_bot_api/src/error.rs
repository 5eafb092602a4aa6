/// Everything that can go wrong when talking to the bot API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection failure, timeout, non-2xx status or a body that isn't JSON.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("bad API URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The event handed to [`crate::Bot::accept_click`] has no `payload.queryId`.
    #[error("event does not carry a callback query ID")]
    NoQueryId,

    /// Failure reported by a transport that isn't [`crate::HttpTransport`].
    #[error("transport error: {0}")]
    Transport(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What event handlers return. Errors are logged and otherwise ignored.
pub type HandlerResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
