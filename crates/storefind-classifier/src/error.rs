use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classifier returned status {status}")]
    Status { status: u16 },

    #[error("classifier response parse error: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("classifier returned no category")]
    EmptyResponse,

    #[error("classifier is disabled (no API key configured)")]
    Disabled,

    #[error("invalid classifier base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
