use thiserror::Error;

/// Result type for hfgen operations
pub type Result<T> = std::result::Result<T, HfError>;

/// Errors surfaced by the inference client and its setup code
#[derive(Error, Debug)]
pub enum HfError {
    /// No credential in the secrets file or the environment. Fatal at startup.
    #[error("no Hugging Face token found; set HF_TOKEN in the secrets file or the environment")]
    MissingCredential,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Non-success, non-transient response. 503/504 never reaches this variant;
    /// everything else (including 200 with a non-image content-type) does.
    #[error("inference API error: status={status}, content-type={content_type}, body={body}")]
    Transport {
        status: u16,
        content_type: String,
        body: String,
    },

    #[error("model stayed busy or loading through {attempts} attempts; wait a while and retry")]
    RetriesExhausted { attempts: u32 },

    /// Connection-level failure or timeout, below any HTTP status.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
