use std::env;
use std::time::Duration;

use crate::credentials::Credential;

pub const DEFAULT_ENDPOINT: &str = "https://router.huggingface.co/hf-inference";
pub const DEFAULT_MODEL_ID: &str = "stabilityai/stable-diffusion-xl-base-1.0";

/// Cold starts can take minutes; the per-request timeout has to cover them.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Client configuration: endpoint, model and credential, constructed once at
/// startup and handed to [`HfClient`](crate::HfClient). Tests substitute the
/// endpoint and token through the same builders.
#[derive(Debug, Clone)]
pub struct HfConfig {
    pub endpoint: String,
    pub model_id: String,
    pub timeout: Duration,
    pub token: Option<Credential>,
}

impl Default for HfConfig {
    fn default() -> Self {
        HfConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            timeout: DEFAULT_TIMEOUT,
            token: None,
        }
    }
}

impl HfConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let model_id = env::var("HF_MODEL_ID").unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());
        let endpoint = env::var("HF_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        HfConfig {
            endpoint,
            model_id,
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_token(mut self, token: Credential) -> Self {
        self.token = Some(token);
        self
    }

    /// Full URL for the configured model.
    pub fn model_url(&self) -> String {
        format!(
            "{}/models/{}",
            self.endpoint.trim_end_matches('/'),
            self.model_id
        )
    }
}
