pub mod image_client;
pub mod transport;

use std::sync::Arc;

use crate::config::HfConfig;
use crate::error::{HfError, Result};
use crate::hf::transport::{HttpTransport, Transport};

pub use image_client::ImageClient;

/// Entry point to the inference API. Owns the shared transport and hands out
/// capability clients; today that is only image generation.
#[derive(Clone)]
pub struct HfClient {
    image_client: ImageClient,
}

impl HfClient {
    pub fn new(config: HfConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(config.timeout)?);
        Self::with_transport(config, transport)
    }

    /// Builds the client over a caller-supplied transport. Tests use this to
    /// substitute the network; the endpoint and token come from `config`
    /// either way.
    pub fn with_transport(config: HfConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let token = config.token.clone().ok_or(HfError::MissingCredential)?;
        let url = config.model_url();

        Ok(Self {
            image_client: ImageClient::new(transport, url, token),
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Credential;

    #[test]
    fn test_new_requires_token() {
        let result = HfClient::new(HfConfig::new());
        assert!(matches!(result, Err(HfError::MissingCredential)));
    }

    #[test]
    fn test_new_with_token() {
        let config = HfConfig::new().with_token(Credential::new("hf_test"));
        assert!(HfClient::new(config).is_ok());
    }
}
