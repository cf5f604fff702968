pub mod config;
pub mod credentials;
pub mod error;
pub mod hf;
pub mod logger;
pub mod models;

pub use config::HfConfig;
pub use credentials::{Credential, CredentialResolver};
pub use error::{HfError, Result};
pub use hf::{HfClient, ImageClient};
pub use models::{GenerationRequest, ImageSize};
