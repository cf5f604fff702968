use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::credentials::Credential;
use crate::error::Result;
use crate::models::image::GenerationPayload;

/// What one attempt against the inference API came back with, before any
/// interpretation. The client classifies this; the transport only moves bytes.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Seam between the retry loop and the network. The production implementation
/// is [`HttpTransport`]; tests script responses and record the backoff sleeps,
/// which is why sleeping goes through here too.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        token: &Credential,
        payload: &GenerationPayload,
    ) -> Result<RawResponse>;

    async fn sleep(&self, duration: Duration);
}

/// reqwest-backed transport with the configured per-request timeout.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpTransport { client })
    }

    fn build_headers(token: &Credential) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(value) = format!("Bearer {}", token.expose()).parse() {
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            "application/json".parse().unwrap(),
        );
        headers
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        token: &Credential,
        payload: &GenerationPayload,
    ) -> Result<RawResponse> {
        let response = self
            .client
            .post(url)
            .headers(Self::build_headers(token))
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

type Decoder = fn(&[u8]) -> Option<String>;

/// Prioritized decoders for error bodies: JSON when it parses, raw text
/// otherwise. The last decoder always succeeds.
const BODY_DECODERS: &[Decoder] = &[decode_json, decode_text];

pub fn decode_body(body: &[u8]) -> String {
    BODY_DECODERS
        .iter()
        .find_map(|decode| decode(body))
        .unwrap_or_default()
}

fn decode_json(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    Some(value.to_string())
}

fn decode_text(body: &[u8]) -> Option<String> {
    Some(String::from_utf8_lossy(body).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_body_prefers_json() {
        let body = br#"{"error": "Model too busy"}"#;
        assert_eq!(decode_body(body), r#"{"error":"Model too busy"}"#);
    }

    #[test]
    fn test_decode_body_falls_back_to_text() {
        assert_eq!(decode_body(b"Service Unavailable"), "Service Unavailable");
    }

    #[test]
    fn test_decode_body_survives_invalid_utf8() {
        let decoded = decode_body(&[0xff, 0xfe, b'h', b'i']);
        assert!(decoded.ends_with("hi"));
    }
}
