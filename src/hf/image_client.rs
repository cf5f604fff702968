use std::sync::Arc;
use std::time::Duration;

use crate::credentials::Credential;
use crate::error::{HfError, Result};
use crate::hf::transport::{decode_body, RawResponse, Transport};
use crate::models::image::{GenerationRequest, WarmupBody};

/// Assumed wait when a warm-up response carries no usable estimate.
const WARMUP_DEFAULT_SECS: f64 = 10.0;

/// Bounds on a single backoff sleep, whatever the service claims.
const WARMUP_MIN_SECS: f64 = 3.0;
const WARMUP_MAX_SECS: f64 = 30.0;

/// Text-to-image client. One call, one outstanding request: `generate` runs
/// to success, a terminal error, or retry exhaustion, backoff sleeps included.
#[derive(Clone)]
pub struct ImageClient {
    transport: Arc<dyn Transport>,
    url: String,
    token: Credential,
}

/// What one attempt means for the retry loop.
enum Disposition {
    Image(Vec<u8>),
    Warming(Duration),
    Failed {
        status: u16,
        content_type: String,
        body: String,
    },
}

impl ImageClient {
    pub(crate) fn new(transport: Arc<dyn Transport>, url: String, token: Credential) -> Self {
        Self {
            transport,
            url,
            token,
        }
    }

    /// Generates one image, retrying up to `max_retries` times while the
    /// model warms up (503/504). Every other failure is terminal on the
    /// first occurrence; retrying auth or bad-request errors would only
    /// mask them.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        max_retries: u32,
    ) -> Result<Vec<u8>> {
        if max_retries == 0 {
            return Err(HfError::InvalidRequest(
                "max_retries must be at least 1".into(),
            ));
        }

        let payload = request.payload();

        for attempt in 1..=max_retries {
            log::debug!("POST {} (attempt {}/{})", self.url, attempt, max_retries);
            let response = self.transport.post(&self.url, &self.token, &payload).await?;

            match classify(response) {
                Disposition::Image(bytes) => {
                    log::info!("image generated after {} attempt(s), {} bytes", attempt, bytes.len());
                    return Ok(bytes);
                }
                Disposition::Warming(wait) => {
                    log::warn!(
                        "model warming up (attempt {}/{}), backing off {:.0}s",
                        attempt,
                        max_retries,
                        wait.as_secs_f64()
                    );
                    self.transport.sleep(wait).await;
                }
                Disposition::Failed {
                    status,
                    content_type,
                    body,
                } => {
                    return Err(HfError::Transport {
                        status,
                        content_type,
                        body,
                    });
                }
            }
        }

        Err(HfError::RetriesExhausted {
            attempts: max_retries,
        })
    }
}

/// Response classification, in priority order: image success, warm-up
/// (503/504), then everything else as a terminal failure. A 200 with a
/// non-image content-type lands in the last bucket on purpose; some backends
/// report in-band errors that way.
fn classify(response: RawResponse) -> Disposition {
    if response.status == 200 && response.content_type.starts_with("image/") {
        return Disposition::Image(response.body);
    }

    if response.status == 503 || response.status == 504 {
        return Disposition::Warming(warmup_wait(&response.body));
    }

    Disposition::Failed {
        status: response.status,
        content_type: response.content_type,
        body: decode_body(&response.body),
    }
}

fn warmup_wait(body: &[u8]) -> Duration {
    let estimated = serde_json::from_slice::<WarmupBody>(body)
        .ok()
        .and_then(|warmup| warmup.estimated_time)
        .filter(|secs| secs.is_finite())
        .unwrap_or(WARMUP_DEFAULT_SECS);

    Duration::from_secs_f64(estimated.clamp(WARMUP_MIN_SECS, WARMUP_MAX_SECS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use crate::models::image::GenerationPayload;

    struct ScriptedTransport {
        responses: Mutex<VecDeque<RawResponse>>,
        posts: Mutex<u32>,
        sleeps: Mutex<Vec<Duration>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<RawResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                posts: Mutex::new(0),
                sleeps: Mutex::new(Vec::new()),
            })
        }

        fn posts(&self) -> u32 {
            *self.posts.lock().unwrap()
        }

        fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn post(
            &self,
            _url: &str,
            _token: &Credential,
            _payload: &GenerationPayload,
        ) -> Result<RawResponse> {
            *self.posts.lock().unwrap() += 1;
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("more attempts than scripted responses"))
        }

        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    fn client(transport: Arc<ScriptedTransport>) -> ImageClient {
        ImageClient::new(
            transport,
            "http://localhost/models/test".to_string(),
            Credential::new("token"),
        )
    }

    fn warming(body: &[u8]) -> RawResponse {
        RawResponse {
            status: 503,
            content_type: "application/json".to_string(),
            body: body.to_vec(),
        }
    }

    fn png(bytes: &[u8]) -> RawResponse {
        RawResponse {
            status: 200,
            content_type: "image/png".to_string(),
            body: bytes.to_vec(),
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("a lighthouse at dusk").unwrap()
    }

    #[tokio::test]
    async fn test_warmup_then_success() {
        let transport = ScriptedTransport::new(vec![
            warming(br#"{"estimated_time": 2}"#),
            warming(b"not json"),
            png(b"\x89PNGdata"),
        ]);

        let bytes = client(transport.clone())
            .generate(&request(), 3)
            .await
            .unwrap();

        assert_eq!(bytes, b"\x89PNGdata");
        assert_eq!(transport.posts(), 3);
        // estimate 2 clamps up to 3s; missing estimate defaults to 10s
        assert_eq!(
            transport.sleeps(),
            vec![Duration::from_secs(3), Duration::from_secs(10)]
        );
    }

    #[tokio::test]
    async fn test_plain_200_fails_without_retry() {
        let transport = ScriptedTransport::new(vec![RawResponse {
            status: 200,
            content_type: "text/plain".to_string(),
            body: b"error in body".to_vec(),
        }]);

        let result = client(transport.clone()).generate(&request(), 3).await;

        match result {
            Err(HfError::Transport {
                status,
                content_type,
                body,
            }) => {
                assert_eq!(status, 200);
                assert_eq!(content_type, "text/plain");
                assert_eq!(body, "error in body");
            }
            other => panic!("expected Transport error, got {other:?}"),
        }
        assert_eq!(transport.posts(), 1);
        assert!(transport.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let transport = ScriptedTransport::new(vec![
            warming(br#"{"estimated_time": 5}"#),
            warming(br#"{"estimated_time": 5}"#),
        ]);

        let result = client(transport.clone()).generate(&request(), 2).await;

        assert!(matches!(
            result,
            Err(HfError::RetriesExhausted { attempts: 2 })
        ));
        assert_eq!(transport.posts(), 2);
        assert_eq!(transport.sleeps().len(), 2);
    }

    #[tokio::test]
    async fn test_non_transient_status_fails_immediately() {
        let transport = ScriptedTransport::new(vec![RawResponse {
            status: 401,
            content_type: "application/json".to_string(),
            body: br#"{"error": "Invalid token"}"#.to_vec(),
        }]);

        let result = client(transport.clone()).generate(&request(), 4).await;

        match result {
            Err(HfError::Transport { status, body, .. }) => {
                assert_eq!(status, 401);
                assert!(body.contains("Invalid token"));
            }
            other => panic!("expected Transport error, got {other:?}"),
        }
        assert_eq!(transport.posts(), 1);
    }

    #[tokio::test]
    async fn test_repeated_calls_hit_transport_each_time() {
        let transport = ScriptedTransport::new(vec![png(b"one"), png(b"two")]);
        let client = client(transport.clone());

        assert_eq!(client.generate(&request(), 1).await.unwrap(), b"one");
        assert_eq!(client.generate(&request(), 1).await.unwrap(), b"two");
        assert_eq!(transport.posts(), 2);
    }

    #[tokio::test]
    async fn test_zero_retries_rejected() {
        let transport = ScriptedTransport::new(vec![]);
        let result = client(transport.clone()).generate(&request(), 0).await;
        assert!(matches!(result, Err(HfError::InvalidRequest(_))));
        assert_eq!(transport.posts(), 0);
    }

    #[test]
    fn test_warmup_wait_clamping() {
        assert_eq!(warmup_wait(br#"{"estimated_time": 2}"#), Duration::from_secs(3));
        assert_eq!(warmup_wait(br#"{"estimated_time": 3}"#), Duration::from_secs(3));
        assert_eq!(warmup_wait(br#"{"estimated_time": 17.5}"#), Duration::from_secs_f64(17.5));
        assert_eq!(warmup_wait(br#"{"estimated_time": 30}"#), Duration::from_secs(30));
        assert_eq!(warmup_wait(br#"{"estimated_time": 120}"#), Duration::from_secs(30));
        assert_eq!(warmup_wait(br#"{}"#), Duration::from_secs(10));
        assert_eq!(warmup_wait(b"<html>"), Duration::from_secs(10));
    }

    #[test]
    fn test_gateway_timeout_is_warming() {
        let disposition = classify(RawResponse {
            status: 504,
            content_type: "text/html".to_string(),
            body: Vec::new(),
        });
        assert!(matches!(disposition, Disposition::Warming(_)));
    }
}
