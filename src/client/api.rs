use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::client::filters::PageRow;
use crate::client::retry::RetryPolicy;
use crate::constants::{DATA_API_PATH, GRAPH_API_PATH};
use crate::domain::entities::query::{DataQuery, DistinctLists};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {status}")]
    Status { status: u16 },
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ClientError {
    /// Transport failures and 5xx responses may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Status { status } => (500..600).contains(status),
            ClientError::Decode(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: &[(String, String)])
        -> Result<HttpResponse, ClientError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<HttpResponse, ClientError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// A data page as returned by the data API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataPage {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
    pub columns: Vec<String>,
    pub data: Vec<PageRow>,
    pub distinct: DistinctLists,
}

pub struct EnrollmentClient<T> {
    transport: T,
    retry: RetryPolicy,
}

impl<T: Transport> EnrollmentClient<T> {
    pub fn new(transport: T, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    pub async fn fetch_page(&self, query: &DataQuery) -> Result<DataPage, ClientError> {
        let pairs = query.to_pairs();
        let body = self.get_ok(DATA_API_PATH, &pairs).await?;
        serde_json::from_slice(&body).map_err(|err| ClientError::Decode(err.to_string()))
    }

    pub async fn fetch_chart(&self, ids: &[String]) -> Result<Vec<u8>, ClientError> {
        let pairs: Vec<(String, String)> = ids
            .iter()
            .map(|id| ("ids".to_string(), id.clone()))
            .collect();
        self.get_ok(GRAPH_API_PATH, &pairs).await
    }

    async fn get_ok(&self, path: &str, pairs: &[(String, String)]) -> Result<Vec<u8>, ClientError> {
        let transport = &self.transport;
        self.retry
            .run(move || async move {
                let response = transport.get(path, pairs).await?;
                if (200..300).contains(&response.status) {
                    Ok(response.body)
                } else {
                    Err(ClientError::Status {
                        status: response.status,
                    })
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use tokio::time::Instant;

    use super::*;

    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<HttpResponse, ClientError>>>,
        calls: Mutex<Vec<Vec<(String, String)>>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Result<HttpResponse, ClientError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().expect("calls lock").len()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(
            &self,
            _path: &str,
            query: &[(String, String)],
        ) -> Result<HttpResponse, ClientError> {
            self.calls.lock().expect("calls lock").push(query.to_vec());
            self.responses
                .lock()
                .expect("responses lock")
                .pop_front()
                .unwrap_or(Err(ClientError::Transport("script exhausted".into())))
        }
    }

    fn status(code: u16) -> Result<HttpResponse, ClientError> {
        Ok(HttpResponse {
            status: code,
            body: Vec::new(),
        })
    }

    fn page_body() -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "page": 1,
            "page_size": 200,
            "total": 1,
            "total_pages": 1,
            "columns": ["ObjectId", "Name"],
            "data": [{"ObjectId": "1", "Name": "Hillside"}],
            "distinct": {"names": [{"id": "1", "name": "Hillside"}], "sectors": [], "types": []}
        }))
        .expect("json body")
    }

    const BASE: Duration = Duration::from_millis(100);

    #[tokio::test(start_paused = true)]
    async fn two_unavailable_responses_then_success() {
        let transport = ScriptedTransport::new(vec![
            status(503),
            status(503),
            Ok(HttpResponse {
                status: 200,
                body: page_body(),
            }),
        ]);
        let client = EnrollmentClient::new(transport, RetryPolicy::new(3, BASE));
        let started = Instant::now();

        let page = client
            .fetch_page(&DataQuery::default())
            .await
            .expect("third attempt should succeed");

        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].id(), "1");
        assert_eq!(client.transport.call_count(), 3);
        // Delays of 1x and 2x the base before attempts two and three.
        let elapsed = started.elapsed();
        assert!(elapsed >= BASE * 3 && elapsed < BASE * 4, "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_fails_without_retry() {
        let transport = ScriptedTransport::new(vec![status(404), status(200)]);
        let client = EnrollmentClient::new(transport, RetryPolicy::new(3, BASE));
        let started = Instant::now();

        let err = client
            .fetch_page(&DataQuery::default())
            .await
            .expect_err("404 should fail");

        assert_eq!(err, ClientError::Status { status: 404 });
        assert_eq!(client.transport.call_count(), 1);
        assert!(started.elapsed() < BASE);
    }

    #[tokio::test(start_paused = true)]
    async fn chart_request_sends_repeated_ids() {
        let transport = ScriptedTransport::new(vec![Ok(HttpResponse {
            status: 200,
            body: vec![0x89, b'P', b'N', b'G'],
        })]);
        let client = EnrollmentClient::new(transport, RetryPolicy::default());

        let png = client
            .fetch_chart(&["3".to_string(), "5".to_string()])
            .await
            .expect("chart should load");

        assert_eq!(png, vec![0x89, b'P', b'N', b'G']);
        let calls = client.transport.calls.lock().expect("calls lock");
        assert_eq!(
            calls[0],
            vec![
                ("ids".to_string(), "3".to_string()),
                ("ids".to_string(), "5".to_string())
            ]
        );
    }

    #[test]
    fn only_transport_and_server_errors_retry() {
        assert!(ClientError::Transport("reset".into()).is_retryable());
        assert!(ClientError::Status { status: 502 }.is_retryable());
        assert!(!ClientError::Status { status: 400 }.is_retryable());
        assert!(!ClientError::Decode("eof".into()).is_retryable());
    }
}
