use async_trait::async_trait;
use postimage::response::RawResponse;
use postimage::{PostImageError, Transport, UploadRequest};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, Once};

// --- Test Setup ---

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Builds an attribute map from string pairs.
pub fn attributes(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// --- Mock Transport ---

#[derive(Clone, Debug)]
enum MockReply {
    Respond { status_code: u16, body: Option<String> },
    Fail(String),
}

/// A transport that records every request and answers with a fixed reply.
#[derive(Clone, Debug)]
pub struct MockTransport {
    reply: MockReply,
    calls: Arc<Mutex<Vec<UploadRequest>>>,
}

impl MockTransport {
    /// Answers every request with `status_code` and an `application/json` body.
    pub fn responding(status_code: u16, body: Option<&str>) -> Self {
        Self {
            reply: MockReply::Respond {
                status_code,
                body: body.map(String::from),
            },
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fails every request as if the connection had been refused.
    pub fn failing(message: &str) -> Self {
        Self {
            reply: MockReply::Fail(message.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Retrieves the recorded requests for assertion.
    pub fn calls(&self) -> Vec<UploadRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &UploadRequest) -> Result<RawResponse, PostImageError> {
        self.calls.lock().unwrap().push(request.clone());

        match &self.reply {
            MockReply::Respond { status_code, body } => {
                let mut headers = HeaderMap::new();
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                Ok(RawResponse::new(*status_code, headers, body.clone()))
            }
            MockReply::Fail(message) => Err(PostImageError::transport(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                message.clone(),
            ))),
        }
    }
}
