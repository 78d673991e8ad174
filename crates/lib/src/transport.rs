//! # Upload Transport
//!
//! The [`Transport`] trait is the seam between the processor and the network.
//! [`HttpTransport`] is the real implementation: one `reqwest` client, and so one
//! connection pool, built once at start-up and shared by every trigger.

use crate::config::TransportConfig;
use crate::errors::PostImageError;
use crate::response::{reason_phrase, RawResponse};
use crate::types::UploadRequest;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client as ReqwestClient;
use std::fmt::Debug;
use tracing::{debug, warn};

/// Sends one multipart upload and hands back the raw response.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn send(&self, request: &UploadRequest) -> Result<RawResponse, PostImageError>;
}

/// A `reqwest`-backed transport with bounded connect and read timeouts.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: ReqwestClient,
    apply_basic_auth: bool,
}

impl HttpTransport {
    /// Builds the shared client from the transport configuration.
    pub fn new(config: &TransportConfig) -> Result<Self, PostImageError> {
        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for upload endpoints.");
        }
        let client = ReqwestClient::builder()
            .connect_timeout(config.connect_timeout())
            .read_timeout(config.read_timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(PostImageError::ClientBuild)?;
        Ok(Self {
            client,
            apply_basic_auth: config.apply_basic_auth,
        })
    }
}

/// Builds the multipart body: every extra field as text, then the image part.
pub fn build_form(request: &UploadRequest) -> Result<Form, PostImageError> {
    let mut part =
        Part::bytes(request.content().to_vec()).file_name(request.image_name().to_string());
    if let Some(image_type) = request.image_type() {
        part = part
            .mime_str(image_type)
            .map_err(|_| PostImageError::InvalidContentType(image_type.to_string()))?;
    }

    let form = request
        .extra_fields()
        .iter()
        .fold(Form::new(), |form, (name, value)| {
            form.text(name.clone(), value.clone())
        });
    Ok(form.part(request.field_name().to_string(), part))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &UploadRequest) -> Result<RawResponse, PostImageError> {
        let form = build_form(request)?;

        let mut request_builder = self.client.post(request.url()).multipart(form);
        if let Some((name, value)) = request.header() {
            request_builder = request_builder.header(name, value);
        }
        if let Some(auth) = request.basic_auth() {
            if self.apply_basic_auth {
                request_builder = request_builder.basic_auth(&auth.username, auth.password.as_ref());
            } else {
                debug!("Basic-auth credentials resolved but not applied to the request.");
            }
        }

        debug!(url = %request.url(), field = %request.field_name(), "--> Posting image");
        let response = request_builder
            .send()
            .await
            .map_err(PostImageError::transport)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(PostImageError::transport)?;
        debug!("<-- Upload responded with {status}");

        Ok(RawResponse {
            status_code: status.as_u16(),
            status_text: reason_phrase(status.as_u16()),
            headers,
            body: Some(body).filter(|b| !b.is_empty()),
        })
    }
}
