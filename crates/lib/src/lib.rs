//! # postimage: Post Image Processor
//!
//! A dataflow processor that uploads each record's content as an image in a
//! multipart HTTP POST (for example to an image-classification server) and
//! writes the response back onto the record as `post.results`, `post.header`,
//! `post.status` and `post.statuscode`.
//!
//! The upload itself is a plain function of an [`UploadRequest`] and a
//! [`Transport`], see [`post_image`]. [`PostImageProcessor`] is the thin adapter
//! that resolves the request from a record and routes the record afterwards.

pub mod config;
pub mod constants;
pub mod errors;
pub mod expression;
pub mod processor;
pub mod request;
pub mod response;
pub mod session;
pub mod transport;
pub mod types;

pub use config::{load_config, AppConfig, ConfigError, ProcessorConfig, TransportConfig};
pub use errors::PostImageError;
pub use processor::{PostImageProcessor, PropertyDescriptor, TriggerState};
pub use session::{FlowFile, MemorySession, ProcessSession, Relationship};
pub use transport::{HttpTransport, Transport};
pub use types::{UploadRequest, UploadRequestBuilder, UploadResult};

use response::map_response;
use tracing::debug;

/// Sends one upload and maps its response.
///
/// A response outside the 2xx range is reported as
/// [`PostImageError::ApplicationFailure`] even though the HTTP exchange itself
/// completed.
pub async fn post_image(
    transport: &dyn Transport,
    request: &UploadRequest,
) -> Result<UploadResult, PostImageError> {
    let response = transport.send(request).await?;
    debug!(
        status_code = response.status_code,
        "Mapping upload response for {}",
        request.url()
    );
    ensure_success(map_response(&response))
}

pub(crate) fn ensure_success(result: UploadResult) -> Result<UploadResult, PostImageError> {
    if result.is_success() {
        Ok(result)
    } else {
        Err(PostImageError::ApplicationFailure {
            status_code: result.status_code,
            status: result.status,
        })
    }
}
