//! # Post Image Processor
//!
//! The per-record entry point. Each call to [`PostImageProcessor::on_trigger`]
//! takes at most one record from the session and walks it through
//! `Idle -> Reading -> Calling -> Mapping -> Writing -> Routed`. Any failure
//! jumps straight to `Routed` via `failure`, leaving the record's attributes
//! untouched. Nothing here returns an error to the host.

use crate::config::ProcessorConfig;
use crate::constants::*;
use crate::errors::PostImageError;
use crate::ensure_success;
use crate::request::{build_request, resolve_property};
use crate::response::map_response;
use crate::session::{FlowFile, ProcessSession, Relationship};
use crate::transport::Transport;
use crate::types::UploadResult;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Where a record is in its single pass through the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    Reading,
    Calling,
    Mapping,
    Writing,
    Routed(Relationship),
}

impl fmt::Display for TriggerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerState::Idle => f.write_str("idle"),
            TriggerState::Reading => f.write_str("reading"),
            TriggerState::Calling => f.write_str("calling"),
            TriggerState::Mapping => f.write_str("mapping"),
            TriggerState::Writing => f.write_str("writing"),
            TriggerState::Routed(relationship) => write!(f, "routed({relationship})"),
        }
    }
}

/// Describes one configurable property of the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub expression_language_supported: bool,
    pub sensitive: bool,
}

const PROPERTY_DESCRIPTORS: [PropertyDescriptor; 8] = [
    PropertyDescriptor {
        name: PROP_URL,
        description: "URL Name like http://127.0.0.1:9999/squeezenet/predict",
        required: true,
        expression_language_supported: true,
        sensitive: false,
    },
    PropertyDescriptor {
        name: PROP_FIELD_NAME,
        description: "Field Name like data",
        required: true,
        expression_language_supported: true,
        sensitive: false,
    },
    PropertyDescriptor {
        name: PROP_IMAGE_NAME,
        description: "Image Name like TimLovesNiFi.jpg",
        required: true,
        expression_language_supported: true,
        sensitive: false,
    },
    PropertyDescriptor {
        name: PROP_IMAGE_TYPE,
        description: "Image Type like image/jpeg",
        required: true,
        expression_language_supported: true,
        sensitive: false,
    },
    PropertyDescriptor {
        name: PROP_HEADER_NAME,
        description: "Name of a single custom request header, like Authorization",
        required: false,
        expression_language_supported: true,
        sensitive: false,
    },
    PropertyDescriptor {
        name: PROP_HEADER_VALUE,
        description: "Value of the custom request header",
        required: false,
        expression_language_supported: true,
        sensitive: true,
    },
    PropertyDescriptor {
        name: PROP_BASIC_USERNAME,
        description: "Basic authentication user name",
        required: false,
        expression_language_supported: true,
        sensitive: false,
    },
    PropertyDescriptor {
        name: PROP_BASIC_PASSWORD,
        description: "Basic authentication password",
        required: false,
        expression_language_supported: true,
        sensitive: true,
    },
];

/// Posts each record's content as an image and records the response on it.
///
/// Cheap to share across worker tasks: the configuration is read-only and the
/// transport is shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PostImageProcessor {
    config: ProcessorConfig,
    transport: Arc<dyn Transport>,
}

impl PostImageProcessor {
    pub fn new(config: ProcessorConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn property_descriptors() -> &'static [PropertyDescriptor] {
        &PROPERTY_DESCRIPTORS
    }

    pub fn relationships() -> [Relationship; 2] {
        [Relationship::Success, Relationship::Failure]
    }

    /// Processes at most one record from the session.
    ///
    /// Returns the relationship the record was routed to, or `None` when the
    /// session had nothing queued.
    pub async fn on_trigger(&self, session: &mut dyn ProcessSession) -> Option<Relationship> {
        let flow_file = session.get()?;
        let mut state = TriggerState::Idle;

        let relationship = match self.process(session, &flow_file, &mut state).await {
            Ok(result) => {
                advance(&flow_file, &mut state, TriggerState::Writing);
                let flow_file = session.put_all_attributes(flow_file, output_attributes(&result));
                info!(
                    record = %flow_file.id,
                    status_code = result.status_code,
                    "Image posted successfully."
                );
                session.transfer(flow_file, Relationship::Success);
                Relationship::Success
            }
            Err(e) => {
                let attributes = &flow_file.attributes;
                let resolved = |name: &str| resolve_property(name, attributes, &self.config);
                error!(
                    record = %flow_file.id,
                    state = %state,
                    url = ?resolved(PROP_URL),
                    field = ?resolved(PROP_FIELD_NAME),
                    image_name = ?resolved(PROP_IMAGE_NAME),
                    image_type = ?resolved(PROP_IMAGE_TYPE),
                    "Unable to post image: {e}"
                );
                session.transfer(flow_file, Relationship::Failure);
                Relationship::Failure
            }
        };

        debug!("{state} -> {}", TriggerState::Routed(relationship));
        Some(relationship)
    }

    async fn process(
        &self,
        session: &mut dyn ProcessSession,
        flow_file: &FlowFile,
        state: &mut TriggerState,
    ) -> Result<UploadResult, PostImageError> {
        advance(flow_file, state, TriggerState::Reading);
        let mut content = Vec::new();
        session.read(flow_file)?.read_to_end(&mut content)?;
        let request = build_request(&flow_file.attributes, &self.config, content)?;

        advance(flow_file, state, TriggerState::Calling);
        let response = self.transport.send(&request).await?;

        advance(flow_file, state, TriggerState::Mapping);
        ensure_success(map_response(&response))
    }
}

fn advance(flow_file: &FlowFile, state: &mut TriggerState, next: TriggerState) {
    debug!(record = %flow_file.id, "{state} -> {next}");
    *state = next;
}

/// The four attributes written onto a record after a successful upload.
///
/// `post.results` is empty when the body held no non-null JSON array element.
pub fn output_attributes(result: &UploadResult) -> HashMap<String, String> {
    HashMap::from([
        (
            ATTR_RESULTS.to_string(),
            result.json_result_body.clone().unwrap_or_default(),
        ),
        (ATTR_HEADER.to_string(), result.header.clone()),
        (ATTR_STATUS.to_string(), result.status.clone()),
        (ATTR_STATUS_CODE.to_string(), result.status_code.to_string()),
    ])
}
