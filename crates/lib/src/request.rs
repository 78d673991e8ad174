//! # Request Resolution
//!
//! Derives an [`UploadRequest`] from a record's attributes and the processor
//! configuration. For each property the first non-empty value wins:
//!
//! 1. the record attribute with the same name,
//! 2. the configured property, with `${attr}` placeholders evaluated,
//! 3. the built-in default (only `url`, `fieldname`, `imagename`, `imagetype`).

use crate::config::ProcessorConfig;
use crate::constants::*;
use crate::errors::PostImageError;
use crate::expression::evaluate;
use crate::types::UploadRequest;
use std::collections::HashMap;
use tracing::warn;

/// Resolves one fixed property from the record attributes and the configuration.
pub fn resolve_property(
    name: &str,
    attributes: &HashMap<String, String>,
    config: &ProcessorConfig,
) -> Option<String> {
    attributes
        .get(name)
        .filter(|value| !value.is_empty())
        .cloned()
        .or_else(|| {
            config
                .property(name)
                .map(|template| evaluate(template, attributes))
                .filter(|value| !value.is_empty())
        })
}

fn resolve_or_default(
    name: &str,
    default: &str,
    attributes: &HashMap<String, String>,
    config: &ProcessorConfig,
) -> String {
    resolve_property(name, attributes, config).unwrap_or_else(|| default.to_string())
}

/// Evaluates every dynamic property against the record.
///
/// Entries that shadow a fixed property name are skipped.
pub fn resolve_dynamic_fields(
    attributes: &HashMap<String, String>,
    config: &ProcessorConfig,
) -> Vec<(String, String)> {
    config
        .dynamic
        .iter()
        .filter(|(name, _)| {
            let fixed = FIXED_PROPERTIES.contains(&name.as_str());
            if fixed {
                warn!("Ignoring dynamic property '{name}': it shadows a fixed property.");
            }
            !fixed
        })
        .map(|(name, template)| (name.clone(), evaluate(template, attributes)))
        .collect()
}

/// Builds the upload request for one record.
pub fn build_request(
    attributes: &HashMap<String, String>,
    config: &ProcessorConfig,
    content: Vec<u8>,
) -> Result<UploadRequest, PostImageError> {
    let resolve = |name: &str| resolve_property(name, attributes, config);

    let builder = UploadRequest::builder()
        .url(resolve_or_default(PROP_URL, DEFAULT_URL, attributes, config))
        .field_name(resolve_or_default(
            PROP_FIELD_NAME,
            DEFAULT_FIELD_NAME,
            attributes,
            config,
        ))
        .image_name(resolve_or_default(
            PROP_IMAGE_NAME,
            DEFAULT_IMAGE_NAME,
            attributes,
            config,
        ))
        .image_type(Some(resolve_or_default(
            PROP_IMAGE_TYPE,
            DEFAULT_IMAGE_TYPE,
            attributes,
            config,
        )))
        .content(content)
        .header(resolve(PROP_HEADER_NAME), resolve(PROP_HEADER_VALUE))
        .basic_auth(resolve(PROP_BASIC_USERNAME), resolve(PROP_BASIC_PASSWORD));

    resolve_dynamic_fields(attributes, config)
        .into_iter()
        .fold(builder, |builder, (name, value)| {
            builder.extra_field(name, value)
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_apply_when_nothing_is_set() {
        let request =
            build_request(&attrs(&[]), &ProcessorConfig::default(), b"jpeg".to_vec()).unwrap();

        assert_eq!(request.url(), DEFAULT_URL);
        assert_eq!(request.field_name(), "data");
        assert_eq!(request.image_name(), "test.jpg");
        assert_eq!(request.image_type(), Some("images/jpeg"));
        assert_eq!(request.header(), None);
        assert!(request.basic_auth().is_none());
        assert!(request.extra_fields().is_empty());
    }

    #[test]
    fn test_attribute_overrides_configuration() {
        let config = ProcessorConfig {
            url: Some("http://configured:9999/predict".to_string()),
            ..Default::default()
        };
        let attributes = attrs(&[("url", "http://from-record:9999/predict")]);

        let request = build_request(&attributes, &config, b"jpeg".to_vec()).unwrap();

        assert_eq!(request.url(), "http://from-record:9999/predict");
    }

    #[test]
    fn test_empty_attribute_falls_through_to_configuration() {
        let config = ProcessorConfig {
            imagename: Some("${filename}".to_string()),
            ..Default::default()
        };
        let attributes = attrs(&[("imagename", ""), ("filename", "panda.jpg")]);

        let request = build_request(&attributes, &config, b"jpeg".to_vec()).unwrap();

        assert_eq!(request.image_name(), "panda.jpg");
    }

    #[test]
    fn test_template_evaluating_to_empty_uses_default() {
        let config = ProcessorConfig {
            fieldname: Some("${missing}".to_string()),
            ..Default::default()
        };

        let request = build_request(&attrs(&[]), &config, b"jpeg".to_vec()).unwrap();

        assert_eq!(request.field_name(), DEFAULT_FIELD_NAME);
    }

    #[test]
    fn test_half_a_header_attaches_nothing() {
        let config = ProcessorConfig {
            headername: Some("Authorization".to_string()),
            ..Default::default()
        };
        let request = build_request(&attrs(&[]), &config, b"jpeg".to_vec()).unwrap();
        assert_eq!(request.header(), None);

        let attributes = attrs(&[("headervalue", "Client-ID abc")]);
        let request =
            build_request(&attributes, &ProcessorConfig::default(), b"jpeg".to_vec()).unwrap();
        assert_eq!(request.header(), None);

        let request = build_request(&attributes, &config, b"jpeg".to_vec()).unwrap();
        assert_eq!(request.header(), Some(("Authorization", "Client-ID abc")));
    }

    #[test]
    fn test_dynamic_fields_are_evaluated_and_fixed_names_skipped() {
        let mut config = ProcessorConfig::default();
        config
            .dynamic
            .insert("model".to_string(), "${model.name}".to_string());
        config
            .dynamic
            .insert("source".to_string(), "nifi".to_string());
        config
            .dynamic
            .insert("url".to_string(), "http://shadow".to_string());
        let attributes = attrs(&[("model.name", "squeezenet")]);

        let request = build_request(&attributes, &config, b"jpeg".to_vec()).unwrap();

        let fields = request.extra_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["model"], "squeezenet");
        assert_eq!(fields["source"], "nifi");
        assert_eq!(request.url(), DEFAULT_URL);
    }

    #[test]
    fn test_empty_content_is_missing_input() {
        let result = build_request(&attrs(&[]), &ProcessorConfig::default(), Vec::new());
        assert!(matches!(
            result,
            Err(PostImageError::MissingRequiredInput("content"))
        ));
    }
}
