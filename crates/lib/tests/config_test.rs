//! # Configuration Loading Tests

use anyhow::Result;
use postimage::config::DEFAULT_CONFIG_FILE;
use postimage::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS};
use postimage::{load_config, ConfigError, ProcessorConfig, TransportConfig};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(yaml: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(yaml.as_bytes())?;
    Ok(file)
}

#[test]
fn test_load_full_config_file() -> Result<()> {
    // --- Arrange ---
    let file = write_config(
        r#"
processor:
  url: "http://127.0.0.1:9999/squeezenet/predict"
  fieldname: data
  imagename: "${filename}"
  imagetype: image/jpeg
  headername: Authorization
  headervalue: "Client-ID abc"
  dynamic:
    model: squeezenet
    topk: "5"
transport:
  connect_timeout_secs: 10
  read_timeout_secs: 30
  accept_invalid_certs: true
"#,
    )?;

    // --- Act ---
    let config = load_config(Some(file.path()))?;

    // --- Assert ---
    let processor = &config.processor;
    assert_eq!(
        processor.url.as_deref(),
        Some("http://127.0.0.1:9999/squeezenet/predict")
    );
    assert_eq!(processor.imagename.as_deref(), Some("${filename}"));
    assert_eq!(processor.property("headervalue"), Some("Client-ID abc"));
    assert_eq!(processor.basicusername, None);
    assert_eq!(processor.dynamic.len(), 2);
    assert_eq!(processor.dynamic["model"], "squeezenet");
    assert_eq!(processor.dynamic["topk"], "5");

    assert_eq!(config.transport.connect_timeout_secs, 10);
    assert_eq!(config.transport.read_timeout_secs, 30);
    assert!(config.transport.accept_invalid_certs);
    assert!(!config.transport.apply_basic_auth);
    Ok(())
}

#[test]
fn test_partial_file_keeps_transport_defaults() -> Result<()> {
    let file = write_config("processor:\n  fieldname: image\n")?;

    let config = load_config(Some(file.path()))?;

    assert_eq!(config.processor.fieldname.as_deref(), Some("image"));
    assert_eq!(config.processor.url, None);
    assert_eq!(config.transport, TransportConfig::default());
    assert_eq!(
        config.transport.connect_timeout_secs,
        DEFAULT_CONNECT_TIMEOUT_SECS
    );
    assert_eq!(config.transport.read_timeout_secs, DEFAULT_READ_TIMEOUT_SECS);
    Ok(())
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let result = load_config(Some(std::path::Path::new("does/not/exist.yml")));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_blank_required_property_is_rejected() -> Result<()> {
    let file = write_config("processor:\n  url: \"  \"\n")?;

    let result = load_config(Some(file.path()));

    assert!(matches!(result, Err(ConfigError::BlankProperty("url"))));
    Ok(())
}

#[test]
fn test_no_file_yields_defaults() -> Result<()> {
    assert!(!std::path::Path::new(DEFAULT_CONFIG_FILE).exists());

    let config = load_config(None)?;

    assert_eq!(config.processor, ProcessorConfig::default());
    assert_eq!(config.transport.read_timeout_secs, DEFAULT_READ_TIMEOUT_SECS);
    Ok(())
}

#[test]
fn test_validate_accepts_unset_and_optional_blank_properties() {
    let config = ProcessorConfig {
        headername: Some(String::new()),
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_yaml_dynamic_keys_keep_their_case() -> Result<()> {
    let file = write_config("processor:\n  dynamic:\n    ModelName: SqueezeNet\n")?;

    let config = load_config(Some(file.path()))?;

    assert_eq!(
        config.processor.dynamic.get("ModelName").map(String::as_str),
        Some("SqueezeNet")
    );
    assert!(!config.processor.dynamic.contains_key("modelname"));
    Ok(())
}
