//! # CLI Tests
//!
//! Runs the `postimage` binary against a mock inference server.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create an image fixture within a given directory.
fn create_image(dir: &std::path::Path) -> std::path::PathBuf {
    let image_path = dir.join("panda.jpg");
    fs::write(&image_path, b"\xff\xd8\xff fake jpeg").expect("Failed to write image fixture");
    image_path
}

/// A command isolated from any `postimage.yml` or `POSTIMAGE_` variables of the caller.
fn postimage(workdir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("postimage").unwrap();
    cmd.current_dir(workdir).env_remove("POSTIMAGE_CONFIG");
    cmd
}

#[tokio::test(flavor = "multi_thread")]
async fn test_post_command_success() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/squeezenet/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"[{"class": "giant panda"}, null, "b"]"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;
    let temp_dir = tempdir().unwrap();
    let image_path = create_image(temp_dir.path());
    let url = format!("{}/squeezenet/predict", server.uri());

    // Act
    let workdir = temp_dir.path().to_path_buf();
    let assert = tokio::task::spawn_blocking(move || {
        postimage(&workdir)
            .arg("post")
            .arg(&image_path)
            .arg("--attr")
            .arg(format!("url={url}"))
            .arg("--attr")
            .arg("imagetype=image/jpeg")
            .assert()
    })
    .await
    .unwrap();

    // Assert
    assert
        .success()
        .stdout(predicate::str::contains(r#""relationship": "success""#))
        .stdout(predicate::str::contains(r#""post.results": "b""#))
        .stdout(predicate::str::contains(r#""post.statuscode": "200""#))
        .stdout(predicate::str::contains("application/json"));
}

#[test]
fn test_post_command_routes_unreachable_endpoint_to_failure() {
    // Arrange
    let temp_dir = tempdir().unwrap();
    let image_path = create_image(temp_dir.path());

    // Act
    let mut cmd = postimage(temp_dir.path());
    cmd.arg("post")
        .arg(&image_path)
        .arg("--attr")
        .arg("url=http://127.0.0.1:1/predict");

    // Assert
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains(r#""relationship": "failure""#))
        .stdout(predicate::str::contains("post.results").not());
}

#[test]
fn test_post_command_reads_config_file() {
    // Arrange
    let temp_dir = tempdir().unwrap();
    let image_path = create_image(temp_dir.path());
    let config_path = temp_dir.path().join("custom.yml");
    fs::write(
        &config_path,
        "processor:\n  url: \"http://127.0.0.1:1/${model}\"\ntransport:\n  connect_timeout_secs: 2\n",
    )
    .unwrap();

    // Act
    let mut cmd = postimage(temp_dir.path());
    cmd.arg("--config")
        .arg(&config_path)
        .arg("post")
        .arg(&image_path)
        .arg("--attr")
        .arg("model=squeezenet");

    // Assert
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains(r#""model": "squeezenet""#));
}

#[test]
fn test_post_command_missing_image() {
    let temp_dir = tempdir().unwrap();

    let mut cmd = postimage(temp_dir.path());
    cmd.arg("post").arg("does-not-exist.jpg");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read image"));
}

#[test]
fn test_post_command_rejects_malformed_attribute() {
    let temp_dir = tempdir().unwrap();
    let image_path = create_image(temp_dir.path());

    let mut cmd = postimage(temp_dir.path());
    cmd.arg("post").arg(&image_path).arg("--attr").arg("novalue");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("expected key=value"));
}

#[test]
fn test_describe_command_lists_properties() {
    let temp_dir = tempdir().unwrap();

    let mut cmd = postimage(temp_dir.path());
    cmd.arg("describe");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""name": "imagetype""#))
        .stdout(predicate::str::contains(r#""name": "basicpassword""#))
        .stdout(predicate::str::contains("Successfully determined image."));
}
