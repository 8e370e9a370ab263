//! Tests for loading dispatcher configuration from files.

use pacer_error::PacerErrorKind;
use pacer_rate_limit::DispatcherConfig;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file
}

#[test]
fn test_from_file_reads_dispatcher_table() {
    let file = write_config(
        r#"
[dispatcher]
min_delay_between_requests_ms = 25
buffer_capacity = 16
api_key = "file-key"
api_key_header = "X-Api-Key"
reset_margin_secs = 1
default_reset_secs = 30
default_remaining = 60
"#,
    );

    let config = DispatcherConfig::from_file(file.path()).unwrap();
    assert_eq!(*config.min_delay_between_requests_ms(), 25);
    assert_eq!(*config.buffer_capacity(), 16);
    assert_eq!(config.api_key().as_deref(), Some("file-key"));
    assert_eq!(config.api_key_header(), "X-Api-Key");
    assert_eq!(*config.reset_margin_secs(), 1);
    assert_eq!(*config.default_reset_secs(), 30);
    assert_eq!(*config.default_remaining(), 60);

    let credential = config.credential().unwrap();
    assert_eq!(credential.header(), "X-Api-Key");
}

#[test]
fn test_from_file_fills_missing_fields_with_defaults() {
    let file = write_config(
        r#"
[dispatcher]
buffer_capacity = 4
"#,
    );

    let config = DispatcherConfig::from_file(file.path()).unwrap();
    let expected = DispatcherConfig::default().with_buffer_capacity(4);
    assert_eq!(config, expected);
    assert!(config.credential().is_none());
}

#[test]
fn test_from_file_without_table_uses_defaults() {
    let file = write_config("# nothing configured\n");

    let config = DispatcherConfig::from_file(file.path()).unwrap();
    assert_eq!(config, DispatcherConfig::default());
}

#[test]
fn test_from_file_rejects_zero_capacity() {
    let file = write_config(
        r#"
[dispatcher]
buffer_capacity = 0
"#,
    );

    let err = DispatcherConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err.kind(), PacerErrorKind::Config(_)));
    assert!(err.to_string().contains("buffer_capacity"));
}

#[test]
fn test_from_file_rejects_wrong_types() {
    let file = write_config(
        r#"
[dispatcher]
min_delay_between_requests_ms = "soon"
"#,
    );

    let err = DispatcherConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err.kind(), PacerErrorKind::Config(_)));
}

#[test]
fn test_from_file_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let err = DispatcherConfig::from_file(&missing).unwrap_err();
    match err.kind() {
        PacerErrorKind::Config(e) => {
            assert_eq!(e.path.as_deref(), Some(missing.display().to_string().as_str()))
        }
        other => panic!("expected a configuration error, got {}", other),
    }
}
