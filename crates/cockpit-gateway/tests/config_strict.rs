#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use cockpit_gateway::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
gateway:
  listen: "127.0.0.1:8090"
metrics:
  capacty: 50 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.kind().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.listen, "127.0.0.1:8090");
    assert_eq!(cfg.metrics.capacity, 200);
    assert!(cfg.gateway.model.is_none());
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
gateway:
  listen: "0.0.0.0:8085"
  model: "rust-embedder"
metrics:
  capacity: 32
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.gateway.listen_addr().unwrap().port(), 8085);
    assert_eq!(cfg.gateway.model.as_deref(), Some("rust-embedder"));
    assert_eq!(cfg.metrics.capacity, 32);
}

#[test]
fn rejects_zero_capacity() {
    let err = config::load_from_str("version: 1\nmetrics:\n  capacity: 0\n").unwrap_err();
    assert!(err.to_string().contains("metrics.capacity"));
}

#[test]
fn rejects_bad_listen() {
    let err = config::load_from_str("version: 1\ngateway:\n  listen: \"localhost\"\n").unwrap_err();
    assert!(err.to_string().contains("gateway.listen"));
}

#[test]
fn rejects_unknown_version() {
    let err = config::load_from_str("version: 2\n").unwrap_err();
    assert_eq!(err.kind().as_str(), "CONFIG");
}

#[test]
fn missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = config::load_from_file(dir.path().join("nope.yaml")).unwrap_err();
    assert_eq!(err.kind().as_str(), "CONFIG");
}
