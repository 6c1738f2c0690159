//! Tests for registry save/load.

use crate::error::RegistryError;
use crate::factory::{ElementRegistry, NodeFactory};
use crate::registry_io::{load_registry, save_registry};
use crate::types::{NodeDescriptor, PortInfo};

#[test]
fn roundtrip_save_load() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("nested").join("registry.json");
  let mut registry = ElementRegistry::new();
  registry.register(
    NodeDescriptor::new("scaler")
      .with_port(PortInfo::input("sink"))
      .with_port(PortInfo::output("src")),
  );
  save_registry(&path, &registry).unwrap();
  assert!(path.exists());
  let loaded = load_registry(&path).unwrap();
  let scaler = loaded.create_node("scaler", None).unwrap();
  assert_eq!(scaler.ports.len(), 2);
  assert!(loaded.create_container("bin", None).is_some());
}

#[test]
fn load_adds_builtin_containers() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("registry.json");
  std::fs::write(
    &path,
    r#"{
      "types": [
        { "type_name": "mixer", "ports": [
          { "name": "sink_%u", "direction": "input", "presence": "request" },
          { "name": "src", "direction": "output", "format": "audio/x-raw" }
        ]}
      ],
      "uri_handlers": [
        { "scheme": "rtsp", "direction": "source", "type_name": "mixer" }
      ]
    }"#,
  )
  .unwrap();
  let loaded = load_registry(&path).unwrap();
  assert!(loaded.create_node("mixer", None).is_some());
  assert!(loaded.create_container("pipeline", None).is_some());
}

#[test]
fn load_missing_file_returns_error() {
  let dir = tempfile::tempdir().unwrap();
  let r = load_registry(&dir.path().join("nonexistent.json"));
  assert!(matches!(r, Err(RegistryError::Io(_))));
}

#[test]
fn load_invalid_json_returns_error() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("bad.json");
  std::fs::write(&path, "{ not json").unwrap();
  assert!(matches!(load_registry(&path), Err(RegistryError::Json(_))));
}
