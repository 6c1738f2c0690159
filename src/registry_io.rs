//! Node registry save/load (JSON).

use crate::error::RegistryError;
use crate::factory::ElementRegistry;
use std::path::Path;
use tracing::{info, instrument};

/// Loads a registry from `path`. Built-in containers are added unless the file overrides them.
#[instrument(level = "trace", skip(path))]
pub fn load_registry(path: &Path) -> Result<ElementRegistry, RegistryError> {
  let bytes = std::fs::read(path)?;
  let loaded: ElementRegistry = serde_json::from_slice(&bytes)?;
  let mut registry = ElementRegistry::new();
  registry.extend(loaded);
  info!(
    path = %path.display(),
    types = registry.type_names().count(),
    "loaded node registry"
  );
  Ok(registry)
}

/// Saves `registry` to `path` as pretty JSON, creating parent directories.
#[instrument(level = "trace", skip(path, registry))]
pub fn save_registry(path: &Path, registry: &ElementRegistry) -> Result<(), RegistryError> {
  let json = serde_json::to_string_pretty(registry)?;
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, json)?;
  Ok(())
}
