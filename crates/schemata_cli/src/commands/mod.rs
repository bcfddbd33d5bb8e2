pub mod check;
pub mod sanitize;
pub mod validate;

use anyhow::{Context, Result};
use schemata_parser::parse_file;
use schemata_validator::Registry;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Loads any document, naming it in the error when it cannot be read.
pub fn load_document(path: &Path, what: &str) -> Result<Value> {
    parse_file(path).with_context(|| format!("Failed to load {} file: {}", what, path.display()))
}

/// Builds a fresh registry, registering the named types in `types` if given.
pub fn load_registry(types: Option<&Path>) -> Result<Arc<Registry>> {
    let registry = Registry::new();

    if let Some(path) = types {
        let descriptions = load_document(path, "types")?;
        registry
            .register_types(&descriptions)
            .with_context(|| format!("Invalid named types in {}", path.display()))?;
        info!("Registered {} named type(s)", registry.types().names().len());
    }

    Ok(Arc::new(registry))
}
