use anyhow::{Context, Result};
use schemata_core::SanitizeOptions;
use schemata_validator::Sanitizer;
use std::path::Path;
use tracing::info;

use super::{load_document, load_registry};
use crate::output;

pub fn execute(
    schema_path: &Path,
    data_path: &Path,
    types: Option<&Path>,
    trim_strings: bool,
    purge_unknown: bool,
) -> Result<()> {
    info!("Sanitizing {} with {}", data_path.display(), schema_path.display());

    let registry = load_registry(types)?;
    let description = load_document(schema_path, "schema")?;
    let sanitizer = Sanitizer::new(registry, &description)
        .with_context(|| format!("Invalid schema: {}", schema_path.display()))?;

    let options = SanitizeOptions::new()
        .with_trim_strings(trim_strings)
        .with_purge_unknown(purge_unknown);

    let data = load_document(data_path, "data")?;
    let clean = sanitizer
        .sanitize(&data, &options)
        .context("Sanitization aborted")?;

    output::print_json(&clean)
}
