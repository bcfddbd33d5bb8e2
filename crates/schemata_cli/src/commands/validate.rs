use anyhow::{Context, Result};
use schemata_core::ValidationOptions;
use schemata_validator::Validator;
use std::path::Path;
use tracing::info;

use super::{load_document, load_registry};
use crate::output::{self, OutputFormat};

/// Option flags given on the command line; each one can only switch a
/// default on.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub all_required: bool,
    pub all_nullable: bool,
    pub all_blankable: bool,
    pub all_unknown_allowed: bool,
}

impl Overrides {
    fn apply(self, options: ValidationOptions) -> ValidationOptions {
        let all_required = options.all_required || self.all_required;
        let all_nullable = options.all_nullable || self.all_nullable;
        let all_blankable = options.all_blankable || self.all_blankable;
        let all_unknown_allowed = options.all_unknown_allowed || self.all_unknown_allowed;
        options
            .with_all_required(all_required)
            .with_all_nullable(all_nullable)
            .with_all_blankable(all_blankable)
            .with_all_unknown_allowed(all_unknown_allowed)
    }
}

pub fn execute(
    schema_path: &Path,
    data_path: &Path,
    types: Option<&Path>,
    options_path: Option<&Path>,
    overrides: Overrides,
    format: OutputFormat,
) -> Result<()> {
    info!("Validating {} against {}", data_path.display(), schema_path.display());

    let options = match options_path {
        Some(path) => ValidationOptions::from_value(&load_document(path, "options")?)
            .with_context(|| format!("Invalid options in {}", path.display()))?,
        None => ValidationOptions::new(),
    };
    let options = overrides.apply(options);

    let registry = load_registry(types)?;
    let description = load_document(schema_path, "schema")?;
    let validator = Validator::new(registry, &description)
        .with_context(|| format!("Invalid schema: {}", schema_path.display()))?;

    let data = load_document(data_path, "data")?;
    let report = validator
        .validate(&data, &options)
        .context("Validation aborted")?;

    output::print_validation_report(&report, format)?;

    if !report.passed {
        std::process::exit(1);
    }

    Ok(())
}
