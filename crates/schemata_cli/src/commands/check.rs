use anyhow::{Context, Result};
use schemata_core::{Children, SchemaNode};
use schemata_parser::parse_schema_file;
use serde_json::json;
use std::path::Path;
use tracing::info;

use super::load_registry;
use crate::output::{self, OutputFormat};

pub fn execute(schema_path: &Path, types: Option<&Path>, format: OutputFormat) -> Result<()> {
    info!("Checking schema: {}", schema_path.display());

    let registry = load_registry(types)?;
    let schema = parse_schema_file(schema_path, &*registry)
        .with_context(|| format!("Invalid schema: {}", schema_path.display()))?;

    let rules: Vec<&str> = schema.rules().iter().map(|rule| rule.id.as_str()).collect();
    let fields = field_names(&schema);
    let types = registry.types().names();

    if format != OutputFormat::Text {
        let summary = json!({
            "valid": true,
            "type": schema.kind().name(),
            "rules": rules,
            "fields": fields,
            "nodes": schema.node_count(),
            "types": types,
        });
        return output::print_json(&summary);
    }

    output::print_success("Schema is valid");

    println!("\nSchema Summary:");
    println!("  Type:        {}", schema.kind());
    println!("  Rules:       {}", rules.join(", "));
    println!("  Nodes:       {}", schema.node_count());
    match schema.children() {
        Children::Fields(_) => println!("  Fields:      {}", fields.join(", ")),
        Children::Elements(elements) => println!("  Elements:    {}", elements.len()),
        Children::Item(item) => println!("  Items:       {}", item.kind()),
        Children::None => {}
    }

    if !types.is_empty() {
        println!("\nNamed Types:");
        for name in &types {
            println!("  {}", name);
        }
    }

    Ok(())
}

fn field_names(schema: &SchemaNode) -> Vec<&str> {
    match schema.children() {
        Children::Fields(fields) => fields.iter().map(|(name, _)| name.as_str()).collect(),
        _ => Vec::new(),
    }
}
