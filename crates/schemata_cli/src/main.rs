mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "schemata")]
#[command(version, about = "Schema-driven validation and sanitization of structured data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a schema and print a summary of it
    Check {
        /// Path to the schema file (YAML, TOML or JSON)
        schema: PathBuf,

        /// File of named types (name -> schema description)
        #[arg(short, long)]
        types: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Validate a data document against a schema
    Validate {
        /// Path to the schema file (YAML, TOML or JSON)
        schema: PathBuf,

        /// Path to the data file (YAML, TOML or JSON)
        data: PathBuf,

        /// File of named types (name -> schema description)
        #[arg(short, long)]
        types: Option<PathBuf>,

        /// File of validation options
        #[arg(short, long)]
        options: Option<PathBuf>,

        /// Treat every field as required unless its schema says otherwise
        #[arg(long)]
        all_required: bool,

        /// Accept null everywhere unless a schema says otherwise
        #[arg(long)]
        all_nullable: bool,

        /// Accept empty strings everywhere unless a schema says otherwise
        #[arg(long)]
        all_blankable: bool,

        /// Accept undeclared fields everywhere unless a schema says otherwise
        #[arg(long)]
        all_unknown_allowed: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print a cleaned copy of a data document
    Sanitize {
        /// Path to the schema file (YAML, TOML or JSON)
        schema: PathBuf,

        /// Path to the data file (YAML, TOML or JSON)
        data: PathBuf,

        /// File of named types (name -> schema description)
        #[arg(short, long)]
        types: Option<PathBuf>,

        /// Keep surrounding whitespace in strings
        #[arg(long)]
        no_trim: bool,

        /// Keep fields the schema does not declare
        #[arg(long)]
        keep_unknown: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // Logs go to stderr so command output stays machine readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Check {
            schema,
            types,
            format,
        } => commands::check::execute(&schema, types.as_deref(), format),

        Commands::Validate {
            schema,
            data,
            types,
            options,
            all_required,
            all_nullable,
            all_blankable,
            all_unknown_allowed,
            format,
        } => {
            let overrides = commands::validate::Overrides {
                all_required,
                all_nullable,
                all_blankable,
                all_unknown_allowed,
            };
            commands::validate::execute(
                &schema,
                &data,
                types.as_deref(),
                options.as_deref(),
                overrides,
                format,
            )
        }

        Commands::Sanitize {
            schema,
            data,
            types,
            no_trim,
            keep_unknown,
        } => commands::sanitize::execute(&schema, &data, types.as_deref(), !no_trim, !keep_unknown),
    }
}
