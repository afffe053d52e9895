//! CLI subcommand definitions for tablegrep.
//!
//! The binary is a dry-run surface: it compiles search requests and
//! classifies rows supplied as JSON, without touching any storage engine.

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available subcommands for tablegrep.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List searchable sources, grouped by category
    Sources(SourcesArgs),

    /// Print source schemas as JSON
    Schema(SchemaArgs),

    /// Compile a search request to parameterized SQL
    Compile(CompileArgs),

    /// Classify fetched rows against a search request
    Classify(ClassifyArgs),
}

/// Arguments for the sources subcommand.
#[derive(Args, Debug)]
pub struct SourcesArgs {
    /// Output JSON instead of a human-readable list
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the schema subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Restrict to the given group names (core, advanced, plugin)
    #[arg(long = "group", value_name = "GROUP")]
    pub groups: Vec<String>,
}

/// Arguments for the compile subcommand.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Search request file (JSON: {"source": "...", "filters": [...]})
    #[arg(value_name = "REQUEST")]
    pub request: PathBuf,
}

/// Arguments for the classify subcommand.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Search request file (JSON)
    #[arg(value_name = "REQUEST")]
    pub request: PathBuf,

    /// Rows to classify (JSON array of column/value objects)
    #[arg(value_name = "ROWS")]
    pub rows: PathBuf,

    /// Preview replacing matched content with the given text
    #[arg(long, value_name = "TEXT")]
    pub replace: Option<String>,
}
