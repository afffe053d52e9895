//! Implementations of the CLI subcommands.

use crate::cli::{ClassifyArgs, CompileArgs, SchemaArgs, SourcesArgs};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde::Deserialize;
use std::path::Path;
use tablegrep::filter::{Action, ColumnMatch, FilterItem, RawFilter};
use tablegrep::source::{SourceHandler, SourceRegistry};

/// A search request as read from disk: one source plus its filter criteria.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub source: String,
    #[serde(default)]
    pub filters: Vec<RawFilter>,
}

fn load_request(path: &Path) -> Result<SearchRequest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid search request: {}", path.display()))
}

/// Closest known source name for a typo, if any is close enough.
fn suggest_source(registry: &SourceRegistry, name: &str) -> Option<String> {
    registry
        .names()
        .into_iter()
        .map(|candidate| (strsim::jaro_winkler(name, &candidate), candidate))
        .filter(|(score, _)| *score > 0.8)
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(_, candidate)| candidate)
}

fn handler_for(
    registry: &SourceRegistry,
    request: &SearchRequest,
) -> Result<(Box<dyn SourceHandler>, Vec<FilterItem>)> {
    let filters = registry.build_filters(&request.source, &request.filters);

    match registry.get(&request.source, &filters) {
        Some(handler) => {
            for raw in &request.filters {
                if !filters.iter().any(|f| f.column() == raw.column) {
                    eprintln!(
                        "Warning: skipping filter for unknown column '{}'",
                        raw.column
                    );
                }
            }
            Ok((handler, filters))
        }
        None => match suggest_source(registry, &request.source) {
            Some(suggestion) => bail!(
                "Unknown source '{}'. Did you mean '{}'?",
                request.source,
                suggestion
            ),
            None => bail!("Unknown source '{}'", request.source),
        },
    }
}

pub fn sources(args: &SourcesArgs) -> Result<()> {
    let registry = SourceRegistry::new();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&registry.descriptors())?);
        return Ok(());
    }

    for (group, descriptors) in registry.grouped() {
        println!("{}", group.label().bold());
        for descriptor in descriptors {
            println!(
                "  {:<14} {}",
                descriptor.name,
                descriptor.label.dimmed()
            );
        }
    }
    Ok(())
}

pub fn schema(args: &SchemaArgs) -> Result<()> {
    let registry = SourceRegistry::new();
    let schemas = registry.schemas(&args.groups);
    println!("{}", serde_json::to_string_pretty(&schemas)?);
    Ok(())
}

pub fn compile(args: &CompileArgs) -> Result<()> {
    let registry = SourceRegistry::new();
    let request = load_request(&args.request)?;
    let (handler, _filters) = handler_for(&registry, &request)?;

    let sql = handler.render_query();
    println!("{}", sql.text);
    for (i, param) in sql.params.iter().enumerate() {
        println!("  {} {}", format!("?{}", i + 1).dimmed(), param);
    }
    Ok(())
}

pub fn classify(args: &ClassifyArgs) -> Result<()> {
    let registry = SourceRegistry::new();
    let request = load_request(&args.request)?;
    let (_handler, filters) = handler_for(&registry, &request)?;

    let text = std::fs::read_to_string(&args.rows)
        .with_context(|| format!("Failed to read rows file: {}", args.rows.display()))?;
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid rows file: {}", args.rows.display()))?;

    let action = match &args.replace {
        Some(with) => Action::Replace(with.clone()),
        None => Action::Search,
    };

    for (index, row) in rows.iter().enumerate() {
        let mut matched_any = false;
        let mut parts = Vec::new();

        for (column, value) in row {
            let raw = raw_value(value);
            // Filters on the same column combine conjunctively, matching how
            // their query contributions are ANDed together.
            let results: Vec<ColumnMatch> = filters
                .iter()
                .filter(|f| f.column() == column.as_str())
                .map(|f| f.evaluate(&raw, &action))
                .collect();

            if !results.is_empty() && results.iter().all(|r| r.matched) {
                matched_any = true;
                let result = &results[0];
                parts.push(format!("{}={}", column, highlight(result)));
                if let Some(replacement) = &result.replacement {
                    parts.push(format!("-> {}", replacement.green()));
                }
            } else {
                parts.push(format!("{}={}", column, raw));
            }
        }

        let marker = if matched_any {
            "match".green().bold().to_string()
        } else {
            "     ".to_string()
        };
        println!("{} [{}] {}", marker, index, parts.join("  "));
    }
    Ok(())
}

fn raw_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a matched value with its spans emphasized.
fn highlight(result: &ColumnMatch) -> String {
    if result.spans.is_empty() {
        return result.value.yellow().to_string();
    }
    let mut out = String::new();
    let mut cursor = 0;
    for span in &result.spans {
        out.push_str(&result.value[cursor..span.start]);
        out.push_str(&result.value[span.start..span.end].yellow().bold().to_string());
        cursor = span.end;
    }
    out.push_str(&result.value[cursor..]);
    out
}
