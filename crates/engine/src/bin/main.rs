// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;
use trilogy_studio_engine::{
    BatchRequest, DiagnosticsRequest, EngineConfig, FormatRequest, ModelRequest, QueryRequest,
    ValidateRequest, compile_batch, compile_single, format_query, get_diagnostics, parse_model,
    validate_query,
};

/// Trilogy Studio query engine
///
/// Every subcommand reads a JSON request from INPUT (or stdin) and writes a
/// JSON response to stdout.
#[derive(Debug, Parser)]
#[command(name = "trilogy-studio", version, about)]
struct Cli {
    /// YAML or JSON engine configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Diagnostics, completions and imports for editor text
    Diagnostics { input: Option<PathBuf> },
    /// Compile a batch of query fragments
    Compile { input: Option<PathBuf> },
    /// Compile one query fragment
    Query { input: Option<PathBuf> },
    /// Render query text in canonical form
    Format { input: Option<PathBuf> },
    /// Validate a query with its imports and extra filters
    Validate { input: Option<PathBuf> },
    /// Summarize the concepts and datasources of one source
    ParseModel { input: Option<PathBuf> },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    tracing::debug!(?config, "engine configured");

    match cli.command {
        Command::Diagnostics { input } => {
            let request: DiagnosticsRequest = read_request(input.as_deref())?;
            write_response(&get_diagnostics(&request.text, &request.sources, &config))
        }
        Command::Compile { input } => {
            let request: BatchRequest = read_request(input.as_deref())?;
            let results = compile_batch(&request, &config).context("batch setup failed")?;
            write_response(&results)
        }
        Command::Query { input } => {
            let request: QueryRequest = read_request(input.as_deref())?;
            let result = compile_single(&request, &config)?;
            write_response(&result)
        }
        Command::Format { input } => {
            let request: FormatRequest = read_request(input.as_deref())?;
            let text = format_query(&request.query, &request.sources, &config)?;
            write_response(&serde_json::json!({ "text": text }))
        }
        Command::Validate { input } => {
            let request: ValidateRequest = read_request(input.as_deref())?;
            write_response(&validate_query(
                &request.query,
                &request.sources,
                &request.imports,
                &request.extra_filters,
                &config,
            ))
        }
        Command::ParseModel { input } => {
            let request: ModelRequest = read_request(input.as_deref())?;
            write_response(&parse_model(&request.name, &request.sources, &config)?)
        }
    }
}

fn read_request<T: DeserializeOwned>(input: Option<&Path>) -> Result<T> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("invalid request JSON")
}

fn write_response<T: Serialize>(response: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}
