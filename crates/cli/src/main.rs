//! # postimage: command-line harness
//!
//! Runs one image file through the post image processor, exactly as a pipeline
//! host would hand it a record, and prints the routed relationship and the
//! resulting attributes as JSON.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use postimage::{
    load_config, HttpTransport, MemorySession, PostImageProcessor, Relationship,
};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a YAML configuration file (defaults to ./postimage.yml when present)
    #[arg(long, global = true, env = "POSTIMAGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Post an image file as one record and print the outcome
    Post(PostArgs),
    /// Print the processor's properties and relationships
    Describe,
}

#[derive(Parser, Debug)]
struct PostArgs {
    /// The image file used as the record content
    image: PathBuf,
    /// A record attribute as key=value (repeatable), e.g. --attr url=http://host/predict
    #[arg(long = "attr", value_parser = parse_key_val)]
    attributes: Vec<(String, String)>,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("invalid attribute '{s}', expected key=value"))
}

#[derive(Serialize)]
struct PostOutcome<'a> {
    relationship: Relationship,
    attributes: &'a HashMap<String, String>,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Post(args) => handle_post(cli.config.clone(), args).await,
        Commands::Describe => handle_describe(),
    }
}

// --- Command Handlers ---

async fn handle_post(config_path: Option<PathBuf>, args: &PostArgs) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let content = fs::read(&args.image)
        .with_context(|| format!("Failed to read image '{}'", args.image.display()))?;
    info!(
        "Posting '{}' ({} bytes) with {} attribute(s).",
        args.image.display(),
        content.len(),
        args.attributes.len()
    );

    let transport = HttpTransport::new(&config.transport)?;
    let processor = PostImageProcessor::new(config.processor, Arc::new(transport));

    let mut session = MemorySession::new();
    session.enqueue(content, args.attributes.iter().cloned().collect());
    let Some(relationship) = processor.on_trigger(&mut session).await else {
        bail!("The record was not processed.");
    };

    let (flow_file, _) = session
        .transferred()
        .last()
        .context("The processor routed no record.")?;
    let outcome = PostOutcome {
        relationship,
        attributes: &flow_file.attributes,
    };
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if relationship == Relationship::Failure {
        bail!("The record was routed to failure.");
    }
    Ok(())
}

fn handle_describe() -> Result<()> {
    let relationships: Vec<_> = PostImageProcessor::relationships()
        .iter()
        .map(|r| json!({ "name": r.name(), "description": r.description() }))
        .collect();
    let description = json!({
        "properties": PostImageProcessor::property_descriptors(),
        "relationships": relationships,
        "dynamic_properties": "Any other property is sent as an extra multipart text field.",
    });
    println!("{}", serde_json::to_string_pretty(&description)?);
    Ok(())
}
