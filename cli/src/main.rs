//! takeoff CLI - scenario curves and narrative timelines from the terminal.
//!
//! Three subcommands:
//!
//! - `curve` evaluates a scenario's capacity projections and prints them
//! - `timeline` runs the narrative orchestrator against the live generation
//!   service, streaming progress to stderr and narratives to stdout
//! - `upload-document` uploads the reference PDF and prints the file URI to
//!   wire into the config
//!
//! Logs go to stderr; stdout is reserved for command output.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use takeoff_curve::{
    expected_capacity_series, format_welfare_capacity, moral_consideration_series,
};
use takeoff_engine::{
    TIMELINE_EVENT_CHANNEL_CAPACITY, TakeoffConfig, TimelineRequest, stream_timeline,
};
use takeoff_providers::{
    ApiConfig, ApiKey, DocumentRef, ModelName, files, gemini::GeminiClient,
};
use takeoff_types::{Scenario, TimeSeriesPoint, TimelineEvent};

#[derive(Parser)]
#[command(name = "takeoff", version, about = "Model digital-mind welfare takeoff scenarios")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the projected capacity series for a scenario.
    Curve {
        /// Scenario TOML file. Defaults apply when omitted.
        #[arg(long)]
        scenario: Option<PathBuf>,
        /// Which series to print.
        #[arg(long, value_enum, default_value = "both")]
        series: SeriesKind,
    },
    /// Generate a narrative timeline for a set of years.
    Timeline {
        /// Comma-separated years to narrate, e.g. 2030,2040,2050.
        #[arg(long, value_delimiter = ',', required = true)]
        years: Vec<i32>,
        /// Scenario TOML file. Defaults apply when omitted.
        #[arg(long)]
        scenario: Option<PathBuf>,
        #[arg(long, default_value_t = 2025)]
        current_year: i32,
        /// Emit raw timeline events as JSON lines instead of readable output.
        #[arg(long)]
        json: bool,
    },
    /// Upload a reference document for narrative generation.
    UploadDocument {
        /// Path to the document (PDF).
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SeriesKind {
    Expected,
    Moral,
    Both,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .with(env_filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Curve { scenario, series } => run_curve(scenario.as_deref(), series),
        Command::Timeline {
            years,
            scenario,
            current_year,
            json,
        } => run_timeline(years, scenario.as_deref(), current_year, json).await,
        Command::UploadDocument { path } => run_upload(&path).await,
    }
}

fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    let Some(path) = path else {
        return Ok(Scenario::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario file {}", path.display()))?;
    let scenario: Scenario = toml::from_str(&content)
        .with_context(|| format!("failed to parse scenario file {}", path.display()))?;
    scenario.validate()?;
    Ok(scenario)
}

fn run_curve(scenario_path: Option<&Path>, series: SeriesKind) -> Result<()> {
    let scenario = load_scenario(scenario_path)?;

    if matches!(series, SeriesKind::Expected | SeriesKind::Both) {
        println!("expected capacity:");
        print_series(&expected_capacity_series(&scenario)?);
    }
    if matches!(series, SeriesKind::Moral | SeriesKind::Both) {
        if series == SeriesKind::Both {
            println!();
        }
        println!("moral consideration:");
        print_series(&moral_consideration_series(&scenario)?);
    }

    Ok(())
}

fn print_series(points: &[TimeSeriesPoint]) {
    for point in points {
        println!(
            "{:7.1}  {:>16.1}  {}",
            point.x,
            point.y,
            format_welfare_capacity(point.y)
        );
    }
}

fn generation_client(config: &TakeoffConfig) -> Result<GeminiClient> {
    let api_key = config.google_api_key().ok_or_else(|| {
        anyhow!(
            "no Google API key: set GEMINI_API_KEY or [api_keys].google in {}",
            config_path_hint()
        )
    })?;

    let model = match config.google_model() {
        Some(raw) => ModelName::parse(&raw)?,
        None => ModelName::default_model(),
    };

    let mut api = ApiConfig::new(ApiKey::new(api_key), model);
    if let Some(uri) = config.reference_document() {
        api = api.with_reference_document(DocumentRef::new(uri, config.reference_mime_type()));
    } else {
        tracing::warn!("No reference document configured; prompts will omit the source essay");
    }

    Ok(GeminiClient::new(api))
}

fn config_path_hint() -> String {
    TakeoffConfig::path().map_or_else(
        || "~/.takeoff/config.toml".to_string(),
        |path| path.display().to_string(),
    )
}

async fn run_timeline(
    years: Vec<i32>,
    scenario_path: Option<&Path>,
    current_year: i32,
    json: bool,
) -> Result<()> {
    let scenario = load_scenario(scenario_path)?;
    let config = TakeoffConfig::load()?.unwrap_or_default();
    let client = generation_client(&config)?;

    let request = TimelineRequest {
        scenario,
        years,
        current_year,
    };

    let (tx, mut rx) = mpsc::channel(TIMELINE_EVENT_CHANNEL_CAPACITY);
    let worker = tokio::spawn(async move { stream_timeline(&client, request, tx).await });

    while let Some(event) = rx.recv().await {
        if json {
            println!("{}", serde_json::to_string(&event)?);
            continue;
        }
        match event {
            TimelineEvent::Progress { progress } => {
                tracing::info!("Timeline generation {progress}% complete");
            }
            TimelineEvent::Complete { narratives } => {
                for (year, text) in narratives.iter() {
                    println!("## {year}\n");
                    println!("{text}\n");
                }
            }
            TimelineEvent::Error { error } => {
                tracing::error!("Timeline generation failed: {error}");
            }
        }
    }

    worker.await.context("timeline task panicked")??;
    Ok(())
}

async fn run_upload(path: &Path) -> Result<()> {
    let config = TakeoffConfig::load()?.unwrap_or_default();
    let api_key = config.google_api_key().ok_or_else(|| {
        anyhow!(
            "no Google API key: set GEMINI_API_KEY or [api_keys].google in {}",
            config_path_hint()
        )
    })?;

    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read document {}", path.display()))?;
    let mime_type = mime_type_for(path);

    let document = files::upload_document(&ApiKey::new(api_key), bytes, mime_type).await?;

    println!("name: {}", document.name);
    println!("uri:  {}", document.uri);
    println!();
    println!("Add to {}:", config_path_hint());
    println!("[google]");
    println!("reference_document = \"{}\"", document.uri);

    Ok(())
}

fn mime_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("pdf") => "application/pdf",
        Some("txt") | Some("md") => "text/plain",
        _ => "application/octet-stream",
    }
}
