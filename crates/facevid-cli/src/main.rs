//! FaceVid command-line interface.
//!
//! Runs the full generation pipeline for one subject: a directory of
//! reference photos plus a scenario string in, a rendered clip path out.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use facevid_pipeline::{Pipeline, PipelineConfig};
use facevid_providers::{GeminiClient, ImagenClient, VeoClient};

#[derive(Parser)]
#[command(name = "facevid")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate a face-consistent video from reference photos", long_about = None)]
struct Cli {
    /// Directory containing reference photos of the subject (flat, no recursion)
    reference_dir: PathBuf,

    /// Scenario to depict, e.g. "a man wearing a spiderman outfit in the desert"
    scenario: String,

    /// Root directory for run outputs (overrides FACEVID_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Number of candidate images to generate (overrides FACEVID_CANDIDATE_COUNT)
    #[arg(long)]
    candidates: Option<usize>,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

fn init_tracing(json: bool) {
    let use_json = json
        || std::env::var("LOG_FORMAT")
            .map(|v| v.to_lowercase() == "json")
            .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("facevid=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.json);

    let mut config = PipelineConfig::from_env();
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(candidates) = cli.candidates.filter(|n| *n >= 1) {
        config.candidate_count = candidates;
    }

    let vision = GeminiClient::new().context("failed to create Gemini client")?;
    let images = ImagenClient::new().context("failed to create Imagen client")?;
    let video = VeoClient::new()
        .context("failed to create Veo client")?
        .with_polling(config.poll_interval, config.poll_timeout);

    info!(
        "Starting run for {} ({} candidate(s))",
        cli.reference_dir.display(),
        config.candidate_count
    );

    let pipeline = Pipeline::new(
        config,
        Arc::new(vision),
        Arc::new(images),
        Arc::new(video),
    );

    match pipeline.run(&cli.reference_dir, &cli.scenario).await {
        Ok(run) => {
            let video_path = run
                .video_path
                .as_ref()
                .expect("completed run has a video path");
            info!(run_id = %run.id, "Run complete");
            println!("{}", video_path.display());
            Ok(())
        }
        Err(e) => {
            if e.is_input_error() {
                error!("Run failed: {}. Fix the input and try again.", e);
            } else if e.is_transient() {
                error!("Run failed: {}. The whole run may be retried.", e);
            } else {
                error!("Run failed: {}", e);
            }
            std::process::exit(1);
        }
    }
}
