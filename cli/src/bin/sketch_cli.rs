use clap::{Parser, Subcommand};
use cli::{process_images, RunOptions};
use color_eyre::eyre::Result;
use sketch::{PipelineConfig, SceneDescription};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect primitives in each image and synthesize a scene for it
    Run {
        /// Images to process, one after another
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Pipeline configuration (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory for the per-image scene JSON documents
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Directory for debug overlays of the detections
        #[arg(long)]
        overlay_dir: Option<PathBuf>,
    },
    /// Print the JSON schema of the scene document
    Schema,
    /// Print the default pipeline configuration as TOML
    Defaults,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            images,
            config,
            output_dir,
            overlay_dir,
        } => {
            let options = RunOptions {
                config,
                output_dir,
                overlay_dir,
            };
            let summaries = process_images(&images, &options)?;
            let failed = summaries.iter().filter(|s| s.error.is_some()).count();
            if failed > 0 {
                warn!("{failed} of {} images failed", summaries.len());
            }
            println!("{}", serde_json::to_string_pretty(&summaries)?);
            info!("✅ Processed {} images", summaries.len() - failed);
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&SceneDescription::schema())?);
        }
        Commands::Defaults => {
            print!("{}", PipelineConfig::default().to_toml()?);
        }
    }

    Ok(())
}
