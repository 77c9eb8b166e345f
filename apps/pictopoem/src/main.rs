use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{DirectoryDownloads, HttpQuoteApi, SelectedFile, WorkflowController};
use shared::protocol::STORY_FILENAME;

mod config;
mod surface;

use config::{load_settings, DEFAULT_CONFIG_FILE};
use surface::TerminalSurface;

/// Find a literary passage for a picture and optionally save it as a story image.
#[derive(Parser, Debug)]
struct Args {
    /// Image to send.
    image: PathBuf,
    /// Also render and download the story image.
    #[arg(long)]
    share: bool,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    download_dir: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let mut settings = load_settings(&args.config)?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(download_dir) = args.download_dir {
        settings.download_dir = download_dir;
    }

    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    let api = HttpQuoteApi::new(&settings.server_url)
        .with_context(|| format!("invalid server url '{}'", settings.server_url))?;
    let downloads = Arc::new(DirectoryDownloads::new(&settings.download_dir));
    let controller = WorkflowController::new(
        Arc::new(api),
        Arc::new(TerminalSurface),
        downloads.clone(),
    );

    let file = SelectedFile::from_path(&args.image).await?;
    controller.select_image(Some(file)).await?;

    if controller.generate().await.is_err() {
        return Ok(ExitCode::FAILURE);
    }

    if args.share {
        if controller.export_story().await.is_err() {
            return Ok(ExitCode::FAILURE);
        }
        println!(
            "Saved story image to {}",
            downloads.path_for(STORY_FILENAME).display()
        );
    }

    Ok(ExitCode::SUCCESS)
}
