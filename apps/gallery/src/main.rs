use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    load_settings, ControllerEvent, ControllerOptions, HttpPhotoApi, QueryController,
};
use shared::domain::PageSize;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod ui;

use commands::{parse_intent, resolve, Action, HELP};

#[derive(Parser, Debug)]
#[command(name = "gallery", about = "Browse a remote photo service from the terminal")]
struct Args {
    /// Settings file; defaults to ./gallery.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    page_size: Option<PageSize>,
    #[arg(long)]
    debounce_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref());
    if let Some(url) = args.api_url {
        settings.api_base_url = url;
    }
    if let Some(size) = args.page_size {
        settings.default_page_size = size;
    }
    if let Some(ms) = args.debounce_ms {
        settings.debounce_ms = ms;
    }
    settings.validate()?;

    let api = HttpPhotoApi::with_timeout(settings.api_base_url.clone(), settings.request_timeout())
        .context("failed to build HTTP client")?;
    let controller = QueryController::new(Arc::new(api), ControllerOptions::from(&settings));
    let options = controller.options();
    info!(
        api = %settings.api_base_url,
        debounce_ms = options.debounce.as_millis() as u64,
        page_size = options.page_size.get(),
        "gallery started"
    );

    let mut events = controller.subscribe();
    let renderer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ControllerEvent::StateChanged(state)) => {
                    println!("{}", ui::render::render(&state));
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "renderer fell behind controller events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    controller.start().await;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let intent = match parse_intent(&line) {
            Ok(intent) => intent,
            Err(err) => {
                println!("{err:#}");
                continue;
            }
        };

        let state = controller.snapshot().await;
        match resolve(intent, &state) {
            Action::SetSearch(text) => controller.set_search_text(text).await,
            Action::SetPage(page) => controller.set_page_number(page).await?,
            Action::SetPageSize(size) => controller.set_page_size(size).await,
            Action::ShowHelp => println!("{HELP}"),
            Action::Refused(reason) => println!("{reason}"),
            Action::Quit => break,
        }
    }

    renderer.abort();
    Ok(())
}
