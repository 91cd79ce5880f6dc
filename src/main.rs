mod app;
mod data;
mod util;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use data::{FixtureGraphQuery, GraphQuery, HttpGraphQuery};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the reconciliation backend's graph API.
    #[arg(long, default_value = "http://127.0.0.1:8000/api/reconcile")]
    backend_url: String,

    /// Explore an exported graph JSON file instead of a live backend.
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Node limit for the default (unscoped) graph query.
    #[arg(long, default_value_t = 200)]
    limit: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let query: Arc<dyn GraphQuery> = match args.fixture {
        Some(path) => Arc::new(FixtureGraphQuery::new(path)),
        None => Arc::new(HttpGraphQuery::new(&args.backend_url)?),
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "taxgraph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::TradeGraphApp::new(cc, query, args.limit)))
        }),
    )
    .map_err(|error| anyhow::anyhow!("failed to run ui: {error}"))
}
