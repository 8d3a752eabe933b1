// Copyright (c) 2026 Brickscan
// SPDX-License-Identifier: BUSL-1.1
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use brickscan_node::api::{start_server, AppState};
use brickscan_node::config::AppConfig;
use brickscan_node::recognition::BrickognizeClient;
use brickscan_node::session::InMemorySessionStore;
use brickscan_node::vision::{OcrEngine, TesseractEngine};
use clap::Parser;
use tracing::{info, warn};

/// Catalog-scan part marking service.
#[derive(Debug, Parser)]
#[command(name = "brickscan-node", version)]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, env = "BRICKSCAN_HOST", default_value = "0.0.0.0")]
    host: String,

    /// HTTP port
    #[arg(long, env = "BRICKSCAN_PORT", default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = AppConfig::from_env();

    let ocr = Arc::new(TesseractEngine::new());
    if !ocr.is_available() {
        warn!("tesseract not found; quantity OCR will report null results");
    }

    let recognizer = Arc::new(BrickognizeClient::new(config.recognizer.clone())?);
    let state = AppState {
        store: Arc::new(InMemorySessionStore::new()),
        ocr,
        recognizer,
        config: Arc::new(config),
    };

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("starting brickscan-node v{}", env!("CARGO_PKG_VERSION"));
    start_server(state, addr).await
}
