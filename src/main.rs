// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::Context as _;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod camera;
mod error;
mod image_buffer;
mod metrics;
mod pipeline;
mod render;
mod settings;
mod stream;
mod temperature;
mod util;

use crate::app::App;
use crate::settings::{Args, Settings};

fn init_logging(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::from_args();
    init_logging(&args);
    let config = Settings::from_path(&args.config_path)?;
    let app = App::new(config)?;
    info!(address = %app.address(), "Started");
    tokio::pin!(app);
    let result = tokio::select! {
        result = &mut app => result,
        interrupt = tokio::signal::ctrl_c() => {
            interrupt.context("Unable to listen for interrupt signal")
        }
    };
    info!(active_clients = app.active_clients(), "Shutting down");
    result
}
