mod app;
mod modules;
mod types;
mod utils;

use crate::{
    app::App,
    types::{Config, StartupError, ToContext},
};
use std::process;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

async fn start() -> Result<(), StartupError> {
    let config = Config::from_env()?;
    let ctx = Arc::new(config.to_context().await?);

    App::new(ctx).serve().await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = start().await {
        tracing::error!("Failed to start: {}", err);
        process::exit(1);
    }
}
