mod app;
mod cache;
mod catalog;
mod commands;
mod config;
mod connectivity;
mod error;
mod event;
mod filter;
mod logging;
mod once;
mod reconcile;
mod services;
mod session;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::info;

use crate::cache::CacheLayer;
use crate::catalog::{Record, TrackedItem};

#[derive(Parser, Debug)]
#[command(name = "fosshub")]
#[command(about = "An offline-first terminal directory of open-source projects")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/fosshub/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Run a single pass, print the results and exit
  #[arg(long)]
  once: bool,

  /// With --once, print JSON instead of a table
  #[arg(long, requires = "once")]
  json: bool,

  /// Remove one repository (namespace/name) from the cache and exit
  #[arg(long, value_name = "NS/NAME", conflicts_with = "once")]
  forget: Option<TrackedItem>,

  /// Neither read nor write the on-disk cache
  #[arg(long)]
  no_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  let _log_guard = logging::init(&config.log_dir()?)?;
  info!(version = env!("CARGO_PKG_VERSION"), items = config.items.len(), "starting");

  if let Some(item) = args.forget {
    let cache = CacheLayer::new(services::open_storage(&config, !args.no_cache));
    if cache.remove::<Record>(&item.key()).await {
      println!("Removed {} from the cache", item);
    } else {
      println!("{} was not cached", item);
    }
    return Ok(());
  }

  if args.once {
    return once::run_once(&config, args.json, !args.no_cache).await;
  }

  // Initialize and run the app
  let services = services::Services::start(&config, !args.no_cache)?;
  let mut app = app::App::new(config, services);
  app.run().await?;

  Ok(())
}
