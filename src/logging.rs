//! File logging; stdout belongs to the terminal UI.

use color_eyre::{eyre::eyre, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "fosshub.log";

/// Env var consulted before `RUST_LOG`
const FILTER_ENV: &str = "FOSSHUB_LOG";

/// Install the global subscriber writing to `log_dir/fosshub.log`.
///
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init(log_dir: &Path) -> Result<WorkerGuard> {
  std::fs::create_dir_all(log_dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", log_dir.display(), e))?;

  let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
  let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

  tracing_subscriber::fmt()
    .with_writer(non_blocking)
    .with_env_filter(env_filter())
    .with_ansi(false)
    .with_target(false)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}

fn env_filter() -> EnvFilter {
  filter_directives(
    std::env::var(FILTER_ENV).ok(),
    std::env::var(EnvFilter::DEFAULT_ENV).ok(),
  )
  .and_then(|directives| EnvFilter::try_new(directives).ok())
  .unwrap_or_else(|| EnvFilter::new("info"))
}

/// First non-empty of the two variables
fn filter_directives(own: Option<String>, rust_log: Option<String>) -> Option<String> {
  own
    .into_iter()
    .chain(rust_log)
    .find(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_own_variable_wins() {
    assert_eq!(
      filter_directives(Some("debug".into()), Some("warn".into())),
      Some("debug".to_string())
    );
  }

  #[test]
  fn test_falls_back_to_rust_log() {
    assert_eq!(
      filter_directives(Some("  ".into()), Some("warn".into())),
      Some("warn".to_string())
    );
    assert_eq!(filter_directives(None, None), None);
  }
}
