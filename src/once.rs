//! Non-interactive mode: one pass, printed to stdout.

use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::Serialize;
use std::io::Write;

use crate::catalog::Record;
use crate::config::Config;
use crate::reconcile::ReconcileOutcome;
use crate::services::Services;
use crate::ui::{format_date, truncate};

#[derive(Debug, Serialize)]
struct Row<'a> {
  #[serde(flatten)]
  record: &'a Record,
  origin: &'static str,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
  generated_at: DateTime<Utc>,
  online: bool,
  any_from_cache: bool,
  records: Vec<Row<'a>>,
}

pub async fn run_once(config: &Config, json: bool, use_cache: bool) -> Result<()> {
  let services = Services::start(config, use_cache)?;
  // Let the startup probe correct the OS link state first
  services.monitor.wait_for_first_probe().await;

  let outcome = services.reconciler.reconcile(&config.items).await;
  let online = services.monitor.is_online();

  let output = if json {
    render_json(&outcome, online)?
  } else {
    render_table(&outcome, online)
  };

  let mut stdout = std::io::stdout().lock();
  writeln!(stdout, "{}", output)?;
  Ok(())
}

fn render_json(outcome: &ReconcileOutcome, online: bool) -> Result<String> {
  let report = Report {
    generated_at: Utc::now(),
    online,
    any_from_cache: outcome.any_from_cache,
    records: outcome
      .entries
      .iter()
      .map(|e| Row {
        record: &e.record,
        origin: e.origin.label(),
      })
      .collect(),
  };
  Ok(serde_json::to_string_pretty(&report)?)
}

fn render_table(outcome: &ReconcileOutcome, online: bool) -> String {
  let mut lines = Vec::with_capacity(outcome.entries.len() + 2);

  if !online {
    lines.push("Offline Mode - showing cached data where available".to_string());
  } else if outcome.any_from_cache {
    lines.push("Some repositories could not be fetched - showing cached data".to_string());
  }

  lines.push(format!(
    "{:<40} {:>7} {:<12} {:<10} {:<11}",
    "REPOSITORY", "STARS", "LICENSE", "UPDATED", "SOURCE"
  ));

  for entry in &outcome.entries {
    let record = &entry.record;
    lines.push(format!(
      "{:<40} {:>7} {:<12} {:<10} {:<11}",
      truncate(&record.identifier, 40),
      record.popularity.to_string(),
      truncate(&record.license, 12),
      format_date(record.last_updated),
      entry.origin.label(),
    ));
  }

  lines.join("\n")
}
