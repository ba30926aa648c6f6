use chrono::{DateTime, Utc};
use ratatui::prelude::Color;

use crate::catalog::types::{LICENSE_UNAVAILABLE, LICENSE_UNKNOWN};
use crate::catalog::{PlaceholderReason, RecordOrigin};

/// Truncate to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Display color for a license identifier
pub fn license_color(license: &str) -> Color {
  match license {
    LICENSE_UNAVAILABLE => Color::DarkGray,
    LICENSE_UNKNOWN | "NOASSERTION" => Color::Yellow,
    _ => Color::Green,
  }
}

/// Short marker shown next to records that did not come from the network
pub fn origin_marker(origin: RecordOrigin) -> Option<(&'static str, Color)> {
  match origin {
    RecordOrigin::Network => None,
    RecordOrigin::Cache => Some(("cached", Color::Yellow)),
    RecordOrigin::Placeholder(PlaceholderReason::Offline) => Some(("offline", Color::Red)),
    RecordOrigin::Placeholder(PlaceholderReason::FetchFailed) => Some(("failed", Color::Red)),
  }
}

pub fn format_date(date: Option<DateTime<Utc>>) -> String {
  date
    .map(|d| d.format("%Y-%m-%d").to_string())
    .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_counts_chars() {
    assert_eq!(truncate("മലയാളം ഫോണ്ടുകൾ", 6), "മലയ...");
  }

  #[test]
  fn test_license_color() {
    assert_eq!(license_color("MIT"), Color::Green);
    assert_eq!(license_color("Unknown"), Color::Yellow);
    assert_eq!(license_color("N/A"), Color::DarkGray);
  }

  #[test]
  fn test_origin_marker() {
    assert_eq!(origin_marker(RecordOrigin::Network), None);
    assert_eq!(origin_marker(RecordOrigin::Cache).map(|m| m.0), Some("cached"));
    assert_eq!(
      origin_marker(RecordOrigin::Placeholder(PlaceholderReason::Offline)).map(|m| m.0),
      Some("offline")
    );
  }

  #[test]
  fn test_format_date() {
    assert_eq!(format_date(None), "-");
    let date = "2024-03-01T10:00:00Z".parse().ok();
    assert_eq!(format_date(date), "2024-03-01");
  }
}
