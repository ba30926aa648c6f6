//! Client-side text and license filtering of displayed records.

use crate::catalog::types::LICENSE_UNKNOWN;
use crate::catalog::Record;
use crate::reconcile::Reconciled;

/// License choices offered in the UI, in cycling order
const LICENSE_CHOICES: &[&str] = &["MIT", "GPL-3.0", "Apache-2.0", LICENSE_UNKNOWN];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LicenseFilter {
  #[default]
  All,
  Only(String),
}

impl LicenseFilter {
  /// Next choice: All → MIT → GPL-3.0 → Apache-2.0 → Unknown → All
  pub fn cycle(&self) -> Self {
    let next = match self {
      LicenseFilter::All => Some(0),
      LicenseFilter::Only(current) => LICENSE_CHOICES
        .iter()
        .position(|l| *l == current.as_str())
        .map(|i| i + 1)
        .filter(|i| *i < LICENSE_CHOICES.len()),
    };

    match next {
      Some(i) => LicenseFilter::Only(LICENSE_CHOICES[i].to_string()),
      None => LicenseFilter::All,
    }
  }

  pub fn label(&self) -> &str {
    match self {
      LicenseFilter::All => "All licenses",
      LicenseFilter::Only(license) => license,
    }
  }

  fn matches(&self, record: &Record) -> bool {
    match self {
      LicenseFilter::All => true,
      LicenseFilter::Only(license) => record.license == *license,
    }
  }
}

/// Active filters; an empty query and `All` let everything through
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
  pub query: String,
  pub license: LicenseFilter,
}

impl RecordFilter {
  pub fn is_active(&self) -> bool {
    !self.query.trim().is_empty() || self.license != LicenseFilter::All
  }

  pub fn matches(&self, record: &Record) -> bool {
    let query = self.query.trim().to_lowercase();
    if !query.is_empty() {
      let text = format!(
        "{} {}",
        record.identifier,
        record.description.as_deref().unwrap_or("")
      )
      .to_lowercase();
      if !text.contains(&query) {
        return false;
      }
    }

    self.license.matches(record)
  }

  pub fn apply<'a>(&self, entries: &'a [Reconciled]) -> Vec<&'a Reconciled> {
    entries.iter().filter(|e| self.matches(&e.record)).collect()
  }
}
