use crate::models::report::{Category, Report, ReportStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Active category or status filter. `All` disables it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Selector {
    #[default]
    All,
    Category(Category),
    Status(ReportStatus),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown filter: {0}")]
pub struct SelectorError(pub String);

impl Selector {
    /// Parse the label shown on a filter badge: "All", a category label or
    /// a status name in any case. Category labels must match exactly.
    pub fn parse(raw: &str) -> Result<Self, SelectorError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Selector::All);
        }
        if let Some(category) = Category::from_label(trimmed) {
            return Ok(Selector::Category(category));
        }
        if let Some(status) = ReportStatus::from_name(trimmed) {
            return Ok(Selector::Status(status));
        }
        Err(SelectorError(raw.to_string()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Selector::All => "All",
            Selector::Category(category) => category.label(),
            Selector::Status(status) => status.label(),
        }
    }

    pub fn matches(&self, report: &Report) -> bool {
        match self {
            Selector::All => true,
            Selector::Category(category) => report.category == *category,
            Selector::Status(status) => report.status == *status,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn matches_query(report: &Report, needle: &str) -> bool {
    report.title.to_lowercase().contains(needle)
        || report.description.to_lowercase().contains(needle)
        || report.location.to_lowercase().contains(needle)
}

/// Reports that pass the selector and contain `query` (case-insensitive) in
/// their title, description or location. Input order is preserved.
pub fn filter(reports: &[Report], query: &str, selector: &Selector) -> Vec<Report> {
    let needle = query.to_lowercase();

    reports
        .iter()
        .filter(|report| selector.matches(report))
        .filter(|report| needle.is_empty() || matches_query(report, &needle))
        .cloned()
        .collect()
}
