use serde::{Deserialize, Serialize};

/// One scraper run: how many listings were added, updated and deleted,
/// plus the running totals after the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub added: i64,
    // Older records name this column `update`
    #[serde(default, alias = "update")]
    pub updated: i64,
    #[serde(default)]
    pub deleted: i64,
    pub timestamp: String,
    #[serde(default)]
    pub total_items: i64,
    #[serde(default)]
    pub total_value: f64,
}
