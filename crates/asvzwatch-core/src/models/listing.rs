use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::{format_distance_strict, parse_timestamp};

/// A live listing from `asvz_marketplace`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceItem {
    pub id: String,
    pub asvz_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub updated: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A removed listing from `asvz_marketplace_deleted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedItem {
    #[serde(flatten)]
    pub item: MarketplaceItem,
    #[serde(rename = "removeTime", default)]
    pub remove_time: Option<String>,
    #[serde(rename = "addTime", default)]
    pub add_time: Option<String>,
}

/// Removal details shown for deleted search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Removal {
    pub deleted_date: Option<String>,
    pub last_available: Option<String>,
    /// Time between `addTime` and `removeTime`, `-` when unknown
    pub duration_online: String,
}

/// A search result: a live listing, or a deleted one with its removal info.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    #[serde(flatten)]
    pub item: MarketplaceItem,
    pub removal: Option<Removal>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl Listing {
    pub fn live(item: MarketplaceItem) -> Self {
        Self { item, removal: None }
    }

    pub fn deleted(deleted: DeletedItem) -> Self {
        let deleted_date = non_empty(&deleted.remove_time)
            .or_else(|| Some(deleted.item.updated.as_str()).filter(|v| !v.is_empty()))
            .or_else(|| non_empty(&deleted.add_time))
            .map(str::to_string);

        let duration_online = match (non_empty(&deleted.add_time), non_empty(&deleted.remove_time)) {
            (Some(added), Some(removed)) => match (parse_timestamp(added), parse_timestamp(removed)) {
                (Some(from), Some(to)) => format_distance_strict(from, to),
                _ => "-".to_string(),
            },
            _ => "-".to_string(),
        };

        Self {
            item: deleted.item,
            removal: Some(Removal {
                last_available: deleted_date.clone(),
                deleted_date,
                duration_online,
            }),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.removal.is_some()
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_deleted() {
            "deleted"
        } else {
            "live"
        }
    }
}

/// Which column a text search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    Title,
    Id,
    User,
    All,
}

impl SearchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Title => "title",
            SearchField::Id => "id",
            SearchField::User => "user",
            SearchField::All => "all",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(SearchField::Title),
            "id" => Ok(SearchField::Id),
            "user" => Ok(SearchField::User),
            "all" => Ok(SearchField::All),
            other => Err(format!(
                "unknown search field '{}' (expected title, id, user or all)",
                other
            )),
        }
    }
}
