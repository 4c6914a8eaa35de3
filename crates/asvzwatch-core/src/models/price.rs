use serde::{Deserialize, Serialize};

use crate::utils::parse_timestamp;

/// One observed price of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(default)]
    pub id: String,
    pub asvz_id: String,
    pub price: f64,
    pub timestamp: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Price series of a single listing plus its title, if the listing was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceHistory {
    pub title: Option<String>,
    pub points: Vec<PricePoint>,
}

impl PriceHistory {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sort points chronologically. Unparseable timestamps sort first.
    pub fn sort_chronologically(&mut self) {
        self.points.sort_by_key(|p| parse_timestamp(&p.timestamp));
    }

    /// Difference to the previous point for each point (`None` for the first).
    pub fn changes(&self) -> Vec<Option<f64>> {
        let mut previous: Option<f64> = None;
        self.points
            .iter()
            .map(|p| {
                let change = previous.map(|prev| p.price - prev);
                previous = Some(p.price);
                change
            })
            .collect()
    }

    pub fn latest_price(&self) -> Option<f64> {
        self.points.last().map(|p| p.price)
    }
}
