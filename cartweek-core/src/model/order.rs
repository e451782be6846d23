//! Order rows: raw source rows and the enriched rows written to snapshots

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::basket::{Basket, ProductId};

pub type OrderId = u32;
pub type UserId = u32;

/// Dataset partition an order belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalSet {
    /// Historical orders
    #[default]
    Prior,
    Train,
    Test,
}

impl EvalSet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prior => "prior",
            Self::Train => "train",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for EvalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvalSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prior" => Ok(Self::Prior),
            "train" => Ok(Self::Train),
            "test" => Ok(Self::Test),
            other => Err(format!("unknown eval set: {other}")),
        }
    }
}

/// A row of `orders.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOrder {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub eval_set: EvalSet,
    pub order_number: u32,
    pub order_dow: u8,
    pub order_hour_of_day: u8,
    /// Stored as a float (`8.0`) in the source; empty for a user's first order
    pub days_since_prior_order: Option<f64>,
}

/// A row of `order_products__prior.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub add_to_cart_order: u32,
    pub reordered: u8,
}

/// An order with its basket, tenure and reconstructed timestamps.
///
/// This is the row format of every weekly snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedOrder {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub eval_set: EvalSet,
    pub order_number: u32,
    pub order_dow: u8,
    pub order_hour_of_day: u8,
    pub days_since_prior_order: Option<u32>,
    #[serde(rename = "product_id")]
    pub basket: Basket,
    pub total_days_on_platform: u32,
    pub datetime: NaiveDateTime,
    pub date: NaiveDate,
    pub basket_size: usize,
}

impl EnrichedOrder {
    /// First order of its user
    pub fn is_first(&self) -> bool {
        self.days_since_prior_order.is_none()
    }
}
