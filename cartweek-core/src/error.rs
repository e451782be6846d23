//! Error types for cartweek-core

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{OrderId, UserId};
use crate::source::SourceError;

/// Top-level error type for cartweek-core
#[derive(Error, Debug)]
pub enum CartweekError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Enrichment error: {0}")]
    Enrich(#[from] EnrichError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Dashboard error: {0}")]
    Dashboard(#[from] DashboardError),
}

/// Errors decoding a persisted basket string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BasketError {
    #[error("Basket is not enclosed in brackets: {0:?}")]
    MissingBrackets(String),

    #[error("Basket element is not a product id: {0:?}")]
    InvalidElement(String),
}

/// Malformed input found while enriching orders. Any of these aborts the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnrichError {
    #[error("Order {order_id} has hour of day {hour}, expected 0-23")]
    HourOutOfRange {
        order_id: OrderId,
        hour: u8,
    },

    #[error("User {user_id} has more than one order number {order_number}")]
    DuplicateOrderNumber {
        user_id: UserId,
        order_number: u32,
    },

    #[error("Order {order_id} is not the user's first order but has no days since prior order")]
    MissingDelta { order_id: OrderId },

    #[error("Order {order_id} is the user's first order but has a days since prior order value")]
    UnexpectedDelta { order_id: OrderId },

    #[error("Order {order_id} has invalid days since prior order: {value}")]
    InvalidDelta {
        order_id: OrderId,
        value: f64,
    },

    #[error("Order {order_id} has no order lines")]
    EmptyBasket { order_id: OrderId },

    #[error("Order {order_id} date falls outside the representable range")]
    DateOutOfRange { order_id: OrderId },
}

/// Errors reading or writing processed archives
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Not a snapshot archive name: {0}")]
    InvalidArchiveName(String),

    #[error("Archive {path} holds {found:?}, expected {expected}")]
    UnexpectedEntry {
        path: PathBuf,
        expected: String,
        found: Option<String>,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Errors serving the dashboard
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Unknown week: {0}")]
    UnknownWeek(String),

    #[error("Week {0} has no older week to compare against")]
    NoPreviousWeek(String),

    #[error("No weeks available in {0}")]
    NoWeeks(PathBuf),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}
