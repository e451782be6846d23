//! Where the raw dataset comes from

use serde::{Deserialize, Serialize};

/// Order lines of the historical orders
pub const ORDER_PRODUCTS_FILE: &str = "order_products__prior.csv";
pub const ORDERS_FILE: &str = "orders.csv";
pub const PRODUCTS_FILE: &str = "products.csv";
pub const AISLES_FILE: &str = "aisles.csv";
pub const DEPARTMENTS_FILE: &str = "departments.csv";

/// The five files every preparation run fetches
pub const SOURCE_FILES: [&str; 5] = [
    ORDER_PRODUCTS_FILE,
    ORDERS_FILE,
    PRODUCTS_FILE,
    AISLES_FILE,
    DEPARTMENTS_FILE,
];

/// Public mirror of the Instacart orders dataset
pub const DEFAULT_BASE_URL: &str =
    "https://github.com/khanhnamle1994/instacart-orders/raw/master/data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL the file names are appended to
    pub base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl SourceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Download URL of a source file
    pub fn url_for(&self, filename: &str) -> String {
        format!(
            "{}/{}?download=",
            self.base_url.trim_end_matches('/'),
            filename
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_default_mirror() {
        let config = SourceConfig::default();
        assert_eq!(
            config.url_for(ORDERS_FILE),
            "https://github.com/khanhnamle1994/instacart-orders/raw/master/data/orders.csv?download="
        );
    }

    #[test]
    fn test_url_for_strips_trailing_slash() {
        let config = SourceConfig::new("http://localhost:8000/data/");
        assert_eq!(
            config.url_for(AISLES_FILE),
            "http://localhost:8000/data/aisles.csv?download="
        );
    }

    #[test]
    fn test_source_files_are_distinct() {
        let mut files = SOURCE_FILES.to_vec();
        files.sort();
        files.dedup();
        assert_eq!(files.len(), 5);
    }
}
