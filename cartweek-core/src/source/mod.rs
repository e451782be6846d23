//! Raw dataset: fixed remote files fetched into local storage, then read as typed rows

mod config;
mod error;
mod fetcher;
mod raw;

pub use config::{
    AISLES_FILE, DEFAULT_BASE_URL, DEPARTMENTS_FILE, ORDER_PRODUCTS_FILE, ORDERS_FILE,
    PRODUCTS_FILE, SOURCE_FILES, SourceConfig,
};
pub use error::SourceError;
pub use fetcher::{DirectoryFetcher, Downloader, HttpFetcher, SourceFetcher};
pub use raw::{RawDataset, load_dimensions, read_baskets, read_csv};
