//! Reading the raw CSV tables from the raw directory

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::config::{AISLES_FILE, DEPARTMENTS_FILE, ORDER_PRODUCTS_FILE, ORDERS_FILE, PRODUCTS_FILE};
use super::error::SourceError;
use crate::enrich::BasketIndex;
use crate::model::{Aisle, Department, Dimensions, OrderLine, Product, RawOrder};

fn open_csv(path: &Path) -> Result<csv::Reader<BufReader<File>>, SourceError> {
    if !path.exists() {
        return Err(SourceError::MissingFile(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|e| SourceError::io(path, e))?;
    Ok(csv::Reader::from_reader(BufReader::new(file)))
}

/// Read every row of a CSV file with a header line. A row that does not
/// match `T` fails the whole read.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SourceError> {
    let mut reader = open_csv(path)?;
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| SourceError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
    debug!(rows = rows.len(), "Read {}", path.display());
    Ok(rows)
}

/// Stream the order-line file into per-order baskets without holding the
/// raw rows in memory
pub fn read_baskets(path: &Path) -> Result<BasketIndex, SourceError> {
    let mut reader = open_csv(path)?;
    let mut index = BasketIndex::default();
    for line in reader.deserialize::<OrderLine>() {
        let line = line.map_err(|e| SourceError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        index.add(&line);
    }
    debug!(orders = index.len(), "Read baskets from {}", path.display());
    Ok(index)
}

/// The order tables needed by the enrichment stage
#[derive(Debug, Default)]
pub struct RawDataset {
    pub orders: Vec<RawOrder>,
    pub baskets: BasketIndex,
}

impl RawDataset {
    pub fn load(raw_dir: &Path) -> Result<Self, SourceError> {
        info!("Loading raw orders from {}", raw_dir.display());
        let orders = read_csv(&raw_dir.join(ORDERS_FILE))?;
        let baskets = read_baskets(&raw_dir.join(ORDER_PRODUCTS_FILE))?;
        Ok(Self { orders, baskets })
    }
}

/// Load the product, aisle and department tables verbatim
pub fn load_dimensions(raw_dir: &Path) -> Result<Dimensions, SourceError> {
    let products: Vec<Product> = read_csv(&raw_dir.join(PRODUCTS_FILE))?;
    let aisles: Vec<Aisle> = read_csv(&raw_dir.join(AISLES_FILE))?;
    let departments: Vec<Department> = read_csv(&raw_dir.join(DEPARTMENTS_FILE))?;
    Ok(Dimensions::new(products, aisles, departments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_read_baskets_keeps_file_order() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            ORDER_PRODUCTS_FILE,
            "order_id,product_id,add_to_cart_order,reordered\n2,33120,1,1\n2,28985,2,1\n3,9327,1,0\n2,17794,3,0\n",
        );

        let mut index = read_baskets(&dir.path().join(ORDER_PRODUCTS_FILE)).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.take(2).unwrap().products(), &[33120, 28985, 17794]);
    }

    #[test]
    fn test_read_csv_fails_on_malformed_row() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            AISLES_FILE,
            "aisle_id,aisle\n1,prepared soups salads\nnot-a-number,bread\n",
        );

        let err = read_csv::<Aisle>(&dir.path().join(AISLES_FILE)).unwrap_err();
        assert!(matches!(err, SourceError::Csv { .. }));
    }

    #[test]
    fn test_read_csv_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_csv::<Aisle>(&dir.path().join(AISLES_FILE)).unwrap_err();
        assert!(matches!(err, SourceError::MissingFile(_)));
    }

    #[test]
    fn test_load_dimensions() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            PRODUCTS_FILE,
            "product_id,product_name,aisle_id,department_id\n1,\"Chocolate Sandwich Cookies\",61,19\n",
        );
        write(dir.path(), AISLES_FILE, "aisle_id,aisle\n61,cookies cakes\n");
        write(dir.path(), DEPARTMENTS_FILE, "department_id,department\n19,snacks\n");

        let dims = load_dimensions(dir.path()).unwrap();
        let placement = dims.placement(1).unwrap();
        assert_eq!(placement.aisle, "cookies cakes");
        assert_eq!(placement.department, "snacks");
        assert!(dims.placement(2).is_none());
    }
}
