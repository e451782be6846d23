//! Compressed tabular archives
//!
//! Each archive is a gzip stream holding a single CSV file; the CSV file name
//! is recorded in the gzip header.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;

/// File extension of every processed archive
pub const ARCHIVE_EXT: &str = ".csv.gz";

/// Write `rows` as CSV named `entry` inside a new gzip archive at `path`.
/// Returns the number of rows written.
pub fn write_archive<'a, T, I>(path: &Path, entry: &str, rows: I) -> Result<usize, StoreError>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
    let encoder = GzBuilder::new()
        .filename(entry)
        .write(BufWriter::new(file), Compression::default());
    let mut writer = csv::Writer::from_writer(encoder);

    let mut count = 0;
    for row in rows {
        writer.serialize(row).map_err(|e| StoreError::csv(path, e))?;
        count += 1;
    }

    let encoder = writer
        .into_inner()
        .map_err(|e| StoreError::io(path, e.into_error()))?;
    let mut buffered = encoder.finish().map_err(|e| StoreError::io(path, e))?;
    buffered.flush().map_err(|e| StoreError::io(path, e))?;
    Ok(count)
}

/// Read every CSV row of the archive at `path`. The archive must hold `entry`.
pub fn read_archive<T: DeserializeOwned>(path: &Path, entry: &str) -> Result<Vec<T>, StoreError> {
    let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    let mut reader = csv::Reader::from_reader(GzDecoder::new(BufReader::new(file)));
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| StoreError::csv(path, e))?;

    // The gzip header has been parsed once the stream is read to the end
    let found = reader
        .get_ref()
        .header()
        .and_then(|h| h.filename())
        .map(|name| String::from_utf8_lossy(name).into_owned());
    if found.as_deref() != Some(entry) {
        return Err(StoreError::UnexpectedEntry {
            path: path.to_path_buf(),
            expected: entry.to_string(),
            found,
        });
    }
    Ok(rows)
}
