//! Flat-file record store.
//!
//! Three CSV datasets, one row per entity, header row fixed per dataset.
//! Every mutation is a whole-table rewrite: load the full table, apply the
//! change in memory, write the full file back. There is no locking between
//! concurrent writers; two simultaneous writers to one dataset can race and
//! the second save wins (documented lost update).

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::domain::ports::{Loaded, StorageError};

/// A named tabular dataset with a fixed, ordered column list.
#[derive(Debug, Clone, Copy)]
pub struct Dataset {
    /// Backing file name inside the data directory.
    pub file_name: &'static str,
    /// Header row, exactly as written to disk.
    pub headers: &'static [&'static str],
}

/// Users dataset.
pub const USERS: Dataset = Dataset {
    file_name: "users.csv",
    headers: &["username", "password"],
};

/// Restaurants dataset.
pub const RESTAURANTS: Dataset = Dataset {
    file_name: "restaurants.csv",
    headers: &[
        "name",
        "type",
        "latitude",
        "longitude",
        "address",
        "phone",
        "owner",
        "rating",
        "image",
        "description",
    ],
};

/// Reviews dataset.
pub const REVIEWS: Dataset = Dataset {
    file_name: "reviews.csv",
    headers: &["restaurant_name", "username", "rating", "comment"],
};

/// Handle on the data directory holding all datasets.
#[derive(Debug, Clone)]
pub struct CsvTables {
    dir: PathBuf,
}

impl CsvTables {
    /// Point the store at a data directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the data directory and header-only dataset files when absent.
    pub fn bootstrap(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        for dataset in [USERS, RESTAURANTS, REVIEWS] {
            let path = self.path(&dataset);
            if !path.exists() {
                std::fs::write(&path, format!("{}\n", dataset.headers.join(",")))?;
            }
        }
        Ok(())
    }

    fn path(&self, dataset: &Dataset) -> PathBuf {
        self.dir.join(dataset.file_name)
    }

    /// Load the full table. A missing or unreadable file degrades to an
    /// empty table carrying a warning, never a failure.
    pub fn load<R: DeserializeOwned>(&self, dataset: &Dataset) -> Loaded<R> {
        match read_rows(&self.path(dataset)) {
            Ok(rows) => Loaded::clean(rows),
            Err(message) => {
                warn!(
                    dataset = dataset.file_name,
                    error = %message,
                    "table read degraded to empty"
                );
                Loaded::degraded(format!(
                    "Failed to read {}: {message}",
                    dataset.file_name
                ))
            }
        }
    }

    /// Rewrite the full table, header row first.
    pub fn save<R: Serialize>(&self, dataset: &Dataset, rows: &[R]) -> Result<(), StorageError> {
        let map_err = |err: csv::Error| StorageError::write(dataset.file_name, err.to_string());
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(self.path(dataset))
            .map_err(map_err)?;
        writer.write_record(dataset.headers).map_err(map_err)?;
        for row in rows {
            writer.serialize(row).map_err(map_err)?;
        }
        writer
            .flush()
            .map_err(|err| StorageError::write(dataset.file_name, err.to_string()))
    }

    /// Append one row and rewrite the table, returning the updated rows.
    pub fn append<R>(&self, dataset: &Dataset, row: R) -> Result<Vec<R>, StorageError>
    where
        R: Serialize + DeserializeOwned,
    {
        let mut rows = self.load(dataset).rows;
        rows.push(row);
        self.save(dataset, &rows)?;
        Ok(rows)
    }

    /// Apply an in-memory change to every row and rewrite the table.
    pub fn update<R, F>(&self, dataset: &Dataset, mut apply: F) -> Result<(), StorageError>
    where
        R: Serialize + DeserializeOwned,
        F: FnMut(&mut R),
    {
        let mut rows: Vec<R> = self.load(dataset).rows;
        for row in &mut rows {
            apply(row);
        }
        self.save(dataset, &rows)
    }
}

fn read_rows<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|err| err.to_string())?;
    reader
        .deserialize()
        .collect::<Result<Vec<R>, _>>()
        .map_err(|err| err.to_string())
}
