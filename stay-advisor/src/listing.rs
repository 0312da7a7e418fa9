use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{AdvisorError, Result};

/// One row of the detailed listings dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingRecord {
    pub id: u64,
    pub listing_url: String,
    pub picture_url: String,
    /// Every other column (coordinates, price, `dates_prices`, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl ListingRecord {
    pub fn new(id: u64, listing_url: impl Into<String>, picture_url: impl Into<String>) -> Self {
        Self {
            id,
            listing_url: listing_url.into(),
            picture_url: picture_url.into(),
            attributes: Map::new(),
        }
    }
}

/// The detailed dataset used to validate model output. Read-only after load.
#[derive(Debug, Clone, Default)]
pub struct DetailedListings {
    records: Vec<ListingRecord>,
}

impl DetailedListings {
    pub fn new(records: Vec<ListingRecord>) -> Self {
        let listings = Self { records };
        let duplicates = listings.duplicate_ids();
        if !duplicates.is_empty() {
            warn!(
                duplicate_count = duplicates.len(),
                "Detailed listings contain duplicate ids; the first record wins"
            );
        }
        listings
    }

    /// Load a JSON array of listing objects.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let records: Vec<ListingRecord> = read_json(path.as_ref())?;
        info!(
            path = %path.as_ref().display(),
            count = records.len(),
            "Loaded detailed listings"
        );
        Ok(Self::new(records))
    }

    /// First record whose id equals `id`.
    pub fn find(&self, id: u64) -> Option<&ListingRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn duplicate_ids(&self) -> Vec<u64> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|record| !seen.insert(record.id))
            .map(|record| record.id)
            .collect()
    }
}

/// The summary listings table that is embedded into the prompt.
#[derive(Debug, Clone, Default)]
pub struct SummaryTable {
    rows: Vec<Map<String, Value>>,
}

impl SummaryTable {
    pub fn new(rows: Vec<Map<String, Value>>) -> Self {
        Self { rows }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let rows: Vec<Map<String, Value>> = read_json(path.as_ref())?;
        info!(
            path = %path.as_ref().display(),
            count = rows.len(),
            "Loaded summary listings"
        );
        Ok(Self::new(rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a pipe-separated table, header first. Columns appear in the
    /// order they are first seen across rows.
    pub fn render(&self) -> String {
        let mut columns: Vec<&str> = Vec::new();
        for row in &self.rows {
            for key in row.keys() {
                if !columns.contains(&key.as_str()) {
                    columns.push(key);
                }
            }
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(columns.join(" | "));
        for row in &self.rows {
            let cells: Vec<String> = columns
                .iter()
                .map(|column| row.get(*column).map(render_cell).unwrap_or_default())
                .collect();
            lines.push(cells.join(" | "));
        }
        lines.join("\n")
    }
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| AdvisorError::DatasetIo {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| AdvisorError::DatasetFormat {
        path: display,
        source,
    })
}
