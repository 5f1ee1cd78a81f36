//! CSV corpus loading
//!
//! Each CSV row becomes one [`Passage`] whose content lists the row as
//! `header: value` lines, in column order.

use crate::error::{FinRouteError, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

/// One indexed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Short content hash
    pub id: String,
    /// Text that is embedded and handed to the generator
    pub content: String,
    /// Source file and row number
    pub metadata: BTreeMap<String, String>,
}

impl Passage {
    /// Build a passage from raw text
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: passage_id(&content),
            content,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// First 12 hex chars of the SHA-256 of the content
pub fn passage_id(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    format!("{:x}", digest).chars().take(12).collect()
}

/// Load a CSV file as passages, one per row
pub fn load_corpus(path: &Path) -> Result<Vec<Passage>> {
    let file_content = std::fs::read_to_string(path).map_err(|e| {
        FinRouteError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read CSV file {:?}: {}", path, e),
        ))
    })?;

    let source = path.display().to_string();
    parse_corpus(&file_content, &source)
}

/// Parse CSV text as passages
pub fn parse_corpus(csv_text: &str, source: &str) -> Result<Vec<Passage>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let headers = reader.headers()?.clone();

    let mut passages = Vec::new();
    for (row_num, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            FinRouteError::Dataset(format!("Failed to parse CSV row {}: {}", row_num + 1, e))
        })?;

        let content = record
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let header = headers.get(idx).unwrap_or("unknown");
                format!("{}: {}", header, field)
            })
            .collect::<Vec<_>>()
            .join("\n");

        passages.push(
            Passage::new(content)
                .with_metadata("source", source)
                .with_metadata("row", row_num.to_string()),
        );
    }

    tracing::debug!("Loaded {} passages from {}", passages.len(), source);
    Ok(passages)
}
