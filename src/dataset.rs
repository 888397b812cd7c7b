//! JSON datasets for the CLI
//!
//! ```json
//! {
//!   "records": [{ "location": "L1", "keywords": ["alice", "bob"] }],
//!   "links": [{ "from": "pre", "to": "full" }],
//!   "alias_min_chars": 3
//! }
//! ```
//!
//! A bare array of records is accepted as well.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::{IndexedEntry, Keyword, Location};
use crate::index::generate_aliases;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid dataset: {0}")]
    Json(#[from] serde_json::Error),
}

/// One location and its keywords
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub location: String,
    pub keywords: Vec<String>,
}

/// Keyword-to-keyword link: searching `from` also finds what `to` finds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordLink {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub records: Vec<DatasetRecord>,

    #[serde(default)]
    pub links: Vec<KeywordLink>,

    /// Index every keyword under its prefixes of at least this many chars
    #[serde(default)]
    pub alias_min_chars: Option<usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetFile {
    Records(Vec<DatasetRecord>),
    Full(Dataset),
}

/// Lowercase and trim, applied identically when indexing and searching
pub fn normalize_keyword(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl Dataset {
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        Ok(match serde_json::from_str(json)? {
            DatasetFile::Records(records) => Dataset {
                records,
                ..Dataset::default()
            },
            DatasetFile::Full(dataset) => dataset,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Entries to upsert: records, explicit links, then prefix aliases
    ///
    /// Records without a usable keyword are skipped.
    pub fn to_entries(&self) -> Vec<IndexedEntry> {
        let mut entries = Vec::new();
        let mut all_keywords = BTreeSet::new();

        for record in &self.records {
            let keywords: BTreeSet<String> = record
                .keywords
                .iter()
                .map(|k| normalize_keyword(k))
                .filter(|k| !k.is_empty())
                .collect();
            if keywords.is_empty() {
                continue;
            }
            all_keywords.extend(keywords.iter().cloned());
            entries.push(IndexedEntry::location(
                Location::from(record.location.as_str()),
                keywords,
            ));
        }

        for link in &self.links {
            let (from, to) = (normalize_keyword(&link.from), normalize_keyword(&link.to));
            if from.is_empty() || to.is_empty() || from == to {
                continue;
            }
            entries.push(IndexedEntry::keyword_link(Keyword::from(from), Keyword::from(to)));
        }

        if let Some(min_chars) = self.alias_min_chars {
            for keyword in &all_keywords {
                entries.extend(generate_aliases(keyword, min_chars));
            }
        }

        entries
    }
}
