//! Category dictionary loaded from CSV
//!
//! File layout (header row required):
//!
//! ```text
//! category,tags
//! カフェ,"[{""tags"":{""amenity"":""cafe""}}]"
//! ラーメン,"[{""tags"":{""amenity"":""restaurant"",""cuisine"":""ramen""}}]"
//! ```
//!
//! The `tags` cell is a JSON array of search terms. Each term is either
//! `{"tags": {...}}` or a single `{"key": ..., "value": ...}` pair. Bad rows
//! are logged and skipped; the rest of the file still loads.

use poi_common::SearchTerm;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::query_builder::sanitize;

/// Dictionary shipped with the service, used when no file is configured
const BUILT_IN_CSV: &str = include_str!("../../data/categories.csv");

/// Suffixes tried, in order, when a category has no exact entry
const SHOP_SUFFIXES: [&str; 4] = ["屋", "店", "ショップ", "専門店"];

/// Dictionary load errors
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("Cannot open dictionary {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dictionary read failed: {0}")]
    Read(#[from] csv::Error),
}

/// Immutable category name → search terms mapping
#[derive(Debug, Clone, Default)]
pub struct CategoryDictionary {
    entries: HashMap<String, Vec<SearchTerm>>,
}

/// Result of expanding a list of category names
#[derive(Debug, Default, PartialEq)]
pub struct Expansion {
    pub terms: Vec<SearchTerm>,
    pub unknown: Vec<String>,
}

impl CategoryDictionary {
    /// Load the dictionary from a CSV file
    pub fn load(path: &Path) -> Result<Self, DictionaryError> {
        let file = std::fs::File::open(path).map_err(|source| DictionaryError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let dictionary = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            categories = dictionary.len(),
            "Category dictionary loaded"
        );
        Ok(dictionary)
    }

    /// The dictionary compiled into the binary
    pub fn built_in() -> Result<Self, DictionaryError> {
        let dictionary = Self::from_reader(BUILT_IN_CSV.as_bytes())?;
        tracing::info!(categories = dictionary.len(), "Built-in category dictionary loaded");
        Ok(dictionary)
    }

    /// Parse CSV content from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DictionaryError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries: HashMap<String, Vec<SearchTerm>> = HashMap::new();

        for result in csv_reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable dictionary row");
                    continue;
                }
            };
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let category = record.get(0).unwrap_or_default();
            if category.is_empty() {
                tracing::warn!(line, "Skipping dictionary row with empty category");
                continue;
            }

            // An unquoted JSON cell is split at its commas; stitch it back
            let cell = record.iter().skip(1).collect::<Vec<_>>().join(",");
            let terms = match parse_terms(&cell) {
                Ok(terms) => terms,
                Err(e) => {
                    tracing::warn!(line, category, error = %e, "Skipping dictionary row with malformed tags");
                    continue;
                }
            };

            let terms: Vec<SearchTerm> = terms.into_iter().filter(|t| !t.is_empty()).collect();
            if terms.is_empty() {
                tracing::warn!(line, category, "Skipping dictionary row with no tag filters");
                continue;
            }
            if terms.iter().any(has_blank_filter) {
                tracing::warn!(line, category, "Skipping dictionary row with a blank tag key or value");
                continue;
            }

            entries.entry(category.to_string()).or_default().extend(terms);
        }

        Ok(Self { entries })
    }

    /// Terms for one category, trying shop-suffix stripping after an exact miss
    pub fn lookup(&self, category: &str) -> Option<&[SearchTerm]> {
        let name = category.trim();
        if let Some(terms) = self.entries.get(name) {
            return Some(terms);
        }

        let stripped = SHOP_SUFFIXES
            .iter()
            .find_map(|suffix| name.strip_suffix(suffix))?;
        self.entries.get(stripped).map(Vec::as_slice)
    }

    /// Union of the terms for `categories`, skipping duplicates
    pub fn expand(&self, categories: &[String]) -> Expansion {
        let mut expansion = Expansion::default();
        for category in categories {
            match self.lookup(category) {
                Some(terms) => {
                    for term in terms {
                        if !expansion.terms.contains(term) {
                            expansion.terms.push(term.clone());
                        }
                    }
                }
                None => expansion.unknown.push(category.clone()),
            }
        }
        expansion
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// True when a filter would render as an empty key or value
fn has_blank_filter(term: &SearchTerm) -> bool {
    term.filters()
        .iter()
        .any(|f| sanitize(&f.key).is_empty() || sanitize(&f.value).is_empty())
}

/// Parse a `tags` cell; tolerates quotes left doubled by hand-edited files
fn parse_terms(cell: &str) -> Result<Vec<SearchTerm>, serde_json::Error> {
    match serde_json::from_str::<Vec<SearchTerm>>(cell) {
        Ok(terms) => Ok(terms),
        Err(first) => {
            if cell.contains("\"\"") {
                serde_json::from_str(&cell.replace("\"\"", "\""))
            } else {
                Err(first)
            }
        }
    }
}
