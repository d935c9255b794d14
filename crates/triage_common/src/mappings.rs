//! Error-mapping tables.
//!
//! A mapping table is a CSV file with a header row and at least two
//! columns. The first two columns are taken positionally as
//! (error text, interpretation) no matter what the header calls them;
//! any further columns are ignored.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

/// Placeholder that tables exported from spreadsheet tooling use for a
/// missing cell. Treated the same as an empty signature.
const MISSING_VALUE: &str = "nan";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("mapping file '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("mapping file must have at least 2 columns (error text, interpretation), found {0}")]
    MalformedSchema(usize),

    #[error("no valid error mappings found in mapping file")]
    EmptyMappings,

    #[error("failed to read mapping file: {0}")]
    Read(String),
}

/// One known error signature and its human-readable interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMapping {
    /// Lookup key: the signature lowercased and trimmed.
    pub key: String,
    /// The signature as it appeared in the table, trimmed but not folded.
    pub original_text: String,
    /// Trimmed interpretation text.
    pub interpretation: String,
}

/// Insertion-ordered set of error mappings keyed by normalized signature.
///
/// Re-inserting an existing key overwrites the entry in place: the key
/// keeps the position of its first insertion and the value is the later
/// row. Scanning iterates in exactly this order.
#[derive(Debug, Clone, Default)]
pub struct MappingSet {
    entries: Vec<ErrorMapping>,
    index: HashMap<String, usize>,
}

impl MappingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mapping, overwriting any previous entry with the same key
    /// (last write wins, original position retained).
    pub fn insert(&mut self, mapping: ErrorMapping) {
        match self.index.get(&mapping.key) {
            Some(&pos) => self.entries[pos] = mapping,
            None => {
                self.index.insert(mapping.key.clone(), self.entries.len());
                self.entries.push(mapping);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ErrorMapping> {
        self.index.get(key).map(|&pos| &self.entries[pos])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate mappings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ErrorMapping> {
        self.entries.iter()
    }
}

/// Loads error-mapping tables from CSV files.
///
/// Each call to [`MappingLoader::load`] produces a fresh [`MappingSet`];
/// nothing accumulates across loads.
pub struct MappingLoader {
    path: PathBuf,
}

impl MappingLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the mapping table.
    ///
    /// Fails with [`LoadError::NotFound`] for a missing file,
    /// [`LoadError::MalformedSchema`] when the header has fewer than two
    /// columns, and [`LoadError::EmptyMappings`] when parsing succeeded
    /// but no row carried a usable signature. No partial set is returned
    /// on any failure.
    pub fn load(&self) -> Result<MappingSet, LoadError> {
        if !self.path.exists() {
            return Err(LoadError::NotFound(self.path.clone()));
        }

        let file = File::open(&self.path).map_err(|e| LoadError::Read(e.to_string()))?;
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| LoadError::Read(e.to_string()))?;
        if headers.len() < 2 {
            return Err(LoadError::MalformedSchema(headers.len()));
        }

        let mut set = MappingSet::new();
        for record in reader.records() {
            let record = record.map_err(|e| LoadError::Read(e.to_string()))?;
            let signature = record.get(0).unwrap_or("").trim();
            // Short rows read as an empty interpretation cell.
            let interpretation = record.get(1).unwrap_or("").trim();

            if signature.is_empty() || signature.eq_ignore_ascii_case(MISSING_VALUE) {
                continue;
            }

            set.insert(ErrorMapping {
                key: signature.to_lowercase(),
                original_text: signature.to_string(),
                interpretation: interpretation.to_string(),
            });
        }

        if set.is_empty() {
            return Err(LoadError::EmptyMappings);
        }

        info!(
            "Loaded {} error mappings from '{}'",
            set.len(),
            self.path.display()
        );
        Ok(set)
    }
}
