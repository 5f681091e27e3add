//! Legal corpus ingestion.
//!
//! The corpus is a CSV export with one row per act. Each act becomes an
//! overview chunk plus one chunk per non-empty section; those chunks are what
//! the vector store indexes.

pub mod chunker;
pub mod cleaner;
pub mod loader;
pub mod stats;
pub mod topics;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::types::{parse_numeric_year, ProcessedChunk, Result};
use crate::utils::toml_config::{AdalatConfig, DataConfig};

pub use chunker::{ChunkerConfig, LegalDataProcessor};
pub use cleaner::clean_text;
pub use loader::{find_corpus_file, load_acts};
pub use stats::{act_statistics, recent_acts, CorpusStats};

/// One act as exported in the corpus CSV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActRecord {
    pub act_id: String,
    pub act_title: String,
    pub act_title_bengali: String,
    pub act_number: String,
    /// Kept as text; some rows carry non-numeric years.
    pub act_year: String,
    pub publication_date: String,
    pub is_repealed: bool,
    pub repealed_by: String,
    pub url: String,
    pub total_sections: u32,
    pub language_detected: String,
    pub preamble: String,
    /// Raw JSON array of `{title, content, chapter}` objects.
    pub sections_json: String,
    pub sections_summary: String,
}

impl ActRecord {
    /// Numeric year when `act_year` is all digits.
    pub fn year(&self) -> Option<i32> {
        parse_numeric_year(&self.act_year)
    }

    /// Sections parsed from `sections_json`.
    ///
    /// Invalid JSON, a non-array value or empty input yields no sections;
    /// array elements that are not objects are skipped but still occupy a
    /// position.
    pub fn sections(&self) -> Vec<(usize, Section)> {
        let raw = self.sections_json.trim();
        if raw.is_empty() {
            return Vec::new();
        }

        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(act_id = %self.act_id, error = %e, "Unparseable sections_json");
                return Vec::new();
            }
        };

        let Some(items) = value.as_array() else {
            return Vec::new();
        };

        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let obj = item.as_object()?;
                let field = |name: &str| {
                    obj.get(name)
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string()
                };
                Some((
                    i + 1,
                    Section {
                        title: field("title"),
                        content: field("content"),
                        chapter: field("chapter"),
                    },
                ))
            })
            .collect()
    }
}

/// A section of an act.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
    pub chapter: String,
}

/// The corpus CSV: `data.csv_path` when set, else the first CSV in
/// `data.data_dir`.
pub fn resolve_csv_path(data: &DataConfig) -> Result<PathBuf> {
    match &data.csv_path {
        Some(path) => Ok(path.clone()),
        None => find_corpus_file(&data.data_dir),
    }
}

/// Load and chunk the corpus, writing the chunks to `data.processed_path`.
/// Blocking; async callers run it on the blocking pool.
pub fn process_corpus(config: &AdalatConfig) -> Result<(Vec<ActRecord>, Vec<ProcessedChunk>)> {
    let csv_path = resolve_csv_path(&config.data)?;
    info!(path = %csv_path.display(), "Loading corpus");

    let mut processor = LegalDataProcessor::from_csv(&csv_path, ChunkerConfig::from(&config.rag))?;
    processor.process_all_acts();
    processor.save_processed(&config.data.processed_path)?;
    Ok(processor.into_parts())
}
