use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::ActRecord;
use crate::types::{default_language, AppError, Result};

/// Columns every corpus file must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["act_id", "act_title", "act_year"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Load all acts from a CSV file.
pub fn load_acts(path: &Path) -> Result<Vec<ActRecord>> {
    let bytes = std::fs::read(path).map_err(|e| {
        AppError::Corpus(format!("Failed to read corpus file {}: {}", path.display(), e))
    })?;
    let acts = load_acts_from_reader(bytes.as_slice())?;
    info!(path = %path.display(), acts = acts.len(), "Loaded acts from corpus");
    Ok(acts)
}

/// Load acts from any CSV reader. A leading UTF-8 BOM is ignored.
pub fn load_acts_from_reader<R: Read>(mut reader: R) -> Result<Vec<ActRecord>> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| AppError::Corpus(format!("Failed to read corpus: {}", e)))?;
    let data = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = csv_reader
        .headers()
        .map_err(|e| AppError::Corpus(format!("Failed to read CSV header: {}", e)))?
        .clone();

    let columns: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_string(), i))
        .collect();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !columns.contains_key(*c))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Corpus(format!(
            "Missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut acts = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                // Header is line 1
                warn!(line = row + 2, error = %e, "Skipping malformed CSV row");
                continue;
            }
        };

        let cell = |name: &str| -> String {
            columns
                .get(name)
                .and_then(|&i| record.get(i))
                .unwrap_or_default()
                .trim()
                .to_string()
        };

        let language = cell("language_detected");
        acts.push(ActRecord {
            act_id: cell("act_id"),
            act_title: cell("act_title"),
            act_title_bengali: cell("act_title_bengali"),
            act_number: cell("act_number"),
            act_year: cell("act_year"),
            publication_date: cell("publication_date"),
            is_repealed: parse_bool(&cell("is_repealed")),
            repealed_by: cell("repealed_by"),
            url: cell("url"),
            total_sections: cell("total_sections").parse().unwrap_or(0),
            language_detected: if language.is_empty() {
                default_language()
            } else {
                language
            },
            preamble: cell("preamble"),
            sections_json: cell("sections_json"),
            sections_summary: cell("sections_summary"),
        });
    }

    Ok(acts)
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

/// First `*.csv` file in `data_dir`, by file name.
pub fn find_corpus_file(data_dir: &Path) -> Result<PathBuf> {
    let entries = std::fs::read_dir(data_dir).map_err(|e| {
        AppError::Corpus(format!(
            "Failed to read data directory {}: {}",
            data_dir.display(),
            e
        ))
    })?;

    let mut csv_files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    csv_files.sort();

    csv_files.into_iter().next().ok_or_else(|| {
        AppError::Corpus(format!("No CSV files found in {}", data_dir.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}act_id,act_title,act_year,is_repealed,total_sections,language_detected\n\
        1,The Penal Code,1860,false,511,english\n\
        2,Old Act,19xx,YES,abc,\n";

    #[test]
    fn test_load_with_bom_and_defaults() {
        let acts = load_acts_from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(acts.len(), 2);
        assert_eq!(acts[0].act_id, "1");
        assert_eq!(acts[0].total_sections, 511);
        assert!(!acts[0].is_repealed);
        assert_eq!(acts[0].year(), Some(1860));

        assert!(acts[1].is_repealed);
        assert_eq!(acts[1].total_sections, 0);
        assert_eq!(acts[1].language_detected, "unknown");
        assert_eq!(acts[1].year(), None);
        assert_eq!(acts[1].act_title_bengali, "");
    }

    #[test]
    fn test_missing_required_columns_listed() {
        let err = load_acts_from_reader("act_id,title\n1,x\n".as_bytes()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("act_title"));
        assert!(msg.contains("act_year"));
        assert!(!msg.contains("act_id,"));
    }

    #[test]
    fn test_parse_bool_variants() {
        for v in ["true", "TRUE", "1", "yes", "Yes"] {
            assert!(parse_bool(v), "{v}");
        }
        for v in ["false", "0", "no", "", "maybe"] {
            assert!(!parse_bool(v), "{v}");
        }
    }

    #[test]
    fn test_find_corpus_file_sorted() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("b_acts.csv"), "x").unwrap();
        std::fs::write(dir.path().join("a_acts.CSV"), "x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let found = find_corpus_file(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "a_acts.CSV");
    }

    #[test]
    fn test_find_corpus_file_none() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            find_corpus_file(dir.path()),
            Err(AppError::Corpus(_))
        ));
    }
}
