use std::path::Path;

use text_splitter::{ChunkConfig, TextSplitter};
use tracing::info;

use super::cleaner::clean_text;
use super::{loader, ActRecord};
use crate::types::{AppError, ChunkMetadata, ChunkType, ProcessedChunk, Result};

/// Progress is logged every this many acts.
const PROGRESS_INTERVAL: usize = 100;

/// Size limits for section chunks, in characters.
#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            chunk_overlap: 200,
        }
    }
}

impl From<&crate::utils::toml_config::RagConfig> for ChunkerConfig {
    fn from(rag: &crate::utils::toml_config::RagConfig) -> Self {
        Self {
            chunk_size: rag.chunk_size,
            chunk_overlap: rag.chunk_overlap,
        }
    }
}

/// Turns act rows into overview and section chunks.
pub struct ActChunker {
    config: ChunkerConfig,
    splitter: TextSplitter<text_splitter::Characters>,
}

impl ActChunker {
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        let chunk_config = ChunkConfig::new(config.chunk_size)
            .with_overlap(config.chunk_overlap)
            .map_err(|e| AppError::Config(format!("Invalid chunking settings: {}", e)))?;

        Ok(Self {
            config,
            splitter: TextSplitter::new(chunk_config),
        })
    }

    /// Build all chunks for one act.
    pub fn chunk_act(&self, act: &ActRecord) -> Vec<ProcessedChunk> {
        let mut chunks = Vec::new();

        let metadata = ChunkMetadata {
            act_id: act.act_id.clone(),
            act_title: clean_text(&act.act_title),
            act_title_bengali: clean_text(&act.act_title_bengali),
            act_number: clean_text(&act.act_number),
            act_year: act.act_year.clone(),
            publication_date: clean_text(&act.publication_date),
            is_repealed: act.is_repealed,
            repealed_by: clean_text(&act.repealed_by),
            url: act.url.clone(),
            total_sections: act.total_sections,
            language_detected: act.language_detected.clone(),
            section_number: None,
            section_title: None,
            chapter: None,
        };

        let main_title = if metadata.act_title.is_empty() {
            metadata.act_title_bengali.clone()
        } else {
            metadata.act_title.clone()
        };

        if !main_title.is_empty() {
            let mut overview = format!(
                "Act Title: {}\nAct Number: {}\nYear: {}\nPublication Date: {}\nStatus: {}\nTotal Sections: {}",
                main_title,
                metadata.act_number,
                metadata.act_year,
                metadata.publication_date,
                if metadata.is_repealed { "Repealed" } else { "Active" },
                metadata.total_sections,
            );

            if metadata.is_repealed && !metadata.repealed_by.is_empty() {
                overview.push_str(&format!("\nRepealed by: {}", metadata.repealed_by));
            }

            let preamble = clean_text(&act.preamble);
            if !preamble.is_empty() {
                overview.push_str(&format!("\nPreamble: {}", preamble));
            }

            chunks.push(ProcessedChunk {
                chunk_id: format!("{}_overview", act.act_id),
                chunk_type: ChunkType::Overview,
                content: clean_text(&overview),
                metadata: metadata.clone(),
            });
        }

        for (number, section) in act.sections() {
            let title = clean_text(&section.title);
            let content = clean_text(&section.content);
            let chapter = clean_text(&section.chapter);

            if title.is_empty() && content.is_empty() {
                continue;
            }

            let section_metadata = ChunkMetadata {
                section_number: Some(number),
                section_title: Some(title.clone()),
                chapter: Some(chapter.clone()),
                ..metadata.clone()
            };

            let render = |body: &str| {
                clean_text(&format!(
                    "Act: {}\nSection: {}\nChapter: {}\nContent: {}",
                    main_title, title, chapter, body
                ))
            };

            if content.chars().count() <= self.config.chunk_size {
                chunks.push(ProcessedChunk {
                    chunk_id: format!("{}_section_{}", act.act_id, number),
                    chunk_type: ChunkType::Section,
                    content: render(&content),
                    metadata: section_metadata,
                });
                continue;
            }

            for (part, piece) in self.splitter.chunks(&content).enumerate() {
                chunks.push(ProcessedChunk {
                    chunk_id: format!("{}_section_{}_part_{}", act.act_id, number, part + 1),
                    chunk_type: ChunkType::Section,
                    content: render(piece),
                    metadata: section_metadata.clone(),
                });
            }
        }

        chunks
    }
}

/// Holds the loaded acts and the chunks produced from them.
pub struct LegalDataProcessor {
    acts: Vec<ActRecord>,
    chunks: Vec<ProcessedChunk>,
    chunker: ActChunker,
}

impl LegalDataProcessor {
    pub fn new(acts: Vec<ActRecord>, config: ChunkerConfig) -> Result<Self> {
        Ok(Self {
            acts,
            chunks: Vec::new(),
            chunker: ActChunker::new(config)?,
        })
    }

    /// Load acts from a corpus CSV.
    pub fn from_csv(path: &Path, config: ChunkerConfig) -> Result<Self> {
        Self::new(loader::load_acts(path)?, config)
    }

    pub fn acts(&self) -> &[ActRecord] {
        &self.acts
    }

    pub fn chunks(&self) -> &[ProcessedChunk] {
        &self.chunks
    }

    pub fn into_parts(self) -> (Vec<ActRecord>, Vec<ProcessedChunk>) {
        (self.acts, self.chunks)
    }

    /// Chunk every act, replacing any previous result.
    pub fn process_all_acts(&mut self) -> &[ProcessedChunk] {
        info!(acts = self.acts.len(), "Processing acts into document chunks");

        let total = self.acts.len();
        let mut all = Vec::new();
        for (i, act) in self.acts.iter().enumerate() {
            all.extend(self.chunker.chunk_act(act));
            if (i + 1) % PROGRESS_INTERVAL == 0 {
                info!(processed = i + 1, total, "Chunking progress");
            }
        }

        info!(chunks = all.len(), acts = total, "Created document chunks");
        self.chunks = all;
        &self.chunks
    }

    /// Chunks whose numeric year lies in `[start, end]`.
    pub fn filter_by_year_range(&self, start: i32, end: i32) -> Vec<&ProcessedChunk> {
        self.chunks
            .iter()
            .filter(|c| c.metadata.year().is_some_and(|y| start <= y && y <= end))
            .collect()
    }

    /// Chunks whose content or act title contains any keyword, ignoring case.
    pub fn filter_by_keywords(&self, keywords: &[String]) -> Vec<&ProcessedChunk> {
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        self.chunks
            .iter()
            .filter(|c| {
                let content = c.content.to_lowercase();
                let title = c.metadata.act_title.to_lowercase();
                keywords
                    .iter()
                    .any(|k| content.contains(k.as_str()) || title.contains(k.as_str()))
            })
            .collect()
    }

    /// Write chunks as pretty JSON, processing first if needed.
    pub fn save_processed(&mut self, path: &Path) -> Result<()> {
        if self.chunks.is_empty() {
            self.process_all_acts();
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Corpus(format!("Failed to create {}: {}", parent.display(), e)))?;
        }

        let json = serde_json::to_string_pretty(&self.chunks)
            .map_err(|e| AppError::Corpus(format!("Failed to serialize chunks: {}", e)))?;
        std::fs::write(path, json)
            .map_err(|e| AppError::Corpus(format!("Failed to write {}: {}", path.display(), e)))?;

        info!(path = %path.display(), chunks = self.chunks.len(), "Saved processed documents");
        Ok(())
    }
}

/// Read a processed-documents JSON file.
pub fn load_processed(path: &Path) -> Result<Vec<ProcessedChunk>> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| AppError::Corpus(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&data)
        .map_err(|e| AppError::Corpus(format!("Failed to parse {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn act() -> ActRecord {
        ActRecord {
            act_id: "42".to_string(),
            act_title: "The Evidence Act".to_string(),
            act_number: "Act No. I of 1872".to_string(),
            act_year: "1872".to_string(),
            language_detected: "english".to_string(),
            total_sections: 3,
            preamble: "WHEREAS it is expedient to consolidate...".to_string(),
            sections_json: r#"[
                {"title": "Short title", "content": "This Act may be called the Evidence Act.", "chapter": "I"},
                {"title": "", "content": "   "},
                {"title": "Interpretation", "content": "In this Act...", "chapter": "I"}
            ]"#
            .to_string(),
            ..Default::default()
        }
    }

    fn chunker() -> ActChunker {
        ActChunker::new(ChunkerConfig::default()).unwrap()
    }

    #[test]
    fn test_chunk_ids_keep_gaps() {
        let chunks = chunker().chunk_act(&act());
        let ids: Vec<&str> = chunks.iter().map(|c| c.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["42_overview", "42_section_1", "42_section_3"]);
    }

    #[test]
    fn test_overview_content() {
        let chunks = chunker().chunk_act(&act());
        let overview = &chunks[0];
        assert_eq!(overview.chunk_type, ChunkType::Overview);
        assert!(overview.content.starts_with("Act Title: The Evidence Act Act Number: Act No. I of 1872 Year: 1872"));
        assert!(overview.content.contains("Status: Active"));
        assert!(overview.content.contains("Preamble: WHEREAS"));
        assert!(!overview.content.contains('\n'));
        assert!(overview.metadata.section_number.is_none());
    }

    #[test]
    fn test_repealed_overview() {
        let mut a = act();
        a.is_repealed = true;
        a.repealed_by = "Ordinance 5 of 1985".to_string();
        let chunks = chunker().chunk_act(&a);
        assert!(chunks[0].content.contains("Status: Repealed"));
        assert!(chunks[0].content.contains("Repealed by: Ordinance 5 of 1985"));
    }

    #[test]
    fn test_section_metadata() {
        let chunks = chunker().chunk_act(&act());
        let section = &chunks[2];
        assert_eq!(section.metadata.section_number, Some(3));
        assert_eq!(section.metadata.section_title.as_deref(), Some("Interpretation"));
        assert_eq!(section.metadata.chapter.as_deref(), Some("I"));
        assert!(section.content.starts_with("Act: The Evidence Act Section: Interpretation"));
    }

    #[test]
    fn test_bengali_title_fallback_and_no_title() {
        let mut a = act();
        a.act_title = String::new();
        a.act_title_bengali = "সাক্ষ্য আইন".to_string();
        let chunks = chunker().chunk_act(&a);
        assert!(chunks[0].content.contains("Act Title: সাক্ষ্য আইন"));

        a.act_title_bengali = String::new();
        let chunks = chunker().chunk_act(&a);
        assert!(chunks.iter().all(|c| c.chunk_type == ChunkType::Section));
    }

    #[test]
    fn test_long_section_split_into_parts() {
        let long = "The court shall consider the evidence. ".repeat(20);
        let mut a = act();
        a.sections_json = serde_json::json!([{ "title": "Long", "content": long }]).to_string();

        let chunker = ActChunker::new(ChunkerConfig {
            chunk_size: 200,
            chunk_overlap: 20,
        })
        .unwrap();
        let chunks = chunker.chunk_act(&a);
        let parts: Vec<&ProcessedChunk> = chunks
            .iter()
            .filter(|c| c.chunk_type == ChunkType::Section)
            .collect();

        assert!(parts.len() > 1);
        assert_eq!(parts[0].chunk_id, "42_section_1_part_1");
        assert!(parts.iter().all(|p| p.content.starts_with("Act: The Evidence Act Section: Long")));
        assert!(parts.iter().all(|p| p.metadata.section_number == Some(1)));
    }

    #[test]
    fn test_invalid_overlap_rejected() {
        assert!(ActChunker::new(ChunkerConfig {
            chunk_size: 10,
            chunk_overlap: 10,
        })
        .is_err());
    }

    #[test]
    fn test_processor_filters_and_save() {
        let mut other = act();
        other.act_id = "7".to_string();
        other.act_title = "Income Tax Ordinance".to_string();
        other.act_year = "n/a".to_string();
        other.sections_json = String::new();

        let mut processor =
            LegalDataProcessor::new(vec![act(), other], ChunkerConfig::default()).unwrap();
        assert_eq!(processor.process_all_acts().len(), 4);

        assert_eq!(processor.filter_by_year_range(1800, 1900).len(), 3);
        assert_eq!(processor.filter_by_year_range(1900, 2000).len(), 0);

        let tax = processor.filter_by_keywords(&["INCOME".to_string()]);
        assert_eq!(tax.len(), 1);
        assert_eq!(tax[0].chunk_id, "7_overview");

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out/processed.json");
        processor.save_processed(&path).unwrap();
        let loaded = load_processed(&path).unwrap();
        assert_eq!(loaded, processor.chunks());
    }
}
