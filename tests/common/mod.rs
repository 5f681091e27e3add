//! Shared fixtures for integration tests: a mock LLM, a small corpus CSV and
//! an `AppState` wired to a temporary directory.

#![allow(dead_code)]

use adalat::{
    api::handlers::index::rebuild_index,
    llm::LLMClient,
    rag::embeddings::build_embedder,
    types::{AppError, Result},
    utils::toml_config::{AdalatConfig, AdalatConfigManager},
    AppState, LegalAssistant,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Mock LLM client that returns a fixed response and remembers the last
/// prompt it was given.
#[derive(Clone, Default)]
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    last_prompt: Arc<Mutex<Option<String>>>,
}

impl MockLLMClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().clone()
    }

    fn reply(&self, prompt: &str) -> Result<String> {
        *self.last_prompt.lock() = Some(prompt.to_string());
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.reply(prompt)
    }

    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        self.reply(prompt)
    }

    async fn generate_with_history(&self, messages: &[(String, String)]) -> Result<String> {
        let last = messages.last().map(|(_, c)| c.as_str()).unwrap_or_default();
        self.reply(last)
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Header plus three acts: one criminal, one repealed tax act, one labour act.
pub fn write_fixture_csv(path: &Path) {
    let mut writer = csv::Writer::from_path(path).expect("create fixture csv");
    writer
        .write_record([
            "act_id",
            "act_title",
            "act_year",
            "is_repealed",
            "total_sections",
            "language_detected",
            "url",
            "sections_json",
        ])
        .unwrap();
    writer
        .write_record([
            "1",
            "The Penal Code",
            "1860",
            "false",
            "2",
            "english",
            "http://bdlaws.minlaw.gov.bd/act-11.html",
            r#"[{"title":"Theft","content":"Whoever intending to take dishonestly any movable property commits theft. Punishment for theft is imprisonment up to three years."},{"title":"Robbery","content":"In all robbery there is either theft or extortion."}]"#,
        ])
        .unwrap();
    writer
        .write_record([
            "2",
            "The Income Tax Ordinance",
            "1984",
            "true",
            "1",
            "english",
            "",
            r#"[{"title":"Charge of income tax","content":"Income tax shall be charged for every assessment year on the total income of every person."}]"#,
        ])
        .unwrap();
    writer
        .write_record([
            "3",
            "The Labour Act",
            "2006",
            "false",
            "1",
            "english",
            "",
            r#"[{"title":"Working hours","content":"No adult worker shall ordinarily work in an establishment for more than eight hours in any day."}]"#,
        ])
        .unwrap();
    writer.flush().unwrap();
}

/// Config rooted in `dir`, with the fixture corpus at `dir/data/laws.csv`.
pub fn test_config(dir: &Path) -> AdalatConfig {
    let data_dir = dir.join("data");
    std::fs::create_dir_all(&data_dir).unwrap();
    let csv_path = data_dir.join("laws.csv");
    write_fixture_csv(&csv_path);

    let mut config = AdalatConfig::default();
    config.data.data_dir = data_dir.clone();
    config.data.csv_path = Some(csv_path);
    config.data.processed_path = data_dir.join("processed_documents.json");
    config.rag.vector_store_path = dir.join("vectorstore");
    config.rag.dimensions = 256;
    config
}

pub fn vector_store_path(dir: &Path) -> PathBuf {
    dir.join("vectorstore")
}

/// State with no index built.
pub fn test_state(dir: &Path, llm: MockLLMClient) -> AppState {
    let config = test_config(dir);
    let embedder = build_embedder(&config.rag).expect("hashing embedder");
    let assistant = Arc::new(LegalAssistant::new(
        embedder,
        Arc::new(llm),
        &config.rag.vector_store_path,
    ));
    AppState::new(
        Arc::new(AdalatConfigManager::from_config(config)),
        assistant,
        Vec::new(),
    )
}

/// State with the fixture corpus indexed and loaded.
pub async fn indexed_state(dir: &Path, llm: MockLLMClient) -> AppState {
    let state = test_state(dir, llm);
    rebuild_index(&state).await.expect("index build");
    state
}
