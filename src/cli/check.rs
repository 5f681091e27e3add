//! `check` command: verify a working directory is ready to serve.
//!
//! Looks at the config file, the LLM API key, the corpus CSV and the saved
//! vector store. Nothing is modified.

use super::output::Output;
use crate::corpus::resolve_csv_path;
use crate::utils::toml_config::{AdalatConfig, ConfigError, API_KEY_PLACEHOLDER};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone)]
pub struct CheckItem {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct CheckReport {
    pub items: Vec<CheckItem>,
}

impl CheckReport {
    fn push(&mut self, name: &'static str, status: CheckStatus, message: impl Into<String>) {
        self.items.push(CheckItem {
            name,
            status,
            message: message.into(),
        });
    }

    /// True when no check failed. Warnings do not count.
    pub fn passed(&self) -> bool {
        self.items.iter().all(|i| i.status != CheckStatus::Fail)
    }

    pub fn status_of(&self, name: &str) -> Option<CheckStatus> {
        self.items.iter().find(|i| i.name == name).map(|i| i.status)
    }

    pub fn print(&self, output: &Output) {
        output.header("System check");
        for item in &self.items {
            let line = format!("{}: {}", item.name, item.message);
            match item.status {
                CheckStatus::Pass => output.success(&line),
                CheckStatus::Warn => output.warning(&line),
                CheckStatus::Fail => output.error(&line),
            }
        }
        output.newline();
        if self.passed() {
            output.complete("All checks passed");
        } else {
            output.hint("Run `adalat-server init` to scaffold a working directory");
        }
    }
}

/// Run every check against the config at `config_path`.
pub fn run_checks(config_path: &Path) -> CheckReport {
    let mut report = CheckReport::default();

    let config = match AdalatConfig::load(config_path) {
        Ok(config) => {
            report.push("config", CheckStatus::Pass, format!("loaded {}", config_path.display()));
            config
        }
        Err(ConfigError::FileNotFound(_)) => {
            report.push(
                "config",
                CheckStatus::Warn,
                format!("{} not found, using defaults", config_path.display()),
            );
            AdalatConfig::default()
        }
        Err(e) => {
            report.push("config", CheckStatus::Fail, e.to_string());
            return report;
        }
    };

    check_api_key(&config, &mut report);
    check_corpus(&config, &mut report);
    check_vector_store(&config, &mut report);
    report
}

fn check_api_key(config: &AdalatConfig, report: &mut CheckReport) {
    if !config.requires_api_key() {
        report.push(
            "api key",
            CheckStatus::Pass,
            format!("not required for {}", config.llm.provider),
        );
        return;
    }

    let env_name = &config.llm.api_key_env;
    match config.resolve_env(env_name) {
        Some(value) if value.trim() == API_KEY_PLACEHOLDER => report.push(
            "api key",
            CheckStatus::Fail,
            format!("{} still holds the placeholder value", env_name),
        ),
        Some(value) if !value.trim().is_empty() => {
            report.push("api key", CheckStatus::Pass, format!("{} is set", env_name))
        }
        _ => report.push("api key", CheckStatus::Fail, format!("{} is not set", env_name)),
    }
}

fn check_corpus(config: &AdalatConfig, report: &mut CheckReport) {
    match resolve_csv_path(&config.data) {
        Ok(path) if path.is_file() => {
            report.push("corpus", CheckStatus::Pass, format!("found {}", path.display()))
        }
        Ok(path) => report.push(
            "corpus",
            CheckStatus::Fail,
            format!("{} does not exist", path.display()),
        ),
        Err(e) => report.push("corpus", CheckStatus::Fail, e.to_string()),
    }
}

fn check_vector_store(config: &AdalatConfig, report: &mut CheckReport) {
    let dir = &config.rag.vector_store_path;
    if dir.join(adalat_vector::persistence::INDEX_FILE).is_file() {
        report.push("vector store", CheckStatus::Pass, format!("found in {}", dir.display()));
    } else {
        report.push(
            "vector store",
            CheckStatus::Warn,
            format!("not built yet in {}; run `adalat-server build-index`", dir.display()),
        );
    }
}
