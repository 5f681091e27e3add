//! Init command implementation
//!
//! Scaffolds an Adalat working directory: `adalat.toml`, `.env.example`,
//! `.gitignore` and the data, vector store and log directories.

use super::output::Output;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (adalat.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// Host address for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
}

const DIRECTORIES: [&str; 3] = ["data", "vectorstore", "logs"];

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing Adalat");

    let base_path = &config.path;

    let config_path = base_path.join("adalat.toml");
    if config_path.exists() && !config.force {
        output.warning("adalat.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    output.subheader("Creating directories");

    for dir in DIRECTORIES {
        let dir_path = base_path.join(dir);
        if dir_path.exists() {
            output.skipped(dir, "already exists");
            continue;
        }
        if let Err(e) = fs::create_dir_all(&dir_path) {
            output.error(&format!("Failed to create {}: {}", dir, e));
            return InitResult::Error(e.to_string());
        }
        output.created("directory", dir);
    }

    output.subheader("Creating configuration files");

    if let Err(e) = write_file(&config_path, &generate_adalat_toml(&config), config.force) {
        output.error(&format!("Failed to create adalat.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "adalat.toml");

    let env_example_path = base_path.join(".env.example");
    if let Err(e) = write_file(&env_example_path, &generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("env", ".env.example");

    let gitignore_path = base_path.join(".gitignore");
    if !gitignore_path.exists() {
        if let Err(e) = write_file(&gitignore_path, &generate_gitignore(), false) {
            output.warning(&format!("Failed to create .gitignore: {}", e));
        } else {
            output.created("file", ".gitignore");
        }
    }

    output.complete("Adalat initialized successfully!");

    output.header("Next Steps");
    output.newline();
    output.info("1. Add your Gemini API key:");
    output.command("cp .env.example .env");
    output.command("# Edit .env and set GOOGLE_API_KEY");
    output.newline();
    output.info("2. Put the legal corpus CSV in data/");
    output.newline();
    output.info("3. Build the index and start the server:");
    output.command("adalat-server build-index");
    output.command("adalat-server serve");
    output.newline();

    output.hint(&format!(
        "The web UI will be available at http://{}:{}",
        config.host, config.port
    ));
    output.hint("Run `adalat-server check` to verify the setup");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

fn generate_adalat_toml(config: &InitConfig) -> String {
    format!(
        r#"# Adalat configuration
# Secrets live in the environment; see .env.example

[server]
host = "{host}"
port = {port}
log_level = "info"
# "pretty" or "json"
log_format = "pretty"

[llm]
# gemini, openai (feature "openai") or ollama (feature "ollama")
provider = "gemini"
model = "gemini-1.5-flash"
api_key_env = "GOOGLE_API_KEY"
temperature = 0.7
max_output_tokens = 2048
timeout_secs = 60

[rag]
# "hashing" or "fastembed" (feature "local-embeddings")
embedder = "hashing"
embedding_model = "sentence-transformers/all-MiniLM-L6-v2"
dimensions = 384
vector_store_path = "./vectorstore"
top_k = 5
chunk_size = 2000
chunk_overlap = 200
# semantic, bm25 or hybrid
strategy = "semantic"
history_window = 10

[data]
data_dir = "./data"
# csv_path = "./data/bangladesh_laws.csv"
processed_path = "./data/processed_documents.json"
"#,
        host = config.host,
        port = config.port
    )
}

fn generate_env_example() -> String {
    r#"# Gemini API key (https://aistudio.google.com/app/apikey)
GOOGLE_API_KEY=your_gemini_api_key_here

# Log filter, overrides server.log_level
RUST_LOG=info

# Alternate config file
# ADALAT_CONFIG=adalat.toml
"#
    .to_string()
}

fn generate_gitignore() -> String {
    r#"# Environment
.env

# Generated data
vectorstore/
data/processed_documents.json
logs/

# Build output
target/
"#
    .to_string()
}
