//! `adalat-server` binary
//!
//! Usage:
//!   adalat-server                      # Start the server (builds the index if none is saved)
//!   adalat-server init                 # Scaffold adalat.toml, .env.example, data/
//!   adalat-server build-index          # Chunk the corpus and build the vector store
//!   adalat-server ask "question"       # One-shot answer with sources
//!   adalat-server check                # Verify the working directory

use std::path::Path;
use std::sync::Arc;

use adalat::{
    api::{create_router, handlers::index::rebuild_index},
    cli::{
        check::run_checks,
        init::{self, InitConfig, InitResult},
        output::Output,
        Cli, Commands,
    },
    corpus::{
        act_statistics, chunker::load_processed, load_acts, resolve_csv_path, ChunkerConfig,
        LegalDataProcessor,
    },
    llm::UnconfiguredClient,
    rag::{
        assistant::ChatQuery,
        embeddings::build_embedder,
        prompt::AssistantMode,
        search::{SearchFilters, SearchStrategy},
    },
    utils::toml_config::{ConfigError, LogFormat, MAX_TOP_K},
    AdalatConfig, AdalatConfigManager, AppState, LLMClient, LLMClientFactory, LegalAssistant,
};
use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let config_path = cli.config;
    let verbose = cli.verbose;

    match cli.command.unwrap_or(Commands::Serve { no_build: false }) {
        Commands::Init {
            path,
            force,
            host,
            port,
        } => {
            let result = init::run(
                InitConfig {
                    path,
                    force,
                    host,
                    port,
                },
                &output,
            );
            match result {
                InitResult::Success | InitResult::AlreadyExists => Ok(()),
                InitResult::Error(e) => bail!("init failed: {}", e),
            }
        }
        Commands::Check => {
            let report = run_checks(&config_path);
            report.print(&output);
            if !report.passed() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Serve { no_build } => {
            let (config, found) = setup(&config_path, verbose)?;
            serve(&config_path, config, found, !no_build).await
        }
        Commands::Ingest { csv, output: out } => {
            let (config, _) = setup(&config_path, verbose)?;
            ingest(config, csv, out, &output).await
        }
        Commands::BuildIndex => {
            let (config, _) = setup(&config_path, verbose)?;
            build_index(config, &output).await
        }
        Commands::Ask {
            question,
            mode,
            top_k,
            strategy,
        } => {
            let (config, _) = setup(&config_path, verbose)?;
            ask(config, &question, &mode, top_k, strategy.as_deref(), &output).await
        }
        Commands::Stats => {
            let (config, _) = setup(&config_path, verbose)?;
            stats(config, &output).await
        }
    }
}

/// Load the config and start logging.
fn setup(config_path: &Path, verbose: bool) -> Result<(AdalatConfig, bool)> {
    let (config, found) = load_config(config_path)?;
    init_tracing(&config, verbose);
    if !found {
        warn!(path = %config_path.display(), "Config file not found, using defaults");
    }
    Ok((config, found))
}

/// Load the config file, falling back to defaults when it does not exist.
fn load_config(path: &Path) -> Result<(AdalatConfig, bool)> {
    match AdalatConfig::load(path) {
        Ok(config) => Ok((config, true)),
        Err(ConfigError::FileNotFound(_)) => Ok((AdalatConfig::default(), false)),
        Err(e) => Err(e).with_context(|| format!("Failed to load {}", path.display())),
    }
}

/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing(config: &AdalatConfig, verbose: bool) {
    let default_filter = if verbose {
        "adalat=debug,adalat_server=debug,tower_http=debug".to_string()
    } else {
        config.server.log_level.clone()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.server.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.with_target(false).init(),
    }
}

/// Assistant with the configured LLM. A provider that cannot be set up
/// (usually a missing API key) is replaced by one that explains the problem,
/// so search and statistics keep working.
async fn build_assistant(config: &AdalatConfig) -> Result<Arc<LegalAssistant>> {
    let embedder = build_embedder(&config.rag)?;

    let llm: Arc<dyn LLMClient> = match create_llm(config).await {
        Ok(client) => Arc::from(client),
        Err(e) => {
            warn!(error = %e, "LLM unavailable; answers will report the problem");
            Arc::new(UnconfiguredClient::new(config.llm.model.clone(), e.to_string()))
        }
    };

    Ok(Arc::new(LegalAssistant::new(
        embedder,
        llm,
        &config.rag.vector_store_path,
    )))
}

async fn create_llm(config: &AdalatConfig) -> adalat::Result<Box<dyn LLMClient>> {
    LLMClientFactory::from_config(config)?.create_default().await
}

async fn load_corpus_acts(config: &AdalatConfig) -> Result<Vec<adalat::ActRecord>> {
    let csv_path = resolve_csv_path(&config.data)?;
    let acts = tokio::task::spawn_blocking(move || load_acts(&csv_path)).await??;
    Ok(acts)
}

async fn serve(
    config_path: &Path,
    config: AdalatConfig,
    found: bool,
    build_missing_index: bool,
) -> Result<()> {
    let config_manager = if found {
        let mut manager = AdalatConfigManager::new(config_path)?;
        if let Err(e) = manager.start_watching() {
            warn!(error = %e, "Config hot reload disabled");
        }
        manager
    } else {
        AdalatConfigManager::from_config(config.clone())
    };

    for warning in config.validate_with_warnings()? {
        warn!(kind = ?warning.kind, "{}", warning.message);
    }

    let assistant = build_assistant(&config).await?;
    let loaded = assistant.load_vector_store().await?;

    let acts = match load_corpus_acts(&config).await {
        Ok(acts) => acts,
        Err(e) => {
            warn!(error = %e, "Corpus not loaded; statistics and topics will be empty");
            Vec::new()
        }
    };

    let state = AppState::new(Arc::new(config_manager), assistant, acts);

    if !loaded {
        if build_missing_index {
            info!("No saved vector store; building one now");
            match rebuild_index(&state).await {
                Ok(report) => info!(
                    acts = report.acts,
                    chunks = report.chunks,
                    duration_ms = report.duration_ms,
                    "Startup index build finished"
                ),
                Err(e) => warn!(error = %e, "Startup index build failed; POST /api/index/build to retry"),
            }
        } else {
            warn!("No saved vector store; chat and search return 503 until one is built");
        }
    }

    let app = create_router(state);
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Adalat listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn ingest(
    mut config: AdalatConfig,
    csv: Option<std::path::PathBuf>,
    out: Option<std::path::PathBuf>,
    output: &Output,
) -> Result<()> {
    if let Some(csv) = csv {
        config.data.csv_path = Some(csv);
    }
    if let Some(out) = out {
        config.data.processed_path = out;
    }

    let csv_path = resolve_csv_path(&config.data)?;
    let processed_path = config.data.processed_path.clone();
    output.step(1, 2, &format!("Processing {}", csv_path.display()));

    let (acts, chunks) = tokio::task::spawn_blocking(move || -> adalat::Result<_> {
        let mut processor = LegalDataProcessor::from_csv(&csv_path, ChunkerConfig::from(&config.rag))?;
        processor.process_all_acts();
        processor.save_processed(&processed_path)?;
        Ok(processor.into_parts())
    })
    .await??;

    output.step(2, 2, "Writing chunks");
    output.created(
        "chunks",
        &format!("{} chunks from {} acts", chunks.len(), acts.len()),
    );
    print_stats(&act_statistics(&acts, chunks.len()), output);
    Ok(())
}

async fn build_index(config: AdalatConfig, output: &Output) -> Result<()> {
    let embedder = build_embedder(&config.rag)?;
    let llm = Arc::new(UnconfiguredClient::new(
        config.llm.model.clone(),
        "not needed for indexing",
    ));
    let assistant = Arc::new(LegalAssistant::new(
        embedder,
        llm,
        &config.rag.vector_store_path,
    ));
    let state = AppState::new(
        Arc::new(AdalatConfigManager::from_config(config.clone())),
        assistant,
        Vec::new(),
    );

    output.info("Building vector store...");
    let report = rebuild_index(&state).await?;
    output.complete(&format!(
        "Indexed {} chunks from {} acts in {} ms",
        report.chunks, report.acts, report.duration_ms
    ));
    output.kv("Saved to", &config.rag.vector_store_path.display().to_string());
    Ok(())
}

async fn ask(
    config: AdalatConfig,
    question: &str,
    mode: &str,
    top_k: Option<usize>,
    strategy: Option<&str>,
    output: &Output,
) -> Result<()> {
    let mode: AssistantMode = mode.parse()?;
    let top_k = top_k.unwrap_or(config.rag.top_k);
    if !(1..=MAX_TOP_K).contains(&top_k) {
        bail!("--top-k must be between 1 and {}", MAX_TOP_K);
    }
    let strategy = match strategy {
        Some(s) => s.parse::<SearchStrategy>()?,
        None => config.rag.strategy,
    };

    let assistant = build_assistant(&config).await?;
    if !assistant.load_vector_store().await? {
        bail!(
            "No vector store in {}; run `adalat-server build-index` first",
            config.rag.vector_store_path.display()
        );
    }

    let filters = SearchFilters::default();
    let answer = assistant
        .chat(ChatQuery {
            message: question,
            mode,
            top_k,
            filters: &filters,
            strategy,
            history: &[],
        })
        .await?;

    output.header(&format!("{} {}", mode.info().icon, mode.info().title));
    output.newline();
    output.paragraph(&answer.response);
    output.newline();

    if !answer.sources.is_empty() {
        output.subheader("Sources");
        for (i, hit) in answer.sources.iter().enumerate() {
            let meta = &hit.metadata;
            let detail = format!(
                "({}) {} · score {:.3}",
                meta.act_year,
                meta.section_title.as_deref().unwrap_or("Overview"),
                hit.score
            );
            output.source(i + 1, &meta.act_title, &detail);
        }
    }
    Ok(())
}

async fn stats(config: AdalatConfig, output: &Output) -> Result<()> {
    let acts = load_corpus_acts(&config).await?;
    let processed_path = config.data.processed_path.clone();
    let total_chunks = tokio::task::spawn_blocking(move || {
        load_processed(&processed_path).map(|c| c.len()).unwrap_or(0)
    })
    .await?;

    print_stats(&act_statistics(&acts, total_chunks), output);
    Ok(())
}

fn print_stats(stats: &adalat::corpus::CorpusStats, output: &Output) {
    output.header("Corpus statistics");
    output.kv("Total acts", &stats.total_acts.to_string());
    output.kv("Total chunks", &stats.total_chunks.to_string());
    output.kv("Active acts", &stats.active_acts.to_string());
    output.kv("Repealed acts", &stats.repealed_acts.to_string());

    let years = match (stats.years_coverage.earliest, stats.years_coverage.latest) {
        (Some(first), Some(last)) => format!("{}-{}", first, last),
        _ => "N/A".to_string(),
    };
    output.kv("Years", &years);
    output.kv("Average sections", &format!("{:.1}", stats.average_sections));

    if !stats.acts_by_decade.is_empty() {
        output.subheader("Acts by decade");
        for (decade, count) in &stats.acts_by_decade {
            output.kv(decade, &count.to_string());
        }
    }
    if !stats.language_distribution.is_empty() {
        output.subheader("Languages");
        for (language, count) in &stats.language_distribution {
            output.kv(language, &count.to_string());
        }
    }
}
