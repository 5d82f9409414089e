//! CLI entrypoint for quizgen
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use quizgen_application::GenerateQuizUseCase;
use quizgen_domain::QuizSource;
use quizgen_infrastructure::{
    CompletionSettings, ConfigError, ConfigLoader, FileConfig, HttpCompletionTransport,
    NetworkConfig,
};
use quizgen_presentation::{Cli, ConsoleFormatter, OutputFormatter, progress_for};
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(&cli)?;

    info!("Starting quizgen");

    let config = load_config(&cli)?;

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        println!();
        println!(
            "{}",
            toml::to_string_pretty(&config.redacted())
                .context("Failed to render configuration")?
        );
        return Ok(());
    }

    let (settings, network, source) = prepare(&config, || read_source(&cli))?;
    debug!(?settings, ?network, "Transport configured");

    // === Dependency Injection ===
    let transport = Arc::new(HttpCompletionTransport::new(settings, network)?);
    let use_case = GenerateQuizUseCase::new(transport);

    let quiz = if cli.quiet {
        use_case.execute(source).await?
    } else {
        let progress = progress_for(&source.describe(), std::io::stderr().is_terminal());
        use_case.execute_with_progress(source, progress.as_ref()).await?
    };

    let formatter: &dyn OutputFormatter = &ConsoleFormatter;
    let output = formatter.render(&quiz, cli.output);

    println!("{}", output);

    Ok(())
}

/// Install the tracing subscriber. Logs go to stderr, or to `--log-file`.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    // RUST_LOG wins over the verbosity flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    });

    match &cli.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();

            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();

            Ok(None)
        }
    }
}

/// Load configuration and apply command-line overrides.
fn load_config(cli: &Cli) -> Result<FileConfig, ConfigError> {
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };

    if let Some(model) = &cli.model {
        config.provider.model = model.clone();
    }
    if let Some(retries) = cli.retries {
        config.network.retry_attempts = retries;
    }

    config.validate()?;
    Ok(config)
}

/// Resolve transport settings, then read the source.
///
/// A missing credential halts startup before stdin is consumed.
fn prepare(
    config: &FileConfig,
    read_source: impl FnOnce() -> Result<QuizSource>,
) -> Result<(CompletionSettings, NetworkConfig, QuizSource)> {
    let settings = config.completion_settings()?;
    let network = config.network_config().map_err(ConfigError::from)?;
    let source = read_source()?;
    Ok((settings, network, source))
}

/// Resolve `--topic`, `--content-file` or `--content` into a quiz source.
fn read_source(cli: &Cli) -> Result<QuizSource> {
    let content = if cli.reads_stdin() {
        let text = std::io::read_to_string(std::io::stdin())
            .context("Failed to read content from stdin")?;
        Some(text)
    } else if let Some(path) = &cli.content_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read content file {}", path.display()))?;
        Some(text)
    } else {
        cli.content.clone()
    };

    QuizSource::from_parts(cli.topic.clone(), content)
        .context("Provide --topic <TOPIC>, --content-file <PATH> or --content -")
}
