//! CLI command definitions

use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for a generated quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Coloured, human-readable quiz with answers marked
    Full,
    /// Pretty-printed JSON
    Json,
}

/// CLI arguments for quizgen
#[derive(Parser, Debug)]
#[command(name = "quizgen")]
#[command(author, version, about = "Generate multiple-choice quizzes with an LLM")]
#[command(long_about = r#"
quizgen asks a chat-completion model for a five-question quiz, either about a
topic or drawn from a body of text, and checks that every question has four
answers with exactly one correct before printing it.

Configuration is loaded from (in priority order):
1. QUIZGEN_* environment variables (e.g. QUIZGEN_NETWORK__RETRY_ATTEMPTS=5)
2. --config <path>     Explicit config file
3. ./quizgen.toml      Project-level config
4. ~/.config/quizgen/config.toml   Global config

The API key is read from OPENROUTER_API_KEY unless provider.api_key_env
names another variable.

Example:
  quizgen --topic "The water cycle"
  quizgen --content-file notes.md -o json
  cat chapter3.txt | quizgen --content -
"#)]
#[command(group(
    ArgGroup::new("source")
        .args(["topic", "content_file", "content"])
        .multiple(false)
))]
pub struct Cli {
    /// Topic to generate a quiz about
    #[arg(short, long, value_name = "TOPIC")]
    pub topic: Option<String>,

    /// File whose text the quiz is drawn from
    #[arg(long, value_name = "PATH")]
    pub content_file: Option<PathBuf>,

    /// Text the quiz is drawn from, or `-` to read it from stdin
    #[arg(long, value_name = "TEXT")]
    pub content: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Override the configured model
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Override the configured number of retry attempts
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration sources and effective values, then exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// `--content -`
    pub fn reads_stdin(&self) -> bool {
        self.content.as_deref() == Some("-")
    }
}
