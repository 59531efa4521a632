//! penemuu CLI - Command-line interface
//!
//! Usage:
//!   penemuu extract --input <docs.json> [--label-a L] [--label-b L]
//!   penemuu breakdown --input <docs.json> [--type-a L] [--type-b L] [--percent]
//!   penemuu filter --input <docs.json> --label L [--label L ...]
//!
//! Input is the JSON output of an external dependency parser: either one
//! document or an array of documents.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;

use penemuu_core::{AppConfig, LoggingConfig, ParsedDocument, RawDocument, Sentence};
use penemuu_extractor::{
    breakdown, sentences_with_labels, DependencyRelationExtractor, RelationExtractor,
};

#[derive(Parser)]
#[command(name = "penemuu")]
#[command(about = "Dependency-path relation polarity extraction")]
#[command(version)]
struct Cli {
    /// TOML configuration file (environment variables still take precedence)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Abort on the first invalid sentence instead of skipping it
    #[arg(long, global = true)]
    fail_fast: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide the relation of every entity pair, one JSON record per line
    Extract {
        /// Parsed documents (JSON)
        #[arg(long)]
        input: PathBuf,
        /// First entity label (defaults to the configured one)
        #[arg(long)]
        label_a: Option<String>,
        /// Second entity label (defaults to the configured one)
        #[arg(long)]
        label_b: Option<String>,
    },
    /// Bucket sentences by the subject/object roles of two entity types
    Breakdown {
        /// Parsed documents (JSON)
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        type_a: Option<String>,
        #[arg(long)]
        type_b: Option<String>,
        /// Report proportions of the corpus instead of counts
        #[arg(long)]
        percent: bool,
    },
    /// Print sentences that mention every given entity label
    Filter {
        /// Parsed documents (JSON)
        #[arg(long)]
        input: PathBuf,
        #[arg(long = "label", required = true)]
        labels: Vec<String>,
    },
}

/// One document or many
#[derive(Deserialize)]
#[serde(untagged)]
enum InputDocuments {
    Many(Vec<RawDocument>),
    One(RawDocument),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging);

    let fail_fast = cli.fail_fast || config.extraction.fail_fast;

    match cli.command {
        Commands::Extract {
            input,
            label_a,
            label_b,
        } => {
            let label_a = label_a.unwrap_or_else(|| config.extraction.label_a.clone());
            let label_b = label_b.unwrap_or_else(|| config.extraction.label_b.clone());
            let documents = load_documents(&input, fail_fast)?;
            let stdout = std::io::stdout();
            run_extract(&mut stdout.lock(), &config, &documents, &label_a, &label_b)?;
        }
        Commands::Breakdown {
            input,
            type_a,
            type_b,
            percent,
        } => {
            let type_a = type_a.unwrap_or_else(|| config.extraction.label_a.clone());
            let type_b = type_b.unwrap_or_else(|| config.extraction.label_b.clone());
            let documents = load_documents(&input, fail_fast)?;
            let sentences: Vec<Sentence> = documents
                .into_iter()
                .flat_map(|doc| doc.sentences)
                .collect();

            let result = breakdown(&sentences, &type_a, &type_b, &config.labels);
            let values = result
                .counts_or_percentages(percent)
                .context("Failed to compute breakdown")?;
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
        Commands::Filter { input, labels } => {
            let documents = load_documents(&input, fail_fast)?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for doc in &documents {
                for sentence in sentences_with_labels(&doc.sentences, &labels) {
                    writeln!(out, "{}", sentence.text())?;
                }
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?
            .with_env_override()?,
        None => AppConfig::from_env().context("Invalid configuration in environment")?,
    };
    Ok(config)
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    // stdout carries the results
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_documents(path: &Path, fail_fast: bool) -> anyhow::Result<Vec<ParsedDocument>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let input: InputDocuments = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse documents in {}", path.display()))?;

    let raw = match input {
        InputDocuments::Many(docs) => docs,
        InputDocuments::One(doc) => vec![doc],
    };

    let mut documents = Vec::with_capacity(raw.len());
    for doc in raw {
        if fail_fast {
            let id = doc.id.clone();
            documents.push(
                ParsedDocument::try_from_raw(doc)
                    .with_context(|| format!("Invalid parse in document '{}'", id))?,
            );
        } else {
            documents.push(doc.parse().document);
        }
    }

    tracing::info!(
        documents = documents.len(),
        sentences = documents.iter().map(|d| d.sentence_count()).sum::<usize>(),
        "loaded input"
    );
    Ok(documents)
}

/// Invalid sentences were already dropped or rejected by `load_documents`,
/// so extraction itself only fails on I/O.
fn run_extract<W: Write>(
    out: &mut W,
    config: &AppConfig,
    documents: &[ParsedDocument],
    label_a: &str,
    label_b: &str,
) -> anyhow::Result<usize> {
    let extractor = DependencyRelationExtractor::new(config.labels.clone());
    let mut written = 0usize;

    for doc in documents {
        for (position, sentence) in doc.sentences.iter().enumerate() {
            let records = extractor
                .extract(sentence, label_a, label_b)
                .with_context(|| {
                    format!("Extraction failed in document '{}' sentence {}", doc.id, position)
                })?;

            for record in records {
                let line = serde_json::to_string(&record.export(sentence))?;
                writeln!(out, "{}", line)?;
                written += 1;
            }
        }
    }

    tracing::info!(records = written, %label_a, %label_b, "extraction finished");
    Ok(written)
}
