//! elink CLI - Command-line interface
//!
//! Usage:
//!   elink validate <path>
//!   elink stats <path> [--json]
//!   elink convert <input> <output> [--gold]
//!   elink show <path> <id>

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use elink_core::{AppConfig, Article, LoggingConfig};
use elink_dataset::{ArticleReader, ArticleWriter, DatasetStats};

#[derive(Parser)]
#[command(name = "elink")]
#[command(about = "Entity-linked article dataset tools")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse every article and report malformed lines
    Validate {
        /// JSON-lines dataset
        path: PathBuf,
    },
    /// Print mention and linking statistics
    Stats {
        /// JSON-lines dataset
        path: PathBuf,
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rewrite a dataset, optionally in the gold format
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Keep only span and id for each mention
        #[arg(long)]
        gold: bool,
    },
    /// Print a single article
    Show {
        /// JSON-lines dataset
        path: PathBuf,
        /// Article id
        id: i64,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn validate(path: &Path) -> anyhow::Result<()> {
    let reader = ArticleReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut valid = 0;
    let mut invalid = 0;
    for result in reader {
        match result {
            Ok(_) => valid += 1,
            Err(e) => {
                eprintln!("{e}");
                invalid += 1;
            }
        }
    }

    println!("{valid} valid, {invalid} invalid");
    if invalid > 0 {
        bail!("{invalid} malformed articles in {}", path.display());
    }
    Ok(())
}

fn stats(path: &Path, json: bool) -> anyhow::Result<()> {
    let reader = ArticleReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut stats = DatasetStats::default();
    for article in reader {
        stats.add_article(&article?);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Articles:           {}", stats.articles);
    println!("Mentions:           {}", stats.mentions);
    println!(
        "Linked mentions:    {} ({:.1}%)",
        stats.linked_mentions,
        stats.link_rate() * 100.0
    );
    println!(
        "With candidates:    {} (mean {:.2})",
        stats.mentions_with_candidates,
        stats.mean_candidates()
    );
    println!(
        "Covered characters: {} / {} ({:.1}%)",
        stats.covered_characters,
        stats.characters,
        stats.coverage_ratio() * 100.0
    );
    for (name, count) in &stats.recognized_by {
        println!("  recognized by {name}: {count}");
    }
    for (name, count) in &stats.linked_by {
        println!("  linked by {name}: {count}");
    }
    Ok(())
}

fn convert(input: &Path, output: &Path, evaluation_format: bool) -> anyhow::Result<()> {
    let reader = ArticleReader::open(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let mut writer = ArticleWriter::create(output, evaluation_format)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    for article in reader {
        writer.write(&article?)?;
    }
    writer.flush()?;

    tracing::info!(
        "Wrote {} articles to {}",
        writer.written(),
        output.display()
    );
    Ok(())
}

fn show(path: &Path, id: i64, config: &AppConfig) -> anyhow::Result<()> {
    let reader = ArticleReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut found: Option<Article> = None;
    for article in reader {
        let article = article?;
        if article.id == id {
            found = Some(article);
            break;
        }
    }
    let Some(article) = found else {
        bail!("Article {id} not found in {}", path.display());
    };

    let evaluation_format = config.output.evaluation_format;
    if config.output.pretty {
        println!("{}", article.to_json_pretty(evaluation_format));
    } else {
        println!("{}", article.to_json(evaluation_format));
    }

    for mention in article.sorted_mentions() {
        let surface = article.span_text(mention.span()).unwrap_or_default();
        match &mention.entity_id {
            Some(entity_id) => println!("{} {:?} -> {}", mention.span(), surface, entity_id),
            None => println!("{} {:?}", mention.span(), surface),
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Validate { path } => validate(&path)?,
        Commands::Stats { path, json } => stats(&path, json)?,
        Commands::Convert {
            input,
            output,
            gold,
        } => convert(&input, &output, config.output.evaluation_format && !gold)?,
        Commands::Show { path, id } => show(&path, id, &config)?,
    }

    Ok(())
}
