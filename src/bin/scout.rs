//! CLI binary for scout.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use scout::{
    ResearchEvent, ResearchRequest, ResearchResult, ResearchService, ResearchStatus, ScoutConfig,
};
use tracing_subscriber::EnvFilter;

/// Scout: cited research briefings from the command line.
#[derive(Parser)]
#[command(name = "scout", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Research a topic and print the briefing.
    Research {
        /// Topic to research.
        topic: String,

        /// quick, standard or deep.
        #[arg(short, long, default_value = "standard")]
        depth: String,

        /// Also search arXiv and Semantic Scholar.
        #[arg(short, long)]
        academic: bool,

        /// Print every event as a JSON line instead of the briefing.
        #[arg(long)]
        json: bool,
    },

    /// Check the language model backend.
    Health,

    /// Print the effective configuration.
    Config {
        /// Write the default configuration to the config path.
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the briefing or JSON events.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scout=info,scout_search=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Research {
            topic,
            depth,
            academic,
            json,
        } => {
            let config = ScoutConfig::load(cli.config.as_deref())?;
            let request = ResearchRequest {
                topic,
                depth,
                include_academic: academic,
            };
            run_research(&config, &request, json).await
        }
        Command::Health => {
            let config = ScoutConfig::load(cli.config.as_deref())?;
            check_health(&config).await
        }
        Command::Config { write } => show_config(cli.config, write),
    }
}

async fn run_research(
    config: &ScoutConfig,
    request: &ResearchRequest,
    json: bool,
) -> anyhow::Result<()> {
    let service = ResearchService::from_config(config)?;
    let mut events = service.research(request)?;
    let mut stdout = std::io::stdout().lock();

    while let Some(event) = events.next().await {
        if json {
            writeln!(stdout, "{}", serde_json::to_string(&event)?)?;
            continue;
        }
        match event {
            ResearchEvent::Progress(p) => {
                eprintln!("[{:>3.0}%] {}: {}", p.progress * 100.0, p.status, p.message);
                if p.status == ResearchStatus::Error {
                    anyhow::bail!("research failed: {}", p.message);
                }
            }
            ResearchEvent::Result(result) => print_result(&mut stdout, &result)?,
        }
    }
    Ok(())
}

fn print_result(out: &mut impl Write, result: &ResearchResult) -> std::io::Result<()> {
    writeln!(out, "{}\n", result.briefing)?;
    writeln!(out, "---")?;
    for (i, source) in result.sources.iter().enumerate() {
        writeln!(
            out,
            "[{}] {} ({:.2})\n    {}",
            i + 1,
            source.title,
            source.credibility_score,
            source.url
        )?;
    }
    writeln!(
        out,
        "\n{} sources, {:.2}s, model {}",
        result.sources.len(),
        result.total_time_seconds,
        result.model_used
    )
}

async fn check_health(config: &ScoutConfig) -> anyhow::Result<()> {
    let service = ResearchService::from_config(config)?;
    let health = service.model_health().await?;
    println!(
        "{} ({}): {}",
        config.llm.provider.as_str(),
        health.model,
        health.message
    );
    if !health.healthy {
        anyhow::bail!("language model backend is unhealthy");
    }
    Ok(())
}

fn show_config(path: Option<PathBuf>, write: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(ScoutConfig::default_config_path);
    if write {
        ScoutConfig::default()
            .save_to_file(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("wrote default configuration to {}", path.display());
    }
    let config = ScoutConfig::load(Some(&path).filter(|p| p.exists()).map(PathBuf::as_path))?;
    print!("{}", config.redacted().to_toml()?);
    Ok(())
}
