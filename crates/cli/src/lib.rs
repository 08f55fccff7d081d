//! CLI for LLM integration health checks.
//!
//! This crate provides the `llm-health` command-line interface: discovering
//! registered integrations, running the conformance harness against them,
//! persisting results and rendering compatibility reports.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

mod output;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use llm_health_adapters::{ComponentRegistry, HealthConfig};
use llm_health_core::{Category, SuiteEntry, TestSuite};
use llm_health_reports::{io as report_io, CompatibilityReporter, ReportFormat};
use llm_health_storage::{days_ago, JsonlResultStore, ResultStore};
use output::ListFormat;
use std::ffi::OsString;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// LLM integration health CLI.
#[derive(Parser, Debug)]
#[command(name = "llm-health")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file.
    #[arg(short, long, global = true, env = "LIH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Result store path, overriding the configured one.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered integrations.
    Discover {
        /// Listing format.
        #[arg(short, long, value_enum, default_value = "table")]
        format: ListFormat,

        /// Also write the listing as JSON to this file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the conformance harness.
    ///
    /// Results are saved to the result store. With `--output`, a report is
    /// written in the format implied by the file extension (json, csv, md).
    Test {
        /// Only test the integration with this exact name.
        #[arg(short, long)]
        integration: Option<String>,

        /// Only test one category: llms, chat_models or embeddings.
        #[arg(short = 't', long)]
        category: Option<Category>,

        /// Report file.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Ask components to avoid real provider calls.
        #[arg(long)]
        mock: bool,

        /// Test one integration at a time.
        #[arg(long)]
        sequential: bool,
    },

    /// Render a report from stored results.
    Report {
        /// Report format: json, csv, md or markdown.
        #[arg(short, long, default_value = "markdown")]
        format: ReportFormat,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include results from the last N days.
        #[arg(short, long, default_value_t = 7)]
        days: i64,

        /// Read results from a JSON array file instead of the store.
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Delete old results from the store.
    Clean {
        /// Delete results older than N days.
        #[arg(short, long, default_value_t = 90)]
        days: i64,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Show configuration and store status.
    Status {
        /// Also list the latest result of every integration.
        #[arg(short, long)]
        detailed: bool,
    },
}

fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A second initialisation (e.g. in tests) keeps the first subscriber.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Run using the current process arguments.
pub async fn run() -> Result<()> {
    run_with_args(std::env::args_os()).await
}

/// Run using the provided argument iterator.
pub async fn run_with_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_tracing(cli.verbose, cli.log_json);

    let mut config = HealthConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(store) = &cli.store {
        config.database_url = store.display().to_string();
    }
    let registry = ComponentRegistry::builtin();

    match cli.command {
        Commands::Discover { format, output } => discover(&registry, &config, format, output.as_deref()),
        Commands::Test {
            integration,
            category,
            output,
            mock,
            sequential,
        } => {
            if mock {
                config.mock_mode = true;
            }
            if sequential {
                config.parallel_tests = false;
            }
            test(&registry, &config, integration.as_deref(), category, output.as_deref()).await
        }
        Commands::Report {
            format,
            output,
            days,
            input,
        } => report(&config, format, output.as_deref(), days, input.as_deref()).await,
        Commands::Clean { days, yes } => clean(&config, days, yes).await,
        Commands::Status { detailed } => status(&registry, &config, detailed).await,
    }
}

async fn open_store(config: &HealthConfig) -> Result<JsonlResultStore> {
    JsonlResultStore::open(&config.database_url)
        .await
        .with_context(|| format!("opening result store {}", config.database_url))
}

fn discover(
    registry: &ComponentRegistry,
    config: &HealthConfig,
    format: ListFormat,
    output: Option<&Path>,
) -> Result<()> {
    let infos: Vec<_> = registry
        .infos()
        .into_iter()
        .filter(|info| config.matches_discovery(&info.name))
        .collect();

    match format {
        ListFormat::Table => output::print_integrations(&infos),
        ListFormat::Json => println!("{}", serde_json::to_string_pretty(&infos)?),
    }

    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&infos)?)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Integration list written to {}", path.display());
    }
    Ok(())
}

async fn test(
    registry: &ComponentRegistry,
    config: &HealthConfig,
    integration: Option<&str>,
    category: Option<Category>,
    output: Option<&Path>,
) -> Result<()> {
    let report_format = match output {
        Some(path) => Some(ReportFormat::from_path(path).unwrap_or(ReportFormat::Json)),
        None => None,
    };

    if integration.is_none() && !config.auto_discovery {
        bail!("Automatic discovery is disabled; select an integration with --integration");
    }

    let selected: Vec<_> = registry
        .select(category, integration)
        .into_iter()
        .filter(|(_, component)| integration.is_some() || config.matches_discovery(component.name()))
        .collect();
    if selected.is_empty() {
        bail!("No integrations matched the given filters");
    }

    let mut suite = TestSuite::new(config.suite_options());
    for (category, component) in selected {
        let args = config.integration_config(component.name());
        suite.add(SuiteEntry::new(category, component, args));
    }
    info!(count = suite.len(), "Testing integrations");
    let results = suite.run().await;

    let store = open_store(config).await?;
    for result in &results {
        if let Err(e) = store.save(result).await {
            warn!(integration = %result.integration_name, error = %e, "Failed to save result");
        }
    }

    output::print_results(&results);
    output::print_issues(&results);

    if let (Some(path), Some(format)) = (output, report_format) {
        CompatibilityReporter::new(&results)
            .save_report(format, path)
            .with_context(|| format!("writing report {}", path.display()))?;
        println!();
        println!("Report written to {}", path.display());
    }
    Ok(())
}

async fn report(
    config: &HealthConfig,
    format: ReportFormat,
    output: Option<&Path>,
    days: i64,
    input: Option<&Path>,
) -> Result<()> {
    let results = match input {
        Some(path) => report_io::read_results_json(path)
            .with_context(|| format!("reading results from {}", path.display()))?,
        None => {
            let store = open_store(config).await?;
            store.since(days_ago(days)).await?
        }
    };

    let reporter = CompatibilityReporter::new(&results);
    match output {
        Some(path) => {
            reporter
                .save_report(format, path)
                .with_context(|| format!("writing report {}", path.display()))?;
            println!("Report with {} results written to {}", results.len(), path.display());
        }
        None => println!("{}", reporter.render(format)?),
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn clean(config: &HealthConfig, days: i64, yes: bool) -> Result<()> {
    if days < 0 {
        bail!("--days must not be negative");
    }
    if !yes && !confirm(&format!("Delete results older than {days} days?"))? {
        println!("Aborted");
        return Ok(());
    }

    let store = open_store(config).await?;
    let removed = store.delete_older_than(days).await?;
    println!("Deleted {removed} results older than {days} days");
    Ok(())
}

async fn status(registry: &ComponentRegistry, config: &HealthConfig, detailed: bool) -> Result<()> {
    use colored::Colorize;

    let store = open_store(config).await?;
    let stored = store.load_all(None).await?;

    println!("{}", "LLM Integration Health".bold().cyan());
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Result store: {}", store.path().display());
    println!("Stored results: {}", stored.len());
    println!("Registered integrations: {}", registry.total());
    for category in Category::ALL {
        println!("  {category}: {}", registry.components(category).len());
    }

    if detailed {
        println!();
        println!("Test timeout: {}s", config.test_timeout);
        println!("Parallel tests: {}", config.parallel_tests);
        println!("Max concurrency: {}", config.max_concurrency);
        println!("Mock mode: {}", config.mock_mode);
        println!("Discovery patterns: {}", config.discovery_patterns.join(", "));
        println!("Configured API keys: {}", config.api_keys.len());

        let latest = store.latest_per_integration().await?;
        if !latest.is_empty() {
            println!();
            output::print_results(&latest);
        }
    }
    Ok(())
}
