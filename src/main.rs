//! Socialgraph CLI - serve and query the in-memory relational data service

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use socialgraph::config::{self, ServiceConfig};
use socialgraph::query::{MutationEngine, QueryEngine, Selection};
use socialgraph::ui::{self, Icons};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "socialgraph")]
#[command(version = "0.1.0")]
#[command(about = "In-memory relational data service with nested graph queries")]
#[command(long_about = r#"
Socialgraph keeps accounts, profiles, posts and membership tiers in memory,
enforces the links between them and answers nested selections over those links.

Example usage:
  socialgraph init
  socialgraph serve --port 8080
  socialgraph query --selection '{"membershipTiers": {"selection": {"id": null}}}'
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed a fresh store and serve it over HTTP
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Run one selection document against a freshly seeded store
    Query {
        /// Selection as JSON, or @path to read it from a file
        #[arg(short, long)]
        selection: String,

        /// Treat the document as a mutation
        #[arg(short, long)]
        mutation: bool,
    },

    /// Show the configured membership tiers
    Tiers,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        ui::error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    match cli.command {
        Commands::Serve { port } => {
            let config = ServiceConfig {
                port: port.unwrap_or(config.port),
                ..config
            };
            let store = config::seed_store(&config)?;

            ui::header("Socialgraph");
            ui::info("Listening", &config.bind_address());
            ui::info("Membership tiers", &config.membership_tiers.len().to_string());

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(socialgraph::server::start_server(&config, store))?;
        }

        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            config::write_config(&path, &ServiceConfig::default(), force)?;
            ui::success(&format!("Wrote {}", path.display()));
        }

        Commands::Query { selection, mutation } => {
            let document = read_document(&selection)?;
            let mut store = config::seed_store(&config)?;

            let data = if mutation {
                MutationEngine::new(&mut store).execute(&document)?
            } else {
                let outcome = QueryEngine::new(&store).execute_with_stats(&document)?;
                tracing::debug!(
                    "Resolved with {} lookups ({} memoized)",
                    outcome.stats.lookups,
                    outcome.stats.memo_hits
                );
                outcome.data
            };
            println!("{}", serde_json::to_string_pretty(&data)?);

            if cli.verbose {
                ui::section(Icons::STATS, "Store");
                println!("{}", ui::stats_table(&store.stats()));
            }
        }

        Commands::Tiers => {
            if config.membership_tiers.is_empty() {
                ui::warn("No membership tiers configured.");
            } else {
                ui::section(Icons::STAR, "Membership tiers");
                println!("{}", ui::tiers_table(&config.membership_tiers));
            }
        }
    }

    Ok(())
}

fn read_document(argument: &str) -> anyhow::Result<Selection> {
    let text = match argument.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))?,
        None => argument.to_string(),
    };
    Ok(Selection::parse(&text)?)
}
