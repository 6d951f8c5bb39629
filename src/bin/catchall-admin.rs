//! CLI administration tool for catchall-detector.
//!
//! Inspects and seeds the PostgreSQL counter store without going through
//! the HTTP API. The in-memory store lives inside the server process and
//! cannot be reached from here.
//!
//! # Usage
//!
//! ```bash
//! # Show counters and classification for a domain
//! cargo run --bin catchall-admin -- domain show example.com
//!
//! # Record 1000 deliveries
//! cargo run --bin catchall-admin -- domain record example.com delivered --count 1000
//!
//! # Check database connection
//! cargo run --bin catchall-admin -- db check
//!
//! # Create the domains table
//! cargo run --bin catchall-admin -- db init
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (or `DB_HOST`, `DB_USER`, ...): PostgreSQL connection
//! - `CATCH_ALL_THRESHOLD`: deliveries needed for a catch-all verdict

use catchall_detector::application::services::EventRouter;
use catchall_detector::config::{self, Config};
use catchall_detector::domain::classifier::Classification;
use catchall_detector::domain::entities::EventKind;
use catchall_detector::infrastructure::persistence::{PgCounterStore, database};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::sync::Arc;

/// CLI tool for managing catchall-detector.
#[derive(Parser)]
#[command(name = "catchall-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect or seed domain counters
    Domain {
        #[command(subcommand)]
        action: DomainAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Domain counter subcommands.
#[derive(Subcommand)]
enum DomainAction {
    /// Show counters and classification
    Show {
        /// Domain name, e.g. "example.com"
        name: String,
    },

    /// Record delivery outcomes
    Record {
        /// Domain name, e.g. "example.com"
        name: String,

        /// Outcome: "delivered" or "bounced"
        kind: EventKind,

        /// Number of events to record
        #[arg(short, long, default_value_t = 1)]
        count: u64,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Create the domains table if it does not exist
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    match cli.command {
        Commands::Domain { action } => handle_domain_action(action, &config).await?,
        Commands::Db { action } => handle_db_action(action, &config).await?,
    }

    Ok(())
}

fn open_store(config: &Config) -> Result<PgCounterStore> {
    let pool = database::connect(config)?;
    Ok(PgCounterStore::new(Arc::new(pool)))
}

/// Dispatches domain counter commands.
async fn handle_domain_action(action: DomainAction, config: &Config) -> Result<()> {
    let router = EventRouter::new(Arc::new(open_store(config)?), config.thresholds());

    match action {
        DomainAction::Show { name } => show_domain(&router, &name).await?,
        DomainAction::Record { name, kind, count } => {
            record_events(&router, &name, kind, count).await?;
        }
    }

    Ok(())
}

/// Prints the counters and the resulting classification.
///
/// # Output Format
///
/// ```text
/// Domain example.com
///
///   Delivered:      1000
///   Bounced:        0
///   Classification: catch-all
/// ```
async fn show_domain(router: &EventRouter, name: &str) -> Result<()> {
    let (record, classification) = router
        .inspect(name)
        .await
        .context("Failed to read domain counters")?;

    println!("{} {}", "Domain".bright_blue().bold(), name.cyan());
    println!();
    println!(
        "  Delivered:      {}",
        record.delivered.to_string().bright_green().bold()
    );
    println!(
        "  Bounced:        {}",
        record.bounced.to_string().bright_red().bold()
    );

    let label = match classification {
        Classification::CatchAll => classification.as_str().yellow().bold(),
        Classification::NotCatchAll => classification.as_str().green().bold(),
        Classification::Unknown => classification.as_str().bright_black(),
    };
    println!("  Classification: {label}");
    println!();

    Ok(())
}

async fn record_events(
    router: &EventRouter,
    name: &str,
    kind: EventKind,
    count: u64,
) -> Result<()> {
    for _ in 0..count {
        router
            .record_outcome(name, kind)
            .await
            .with_context(|| format!("Failed to record {kind} event for {name}"))?;
    }

    println!(
        "{} {} {} event(s) for {}",
        "Recorded".green().bold(),
        count.to_string().bright_white().bold(),
        kind.as_str().cyan(),
        name.cyan()
    );

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, config: &Config) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            let pool = database::connect(config)?;
            database::status_check(&pool, config.db_ready_timeout()).await?;

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(&pool)
                .await?;

            println!("{}", "Database connection OK".green().bold());
            println!("  PostgreSQL: {}", version.bright_white());
        }
        DbAction::Init => {
            println!("{}", "Creating domains table...".bright_blue());

            open_store(config)?
                .ensure_schema()
                .await
                .context("Failed to create the domains table")?;

            println!("{}", "Schema ready".green().bold());
        }
    }

    Ok(())
}
