//! `employee-records` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`   start the HTTP server (schema check and seeding first).
//! - `migrate` create or reconcile the `employees` table.
//! - `seed`    insert the sample employees into an empty table.
//! - `purge`   permanently delete one employee.

mod config;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use service::{bootstrap, EmployeeService, PgEmployeeStore};

const DEFAULT_LOG_FILTER: &str = "info,tower_http=info,sqlx=warn";

#[derive(Parser)]
#[command(
    name = "employee-records",
    about = "Employee records service with a JSON API and HTML pages",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server.
    Serve {
        /// Address to listen on; defaults to SERVER_HOST:SERVER_PORT.
        #[arg(long)]
        bind: Option<String>,
        /// Skip inserting sample data into an empty table.
        #[arg(long)]
        no_seed: bool,
    },
    /// Create the employees table or add missing columns.
    Migrate,
    /// Insert the sample employees if the table is empty.
    Seed,
    /// Permanently delete an employee (the HTTP API only soft-deletes).
    Purge {
        #[arg(long)]
        id: i64,
    },
}

async fn connect(config: &Config) -> Result<db::DbPool> {
    info!("Using database {}", config.redacted_database_url());
    db::pool::create_pool(&config.database_url, config.max_connections)
        .await
        .context("failed to connect to database")
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("invalid configuration")?;

    match cli.command {
        Command::Serve { bind, no_seed } => {
            let pool = connect(&config).await?;
            let store = PgEmployeeStore::new(pool.clone());
            bootstrap::run(&pool, &store, config.seed_sample_data && !no_seed).await;

            let state = api::AppState::new(EmployeeService::new(Arc::new(store)));
            let app = api::router(state, &config.cors_allowed_origins);
            let bind = bind.unwrap_or_else(|| config.bind_address());

            info!("Starting HTTP server on {bind}");
            api::serve(&bind, app).await.context("server error")?;
        }
        Command::Migrate => {
            let pool = connect(&config).await?;
            let report = db::schema::ensure_schema(&pool).await.context("migration failed")?;
            if !report.is_clean() {
                bail!("migration incomplete: {}", report.failures.join("; "));
            }
            info!(
                created_table = report.created_table,
                added_columns = report.added_columns.len(),
                "Schema is up to date"
            );
        }
        Command::Seed => {
            let pool = connect(&config).await?;
            db::schema::ensure_schema(&pool).await.context("schema check failed")?;
            let store = PgEmployeeStore::new(pool);
            let inserted = bootstrap::seed_if_empty(&store).await.context("seeding failed")?;
            info!("Inserted {inserted} sample employees");
        }
        Command::Purge { id } => {
            let pool = connect(&config).await?;
            let service = EmployeeService::new(Arc::new(PgEmployeeStore::new(pool)));
            if service.hard_delete(id).await.context("purge failed")? {
                info!("Employee {id} permanently deleted");
            } else {
                warn!("No employee with id {id}; nothing deleted");
            }
        }
    }

    Ok(())
}
