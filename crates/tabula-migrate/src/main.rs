//! tabula CLI
//!
//! Inspects a database and runs ad-hoc statements through a session.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tabula_orm::core::{DialectRegistry, SqlValue};
use tabula_orm::{Engine, EngineConfig, LogLevel, Rows};
use tracing::info;

/// Inspect and query tabula databases.
#[derive(Parser)]
#[command(name = "tabula")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Driver name.
    #[arg(long, env = "TABULA_DRIVER", default_value = "sqlite3")]
    driver: String,

    /// Data source (SQLite path, or `:memory:`).
    #[arg(short, long, env = "DATABASE_URL", default_value = ":memory:")]
    database: String,

    /// JSON engine configuration; overrides --driver and --database.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log every statement.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a table exists.
    HasTable {
        /// Table name.
        table: String,
    },

    /// List the columns of a table.
    Columns {
        /// Table name.
        table: String,
    },

    /// Execute a statement and print the affected row count.
    Exec {
        /// SQL statement.
        sql: String,

        /// Positional parameters.
        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// Run a query and print the rows, tab separated.
    Query {
        /// SQL query.
        sql: String,

        /// Positional parameters.
        #[arg(short, long = "param")]
        params: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => EngineConfig {
            driver: cli.driver.clone(),
            source: cli.database.clone(),
            ..EngineConfig::default()
        },
    };
    if cli.quiet {
        config.log_level = LogLevel::Disabled;
    } else if cli.verbose {
        config.log_level = LogLevel::Info;
    } else if cli.config.is_none() {
        config.log_level = LogLevel::Error;
    }

    let engine = Engine::connect(&config, &DialectRegistry::with_builtin())?;
    let mut session = engine.new_session();

    match cli.command {
        Commands::HasTable { table } => {
            let exists = session.table_exists(&table)?;
            println!("{exists}");
        }

        Commands::Columns { table } => {
            for column in session.table_columns(&table)? {
                println!("{column}");
            }
        }

        Commands::Exec { sql, params } => {
            let params = params.iter().map(|p| parse_param(p)).collect();
            let affected = session.raw(&sql, params).exec()?;
            info!(affected, "Executed");
            println!("{affected}");
        }

        Commands::Query { sql, params } => {
            let params = params.iter().map(|p| parse_param(p)).collect();
            let rows = session.raw(&sql, params).query_rows()?;
            print_rows(&rows);
        }
    }

    engine.close()?;
    Ok(())
}

/// Reads a command-line parameter as NULL, an integer, a float or text.
fn parse_param(raw: &str) -> SqlValue {
    if raw.eq_ignore_ascii_case("null") {
        SqlValue::Null
    } else if let Ok(i) = raw.parse::<i64>() {
        SqlValue::Int(i)
    } else if let Ok(x) = raw.parse::<f64>() {
        SqlValue::Float(x)
    } else {
        SqlValue::Text(raw.to_string())
    }
}

fn print_rows(rows: &Rows) {
    println!("{}", rows.columns.join("\t"));
    for row in &rows.rows {
        let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
        println!("{}", cells.join("\t"));
    }
}
