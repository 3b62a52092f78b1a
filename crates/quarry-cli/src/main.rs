use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::input::SqlInput;

#[derive(Parser, Debug)]
#[command(name = "quarry", version, about = "Dialect-aware SQL rewriting and catalog description")]
struct Cli {
    /// Path to quarry.yaml
    #[arg(long, global = true, env = "QUARRY_CONFIG")]
    config: Option<PathBuf>,

    /// Dialect override (e.g. clickhouse, postgresql, trino). Defaults to the
    /// configured warehouse dialect.
    #[arg(long, global = true)]
    dialect: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Wrap a query with sorting, pagination placeholders and a total count.
    Rewrite {
        #[command(flatten)]
        input: SqlInput,

        /// Column to sort by
        #[arg(long = "sort-by")]
        sort_by: Option<String>,

        /// Sort direction; anything other than `asc` sorts descending
        #[arg(long = "sort-order", default_value = "asc")]
        sort_order: String,

        /// Add a `total_count` column
        #[arg(long = "total-count", default_value_t = false)]
        total_count: bool,

        /// Drop the query's own trailing ORDER BY / LIMIT / OFFSET first
        #[arg(long = "strip-tail", default_value_t = false)]
        strip_tail: bool,
    },

    /// Resolve a sort column against the columns declared in query metadata.
    SortCheck {
        /// Query metadata JSON file (`{sql, columns: [...]}`)
        #[arg(long)]
        metadata: PathBuf,

        sort_by: String,
    },

    /// Check declared result columns against the SQL in a metadata file.
    Validate {
        /// Query metadata JSON file (`{sql, columns: [...], db_dialect}`)
        metadata: PathBuf,
    },

    /// Parse saved EXPLAIN output (a JSON array of row objects) into estimates.
    Estimate {
        plan: PathBuf,
    },

    /// Parse a query and report syntax problems.
    Syntax {
        #[command(flatten)]
        input: SqlInput,

        /// Treat engine-specific parse failures as errors
        #[arg(long, default_value_t = false)]
        strict: bool,
    },

    /// Walk the configured warehouse and print its schema description.
    Describe {
        /// Fetch sample rows for every visible table, whatever the config says
        #[arg(long = "with-examples", default_value_t = false)]
        with_examples: bool,

        /// Print the snapshot as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Run EXPLAIN against the configured warehouse and assess the estimate.
    Preflight {
        #[command(flatten)]
        input: SqlInput,

        /// Ask for a structured estimate where the engine offers one
        #[arg(long, default_value_t = false)]
        structured: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = commands::Settings::load(cli.config.as_deref(), cli.dialect.as_deref())?;

    match cli.cmd {
        Command::Rewrite {
            input,
            sort_by,
            sort_order,
            total_count,
            strip_tail,
        } => commands::rewrite::run_rewrite(
            &settings,
            &input,
            sort_by.as_deref(),
            &sort_order,
            total_count,
            strip_tail,
        )?,

        Command::SortCheck { metadata, sort_by } => {
            commands::rewrite::run_sort_check(&metadata, &sort_by)?
        }

        Command::Validate { metadata } => commands::validate::run_validate(&settings, &metadata)?,

        Command::Estimate { plan } => commands::estimate::run_estimate(&settings, &plan)?,

        Command::Syntax { input, strict } => commands::validate::run_syntax(&settings, &input, strict)?,

        Command::Describe {
            with_examples,
            json,
        } => commands::describe::run_describe(&settings, with_examples, json).await?,

        Command::Preflight { input, structured } => {
            commands::estimate::run_preflight(&settings, &input, structured).await?
        }
    }

    Ok(())
}
