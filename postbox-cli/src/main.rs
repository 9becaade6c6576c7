//! Postbox CLI - query and maintain a postcard collection from the terminal.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;
mod utils;

use exit_codes::ExitCode;
use utils::{FilterArgs, OutputFormat, SourceArgs};

#[derive(Parser)]
#[command(name = "postbox")]
#[command(author, version, about = "Postcard collection tracker", long_about = None)]
#[command(after_help = exit_codes::HELP_TEXT)]
struct Cli {
    /// Only print results, no headers or summaries
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// JSON file with region and country label tables
    #[arg(long, value_name = "PATH", global = true, env = "GEO_CONFIG")]
    geo_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter, sort and page the collection
    Query {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Sort key: id_desc, id_asc, date_desc, date_asc, duration_desc,
        /// duration_asc or area
        #[arg(short, long, default_value = "id_desc")]
        sort: String,

        /// Number of cards to show
        #[arg(short, long, default_value_t = postbox_core::DEFAULT_DISPLAY_COUNT)]
        limit: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show received/sent/country counters and filter options
    Stats {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Aggregate the collection per province or per country
    Map {
        #[command(flatten)]
        source: SourceArgs,

        /// Map mode: china (home provinces) or world
        #[arg(short, long, default_value = "china")]
        mode: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Translate an English country label into its stored name
    Resolve {
        /// Label as shown on the world map
        #[arg(value_name = "LABEL")]
        label: String,
    },

    /// Submit records to a running server
    Add {
        /// JSON file with one record or a list of records
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Base URL of the server
        #[arg(long, value_name = "URL", default_value = "http://localhost:3000")]
        url: String,

        /// Admin password
        #[arg(long, env = "POSTBOX_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Prepend records to a local JSON list
    Import {
        /// JSON file with one record or a list of records
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// List to update (created when missing)
        #[arg(long, value_name = "PATH")]
        into: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "postbox=debug,postbox_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        quiet,
        geo_config,
        command,
        ..
    } = cli;

    match command {
        Commands::Query {
            source,
            filters,
            sort,
            limit,
            format,
        } => commands::query::execute(source, filters, sort, limit, format, geo_config, quiet).await,
        Commands::Stats { source, format } => {
            commands::stats::execute(source, format, geo_config, quiet).await
        }
        Commands::Map {
            source,
            mode,
            format,
        } => commands::map::execute(source, mode, format, geo_config, quiet).await,
        Commands::Resolve { label } => commands::resolve::execute(label, geo_config, quiet),
        Commands::Add {
            file,
            url,
            password,
        } => commands::add::execute(file, url, password, quiet).await,
        Commands::Import { file, into } => commands::import::execute(file, into, quiet).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit = match run(cli).await {
        Ok(()) => ExitCode::success(),
        Err(err) => ExitCode::from_anyhow(&err),
    };

    if let Some(message) = &exit.message {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }
    std::process::exit(exit.code);
}
