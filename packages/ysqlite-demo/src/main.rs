//! ysqlite demo driver.
//!
//! Opens one SQLite connection, installs the Yjs update functions and walks through the
//! create / update / merge / diff / project / index sequence, logging every step.
//!
//! ```bash
//! # in-memory database, 100 random documents
//! ysqlite-demo
//!
//! # file-backed, reproducible `num` values, handler trace lines
//! ysqlite-demo --db docs.sqlite3 --seed 7 -v
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use ysqlite_ext::{DocStore, ExtensionConfig};

mod editor;
mod scenario;

use scenario::ScenarioOptions;

/// Walk through the ysqlite SQL functions against a docs table
#[derive(Parser, Debug)]
#[command(name = "ysqlite-demo", version)]
struct Args {
    /// SQLite database file (in-memory when omitted)
    #[arg(long, env = "YSQLITE_DB", value_name = "FILE")]
    db: Option<PathBuf>,

    /// Number of random documents to insert
    #[arg(long, default_value_t = 100)]
    docs: u32,

    /// Exclusive upper bound of the `num` range query
    #[arg(long, default_value_t = 50)]
    threshold: i64,

    /// Seed for the random `num` values
    #[arg(long, env = "YSQLITE_SEED")]
    seed: Option<u64>,

    /// Prefix of the registered SQL function names
    #[arg(long, default_value = ysqlite_ext::DEFAULT_PREFIX)]
    prefix: String,

    /// Show a trace line for every SQL function call
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => {
            info!("That's all, folks!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("demo failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("ysqlite_demo=debug,ysqlite_ext=debug,ysqlite_core=debug")
        } else {
            EnvFilter::new("ysqlite_demo=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn run(args: &Args) -> Result<()> {
    info!(sqlite = rusqlite::version(), "opening database");
    let config = ExtensionConfig::with_prefix(args.prefix.clone());
    let store = match &args.db {
        Some(path) => DocStore::open(path, config)
            .with_context(|| format!("opening {}", path.display()))?,
        None => DocStore::open_in_memory(config).context("opening in-memory database")?,
    };
    let location = match &args.db {
        Some(path) => path.display().to_string(),
        None => ":memory:".to_string(),
    };
    info!(db = %location, "functions installed, docs table ready");

    scenario::run(
        &store,
        &ScenarioOptions {
            docs: args.docs,
            threshold: args.threshold,
            seed: args.seed,
        },
    )
}
