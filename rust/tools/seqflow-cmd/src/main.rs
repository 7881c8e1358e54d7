use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "seqflow-cmd")]
#[command(about = "Runs sequence pipelines sequentially and in parallel")]
#[command(version)]
struct Cli {
    /// Number of worker threads (defaults to SEQFLOW_WORKERS or the core count)
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Capacity of the hand-off queue (defaults to twice the worker count)
    #[arg(long, global = true)]
    queue_bound: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map 0..count in parallel and sequentially and compare the results
    Map {
        /// Number of input elements
        #[arg(short, long, default_value_t = 1_000_000)]
        count: u64,
    },

    /// Search an unbounded stream in parallel and report how much was dispatched
    Find {
        /// The value to search for
        target: u64,
    },

    /// Print the consecutive-deduplicated and the unique integers of the input
    Dedup {
        /// Input file with whitespace-separated integers (defaults to stdin)
        file: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = commands::parallel_config(cli.workers, cli.queue_bound)?;
    match cli.command {
        Commands::Map { count } => commands::map::run(count, config),
        Commands::Find { target } => commands::find::run(target, config),
        Commands::Dedup { file } => commands::dedup::run(file),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
