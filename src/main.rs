//! Entry point for the chunkdb command line driver.
//!
//! The engine itself is a library; this binary only wires up logging, parses
//! the command line and runs the selected command.

#![deny(rustdoc::broken_intra_doc_links, rust_2018_idioms)]
#![warn(missing_debug_implementations)]

use structopt::StructOpt;

use observability_deps::tracing_subscriber::{self, EnvFilter};

mod commands {
    pub mod demo;
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "chunkdb",
    about = "An in-memory, chunk-oriented, columnar table engine"
)]
struct Config {
    /// Increases log verbosity (-v shows info, -vv shows debug)
    #[structopt(short, long, parse(from_occurrences), global = true)]
    verbose: u64,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Builds a demo table, compresses its sealed chunks and runs chained
    /// scans over it
    Demo(commands::demo::Config),
}

fn main() {
    let config = Config::from_args();
    init_logging(config.verbose);

    let result = match config.command {
        Command::Demo(config) => commands::demo::command(config),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Installs the terminal subscriber. `RUST_LOG` wins over `-v` flags when
/// both are given.
fn init_logging(verbose: u64) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
