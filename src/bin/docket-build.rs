//! docket-build: build or update a document repository from parameters
//!
//! ```text
//! docket-build [-key=value ...] [params.xml ...]
//! ```
//!
//! Arguments apply left to right: files are merged, `-key=value` overrides.
//! Logging honours `RUST_LOG` and defaults to `info`.

use std::env;
use std::error::Error as StdError;
use std::process;

use docket::{
    BuildError, BuildReport, FileRepository, IndexBuilder, ParameterStore, TracingProgress,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: docket-build [-key=value ...] [params.xml ...]";

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "-h" || a == "--help") {
        eprintln!("{}", USAGE);
        process::exit(2);
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(report) => {
            println!("state: {}", report.state);
            println!("documents seen: {}", report.seen);
            println!("documents indexed: {}", report.indexed);
            if report.skipped > 0 {
                println!("entries skipped: {}", report.skipped);
            }
        }
        Err(e) => {
            eprintln!("docket-build: {}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<BuildReport, BuildError> {
    let mut params = ParameterStore::new();
    params.load_command_line(args)?;
    info!(
        target: "docket::params",
        arguments = args.len(),
        values = params.size(),
        "Loaded parameters"
    );
    IndexBuilder::new(FileRepository::new()).build(&params, &mut TracingProgress)
}
