//! imgtools CLI - batch image processing driven by YAML profiles.
//!
//! Every input image is run through every configured profile. Profiles are
//! ordered lists of blocks (decode, resize, crop, ICC embed, encode, write)
//! declared in one or more YAML files.
//!
//! # Usage
//!
//! ```bash
//! # Use the per-user default profile (~/.imgtools/default.yaml)
//! imgtools photo.jpg
//!
//! # Merge two profile files and process a directory
//! imgtools -f web.yaml -f print.yaml ./photos/ -o ./exports
//!
//! # Show the merged configuration
//! imgtools -f web.yaml --dump-config
//! ```

use clap::Parser;

mod cli;
mod logging;

/// imgtools - run declarative image pipelines over batches of files.
#[derive(Parser, Debug)]
#[command(name = "imgtools")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(flatten)]
    process: cli::process::ProcessArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    tracing::debug!("imgtools v{}", imgtools_core::VERSION);

    cli::process::execute(cli.process).await
}
