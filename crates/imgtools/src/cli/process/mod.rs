//! Running profiles over input images.

mod batch;
mod setup;

use clap::Args;
use std::path::PathBuf;

use imgtools_core::{BatchCoordinator, CancellationToken};

use batch::process_batch;
use setup::{build_sources, load_profiles, resolve_inputs};

/// Arguments for processing a batch of images.
#[derive(Args, Debug, Default)]
pub struct ProcessArgs {
    /// Image files or directories to process
    #[arg(required_unless_present = "dump_config")]
    pub inputs: Vec<PathBuf>,

    /// Profile configuration file (repeatable, merged in the order given)
    #[arg(short = 'f', long = "file", value_name = "CONFIG")]
    pub config_files: Vec<PathBuf>,

    /// Write outputs to this directory instead of next to each input
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory holding the per-user default profile
    #[arg(long, value_name = "DIR", env = "IMGTOOLS_PROFILE_DIR")]
    pub profile_dir: Option<PathBuf>,

    /// Only pick up images at the top level of directory inputs
    #[arg(long)]
    pub no_recursive: bool,

    /// Extra directory searched for ICC profiles by name (repeatable)
    #[arg(long = "icc-dir", value_name = "DIR")]
    pub icc_dirs: Vec<PathBuf>,

    /// Print the merged, validated configuration as YAML and exit
    #[arg(long)]
    pub dump_config: bool,
}

/// Load profiles, then run every profile over every input.
pub async fn execute(args: ProcessArgs) -> anyhow::Result<()> {
    let sources = build_sources(&args)?;
    let (root, profiles) = load_profiles(&sources)?;

    if args.dump_config {
        print!("{}", root.to_yaml()?);
        return Ok(());
    }

    let (inputs, options) = resolve_inputs(&args)?;
    if inputs.is_empty() {
        tracing::warn!("No input images to process");
        return Ok(());
    }
    tracing::info!(
        "Processing {} image(s) with {} profile(s)",
        inputs.len(),
        profiles.len()
    );

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    let coordinator = BatchCoordinator::new(profiles, options).with_cancellation(cancel);
    process_batch(&coordinator, &inputs).await
}

/// Raise `cancel` on the first Ctrl-C. Running pipelines finish; nothing
/// new is started.
fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; finishing running profiles and stopping");
            cancel.cancel();
        }
    });
}
