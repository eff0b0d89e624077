//! Batch setup: configuration sources, profile loading and input expansion.

use anyhow::Context;
use std::path::{Path, PathBuf};

use imgtools_core::ops::system_icc_dirs;
use imgtools_core::{
    BatchOptions, DefaultProfileSource, FileDiscovery, FileSource, ProfileRoot, ProfileSource,
    ValidatedProfile,
};

use super::ProcessArgs;

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

/// Configuration sources in the order they are merged.
///
/// Every `-f` file when any is given, otherwise the per-user default
/// profile (created on first use).
pub fn build_sources(args: &ProcessArgs) -> anyhow::Result<Vec<Box<dyn ProfileSource>>> {
    if !args.config_files.is_empty() {
        return Ok(args
            .config_files
            .iter()
            .map(|path| Box::new(FileSource::new(expand_path(path))) as Box<dyn ProfileSource>)
            .collect());
    }

    let source = match &args.profile_dir {
        Some(dir) => DefaultProfileSource::in_dir(expand_path(dir)),
        None => DefaultProfileSource::new()
            .context("No -f given and the default profile location is unavailable")?,
    };
    tracing::debug!("Using default profile {:?}", source.path());
    Ok(vec![Box::new(source)])
}

/// Load, merge and validate every source.
pub fn load_profiles(
    sources: &[Box<dyn ProfileSource>],
) -> anyhow::Result<(ProfileRoot, Vec<ValidatedProfile>)> {
    let root = ProfileRoot::from_sources(sources)?;
    let profiles = root
        .validate()
        .context("Merged configuration failed validation")?;

    for profile in &profiles {
        if !profile.has_write_step() {
            tracing::warn!(
                "Profile '{}' has no write block; it will produce no output",
                profile.name
            );
        }
    }
    Ok((root, profiles))
}

/// Expand inputs and build the per-batch options.
///
/// Creates the output directory when one is requested. ICC profiles are
/// looked up in `--icc-dir` directories first, then in the installed
/// system locations.
pub fn resolve_inputs(args: &ProcessArgs) -> anyhow::Result<(Vec<PathBuf>, BatchOptions)> {
    let output_dir = match &args.output_dir {
        Some(dir) => {
            let dir = expand_path(dir);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Cannot create output directory {:?}", dir))?;
            Some(dir)
        }
        None => None,
    };

    let inputs: Vec<PathBuf> = args.inputs.iter().map(|p| expand_path(p)).collect();
    let discovery = if args.no_recursive {
        FileDiscovery::new().non_recursive()
    } else {
        FileDiscovery::new()
    };
    let files = discovery.expand(&inputs);

    let icc_search_path = args
        .icc_dirs
        .iter()
        .map(|p| expand_path(p))
        .chain(system_icc_dirs())
        .collect();
    let options = BatchOptions {
        output_dir,
        icc_search_path,
    };
    Ok((files, options))
}
