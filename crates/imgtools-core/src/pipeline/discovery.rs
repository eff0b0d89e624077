//! Expansion of command-line inputs into image files.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions picked up when a directory is given as input.
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff"];

/// Finds image files under directory inputs.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    extensions: Vec<String>,
    recursive: bool,
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self {
            extensions: SUPPORTED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            recursive: true,
        }
    }
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only look at the top level of directory inputs.
    pub fn non_recursive(mut self) -> Self {
        self.recursive = false;
        self
    }

    /// Expand `inputs` in order.
    ///
    /// Directories become the supported files they contain, sorted by
    /// path. Anything else is passed through untouched, so a missing file
    /// still reaches the coordinator and is reported there.
    pub fn expand(&self, inputs: &[PathBuf]) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for input in inputs {
            if input.is_dir() {
                let found = self.discover_dir(input);
                if found.is_empty() {
                    tracing::warn!("No supported images found in {:?}", input);
                }
                files.extend(found);
            } else {
                files.push(input.clone());
            }
        }
        files
    }

    fn discover_dir(&self, dir: &Path) -> Vec<PathBuf> {
        let mut walker = WalkDir::new(dir).follow_links(true);
        if !self.recursive {
            walker = walker.max_depth(1);
        }

        let mut files: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && self.is_supported(e.path()))
            .map(|e| e.into_path())
            .collect();

        // Sort by path for deterministic ordering
        files.sort();
        files
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}
