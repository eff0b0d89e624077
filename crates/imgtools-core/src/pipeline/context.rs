//! Per-input execution context and output file naming.

use std::path::{Path, PathBuf};

use crate::config::OutputConfig;

/// Everything a pipeline needs to know about the input it runs on.
///
/// Built once per input file before any worker for that file starts, then
/// shared read-only by all of that file's workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    input: PathBuf,
    output_dir: Option<PathBuf>,
    icc_search_path: Vec<PathBuf>,
}

impl ExecutionContext {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: None,
            icc_search_path: Vec::new(),
        }
    }

    /// Write outputs here instead of next to the input.
    pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = dir;
        self
    }

    /// Directories searched for ICC profiles referenced by name.
    pub fn with_icc_search_path(mut self, dirs: Vec<PathBuf>) -> Self {
        self.icc_search_path = dirs;
        self
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn icc_search_path(&self) -> &[PathBuf] {
        &self.icc_search_path
    }

    /// Output path for a write block in this context.
    pub fn output_path(&self, config: &OutputConfig) -> PathBuf {
        output_file_name(&self.input, config, self.output_dir.as_deref())
    }
}

/// Derive an output path from the input path and a write block's naming.
///
/// `prefix + stem + suffix + extension`, where the extension is `.jpg` for
/// format `jpeg`, the input's own extension for an empty format, and
/// `.<format>` otherwise. The file lands next to the input unless
/// `output_dir` is given.
pub fn output_file_name(input: &Path, config: &OutputConfig, output_dir: Option<&Path>) -> PathBuf {
    let base = input
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (stem, original_ext) = split_extension(&base);

    let extension = if config.format.eq_ignore_ascii_case("jpeg") {
        ".jpg".to_string()
    } else if config.format.is_empty() {
        original_ext.to_string()
    } else {
        format!(".{}", config.format)
    };

    let file_name = format!(
        "{}{}{}{}",
        config.name_prefix, stem, config.name_suffix, extension
    );

    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(file_name)
}

/// Split a base name at its last dot, keeping the dot with the extension.
///
/// A leading dot counts too: `.hidden` is all extension and no stem.
fn split_extension(base: &str) -> (&str, &str) {
    match base.rfind('.') {
        Some(dot) => base.split_at(dot),
        None => (base, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naming(format: &str) -> OutputConfig {
        OutputConfig {
            format: format.to_string(),
            name_prefix: "a_".to_string(),
            name_suffix: "_b".to_string(),
        }
    }

    #[test]
    fn test_jpeg_maps_to_jpg() {
        let out = output_file_name(Path::new("photo.png"), &naming("jpeg"), None);
        assert_eq!(out, PathBuf::from("a_photo_b.jpg"));
        let out = output_file_name(Path::new("photo.png"), &naming("JPEG"), None);
        assert_eq!(out, PathBuf::from("a_photo_b.jpg"));
    }

    #[test]
    fn test_empty_format_keeps_extension() {
        let out = output_file_name(Path::new("photo.png"), &naming(""), None);
        assert_eq!(out, PathBuf::from("a_photo_b.png"));
    }

    #[test]
    fn test_other_format_is_extension() {
        let out = output_file_name(Path::new("photo.png"), &naming("webp"), None);
        assert_eq!(out, PathBuf::from("a_photo_b.webp"));
    }

    #[test]
    fn test_stays_in_input_directory() {
        let out = output_file_name(Path::new("/shots/2024/photo.tar.png"), &naming(""), None);
        assert_eq!(out, PathBuf::from("/shots/2024/a_photo.tar_b.png"));
    }

    #[test]
    fn test_output_dir_overrides_input_directory() {
        let out = output_file_name(
            Path::new("/shots/photo.png"),
            &naming("webp"),
            Some(Path::new("/exports")),
        );
        assert_eq!(out, PathBuf::from("/exports/a_photo_b.webp"));
    }

    #[test]
    fn test_input_without_extension() {
        let out = output_file_name(Path::new("raw"), &naming(""), None);
        assert_eq!(out, PathBuf::from("a_raw_b"));
    }

    #[test]
    fn test_dotfile_is_all_extension() {
        let out = output_file_name(Path::new("dir/.hidden"), &naming(""), None);
        assert_eq!(out, PathBuf::from("dir/a__b.hidden"));
        let out = output_file_name(Path::new("dir/.hidden"), &naming("png"), None);
        assert_eq!(out, PathBuf::from("dir/a__b.png"));
    }

    #[test]
    fn test_context_output_path() {
        let ctx = ExecutionContext::new("/in/photo.png").with_output_dir(Some("/out".into()));
        assert_eq!(ctx.output_path(&naming("")), PathBuf::from("/out/a_photo_b.png"));
        assert_eq!(ctx.output_dir(), Some(Path::new("/out")));
    }
}
