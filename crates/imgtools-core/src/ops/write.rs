//! Persisting the working image to disk.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};

use super::{Operation, WorkingImage};

/// Write the working image's output bytes to a fixed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteToFile {
    path: PathBuf,
}

impl WriteToFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Operation for WriteToFile {
    fn name(&self) -> &'static str {
        "write"
    }

    fn apply(&self, image: WorkingImage) -> PipelineResult<WorkingImage> {
        if is_same_file(&self.path, image.source()) {
            return Err(PipelineError::OverwritesInput {
                path: self.path.clone(),
            });
        }
        let bytes = image.output_bytes()?;
        let write_err = |source| PipelineError::Write {
            path: self.path.clone(),
            source,
        };

        let file = std::fs::File::create(&self.path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(bytes).map_err(write_err)?;
        writer.flush().map_err(write_err)?;

        tracing::debug!(
            "Wrote {} bytes to {:?} (from {:?})",
            bytes.len(),
            self.path,
            image.source()
        );
        Ok(image)
    }
}

/// Sibling profiles may still be reading the input, so it is never a
/// valid write target.
fn is_same_file(output: &Path, input: &Path) -> bool {
    if output == input {
        return true;
    }
    match (std::fs::canonicalize(output), std::fs::canonicalize(input)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    #[test]
    fn test_write_passthrough_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("copy.bin");
        let image = WorkingImage::from_bytes(Path::new("in.bin"), vec![9, 8, 7]);

        WriteToFile::new(&out).apply(image).unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), vec![9, 8, 7]);
    }

    #[test]
    fn test_write_decoded_but_unencoded_fails() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.png");
        let image = WorkingImage::from_image(Path::new("in.png"), DynamicImage::new_rgb8(2, 2));

        let err = WriteToFile::new(&out).apply(image).unwrap_err();
        assert!(matches!(err, PipelineError::NotEncoded { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn test_write_refuses_to_overwrite_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.png");
        std::fs::write(&input, b"original").unwrap();

        let image = WorkingImage::from_bytes(&input, vec![1, 2, 3]);
        let err = WriteToFile::new(&input).apply(image).unwrap_err();
        assert!(matches!(err, PipelineError::OverwritesInput { .. }));
        assert_eq!(std::fs::read(&input).unwrap(), b"original");

        let image = WorkingImage::from_bytes(&input, vec![1, 2, 3]);
        let same = dir.path().join(".").join("photo.png");
        assert!(WriteToFile::new(same).apply(image).is_err());
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let image = WorkingImage::from_bytes(Path::new("in.bin"), vec![1]);
        let err = WriteToFile::new("/nonexistent/dir/out.bin")
            .apply(image)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Write { .. }));
    }
}
