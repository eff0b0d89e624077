//! The in-flight image value threaded through a pipeline.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::EncoderOptions;
use crate::error::{PipelineError, PipelineResult};

/// Bytes produced by an encode step.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub format: ImageFormat,
    pub options: Option<EncoderOptions>,
    pub bytes: Vec<u8>,
}

/// A working image: the original bytes plus whatever decode, transform and
/// encode steps have produced so far.
///
/// Each worker owns its working image exclusively; buffers are released
/// when it is dropped, including on the error path of a chain.
#[derive(Debug, Clone)]
pub struct WorkingImage {
    source: PathBuf,
    raw: Vec<u8>,
    source_format: Option<ImageFormat>,
    decoded: Option<DynamicImage>,
    encoded: Option<EncodedImage>,
    icc_profile: Option<Vec<u8>>,
}

impl WorkingImage {
    /// Read a working image from a file. The handle is closed before returning.
    pub fn open(path: &Path) -> PipelineResult<Self> {
        let file = std::fs::File::open(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => PipelineError::FileNotFound(path.to_path_buf()),
            _ => PipelineError::Read {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Self::from_reader(path, std::io::BufReader::new(file))
    }

    /// Create a working image from a byte stream. `path` names the source.
    pub fn from_reader<R: Read>(path: &Path, mut reader: R) -> PipelineResult<Self> {
        let mut raw = Vec::new();
        reader
            .read_to_end(&mut raw)
            .map_err(|source| PipelineError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_bytes(path, raw))
    }

    pub fn from_bytes(path: &Path, raw: Vec<u8>) -> Self {
        Self {
            source: path.to_path_buf(),
            raw,
            source_format: None,
            decoded: None,
            encoded: None,
            icc_profile: None,
        }
    }

    /// Wrap already-decoded pixels.
    pub fn from_image(path: &Path, image: DynamicImage) -> Self {
        Self {
            decoded: Some(image),
            ..Self::from_bytes(path, Vec::new())
        }
    }

    /// Path of the input this image was created from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The original, untouched bytes.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Container format detected at decode time.
    pub fn source_format(&self) -> Option<ImageFormat> {
        self.source_format
    }

    pub fn is_decoded(&self) -> bool {
        self.decoded.is_some()
    }

    pub fn decoded(&self) -> Option<&DynamicImage> {
        self.decoded.as_ref()
    }

    /// Current pixel dimensions, if decoded.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.decoded.as_ref().map(|img| img.dimensions())
    }

    /// Decoded pixels, or `NotDecoded` naming the operation that needed them.
    pub fn pixels(&self, operation: &'static str) -> PipelineResult<&DynamicImage> {
        self.decoded.as_ref().ok_or_else(|| PipelineError::NotDecoded {
            path: self.source.clone(),
            operation,
        })
    }

    pub(crate) fn set_decoded(&mut self, image: DynamicImage, format: ImageFormat) {
        self.decoded = Some(image);
        self.source_format = Some(format);
        self.encoded = None;
    }

    /// Replace the pixels. Any earlier encoding is stale and is dropped.
    pub(crate) fn replace_pixels(&mut self, image: DynamicImage) {
        self.decoded = Some(image);
        self.encoded = None;
    }

    pub fn encoded(&self) -> Option<&EncodedImage> {
        self.encoded.as_ref()
    }

    pub(crate) fn set_encoded(&mut self, encoded: EncodedImage) {
        self.encoded = Some(encoded);
    }

    /// ICC profile bytes to embed at encode time.
    pub fn icc_profile(&self) -> Option<&[u8]> {
        self.icc_profile.as_deref()
    }

    pub(crate) fn set_icc_profile(&mut self, profile: Vec<u8>) {
        self.icc_profile = Some(profile);
    }

    /// Bytes a write step should persist.
    ///
    /// Encoded output if present; the original bytes if the image was never
    /// decoded; otherwise an error, since decoded pixels have no container.
    pub fn output_bytes(&self) -> PipelineResult<&[u8]> {
        match (&self.encoded, &self.decoded) {
            (Some(encoded), _) => Ok(&encoded.bytes),
            (None, None) => Ok(&self.raw),
            (None, Some(_)) => Err(PipelineError::NotEncoded {
                path: self.source.clone(),
            }),
        }
    }
}
