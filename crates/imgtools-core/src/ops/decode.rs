//! Decoding with content-based format detection.

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

use super::{Operation, WorkingImage};

/// Decode the working image's original bytes into pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decode;

impl Operation for Decode {
    fn name(&self) -> &'static str {
        "decode"
    }

    fn apply(&self, mut image: WorkingImage) -> PipelineResult<WorkingImage> {
        let (pixels, format) = decode_bytes(image.raw(), image.source())?;
        tracing::trace!(
            "Decoded {:?} as {} ({}x{})",
            image.source(),
            format_to_string(format),
            pixels.width(),
            pixels.height()
        );
        image.set_decoded(pixels, format);
        Ok(image)
    }
}

/// Decode bytes, guessing the format from content and falling back to the
/// file extension.
pub fn decode_bytes(bytes: &[u8], path: &Path) -> PipelineResult<(DynamicImage, ImageFormat)> {
    let mut reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot detect image format: {}", e),
        })?;
    let format = match reader.format() {
        Some(f) => f,
        None => ImageFormat::from_path(path).map_err(|_| PipelineError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
        })?,
    };

    reader.set_format(format);
    let image = reader.decode().map_err(|e| PipelineError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok((image, format))
}

/// Map a format name from a profile document to an image format.
pub fn parse_format(name: &str) -> Option<ImageFormat> {
    match name.to_ascii_lowercase().as_str() {
        "jpeg" | "jpg" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        "webp" => Some(ImageFormat::WebP),
        "gif" => Some(ImageFormat::Gif),
        "bmp" => Some(ImageFormat::Bmp),
        "tiff" | "tif" => Some(ImageFormat::Tiff),
        _ => None,
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Ico => "ico".to_string(),
        ImageFormat::Pnm => "pnm".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        _ => "unknown".to_string(),
    }
}
