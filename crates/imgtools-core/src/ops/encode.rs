//! Encoding and ICC profile embedding.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageEncoder, ImageFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::config::EncoderOptions;
use crate::error::{PipelineError, PipelineResult};

use super::decode::{format_to_string, parse_format};
use super::{EncodedImage, Operation, WorkingImage};

/// JPEG quality used when a profile does not set one.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Encode the working image's pixels into a container format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encode {
    format: String,
    options: Option<EncoderOptions>,
}

impl Encode {
    pub fn new(format: impl Into<String>, options: Option<EncoderOptions>) -> Self {
        Self {
            format: format.into(),
            options,
        }
    }

    /// Resolve the target format; an empty name keeps the source format.
    fn resolve_format(&self, image: &WorkingImage) -> PipelineResult<ImageFormat> {
        let resolved = if self.format.is_empty() {
            image.source_format()
        } else {
            parse_format(&self.format)
        };
        resolved.ok_or_else(|| PipelineError::UnsupportedFormat {
            path: image.source().to_path_buf(),
            format: self.format.clone(),
        })
    }
}

impl Operation for Encode {
    fn name(&self) -> &'static str {
        "encode"
    }

    fn apply(&self, mut image: WorkingImage) -> PipelineResult<WorkingImage> {
        let format = self.resolve_format(&image)?;
        let pixels = image.pixels(self.name())?;
        let bytes = encode_image(
            pixels,
            format,
            self.options.as_ref(),
            image.icc_profile(),
            image.source(),
        )?;
        tracing::trace!(
            "Encoded {:?} as {} ({} bytes)",
            image.source(),
            format_to_string(format),
            bytes.len()
        );
        image.set_encoded(EncodedImage {
            format,
            options: self.options.clone(),
            bytes,
        });
        Ok(image)
    }
}

/// Encode pixels, embedding `icc` where the encoder supports it.
pub fn encode_image(
    image: &DynamicImage,
    format: ImageFormat,
    options: Option<&EncoderOptions>,
    icc: Option<&[u8]>,
    path: &Path,
) -> PipelineResult<Vec<u8>> {
    let encode_err = |e: image::ImageError| PipelineError::Encode {
        path: path.to_path_buf(),
        format: format_to_string(format),
        message: e.to_string(),
    };
    let mut buf = Vec::new();

    match format {
        ImageFormat::Jpeg => {
            let quality = options
                .and_then(|o| o.quality)
                .unwrap_or(DEFAULT_JPEG_QUALITY)
                .clamp(1, 100);
            let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            attach_icc(&mut encoder, icc, path);
            // JPEG has no alpha channel
            DynamicImage::ImageRgb8(image.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(encode_err)?;
        }
        ImageFormat::Png => {
            let mut encoder = PngEncoder::new(&mut buf);
            attach_icc(&mut encoder, icc, path);
            image.write_with_encoder(encoder).map_err(encode_err)?;
        }
        ImageFormat::WebP => {
            let mut encoder = WebPEncoder::new_lossless(&mut buf);
            attach_icc(&mut encoder, icc, path);
            let pixels = if image.color().has_alpha() {
                DynamicImage::ImageRgba8(image.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(image.to_rgb8())
            };
            pixels.write_with_encoder(encoder).map_err(encode_err)?;
        }
        other => {
            if icc.is_some() {
                tracing::warn!(
                    "ICC profile not supported for {} output; writing {:?} without it",
                    format_to_string(other),
                    path
                );
            }
            image
                .write_to(&mut Cursor::new(&mut buf), other)
                .map_err(encode_err)?;
        }
    }

    Ok(buf)
}

fn attach_icc<E: ImageEncoder>(encoder: &mut E, icc: Option<&[u8]>, path: &Path) {
    if let Some(icc) = icc {
        if let Err(e) = encoder.set_icc_profile(icc.to_vec()) {
            tracing::warn!("Cannot embed ICC profile for {:?}: {e}", path);
        }
    }
}

/// Attach a named ICC profile to the working image.
///
/// The profile is embedded by the next encode. If the image is already
/// encoded it is re-encoded with the profile in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedProfile {
    name: String,
    search_path: Vec<PathBuf>,
}

impl EmbedProfile {
    pub fn new(name: impl Into<String>, search_path: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            search_path,
        }
    }
}

impl Operation for EmbedProfile {
    fn name(&self) -> &'static str {
        "icc_embed"
    }

    fn apply(&self, mut image: WorkingImage) -> PipelineResult<WorkingImage> {
        let not_found = || PipelineError::IccProfileNotFound {
            path: image.source().to_path_buf(),
            name: self.name.clone(),
        };
        let profile_path =
            resolve_icc_profile(&self.name, &self.search_path).ok_or_else(not_found)?;
        let bytes = std::fs::read(&profile_path).map_err(|source| PipelineError::Read {
            path: profile_path.clone(),
            source,
        })?;
        if !is_icc_profile(&bytes) {
            return Err(PipelineError::Decode {
                path: profile_path,
                message: "not an ICC profile (missing acsp signature)".to_string(),
            });
        }

        let reencoded = match image.encoded() {
            Some(encoded) => {
                let pixels = image.pixels(self.name())?;
                Some(EncodedImage {
                    format: encoded.format,
                    options: encoded.options.clone(),
                    bytes: encode_image(
                        pixels,
                        encoded.format,
                        encoded.options.as_ref(),
                        Some(&bytes),
                        image.source(),
                    )?,
                })
            }
            None => None,
        };

        tracing::trace!(
            "Embedding ICC profile {:?} into {:?}",
            profile_path,
            image.source()
        );
        image.set_icc_profile(bytes);
        if let Some(encoded) = reencoded {
            image.set_encoded(encoded);
        }
        Ok(image)
    }
}

/// Where operating systems install ICC profiles.
const SYSTEM_ICC_DIRS: &[&str] = &[
    "/usr/share/color/icc",
    "/usr/share/color/icc/colord",
    "/usr/local/share/color/icc",
    "/Library/ColorSync/Profiles",
    "/System/Library/ColorSync/Profiles",
];

/// Installed ICC profile directories present on this machine.
///
/// The per-user data directory (`~/.local/share/icc` on Linux) comes
/// first, then the system-wide locations.
pub fn system_icc_dirs() -> Vec<PathBuf> {
    let user = directories::BaseDirs::new().map(|dirs| dirs.data_dir().join("icc"));
    user.into_iter()
        .chain(SYSTEM_ICC_DIRS.iter().map(PathBuf::from))
        .filter(|dir| dir.is_dir())
        .collect()
}

/// Find an ICC profile by path or by name in the search path.
///
/// `name` is tried as a (tilde-expanded) file path first, then as `name`,
/// `name.icc` and `name.icm` inside each search directory.
pub fn resolve_icc_profile(name: &str, search_path: &[PathBuf]) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    let direct = PathBuf::from(shellexpand::tilde(name).into_owned());
    if direct.is_file() {
        return Some(direct);
    }
    search_path.iter().find_map(|dir| {
        [name.to_string(), format!("{name}.icc"), format!("{name}.icm")]
            .into_iter()
            .map(|candidate| dir.join(candidate))
            .find(|candidate| candidate.is_file())
    })
}

/// ICC profiles carry the `acsp` signature at byte offset 36 of a
/// 128-byte header.
pub fn is_icc_profile(bytes: &[u8]) -> bool {
    bytes.len() >= 128 && &bytes[36..40] == b"acsp"
}
