//! Geometry operations: resize and crop.

use image::imageops::FilterType;

use crate::config::{CropAlignment, CropConfig, ResizeAlgorithm, ResizeMode};
use crate::error::{PipelineError, PipelineResult};

use super::{Operation, WorkingImage};

/// Largest output a resize may produce, in pixels.
///
/// Allocation failures abort the process rather than unwind, so oversized
/// targets must be refused before `image` tries to allocate them.
pub const MAX_OUTPUT_PIXELS: u64 = 100_000_000;

/// Map a configured algorithm to the `image` resampling filter.
pub fn filter_for(algorithm: ResizeAlgorithm) -> FilterType {
    match algorithm {
        ResizeAlgorithm::NearestNeighbor => FilterType::Nearest,
        ResizeAlgorithm::ApproxBilinear => FilterType::Triangle,
        ResizeAlgorithm::CatmullRom => FilterType::CatmullRom,
        ResizeAlgorithm::Gaussian => FilterType::Gaussian,
        ResizeAlgorithm::Lanczos3 => FilterType::Lanczos3,
    }
}

/// Target dimensions for a resize. Width/height modes keep the aspect
/// ratio; no side ever drops below one pixel.
pub fn target_dimensions(mode: ResizeMode, width: u32, height: u32) -> (u32, u32) {
    let scale = |side: u32, factor: f64| ((side as f64 * factor).round() as u32).max(1);
    match mode {
        ResizeMode::ByFactor(factor) => {
            let factor = f64::from(factor);
            (scale(width, factor), scale(height, factor))
        }
        ResizeMode::ByWidth(target) => {
            let factor = f64::from(target) / f64::from(width.max(1));
            (target.max(1), scale(height, factor))
        }
        ResizeMode::ByHeight(target) => {
            let factor = f64::from(target) / f64::from(height.max(1));
            (scale(width, factor), target.max(1))
        }
    }
}

/// Resize with exactly one sizing strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resize {
    mode: ResizeMode,
    algorithm: ResizeAlgorithm,
}

impl Resize {
    pub fn by_factor(algorithm: ResizeAlgorithm, factor: f32) -> Self {
        Self::new(ResizeMode::ByFactor(factor), algorithm)
    }

    pub fn by_width(algorithm: ResizeAlgorithm, width: u32) -> Self {
        Self::new(ResizeMode::ByWidth(width), algorithm)
    }

    pub fn by_height(algorithm: ResizeAlgorithm, height: u32) -> Self {
        Self::new(ResizeMode::ByHeight(height), algorithm)
    }

    pub fn new(mode: ResizeMode, algorithm: ResizeAlgorithm) -> Self {
        Self { mode, algorithm }
    }

    pub fn mode(&self) -> ResizeMode {
        self.mode
    }
}

impl Operation for Resize {
    fn name(&self) -> &'static str {
        match self.mode {
            ResizeMode::ByFactor(_) => "resize_by_factor",
            ResizeMode::ByWidth(_) => "resize_by_width",
            ResizeMode::ByHeight(_) => "resize_by_height",
        }
    }

    fn apply(&self, mut image: WorkingImage) -> PipelineResult<WorkingImage> {
        let pixels = image.pixels(self.name())?;
        let (w, h) = (pixels.width(), pixels.height());
        let (tw, th) = target_dimensions(self.mode, w, h);
        if u64::from(tw) * u64::from(th) > MAX_OUTPUT_PIXELS {
            return Err(PipelineError::TooLarge {
                path: image.source().to_path_buf(),
                width: tw,
                height: th,
                limit: MAX_OUTPUT_PIXELS,
            });
        }
        tracing::trace!("Resizing {:?} {}x{} -> {}x{}", image.source(), w, h, tw, th);
        let resized = pixels.resize_exact(tw, th, filter_for(self.algorithm));
        image.replace_pixels(resized);
        Ok(image)
    }
}

/// Compute the crop window `(x, y, width, height)`.
///
/// A zero or oversized requested dimension is clamped to the image.
pub fn crop_window(config: &CropConfig, width: u32, height: u32) -> (u32, u32, u32, u32) {
    let clamp = |requested: u32, full: u32| {
        if requested == 0 {
            full
        } else {
            requested.min(full)
        }
    };
    let cw = clamp(config.width, width);
    let ch = clamp(config.height, height);
    match config.alignment {
        CropAlignment::TopLeft => (0, 0, cw, ch),
        CropAlignment::Center => ((width - cw) / 2, (height - ch) / 2, cw, ch),
    }
}

/// Crop to a fixed window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crop {
    config: CropConfig,
}

impl Crop {
    pub fn new(width: u32, height: u32, alignment: CropAlignment) -> Self {
        Self {
            config: CropConfig {
                alignment,
                width,
                height,
            },
        }
    }
}

impl Operation for Crop {
    fn name(&self) -> &'static str {
        "crop"
    }

    fn apply(&self, mut image: WorkingImage) -> PipelineResult<WorkingImage> {
        let pixels = image.pixels(self.name())?;
        let (x, y, w, h) = crop_window(&self.config, pixels.width(), pixels.height());
        let cropped = pixels.crop_imm(x, y, w, h);
        image.replace_pixels(cropped);
        Ok(image)
    }
}
