//! Per-pixel similarity between a rendered frame and the target image.

use image::RgbImage;

use crate::schema::{CanvasSize, ConfigError};

/// Maximum per-channel difference.
const CHANNEL_MAX: u64 = 255;

/// Channels compared per pixel.
const CHANNELS: u64 = 3;

/// Scoring errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimilarityError {
    #[error("Frame is {actual} but the target is {expected}")]
    DimensionMismatch {
        expected: CanvasSize,
        actual: CanvasSize,
    },
}

/// The image being approximated, loaded once and read-only for a run.
#[derive(Debug, Clone)]
pub struct Target {
    image: RgbImage,
    max_difference: u64,
}

impl Target {
    /// Wrap a decoded RGB image, rejecting empty images.
    pub fn new(image: RgbImage) -> Result<Self, ConfigError> {
        let canvas = CanvasSize::new(image.width(), image.height())?;
        let max_difference = max_difference(canvas);
        Ok(Self {
            image,
            max_difference,
        })
    }

    /// Canvas every candidate must be rendered at.
    pub fn canvas(&self) -> CanvasSize {
        CanvasSize {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Largest possible total absolute difference against this target.
    pub fn max_difference(&self) -> u64 {
        self.max_difference
    }

    /// Score a frame against this target on the 0-100 scale.
    pub fn score(&self, frame: &RgbImage) -> Result<f64, SimilarityError> {
        similarity(&self.image, frame, self.max_difference)
    }
}

/// Total absolute channel difference between two fully different images of
/// this size: `width * height * 3 * 255`.
pub fn max_difference(canvas: CanvasSize) -> u64 {
    canvas.pixel_count() as u64 * CHANNELS * CHANNEL_MAX
}

/// Similarity on a 0-100 scale: `100 * (1 - sum|t - c| / max_difference)`.
///
/// Identical images score exactly 100. A zero `max_difference` only arises
/// from an empty image and scores 100 as well.
pub fn similarity(
    target: &RgbImage,
    candidate: &RgbImage,
    max_difference: u64,
) -> Result<f64, SimilarityError> {
    if target.dimensions() != candidate.dimensions() {
        return Err(SimilarityError::DimensionMismatch {
            expected: CanvasSize {
                width: target.width(),
                height: target.height(),
            },
            actual: CanvasSize {
                width: candidate.width(),
                height: candidate.height(),
            },
        });
    }
    if max_difference == 0 {
        return Ok(100.0);
    }

    let total: u64 = target
        .as_raw()
        .iter()
        .zip(candidate.as_raw())
        .map(|(&t, &c)| t.abs_diff(c) as u64)
        .sum();

    Ok(100.0 * (1.0 - total as f64 / max_difference as f64))
}
