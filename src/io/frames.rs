//! Decoding the target image and encoding rendered frames.

use std::path::Path;

use image::RgbImage;

use super::OutputError;
use crate::compute::Target;

/// Decode any supported image file into an 8-bit RGB target.
pub fn load_target<P: AsRef<Path>>(path: P) -> Result<Target, OutputError> {
    let path = path.as_ref();
    let decoded = image::open(path).map_err(|e| OutputError::image(path, e))?;
    Ok(Target::new(decoded.to_rgb8())?)
}

/// Write a frame, encoded in the format implied by the path's extension.
pub fn save_frame<P: AsRef<Path>>(frame: &RgbImage, path: P) -> Result<(), OutputError> {
    let path = path.as_ref();
    frame.save(path).map_err(|e| OutputError::image(path, e))
}
