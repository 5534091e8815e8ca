//! I/O module - Target loading, frame encoding and run output.
//!
//! Everything here sits outside the search loop: it receives frames and
//! progress events from the climber and never influences acceptance.

mod frames;
mod naming;
mod recorder;
mod report;

use std::path::PathBuf;

pub use frames::*;
pub use naming::*;
pub use recorder::*;
pub use report::*;

use crate::schema::ConfigError;

/// Errors from the output layer.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Image error at {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unusable target image: {0}")]
    InvalidTarget(#[from] ConfigError),
}

impl OutputError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OutputError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        OutputError::Image {
            path: path.into(),
            source,
        }
    }
}
