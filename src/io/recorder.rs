//! Run directory layout, snapshot recording and result persistence.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::{
    OutputError, TARGET_FILE_NAME, artifact_file_name, save_frame, sidecar_file_name,
    snapshot_file_name,
};
use crate::compute::{ClimbResult, Population, Target};
use crate::schema::{ClimbStats, RunConfig};

/// Scratch directory for the current run plus the persistent output directory.
#[derive(Debug, Clone)]
pub struct RunLayout {
    run_dir: PathBuf,
    output_dir: PathBuf,
}

impl RunLayout {
    pub fn new(run_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            run_dir: run_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Start from an empty run directory and make sure the output directory
    /// exists. Earlier results in the output directory are kept.
    pub fn prepare(&self) -> Result<(), OutputError> {
        if self.run_dir.exists() {
            fs::remove_dir_all(&self.run_dir).map_err(|e| OutputError::io(&self.run_dir, e))?;
        }
        fs::create_dir_all(&self.run_dir).map_err(|e| OutputError::io(&self.run_dir, e))?;
        fs::create_dir_all(&self.output_dir).map_err(|e| OutputError::io(&self.output_dir, e))?;
        Ok(())
    }

    /// Save a copy of the target into the run directory.
    pub fn save_target(&self, target: &Target) -> Result<PathBuf, OutputError> {
        let path = self.run_dir.join(TARGET_FILE_NAME);
        save_frame(target.image(), &path)?;
        Ok(path)
    }

    /// Save the final frame and its JSON sidecar into the output directory.
    pub fn save_result(
        &self,
        config: &RunConfig,
        target_name: &str,
        result: &ClimbResult,
    ) -> Result<SavedResult, OutputError> {
        let artifact = self
            .output_dir
            .join(artifact_file_name(result.score, config, target_name));
        save_frame(&result.frame, &artifact)?;

        let record = RunRecord {
            target: target_name.to_string(),
            score: result.score,
            config: config.clone(),
            stats: result.stats.clone(),
            population: result.population.clone(),
        };
        let sidecar = self
            .output_dir
            .join(sidecar_file_name(result.score, config, target_name));
        let json = serde_json::to_string_pretty(&record)?;
        fs::write(&sidecar, json).map_err(|e| OutputError::io(&sidecar, e))?;

        log::info!("Saved {} and {}", artifact.display(), sidecar.display());
        Ok(SavedResult { artifact, sidecar })
    }
}

/// Paths written by [`RunLayout::save_result`].
#[derive(Debug, Clone)]
pub struct SavedResult {
    pub artifact: PathBuf,
    pub sidecar: PathBuf,
}

/// Everything needed to reproduce or re-render a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// File name of the target image.
    pub target: String,
    pub score: f64,
    pub config: RunConfig,
    pub stats: ClimbStats,
    /// Final population; validated against its canvas when loaded.
    pub population: Population,
}

impl RunRecord {
    /// Load a sidecar written by [`RunLayout::save_result`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, OutputError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| OutputError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Configuration for snapshot recording.
#[derive(Debug, Clone, Default)]
pub struct RecorderConfig {
    /// Maximum snapshots to write (0 = unlimited).
    pub max_snapshots: u64,
}

/// Writes `output_{iteration}.png` frames into a directory.
///
/// Usage:
/// ```ignore
/// let mut recorder = SnapshotRecorder::new(layout.run_dir(), RecorderConfig::default());
/// climber.run_with_callback(|event| {
///     recorder.record(event.iteration, event.frame).ok();
/// })?;
/// let stats = recorder.finalize();
/// ```
pub struct SnapshotRecorder {
    dir: PathBuf,
    config: RecorderConfig,
    snapshots_written: u64,
    last_iteration: Option<u64>,
}

impl SnapshotRecorder {
    pub fn new(dir: impl Into<PathBuf>, config: RecorderConfig) -> Self {
        Self {
            dir: dir.into(),
            config,
            snapshots_written: 0,
            last_iteration: None,
        }
    }

    /// Record a frame.
    ///
    /// Returns true if the frame was written (the cap may skip it).
    pub fn record(&mut self, iteration: u64, frame: &RgbImage) -> Result<bool, OutputError> {
        if self.config.max_snapshots > 0 && self.snapshots_written >= self.config.max_snapshots {
            return Ok(false);
        }

        save_frame(frame, self.dir.join(snapshot_file_name(iteration)))?;
        self.snapshots_written += 1;
        self.last_iteration = Some(iteration);
        Ok(true)
    }

    pub fn snapshots_written(&self) -> u64 {
        self.snapshots_written
    }

    pub fn finalize(self) -> RecordingStats {
        RecordingStats {
            snapshot_count: self.snapshots_written,
            last_iteration: self.last_iteration,
            directory: self.dir,
        }
    }
}

/// Statistics from a recording session.
#[derive(Debug, Clone)]
pub struct RecordingStats {
    pub snapshot_count: u64,
    /// Iteration of the most recent snapshot.
    pub last_iteration: Option<u64>,
    pub directory: PathBuf,
}

impl std::fmt::Display for RecordingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} snapshots in {}",
            self.snapshot_count,
            self.directory.display()
        )?;
        if let Some(iteration) = self.last_iteration {
            write!(f, " (last at iteration {iteration})")?;
        }
        Ok(())
    }
}
