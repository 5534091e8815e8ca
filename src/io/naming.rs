//! File naming conventions for run output.

use std::path::Path;
use std::time::Duration;

use crate::schema::RunConfig;

/// Copy of the target saved in the run directory.
pub const TARGET_FILE_NAME: &str = "target.png";

/// Snapshot of the current best at `iteration`.
pub fn snapshot_file_name(iteration: u64) -> String {
    format!("output_{iteration}.png")
}

/// Final artifact name: `{score:.2}_{individuals}_{shape_param}_{target_name}`.
///
/// `shape_param` is the side count for polygons and the maximum radius for
/// circles.
pub fn artifact_file_name(score: f64, config: &RunConfig, target_name: &str) -> String {
    format!(
        "{:.2}_{}_{}_{}",
        score,
        config.individuals,
        config.shape.parameter(),
        target_name
    )
}

/// JSON sidecar next to the artifact, sharing its stem.
pub fn sidecar_file_name(score: f64, config: &RunConfig, target_name: &str) -> String {
    let stem = Path::new(target_name)
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_else(|| target_name.into());
    format!("{}.json", artifact_file_name(score, config, &stem))
}

/// Last path component of the target, used in the artifact name.
pub fn target_file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| TARGET_FILE_NAME.to_string())
}

/// Wall-clock duration as `HH:MM:SS`, rounded to the nearest second.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs_f64().round() as u64;
    let (hours, rest) = (total / 3600, total % 3600);
    let (minutes, seconds) = (rest / 60, rest % 60);
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
