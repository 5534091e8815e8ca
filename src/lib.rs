//! Geometric Art - Image approximation with polygons and circles.
//!
//! This crate approximates a target image with a fixed-size population of
//! semi-transparent polygons or circles. A hill climber repeatedly resamples
//! one field of one shape and keeps the change only when the rendering gets
//! strictly closer to the target.
//!
//! # Architecture
//!
//! The crate is split into three modules:
//!
//! - `schema`: Run configuration, shape kinds and run statistics
//! - `compute`: Population, rasterizer, similarity scorer and hill climber
//! - `io`: Target loading, snapshots and result persistence
//!
//! # Example
//!
//! ```rust,no_run
//! use geometric_art::{
//!     compute::HillClimber,
//!     io::load_target,
//!     schema::{RunConfig, ShapeKind},
//! };
//!
//! let target = load_target("mona.png").unwrap();
//! let config = RunConfig {
//!     shape: ShapeKind::Circle { max_radius: 20 },
//!     iterations: 10_000,
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut climber = HillClimber::new(config, target).unwrap();
//! let result = climber
//!     .run_with_callback(|event| println!("{}: {:.2}%", event.iteration, event.score))
//!     .unwrap();
//!
//! println!("Final similarity: {:.2}%", result.score);
//! ```

pub mod compute;
pub mod io;
pub mod schema;

// Re-export commonly used types
pub use compute::{ClimbResult, HillClimber, Population, Target, render};
pub use schema::{RunConfig, ShapeKind};
