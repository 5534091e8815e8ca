//! Compute module - Population search, rasterization and scoring.

mod climber;
mod population;
mod raster;
mod similarity;

pub use climber::*;
pub use population::*;
pub use raster::*;
pub use similarity::*;
