//! Configuration types for hill-climbing runs.

use serde::{Deserialize, Serialize};

/// Number of distinct values a color channel can take.
pub const COLOR_LEVELS: u32 = 256;

/// Number of color fields (R, G, B, A) at the tail of every individual.
pub const COLOR_FIELDS: usize = 4;

/// Upper bound on the flat gene vector of a population (1 GiB of genes).
pub const MAX_GENES: usize = 1 << 28;

fn default_sides() -> usize {
    6
}
fn default_max_radius() -> u32 {
    30
}
fn default_individuals() -> usize {
    50
}
fn default_iterations() -> u64 {
    100_000
}
fn default_report_interval() -> u64 {
    10_000
}

/// Canvas dimensions in pixels, derived from the target image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    /// Create a canvas size, rejecting zero dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        let size = Self { width, height };
        size.validate()?;
        Ok(size)
    }

    /// Check both dimensions are non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidCanvas {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl std::fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Kind of primitive a population is made of, with its shape parameter.
///
/// Gene layout per individual:
///
/// ```text
/// Polygon: x0 y0 x1 y1 ... x(S-1) y(S-1) R G B A   (2*S + 4 fields)
/// Circle:  x  y  radius  R G B A                    (7 fields)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeKind {
    /// Filled polygons with a fixed number of vertices.
    Polygon {
        #[serde(default = "default_sides")]
        sides: usize,
    },
    /// Filled disks with radius in `[0, max_radius)`.
    Circle {
        #[serde(default = "default_max_radius")]
        max_radius: u32,
    },
}

impl Default for ShapeKind {
    fn default() -> Self {
        ShapeKind::Polygon {
            sides: default_sides(),
        }
    }
}

impl ShapeKind {
    /// Number of gene fields in one individual.
    ///
    /// Saturates for absurd side counts; [`validate`](Self::validate) rejects those.
    #[inline]
    pub fn arity(&self) -> usize {
        match *self {
            ShapeKind::Polygon { sides } => sides.saturating_mul(2).saturating_add(COLOR_FIELDS),
            ShapeKind::Circle { .. } => 3 + COLOR_FIELDS,
        }
    }

    /// Exclusive upper bound of a gene field; values live in `[0, bound)`.
    ///
    /// `field` must be below [`arity`](Self::arity).
    #[inline]
    pub fn field_bound(&self, field: usize, canvas: CanvasSize) -> u32 {
        match *self {
            ShapeKind::Polygon { sides } => {
                if field / 2 >= sides {
                    COLOR_LEVELS
                } else if field % 2 == 0 {
                    canvas.width
                } else {
                    canvas.height
                }
            }
            ShapeKind::Circle { max_radius } => match field {
                0 => canvas.width,
                1 => canvas.height,
                2 => max_radius,
                _ => COLOR_LEVELS,
            },
        }
    }

    /// The shape-specific parameter: side count or maximum radius.
    pub fn parameter(&self) -> u64 {
        match *self {
            ShapeKind::Polygon { sides } => sides as u64,
            ShapeKind::Circle { max_radius } => max_radius as u64,
        }
    }

    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Polygon { .. } => "polygon",
            ShapeKind::Circle { .. } => "circle",
        }
    }

    /// Validate the shape parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            ShapeKind::Polygon { sides } if sides < 3 => Err(ConfigError::TooFewSides(sides)),
            ShapeKind::Circle { max_radius: 0 } => Err(ConfigError::InvalidMaxRadius),
            _ => self.gene_count(1).map(|_| ()),
        }
    }

    /// Length of the gene vector for `count` individuals, bounded by [`MAX_GENES`].
    pub fn gene_count(&self, count: usize) -> Result<usize, ConfigError> {
        let arity = self.arity();
        count
            .checked_mul(arity)
            .filter(|&genes| genes <= MAX_GENES)
            .ok_or(ConfigError::PopulationTooLarge { count, arity })
    }
}

/// Top-level configuration for a hill-climbing run.
///
/// The canvas size is not part of the configuration: it always comes from
/// the target image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Shape kind and parameter.
    #[serde(default)]
    pub shape: ShapeKind,
    /// Number of individuals in the population.
    #[serde(default = "default_individuals")]
    pub individuals: usize,
    /// Iteration budget. The loop always runs all of it.
    #[serde(default = "default_iterations")]
    pub iterations: u64,
    /// Emit a progress event every N iterations.
    #[serde(default = "default_report_interval")]
    pub report_interval: u64,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            shape: ShapeKind::default(),
            individuals: default_individuals(),
            iterations: default_iterations(),
            report_interval: default_report_interval(),
            random_seed: None,
        }
    }
}

impl RunConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.individuals == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        self.shape.validate()?;
        self.shape.gene_count(self.individuals)?;
        if self.report_interval == 0 {
            return Err(ConfigError::InvalidReportInterval);
        }
        Ok(())
    }
}

/// Invalid-parameter errors. Raised before a run starts and never recovered from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Population must contain at least 1 individual")]
    EmptyPopulation,
    #[error("Canvas dimensions must be non-zero (got {width}x{height})")]
    InvalidCanvas { width: u32, height: u32 },
    #[error("Polygons need at least 3 sides (got {0})")]
    TooFewSides(usize),
    #[error("Maximum circle radius must be positive")]
    InvalidMaxRadius,
    #[error("Report interval must be non-zero")]
    InvalidReportInterval,
    #[error("{count} individuals of arity {arity} exceed {MAX_GENES} genes")]
    PopulationTooLarge { count: usize, arity: usize },
    #[error("Gene vector of length {len} does not hold whole individuals of arity {arity}")]
    GeneLengthMismatch { len: usize, arity: usize },
    #[error("Individual {individual} field {field} = {value} is outside [0, {bound})")]
    FieldOutOfRange {
        individual: usize,
        field: usize,
        value: u32,
        bound: u32,
    },
}
