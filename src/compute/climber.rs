//! Hill-climbing search over a shape population.
//!
//! One current best is kept at a time. Every step mutates a copy of it,
//! renders and scores the copy, and promotes it only on a strict improvement.

use std::time::Instant;

use image::RgbImage;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{Population, SimilarityError, Target, render};
use crate::schema::{ClimbPhase, ClimbStats, ConfigError, RunConfig};

/// Errors that stop a run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClimbError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] ConfigError),
    #[error(transparent)]
    DimensionMismatch(#[from] SimilarityError),
    #[error("No current best population; initialize the climber first")]
    NotInitialized,
}

/// Snapshot handed to progress callbacks.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent<'a> {
    /// 0-based index of the step just executed.
    pub iteration: u64,
    pub accepted_changes: u64,
    /// Score of the current best.
    pub score: f64,
    /// Rendering of the current best.
    pub frame: &'a RgbImage,
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct ClimbResult {
    pub population: Population,
    pub frame: RgbImage,
    pub score: f64,
    pub stats: ClimbStats,
}

/// Current best population with its cached rendering and score.
#[derive(Debug, Clone)]
struct Best {
    population: Population,
    frame: RgbImage,
    score: f64,
}

/// Accept-if-better search engine.
pub struct HillClimber {
    config: RunConfig,
    target: Target,
    rng: StdRng,
    seed: u64,
    phase: ClimbPhase,
    best: Option<Best>,
    initial_score: f64,
    iteration: u64,
    accepted_changes: u64,
}

impl HillClimber {
    /// Create a climber for `target`. The configuration is validated here, so
    /// an invalid run never starts.
    pub fn new(config: RunConfig, target: Target) -> Result<Self, ClimbError> {
        config.validate()?;
        let seed = config.random_seed.unwrap_or_else(rand::random);

        Ok(Self {
            config,
            target,
            rng: StdRng::seed_from_u64(seed),
            seed,
            phase: ClimbPhase::Idle,
            best: None,
            initial_score: 0.0,
            iteration: 0,
            accepted_changes: 0,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Seed the generator was created from, drawn from entropy when the
    /// configuration has none.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> ClimbPhase {
        self.phase
    }

    /// Steps executed so far.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn accepted_changes(&self) -> u64 {
        self.accepted_changes
    }

    pub fn best_score(&self) -> Option<f64> {
        self.best.as_ref().map(|b| b.score)
    }

    pub fn best_frame(&self) -> Option<&RgbImage> {
        self.best.as_ref().map(|b| &b.frame)
    }

    pub fn best_population(&self) -> Option<&Population> {
        self.best.as_ref().map(|b| &b.population)
    }

    /// Create, render and score the initial random population.
    ///
    /// Resets any previous progress. The generator is not reseeded.
    pub fn initialize(&mut self) -> Result<(), ClimbError> {
        let population = Population::random(
            self.config.shape,
            self.config.individuals,
            self.target.canvas(),
            &mut self.rng,
        )?;
        let frame = render(&population);
        let score = self.target.score(&frame)?;

        log::info!(
            "Climbing {} {}s on {} for {} iterations (seed {})",
            self.config.individuals,
            self.config.shape.name(),
            self.target.canvas(),
            self.config.iterations,
            self.seed
        );
        log::info!("Initial similarity {:.2}%", score);

        self.best = Some(Best {
            population,
            frame,
            score,
        });
        self.initial_score = score;
        self.iteration = 0;
        self.accepted_changes = 0;
        self.phase = if self.config.iterations == 0 {
            ClimbPhase::Finished
        } else {
            ClimbPhase::Running
        };
        Ok(())
    }

    /// Run one mutate-render-score-select iteration.
    ///
    /// Initializes first when idle. Returns whether the candidate was
    /// accepted; once the budget is spent this is a no-op returning `false`.
    pub fn step(&mut self) -> Result<bool, ClimbError> {
        if self.phase == ClimbPhase::Idle {
            self.initialize()?;
        }
        if self.phase == ClimbPhase::Finished {
            return Ok(false);
        }
        let best = self.best.as_mut().ok_or(ClimbError::NotInitialized)?;

        let candidate = best.population.mutated(&mut self.rng);
        let frame = render(&candidate);
        let score = self.target.score(&frame)?;

        // ties are rejected
        let accepted = score > best.score;
        if accepted {
            log::debug!(
                "Iteration {}: similarity {:.4}% -> {:.4}%",
                self.iteration,
                best.score,
                score
            );
            *best = Best {
                population: candidate,
                frame,
                score,
            };
            self.accepted_changes += 1;
        }

        self.iteration += 1;
        if self.iteration >= self.config.iterations {
            self.phase = ClimbPhase::Finished;
        }
        Ok(accepted)
    }

    /// Run the whole budget, calling `callback` every `report_interval` steps
    /// starting with the first.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> Result<ClimbResult, ClimbError>
    where
        F: FnMut(&ProgressEvent<'_>),
    {
        let start_time = Instant::now();

        self.initialize()?;

        while self.phase == ClimbPhase::Running {
            let index = self.iteration;
            self.step()?;

            if index % self.config.report_interval == 0
                && let Some(best) = &self.best
            {
                callback(&ProgressEvent {
                    iteration: index,
                    accepted_changes: self.accepted_changes,
                    score: best.score,
                    frame: &best.frame,
                });
            }
        }

        let elapsed = start_time.elapsed().as_secs_f64();
        let best = self.best.clone().ok_or(ClimbError::NotInitialized)?;

        let stats = ClimbStats {
            iterations: self.iteration,
            accepted_changes: self.accepted_changes,
            initial_score: self.initial_score,
            final_score: best.score,
            random_seed: self.seed,
            elapsed_seconds: elapsed,
            iterations_per_second: if elapsed > 0.0 {
                self.iteration as f64 / elapsed
            } else {
                0.0
            },
        };
        log::info!("Finished: {}", stats);

        Ok(ClimbResult {
            population: best.population,
            frame: best.frame,
            score: best.score,
            stats,
        })
    }

    /// Run the whole budget without progress reporting.
    pub fn run(&mut self) -> Result<ClimbResult, ClimbError> {
        self.run_with_callback(|_| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ShapeKind;
    use image::Rgb;

    fn solid_target(size: u32, color: [u8; 3]) -> Target {
        Target::new(RgbImage::from_pixel(size, size, Rgb(color))).unwrap()
    }

    fn circle_config(iterations: u64, seed: u64) -> RunConfig {
        RunConfig {
            shape: ShapeKind::Circle { max_radius: 4 },
            individuals: 5,
            iterations,
            report_interval: 1,
            random_seed: Some(seed),
        }
    }

    #[test]
    fn test_climber_creation() {
        let climber = HillClimber::new(circle_config(10, 3), solid_target(2, [0, 0, 0])).unwrap();

        assert_eq!(climber.phase(), ClimbPhase::Idle);
        assert_eq!(climber.seed(), 3);
        assert_eq!(climber.iteration(), 0);
        assert!(climber.best_score().is_none());
        assert!(climber.best_frame().is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RunConfig {
            individuals: 0,
            ..Default::default()
        };
        let result = HillClimber::new(config, solid_target(4, [255, 255, 255]));
        assert!(matches!(
            result,
            Err(ClimbError::InvalidParameter(ConfigError::EmptyPopulation))
        ));

        let config = RunConfig {
            shape: ShapeKind::Polygon { sides: 2 },
            ..Default::default()
        };
        let result = HillClimber::new(config, solid_target(4, [255, 255, 255]));
        assert!(matches!(
            result,
            Err(ClimbError::InvalidParameter(ConfigError::TooFewSides(2)))
        ));
    }

    #[test]
    fn test_zero_budget_keeps_initial_population() {
        let config = RunConfig {
            shape: ShapeKind::Polygon { sides: 3 },
            individuals: 1,
            iterations: 0,
            report_interval: 1,
            random_seed: Some(17),
        };
        let target = solid_target(4, [255, 255, 255]);
        let mut climber = HillClimber::new(config, target.clone()).unwrap();

        let mut events = 0;
        let result = climber.run_with_callback(|_| events += 1).unwrap();

        let mut rng = StdRng::seed_from_u64(17);
        let expected = Population::random(
            ShapeKind::Polygon { sides: 3 },
            1,
            target.canvas(),
            &mut rng,
        )
        .unwrap();
        let expected_score = target.score(&render(&expected)).unwrap();

        assert_eq!(events, 0);
        assert_eq!(result.population, expected);
        assert_eq!(result.score, expected_score);
        assert_eq!(result.stats.initial_score, expected_score);
        assert_eq!(result.stats.accepted_changes, 0);
        assert_eq!(result.stats.iterations, 0);
        assert_eq!(climber.phase(), ClimbPhase::Finished);
    }

    #[test]
    fn test_converges_on_black_target() {
        let mut climber =
            HillClimber::new(circle_config(5000, 42), solid_target(2, [0, 0, 0])).unwrap();

        let mut scores = Vec::new();
        let result = climber
            .run_with_callback(|event| scores.push(event.score))
            .unwrap();

        assert_eq!(scores.len(), 5000);
        assert!(scores.windows(2).all(|w| w[1] >= w[0]));
        assert!(result.score > result.stats.initial_score);
        assert!(result.score >= 90.0, "score {}", result.score);
        assert!(result.stats.accepted_changes > 0);
        assert_eq!(result.stats.iterations, 5000);
        assert_eq!(result.stats.random_seed, 42);
    }

    #[test]
    fn test_polygons_converge_on_black_target() {
        let config = RunConfig {
            shape: ShapeKind::Polygon { sides: 3 },
            individuals: 5,
            iterations: 10_000,
            report_interval: 1,
            random_seed: Some(42),
        };
        let mut climber = HillClimber::new(config, solid_target(2, [0, 0, 0])).unwrap();

        let mut previous = f64::NEG_INFINITY;
        let result = climber
            .run_with_callback(|event| {
                assert!(event.score >= previous);
                previous = event.score;
            })
            .unwrap();

        assert!(result.score > result.stats.initial_score);
        assert!(result.score >= 90.0, "score {}", result.score);
        // every corner is reachable, so none is left white
        assert!(
            result.frame.pixels().all(|p| p.0.iter().all(|&c| c < 128)),
            "frame {:?}",
            result.frame.as_raw()
        );
    }

    #[test]
    fn test_same_seed_reproduces_run() {
        let target = Target::new(RgbImage::from_fn(6, 5, |x, y| {
            Rgb([(x * 40) as u8, (y * 50) as u8, 128])
        }))
        .unwrap();
        let config = RunConfig {
            shape: ShapeKind::Polygon { sides: 4 },
            individuals: 6,
            iterations: 300,
            report_interval: 100,
            random_seed: Some(9),
        };

        let first = HillClimber::new(config.clone(), target.clone())
            .unwrap()
            .run()
            .unwrap();
        let second = HillClimber::new(config, target).unwrap().run().unwrap();

        assert_eq!(first.population, second.population);
        assert_eq!(first.frame.as_raw(), second.frame.as_raw());
        assert_eq!(first.score, second.score);
        assert_eq!(first.stats.accepted_changes, second.stats.accepted_changes);
    }

    #[test]
    fn test_progress_cadence() {
        let config = RunConfig {
            report_interval: 10,
            ..circle_config(25, 5)
        };
        let mut climber = HillClimber::new(config, solid_target(3, [90, 10, 200])).unwrap();

        let mut seen = Vec::new();
        climber
            .run_with_callback(|event| {
                assert_eq!(event.frame.dimensions(), (3, 3));
                seen.push(event.iteration);
            })
            .unwrap();

        assert_eq!(seen, vec![0, 10, 20]);
    }

    #[test]
    fn test_step_lifecycle() {
        let mut climber = HillClimber::new(circle_config(3, 8), solid_target(2, [0, 0, 0])).unwrap();

        climber.step().unwrap();
        assert_eq!(climber.phase(), ClimbPhase::Running);
        assert_eq!(climber.iteration(), 1);

        let before = climber.best_score().unwrap();
        climber.step().unwrap();
        climber.step().unwrap();
        assert_eq!(climber.phase(), ClimbPhase::Finished);
        assert!(climber.best_score().unwrap() >= before);

        // budget spent
        assert!(!climber.step().unwrap());
        assert_eq!(climber.iteration(), 3);
    }

    #[test]
    fn test_cached_frame_matches_population() {
        let mut climber =
            HillClimber::new(circle_config(200, 12), solid_target(4, [30, 60, 90])).unwrap();
        let result = climber.run().unwrap();

        let rendered = render(&result.population);
        assert_eq!(rendered.as_raw(), result.frame.as_raw());
        assert_eq!(climber.target().score(&rendered).unwrap(), result.score);
        assert_eq!(climber.best_score(), Some(result.score));
    }
}
