//! Quick hill-climbing performance test

use geometric_art::{
    HillClimber, RunConfig, ShapeKind,
    compute::Target,
};
use image::{Rgb, RgbImage};
use std::time::Instant;

fn gradient_target(size: u32) -> Target {
    let image = RgbImage::from_fn(size, size, |x, y| {
        Rgb([
            (x * 255 / size) as u8,
            (y * 255 / size) as u8,
            ((x ^ y) % 256) as u8,
        ])
    });
    Target::new(image).expect("non-empty target")
}

fn main() {
    println!("=== Hill Climbing Performance Test ===\n");

    // Test different canvas sizes
    for size in [32, 64, 128] {
        println!("Canvas size: {}x{}", size, size);

        for shape in [
            ShapeKind::Polygon { sides: 6 },
            ShapeKind::Circle { max_radius: size / 4 },
        ] {
            let config = RunConfig {
                shape,
                individuals: 50,
                iterations: 2_000,
                random_seed: Some(42),
                ..Default::default()
            };

            let start = Instant::now();
            let mut climber = HillClimber::new(config, gradient_target(size)).unwrap();
            let result = climber.run().unwrap();
            let elapsed = start.elapsed();

            println!("  Shape:          {}", shape.name());
            println!("  Iterations:     {}", result.stats.iterations);
            println!("  Changes:        {}", result.stats.accepted_changes);
            println!("  Elapsed:        {:.2}s", elapsed.as_secs_f64());
            println!("  Iterations/sec: {:.1}", result.stats.iterations_per_second);
            println!(
                "  Similarity:     {:.2}% -> {:.2}%",
                result.stats.initial_score, result.stats.final_score
            );
            println!();
        }
    }

    println!("=== Scalability Test (fixed 64x64 canvas) ===\n");

    // Test different population sizes
    for individuals in [10, 50, 100, 200] {
        let config = RunConfig {
            individuals,
            iterations: 1_000,
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let mut climber = HillClimber::new(config, gradient_target(64)).unwrap();
        let result = climber.run().unwrap();
        let elapsed = start.elapsed();

        println!(
            "Population {}: {} iterations in {:.2}s ({:.1} it/sec), similarity {:.2}%",
            individuals,
            result.stats.iterations,
            elapsed.as_secs_f64(),
            result.stats.iterations as f64 / elapsed.as_secs_f64(),
            result.score
        );
    }
}
