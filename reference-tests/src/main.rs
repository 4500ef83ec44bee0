//! Reference test binary entry point
//!
//! Runs every reference scenario and exits non-zero if any fails.

use reference_tests::{ExpectedResult, LocalityCheck, ReferenceTest, Scenario, TestResult};
use sfcpack::Dimensionality;

/// Hilbert locality in a periodic cube
///
/// 20000 particles in a 16^3 box on a 16^3 grid. After sorting, particles
/// within 0.6 of each other should sit far closer in memory than in the
/// random starting order.
fn hilbert_cube_test() -> ReferenceTest {
    ReferenceTest {
        name: "3D Hilbert Locality".to_string(),
        config_path: "configs/sorter-default.json".to_string(),
        scenario: Scenario {
            particles: 20_000,
            box_lengths: [16.0, 16.0, 16.0],
            dims: Dimensionality::Three,
            drift: 0.1,
            seed: 17,
        },
        passes: 5,
        expected: ExpectedResult {
            locality: Some(LocalityCheck {
                radius: 0.6,
                max_gap_ratio: 0.2,
            }),
            tag_consistency: true,
            determinism: true,
            regenerations: Some(1), // Box and bin width never change
        },
    }
}

/// Raster traversal of a flat system
fn raster_sheet_test() -> ReferenceTest {
    ReferenceTest {
        name: "2D Raster Locality".to_string(),
        config_path: "configs/sorter-2d-raster.json".to_string(),
        scenario: Scenario {
            particles: 5_000,
            box_lengths: [40.0, 40.0, 1.0],
            dims: Dimensionality::Two,
            drift: 0.2,
            seed: 29,
        },
        passes: 5,
        expected: ExpectedResult {
            locality: Some(LocalityCheck {
                radius: 1.0,
                max_gap_ratio: 0.2,
            }),
            tag_consistency: true,
            determinism: true,
            regenerations: Some(1),
        },
    }
}

/// Hilbert traversal of a flat system, binned on the thread pool
fn hilbert_sheet_test() -> ReferenceTest {
    ReferenceTest {
        name: "2D Hilbert Locality".to_string(),
        config_path: "configs/sorter-2d-hilbert.json".to_string(),
        scenario: Scenario {
            particles: 5_000,
            box_lengths: [40.0, 40.0, 1.0],
            dims: Dimensionality::Two,
            drift: 0.2,
            seed: 29,
        },
        passes: 5,
        expected: ExpectedResult {
            locality: Some(LocalityCheck {
                radius: 1.0,
                max_gap_ratio: 0.2,
            }),
            tag_consistency: true,
            determinism: true,
            regenerations: Some(1),
        },
    }
}

/// Get all reference tests
fn all_tests() -> Vec<ReferenceTest> {
    vec![hilbert_cube_test(), raster_sheet_test(), hilbert_sheet_test()]
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    tracing::info!("Spatial Sorter Reference Test Suite");
    tracing::info!("===================================");

    let tests = all_tests();
    tracing::info!("Found {} reference tests", tests.len());

    let mut results: Vec<TestResult> = Vec::new();
    let mut passed_count = 0;
    let mut failed_count = 0;

    for test in tests {
        match test.run() {
            Ok(result) => {
                if result.passed {
                    passed_count += 1;
                } else {
                    failed_count += 1;
                }
                result.print_summary();
                results.push(result);
            }
            Err(e) => {
                eprintln!("\nERROR running test {}: {}", test.name, e);
                failed_count += 1;
            }
        }
    }

    println!("\n{}", "=".repeat(80));
    println!("OVERALL SUMMARY");
    println!("{}", "=".repeat(80));
    println!("Total tests: {}", results.len());
    println!("Passed: {}", passed_count);
    println!("Failed: {}", failed_count);
    println!("{}", "=".repeat(80));

    if failed_count > 0 {
        std::process::exit(1);
    }
}
