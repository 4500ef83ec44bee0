//! Reference test framework for spatial sorter validation
//!
//! Each reference test loads a sorter configuration, scatters particles
//! randomly in a box, runs several sorting passes while the particles drift,
//! and validates the outcome: neighbor locality in memory, tag bookkeeping,
//! determinism and traversal-order reuse.


use sfcpack::{
    BoxDim, Dimensionality, NeighborGrid, ParticleData, ParticleInit, SfcPackUpdater, SorterConfig,
};

/// Expected result criteria for a reference test
#[derive(Debug, Clone)]
pub struct ExpectedResult {
    /// Neighbor index-gap reduction
    pub locality: Option<LocalityCheck>,
    /// rtag consistency after every pass
    pub tag_consistency: bool,
    /// A second sorter on identical input must agree
    pub determinism: bool,
    /// Traversal order regenerations over the whole run
    pub regenerations: Option<usize>,
}

/// Check that sorting brings neighbors closer together in memory
#[derive(Debug, Clone)]
pub struct LocalityCheck {
    /// Interaction radius defining a neighbor pair
    pub radius: f32,
    /// Largest accepted ratio of mean neighbor index gap, after / before
    pub max_gap_ratio: f64,
}

/// Particle cloud the test runs on
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Number of particles
    pub particles: usize,
    /// Box side lengths
    pub box_lengths: [f32; 3],
    /// Dimensionality of the system
    pub dims: Dimensionality,
    /// Random displacement amplitude applied between passes
    pub drift: f32,
    /// Seed for particle placement and drift
    pub seed: u64,
}

/// Result of running a reference test
#[derive(Debug)]
pub struct TestResult {
    /// Test name
    pub name: String,
    /// Whether test passed
    pub passed: bool,
    /// Individual check results
    pub checks: Vec<CheckResult>,
    /// Locality before and after sorting
    pub locality: Option<LocalityMetrics>,
    /// Number of sorting passes executed
    pub passes: usize,
    /// Grid cells per axis used by the last pass
    pub mmax: u32,
}

/// Mean index distance between neighbor pairs
#[derive(Debug, Clone, Copy)]
pub struct LocalityMetrics {
    /// Neighbor pairs counted
    pub pairs: usize,
    /// Mean gap in the initial (random) ordering
    pub gap_before: f64,
    /// Mean gap after the final pass
    pub gap_after: f64,
}

/// Result of an individual validation check
#[derive(Debug)]
pub struct CheckResult {
    /// Check name
    pub name: String,
    /// Whether check passed
    pub passed: bool,
    /// Error message if failed
    pub message: Option<String>,
}

/// A reference test case
pub struct ReferenceTest {
    /// Test name
    pub name: String,
    /// Path to configuration file
    pub config_path: String,
    /// Particle cloud to sort
    pub scenario: Scenario,
    /// Number of sorting passes to run
    pub passes: usize,
    /// Expected results to validate
    pub expected: ExpectedResult,
}

impl Scenario {
    /// Simulation box, lower corner at the origin.
    pub fn box_dim(&self) -> BoxDim {
        BoxDim::new([0.0; 3], self.box_lengths)
    }

    /// Random particles filling the box.
    pub fn build(&self) -> ParticleData {
        let mut rng = fastrand::Rng::with_seed(self.seed);
        let mut pd = ParticleData::new();
        for i in 0..self.particles {
            let mut position = [0.0_f32; 3];
            for axis in 0..self.dims.count() {
                position[axis] = rng.f32() * self.box_lengths[axis];
            }
            pd.push_particle(ParticleInit {
                position,
                velocity: [rng.f32() - 0.5, rng.f32() - 0.5, rng.f32() - 0.5],
                mass: 1.0,
                type_id: (i % 2) as u32,
                ..ParticleInit::default()
            });
        }
        pd
    }

    /// Move every particle by a small random step, wrapping into the box.
    fn drift(&self, pd: &mut ParticleData, rng: &mut fastrand::Rng) {
        let axes: [&mut Vec<f32>; 3] = [&mut pd.x, &mut pd.y, &mut pd.z];
        for (axis, coords) in axes.into_iter().enumerate().take(self.dims.count()) {
            let l = self.box_lengths[axis];
            for p in coords.iter_mut() {
                *p = (*p + (rng.f32() - 0.5) * 2.0 * self.drift).rem_euclid(l);
            }
        }
    }
}

impl ReferenceTest {
    /// Run the reference test and return results
    pub fn run(&self) -> Result<TestResult, String> {
        tracing::info!("Running reference test: {}", self.name);

        let config = SorterConfig::load(&self.config_path).map_err(|e| e.to_string())?;
        tracing::info!("Configuration loaded: bin_width={}", config.bin_width);

        let box_dim = self.scenario.box_dim();
        let dims = self.scenario.dims;
        let mut pd = self.scenario.build();
        let mut updater = SfcPackUpdater::new(config.clone()).map_err(|e| e.to_string())?;

        tracing::info!(
            "Initialized: {} particles in {:?} box",
            pd.len(),
            self.scenario.box_lengths
        );

        let mut checks = Vec::new();
        let mut all_passed = true;

        // Determinism: two independent sorters, one binning serially and one
        // in parallel, must agree on an identical cloud
        if self.expected.determinism {
            let serial = SorterConfig {
                parallel_binning: false,
                ..config.clone()
            };
            let parallel = SorterConfig {
                parallel_binning: true,
                ..config
            };
            let mut a = SfcPackUpdater::new(serial).map_err(|e| e.to_string())?;
            let mut b = SfcPackUpdater::new(parallel).map_err(|e| e.to_string())?;
            a.compute_sort_order(&pd, &box_dim, dims);
            b.compute_sort_order(&pd, &box_dim, dims);
            let check = validate_determinism(a.sort_order(), b.sort_order());
            all_passed &= check.passed;
            checks.push(check);
        }

        let mut neighbor_grid = self
            .expected
            .locality
            .as_ref()
            .map(|l| NeighborGrid::new(l.radius, box_dim.lo, box_dim.hi));
        if let Some(grid) = neighbor_grid.as_mut() {
            grid.attach(&pd);
        }

        let gap_before = match (neighbor_grid.as_mut(), self.expected.locality.as_ref()) {
            (Some(grid), Some(l)) => Some(mean_neighbor_gap(grid, &pd, l.radius)),
            _ => None,
        };

        // Run passes with drift in between
        let mut rng = fastrand::Rng::with_seed(self.scenario.seed ^ 0x5eed);
        let mut regenerations = 0;
        let mut rtag_failures = 0;
        let mut mmax = 0;
        for pass in 0..self.passes {
            let stats = updater.update(pass as u64, &mut pd, &box_dim, dims);
            mmax = stats.mmax;
            if stats.regenerated {
                regenerations += 1;
            }
            if !pd.rtag_consistent() {
                rtag_failures += 1;
            }
            if pass + 1 < self.passes {
                self.scenario.drift(&mut pd, &mut rng);
            }
        }
        tracing::info!("Sorting complete: {} passes, Mmax={}", self.passes, mmax);

        if self.expected.tag_consistency {
            let check = validate_tag_consistency(rtag_failures, self.passes);
            all_passed &= check.passed;
            checks.push(check);
        }

        if let Some(expected) = self.expected.regenerations {
            let check = validate_regenerations(regenerations, expected);
            all_passed &= check.passed;
            checks.push(check);
        }

        let mut locality = None;
        if let (Some(grid), Some(l), Some(before)) = (
            neighbor_grid.as_mut(),
            self.expected.locality.as_ref(),
            gap_before,
        ) {
            let (pairs, gap_before) = before;
            let (_, gap_after) = mean_neighbor_gap(grid, &pd, l.radius);
            let metrics = LocalityMetrics {
                pairs,
                gap_before,
                gap_after,
            };
            let check = validate_locality(&metrics, l);
            all_passed &= check.passed;
            checks.push(check);
            locality = Some(metrics);
        }

        Ok(TestResult {
            name: self.name.clone(),
            passed: all_passed,
            checks,
            locality,
            passes: self.passes,
            mmax,
        })
    }
}

/// Count neighbor pairs within `radius` and their mean index distance.
///
/// Rebuilds the neighbor grid first if a sort happened since it was built.
pub fn mean_neighbor_gap(grid: &mut NeighborGrid, pd: &ParticleData, radius: f32) -> (usize, f64) {
    grid.ensure_current(&pd.x, &pd.y, &pd.z);

    let mut pairs = 0usize;
    let mut total_gap = 0u64;
    for i in 0..pd.len() {
        grid.for_each_neighbor(i, &pd.x, &pd.y, &pd.z, radius, |j| {
            if j > i {
                pairs += 1;
                total_gap += (j - i) as u64;
            }
        });
    }

    let mean = if pairs > 0 {
        total_gap as f64 / pairs as f64
    } else {
        0.0
    };
    (pairs, mean)
}

/// Validate that the neighbor index gap shrank enough
fn validate_locality(metrics: &LocalityMetrics, check: &LocalityCheck) -> CheckResult {
    if metrics.pairs == 0 {
        return CheckResult {
            name: "Locality".to_string(),
            passed: false,
            message: Some("No neighbor pairs found".to_string()),
        };
    }

    let ratio = metrics.gap_after / metrics.gap_before.max(1.0);
    let message = format!(
        "Mean neighbor gap: {:.1} -> {:.1} (ratio {:.3}, limit {:.3}, {} pairs)",
        metrics.gap_before, metrics.gap_after, ratio, check.max_gap_ratio, metrics.pairs
    );
    CheckResult {
        name: "Locality".to_string(),
        passed: ratio <= check.max_gap_ratio,
        message: Some(message),
    }
}

/// Validate that rtag was consistent after every pass
fn validate_tag_consistency(failures: usize, passes: usize) -> CheckResult {
    if failures == 0 {
        CheckResult {
            name: "Tag Consistency".to_string(),
            passed: true,
            message: Some(format!("rtag consistent after all {} passes", passes)),
        }
    } else {
        CheckResult {
            name: "Tag Consistency".to_string(),
            passed: false,
            message: Some(format!("rtag inconsistent after {} / {} passes", failures, passes)),
        }
    }
}

/// Validate that two sorters agree on the sort order
fn validate_determinism(a: &[u32], b: &[u32]) -> CheckResult {
    let mismatches = a.iter().zip(b).filter(|(x, y)| x != y).count() + a.len().abs_diff(b.len());
    CheckResult {
        name: "Determinism".to_string(),
        passed: mismatches == 0,
        message: (mismatches > 0).then(|| format!("{} sort order entries differ", mismatches)),
    }
}

/// Validate the number of traversal order regenerations
fn validate_regenerations(actual: usize, expected: usize) -> CheckResult {
    CheckResult {
        name: "Traversal Cache".to_string(),
        passed: actual == expected,
        message: Some(format!("{} regenerations (expected {})", actual, expected)),
    }
}

impl TestResult {
    /// Print a summary of the test result
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(80));
        println!("Test: {}", self.name);
        println!("{}", "=".repeat(80));
        println!("Status: {}", if self.passed { "PASSED" } else { "FAILED" });
        println!("Passes: {}", self.passes);
        println!("Grid: {} cells per axis", self.mmax);
        if let Some(ref m) = self.locality {
            println!("\nLocality:");
            println!("  Neighbor pairs: {}", m.pairs);
            println!("  Mean index gap before: {:.1}", m.gap_before);
            println!("  Mean index gap after: {:.1}", m.gap_after);
        }
        println!("\nValidation Checks:");
        for check in &self.checks {
            let status = if check.passed { "PASS" } else { "FAIL" };
            print!("  [{}] {}", status, check.name);
            if let Some(ref msg) = check.message {
                print!(" - {}", msg);
            }
            println!();
        }
        println!("{}", "=".repeat(80));
    }
}
