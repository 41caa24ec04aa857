//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! The settlement core must replay identically from the same placements
//! and task assignments. Sources of non-determinism include:
//!
//! - **Floating-point math**: tile centers use
//!   [`hexhold_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: units live in a `BTreeMap`, graph
//!   adjacency lists are sorted and searches break ties by registration
//!   order.
//!
//! - **Wall-clock time**: timers advance by the tick duration only.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use hexhold_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        assert!(
            self.is_deterministic,
            "Simulation is non-deterministic!\n\
             Runs: {}\n\
             Ticks: {}\n\
             Unique hashes: {} (expected 1)\n\
             All hashes: {:?}",
            self.hashes.len(),
            self.ticks,
            self.unique_hashes().len(),
            self.hashes
        );
    }
}

/// Run a state `runs` times from scratch and compare final hashes.
///
/// # Example
///
/// ```
/// use hexhold_core::prelude::*;
/// use hexhold_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     3,
///     100,
///     || Simulation::with_starter(SimConfig::default()).unwrap(),
///     |sim| {
///         sim.tick();
///     },
///     Simulation::state_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run `num_sims` simulations on scoped threads and collect final hashes.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> DeterminismResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    sim.run(num_ticks);
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two simulation runs tick-by-tick, finding first divergence.
///
/// `None` if the runs agree at every tick, `Some(tick)` otherwise.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        let events1 = sim1.tick();
        let events2 = sim2.tick();

        if events1 != events2 || sim1.state_hash() != sim2.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for settlement inputs.
pub mod strategies {
    use hexhold_core::hex::HexCoord;
    use hexhold_core::strategy::TaskKind;
    use hexhold_core::structure::StructureTemplate;
    use hexhold_core::tile::ResourceKind;
    use proptest::prelude::*;

    /// A hex coordinate with both axes in `-radius..=radius`.
    pub fn arb_hex_coord(radius: i32) -> impl Strategy<Value = HexCoord> {
        (-radius..=radius, -radius..=radius).prop_map(|(q, r)| HexCoord::new(q, r))
    }

    /// Any resource kind.
    pub fn arb_resource_kind() -> impl Strategy<Value = ResourceKind> {
        prop_oneof![
            Just(ResourceKind::Wood),
            Just(ResourceKind::Rock),
            Just(ResourceKind::Meat),
        ]
    }

    /// One of the built-in templates, with small resource amounts.
    pub fn arb_template() -> impl Strategy<Value = StructureTemplate> {
        prop_oneof![
            Just(StructureTemplate::hut()),
            (1u32..6).prop_map(StructureTemplate::walkway),
            (1u32..50).prop_map(StructureTemplate::lumber_grove),
            (1u32..50).prop_map(StructureTemplate::quarry),
            (1u32..50).prop_map(StructureTemplate::hunting_ground),
        ]
    }

    /// A sequence of placement attempts near the origin.
    pub fn arb_placements(
        max: usize,
    ) -> impl Strategy<Value = Vec<(StructureTemplate, HexCoord)>> {
        prop::collection::vec((arb_template(), arb_hex_coord(6)), 1..=max)
    }

    /// Any task kind.
    pub fn arb_task() -> impl Strategy<Value = TaskKind> {
        prop_oneof![
            arb_resource_kind().prop_map(TaskKind::Gather),
            Just(TaskKind::Construct),
        ]
    }

    /// Resource slots on the starter platform (offsets within the 4×4).
    pub fn arb_starter_resources(
        max: usize,
    ) -> impl Strategy<Value = Vec<(HexCoord, ResourceKind, u32)>> {
        prop::collection::vec(
            (
                (0i32..4, 0i32..4).prop_map(|(q, r)| HexCoord::new(q, r)),
                arb_resource_kind(),
                1u32..40,
            ),
            0..=max,
        )
    }
}
