//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the combat engine
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Peers advance the same world independently and compare state hashes,
//! so every tick must be 100% deterministic. Sources of non-determinism
//! include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`armada_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Registries always iterate in sorted entity ID order.
//!
//! - **System randomness**: The engine never draws random numbers.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual armament behaviour (lasers, mines, etc.)
//! 2. **Property tests**: Random inputs must still produce deterministic outputs
//! 3. **Integration tests**: Full skirmish scenarios are reproducible
//! 4. **Parallel tests**: Running N simulations in parallel all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use armada_core::simulation::{Simulation, World};

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
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each simulation.
    pub hashes: Vec<u64>,
    /// Number of ticks each simulation ran.
    pub ticks: u64,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use armada_test_utils::determinism::verify_determinism;
/// use armada_test_utils::fixtures::skirmish;
///
/// let result = verify_determinism(
///     3,  // Run 3 times
///     50, // 50 ticks each
///     || skirmish(2),
///     |sim| { sim.tick(); },
///     |sim| sim.state_hash(),
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

/// Simplified determinism verification for [`Simulation`].
///
/// Runs the simulation twice with identical setup and verifies the final
/// state hashes match exactly.
pub fn verify_simulation_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    let result = verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |sim| {
            sim.tick();
        },
        Simulation::state_hash,
    );
    result.is_deterministic
}

/// Run N simulations on scoped threads and collect final hashes.
///
/// This is useful for catching non-determinism that only manifests
/// under thread scheduling variations, memory layout differences, etc.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> ParallelSimResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..num_ticks {
                        sim.tick();
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Compare two simulation runs tick-by-tick, finding first divergence.
///
/// Checks the per-tick output as well as the state hash, so a divergence
/// in emitted effects is caught even if state happens to reconverge.
///
/// # Returns
///
/// `None` if simulations are deterministic, `Some(tick)` if they diverge
/// at that tick.
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
        let out1 = sim1.tick();
        let out2 = sim2.tick();

        if out1 != out2 || sim1.state_hash() != sim2.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Verify that a serialization round-trip preserves world state exactly,
/// and that the restored world keeps evolving identically.
pub fn verify_serialization_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    let mut sim = setup_fn();

    for _ in 0..num_ticks {
        sim.tick();
    }

    let hash_before = sim.state_hash();

    let Ok(bytes) = sim.world().serialize() else {
        return false;
    };
    let Ok(world) = World::deserialize(&bytes) else {
        return false;
    };
    let Ok(mut restored) =
        Simulation::with_world(sim.catalog().clone(), sim.config().clone(), world)
    else {
        return false;
    };

    if restored.state_hash() != hash_before {
        return false;
    }

    for _ in 0..num_ticks {
        if sim.tick() != restored.tick() {
            return false;
        }
    }
    sim.state_hash() == restored.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of the engine.
pub mod strategies {
    use armada_core::math::{Fixed, Vec2Fixed, TAU};
    use proptest::prelude::*;

    /// Generate a fixed-point number in a sector-sized range for positions.
    ///
    /// Range: -500 to 500
    pub fn arb_fixed_position() -> impl Strategy<Value = Fixed> {
        (-500i32..500i32).prop_map(Fixed::from_num)
    }

    /// Generate a fixed-point 2D vector for positions.
    pub fn arb_vec2_position() -> impl Strategy<Value = Vec2Fixed> {
        (arb_fixed_position(), arb_fixed_position()).prop_map(|(x, y)| Vec2Fixed::new(x, y))
    }

    /// Generate a heading in `[0, 2π)` at millradian resolution.
    pub fn arb_heading() -> impl Strategy<Value = Fixed> {
        (0i32..6283i32).prop_map(|m| (Fixed::from_num(m) / 1000).min(TAU))
    }

    /// Generate a per-tick turn limit between 0.001 and 1 radian.
    pub fn arb_turn_rate() -> impl Strategy<Value = Fixed> {
        (1i32..1000i32).prop_map(|m| Fixed::from_num(m) / 1000)
    }

    /// Generate an energy level between 0 and 20, in tenths.
    pub fn arb_energy() -> impl Strategy<Value = Fixed> {
        (0i32..=200i32).prop_map(|t| Fixed::from_num(t) / 10)
    }

    /// Generate a firing pattern: for each tick, whether the intent is held.
    pub fn arb_fire_pattern(max_len: usize) -> impl Strategy<Value = Vec<bool>> {
        proptest::collection::vec(any::<bool>(), 1..max_len)
    }

    /// Parameters for placing a test unit.
    #[derive(Debug, Clone)]
    pub struct TestUnitParams {
        /// Position.
        pub position: Vec2Fixed,
        /// Heading.
        pub heading: Fixed,
        /// Team.
        pub team: u8,
    }

    /// Generate parameters for a test unit.
    pub fn arb_unit_params() -> impl Strategy<Value = TestUnitParams> {
        (arb_vec2_position(), arb_heading(), 0u8..2u8).prop_map(|(position, heading, team)| {
            TestUnitParams {
                position,
                heading,
                team,
            }
        })
    }

    /// Generate a list of unit placements.
    pub fn arb_unit_list(max_units: usize) -> impl Strategy<Value = Vec<TestUnitParams>> {
        proptest::collection::vec(arb_unit_params(), 1..max_units)
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::*;
    use super::*;
    use crate::fixtures::{armaments, empty_simulation, skirmish, spawn, units};
    use armada_core::components::TargetRef;
    use armada_core::math::Fixed;
    use proptest::prelude::*;

    // =========================================================================
    // Basic determinism tests
    // =========================================================================

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_empty_simulation_determinism() {
        assert!(verify_simulation_determinism(empty_simulation, 100));
    }

    #[test]
    fn test_find_divergence_on_deterministic_sim() {
        let divergence = find_first_divergence(|| skirmish(2), 150);
        assert!(divergence.is_none(), "Expected no divergence");
    }

    // =========================================================================
    // Serialization round-trip tests
    // =========================================================================

    #[test]
    fn test_serialization_preserves_empty_sim() {
        assert!(verify_serialization_determinism(empty_simulation, 0));
    }

    #[test]
    fn test_serialization_preserves_mid_battle_state() {
        // 40 ticks leaves projectiles, mines and a pending pulse in flight.
        assert!(verify_serialization_determinism(
            || {
                let mut sim = skirmish(2);
                let frigate = sim
                    .spawn_unit(units::FRIGATE, 0, crate::fixtures::pos(20, 0), Fixed::ZERO)
                    .expect("frigate spawns");
                sim.set_fire_intent(frigate, 1, None).expect("pulse slot");
                sim
            },
            40,
        ));
    }

    // =========================================================================
    // Integration tests: Skirmish determinism
    // =========================================================================

    #[test]
    fn test_skirmish_determinism() {
        let result = verify_determinism(
            5,
            200,
            || skirmish(4),
            |sim| {
                sim.tick();
            },
            Simulation::state_hash,
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_skirmish_effects_are_identical() {
        let mut sim1 = skirmish(3);
        let mut sim2 = skirmish(3);

        for tick in 0..200 {
            let out1 = sim1.tick();
            let out2 = sim2.tick();
            assert_eq!(out1.effects, out2.effects, "Effects differ at tick {tick}");
            assert_eq!(out1.destroyed, out2.destroyed, "Kills differ at tick {tick}");
        }
    }

    #[test]
    fn test_parallel_skirmish_simulations() {
        let result = run_parallel_simulations(|| skirmish(3), 4, 200);
        result.assert_deterministic();
    }

    #[test]
    fn test_compute_hash_matches_for_equal_values() {
        assert_eq!(compute_hash(&(1u8, "a")), compute_hash(&(1u8, "a")));
        assert_ne!(compute_hash(&1u64), compute_hash(&2u64));
    }

    // =========================================================================
    // Property tests
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_random_placements_are_deterministic(placements in arb_unit_list(8)) {
            let setup = || {
                let mut sim = empty_simulation();
                let mut ids = Vec::new();
                for p in &placements {
                    let id = sim
                        .spawn_unit(units::CORVETTE, p.team, p.position, p.heading)
                        .expect("corvette spawns");
                    ids.push(id);
                }
                // Everyone fires its laser at the next unit and its cannon forward.
                for (i, &id) in ids.iter().enumerate() {
                    let target = ids[(i + 1) % ids.len()];
                    sim.set_fire_intent(id, 0, Some(TargetRef::Unit(target))).expect("slot 0");
                    sim.set_fire_intent(id, 1, None).expect("slot 1");
                }
                sim
            };
            prop_assert!(verify_simulation_determinism(setup, 60));
        }

        #[test]
        fn prop_fire_pattern_is_deterministic(pattern in arb_fire_pattern(60)) {
            let run = |pattern: &[bool]| {
                let mut sim = empty_simulation();
                let shooter = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
                let target = spawn(&mut sim, units::CORVETTE, 1, 40, 0);
                for &held in pattern {
                    if held {
                        sim.set_fire_intent(shooter, 0, Some(TargetRef::Unit(target))).expect("slot 0");
                    } else {
                        sim.clear_fire_intent(shooter, 0).expect("slot 0");
                    }
                    sim.tick();
                }
                sim.state_hash()
            };
            prop_assert_eq!(run(&pattern), run(&pattern));
        }
    }

    #[test]
    fn test_fixture_armament_indices_fit_corvette() {
        let sim = empty_simulation();
        let corvette = sim.catalog().unit(units::CORVETTE).expect("corvette");
        assert_eq!(corvette.loadout[0], armaments::PULSE_LASER);
        assert_eq!(corvette.loadout[2], armaments::REACTOR);
    }
}
