//! Stability Tests - properties every completed assignment must hold.
//!
//! - Conservation: each juggler seated exactly once, every team exactly full
//! - Stability: nobody outscores the worst member of a circuit it prefers
//! - Cursor monotonicity and the operation bound
//! - Hand-checked scenarios

use jugglefest::{Aspect, Circuit, CircuitId, Juggler, JugglerId, MatchingEngine, Registry};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// Helpers
// ============================================================================

/// Random problem with `circuits * capacity` jugglers, each ranking
/// between 1 and `max_prefs` distinct circuits.
fn generate_registry(seed: u64, circuits: usize, capacity: usize, max_prefs: usize) -> Registry {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut registry = Registry::new();

    for c in 0..circuits {
        let aspect = Aspect::new(
            rng.gen_range(0..11) as f64,
            rng.gen_range(0..11) as f64,
            rng.gen_range(0..11) as f64,
        );
        registry.add_circuit(Circuit::new(format!("C{c}"), aspect)).unwrap();
    }

    let ids: Vec<CircuitId> = registry.circuit_ids().collect();
    for j in 0..circuits * capacity {
        let aspect = Aspect::new(
            rng.gen_range(0..11) as f64,
            rng.gen_range(0..11) as f64,
            rng.gen_range(0..11) as f64,
        );
        let count = rng.gen_range(1..=max_prefs.min(circuits));
        let prefs = ids.choose_multiple(&mut rng, count).copied().collect();
        registry
            .add_juggler(Juggler::new(format!("J{j}"), aspect, prefs))
            .unwrap();
    }
    registry
}

fn solved(registry: Registry) -> MatchingEngine {
    let mut engine = MatchingEngine::new(registry);
    engine.run().expect("Evenly divisible input must be assignable");
    engine
}

/// Independent stability check straight from the definition.
fn assert_stable(engine: &MatchingEngine) {
    let registry = engine.registry();
    let seats = engine.assignment();

    for j in registry.juggler_ids() {
        let assigned = seats[j.index()].expect("Every juggler must be seated");
        let juggler = registry.juggler(j);

        for &preferred in juggler.preferences() {
            if preferred == assigned {
                break;
            }
            let worst = engine
                .team(preferred)
                .iter()
                .map(|s| s.score)
                .fold(f64::INFINITY, f64::min);
            let score = registry.score(preferred, j);
            assert!(
                score <= worst,
                "{} scores {} on {} but its worst member only scores {}",
                juggler.name,
                score,
                registry.circuit(preferred).name,
                worst
            );
        }
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[test]
fn test_conservation() {
    for seed in 0..20 {
        let engine = solved(generate_registry(seed, 8, 6, 4));
        let registry = engine.registry();

        let mut seen = vec![0u32; registry.juggler_count()];
        for team in engine.teams() {
            assert_eq!(team.size(), 6, "Seed {}: team {:?} not exactly full", seed, team.circuit());
            for seat in team.iter() {
                seen[seat.juggler.index()] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1), "Seed {}: juggler seated twice or never", seed);
    }
}

#[test]
fn test_stability_random() {
    for seed in 0..50 {
        let engine = solved(generate_registry(seed, 10, 5, 10));
        assert_stable(&engine);
        assert!(engine.blocking_pairs().is_empty(), "Seed {}", seed);
    }
}

#[test]
fn test_stability_with_short_preference_lists() {
    // Many jugglers exhaust their lists and land in the fallback pool
    for seed in 100..130 {
        let engine = solved(generate_registry(seed, 12, 4, 2));
        assert_stable(&engine);
        assert!(engine.blocking_pairs().is_empty(), "Seed {}", seed);
    }
}

#[test]
fn test_operation_bound() {
    for seed in 0..30 {
        let registry = generate_registry(seed, 6, 7, 6);
        let bound = (registry.total_preferences() + registry.juggler_count()) as u64;

        let engine = solved(registry);
        let stats = engine.stats();
        assert!(
            stats.operations() <= bound,
            "Seed {}: {} operations exceeds bound {}",
            seed,
            stats.operations(),
            bound
        );
        assert_eq!(stats.offers, stats.evictions + stats.rejections);
    }
}

#[test]
fn test_cursor_monotonic_and_global_invariant() {
    let mut engine = MatchingEngine::new(generate_registry(7, 5, 8, 5));
    let total = engine.registry().juggler_count();
    let mut cursors: Vec<usize> = engine
        .registry()
        .juggler_ids()
        .map(|j| engine.registry().juggler(j).cursor())
        .collect();

    while engine.step().unwrap() {
        let seated: usize = engine.teams().iter().map(|t| t.size()).sum();
        assert_eq!(engine.pending() + seated, total, "Queue + rosters must cover everyone");

        for j in engine.registry().juggler_ids() {
            let juggler = engine.registry().juggler(j);
            assert!(juggler.cursor() >= cursors[j.index()], "Cursor moved backwards");
            assert!(juggler.cursor() <= juggler.preferences().len());
            cursors[j.index()] = juggler.cursor();
        }
    }
    assert_eq!(engine.pending(), 0);
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_non_conflicting() {
    let mut registry = Registry::new();
    let c0 = registry.add_circuit(Circuit::new("C0", Aspect::new(1.0, 0.0, 0.0))).unwrap();
    let c1 = registry.add_circuit(Circuit::new("C1", Aspect::new(0.0, 1.0, 0.0))).unwrap();
    for (name, aspect, prefs) in [
        ("J0", Aspect::new(10.0, 1.0, 0.0), vec![c0, c1]),
        ("J1", Aspect::new(9.0, 1.0, 0.0), vec![c0, c1]),
        ("J2", Aspect::new(1.0, 10.0, 0.0), vec![c1, c0]),
        ("J3", Aspect::new(1.0, 9.0, 0.0), vec![c1, c0]),
    ] {
        registry.add_juggler(Juggler::new(name, aspect, prefs)).unwrap();
    }

    let engine = solved(registry);
    let seats = engine.assignment();
    assert_eq!(seats, vec![Some(c0), Some(c0), Some(c1), Some(c1)]);
}

#[test]
fn test_scenario_eviction_either_order() {
    // Same problem declared in both orders: the stronger juggler keeps C0
    for flip in [false, true] {
        let mut registry = Registry::new();
        let c0 = registry.add_circuit(Circuit::new("C0", Aspect::new(1.0, 0.0, 0.0))).unwrap();
        let c1 = registry.add_circuit(Circuit::new("C1", Aspect::new(0.0, 1.0, 0.0))).unwrap();

        let mut jugglers = vec![
            ("J0", Aspect::new(10.0, 0.0, 0.0)),
            ("J1", Aspect::new(20.0, 0.0, 0.0)),
        ];
        if flip {
            jugglers.reverse();
        }
        for (name, aspect) in jugglers {
            registry.add_juggler(Juggler::new(name, aspect, vec![c0, c1])).unwrap();
        }

        let engine = solved(registry);
        let registry = engine.registry();
        let strong = registry.juggler_id("J1").unwrap();
        let weak = registry.juggler_id("J0").unwrap();

        assert!(engine.team(c0).contains(strong), "flip={}", flip);
        assert!(engine.team(c1).contains(weak), "flip={}", flip);
        // The weaker juggler moved on to its second preference
        assert_eq!(registry.juggler(weak).cursor(), 2);
    }
}

#[test]
fn test_scenario_equal_scores_first_come_keeps_seat() {
    let mut registry = Registry::new();
    let c0 = registry.add_circuit(Circuit::new("C0", Aspect::new(1.0, 1.0, 1.0))).unwrap();
    let c1 = registry.add_circuit(Circuit::new("C1", Aspect::new(1.0, 1.0, 1.0))).unwrap();
    registry.add_juggler(Juggler::new("J0", Aspect::new(2.0, 2.0, 2.0), vec![c0, c1])).unwrap();
    registry.add_juggler(Juggler::new("J1", Aspect::new(2.0, 2.0, 2.0), vec![c0, c1])).unwrap();

    let engine = solved(registry);
    assert!(engine.team(c0).contains(JugglerId(0)));
    assert!(engine.team(c1).contains(JugglerId(1)));
    assert_eq!(engine.stats().rejections, 1);
    assert_eq!(engine.stats().evictions, 0);
}
