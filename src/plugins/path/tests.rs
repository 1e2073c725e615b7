use approx::assert_relative_eq;
use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::*;
use crate::common::test_utils::{FRAME, gameplay_world, run_system_once, set_delta};

fn world() -> World {
    let mut world = gameplay_world();
    world.init_resource::<PathRegistry>();
    world
}

fn spawn_mover(world: &mut World, base: Vec2, function: PathFunctionId) -> Entity {
    world
        .spawn((
            BasePosition(base),
            Position(base),
            PathMovement {
                function,
                phase: 0.0,
            },
        ))
        .id()
}

fn step(world: &mut World, dt: f32) {
    set_delta(world, dt);
    run_system_once(world, move_along_paths);
}

// -----------------------------------------------------------------------------
// Pure helpers
// -----------------------------------------------------------------------------

#[test]
fn blend_endpoints_match_source_functions() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for _ in 0..200 {
        let phase = rng.gen_range(0.0..TAU);
        let old = default_movement(phase);
        let new = default_attack(phase);

        assert_relative_eq!(blend(old, new, 0.0).x, old.x);
        assert_relative_eq!(blend(old, new, 0.0).y, old.y);
        assert_relative_eq!(blend(old, new, 1.0).x, new.x, epsilon = 1e-4);
        assert_relative_eq!(blend(old, new, 1.0).y, new.y, epsilon = 1e-4);

        let t = rng.gen_range(0.0..1.0f32);
        let mid = blend(old, new, t);
        assert_relative_eq!(mid.x, old.x + (new.x - old.x) * t, epsilon = 1e-3);
        assert_relative_eq!(mid.y, old.y + (new.y - old.y) * t, epsilon = 1e-3);
    }
}

#[test]
fn phase_wraps_into_one_turn() {
    let p = advance_phase(TAU - 0.01, 0.5);
    assert!((0.0..TAU).contains(&p));
    assert_relative_eq!(p, 0.99, epsilon = 1e-5);
    assert_relative_eq!(advance_phase(1.0, 0.25), 1.5);
}

#[test]
fn registry_knows_every_builtin_function() {
    let registry = PathRegistry::default();
    for id in [
        PathFunctionId::DefaultMovement,
        PathFunctionId::DefaultAttack,
        PathFunctionId::BossAttack,
        PathFunctionId::TwoBossesAttack,
    ] {
        assert!(registry.get(id).is_some(), "{id:?} missing");
    }
    assert_eq!(
        registry.offset(PathFunctionId::DefaultMovement, 0.0),
        Some(Vec2::ZERO)
    );
}

// -----------------------------------------------------------------------------
// System
// -----------------------------------------------------------------------------

#[test]
fn position_is_recomputed_from_base_without_drift() {
    let mut world = world();
    let base = Vec2::new(130.0, 300.0);
    let e = spawn_mover(&mut world, base, PathFunctionId::DefaultAttack);

    for _ in 0..1_000 {
        step(&mut world, FRAME);

        let path = *world.get::<PathMovement>(e).unwrap();
        let pos = world.get::<Position>(e).unwrap().0;
        let expected = base + default_attack(path.phase);
        assert_eq!(pos, expected);
        assert!((0.0..TAU).contains(&path.phase));
    }
}

#[test]
fn transition_blends_then_finalizes() {
    let mut world = world();
    let base = Vec2::new(400.0, 300.0);
    let e = spawn_mover(&mut world, base, PathFunctionId::DefaultMovement);
    world
        .entity_mut(e)
        .insert(TransitionToNewPathMovement::to(PathFunctionId::DefaultAttack));

    // First blended frame uses factor 0: pure old function.
    step(&mut world, 0.125);
    let phase = world.get::<PathMovement>(e).unwrap().phase;
    assert_eq!(world.get::<Position>(e).unwrap().0, base + default_movement(phase));
    assert_relative_eq!(
        world.get::<TransitionToNewPathMovement>(e).unwrap().factor,
        0.125
    );

    for _ in 0..7 {
        step(&mut world, 0.125);
    }

    assert!(world.get::<TransitionToNewPathMovement>(e).is_none());
    assert_eq!(
        world.get::<PathMovement>(e).unwrap().function,
        PathFunctionId::DefaultAttack
    );

    step(&mut world, 0.125);
    let phase = world.get::<PathMovement>(e).unwrap().phase;
    assert_eq!(world.get::<Position>(e).unwrap().0, base + default_attack(phase));
}

#[test]
fn blend_is_continuous_across_the_swap() {
    let mut world = world();
    let base = Vec2::new(400.0, 300.0);
    let e = spawn_mover(&mut world, base, PathFunctionId::DefaultMovement);
    world
        .entity_mut(e)
        .insert(TransitionToNewPathMovement::to(PathFunctionId::DefaultAttack));

    let mut last = base;
    for _ in 0..120 {
        step(&mut world, FRAME);
        let pos = world.get::<Position>(e).unwrap().0;
        // Path speed plus blend speed stays under 17 units per frame here.
        assert!(pos.distance(last) < 25.0, "snap from {last} to {pos}");
        last = pos;
    }
}

#[test]
fn unknown_function_leaves_entity_in_place() {
    let mut world = gameplay_world();
    world.insert_resource(PathRegistry::empty());
    let base = Vec2::new(50.0, 60.0);
    let e = spawn_mover(&mut world, base, PathFunctionId::BossAttack);
    world.get_mut::<Position>(e).unwrap().0 = Vec2::new(1.0, 2.0);

    step(&mut world, FRAME);

    assert_eq!(world.get::<Position>(e).unwrap().0, Vec2::new(1.0, 2.0));
}
