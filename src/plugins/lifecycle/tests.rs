use bevy::prelude::*;

use super::*;
use crate::common::groups::{Group, Groups};
use crate::common::test_utils::{gameplay_world, run_system_once, set_delta};
use crate::plugins::animation::SpriteLayer;
use crate::plugins::movement::{BasePosition, Position};

#[derive(Component)]
struct Glow(Expiry);

impl ExpiringComponent for Glow {
    fn expiry(&self) -> &Expiry {
        &self.0
    }
    fn expiry_mut(&mut self) -> &mut Expiry {
        &mut self.0
    }
}

#[derive(Component)]
struct Bystander;

#[test]
fn expiry_ticks_down_and_reports_zero_crossing() {
    let mut expiry = Expiry::after(0.5);
    assert!(!expiry.tick(0.25));
    assert!(expiry.tick(0.25));
}

#[test]
fn expiring_entity_is_destroyed_and_forgotten() {
    let mut world = gameplay_world();
    let e = world.spawn(ExpiringEntity::after(0.5)).id();
    world.resource_mut::<Groups>().join(e, Group::Coins);

    set_delta(&mut world, 0.3);
    run_system_once(&mut world, expire_entities);
    assert!(world.get_entity(e).is_ok());

    set_delta(&mut world, 0.3);
    run_system_once(&mut world, expire_entities);
    assert!(world.get_entity(e).is_err());
    assert!(world.resource::<Groups>().is_empty(Group::Coins));
}

#[test]
fn expiring_component_detaches_only_itself() {
    let mut world = gameplay_world();
    let e = world.spawn((Glow(Expiry::after(0.2)), Bystander)).id();

    set_delta(&mut world, 0.25);
    run_system_once(&mut world, expire_components::<Glow>);

    assert!(world.get::<Glow>(e).is_none());
    assert!(world.get::<Bystander>(e).is_some());
}

#[test]
fn expiry_action_runs_once() {
    let mut world = gameplay_world();
    let e = world
        .spawn((
            GameSprite::new("playershield", SpriteLayer::Actors),
            Glow(Expiry::after(0.1).then(ExpiryAction::RestoreSprite("player"))),
        ))
        .id();

    set_delta(&mut world, 0.2);
    run_system_once(&mut world, expire_components::<Glow>);
    assert_eq!(world.get::<GameSprite>(e).unwrap().name, "player");

    // Component is gone, so a later rename must survive further ticks.
    world.get_mut::<GameSprite>(e).unwrap().name = "other";
    run_system_once(&mut world, expire_components::<Glow>);
    assert_eq!(world.get::<GameSprite>(e).unwrap().name, "other");
}

#[test]
fn return_to_default_path_starts_transition() {
    let mut world = gameplay_world();
    let e = world
        .spawn((
            BasePosition(Vec2::ZERO),
            Position(Vec2::ZERO),
            PathMovement {
                function: PathFunctionId::DefaultAttack,
                phase: 1.0,
            },
            Glow(Expiry::after(0.0).then(ExpiryAction::ReturnToDefaultPath)),
        ))
        .id();

    run_system_once(&mut world, expire_components::<Glow>);

    assert_eq!(
        world.get::<TransitionToNewPathMovement>(e).copied(),
        Some(TransitionToNewPathMovement::to(PathFunctionId::DefaultMovement))
    );
}

#[test]
fn action_on_missing_entity_is_ignored() {
    let mut world = World::new();
    let e = world.spawn_empty().id();
    world.despawn(e);

    ExpiryAction::ReturnToDefaultPath.apply(&mut world, e);
}
