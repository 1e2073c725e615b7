use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::*;
use crate::common::test_utils::{gameplay_world, run_system_once, set_delta, sounds};
use crate::plugins::audio::PlaySound;
use crate::plugins::lifecycle::expire_components;
use crate::plugins::path::PathFunctionId;

// -----------------------------------------------------------------------------
// Harness
// -----------------------------------------------------------------------------

fn spawn<F>(world: &mut World, f: F) -> Entity
where
    F: FnOnce(&mut Commands, &mut GameRng) -> Entity + Send + Sync + 'static,
{
    let mut f = Some(f);
    run_system_once(world, move |mut commands: Commands, mut rng: ResMut<GameRng>| {
        let f = f.take().expect("spawn closure reused");
        f(&mut commands, &mut rng)
    })
}

fn spawn_player(world: &mut World, at: Vec2) -> Entity {
    let player = spawn(world, |c, _| factory::player(c));
    world.get_mut::<Position>(player).unwrap().0 = at;
    player
}

fn collide(world: &mut World) {
    run_system_once(world, resolve_collisions);
}

fn events(world: &World, id: EventId) -> usize {
    world
        .resource::<EventBus>()
        .queued()
        .filter(|e| e.id == id)
        .count()
}

fn score(world: &World, player: Entity) -> u32 {
    world.get::<Player>(player).unwrap().score
}

fn alive(world: &World, e: Entity) -> bool {
    world.get_entity(e).is_ok()
}

// -----------------------------------------------------------------------------
// Overlap tests
// -----------------------------------------------------------------------------

#[test]
fn circle_circle_matches_reference_distance() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut checked = 0;

    for _ in 0..5_000 {
        let c1 = Vec2::new(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0));
        let c2 = Vec2::new(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0));
        let r1 = rng.gen_range(0.0..60.0f32);
        let r2 = rng.gen_range(0.0..60.0f32);

        let d = ((c1.x - c2.x).powi(2) + (c1.y - c2.y).powi(2)).sqrt();
        // Ignore float ties right on the boundary.
        if (d - (r1 + r2)).abs() < 1e-3 {
            continue;
        }
        assert_eq!(circles_overlap(c1, r1, c2, r2), d <= r1 + r2, "{c1} {r1} {c2} {r2}");
        checked += 1;
    }
    assert!(checked > 4_900);
}

#[test]
fn touching_shapes_overlap() {
    assert!(circles_overlap(Vec2::ZERO, 1.0, Vec2::new(3.0, 0.0), 2.0));
    assert!(circle_rect_overlap(
        Vec2::new(0.0, 5.0),
        1.0,
        Rect::from_center_size(Vec2::new(0.0, 2.0), Vec2::new(4.0, 4.0))
    ));
    assert!(rects_overlap(
        Rect::new(0.0, 0.0, 1.0, 1.0),
        Rect::new(1.0, 1.0, 2.0, 2.0)
    ));
}

#[test]
fn circle_rect_uses_nearest_point() {
    let rect = Rect::from_center_size(Vec2::ZERO, Vec2::new(10.0, 45.0));
    // Diagonal corner distance is sqrt(2) * 3 > 4.
    assert!(!circle_rect_overlap(Vec2::new(8.0, 25.5), 4.0, rect));
    assert!(circle_rect_overlap(Vec2::new(8.0, 0.0), 4.0, rect));
    assert_eq!(
        Bounds::Rect(rect).overlaps(Bounds::Circle(Vec2::new(8.0, 0.0), 4.0)),
        Bounds::Circle(Vec2::new(8.0, 0.0), 4.0).overlaps(Bounds::Rect(rect))
    );
}

#[test]
fn missing_bounds_never_match() {
    let mut world = gameplay_world();
    let player = spawn_player(&mut world, Vec2::new(400.0, 48.0));
    let alien = spawn(&mut world, |c, _| factory::alien(c, Vec2::new(400.0, 48.0), 1));
    world.entity_mut(alien).remove::<CircleBounds>();

    collide(&mut world);

    assert!(alive(&world, alien));
    assert!(alive(&world, player));
    assert_eq!(world.resource::<EventBus>().pending(), 0);
}

// -----------------------------------------------------------------------------
// Rules
// -----------------------------------------------------------------------------

#[test]
fn boss_takes_ten_hits_and_dies_once() {
    let mut world = gameplay_world();
    let player = spawn_player(&mut world, Vec2::new(20.0, 20.0));
    let boss_at = Vec2::new(400.0, 320.0);
    let boss = spawn(&mut world, move |c, _| {
        factory::alien_boss(c, boss_at, 10, PathFunctionId::BossAttack)
    });

    for hit in 1..=9 {
        spawn(&mut world, move |c, _| factory::player_shot(c, boss_at, 800.0));
        collide(&mut world);
        assert_eq!(world.get::<Health>(boss).unwrap().hp, 10 - hit);
        assert_eq!(score(&world, player), 25 * hit as u32);
    }
    assert_eq!(events(&world, EventId::CheckIsLevelClear), 0);

    spawn(&mut world, move |c, _| factory::player_shot(c, boss_at, 800.0));
    collide(&mut world);

    assert_eq!(score(&world, player), 325);
    assert!(!alive(&world, boss));
    assert!(world.resource::<Groups>().is_empty(Group::Aliens));
    assert_eq!(events(&world, EventId::CheckIsLevelClear), 1);
    assert!(world.resource::<Groups>().is_empty(Group::PlayerShots));
}

#[test]
fn surviving_boss_hit_plays_hit_sound() {
    let mut world = gameplay_world();
    spawn_player(&mut world, Vec2::new(20.0, 20.0));
    let at = Vec2::new(400.0, 320.0);
    spawn(&mut world, move |c, _| factory::alien_boss(c, at, 10, PathFunctionId::BossAttack));
    spawn(&mut world, move |c, _| factory::player_shot(c, at, 800.0));
    // Drop the shot sound.
    world.resource_mut::<bevy::ecs::message::Messages<PlaySound>>().clear();

    collide(&mut world);

    assert_eq!(sounds(&mut world), vec![PlaySound(SoundKey::AlienBossHit)]);
}

#[test]
fn two_shots_on_a_dying_boss_kill_it_once() {
    let mut world = gameplay_world();
    let player = spawn_player(&mut world, Vec2::new(20.0, 20.0));
    let at = Vec2::new(400.0, 320.0);
    let boss = spawn(&mut world, move |c, _| {
        factory::alien_boss(c, at, 1, PathFunctionId::BossAttack)
    });
    spawn(&mut world, move |c, _| factory::player_shot(c, at + Vec2::X, 800.0));
    spawn(&mut world, move |c, _| factory::player_shot(c, at, 800.0));

    collide(&mut world);

    assert!(!alive(&world, boss));
    assert_eq!(score(&world, player), 100);
    assert_eq!(events(&world, EventId::CheckIsLevelClear), 1);
    // Only the first shot was spent.
    assert_eq!(world.resource::<Groups>().members(Group::PlayerShots).len(), 1);
}

#[test]
fn attacking_alien_pays_bonus() {
    let mut world = gameplay_world();
    let player = spawn_player(&mut world, Vec2::new(20.0, 20.0));
    let at = Vec2::new(200.0, 300.0);
    let alien = spawn(&mut world, move |c, _| factory::alien(c, at, 3));
    world
        .entity_mut(alien)
        .insert(IsAttacking::for_seconds(3.0));
    spawn(&mut world, move |c, _| factory::player_shot(c, at, 800.0));

    collide(&mut world);

    assert_eq!(score(&world, player), 50);
    assert!(!alive(&world, alien));
}

#[test]
fn shots_cancel_each_other() {
    let mut world = gameplay_world();
    spawn_player(&mut world, Vec2::new(20.0, 20.0));
    let at = Vec2::new(300.0, 200.0);
    let mine = spawn(&mut world, move |c, _| factory::player_shot(c, at, 800.0));
    let theirs = spawn(&mut world, move |c, _| factory::alien_shot(c, at, 400.0));

    collide(&mut world);

    assert!(alive(&world, mine));
    assert!(!alive(&world, theirs));
    let particles = world
        .query::<&GameSprite>()
        .iter(&world)
        .filter(|s| s.name == "particle")
        .count();
    assert_eq!(particles, 10);
}

#[test]
fn ramming_kills_alien_and_player() {
    let mut world = gameplay_world();
    let at = Vec2::new(400.0, 48.0);
    let player = spawn_player(&mut world, at);
    let alien = spawn(&mut world, move |c, _| factory::alien(c, at + Vec2::X * 10.0, 2));

    collide(&mut world);

    assert!(!alive(&world, alien));
    assert_eq!(score(&world, player), 25);
    assert_eq!(events(&world, EventId::CheckIsLevelClear), 1);
    assert_eq!(events(&world, EventId::PlayerKilled), 1);
    // The player entity itself survives; the director handles the death.
    assert!(alive(&world, player));
}

#[test]
fn player_dies_once_per_frame() {
    let mut world = gameplay_world();
    let at = Vec2::new(400.0, 48.0);
    spawn_player(&mut world, at);
    spawn(&mut world, move |c, _| factory::alien(c, at, 2));
    spawn(&mut world, move |c, _| factory::alien_shot(c, at, 400.0));
    spawn(&mut world, move |c, _| factory::alien_shot(c, at + Vec2::Y, 400.0));

    collide(&mut world);

    assert_eq!(events(&world, EventId::PlayerKilled), 1);
}

#[test]
fn shield_blocks_every_lethal_contact() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    for _ in 0..25 {
        let mut world = gameplay_world();
        let at = Vec2::new(rng.gen_range(16.0..784.0), rng.gen_range(16.0..200.0));
        let player = spawn_player(&mut world, at);
        world
            .entity_mut(player)
            .insert(Shield(Expiry::after(5.0)));

        let aliens = rng.gen_range(0..3);
        let bosses = rng.gen_range(0..2);
        let shots = rng.gen_range(0..4);
        for _ in 0..aliens {
            let off = Vec2::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));
            spawn(&mut world, move |c, _| factory::alien(c, at + off, 1));
        }
        for _ in 0..bosses {
            let off = Vec2::new(rng.gen_range(-30.0..30.0), rng.gen_range(-30.0..30.0));
            spawn(&mut world, move |c, _| {
                factory::alien_boss(c, at + off, 2, PathFunctionId::BossAttack)
            });
        }
        for _ in 0..shots {
            let off = Vec2::new(rng.gen_range(-8.0..8.0), rng.gen_range(-8.0..8.0));
            spawn(&mut world, move |c, _| factory::alien_shot(c, at + off, 400.0));
        }

        collide(&mut world);

        assert!(alive(&world, player));
        assert_eq!(events(&world, EventId::PlayerKilled), 0);
        assert!(world.resource::<Groups>().is_empty(Group::AlienShots));
    }
}

#[test]
fn shield_coin_swaps_sprite_until_expiry() {
    let mut world = gameplay_world();
    let at = Vec2::new(400.0, 48.0);
    let player = spawn_player(&mut world, at);
    let coin = spawn(&mut world, |c, rng| factory::coin(c, rng, CoinType::Shield, 100.0));
    world.get_mut::<Position>(coin).unwrap().0 = at;

    collide(&mut world);

    assert!(!alive(&world, coin));
    assert_eq!(sounds(&mut world), vec![PlaySound(SoundKey::Boing)]);
    assert_eq!(
        world.get::<GameSprite>(player).unwrap().name,
        player::SPRITE_NAME_SHIELD
    );
    assert!(world.get::<Shield>(player).is_some());

    for _ in 0..4 {
        set_delta(&mut world, 1.0);
        run_system_once(&mut world, expire_components::<Shield>);
        assert_eq!(
            world.get::<GameSprite>(player).unwrap().name,
            player::SPRITE_NAME_SHIELD
        );
    }
    set_delta(&mut world, 1.0);
    run_system_once(&mut world, expire_components::<Shield>);

    assert!(world.get::<Shield>(player).is_none());
    assert_eq!(world.get::<GameSprite>(player).unwrap().name, player::SPRITE_NAME);
}

#[test]
fn extra_life_and_double_shot_coins() {
    let mut world = gameplay_world();
    let at = Vec2::new(400.0, 48.0);
    let player = spawn_player(&mut world, at);

    for kind in [CoinType::ExtraLife, CoinType::DoubleShot] {
        let coin = spawn(&mut world, move |c, rng| factory::coin(c, rng, kind, 100.0));
        world.get_mut::<Position>(coin).unwrap().0 = at;
        collide(&mut world);
    }

    assert_eq!(world.get::<Player>(player).unwrap().lives, 6);
    let double = world.get::<DoubleShot>(player).expect("double shot buff");
    assert_eq!(double.0.remaining, 5.0);
}
