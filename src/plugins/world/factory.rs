//! Entity factories.
//!
//! Each factory spawns the complete component set an entity needs to be
//! processed correctly from the very next frame, and queues its group
//! membership. Nothing else in the crate spawns gameplay entities.

use std::f32::consts::TAU;

use bevy::color::Srgba;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::groups::{BOSS_FORMATION, Group, GroupCommandsExt, Tag};
use crate::common::rng::GameRng;
use crate::common::state::GameState;
use crate::common::tunables::{ARENA_HEIGHT, ARENA_WIDTH, POWERUP_BORDER};
use crate::plugins::aliens::{self, Alien, Health};
use crate::plugins::animation::{
    AnimationParameters, ColorAnimation, GameSprite, PlayMode, ScaleAnimation, SpriteLayer,
};
use crate::plugins::audio::{SoundKey, play_sound};
use crate::plugins::coins::{self, Coin, CoinType};
use crate::plugins::collision::{CircleBounds, RectangleBounds};
use crate::plugins::lifecycle::ExpiringEntity;
use crate::plugins::movement::{BasePosition, OffScreenRemove, Position, StayOnScreen, Velocity};
use crate::plugins::path::{AttackPathMovement, PathFunctionId, PathMovement};
use crate::plugins::player::{self, Player};

const EXPLOSION_COLOR: Srgba = Srgba::new(1.0, 216.0 / 255.0, 0.0, 0.5);
const PARTICLE_COLOR: Srgba = Srgba::new(1.0, 216.0 / 255.0, 0.0, 1.0);
const PARTICLE_MAX_SPEED: f32 = 400.0;
const PLAYER_RADIUS: f32 = 16.0;

fn scoped() -> DespawnOnExit<GameState> {
    DespawnOnExit(GameState::InGame)
}

pub fn background(commands: &mut Commands) -> Entity {
    commands
        .spawn((
            Name::new("Background"),
            Position(Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0)),
            GameSprite::new("background", SpriteLayer::Background).with_scale(1.25),
            scoped(),
        ))
        .id()
}

/// The player ship. Holds the `Player` tag and joins the `Player` group.
pub fn player(commands: &mut Commands) -> Entity {
    let e = commands
        .spawn((
            Name::new("Player"),
            Player::default(),
            Position(Vec2::ZERO),
            Velocity(Vec2::ZERO),
            GameSprite::new(player::SPRITE_NAME, SpriteLayer::Actors),
            CircleBounds {
                radius: PLAYER_RADIUS,
            },
            StayOnScreen {
                half_size: Vec2::splat(PLAYER_RADIUS),
            },
            scoped(),
        ))
        .id();
    commands.join_group(e, Group::Player);
    commands.tag_entity(e, Tag::Player);
    e
}

pub fn player_shot(commands: &mut Commands, at: Vec2, speed: f32) -> Entity {
    let e = commands
        .spawn((
            Position(at),
            Velocity(Vec2::new(0.0, speed)),
            GameSprite::new("playerShot", SpriteLayer::Effects),
            RectangleBounds {
                width: 10.0,
                height: 45.0,
            },
            OffScreenRemove,
            scoped(),
        ))
        .id();
    commands.join_group(e, Group::PlayerShots);
    play_sound(commands, SoundKey::PlayerShot);
    e
}

/// A regular alien anchored at `at`, member of attack formation `formation`.
pub fn alien(commands: &mut Commands, at: Vec2, formation: u32) -> Entity {
    let e = commands
        .spawn((
            Name::new("Alien"),
            Alien,
            BasePosition(at),
            Position(at),
            PathMovement::default(),
            GameSprite::new(aliens::SPRITE_NAME, SpriteLayer::Actors),
            CircleBounds { radius: 14.0 },
            scoped(),
        ))
        .id();
    commands.join_group(e, Group::Aliens);
    commands.join_group(e, Group::AttackFormation(formation));
    e
}

pub fn alien_boss(commands: &mut Commands, at: Vec2, health: i32, attack: PathFunctionId) -> Entity {
    let e = commands
        .spawn((
            Name::new("AlienBoss"),
            Alien,
            Health::new(health),
            BasePosition(at),
            Position(at),
            PathMovement::default(),
            AttackPathMovement(attack),
            GameSprite::new(aliens::SPRITE_NAME_BOSS, SpriteLayer::Actors),
            CircleBounds { radius: 62.0 },
            scoped(),
        ))
        .id();
    commands.join_group(e, Group::Aliens);
    commands.join_group(e, Group::AttackFormation(BOSS_FORMATION));
    e
}

pub fn alien_shot(commands: &mut Commands, at: Vec2, speed: f32) -> Entity {
    let e = commands
        .spawn((
            Position(at),
            Velocity(Vec2::new(0.0, -speed)),
            GameSprite::new("alienShot", SpriteLayer::Effects),
            RectangleBounds {
                width: 2.0,
                height: 10.0,
            },
            OffScreenRemove,
            scoped(),
        ))
        .id();
    commands.join_group(e, Group::AlienShots);
    play_sound(commands, SoundKey::AlienShot);
    e
}

/// One shot plus up to two scattered extras (66% and 33%).
pub fn alien_multi_shot(commands: &mut Commands, rng: &mut GameRng, at: Vec2, speed: f32) {
    alien_shot(commands, at, speed);
    for p in [0.66, 0.33] {
        if rng.chance(p) {
            let dx = rng.sign() * rng.range(10.0, 20.0);
            let dy = rng.range(-10.0, 10.0);
            alien_shot(commands, at + Vec2::new(dx, dy), speed);
        }
    }
}

fn explosion(commands: &mut Commands, at: Vec2, scale: f32) -> Entity {
    commands
        .spawn((
            Position(at),
            GameSprite::new("explosion", SpriteLayer::Effects)
                .with_color(EXPLOSION_COLOR)
                .with_scale(scale),
            AnimationParameters::new(0.5 / 3.0, PlayMode::Once),
            ScaleAnimation {
                active: true,
                min: scale / 100.0,
                max: scale,
                speed: 1.0,
            },
            ExpiringEntity::after(0.5),
            scoped(),
        ))
        .id()
}

fn burst(commands: &mut Commands, rng: &mut GameRng, at: Vec2, scale: f32, particles: usize) -> Entity {
    let e = explosion(commands, at, scale);
    for _ in 0..particles {
        particle(commands, rng, at);
    }
    e
}

pub fn player_explosion(commands: &mut Commands, rng: &mut GameRng, at: Vec2) -> Entity {
    play_sound(commands, SoundKey::PlayerExplosion);
    burst(commands, rng, at, 10.0, 50)
}

pub fn alien_explosion(commands: &mut Commands, rng: &mut GameRng, at: Vec2) -> Entity {
    play_sound(commands, SoundKey::AlienExplosion);
    burst(commands, rng, at, 1.5, 10)
}

pub fn alien_boss_explosion(commands: &mut Commands, rng: &mut GameRng, at: Vec2) -> Entity {
    play_sound(commands, SoundKey::AlienBossExplosion);
    burst(commands, rng, at, 10.0, 50)
}

/// Spark flying off in a random direction, fading out over one second.
pub fn particle(commands: &mut Commands, rng: &mut GameRng, at: Vec2) -> Entity {
    let angle = rng.range(0.0, TAU);
    let speed = rng.range(0.0, PARTICLE_MAX_SPEED);
    let scale = rng.range(0.5, 1.0);

    commands
        .spawn((
            Position(at),
            Velocity(Vec2::from_angle(angle) * speed),
            GameSprite::new("particle", SpriteLayer::Effects)
                .with_color(PARTICLE_COLOR)
                .with_scale(scale),
            ColorAnimation::fade_out(1.0),
            ExpiringEntity::after(1.0),
            OffScreenRemove,
            scoped(),
        ))
        .id()
}

/// A falling power-up at a random x along the top edge.
pub fn coin(commands: &mut Commands, rng: &mut GameRng, kind: CoinType, speed: f32) -> Entity {
    let x = rng.range(POWERUP_BORDER, ARENA_WIDTH - POWERUP_BORDER);
    let e = commands
        .spawn((
            Name::new("Coin"),
            Coin(kind),
            Position(Vec2::new(x, ARENA_HEIGHT)),
            Velocity(Vec2::new(0.0, -speed)),
            GameSprite::new(coins::SPRITE_NAME, SpriteLayer::Effects)
                .with_color(kind.color())
                .with_scale(0.75),
            AnimationParameters::new(0.1, PlayMode::Loop),
            CircleBounds { radius: 16.0 },
            OffScreenRemove,
            scoped(),
        ))
        .id();
    commands.join_group(e, Group::Coins);
    e
}
