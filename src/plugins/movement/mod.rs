//! Arena-space kinematics and screen bounds.
//!
//! The playfield is a fixed `ARENA_WIDTH x ARENA_HEIGHT` rectangle with the
//! origin at its bottom-left corner. All gameplay positions live in that
//! space; only the renderer converts them to Bevy world coordinates.

use bevy::prelude::*;

use crate::common::groups::GroupCommandsExt;
use crate::common::tunables::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::plugins::core::FrameSet;

#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Position(pub Vec2);

/// Anchor that path functions are evaluated against.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct BasePosition(pub Vec2);

#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity(pub Vec2);

/// Keep the entity inside the arena, inset by `half_size`.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct StayOnScreen {
    pub half_size: Vec2,
}

/// Despawn once the entity leaves the removal window around the arena.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct OffScreenRemove;

pub fn plugin(app: &mut App) {
    app.add_systems(Update, integrate_velocity.in_set(FrameSet::Movement));
    app.add_systems(
        Update,
        (stay_on_screen, remove_off_screen).in_set(FrameSet::Bounds),
    );
}

pub fn integrate_velocity(time: Res<Time>, mut q: Query<(&mut Position, &Velocity)>) {
    let dt = time.delta_secs();
    for (mut pos, vel) in &mut q {
        pos.0 += vel.0 * dt;
    }
}

pub fn stay_on_screen(mut q: Query<(&mut Position, &StayOnScreen, Option<&mut Velocity>)>) {
    for (mut pos, stay, vel) in &mut q {
        let old = pos.0;
        let min = stay.half_size;
        let max = Vec2::new(ARENA_WIDTH, ARENA_HEIGHT) - stay.half_size;
        pos.0 = pos.0.clamp(min, max);

        // A border hit kills the velocity on that axis.
        if let Some(mut vel) = vel {
            if pos.0.x != old.x {
                vel.0.x = 0.0;
            }
            if pos.0.y != old.y {
                vel.0.y = 0.0;
            }
        }
    }
}

#[inline]
pub fn is_off_screen(p: Vec2) -> bool {
    p.x + ARENA_WIDTH < 0.0 || p.x > ARENA_WIDTH || p.y + ARENA_HEIGHT < 0.0 || p.y > ARENA_HEIGHT
}

pub fn remove_off_screen(
    mut commands: Commands,
    q: Query<(Entity, &Position), With<OffScreenRemove>>,
) {
    for (entity, pos) in &q {
        if is_off_screen(pos.0) {
            commands.destroy(entity);
        }
    }
}
