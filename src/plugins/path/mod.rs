//! Oscillating path movement with blended function swaps.
//!
//! A path-moving entity never accumulates its position. Every frame:
//!
//! ```text
//! phase    = (phase + 2 * dt) mod 2pi
//! offset   = f(phase)                          no transition
//!          = lerp(f_old(phase), f_new(phase), factor)   transition
//! position = base + offset
//! ```
//!
//! A transition's factor advances by `dt`; once it reaches 1 the target
//! function becomes current and the transition component is removed.

use std::f32::consts::TAU;

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::common::tunables::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::plugins::core::FrameSet;
use crate::plugins::movement::{BasePosition, Position};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PathFunctionId {
    #[default]
    DefaultMovement,
    DefaultAttack,
    BossAttack,
    TwoBossesAttack,
}

pub type PathFunction = fn(f32) -> Vec2;

pub fn default_movement(rad: f32) -> Vec2 {
    Vec2::new(rad.sin() * 50.0, 0.0)
}

pub fn default_attack(rad: f32) -> Vec2 {
    Vec2::new(
        (3.0 * rad).sin() * ARENA_WIDTH / 8.0,
        rad.cos() * ARENA_HEIGHT / 3.0 - ARENA_HEIGHT / 4.0,
    )
}

/// Wide figure-eight over the whole formation area.
pub fn boss_attack(rad: f32) -> Vec2 {
    Vec2::new(
        (2.0 * rad).sin() * ARENA_WIDTH / 4.0,
        rad.cos() * ARENA_HEIGHT / 3.0 - ARENA_HEIGHT / 4.0,
    )
}

pub fn two_bosses_attack(rad: f32) -> Vec2 {
    Vec2::new(
        rad.sin() * ARENA_WIDTH * 0.18,
        (3.0 * rad).cos() * ARENA_HEIGHT / 3.0 - ARENA_HEIGHT / 4.0,
    )
}

#[derive(Resource, Clone)]
pub struct PathRegistry {
    functions: HashMap<PathFunctionId, PathFunction>,
}

impl Default for PathRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.insert(PathFunctionId::DefaultMovement, default_movement);
        registry.insert(PathFunctionId::DefaultAttack, default_attack);
        registry.insert(PathFunctionId::BossAttack, boss_attack);
        registry.insert(PathFunctionId::TwoBossesAttack, two_bosses_attack);
        registry
    }
}

impl PathRegistry {
    pub fn empty() -> Self {
        Self {
            functions: HashMap::default(),
        }
    }

    pub fn insert(&mut self, id: PathFunctionId, f: PathFunction) {
        self.functions.insert(id, f);
    }

    pub fn get(&self, id: PathFunctionId) -> Option<PathFunction> {
        self.functions.get(&id).copied()
    }

    pub fn offset(&self, id: PathFunctionId, rad: f32) -> Option<Vec2> {
        self.get(id).map(|f| f(rad))
    }
}

#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct PathMovement {
    pub function: PathFunctionId,
    /// Phase in radians, kept in `[0, 2pi)`.
    pub phase: f32,
}

/// Path used when the entity switches to attack mode.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct AttackPathMovement(pub PathFunctionId);

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct TransitionToNewPathMovement {
    pub factor: f32,
    pub target: PathFunctionId,
}

impl TransitionToNewPathMovement {
    pub fn to(target: PathFunctionId) -> Self {
        Self {
            factor: 0.0,
            target,
        }
    }
}

#[inline]
pub fn blend(old: Vec2, new: Vec2, factor: f32) -> Vec2 {
    (1.0 - factor) * old + factor * new
}

#[inline]
pub fn advance_phase(phase: f32, dt: f32) -> f32 {
    let next = phase + 2.0 * dt;
    if next >= TAU { next.rem_euclid(TAU) } else { next }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<PathRegistry>();
    app.add_systems(Update, move_along_paths.in_set(FrameSet::Path));
}

pub fn move_along_paths(
    time: Res<Time>,
    registry: Res<PathRegistry>,
    mut commands: Commands,
    mut q: Query<(
        Entity,
        &BasePosition,
        &mut Position,
        &mut PathMovement,
        Option<&mut TransitionToNewPathMovement>,
    )>,
) {
    let dt = time.delta_secs();

    for (entity, base, mut pos, mut path, transition) in &mut q {
        path.phase = advance_phase(path.phase, dt);

        let Some(current) = registry.offset(path.function, path.phase) else {
            warn!("no path function registered for {:?}", path.function);
            continue;
        };

        let offset = match transition {
            None => current,
            Some(mut transition) => {
                let Some(target) = registry.offset(transition.target, path.phase) else {
                    warn!("no path function registered for {:?}", transition.target);
                    commands.entity(entity).try_remove::<TransitionToNewPathMovement>();
                    pos.0 = base.0 + current;
                    continue;
                };
                let offset = blend(current, target, transition.factor.min(1.0));

                transition.factor += dt;
                if transition.factor >= 1.0 {
                    path.function = transition.target;
                    commands.entity(entity).try_remove::<TransitionToNewPathMovement>();
                }
                offset
            }
        };

        pos.0 = base.0 + offset;
    }
}

#[cfg(test)]
mod tests;
