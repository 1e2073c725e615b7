//! Countdown-based expiry for whole entities and for single components.
//!
//! - [`ExpiringEntity`]: the entity is destroyed when its timer runs out.
//! - [`ExpiringComponent`]: only that component is detached; the rest of the
//!   entity is untouched. Buffs (`Shield`, `DoubleShot`, `IsAttacking`) are
//!   expiring components.
//!
//! Both run their optional [`ExpiryAction`] exactly once, right before the
//! removal. Actions are plain data.

use bevy::ecs::component::Mutable;
use bevy::prelude::*;

use crate::common::groups::GroupCommandsExt;
use crate::plugins::animation::GameSprite;
use crate::plugins::core::FrameSet;
use crate::plugins::path::{PathFunctionId, PathMovement, TransitionToNewPathMovement};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpiryAction {
    /// Set the sprite name back (shield ran out).
    RestoreSprite(&'static str),
    /// Blend back into the default oscillation (attack ran out).
    ReturnToDefaultPath,
}

impl ExpiryAction {
    pub fn apply(self, world: &mut World, entity: Entity) {
        let Ok(mut e) = world.get_entity_mut(entity) else {
            return;
        };
        match self {
            ExpiryAction::RestoreSprite(name) => {
                if let Some(mut sprite) = e.get_mut::<GameSprite>() {
                    sprite.name = name;
                }
            }
            ExpiryAction::ReturnToDefaultPath => {
                if e.contains::<PathMovement>() {
                    e.insert(TransitionToNewPathMovement::to(
                        PathFunctionId::DefaultMovement,
                    ));
                }
            }
        }
    }
}

/// Remaining time plus what to do when it hits zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Expiry {
    pub remaining: f32,
    pub on_expiry: Option<ExpiryAction>,
}

impl Expiry {
    pub fn after(seconds: f32) -> Self {
        Self {
            remaining: seconds,
            on_expiry: None,
        }
    }

    pub fn then(mut self, action: ExpiryAction) -> Self {
        self.on_expiry = Some(action);
        self
    }

    /// Count down by `dt`; true once the timer has run out.
    #[inline]
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct ExpiringEntity(pub Expiry);

impl ExpiringEntity {
    pub fn after(seconds: f32) -> Self {
        Self(Expiry::after(seconds))
    }
}

/// A component that detaches itself after a delay.
pub trait ExpiringComponent: Component<Mutability = Mutable> {
    fn expiry(&self) -> &Expiry;
    fn expiry_mut(&mut self) -> &mut Expiry;
}

pub fn plugin(app: &mut App) {
    app.add_systems(Update, expire_entities.in_set(FrameSet::Lifecycle));
}

/// Register the countdown for buff type `T`.
pub fn register_expiring<T: ExpiringComponent>(app: &mut App) {
    app.add_systems(Update, expire_components::<T>.in_set(FrameSet::Lifecycle));
}

fn queue_action(commands: &mut Commands, entity: Entity, action: Option<ExpiryAction>) {
    if let Some(action) = action {
        commands.queue(move |world: &mut World| action.apply(world, entity));
    }
}

pub fn expire_entities(
    time: Res<Time>,
    mut commands: Commands,
    mut q: Query<(Entity, &mut ExpiringEntity)>,
) {
    let dt = time.delta_secs();
    for (entity, mut expiring) in &mut q {
        if expiring.0.tick(dt) {
            queue_action(&mut commands, entity, expiring.0.on_expiry);
            commands.destroy(entity);
        }
    }
}

pub fn expire_components<T: ExpiringComponent>(
    time: Res<Time>,
    mut commands: Commands,
    mut q: Query<(Entity, &mut T)>,
) {
    let dt = time.delta_secs();
    for (entity, mut component) in &mut q {
        if component.expiry_mut().tick(dt) {
            let action = component.expiry().on_expiry;
            queue_action(&mut commands, entity, action);
            commands.entity(entity).try_remove::<T>();
        }
    }
}

#[cfg(test)]
mod tests;
