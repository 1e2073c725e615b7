//! Aliens plugin: attack-mode AI and alien fire.
//!
//! ---------------------------
//! STATE
//! ---------------------------
//! - Per alien: "attacking" is the presence of the [`IsAttacking`] buff; the
//!   current path function lives in `PathMovement`.
//! - Per level: [`AlienBehaviour`] holds whether action is allowed, the level
//!   influence, the enraged time and the starting alien count.
//!
//! ---------------------------
//! CHANCES
//! ---------------------------
//! ```text
//! time_rage  = clamp(time / 10000, 0, 1)
//! kill_rage  = clamp((start - alive) / start, 0.01, 1)
//! chance     = clamp(min + (max - min) * level_influence
//!                    + 0.01 * time_rage * kill_rage, min, max)
//! ```
//! Three instances drive switching to attack, shooting while attacking and
//! shooting while idle. Bosses switch x100 and shoot idle x25.
//!
//! ---------------------------
//! FORMATIONS
//! ---------------------------
//! An alien that flips to attack takes its whole `AttackFormation` group with
//! it, all on the flipping alien's attack path. The flip walks a snapshot of
//! the formation and records flipped aliens so later members of the same
//! formation do not roll again this frame.

use bevy::ecs::system::SystemParam;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::common::groups::{Group, Groups, Tag};
use crate::common::rng::GameRng;
use crate::common::tunables::Tunables;
use crate::plugins::core::FrameSet;
use crate::plugins::events::{EventBusAppExt, EventId, GameEvent};
use crate::plugins::lifecycle::{Expiry, ExpiringComponent, ExpiryAction, register_expiring};
use crate::plugins::movement::Position;
use crate::plugins::path::{
    AttackPathMovement, PathFunctionId, PathMovement, TransitionToNewPathMovement,
};
use crate::plugins::world::factory;

pub const SPRITE_NAME: &str = "alien";
pub const SPRITE_NAME_BOSS: &str = "alienboss";

/// Levels at which the tuning reaches its maximum.
const MAX_LEVEL: f32 = 100.0;
/// Half-width of the band above the player that earns a bonus shot roll.
const ABOVE_PLAYER_BAND: f32 = 10.0;

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Alien;

/// Only bosses carry health; plain aliens die in one hit.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub hp: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { hp: max, max }
    }

    /// Remaining health in percent, for labels.
    pub fn percent(&self) -> i32 {
        if self.max <= 0 {
            return 0;
        }
        (self.hp.max(0) * 100) / self.max
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct IsAttacking(pub Expiry);

impl ExpiringComponent for IsAttacking {
    fn expiry(&self) -> &Expiry {
        &self.0
    }
    fn expiry_mut(&mut self) -> &mut Expiry {
        &mut self.0
    }
}

impl IsAttacking {
    pub fn for_seconds(seconds: f32) -> Self {
        Self(Expiry::after(seconds).then(ExpiryAction::ReturnToDefaultPath))
    }
}

#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct AlienBehaviour {
    pub attacking_allowed: bool,
    pub level_influence: f32,
    /// Enraged time; accrues only while attacking is allowed.
    pub time: f32,
    pub max_aliens: usize,
}

impl AlienBehaviour {
    pub fn set_level_parameters(&mut self, level: u32, max_aliens: usize) {
        self.level_influence = (level as f32 / MAX_LEVEL).clamp(0.0, 1.0);
        self.time = 0.0;
        self.max_aliens = max_aliens;
    }

    pub fn time_rage(&self) -> f32 {
        (self.time / 10_000.0).clamp(0.0, 1.0)
    }

    pub fn kill_rage(&self, alive: usize) -> f32 {
        if self.max_aliens == 0 {
            return 0.01;
        }
        ((self.max_aliens as f32 - alive as f32) / self.max_aliens as f32).clamp(0.01, 1.0)
    }
}

pub fn weighted_chance(min: f32, max: f32, level_influence: f32, time_rage: f32, kill_rage: f32) -> f32 {
    (min + (max - min) * level_influence + 0.01 * time_rage * kill_rage).clamp(min, max)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Chances {
    pub switch_to_attack: f32,
    pub shoot_attacking: f32,
    pub shoot_idle: f32,
}

impl Chances {
    pub fn new(behaviour: &AlienBehaviour, alive: usize, boss: bool) -> Self {
        let (li, tr, kr) = (
            behaviour.level_influence,
            behaviour.time_rage(),
            behaviour.kill_rage(alive),
        );
        let mut chances = Self {
            switch_to_attack: weighted_chance(0.00001, 0.001, li, tr, kr),
            shoot_attacking: weighted_chance(0.0025, 0.025, li, tr, kr),
            shoot_idle: weighted_chance(0.0001, 0.01, li, tr, kr),
        };
        if boss {
            chances.switch_to_attack *= 100.0;
            chances.shoot_idle *= 25.0;
        }
        chances
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<AlienBehaviour>()
        .add_event_listener(EventId::EnableAction, enable_attacking)
        .add_event_listener(EventId::DisableAction, disable_attacking)
        .add_systems(Update, alien_behaviour.in_set(FrameSet::Behaviour));
    register_expiring::<IsAttacking>(app);
}

#[derive(SystemParam)]
pub struct AlienAi<'w, 's> {
    commands: Commands<'w, 's>,
    time: Res<'w, Time>,
    tunables: Res<'w, Tunables>,
    groups: Res<'w, Groups>,
    rng: ResMut<'w, GameRng>,
    behaviour: ResMut<'w, AlienBehaviour>,
    positions: Query<'w, 's, &'static Position>,
    flipped: Local<'s, HashSet<Entity>>,
}

impl AlienAi<'_, '_> {
    fn start_attack(&mut self, entity: Entity, path: PathFunctionId) {
        if !self.flipped.insert(entity) {
            return;
        }
        self.commands.entity(entity).try_insert((
            IsAttacking::for_seconds(self.tunables.attack_duration),
            TransitionToNewPathMovement::to(path),
        ));
    }

    fn alien_shot(&mut self, at: Vec2) {
        let speed = self.tunables.alien_shot_speed;
        factory::alien_shot(&mut self.commands, at, speed);
    }

    fn alien_multi_shot(&mut self, at: Vec2) {
        let speed = self.tunables.alien_shot_speed;
        factory::alien_multi_shot(&mut self.commands, &mut self.rng, at, speed);
    }
}

pub fn alien_behaviour(
    mut ai: AlienAi,
    q_aliens: Query<
        (
            Entity,
            &Position,
            Has<Health>,
            Has<IsAttacking>,
            Has<TransitionToNewPathMovement>,
            Option<&AttackPathMovement>,
        ),
        (With<Alien>, With<PathMovement>),
    >,
) {
    ai.flipped.clear();

    if ai.behaviour.attacking_allowed {
        ai.behaviour.time += ai.time.delta_secs();
    }
    let allowed = ai.behaviour.attacking_allowed;
    let alive = ai.groups.members(Group::Aliens).len();

    let player_x = ai
        .groups
        .tagged(Tag::Player)
        .and_then(|p| ai.positions.get(p).ok())
        .map(|p| p.0.x);

    for (entity, pos, boss, attacking, transitioning, attack_path) in &q_aliens {
        let chances = Chances::new(&ai.behaviour, alive, boss);

        if !attacking
            && !ai.flipped.contains(&entity)
            && !transitioning
            && ai.rng.chance(chances.switch_to_attack)
            && allowed
        {
            let path = attack_path.map_or(PathFunctionId::DefaultAttack, |a| a.0);
            match ai.groups.formation_of(entity) {
                Some(formation) => {
                    for member in ai.groups.snapshot(formation) {
                        ai.start_attack(member, path);
                    }
                }
                None => ai.start_attack(entity, path),
            }
        }

        if !allowed {
            continue;
        }

        let attacking = attacking || ai.flipped.contains(&entity);
        let above_player = player_x.is_some_and(|x| (pos.0.x - x).abs() <= ABOVE_PLAYER_BAND);

        if attacking {
            if ai.rng.chance(chances.shoot_attacking) {
                ai.alien_multi_shot(pos.0);
            }
            if above_player && ai.rng.chance(chances.shoot_attacking * 10.0) {
                ai.alien_shot(pos.0);
            }
        } else {
            if ai.rng.chance(chances.shoot_idle) {
                ai.alien_shot(pos.0);
            }
            if above_player && ai.rng.chance(chances.shoot_idle) {
                ai.alien_shot(pos.0);
            }
        }
    }
}

pub fn enable_attacking(world: &mut World, _event: &GameEvent) {
    world.resource_mut::<AlienBehaviour>().attacking_allowed = true;
}

/// Stop all attacks and send every alien back to the default oscillation.
pub fn disable_attacking(world: &mut World, _event: &GameEvent) {
    {
        let mut behaviour = world.resource_mut::<AlienBehaviour>();
        behaviour.attacking_allowed = false;
        behaviour.time = 0.0;
    }

    let aliens = world.resource::<Groups>().snapshot(Group::Aliens);
    for alien in aliens {
        let Ok(mut e) = world.get_entity_mut(alien) else {
            continue;
        };
        e.remove::<IsAttacking>();
        if e.contains::<PathMovement>() {
            e.insert(TransitionToNewPathMovement::to(PathFunctionId::DefaultMovement));
        }
    }
}
