//! Player plugin.
//!
//! Pipeline (Input set):
//! - `gather_keyboard`: raw keys -> [`PlayerIntent`] (skipped when no input
//!   backend is installed, so headless tests can write the intent directly)
//! - `apply_player_input`: intent -> thrust/damping on `Velocity`, direct
//!   positioning, and the fire state machine in [`FireControl`]
//!
//! Fire state machine:
//!
//! ```text
//! Blocked(t) --t elapsed--> Continue --fire--> submit Continue event
//!     ^                                   (director decides when to Allow)
//!     +-- block_for(t) ---- Allow --fire--> spawn shot(s), cooldown
//! ```

use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::core::FrameSet;
use crate::plugins::events::{EventBus, EventId};
use crate::plugins::lifecycle::{Expiry, ExpiringComponent, register_expiring};
use crate::plugins::movement::{Position, Velocity};
use crate::plugins::world::factory;

pub const SPRITE_NAME: &str = "player";
pub const SPRITE_NAME_SHIELD: &str = "playershield";
pub const DEFAULT_LIVES: u32 = 5;
/// Horizontal offset of each barrel while DoubleShot is active.
const DOUBLE_SHOT_SPREAD: f32 = 15.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerState {
    #[default]
    Alive,
    Respawning,
    Dead,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Player {
    pub lives: u32,
    pub score: u32,
    pub state: PlayerState,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            lives: DEFAULT_LIVES,
            score: 0,
            state: PlayerState::Alive,
        }
    }
}

/// Alien contact and alien shots do not kill while this is attached.
#[derive(Component, Debug, Clone, Copy)]
pub struct Shield(pub Expiry);

#[derive(Component, Debug, Clone, Copy)]
pub struct DoubleShot(pub Expiry);

impl ExpiringComponent for Shield {
    fn expiry(&self) -> &Expiry {
        &self.0
    }
    fn expiry_mut(&mut self) -> &mut Expiry {
        &mut self.0
    }
}

impl ExpiringComponent for DoubleShot {
    fn expiry(&self) -> &Expiry {
        &self.0
    }
    fn expiry_mut(&mut self) -> &mut Expiry {
        &mut self.0
    }
}

/// This frame's sampled input, already translated from devices.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct PlayerIntent {
    pub move_left: bool,
    pub move_right: bool,
    pub fire: bool,
    /// Absolute arena x (pointer/touch); overrides thrust when set.
    pub direct_x: Option<f32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FireState {
    #[default]
    Allow,
    /// Fire presses count as "continue".
    Continue,
    Blocked,
}

#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct FireControl {
    pub state: FireState,
    pub time_to_shoot: f32,
    pub time_to_continue: f32,
}

impl FireControl {
    pub fn allow(&mut self) {
        self.state = FireState::Allow;
    }

    /// No shots for `seconds`; afterwards fire presses count as continue
    /// until [`FireControl::allow`] is called.
    pub fn block_for(&mut self, seconds: f32) {
        self.state = FireState::Blocked;
        self.time_to_continue = seconds;
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<PlayerIntent>()
        .init_resource::<FireControl>()
        .add_systems(
            Update,
            (gather_keyboard, apply_player_input)
                .chain()
                .in_set(FrameSet::Input),
        );
    register_expiring::<Shield>(app);
    register_expiring::<DoubleShot>(app);
}

const LEFT_KEYS: [KeyCode; 4] = [
    KeyCode::ArrowLeft,
    KeyCode::Numpad4,
    KeyCode::KeyA,
    KeyCode::KeyJ,
];
const RIGHT_KEYS: [KeyCode; 4] = [
    KeyCode::ArrowRight,
    KeyCode::Numpad6,
    KeyCode::KeyD,
    KeyCode::KeyL,
];
pub const FIRE_KEYS: [KeyCode; 4] = [
    KeyCode::Space,
    KeyCode::Numpad0,
    KeyCode::ControlLeft,
    KeyCode::ControlRight,
];

pub fn gather_keyboard(keys: Option<Res<ButtonInput<KeyCode>>>, mut intent: ResMut<PlayerIntent>) {
    let Some(keys) = keys else {
        return;
    };
    // Any key press hands control back from the pointer.
    if keys.get_just_pressed().next().is_some() {
        intent.direct_x = None;
    }
    intent.move_left = keys.any_pressed(LEFT_KEYS);
    intent.move_right = keys.any_pressed(RIGHT_KEYS);
    intent.fire = keys.any_pressed(FIRE_KEYS);
}

pub fn apply_player_input(
    time: Res<Time>,
    tunables: Res<Tunables>,
    intent: Res<PlayerIntent>,
    mut fire: ResMut<FireControl>,
    mut bus: ResMut<EventBus>,
    mut commands: Commands,
    mut q_player: Query<(&mut Position, &mut Velocity, Has<DoubleShot>), With<Player>>,
) {
    let Ok((mut pos, mut vel, double_shot)) = q_player.single_mut() else {
        return;
    };
    let dt = time.delta_secs();
    let max = tunables.horizontal_max_speed;

    if let Some(x) = intent.direct_x {
        pos.0.x = x;
    } else if intent.move_left {
        vel.0.x = (vel.0.x - dt * tunables.horizontal_thrust).clamp(-max, max);
    } else if intent.move_right {
        vel.0.x = (vel.0.x + dt * tunables.horizontal_thrust).clamp(-max, max);
    } else if vel.0.x.abs() < tunables.damping {
        vel.0.x = 0.0;
    } else {
        vel.0.x -= vel.0.x.signum() * tunables.damping;
    }

    match fire.state {
        FireState::Blocked => {
            fire.time_to_continue -= dt;
            if fire.time_to_continue <= 0.0 {
                fire.time_to_continue = 0.0;
                fire.state = FireState::Continue;
            }
        }
        FireState::Continue => {
            if intent.fire {
                bus.submit(EventId::Continue, None);
            }
        }
        FireState::Allow => {
            if intent.fire && fire.time_to_shoot <= 0.0 {
                let (at, speed) = (pos.0, tunables.player_shot_speed);
                if double_shot {
                    factory::player_shot(&mut commands, at - Vec2::X * DOUBLE_SHOT_SPREAD, speed);
                    factory::player_shot(&mut commands, at + Vec2::X * DOUBLE_SHOT_SPREAD, speed);
                } else {
                    factory::player_shot(&mut commands, at, speed);
                }
                fire.time_to_shoot = tunables.fire_rate;
            }
            if fire.time_to_shoot > 0.0 {
                fire.time_to_shoot = (fire.time_to_shoot - dt).max(0.0);
            }
        }
    }
}
