//! Tunable gameplay constants.

use bevy::prelude::*;

/// Width of the playfield in world units. The origin is the bottom-left corner.
pub const ARENA_WIDTH: f32 = 800.0;
/// Height of the playfield in world units.
pub const ARENA_HEIGHT: f32 = 480.0;
/// Horizontal margin kept free when dropping coins.
pub const POWERUP_BORDER: f32 = 50.0;

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub horizontal_thrust: f32,
    pub horizontal_max_speed: f32,
    /// Speed removed per frame while no direction is held.
    pub damping: f32,
    pub fire_rate: f32,
    pub player_shot_speed: f32,
    pub alien_shot_speed: f32,
    pub coin_speed: f32,
    pub buff_duration: f32,
    pub attack_duration: f32,
    pub coin_min_delay: f32,
    pub coin_max_delay: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            horizontal_thrust: 500.0,
            horizontal_max_speed: 500.0,
            damping: 25.0,
            fire_rate: 0.25,
            player_shot_speed: 800.0,
            alien_shot_speed: 400.0,
            coin_speed: 100.0,
            buff_duration: 5.0,
            attack_duration: 3.14,
            coin_min_delay: 7.0,
            coin_max_delay: 13.0,
        }
    }
}
