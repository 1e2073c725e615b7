//! World plugin: spawns the backdrop and the player ship for a run.
//!
//! Everything else is spawned by the director (aliens) or by gameplay
//! systems (shots, coins, effects) through [`factory`].

use bevy::prelude::*;

use crate::common::state::GameState;

pub mod factory;

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_arena);
}

pub fn spawn_arena(mut commands: Commands) {
    factory::background(&mut commands);
    factory::player(&mut commands);
}
