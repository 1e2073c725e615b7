//! Feature plugins.

use bevy::prelude::*;

pub mod aliens;
pub mod animation;
pub mod audio;
pub mod coins;
pub mod collision;
pub mod core;
pub mod director;
pub mod events;
pub mod hud;
pub mod lifecycle;
pub mod menu;
pub mod movement;
pub mod path;
pub mod player;
pub mod profile;
pub mod world;

// Render-only
pub mod camera;
pub mod render;

/// Register gameplay plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    events::plugin(app);
    audio::plugin(app);
    profile::plugin(app);
    hud::plugin(app);
    lifecycle::plugin(app);
    animation::plugin(app);
    movement::plugin(app);
    path::plugin(app);
    player::plugin(app);
    aliens::plugin(app);
    coins::plugin(app);
    collision::plugin(app);
    world::plugin(app);
    director::plugin(app);
    menu::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    camera::plugin(app);
    render::plugin(app);
}

/// Register all plugins (full app).
pub fn register_all(app: &mut App) {
    register_gameplay(app);
    register_render(app);
}
