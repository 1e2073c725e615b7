//! Game composition root.
//!
//! Provides two public configuration functions:
//! - `configure_full`: DefaultPlugins (window/render/input) + game plugins.
//! - `configure_headless`: gameplay only, for integration tests.

use bevy::prelude::*;
use bevy::window::WindowResolution;

use crate::common::state::GameState;
use crate::common::tunables::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::plugins;
use crate::plugins::profile::{self, PROFILE_FILENAME, ProfileStore};

// Only compile these imports on Windows.
#[cfg(target_os = "windows")]
use bevy::render::{
    RenderPlugin,
    settings::{Backends, PowerPreference, WgpuSettings},
};

pub fn run() {
    App::new().add_plugins(configure_full).run();
}

/// Full configuration for `cargo run`.
pub fn configure_full(app: &mut App) {
    let default_plugins = DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "SpacePeng".into(),
            resolution: WindowResolution::new(ARENA_WIDTH as u32, ARENA_HEIGHT as u32),
            ..default()
        }),
        ..default()
    });

    // On Windows force DX12 on the high-performance adapter.
    #[cfg(target_os = "windows")]
    let default_plugins = default_plugins.set(RenderPlugin {
        render_creation: WgpuSettings {
            backends: Some(Backends::DX12),
            power_preference: PowerPreference::HighPerformance,
            ..default()
        }
        .into(),
        ..default()
    });

    app.add_plugins(default_plugins);

    configure_game(app, GameState::Menu);
    app.insert_resource(ProfileStore::load_from(PROFILE_FILENAME))
        .add_systems(Last, profile::save_on_focus_lost);
    plugins::register_render(app);
}

/// Headless configuration for integration tests.
///
/// Notes:
/// - Do NOT add DefaultPlugins.
/// - Do NOT add render-only plugins (camera/render).
/// - Starts directly `InGame` with an in-memory profile.
pub fn configure_headless(app: &mut App) {
    configure_game(app, GameState::InGame);
}

/// Configuration shared by both full and headless apps.
fn configure_game(app: &mut App, initial: GameState) {
    app.insert_state(initial);
    plugins::register_gameplay(app);
}
