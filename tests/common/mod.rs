//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - `StatesPlugin` for `GameState`.
//! - a fixed frame clock so runs are reproducible.
//! - we then call `spacepeng::game::configure_headless` to install gameplay plugins.

#![allow(dead_code)]

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use spacepeng::common::groups::{Group, Groups, Tag};
use spacepeng::plugins::player::Player;

pub const FRAME: f32 = 1.0 / 60.0;

/// The first update enters `InGame` with a zero delta; later updates advance by [`FRAME`].
pub fn app_headless() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
        FRAME,
    )));

    spacepeng::game::configure_headless(&mut app);
    app
}

pub fn step_seconds(app: &mut App, secs: f32) {
    let frames = (secs / FRAME).ceil() as usize;
    for _ in 0..frames {
        app.update();
    }
}

pub fn player(app: &App) -> Entity {
    app.world()
        .resource::<Groups>()
        .tagged(Tag::Player)
        .expect("player tag")
}

pub fn player_data(app: &App) -> Player {
    app.world()
        .get::<Player>(player(app))
        .cloned()
        .expect("player component")
}

pub fn members(app: &App, group: Group) -> usize {
    app.world().resource::<Groups>().members(group).len()
}
