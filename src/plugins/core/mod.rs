//! Core plugin: shared resources, global settings and the frame pipeline.
//!
//! Every gameplay system lives in exactly one [`FrameSet`]. The sets run
//! chained, in declaration order, once per `Update`:
//!
//! ```text
//! Director -> Lifecycle -> Animation -> Input -> Behaviour -> Spawning
//!          -> Movement -> Path -> Bounds -> Collision -> Events
//! ```
//!
//! Chaining gives two guarantees the gameplay rules rely on:
//! - positions are final (velocity + path) before collisions are tested;
//! - expiry runs before anything that could touch a dying entity.
//!
//! Bevy inserts a command sync point between chained sets, so spawns,
//! despawns and group edits from one set are visible to the next.

use bevy::prelude::*;

use crate::common::groups::{Groups, prune_groups};
use crate::common::rng::GameRng;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Director,
    Lifecycle,
    Animation,
    Input,
    Behaviour,
    Spawning,
    Movement,
    Path,
    Bounds,
    Collision,
    Events,
}

pub fn plugin(app: &mut App) {
    app.insert_resource(Tunables::default());
    app.init_resource::<GameRng>();
    app.init_resource::<Groups>();
    app.insert_resource(ClearColor(Color::srgb(0.02, 0.02, 0.06)));

    app.configure_sets(
        Update,
        (
            FrameSet::Director,
            FrameSet::Lifecycle,
            FrameSet::Animation,
            FrameSet::Input,
            FrameSet::Behaviour,
            FrameSet::Spawning,
            FrameSet::Movement,
            FrameSet::Path,
            FrameSet::Bounds,
            FrameSet::Collision,
            FrameSet::Events,
        )
            .chain()
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(Update, prune_groups.in_set(FrameSet::Lifecycle));
    app.add_systems(OnExit(GameState::InGame), clear_groups);
}

/// Group membership never outlives a run.
fn clear_groups(mut groups: ResMut<Groups>) {
    groups.clear();
}
