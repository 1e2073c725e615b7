//! Test helpers.
//!
//! Bevy provides `World::run_system_once` (via the `RunSystemOnce` trait) for quickly
//! executing a system in tests without building a full schedule.
//!
//! Systems that use `Commands` enqueue structural changes; applying them is normally handled by
//! `ApplyDeferred` / schedule boundaries. We call `world.flush()` after running so queued commands
//! are applied before assertions.

use std::time::Duration;

use bevy::ecs::message::Messages;
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use crate::common::groups::Groups;
use crate::common::rng::GameRng;
use crate::common::tunables::Tunables;
use crate::plugins::audio::{PlayMusic, PlaySound};
use crate::plugins::events::EventBus;

/// Fixed frame length used by the headless harnesses.
pub const FRAME: f32 = 1.0 / 60.0;

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// A bare world with the resources most gameplay systems read.
pub fn gameplay_world() -> World {
    let mut world = World::new();
    world.init_resource::<Groups>();
    world.init_resource::<EventBus>();
    world.init_resource::<Tunables>();
    world.insert_resource(GameRng::new(7));
    world.init_resource::<Messages<PlaySound>>();
    world.init_resource::<Messages<PlayMusic>>();
    world.insert_resource(Time::<()>::default());
    world
}

/// Set the frame delta seen through `Res<Time>` for the next system run.
pub fn set_delta(world: &mut World, secs: f32) {
    world
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(secs));
}

/// Sounds written since the message buffers were last swapped.
pub fn sounds(world: &mut World) -> Vec<PlaySound> {
    world
        .run_system_once(|mut reader: MessageReader<PlaySound>| reader.read().copied().collect::<Vec<_>>())
        .expect("reading sounds failed")
}

/// Headless app with a deterministic frame clock.
///
/// The first update has a zero delta; every following update advances by [`FRAME`].
pub fn app_headless() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(FRAME)));
    crate::game::configure_headless(&mut app);
    app
}

/// Advance the app by (at least) `secs` of game time.
pub fn step_seconds(app: &mut App, secs: f32) {
    let frames = (secs / FRAME).ceil() as usize;
    for _ in 0..frames {
        app.update();
    }
}
