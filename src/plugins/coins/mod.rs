//! Timed power-up drops.
//!
//! While action is enabled a coin falls every 7-13 seconds from a random x
//! along the top edge. Disabling action clears the sky and runs out the
//! player's buffs on the next lifecycle pass.

use bevy::color::Srgba;
use bevy::prelude::*;

use crate::common::groups::{Group, GroupCommandsExt, Groups, Tag};
use crate::common::rng::GameRng;
use crate::common::tunables::Tunables;
use crate::plugins::core::FrameSet;
use crate::plugins::events::{EventBusAppExt, EventId, GameEvent};
use crate::plugins::lifecycle::ExpiringComponent;
use crate::plugins::player::{DoubleShot, Shield};
use crate::plugins::world::factory;

pub const SPRITE_NAME: &str = "coin";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoinType {
    ExtraLife,
    Shield,
    DoubleShot,
}

impl CoinType {
    pub fn color(self) -> Srgba {
        match self {
            CoinType::ExtraLife => Srgba::WHITE,
            CoinType::Shield => Srgba::rgb(0.5, 1.0, 0.5),
            CoinType::DoubleShot => Srgba::rgb(1.0, 0.5, 0.5),
        }
    }

    /// Map a uniform roll in `[0, 1)` to a coin: 10% life, 40% double shot, 50% shield.
    pub fn from_roll(r: f32) -> Self {
        if r < 0.10 {
            CoinType::ExtraLife
        } else if r < 0.50 {
            CoinType::DoubleShot
        } else {
            CoinType::Shield
        }
    }
}

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Coin(pub CoinType);

#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct CoinSpawner {
    pub enabled: bool,
    pub delay: f32,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<CoinSpawner>()
        .add_event_listener(EventId::EnableAction, enable_coins)
        .add_event_listener(EventId::DisableAction, disable_coins)
        .add_systems(Update, spawn_coins.in_set(FrameSet::Spawning));
}

fn next_delay(rng: &mut GameRng, tunables: &Tunables) -> f32 {
    rng.range(tunables.coin_min_delay, tunables.coin_max_delay)
}

pub fn spawn_coins(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut spawner: ResMut<CoinSpawner>,
    mut rng: ResMut<GameRng>,
    mut commands: Commands,
) {
    if !spawner.enabled {
        return;
    }
    spawner.delay -= time.delta_secs();
    if spawner.delay > 0.0 {
        return;
    }
    spawner.delay = next_delay(&mut rng, &tunables);

    let kind = CoinType::from_roll(rng.unit());
    factory::coin(&mut commands, &mut rng, kind, tunables.coin_speed);
    debug!("coin dropped: {kind:?}");
}

pub fn enable_coins(world: &mut World, _event: &GameEvent) {
    let delay = world.resource_scope(|world, mut rng: Mut<GameRng>| {
        next_delay(&mut rng, world.resource::<Tunables>())
    });
    let mut spawner = world.resource_mut::<CoinSpawner>();
    spawner.enabled = true;
    spawner.delay = delay;
}

pub fn disable_coins(world: &mut World, _event: &GameEvent) {
    world.resource_mut::<CoinSpawner>().enabled = false;

    let coins = world.resource::<Groups>().snapshot(Group::Coins);
    {
        let mut commands = world.commands();
        for coin in coins {
            commands.destroy(coin);
        }
    }
    world.flush();

    let Some(player) = world.resource::<Groups>().tagged(Tag::Player) else {
        return;
    };
    let Ok(mut e) = world.get_entity_mut(player) else {
        return;
    };
    if let Some(mut shield) = e.get_mut::<Shield>() {
        shield.expiry_mut().remaining = 0.0;
    }
    if let Some(mut double_shot) = e.get_mut::<DoubleShot>() {
        double_shot.expiry_mut().remaining = 0.0;
    }
}
