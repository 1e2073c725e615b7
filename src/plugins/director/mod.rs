//! Director: level setup and the cutscene queue.
//!
//! The director owns a FIFO of [`Scheduled`] actions. Only the head counts
//! down; when its delay drops below zero it is popped and run. Sequences
//! (level intro, respawn, level clear, game over) are queued as a whole and
//! replace whatever was pending.
//!
//! ```text
//! start_run ----------------------> [Level 0.5] [UnlockPlayer 2]
//! PlayerKilled, lives left -------> [ShowReady 2] [Respawn 1]
//! PlayerKilled, last life --------> ([None 2] [NewHighscore 0.5])
//!                                   [AnnounceGameOver 2] [ReturnToMenu 10]
//! CheckIsLevelClear, no aliens ---> [LevelDone 1] [None 2]
//!                                   [AdvanceLevel 0.5] [StartNextLevel 2]
//! Continue -----------------------> head delay = 0
//! ```
//!
//! Every frame the director also mirrors score and level into the profile
//! and the HUD.

use std::collections::VecDeque;

use bevy::prelude::*;

use crate::common::groups::{Group, Groups, Tag};
use crate::common::state::GameState;
use crate::common::tunables::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::plugins::aliens::AlienBehaviour;
use crate::plugins::animation::Invisible;
use crate::plugins::audio::{MusicKey, PlayMusic};
use crate::plugins::coins::CoinSpawner;
use crate::plugins::core::FrameSet;
use crate::plugins::events::{EventBus, EventBusAppExt, EventId, GameEvent};
use crate::plugins::hud::{Hud, Overlay};
use crate::plugins::movement::{Position, Velocity};
use crate::plugins::player::{FireControl, Player, PlayerState};
use crate::plugins::profile::ProfileStore;
use crate::plugins::world::{self, factory};

pub mod layouts;

use layouts::{AlienSpawn, BOSS_HEALTH};

const FIRE_BLOCK_ON_START: f32 = 2.5;
const FIRE_BLOCK_ON_DEATH: f32 = 2.5;
const FIRE_BLOCK_ON_CLEAR: f32 = 4.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectorAction {
    ShowOverlay(Overlay),
    /// READY banner, player visible again.
    ShowReady,
    /// End of the level intro: player may move, fire and be hit.
    UnlockPlayer,
    Respawn,
    AdvanceLevel,
    StartNextLevel,
    AnnounceGameOver,
    ReturnToMenu,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scheduled {
    pub delay: f32,
    pub action: DirectorAction,
}

#[derive(Resource, Debug, Default)]
pub struct Director {
    pub level: u32,
    /// High score when the run began; the game-over banner compares to it.
    pub high_score_at_start: u32,
    queue: VecDeque<Scheduled>,
}

impl Director {
    pub fn schedule(&mut self, delay: f32, action: DirectorAction) {
        self.queue.push_back(Scheduled { delay, action });
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    pub fn queue(&self) -> impl Iterator<Item = &Scheduled> {
        self.queue.iter()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Make the head fire on the next tick.
    pub fn skip_wait(&mut self) {
        if let Some(head) = self.queue.front_mut() {
            head.delay = 0.0;
        }
    }

    /// Count the head down by `dt`; pop and return it once overdue.
    pub fn tick(&mut self, dt: f32) -> Option<DirectorAction> {
        let head = self.queue.front_mut()?;
        head.delay -= dt;
        if head.delay < 0.0 {
            return self.queue.pop_front().map(|s| s.action);
        }
        None
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<Director>()
        .add_event_listener(EventId::PlayerKilled, on_player_killed)
        .add_event_listener(EventId::CheckIsLevelClear, on_check_level_clear)
        .add_event_listener(EventId::Continue, on_continue)
        .add_systems(
            OnEnter(GameState::InGame),
            start_run.after(world::spawn_arena),
        )
        .add_systems(Update, tick_director.in_set(FrameSet::Director))
        .add_systems(OnExit(GameState::InGame), stop_run);
}

// -----------------------------------------------------------------------------
// Player helpers
// -----------------------------------------------------------------------------

fn player_entity(world: &World) -> Option<Entity> {
    world.resource::<Groups>().tagged(Tag::Player)
}

/// Back to the launch spot, visible and collidable.
fn setup_player(world: &mut World, player: Entity) {
    let Ok(mut e) = world.get_entity_mut(player) else {
        return;
    };
    if let Some(mut pos) = e.get_mut::<Position>() {
        pos.0 = Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 10.0);
    }
    if let Some(mut vel) = e.get_mut::<Velocity>() {
        vel.0 = Vec2::ZERO;
    }
    e.remove::<Invisible>();
    world.resource_mut::<Groups>().join(player, Group::Player);
}

fn set_player_uncollidable(world: &mut World, player: Entity) {
    world.resource_mut::<Groups>().leave_all(player);
}

fn set_player_visible(world: &mut World, player: Entity, visible: bool) {
    let Ok(mut e) = world.get_entity_mut(player) else {
        return;
    };
    if visible {
        e.remove::<Invisible>();
    } else {
        e.insert(Invisible);
    }
}

fn set_player_state(world: &mut World, player: Entity, state: PlayerState) {
    if let Some(mut p) = world.get_mut::<Player>(player) {
        p.state = state;
    }
}

fn submit(world: &mut World, id: EventId) {
    world.resource_mut::<EventBus>().submit(id, None);
}

// -----------------------------------------------------------------------------
// Level setup
// -----------------------------------------------------------------------------

/// Spawn the layout for `level` and retune the alien AI for it.
pub fn setup_level(world: &mut World, level: u32) -> usize {
    let spawns = layouts::layout(level);
    {
        let mut commands = world.commands();
        for spawn in &spawns {
            match *spawn {
                AlienSpawn::Alien { at, formation } => {
                    factory::alien(&mut commands, at, formation);
                }
                AlienSpawn::Boss { at, attack } => {
                    factory::alien_boss(&mut commands, at, BOSS_HEALTH, attack);
                }
            }
        }
    }
    world.flush();

    world
        .resource_mut::<AlienBehaviour>()
        .set_level_parameters(level, spawns.len());
    spawns.len()
}

/// Runs when a run begins, after the arena (and player) exist.
pub fn start_run(world: &mut World) {
    let profile = world.resource::<ProfileStore>().profile.clone();
    let level = profile.last_played_level.max(1);
    {
        let mut director = world.resource_mut::<Director>();
        director.level = level;
        director.high_score_at_start = profile.high_score;
        director.clear_queue();
    }

    world
        .resource_mut::<FireControl>()
        .block_for(FIRE_BLOCK_ON_START);
    // The DisableAction below lands at the end of the first frame; until then
    // nothing may act on the previous run's flags.
    world.resource_mut::<AlienBehaviour>().attacking_allowed = false;
    if let Some(mut coins) = world.get_resource_mut::<CoinSpawner>() {
        coins.enabled = false;
    }
    if let Some(player) = player_entity(world) {
        setup_player(world, player);
        set_player_uncollidable(world, player);
    }
    let aliens = setup_level(world, level);
    submit(world, EventId::DisableAction);
    world.write_message(PlayMusic(MusicKey::Game));

    let mut director = world.resource_mut::<Director>();
    director.schedule(0.5, DirectorAction::ShowOverlay(Overlay::Level));
    director.schedule(2.0, DirectorAction::UnlockPlayer);

    info!("run started at level {level} with {aliens} aliens");
}

fn stop_run(mut director: ResMut<Director>) {
    director.clear_queue();
}

// -----------------------------------------------------------------------------
// Frame tick
// -----------------------------------------------------------------------------

fn mirror_progress(world: &mut World) {
    let level = world.resource::<Director>().level;
    let player = player_entity(world).and_then(|e| world.get::<Player>(e).cloned());

    let high_score = {
        let mut store = world.resource_mut::<ProfileStore>();
        store.profile.set_last_played_level(level);
        if let Some(p) = &player {
            store.profile.set_if_new_high_score(p.score);
        }
        store.profile.high_score
    };

    let mut hud = world.resource_mut::<Hud>();
    hud.level = level;
    hud.high_score = high_score;
    if let Some(p) = player {
        hud.lives = p.lives;
        hud.score = p.score;
    }
}

pub fn tick_director(world: &mut World) {
    mirror_progress(world);

    let dt = world.resource::<Time>().delta_secs();
    let Some(action) = world.resource_mut::<Director>().tick(dt) else {
        return;
    };
    debug!("director: {action:?}");
    run_action(world, action);
}

fn set_overlay(world: &mut World, overlay: Overlay) {
    world.resource_mut::<Hud>().overlay = overlay;
}

pub fn run_action(world: &mut World, action: DirectorAction) {
    let player = player_entity(world);

    match action {
        DirectorAction::ShowOverlay(overlay) => set_overlay(world, overlay),
        DirectorAction::ShowReady => {
            set_overlay(world, Overlay::Ready);
            if let Some(player) = player {
                set_player_visible(world, player, true);
            }
        }
        DirectorAction::UnlockPlayer => {
            if let Some(player) = player {
                setup_player(world, player);
            }
            set_overlay(world, Overlay::None);
            world.resource_mut::<FireControl>().allow();
            submit(world, EventId::EnableAction);
        }
        DirectorAction::Respawn => {
            if let Some(player) = player {
                set_player_state(world, player, PlayerState::Alive);
                setup_player(world, player);
            }
            set_overlay(world, Overlay::None);
            world.resource_mut::<FireControl>().allow();
            submit(world, EventId::EnableAction);
        }
        DirectorAction::AdvanceLevel => {
            let level = {
                let mut director = world.resource_mut::<Director>();
                director.level += 1;
                director.level
            };
            set_overlay(world, Overlay::Level);
            info!("advancing to level {level}");
        }
        DirectorAction::StartNextLevel => {
            if let Some(player) = player {
                set_player_state(world, player, PlayerState::Alive);
                setup_player(world, player);
            }
            set_overlay(world, Overlay::None);
            world.resource_mut::<FireControl>().allow();
            let level = world.resource::<Director>().level;
            setup_level(world, level);
            submit(world, EventId::EnableAction);
        }
        DirectorAction::AnnounceGameOver => {
            world
                .resource_mut::<EventBus>()
                .submit(EventId::GameOver, player);
            set_overlay(world, Overlay::GameOver);
        }
        DirectorAction::ReturnToMenu => {
            if let Some(mut next) = world.get_resource_mut::<NextState<GameState>>() {
                next.set(GameState::Menu);
            }
            info!("back to menu");
        }
    }
}

// -----------------------------------------------------------------------------
// Listeners
// -----------------------------------------------------------------------------

pub fn on_player_killed(world: &mut World, _event: &GameEvent) {
    let Some(player) = player_entity(world) else {
        return;
    };
    world
        .resource_mut::<FireControl>()
        .block_for(FIRE_BLOCK_ON_DEATH);
    set_player_visible(world, player, false);
    set_player_uncollidable(world, player);

    let Some((lives, score)) = world.get_mut::<Player>(player).map(|mut p| {
        p.lives = p.lives.saturating_sub(1);
        p.state = if p.lives > 0 {
            PlayerState::Respawning
        } else {
            PlayerState::Dead
        };
        (p.lives, p.score)
    }) else {
        return;
    };

    submit(world, EventId::DisableAction);

    if lives > 0 {
        info!("player killed, {lives} lives left");
        submit(world, EventId::CheckIsLevelClear);

        let mut director = world.resource_mut::<Director>();
        director.clear_queue();
        director.schedule(2.0, DirectorAction::ShowReady);
        director.schedule(1.0, DirectorAction::Respawn);
        return;
    }

    info!("game over with score {score}");
    let level = {
        let mut director = world.resource_mut::<Director>();
        director.clear_queue();
        if score > director.high_score_at_start {
            director.schedule(2.0, DirectorAction::ShowOverlay(Overlay::None));
            director.schedule(0.5, DirectorAction::ShowOverlay(Overlay::NewHighscore));
        }
        director.schedule(2.0, DirectorAction::AnnounceGameOver);
        director.schedule(10.0, DirectorAction::ReturnToMenu);
        director.level
    };

    let mut store = world.resource_mut::<ProfileStore>();
    store.profile.set_if_new_high_score(score);
    if level > store.profile.last_played_level {
        store.profile.set_last_played_level(level);
    }
    if let Err(err) = store.save() {
        warn!("could not persist profile: {err}");
    }
}

pub fn on_check_level_clear(world: &mut World, _event: &GameEvent) {
    let Some(player) = player_entity(world) else {
        return;
    };
    if world
        .get::<Player>(player)
        .is_some_and(|p| p.state == PlayerState::Dead)
    {
        return;
    }
    if !world.resource::<Groups>().is_empty(Group::Aliens) {
        return;
    }

    set_player_uncollidable(world, player);
    submit(world, EventId::DisableAction);
    world
        .resource_mut::<FireControl>()
        .block_for(FIRE_BLOCK_ON_CLEAR);

    let mut director = world.resource_mut::<Director>();
    info!("level {} clear", director.level);
    director.clear_queue();
    director.schedule(1.0, DirectorAction::ShowOverlay(Overlay::LevelDone));
    director.schedule(2.0, DirectorAction::ShowOverlay(Overlay::None));
    director.schedule(0.5, DirectorAction::AdvanceLevel);
    director.schedule(2.0, DirectorAction::StartNextLevel);
}

pub fn on_continue(world: &mut World, _event: &GameEvent) {
    world.resource_mut::<Director>().skip_wait();
}
