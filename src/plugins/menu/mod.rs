//! Menu state: start a fresh run, continue at the last level, or leave a run.
//!
//! There is no menu UI; keys map straight to choices:
//! - fire keys / Enter: start at level 1
//! - C: continue at the last played level
//! - Escape (in game): back to the menu

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::audio::{MusicKey, PlayMusic, PlaySound, SoundKey};
use crate::plugins::player::FIRE_KEYS;
use crate::plugins::profile::{Profile, ProfileStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuChoice {
    Start,
    Continue,
}

/// Prepare the profile for the chosen run. Returns the starting level.
pub fn apply_choice(choice: MenuChoice, profile: &mut Profile) -> u32 {
    if choice == MenuChoice::Start {
        profile.set_last_played_level(1);
    }
    profile.last_played_level.max(1)
}

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::Menu), enter_menu)
        .add_systems(Update, menu_input.run_if(in_state(GameState::Menu)))
        .add_systems(Update, leave_run.run_if(in_state(GameState::InGame)));
}

fn enter_menu(store: Res<ProfileStore>, mut music: MessageWriter<PlayMusic>) {
    music.write(PlayMusic(MusicKey::Menu));
    info!(
        "menu: high score {}, last level {}",
        store.profile.high_score, store.profile.last_played_level
    );
}

pub fn menu_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut store: ResMut<ProfileStore>,
    mut next: ResMut<NextState<GameState>>,
    mut sounds: MessageWriter<PlaySound>,
) {
    let Some(keys) = keys else {
        return;
    };
    let choice = if keys.any_just_pressed(FIRE_KEYS) || keys.just_pressed(KeyCode::Enter) {
        MenuChoice::Start
    } else if keys.just_pressed(KeyCode::KeyC) {
        MenuChoice::Continue
    } else {
        return;
    };

    let level = apply_choice(choice, &mut store.profile);
    sounds.write(PlaySound(SoundKey::Click));
    next.set(GameState::InGame);
    info!("{choice:?} at level {level}");
}

pub fn leave_run(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut next: ResMut<NextState<GameState>>,
) {
    if keys.is_some_and(|k| k.just_pressed(KeyCode::Escape)) {
        next.set(GameState::Menu);
    }
}
