//! Sound and music requests.
//!
//! Gameplay code only *asks* for audio: it writes a [`PlaySound`] or
//! [`PlayMusic`] message and moves on. The consumer at the end of the frame
//! applies [`AudioSettings`] and hands the request to the output backend.
//! Mixing and asset decoding are not handled here.

use bevy::prelude::*;

use crate::common::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundKey {
    Boing,
    Click,
    AlienShot,
    AlienExplosion,
    AlienBossHit,
    AlienBossExplosion,
    PlayerShot,
    PlayerExplosion,
}

impl SoundKey {
    pub fn path(self) -> &'static str {
        match self {
            SoundKey::Boing => "sound/boing.ogg",
            SoundKey::Click => "sound/click.ogg",
            SoundKey::AlienShot => "sound/alienshot.ogg",
            SoundKey::AlienExplosion => "sound/alienexplosion.ogg",
            SoundKey::AlienBossHit => "sound/alienbosshit.ogg",
            SoundKey::AlienBossExplosion => "sound/alienbossexplosion.ogg",
            SoundKey::PlayerShot => "sound/playershot.ogg",
            SoundKey::PlayerExplosion => "sound/playerexplosion.ogg",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MusicKey {
    Menu,
    Game,
}

impl MusicKey {
    pub fn path(self) -> &'static str {
        match self {
            MusicKey::Menu => "music/menu.ogg",
            MusicKey::Game => "music/game.ogg",
        }
    }
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaySound(pub SoundKey);

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayMusic(pub MusicKey);

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct AudioSettings {
    volume: f32,
    pub sound_enabled: bool,
    pub music_enabled: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 0.5,
            sound_enabled: true,
            music_enabled: true,
        }
    }
}

impl AudioSettings {
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Reject anything outside `[0, 1]`; the previous volume is kept.
    pub fn set_volume(&mut self, volume: f32) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(ConfigError::VolumeOutOfRange(volume));
        }
        self.volume = volume;
        Ok(())
    }
}

/// What the output backend is currently doing.
#[derive(Resource, Debug, Default)]
pub struct AudioOutput {
    pub music: Option<MusicKey>,
    pub sounds_played: u64,
}

/// Request a sound from code that only holds `Commands` (entity factories).
pub fn play_sound(commands: &mut Commands, key: SoundKey) {
    commands.queue(move |world: &mut World| {
        world.write_message(PlaySound(key));
    });
}

pub fn plugin(app: &mut App) {
    app.add_message::<PlaySound>()
        .add_message::<PlayMusic>()
        .init_resource::<AudioSettings>()
        .init_resource::<AudioOutput>()
        .add_systems(PostUpdate, (dispatch_music, dispatch_sounds));
}

fn dispatch_music(
    settings: Res<AudioSettings>,
    mut requests: MessageReader<PlayMusic>,
    mut output: ResMut<AudioOutput>,
) {
    let Some(PlayMusic(key)) = requests.read().last().copied() else {
        return;
    };
    if !settings.music_enabled {
        output.music = None;
        return;
    }
    if output.music != Some(key) {
        info!("music: {} (volume {:.2})", key.path(), settings.volume());
        output.music = Some(key);
    }
}

fn dispatch_sounds(
    settings: Res<AudioSettings>,
    mut requests: MessageReader<PlaySound>,
    mut output: ResMut<AudioOutput>,
) {
    for PlaySound(key) in requests.read() {
        if !settings.sound_enabled {
            continue;
        }
        debug!("sound: {}", key.path());
        output.sounds_played += 1;
    }
}
