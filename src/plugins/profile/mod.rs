//! Player profile: high score and last level reached, persisted as JSON.
//!
//! The profile lives in memory for the whole session; the director updates
//! it every frame and it is written to disk when a run ends, when the app
//! quits and (full app) when the window loses focus. A missing or unreadable
//! file is never fatal: a fresh profile replaces it.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use bevy::window::WindowFocused;
use serde::{Deserialize, Serialize};

use crate::common::error::ProfileError;
use crate::common::state::GameState;

pub const PROFILE_FILENAME: &str = "profile-v1.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub high_score: u32,
    pub last_played_level: u32,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            high_score: 0,
            last_played_level: 1,
        }
    }
}

impl Profile {
    /// Raise the high score; true if `score` beat it.
    pub fn set_if_new_high_score(&mut self, score: u32) -> bool {
        if score > self.high_score {
            self.high_score = score;
            return true;
        }
        false
    }

    pub fn set_last_played_level(&mut self, level: u32) {
        self.last_played_level = level;
    }
}

#[derive(Resource, Debug, Default)]
pub struct ProfileStore {
    pub profile: Profile,
    path: Option<PathBuf>,
}

impl ProfileStore {
    /// A profile that is never written anywhere.
    pub fn in_memory(profile: Profile) -> Self {
        Self {
            profile,
            path: None,
        }
    }

    /// Load from `path`, falling back to a fresh profile (written back
    /// immediately) when the file is missing or malformed.
    pub fn load_from(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match read_profile(&path) {
            Ok(profile) => {
                info!("profile loaded from {}", path.display());
                Self {
                    profile,
                    path: Some(path),
                }
            }
            Err(err) => {
                match &err {
                    ProfileError::Io(io) if io.kind() == ErrorKind::NotFound => {
                        info!("no profile at {}, creating one", path.display());
                    }
                    _ => warn!("discarding unreadable profile {}: {err}", path.display()),
                }
                let store = Self {
                    profile: Profile::default(),
                    path: Some(path),
                };
                if let Err(err) = store.save() {
                    warn!("could not write fresh profile: {err}");
                }
                store
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn save(&self) -> Result<(), ProfileError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.profile)?;
        fs::write(path, json)?;
        debug!("profile saved to {}", path.display());
        Ok(())
    }
}

fn read_profile(path: &Path) -> Result<Profile, ProfileError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(text.trim())?)
}

pub fn plugin(app: &mut App) {
    app.init_resource::<ProfileStore>()
        .add_systems(OnExit(GameState::InGame), persist_profile)
        .add_systems(Last, save_on_exit);
}

fn save_logged(store: &ProfileStore) {
    if let Err(err) = store.save() {
        warn!("could not persist profile: {err}");
    }
}

pub fn persist_profile(store: Res<ProfileStore>) {
    save_logged(&store);
}

/// Runs in `Last`, so the frame that requested the exit is already mirrored.
pub fn save_on_exit(mut exits: MessageReader<AppExit>, store: Res<ProfileStore>) {
    if exits.read().count() > 0 {
        save_logged(&store);
    }
}

/// Desktop counterpart of a pause. Needs the window messages, so only the
/// full app installs it.
pub fn save_on_focus_lost(mut focus: MessageReader<WindowFocused>, store: Res<ProfileStore>) {
    if focus.read().any(|f| !f.focused) {
        save_logged(&store);
    }
}
