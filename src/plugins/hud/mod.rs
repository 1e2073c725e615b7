//! HUD state: the four header counters and the centred overlay banner.
//!
//! Gameplay only writes [`Hud`]; drawing it is the render plugin's job.

use bevy::prelude::*;

use crate::common::state::GameState;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Overlay {
    #[default]
    None,
    Level,
    NewHighscore,
    Ready,
    LevelDone,
    GameOver,
}

#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct Hud {
    pub overlay: Overlay,
    pub lives: u32,
    pub score: u32,
    pub high_score: u32,
    pub level: u32,
}

impl Hud {
    /// Header cells, left to right.
    pub fn columns(&self) -> [(&'static str, u32); 4] {
        [
            ("LIVES", self.lives),
            ("SCORE", self.score),
            ("HIGH SCORE", self.high_score),
            ("LEVEL", self.level),
        ]
    }

    pub fn header_line(&self) -> String {
        self.columns()
            .iter()
            .map(|(label, value)| format!("{label} {value}"))
            .collect::<Vec<_>>()
            .join("    ")
    }

    pub fn banner(&self) -> Option<String> {
        match self.overlay {
            Overlay::None => None,
            Overlay::Level => Some(format!("Level {}", self.level)),
            Overlay::NewHighscore => Some("New\nHighScore".to_string()),
            Overlay::Ready => Some("READY".to_string()),
            Overlay::LevelDone => Some("LEVEL DONE".to_string()),
            Overlay::GameOver => Some("GAME OVER".to_string()),
        }
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<Hud>()
        .add_systems(OnExit(GameState::InGame), clear_hud);
}

fn clear_hud(mut hud: ResMut<Hud>) {
    *hud = Hud::default();
}
