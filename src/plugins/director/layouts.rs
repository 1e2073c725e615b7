//! Alien layouts per level.
//!
//! Levels cycle through ten layouts (`level % 10`). Grid aliens take their
//! attack formation from [`FORMATIONS`], so neighbours tend to attack
//! together.

use bevy::prelude::*;

use crate::common::tunables::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::plugins::path::PathFunctionId;

pub const BOSS_HEALTH: i32 = 10;

const CELL: f32 = 60.0;
const COLUMNS: usize = 10;

/// Attack formation per grid cell, `[row][column]`.
pub const FORMATIONS: [[u32; COLUMNS]; 4] = [
    [9, 1, 9, 7, 7, 8, 8, 10, 2, 10],
    [1, 1, 1, 5, 7, 8, 6, 2, 2, 2],
    [9, 3, 5, 5, 5, 6, 6, 6, 4, 10],
    [3, 3, 3, 12, 11, 11, 12, 4, 4, 4],
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AlienSpawn {
    Alien { at: Vec2, formation: u32 },
    Boss { at: Vec2, attack: PathFunctionId },
}

/// Anchor of grid cell (`column`, `row`); row 0 is the top row.
pub fn cell_position(column: usize, row: usize) -> Vec2 {
    Vec2::new(
        (ARENA_WIDTH - 9.0 * CELL) / 2.0 + column as f32 * CELL,
        ARENA_HEIGHT - CELL * 1.5 - row as f32 * CELL,
    )
}

fn grid(out: &mut Vec<AlienSpawn>, x: usize, y: usize, width: usize, height: usize) {
    for column in x..x + width {
        for row in y..y + height {
            out.push(AlienSpawn::Alien {
                at: cell_position(column, row),
                formation: FORMATIONS[row][column],
            });
        }
    }
}

fn boss(out: &mut Vec<AlienSpawn>, x: f32, attack: PathFunctionId) {
    out.push(AlienSpawn::Boss {
        at: Vec2::new(x, ARENA_HEIGHT * 2.0 / 3.0),
        attack,
    });
}

pub fn layout(level: u32) -> Vec<AlienSpawn> {
    let mut out = Vec::new();
    match level % 10 {
        1 | 4 | 7 => grid(&mut out, 0, 0, 10, 3),
        2 | 5 | 8 => grid(&mut out, 0, 0, 10, 4),
        3 => boss(&mut out, ARENA_WIDTH / 2.0, PathFunctionId::BossAttack),
        6 => {
            grid(&mut out, 0, 2, 3, 1);
            grid(&mut out, 7, 2, 3, 1);
            boss(&mut out, ARENA_WIDTH / 2.0, PathFunctionId::BossAttack);
        }
        9 => {
            grid(&mut out, 0, 0, 3, 3);
            grid(&mut out, 7, 0, 3, 3);
            boss(&mut out, ARENA_WIDTH / 2.0, PathFunctionId::BossAttack);
        }
        _ => {
            grid(&mut out, 3, 0, 4, 3);
            boss(&mut out, ARENA_WIDTH / 4.0, PathFunctionId::TwoBossesAttack);
            boss(&mut out, ARENA_WIDTH * 3.0 / 4.0, PathFunctionId::TwoBossesAttack);
        }
    }
    out
}
