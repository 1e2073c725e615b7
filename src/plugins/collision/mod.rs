//! Group-pair collision detection and the gameplay rules applied on contact.
//!
//! Each frame walks a fixed list of group pairs, in order:
//!
//! ```text
//! PlayerShots x Aliens      shot dies, alien takes a hit, score
//! PlayerShots x AlienShots  shots cancel in a burst of particles
//! Player      x Aliens      alien takes 3 damage, player dies unless shielded
//! Player      x Coins       pickup
//! AlienShots  x Player      shot dies, player dies unless shielded
//! ```
//!
//! Every A entity is tested against every B entity using the bounds each one
//! carries (circle or axis-aligned rectangle, centred on `Position`). Missing
//! position or bounds means "no contact".
//!
//! Destruction is deferred through `Commands`, so the registry still lists
//! destroyed entities until the next sync point. The pass walks group
//! snapshots and records everything it destroys (or kills) in a per-frame
//! `gone` set; a gone entity never matches again.

use bevy::ecs::system::SystemParam;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::common::groups::{Group, GroupCommandsExt, Groups, Tag};
use crate::common::rng::GameRng;
use crate::common::tunables::Tunables;
use crate::plugins::aliens::{Health, IsAttacking};
use crate::plugins::animation::GameSprite;
use crate::plugins::audio::{SoundKey, play_sound};
use crate::plugins::coins::{Coin, CoinType};
use crate::plugins::core::FrameSet;
use crate::plugins::events::{EventBus, EventId};
use crate::plugins::lifecycle::{Expiry, ExpiryAction};
use crate::plugins::movement::Position;
use crate::plugins::player::{self, DoubleShot, Player, Shield};
use crate::plugins::world::factory;

#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct CircleBounds {
    pub radius: f32,
}

/// Axis-aligned box centred on the entity position.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct RectangleBounds {
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bounds {
    Circle(Vec2, f32),
    Rect(Rect),
}

#[inline]
pub fn circles_overlap(c1: Vec2, r1: f32, c2: Vec2, r2: f32) -> bool {
    let r = r1 + r2;
    c1.distance_squared(c2) <= r * r
}

#[inline]
pub fn circle_rect_overlap(c: Vec2, r: f32, rect: Rect) -> bool {
    let nearest = c.clamp(rect.min, rect.max);
    c.distance_squared(nearest) <= r * r
}

#[inline]
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.min.x <= b.max.x && b.min.x <= a.max.x && a.min.y <= b.max.y && b.min.y <= a.max.y
}

impl Bounds {
    pub fn overlaps(self, other: Bounds) -> bool {
        match (self, other) {
            (Bounds::Circle(c1, r1), Bounds::Circle(c2, r2)) => circles_overlap(c1, r1, c2, r2),
            (Bounds::Circle(c, r), Bounds::Rect(rect)) | (Bounds::Rect(rect), Bounds::Circle(c, r)) => {
                circle_rect_overlap(c, r, rect)
            }
            (Bounds::Rect(a), Bounds::Rect(b)) => rects_overlap(a, b),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pair {
    PlayerShotAlien,
    PlayerShotAlienShot,
    PlayerAlien,
    PlayerCoin,
    AlienShotPlayer,
}

const PAIRS: [(Group, Group, Pair); 5] = [
    (Group::PlayerShots, Group::Aliens, Pair::PlayerShotAlien),
    (Group::PlayerShots, Group::AlienShots, Pair::PlayerShotAlienShot),
    (Group::Player, Group::Aliens, Pair::PlayerAlien),
    (Group::Player, Group::Coins, Pair::PlayerCoin),
    (Group::AlienShots, Group::Player, Pair::AlienShotPlayer),
];

const PARTICLES_ON_SHOT_CANCEL: usize = 10;
const CONTACT_DAMAGE: i32 = 3;

pub fn plugin(app: &mut App) {
    app.add_systems(Update, resolve_collisions.in_set(FrameSet::Collision));
}

#[derive(SystemParam)]
pub struct CollisionCtx<'w, 's> {
    commands: Commands<'w, 's>,
    groups: Res<'w, Groups>,
    tunables: Res<'w, Tunables>,
    rng: ResMut<'w, GameRng>,
    bus: ResMut<'w, EventBus>,
    shapes: Query<
        'w,
        's,
        (
            &'static Position,
            Option<&'static CircleBounds>,
            Option<&'static RectangleBounds>,
        ),
    >,
    health: Query<'w, 's, &'static mut Health>,
    attacking: Query<'w, 's, (), With<IsAttacking>>,
    shielded: Query<'w, 's, (), With<Shield>>,
    coins: Query<'w, 's, &'static Coin>,
    players: Query<'w, 's, (&'static mut Player, &'static mut GameSprite)>,
    gone: Local<'s, HashSet<Entity>>,
}

impl CollisionCtx<'_, '_> {
    fn bounds(&self, entity: Entity) -> Option<Bounds> {
        let (pos, circle, rect) = self.shapes.get(entity).ok()?;
        match (circle, rect) {
            (Some(c), _) => Some(Bounds::Circle(pos.0, c.radius)),
            (None, Some(r)) => Some(Bounds::Rect(Rect::from_center_size(
                pos.0,
                Vec2::new(r.width, r.height),
            ))),
            (None, None) => None,
        }
    }

    fn position(&self, entity: Entity) -> Option<Vec2> {
        self.shapes.get(entity).ok().map(|(p, _, _)| p.0)
    }

    fn collides(&self, a: Entity, b: Entity) -> bool {
        match (self.bounds(a), self.bounds(b)) {
            (Some(a), Some(b)) => a.overlaps(b),
            _ => false,
        }
    }

    fn destroy(&mut self, entity: Entity) {
        self.gone.insert(entity);
        self.commands.destroy(entity);
    }

    fn add_score(&mut self, points: u32) {
        let Some(player) = self.groups.tagged(Tag::Player) else {
            return;
        };
        if let Ok((mut p, _)) = self.players.get_mut(player) {
            p.score += points;
        }
    }

    fn kill_alien(&mut self, alien: Entity, at: Vec2, boss: bool) {
        if boss {
            factory::alien_boss_explosion(&mut self.commands, &mut self.rng, at);
        } else {
            factory::alien_explosion(&mut self.commands, &mut self.rng, at);
        }
        self.destroy(alien);
        self.bus.submit(EventId::CheckIsLevelClear, Some(alien));
    }

    /// Kill the player unless a shield is up.
    fn hit_player(&mut self, player: Entity) {
        if self.shielded.contains(player) {
            return;
        }
        if let Some(at) = self.position(player) {
            factory::player_explosion(&mut self.commands, &mut self.rng, at);
        }
        self.gone.insert(player);
        self.bus.submit(EventId::PlayerKilled, Some(player));
    }

    fn handle(&mut self, pair: Pair, a: Entity, b: Entity) {
        match pair {
            Pair::PlayerShotAlien => self.player_shot_hits_alien(a, b),
            Pair::PlayerShotAlienShot => self.shots_cancel(b),
            Pair::PlayerAlien => self.player_rams_alien(a, b),
            Pair::PlayerCoin => self.player_picks_coin(a, b),
            Pair::AlienShotPlayer => {
                self.destroy(a);
                self.hit_player(b);
            }
        }
    }

    fn player_shot_hits_alien(&mut self, shot: Entity, alien: Entity) {
        self.destroy(shot);

        let attacking = u32::from(self.attacking.contains(alien));
        let Some(at) = self.position(alien) else {
            return;
        };

        match self.health.get_mut(alien) {
            Ok(mut health) => {
                health.hp -= 1;
                if health.hp <= 0 {
                    self.add_score(100 + attacking * 50);
                    self.kill_alien(alien, at, true);
                } else {
                    self.add_score(25 + attacking * 25);
                    play_sound(&mut self.commands, SoundKey::AlienBossHit);
                }
            }
            Err(_) => {
                self.add_score(25 + attacking * 25);
                self.kill_alien(alien, at, false);
            }
        }
    }

    fn shots_cancel(&mut self, alien_shot: Entity) {
        if let Some(at) = self.position(alien_shot) {
            for _ in 0..PARTICLES_ON_SHOT_CANCEL {
                factory::particle(&mut self.commands, &mut self.rng, at);
            }
        }
        self.destroy(alien_shot);
    }

    fn player_rams_alien(&mut self, player: Entity, alien: Entity) {
        let (dead, boss) = match self.health.get_mut(alien) {
            Ok(mut health) => {
                health.hp -= CONTACT_DAMAGE;
                (health.hp <= 0, true)
            }
            Err(_) => (true, false),
        };

        if dead {
            if let Some(at) = self.position(alien) {
                self.add_score(25);
                self.kill_alien(alien, at, boss);
            }
        }

        self.hit_player(player);
    }

    fn player_picks_coin(&mut self, player: Entity, coin: Entity) {
        let Ok(kind) = self.coins.get(coin).map(|c| c.0) else {
            return;
        };
        self.destroy(coin);
        play_sound(&mut self.commands, SoundKey::Boing);

        let buff = Expiry::after(self.tunables.buff_duration);
        match kind {
            CoinType::ExtraLife => {
                if let Ok((mut p, _)) = self.players.get_mut(player) {
                    p.lives += 1;
                }
            }
            CoinType::DoubleShot => {
                self.commands.entity(player).try_insert(DoubleShot(buff));
            }
            CoinType::Shield => {
                if let Ok((_, mut sprite)) = self.players.get_mut(player) {
                    sprite.name = player::SPRITE_NAME_SHIELD;
                }
                self.commands.entity(player).try_insert(Shield(
                    buff.then(ExpiryAction::RestoreSprite(player::SPRITE_NAME)),
                ));
            }
        }
    }
}

pub fn resolve_collisions(mut ctx: CollisionCtx) {
    ctx.gone.clear();

    for (group_a, group_b, pair) in PAIRS {
        let list_a = ctx.groups.snapshot(group_a);
        let list_b = ctx.groups.snapshot(group_b);

        for &a in &list_a {
            for &b in &list_b {
                if ctx.gone.contains(&a) {
                    break;
                }
                if ctx.gone.contains(&b) || !ctx.collides(a, b) {
                    continue;
                }
                ctx.handle(pair, a, b);
            }
        }
    }
}

#[cfg(test)]
mod tests;
