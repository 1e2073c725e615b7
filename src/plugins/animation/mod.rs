//! Rendering intent and the visual animations that drive it.
//!
//! [`GameSprite`] is what gameplay code says an entity *looks like*; the
//! render plugin turns it into real draw calls. The animation systems only
//! mutate that intent (alpha fade, scale pulse, animation clock).

use bevy::color::Srgba;
use bevy::prelude::*;

use crate::plugins::core::FrameSet;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpriteLayer {
    Background,
    #[default]
    Actors,
    Effects,
}

#[derive(Component, Clone, Debug, PartialEq)]
pub struct GameSprite {
    pub name: &'static str,
    pub layer: SpriteLayer,
    pub color: Srgba,
    pub scale: f32,
    pub rotation: f32,
}

impl GameSprite {
    pub fn new(name: &'static str, layer: SpriteLayer) -> Self {
        Self {
            name,
            layer,
            color: Srgba::WHITE,
            scale: 1.0,
            rotation: 0.0,
        }
    }

    pub fn with_color(mut self, color: Srgba) -> Self {
        self.color = color;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayMode {
    #[default]
    Once,
    Loop,
}

/// Frame clock for multi-frame sprites.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct AnimationParameters {
    pub frame_duration: f32,
    pub play_mode: PlayMode,
    pub state_time: f32,
}

impl AnimationParameters {
    pub fn new(frame_duration: f32, play_mode: PlayMode) -> Self {
        Self {
            frame_duration,
            play_mode,
            state_time: 0.0,
        }
    }

    /// Index of the frame to draw for an animation of `frames` frames.
    pub fn frame_index(&self, frames: usize) -> usize {
        if frames == 0 || self.frame_duration <= 0.0 {
            return 0;
        }
        let index = (self.state_time / self.frame_duration) as usize;
        match self.play_mode {
            PlayMode::Once => index.min(frames - 1),
            PlayMode::Loop => index % frames,
        }
    }
}

/// Alpha fade between `alpha_min` and `alpha_max`.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct ColorAnimation {
    pub active: bool,
    pub alpha_speed: f32,
    pub alpha_min: f32,
    pub alpha_max: f32,
    pub repeat: bool,
}

impl ColorAnimation {
    pub fn fade_out(speed: f32) -> Self {
        Self {
            active: true,
            alpha_speed: -speed,
            alpha_min: 0.0,
            alpha_max: 1.0,
            repeat: false,
        }
    }
}

/// Uniform scale pulse clamped to `[min, max]`.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct ScaleAnimation {
    pub active: bool,
    pub min: f32,
    pub max: f32,
    pub speed: f32,
}

/// Entity is skipped by the renderer but keeps simulating.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Invisible;

pub fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (advance_animation_clock, animate_color, animate_scale).in_set(FrameSet::Animation),
    );
}

pub fn advance_animation_clock(time: Res<Time>, mut q: Query<&mut AnimationParameters>) {
    let dt = time.delta_secs();
    for mut params in &mut q {
        params.state_time += dt;
    }
}

pub fn animate_color(time: Res<Time>, mut q: Query<(&mut ColorAnimation, &mut GameSprite)>) {
    let dt = time.delta_secs();
    for (mut anim, mut sprite) in &mut q {
        if !anim.active {
            continue;
        }
        sprite.color.alpha += anim.alpha_speed * dt;

        if sprite.color.alpha > anim.alpha_max || sprite.color.alpha < anim.alpha_min {
            if anim.repeat {
                anim.alpha_speed = -anim.alpha_speed;
            } else {
                anim.active = false;
            }
            sprite.color.alpha = sprite.color.alpha.clamp(anim.alpha_min, anim.alpha_max);
        }
    }
}

pub fn animate_scale(time: Res<Time>, mut q: Query<(&mut ScaleAnimation, &mut GameSprite)>) {
    let dt = time.delta_secs();
    for (mut anim, mut sprite) in &mut q {
        if !anim.active {
            continue;
        }
        sprite.scale += anim.speed * dt;

        if sprite.scale > anim.max {
            sprite.scale = anim.max;
            anim.active = false;
        } else if sprite.scale < anim.min {
            sprite.scale = anim.min;
            anim.active = false;
        }
    }
}
