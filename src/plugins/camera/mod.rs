//! Camera plugin: one fixed 2D camera framing the arena, plus pointer input.
//!
//! Arena coordinates have their origin in the bottom-left corner; the camera
//! sits at the arena centre, so world = arena - (W/2, H/2).
//!
//! ```text
//! Startup: spawn MainCamera (letterboxed to at least 800 x 480)
//! Input:   left click -> cursor drives PlayerIntent.direct_x until a key
//!          press, left button held -> fire
//! ```

use bevy::camera::ScalingMode;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::common::tunables::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::plugins::core::FrameSet;
use crate::plugins::player::{self, PlayerIntent};

#[derive(Component)]
pub struct MainCamera;

pub fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_camera).add_systems(
        Update,
        pointer_input
            .in_set(FrameSet::Input)
            .after(player::gather_keyboard)
            .before(player::apply_player_input),
    );
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("MainCamera"),
        Camera2d,
        MainCamera,
        Projection::Orthographic(OrthographicProjection {
            scaling_mode: ScalingMode::AutoMin {
                min_width: ARENA_WIDTH,
                min_height: ARENA_HEIGHT,
            },
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_xyz(0.0, 0.0, 999.0),
    ));
}

/// Camera-space position of an arena point.
#[inline]
pub fn arena_to_world(p: Vec2) -> Vec2 {
    p - Vec2::new(ARENA_WIDTH, ARENA_HEIGHT) / 2.0
}

/// Arena x under a camera-space x, clamped to the playfield.
#[inline]
pub fn world_to_arena_x(x: f32) -> f32 {
    (x + ARENA_WIDTH / 2.0).clamp(0.0, ARENA_WIDTH)
}

/// Pointer steering starts with a click and then follows the cursor; a key
/// press (see [`player::gather_keyboard`]) clears `direct_x` and ends it.
pub fn steer(intent: &mut PlayerIntent, clicked: bool, cursor_x: Option<f32>) {
    if !clicked && intent.direct_x.is_none() {
        return;
    }
    if let Some(x) = cursor_x {
        intent.direct_x = Some(world_to_arena_x(x));
    }
}

fn pointer_input(
    mouse: Option<Res<ButtonInput<MouseButton>>>,
    q_window: Query<&Window, With<PrimaryWindow>>,
    q_cam: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut intent: ResMut<PlayerIntent>,
) {
    let clicked = mouse
        .as_ref()
        .is_some_and(|m| m.just_pressed(MouseButton::Left));
    if mouse.is_some_and(|m| m.pressed(MouseButton::Left)) {
        intent.fire = true;
    }

    let cursor_x = q_window
        .single()
        .ok()
        .and_then(|window| window.cursor_position())
        .zip(q_cam.single().ok())
        .and_then(|(cursor, (camera, cam_tf))| camera.viewport_to_world_2d(cam_tf, cursor).ok())
        .map(|world| world.x);

    steer(&mut intent, clicked, cursor_x);
}
