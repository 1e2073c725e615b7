//! Render plugin (full app only): turns gameplay state into Bevy sprites and text.
//!
//! Gameplay never touches `Sprite`, `Transform` or `Text`; this plugin
//! derives them after the frame's gameplay has settled:
//!
//! ```text
//! GameSprite + Position (+ Invisible) -> Sprite, Transform, Visibility
//! Health                               -> "NN%" label child
//! Hud                                  -> header line + centred banner
//! ```
//!
//! There is no texture atlas; every sprite name maps to a coloured quad of
//! the right size.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::plugins::aliens::Health;
use crate::plugins::animation::{GameSprite, Invisible, SpriteLayer};
use crate::plugins::camera::arena_to_world;
use crate::plugins::hud::Hud;
use crate::plugins::movement::Position;

#[derive(Component)]
pub struct HealthLabel;

#[derive(Component)]
pub struct HudHeader;

#[derive(Component)]
pub struct HudBanner;

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_hud).add_systems(
        PostUpdate,
        (
            attach_sprites,
            sync_sprites,
            attach_health_labels,
            sync_health_labels,
            sync_hud,
        )
            .chain()
            .before(TransformSystems::Propagate),
    );
}

pub fn layer_z(layer: SpriteLayer) -> f32 {
    match layer {
        SpriteLayer::Background => 0.0,
        SpriteLayer::Actors => 10.0,
        SpriteLayer::Effects => 20.0,
    }
}

/// Unscaled quad size per sprite name.
pub fn sprite_size(name: &str) -> Vec2 {
    match name {
        "background" => Vec2::new(800.0, 480.0),
        "player" | "playershield" => Vec2::splat(32.0),
        "alien" => Vec2::splat(28.0),
        "alienboss" => Vec2::splat(124.0),
        "playerShot" => Vec2::new(10.0, 45.0),
        "alienShot" => Vec2::new(2.0, 10.0),
        "coin" => Vec2::splat(32.0),
        "explosion" => Vec2::splat(16.0),
        "particle" => Vec2::splat(3.0),
        _ => Vec2::splat(8.0),
    }
}

fn tint(sprite: &GameSprite) -> Color {
    match sprite.name {
        // The shield variant glows.
        "playershield" => Color::srgb(0.5, 1.0, 1.0),
        "background" => Color::srgb(0.02, 0.02, 0.08),
        _ => Color::from(sprite.color),
    }
}

pub fn attach_sprites(
    mut commands: Commands,
    q: Query<(Entity, &GameSprite), Without<Sprite>>,
) {
    for (e, sprite) in &q {
        commands
            .entity(e)
            .try_insert(Sprite::from_color(tint(sprite), sprite_size(sprite.name)));
    }
}

pub fn sync_sprites(
    mut q: Query<(
        &Position,
        &GameSprite,
        Has<Invisible>,
        &mut Sprite,
        &mut Transform,
        &mut Visibility,
    )>,
) {
    for (pos, sprite, invisible, mut out, mut tf, mut vis) in &mut q {
        tf.translation = arena_to_world(pos.0).extend(layer_z(sprite.layer));
        tf.scale = Vec3::splat(sprite.scale);
        tf.rotation = Quat::from_rotation_z(sprite.rotation.to_radians());

        out.color = tint(sprite);
        out.custom_size = Some(sprite_size(sprite.name));

        *vis = if invisible {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };
    }
}

fn attach_health_labels(mut commands: Commands, q: Query<Entity, Added<Health>>) {
    for e in &q {
        commands.entity(e).with_child((
            HealthLabel,
            Text2d::new(""),
            TextFont {
                font_size: 20.0,
                ..default()
            },
            Transform::from_xyz(0.0, 0.0, 1.0),
        ));
    }
}

fn sync_health_labels(
    healths: Query<&Health>,
    mut labels: Query<(&ChildOf, &mut Text2d), With<HealthLabel>>,
) {
    for (child_of, mut text) in &mut labels {
        let Ok(health) = healths.get(child_of.parent()) else {
            continue;
        };
        let label = format!("{}%", health.percent());
        if text.0 != label {
            text.0 = label;
        }
    }
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Name::new("HudHeader"),
        HudHeader,
        Text::new(""),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(4.0),
            left: Val::Px(8.0),
            ..default()
        },
        DespawnOnExit(GameState::InGame),
    ));
    commands.spawn((
        Name::new("HudBanner"),
        HudBanner,
        Text::new(""),
        TextFont {
            font_size: 48.0,
            ..default()
        },
        Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(40.0),
            left: Val::Percent(35.0),
            ..default()
        },
        DespawnOnExit(GameState::InGame),
    ));
}

fn sync_hud(
    hud: Res<Hud>,
    mut header: Query<&mut Text, (With<HudHeader>, Without<HudBanner>)>,
    mut banner: Query<&mut Text, (With<HudBanner>, Without<HudHeader>)>,
) {
    if !hud.is_changed() {
        return;
    }
    for mut text in &mut header {
        text.0 = hud.header_line();
    }
    for mut text in &mut banner {
        text.0 = hud.banner().unwrap_or_default();
    }
}
