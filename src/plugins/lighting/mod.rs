//! Lighting plugin (Firefly) (render-only).
//!
//! A light follows the player; impact cues from the combat engine leave a
//! short-lived flash behind.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::*;

use crate::common::state::GameState;
use crate::plugins::fx::{CueTint, VisualCue};
use crate::plugins::player::Player;

const FLASH_SECONDS: f32 = 0.15;
/// Flashes beyond this many per frame are dropped.
const MAX_FLASHES_PER_FRAME: usize = 24;

#[derive(Component)]
pub struct PlayerLight;

#[derive(Component)]
pub struct ImpactFlash {
    pub remaining: f32,
}

pub fn plugin(app: &mut App) {
    if !app.is_plugin_added::<FireflyPlugin>() {
        app.add_plugins(FireflyPlugin);
    }

    app.add_systems(OnEnter(GameState::InGame), setup)
        .add_systems(
            Update,
            (follow_player_light, spawn_impact_flashes, fade_impact_flashes)
                .run_if(in_state(GameState::InGame)),
        );
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Name::new("PlayerLight"),
        PlayerLight,
        PointLight2d {
            color: Color::srgb(1.0, 0.9, 0.75),
            radius: 450.0,
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 10.0),
        DespawnOnExit(GameState::InGame),
    ));
}

fn follow_player_light(
    q_player: Query<&Transform, (With<Player>, Without<PlayerLight>)>,
    mut q_light: Query<&mut Transform, (With<PlayerLight>, Without<Player>)>,
) {
    let Ok(tf_player) = q_player.single() else {
        return;
    };
    let Ok(mut tf_light) = q_light.single_mut() else {
        return;
    };

    tf_light.translation.x = tf_player.translation.x;
    tf_light.translation.y = tf_player.translation.y;
}

fn tint_color(tint: CueTint) -> Color {
    match tint {
        CueTint::Neutral => Color::srgb(1.0, 1.0, 0.9),
        CueTint::Fire => Color::srgb(1.0, 0.5, 0.15),
        CueTint::Frost => Color::srgb(0.5, 0.8, 1.0),
        CueTint::Poison => Color::srgb(0.5, 1.0, 0.3),
        CueTint::Lightning => Color::srgb(0.75, 0.75, 1.0),
        CueTint::Holy => Color::srgb(1.0, 0.95, 0.6),
        CueTint::Boss => Color::srgb(0.9, 0.2, 0.6),
    }
}

fn spawn_impact_flashes(mut commands: Commands, mut cues: MessageReader<VisualCue>) {
    let impacts: Vec<_> = cues
        .read()
        .filter_map(|cue| match *cue {
            VisualCue::Impact {
                position,
                radius,
                tint,
            } => Some((position, radius, tint)),
            _ => None,
        })
        .collect();
    for (position, radius, tint) in impacts.into_iter().take(MAX_FLASHES_PER_FRAME) {
        commands.spawn((
            Name::new("ImpactFlash"),
            ImpactFlash {
                remaining: FLASH_SECONDS,
            },
            PointLight2d {
                color: tint_color(tint),
                radius: radius.max(16.0) * 2.0,
                ..default()
            },
            Transform::from_translation(position.extend(10.0)),
            DespawnOnExit(GameState::InGame),
        ));
    }
}

fn fade_impact_flashes(
    mut commands: Commands,
    time: Res<Time>,
    mut q: Query<(Entity, &mut ImpactFlash)>,
) {
    for (e, mut flash) in &mut q {
        flash.remaining -= time.delta_secs();
        if flash.remaining <= 0.0 {
            commands.entity(e).despawn();
        }
    }
}
