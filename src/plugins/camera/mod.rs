//! Camera plugin (render-only).
//!
//! The camera follows the player and turns the cursor into the player's
//! [`Aim`]. A system cannot have `Query<&Transform>` and `Query<&mut Transform>`
//! at the same time unless Bevy can prove those queries are disjoint (B0001),
//! so the filters below carry `Without<...>` on both sides.
//!
//! ```text
//! OnEnter(InGame): spawn MainCamera
//! Update:          aim_from_cursor writes Aim on the player
//! PostUpdate:      follow_player eases the camera toward the player
//! ```

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::*;

use crate::common::state::GameState;
use crate::plugins::player::{Aim, Player};

#[derive(Component)]
pub struct MainCamera {
    pub responsiveness: f32,
}

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_camera)
        .add_systems(Update, aim_from_cursor.run_if(in_state(GameState::InGame)))
        .add_systems(
            PostUpdate,
            follow_player
                .before(TransformSystems::Propagate)
                .run_if(in_state(GameState::InGame)),
        );
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("MainCamera"),
        Camera2d,
        MainCamera { responsiveness: 5.0 },
        FireflyConfig::default(),
        Transform::from_xyz(0.0, 0.0, 999.0),
        DespawnOnExit(GameState::InGame),
    ));
}

/// Aim at the cursor while it is inside the window; otherwise clear the aim
/// so weapons fall back to the last movement direction.
fn aim_from_cursor(
    windows: Query<&Window>,
    q_camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut q_player: Query<(&Transform, &mut Aim), With<Player>>,
) {
    let Ok((player_tf, mut aim)) = q_player.single_mut() else {
        return;
    };
    let origin = player_tf.translation.truncate();

    let cursor = windows.single().ok().and_then(|w| w.cursor_position());
    let Some(cursor) = cursor else {
        aim.0 = None;
        return;
    };
    let (camera, camera_tf) = match q_camera.single() {
        Ok(v) => v,
        Err(e) => {
            debug!("No single MainCamera: {e:?}");
            return;
        }
    };
    let world_cursor = match camera.viewport_to_world_2d(camera_tf, cursor) {
        Ok(p) => p,
        Err(e) => {
            debug!("viewport_to_world_2d failed: {e:?}");
            return;
        }
    };

    aim.0 = (world_cursor - origin).try_normalize();
}

fn follow_player(
    time: Res<Time>,
    // Disjointness proof: Player entities are not MainCamera entities.
    q_player: Query<&Transform, (With<Player>, Without<MainCamera>)>,
    mut q_cam: Query<(&mut Transform, &MainCamera), Without<Player>>,
) {
    let Ok(tf_player) = q_player.single() else {
        return;
    };
    let Ok((mut tf_cam, main_cam)) = q_cam.single_mut() else {
        return;
    };

    let dt = time.delta_secs();
    let alpha = 1.0 - (-main_cam.responsiveness * dt).exp();
    let target = tf_player.translation.truncate();
    let eased = tf_cam.translation.truncate().lerp(target, alpha);
    tf_cam.translation.x = eased.x;
    tf_cam.translation.y = eased.y;
}
