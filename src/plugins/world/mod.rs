//! World plugin: the arena walls and floor, both built from [`PlayArea`].

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::Layer;
use crate::common::state::GameState;

const TILE: f32 = 64.0;
const WALL_THICKNESS: f32 = 30.0;

/// Inner rectangle of the arena. Instances are dropped once they leave it by
/// more than the out-of-bounds margin; walls are placed just outside it.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct PlayArea(pub Rect);

impl Default for PlayArea {
    fn default() -> Self {
        Self(Rect::from_center_half_size(Vec2::ZERO, Vec2::new(TILE * 16.0, TILE * 9.0)))
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<PlayArea>();
    app.add_systems(OnEnter(GameState::InGame), (spawn_arena, spawn_floor));
}

/// Name, center and size of the four walls enclosing `area`.
fn wall_layout(area: Rect) -> [(&'static str, Vec2, Vec2); 4] {
    let c = area.center();
    let half = area.half_size();
    let t = WALL_THICKNESS;
    let horizontal = Vec2::new(area.width() + t * 2.0, t);
    let vertical = Vec2::new(t, area.height());
    [
        ("WallTop", Vec2::new(c.x, area.max.y + t * 0.5), horizontal),
        ("WallBottom", Vec2::new(c.x, area.min.y - t * 0.5), horizontal),
        ("WallLeft", Vec2::new(c.x - half.x - t * 0.5, c.y), vertical),
        ("WallRight", Vec2::new(c.x + half.x + t * 0.5, c.y), vertical),
    ]
}

fn spawn_arena(mut commands: Commands, area: Option<Res<PlayArea>>) {
    let area = area.map(|a| a.0).unwrap_or_else(|| PlayArea::default().0);
    let wall_color = Color::srgb(0.25, 0.27, 0.33);
    let wall_layers = CollisionLayers::new(Layer::World, [Layer::Player, Layer::Enemy, Layer::Spirit]);

    for (name, pos, size) in wall_layout(area) {
        commands.spawn((
            Name::new(name),
            Sprite {
                color: wall_color,
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(pos.extend(0.0)),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            wall_layers,
            DespawnOnExit(GameState::InGame),
        ));
    }
}

/// Checkerboard floor from solid-color sprites, covering the play area.
fn spawn_floor(mut commands: Commands, area: Option<Res<PlayArea>>) {
    let area = area.map(|a| a.0).unwrap_or_else(|| PlayArea::default().0);
    let cols = (area.width() / TILE).ceil() as i32;
    let rows = (area.height() / TILE).ceil() as i32;
    let origin = area.min + Vec2::splat(TILE * 0.5);

    (0..rows)
        .flat_map(|y| (0..cols).map(move |x| (x, y)))
        .for_each(|(x, y)| {
            let pos = origin + Vec2::new(x as f32, y as f32) * TILE;
            let color = if (x + y) % 2 == 0 {
                Color::srgb(0.14, 0.14, 0.16)
            } else {
                Color::srgb(0.12, 0.12, 0.14)
            };

            commands.spawn((
                Sprite::from_color(color, Vec2::splat(TILE)),
                Transform::from_translation(pos.extend(0.0)),
                DespawnOnExit(GameState::InGame),
            ));
        });
}
