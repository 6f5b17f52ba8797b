//! Collision layers.
//!
//! Only the physical bodies (actors and arena walls) use Avian layers.
//! Combat hits are resolved by the engine's own radius/segment math.

use avian2d::prelude::*;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    #[default]
    Default,
    World,
    Player,
    Enemy,
    Spirit,
}

/// Layers for a body on the allied side (player or spirit).
#[inline]
pub fn allied_layers(spirit: bool) -> CollisionLayers {
    if spirit {
        CollisionLayers::new(Layer::Spirit, [Layer::World])
    } else {
        CollisionLayers::new(Layer::Player, [Layer::World, Layer::Enemy])
    }
}

/// Layers for a hostile body: blocked by walls, pushes against the player.
#[inline]
pub fn hostile_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Enemy, [Layer::World, Layer::Player])
}
