//! Feature plugins.

use bevy::prelude::*;

pub mod actors;
pub mod bosses;
pub mod core;
pub mod damage;
pub mod enemies;
pub mod fx;
pub mod physics;
pub mod player;
pub mod projectiles;
pub mod status;
pub mod targeting;
pub mod weapons;
pub mod world;

// Render-only
pub mod camera;
pub mod lighting;

/// Register gameplay plugins that work in headless tests.
///
/// `core` goes first: it validates the setup and configures the tick order
/// every other plugin schedules into.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    physics::plugin(app);
    world::plugin(app);
    fx::plugin(app);
    targeting::plugin(app);
    actors::plugin(app);
    status::plugin(app);
    damage::plugin(app);
    projectiles::plugin(app);
    weapons::plugin(app);
    player::plugin(app);
    enemies::plugin(app);
    bosses::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    lighting::plugin(app);
    camera::plugin(app);
}

