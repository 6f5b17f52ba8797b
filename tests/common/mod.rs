//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `horde_combat::game::configure_headless` to install gameplay plugins.
//! - every `app.update()` advances time by exactly one fixed step, so one
//!   update is one simulation tick.

#![allow(dead_code)]

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use horde_combat::common::tunables::Tunables;

pub const TICK: Duration = Duration::from_micros(15_625);

pub fn app_headless() -> App {
    app_headless_with(Tunables::default())
}

/// Headless app with caller-provided tunables (picked up by the core plugin).
pub fn app_headless_with(tunables: Tunables) -> App {
    let mut app = App::new();

    // Add AssetPlugin + ScenePlugin so SceneSpawner exists.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(TICK));
    app.insert_resource(Time::<Fixed>::from_duration(TICK));
    app.insert_resource(tunables);

    horde_combat::game::configure_headless(&mut app);
    // `App::run` would do this; manual `update()` driving must finish plugins
    // itself so resources registered in `Plugin::finish` (e.g. Avian's) exist.
    app.finish();
    app.cleanup();
    app
}

/// A run with no regular waves, only what the test spawns.
pub fn quiet_app() -> App {
    app_headless_with(Tunables {
        hostile_cap: 0,
        ..default()
    })
}

pub fn ticks(app: &mut App, n: usize) {
    for _ in 0..n {
        app.update();
    }
}
