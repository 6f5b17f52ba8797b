//! Game composition root.
//!
//! - `configure_full`: window, renderer and logging via DefaultPlugins, then
//!   the simulation and the render-only plugins.
//! - `configure_headless`: the simulation alone, for integration tests and
//!   tools. The caller supplies the time and state plugins.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::window::WindowResolution;

use crate::common::state::GameState;
use crate::plugins;

/// Default log filter; `RUST_LOG` still overrides it.
const LOG_FILTER: &str = "wgpu=error,naga=warn,horde_combat=info";

pub fn run() {
    App::new().add_plugins(configure_full).run();
}

/// Full configuration for `cargo run`.
pub fn configure_full(app: &mut App) {
    let default_plugins = DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(Window {
                title: "Horde Combat".into(),
                resolution: WindowResolution::new(1280, 720),
                ..default()
            }),
            ..default()
        })
        .set(LogPlugin {
            filter: LOG_FILTER.into(),
            ..default()
        });

    app.add_plugins(default_plugins);

    configure_simulation(app);
    plugins::register_render(app);
}

/// Headless configuration: no window, no renderer, no Firefly.
pub fn configure_headless(app: &mut App) {
    configure_simulation(app);
}

fn configure_simulation(app: &mut App) {
    app.init_state::<GameState>();
    plugins::register_gameplay(app);
}
