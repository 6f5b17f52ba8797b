//! Core plugin: shared resources, startup validation and the fixed-tick order.

use bevy::prelude::*;

use crate::common::error::SetupError;
use crate::common::rng::SimRng;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::projectiles::HazardCatalog;
use crate::plugins::{bosses, enemies, weapons};

/// One simulation tick, strictly in this order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    /// Actors steer (movement override, stun/freeze respected).
    Locomotion,
    /// `ActorIndex` rebuilt from current positions.
    Indexing,
    /// Weapons and enemy attacks; spawn requests written.
    Firing,
    /// Instances from earlier ticks advance and collide.
    Lifecycle,
    /// This tick's spawn requests become instances.
    Allocation,
    Status,
    /// Boss state machines.
    Abilities,
    /// Death hooks for everything that died this tick.
    Deaths,
    /// Despawn garbage actors and terminal instances.
    Sweep,
}

pub fn plugin(app: &mut App) {
    // Keep a caller-provided Tunables (tests, tools) if present.
    app.init_resource::<Tunables>();

    let tunables = app.world().resource::<Tunables>().clone();
    if let Err(err) = validate_setup(&tunables) {
        panic!("invalid game setup: {err}");
    }

    app.insert_resource(SimRng::new(tunables.seed));
    app.insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)));

    app.configure_sets(
        FixedUpdate,
        (
            SimSet::Locomotion,
            SimSet::Indexing,
            SimSet::Firing,
            SimSet::Lifecycle,
            SimSet::Allocation,
            SimSet::Status,
            SimSet::Abilities,
            SimSet::Deaths,
            SimSet::Sweep,
        )
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
}

/// Everything that must hold before the first tick.
pub fn validate_setup(tunables: &Tunables) -> Result<(), SetupError> {
    tunables.validate()?;
    weapons::table::validate()?;
    enemies::archetypes::validate()?;
    bosses::archetypes::validate()?;
    HazardCatalog::default().validate()?;
    Ok(())
}
