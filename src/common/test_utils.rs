//! Test helpers.
//!
//! Bevy provides `World::run_system_once` (via the `RunSystemOnce` trait) for quickly
//! executing a system in tests without building a full schedule.
//!
//! Systems that use `Commands` enqueue structural changes; we call `world.flush()`
//! after running so queued commands are applied before assertions.

use std::time::Duration;

use bevy::ecs::message::Messages;
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

use crate::common::rng::SimRng;
use crate::common::tunables::Tunables;
use crate::plugins::fx::VisualCue;
use crate::plugins::targeting::{rebuild_actor_index, ActorIndex};

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// Insert a generic `Time` that reports `dt` seconds for the next system run.
pub fn set_delta(world: &mut World, dt: f32) {
    let mut t = Time::<()>::default();
    t.advance_by(Duration::from_secs_f32(dt));
    world.insert_resource(t);
}

/// Register message storage for `M` if the world doesn't have it yet.
pub fn ensure_messages<M: Message>(world: &mut World) {
    if world.get_resource::<Messages<M>>().is_none() {
        world.init_resource::<Messages<M>>();
    }
}

/// Drain every message of type `M` currently buffered.
pub fn drain_messages<M: Message>(world: &mut World) -> Vec<M> {
    world.resource_mut::<Messages<M>>().drain().collect()
}

/// A bare world with the resources most combat systems expect.
pub fn combat_world(dt: f32) -> World {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.insert_resource(SimRng::new(42));
    set_delta(&mut world, dt);
    ensure_messages::<VisualCue>(&mut world);
    world
}

/// Rebuild the actor index from the world's current actors.
pub fn reindex(world: &mut World) {
    if world.get_resource::<ActorIndex>().is_none() {
        world.insert_resource(ActorIndex::default());
    }
    run_system_once(world, rebuild_actor_index);
}
