//! Projectile / hazard lifecycle: request → allocate → advance → sweep.
//!
//! # Data flow
//! ```text
//!   FixedUpdate (chained sets)
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  Firing      weapons / enemies / hooks write SpawnInstanceRequest          │
//!│              and SpawnHazardRequest messages                               │
//!│                                                                            │
//!│  Lifecycle   advance_instances                                             │
//!│              - every instance allocated in an EARLIER tick                 │
//!│              - age ceiling, anchor, translate, expiry, out-of-bounds       │
//!│              - collisions → strike → on-hit branch                         │
//!│              - split children become requests                              │
//!│                                                                            │
//!│  Allocation  allocate_instances                                            │
//!│              - budget check per kind (InstanceCensus vs InstanceBudget)    │
//!│              - hazard templates resolved through HazardCatalog (optional)  │
//!│                                                                            │
//!│  Sweep       sweep_instances: despawn `terminal`, release census slots     │
//!└────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Producers never touch the census directly; the allocator is its single
//! writer (bosses go through the same `spawn_instance` helper).

pub mod allocator;
pub mod budget;
pub mod catalog;
pub mod components;
pub mod lifecycle;
pub mod messages;

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::core::SimSet;

pub use allocator::spawn_instance;
pub use budget::InstanceCensus;
pub use catalog::{HazardCatalog, HazardId, HazardTemplate};
pub use components::{
    AreaHazard, Body, BossEffect, HitSpec, Instance, InstanceCore, InstanceKind, InstanceSpec, OnHit, Phase,
    Projectile, Shape,
};
pub use lifecycle::{HitContext, Progress};
pub use messages::{SpawnHazardRequest, SpawnInstanceRequest};

pub fn plugin(app: &mut App) {
    app.add_message::<SpawnInstanceRequest>()
        .add_message::<SpawnHazardRequest>()
        .init_resource::<InstanceCensus>()
        .init_resource::<HazardCatalog>()
        .add_systems(OnEnter(GameState::InGame), budget::reset_census)
        .add_systems(
            FixedUpdate,
            (
                lifecycle::advance_instances.in_set(SimSet::Lifecycle),
                allocator::allocate_instances.in_set(SimSet::Allocation),
                allocator::sweep_instances.in_set(SimSet::Sweep),
            ),
        );
}

#[cfg(test)]
mod tests;
