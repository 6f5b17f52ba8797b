//! Buffered spawn requests.
//!
//! Producers (weapons, enemies, death hooks) only enqueue intent. The allocator
//! is the single writer that turns requests into instances, after this tick's
//! lifecycle pass, so nothing moves in the tick it was requested.

use bevy::prelude::*;

use super::catalog::HazardId;
use super::components::InstanceSpec;
use crate::plugins::actors::Team;
use crate::plugins::damage::DamageSource;

#[derive(Message, Clone, Debug, PartialEq)]
pub struct SpawnInstanceRequest(pub InstanceSpec);

/// Spawn a ground hazard from the optional [`super::catalog::HazardCatalog`].
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct SpawnHazardRequest {
    pub template: HazardId,
    pub team: Team,
    pub source: DamageSource,
    pub position: Vec2,
    /// Multiplies radius.
    pub area: f32,
    /// Multiplies damage.
    pub might: f32,
}

impl SpawnHazardRequest {
    pub fn new(template: HazardId, team: Team, source: DamageSource, position: Vec2) -> Self {
        Self {
            template,
            team,
            source,
            position,
            area: 1.0,
            might: 1.0,
        }
    }
}
