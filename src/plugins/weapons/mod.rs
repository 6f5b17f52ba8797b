//! Weapons: a data table plus one generic firing pipeline.

use bevy::prelude::*;

pub mod arsenal;
pub mod fire;
pub mod table;

pub use arsenal::{Arsenal, ArsenalError, OwnerStats, Weapon, MAX_SLOTS};
pub use fire::{Heading, OwnerView, SpawnSpiritRequest, Volley};
pub use table::{WeaponKind, WeaponStats, MAX_LEVEL};

use crate::plugins::actors::{Combatant, Team};
use crate::plugins::core::SimSet;
use crate::plugins::player::Aim;
use crate::plugins::projectiles::{SpawnHazardRequest, SpawnInstanceRequest};
use crate::plugins::targeting::ActorIndex;

pub fn plugin(app: &mut App) {
    app.add_message::<SpawnSpiritRequest>()
        .add_systems(FixedUpdate, fire_weapons.in_set(SimSet::Firing));
}

/// Tick every owned weapon and publish whatever fires.
pub fn fire_weapons(
    time: Res<Time>,
    index: Res<ActorIndex>,
    mut owners: Query<(
        Entity,
        &Combatant,
        &Transform,
        &mut Arsenal,
        Option<&OwnerStats>,
        Option<&Aim>,
    )>,
    mut instances: MessageWriter<SpawnInstanceRequest>,
    mut hazards: MessageWriter<SpawnHazardRequest>,
    mut spirits: MessageWriter<SpawnSpiritRequest>,
) {
    let dt = time.delta_secs();

    for (entity, actor, tf, mut arsenal, stats, aim) in &mut owners {
        if !actor.is_targetable() || arsenal.is_empty() {
            continue;
        }
        let owner = OwnerView {
            entity,
            position: tf.translation.truncate(),
            aim: aim.and_then(|a| a.0),
            last_direction: actor.movement.last_direction,
            stunned: actor.is_stunned(),
            stats: stats.copied().unwrap_or_default(),
        };

        let reach = arsenal
            .weapons()
            .iter()
            .map(|w| w.stats.range)
            .fold(0.0_f32, f32::max);
        let targets = index.query(owner.position, reach, Team::Hostiles);

        for weapon in arsenal.weapons_mut() {
            let Some(volley) = weapon.update(dt, &owner, &targets) else {
                continue;
            };
            for spec in volley.instances {
                instances.write(SpawnInstanceRequest(spec));
            }
            for req in volley.hazards {
                hazards.write(req);
            }
            for req in volley.spirits {
                spirits.write(req);
            }
        }
    }
}

#[cfg(test)]
mod tests;
