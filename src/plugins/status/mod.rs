//! Status effect engine: per-actor slots ticked once per fixed step.
//!
//! Applications go through [`Combatant::apply_status`], usually from a hit via
//! [`crate::plugins::damage::strike`]. The tick system below runs after every
//! collision pass of the tick has resolved, so per-hit damage and status
//! decrements never interleave.

use bevy::prelude::*;

pub mod effects;

pub use effects::{
    ApplyOutcome, CombatRules, DotEffect, DotTick, SlowEffect, StatusApplication, StatusEffects,
    StatusKind, StatusTick, TimedEffect, TrapEffect,
};

use crate::common::tunables::Tunables;
use crate::plugins::actors::{Combatant, Ephemeral};
use crate::plugins::core::SimSet;
use crate::plugins::damage::{strike, CombatLog, CombatOutput, Hit};
use crate::plugins::projectiles::Instance;

pub fn plugin(app: &mut App) {
    app.add_systems(
        FixedUpdate,
        (tick_statuses, expire_ephemeral).in_set(SimSet::Status),
    );
}

/// Tick every actor's effects; apply DOT damage; release orphaned traps.
pub fn tick_statuses(
    time: Res<Time>,
    tunables: Res<Tunables>,
    traps: Query<&Instance>,
    mut actors: Query<(Entity, &mut Combatant, &Transform)>,
    mut out: CombatOutput,
) {
    let dt = time.delta_secs();
    let mut log = CombatLog::new(CombatRules::from(&*tunables));

    for (entity, mut actor, tf) in &mut actors {
        if actor.status.is_empty() {
            continue;
        }
        let report = actor.tick_status(dt, |trap| {
            traps.get(trap).is_ok_and(|instance| !instance.is_terminal())
        });

        if let Some(trap) = report.released_trap {
            debug!("released {entity:?} from trap {trap:?}");
        }

        let position = tf.translation.truncate();
        for tick in report.dots {
            let hit = Hit {
                damage: tick.damage,
                category: tick.category,
                source: tick.source,
                status: None,
            };
            strike(entity, &mut actor, position, &hit, &mut log);
        }
    }

    out.flush(log);
}

/// Transient actors simply vanish when their time is up.
pub fn expire_ephemeral(time: Res<Time>, mut q: Query<(&mut Ephemeral, &mut Combatant)>) {
    let dt = time.delta_secs();
    for (mut eph, mut actor) in &mut q {
        if actor.garbage {
            continue;
        }
        eph.remaining -= dt;
        if eph.remaining <= 0.0 {
            actor.clear_status();
            actor.garbage = true;
        }
    }
}

#[cfg(test)]
mod tests;
