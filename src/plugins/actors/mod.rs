//! Actors: the shared `Combatant` data, steering, contact attacks and the sweep.
//!
//! Player input lives in the player plugin; everything that walks on its own
//! (enemies, bosses, spirits) is steered here from the `ActorIndex` of the
//! previous tick.

use avian2d::prelude::*;
use bevy::prelude::*;

pub mod components;

pub use components::{
    ActorClass, Bounty, Combatant, ContactAttack, DeathBehavior, Ephemeral, Movement, MovementBehavior,
    MovementOverride, Resistances, Stats, Team,
};

use crate::common::tunables::Tunables;
use crate::plugins::bosses::BossBrain;
use crate::plugins::core::SimSet;
use crate::plugins::damage::{strike, CombatLog, CombatOutput, DamageCategory, DamageSource, Hit};
use crate::plugins::status::CombatRules;
use crate::plugins::targeting::{circle_hit, nearest_target, try_normalize, ActorIndex};

/// Fraction of the preferred range a kiter tolerates before moving.
const KITE_BAND: f32 = 0.15;

pub fn plugin(app: &mut App) {
    app.add_systems(
        FixedUpdate,
        (
            steer_actors.in_set(SimSet::Locomotion),
            contact_attacks.in_set(SimSet::Firing),
            sweep_actors.in_set(SimSet::Sweep),
        ),
    );
}

/// Unit heading for `behavior` at `pos` with an optional goal position.
pub fn steering(behavior: MovementBehavior, pos: Vec2, goal: Option<Vec2>) -> Vec2 {
    let Some(goal) = goal else {
        return Vec2::ZERO;
    };
    let to_goal = goal - pos;
    match behavior {
        MovementBehavior::Controlled | MovementBehavior::Stationary => Vec2::ZERO,
        MovementBehavior::Chase => try_normalize(to_goal).unwrap_or(Vec2::ZERO),
        MovementBehavior::Kite { preferred_range } => {
            let Some(dir) = try_normalize(to_goal) else {
                return Vec2::ZERO;
            };
            let d = to_goal.length();
            let band = preferred_range * KITE_BAND;
            if d > preferred_range + band {
                dir
            } else if d < preferred_range - band {
                -dir
            } else {
                Vec2::ZERO
            }
        }
    }
}

/// Self-driven actors head for their nearest opponent.
pub fn steer_actors(
    index: Res<ActorIndex>,
    mut q: Query<(&mut Combatant, &Transform, &mut LinearVelocity)>,
) {
    for (mut actor, tf, mut vel) in &mut q {
        if actor.movement.behavior == MovementBehavior::Controlled {
            continue;
        }
        if !actor.can_move() {
            vel.0 = Vec2::ZERO;
            continue;
        }

        let pos = tf.translation.truncate();
        let goal = nearest_target(pos, index.all(actor.team.opponent()), f32::INFINITY);
        let dir = steering(actor.movement.behavior, pos, goal.map(|g| g.position));
        vel.0 = dir * actor.stats.speed;
        if dir != Vec2::ZERO {
            actor.movement.last_direction = dir;
        }
    }
}

/// Touch damage on a per-attacker interval.
///
/// Bosses only issue basic attacks while their ability machine is idle.
pub fn contact_attacks(
    time: Res<Time>,
    tunables: Res<Tunables>,
    index: Res<ActorIndex>,
    brains: Query<&BossBrain>,
    mut attackers: Query<(Entity, &mut ContactAttack)>,
    mut actors: Query<(&mut Combatant, &Transform)>,
    mut out: CombatOutput,
) {
    let dt = time.delta_secs();
    let mut log = CombatLog::new(CombatRules::from(&*tunables));

    for (e, mut attack) in &mut attackers {
        attack.cooldown = (attack.cooldown - dt).max(0.0);
        if attack.cooldown > 0.0 {
            continue;
        }
        let Ok((me, tf)) = actors.get(e) else {
            continue;
        };
        if !me.can_act() {
            continue;
        }
        if brains.get(e).is_ok_and(|brain| !brain.allows_basic_attack()) {
            continue;
        }

        let pos = tf.translation.truncate();
        let radius = me.radius;
        let opponent = me.team.opponent();
        let source = DamageSource {
            entity: Some(e),
            from_player: me.team == Team::Allies,
        };
        let hit = Hit {
            damage: attack.damage,
            category: DamageCategory::Normal,
            source,
            status: None,
        };

        let mut landed = false;
        for c in index.query(pos, radius, opponent) {
            if !circle_hit(pos, radius, c.position, c.radius) {
                continue;
            }
            let Ok((mut target, target_tf)) = actors.get_mut(c.entity) else {
                continue;
            };
            let at = target_tf.translation.truncate();
            landed |= strike(c.entity, &mut target, at, &hit, &mut log).is_some();
        }
        if landed {
            attack.cooldown = attack.interval;
        }
    }

    out.flush(log);
}

/// Despawn actors flagged `garbage`.
pub fn sweep_actors(mut commands: Commands, q: Query<(Entity, &Combatant)>) {
    for (e, actor) in &q {
        if actor.garbage {
            commands.entity(e).despawn();
        }
    }
}
