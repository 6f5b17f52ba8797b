//! Enemies: archetype table, spawning, ranged attacks and the wave director.
//!
//! Enemies are plain [`Combatant`]s on the hostile team. Steering and contact
//! damage are shared with every other actor (see the actors plugin); this
//! module only adds what is enemy-specific.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

pub mod archetypes;
pub mod waves;

pub use archetypes::{EnemyKind, EnemyRow, RangedProfile};
pub use waves::{WaveDirector, WaveSchedule};

use crate::common::layers::hostile_layers;
use crate::common::state::GameState;
use crate::plugins::actors::{Bounty, Combatant, ContactAttack, Resistances, Team};
use crate::plugins::core::SimSet;
use crate::plugins::damage::DamageSource;
use crate::plugins::projectiles::{Body, HitSpec, InstanceSpec, OnHit, Projectile, Shape, SpawnInstanceRequest};
use crate::plugins::targeting::{nearest_target, ActorIndex};

/// Ranged attack issued on an interval at the nearest ally in range.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct RangedAttack {
    pub profile: RangedProfile,
    pub cooldown: f32,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<WaveDirector>()
        .add_systems(OnEnter(GameState::InGame), waves::reset_waves)
        .add_systems(
            FixedUpdate,
            (
                ranged_attacks.in_set(SimSet::Firing),
                waves::run_waves.in_set(SimSet::Firing),
            ),
        );
}

/// Spawn one enemy. `health` overrides the table value (split children, scaling).
pub fn spawn_enemy(commands: &mut Commands, kind: EnemyKind, position: Vec2, health: Option<f32>) -> Entity {
    let row = kind.row();
    let mut actor = Combatant::enemy(health.unwrap_or(row.health), row.radius, row.speed)
        .with_armor(row.armor)
        .with_damage(row.contact_damage)
        .with_behavior(row.behavior)
        .with_resistances(Resistances {
            slow_immune: false,
            slow_resistance: row.slow_resistance,
        });
    if let Some(threshold) = row.detonator {
        actor = actor.with_detonator(threshold);
    }

    let mut e = commands.spawn((
        Name::new(row.name),
        kind,
        actor,
        ContactAttack::new(row.contact_damage, row.contact_interval),
        Bounty {
            experience: row.experience,
        },
        Sprite {
            color: row.color,
            custom_size: Some(Vec2::splat(row.radius * 2.0)),
            ..default()
        },
        Transform::from_translation(position.extend(1.0)),
        RigidBody::Kinematic,
        Collider::circle(row.radius),
        hostile_layers(),
        LinearVelocity::ZERO,
        DespawnOnExit(GameState::InGame),
    ));
    if let Some(death) = row.death {
        e.insert(death);
    }
    if let Some(profile) = row.ranged {
        e.insert(RangedAttack {
            profile,
            cooldown: profile.interval,
        });
    }
    e.id()
}

/// Spitters and friends lob projectiles at the nearest ally.
pub fn ranged_attacks(
    time: Res<Time>,
    index: Res<ActorIndex>,
    mut q: Query<(Entity, &Combatant, &Transform, &mut RangedAttack)>,
    mut out: MessageWriter<SpawnInstanceRequest>,
) {
    let dt = time.delta_secs();
    for (e, actor, tf, mut attack) in &mut q {
        attack.cooldown = (attack.cooldown - dt).max(0.0);
        if attack.cooldown > 0.0 || !actor.can_act() {
            continue;
        }
        let p = attack.profile;
        let pos = tf.translation.truncate();
        let Some(target) = nearest_target(pos, index.all(Team::Allies), p.range * p.range) else {
            continue;
        };
        let Some(dir) = (target.position - pos).try_normalize() else {
            continue;
        };

        let hit = HitSpec {
            status: p.status,
            ..HitSpec::normal(p.damage)
        };
        let body = Body::Projectile(Projectile::new(
            dir * p.speed,
            Shape::Circle { radius: p.radius },
            OnHit::Pierce { remaining: 0 },
        ));
        let lifetime = p.range / p.speed.max(1.0) * 1.5;
        out.write(SpawnInstanceRequest(InstanceSpec::new(
            Team::Hostiles,
            DamageSource::hostile(Some(e)),
            pos,
            hit,
            lifetime,
            body,
        )));
        attack.cooldown = p.interval;
    }
}
