//! Bosses: spawning, the first-spawn ledger and the ability driver.
//!
//! The state machine itself is pure (see [`machine`]); [`run_boss_abilities`]
//! feeds it a [`BossView`] each tick and turns its events into telegraph
//! cues, area pulses and instance spawns.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

pub mod archetypes;
pub mod machine;

pub use archetypes::{BossArchetype, BossRow, GroundSlam, PoisonPools, StormBurst, FIRST_SLIME_KING_HEALTH};
pub use machine::{
    AbilityPlan, AbilityState, BossAbility, BossBrain, BossView, BrainEvent, Execution, Pulse,
};

use crate::common::layers::hostile_layers;
use crate::common::rng::SimRng;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::actors::{Bounty, Combatant, ContactAttack, Team};
use crate::plugins::core::SimSet;
use crate::plugins::damage::{strike, CombatLog, CombatOutput, DamageSource, Hit};
use crate::plugins::fx::VisualCue;
use crate::plugins::projectiles::{spawn_instance, Instance, InstanceCensus};
use crate::plugins::status::CombatRules;
use crate::plugins::targeting::{circle_hit, nearest_target, ActorIndex};

/// A boss died. Written by the death hooks after the reward is placed.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct BossDefeated {
    pub boss: Entity,
    pub archetype: BossArchetype,
    pub position: Vec2,
}

/// Per-run record of boss spawns.
///
/// Only used for the first Slime King, which ignores health scaling.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct BossSpawnLedger {
    pub slime_kings: u32,
}

impl BossSpawnLedger {
    /// Health for the next boss of `archetype`, recording the spawn.
    pub fn health_for(&mut self, archetype: BossArchetype, scaled: f32) -> f32 {
        match archetype {
            BossArchetype::SlimeKing => {
                self.slime_kings += 1;
                if self.slime_kings == 1 {
                    FIRST_SLIME_KING_HEALTH
                } else {
                    scaled
                }
            }
            _ => scaled,
        }
    }
}

pub fn plugin(app: &mut App) {
    app.add_message::<BossDefeated>()
        .init_resource::<BossSpawnLedger>()
        .add_systems(OnEnter(GameState::InGame), reset_ledger)
        .add_systems(FixedUpdate, run_boss_abilities.in_set(SimSet::Abilities));
}

fn reset_ledger(mut ledger: ResMut<BossSpawnLedger>) {
    *ledger = BossSpawnLedger::default();
}

pub fn spawn_boss(
    commands: &mut Commands,
    ledger: &mut BossSpawnLedger,
    archetype: BossArchetype,
    position: Vec2,
    health_scale: f32,
) -> Entity {
    let row = archetype.row();
    let health = ledger.health_for(archetype, row.health * health_scale);
    info!("{} spawned with {health:.0} health", row.name);

    commands
        .spawn((
            Name::new(row.name),
            archetype,
            Combatant::boss(health, row.radius, row.speed)
                .with_armor(row.armor)
                .with_damage(row.contact_damage),
            BossBrain::new(archetype),
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
        ))
        .id()
}

/// Advance every boss's ability machine and apply what it produced.
pub fn run_boss_abilities(
    mut commands: Commands,
    time: Res<Time>,
    tunables: Res<Tunables>,
    index: Res<ActorIndex>,
    mut rng: ResMut<SimRng>,
    mut census: ResMut<InstanceCensus>,
    instances: Query<&Instance>,
    mut bosses: Query<(Entity, &mut BossBrain, &Combatant, &Transform)>,
    mut targets: Query<(&mut Combatant, &Transform), Without<BossBrain>>,
    mut out: CombatOutput,
) {
    let dt = time.delta_secs();
    let mut log = CombatLog::new(CombatRules::from(&*tunables));

    for (entity, mut brain, actor, tf) in &mut bosses {
        if !actor.is_targetable() {
            continue;
        }
        let position = tf.translation.truncate();
        let view = BossView {
            entity,
            position,
            target: nearest_target(position, index.all(actor.team.opponent()), f32::INFINITY)
                .map(|c| c.position),
            stunned: actor.is_stunned(),
        };

        let before = brain.state;
        let event = brain.advance(&view, dt, &mut rng, |e| {
            instances.get(e).is_ok_and(|i| !i.is_terminal())
        });

        match event {
            BrainEvent::Nothing => {}
            BrainEvent::Telegraph { areas, duration } => {
                info!("{:?} telegraphs its ability ({duration:.1}s)", brain.archetype);
                log.cues.push(VisualCue::Telegraph {
                    boss: entity,
                    areas,
                    duration,
                });
            }
            BrainEvent::Execute(execution) => {
                if matches!(before, AbilityState::Telegraphing { .. }) {
                    info!("{:?} executes its ability", brain.archetype);
                }
                let source = DamageSource::hostile(Some(entity));
                for pulse in execution.pulses {
                    let hit = Hit {
                        damage: pulse.hit.damage,
                        category: pulse.hit.category,
                        source,
                        status: pulse.hit.status,
                    };
                    for c in index.query(pulse.center, pulse.radius, actor.team.opponent()) {
                        if !circle_hit(pulse.center, pulse.radius, c.position, c.radius) {
                            continue;
                        }
                        if let Ok((mut target, ttf)) = targets.get_mut(c.entity) {
                            strike(c.entity, &mut target, ttf.translation.truncate(), &hit, &mut log);
                        }
                    }
                    log.cues
                        .push(VisualCue::impact(pulse.center, pulse.radius, pulse.tint));
                }
                log.spawns.extend(execution.spawns);
                for spec in execution.sustained {
                    if let Some(effect) = spawn_instance(
                        &mut commands,
                        &mut census,
                        &tunables.budget,
                        tunables.max_instance_lifetime,
                        spec,
                    ) {
                        brain.adopt(effect);
                    }
                }
                if brain.state == AbilityState::Sustaining {
                    info!(
                        "{:?} sustains {} effect(s)",
                        brain.archetype,
                        brain.owned_effects.len()
                    );
                }
            }
            BrainEvent::Recovered => {
                info!("{:?} ability finished", brain.archetype);
            }
        }
    }

    out.flush(log);
}
