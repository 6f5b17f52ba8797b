//! Death hooks.
//!
//! Every death is reported once as an [`ActorDied`] message by the system that
//! dealt the killing blow. Each hook below reads the same stream
//! independently. The dead entity is still in the world until the sweep at the
//! end of the tick, so its components can be read here.

use std::f32::consts::TAU;

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use super::pipeline::{ActorDied, DamageSource};
use crate::common::rng::SimRng;
use crate::common::state::GameState;
use crate::plugins::actors::{ActorClass, Bounty, Combatant, DeathBehavior, Team};
use crate::plugins::bosses::{BossBrain, BossDefeated};
use crate::plugins::enemies::{spawn_enemy, EnemyKind};
use crate::plugins::player::{spawn_boss_reward, spawn_orb};
use crate::plugins::projectiles::{HazardId, Instance, SpawnHazardRequest};

/// Kills credited to the player this run.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KillTally {
    pub kills: u32,
    pub bosses: u32,
}

pub(super) fn reset_tally(mut tally: ResMut<KillTally>) {
    *tally = KillTally::default();
}

pub fn credit_kills(mut died: MessageReader<ActorDied>, mut tally: ResMut<KillTally>) {
    for death in died.read() {
        if !death.killer.from_player || death.team != Team::Hostiles {
            continue;
        }
        tally.kills += 1;
        if death.class == ActorClass::Boss {
            tally.bosses += 1;
        }
    }
}

pub fn drop_loot(mut commands: Commands, mut died: MessageReader<ActorDied>, bounties: Query<&Bounty>) {
    for death in died.read() {
        let Ok(bounty) = bounties.get(death.entity) else {
            continue;
        };
        if bounty.experience > 0 {
            spawn_orb(&mut commands, death.position, bounty.experience);
        }
    }
}

pub fn split_on_death(
    mut commands: Commands,
    mut rng: ResMut<SimRng>,
    mut died: MessageReader<ActorDied>,
    q: Query<(&DeathBehavior, &Combatant)>,
) {
    for death in died.read() {
        let Ok((&DeathBehavior::Split { count, health_fraction }, actor)) = q.get(death.entity) else {
            continue;
        };
        let health = (actor.max_health * health_fraction).max(1.0);
        for i in 0..count {
            let angle = TAU * i as f32 / count as f32 + rng.jitter(0.3);
            let offset = Vec2::from_angle(angle) * actor.radius;
            spawn_enemy(&mut commands, EnemyKind::Splitling, death.position + offset, Some(health));
        }
        debug!("split into {count} at {:?}", death.position);
    }
}

pub fn explode_on_death(
    mut died: MessageReader<ActorDied>,
    q: Query<&DeathBehavior>,
    mut hazards: MessageWriter<SpawnHazardRequest>,
) {
    for death in died.read() {
        let Ok(&DeathBehavior::Explode { area, might }) = q.get(death.entity) else {
            continue;
        };
        hazards.write(SpawnHazardRequest {
            area,
            might,
            ..SpawnHazardRequest::new(
                HazardId::Explosion,
                death.team,
                DamageSource {
                    entity: Some(death.entity),
                    from_player: death.team == Team::Allies,
                },
                death.position,
            )
        });
    }
}

/// Place the reward, announce the defeat and end everything the boss owned.
pub fn reward_bosses(
    mut commands: Commands,
    mut died: MessageReader<ActorDied>,
    mut brains: Query<&mut BossBrain>,
    mut instances: Query<&mut Instance>,
    mut defeated: MessageWriter<BossDefeated>,
) {
    for death in died.read() {
        if death.class != ActorClass::Boss {
            continue;
        }
        let Ok(mut brain) = brains.get_mut(death.entity) else {
            continue;
        };
        for effect in brain.release_effects() {
            if let Ok(mut instance) = instances.get_mut(effect) {
                instance.terminate();
            }
        }
        spawn_boss_reward(&mut commands, death.position);
        defeated.write(BossDefeated {
            boss: death.entity,
            archetype: brain.archetype,
            position: death.position,
        });
        info!("{} defeated", brain.archetype.name());
    }
}

pub fn end_run_on_player_death(mut died: MessageReader<ActorDied>, mut next: ResMut<NextState<GameState>>) {
    let player_deaths = died.read().filter(|d| d.class == ActorClass::Player).count();
    if player_deaths > 0 {
        info!("player died; run over");
        next.set(GameState::GameOver);
    }
}
