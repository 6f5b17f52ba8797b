//! Wave director: periodic spawns on a ring around the player, a hostile cap,
//! and scheduled bosses.

use bevy::prelude::*;

use super::archetypes::EnemyKind;
use super::spawn_enemy;
use crate::common::rng::SimRng;
use crate::common::tunables::Tunables;
use crate::plugins::actors::Team;
use crate::plugins::bosses::{spawn_boss, BossArchetype, BossSpawnLedger};
use crate::plugins::targeting::ActorIndex;

/// Seconds of play per extra enemy in each batch.
const BATCH_GROWTH_PERIOD: f32 = 60.0;
/// Seconds of play per +100% enemy health.
const HEALTH_GROWTH_PERIOD: f32 = 300.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveSchedule {
    pub at: f32,
    pub boss: BossArchetype,
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct WaveDirector {
    pub elapsed: f32,
    pub spawn_timer: f32,
    pub interval: f32,
    pub batch: u32,
    pub bosses: Vec<WaveSchedule>,
    pub next_boss: usize,
}

impl Default for WaveDirector {
    fn default() -> Self {
        let at = |at, boss| WaveSchedule { at, boss };
        Self {
            elapsed: 0.0,
            spawn_timer: 0.0,
            interval: 1.5,
            batch: 3,
            bosses: vec![
                at(90.0, BossArchetype::SlimeKing),
                at(210.0, BossArchetype::StormCaller),
                at(330.0, BossArchetype::PlagueLord),
                at(450.0, BossArchetype::SlimeKing),
            ],
            next_boss: 0,
        }
    }
}

impl WaveDirector {
    /// Kinds eligible at the current time.
    pub fn pool(&self) -> &'static [EnemyKind] {
        use EnemyKind::*;
        match self.elapsed {
            t if t < 45.0 => &[Grunt, Runner],
            t if t < 120.0 => &[Grunt, Runner, Brute, Splitter],
            _ => &[Grunt, Runner, Brute, Splitter, Detonator, Spitter],
        }
    }

    pub fn health_scale(&self) -> f32 {
        1.0 + self.elapsed / HEALTH_GROWTH_PERIOD
    }

    pub fn batch_size(&self) -> u32 {
        self.batch + (self.elapsed / BATCH_GROWTH_PERIOD) as u32
    }
}

pub fn reset_waves(mut director: ResMut<WaveDirector>) {
    *director = WaveDirector::default();
}

pub fn run_waves(
    mut commands: Commands,
    time: Res<Time>,
    tunables: Res<Tunables>,
    index: Res<ActorIndex>,
    mut rng: ResMut<SimRng>,
    mut director: ResMut<WaveDirector>,
    mut ledger: ResMut<BossSpawnLedger>,
) {
    let Some(player) = index.player().copied() else {
        return;
    };
    director.elapsed += time.delta_secs();
    let ring = tunables.spawn_ring_radius;

    while let Some(next) = director.bosses.get(director.next_boss).copied() {
        if director.elapsed < next.at {
            break;
        }
        let pos = player.position + Vec2::from_angle(rng.angle()) * ring;
        let scale = director.health_scale();
        spawn_boss(&mut commands, &mut ledger, next.boss, pos, scale);
        director.next_boss += 1;
    }

    director.spawn_timer -= time.delta_secs();
    if director.spawn_timer > 0.0 {
        return;
    }
    director.spawn_timer = director.interval;

    let live = index.all(Team::Hostiles).count();
    let room = tunables.hostile_cap.saturating_sub(live);
    let n = (director.batch_size() as usize).min(room);
    if n == 0 {
        debug!("hostile cap reached ({live}); wave skipped");
        return;
    }

    let pool = director.pool();
    let scale = director.health_scale();
    for _ in 0..n {
        let kind = pool[rng.index(pool.len())];
        let pos = player.position + Vec2::from_angle(rng.angle()) * ring;
        spawn_enemy(&mut commands, kind, pos, Some(kind.row().health * scale));
    }
}
