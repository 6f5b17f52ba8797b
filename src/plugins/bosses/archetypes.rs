//! Boss data table and the per-archetype ability strategies.

use std::f32::consts::TAU;

use bevy::prelude::*;
use strum::{EnumIter, IntoEnumIterator};

use super::machine::{AbilityPlan, BossAbility, BossView, Execution, Pulse};
use crate::common::error::TableError;
use crate::common::rng::SimRng;
use crate::plugins::actors::Team;
use crate::plugins::damage::{DamageCategory, DamageSource};
use crate::plugins::fx::{CueArea, CueTint};
use crate::plugins::projectiles::{AreaHazard, Body, BossEffect, HitSpec, InstanceSpec, OnHit, Projectile, Shape};
use crate::plugins::status::StatusApplication;
use crate::plugins::targeting::{rotate, try_normalize, CANONICAL_DIRECTION};

/// Health of the very first Slime King of a run, whatever the scaling.
pub const FIRST_SLIME_KING_HEALTH: f32 = 600.0;

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum BossArchetype {
    SlimeKing,
    StormCaller,
    PlagueLord,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossRow {
    pub name: &'static str,
    pub health: f32,
    pub radius: f32,
    pub speed: f32,
    pub armor: f32,
    pub contact_damage: f32,
    pub contact_interval: f32,
    pub experience: u32,
    pub color: Color,
}

impl BossArchetype {
    pub fn row(self) -> BossRow {
        match self {
            BossArchetype::SlimeKing => BossRow {
                name: "Slime King",
                health: 900.0,
                radius: 34.0,
                speed: 55.0,
                armor: 2.0,
                contact_damage: 14.0,
                contact_interval: 1.0,
                experience: 60,
                color: Color::srgb(0.35, 0.85, 0.4),
            },
            BossArchetype::StormCaller => BossRow {
                name: "Storm Caller",
                health: 1200.0,
                radius: 30.0,
                speed: 70.0,
                armor: 3.0,
                contact_damage: 12.0,
                contact_interval: 1.0,
                experience: 90,
                color: Color::srgb(0.45, 0.55, 1.0),
            },
            BossArchetype::PlagueLord => BossRow {
                name: "Plague Lord",
                health: 1600.0,
                radius: 36.0,
                speed: 45.0,
                armor: 4.0,
                contact_damage: 16.0,
                contact_interval: 1.2,
                experience: 120,
                color: Color::srgb(0.6, 0.3, 0.7),
            },
        }
    }

    pub fn name(self) -> &'static str {
        self.row().name
    }

    /// Strategy object for this archetype, chosen once at spawn.
    pub fn ability(self) -> Box<dyn BossAbility> {
        match self {
            BossArchetype::SlimeKing => Box::new(GroundSlam::default()),
            BossArchetype::StormCaller => Box::new(StormBurst::default()),
            BossArchetype::PlagueLord => Box::new(PoisonPools::default()),
        }
    }
}

fn boss_source(boss: &BossView) -> DamageSource {
    DamageSource::hostile(Some(boss.entity))
}

/// Telegraphed slam on the point where the target stood.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundSlam {
    pub cooldown: f32,
    pub telegraph: f32,
    pub radius: f32,
    pub damage: f32,
}

impl Default for GroundSlam {
    fn default() -> Self {
        Self {
            cooldown: 6.0,
            telegraph: 1.2,
            radius: 110.0,
            damage: 30.0,
        }
    }
}

impl BossAbility for GroundSlam {
    fn cooldown(&self) -> f32 {
        self.cooldown
    }

    fn telegraph(&self) -> f32 {
        self.telegraph
    }

    fn plan(&self, boss: &BossView, _rng: &mut SimRng) -> AbilityPlan {
        let center = boss.target.unwrap_or(boss.position);
        AbilityPlan {
            origin: boss.position,
            heading: try_normalize(center - boss.position).unwrap_or(CANONICAL_DIRECTION),
            points: vec![center],
            areas: vec![CueArea::Circle {
                center,
                radius: self.radius,
            }],
        }
    }

    fn execute(&self, _boss: &BossView, plan: &AbilityPlan, _step: u32) -> Execution {
        let pulses = plan
            .points
            .iter()
            .map(|&center| Pulse {
                center,
                radius: self.radius,
                hit: HitSpec::normal(self.damage),
                tint: CueTint::Boss,
            })
            .collect();
        Execution {
            pulses,
            ..default()
        }
    }
}

/// Radial projectile rings in waves, alternating by half a spoke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StormBurst {
    pub cooldown: f32,
    pub telegraph: f32,
    pub waves: u32,
    pub spokes: u32,
    pub wave_interval: f32,
    pub speed: f32,
    pub range: f32,
    pub radius: f32,
    pub damage: f32,
}

impl Default for StormBurst {
    fn default() -> Self {
        Self {
            cooldown: 7.0,
            telegraph: 0.9,
            waves: 3,
            spokes: 12,
            wave_interval: 0.35,
            speed: 240.0,
            range: 480.0,
            radius: 7.0,
            damage: 12.0,
        }
    }
}

impl StormBurst {
    fn headings(&self, heading: Vec2, step: u32) -> impl Iterator<Item = Vec2> + '_ {
        let spokes = self.spokes.max(1);
        let offset = if step % 2 == 1 { 0.5 } else { 0.0 };
        (0..spokes).map(move |i| rotate(heading, TAU * (i as f32 + offset) / spokes as f32))
    }
}

impl BossAbility for StormBurst {
    fn cooldown(&self) -> f32 {
        self.cooldown
    }

    fn telegraph(&self) -> f32 {
        self.telegraph
    }

    fn steps(&self) -> u32 {
        self.waves
    }

    fn step_interval(&self) -> f32 {
        self.wave_interval
    }

    fn plan(&self, boss: &BossView, _rng: &mut SimRng) -> AbilityPlan {
        let heading = boss
            .target
            .and_then(|t| try_normalize(t - boss.position))
            .unwrap_or(CANONICAL_DIRECTION);
        let wave_kinds = self.waves.min(2);
        let areas = (0..wave_kinds)
            .flat_map(|step| self.headings(heading, step))
            .map(|dir| CueArea::Ray {
                origin: boss.position,
                dir,
                length: self.range,
            })
            .collect();
        AbilityPlan {
            origin: boss.position,
            heading,
            points: Vec::new(),
            areas,
        }
    }

    fn execute(&self, boss: &BossView, plan: &AbilityPlan, step: u32) -> Execution {
        let lifetime = self.range / self.speed.max(1.0);
        let spawns = self
            .headings(plan.heading, step)
            .map(|dir| {
                InstanceSpec::new(
                    Team::Hostiles,
                    boss_source(boss),
                    plan.origin,
                    HitSpec::normal(self.damage),
                    lifetime,
                    Body::Projectile(Projectile::new(
                        dir * self.speed,
                        Shape::Circle { radius: self.radius },
                        OnHit::Pierce { remaining: 0 },
                    )),
                )
            })
            .collect();
        Execution {
            spawns,
            ..default()
        }
    }
}

/// Growing poison pools on points scattered around the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoisonPools {
    pub cooldown: f32,
    pub telegraph: f32,
    pub count: u32,
    pub scatter: f32,
    pub radius: f32,
    pub max_radius: f32,
    pub growth: f32,
    pub interval: f32,
    pub lifetime: f32,
    pub damage: f32,
}

impl Default for PoisonPools {
    fn default() -> Self {
        Self {
            cooldown: 10.0,
            telegraph: 1.0,
            count: 3,
            scatter: 140.0,
            radius: 56.0,
            max_radius: 90.0,
            growth: 12.0,
            interval: 0.5,
            lifetime: 5.0,
            damage: 3.0,
        }
    }
}

impl BossAbility for PoisonPools {
    fn cooldown(&self) -> f32 {
        self.cooldown
    }

    fn telegraph(&self) -> f32 {
        self.telegraph
    }

    fn plan(&self, boss: &BossView, rng: &mut SimRng) -> AbilityPlan {
        let center = boss.target.unwrap_or(boss.position);
        let points: Vec<Vec2> = (0..self.count)
            .map(|i| {
                if i == 0 {
                    center
                } else {
                    center + Vec2::from_angle(rng.angle()) * rng.range(self.scatter * 0.4, self.scatter)
                }
            })
            .collect();
        let areas = points
            .iter()
            .map(|&center| CueArea::Circle {
                center,
                radius: self.radius.max(self.max_radius),
            })
            .collect();
        AbilityPlan {
            origin: boss.position,
            heading: try_normalize(center - boss.position).unwrap_or(CANONICAL_DIRECTION),
            points,
            areas,
        }
    }

    fn execute(&self, boss: &BossView, plan: &AbilityPlan, _step: u32) -> Execution {
        let hit = HitSpec::normal(self.damage)
            .with_category(DamageCategory::Aura)
            .with_status(StatusApplication::Poison {
                damage: 1.5,
                duration: 3.0,
                interval: 0.5,
            });
        let sustained = plan
            .points
            .iter()
            .map(|&point| {
                let area = AreaHazard::new(self.radius, self.interval, CueTint::Poison)
                    .growing(self.growth, self.max_radius);
                InstanceSpec::new(
                    Team::Hostiles,
                    boss_source(boss),
                    point,
                    hit,
                    self.lifetime,
                    Body::BossEffect(BossEffect {
                        boss: boss.entity,
                        area,
                    }),
                )
            })
            .collect();
        Execution {
            sustained,
            ..default()
        }
    }
}

pub fn validate() -> Result<(), TableError> {
    if BossArchetype::iter().next().is_none() {
        return Err(TableError::Empty { table: "bosses" });
    }
    for archetype in BossArchetype::iter() {
        let row = archetype.row();
        let ability = archetype.ability();
        let fields = [
            ("health", row.health),
            ("radius", row.radius),
            ("contact_interval", row.contact_interval),
            ("cooldown", ability.cooldown()),
            ("telegraph", ability.telegraph()),
            ("steps", ability.steps() as f32),
        ];
        for (field, value) in fields {
            if value.is_nan() || value <= 0.0 {
                return Err(TableError::InvalidField {
                    table: "bosses",
                    row: row.name,
                    field,
                    value,
                });
            }
        }
    }
    Ok(())
}
