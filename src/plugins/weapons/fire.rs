//! The one firing pipeline every weapon goes through.
//!
//! ```text
//! cooldown ready? owner not stunned?
//!     │
//! targets in range ──► sorted (stable) ──► primary aim (or fallback heading)
//!     │
//! Spread ──► headings (dir + aim point)
//!     │
//! Payload ──► Volley { instances, hazards, spirits }
//! ```

use std::f32::consts::TAU;

use bevy::prelude::*;

use super::arsenal::{OwnerStats, Weapon};
use super::table::{BoltKind, Payload, Spread, Targeting};
use crate::plugins::actors::Team;
use crate::plugins::damage::DamageSource;
use crate::plugins::projectiles::{
    AreaHazard, Body, HitSpec, InstanceSpec, OnHit, Projectile, Shape, SpawnHazardRequest,
};
use crate::plugins::targeting::{fallback_direction, rotate, select_sorted_targets, TargetCandidate};

/// Gap between stacked shots when nothing spreads them.
const STACK_STEP: f32 = 0.15;
/// Floor on the effective cooldown.
const MIN_COOLDOWN: f32 = 0.05;
/// Spawn offset so spirits do not appear inside the owner.
const SUMMON_OFFSET: f32 = 24.0;

/// Request for transient allied spirits.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct SpawnSpiritRequest {
    pub owner: Entity,
    pub position: Vec2,
    pub damage: f32,
    pub speed: f32,
    pub lifetime: f32,
}

/// What a weapon needs to know about whoever is holding it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OwnerView {
    pub entity: Entity,
    pub position: Vec2,
    pub aim: Option<Vec2>,
    pub last_direction: Vec2,
    pub stunned: bool,
    pub stats: OwnerStats,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Heading {
    pub dir: Vec2,
    /// Where a lobbed payload lands.
    pub point: Vec2,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Volley {
    pub instances: Vec<InstanceSpec>,
    pub hazards: Vec<SpawnHazardRequest>,
    pub spirits: Vec<SpawnSpiritRequest>,
}

impl Volley {
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty() && self.hazards.is_empty() && self.spirits.is_empty()
    }
}

fn fan(aim: Vec2, n: u32, arc: f32) -> Vec<Vec2> {
    if n <= 1 {
        return vec![aim];
    }
    let step = arc / (n - 1) as f32;
    let start = -arc * 0.5;
    (0..n).map(|i| rotate(aim, start + step * i as f32)).collect()
}

fn stacked(aim: Vec2, n: u32) -> Vec<Vec2> {
    fan(aim, n, STACK_STEP * n.saturating_sub(1) as f32)
}

impl Weapon {
    /// Tick the cooldown; fire when it is ready and the owner can act.
    pub fn update(&mut self, dt: f32, owner: &OwnerView, targets: &[TargetCandidate]) -> Option<Volley> {
        self.cooldown_timer = (self.cooldown_timer - dt).max(0.0);
        if self.cooldown_timer > 0.0 || owner.stunned {
            return None;
        }
        self.cooldown_timer = (self.stats.cooldown * owner.stats.cooldown_multiplier).max(MIN_COOLDOWN);
        Some(self.fire(owner, targets))
    }

    /// Headings for one volley. Never yields a zero direction.
    pub fn headings(&self, owner: &OwnerView, targets: &[TargetCandidate]) -> Vec<Heading> {
        let profile = self.kind.profile();
        let range = self.stats.range;
        let origin = owner.position;

        let mut sorted = select_sorted_targets(origin, targets.iter().copied(), |_| false);
        sorted.retain(|c| c.distance_sq <= range * range);

        // Only facing weapons follow the cursor; the rest fall back to movement.
        let preferred = match profile.targeting {
            Targeting::Nearest => sorted.first().map(|t| t.position - origin),
            Targeting::Facing => owner.aim,
            Targeting::Around => None,
        };
        let aim = fallback_direction(preferred, owner.last_direction);
        let default_point = |dir: Vec2| match (profile.targeting, sorted.first()) {
            (Targeting::Nearest, Some(t)) => t.position,
            _ => origin + dir * range * 0.5,
        };

        let n = match profile.payload {
            Payload::Aura | Payload::Nova => 1,
            _ => self.stats.count + owner.stats.projectile_count_bonus,
        };

        match profile.spread {
            Spread::Single => stacked(aim, n)
                .into_iter()
                .map(|dir| Heading {
                    dir,
                    point: default_point(dir),
                })
                .collect(),
            Spread::Fan { arc } => fan(aim, n, arc)
                .into_iter()
                .map(|dir| Heading {
                    dir,
                    point: default_point(dir),
                })
                .collect(),
            Spread::Radial => (0..n)
                .map(|i| {
                    let dir = rotate(aim, TAU * i as f32 / n as f32);
                    Heading {
                        dir,
                        point: origin + dir * range * 0.5,
                    }
                })
                .collect(),
            Spread::PerTarget if sorted.is_empty() => stacked(aim, n)
                .into_iter()
                .map(|dir| Heading {
                    dir,
                    point: origin + dir * range * 0.5,
                })
                .collect(),
            Spread::PerTarget => (0..n as usize)
                .map(|i| {
                    let t = sorted[i % sorted.len()];
                    Heading {
                        dir: fallback_direction(Some(t.position - origin), aim),
                        point: t.position,
                    }
                })
                .collect(),
        }
    }

    /// Build one volley. Owner modifiers are applied here.
    pub fn fire(&self, owner: &OwnerView, targets: &[TargetCandidate]) -> Volley {
        let profile = self.kind.profile();
        let s = self.stats;
        let o = owner.stats;
        let source = DamageSource::player(Some(owner.entity));
        let origin = owner.position;

        let hit = HitSpec {
            damage: s.damage * o.damage_multiplier,
            category: profile.category,
            status: profile
                .status
                .map(|st| st.scaled(o.duration_multiplier, o.damage_multiplier)),
        };
        let lifetime = s.duration * o.duration_multiplier;
        let area = s.area * o.area_multiplier;

        let mut volley = Volley::default();
        for h in self.headings(owner, targets) {
            match profile.payload {
                Payload::Bolt(kind) => {
                    let on_hit = match kind {
                        BoltKind::Pierce => OnHit::Pierce {
                            remaining: s.pierce + o.pierce_bonus,
                        },
                        BoltKind::Chain { range } => OnHit::Chain {
                            remaining: s.hops,
                            range: range * o.area_multiplier,
                        },
                        BoltKind::Bounce { jitter } => OnHit::Bounce {
                            remaining: s.hops,
                            jitter,
                        },
                        BoltKind::Trap => OnHit::Trap {
                            duration: s.effect * o.duration_multiplier,
                        },
                        BoltKind::Split { spread } => OnHit::Split {
                            count: s.hops,
                            spread,
                        },
                    };
                    let velocity = h.dir * s.speed * o.projectile_speed_multiplier;
                    let body = Body::Projectile(Projectile::new(velocity, Shape::Circle { radius: area }, on_hit));
                    volley
                        .instances
                        .push(InstanceSpec::new(Team::Allies, source, origin, hit, lifetime, body));
                }
                Payload::Line { half_width } => {
                    let shape = Shape::Segment {
                        dir: h.dir,
                        length: area,
                        half_width: half_width * o.area_multiplier,
                    };
                    let body = Body::Projectile(Projectile::new(Vec2::ZERO, shape, OnHit::Sweep));
                    volley.instances.push(
                        InstanceSpec::new(Team::Allies, source, origin, hit, lifetime, body).anchored(owner.entity),
                    );
                }
                Payload::Lob(template) => {
                    volley.hazards.push(SpawnHazardRequest {
                        area,
                        might: hit.damage,
                        ..SpawnHazardRequest::new(template, Team::Allies, source, h.point)
                    });
                }
                Payload::Aura => {
                    let body = Body::Hazard(AreaHazard::new(area, s.effect, profile.tint));
                    volley.instances.push(
                        InstanceSpec::new(Team::Allies, source, origin, hit, lifetime, body).anchored(owner.entity),
                    );
                }
                Payload::Nova => {
                    // Interval past the lifetime: exactly one pulse.
                    let body = Body::Hazard(AreaHazard::new(area, lifetime + 1.0, profile.tint));
                    volley
                        .instances
                        .push(InstanceSpec::new(Team::Allies, source, origin, hit, lifetime, body));
                }
                Payload::Summon => {
                    volley.spirits.push(SpawnSpiritRequest {
                        owner: owner.entity,
                        position: origin + h.dir * SUMMON_OFFSET,
                        damage: hit.damage,
                        speed: s.speed * o.projectile_speed_multiplier,
                        lifetime,
                    });
                }
            }
        }
        volley
    }
}
