//! Instance data: a shared core plus a tagged body.
//!
//! ```text
//! Instance
//! ├── core: team, source, anchor, hit payload, lifetime/age/ceiling,
//! │         hit_targets, terminal
//! └── body: Projectile { velocity, shape, on_hit, phase }
//!         | Hazard(AreaHazard)                    static or anchored, pulses
//!         | BossEffect { boss, area }             persistent, owned by a boss
//! ```

use bevy::platform::collections::HashSet;
use bevy::prelude::*;
use strum::EnumIter;

use crate::plugins::actors::Team;
use crate::plugins::damage::{DamageCategory, DamageSource, Hit};
use crate::plugins::fx::CueTint;
use crate::plugins::status::StatusApplication;
use crate::plugins::targeting::{circle_hit, segment_hit};

/// Budget bucket of an instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum InstanceKind {
    Projectile,
    Line,
    Hazard,
    BossEffect,
}

/// Damage payload carried by an instance; the source lives on the core.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitSpec {
    pub damage: f32,
    pub category: DamageCategory,
    pub status: Option<StatusApplication>,
}

impl HitSpec {
    pub fn normal(damage: f32) -> Self {
        Self {
            damage,
            category: DamageCategory::Normal,
            status: None,
        }
    }

    pub fn with_status(mut self, status: StatusApplication) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_category(mut self, category: DamageCategory) -> Self {
        self.category = category;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    /// From the instance position along `dir` (unit) for `length`.
    Segment { dir: Vec2, length: f32, half_width: f32 },
}

impl Shape {
    /// Broad-phase circle `(center, radius)` covering the shape.
    pub fn bounds(&self, pos: Vec2) -> (Vec2, f32) {
        match *self {
            Shape::Circle { radius } => (pos, radius),
            Shape::Segment {
                dir,
                length,
                half_width,
            } => (pos + dir * (length * 0.5), length * 0.5 + half_width),
        }
    }

    pub fn touches(&self, pos: Vec2, target: Vec2, target_radius: f32) -> bool {
        match *self {
            Shape::Circle { radius } => circle_hit(pos, radius, target, target_radius),
            Shape::Segment {
                dir,
                length,
                half_width,
            } => segment_hit(pos, pos + dir * length, half_width, target, target_radius),
        }
    }

    pub fn scaled(self, k: f32) -> Self {
        match self {
            Shape::Circle { radius } => Shape::Circle { radius: radius * k },
            Shape::Segment {
                dir,
                length,
                half_width,
            } => Shape::Segment {
                dir,
                length: length * k,
                half_width: half_width * k,
            },
        }
    }
}

/// What happens after a projectile connects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OnHit {
    /// Terminal once `remaining` drops below zero.
    Pierce { remaining: i32 },
    /// Line attack: every target once, never terminal by hits.
    Sweep,
    Chain { remaining: u32, range: f32 },
    Bounce { remaining: u32, jitter: f32 },
    Trap { duration: f32 },
    /// Burst into `count` non-splitting children.
    Split { count: u32, spread: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Active,
    /// Repositioned onto `target`; strikes it next tick without translating.
    Chaining { target: Entity },
    Trapping { target: Entity },
    Bursting,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    pub velocity: Vec2,
    pub shape: Shape,
    pub on_hit: OnHit,
    pub phase: Phase,
    /// Time left on a trap hold; only meaningful while `Trapping`.
    pub hold: f32,
}

impl Projectile {
    pub fn new(velocity: Vec2, shape: Shape, on_hit: OnHit) -> Self {
        Self {
            velocity,
            shape,
            on_hit,
            phase: Phase::Active,
            hold: 0.0,
        }
    }
}

/// Ground effect that pulses on its own interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaHazard {
    pub radius: f32,
    pub interval: f32,
    /// Starts at zero: the first pulse lands on the first advance.
    pub pulse_timer: f32,
    /// Radius gained per second, capped at `max_radius`.
    pub growth: f32,
    pub max_radius: f32,
    pub tint: CueTint,
}

impl AreaHazard {
    pub fn new(radius: f32, interval: f32, tint: CueTint) -> Self {
        Self {
            radius,
            interval,
            pulse_timer: 0.0,
            growth: 0.0,
            max_radius: radius,
            tint,
        }
    }

    pub fn growing(mut self, growth: f32, max_radius: f32) -> Self {
        self.growth = growth;
        self.max_radius = max_radius.max(self.radius);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossEffect {
    pub boss: Entity,
    pub area: AreaHazard,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Body {
    Projectile(Projectile),
    Hazard(AreaHazard),
    BossEffect(BossEffect),
}

impl Body {
    pub fn kind(&self) -> InstanceKind {
        match self {
            Body::Projectile(p) => match p.shape {
                Shape::Segment { .. } => InstanceKind::Line,
                Shape::Circle { .. } => InstanceKind::Projectile,
            },
            Body::Hazard(_) => InstanceKind::Hazard,
            Body::BossEffect(_) => InstanceKind::BossEffect,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InstanceCore {
    pub team: Team,
    pub source: DamageSource,
    /// Actor whose position this instance follows.
    pub anchor: Option<Entity>,
    pub hit: HitSpec,
    pub lifetime: f32,
    pub age: f32,
    /// Hard ceiling; wins over every other continuation.
    pub max_lifetime: f32,
    pub hit_targets: HashSet<Entity>,
    pub terminal: bool,
}

impl InstanceCore {
    pub fn hit(&self) -> Hit {
        Hit {
            damage: self.hit.damage,
            category: self.hit.category,
            source: self.source,
            status: self.hit.status,
        }
    }
}

#[derive(Component, Clone, Debug, PartialEq)]
pub struct Instance {
    pub kind: InstanceKind,
    pub core: InstanceCore,
    pub body: Body,
}

impl Instance {
    pub fn from_spec(spec: InstanceSpec, max_lifetime: f32) -> Self {
        let mut hit_targets = HashSet::default();
        hit_targets.extend(spec.pre_hit);
        Self {
            kind: spec.body.kind(),
            core: InstanceCore {
                team: spec.team,
                source: spec.source,
                anchor: spec.anchor,
                hit: spec.hit,
                lifetime: spec.lifetime,
                age: 0.0,
                max_lifetime: max_lifetime.max(0.0),
                hit_targets,
                terminal: false,
            },
            body: spec.body,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.core.terminal
    }

    /// Mark for the sweep.
    #[inline]
    pub fn terminate(&mut self) {
        self.core.terminal = true;
    }
}

/// Everything needed to create an instance.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceSpec {
    pub team: Team,
    pub source: DamageSource,
    pub anchor: Option<Entity>,
    pub position: Vec2,
    pub hit: HitSpec,
    pub lifetime: f32,
    pub body: Body,
    /// Targets this instance must never hit (e.g. what its parent just hit).
    pub pre_hit: Vec<Entity>,
}

impl InstanceSpec {
    pub fn new(team: Team, source: DamageSource, position: Vec2, hit: HitSpec, lifetime: f32, body: Body) -> Self {
        Self {
            team,
            source,
            anchor: None,
            position,
            hit,
            lifetime,
            body,
            pre_hit: Vec::new(),
        }
    }

    pub fn anchored(mut self, anchor: Entity) -> Self {
        self.anchor = Some(anchor);
        self
    }

    #[inline]
    pub fn kind(&self) -> InstanceKind {
        self.body.kind()
    }
}
