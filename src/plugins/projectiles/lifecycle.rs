//! Per-tick advance of every live instance.
//!
//! `Instance::advance` is pure over a [`HitContext`]: it never touches the ECS
//! directly, so the whole on-hit state machine can be driven by a fake in
//! tests. [`advance_instances`] is the system that wires it to the world.
//!
//! Order within one advance:
//! 1. age; the hard ceiling wins over everything (a held trap is released)
//! 2. follow the anchor, if any
//! 3. body-specific: translate, nominal expiry, out-of-bounds, collisions

use std::f32::consts::TAU;

use bevy::prelude::*;

use super::components::{
    AreaHazard, Body, BossEffect, HitSpec, Instance, InstanceCore, InstanceSpec, OnHit, Phase, Projectile,
    Shape,
};
use crate::common::rng::SimRng;
use crate::common::tunables::Tunables;
use crate::plugins::actors::{Combatant, Team};
use crate::plugins::damage::{strike, CombatLog, CombatOutput, DamageSource, Hit, StrikeOutcome};
use crate::plugins::fx::{CueTint, VisualCue};
use crate::plugins::status::{ApplyOutcome, CombatRules, StatusApplication};
use crate::plugins::targeting::{
    circle_hit, nearest_target, rotate, try_normalize, ActorIndex, TargetCandidate, CANONICAL_DIRECTION,
};
use crate::plugins::world::PlayArea;

/// Children of a split get this share of the parent's damage, lifetime and size.
const SPLIT_SHARE: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    Continue,
    Terminal,
}

/// What an instance may ask of the world while advancing.
pub trait HitContext {
    /// Targetable actors of `team` whose body may touch the circle. Stable order.
    fn candidates(&self, center: Vec2, reach: f32, team: Team) -> Vec<TargetCandidate>;
    /// Position of a still-targetable actor.
    fn position(&self, target: Entity) -> Option<Vec2>;
    fn strike(&mut self, target: Entity, hit: &Hit) -> Option<StrikeOutcome>;
    /// Try to trap `target` on behalf of the `trap` instance.
    fn capture(&mut self, target: Entity, trap: Entity, source: DamageSource, duration: f32) -> bool;
    fn is_captured_by(&self, target: Entity, trap: Entity) -> bool;
    fn release(&mut self, target: Entity, trap: Entity);
    fn spawn(&mut self, spec: InstanceSpec);
    fn cue(&mut self, cue: VisualCue);
    /// Symmetric random offset in `[-max, max]`.
    fn jitter(&mut self, max: f32) -> f32;
    /// Play area already expanded by the out-of-bounds margin.
    fn bounds(&self) -> Rect;
}

/// Result of resolving one hit against the on-hit payload.
enum HitResult {
    /// Keep testing the remaining candidates.
    Continue,
    /// Stop this pass (repositioned, reflected or capturing).
    Stop,
    Terminal,
}

impl InstanceCore {
    fn finish(&mut self) -> Progress {
        self.terminal = true;
        Progress::Terminal
    }
}

impl Instance {
    pub fn advance(&mut self, me: Entity, pos: &mut Vec2, dt: f32, ctx: &mut impl HitContext) -> Progress {
        let core = &mut self.core;
        if core.terminal {
            return Progress::Terminal;
        }

        core.age += dt;
        if core.age >= core.max_lifetime {
            if let Body::Projectile(Projectile {
                phase: Phase::Trapping { target },
                ..
            }) = self.body
            {
                ctx.release(target, me);
            }
            return core.finish();
        }

        if let Some(anchor) = core.anchor {
            match ctx.position(anchor) {
                Some(p) => *pos = p,
                None => return core.finish(),
            }
        }

        match &mut self.body {
            Body::Projectile(p) => p.advance(core, me, pos, dt, ctx),
            Body::Hazard(area) => area.advance(core, *pos, dt, ctx),
            Body::BossEffect(BossEffect { boss, area }) => {
                if ctx.position(*boss).is_none() {
                    return core.finish();
                }
                area.advance(core, *pos, dt, ctx)
            }
        }
    }
}

impl Projectile {
    fn advance(
        &mut self,
        core: &mut InstanceCore,
        me: Entity,
        pos: &mut Vec2,
        dt: f32,
        ctx: &mut impl HitContext,
    ) -> Progress {
        match self.phase {
            Phase::Bursting => return core.finish(),
            Phase::Trapping { target } => {
                self.hold -= dt;
                let held = ctx.is_captured_by(target, me);
                if held && self.hold > 0.0 {
                    if let Some(p) = ctx.position(target) {
                        *pos = p;
                    }
                    return Progress::Continue;
                }
                if held {
                    ctx.release(target, me);
                }
                return self.burst(core, *pos, ctx);
            }
            Phase::Chaining { target } => {
                self.phase = Phase::Active;
                let Some(p) = ctx.position(target) else {
                    return core.finish();
                };
                if core.hit_targets.contains(&target) {
                    return core.finish();
                }
                *pos = p;
                return match self.resolve_hit(core, me, target, p, pos, ctx) {
                    HitResult::Terminal => core.finish(),
                    HitResult::Continue | HitResult::Stop => Progress::Continue,
                };
            }
            Phase::Active => {
                if core.anchor.is_none() {
                    *pos += self.velocity * dt;
                }
            }
        }

        if core.age >= core.lifetime {
            if matches!(self.on_hit, OnHit::Split { .. }) {
                return self.burst(core, *pos, ctx);
            }
            return core.finish();
        }

        if !ctx.bounds().contains(*pos) {
            return core.finish();
        }

        let (center, reach) = self.shape.bounds(*pos);
        for c in ctx.candidates(center, reach, core.team.opponent()) {
            if core.hit_targets.contains(&c.entity) {
                continue;
            }
            if !self.shape.touches(*pos, c.position, c.radius) {
                continue;
            }
            match self.resolve_hit(core, me, c.entity, c.position, pos, ctx) {
                HitResult::Continue => {}
                HitResult::Stop => break,
                HitResult::Terminal => return core.finish(),
            }
        }
        Progress::Continue
    }

    fn resolve_hit(
        &mut self,
        core: &mut InstanceCore,
        me: Entity,
        target: Entity,
        target_pos: Vec2,
        pos: &mut Vec2,
        ctx: &mut impl HitContext,
    ) -> HitResult {
        let hit = core.hit();
        if ctx.strike(target, &hit).is_none() {
            return HitResult::Continue;
        }
        core.hit_targets.insert(target);

        match &mut self.on_hit {
            OnHit::Pierce { remaining } => {
                *remaining -= 1;
                if *remaining < 0 {
                    HitResult::Terminal
                } else {
                    HitResult::Continue
                }
            }
            OnHit::Sweep => HitResult::Continue,
            OnHit::Chain { remaining, range } => {
                if *remaining == 0 {
                    return HitResult::Terminal;
                }
                let pool: Vec<TargetCandidate> = ctx
                    .candidates(target_pos, *range, core.team.opponent())
                    .into_iter()
                    .filter(|c| !core.hit_targets.contains(&c.entity))
                    .collect();
                let Some(next) = nearest_target(target_pos, pool, *range * *range) else {
                    return HitResult::Terminal;
                };
                ctx.cue(VisualCue::Link {
                    from: target_pos,
                    to: next.position,
                    tint: CueTint::Lightning,
                });
                *pos = next.position;
                *remaining -= 1;
                self.phase = Phase::Chaining { target: next.entity };
                HitResult::Stop
            }
            OnHit::Bounce { remaining, jitter } => {
                if *remaining == 0 {
                    return HitResult::Terminal;
                }
                let speed = self.velocity.length();
                let back = try_normalize(-self.velocity).unwrap_or(CANONICAL_DIRECTION);
                self.velocity = rotate(back, ctx.jitter(*jitter)) * speed;
                core.hit_targets.clear();
                core.hit_targets.insert(target);
                *remaining -= 1;
                HitResult::Stop
            }
            OnHit::Trap { duration } => {
                let duration = *duration;
                if ctx.capture(target, me, core.source.via(me), duration) {
                    self.phase = Phase::Trapping { target };
                    self.hold = duration;
                    *pos = target_pos;
                    HitResult::Stop
                } else {
                    self.burst(core, *pos, ctx);
                    HitResult::Terminal
                }
            }
            OnHit::Split { .. } => {
                self.burst(core, *pos, ctx);
                HitResult::Terminal
            }
        }
    }

    /// Terminal flourish: cue, and split children for split payloads.
    fn burst(&mut self, core: &mut InstanceCore, pos: Vec2, ctx: &mut impl HitContext) -> Progress {
        self.phase = Phase::Bursting;
        let radius = match self.shape {
            Shape::Circle { radius } => radius,
            Shape::Segment { half_width, .. } => half_width,
        };
        ctx.cue(VisualCue::impact(pos, radius * 2.0, CueTint::Neutral));

        if let OnHit::Split { count, spread } = self.on_hit {
            let base = try_normalize(self.velocity).unwrap_or(CANONICAL_DIRECTION);
            let speed = self.velocity.length();
            let n = count.max(1) as f32;
            for i in 0..count {
                let angle = TAU * i as f32 / n + ctx.jitter(spread);
                let dir = rotate(base, angle);
                let child = Projectile::new(
                    dir * speed,
                    self.shape.scaled(SPLIT_SHARE),
                    OnHit::Pierce { remaining: 0 },
                );
                let mut spec = InstanceSpec::new(
                    core.team,
                    core.source,
                    pos,
                    HitSpec {
                        damage: core.hit.damage * SPLIT_SHARE,
                        ..core.hit
                    },
                    core.lifetime * SPLIT_SHARE,
                    Body::Projectile(child),
                );
                spec.pre_hit = core.hit_targets.iter().copied().collect();
                ctx.spawn(spec);
            }
        }
        core.finish()
    }
}

impl AreaHazard {
    fn advance(&mut self, core: &mut InstanceCore, pos: Vec2, dt: f32, ctx: &mut impl HitContext) -> Progress {
        if core.age >= core.lifetime {
            return core.finish();
        }
        if self.growth > 0.0 {
            self.radius = (self.radius + self.growth * dt).min(self.max_radius);
        }

        self.pulse_timer -= dt;
        if self.pulse_timer > 0.0 {
            return Progress::Continue;
        }
        self.pulse_timer = self.interval;

        let hit = core.hit();
        for c in ctx.candidates(pos, self.radius, core.team.opponent()) {
            if circle_hit(pos, self.radius, c.position, c.radius) {
                ctx.strike(c.entity, &hit);
            }
        }
        ctx.cue(VisualCue::impact(pos, self.radius, self.tint));
        Progress::Continue
    }
}

// -----------------------------------------------------------------------------
// ECS wiring
// -----------------------------------------------------------------------------

/// [`HitContext`] over the live ECS world.
pub struct WorldContext<'a, 'w, 's> {
    pub index: &'a ActorIndex,
    pub actors: &'a mut Query<'w, 's, (&'static mut Combatant, &'static Transform)>,
    pub log: &'a mut CombatLog,
    pub rng: &'a mut SimRng,
    pub bounds: Rect,
}

impl HitContext for WorldContext<'_, '_, '_> {
    fn candidates(&self, center: Vec2, reach: f32, team: Team) -> Vec<TargetCandidate> {
        let mut out = self.index.query(center, reach, team);
        out.retain(|c| self.actors.get(c.entity).is_ok_and(|(a, _)| a.is_targetable()));
        out
    }

    fn position(&self, target: Entity) -> Option<Vec2> {
        let (actor, tf) = self.actors.get(target).ok()?;
        actor.is_targetable().then(|| tf.translation.truncate())
    }

    fn strike(&mut self, target: Entity, hit: &Hit) -> Option<StrikeOutcome> {
        let (mut actor, tf) = self.actors.get_mut(target).ok()?;
        strike(target, &mut actor, tf.translation.truncate(), hit, self.log)
    }

    fn capture(&mut self, target: Entity, _trap: Entity, source: DamageSource, duration: f32) -> bool {
        let Ok((mut actor, _)) = self.actors.get_mut(target) else {
            return false;
        };
        actor.apply_status(StatusApplication::Trap { duration }, source, self.log.rules)
            == ApplyOutcome::Created
    }

    fn is_captured_by(&self, target: Entity, trap: Entity) -> bool {
        self.actors.get(target).is_ok_and(|(a, _)| {
            a.is_targetable() && a.status.trap.is_some_and(|t| t.by == trap)
        })
    }

    fn release(&mut self, target: Entity, trap: Entity) {
        if let Ok((mut actor, _)) = self.actors.get_mut(target) {
            if actor.status.trap.is_some_and(|t| t.by == trap) {
                actor.release_trap();
            }
        }
    }

    fn spawn(&mut self, spec: InstanceSpec) {
        self.log.spawns.push(spec);
    }

    fn cue(&mut self, cue: VisualCue) {
        self.log.cues.push(cue);
    }

    fn jitter(&mut self, max: f32) -> f32 {
        self.rng.jitter(max)
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Advance every live instance spawned in an earlier tick.
pub fn advance_instances(
    time: Res<Time>,
    tunables: Res<Tunables>,
    play_area: Option<Res<PlayArea>>,
    index: Res<ActorIndex>,
    mut rng: ResMut<SimRng>,
    mut actors: Query<(&'static mut Combatant, &'static Transform)>,
    mut instances: Query<(Entity, &mut Instance, &mut Transform), Without<Combatant>>,
    mut out: CombatOutput,
) {
    let dt = time.delta_secs();
    let bounds = match play_area {
        Some(area) => area.0.inflate(tunables.out_of_bounds_margin),
        None => Rect::new(f32::MIN, f32::MIN, f32::MAX, f32::MAX),
    };
    let mut log = CombatLog::new(CombatRules::from(&*tunables));

    {
        let mut ctx = WorldContext {
            index: &index,
            actors: &mut actors,
            log: &mut log,
            rng: &mut rng,
            bounds,
        };
        for (e, mut instance, mut tf) in &mut instances {
            let mut pos = tf.translation.truncate();
            instance.advance(e, &mut pos, dt, &mut ctx);
            tf.translation.x = pos.x;
            tf.translation.y = pos.y;
        }
    }

    out.flush(log);
}
