//! Status effect slots and their merge / expiry rules.
//!
//! One `Option` slot per kind, so "at most one entry per kind" holds by
//! construction. Speed-affecting effects (slow, freeze, trap) share a single
//! snapshot of the pre-effect speed: the first one to arrive takes it, every
//! later change derives the current speed from it, and the last one to leave
//! writes it back verbatim.

use bevy::prelude::*;
use strum::EnumIter;

use crate::common::tunables::Tunables;
use crate::plugins::actors::{Combatant, MovementOverride};
use crate::plugins::damage::{DamageCategory, DamageSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum StatusKind {
    Burn,
    Poison,
    Slow,
    Freeze,
    Stun,
    Trap,
}

impl StatusKind {
    /// Kinds a boss silently ignores.
    #[inline]
    pub fn is_crowd_control(self) -> bool {
        matches!(
            self,
            StatusKind::Slow | StatusKind::Freeze | StatusKind::Stun | StatusKind::Trap
        )
    }
}

/// An incoming status application, as carried by a hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StatusApplication {
    Burn { damage: f32, duration: f32, interval: f32 },
    Poison { damage: f32, duration: f32, interval: f32 },
    Slow { factor: f32, duration: f32 },
    Freeze { duration: f32 },
    Stun { duration: f32 },
    Trap { duration: f32 },
}

impl StatusApplication {
    pub fn kind(&self) -> StatusKind {
        match self {
            Self::Burn { .. } => StatusKind::Burn,
            Self::Poison { .. } => StatusKind::Poison,
            Self::Slow { .. } => StatusKind::Slow,
            Self::Freeze { .. } => StatusKind::Freeze,
            Self::Stun { .. } => StatusKind::Stun,
            Self::Trap { .. } => StatusKind::Trap,
        }
    }

    /// Scale the duration (weapon duration multipliers).
    pub fn scaled(self, duration_mult: f32, damage_mult: f32) -> Self {
        match self {
            Self::Burn { damage, duration, interval } => Self::Burn {
                damage: damage * damage_mult,
                duration: duration * duration_mult,
                interval,
            },
            Self::Poison { damage, duration, interval } => Self::Poison {
                damage: damage * damage_mult,
                duration: duration * duration_mult,
                interval,
            },
            Self::Slow { factor, duration } => Self::Slow {
                factor,
                duration: duration * duration_mult,
            },
            Self::Freeze { duration } => Self::Freeze {
                duration: duration * duration_mult,
            },
            Self::Stun { duration } => Self::Stun {
                duration: duration * duration_mult,
            },
            Self::Trap { duration } => Self::Trap {
                duration: duration * duration_mult,
            },
        }
    }
}

/// Result of an application attempt. Never an error: every case is expected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Created,
    Refreshed,
    /// Slow arriving during a freeze; applied at thaw.
    Queued,
    /// Boss crowd-control immunity or slow immunity. Nothing changed.
    Immune,
    /// Dead target, second trap, trap without a source.
    Rejected,
}

/// Knobs the entry point needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombatRules {
    pub boss_dot_multiplier: f32,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            boss_dot_multiplier: 0.5,
        }
    }
}

impl From<&Tunables> for CombatRules {
    fn from(t: &Tunables) -> Self {
        Self {
            boss_dot_multiplier: t.boss_dot_multiplier,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotEffect {
    pub damage: f32,
    pub duration: f32,
    pub tick_interval: f32,
    pub tick_timer: f32,
    pub source: DamageSource,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlowEffect {
    pub factor: f32,
    pub duration: f32,
    pub source: DamageSource,
}

impl SlowEffect {
    /// Stronger (lower) factor wins, duration extends.
    fn merge(&mut self, incoming: SlowEffect) {
        if incoming.factor < self.factor {
            self.factor = incoming.factor;
            self.source = incoming.source;
        }
        self.duration = self.duration.max(incoming.duration);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedEffect {
    pub duration: f32,
    pub source: DamageSource,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrapEffect {
    pub duration: f32,
    pub by: Entity,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusEffects {
    pub burn: Option<DotEffect>,
    pub poison: Option<DotEffect>,
    pub slow: Option<SlowEffect>,
    pub freeze: Option<TimedEffect>,
    pub stun: Option<TimedEffect>,
    pub trap: Option<TrapEffect>,
    pub queued_slow: Option<SlowEffect>,
    /// Speed before the first speed-affecting effect arrived.
    pub original_speed: Option<f32>,
}

impl StatusEffects {
    pub fn has(&self, kind: StatusKind) -> bool {
        match kind {
            StatusKind::Burn => self.burn.is_some(),
            StatusKind::Poison => self.poison.is_some(),
            StatusKind::Slow => self.slow.is_some(),
            StatusKind::Freeze => self.freeze.is_some(),
            StatusKind::Stun => self.stun.is_some(),
            StatusKind::Trap => self.trap.is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == StatusEffects::default()
    }
}

/// One damage-over-time tick produced by [`Combatant::tick_status`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotTick {
    pub damage: f32,
    pub category: DamageCategory,
    pub source: DamageSource,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusTick {
    pub dots: Vec<DotTick>,
    /// Trap instance whose hold ended this tick.
    pub released_trap: Option<Entity>,
}

fn merge_dot(slot: &mut Option<DotEffect>, incoming: DotEffect) -> ApplyOutcome {
    match slot {
        Some(cur) => {
            cur.damage = cur.damage.max(incoming.damage);
            cur.duration = cur.duration.max(incoming.duration);
            cur.tick_interval = incoming.tick_interval;
            cur.tick_timer = incoming.tick_timer;
            cur.source = incoming.source;
            ApplyOutcome::Refreshed
        }
        None => {
            *slot = Some(incoming);
            ApplyOutcome::Created
        }
    }
}

fn merge_timed(slot: &mut Option<TimedEffect>, incoming: TimedEffect) -> ApplyOutcome {
    match slot {
        Some(cur) => {
            cur.duration = cur.duration.max(incoming.duration);
            ApplyOutcome::Refreshed
        }
        None => {
            *slot = Some(incoming);
            ApplyOutcome::Created
        }
    }
}

/// Returns `(emitted tick, expired)`.
fn tick_dot(effect: &mut DotEffect, dt: f32) -> (bool, bool) {
    effect.duration -= dt;
    effect.tick_timer -= dt;
    let fired = effect.tick_timer <= 0.0;
    if fired {
        effect.tick_timer = effect.tick_interval;
    }
    (fired, effect.duration <= 0.0)
}

impl Combatant {
    /// Status entry point. Immunity and boss scaling happen here, before merging.
    pub fn apply_status(
        &mut self,
        application: StatusApplication,
        source: DamageSource,
        rules: CombatRules,
    ) -> ApplyOutcome {
        if !self.is_targetable() {
            return ApplyOutcome::Rejected;
        }
        if self.is_boss() && application.kind().is_crowd_control() {
            return ApplyOutcome::Immune;
        }
        let dot_scale = if self.is_boss() {
            rules.boss_dot_multiplier
        } else {
            1.0
        };

        match application {
            StatusApplication::Burn {
                damage,
                duration,
                interval,
            } => merge_dot(
                &mut self.status.burn,
                DotEffect {
                    damage: damage * dot_scale,
                    duration,
                    tick_interval: interval,
                    tick_timer: interval,
                    source,
                },
            ),
            StatusApplication::Poison {
                damage,
                duration,
                interval,
            } => merge_dot(
                &mut self.status.poison,
                DotEffect {
                    damage: damage * dot_scale,
                    duration,
                    tick_interval: interval,
                    tick_timer: interval,
                    source,
                },
            ),
            StatusApplication::Slow { factor, duration } => {
                self.apply_slow(factor, duration, source)
            }
            StatusApplication::Freeze { duration } => {
                self.status.slow = None;
                self.anchor_speed();
                let outcome = merge_timed(&mut self.status.freeze, TimedEffect { duration, source });
                self.refresh_speed();
                outcome
            }
            StatusApplication::Stun { duration } => {
                merge_timed(&mut self.status.stun, TimedEffect { duration, source })
            }
            StatusApplication::Trap { duration } => {
                let Some(by) = source.entity else {
                    return ApplyOutcome::Rejected;
                };
                if self.status.trap.is_some() {
                    return ApplyOutcome::Rejected;
                }
                self.anchor_speed();
                self.status.trap = Some(TrapEffect { duration, by });
                self.movement.overriding = Some(MovementOverride::Trapped { by });
                self.refresh_speed();
                ApplyOutcome::Created
            }
        }
    }

    fn apply_slow(&mut self, factor: f32, duration: f32, source: DamageSource) -> ApplyOutcome {
        if self.resist.slow_immune {
            return ApplyOutcome::Immune;
        }
        let factor = factor.clamp(0.0, 1.0);
        let r = self.resist.slow_resistance.clamp(0.0, 1.0);
        let factor = factor + (1.0 - factor) * r;
        if factor >= 1.0 {
            return ApplyOutcome::Immune;
        }
        let incoming = SlowEffect {
            factor,
            duration,
            source,
        };

        if self.status.freeze.is_some() {
            match &mut self.status.queued_slow {
                Some(q) => q.merge(incoming),
                None => self.status.queued_slow = Some(incoming),
            }
            return ApplyOutcome::Queued;
        }

        let outcome = match &mut self.status.slow {
            Some(cur) => {
                cur.merge(incoming);
                ApplyOutcome::Refreshed
            }
            None => {
                self.anchor_speed();
                self.status.slow = Some(incoming);
                ApplyOutcome::Created
            }
        };
        self.refresh_speed();
        outcome
    }

    fn anchor_speed(&mut self) {
        if self.status.original_speed.is_none() {
            self.status.original_speed = Some(self.stats.speed);
        }
    }

    /// Derive the current speed from the snapshot; restore it once nothing holds it.
    fn refresh_speed(&mut self) {
        let Some(anchor) = self.status.original_speed else {
            return;
        };
        let s = &self.status;
        if s.freeze.is_some() || s.trap.is_some() {
            self.stats.speed = 0.0;
        } else if let Some(slow) = s.slow {
            self.stats.speed = anchor * slow.factor;
        } else {
            self.stats.speed = anchor;
            self.status.original_speed = None;
        }
    }

    /// End a trap hold: clear the movement override and restore speed.
    /// Returns the trap instance that was holding the actor.
    pub fn release_trap(&mut self) -> Option<Entity> {
        let trap = self.status.trap.take()?;
        if matches!(self.movement.overriding, Some(MovementOverride::Trapped { .. })) {
            self.movement.overriding = None;
        }
        self.refresh_speed();
        Some(trap.by)
    }

    /// Drop every effect, restoring speed first.
    pub fn clear_status(&mut self) {
        self.release_trap();
        if let Some(anchor) = self.status.original_speed {
            self.stats.speed = anchor;
        }
        self.status = StatusEffects::default();
    }

    /// Advance every active effect by `dt`.
    ///
    /// `trap_alive` reports whether a trap instance still exists; orphaned
    /// holds are released. DOT ticks are returned, not applied.
    pub fn tick_status(&mut self, dt: f32, trap_alive: impl Fn(Entity) -> bool) -> StatusTick {
        let mut out = StatusTick::default();
        if !self.is_targetable() {
            return out;
        }

        for (slot, category) in [
            (&mut self.status.burn, DamageCategory::Burn),
            (&mut self.status.poison, DamageCategory::Poison),
        ] {
            let Some(effect) = slot.as_mut() else {
                continue;
            };
            let (fired, expired) = tick_dot(effect, dt);
            if fired {
                out.dots.push(DotTick {
                    damage: effect.damage,
                    category,
                    source: effect.source,
                });
            }
            if expired {
                *slot = None;
            }
        }

        if let Some(slow) = &mut self.status.slow {
            slow.duration -= dt;
            if slow.duration <= 0.0 {
                self.status.slow = None;
            }
        }
        if let Some(q) = &mut self.status.queued_slow {
            q.duration -= dt;
            if q.duration <= 0.0 {
                self.status.queued_slow = None;
            }
        }
        if let Some(freeze) = &mut self.status.freeze {
            freeze.duration -= dt;
            if freeze.duration <= 0.0 {
                self.status.freeze = None;
                if let Some(queued) = self.status.queued_slow.take() {
                    self.status.slow = Some(queued);
                }
            }
        }
        if let Some(stun) = &mut self.status.stun {
            stun.duration -= dt;
            if stun.duration <= 0.0 {
                self.status.stun = None;
            }
        }

        let release = match &mut self.status.trap {
            Some(trap) => {
                trap.duration -= dt;
                trap.duration <= 0.0 || !trap_alive(trap.by)
            }
            None => false,
        };
        if release {
            out.released_trap = self.release_trap();
        }

        self.refresh_speed();
        out
    }
}
