//! Archetype-agnostic boss ability state machine.
//!
//! ```text
//!   Idle ──cooldown──► Telegraphing ──warning──► Executing ──steps done──┬─► Idle
//!    ▲                  (plan fixed)              (plan replayed)        │
//!    └────────── all owned effects terminal ◄── Sustaining ◄─────────────┘
//! ```
//!
//! The plan is committed when the telegraph starts and the execution reads
//! it back unchanged, so the warning and the effect always cover the same
//! ground. Archetypes only supply a [`BossAbility`].

use std::fmt;

use bevy::prelude::*;

use crate::common::rng::SimRng;
use crate::plugins::fx::{CueArea, CueTint};
use crate::plugins::projectiles::{HitSpec, InstanceSpec};

use super::archetypes::BossArchetype;

/// What the machine knows about its boss this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossView {
    pub entity: Entity,
    pub position: Vec2,
    /// Nearest opponent, if any.
    pub target: Option<Vec2>,
    pub stunned: bool,
}

/// Parameters frozen at telegraph start.
#[derive(Clone, Debug, PartialEq)]
pub struct AbilityPlan {
    pub origin: Vec2,
    pub heading: Vec2,
    pub points: Vec<Vec2>,
    /// What the telegraph shows.
    pub areas: Vec<CueArea>,
}

/// One immediate area strike.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulse {
    pub center: Vec2,
    pub radius: f32,
    pub hit: HitSpec,
    pub tint: CueTint,
}

/// Effects of one execution step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Execution {
    pub pulses: Vec<Pulse>,
    /// Fire-and-forget instances.
    pub spawns: Vec<InstanceSpec>,
    /// Instances the boss owns and waits on before going idle again.
    pub sustained: Vec<InstanceSpec>,
}

/// One archetype's special ability.
pub trait BossAbility: Send + Sync + 'static {
    fn cooldown(&self) -> f32;
    fn telegraph(&self) -> f32;
    /// Number of execution steps (waves).
    fn steps(&self) -> u32 {
        1
    }
    /// Delay between execution steps.
    fn step_interval(&self) -> f32 {
        0.0
    }
    fn plan(&self, boss: &BossView, rng: &mut SimRng) -> AbilityPlan;
    fn execute(&self, boss: &BossView, plan: &AbilityPlan, step: u32) -> Execution;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AbilityState {
    Idle,
    Telegraphing { remaining: f32 },
    Executing { step: u32, until_next: f32 },
    Sustaining,
}

/// What happened on one advance; the system turns it into side effects.
#[derive(Clone, Debug, PartialEq)]
pub enum BrainEvent {
    Nothing,
    Telegraph { areas: Vec<CueArea>, duration: f32 },
    Execute(Execution),
    /// Back to idle after an ability ended.
    Recovered,
}

#[derive(Component)]
pub struct BossBrain {
    pub archetype: BossArchetype,
    pub state: AbilityState,
    /// Idle time accumulated toward the next ability.
    pub timer: f32,
    pub plan: Option<AbilityPlan>,
    /// Live instances spawned by the current ability.
    pub owned_effects: Vec<Entity>,
    sustains: bool,
    ability: Box<dyn BossAbility>,
}

impl fmt::Debug for BossBrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BossBrain")
            .field("archetype", &self.archetype)
            .field("state", &self.state)
            .field("timer", &self.timer)
            .field("owned_effects", &self.owned_effects)
            .finish_non_exhaustive()
    }
}

impl BossBrain {
    pub fn new(archetype: BossArchetype) -> Self {
        Self::with_ability(archetype, archetype.ability())
    }

    pub fn with_ability(archetype: BossArchetype, ability: Box<dyn BossAbility>) -> Self {
        Self {
            archetype,
            state: AbilityState::Idle,
            timer: 0.0,
            plan: None,
            owned_effects: Vec::new(),
            sustains: false,
            ability,
        }
    }

    pub fn ability(&self) -> &dyn BossAbility {
        self.ability.as_ref()
    }

    /// Contact attacks are only issued while no ability is in flight.
    #[inline]
    pub fn allows_basic_attack(&self) -> bool {
        self.state == AbilityState::Idle
    }

    /// Step the machine by `dt`. `alive` reports whether an owned instance is
    /// still live.
    pub fn advance(
        &mut self,
        boss: &BossView,
        dt: f32,
        rng: &mut SimRng,
        alive: impl Fn(Entity) -> bool,
    ) -> BrainEvent {
        match self.state {
            AbilityState::Idle => {
                if boss.stunned {
                    return BrainEvent::Nothing;
                }
                let cooldown = self.ability.cooldown();
                self.timer = (self.timer + dt).min(cooldown);
                if self.timer < cooldown || boss.target.is_none() {
                    return BrainEvent::Nothing;
                }
                let plan = self.ability.plan(boss, rng);
                let duration = self.ability.telegraph();
                let areas = plan.areas.clone();
                self.plan = Some(plan);
                self.sustains = false;
                self.state = AbilityState::Telegraphing { remaining: duration };
                BrainEvent::Telegraph { areas, duration }
            }
            AbilityState::Telegraphing { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.state = AbilityState::Telegraphing { remaining };
                    return BrainEvent::Nothing;
                }
                self.run_step(boss, 0)
            }
            AbilityState::Executing { step, until_next } => {
                let until_next = until_next - dt;
                if until_next > 0.0 {
                    self.state = AbilityState::Executing { step, until_next };
                    return BrainEvent::Nothing;
                }
                self.run_step(boss, step)
            }
            AbilityState::Sustaining => {
                self.owned_effects.retain(|e| alive(*e));
                if self.owned_effects.is_empty() {
                    self.recover();
                    BrainEvent::Recovered
                } else {
                    BrainEvent::Nothing
                }
            }
        }
    }

    fn run_step(&mut self, boss: &BossView, step: u32) -> BrainEvent {
        let Some(plan) = self.plan.as_ref() else {
            self.recover();
            return BrainEvent::Recovered;
        };
        let execution = self.ability.execute(boss, plan, step);
        self.sustains |= !execution.sustained.is_empty();

        let next = step + 1;
        self.state = if next < self.ability.steps() {
            AbilityState::Executing {
                step: next,
                until_next: self.ability.step_interval(),
            }
        } else if self.sustains {
            AbilityState::Sustaining
        } else {
            self.recover();
            AbilityState::Idle
        };
        BrainEvent::Execute(execution)
    }

    fn recover(&mut self) {
        self.state = AbilityState::Idle;
        self.timer = 0.0;
        self.plan = None;
        self.sustains = false;
    }

    /// Record a sustained instance the system managed to spawn.
    pub fn adopt(&mut self, effect: Entity) {
        self.owned_effects.push(effect);
    }

    /// Hand back everything this boss owns (death cleanup).
    pub fn release_effects(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.owned_effects)
    }
}
