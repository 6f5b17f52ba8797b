//! Mitigation, health mutation and death detection.
//!
//! Every damage source in the game funnels through [`strike`]: weapons,
//! contact attacks, DOT ticks, boss pulses. It performs the targetability
//! check, damages, emits the damage-number cue, reports a death exactly once,
//! and only then applies the hit's status payload to a survivor.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::plugins::actors::{ActorClass, Combatant, Team};
use crate::plugins::fx::VisualCue;
use crate::plugins::projectiles::{InstanceSpec, SpawnInstanceRequest};
use crate::plugins::status::{ApplyOutcome, CombatRules, StatusApplication};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DamageCategory {
    Normal,
    Burn,
    Aura,
    Poison,
}

impl DamageCategory {
    /// Armor applies to `Normal` only, and never drops a hit below 1.
    #[inline]
    pub fn mitigate(self, raw: f32, armor: f32) -> f32 {
        match self {
            DamageCategory::Normal => (raw - armor).max(1.0),
            DamageCategory::Burn | DamageCategory::Aura | DamageCategory::Poison => raw,
        }
    }

    /// Text for the floating damage number.
    pub fn display(self, actual: f32) -> String {
        match self {
            DamageCategory::Normal => format!("{}", actual.round() as i64),
            _ => format!("{actual:.1}"),
        }
    }
}

/// Who dealt the damage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageSource {
    pub entity: Option<Entity>,
    /// Kill credit and detonator forcing only apply to player-originated damage.
    pub from_player: bool,
}

impl DamageSource {
    pub const NONE: DamageSource = DamageSource {
        entity: None,
        from_player: false,
    };

    pub fn player(entity: Option<Entity>) -> Self {
        Self {
            entity,
            from_player: true,
        }
    }

    pub fn hostile(entity: Option<Entity>) -> Self {
        Self {
            entity,
            from_player: false,
        }
    }

    /// Same origin, different carrier entity (e.g. the trap instance itself).
    pub fn via(self, entity: Entity) -> Self {
        Self {
            entity: Some(entity),
            ..self
        }
    }
}

/// One hit as the engine sees it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub damage: f32,
    pub category: DamageCategory,
    pub source: DamageSource,
    pub status: Option<StatusApplication>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DamageOutcome {
    pub actual: f32,
    pub died: bool,
    pub released_trap: Option<Entity>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrikeOutcome {
    pub damage: DamageOutcome,
    pub status: Option<ApplyOutcome>,
}

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct ActorDied {
    pub entity: Entity,
    pub class: ActorClass,
    pub team: Team,
    pub position: Vec2,
    pub killer: DamageSource,
}

impl Combatant {
    /// Apply one damage event. Death is evaluated after every call.
    pub fn take_damage(&mut self, raw: f32, category: DamageCategory, from_player: bool) -> DamageOutcome {
        if !self.is_targetable() {
            return DamageOutcome::default();
        }

        let actual = category.mitigate(raw, self.stats.armor);
        self.health -= actual;

        // Only direct player hits set a detonator off; ticks and auras do not.
        if let Some(threshold) = self.detonator {
            let direct = from_player && category == DamageCategory::Normal;
            if direct && self.health > 0.0 && self.health <= threshold * self.max_health {
                self.health = 0.0;
            }
        }

        if self.health > 0.0 {
            return DamageOutcome {
                actual,
                died: false,
                released_trap: None,
            };
        }

        let released_trap = self.release_trap();
        self.clear_status();
        self.garbage = true;
        DamageOutcome {
            actual,
            died: true,
            released_trap,
        }
    }
}

/// Side effects collected while resolving hits, flushed to messages at the end
/// of the system that produced them.
#[derive(Debug, Default)]
pub struct CombatLog {
    pub rules: CombatRules,
    pub deaths: Vec<ActorDied>,
    pub cues: Vec<VisualCue>,
    pub spawns: Vec<InstanceSpec>,
}

impl CombatLog {
    pub fn new(rules: CombatRules) -> Self {
        Self {
            rules,
            ..default()
        }
    }
}

/// Damage `target`, report a death once, then apply the hit's status.
///
/// Returns `None` when the target is no longer targetable.
pub fn strike(
    target: Entity,
    actor: &mut Combatant,
    position: Vec2,
    hit: &Hit,
    log: &mut CombatLog,
) -> Option<StrikeOutcome> {
    if !actor.is_targetable() {
        return None;
    }

    let damage = actor.take_damage(hit.damage, hit.category, hit.source.from_player);
    log.cues.push(VisualCue::DamageNumber {
        position,
        text: hit.category.display(damage.actual),
    });

    if damage.died {
        log.deaths.push(ActorDied {
            entity: target,
            class: actor.class,
            team: actor.team,
            position,
            killer: hit.source,
        });
        return Some(StrikeOutcome {
            damage,
            status: None,
        });
    }

    let status = hit
        .status
        .map(|application| actor.apply_status(application, hit.source, log.rules));
    Some(StrikeOutcome { damage, status })
}

/// Message writers a combat system flushes its [`CombatLog`] into.
#[derive(SystemParam)]
pub struct CombatOutput<'w> {
    died: MessageWriter<'w, ActorDied>,
    cues: MessageWriter<'w, VisualCue>,
    spawns: MessageWriter<'w, SpawnInstanceRequest>,
}

impl CombatOutput<'_> {
    pub fn flush(&mut self, log: CombatLog) {
        for death in log.deaths {
            self.died.write(death);
        }
        for cue in log.cues {
            self.cues.write(cue);
        }
        for spec in log.spawns {
            self.spawns.write(SpawnInstanceRequest(spec));
        }
    }
}
