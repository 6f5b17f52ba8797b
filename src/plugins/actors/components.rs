//! Actor data: the `Combatant` component and the small value types it carries.

use bevy::prelude::*;

use crate::plugins::status::StatusEffects;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Team {
    Allies,
    Hostiles,
}

impl Team {
    #[inline]
    pub fn opponent(self) -> Team {
        match self {
            Team::Allies => Team::Hostiles,
            Team::Hostiles => Team::Allies,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorClass {
    Player,
    Enemy,
    Boss,
    Spirit,
}

/// Mutable stat bag. `speed` is the *current* speed; status effects rewrite it
/// and restore it from their snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stats {
    pub speed: f32,
    pub damage: f32,
    pub armor: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MovementBehavior {
    /// Velocity comes from player input.
    Controlled,
    /// Walk straight at the nearest opponent.
    Chase,
    /// Hold roughly `preferred_range` away from the nearest opponent.
    Kite { preferred_range: f32 },
    Stationary,
}

/// Replaces the actor's movement update while present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementOverride {
    /// Held in place by a trap instance.
    Trapped { by: Entity },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Movement {
    pub behavior: MovementBehavior,
    pub overriding: Option<MovementOverride>,
    pub last_direction: Vec2,
}

impl Movement {
    pub fn new(behavior: MovementBehavior) -> Self {
        Self {
            behavior,
            overriding: None,
            last_direction: Vec2::ZERO,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Resistances {
    pub slow_immune: bool,
    /// In `[0, 1]`; pulls an incoming slow factor towards 1.0.
    pub slow_resistance: f32,
}

/// Everything the combat engine needs to know about an actor.
///
/// Position lives in the entity's `Transform`.
#[derive(Component, Clone, Debug)]
pub struct Combatant {
    pub class: ActorClass,
    pub team: Team,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub stats: Stats,
    pub status: StatusEffects,
    pub movement: Movement,
    pub resist: Resistances,
    /// Fraction of max health at or below which a player hit forces death.
    pub detonator: Option<f32>,
    pub active: bool,
    /// Dead (or expired) and waiting for the sweep. Excluded from everything.
    pub garbage: bool,
}

impl Combatant {
    pub fn new(
        class: ActorClass,
        team: Team,
        radius: f32,
        max_health: f32,
        stats: Stats,
        behavior: MovementBehavior,
    ) -> Self {
        Self {
            class,
            team,
            radius,
            health: max_health,
            max_health,
            stats,
            status: StatusEffects::default(),
            movement: Movement::new(behavior),
            resist: Resistances::default(),
            detonator: None,
            active: true,
            garbage: false,
        }
    }

    pub fn player(max_health: f32, speed: f32) -> Self {
        Self::new(
            ActorClass::Player,
            Team::Allies,
            13.0,
            max_health,
            Stats {
                speed,
                damage: 0.0,
                armor: 0.0,
            },
            MovementBehavior::Controlled,
        )
    }

    pub fn enemy(max_health: f32, radius: f32, speed: f32) -> Self {
        Self::new(
            ActorClass::Enemy,
            Team::Hostiles,
            radius,
            max_health,
            Stats {
                speed,
                damage: 0.0,
                armor: 0.0,
            },
            MovementBehavior::Chase,
        )
    }

    pub fn boss(max_health: f32, radius: f32, speed: f32) -> Self {
        Self {
            class: ActorClass::Boss,
            ..Self::enemy(max_health, radius, speed)
        }
    }

    pub fn spirit(max_health: f32, speed: f32, damage: f32) -> Self {
        Self::new(
            ActorClass::Spirit,
            Team::Allies,
            9.0,
            max_health,
            Stats {
                speed,
                damage,
                armor: 0.0,
            },
            MovementBehavior::Chase,
        )
    }

    pub fn with_armor(mut self, armor: f32) -> Self {
        self.stats.armor = armor.max(0.0);
        self
    }

    pub fn with_damage(mut self, damage: f32) -> Self {
        self.stats.damage = damage;
        self
    }

    pub fn with_behavior(mut self, behavior: MovementBehavior) -> Self {
        self.movement.behavior = behavior;
        self
    }

    pub fn with_detonator(mut self, threshold: f32) -> Self {
        self.detonator = Some(threshold.clamp(0.0, 1.0));
        self
    }

    pub fn with_resistances(mut self, resist: Resistances) -> Self {
        self.resist = Resistances {
            slow_resistance: resist.slow_resistance.clamp(0.0, 1.0),
            ..resist
        };
        self
    }

    #[inline]
    pub fn is_targetable(&self) -> bool {
        self.active && !self.garbage
    }

    #[inline]
    pub fn is_boss(&self) -> bool {
        self.class == ActorClass::Boss
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        self.class == ActorClass::Player
    }

    #[inline]
    pub fn is_stunned(&self) -> bool {
        self.status.stun.is_some()
    }

    #[inline]
    pub fn is_trapped(&self) -> bool {
        matches!(self.movement.overriding, Some(MovementOverride::Trapped { .. }))
    }

    /// May issue attacks this tick.
    #[inline]
    pub fn can_act(&self) -> bool {
        self.is_targetable() && !self.is_stunned()
    }

    /// May translate this tick.
    #[inline]
    pub fn can_move(&self) -> bool {
        self.can_act() && self.status.freeze.is_none() && self.movement.overriding.is_none()
    }
}

/// Periodic touch damage against opponents within reach.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct ContactAttack {
    pub damage: f32,
    pub interval: f32,
    pub cooldown: f32,
}

impl ContactAttack {
    pub fn new(damage: f32, interval: f32) -> Self {
        Self {
            damage,
            interval,
            cooldown: 0.0,
        }
    }
}

/// Actor that expires on its own after `remaining` seconds (no death hooks).
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Ephemeral {
    pub remaining: f32,
}

/// Experience dropped on death.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Bounty {
    pub experience: u32,
}

/// Special behavior when the actor dies.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub enum DeathBehavior {
    /// Spawn `count` children at `health_fraction` of this actor's max health.
    Split { count: u32, health_fraction: f32 },
    /// Leave an explosion hazard behind, scaled from its template.
    Explode { area: f32, might: f32 },
}
