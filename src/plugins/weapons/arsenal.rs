//! Owned weapons and the modifiers the owner contributes.

use bevy::prelude::*;
use strum::IntoEnumIterator;
use thiserror::Error;

use super::table::{WeaponKind, WeaponStats, MAX_LEVEL};

pub const MAX_SLOTS: usize = 6;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ArsenalError {
    #[error("all weapon slots are taken")]
    Full,

    #[error("{0:?} is already owned")]
    AlreadyOwned(WeaponKind),

    #[error("{0:?} is not owned")]
    NotOwned(WeaponKind),

    #[error("{0:?} is already at max level")]
    MaxLevel(WeaponKind),
}

/// Read-only modifier snapshot applied to every fired instance.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct OwnerStats {
    pub damage_multiplier: f32,
    pub area_multiplier: f32,
    pub duration_multiplier: f32,
    pub projectile_speed_multiplier: f32,
    pub projectile_count_bonus: u32,
    pub pierce_bonus: i32,
    pub cooldown_multiplier: f32,
}

impl Default for OwnerStats {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
            area_multiplier: 1.0,
            duration_multiplier: 1.0,
            projectile_speed_multiplier: 1.0,
            projectile_count_bonus: 0,
            pierce_bonus: 0,
            cooldown_multiplier: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub level: u8,
    /// Derived from `kind` and `level`; recomputed on level change.
    pub stats: WeaponStats,
    pub cooldown_timer: f32,
}

impl Weapon {
    pub fn new(kind: WeaponKind) -> Self {
        Self {
            kind,
            level: 1,
            stats: kind.stats_at(1),
            cooldown_timer: 0.0,
        }
    }

    pub fn level_up(&mut self) -> Result<u8, ArsenalError> {
        if self.level >= MAX_LEVEL {
            return Err(ArsenalError::MaxLevel(self.kind));
        }
        self.level += 1;
        self.stats = self.kind.stats_at(self.level);
        Ok(self.level)
    }
}

/// The player's weapon slots.
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct Arsenal {
    weapons: Vec<Weapon>,
}

impl Arsenal {
    pub fn with(kinds: impl IntoIterator<Item = WeaponKind>) -> Result<Self, ArsenalError> {
        let mut arsenal = Self::default();
        for kind in kinds {
            arsenal.add(kind)?;
        }
        Ok(arsenal)
    }

    pub fn add(&mut self, kind: WeaponKind) -> Result<(), ArsenalError> {
        if self.get(kind).is_some() {
            return Err(ArsenalError::AlreadyOwned(kind));
        }
        if self.weapons.len() >= MAX_SLOTS {
            return Err(ArsenalError::Full);
        }
        self.weapons.push(Weapon::new(kind));
        Ok(())
    }

    pub fn level_up(&mut self, kind: WeaponKind) -> Result<u8, ArsenalError> {
        self.weapons
            .iter_mut()
            .find(|w| w.kind == kind)
            .ok_or(ArsenalError::NotOwned(kind))?
            .level_up()
    }

    /// Add `kind` at level 1, or level it up if already owned.
    pub fn grant(&mut self, kind: WeaponKind) -> Result<u8, ArsenalError> {
        if self.get(kind).is_some() {
            self.level_up(kind)
        } else {
            self.add(kind).map(|()| 1)
        }
    }

    /// Kinds a level-up could grant right now, in table order.
    pub fn upgrade_options(&self) -> Vec<WeaponKind> {
        WeaponKind::iter()
            .filter(|&kind| match self.get(kind) {
                Some(w) => w.level < MAX_LEVEL,
                None => self.weapons.len() < MAX_SLOTS,
            })
            .collect()
    }

    pub fn get(&self, kind: WeaponKind) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.kind == kind)
    }

    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    pub fn weapons_mut(&mut self) -> &mut [Weapon] {
        &mut self.weapons
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }
}
