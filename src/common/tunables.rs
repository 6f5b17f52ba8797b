//! Tunable gameplay constants.
//!
//! Per-variant numbers (weapon curves, enemy archetypes, boss abilities) live
//! in their plugins' data tables. This resource holds the engine-wide knobs.

use bevy::prelude::*;

use super::error::{ensure_positive, ensure_unit, ConfigError};

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    pub player_speed: f32,
    pub player_health: f32,
    pub pickup_radius: f32,
    /// Hard ceiling on any instance's age, independent of its own duration.
    pub max_instance_lifetime: f32,
    /// How far past the play area an instance may travel before it is dropped.
    pub out_of_bounds_margin: f32,
    /// Burn/poison magnitude multiplier applied to boss-class actors.
    pub boss_dot_multiplier: f32,
    pub index_cell_size: f32,
    pub spawn_ring_radius: f32,
    pub hostile_cap: usize,
    pub seed: u64,
    pub budget: InstanceBudget,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 20.0,
            player_speed: 260.0,
            player_health: 120.0,
            pickup_radius: 48.0,
            max_instance_lifetime: 12.0,
            out_of_bounds_margin: 96.0,
            boss_dot_multiplier: 0.5,
            index_cell_size: 96.0,
            spawn_ring_radius: 560.0,
            hostile_cap: 220,
            seed: 0x5EED,
            budget: InstanceBudget::default(),
        }
    }
}

impl Tunables {
    /// Validate once at startup. Any error here aborts initialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("pixels_per_meter", self.pixels_per_meter)?;
        ensure_positive("player_speed", self.player_speed)?;
        ensure_positive("player_health", self.player_health)?;
        ensure_positive("pickup_radius", self.pickup_radius)?;
        ensure_positive("max_instance_lifetime", self.max_instance_lifetime)?;
        ensure_positive("index_cell_size", self.index_cell_size)?;
        ensure_positive("spawn_ring_radius", self.spawn_ring_radius)?;
        ensure_unit("boss_dot_multiplier", self.boss_dot_multiplier)?;
        if self.out_of_bounds_margin < 0.0 {
            return Err(ConfigError::NotPositive {
                name: "out_of_bounds_margin",
                value: self.out_of_bounds_margin,
            });
        }
        self.budget.validate()
    }
}

/// Global caps on concurrently live instances, per kind.
///
/// Exceeding a cap silently rejects the spawn; this bounds worst-case tick cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceBudget {
    pub projectiles: usize,
    pub lines: usize,
    pub hazards: usize,
    pub boss_effects: usize,
}

impl Default for InstanceBudget {
    fn default() -> Self {
        Self {
            projectiles: 768,
            lines: 64,
            hazards: 160,
            boss_effects: 48,
        }
    }
}

impl InstanceBudget {
    fn validate(&self) -> Result<(), ConfigError> {
        let rows = [
            ("projectiles", self.projectiles),
            ("lines", self.lines),
            ("hazards", self.hazards),
            ("boss effects", self.boss_effects),
        ];
        match rows.into_iter().find(|(_, cap)| *cap == 0) {
            Some((kind, _)) => Err(ConfigError::EmptyBudget { kind }),
            None => Ok(()),
        }
    }
}
