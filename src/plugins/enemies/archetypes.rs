//! Enemy data table.

use bevy::prelude::*;
use strum::{EnumIter, IntoEnumIterator};

use crate::common::error::TableError;
use crate::plugins::actors::{DeathBehavior, MovementBehavior};
use crate::plugins::status::StatusApplication;

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum EnemyKind {
    Grunt,
    Brute,
    Runner,
    Splitter,
    /// Child of a splitter; never splits again.
    Splitling,
    Detonator,
    Spitter,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangedProfile {
    pub damage: f32,
    pub interval: f32,
    pub speed: f32,
    pub range: f32,
    pub radius: f32,
    pub status: Option<StatusApplication>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyRow {
    pub name: &'static str,
    pub health: f32,
    pub radius: f32,
    pub speed: f32,
    pub armor: f32,
    pub contact_damage: f32,
    pub contact_interval: f32,
    pub experience: u32,
    pub behavior: MovementBehavior,
    pub death: Option<DeathBehavior>,
    /// Forced-death threshold as a fraction of max health.
    pub detonator: Option<f32>,
    pub ranged: Option<RangedProfile>,
    pub slow_resistance: f32,
    pub color: Color,
}

const GRUNT: EnemyRow = EnemyRow {
    name: "Grunt",
    health: 12.0,
    radius: 12.0,
    speed: 70.0,
    armor: 0.0,
    contact_damage: 5.0,
    contact_interval: 0.8,
    experience: 1,
    behavior: MovementBehavior::Chase,
    death: None,
    detonator: None,
    ranged: None,
    slow_resistance: 0.0,
    color: Color::srgb(0.85, 0.3, 0.3),
};

impl EnemyKind {
    pub fn row(self) -> EnemyRow {
        match self {
            EnemyKind::Grunt => GRUNT,
            EnemyKind::Brute => EnemyRow {
                name: "Brute",
                health: 60.0,
                radius: 20.0,
                speed: 45.0,
                armor: 3.0,
                contact_damage: 12.0,
                contact_interval: 1.2,
                experience: 5,
                slow_resistance: 0.4,
                color: Color::srgb(0.6, 0.2, 0.2),
                ..GRUNT
            },
            EnemyKind::Runner => EnemyRow {
                name: "Runner",
                health: 8.0,
                radius: 10.0,
                speed: 130.0,
                contact_damage: 4.0,
                experience: 1,
                color: Color::srgb(0.95, 0.55, 0.25),
                ..GRUNT
            },
            EnemyKind::Splitter => EnemyRow {
                name: "Splitter",
                health: 30.0,
                radius: 16.0,
                speed: 60.0,
                experience: 3,
                death: Some(DeathBehavior::Split {
                    count: 3,
                    health_fraction: 0.3,
                }),
                color: Color::srgb(0.4, 0.8, 0.5),
                ..GRUNT
            },
            EnemyKind::Splitling => EnemyRow {
                name: "Splitling",
                health: 9.0,
                radius: 8.0,
                speed: 95.0,
                contact_damage: 3.0,
                experience: 1,
                color: Color::srgb(0.5, 0.9, 0.6),
                ..GRUNT
            },
            EnemyKind::Detonator => EnemyRow {
                name: "Detonator",
                health: 20.0,
                radius: 13.0,
                speed: 85.0,
                contact_damage: 2.0,
                experience: 2,
                death: Some(DeathBehavior::Explode {
                    area: 1.0,
                    might: 1.0,
                }),
                detonator: Some(0.35),
                color: Color::srgb(1.0, 0.8, 0.2),
                ..GRUNT
            },
            EnemyKind::Spitter => EnemyRow {
                name: "Spitter",
                health: 16.0,
                radius: 12.0,
                speed: 55.0,
                contact_damage: 3.0,
                experience: 2,
                behavior: MovementBehavior::Kite {
                    preferred_range: 220.0,
                },
                ranged: Some(RangedProfile {
                    damage: 4.0,
                    interval: 2.0,
                    speed: 180.0,
                    range: 300.0,
                    radius: 6.0,
                    status: Some(StatusApplication::Poison {
                        damage: 1.0,
                        duration: 3.0,
                        interval: 1.0,
                    }),
                }),
                color: Color::srgb(0.55, 0.8, 0.25),
                ..GRUNT
            },
        }
    }
}

pub fn validate() -> Result<(), TableError> {
    if EnemyKind::iter().next().is_none() {
        return Err(TableError::Empty { table: "enemies" });
    }
    for kind in EnemyKind::iter() {
        let row = kind.row();
        let positive = [
            ("health", row.health),
            ("radius", row.radius),
            ("contact_interval", row.contact_interval),
        ];
        for (field, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(TableError::InvalidField {
                    table: "enemies",
                    row: row.name,
                    field,
                    value,
                });
            }
        }
        if !(0.0..=1.0).contains(&row.slow_resistance) {
            return Err(TableError::InvalidField {
                table: "enemies",
                row: row.name,
                field: "slow_resistance",
                value: row.slow_resistance,
            });
        }
        if let Some(r) = row.ranged {
            if r.interval <= 0.0 || r.range <= 0.0 {
                return Err(TableError::InvalidField {
                    table: "enemies",
                    row: row.name,
                    field: "ranged",
                    value: r.interval.min(r.range),
                });
            }
        }
    }
    Ok(())
}
