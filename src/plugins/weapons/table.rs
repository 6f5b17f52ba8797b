//! Weapon data table: capability profile plus a stat curve per kind.
//!
//! Weapons differ in *parameters*, not control flow. A row says how the weapon
//! aims ([`Targeting`]), how shots fan out ([`Spread`]), what each shot is
//! ([`Payload`]), and how its numbers grow with level.

use strum::{EnumIter, IntoEnumIterator};

use crate::common::error::TableError;
use crate::plugins::damage::DamageCategory;
use crate::plugins::fx::CueTint;
use crate::plugins::projectiles::HazardId;
use crate::plugins::status::StatusApplication;

pub const MAX_LEVEL: u8 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum WeaponKind {
    MagicWand,
    Whip,
    ChainLightning,
    BubbleWand,
    Firebomb,
    RicochetDisc,
    GarlicAura,
    FrostNova,
    PoisonFlask,
    SunBeam,
    SpiritCall,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Targeting {
    /// Towards the nearest hostile in range, else the fallback heading.
    Nearest,
    /// Along the owner's aim or last movement direction.
    Facing,
    /// Centered on the owner.
    Around,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Spread {
    Single,
    /// `count` headings evenly across `arc` radians around the aim.
    Fan { arc: f32 },
    /// `count` headings evenly around the full circle, starting at the aim.
    Radial,
    /// One shot per nearest target, closest first.
    PerTarget,
}

/// On-hit continuation of a bolt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoltKind {
    Pierce,
    Chain { range: f32 },
    Bounce { jitter: f32 },
    Trap,
    Split { spread: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Payload {
    Bolt(BoltKind),
    /// Owner-anchored sweep segment.
    Line { half_width: f32 },
    /// Ground hazard dropped at the aim point.
    Lob(HazardId),
    /// Owner-anchored pulsing hazard.
    Aura,
    /// Single pulse around the owner.
    Nova,
    /// Transient allied spirits.
    Summon,
}

/// Final numbers for one level, before owner modifiers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponStats {
    pub damage: f32,
    pub cooldown: f32,
    pub speed: f32,
    pub count: u32,
    /// Radius, or length for lines.
    pub area: f32,
    /// Instance lifetime.
    pub duration: f32,
    pub pierce: i32,
    /// Chain hops, bounces or split shards.
    pub hops: u32,
    /// Payload seconds: aura pulse interval, trap hold.
    pub effect: f32,
    /// Targeting range.
    pub range: f32,
}

/// Per-level growth. `*_every == 0` means the stat never grows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Growth {
    pub damage: f32,
    pub cooldown: f32,
    pub area: f32,
    pub count_every: u8,
    pub pierce_every: u8,
    pub hops_every: u8,
}

const STANDARD: Growth = Growth {
    damage: 0.12,
    cooldown: 0.04,
    area: 0.05,
    count_every: 0,
    pierce_every: 0,
    hops_every: 0,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponProfile {
    pub targeting: Targeting,
    pub spread: Spread,
    pub payload: Payload,
    pub category: DamageCategory,
    pub status: Option<StatusApplication>,
    pub tint: CueTint,
}

pub struct WeaponRow {
    pub name: &'static str,
    pub profile: WeaponProfile,
    pub base: WeaponStats,
    pub growth: Growth,
}

const fn stats(damage: f32, cooldown: f32, speed: f32, count: u32, area: f32, duration: f32) -> WeaponStats {
    WeaponStats {
        damage,
        cooldown,
        speed,
        count,
        area,
        duration,
        pierce: 0,
        hops: 0,
        effect: 0.0,
        range: 420.0,
    }
}

const fn profile(targeting: Targeting, spread: Spread, payload: Payload, tint: CueTint) -> WeaponProfile {
    WeaponProfile {
        targeting,
        spread,
        payload,
        category: DamageCategory::Normal,
        status: None,
        tint,
    }
}

impl WeaponKind {
    pub fn row(self) -> WeaponRow {
        use Payload::*;
        use Spread::*;
        use Targeting::*;

        match self {
            WeaponKind::MagicWand => WeaponRow {
                name: "Magic Wand",
                profile: profile(Nearest, PerTarget, Bolt(BoltKind::Pierce), CueTint::Neutral),
                base: stats(10.0, 1.0, 420.0, 1, 6.0, 2.0),
                growth: Growth {
                    count_every: 3,
                    pierce_every: 4,
                    ..STANDARD
                },
            },
            WeaponKind::Whip => WeaponRow {
                name: "Whip",
                profile: profile(Facing, Single, Line { half_width: 14.0 }, CueTint::Neutral),
                base: stats(12.0, 1.3, 0.0, 1, 110.0, 0.2),
                growth: STANDARD,
            },
            WeaponKind::ChainLightning => WeaponRow {
                name: "Chain Lightning",
                profile: profile(
                    Nearest,
                    PerTarget,
                    Bolt(BoltKind::Chain { range: 160.0 }),
                    CueTint::Lightning,
                ),
                base: WeaponStats {
                    hops: 2,
                    ..stats(14.0, 1.6, 900.0, 1, 8.0, 1.0)
                },
                growth: Growth {
                    hops_every: 3,
                    ..STANDARD
                },
            },
            WeaponKind::BubbleWand => WeaponRow {
                name: "Bubble Wand",
                profile: profile(Nearest, Single, Bolt(BoltKind::Trap), CueTint::Frost),
                base: WeaponStats {
                    effect: 2.0,
                    ..stats(4.0, 2.2, 260.0, 1, 12.0, 3.0)
                },
                growth: STANDARD,
            },
            WeaponKind::Firebomb => WeaponRow {
                name: "Firebomb",
                profile: WeaponProfile {
                    status: Some(StatusApplication::Burn {
                        damage: 2.0,
                        duration: 2.0,
                        interval: 0.5,
                    }),
                    ..profile(
                        Nearest,
                        Single,
                        Bolt(BoltKind::Split { spread: 0.3 }),
                        CueTint::Fire,
                    )
                },
                base: WeaponStats {
                    hops: 5,
                    ..stats(8.0, 2.0, 300.0, 1, 10.0, 0.7)
                },
                growth: Growth {
                    hops_every: 3,
                    ..STANDARD
                },
            },
            WeaponKind::RicochetDisc => WeaponRow {
                name: "Ricochet Disc",
                profile: profile(
                    Facing,
                    Single,
                    Bolt(BoltKind::Bounce { jitter: 0.35 }),
                    CueTint::Neutral,
                ),
                base: WeaponStats {
                    hops: 3,
                    ..stats(9.0, 1.4, 380.0, 1, 10.0, 3.0)
                },
                growth: Growth {
                    hops_every: 4,
                    count_every: 5,
                    ..STANDARD
                },
            },
            WeaponKind::GarlicAura => WeaponRow {
                name: "Garlic Aura",
                profile: WeaponProfile {
                    category: DamageCategory::Aura,
                    ..profile(Around, Single, Aura, CueTint::Holy)
                },
                base: WeaponStats {
                    effect: 0.4,
                    ..stats(3.0, 2.0, 0.0, 1, 70.0, 2.0)
                },
                growth: STANDARD,
            },
            WeaponKind::FrostNova => WeaponRow {
                name: "Frost Nova",
                profile: WeaponProfile {
                    status: Some(StatusApplication::Freeze { duration: 1.2 }),
                    ..profile(Around, Single, Nova, CueTint::Frost)
                },
                base: stats(5.0, 4.0, 0.0, 1, 120.0, 0.2),
                growth: STANDARD,
            },
            WeaponKind::PoisonFlask => WeaponRow {
                name: "Poison Flask",
                profile: profile(Nearest, PerTarget, Lob(HazardId::PoisonPool), CueTint::Poison),
                base: stats(1.0, 2.5, 0.0, 1, 1.0, 0.0),
                growth: Growth {
                    count_every: 4,
                    ..STANDARD
                },
            },
            WeaponKind::SunBeam => WeaponRow {
                name: "Sun Beam",
                profile: WeaponProfile {
                    status: Some(StatusApplication::Burn {
                        damage: 1.5,
                        duration: 1.5,
                        interval: 0.5,
                    }),
                    ..profile(Nearest, Single, Line { half_width: 10.0 }, CueTint::Holy)
                },
                base: stats(8.0, 3.0, 0.0, 1, 420.0, 0.6),
                growth: STANDARD,
            },
            WeaponKind::SpiritCall => WeaponRow {
                name: "Spirit Call",
                profile: profile(Around, Radial, Summon, CueTint::Holy),
                base: stats(6.0, 8.0, 220.0, 2, 1.0, 6.0),
                growth: Growth {
                    count_every: 3,
                    ..STANDARD
                },
            },
        }
    }

    pub fn name(self) -> &'static str {
        self.row().name
    }

    pub fn profile(self) -> WeaponProfile {
        self.row().profile
    }

    /// Stat curve: base numbers grown to `level` (clamped to `1..=MAX_LEVEL`).
    pub fn stats_at(self, level: u8) -> WeaponStats {
        let row = self.row();
        let steps = level.clamp(1, MAX_LEVEL) - 1;
        let s = f32::from(steps);
        let g = row.growth;
        let every = |n: u8| if n == 0 { 0 } else { u32::from(steps / n) };

        WeaponStats {
            damage: row.base.damage * (1.0 + g.damage * s),
            cooldown: row.base.cooldown * (1.0 - g.cooldown).powf(s),
            area: row.base.area * (1.0 + g.area * s),
            count: row.base.count + every(g.count_every),
            pierce: row.base.pierce + every(g.pierce_every) as i32,
            hops: row.base.hops + every(g.hops_every),
            ..row.base
        }
    }
}

/// Every row must be usable at every level.
pub fn validate() -> Result<(), TableError> {
    if WeaponKind::iter().next().is_none() {
        return Err(TableError::Empty { table: "weapons" });
    }
    for kind in WeaponKind::iter() {
        let row = kind.row();
        let base = row.base;
        let positive = [
            ("damage", base.damage),
            ("cooldown", base.cooldown),
            ("area", base.area),
            ("range", base.range),
        ];
        for (field, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(TableError::InvalidField {
                    table: "weapons",
                    row: row.name,
                    field,
                    value,
                });
            }
        }
        if base.count == 0 {
            return Err(TableError::InvalidField {
                table: "weapons",
                row: row.name,
                field: "count",
                value: 0.0,
            });
        }
        let needs_speed = matches!(row.profile.payload, Payload::Bolt(_) | Payload::Summon);
        if needs_speed && base.speed <= 0.0 {
            return Err(TableError::InvalidField {
                table: "weapons",
                row: row.name,
                field: "speed",
                value: base.speed,
            });
        }
        let needs_effect = matches!(row.profile.payload, Payload::Aura | Payload::Bolt(BoltKind::Trap));
        if needs_effect && base.effect <= 0.0 {
            return Err(TableError::InvalidField {
                table: "weapons",
                row: row.name,
                field: "effect",
                value: base.effect,
            });
        }
    }
    Ok(())
}
