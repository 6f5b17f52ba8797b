//! Optional registry of ground-hazard templates.
//!
//! The resource may be absent (tests, stripped builds); every lookup then
//! misses and the spawn is skipped.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use strum::{EnumIter, IntoEnumIterator};

use super::components::{AreaHazard, Body, HitSpec, InstanceSpec};
use crate::common::error::TableError;
use crate::plugins::actors::Team;
use crate::plugins::damage::{DamageCategory, DamageSource};
use crate::plugins::fx::CueTint;
use crate::plugins::status::StatusApplication;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum HazardId {
    PoisonPool,
    Explosion,
}

impl HazardId {
    pub fn name(self) -> &'static str {
        match self {
            HazardId::PoisonPool => "poison pool",
            HazardId::Explosion => "explosion",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HazardTemplate {
    pub radius: f32,
    pub interval: f32,
    pub lifetime: f32,
    pub hit: HitSpec,
    pub tint: CueTint,
}

impl HazardTemplate {
    fn validate(&self, row: &'static str) -> Result<(), TableError> {
        let fields = [
            ("radius", self.radius),
            ("interval", self.interval),
            ("lifetime", self.lifetime),
        ];
        for (field, value) in fields {
            if value.is_nan() || value <= 0.0 {
                return Err(TableError::InvalidField {
                    table: "hazards",
                    row,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

#[derive(Resource, Debug, Clone)]
pub struct HazardCatalog {
    templates: HashMap<HazardId, HazardTemplate>,
}

impl Default for HazardCatalog {
    fn default() -> Self {
        let mut templates = HashMap::default();
        templates.insert(
            HazardId::PoisonPool,
            HazardTemplate {
                radius: 64.0,
                interval: 0.6,
                lifetime: 4.0,
                hit: HitSpec {
                    damage: 2.0,
                    category: DamageCategory::Aura,
                    status: Some(StatusApplication::Poison {
                        damage: 1.5,
                        duration: 3.0,
                        interval: 0.5,
                    }),
                },
                tint: CueTint::Poison,
            },
        );
        templates.insert(
            HazardId::Explosion,
            HazardTemplate {
                radius: 72.0,
                interval: 10.0,
                lifetime: 0.25,
                hit: HitSpec::normal(14.0),
                tint: CueTint::Fire,
            },
        );
        Self { templates }
    }
}

impl HazardCatalog {
    pub fn empty() -> Self {
        Self {
            templates: HashMap::default(),
        }
    }

    pub fn get(&self, id: HazardId) -> Option<&HazardTemplate> {
        self.templates.get(&id)
    }

    pub fn insert(&mut self, id: HazardId, template: HazardTemplate) {
        self.templates.insert(id, template);
    }

    pub fn remove(&mut self, id: HazardId) -> Option<HazardTemplate> {
        self.templates.remove(&id)
    }

    /// Templates are optional, but the ones present must be usable.
    pub fn validate(&self) -> Result<(), TableError> {
        for id in HazardId::iter() {
            if let Some(t) = self.templates.get(&id) {
                t.validate(id.name())?;
            }
        }
        Ok(())
    }

    /// Build a spawnable spec, or `None` if the template is missing.
    pub fn instantiate(
        &self,
        id: HazardId,
        team: Team,
        source: DamageSource,
        position: Vec2,
        area: f32,
        might: f32,
    ) -> Option<InstanceSpec> {
        let t = self.get(id)?;
        let hit = HitSpec {
            damage: t.hit.damage * might,
            ..t.hit
        };
        let area = AreaHazard::new(t.radius * area.max(0.0), t.interval, t.tint);
        Some(InstanceSpec::new(
            team,
            source,
            position,
            hit,
            t.lifetime,
            Body::Hazard(area),
        ))
    }
}
