//! Live-instance census against the per-kind caps in [`InstanceBudget`].

use bevy::prelude::*;

use super::components::InstanceKind;
use crate::common::tunables::InstanceBudget;

#[inline]
pub fn cap(budget: &InstanceBudget, kind: InstanceKind) -> usize {
    match kind {
        InstanceKind::Projectile => budget.projectiles,
        InstanceKind::Line => budget.lines,
        InstanceKind::Hazard => budget.hazards,
        InstanceKind::BossEffect => budget.boss_effects,
    }
}

/// Count of live (spawned, not yet swept) instances per kind.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InstanceCensus {
    counts: [usize; 4],
}

impl InstanceCensus {
    #[inline]
    fn slot(kind: InstanceKind) -> usize {
        match kind {
            InstanceKind::Projectile => 0,
            InstanceKind::Line => 1,
            InstanceKind::Hazard => 2,
            InstanceKind::BossEffect => 3,
        }
    }

    pub fn live(&self, kind: InstanceKind) -> usize {
        self.counts[Self::slot(kind)]
    }

    pub fn has_room(&self, budget: &InstanceBudget, kind: InstanceKind) -> bool {
        self.live(kind) < cap(budget, kind)
    }

    pub fn record_spawn(&mut self, kind: InstanceKind) {
        self.counts[Self::slot(kind)] += 1;
    }

    pub fn record_despawn(&mut self, kind: InstanceKind) {
        let n = &mut self.counts[Self::slot(kind)];
        *n = n.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub fn reset_census(mut census: ResMut<InstanceCensus>) {
    census.reset();
}
