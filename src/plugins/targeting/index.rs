//! Spatial query provider: a uniform-grid spatial hash over live actors.
//!
//! Rebuilt once per tick after locomotion. Each actor lands in exactly one cell;
//! queries scan the covering cells and return candidates in **enumeration
//! order** (the order actors were inserted), so downstream stable sorts break
//! distance ties deterministically.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::actors::{ActorClass, Combatant, Team};

use super::TargetCandidate;

/// Wider queries scan every actor instead of the covering cells.
const MAX_CELL_SPAN: f32 = 32.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexedActor {
    pub entity: Entity,
    pub position: Vec2,
    pub radius: f32,
    pub team: Team,
    pub class: ActorClass,
}

#[derive(Resource, Debug)]
pub struct ActorIndex {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
    actors: Vec<IndexedActor>,
    max_radius: f32,
}

impl Default for ActorIndex {
    fn default() -> Self {
        Self::new(Tunables::default().index_cell_size)
    }
}

impl ActorIndex {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(1.0),
            cells: HashMap::default(),
            actors: Vec::new(),
            max_radius: 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.actors.clear();
        self.max_radius = 0.0;
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    #[inline]
    fn cell_key(&self, p: Vec2) -> (i32, i32) {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, actor: IndexedActor) {
        let seq = self.actors.len();
        let key = self.cell_key(actor.position);
        self.max_radius = self.max_radius.max(actor.radius);
        self.actors.push(actor);
        self.cells.entry(key).or_default().push(seq);
    }

    pub fn get(&self, entity: Entity) -> Option<&IndexedActor> {
        self.actors.iter().find(|a| a.entity == entity)
    }

    /// Actors of `team` whose body may touch the circle `(center, radius)`.
    ///
    /// This is a broad phase: the caller still runs the exact shape test.
    pub fn query(&self, center: Vec2, radius: f32, team: Team) -> Vec<TargetCandidate> {
        let reach = radius.max(0.0) + self.max_radius;
        let span = (reach / self.cell_size).ceil();

        let mut seqs: Vec<usize> = if span.is_finite() && span <= MAX_CELL_SPAN {
            let r = span as i32;
            let (cx, cy) = self.cell_key(center);
            let mut seqs = Vec::new();
            for ix in (cx - r)..=(cx + r) {
                for iy in (cy - r)..=(cy + r) {
                    if let Some(ids) = self.cells.get(&(ix, iy)) {
                        seqs.extend_from_slice(ids);
                    }
                }
            }
            seqs
        } else {
            (0..self.actors.len()).collect()
        };
        seqs.sort_unstable();

        seqs.into_iter()
            .map(|seq| &self.actors[seq])
            .filter(|a| a.team == team)
            .filter(|a| {
                let limit = radius.max(0.0) + a.radius;
                super::distance_squared(center, a.position) <= limit * limit
            })
            .map(|a| TargetCandidate::new(a.entity, a.position, a.radius))
            .collect()
    }

    /// Every indexed actor of `team`, in enumeration order.
    pub fn all(&self, team: Team) -> impl Iterator<Item = TargetCandidate> + '_ {
        self.actors
            .iter()
            .filter(move |a| a.team == team)
            .map(|a| TargetCandidate::new(a.entity, a.position, a.radius))
    }

    /// The first indexed player, if any.
    pub fn player(&self) -> Option<&IndexedActor> {
        self.actors.iter().find(|a| a.class == ActorClass::Player)
    }
}

/// Rebuild the index from every targetable actor.
pub fn rebuild_actor_index(
    tunables: Res<Tunables>,
    mut index: ResMut<ActorIndex>,
    q: Query<(Entity, &Combatant, &Transform)>,
) {
    if index.cell_size != tunables.index_cell_size.max(1.0) {
        *index = ActorIndex::new(tunables.index_cell_size);
    } else {
        index.clear();
    }

    for (entity, actor, tf) in &q {
        if !actor.is_targetable() {
            continue;
        }
        index.insert(IndexedActor {
            entity,
            position: tf.translation.truncate(),
            radius: actor.radius,
            team: actor.team,
            class: actor.class,
        });
    }
}
