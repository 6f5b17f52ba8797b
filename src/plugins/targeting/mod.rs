//! Collision & targeting primitives.
//!
//! Everything here is pure math over positions and radii; weapons, enemies,
//! bosses and the instance lifecycle all call into it. Proximity checks compare
//! **squared** distances so the hot paths never take a square root.
//!
//! ```text
//! ActorIndex (rebuilt once per tick)
//!     │ candidates near a point, stable enumeration order
//!     v
//! select_sorted_targets / nearest_target      (who?)
//! circle_hit / segment_hit                    (touching?)
//! fallback_direction                          (where, when nobody is there?)
//! ```

use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::core::SimSet;

pub mod index;

pub use index::{rebuild_actor_index, ActorIndex, IndexedActor};

/// The canonical heading used when neither a target nor a movement direction exists.
pub const CANONICAL_DIRECTION: Vec2 = Vec2::Y;

/// Below this squared length a vector is treated as zero.
const ZERO_EPSILON_SQ: f32 = 1e-8;

pub fn plugin(app: &mut App) {
    let cell = app
        .world()
        .get_resource::<Tunables>()
        .map_or(Tunables::default().index_cell_size, |t| t.index_cell_size);
    app.insert_resource(ActorIndex::new(cell)).add_systems(
        FixedUpdate,
        rebuild_actor_index.in_set(SimSet::Indexing),
    );
}

/// A potential target as seen by a query: where it is and how big it is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetCandidate {
    pub entity: Entity,
    pub position: Vec2,
    pub radius: f32,
    /// Squared distance to the query origin, filled in by the selectors.
    pub distance_sq: f32,
    /// False for inactive or garbage actors; such candidates are never returned.
    pub targetable: bool,
}

impl TargetCandidate {
    pub fn new(entity: Entity, position: Vec2, radius: f32) -> Self {
        Self {
            entity,
            position,
            radius,
            distance_sq: 0.0,
            targetable: true,
        }
    }
}

#[inline]
pub fn distance_squared(a: Vec2, b: Vec2) -> f32 {
    let d = a - b;
    d.x * d.x + d.y * d.y
}

/// Squared distance from `p` to the segment `[s0, s1]`.
///
/// The projection parameter is clamped to `[0, 1]`; a degenerate segment
/// (`s0 == s1`) degrades to point-to-point distance.
pub fn point_to_segment_distance_squared(p: Vec2, s0: Vec2, s1: Vec2) -> f32 {
    let seg = s1 - s0;
    let len_sq = seg.length_squared();
    if len_sq <= ZERO_EPSILON_SQ {
        return distance_squared(p, s0);
    }
    let t = ((p - s0).dot(seg) / len_sq).clamp(0.0, 1.0);
    distance_squared(p, s0 + seg * t)
}

/// Circle-circle overlap.
#[inline]
pub fn circle_hit(center: Vec2, radius: f32, target: Vec2, target_radius: f32) -> bool {
    let reach = radius + target_radius;
    distance_squared(center, target) <= reach * reach
}

/// Capsule test: a segment with half-width against a circle.
#[inline]
pub fn segment_hit(s0: Vec2, s1: Vec2, half_width: f32, target: Vec2, target_radius: f32) -> bool {
    let reach = half_width + target_radius;
    point_to_segment_distance_squared(target, s0, s1) <= reach * reach
}

/// Filter and sort candidates ascending by squared distance to `origin`.
///
/// Inactive/garbage candidates and anything `exclude` rejects are dropped.
/// Ties keep their enumeration order (`sort_by` is stable), which decides the
/// first pick of a multi-shot weapon when targets are equidistant.
pub fn select_sorted_targets<I, F>(origin: Vec2, candidates: I, exclude: F) -> Vec<TargetCandidate>
where
    I: IntoIterator<Item = TargetCandidate>,
    F: Fn(&TargetCandidate) -> bool,
{
    let mut out: Vec<TargetCandidate> = candidates
        .into_iter()
        .filter(|c| c.targetable && !exclude(c))
        .map(|mut c| {
            c.distance_sq = distance_squared(origin, c.position);
            c
        })
        .collect();
    out.sort_by(|a, b| a.distance_sq.total_cmp(&b.distance_sq));
    out
}

/// Single-pass nearest candidate within `max_range_sq` (inclusive).
///
/// Equidistant candidates resolve to the first one enumerated.
pub fn nearest_target<I>(origin: Vec2, candidates: I, max_range_sq: f32) -> Option<TargetCandidate>
where
    I: IntoIterator<Item = TargetCandidate>,
{
    let mut best: Option<TargetCandidate> = None;
    for mut c in candidates {
        if !c.targetable {
            continue;
        }
        c.distance_sq = distance_squared(origin, c.position);
        if c.distance_sq > max_range_sq {
            continue;
        }
        if best.is_none_or(|b| c.distance_sq < b.distance_sq) {
            best = Some(c);
        }
    }
    best
}

/// Normalize `v`, or `None` when it is (numerically) zero.
#[inline]
pub fn try_normalize(v: Vec2) -> Option<Vec2> {
    if v.length_squared() <= ZERO_EPSILON_SQ || !v.is_finite() {
        None
    } else {
        Some(v.normalize())
    }
}

/// Two-level fallback heading.
///
/// 1. towards the aim vector, if any and non-zero;
/// 2. else the actor's last movement direction, if non-zero;
/// 3. else [`CANONICAL_DIRECTION`].
///
/// Never returns the zero vector.
pub fn fallback_direction(aim: Option<Vec2>, last_move: Vec2) -> Vec2 {
    aim.and_then(try_normalize)
        .or_else(|| try_normalize(last_move))
        .unwrap_or(CANONICAL_DIRECTION)
}

/// Rotate a unit heading by `radians`.
#[inline]
pub fn rotate(dir: Vec2, radians: f32) -> Vec2 {
    Vec2::from_angle(radians).rotate(dir)
}
