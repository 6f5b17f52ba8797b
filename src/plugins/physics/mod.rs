//! Avian setup for a top-down arena.
//!
//! Every actor is a kinematic body driven through `LinearVelocity`. Kinematic
//! bodies pass through static colliders, so the arena walls only mark the
//! edge and actors are confined to the play area here.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::actors::Combatant;
use crate::plugins::core::SimSet;
use crate::plugins::world::PlayArea;

pub fn plugin(app: &mut App) {
    let length_unit = app.world().resource::<Tunables>().pixels_per_meter;
    app.add_plugins(PhysicsPlugins::default().with_length_unit(length_unit))
        .insert_resource(Gravity::ZERO)
        .add_systems(FixedUpdate, confine_actors.in_set(SimSet::Locomotion));
}

/// Clamp `center` so a circle of `radius` stays inside `area`.
///
/// An area narrower than the circle pins it to the area's center on that axis.
pub fn confine(area: Rect, center: Vec2, radius: f32) -> Vec2 {
    let min = area.min + Vec2::splat(radius);
    let max = area.max - Vec2::splat(radius);
    let axis = |v: f32, lo: f32, hi: f32, mid: f32| if lo > hi { mid } else { v.clamp(lo, hi) };
    let mid = area.center();
    Vec2::new(axis(center.x, min.x, max.x, mid.x), axis(center.y, min.y, max.y, mid.y))
}

/// Push every actor that drifted past the arena edge back inside.
pub fn confine_actors(area: Option<Res<PlayArea>>, mut actors: Query<(&Combatant, &mut Transform)>) {
    let Some(area) = area else {
        return;
    };
    for (actor, mut tf) in &mut actors {
        let pos = tf.translation.truncate();
        let inside = confine(area.0, pos, actor.radius);
        if inside != pos {
            tf.translation.x = inside.x;
            tf.translation.y = inside.y;
        }
    }
}

#[cfg(test)]
mod tests;
