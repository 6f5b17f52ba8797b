//! Spawn consumer: turn requests into instances, enforcing the budget.
//!
//! Capacity is a decision, not a failure: a request over its kind's cap is
//! dropped with a `debug!` line. So is a hazard whose template is missing.

use bevy::prelude::*;
use bevy::ecs::message::MessageReader;
use bevy::state::state_scoped::DespawnOnExit;

use super::budget::InstanceCensus;
use super::catalog::HazardCatalog;
use super::components::{Body, Instance, InstanceKind, InstanceSpec, Shape};
use super::messages::{SpawnHazardRequest, SpawnInstanceRequest};
use crate::common::state::GameState;
use crate::common::tunables::{InstanceBudget, Tunables};
use crate::plugins::actors::Team;

fn sprite_for(spec: &InstanceSpec) -> Sprite {
    let (color, size) = match spec.body {
        Body::Projectile(p) => {
            let color = match spec.team {
                Team::Allies => Color::srgb(1.0, 0.95, 0.4),
                Team::Hostiles => Color::srgb(0.55, 0.9, 0.3),
            };
            let size = match p.shape {
                Shape::Circle { radius } => Vec2::splat(radius * 2.0),
                Shape::Segment { length, half_width, .. } => Vec2::new(length, half_width * 2.0),
            };
            (color, size)
        }
        Body::Hazard(a) => (Color::srgba(1.0, 0.5, 0.2, 0.35), Vec2::splat(a.radius * 2.0)),
        Body::BossEffect(b) => (Color::srgba(0.6, 0.2, 0.8, 0.4), Vec2::splat(b.area.radius * 2.0)),
    };
    Sprite {
        color,
        custom_size: Some(size),
        ..default()
    }
}

/// Spawn one instance if its kind has room. Shared by the allocator and by
/// bosses, which need the entity back to track what they own.
pub fn spawn_instance(
    commands: &mut Commands,
    census: &mut InstanceCensus,
    budget: &InstanceBudget,
    max_lifetime: f32,
    spec: InstanceSpec,
) -> Option<Entity> {
    let kind = spec.kind();
    if !census.has_room(budget, kind) {
        debug!("instance budget full for {kind:?}; spawn rejected");
        return None;
    }
    census.record_spawn(kind);

    let name = match kind {
        InstanceKind::Projectile => "Projectile",
        InstanceKind::Line => "Line",
        InstanceKind::Hazard => "Hazard",
        InstanceKind::BossEffect => "BossEffect",
    };
    let sprite = sprite_for(&spec);
    let position = spec.position;
    let entity = commands
        .spawn((
            Name::new(name),
            Instance::from_spec(spec, max_lifetime),
            sprite,
            Transform::from_translation(position.extend(2.0)),
            DespawnOnExit(GameState::InGame),
        ))
        .id();
    Some(entity)
}

pub fn allocate_instances(
    mut commands: Commands,
    tunables: Res<Tunables>,
    catalog: Option<Res<HazardCatalog>>,
    mut census: ResMut<InstanceCensus>,
    mut instances: MessageReader<SpawnInstanceRequest>,
    mut hazards: MessageReader<SpawnHazardRequest>,
) {
    let budget = tunables.budget;
    let ceiling = tunables.max_instance_lifetime;

    for SpawnInstanceRequest(spec) in instances.read() {
        spawn_instance(&mut commands, &mut census, &budget, ceiling, spec.clone());
    }

    for req in hazards.read() {
        let spec = catalog.as_deref().and_then(|c| {
            c.instantiate(req.template, req.team, req.source, req.position, req.area, req.might)
        });
        let Some(spec) = spec else {
            debug!("no hazard template for {:?}; spawn skipped", req.template);
            continue;
        };
        spawn_instance(&mut commands, &mut census, &budget, ceiling, spec);
    }
}

/// Despawn terminal instances and release their budget slots.
pub fn sweep_instances(
    mut commands: Commands,
    mut census: ResMut<InstanceCensus>,
    q: Query<(Entity, &Instance)>,
) {
    for (e, instance) in &q {
        if instance.is_terminal() {
            census.record_despawn(instance.kind);
            commands.entity(e).despawn();
        }
    }
}
