//! Lifecycle tests drive `Instance::advance` through a scripted `HitContext`;
//! the ECS wiring (allocator, budget, sweep) is tested on a bare `World`.

use bevy::ecs::message::Messages;
use bevy::prelude::*;

use super::*;
use crate::common::test_utils::{combat_world, drain_messages, ensure_messages, reindex, run_system_once};
use crate::common::tunables::{InstanceBudget, Tunables};
use crate::plugins::actors::{Combatant, Team};
use crate::plugins::damage::{ActorDied, DamageOutcome, DamageSource, Hit, StrikeOutcome};
use crate::plugins::fx::{CueTint, VisualCue};
use crate::plugins::targeting::TargetCandidate;

// -----------------------------------------------------------------------------
// Scripted context
// -----------------------------------------------------------------------------

struct Dummy {
    entity: Entity,
    position: Vec2,
    radius: f32,
    team: Team,
    health: f32,
    trapped_by: Option<Entity>,
}

struct Script {
    actors: Vec<Dummy>,
    struck: Vec<Entity>,
    spawns: Vec<InstanceSpec>,
    cues: Vec<VisualCue>,
    bounds: Rect,
    captures: bool,
}

impl Script {
    fn new() -> Self {
        Self {
            actors: Vec::new(),
            struck: Vec::new(),
            spawns: Vec::new(),
            cues: Vec::new(),
            bounds: Rect::new(-1000.0, -1000.0, 1000.0, 1000.0),
            captures: true,
        }
    }

    fn add(&mut self, world: &mut World, x: f32, y: f32) -> Entity {
        let entity = world.spawn_empty().id();
        self.actors.push(Dummy {
            entity,
            position: Vec2::new(x, y),
            radius: 5.0,
            team: Team::Hostiles,
            health: 100.0,
            trapped_by: None,
        });
        entity
    }

    fn alive(&self, e: Entity) -> Option<&Dummy> {
        self.actors.iter().find(|a| a.entity == e && a.health > 0.0)
    }

    fn alive_mut(&mut self, e: Entity) -> Option<&mut Dummy> {
        self.actors.iter_mut().find(|a| a.entity == e && a.health > 0.0)
    }

    fn links(&self) -> usize {
        self.cues.iter().filter(|c| matches!(c, VisualCue::Link { .. })).count()
    }
}

impl HitContext for Script {
    fn candidates(&self, center: Vec2, reach: f32, team: Team) -> Vec<TargetCandidate> {
        self.actors
            .iter()
            .filter(|a| a.health > 0.0 && a.team == team)
            .filter(|a| a.position.distance(center) <= reach + a.radius)
            .map(|a| TargetCandidate::new(a.entity, a.position, a.radius))
            .collect()
    }

    fn position(&self, target: Entity) -> Option<Vec2> {
        self.alive(target).map(|a| a.position)
    }

    fn strike(&mut self, target: Entity, hit: &Hit) -> Option<StrikeOutcome> {
        let a = self.alive_mut(target)?;
        a.health -= hit.damage;
        let died = a.health <= 0.0;
        self.struck.push(target);
        Some(StrikeOutcome {
            damage: DamageOutcome {
                actual: hit.damage,
                died,
                released_trap: None,
            },
            status: None,
        })
    }

    fn capture(&mut self, target: Entity, trap: Entity, _source: DamageSource, _duration: f32) -> bool {
        if !self.captures {
            return false;
        }
        match self.alive_mut(target) {
            Some(a) if a.trapped_by.is_none() => {
                a.trapped_by = Some(trap);
                true
            }
            _ => false,
        }
    }

    fn is_captured_by(&self, target: Entity, trap: Entity) -> bool {
        self.alive(target).is_some_and(|a| a.trapped_by == Some(trap))
    }

    fn release(&mut self, target: Entity, trap: Entity) {
        if let Some(a) = self.actors.iter_mut().find(|a| a.entity == target) {
            if a.trapped_by == Some(trap) {
                a.trapped_by = None;
            }
        }
    }

    fn spawn(&mut self, spec: InstanceSpec) {
        self.spawns.push(spec);
    }

    fn cue(&mut self, cue: VisualCue) {
        self.cues.push(cue);
    }

    fn jitter(&mut self, _max: f32) -> f32 {
        0.0
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }
}

fn bolt(on_hit: OnHit, damage: f32, lifetime: f32) -> Instance {
    let body = Body::Projectile(Projectile::new(
        Vec2::new(100.0, 0.0),
        Shape::Circle { radius: 3.0 },
        on_hit,
    ));
    let spec = InstanceSpec::new(
        Team::Allies,
        DamageSource::player(None),
        Vec2::ZERO,
        HitSpec::normal(damage),
        lifetime,
        body,
    );
    Instance::from_spec(spec, 12.0)
}

fn projectile(instance: &Instance) -> &Projectile {
    match &instance.body {
        Body::Projectile(p) => p,
        other => panic!("not a projectile: {other:?}"),
    }
}

// -----------------------------------------------------------------------------
// Projectiles
// -----------------------------------------------------------------------------

#[test]
fn pierce_two_ends_on_the_third_hit() {
    let mut world = World::new();
    let mut ctx = Script::new();
    let hit: Vec<Entity> = (0..4).map(|i| ctx.add(&mut world, 10.0, i as f32)).collect();
    let me = world.spawn_empty().id();

    let mut b = bolt(OnHit::Pierce { remaining: 2 }, 1.0, 5.0);
    let mut pos = Vec2::ZERO;
    assert_eq!(b.advance(me, &mut pos, 0.1, &mut ctx), Progress::Terminal);

    assert_eq!(ctx.struck, hit[..3].to_vec());
    assert!(b.is_terminal());
}

#[test]
fn a_target_is_hit_at_most_once_per_instance() {
    let mut world = World::new();
    let mut ctx = Script::new();
    let a = ctx.add(&mut world, 10.0, 0.0);
    let me = world.spawn_empty().id();

    let mut b = bolt(OnHit::Sweep, 1.0, 5.0);
    if let Body::Projectile(p) = &mut b.body {
        p.velocity = Vec2::ZERO;
    }
    let mut pos = Vec2::new(10.0, 0.0);
    for _ in 0..3 {
        assert_eq!(b.advance(me, &mut pos, 0.1, &mut ctx), Progress::Continue);
    }
    assert_eq!(ctx.struck, vec![a]);
}

#[test]
fn chain_of_two_hits_three_targets_then_ends() {
    let mut world = World::new();
    let mut ctx = Script::new();
    let a = ctx.add(&mut world, 10.0, 0.0);
    let b = ctx.add(&mut world, 60.0, 0.0);
    let c = ctx.add(&mut world, 110.0, 0.0);
    let me = world.spawn_empty().id();

    let mut inst = bolt(
        OnHit::Chain {
            remaining: 2,
            range: 80.0,
        },
        1.0,
        5.0,
    );
    let mut pos = Vec2::ZERO;
    assert_eq!(inst.advance(me, &mut pos, 0.1, &mut ctx), Progress::Continue);
    assert_eq!(pos, Vec2::new(60.0, 0.0));
    assert_eq!(inst.advance(me, &mut pos, 0.1, &mut ctx), Progress::Continue);
    assert_eq!(inst.advance(me, &mut pos, 0.1, &mut ctx), Progress::Terminal);

    assert_eq!(ctx.struck, vec![a, b, c]);
    assert_eq!(ctx.links(), 2);
}

#[test]
fn chain_without_a_next_target_ends_immediately() {
    let mut world = World::new();
    let mut ctx = Script::new();
    ctx.add(&mut world, 10.0, 0.0);
    ctx.add(&mut world, 500.0, 0.0);
    let me = world.spawn_empty().id();

    let mut inst = bolt(
        OnHit::Chain {
            remaining: 3,
            range: 80.0,
        },
        1.0,
        5.0,
    );
    let mut pos = Vec2::ZERO;
    assert_eq!(inst.advance(me, &mut pos, 0.1, &mut ctx), Progress::Terminal);
    assert_eq!(ctx.struck.len(), 1);
}

#[test]
fn bounce_reverses_and_ignores_the_last_target() {
    let mut world = World::new();
    let mut ctx = Script::new();
    let a = ctx.add(&mut world, 10.0, 0.0);
    let me = world.spawn_empty().id();

    let mut inst = bolt(
        OnHit::Bounce {
            remaining: 1,
            jitter: 0.0,
        },
        1.0,
        5.0,
    );
    let mut pos = Vec2::ZERO;
    assert_eq!(inst.advance(me, &mut pos, 0.1, &mut ctx), Progress::Continue);
    assert_eq!(projectile(&inst).velocity, Vec2::new(-100.0, 0.0));
    assert!(inst.core.hit_targets.contains(&a));

    assert_eq!(inst.advance(me, &mut pos, 0.1, &mut ctx), Progress::Continue);
    assert_eq!(ctx.struck, vec![a]);
}

#[test]
fn trap_holds_follows_and_releases_on_expiry() {
    let mut world = World::new();
    let mut ctx = Script::new();
    let a = ctx.add(&mut world, 10.0, 0.0);
    let me = world.spawn_empty().id();

    let mut inst = bolt(OnHit::Trap { duration: 1.0 }, 1.0, 5.0);
    let mut pos = Vec2::ZERO;
    assert_eq!(inst.advance(me, &mut pos, 0.1, &mut ctx), Progress::Continue);
    assert_eq!(projectile(&inst).phase, Phase::Trapping { target: a });
    assert_eq!(ctx.actors[0].trapped_by, Some(me));

    ctx.actors[0].position = Vec2::new(20.0, 5.0);
    assert_eq!(inst.advance(me, &mut pos, 0.5, &mut ctx), Progress::Continue);
    assert_eq!(pos, Vec2::new(20.0, 5.0));

    assert_eq!(inst.advance(me, &mut pos, 0.5, &mut ctx), Progress::Terminal);
    assert_eq!(ctx.actors[0].trapped_by, None);
    assert_eq!(ctx.struck, vec![a]);
}

#[test]
fn failed_capture_bursts() {
    let mut world = World::new();
    let mut ctx = Script::new();
    ctx.captures = false;
    ctx.add(&mut world, 10.0, 0.0);
    let me = world.spawn_empty().id();

    let mut inst = bolt(OnHit::Trap { duration: 1.0 }, 1.0, 5.0);
    let mut pos = Vec2::ZERO;
    assert_eq!(inst.advance(me, &mut pos, 0.1, &mut ctx), Progress::Terminal);
    assert!(ctx.cues.iter().any(|c| matches!(c, VisualCue::Impact { .. })));
}

#[test]
fn split_bursts_into_weaker_children_that_skip_the_victim() {
    let mut world = World::new();
    let mut ctx = Script::new();
    let a = ctx.add(&mut world, 10.0, 0.0);
    let me = world.spawn_empty().id();

    let mut inst = bolt(
        OnHit::Split {
            count: 4,
            spread: 0.0,
        },
        10.0,
        2.0,
    );
    let mut pos = Vec2::ZERO;
    assert_eq!(inst.advance(me, &mut pos, 0.1, &mut ctx), Progress::Terminal);

    assert_eq!(ctx.spawns.len(), 4);
    for child in &ctx.spawns {
        assert_eq!(child.hit.damage, 5.0);
        assert_eq!(child.lifetime, 1.0);
        assert_eq!(child.pre_hit, vec![a]);
        let Body::Projectile(p) = child.body else {
            panic!("child is not a projectile");
        };
        assert_eq!(p.on_hit, OnHit::Pierce { remaining: 0 });
        assert_eq!(p.shape, Shape::Circle { radius: 1.5 });
    }
    let first = match ctx.spawns[0].body {
        Body::Projectile(p) => p.velocity,
        _ => unreachable!(),
    };
    assert!(first.distance(Vec2::new(100.0, 0.0)) < 1e-3);
}

#[test]
fn split_also_bursts_at_the_end_of_its_flight() {
    let mut world = World::new();
    let mut ctx = Script::new();
    let me = world.spawn_empty().id();

    let mut inst = bolt(
        OnHit::Split {
            count: 3,
            spread: 0.0,
        },
        10.0,
        0.2,
    );
    let mut pos = Vec2::ZERO;
    assert_eq!(inst.advance(me, &mut pos, 0.1, &mut ctx), Progress::Continue);
    assert_eq!(inst.advance(me, &mut pos, 0.1, &mut ctx), Progress::Terminal);
    assert_eq!(ctx.spawns.len(), 3);
}

#[test]
fn hard_ceiling_beats_nominal_lifetime() {
    let mut world = World::new();
    let mut ctx = Script::new();
    let me = world.spawn_empty().id();

    let body = Body::Projectile(Projectile::new(Vec2::ZERO, Shape::Circle { radius: 3.0 }, OnHit::Sweep));
    let spec = InstanceSpec::new(
        Team::Allies,
        DamageSource::NONE,
        Vec2::ZERO,
        HitSpec::normal(1.0),
        100.0,
        body,
    );
    let mut inst = Instance::from_spec(spec, 0.5);
    let mut pos = Vec2::ZERO;
    assert_eq!(inst.advance(me, &mut pos, 0.25, &mut ctx), Progress::Continue);
    assert_eq!(inst.advance(me, &mut pos, 0.25, &mut ctx), Progress::Terminal);
}

#[test]
fn leaving_the_play_area_is_terminal() {
    let mut world = World::new();
    let mut ctx = Script::new();
    ctx.bounds = Rect::new(-5.0, -5.0, 5.0, 5.0);
    let me = world.spawn_empty().id();

    let mut inst = bolt(OnHit::Pierce { remaining: 0 }, 1.0, 5.0);
    let mut pos = Vec2::ZERO;
    assert_eq!(inst.advance(me, &mut pos, 0.1, &mut ctx), Progress::Terminal);
}

#[test]
fn anchored_instances_follow_and_end_with_their_anchor() {
    let mut world = World::new();
    let mut ctx = Script::new();
    let owner = ctx.add(&mut world, 40.0, 40.0);
    ctx.actors[0].team = Team::Allies;
    let me = world.spawn_empty().id();

    let body = Body::Projectile(Projectile::new(
        Vec2::ZERO,
        Shape::Segment {
            dir: Vec2::X,
            length: 50.0,
            half_width: 4.0,
        },
        OnHit::Sweep,
    ));
    let spec = InstanceSpec::new(
        Team::Allies,
        DamageSource::player(Some(owner)),
        Vec2::ZERO,
        HitSpec::normal(1.0),
        5.0,
        body,
    )
    .anchored(owner);
    assert_eq!(spec.kind(), InstanceKind::Line);
    let mut inst = Instance::from_spec(spec, 12.0);

    let mut pos = Vec2::ZERO;
    assert_eq!(inst.advance(me, &mut pos, 0.1, &mut ctx), Progress::Continue);
    assert_eq!(pos, Vec2::new(40.0, 40.0));

    ctx.actors[0].health = 0.0;
    assert_eq!(inst.advance(me, &mut pos, 0.1, &mut ctx), Progress::Terminal);
}

#[test]
fn terminal_instances_stay_terminal() {
    let mut world = World::new();
    let mut ctx = Script::new();
    ctx.add(&mut world, 10.0, 0.0);
    let me = world.spawn_empty().id();

    let mut inst = bolt(OnHit::Pierce { remaining: 5 }, 1.0, 5.0);
    inst.terminate();
    let mut pos = Vec2::ZERO;
    assert_eq!(inst.advance(me, &mut pos, 0.1, &mut ctx), Progress::Terminal);
    assert!(ctx.struck.is_empty());
    assert_eq!(pos, Vec2::ZERO);
}

// -----------------------------------------------------------------------------
// Hazards
// -----------------------------------------------------------------------------

fn hazard(radius: f32, interval: f32, lifetime: f32) -> Instance {
    let spec = InstanceSpec::new(
        Team::Allies,
        DamageSource::player(None),
        Vec2::ZERO,
        HitSpec::normal(2.0),
        lifetime,
        Body::Hazard(AreaHazard::new(radius, interval, CueTint::Fire)),
    );
    Instance::from_spec(spec, 12.0)
}

#[test]
fn hazard_pulses_immediately_then_on_its_interval() {
    let mut world = World::new();
    let mut ctx = Script::new();
    let a = ctx.add(&mut world, 10.0, 0.0);
    let b = ctx.add(&mut world, -20.0, 0.0);
    ctx.add(&mut world, 200.0, 0.0);
    let me = world.spawn_empty().id();

    let mut inst = hazard(40.0, 0.5, 5.0);
    let mut pos = Vec2::ZERO;
    inst.advance(me, &mut pos, 0.25, &mut ctx);
    assert_eq!(ctx.struck, vec![a, b]);

    inst.advance(me, &mut pos, 0.25, &mut ctx);
    assert_eq!(ctx.struck.len(), 2);

    inst.advance(me, &mut pos, 0.25, &mut ctx);
    assert_eq!(ctx.struck, vec![a, b, a, b]);
}

#[test]
fn hazard_ends_at_its_lifetime() {
    let mut world = World::new();
    let mut ctx = Script::new();
    let me = world.spawn_empty().id();

    let mut inst = hazard(40.0, 0.5, 0.5);
    let mut pos = Vec2::ZERO;
    assert_eq!(inst.advance(me, &mut pos, 0.25, &mut ctx), Progress::Continue);
    assert_eq!(inst.advance(me, &mut pos, 0.25, &mut ctx), Progress::Terminal);
}

#[test]
fn growing_hazards_are_capped() {
    let mut world = World::new();
    let mut ctx = Script::new();
    let me = world.spawn_empty().id();

    let spec = InstanceSpec::new(
        Team::Hostiles,
        DamageSource::NONE,
        Vec2::ZERO,
        HitSpec::normal(1.0),
        10.0,
        Body::Hazard(AreaHazard::new(10.0, 1.0, CueTint::Poison).growing(20.0, 25.0)),
    );
    let mut inst = Instance::from_spec(spec, 12.0);
    let mut pos = Vec2::ZERO;
    inst.advance(me, &mut pos, 0.5, &mut ctx);
    inst.advance(me, &mut pos, 0.5, &mut ctx);

    let Body::Hazard(area) = inst.body else {
        panic!("not a hazard");
    };
    assert_eq!(area.radius, 25.0);
}

#[test]
fn boss_effects_end_with_their_boss() {
    let mut world = World::new();
    let mut ctx = Script::new();
    let boss = ctx.add(&mut world, 0.0, 0.0);
    let me = world.spawn_empty().id();

    let spec = InstanceSpec::new(
        Team::Hostiles,
        DamageSource::hostile(Some(boss)),
        Vec2::new(100.0, 0.0),
        HitSpec::normal(1.0),
        10.0,
        Body::BossEffect(BossEffect {
            boss,
            area: AreaHazard::new(30.0, 0.5, CueTint::Boss),
        }),
    );
    let mut inst = Instance::from_spec(spec, 12.0);
    let mut pos = Vec2::new(100.0, 0.0);
    assert_eq!(inst.advance(me, &mut pos, 0.1, &mut ctx), Progress::Continue);

    ctx.actors[0].health = 0.0;
    assert_eq!(inst.advance(me, &mut pos, 0.1, &mut ctx), Progress::Terminal);
}

// -----------------------------------------------------------------------------
// Catalog and budget
// -----------------------------------------------------------------------------

#[test]
fn catalog_scales_area_and_might() {
    let catalog = HazardCatalog::default();
    let base = *catalog.get(HazardId::Explosion).unwrap();
    let spec = catalog
        .instantiate(HazardId::Explosion, Team::Hostiles, DamageSource::NONE, Vec2::ZERO, 2.0, 3.0)
        .unwrap();

    assert_eq!(spec.hit.damage, base.hit.damage * 3.0);
    let Body::Hazard(area) = spec.body else {
        panic!("not a hazard");
    };
    assert_eq!(area.radius, base.radius * 2.0);
    assert!(HazardCatalog::empty()
        .instantiate(HazardId::Explosion, Team::Hostiles, DamageSource::NONE, Vec2::ZERO, 1.0, 1.0)
        .is_none());
}

#[test]
fn census_saturates_at_zero() {
    let mut census = InstanceCensus::default();
    census.record_despawn(InstanceKind::Hazard);
    assert_eq!(census.live(InstanceKind::Hazard), 0);
}

fn allocator_world(budget: InstanceBudget) -> World {
    let mut world = combat_world(0.1);
    world.insert_resource(Tunables {
        budget,
        ..default()
    });
    world.init_resource::<InstanceCensus>();
    ensure_messages::<SpawnInstanceRequest>(&mut world);
    ensure_messages::<SpawnHazardRequest>(&mut world);
    world
}

#[test]
fn allocator_rejects_spawns_over_the_cap() {
    let mut world = allocator_world(InstanceBudget {
        projectiles: 2,
        ..default()
    });
    for _ in 0..3 {
        let body = Body::Projectile(Projectile::new(Vec2::X, Shape::Circle { radius: 2.0 }, OnHit::Sweep));
        let spec = InstanceSpec::new(Team::Allies, DamageSource::NONE, Vec2::ZERO, HitSpec::normal(1.0), 1.0, body);
        world
            .resource_mut::<Messages<SpawnInstanceRequest>>()
            .write(SpawnInstanceRequest(spec));
    }

    run_system_once(&mut world, allocator::allocate_instances);

    assert_eq!(world.query::<&Instance>().iter(&world).count(), 2);
    assert_eq!(world.resource::<InstanceCensus>().live(InstanceKind::Projectile), 2);
}

#[test]
fn missing_hazard_templates_are_skipped() {
    let mut world = allocator_world(InstanceBudget::default());
    world.insert_resource(HazardCatalog::empty());
    world.resource_mut::<Messages<SpawnHazardRequest>>().write(SpawnHazardRequest::new(
        HazardId::PoisonPool,
        Team::Allies,
        DamageSource::NONE,
        Vec2::ZERO,
    ));

    run_system_once(&mut world, allocator::allocate_instances);
    assert_eq!(world.query::<&Instance>().iter(&world).count(), 0);
    drain_messages::<SpawnHazardRequest>(&mut world);

    world.insert_resource(HazardCatalog::default());
    world.resource_mut::<Messages<SpawnHazardRequest>>().write(SpawnHazardRequest::new(
        HazardId::PoisonPool,
        Team::Allies,
        DamageSource::NONE,
        Vec2::ZERO,
    ));
    run_system_once(&mut world, allocator::allocate_instances);
    assert_eq!(world.resource::<InstanceCensus>().live(InstanceKind::Hazard), 1);
}

#[test]
fn sweep_frees_budget_slots() {
    let mut world = allocator_world(InstanceBudget::default());
    let mut inst = bolt(OnHit::Sweep, 1.0, 1.0);
    inst.terminate();
    world.spawn(inst);
    world.spawn(bolt(OnHit::Sweep, 1.0, 1.0));
    {
        let mut census = world.resource_mut::<InstanceCensus>();
        census.record_spawn(InstanceKind::Projectile);
        census.record_spawn(InstanceKind::Projectile);
    }

    run_system_once(&mut world, allocator::sweep_instances);

    assert_eq!(world.query::<&Instance>().iter(&world).count(), 1);
    assert_eq!(world.resource::<InstanceCensus>().live(InstanceKind::Projectile), 1);
}

// -----------------------------------------------------------------------------
// ECS wiring
// -----------------------------------------------------------------------------

#[test]
fn advance_instances_damages_actors_and_reports_deaths() {
    let mut world = combat_world(0.1);
    ensure_messages::<ActorDied>(&mut world);
    ensure_messages::<SpawnInstanceRequest>(&mut world);

    let victim = world
        .spawn((Combatant::enemy(3.0, 8.0, 50.0), Transform::from_xyz(10.0, 0.0, 0.0)))
        .id();
    let bullet = world
        .spawn((
            bolt(OnHit::Pierce { remaining: 0 }, 5.0, 2.0),
            Transform::default(),
        ))
        .id();

    reindex(&mut world);
    run_system_once(&mut world, lifecycle::advance_instances);

    assert!(world.get::<Combatant>(victim).unwrap().garbage);
    assert!(world.get::<Instance>(bullet).unwrap().is_terminal());
    assert_eq!(world.get::<Transform>(bullet).unwrap().translation.x, 10.0);

    let deaths = drain_messages::<ActorDied>(&mut world);
    assert_eq!(deaths.len(), 1);
    assert_eq!(deaths[0].entity, victim);
    let cues = drain_messages::<VisualCue>(&mut world);
    assert!(cues
        .iter()
        .any(|c| matches!(c, VisualCue::DamageNumber { text, .. } if text == "5")));
}
