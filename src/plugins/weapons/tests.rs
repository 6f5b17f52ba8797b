use bevy::prelude::*;

use super::*;
use crate::common::test_utils::{combat_world, drain_messages, ensure_messages, reindex, run_system_once};
use crate::plugins::actors::Combatant;
use crate::plugins::projectiles::{Body, HazardId, InstanceKind, OnHit, Shape};
use crate::plugins::targeting::TargetCandidate;

fn owner(world: &mut World) -> OwnerView {
    OwnerView {
        entity: world.spawn_empty().id(),
        position: Vec2::ZERO,
        aim: None,
        last_direction: Vec2::X,
        stunned: false,
        stats: OwnerStats::default(),
    }
}

fn target(world: &mut World, x: f32, y: f32) -> TargetCandidate {
    TargetCandidate::new(world.spawn_empty().id(), Vec2::new(x, y), 8.0)
}

fn close(a: Vec2, b: Vec2) -> bool {
    a.distance(b) < 1e-3
}

// -----------------------------------------------------------------------------
// Table
// -----------------------------------------------------------------------------

#[test]
fn weapon_table_is_valid() {
    table::validate().unwrap();
}

#[test]
fn level_curve_grows_and_clamps() {
    let base = WeaponKind::MagicWand.stats_at(1);
    assert_eq!(WeaponKind::MagicWand.stats_at(0), base);

    let l4 = WeaponKind::MagicWand.stats_at(4);
    assert_eq!(l4.count, 2);
    assert_eq!(l4.pierce, 0);
    assert!(l4.damage > base.damage);
    assert!(l4.cooldown < base.cooldown);

    assert_eq!(WeaponKind::MagicWand.stats_at(5).pierce, 1);
    assert_eq!(WeaponKind::MagicWand.stats_at(200), WeaponKind::MagicWand.stats_at(MAX_LEVEL));
}

// -----------------------------------------------------------------------------
// Arsenal
// -----------------------------------------------------------------------------

#[test]
fn arsenal_rejects_duplicates_and_overflow() {
    let mut arsenal = Arsenal::with([WeaponKind::MagicWand]).unwrap();
    assert_eq!(
        arsenal.add(WeaponKind::MagicWand),
        Err(ArsenalError::AlreadyOwned(WeaponKind::MagicWand))
    );

    for kind in [
        WeaponKind::Whip,
        WeaponKind::ChainLightning,
        WeaponKind::BubbleWand,
        WeaponKind::Firebomb,
        WeaponKind::RicochetDisc,
    ] {
        arsenal.add(kind).unwrap();
    }
    assert_eq!(arsenal.len(), MAX_SLOTS);
    assert_eq!(arsenal.add(WeaponKind::SunBeam), Err(ArsenalError::Full));
    assert_eq!(
        arsenal.level_up(WeaponKind::SunBeam),
        Err(ArsenalError::NotOwned(WeaponKind::SunBeam))
    );
}

#[test]
fn level_up_stops_at_max() {
    let mut arsenal = Arsenal::with([WeaponKind::Whip]).unwrap();
    for expected in 2..=MAX_LEVEL {
        assert_eq!(arsenal.level_up(WeaponKind::Whip), Ok(expected));
    }
    assert_eq!(
        arsenal.level_up(WeaponKind::Whip),
        Err(ArsenalError::MaxLevel(WeaponKind::Whip))
    );
    assert_eq!(
        arsenal.get(WeaponKind::Whip).unwrap().stats,
        WeaponKind::Whip.stats_at(MAX_LEVEL)
    );
}

#[test]
fn grant_adds_or_levels() {
    let mut arsenal = Arsenal::default();
    assert_eq!(arsenal.grant(WeaponKind::GarlicAura), Ok(1));
    assert_eq!(arsenal.grant(WeaponKind::GarlicAura), Ok(2));
    assert_eq!(arsenal.len(), 1);
}

#[test]
fn upgrade_options_skip_maxed_and_unaffordable_kinds() {
    let mut arsenal = Arsenal::with([WeaponKind::MagicWand]).unwrap();
    assert_eq!(arsenal.upgrade_options().len(), 11);

    while arsenal.level_up(WeaponKind::MagicWand).is_ok() {}
    assert!(!arsenal.upgrade_options().contains(&WeaponKind::MagicWand));

    for kind in [
        WeaponKind::Whip,
        WeaponKind::ChainLightning,
        WeaponKind::BubbleWand,
        WeaponKind::Firebomb,
        WeaponKind::RicochetDisc,
    ] {
        arsenal.add(kind).unwrap();
    }
    let options = arsenal.upgrade_options();
    assert_eq!(options.len(), 5);
    assert!(!options.contains(&WeaponKind::SunBeam));
}

// -----------------------------------------------------------------------------
// Firing
// -----------------------------------------------------------------------------

#[test]
fn cooldown_gates_volleys() {
    let mut world = World::new();
    let me = owner(&mut world);
    let mut wand = Weapon::new(WeaponKind::MagicWand);

    assert!(wand.update(0.1, &me, &[]).is_some());
    assert_eq!(wand.cooldown_timer, 1.0);
    assert!(wand.update(0.5, &me, &[]).is_none());
    assert!(wand.update(0.5, &me, &[]).is_some());
}

#[test]
fn stunned_owners_hold_fire_with_a_ready_weapon() {
    let mut world = World::new();
    let mut me = owner(&mut world);
    me.stunned = true;
    let mut wand = Weapon::new(WeaponKind::MagicWand);

    assert!(wand.update(0.1, &me, &[]).is_none());
    assert_eq!(wand.cooldown_timer, 0.0);
}

#[test]
fn headings_fall_back_without_targets() {
    let mut world = World::new();
    let mut me = owner(&mut world);
    let wand = Weapon::new(WeaponKind::MagicWand);

    assert!(close(wand.headings(&me, &[])[0].dir, Vec2::X));

    me.last_direction = Vec2::ZERO;
    assert!(close(wand.headings(&me, &[])[0].dir, Vec2::Y));
}

#[test]
fn cursor_aim_only_steers_facing_weapons() {
    let mut world = World::new();
    let mut me = owner(&mut world);
    me.aim = Some(Vec2::new(0.0, -3.0));

    let wand = Weapon::new(WeaponKind::MagicWand);
    assert!(close(wand.headings(&me, &[])[0].dir, Vec2::X));

    let whip = Weapon::new(WeaponKind::Whip);
    assert!(close(whip.headings(&me, &[])[0].dir, -Vec2::Y));
}

#[test]
fn targets_out_of_range_are_ignored() {
    let mut world = World::new();
    let me = owner(&mut world);
    let far = target(&mut world, 0.0, 5000.0);
    let wand = Weapon::new(WeaponKind::MagicWand);

    assert!(close(wand.headings(&me, &[far])[0].dir, Vec2::X));
}

#[test]
fn per_target_shots_go_closest_first_and_wrap() {
    let mut world = World::new();
    let me = owner(&mut world);
    let far = target(&mut world, 0.0, 200.0);
    let near = target(&mut world, -50.0, 0.0);
    let mut wand = Weapon::new(WeaponKind::MagicWand);
    for _ in 0..6 {
        wand.level_up().unwrap();
    }
    assert_eq!(wand.stats.count, 3);

    let headings = wand.headings(&me, &[far, near]);
    let points: Vec<Vec2> = headings.iter().map(|h| h.point).collect();
    assert_eq!(points, vec![near.position, far.position, near.position]);
    assert!(close(headings[0].dir, -Vec2::X));
}

#[test]
fn magic_wand_bolts_carry_owner_modifiers() {
    let mut world = World::new();
    let mut me = owner(&mut world);
    me.stats = OwnerStats {
        damage_multiplier: 2.0,
        projectile_speed_multiplier: 0.5,
        pierce_bonus: 1,
        ..default()
    };
    let enemy = target(&mut world, 100.0, 0.0);

    let volley = Weapon::new(WeaponKind::MagicWand).fire(&me, &[enemy]);
    assert_eq!(volley.instances.len(), 1);
    let spec = &volley.instances[0];
    assert_eq!(spec.hit.damage, 20.0);
    assert!(spec.source.from_player);
    assert_eq!(spec.source.entity, Some(me.entity));
    let Body::Projectile(p) = spec.body else {
        panic!("wand fires projectiles");
    };
    assert!(close(p.velocity, Vec2::new(210.0, 0.0)));
    assert_eq!(p.on_hit, OnHit::Pierce { remaining: 1 });
}

#[test]
fn whip_is_an_anchored_line_along_the_aim() {
    let mut world = World::new();
    let mut me = owner(&mut world);
    me.aim = Some(Vec2::new(0.0, 4.0));

    let volley = Weapon::new(WeaponKind::Whip).fire(&me, &[]);
    let spec = &volley.instances[0];
    assert_eq!(spec.kind(), InstanceKind::Line);
    assert_eq!(spec.anchor, Some(me.entity));
    let Body::Projectile(p) = spec.body else {
        panic!("whip is a projectile body");
    };
    let Shape::Segment { dir, length, .. } = p.shape else {
        panic!("whip is a segment");
    };
    assert!(close(dir, Vec2::Y));
    assert_eq!(length, 110.0);
}

#[test]
fn poison_flask_lobs_at_the_target() {
    let mut world = World::new();
    let me = owner(&mut world);
    let enemy = target(&mut world, 60.0, 80.0);

    let volley = Weapon::new(WeaponKind::PoisonFlask).fire(&me, &[enemy]);
    assert!(volley.instances.is_empty());
    assert_eq!(volley.hazards.len(), 1);
    assert_eq!(volley.hazards[0].template, HazardId::PoisonPool);
    assert_eq!(volley.hazards[0].position, enemy.position);
}

#[test]
fn frost_nova_pulses_once() {
    let mut world = World::new();
    let me = owner(&mut world);

    let volley = Weapon::new(WeaponKind::FrostNova).fire(&me, &[]);
    let spec = &volley.instances[0];
    assert!(spec.hit.status.is_some());
    let Body::Hazard(area) = spec.body else {
        panic!("nova is a hazard");
    };
    assert!(area.interval > spec.lifetime);
}

#[test]
fn spirit_call_summons_around_the_owner() {
    let mut world = World::new();
    let me = owner(&mut world);

    let volley = Weapon::new(WeaponKind::SpiritCall).fire(&me, &[]);
    assert_eq!(volley.spirits.len(), 2);
    assert!(close(volley.spirits[0].position, Vec2::new(24.0, 0.0)));
    assert!(close(volley.spirits[1].position, Vec2::new(-24.0, 0.0)));
    assert!(volley.spirits.iter().all(|s| s.owner == me.entity));
}

#[test]
fn fire_weapons_publishes_requests() {
    let mut world = combat_world(0.1);
    ensure_messages::<crate::plugins::projectiles::SpawnInstanceRequest>(&mut world);
    ensure_messages::<crate::plugins::projectiles::SpawnHazardRequest>(&mut world);
    ensure_messages::<SpawnSpiritRequest>(&mut world);

    world.spawn((
        Combatant::player(100.0, 200.0),
        Arsenal::with([WeaponKind::MagicWand]).unwrap(),
        Transform::default(),
    ));
    world.spawn((Combatant::enemy(10.0, 12.0, 50.0), Transform::from_xyz(0.0, 150.0, 0.0)));

    reindex(&mut world);
    run_system_once(&mut world, fire_weapons);

    let reqs = drain_messages::<crate::plugins::projectiles::SpawnInstanceRequest>(&mut world);
    assert_eq!(reqs.len(), 1);
    let Body::Projectile(p) = reqs[0].0.body else {
        panic!("wand fires projectiles");
    };
    assert!(close(p.velocity.normalize(), Vec2::Y));
}
