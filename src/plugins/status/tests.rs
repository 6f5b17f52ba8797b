use bevy::prelude::*;

use super::*;
use crate::common::test_utils::{combat_world, drain_messages, ensure_messages, run_system_once};
use crate::plugins::actors::{Combatant, Ephemeral, MovementBehavior, MovementOverride, Resistances};
use crate::plugins::damage::{ActorDied, DamageSource};
use crate::plugins::projectiles::SpawnInstanceRequest;

const RULES: CombatRules = CombatRules {
    boss_dot_multiplier: 0.5,
};

fn grunt() -> Combatant {
    Combatant::enemy(50.0, 12.0, 100.0)
}

fn burn(damage: f32, duration: f32) -> StatusApplication {
    StatusApplication::Burn {
        damage,
        duration,
        interval: 0.5,
    }
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

// -----------------------------------------------------------------------------
// Merging
// -----------------------------------------------------------------------------

#[test]
fn burn_merge_keeps_strongest_damage_and_longest_duration() {
    let mut a = grunt();
    assert_eq!(a.apply_status(burn(5.0, 2.0), DamageSource::NONE, RULES), ApplyOutcome::Created);
    assert_eq!(a.apply_status(burn(3.0, 5.0), DamageSource::NONE, RULES), ApplyOutcome::Refreshed);

    let b = a.status.burn.unwrap();
    assert_eq!(b.damage, 5.0);
    assert_eq!(b.duration, 5.0);
}

#[test]
fn weaker_slow_extends_but_never_overrides() {
    let mut a = grunt();
    let slow = |factor, duration| StatusApplication::Slow { factor, duration };
    a.apply_status(slow(0.5, 1.0), DamageSource::NONE, RULES);
    a.apply_status(slow(0.8, 3.0), DamageSource::NONE, RULES);

    let s = a.status.slow.unwrap();
    assert_eq!(s.factor, 0.5);
    assert_eq!(s.duration, 3.0);
    assert_eq!(a.stats.speed, 50.0);
}

#[test]
fn slow_resistance_weakens_the_factor() {
    let mut a = grunt().with_resistances(Resistances {
        slow_immune: false,
        slow_resistance: 0.4,
    });
    a.apply_status(
        StatusApplication::Slow {
            factor: 0.5,
            duration: 1.0,
        },
        DamageSource::NONE,
        RULES,
    );
    assert!(approx(a.status.slow.unwrap().factor, 0.7));
    assert!(approx(a.stats.speed, 70.0));
}

#[test]
fn slow_immune_actor_is_untouched() {
    let mut a = grunt().with_resistances(Resistances {
        slow_immune: true,
        slow_resistance: 0.0,
    });
    let outcome = a.apply_status(
        StatusApplication::Slow {
            factor: 0.2,
            duration: 1.0,
        },
        DamageSource::NONE,
        RULES,
    );
    assert_eq!(outcome, ApplyOutcome::Immune);
    assert!(a.status.is_empty());
    assert_eq!(a.stats.speed, 100.0);
}

#[test]
fn freeze_dominates_and_queues_slows_until_thaw() {
    let mut a = grunt();
    a.apply_status(
        StatusApplication::Slow {
            factor: 0.5,
            duration: 2.0,
        },
        DamageSource::NONE,
        RULES,
    );
    assert_eq!(a.stats.speed, 50.0);

    a.apply_status(StatusApplication::Freeze { duration: 1.0 }, DamageSource::NONE, RULES);
    assert!(a.status.slow.is_none());
    assert_eq!(a.stats.speed, 0.0);
    assert!(!a.can_move());

    let queued = a.apply_status(
        StatusApplication::Slow {
            factor: 0.6,
            duration: 3.0,
        },
        DamageSource::NONE,
        RULES,
    );
    assert_eq!(queued, ApplyOutcome::Queued);
    assert_eq!(a.stats.speed, 0.0);

    a.tick_status(1.0, |_| true);
    assert!(a.status.freeze.is_none());
    let slow = a.status.slow.unwrap();
    assert_eq!(slow.factor, 0.6);
    assert!(approx(slow.duration, 2.0));
    assert!(approx(a.stats.speed, 60.0));
}

#[test]
fn speed_returns_to_original_when_effects_end() {
    let mut a = grunt();
    a.apply_status(
        StatusApplication::Slow {
            factor: 0.5,
            duration: 0.5,
        },
        DamageSource::NONE,
        RULES,
    );
    a.tick_status(0.5, |_| true);
    assert!(a.status.slow.is_none());
    assert_eq!(a.stats.speed, 100.0);
    assert!(a.status.original_speed.is_none());
}

// -----------------------------------------------------------------------------
// Bosses
// -----------------------------------------------------------------------------

#[test]
fn bosses_ignore_crowd_control() {
    let mut boss = Combatant::boss(500.0, 30.0, 60.0);
    for application in [
        StatusApplication::Stun { duration: 2.0 },
        StatusApplication::Slow {
            factor: 0.3,
            duration: 2.0,
        },
        StatusApplication::Freeze { duration: 2.0 },
    ] {
        assert_eq!(boss.apply_status(application, DamageSource::NONE, RULES), ApplyOutcome::Immune);
    }
    assert!(boss.status.is_empty());
    assert_eq!(boss.stats.speed, 60.0);
}

#[test]
fn bosses_take_scaled_dots() {
    let mut boss = Combatant::boss(500.0, 30.0, 60.0);
    boss.apply_status(burn(4.0, 2.0), DamageSource::NONE, RULES);
    assert_eq!(boss.status.burn.unwrap().damage, 2.0);
}

// -----------------------------------------------------------------------------
// Traps
// -----------------------------------------------------------------------------

#[test]
fn trap_restores_exact_speed_and_behavior() {
    let mut world = World::new();
    let trap = world.spawn_empty().id();
    let mut a = Combatant::enemy(10.0, 12.0, 70.0);

    let outcome = a.apply_status(
        StatusApplication::Trap { duration: 2.0 },
        DamageSource::player(Some(trap)),
        RULES,
    );
    assert_eq!(outcome, ApplyOutcome::Created);
    assert_eq!(a.stats.speed, 0.0);
    assert_eq!(a.movement.overriding, Some(MovementOverride::Trapped { by: trap }));

    let report = a.tick_status(0.5, |_| true);
    assert_eq!(report.released_trap, None);
    assert!(a.is_trapped());

    let report = a.tick_status(0.1, |_| false);
    assert_eq!(report.released_trap, Some(trap));
    assert_eq!(a.stats.speed, 70.0);
    assert_eq!(a.movement.overriding, None);
    assert_eq!(a.movement.behavior, MovementBehavior::Chase);
}

#[test]
fn second_trap_and_sourceless_trap_are_rejected() {
    let mut world = World::new();
    let first = world.spawn_empty().id();
    let second = world.spawn_empty().id();
    let mut a = grunt();

    let trap = StatusApplication::Trap { duration: 1.0 };
    assert_eq!(a.apply_status(trap, DamageSource::NONE, RULES), ApplyOutcome::Rejected);
    assert_eq!(a.apply_status(trap, DamageSource::player(Some(first)), RULES), ApplyOutcome::Created);
    assert_eq!(a.apply_status(trap, DamageSource::player(Some(second)), RULES), ApplyOutcome::Rejected);
    assert_eq!(a.status.trap.unwrap().by, first);
}

// -----------------------------------------------------------------------------
// Ticking
// -----------------------------------------------------------------------------

#[test]
fn dot_ticks_on_its_interval_then_expires() {
    let mut a = grunt();
    a.apply_status(burn(5.0, 1.0), DamageSource::NONE, RULES);

    let first = a.tick_status(0.25, |_| true);
    assert!(first.dots.is_empty());
    let second = a.tick_status(0.25, |_| true);
    assert_eq!(second.dots.len(), 1);
    assert_eq!(second.dots[0].damage, 5.0);

    let third = a.tick_status(0.5, |_| true);
    assert_eq!(third.dots.len(), 1);
    assert!(a.status.burn.is_none());
}

#[test]
fn dead_actors_reject_everything() {
    let mut a = grunt();
    a.garbage = true;
    assert_eq!(a.apply_status(burn(1.0, 1.0), DamageSource::NONE, RULES), ApplyOutcome::Rejected);
    assert!(a.tick_status(1.0, |_| true).dots.is_empty());
}

#[test]
fn tick_statuses_applies_dot_damage_and_reports_deaths() {
    let mut world = combat_world(0.5);
    ensure_messages::<ActorDied>(&mut world);
    ensure_messages::<SpawnInstanceRequest>(&mut world);

    let mut actor = Combatant::enemy(4.0, 12.0, 50.0);
    actor.apply_status(burn(5.0, 3.0), DamageSource::player(None), RULES);
    let e = world.spawn((actor, Transform::default())).id();

    run_system_once(&mut world, tick_statuses);

    let a = world.get::<Combatant>(e).unwrap();
    assert!(a.garbage);
    assert_eq!(a.health, -1.0);
    assert!(a.status.is_empty());

    let deaths = drain_messages::<ActorDied>(&mut world);
    assert_eq!(deaths.len(), 1);
    assert_eq!(deaths[0].entity, e);
    assert!(deaths[0].killer.from_player);
}

#[test]
fn ephemeral_actors_expire_without_dying() {
    let mut world = combat_world(1.0);
    let e = world
        .spawn((Combatant::spirit(30.0, 100.0, 5.0), Ephemeral { remaining: 0.5 }))
        .id();

    run_system_once(&mut world, expire_ephemeral);

    assert!(world.get::<Combatant>(e).unwrap().garbage);
}
