use bevy::prelude::*;

use super::*;
use crate::common::test_utils::run_system_once;

#[test]
fn confine_keeps_circles_inside() {
    let area = Rect::new(0.0, 0.0, 100.0, 50.0);
    assert_eq!(confine(area, Vec2::new(50.0, 25.0), 5.0), Vec2::new(50.0, 25.0));
    assert_eq!(confine(area, Vec2::new(-20.0, 80.0), 5.0), Vec2::new(5.0, 45.0));
    assert_eq!(confine(area, Vec2::new(120.0, 25.0), 10.0), Vec2::new(90.0, 25.0));
}

#[test]
fn oversized_circles_sit_at_the_center() {
    let area = Rect::new(0.0, 0.0, 100.0, 10.0);
    assert_eq!(confine(area, Vec2::new(30.0, 9.0), 8.0), Vec2::new(30.0, 5.0));
}

#[test]
fn actors_past_the_edge_are_pulled_back() {
    let mut world = World::new();
    world.insert_resource(PlayArea(Rect::new(-100.0, -100.0, 100.0, 100.0)));
    let stray = world
        .spawn((Combatant::enemy(10.0, 12.0, 50.0), Transform::from_xyz(300.0, 0.0, 2.0)))
        .id();

    run_system_once(&mut world, confine_actors);

    let tf = world.get::<Transform>(stray).unwrap();
    assert_eq!(tf.translation, Vec3::new(88.0, 0.0, 2.0));
}

#[test]
fn no_play_area_leaves_actors_alone() {
    let mut world = World::new();
    let e = world
        .spawn((Combatant::enemy(10.0, 12.0, 50.0), Transform::from_xyz(5000.0, 0.0, 0.0)))
        .id();
    run_system_once(&mut world, confine_actors);
    assert_eq!(world.get::<Transform>(e).unwrap().translation.x, 5000.0);
}
