//! Collision pass scenarios against a live [`World`]

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;

use super::*;
use crate::config::PhysicsConfig;
use crate::ecs::{ComponentKind, Entity, World};
use crate::error::PhysicsError;
use crate::foundation::math::{Transform2D, Vec2};

fn context() -> PhysicsContext {
    PhysicsContext::new(PhysicsConfig::default()).unwrap()
}

/// 10x10 box resting 2 units deep in a wide static platform
fn box_on_platform(world: &mut World) -> (Entity, Entity) {
    let crate_box = world
        .spawn()
        .with(Area::rect(10.0, 10.0))
        .with(Body::new())
        .id();
    let platform = world
        .spawn()
        .at(Vec2::new(-50.0, 8.0))
        .with(Area::rect(100.0, 10.0))
        .with(Body::static_body())
        .id();
    (crate_box, platform)
}

#[test]
fn test_box_on_platform_is_top_and_grounds() {
    let mut world = World::new();
    let mut physics = context();
    let (crate_box, platform) = box_on_platform(&mut world);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    world
        .on_collide_update(crate_box, move |_, col| {
            log.borrow_mut().push((col.target, col.is_top(), col.distance));
        })
        .unwrap();

    let stats = physics.collision_pass(&mut world);
    assert_eq!(stats, PassStats { candidates: 1, collisions: 1 });

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    let (target, is_top, distance) = seen[0];
    assert_eq!(target, platform);
    assert!(is_top);
    assert_relative_eq!(distance, 2.0, epsilon = 1e-3);

    let body = world.get::<Body>(crate_box).unwrap();
    assert!(body.is_grounded());
    assert_eq!(body.cur_platform(), Some(platform));
    assert!(!world.get::<Body>(platform).unwrap().is_grounded());
}

#[test]
fn test_push_out_listener_separates() {
    let mut world = World::new();
    let mut physics = context();
    let (crate_box, platform) = box_on_platform(&mut world);

    world
        .on_collide_update(crate_box, |world, col| {
            push_out(world, col);
        })
        .unwrap();
    physics.collision_pass(&mut world);

    assert_relative_eq!(world.position(crate_box).unwrap(), Vec2::new(0.0, -2.0), epsilon = 1e-3);
    assert!(!physics.check_collision(&mut world, crate_box, platform).unwrap().is_some_and(|c| c.has_overlap()));
}

#[test]
fn test_begin_update_end_events() {
    let mut world = World::new();
    let mut physics = context();
    let (crate_box, platform) = box_on_platform(&mut world);

    let events = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&events);
    world.on_collide(crate_box, move |_, _| log.borrow_mut().push("begin")).unwrap();
    let log = Rc::clone(&events);
    world.on_collide_update(crate_box, move |_, _| log.borrow_mut().push("update")).unwrap();
    let log = Rc::clone(&events);
    world
        .on_collide_end(crate_box, move |_, entity, other| {
            assert_eq!(entity, crate_box);
            assert_eq!(other, platform);
            log.borrow_mut().push("end");
        })
        .unwrap();

    physics.collision_pass(&mut world);
    physics.collision_pass(&mut world);
    assert!(physics.is_colliding(&world, crate_box, platform).unwrap());
    assert_eq!(physics.contacts_of(platform).collect::<Vec<_>>(), [crate_box]);

    world.translate(crate_box, Vec2::new(0.0, -100.0));
    physics.collision_pass(&mut world);
    physics.collision_pass(&mut world);

    assert_eq!(*events.borrow(), ["begin", "update", "update", "end"]);
    assert!(!physics.is_colliding(&world, crate_box, platform).unwrap());
}

#[test]
fn test_ignored_tag_produces_no_events() {
    let mut world = World::new();
    let mut physics = context();
    let player = world
        .spawn()
        .with(Area::circle(5.0).with_collision_ignore(["ghost"]))
        .id();
    let ghost = world
        .spawn()
        .at(Vec2::new(3.0, 0.0))
        .tag("ghost")
        .with(Area::circle(5.0))
        .id();

    let hits = Rc::new(RefCell::new(0));
    for entity in [player, ghost] {
        let hits = Rc::clone(&hits);
        world.on_collide_update(entity, move |_, _| *hits.borrow_mut() += 1).unwrap();
    }

    let stats = physics.collision_pass(&mut world);
    assert_eq!(stats.candidates, 1);
    assert_eq!(stats.collisions, 0);
    assert_eq!(*hits.borrow(), 0);

    // Tags are read every pass
    world.remove_tag(ghost, "ghost");
    physics.collision_pass(&mut world);
    assert_eq!(*hits.borrow(), 2);
}

#[test]
fn test_paused_entity_does_not_collide() {
    let mut world = World::new();
    let mut physics = context();
    let (crate_box, _) = box_on_platform(&mut world);

    world.set_paused(crate_box, true).unwrap();
    assert_eq!(physics.collision_pass(&mut world).collisions, 0);

    world.set_paused(crate_box, false).unwrap();
    assert_eq!(physics.collision_pass(&mut world).collisions, 1);
}

#[test]
fn test_destroy_inside_own_listener() {
    let mut world = World::new();
    let mut physics = context();
    let (crate_box, platform) = box_on_platform(&mut world);

    let after = Rc::new(RefCell::new(0));
    world
        .on_collide(crate_box, |world, col| {
            world.destroy(col.source);
        })
        .unwrap();
    let counter = Rc::clone(&after);
    world.on_collide(crate_box, move |_, _| *counter.borrow_mut() += 1).unwrap();

    let ended = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&ended);
    world
        .on_collide_end(platform, move |_, _, other| log.borrow_mut().push(other))
        .unwrap();

    physics.collision_pass(&mut world);
    assert!(!world.exists(crate_box));
    assert_eq!(*after.borrow(), 0);

    physics.collision_pass(&mut world);
    assert!(!physics.broad_phase().contains(crate_box));
    assert_eq!(*ended.borrow(), [crate_box]);
}

#[test]
fn test_destroy_inside_own_update_listener_with_two_partners() {
    let mut world = World::new();
    let mut physics = context();
    let doomed = world.spawn().with(Area::circle(5.0)).id();
    let left = world.spawn().at(Vec2::new(-6.0, 0.0)).with(Area::circle(5.0)).id();
    let right = world.spawn().at(Vec2::new(6.0, 0.0)).with(Area::circle(5.0)).id();

    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    world
        .on_collide_update(doomed, move |world, col| {
            *counter.borrow_mut() += 1;
            world.destroy(col.source);
        })
        .unwrap();

    let ended = Rc::new(RefCell::new(Vec::new()));
    for partner in [left, right] {
        let log = Rc::clone(&ended);
        world
            .on_collide_end(partner, move |_, entity, other| log.borrow_mut().push((entity, other)))
            .unwrap();
    }

    // The sweep meets (left, doomed) first; the later pair is skipped
    let stats = physics.collision_pass(&mut world);
    assert_eq!(*calls.borrow(), 1);
    assert!(!world.exists(doomed));
    assert_eq!(stats, PassStats { candidates: 2, collisions: 1 });

    let stats = physics.collision_pass(&mut world);
    assert_eq!(*calls.borrow(), 1);
    assert_eq!(stats.candidates, 0);
    assert_eq!(*ended.borrow(), [(left, doomed)]);
}

#[test]
fn test_listener_spawning_affects_next_pass_only() {
    let mut world = World::new();
    let mut physics = context();
    let (crate_box, _) = box_on_platform(&mut world);

    world
        .on_collide(crate_box, |world, _| {
            world.spawn().with(Area::circle(2.0)).at(Vec2::new(5.0, 5.0));
        })
        .unwrap();

    physics.collision_pass(&mut world);
    assert_eq!(physics.broad_phase().len(), 2);
    assert_eq!(world.len(), 3);

    physics.collision_pass(&mut world);
    assert_eq!(physics.broad_phase().len(), 3);
}

#[test]
fn test_lifecycle_keeps_index_in_sync() {
    let mut world = World::new();
    let mut physics = context();
    assert!(!physics.is_initialized());

    let a = world.spawn().with(Area::circle(1.0)).id();
    physics.collision_pass(&mut world);
    assert!(physics.is_initialized());
    assert_eq!(physics.broad_phase().len(), 1);

    let b = world.spawn().at(Vec2::new(10.0, 0.0)).id();
    world.insert(b, Area::circle(1.0)).unwrap();
    physics.collision_pass(&mut world);
    assert!(physics.broad_phase().contains(b));

    world.remove::<Area>(a);
    physics.collision_pass(&mut world);
    assert!(!physics.broad_phase().contains(a));
    assert_eq!(physics.broad_phase().len(), 1);

    world.clear_scene();
    physics.collision_pass(&mut world);
    assert!(physics.broad_phase().is_empty());

    let c = world.spawn().with(Area::circle(1.0)).id();
    physics.collision_pass(&mut world);
    assert!(physics.broad_phase().contains(c));
    assert_eq!(physics.broad_phase().len(), 1);
}

#[test]
fn test_missing_area_is_reported() {
    let mut world = World::new();
    let physics = context();
    let bare = world.spawn().id();
    let other = world.spawn().with(Area::circle(1.0)).id();

    assert!(matches!(
        physics.is_colliding(&world, bare, other),
        Err(PhysicsError::MissingComponent { component: ComponentKind::Area, .. })
    ));
    assert!(matches!(
        physics.has_point(&mut world, bare, &Vec2::zeros()),
        Err(PhysicsError::MissingComponent { .. })
    ));

    world.destroy(bare);
    assert!(matches!(
        physics.world_area(&mut world, bare),
        Err(PhysicsError::EntityNotFound(_))
    ));
}

#[test]
fn test_world_area_and_has_point_follow_transform() {
    let mut world = World::new();
    let physics = context();
    let entity = world
        .spawn()
        .at(Vec2::new(100.0, 0.0))
        .with(Area::rect(10.0, 10.0).with_offset(Vec2::new(-5.0, -5.0)))
        .id();

    let bbox = physics.world_area(&mut world, entity).unwrap().bbox();
    assert_relative_eq!(bbox.min, Vec2::new(95.0, -5.0), epsilon = 1e-4);
    assert_relative_eq!(bbox.max, Vec2::new(105.0, 5.0), epsilon = 1e-4);
    assert!(physics.has_point(&mut world, entity, &Vec2::new(101.0, 2.0)).unwrap());
    assert!(!physics.has_point(&mut world, entity, &Vec2::zeros()).unwrap());
}

#[test]
fn test_point_effector_through_pass() {
    let mut world = World::new();
    let mut physics = context();
    world
        .spawn()
        .with(Area::circle(50.0))
        .with(Effector::from(PointEffector::new(10.0)))
        .id();
    let target = world
        .spawn()
        .at(Vec2::new(20.0, 0.0))
        .with(Area::circle(5.0))
        .with(Body::new())
        .id();

    physics.collision_pass(&mut world);

    let force = world.get::<Body>(target).unwrap().force();
    assert_relative_eq!(force, Vec2::new(-5.0, 0.0), epsilon = 1e-3);
}

#[test]
fn test_push_out_all_skips_bodiless_triggers() {
    let mut world = World::new();
    let physics = context();
    let (crate_box, _) = box_on_platform(&mut world);
    world.spawn().with(Area::circle(3.0)).at(Vec2::new(5.0, 5.0));

    assert_eq!(physics.push_out_all(&mut world, crate_box).unwrap(), 1);
    assert_relative_eq!(world.position(crate_box).unwrap(), Vec2::new(0.0, -2.0), epsilon = 1e-3);
}

#[test]
fn test_non_finite_collider_does_not_hide_later_pairs() {
    let mut world = World::new();
    let mut physics = context();
    let first = world.spawn().with(Area::circle(10.0)).id();
    let broken = world.spawn().at(Vec2::new(5.0, 0.0)).with(Area::circle(3.0)).id();
    let last = world.spawn().at(Vec2::new(12.0, 0.0)).with(Area::circle(5.0)).id();

    world.get_mut::<Transform2D>(broken).unwrap().position.x = f32::NAN;
    let stats = physics.collision_pass(&mut world);

    assert!(!physics.broad_phase().contains(broken));
    assert_eq!(stats.collisions, 1);
    assert!(physics.is_colliding(&world, first, last).unwrap());
}

#[test]
fn test_landing_raises_ground_once() {
    let mut world = World::new();
    let mut physics = context();
    let (crate_box, platform) = box_on_platform(&mut world);

    let events = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&events);
    world
        .on_body_event(crate_box, move |_, event| log.borrow_mut().push(event))
        .unwrap();

    for _ in 0..3 {
        physics.collision_pass(&mut world);
        world.get_mut::<Body>(crate_box).unwrap().step(Vec2::zeros(), 1.0 / 60.0);
    }
    assert_eq!(*events.borrow(), [BodyEvent::Ground(platform)]);
}

#[test]
fn test_rising_into_ceiling_raises_headbutt() {
    let mut world = World::new();
    let mut physics = context();
    let mut body = Body::new();
    body.vel = Vec2::new(0.0, -50.0);
    let player = world.spawn().with(Area::rect(10.0, 10.0)).with(body).id();
    let ceiling = world
        .spawn()
        .at(Vec2::new(-50.0, -8.0))
        .with(Area::rect(100.0, 10.0))
        .with(Body::static_body())
        .id();

    let events = Rc::new(RefCell::new(Vec::new()));
    for entity in [player, ceiling] {
        let log = Rc::clone(&events);
        world
            .on_body_event(entity, move |_, event| log.borrow_mut().push((entity, event)))
            .unwrap();
    }

    assert_eq!(physics.collision_pass(&mut world).collisions, 1);
    assert_eq!(*events.borrow(), [(player, BodyEvent::Headbutt(ceiling))]);
    assert!(!world.get::<Body>(player).unwrap().is_grounded());
}

#[test]
fn test_tag_pair_listeners() {
    let mut world = World::new();
    let mut physics = context();
    let player = world.spawn().tag("player").with(Area::circle(5.0)).id();
    let coin = world.spawn().at(Vec2::new(6.0, 0.0)).tag("coin").with(Area::circle(3.0)).id();
    world.spawn().at(Vec2::new(-6.0, 0.0)).tag("wall").with(Area::circle(3.0));

    let events = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&events);
    world.on_collide_tags("player", "coin", move |_, col| {
        log.borrow_mut().push(("begin", col.source, col.target));
    });
    let log = Rc::clone(&events);
    world.on_collide_update_tags("player", "coin", move |_, col| {
        log.borrow_mut().push(("update", col.source, col.target));
    });
    let log = Rc::clone(&events);
    world.on_collide_end_tags("player", "coin", move |_, entity, other| {
        log.borrow_mut().push(("end", entity, other));
    });

    assert_eq!(physics.collision_pass(&mut world).collisions, 2);
    world.translate(coin, Vec2::new(100.0, 0.0));
    physics.collision_pass(&mut world);

    assert_eq!(
        *events.borrow(),
        [("begin", player, coin), ("update", player, coin), ("end", player, coin)]
    );

    world.clear_scene();
    let player = world.spawn().tag("player").with(Area::circle(5.0)).id();
    world.spawn().tag("coin").with(Area::circle(3.0));
    physics.collision_pass(&mut world);
    assert!(world.exists(player));
    assert_eq!(events.borrow().len(), 3);
}

#[test]
fn test_tag_listener_destroying_target() {
    let mut world = World::new();
    let mut physics = context();
    let player = world.spawn().tag("player").with(Area::circle(5.0)).id();
    let coin = world.spawn().at(Vec2::new(6.0, 0.0)).tag("coin").with(Area::circle(3.0)).id();

    let collected = Rc::new(RefCell::new(0));
    let count = Rc::clone(&collected);
    world.on_collide_tags("player", "coin", move |world, col| {
        world.destroy(col.target);
        *count.borrow_mut() += 1;
    });
    let ended = Rc::new(RefCell::new(0));
    let count = Rc::clone(&ended);
    world.on_collide_end_tags("player", "coin", move |_, _, _| *count.borrow_mut() += 1);

    physics.collision_pass(&mut world);
    assert_eq!(*collected.borrow(), 1);
    assert!(!world.exists(coin));

    physics.collision_pass(&mut world);
    assert_eq!(*ended.borrow(), 0);
    assert!(world.exists(player));
}
