//! Headless physics factory demo
//!
//! Drops crates onto a pair of conveyor belts that feed them through a wind
//! tunnel, past a magnet and into a water tank. Positions are logged instead
//! of rendered.
//!
//! Usage: `physics_factory [config.toml|config.ron]`

use rust_physics::prelude::*;

const FRAMES: u32 = 900;
const FRAME_TIME: f32 = 1.0 / 60.0;
const CRATE_SIZE: f32 = 12.0;
const MAX_CRATES: usize = 8;
const SPAWN_INTERVAL: u32 = 45;

/// Solid static slab carrying a conveyor surface
fn spawn_conveyor(world: &mut World, position: Vec2, width: f32, speed: f32) -> Entity {
    world
        .spawn()
        .at(position)
        .with(Area::rect(width, 10.0))
        .with(Body::static_body())
        .with(Effector::from(SurfaceEffector::new(speed)))
        .tag("machine")
        .id()
}

fn build_factory(world: &mut World) {
    spawn_conveyor(world, Vec2::new(0.0, 200.0), 240.0, 20.0);
    spawn_conveyor(world, Vec2::new(250.0, 260.0), 160.0, 35.0);

    // Wind tunnel blowing straight up
    world
        .spawn()
        .at(Vec2::new(420.0, 100.0))
        .with(Area::rect(40.0, 200.0))
        .with(Effector::from(AreaEffector::new(-90.0, 450.0)))
        .tag("machine");

    // Magnet pulling crates toward the tank
    world
        .spawn()
        .at(Vec2::new(560.0, 300.0))
        .with(Area::circle(80.0))
        .with(Effector::from(PointEffector::new(40.0).with_mode(ForceMode::InverseLinear)))
        .tag("machine");

    // Water tank with its floor
    world
        .spawn()
        .at(Vec2::new(600.0, 400.0))
        .with(Area::rect(240.0, 120.0))
        .with(Effector::from(BuoyancyEffector::new(400.0, 3.0)))
        .tag("machine");
    world
        .spawn()
        .at(Vec2::new(600.0, 520.0))
        .with(Area::rect(240.0, 10.0))
        .with(Body::static_body());
}

fn spawn_crate(world: &mut World, index: usize) -> Result<Entity, PhysicsError> {
    let crate_entity = world
        .spawn()
        .at(Vec2::new(20.0 + 10.0 * index as f32, 0.0))
        .with(Area::rect(CRATE_SIZE, CRATE_SIZE))
        .with(Body::new().with_max_velocity(400.0))
        .tag("crate")
        .id();

    // Only bodies are solid; triggers just push
    world.on_collide_update(crate_entity, |world, col| {
        if world.body(col.target).is_some() {
            push_out(world, col);
        }
    })?;
    world.on_collide(crate_entity, |_, col| {
        if col.is_top() {
            log::debug!("{:?} landed on {:?}", col.source, col.target);
        }
    })?;

    Ok(crate_entity)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    rust_physics::foundation::logging::try_init_with_default("info")?;

    log::info!("Starting physics factory");

    let mut sim = match std::env::args().nth(1) {
        Some(path) => Simulation::from_config_file(&path)?,
        None => Simulation::new(PhysicsConfig::default().with_gravity(Vec2::new(0.0, 300.0)))?,
    };

    build_factory(&mut sim.world);

    let mut steps = 0u32;
    let mut spawned = 0usize;
    sim.add_system(SystemPhase::FixedUpdate, "spawn_crates", move |world, _, _| {
        if spawned < MAX_CRATES && steps % SPAWN_INTERVAL == 0 {
            match spawn_crate(world, spawned) {
                Ok(entity) => log::info!("Spawned crate {spawned} as {entity:?}"),
                Err(e) => log::error!("Failed to spawn crate: {e}"),
            }
            spawned += 1;
        }
        steps += 1;
    });

    let mut frame = 0u32;
    sim.add_system(SystemPhase::AfterUpdate, "report", move |world, physics, _| {
        frame += 1;
        if frame % 120 != 0 {
            return;
        }
        let stats = physics.last_pass();
        log::info!(
            "Frame {frame}: {} candidate pairs, {} overlapping",
            stats.candidates,
            stats.collisions
        );
        for entity in world.entities().filter(|&e| world.has_tag(e, "crate")) {
            if let (Some(position), Some(body)) = (world.position(entity), world.body(entity)) {
                log::info!(
                    "  {entity:?} at ({:.1}, {:.1}) moving ({:.1}, {:.1}){}",
                    position.x,
                    position.y,
                    body.vel.x,
                    body.vel.y,
                    if body.is_grounded() { " grounded" } else { "" }
                );
            }
        }
    });

    for _ in 0..FRAMES {
        sim.frame(FRAME_TIME);
    }

    log::info!(
        "Simulated {} fixed steps with {} entities",
        sim.clock().total_steps(),
        sim.world.len()
    );
    Ok(())
}
