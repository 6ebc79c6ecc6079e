use std::time::Duration;

use anyhow::{Context, Result};
use glam::Vec2;
use log::info;

use cubefall::engine::game_loop::GameLoop;
use cubefall::engine::physics::{PhysicsWorld, Substrate};
use cubefall::game::{Action, ActionInput, Collaborators, Simulation, SimulationConfig};

/// Demo length in render frames (~12 seconds)
const DEMO_FRAMES: u64 = 720;

/// Scripted key events: (frame, action, pressed)
const SCRIPT: &[(u64, Action, bool)] = &[
    (30, Action::MoveRight, true),
    (150, Action::MoveRight, false),
    (160, Action::Attack, true),
    (161, Action::Attack, false),
    (200, Action::Jump, true),
    (212, Action::Jump, false),
    (225, Action::GroundPound, true),
    (226, Action::GroundPound, false),
    (300, Action::MoveRight, true),
    (420, Action::MoveRight, false),
    (430, Action::Attack, true),
    (431, Action::Attack, false),
];

fn build_level(sim: &mut Simulation<PhysicsWorld>) -> Result<()> {
    // Floor and two walls
    sim.add_platform(Vec2::new(0.0, -0.5), Vec2::new(24.0, 1.0));
    sim.add_platform(Vec2::new(-12.5, 2.5), Vec2::new(1.0, 6.0));
    sim.add_platform(Vec2::new(12.5, 2.5), Vec2::new(1.0, 6.0));

    sim.spawn_player(Vec2::new(-8.0, 1.0))?;
    sim.add_weapon_pickup(Vec2::new(-6.0, 0.25), Vec2::splat(0.4));
    sim.add_pressure_pad(Vec2::new(-2.0, 0.05), Vec2::new(1.0, 0.1));
    sim.add_spikes(Vec2::new(8.0, 0.1), Vec2::new(1.0, 0.2));
    sim.add_spawner(Vec2::new(4.0, 0.5));
    Ok(())
}

/// Stand-in for an external projectile pool: the nearest enemy in the line of fire is hit
fn resolve_shot(sim: &mut Simulation<PhysicsWorld>) -> Result<()> {
    let origin = sim.player_position()?;
    let facing_right = sim.player().map(|p| p.facing_right()).unwrap_or(true);

    let target = sim
        .enemies()
        .all()
        .iter()
        .filter_map(|e| sim.substrate().position(e.body()).map(|p| (e.id, p - origin)))
        .filter(|(_, d)| d.y.abs() < 0.5 && (d.x > 0.0) == facing_right)
        .min_by(|a, b| a.1.x.abs().total_cmp(&b.1.x.abs()))
        .map(|(id, _)| id);

    if let Some(id) = target {
        let outcome = sim.projectile_hit(id, 1.0)?;
        info!("Shot enemy {}: {:?}", id, outcome);
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Cubefall headless demo...");

    let mut sim = Simulation::new(PhysicsWorld::new(), SimulationConfig::default())
        .with_collaborators(Collaborators::logging());
    build_level(&mut sim).context("Failed to build demo level")?;

    let mut game_loop = GameLoop::new();
    let mut input = ActionInput::new();
    let frame_time = Duration::from_micros(16_667);

    for frame in 0..DEMO_FRAMES {
        for &(at, action, pressed) in SCRIPT {
            if at == frame {
                if pressed {
                    input.press(action);
                } else {
                    input.release(action);
                }
            }
        }

        let sampled = input.sample();
        sim.set_input(sampled);
        if sampled.attack_pressed && sim.player().map(|p| p.has_weapon()).unwrap_or(false) {
            resolve_shot(&mut sim)?;
        }

        for _ in 0..game_loop.advance(frame_time) {
            sim.tick(game_loop.fixed_timestep());
        }
    }

    let position = sim.player_position()?;
    let state = sim.player().map(|p| p.state());
    info!(
        "Finished after {} ticks: player {:?} at ({:.2}, {:.2}), {} enemies alive",
        sim.tick_count(),
        state,
        position.x,
        position.y,
        sim.enemies().count()
    );

    Ok(())
}
