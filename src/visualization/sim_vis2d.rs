use bevy::log::LogPlugin;
use bevy::math::primitives::Circle;
use bevy::prelude::*;
use bevy::sprite::{MaterialMesh2dBundle, Mesh2dHandle};
use log::{error, info};

use crate::simulation::scenario::Scenario;

#[derive(Component)]
struct SimIndex(pub usize);

/// Tracks which simulations already reported an error so the log is not
/// flooded every frame
#[derive(Default)]
struct ReportedErrors(Vec<bool>);

const SCALE: f32 = 100.0;
const BOB_RADIUS: f32 = 8.0;

const PALETTE: [Color; 5] = [
    Color::srgb(1.0, 0.6, 0.2), // orange
    Color::srgb(0.3, 0.6, 1.0), // blue
    Color::srgb(1.0, 0.9, 0.3), // yellow
    Color::srgb(0.4, 0.9, 0.4), // green
    Color::srgb(1.0, 0.4, 0.4), // red
];

fn to_screen(p: &nalgebra::Vector3<f64>) -> Vec2 {
    Vec2::new(p.x as f32 * SCALE, p.y as f32 * SCALE)
}

pub fn run_2d(scenario: Scenario) {
    info!("run_2d: starting Bevy 2D viewer with {} simulations", scenario.simulations.len());

    App::new()
        .insert_resource(scenario)
        .add_plugins(DefaultPlugins.build().disable::<LogPlugin>())
        .add_systems(Startup, setup_bobs_system)
        .add_systems(Update, (physics_step_system, sync_transforms_system, draw_linkage_system).chain())
        .run();
}

fn setup_bobs_system(
    mut commands: Commands,
    scenario: Res<Scenario>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.spawn(Camera2dBundle::default());

    for (i, sim) in scenario.simulations.iter().enumerate() {
        let p = to_screen(&sim.position());

        commands.spawn((
            MaterialMesh2dBundle {
                mesh: Mesh2dHandle(meshes.add(Circle::new(BOB_RADIUS))),
                material: materials.add(ColorMaterial::from(PALETTE[i % PALETTE.len()])),
                transform: Transform::from_xyz(p.x, p.y, 1.0),
                ..Default::default()
            },
            SimIndex(i),
        ));
    }
}

/// Per-frame callback: hand the frame's elapsed time to every simulation
fn physics_step_system(
    mut scenario: ResMut<Scenario>,
    time: Res<Time>,
    mut reported: Local<ReportedErrors>,
) {
    let dt = time.delta_seconds_f64();
    if dt <= 0.0 {
        return;
    }

    let n = scenario.simulations.len();
    reported.0.resize(n, false);

    for (i, sim) in scenario.simulations.iter_mut().enumerate() {
        if sim.is_halted() {
            continue;
        }
        if let Err(err) = sim.advance(dt) {
            if !reported.0[i] {
                error!("simulation {i} ({}): {err}", sim.state().name());
                reported.0[i] = true;
            }
        }
    }
}

fn sync_transforms_system(scenario: Res<Scenario>, mut query: Query<(&SimIndex, &mut Transform)>) {
    for (SimIndex(i), mut transform) in &mut query {
        if let Some(sim) = scenario.simulations.get(*i) {
            let p = to_screen(&sim.position());
            transform.translation.x = p.x;
            transform.translation.y = p.y;
        }
    }
}

/// Rods and trails are redrawn every frame with gizmos
fn draw_linkage_system(scenario: Res<Scenario>, mut gizmos: Gizmos) {
    for (i, sim) in scenario.simulations.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];

        let linkage = sim.state().linkage();
        if linkage.len() > 1 {
            gizmos.linestrip_2d(linkage.iter().map(to_screen), Color::WHITE);
        }

        if let Some(trail) = sim.trail() {
            if trail.len() > 1 {
                gizmos.linestrip_2d(trail.iter().map(to_screen), color);
            }
        }
    }
}
