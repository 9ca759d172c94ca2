use bevy::log::LogPlugin;
use bevy::math::primitives::{Cuboid, Sphere};
use bevy::prelude::*;
use log::{error, info};

use crate::simulation::scenario::Scenario;

/// Component tagging each sphere with its index into Scenario.simulations
#[derive(Component)]
struct SimIndex3(pub usize);

/// World-space → screen-space scaling factor for positions
const SCALE3D: f32 = 10.0;

/// Distance of the camera from the attractor centre
const CAMERA_DISTANCE: f32 = 900.0;

/// Lorenz trajectories orbit around z ≈ rho - 1, centre the view there
const FOCUS: Vec3 = Vec3::new(0.0, 0.0, 25.0 * SCALE3D);

/// Camera turntable speed in radians per second
const ORBIT_SPEED: f32 = 0.15;

fn to_world(p: &nalgebra::Vector3<f64>) -> Vec3 {
    Vec3::new(p.x as f32, p.y as f32, p.z as f32) * SCALE3D
}

fn sim_color(i: usize, n: usize) -> Color {
    // white -> blue gradient across the ensemble
    let t = if n > 1 { i as f32 / (n - 1) as f32 } else { 0.0 };
    Color::srgb(1.0 - 0.7 * t, 1.0 - 0.5 * t, 1.0)
}

pub fn run_3d(scenario: Scenario) {
    info!("run_3d: starting Bevy 3D viewer with {} simulations", scenario.simulations.len());

    App::new()
        .insert_resource(scenario)
        .add_plugins(DefaultPlugins.build().disable::<LogPlugin>())
        .add_systems(Startup, setup_3d)
        .add_systems(Update, (physics_step_3d, sync_transforms_3d, draw_trails_3d, orbit_camera).chain())
        .run();
}

/// Startup system: spawn camera, axes and one sphere per simulation
fn setup_3d(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    scenario: Res<Scenario>,
) {
    commands.spawn(Camera3dBundle {
        camera: Camera {
            clear_color: ClearColorConfig::Custom(Color::srgb(0.0, 0.0, 0.0)),
            ..Default::default()
        },
        transform: Transform::from_xyz(CAMERA_DISTANCE, 0.0, FOCUS.z).looking_at(FOCUS, Vec3::Z),
        ..Default::default()
    });

    spawn_axes(&mut commands, &mut meshes, &mut materials);

    let n = scenario.simulations.len();
    for (i, sim) in scenario.simulations.iter().enumerate() {
        commands.spawn((
            PbrBundle {
                mesh: meshes.add(Sphere::new(0.4 * SCALE3D).mesh()),
                material: materials.add(StandardMaterial {
                    base_color: sim_color(i, n),
                    unlit: true,
                    ..Default::default()
                }),
                transform: Transform::from_translation(to_world(&sim.position())),
                ..Default::default()
            },
            SimIndex3(i),
        ));
    }
}

/// Per-frame integration for every simulation in the scenario
fn physics_step_3d(mut scenario: ResMut<Scenario>, time: Res<Time>) {
    let dt = time.delta_seconds_f64();
    if dt <= 0.0 {
        return;
    }
    if let Err(err) = scenario.advance(dt) {
        error!("physics_step_3d: {err}");
    }
}

fn sync_transforms_3d(scenario: Res<Scenario>, mut query: Query<(&SimIndex3, &mut Transform)>) {
    for (SimIndex3(i), mut transform) in &mut query {
        if let Some(sim) = scenario.simulations.get(*i) {
            transform.translation = to_world(&sim.position());
        }
    }
}

fn draw_trails_3d(scenario: Res<Scenario>, mut gizmos: Gizmos) {
    let n = scenario.simulations.len();
    for (i, sim) in scenario.simulations.iter().enumerate() {
        if let Some(trail) = sim.trail() {
            if trail.len() > 1 {
                gizmos.linestrip(trail.iter().map(to_world), sim_color(i, n));
            }
        }
    }
}

fn orbit_camera(time: Res<Time>, mut query: Query<&mut Transform, With<Camera3d>>) {
    let angle = time.elapsed_seconds() * ORBIT_SPEED;
    for mut transform in &mut query {
        let eye = FOCUS + Vec3::new(angle.cos() * CAMERA_DISTANCE, angle.sin() * CAMERA_DISTANCE, 0.0);
        *transform = Transform::from_translation(eye).looking_at(FOCUS, Vec3::Z);
    }
}

// =========================================================================================
// Draw 3D axes for visual reference
// =========================================================================================

fn spawn_axes(commands: &mut Commands, meshes: &mut Assets<Mesh>, materials: &mut Assets<StandardMaterial>) {
    let axis_len = 60.0 * SCALE3D;
    let axis_thickness = 0.05 * SCALE3D;

    let axes = [
        (Cuboid::new(axis_len, axis_thickness, axis_thickness), Color::srgb(1.0, 0.0, 0.0)), // x, red
        (Cuboid::new(axis_thickness, axis_len, axis_thickness), Color::srgb(0.0, 1.0, 0.0)), // y, green
        (Cuboid::new(axis_thickness, axis_thickness, axis_len), Color::srgb(0.0, 0.0, 1.0)), // z, blue
    ];

    for (cuboid, color) in axes {
        commands.spawn(PbrBundle {
            mesh: meshes.add(cuboid.mesh()),
            material: materials.add(StandardMaterial {
                base_color: color,
                unlit: true,
                ..Default::default()
            }),
            // Cuboid is centered at its transform origin, so this puts it crossing the world origin
            transform: Transform::from_xyz(0.0, 0.0, 0.0),
            ..Default::default()
        });
    }
}
