use std::f64::consts::{FRAC_PI_2, PI};

use chaosim::geometry::hilbert::MAX_ORDER;
use chaosim::simulation::dynamics::Dynamics;
use chaosim::simulation::integrator::{integrate_step, semi_implicit_euler_step};
use chaosim::simulation::params::MAX_FRAMES;
use chaosim::{
    hilbert_curve, recaman_arcs, recaman_sequence, DoublePendulum, DoublePendulumParams, Duffing, DuffingParams,
    GeometryError, IntegratorConfig, Lorenz, LorenzParams, NVec2, NVec3, Parameters, PendulumParams, Scenario, ScenarioConfig,
    SimError, SimulationState, Simulation, SinglePendulum, Trail, Trajectory,
};

const DT: f64 = 1.0 / 60.0;

/// Single pendulum with the classic demo constants
pub fn single_pendulum(length: f64, theta: f64, omega: f64, damping: f64) -> SimulationState {
    let params = PendulumParams::new(length, 9.8, 0.1)
        .and_then(|p| p.with_damping(damping))
        .expect("valid pendulum params");
    SimulationState::PendulumSingle(SinglePendulum::new(params, theta, omega).expect("finite state"))
}

pub fn double_pendulum(theta1: f64, theta2: f64) -> SimulationState {
    let params = DoublePendulumParams::new(1.0, 0.9, 1.0, 0.9, 9.8).expect("valid double pendulum params");
    SimulationState::PendulumDouble(DoublePendulum::new(params, theta1, theta2, 0.0, 0.0).expect("finite state"))
}

pub fn lorenz(x: f64, y: f64, z: f64) -> SimulationState {
    SimulationState::LorenzAttractor(Lorenz::new(LorenzParams::default(), NVec3::new(x, y, z)).expect("finite state"))
}

pub fn duffing(stiffness: f64, damping: f64, nonlinearity: f64, x: f64) -> SimulationState {
    let params = DuffingParams::new(1.0, stiffness, damping, nonlinearity).expect("valid duffing params");
    SimulationState::DuffingOscillator(Duffing::new(params, x, 0.0).expect("finite state"))
}

/// Apply `steps` fixed steps of `dt`
pub fn run(state: SimulationState, integrator: IntegratorConfig, dt: f64, steps: usize) -> SimulationState {
    let mut state = state;
    for i in 0..steps {
        state = state.step(i as f64 * dt, dt, integrator).expect("stable step");
    }
    state
}

fn all_finite(state: &SimulationState) -> bool {
    state.coordinates().iter().all(|v| v.is_finite())
}

// ==================================================================================
// Equations of motion
// ==================================================================================

#[test]
fn single_pendulum_first_euler_step() {
    let state = single_pendulum(2.0, FRAC_PI_2, 0.0, 0.0);
    let next = state.step(0.0, DT, IntegratorConfig::Euler).unwrap();

    let c = next.coordinates();
    // omega_1 = (-9.8 * sin(pi/2) / 2) * (1/60)
    assert!((c[1] - (-0.0817)).abs() < 1e-4, "omega after one step: {}", c[1]);
    // explicit Euler moves the angle with the pre-step omega, which is zero
    assert_eq!(c[0], FRAC_PI_2);
}

#[test]
fn single_pendulum_semi_implicit_uses_updated_omega() {
    let state = single_pendulum(2.0, FRAC_PI_2, 0.0, 0.0);
    let next = state.step(0.0, DT, IntegratorConfig::SemiImplicitEuler).unwrap();

    let c = next.coordinates();
    let omega = -9.8 / 2.0 * DT;
    assert!((c[1] - omega).abs() < 1e-12);
    assert!((c[0] - (FRAC_PI_2 + omega * DT)).abs() < 1e-12);
}

#[test]
fn lorenz_initial_derivative() {
    let d = lorenz(0.1, 0.0, 0.0).derivative(0.0);

    assert!((d[0] - (-1.0)).abs() < 1e-12, "x' = {}", d[0]);
    assert!((d[1] - 2.8).abs() < 1e-12, "y' = {}", d[1]);
    assert!(d[2].abs() < 1e-12, "z' = {}", d[2]);
}

#[test]
fn double_pendulum_at_rest_stays_at_rest() {
    let d = double_pendulum(0.0, 0.0).derivative(0.0);
    assert!(d.iter().all(|v| v.abs() < 1e-12), "{:?}", d);
}

#[test]
fn duffing_drive_follows_scene_clock() {
    let params = DuffingParams::new(2.0, 1.0, 0.0, 0.0)
        .and_then(|p| p.with_drive(2.5, 2.0))
        .unwrap();
    let state = SimulationState::DuffingOscillator(Duffing::new(params, 0.0, 0.0).unwrap());

    // f0 cos(0) / m
    assert!((state.derivative(0.0)[1] - 1.25).abs() < 1e-12);
    // cos(2 * pi/4) = 0
    assert!(state.derivative(PI / 4.0)[1].abs() < 1e-12);
}

// ==================================================================================
// Projection
// ==================================================================================

#[test]
fn single_pendulum_projection_uses_pivot() {
    let params = PendulumParams::new(2.0, 9.8, 0.1)
        .and_then(|p| p.with_pivot(NVec2::new(1.0, 3.0)))
        .unwrap();
    let state = SimulationState::PendulumSingle(SinglePendulum::new(params, FRAC_PI_2, 0.0).unwrap());

    let p = state.project();
    assert!((p - NVec3::new(3.0, 3.0, 0.0)).norm() < 1e-12, "{:?}", p);
}

#[test]
fn double_pendulum_projects_lower_bob() {
    let state = double_pendulum(0.0, 0.0);
    let p = state.project();
    assert!((p - NVec3::new(0.0, -1.9, 0.0)).norm() < 1e-12, "{:?}", p);

    let linkage = state.linkage();
    assert_eq!(linkage.len(), 3);
    assert!((linkage[1] - NVec3::new(0.0, -1.0, 0.0)).norm() < 1e-12);
}

#[test]
fn duffing_projects_phase_space() {
    let params = DuffingParams::new(1.0, 1.0, 0.0, 0.0).unwrap();
    let state = SimulationState::DuffingOscillator(Duffing::new(params, 0.5, -0.25).unwrap());
    assert_eq!(state.project(), NVec3::new(0.5, -0.25, 0.0));
    assert!(state.linkage().is_empty());
}

// ==================================================================================
// Stability and energy
// ==================================================================================

#[test]
fn lightly_damped_systems_stay_finite() {
    let cases = [
        (single_pendulum(2.0, 0.1, 0.0, 0.2), IntegratorConfig::Euler),
        (single_pendulum(2.0, 0.1, 0.0, 0.2), IntegratorConfig::Rk4),
        (duffing(1.0, 0.1, 0.25, 0.5), IntegratorConfig::SemiImplicitEuler),
        (double_pendulum(0.1, 0.1), IntegratorConfig::Rk4),
    ];

    for (state, integrator) in cases {
        let end = run(state, integrator, DT, 10_000);
        assert!(all_finite(&end), "{} with {} blew up", end.name(), integrator.name());
        assert!(end.coordinates()[0].abs() < 0.2, "{} amplitude grew", end.name());
    }
}

#[test]
fn euler_energy_growth_per_step_is_bounded() {
    let eps = 1e-5;
    let dt = 1e-3;
    let mut state = single_pendulum(2.0, 0.5, 0.0, 0.0);

    for i in 0..1000 {
        let before = state.energy().unwrap();
        state = state.step(i as f64 * dt, dt, IntegratorConfig::Euler).unwrap();
        let after = state.energy().unwrap();
        assert!(after - before <= eps, "step {i}: energy rose by {}", after - before);
    }
}

#[test]
fn rk4_conserves_double_pendulum_energy() {
    let dt = 1e-3;
    let mut state = double_pendulum(0.3, -0.2);
    let e0 = state.energy().unwrap();

    for i in 0..2000 {
        let before = state.energy().unwrap();
        state = state.step(i as f64 * dt, dt, IntegratorConfig::Rk4).unwrap();
        let after = state.energy().unwrap();
        assert!((after - before).abs() <= 1e-8, "step {i}: energy changed by {}", after - before);
    }
    assert!((state.energy().unwrap() - e0).abs() < 1e-6);
}

#[test]
fn semi_implicit_euler_keeps_duffing_energy_bounded() {
    let dt = 1e-2;
    let mut state = duffing(1.0, 0.0, 0.25, 1.0);
    let e0 = state.energy().unwrap();

    for i in 0..10_000 {
        state = state.step(i as f64 * dt, dt, IntegratorConfig::SemiImplicitEuler).unwrap();
        let e = state.energy().unwrap();
        assert!((e - e0).abs() < 0.05 * e0, "step {i}: energy drifted to {e} from {e0}");
    }
}

#[test]
fn lorenz_has_no_energy() {
    assert_eq!(lorenz(1.0, 1.0, 1.0).energy(), None);
}

#[test]
fn identical_runs_are_bit_identical() {
    let a = run(double_pendulum(FRAC_PI_2, FRAC_PI_2), IntegratorConfig::Euler, DT, 500);
    let b = run(double_pendulum(FRAC_PI_2, FRAC_PI_2), IntegratorConfig::Euler, DT, 500);
    assert_eq!(a.coordinates(), b.coordinates());
}

#[test]
fn step_does_not_mutate_input() {
    let state = double_pendulum(1.0, 0.5);
    let copy = state;
    let _ = state.step(0.0, DT, IntegratorConfig::Rk4).unwrap();
    assert_eq!(state, copy);
}

// ==================================================================================
// Validation and failure semantics
// ==================================================================================

#[test]
fn non_positive_parameters_are_rejected() {
    assert_eq!(
        PendulumParams::new(0.0, 9.8, 1.0),
        Err(SimError::NonPositiveParameter { name: "length", value: 0.0 })
    );
    assert_eq!(
        DoublePendulumParams::new(1.0, 1.0, 1.0, -2.0, 9.8),
        Err(SimError::NonPositiveParameter { name: "mass2", value: -2.0 })
    );
    assert!(matches!(
        LorenzParams::new(10.0, f64::NAN, 8.0 / 3.0),
        Err(SimError::NonFiniteParameter { name: "rho", .. })
    ));
    assert!(matches!(
        DuffingParams::new(1.0, 1.0, -0.1, 0.0),
        Err(SimError::NegativeParameter { name: "damping", .. })
    ));
    // negative stiffness is a valid double-well potential
    assert!(DuffingParams::new(1.0, -1.0, 0.1, 0.25).is_ok());
}

#[test]
fn non_finite_initial_state_is_rejected() {
    let params = PendulumParams::new(1.0, 9.8, 1.0).unwrap();
    assert!(matches!(
        SinglePendulum::new(params, f64::INFINITY, 0.0),
        Err(SimError::NonFiniteInitialState { index: 0, .. })
    ));
}

#[test]
fn bad_time_steps_are_rejected() {
    let state = single_pendulum(1.0, 0.1, 0.0, 0.0);
    for dt in [0.0, -DT, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            state.step(0.0, dt, IntegratorConfig::Euler),
            Err(SimError::InvalidTimeStep(_))
        ));
    }

    let mut sim = Simulation::live(state, IntegratorConfig::Euler).unwrap();
    assert!(matches!(sim.advance(0.0), Err(SimError::InvalidTimeStep(_))));
    assert!(!sim.is_halted());
}

#[test]
fn semi_implicit_euler_rejects_lorenz() {
    let params = LorenzParams::default();
    let y = NVec3::new(1.0, 1.0, 1.0);
    assert!(matches!(
        semi_implicit_euler_step(&params, 0.0, &y, DT),
        Err(SimError::UnsupportedScheme { .. })
    ));
    assert!(matches!(
        Simulation::live(lorenz(1.0, 1.0, 1.0), IntegratorConfig::SemiImplicitEuler),
        Err(SimError::UnsupportedScheme { .. })
    ));
}

#[test]
fn instability_halts_simulation_at_last_finite_state() {
    let mut sim = Simulation::live(lorenz(1.0, 1.0, 1.0), IntegratorConfig::Euler).unwrap();

    let mut failure = None;
    for _ in 0..1000 {
        if let Err(err) = sim.advance(1.0) {
            failure = Some(err);
            break;
        }
    }

    assert!(matches!(failure, Some(SimError::NonFiniteState { .. })), "{:?}", failure);
    assert!(sim.is_halted());
    assert!(all_finite(sim.state()));
    assert_eq!(sim.advance(DT), Err(SimError::Halted));
}

#[test]
fn integrate_step_reports_component_of_blow_up() {
    let params = LorenzParams::default();
    let y = NVec3::new(1e200, 1e200, 1e200);
    let err = integrate_step(&params, IntegratorConfig::Euler, 0.0, &y, 1.0).unwrap_err();
    assert!(matches!(err, SimError::NonFiniteState { t, .. } if t == 1.0), "{err}");
}

// ==================================================================================
// Trail tests
// ==================================================================================

#[test]
fn bounded_trail_keeps_latest_points_in_order() {
    let mut trail = Trail::bounded(5).unwrap();
    for i in 0..12 {
        trail.record(NVec3::new(i as f64, 0.0, 0.0));
    }

    assert_eq!(trail.len(), 5);
    let xs: Vec<f64> = trail.iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![7.0, 8.0, 9.0, 10.0, 11.0]);
    assert_eq!(trail.latest(), Some(&NVec3::new(11.0, 0.0, 0.0)));
}

#[test]
fn unbounded_trail_keeps_everything() {
    let mut trail = Trail::unbounded();
    for i in 0..1000 {
        trail.record(NVec3::new(i as f64, 0.0, 0.0));
    }
    assert_eq!(trail.len(), 1000);
    assert_eq!(trail.max_length(), None);
}

#[test]
fn zero_length_trail_is_rejected() {
    assert_eq!(Trail::bounded(0), Err(SimError::InvalidTrailLength));
}

#[test]
fn simulation_records_one_point_per_frame() {
    let mut sim = Simulation::live(single_pendulum(2.0, 1.0, 0.0, 0.0), IntegratorConfig::Euler)
        .unwrap()
        .with_trail(Trail::bounded(30).unwrap());
    assert_eq!(sim.trail().unwrap().len(), 1);

    for _ in 0..10 {
        sim.advance(DT).unwrap();
    }
    assert_eq!(sim.trail().unwrap().len(), 11);

    for _ in 0..100 {
        sim.advance(DT).unwrap();
    }
    let trail = sim.trail().unwrap();
    assert_eq!(trail.len(), 30);
    assert_eq!(trail.latest(), Some(&sim.position()));
}

// ==================================================================================
// Driver tests
// ==================================================================================

#[test]
fn sub_steps_split_the_frame() {
    let state = double_pendulum(1.0, 0.5);
    let mut sim = Simulation::live(state, IntegratorConfig::Euler)
        .unwrap()
        .with_sub_steps(2)
        .unwrap();
    sim.advance(DT).unwrap();

    let h = DT * 1.0 / 2.0;
    let manual = state
        .step(0.0, h, IntegratorConfig::Euler)
        .and_then(|s| s.step(h, h, IntegratorConfig::Euler))
        .unwrap();

    assert_eq!(sim.state(), &manual);
    assert!((sim.time() - DT).abs() < 1e-15);
}

#[test]
fn speed_scales_the_clock() {
    let mut sim = Simulation::live(single_pendulum(1.0, 0.2, 0.0, 0.0), IntegratorConfig::Rk4)
        .unwrap()
        .with_speed(2.0)
        .unwrap();
    for _ in 0..3 {
        sim.advance(DT).unwrap();
    }
    assert!((sim.time() - 6.0 * DT).abs() < 1e-12);

    let sim = Simulation::live(single_pendulum(1.0, 0.2, 0.0, 0.0), IntegratorConfig::Rk4).unwrap();
    assert_eq!(sim.clone().with_speed(0.0).unwrap_err(), SimError::InvalidSpeed(0.0));
    assert_eq!(sim.with_sub_steps(0).unwrap_err(), SimError::InvalidSubSteps);
}

// ==================================================================================
// Precomputed trajectory tests
// ==================================================================================

#[test]
fn precomputed_pendulum_matches_fine_rk4() {
    let state = single_pendulum(2.0, 1.0, 0.0, 0.0);
    let trajectory = Trajectory::precompute(&state, 5.0, 1e-9, 1e-6).unwrap();
    assert!((trajectory.t_end() - 5.0).abs() < 1e-12);

    let dt: f64 = 1e-4;
    for t in [1.0, 2.5, 5.0] {
        let steps = (t / dt).round() as usize;
        let reference = run(state, IntegratorConfig::Rk4, dt, steps);
        let sampled = trajectory.sample(t).unwrap();

        for (a, b) in sampled.coordinates().iter().zip(reference.coordinates()) {
            assert!((a - b).abs() < 1e-4, "t = {t}: {a} vs {b}");
        }
    }
}

#[test]
fn precomputed_lorenz_matches_fine_rk4() {
    let state = lorenz(0.1, 0.0, 0.0);
    let trajectory = Trajectory::precompute(&state, 1.0, 1e-9, 1e-6).unwrap();

    let reference = run(state, IntegratorConfig::Rk4, 1e-4, 10_000);
    let sampled = trajectory.position(1.0).unwrap();
    assert!((sampled - reference.project()).norm() < 1e-3, "{:?} vs {:?}", sampled, reference.project());
}

#[test]
fn precompute_rejects_empty_span() {
    let state = single_pendulum(1.0, 0.3, 0.0, 0.0);
    assert_eq!(
        Trajectory::precompute(&state, 0.0, 1e-9, 1e-6).unwrap_err(),
        SimError::InvalidTimeSpan(0.0)
    );
    assert!(matches!(
        Trajectory::precompute(&state, -1.0, 1e-9, 1e-6),
        Err(SimError::InvalidTimeSpan(_))
    ));
    assert!(matches!(
        Trajectory::precompute(&state, 1.0, 0.0, 1e-6),
        Err(SimError::InvalidTolerance { name: "atol", .. })
    ));
}

#[test]
fn sampling_outside_span_fails() {
    let trajectory = Trajectory::precompute(&single_pendulum(1.0, 0.3, 0.0, 0.0), 2.0, 1e-9, 1e-6).unwrap();
    assert!(matches!(trajectory.sample(-0.1), Err(SimError::SampleOutOfRange { .. })));
    assert!(matches!(trajectory.sample(2.5), Err(SimError::SampleOutOfRange { .. })));
    assert!(trajectory.sample(0.0).is_ok());
    assert!(trajectory.steps() > 0);
}

#[test]
fn precomputed_sample_at_zero_is_initial_state() {
    let state = duffing(-1.0, 0.1, 0.25, 0.5);
    let trajectory = Trajectory::precompute(&state, 3.0, 1e-9, 1e-6).unwrap();
    assert_eq!(trajectory.sample(0.0).unwrap(), state);
}

#[test]
fn precompute_ends_exactly_on_short_spans() {
    // systems at rest grow the step geometrically, so the last step is clamped
    // from far below t_end and must still land on it
    let at_rest = Trajectory::precompute(&single_pendulum(1.0, 0.0, 0.0, 0.0), 0.053, 1e-9, 1e-6).unwrap();
    assert_eq!(at_rest.t_end(), 0.053);
    assert_eq!(at_rest.sample(0.053).unwrap().coordinates(), &[0.0, 0.0]);

    let origin = Trajectory::precompute(&lorenz(0.0, 0.0, 0.0), 0.057, 1e-9, 1e-6).unwrap();
    assert_eq!(origin.t_end(), 0.057);

    let swinging = Trajectory::precompute(&single_pendulum(1.0, 0.3, 0.0, 0.0), 1.0, 1e-9, 1e-6).unwrap();
    assert_eq!(swinging.t_end(), 1.0);
}

#[test]
fn precomputed_playback_holds_final_state() {
    let mut sim = Simulation::precomputed(single_pendulum(1.0, 0.3, 0.0, 0.0), 1.0, 1e-9, 1e-6).unwrap();

    for _ in 0..30 {
        sim.advance(DT).unwrap();
    }
    assert!(!sim.is_finished());
    assert!((sim.time() - 30.0 * DT).abs() < 1e-12);

    for _ in 0..100 {
        sim.advance(DT).unwrap();
    }
    assert!(sim.is_finished());
    assert_eq!(sim.time(), 1.0);
}

// ==================================================================================
// Scenario tests
// ==================================================================================

const SCENARIO_YAML: &str = r#"
parameters:
  dt: 0.1
  t_end: 1.0

systems:
  - model:
      kind: pendulum_single
      length: 2.0
      theta: 0.3
    trail_length: 4
  - model:
      kind: pendulum_double
      theta1: 1.0
      theta2: 1.0
    show_trail: false
    ensemble:
      count: 3
      spread: 0.01
"#;

fn parse(yaml: &str) -> ScenarioConfig {
    serde_yaml::from_str(yaml).expect("scenario yaml parses")
}

#[test]
fn scenario_builds_with_defaults_and_ensembles() {
    let scenario = Scenario::build_scenario(parse(SCENARIO_YAML)).unwrap();

    assert_eq!(scenario.engine.integrator, IntegratorConfig::Euler);
    assert_eq!(scenario.parameters.sub_steps, 1);
    assert_eq!(scenario.simulations.len(), 4);
    assert!(!scenario.needs_3d());

    assert_eq!(scenario.simulations[0].trail().unwrap().max_length(), Some(4));
    assert!(scenario.simulations[1].trail().is_none());

    // ensemble member i is shifted by i * spread in both angles
    let c = scenario.simulations[3].state().coordinates();
    assert!((c[0] - 1.02).abs() < 1e-12);
    assert!((c[1] - 1.02).abs() < 1e-12);
}

#[test]
fn scenario_runs_headless_to_t_end() {
    let mut scenario = Scenario::build_scenario(parse(SCENARIO_YAML)).unwrap();

    let mut frames = 0;
    let mut last_time = 0.0;
    scenario
        .run_headless(|i, sim| {
            if i == 0 {
                frames += 1;
                last_time = sim.time();
            }
        })
        .unwrap();

    assert_eq!(frames, 11);
    assert!((last_time - 1.0).abs() < 1e-9);
    assert_eq!(scenario.simulations[0].trail().unwrap().len(), 4);
}

#[test]
fn precomputed_lorenz_scenario_needs_3d() {
    let yaml = r#"
engine:
  strategy: "precomputed"
parameters:
  dt: 0.016666666666666666
  t_end: 2.0
systems:
  - model:
      kind: lorenz_attractor
"#;
    let scenario = Scenario::build_scenario(parse(yaml)).unwrap();
    assert!(scenario.needs_3d());
    let p = scenario.simulations[0].position();
    assert!((p - NVec3::new(0.1, 0.0, 0.0)).norm() < 1e-12);
}

#[test]
fn invalid_scenarios_are_rejected() {
    let zero_trail = SCENARIO_YAML.replace("trail_length: 4", "trail_length: 0");
    assert_eq!(
        Scenario::build_scenario(parse(&zero_trail)).unwrap_err(),
        SimError::InvalidTrailLength
    );

    let zero_ensemble = SCENARIO_YAML.replace("count: 3", "count: 0");
    assert_eq!(
        Scenario::build_scenario(parse(&zero_ensemble)).unwrap_err(),
        SimError::InvalidEnsembleCount
    );

    let zero_dt = SCENARIO_YAML.replace("dt: 0.1", "dt: 0.0");
    assert_eq!(
        Scenario::build_scenario(parse(&zero_dt)).unwrap_err(),
        SimError::InvalidTimeStep(0.0)
    );

    let bad_length = SCENARIO_YAML.replace("length: 2.0", "length: -2.0");
    assert!(matches!(
        Scenario::build_scenario(parse(&bad_length)),
        Err(SimError::NonPositiveParameter { name: "length", .. })
    ));

    let unknown = SCENARIO_YAML.replace("kind: pendulum_single", "kind: spring_mass");
    assert!(serde_yaml::from_str::<ScenarioConfig>(&unknown).is_err());
}

#[test]
fn shipped_scenarios_build() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");
    for (file, count) in [
        ("pendulum.yaml", 1),
        ("double_pendulum.yaml", 1),
        ("double_pendulum_chaos.yaml", 10),
        ("lorenz.yaml", 3),
        ("duffing.yaml", 1),
    ] {
        let text = std::fs::read_to_string(dir.join(file)).expect("scenario file readable");
        let scenario = Scenario::build_scenario(parse(&text)).unwrap_or_else(|e| panic!("{file}: {e}"));
        assert_eq!(scenario.simulations.len(), count, "{file}");
    }
}

#[test]
fn short_precomputed_scenario_builds() {
    let yaml = r#"
engine:
  strategy: "precomputed"
parameters:
  dt: 0.01
  t_end: 0.057
systems:
  - model:
      kind: lorenz_attractor
      position: [0.0, 0.0, 0.0]
"#;
    let mut scenario = Scenario::build_scenario(parse(yaml)).unwrap();
    scenario.run_headless(|_, _| {}).unwrap();
    assert_eq!(scenario.simulations[0].time(), 0.057);
    assert!(scenario.simulations[0].is_finished());
}

#[test]
fn headless_run_with_too_many_frames_is_rejected() {
    let tiny_dt = SCENARIO_YAML.replace("dt: 0.1", "dt: 1.0e-12");
    assert!(matches!(
        Scenario::build_scenario(parse(&tiny_dt)),
        Err(SimError::TooManyFrames { max: MAX_FRAMES, .. })
    ));

    let params = Parameters { dt: 0.1, t_end: 1.0, ..Parameters::default() };
    assert!(params.validate().is_ok());
    assert_eq!(params.frames(), 10);
}

#[test]
fn lorenz_with_semi_implicit_scenario_is_rejected() {
    let yaml = r#"
engine:
  integrator: "semi_implicit_euler"
parameters:
  dt: 0.01
  t_end: 1.0
systems:
  - model:
      kind: lorenz_attractor
"#;
    assert!(matches!(
        Scenario::build_scenario(parse(yaml)),
        Err(SimError::UnsupportedScheme { .. })
    ));
}

// ==================================================================================
// Geometry tests
// ==================================================================================

#[test]
fn hilbert_order_one_opens_downward() {
    let points = hilbert_curve(1).unwrap();
    let expected = [
        NVec2::new(-0.5, 0.5),
        NVec2::new(-0.5, -0.5),
        NVec2::new(0.5, -0.5),
        NVec2::new(0.5, 0.5),
    ];
    assert_eq!(points.len(), 4);
    for (p, e) in points.iter().zip(expected.iter()) {
        assert!((p - e).norm() < 1e-12, "{:?} vs {:?}", p, e);
    }
}

#[test]
fn hilbert_visits_each_cell_with_unit_moves() {
    let order = 3;
    let points = hilbert_curve(order).unwrap();
    assert_eq!(points.len(), 64);

    let cell = 2.0 / 8.0;
    for w in points.windows(2) {
        assert!(((w[1] - w[0]).norm() - cell).abs() < 1e-12);
    }

    let mut cells: Vec<(i64, i64)> = points
        .iter()
        .map(|p| (((p.x + 1.0) / cell).floor() as i64, ((p.y + 1.0) / cell).floor() as i64))
        .collect();
    cells.sort();
    cells.dedup();
    assert_eq!(cells.len(), 64);
}

#[test]
fn hilbert_rejects_bad_order() {
    assert!(matches!(hilbert_curve(0), Err(GeometryError::InvalidOrder { order: 0, .. })));
    // rejected before anything is allocated
    assert_eq!(
        hilbert_curve(MAX_ORDER + 1).unwrap_err(),
        GeometryError::InvalidOrder { order: MAX_ORDER + 1, max: 12 }
    );
    assert!(hilbert_curve(15).is_err());
}

#[test]
fn recaman_sequence_prefix() {
    assert_eq!(recaman_sequence(10), vec![0, 1, 3, 6, 2, 7, 13, 20, 12, 21, 11]);
}

#[test]
fn recaman_arcs_alternate_sides() {
    let arcs = recaman_arcs(20);
    assert_eq!(arcs.len(), 20);
    for w in arcs.windows(2) {
        assert_ne!(w[0].upper, w[1].upper);
        assert_eq!(w[0].end, w[1].start);
    }

    let first = arcs[0];
    assert!((first.radius() - 0.5).abs() < 1e-12);
    let points = first.points(8);
    assert_eq!(points.len(), 9);
    assert!((points[0] - NVec2::new(0.0, 0.0)).norm() < 1e-12);
    assert!((points[8] - NVec2::new(1.0, 0.0)).norm() < 1e-12);
}

#[test]
fn dynamics_names_are_distinct() {
    let names = [
        PendulumParams::new(1.0, 9.8, 1.0).unwrap().name(),
        DoublePendulumParams::new(1.0, 1.0, 1.0, 1.0, 9.8).unwrap().name(),
        LorenzParams::default().name(),
        DuffingParams::new(1.0, 1.0, 0.0, 0.0).unwrap().name(),
    ];
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            assert_ne!(names[i], names[j]);
        }
    }
}
