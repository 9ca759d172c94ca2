use std::time::Instant;

use crate::configuration::config::IntegratorConfig;
use crate::simulation::error::SimResult;
use crate::simulation::params::{DoublePendulumParams, DuffingParams, LorenzParams, PendulumParams};
use crate::simulation::states::{DoublePendulum, Duffing, Lorenz, NVec3, SimulationState, SinglePendulum};
use crate::simulation::trail::Trail;
use crate::simulation::trajectory::Trajectory;

/// One representative of every supported system
fn make_systems() -> SimResult<Vec<SimulationState>> {
    let half_pi = std::f64::consts::FRAC_PI_2;
    Ok(vec![
        SimulationState::PendulumSingle(SinglePendulum::new(PendulumParams::new(2.0, 9.8, 0.1)?, half_pi, 0.0)?),
        SimulationState::PendulumDouble(DoublePendulum::new(
            DoublePendulumParams::new(1.0, 0.9, 1.0, 0.9, 9.8)?,
            half_pi,
            half_pi,
            0.0,
            0.0,
        )?),
        SimulationState::LorenzAttractor(Lorenz::new(LorenzParams::default(), NVec3::new(0.1, 0.0, 0.0))?),
        SimulationState::DuffingOscillator(Duffing::new(
            DuffingParams::new(1.0, -1.0, 0.1, 0.25)?.with_drive(2.5, 2.0)?,
            0.5,
            0.0,
        )?),
    ])
}

/// Per-step cost of each fixed-step scheme, one second of simulated time at 60 fps
pub fn bench_live_step() -> SimResult<()> {
    let steps = 60;
    let dt = 1.0 / 60.0;
    let schemes = [IntegratorConfig::Euler, IntegratorConfig::SemiImplicitEuler, IntegratorConfig::Rk4];

    for system in make_systems()? {
        for scheme in schemes {
            if !system.supports(scheme) {
                continue;
            }

            // Warm up
            let mut state = system.step(0.0, dt, scheme)?;

            let t0 = Instant::now();
            for i in 0..steps {
                state = state.step(i as f64 * dt, dt, scheme)?;
            }
            let per_step = t0.elapsed().as_secs_f64() / steps as f64;

            println!("{:>18}, {:>19}: {:10.3} ns/step", system.name(), scheme.name(), per_step * 1e9);
        }
    }
    Ok(())
}

/// Cost of solving trajectories of growing length up front
/// Paste output directly into a spreadsheet to graph
pub fn bench_precompute() -> SimResult<()> {
    println!("system,t_end,steps,ms");

    for system in make_systems()? {
        for t_end in [5.0, 10.0, 20.0, 40.0, 80.0] {
            let t0 = Instant::now();
            let trajectory = Trajectory::precompute(&system, t_end, 1.0e-9, 1.0e-6)?;
            let ms = t0.elapsed().as_secs_f64() * 1000.0;

            println!("{},{},{},{:.6}", system.name(), t_end, trajectory.steps(), ms);
        }
    }
    Ok(())
}

/// Recording cost into full bounded trails of different sizes
pub fn bench_trail() -> SimResult<()> {
    let records = 100_000;

    for max_length in [30, 300, 3_000, 30_000] {
        let mut trail = Trail::bounded(max_length)?;

        let t0 = Instant::now();
        for i in 0..records {
            let x = i as f64;
            trail.record(NVec3::new(x.sin(), x.cos(), 0.0));
        }
        let per_record = t0.elapsed().as_secs_f64() / records as f64;

        println!("max_length = {max_length:6}, record = {:8.3} ns", per_record * 1e9);
    }
    Ok(())
}
