//! Build and drive fully-initialized simulation scenarios
//!
//! [`Simulation`] is the per-system driver the renderer talks to: it owns
//! one [`SimulationState`], its clock and its trail, and is advanced once
//! per frame with the elapsed time.
//!
//! [`Scenario`] takes a `ScenarioConfig` (YAML-facing) and produces the
//! runtime bundle:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - one `Simulation` per configured system (ensembles expanded)
//!
//! Scenarios are inserted into Bevy as a `Resource` and consumed by the
//! viewer systems, or run headless to `t_end`.

use bevy::prelude::Resource;
use log::{info, warn};

use crate::configuration::config::{
    IntegratorConfig, ModelConfig, ParametersConfig, ScenarioConfig, StrategyConfig, SystemConfig,
};
use crate::simulation::engine::Engine;
use crate::simulation::error::{SimError, SimResult};
use crate::simulation::params::{
    DoublePendulumParams, DuffingParams, LorenzParams, Parameters, PendulumParams,
};
use crate::simulation::states::{
    CartesianPosition, DoublePendulum, Duffing, Lorenz, NVec2, NVec3, SimulationState, SinglePendulum,
};
use crate::simulation::trail::Trail;
use crate::simulation::trajectory::Trajectory;

#[derive(Debug, Clone)]
enum Mode {
    Live(IntegratorConfig),
    Precomputed(Trajectory),
}

/// Frame-driven owner of one simulated system
#[derive(Debug, Clone)]
pub struct Simulation {
    state: SimulationState,
    t: f64,
    mode: Mode,
    sub_steps: u32,
    speed: f64,
    trail: Option<Trail>,
    halted: bool,
}

impl Simulation {
    /// Step `state` live with `integrator`, one step per `advance`
    pub fn live(state: SimulationState, integrator: IntegratorConfig) -> SimResult<Self> {
        if !state.supports(integrator) {
            return Err(SimError::UnsupportedScheme {
                scheme: integrator.name(),
                system: state.name(),
            });
        }
        Ok(Self::with_mode(state, Mode::Live(integrator)))
    }

    /// Solve `state` over `[0, t_span]` now and play it back on `advance`
    pub fn precomputed(state: SimulationState, t_span: f64, atol: f64, rtol: f64) -> SimResult<Self> {
        let trajectory = Trajectory::precompute(&state, t_span, atol, rtol)?;
        Ok(Self::with_mode(state, Mode::Precomputed(trajectory)))
    }

    fn with_mode(state: SimulationState, mode: Mode) -> Self {
        Self {
            state,
            t: 0.0,
            mode,
            sub_steps: 1,
            speed: 1.0,
            trail: None,
            halted: false,
        }
    }

    pub fn with_trail(mut self, mut trail: Trail) -> Self {
        trail.record(self.state.project());
        self.trail = Some(trail);
        self
    }

    pub fn with_sub_steps(mut self, sub_steps: u32) -> SimResult<Self> {
        if sub_steps == 0 {
            return Err(SimError::InvalidSubSteps);
        }
        self.sub_steps = sub_steps;
        Ok(self)
    }

    pub fn with_speed(mut self, speed: f64) -> SimResult<Self> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(SimError::InvalidSpeed(speed));
        }
        self.speed = speed;
        Ok(self)
    }

    /// Per-frame callback: move the clock forward by `dt * speed` and
    /// record the new position in the trail.
    ///
    /// A non-finite state halts the simulation at its last finite state;
    /// every later call returns `SimError::Halted`.
    pub fn advance(&mut self, dt: f64) -> SimResult<()> {
        if self.halted {
            return Err(SimError::Halted);
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::InvalidTimeStep(dt));
        }

        match &self.mode {
            Mode::Live(integrator) => {
                let h = dt * self.speed / self.sub_steps as f64;
                for _ in 0..self.sub_steps {
                    match self.state.step(self.t, h, *integrator) {
                        Ok(next) => {
                            self.state = next;
                            self.t += h;
                        }
                        Err(err) => {
                            if let SimError::NonFiniteState { .. } = err {
                                warn!("{} halted: {err}", self.state.name());
                                self.halted = true;
                            }
                            return Err(err);
                        }
                    }
                }
            }
            Mode::Precomputed(trajectory) => {
                // Playback holds the final state once the span is used up
                let t = (self.t + dt * self.speed).min(trajectory.t_end());
                self.state = trajectory.sample(t)?;
                self.t = t;
            }
        }

        if let Some(trail) = &mut self.trail {
            trail.record(self.state.project());
        }
        Ok(())
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Simulation clock
    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn position(&self) -> CartesianPosition {
        self.state.project()
    }

    pub fn energy(&self) -> Option<f64> {
        self.state.energy()
    }

    pub fn trail(&self) -> Option<&Trail> {
        self.trail.as_ref()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// True once a precomputed trajectory has been played to its end
    pub fn is_finished(&self) -> bool {
        match &self.mode {
            Mode::Live(_) => false,
            Mode::Precomputed(trajectory) => self.t >= trajectory.t_end(),
        }
    }
}

/// Bevy resource holding every simulated system of a scenario
#[derive(Resource, Debug, Clone)]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub simulations: Vec<Simulation>,
}

fn build_state(model: &ModelConfig) -> SimResult<SimulationState> {
    Ok(match *model {
        ModelConfig::PendulumSingle { length, gravity, mass, damping, pivot, theta, omega } => {
            let params = PendulumParams::new(length, gravity, mass)?
                .with_damping(damping)?
                .with_pivot(NVec2::new(pivot[0], pivot[1]))?;
            SimulationState::PendulumSingle(SinglePendulum::new(params, theta, omega)?)
        }
        ModelConfig::PendulumDouble {
            length1, length2, mass1, mass2, gravity, pivot, theta1, theta2, omega1, omega2,
        } => {
            let params = DoublePendulumParams::new(length1, length2, mass1, mass2, gravity)?
                .with_pivot(NVec2::new(pivot[0], pivot[1]))?;
            SimulationState::PendulumDouble(DoublePendulum::new(params, theta1, theta2, omega1, omega2)?)
        }
        ModelConfig::LorenzAttractor { sigma, rho, beta, position } => {
            let params = LorenzParams::new(sigma, rho, beta)?;
            SimulationState::LorenzAttractor(Lorenz::new(params, NVec3::from(position))?)
        }
        ModelConfig::DuffingOscillator {
            mass, stiffness, damping, nonlinearity, drive_amplitude, drive_frequency, x, v,
        } => {
            let params = DuffingParams::new(mass, stiffness, damping, nonlinearity)?
                .with_drive(drive_amplitude, drive_frequency)?;
            SimulationState::DuffingOscillator(Duffing::new(params, x, v)?)
        }
    })
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> SimResult<Self> {
        // Parameters (runtime) from ParametersConfig
        let ParametersConfig { dt, sub_steps, speed, t_end, atol, rtol } = cfg.parameters;
        let parameters = Parameters { dt, sub_steps, speed, t_end, atol, rtol };
        parameters.validate()?;

        // Engine (runtime) from EngineConfig
        let engine = Engine::from(&cfg.engine);

        let mut simulations = Vec::new();
        for system in &cfg.systems {
            simulations.extend(Self::build_system(system, &engine, &parameters)?);
        }

        info!(
            "built scenario: {} simulations, {:?} strategy, {} integrator",
            simulations.len(),
            engine.strategy,
            engine.integrator.name()
        );

        Ok(Self {
            engine,
            parameters,
            simulations,
        })
    }

    fn build_system(system: &SystemConfig, engine: &Engine, parameters: &Parameters) -> SimResult<Vec<Simulation>> {
        let base = build_state(&system.model)?;

        let (count, spread) = match &system.ensemble {
            Some(e) if e.count == 0 => return Err(SimError::InvalidEnsembleCount),
            Some(e) => (e.count, e.spread),
            None => (1, 0.0),
        };
        if !spread.is_finite() {
            return Err(SimError::NonFiniteParameter { name: "spread", value: spread });
        }

        (0..count)
            .map(|i| {
                let state = base.perturbed(i as f64 * spread)?;
                let sim = match engine.strategy {
                    StrategyConfig::Live => Simulation::live(state, engine.integrator)?,
                    StrategyConfig::Precomputed => {
                        Simulation::precomputed(state, parameters.t_end, parameters.atol, parameters.rtol)?
                    }
                };
                let sim = sim.with_sub_steps(parameters.sub_steps)?.with_speed(parameters.speed)?;

                Ok(match (system.show_trail, system.trail_length) {
                    (false, _) => sim,
                    (true, Some(max)) => sim.with_trail(Trail::bounded(max)?),
                    (true, None) => sim.with_trail(Trail::unbounded()),
                })
            })
            .collect()
    }

    /// Advance every running simulation by `dt`. Halted simulations are
    /// skipped; the first new error is returned after all were attempted.
    pub fn advance(&mut self, dt: f64) -> SimResult<()> {
        let mut first_err = None;
        for sim in self.simulations.iter_mut().filter(|s| !s.is_halted()) {
            if let Err(err) = sim.advance(dt) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Step with the fixed `parameters.dt` until every clock reaches `t_end`,
    /// calling `observe(simulation_index, simulation)` after each frame.
    /// Stops at the first error.
    pub fn run_headless<F>(&mut self, mut observe: F) -> SimResult<()>
    where
        F: FnMut(usize, &Simulation),
    {
        let dt = self.parameters.dt;
        let frames = self.parameters.frames();

        for (i, sim) in self.simulations.iter().enumerate() {
            observe(i, sim);
        }
        for _ in 0..frames {
            self.advance(dt)?;
            for (i, sim) in self.simulations.iter().enumerate() {
                observe(i, sim);
            }
        }
        Ok(())
    }

    /// Whether any system needs the 3D viewer
    pub fn needs_3d(&self) -> bool {
        self.simulations.iter().any(|s| !s.state().is_planar())
    }
}
