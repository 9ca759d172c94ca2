//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – strategy (live / precomputed) and fixed-step integrator
//! - [`ParametersConfig`] – numerical settings shared by every system
//! - [`SystemConfig`]     – one physical system, its trail and optional ensemble
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   strategy: "live"          # or "precomputed"
//!   integrator: "euler"       # or "semi_implicit_euler", "rk4"
//!
//! parameters:
//!   dt: 0.016666666666666666  # fixed step for headless runs
//!   sub_steps: 1              # integration steps per frame
//!   speed: 1.0                # time scale
//!   t_end: 20.0               # total simulation time
//!   atol: 1.0e-9              # absolute error tolerance
//!   rtol: 1.0e-6              # relative error tolerance
//!
//! systems:
//!   - model:
//!       kind: pendulum_single
//!       length: 2.0
//!       theta: 1.5707963267948966
//!     trail_length: 120
//!   - model:
//!       kind: lorenz_attractor
//!       position: [0.1, 0.0, 0.0]
//!     ensemble:
//!       count: 3
//!       spread: 0.001
//! ```
//!
//! Omitted physical constants fall back to the values the classic demos use
//! (g = 9.8, sigma = 10, rho = 28, beta = 8/3).

use serde::Deserialize;

/// Fixed-step scheme used when systems are stepped live
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorConfig {
    #[default]
    #[serde(rename = "euler")] // Explicit Euler, all rates from the pre-step state
    Euler,

    #[serde(rename = "semi_implicit_euler")] // Velocities first, positions with the new velocities. Mechanical systems only
    SemiImplicitEuler,

    #[serde(rename = "rk4")] // Classical 4th-order Runge–Kutta
    Rk4,
}

impl IntegratorConfig {
    pub fn name(&self) -> &'static str {
        match self {
            IntegratorConfig::Euler => "explicit Euler",
            IntegratorConfig::SemiImplicitEuler => "semi-implicit Euler",
            IntegratorConfig::Rk4 => "RK4",
        }
    }
}

/// How systems advance between frames
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyConfig {
    #[default]
    #[serde(rename = "live")] // One integration step (or batch of sub-steps) per frame
    Live,

    #[serde(rename = "precomputed")] // Adaptive solve over [0, t_end], sampled per frame
    Precomputed,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub integrator: IntegratorConfig,
}

fn default_sub_steps() -> u32 { 1 }
fn default_speed() -> f64 { 1.0 }
fn default_atol() -> f64 { 1.0e-9 }
fn default_rtol() -> f64 { 1.0e-6 }
fn default_gravity() -> f64 { 9.8 }
fn default_length() -> f64 { 2.0 }
fn default_bob_mass() -> f64 { 0.1 }
fn default_unit() -> f64 { 1.0 }
fn default_sigma() -> f64 { 10.0 }
fn default_rho() -> f64 { 28.0 }
fn default_beta() -> f64 { 8.0 / 3.0 }
fn default_lorenz_position() -> [f64; 3] { [0.1, 0.0, 0.0] }
fn default_true() -> bool { true }

/// Global numerical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub dt: f64, // fixed time step size
    #[serde(default = "default_sub_steps")]
    pub sub_steps: u32, // integration steps per frame
    #[serde(default = "default_speed")]
    pub speed: f64, // time scale
    pub t_end: f64, // time end
    #[serde(default = "default_atol")]
    pub atol: f64, // absolute error tolerance
    #[serde(default = "default_rtol")]
    pub rtol: f64, // relative error tolerance
}

/// Physical model and initial conditions, tagged by `kind`
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelConfig {
    PendulumSingle {
        #[serde(default = "default_length")]
        length: f64,
        #[serde(default = "default_gravity")]
        gravity: f64,
        #[serde(default = "default_bob_mass")]
        mass: f64,
        #[serde(default)]
        damping: f64,
        #[serde(default)]
        pivot: [f64; 2],
        #[serde(default)]
        theta: f64, // initial angle from the vertical
        #[serde(default)]
        omega: f64, // initial angular velocity
    },
    PendulumDouble {
        #[serde(default = "default_length")]
        length1: f64,
        #[serde(default = "default_length")]
        length2: f64,
        #[serde(default = "default_bob_mass")]
        mass1: f64,
        #[serde(default = "default_bob_mass")]
        mass2: f64,
        #[serde(default = "default_gravity")]
        gravity: f64,
        #[serde(default)]
        pivot: [f64; 2],
        #[serde(default)]
        theta1: f64,
        #[serde(default)]
        theta2: f64,
        #[serde(default)]
        omega1: f64,
        #[serde(default)]
        omega2: f64,
    },
    LorenzAttractor {
        #[serde(default = "default_sigma")]
        sigma: f64,
        #[serde(default = "default_rho")]
        rho: f64,
        #[serde(default = "default_beta")]
        beta: f64,
        #[serde(default = "default_lorenz_position")]
        position: [f64; 3],
    },
    DuffingOscillator {
        #[serde(default = "default_unit")]
        mass: f64,
        #[serde(default = "default_unit")]
        stiffness: f64,
        #[serde(default)]
        damping: f64,
        #[serde(default)]
        nonlinearity: f64,
        #[serde(default)]
        drive_amplitude: f64,
        #[serde(default)]
        drive_frequency: f64,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        v: f64,
    },
}

/// Copies of one system whose first coordinate is offset by `i * spread`
#[derive(Deserialize, Debug, Clone)]
pub struct EnsembleConfig {
    pub count: usize,
    pub spread: f64,
}

/// One system in the scenario
#[derive(Deserialize, Debug, Clone)]
pub struct SystemConfig {
    pub model: ModelConfig,
    #[serde(default = "default_true")]
    pub show_trail: bool, // record a motion trail at all
    #[serde(default)]
    pub trail_length: Option<usize>, // max trail points, unbounded when omitted
    #[serde(default)]
    pub ensemble: Option<EnsembleConfig>,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig, // Strategy and integrator
    pub parameters: ParametersConfig, // Global numerical parameters
    pub systems: Vec<SystemConfig>, // Systems to simulate side by side
}
