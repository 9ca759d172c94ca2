//! Core state types for the simulation.
//!
//! Defines the per-system state (`SystemState`, one alias per supported
//! system) and the closed [`SimulationState`] tagged union the rest of the
//! crate works with.
//!
//! A state is parameters + coordinates. Stepping is pure: `step` returns a
//! new state and leaves the old one untouched.

use nalgebra::{SVector, Vector2, Vector3};

use super::dynamics::Dynamics;
use super::error::{SimError, SimResult};
use super::integrator::{first_non_finite, integrate_step};
use super::params::{DoublePendulumParams, DuffingParams, LorenzParams, PendulumParams};
use crate::configuration::config::IntegratorConfig;

pub type NVec2 = Vector2<f64>;
pub type NVec3 = Vector3<f64>;

/// Point handed to the renderer. Planar systems use z = 0.
pub type CartesianPosition = NVec3;

/// Immutable parameters plus an N-dimensional coordinate vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemState<P, const N: usize> {
    params: P,
    y: SVector<f64, N>,
}

impl<P, const N: usize> SystemState<P, N>
where
    P: Dynamics<N> + Copy,
{
    /// Build from a raw coordinate vector, rejecting non-finite entries
    pub fn from_vector(params: P, y: SVector<f64, N>) -> SimResult<Self> {
        if let Some((index, value)) = first_non_finite(&y) {
            return Err(SimError::NonFiniteInitialState { index, value });
        }
        Ok(Self { params, y })
    }

    pub fn params(&self) -> &P {
        &self.params
    }

    pub fn vector(&self) -> &SVector<f64, N> {
        &self.y
    }

    pub fn derivative(&self, t: f64) -> SVector<f64, N> {
        self.params.derivative(t, &self.y)
    }

    pub fn energy(&self) -> Option<f64> {
        self.params.energy(&self.y)
    }

    pub fn step(&self, t: f64, dt: f64, integrator: IntegratorConfig) -> SimResult<Self> {
        let y = integrate_step(&self.params, integrator, t, &self.y, dt)?;
        Ok(Self { params: self.params, y })
    }

    fn perturbed(&self, indices: &[usize], offset: f64) -> SimResult<Self> {
        let mut y = self.y;
        for &i in indices {
            y[i] += offset;
        }
        Self::from_vector(self.params, y)
    }
}

pub type SinglePendulum = SystemState<PendulumParams, 2>;
pub type DoublePendulum = SystemState<DoublePendulumParams, 4>;
pub type Lorenz = SystemState<LorenzParams, 3>;
pub type Duffing = SystemState<DuffingParams, 2>;

fn planar(p: NVec2) -> NVec3 {
    NVec3::new(p.x, p.y, 0.0)
}

impl SinglePendulum {
    pub fn new(params: PendulumParams, theta: f64, omega: f64) -> SimResult<Self> {
        Self::from_vector(params, SVector::<f64, 2>::new(theta, omega))
    }

    pub fn theta(&self) -> f64 { self.y[0] }
    pub fn omega(&self) -> f64 { self.y[1] }

    /// Angle measured from straight down, counter-clockwise positive
    pub fn bob_position(&self) -> NVec3 {
        let l = self.params.length();
        planar(self.params.pivot() + NVec2::new(l * self.theta().sin(), -l * self.theta().cos()))
    }
}

impl DoublePendulum {
    pub fn new(params: DoublePendulumParams, theta1: f64, theta2: f64, omega1: f64, omega2: f64) -> SimResult<Self> {
        Self::from_vector(params, SVector::<f64, 4>::new(theta1, theta2, omega1, omega2))
    }

    pub fn theta1(&self) -> f64 { self.y[0] }
    pub fn theta2(&self) -> f64 { self.y[1] }
    pub fn omega1(&self) -> f64 { self.y[2] }
    pub fn omega2(&self) -> f64 { self.y[3] }

    /// Upper and lower bob
    pub fn bob_positions(&self) -> [NVec3; 2] {
        let (l1, l2) = (self.params.length1(), self.params.length2());
        let upper = self.params.pivot() + NVec2::new(l1 * self.theta1().sin(), -l1 * self.theta1().cos());
        let lower = upper + NVec2::new(l2 * self.theta2().sin(), -l2 * self.theta2().cos());
        [planar(upper), planar(lower)]
    }
}

impl Lorenz {
    pub fn new(params: LorenzParams, position: NVec3) -> SimResult<Self> {
        Self::from_vector(params, position)
    }

    pub fn position(&self) -> NVec3 {
        self.y
    }
}

impl Duffing {
    pub fn new(params: DuffingParams, x: f64, v: f64) -> SimResult<Self> {
        Self::from_vector(params, SVector::<f64, 2>::new(x, v))
    }

    pub fn x(&self) -> f64 { self.y[0] }
    pub fn v(&self) -> f64 { self.y[1] }
}

/// One simulated physical system
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimulationState {
    PendulumSingle(SinglePendulum),
    PendulumDouble(DoublePendulum),
    LorenzAttractor(Lorenz),
    DuffingOscillator(Duffing),
}

impl SimulationState {
    pub fn name(&self) -> &'static str {
        match self {
            SimulationState::PendulumSingle(s) => s.params().name(),
            SimulationState::PendulumDouble(s) => s.params().name(),
            SimulationState::LorenzAttractor(s) => s.params().name(),
            SimulationState::DuffingOscillator(s) => s.params().name(),
        }
    }

    /// Advance by `dt` from time `t` without touching `self`
    pub fn step(&self, t: f64, dt: f64, integrator: IntegratorConfig) -> SimResult<Self> {
        Ok(match self {
            SimulationState::PendulumSingle(s) => SimulationState::PendulumSingle(s.step(t, dt, integrator)?),
            SimulationState::PendulumDouble(s) => SimulationState::PendulumDouble(s.step(t, dt, integrator)?),
            SimulationState::LorenzAttractor(s) => SimulationState::LorenzAttractor(s.step(t, dt, integrator)?),
            SimulationState::DuffingOscillator(s) => SimulationState::DuffingOscillator(s.step(t, dt, integrator)?),
        })
    }

    /// Whether `integrator` can advance this system
    pub fn supports(&self, integrator: IntegratorConfig) -> bool {
        match integrator {
            IntegratorConfig::SemiImplicitEuler => !matches!(self, SimulationState::LorenzAttractor(_)),
            IntegratorConfig::Euler | IntegratorConfig::Rk4 => true,
        }
    }

    /// Display point: the (lower) bob for pendulums, the phase-space point
    /// `(x, v)` for the Duffing oscillator, the position for Lorenz
    pub fn project(&self) -> CartesianPosition {
        match self {
            SimulationState::PendulumSingle(s) => s.bob_position(),
            SimulationState::PendulumDouble(s) => s.bob_positions()[1],
            SimulationState::LorenzAttractor(s) => s.position(),
            SimulationState::DuffingOscillator(s) => NVec3::new(s.x(), s.v(), 0.0),
        }
    }

    /// Polyline of the physical linkage, pivot first. Empty for systems
    /// without rods.
    pub fn linkage(&self) -> Vec<NVec3> {
        match self {
            SimulationState::PendulumSingle(s) => vec![planar(s.params().pivot()), s.bob_position()],
            SimulationState::PendulumDouble(s) => {
                let [upper, lower] = s.bob_positions();
                vec![planar(s.params().pivot()), upper, lower]
            }
            SimulationState::LorenzAttractor(_) | SimulationState::DuffingOscillator(_) => Vec::new(),
        }
    }

    /// Total mechanical energy, `None` for the Lorenz system
    pub fn energy(&self) -> Option<f64> {
        match self {
            SimulationState::PendulumSingle(s) => s.energy(),
            SimulationState::PendulumDouble(s) => s.energy(),
            SimulationState::LorenzAttractor(s) => s.energy(),
            SimulationState::DuffingOscillator(s) => s.energy(),
        }
    }

    pub fn coordinates(&self) -> &[f64] {
        match self {
            SimulationState::PendulumSingle(s) => s.vector().as_slice(),
            SimulationState::PendulumDouble(s) => s.vector().as_slice(),
            SimulationState::LorenzAttractor(s) => s.vector().as_slice(),
            SimulationState::DuffingOscillator(s) => s.vector().as_slice(),
        }
    }

    pub fn derivative(&self, t: f64) -> Vec<f64> {
        match self {
            SimulationState::PendulumSingle(s) => s.derivative(t).iter().copied().collect(),
            SimulationState::PendulumDouble(s) => s.derivative(t).iter().copied().collect(),
            SimulationState::LorenzAttractor(s) => s.derivative(t).iter().copied().collect(),
            SimulationState::DuffingOscillator(s) => s.derivative(t).iter().copied().collect(),
        }
    }

    /// Copy with the leading coordinate shifted by `offset`. Double pendulums
    /// shift both angles. Used to fan out chaos ensembles.
    pub fn perturbed(&self, offset: f64) -> SimResult<Self> {
        Ok(match self {
            SimulationState::PendulumSingle(s) => SimulationState::PendulumSingle(s.perturbed(&[0], offset)?),
            SimulationState::PendulumDouble(s) => SimulationState::PendulumDouble(s.perturbed(&[0, 1], offset)?),
            SimulationState::LorenzAttractor(s) => SimulationState::LorenzAttractor(s.perturbed(&[0], offset)?),
            SimulationState::DuffingOscillator(s) => SimulationState::DuffingOscillator(s.perturbed(&[0], offset)?),
        })
    }

    /// Planar systems are drawn by the 2D viewer
    pub fn is_planar(&self) -> bool {
        !matches!(self, SimulationState::LorenzAttractor(_))
    }
}
