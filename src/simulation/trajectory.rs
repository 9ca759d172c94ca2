//! Precomputed trajectories
//!
//! A trajectory is solved once over `[0, t_end]` by the adaptive integrator
//! and then sampled at whatever times the renderer asks for, so the visual
//! frame rate never feeds back into the integration error.

use log::info;
use nalgebra::SVector;

use super::dynamics::Dynamics;
use super::error::{SimError, SimResult};
use super::integrator::dormand_prince;
use super::params::{DoublePendulumParams, DuffingParams, LorenzParams, PendulumParams};
use super::states::{NVec3, SimulationState, SystemState};

/// Accepted solver steps with their rates, interpolated by cubic Hermite
/// polynomials between neighbouring steps
#[derive(Debug, Clone)]
pub struct DenseOutput<const N: usize> {
    times: Vec<f64>,
    states: Vec<SVector<f64, N>>,
    rates: Vec<SVector<f64, N>>,
}

impl<const N: usize> DenseOutput<N> {
    pub(crate) fn start(t: f64, y: SVector<f64, N>, rate: SVector<f64, N>) -> Self {
        Self {
            times: vec![t],
            states: vec![y],
            rates: vec![rate],
        }
    }

    pub(crate) fn push(&mut self, t: f64, y: SVector<f64, N>, rate: SVector<f64, N>) {
        self.times.push(t);
        self.states.push(y);
        self.rates.push(rate);
    }

    /// Number of stored points (accepted steps + 1)
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn t_start(&self) -> f64 {
        self.times[0]
    }

    pub fn t_end(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Interpolated state at time `t`
    pub fn sample(&self, t: f64) -> SimResult<SVector<f64, N>> {
        let (start, end) = (self.t_start(), self.t_end());
        if !(t >= start && t <= end) {
            return Err(SimError::SampleOutOfRange { t, start, end });
        }
        if self.times.len() == 1 {
            return Ok(self.states[0]);
        }

        // Segment [i, i + 1] containing t
        let i = self
            .times
            .partition_point(|&ti| ti <= t)
            .saturating_sub(1)
            .min(self.times.len() - 2);

        let (t0, t1) = (self.times[i], self.times[i + 1]);
        let h = t1 - t0;
        let s = (t - t0) / h;
        let s2 = s * s;
        let s3 = s2 * s;

        // Hermite basis
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        Ok(self.states[i] * h00
            + self.rates[i] * (h10 * h)
            + self.states[i + 1] * h01
            + self.rates[i + 1] * (h11 * h))
    }
}

fn solve<P, const N: usize>(
    state: &SystemState<P, N>,
    t_span: f64,
    atol: f64,
    rtol: f64,
) -> SimResult<DenseOutput<N>>
where
    P: Dynamics<N> + Copy,
{
    let dense = dormand_prince(state.params(), 0.0, *state.vector(), t_span, atol, rtol)?;
    info!(
        "precomputed {} over [0, {t_span}] in {} steps",
        state.params().name(),
        dense.len() - 1
    );
    Ok(dense)
}

/// Solved trajectory for one system, tagged like [`SimulationState`]
#[derive(Debug, Clone)]
pub enum Trajectory {
    PendulumSingle { params: PendulumParams, dense: DenseOutput<2> },
    PendulumDouble { params: DoublePendulumParams, dense: DenseOutput<4> },
    LorenzAttractor { params: LorenzParams, dense: DenseOutput<3> },
    DuffingOscillator { params: DuffingParams, dense: DenseOutput<2> },
}

impl Trajectory {
    /// Solve `initial` over `[0, t_span]`
    pub fn precompute(initial: &SimulationState, t_span: f64, atol: f64, rtol: f64) -> SimResult<Self> {
        Ok(match initial {
            SimulationState::PendulumSingle(s) => Trajectory::PendulumSingle {
                params: *s.params(),
                dense: solve(s, t_span, atol, rtol)?,
            },
            SimulationState::PendulumDouble(s) => Trajectory::PendulumDouble {
                params: *s.params(),
                dense: solve(s, t_span, atol, rtol)?,
            },
            SimulationState::LorenzAttractor(s) => Trajectory::LorenzAttractor {
                params: *s.params(),
                dense: solve(s, t_span, atol, rtol)?,
            },
            SimulationState::DuffingOscillator(s) => Trajectory::DuffingOscillator {
                params: *s.params(),
                dense: solve(s, t_span, atol, rtol)?,
            },
        })
    }

    pub fn t_end(&self) -> f64 {
        match self {
            Trajectory::PendulumSingle { dense, .. } => dense.t_end(),
            Trajectory::PendulumDouble { dense, .. } => dense.t_end(),
            Trajectory::LorenzAttractor { dense, .. } => dense.t_end(),
            Trajectory::DuffingOscillator { dense, .. } => dense.t_end(),
        }
    }

    /// Number of accepted solver steps
    pub fn steps(&self) -> usize {
        let len = match self {
            Trajectory::PendulumSingle { dense, .. } => dense.len(),
            Trajectory::PendulumDouble { dense, .. } => dense.len(),
            Trajectory::LorenzAttractor { dense, .. } => dense.len(),
            Trajectory::DuffingOscillator { dense, .. } => dense.len(),
        };
        len - 1
    }

    /// Full system state at time `t`
    pub fn sample(&self, t: f64) -> SimResult<SimulationState> {
        Ok(match self {
            Trajectory::PendulumSingle { params, dense } => {
                SimulationState::PendulumSingle(SystemState::from_vector(*params, dense.sample(t)?)?)
            }
            Trajectory::PendulumDouble { params, dense } => {
                SimulationState::PendulumDouble(SystemState::from_vector(*params, dense.sample(t)?)?)
            }
            Trajectory::LorenzAttractor { params, dense } => {
                SimulationState::LorenzAttractor(SystemState::from_vector(*params, dense.sample(t)?)?)
            }
            Trajectory::DuffingOscillator { params, dense } => {
                SimulationState::DuffingOscillator(SystemState::from_vector(*params, dense.sample(t)?)?)
            }
        })
    }

    pub fn position(&self, t: f64) -> SimResult<NVec3> {
        Ok(self.sample(t)?.project())
    }
}
