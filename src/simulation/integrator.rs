//! Time integrators for the simulated systems
//!
//! Fixed-step schemes used by per-frame stepping:
//! - explicit Euler, every rate taken from the pre-step state
//! - semi-implicit Euler, velocities first then positions with the new velocities
//! - classical RK4
//!
//! And one adaptive scheme for precomputed trajectories: Dormand–Prince 5(4)
//! with error control on `atol`/`rtol`, recording every accepted step so the
//! result can be sampled through a dense interpolant.

use log::debug;
use nalgebra::SVector;

use super::dynamics::Dynamics;
use super::error::{SimError, SimResult};
use super::trajectory::DenseOutput;
use crate::configuration::config::IntegratorConfig;

/// Return the first non-finite component of `y`, if any
pub fn first_non_finite<const N: usize>(y: &SVector<f64, N>) -> Option<(usize, f64)> {
    y.iter().copied().enumerate().find(|(_, v)| !v.is_finite())
}

/// Advance `y` by one step of `dt` with the chosen fixed-step scheme.
/// Rejects a bad `dt` and reports a non-finite result as instability at `t + dt`.
pub fn integrate_step<D, const N: usize>(
    dynamics: &D,
    integrator: IntegratorConfig,
    t: f64,
    y: &SVector<f64, N>,
    dt: f64,
) -> SimResult<SVector<f64, N>>
where
    D: Dynamics<N>,
{
    if !(dt.is_finite() && dt > 0.0) {
        return Err(SimError::InvalidTimeStep(dt));
    }

    let next = match integrator {
        IntegratorConfig::Euler => euler_step(dynamics, t, y, dt),
        IntegratorConfig::SemiImplicitEuler => semi_implicit_euler_step(dynamics, t, y, dt)?,
        IntegratorConfig::Rk4 => rk4_step(dynamics, t, y, dt),
    };

    if let Some((index, value)) = first_non_finite(&next) {
        return Err(SimError::NonFiniteState { t: t + dt, index, value });
    }
    Ok(next)
}

/// Explicit Euler: y_n+1 = y_n + dt * f(t_n, y_n)
///
/// Every rate comes from the pre-step state, so a pendulum released from
/// rest keeps its angle on the first step and only picks up angular velocity.
pub fn euler_step<D, const N: usize>(dynamics: &D, t: f64, y: &SVector<f64, N>, dt: f64) -> SVector<f64, N>
where
    D: Dynamics<N>,
{
    y + dynamics.derivative(t, y) * dt
}

/// Semi-implicit (symplectic) Euler for mechanical layouts `[q, v]`:
/// v_n+1 = v_n + dt * a(t_n, q_n, v_n), then q_n+1 = q_n + dt * v_n+1
pub fn semi_implicit_euler_step<D, const N: usize>(
    dynamics: &D,
    t: f64,
    y: &SVector<f64, N>,
    dt: f64,
) -> SimResult<SVector<f64, N>>
where
    D: Dynamics<N>,
{
    let m = match dynamics.coordinates() {
        Some(m) if 2 * m == N => m,
        _ => {
            return Err(SimError::UnsupportedScheme {
                scheme: IntegratorConfig::SemiImplicitEuler.name(),
                system: dynamics.name(),
            })
        }
    };

    let rates = dynamics.derivative(t, y);
    let mut next = *y;

    // Kick: velocities with accelerations from the old state
    for i in m..N {
        next[i] += dt * rates[i];
    }

    // Drift: positions with the updated velocities
    for i in 0..m {
        next[i] += dt * next[m + i];
    }
    Ok(next)
}

/// Classical fourth-order Runge–Kutta, four rate evaluations per step
pub fn rk4_step<D, const N: usize>(dynamics: &D, t: f64, y: &SVector<f64, N>, dt: f64) -> SVector<f64, N>
where
    D: Dynamics<N>,
{
    let half_dt = 0.5 * dt;

    let k1 = dynamics.derivative(t, y);
    let k2 = dynamics.derivative(t + half_dt, &(y + k1 * half_dt));
    let k3 = dynamics.derivative(t + half_dt, &(y + k2 * half_dt));
    let k4 = dynamics.derivative(t + dt, &(y + k3 * dt));

    y + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
}

// =========================================================================================
// adaptive Dormand–Prince 5(4) below
// =========================================================================================

// Butcher tableau nodes
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th order weights (also the last stage row, FSAL)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// difference between the 5th and embedded 4th order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
const MAX_STEPS: usize = 1_000_000;

/// Weighted RMS norm used for step-size control
fn error_norm<const N: usize>(
    err: &SVector<f64, N>,
    y0: &SVector<f64, N>,
    y1: &SVector<f64, N>,
    atol: f64,
    rtol: f64,
) -> f64 {
    let sum: f64 = (0..N)
        .map(|i| {
            let scale = atol + rtol * y0[i].abs().max(y1[i].abs());
            let r = err[i] / scale;
            r * r
        })
        .sum();
    (sum / N as f64).sqrt()
}

/// Starting step from the scale of the state and its rate
fn initial_step<const N: usize>(y0: &SVector<f64, N>, f0: &SVector<f64, N>, span: f64, atol: f64, rtol: f64) -> f64 {
    let zero = SVector::<f64, N>::zeros();
    let d0 = error_norm(y0, y0, &zero, atol, rtol);
    let d1 = error_norm(f0, y0, &zero, atol, rtol);
    let h = if d0 < 1e-5 || d1 < 1e-5 { 1e-6 } else { 0.01 * d0 / d1 };
    h.min(span)
}

/// Integrate from `(t0, y0)` to `t_end` with Dormand–Prince 5(4).
///
/// Every accepted step is stored together with its rate so the caller can
/// sample anywhere in `[t0, t_end]`. Fails with `InvalidTimeSpan` for an empty
/// or negative span and `StepSizeUnderflow` when the tolerance cannot be met.
pub fn dormand_prince<D, const N: usize>(
    dynamics: &D,
    t0: f64,
    y0: SVector<f64, N>,
    t_end: f64,
    atol: f64,
    rtol: f64,
) -> SimResult<DenseOutput<N>>
where
    D: Dynamics<N>,
{
    let span = t_end - t0;
    if !(span.is_finite() && span > 0.0) {
        return Err(SimError::InvalidTimeSpan(span));
    }
    for (name, value) in [("atol", atol), ("rtol", rtol)] {
        if !(value.is_finite() && value > 0.0) {
            return Err(SimError::InvalidTolerance { name, value });
        }
    }
    if let Some((index, value)) = first_non_finite(&y0) {
        return Err(SimError::NonFiniteInitialState { index, value });
    }

    let mut t = t0;
    let mut y = y0;
    let mut k1 = dynamics.derivative(t, &y);
    let mut h = initial_step(&y, &k1, span, atol, rtol);

    let mut dense = DenseOutput::start(t, y, k1);
    let mut rejected = 0usize;

    // Smallest step distinguishable from roundoff in t over this span
    let min_step = 16.0 * f64::EPSILON * t0.abs().max(t_end.abs());

    for _ in 0..MAX_STEPS {
        if t >= t_end {
            debug!(
                "{}: {} accepted steps, {} rejected over [{t0}, {t_end}]",
                dynamics.name(),
                dense.len() - 1,
                rejected
            );
            return Ok(dense);
        }

        // A step ending within roundoff of t_end becomes the last one and
        // lands on t_end exactly, never leaving a sub-ulp remainder
        let last = t + h >= t_end - min_step;
        if last {
            h = t_end - t;
        } else if h <= min_step {
            return Err(SimError::StepSizeUnderflow(t));
        }

        let k2 = dynamics.derivative(t + C2 * h, &(y + k1 * (A21 * h)));
        let k3 = dynamics.derivative(t + C3 * h, &(y + (k1 * A31 + k2 * A32) * h));
        let k4 = dynamics.derivative(t + C4 * h, &(y + (k1 * A41 + k2 * A42 + k3 * A43) * h));
        let k5 = dynamics.derivative(
            t + C5 * h,
            &(y + (k1 * A51 + k2 * A52 + k3 * A53 + k4 * A54) * h),
        );
        let k6 = dynamics.derivative(
            t + h,
            &(y + (k1 * A61 + k2 * A62 + k3 * A63 + k4 * A64 + k5 * A65) * h),
        );

        // 5th order solution: y_n+1 = y_n + h * sum(b_i k_i)
        let y_new = y + (k1 * B1 + k3 * B3 + k4 * B4 + k5 * B5 + k6 * B6) * h;
        let k7 = dynamics.derivative(t + h, &y_new);

        // Local error estimate from the embedded 4th order solution
        let err = (k1 * E1 + k3 * E3 + k4 * E4 + k5 * E5 + k6 * E6 + k7 * E7) * h;
        let norm = error_norm(&err, &y, &y_new, atol, rtol);

        if norm.is_finite() && norm <= 1.0 && first_non_finite(&y_new).is_none() {
            t = if last { t_end } else { t + h };
            y = y_new;
            k1 = k7; // first same as last
            dense.push(t, y, k1);

            let factor = if norm == 0.0 { MAX_FACTOR } else { SAFETY * norm.powf(-0.2) };
            h *= factor.clamp(MIN_FACTOR, MAX_FACTOR);
        } else {
            rejected += 1;
            let factor = if norm.is_finite() { SAFETY * norm.powf(-0.2) } else { MIN_FACTOR };
            h *= factor.clamp(MIN_FACTOR, 1.0);
        }
    }

    Err(SimError::StepSizeUnderflow(t))
}
