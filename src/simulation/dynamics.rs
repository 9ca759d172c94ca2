//! Equations of motion for every supported system
//!
//! Each physical parameter struct is the right-hand side of its own ODE
//! through the [`Dynamics`] trait, so the integrators only ever see a
//! parameter struct and a fixed-size state vector.
//!
//! State layouts:
//! - single pendulum `[theta, omega]`
//! - double pendulum `[theta1, theta2, omega1, omega2]`
//! - Lorenz `[x, y, z]`
//! - Duffing `[x, v]`
//!
//! Mechanical layouts put generalized coordinates first and their rates
//! second; semi-implicit Euler relies on that split.

use nalgebra::SVector;

use super::params::{DoublePendulumParams, DuffingParams, LorenzParams, PendulumParams};

/// Right-hand side `y' = f(t, y)` of an N-dimensional first-order system
pub trait Dynamics<const N: usize> {
    /// Human readable system name, used in logs and errors
    fn name(&self) -> &'static str;

    fn derivative(&self, t: f64, y: &SVector<f64, N>) -> SVector<f64, N>;

    /// Number of leading generalized coordinates whose rates are stored in
    /// the trailing half of the state. `None` for non-mechanical systems.
    fn coordinates(&self) -> Option<usize> {
        None
    }

    /// Total mechanical energy, when the system has one
    fn energy(&self, _y: &SVector<f64, N>) -> Option<f64> {
        None
    }
}

impl Dynamics<2> for PendulumParams {
    fn name(&self) -> &'static str {
        "single pendulum"
    }

    fn derivative(&self, _t: f64, y: &SVector<f64, 2>) -> SVector<f64, 2> {
        let (theta, omega) = (y[0], y[1]);
        let alpha = -self.gravity() * theta.sin() / self.length() - self.damping() * omega;
        SVector::<f64, 2>::new(omega, alpha)
    }

    fn coordinates(&self) -> Option<usize> {
        Some(1)
    }

    fn energy(&self, y: &SVector<f64, 2>) -> Option<f64> {
        let (theta, omega) = (y[0], y[1]);
        let (m, l, g) = (self.mass(), self.length(), self.gravity());
        let kinetic = 0.5 * m * l * l * omega * omega;
        let potential = m * g * l * (1.0 - theta.cos());
        Some(kinetic + potential)
    }
}

impl Dynamics<4> for DoublePendulumParams {
    fn name(&self) -> &'static str {
        "double pendulum"
    }

    // Angular accelerations from the Lagrangian, in the form given by myPhysicsLab
    fn derivative(&self, _t: f64, y: &SVector<f64, 4>) -> SVector<f64, 4> {
        let (theta1, theta2, omega1, omega2) = (y[0], y[1], y[2], y[3]);
        let (m1, m2) = (self.mass1(), self.mass2());
        let (l1, l2) = (self.length1(), self.length2());
        let g = self.gravity();

        let delta = theta1 - theta2;
        // strictly positive: m2 * cos(..) never exceeds m2
        let den = 2.0 * m1 + m2 - m2 * (2.0 * delta).cos();

        let alpha1 = (-g * (2.0 * m1 + m2) * theta1.sin()
            - m2 * g * (theta1 - 2.0 * theta2).sin()
            - 2.0 * delta.sin() * m2 * (omega2 * omega2 * l2 + omega1 * omega1 * l1 * delta.cos()))
            / (l1 * den);

        let alpha2 = 2.0
            * delta.sin()
            * (omega1 * omega1 * l1 * (m1 + m2)
                + g * (m1 + m2) * theta1.cos()
                + omega2 * omega2 * l2 * m2 * delta.cos())
            / (l2 * den);

        SVector::<f64, 4>::new(omega1, omega2, alpha1, alpha2)
    }

    fn coordinates(&self) -> Option<usize> {
        Some(2)
    }

    fn energy(&self, y: &SVector<f64, 4>) -> Option<f64> {
        let (theta1, theta2, omega1, omega2) = (y[0], y[1], y[2], y[3]);
        let (m1, m2) = (self.mass1(), self.mass2());
        let (l1, l2) = (self.length1(), self.length2());
        let g = self.gravity();

        let kinetic = 0.5 * m1 * l1 * l1 * omega1 * omega1
            + 0.5 * m2 * (l1 * l1 * omega1 * omega1
                + l2 * l2 * omega2 * omega2
                + 2.0 * l1 * l2 * omega1 * omega2 * (theta1 - theta2).cos());
        let potential = -(m1 + m2) * g * l1 * theta1.cos() - m2 * g * l2 * theta2.cos();
        Some(kinetic + potential)
    }
}

impl Dynamics<3> for LorenzParams {
    fn name(&self) -> &'static str {
        "Lorenz attractor"
    }

    fn derivative(&self, _t: f64, y: &SVector<f64, 3>) -> SVector<f64, 3> {
        let (x, yy, z) = (y[0], y[1], y[2]);
        SVector::<f64, 3>::new(
            self.sigma() * (yy - x),
            x * (self.rho() - z) - yy,
            x * yy - self.beta() * z,
        )
    }
}

impl Dynamics<2> for DuffingParams {
    fn name(&self) -> &'static str {
        "Duffing oscillator"
    }

    fn derivative(&self, t: f64, y: &SVector<f64, 2>) -> SVector<f64, 2> {
        let (x, v) = (y[0], y[1]);
        let force = -self.stiffness() * x - self.damping() * v - self.nonlinearity() * x * x * x
            + self.drive(t);
        SVector::<f64, 2>::new(v, force / self.mass())
    }

    fn coordinates(&self) -> Option<usize> {
        Some(1)
    }

    fn energy(&self, y: &SVector<f64, 2>) -> Option<f64> {
        let (x, v) = (y[0], y[1]);
        let kinetic = 0.5 * self.mass() * v * v;
        let potential = 0.5 * self.stiffness() * x * x + 0.25 * self.nonlinearity() * x.powi(4);
        Some(kinetic + potential)
    }
}
