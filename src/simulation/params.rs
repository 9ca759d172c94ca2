//! Physical and numerical parameters for the simulation
//!
//! The physical parameter structs (`PendulumParams`, `DoublePendulumParams`,
//! `LorenzParams`, `DuffingParams`) are validated by their constructors and
//! read-only afterwards; a system never changes its physics mid-run.
//!
//! `Parameters` holds the runtime settings:
//! - fixed step size, sub-steps per frame and time scale,
//! - simulated span for headless runs and precomputed trajectories,
//! - error tolerances for the adaptive solver

use super::error::{SimError, SimResult};
use super::states::NVec2;

fn finite(name: &'static str, value: f64) -> SimResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimError::NonFiniteParameter { name, value })
    }
}

fn positive(name: &'static str, value: f64) -> SimResult<f64> {
    let value = finite(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::NonPositiveParameter { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> SimResult<f64> {
    let value = finite(name, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(SimError::NegativeParameter { name, value })
    }
}

fn finite_point(name: &'static str, p: NVec2) -> SimResult<NVec2> {
    finite(name, p.x)?;
    finite(name, p.y)?;
    Ok(p)
}

/// Rigid single pendulum hanging from `pivot`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendulumParams {
    length: f64,  // rod length
    gravity: f64, // gravitational acceleration
    mass: f64,    // bob mass, only enters the energy
    damping: f64, // linear angular damping coefficient
    pivot: NVec2, // where the rod is attached
}

impl PendulumParams {
    pub fn new(length: f64, gravity: f64, mass: f64) -> SimResult<Self> {
        Ok(Self {
            length: positive("length", length)?,
            gravity: positive("gravity", gravity)?,
            mass: positive("mass", mass)?,
            damping: 0.0,
            pivot: NVec2::zeros(),
        })
    }

    pub fn with_damping(mut self, damping: f64) -> SimResult<Self> {
        self.damping = non_negative("damping", damping)?;
        Ok(self)
    }

    pub fn with_pivot(mut self, pivot: NVec2) -> SimResult<Self> {
        self.pivot = finite_point("pivot", pivot)?;
        Ok(self)
    }

    pub fn length(&self) -> f64 { self.length }
    pub fn gravity(&self) -> f64 { self.gravity }
    pub fn mass(&self) -> f64 { self.mass }
    pub fn damping(&self) -> f64 { self.damping }
    pub fn pivot(&self) -> NVec2 { self.pivot }
}

/// Two rigid rods chained from `pivot`, point masses at the rod ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoublePendulumParams {
    length1: f64,
    length2: f64,
    mass1: f64,
    mass2: f64,
    gravity: f64,
    pivot: NVec2,
}

impl DoublePendulumParams {
    pub fn new(length1: f64, length2: f64, mass1: f64, mass2: f64, gravity: f64) -> SimResult<Self> {
        Ok(Self {
            length1: positive("length1", length1)?,
            length2: positive("length2", length2)?,
            mass1: positive("mass1", mass1)?,
            mass2: positive("mass2", mass2)?,
            gravity: positive("gravity", gravity)?,
            pivot: NVec2::zeros(),
        })
    }

    pub fn with_pivot(mut self, pivot: NVec2) -> SimResult<Self> {
        self.pivot = finite_point("pivot", pivot)?;
        Ok(self)
    }

    pub fn length1(&self) -> f64 { self.length1 }
    pub fn length2(&self) -> f64 { self.length2 }
    pub fn mass1(&self) -> f64 { self.mass1 }
    pub fn mass2(&self) -> f64 { self.mass2 }
    pub fn gravity(&self) -> f64 { self.gravity }
    pub fn pivot(&self) -> NVec2 { self.pivot }
}

/// Lorenz system constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LorenzParams {
    sigma: f64, // Prandtl number
    rho: f64,   // Rayleigh number
    beta: f64,  // geometric factor
}

impl LorenzParams {
    pub fn new(sigma: f64, rho: f64, beta: f64) -> SimResult<Self> {
        Ok(Self {
            sigma: positive("sigma", sigma)?,
            rho: positive("rho", rho)?,
            beta: positive("beta", beta)?,
        })
    }

    pub fn sigma(&self) -> f64 { self.sigma }
    pub fn rho(&self) -> f64 { self.rho }
    pub fn beta(&self) -> f64 { self.beta }
}

impl Default for LorenzParams {
    /// The classic chaotic regime: sigma = 10, rho = 28, beta = 8/3
    fn default() -> Self {
        Self {
            sigma: 10.0,
            rho: 28.0,
            beta: 8.0 / 3.0,
        }
    }
}

/// Driven, damped oscillator with a cubic spring term:
/// `m x'' = -k x - gamma x' - beta x^3 + f0 cos(omega t)`
///
/// `stiffness` may be negative (double-well potential) and `nonlinearity`
/// may take either sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuffingParams {
    mass: f64,
    stiffness: f64,       // k
    damping: f64,         // gamma
    nonlinearity: f64,    // beta
    drive_amplitude: f64, // f0
    drive_frequency: f64, // omega
}

impl DuffingParams {
    pub fn new(mass: f64, stiffness: f64, damping: f64, nonlinearity: f64) -> SimResult<Self> {
        Ok(Self {
            mass: positive("mass", mass)?,
            stiffness: finite("stiffness", stiffness)?,
            damping: non_negative("damping", damping)?,
            nonlinearity: finite("nonlinearity", nonlinearity)?,
            drive_amplitude: 0.0,
            drive_frequency: 0.0,
        })
    }

    pub fn with_drive(mut self, amplitude: f64, frequency: f64) -> SimResult<Self> {
        self.drive_amplitude = finite("drive_amplitude", amplitude)?;
        self.drive_frequency = finite("drive_frequency", frequency)?;
        Ok(self)
    }

    pub fn mass(&self) -> f64 { self.mass }
    pub fn stiffness(&self) -> f64 { self.stiffness }
    pub fn damping(&self) -> f64 { self.damping }
    pub fn nonlinearity(&self) -> f64 { self.nonlinearity }
    pub fn drive_amplitude(&self) -> f64 { self.drive_amplitude }
    pub fn drive_frequency(&self) -> f64 { self.drive_frequency }

    /// External driving force at time `t`
    pub fn drive(&self, t: f64) -> f64 {
        self.drive_amplitude * (self.drive_frequency * t).cos()
    }
}

/// Upper bound on the frames of a headless run
pub const MAX_FRAMES: usize = 10_000_000;

/// Runtime numerical settings shared by every system in a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub dt: f64,        // fixed step size for headless runs
    pub sub_steps: u32, // integration steps per frame
    pub speed: f64,     // simulated seconds per wall-clock second
    pub t_end: f64,     // time end
    pub atol: f64,      // absolute error tolerance
    pub rtol: f64,      // relative error tolerance
}

impl Parameters {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidTimeStep(self.dt));
        }
        if self.sub_steps == 0 {
            return Err(SimError::InvalidSubSteps);
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(SimError::InvalidSpeed(self.speed));
        }
        if !(self.t_end.is_finite() && self.t_end > 0.0) {
            return Err(SimError::InvalidTimeSpan(self.t_end));
        }
        for (name, value) in [("atol", self.atol), ("rtol", self.rtol)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidTolerance { name, value });
            }
        }
        let frames = (self.t_end / (self.dt * self.speed)).ceil();
        if !(frames <= MAX_FRAMES as f64) {
            return Err(SimError::TooManyFrames { frames, max: MAX_FRAMES });
        }
        Ok(())
    }

    /// Fixed-`dt` frames needed to reach `t_end` at the configured speed
    pub fn frames(&self) -> usize {
        (self.t_end / (self.dt * self.speed)).ceil() as usize
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            sub_steps: 1,
            speed: 1.0,
            t_end: 20.0,
            atol: 1.0e-9,
            rtol: 1.0e-6,
        }
    }
}
