//! Error taxonomy for the simulator
//!
//! Three families, all returned synchronously to whoever drives the step:
//! - configuration errors, raised when parameters or run settings are built
//! - numerical instability, raised after a step leaves the state non-finite
//! - unsupported requests (bad time spans, schemes a system cannot use)

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("parameter `{name}` must be strictly positive, got {value}")]
    NonPositiveParameter { name: &'static str, value: f64 },

    #[error("parameter `{name}` must not be negative, got {value}")]
    NegativeParameter { name: &'static str, value: f64 },

    #[error("parameter `{name}` must be finite, got {value}")]
    NonFiniteParameter { name: &'static str, value: f64 },

    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),

    #[error("sub_steps must be at least 1")]
    InvalidSubSteps,

    #[error("speed must be positive and finite, got {0}")]
    InvalidSpeed(f64),

    #[error("tolerance `{name}` must be positive and finite, got {value}")]
    InvalidTolerance { name: &'static str, value: f64 },

    #[error("trail length must be at least 1")]
    InvalidTrailLength,

    #[error("ensemble count must be at least 1")]
    InvalidEnsembleCount,

    #[error("initial state component {index} is not finite ({value})")]
    NonFiniteInitialState { index: usize, value: f64 },

    #[error("numerical instability at t = {t}: state component {index} became {value}")]
    NonFiniteState { t: f64, index: usize, value: f64 },

    #[error("simulation halted after an earlier instability")]
    Halted,

    #[error("adaptive step size underflow at t = {0}")]
    StepSizeUnderflow(f64),

    #[error("run of {frames} frames exceeds the limit of {max}; raise dt or speed")]
    TooManyFrames { frames: f64, max: usize },

    #[error("trajectory time span must be positive and finite, got {0}")]
    InvalidTimeSpan(f64),

    #[error("{scheme} integration is not supported for {system}")]
    UnsupportedScheme { scheme: &'static str, system: &'static str },

    #[error("sample time {t} outside trajectory span [{start}, {end}]")]
    SampleOutOfRange { t: f64, start: f64, end: f64 },
}

pub type SimResult<T> = Result<T, SimError>;
