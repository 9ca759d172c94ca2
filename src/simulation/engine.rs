//! High-level runtime engine settings
//!
//! Selects how systems are advanced: stepped live once per frame with a
//! fixed-step integrator, or solved up front and played back

use crate::configuration::config::{EngineConfig, IntegratorConfig, StrategyConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engine {
    pub strategy: StrategyConfig,     // live stepping or precomputed playback
    pub integrator: IntegratorConfig, // scheme for live stepping
}

impl From<&EngineConfig> for Engine {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            strategy: cfg.strategy,
            integrator: cfg.integrator,
        }
    }
}
