pub mod simulation;
pub mod configuration;
pub mod geometry;
pub mod visualization;
pub mod benchmark;

pub use simulation::states::{SimulationState, SystemState, SinglePendulum, DoublePendulum, Lorenz, Duffing, NVec2, NVec3, CartesianPosition};
pub use simulation::params::{Parameters, PendulumParams, DoublePendulumParams, LorenzParams, DuffingParams};
pub use simulation::dynamics::Dynamics;
pub use simulation::error::{SimError, SimResult};
pub use simulation::integrator::{integrate_step, euler_step, semi_implicit_euler_step, rk4_step, dormand_prince};
pub use simulation::trajectory::{DenseOutput, Trajectory};
pub use simulation::trail::Trail;
pub use simulation::scenario::{Scenario, Simulation};

pub use configuration::config::{IntegratorConfig, StrategyConfig, EngineConfig, ParametersConfig, ModelConfig, SystemConfig, EnsembleConfig, ScenarioConfig};

pub use geometry::{hilbert::hilbert_curve, recaman::{recaman_sequence, recaman_arcs, RecamanArc}, GeometryError};

pub use visualization::{sim_vis2d::run_2d, sim_vis3d::run_3d};

pub use benchmark::benchmark::{bench_live_step, bench_precompute, bench_trail};
