pub mod states;
pub mod params;
pub mod engine;
pub mod error;
pub mod dynamics;
pub mod integrator;
pub mod trajectory;
pub mod trail;
pub mod scenario;
