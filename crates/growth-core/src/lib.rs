pub mod config;
pub mod error;
pub mod grid;
pub mod math;
pub mod particle;
pub mod presets;
pub mod store;
pub mod system;
pub mod variants;

pub use config::SystemConfig;
pub use error::SystemError;
pub use particle::{Particle, ParticleId, ParticleKind};
pub use system::ParticleSystem;
