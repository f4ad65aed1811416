use thiserror::Error;

use crate::particle::{ParticleId, ParticleKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SystemError {
    #[error("no splittable particle found after {attempts} attempts")]
    NoSplittableParticle { attempts: usize },

    #[error("unknown particle id {0}")]
    UnknownParticle(ParticleId),

    #[error("particle index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("{operation} is not supported for {kind:?} systems")]
    Unsupported {
        operation: &'static str,
        kind: ParticleKind,
    },
}
