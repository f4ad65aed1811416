//! Per-variant behaviour. Each module works on the shared
//! [`ParticleStore`](crate::store::ParticleStore) by storage index and
//! leaves topology symmetric.

pub mod automata;
pub mod growth;
pub mod linked;
