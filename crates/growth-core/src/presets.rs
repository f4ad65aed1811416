use crate::config::SystemConfig;
use crate::particle::ParticleKind;

/// Values a system is reset to when switched to a particle kind.
#[derive(Clone, Copy, Debug)]
pub struct KindPreset {
    pub initial_count: usize,
    pub forces_enabled: Option<bool>,
    pub particle_death: Option<bool>,
    pub cohesion: Option<i32>,
    pub local_cohesion: Option<i32>,
    pub nearest_particle: Option<bool>,
    pub automata_radius: Option<i32>,
    pub automata_time: Option<i32>,
}

impl KindPreset {
    /// Linked: an icosahedron with forces on and no ageing.
    pub const LINKED: Self = Self {
        initial_count: 12,
        forces_enabled: Some(true),
        particle_death: Some(false),
        cohesion: Some(30),
        local_cohesion: Some(30),
        nearest_particle: Some(true),
        automata_radius: None,
        automata_time: None,
    };

    /// Growth: a single root, split candidates picked at random.
    pub const GROWTH: Self = Self {
        initial_count: 1,
        forces_enabled: None,
        particle_death: None,
        cohesion: None,
        local_cohesion: None,
        nearest_particle: Some(false),
        automata_radius: None,
        automata_time: None,
    };

    /// Automata: one seed cell.
    pub const AUTOMATA: Self = Self {
        initial_count: 1,
        forces_enabled: None,
        particle_death: None,
        cohesion: None,
        local_cohesion: None,
        nearest_particle: None,
        automata_radius: Some(4),
        automata_time: Some(200),
    };

    pub fn for_kind(kind: ParticleKind) -> Self {
        match kind {
            ParticleKind::Linked => Self::LINKED,
            ParticleKind::Growth => Self::GROWTH,
            ParticleKind::Automata => Self::AUTOMATA,
        }
    }

    /// Apply this preset to a config. Fields left `None` keep their value;
    /// grow-to-light is always switched back on.
    pub fn apply_to(&self, config: &mut SystemConfig) {
        if let Some(v) = self.forces_enabled {
            config.forces_enabled = v;
        }
        if let Some(v) = self.particle_death {
            config.particle_death = v;
        }
        if let Some(v) = self.cohesion {
            config.cohesion = v;
        }
        if let Some(v) = self.local_cohesion {
            config.local_cohesion = v;
        }
        if let Some(v) = self.nearest_particle {
            config.nearest_particle = v;
        }
        if let Some(v) = self.automata_radius {
            config.automata_radius = v;
        }
        if let Some(v) = self.automata_time {
            config.automata_time = v;
        }
        config.grow_to_light = true;
    }
}
