use glam::Vec3;

/// Global tunables pushed in by the UI layer.
///
/// `cohesion` and `local_cohesion` hold the already-inverted divisors
/// (`100 - slider`), not the raw slider values.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemConfig {
    pub particle_size: f32,
    pub cohesion: i32,
    pub local_cohesion: i32,
    pub automata_radius: i32,
    pub automata_time: i32,
    pub light_pos: Vec3,
    pub forces_enabled: bool,
    pub particle_death: bool,
    /// Split the particle nearest the light instead of a random one.
    pub nearest_particle: bool,
    pub grow_to_light: bool,
    pub branch_length: f32,
    pub child_threshold: u32,
    pub food_threshold: u32,
    /// Upper bound on re-sampled branch directions for one growth split.
    pub max_branch_attempts: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            particle_size: 2.0,
            cohesion: 30,
            local_cohesion: 30,
            automata_radius: 4,
            automata_time: 200,
            light_pos: Vec3::ZERO,
            forces_enabled: true,
            particle_death: false,
            nearest_particle: true,
            grow_to_light: true,
            branch_length: 3.0,
            child_threshold: 3,
            food_threshold: 10,
            max_branch_attempts: 64,
        }
    }
}
