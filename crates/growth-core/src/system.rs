use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SystemConfig;
use crate::error::SystemError;
use crate::grid::NeighbourGrid;
use crate::math::{centroid, sample_cube};
use crate::particle::{
    AutomataState, GrowthState, LinkedState, Particle, ParticleId, ParticleKind, VariantState,
};
use crate::presets::KindPreset;
use crate::store::ParticleStore;
use crate::variants::{automata, growth, linked};

/// Where the growth root is planted.
const GROWTH_SEED: Vec3 = Vec3::new(0.1, 0.3, 0.4);
/// Half extent of the cube extra linked particles are scattered in.
const LINKED_SCATTER: f32 = 10.0;

/// Renderer-facing instance record: 16 bytes, `(x, y, z, radius)`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawInstance {
    pub position: [f32; 3],
    pub radius: f32,
}

impl From<&Particle> for DrawInstance {
    fn from(p: &Particle) -> Self {
        Self {
            position: p.position.to_array(),
            radius: p.size,
        }
    }
}

/// Owns and steps one homogeneous set of particles.
///
/// The renderer calls [`advance`](Self::advance) once per frame, pulls
/// [`package_data_for_drawing`](Self::package_data_for_drawing) and
/// [`links_for_draw`](Self::links_for_draw), and pushes UI parameters through
/// the setters.
pub struct ParticleSystem {
    kind: ParticleKind,
    store: ParticleStore,
    config: SystemConfig,
    rng: StdRng,
    grid: NeighbourGrid,
    particle_centre: Vec3,
    average_distance: Vec3,
}

impl ParticleSystem {
    /// Create a system of `kind`, seeded from entropy.
    pub fn new(kind: ParticleKind) -> Self {
        Self::build(kind, SystemConfig::default(), StdRng::from_entropy())
    }

    /// Create a system of `kind` with a reproducible random stream.
    pub fn with_seed(kind: ParticleKind, seed: u64) -> Self {
        Self::build(kind, SystemConfig::default(), StdRng::seed_from_u64(seed))
    }

    /// Create a system with explicit starting tunables. The kind preset is
    /// still applied on top.
    pub fn with_config(kind: ParticleKind, config: SystemConfig, seed: u64) -> Self {
        Self::build(kind, config, StdRng::seed_from_u64(seed))
    }

    fn build(kind: ParticleKind, config: SystemConfig, rng: StdRng) -> Self {
        let mut system = Self {
            kind,
            store: ParticleStore::new(),
            config,
            rng,
            grid: NeighbourGrid::new(),
            particle_centre: Vec3::ZERO,
            average_distance: Vec3::ZERO,
        };
        system.reset(kind);
        system
    }

    /// Drop every particle, restart ids, apply the kind preset and reseed.
    pub fn reset(&mut self, kind: ParticleKind) {
        self.store.clear();
        self.kind = kind;
        let preset = KindPreset::for_kind(kind);
        preset.apply_to(&mut self.config);
        self.fill(preset.initial_count);
        self.particle_centre = Vec3::ZERO;
        self.average_distance = Vec3::ZERO;
        log::info!("particle system reset to {:?} with {} particles", kind, self.size());
    }

    /// Append `amount` particles of the current kind.
    ///
    /// Linked particles take the icosahedron's vertices in order and, when
    /// at most twelve are added, its edges. Any beyond twelve are scattered
    /// unlinked.
    pub fn fill(&mut self, amount: usize) {
        let base = self.store.len();
        let size = self.config.particle_size;

        for i in 0..amount {
            let (position, state) = match self.kind {
                ParticleKind::Linked => {
                    let position = linked::ICOSAHEDRON_VERTICES
                        .get(i)
                        .copied()
                        .unwrap_or_else(|| sample_cube(&mut self.rng, LINKED_SCATTER));
                    let state = VariantState::Linked(LinkedState::new(self.config.food_threshold));
                    (position, state)
                }
                ParticleKind::Growth => {
                    let state = VariantState::Growth(GrowthState {
                        parent: None,
                        child_threshold: self.config.child_threshold,
                        branch_length: self.config.branch_length,
                    });
                    (GROWTH_SEED, state)
                }
                ParticleKind::Automata => {
                    let position = if base + i == 0 {
                        Vec3::ZERO
                    } else {
                        let radius =
                            automata::neighbourhood_radius(size, self.config.automata_radius);
                        // Cube small enough that any two seeds are neighbours.
                        sample_cube(&mut self.rng, radius / (2.0 * 3.0_f32.sqrt()))
                    };
                    (position, VariantState::Automata(AutomataState::default()))
                }
            };
            self.store.spawn(position, size, Vec::new(), state);
        }

        if self.kind == ParticleKind::Linked {
            if amount <= linked::ICOSAHEDRON_VERTICES.len() {
                for &(a, b) in linked::ICOSAHEDRON_EDGES.iter() {
                    if a < amount && b < amount {
                        self.store.link_indices(base + a, base + b);
                    }
                }
            } else {
                log::debug!("too many particles to link ({})", amount);
            }
        }
    }

    /// Step the simulation one tick.
    ///
    /// Nothing moves while forces are disabled.
    pub fn advance(&mut self) -> Result<(), SystemError> {
        if !self.config.forces_enabled {
            return Ok(());
        }

        match self.kind {
            ParticleKind::Linked => {
                let params = self.linked_force_params();
                let mut hungry = Vec::new();
                for i in 0..self.store.len() {
                    if linked::calculate(&mut self.store, i, &params)? {
                        hungry.push(self.store.get(i)?.id());
                    }
                }
                self.integrate();

                for id in hungry {
                    let index = self.store.index_of(id)?;
                    if let Some(state) = self.store.get_mut(index)?.as_linked_mut() {
                        state.food_level = 0;
                    }
                    if linked::split(&mut self.store, index, &mut self.rng)?.is_none() {
                        log::debug!("fed particle {} could not split, food discarded", id);
                    }
                }
            }
            ParticleKind::Growth => self.integrate(),
            ParticleKind::Automata => {
                let params = automata::RuleParams {
                    automata_radius: self.config.automata_radius,
                    automata_time: self.config.automata_time,
                };
                let outcome =
                    automata::step(&mut self.store, &mut self.grid, &params, &mut self.rng)?;
                self.integrate();
                self.delete_particles(&outcome.deaths)?;
                automata::spawn_births(&mut self.store, &outcome.births);
            }
        }
        Ok(())
    }

    fn linked_force_params(&mut self) -> linked::ForceParams {
        linked::ForceParams {
            particle_centre: self.calculate_particle_centre(),
            average_distance: self.calculate_average_distance_from_centre(),
            cohesion: self.config.cohesion,
            local_cohesion: self.config.local_cohesion,
            particle_death: self.config.particle_death,
        }
    }

    /// One force pass over every linked particle without moving them, so the
    /// next step starts from velocities that already see the new topology.
    fn recalculate_linked(&mut self) -> Result<(), SystemError> {
        let params = self.linked_force_params();
        for i in 0..self.store.len() {
            linked::calculate(&mut self.store, i, &params)?;
        }
        Ok(())
    }

    fn integrate(&mut self) {
        for particle in self.store.iter_mut() {
            particle.advance();
        }
    }

    /// Pick a candidate by the current selection policy and split it,
    /// retrying on the rest until one succeeds. Linked systems then get one
    /// more force pass.
    ///
    /// Fails with [`SystemError::NoSplittableParticle`] once every candidate
    /// has been tried.
    pub fn split_random_particle(&mut self) -> Result<ParticleId, SystemError> {
        if self.kind == ParticleKind::Automata {
            return Err(SystemError::Unsupported {
                operation: "split",
                kind: self.kind,
            });
        }

        let mut candidates: Vec<usize> = (0..self.store.len()).collect();
        let mut attempts = 0;

        while !candidates.is_empty() {
            attempts += 1;
            let slot = if self.config.nearest_particle {
                self.nearest_particle(&candidates).unwrap_or(0)
            } else {
                self.rng.gen_range(0..candidates.len())
            };

            if let Some(child) = self.split_particle(candidates[slot])? {
                log::debug!("split succeeded after {} attempts, {} particles", attempts, self.size());
                if self.kind == ParticleKind::Linked {
                    self.recalculate_linked()?;
                }
                return Ok(child);
            }
            candidates.remove(slot);
        }

        log::warn!("no splittable particle after {} attempts", attempts);
        Err(SystemError::NoSplittableParticle { attempts })
    }

    /// Try to split the particle at storage `index` once.
    pub fn split_particle(&mut self, index: usize) -> Result<Option<ParticleId>, SystemError> {
        match self.kind {
            ParticleKind::Linked => linked::split(&mut self.store, index, &mut self.rng),
            ParticleKind::Growth => {
                let params = growth::SplitParams {
                    light_pos: self.config.light_pos,
                    grow_to_light: self.config.grow_to_light,
                    max_attempts: self.config.max_branch_attempts,
                };
                growth::split(&mut self.store, index, &params, &mut self.rng)
            }
            ParticleKind::Automata => Err(SystemError::Unsupported {
                operation: "split",
                kind: self.kind,
            }),
        }
    }

    /// Slot in `candidates` whose particle is closest to the light.
    /// Ties go to the earliest slot.
    pub fn nearest_particle(&self, candidates: &[usize]) -> Option<usize> {
        let light = self.config.light_pos;
        let mut best: Option<(usize, f32)> = None;
        for (slot, &index) in candidates.iter().enumerate() {
            let Ok(particle) = self.store.get(index) else {
                continue;
            };
            let d = particle.position.distance_squared(light);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((slot, d));
            }
        }
        best.map(|(slot, _)| slot)
    }

    /// Remove the particles at the given storage indices along with every
    /// link to them.
    pub fn delete_particles(&mut self, indices: &[usize]) -> Result<Vec<ParticleId>, SystemError> {
        let removed = self.store.remove_indices(indices)?;
        if !removed.is_empty() {
            log::debug!("removed {} particles, {} left", removed.len(), self.size());
        }
        Ok(removed)
    }

    // ---------- statistics ----------

    /// Mean position of all particles; zero for an empty system.
    pub fn calculate_particle_centre(&mut self) -> Vec3 {
        self.particle_centre = centroid(&self.store.positions()).unwrap_or(Vec3::ZERO);
        self.particle_centre
    }

    /// Mean per-axis absolute offset from the particle centre.
    pub fn calculate_average_distance_from_centre(&mut self) -> Vec3 {
        let centre = self.calculate_particle_centre();
        let offsets: Vec<Vec3> = self
            .store
            .iter()
            .map(|p| (centre - p.position).abs())
            .collect();
        self.average_distance = centroid(&offsets).unwrap_or(Vec3::ZERO);
        self.average_distance
    }

    // ---------- draw data ----------

    pub fn draw_instances(&self) -> Vec<DrawInstance> {
        self.store.iter().map(DrawInstance::from).collect()
    }

    /// Flat `(x, y, z, radius)` per particle, in storage order.
    pub fn package_data_for_drawing(&self, out: &mut Vec<f32>) {
        out.clear();
        let instances = self.draw_instances();
        out.extend_from_slice(bytemuck::cast_slice(instances.as_slice()));
    }

    /// `(neighbour id, own id)` for every link seen from every particle, so
    /// each undirected edge appears once per endpoint.
    pub fn links_for_draw(&self, out: &mut Vec<u32>) {
        out.clear();
        for particle in self.store.iter() {
            for &other in particle.connections() {
                if self.store.contains(other) {
                    out.push(other.0);
                    out.push(particle.id().0);
                }
            }
        }
    }

    // ---------- access ----------

    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn size(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.store.iter()
    }

    pub fn particle(&self, id: ParticleId) -> Result<&Particle, SystemError> {
        self.store.by_id(id)
    }

    pub fn particle_by_index(&self, index: usize) -> Result<&Particle, SystemError> {
        self.store.get(index)
    }

    pub fn particle_by_index_mut(&mut self, index: usize) -> Result<&mut Particle, SystemError> {
        self.store.get_mut(index)
    }

    pub fn index_of(&self, id: ParticleId) -> Result<usize, SystemError> {
        self.store.index_of(id)
    }

    /// Link two particles both ways.
    pub fn double_connect(&mut self, a: ParticleId, b: ParticleId) -> Result<(), SystemError> {
        self.store.double_connect(a, b)
    }

    /// Unlink two particles both ways.
    pub fn delete_connection(&mut self, a: ParticleId, b: ParticleId) -> Result<(), SystemError> {
        self.store.unlink(a, b)
    }

    pub fn particle_centre(&self) -> Vec3 {
        self.particle_centre
    }

    pub fn average_distance(&self) -> Vec3 {
        self.average_distance
    }

    // ---------- bulk operations ----------

    /// Push linked particles near the centre outward, then step positions once.
    pub fn bulge(&mut self) {
        if self.kind != ParticleKind::Linked {
            return;
        }
        let centre = self.calculate_particle_centre();
        linked::bulge(&mut self.store, centre);
        self.integrate();
        self.calculate_particle_centre();
    }

    /// Feed about a third of the linked particles, picked at random, then
    /// step positions once.
    pub fn add_food(&mut self) {
        if self.kind != ParticleKind::Linked || self.store.is_empty() {
            return;
        }
        let len = self.store.len();
        for _ in 0..=len / 3 {
            let index = self.rng.gen_range(0..len);
            if let Some(state) = self
                .store
                .get_mut(index)
                .ok()
                .and_then(Particle::as_linked_mut)
            {
                state.feeding = Some(0);
            }
        }
        self.integrate();
    }

    // ---------- parameter setters ----------

    pub fn set_particle_size(&mut self, size: f32) {
        self.config.particle_size = size;
        for particle in self.store.iter_mut() {
            particle.size = size;
        }
    }

    /// Takes the slider value; stores `100 - amount`.
    pub fn set_cohesion(&mut self, amount: i32) {
        self.config.cohesion = 100 - amount;
    }

    /// Takes the slider value; stores `100 - amount`.
    pub fn set_local_cohesion(&mut self, amount: i32) {
        self.config.local_cohesion = 100 - amount;
    }

    pub fn set_automata_radius(&mut self, amount: i32) {
        self.config.automata_radius = amount;
    }

    pub fn set_automata_time(&mut self, amount: i32) {
        self.config.automata_time = amount;
    }

    pub fn set_branch_length(&mut self, length: f32) {
        self.config.branch_length = length;
        for particle in self.store.iter_mut() {
            if let Some(state) = particle.as_growth_mut() {
                state.branch_length = length;
            }
        }
    }

    pub fn set_child_threshold(&mut self, threshold: u32) {
        self.config.child_threshold = threshold;
        for particle in self.store.iter_mut() {
            if let Some(state) = particle.as_growth_mut() {
                state.child_threshold = threshold;
            }
        }
    }

    pub fn set_food_threshold(&mut self, threshold: u32) {
        self.config.food_threshold = threshold;
        for particle in self.store.iter_mut() {
            if let Some(state) = particle.as_linked_mut() {
                state.food_threshold = threshold;
            }
        }
    }

    pub fn set_light_pos(&mut self, light_pos: Vec3) {
        self.config.light_pos = light_pos;
    }

    pub fn toggle_forces(&mut self, state: bool) {
        self.config.forces_enabled = state;
    }

    pub fn toggle_particle_death(&mut self, state: bool) {
        self.config.particle_death = state;
    }

    pub fn set_nearest_particle_state(&mut self, state: bool) {
        self.config.nearest_particle = state;
    }

    pub fn set_grow_to_light(&mut self, state: bool) {
        self.config.grow_to_light = state;
    }
}
