use std::collections::HashMap;

use glam::Vec3;

use crate::error::SystemError;
use crate::particle::{Particle, ParticleId, VariantState};

/// Owning arena for one system's particles.
///
/// Storage order is insertion order and shifts on removal; the
/// `id -> index` map is rebuilt after every removal so lookups by id never
/// scan. Ids come from a counter owned by the store and restart only through
/// [`ParticleStore::clear`].
#[derive(Debug, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    index: HashMap<ParticleId, usize>,
    next_id: u32,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Drop every particle and restart the id sequence at zero.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.index.clear();
        self.next_id = 0;
    }

    /// Number of ids handed out since the last `clear`.
    pub fn issued_ids(&self) -> u32 {
        self.next_id
    }

    /// Create a particle with a fresh id and append it.
    pub fn spawn(
        &mut self,
        position: Vec3,
        size: f32,
        connections: Vec<ParticleId>,
        state: VariantState,
    ) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        log::debug!(
            "spawn {:?} particle {} at ({:.3}, {:.3}, {:.3})",
            state.kind(),
            id,
            position.x,
            position.y,
            position.z
        );
        self.index.insert(id, self.particles.len());
        self.particles
            .push(Particle::new(id, position, size, connections, state));
        id
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn index_of(&self, id: ParticleId) -> Result<usize, SystemError> {
        self.index
            .get(&id)
            .copied()
            .ok_or(SystemError::UnknownParticle(id))
    }

    pub fn get(&self, index: usize) -> Result<&Particle, SystemError> {
        let len = self.particles.len();
        self.particles
            .get(index)
            .ok_or(SystemError::IndexOutOfBounds { index, len })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Particle, SystemError> {
        let len = self.particles.len();
        self.particles
            .get_mut(index)
            .ok_or(SystemError::IndexOutOfBounds { index, len })
    }

    pub fn by_id(&self, id: ParticleId) -> Result<&Particle, SystemError> {
        let index = self.index_of(id)?;
        self.get(index)
    }

    pub fn by_id_mut(&mut self, id: ParticleId) -> Result<&mut Particle, SystemError> {
        let index = self.index_of(id)?;
        self.get_mut(index)
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    pub fn positions(&self) -> Vec<Vec3> {
        self.particles.iter().map(|p| p.position).collect()
    }

    /// Positions of `particle`'s neighbours, in connection order.
    pub fn connection_positions(&self, particle: &Particle) -> Result<Vec<Vec3>, SystemError> {
        particle
            .connections()
            .iter()
            .map(|&id| self.by_id(id).map(|p| p.position))
            .collect()
    }

    /// Connect `a` and `b` both ways.
    pub fn double_connect(&mut self, a: ParticleId, b: ParticleId) -> Result<(), SystemError> {
        // Resolve both first so a failure leaves no half edge behind.
        let ia = self.index_of(a)?;
        let ib = self.index_of(b)?;
        self.particles[ia].connect(b);
        self.particles[ib].connect(a);
        Ok(())
    }

    /// Remove the edge between `a` and `b` on both sides.
    pub fn unlink(&mut self, a: ParticleId, b: ParticleId) -> Result<(), SystemError> {
        let ia = self.index_of(a)?;
        let ib = self.index_of(b)?;
        self.particles[ia].delete_connection(b);
        self.particles[ib].delete_connection(a);
        Ok(())
    }

    /// Link two particles by storage index. Out-of-range indices are ignored.
    pub(crate) fn link_indices(&mut self, a: usize, b: usize) {
        if a == b || a >= self.particles.len() || b >= self.particles.len() {
            return;
        }
        let id_a = self.particles[a].id();
        let id_b = self.particles[b].id();
        self.particles[a].connect(id_b);
        self.particles[b].connect(id_a);
    }

    /// Remove the particles at `indices` (any order, duplicates ignored) and
    /// every edge pointing at them. Returns the removed ids.
    pub fn remove_indices(&mut self, indices: &[usize]) -> Result<Vec<ParticleId>, SystemError> {
        let len = self.particles.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(SystemError::IndexOutOfBounds { index, len });
        }

        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        // Highest first, so earlier removals never shift later targets.
        let mut removed = Vec::with_capacity(sorted.len());
        for &index in sorted.iter().rev() {
            removed.push(self.particles.remove(index).id());
        }

        if !removed.is_empty() {
            for particle in self.particles.iter_mut() {
                for id in &removed {
                    particle.delete_connection(*id);
                }
            }
            self.rebuild_index();
        }
        Ok(removed)
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, p) in self.particles.iter().enumerate() {
            self.index.insert(p.id(), i);
        }
    }
}
