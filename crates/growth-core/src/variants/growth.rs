use std::collections::HashSet;

use glam::Vec3;
use rand::Rng;

use crate::error::SystemError;
use crate::math::{normalize_or, sample_between, sample_cube};
use crate::particle::{GrowthState, ParticleId, VariantState};
use crate::store::ParticleStore;

/// Generations walked up before the subtree collision test. Bounds the
/// check to the local neighbourhood of the branch instead of the whole tree.
pub const COLLISION_LEVELS: usize = 2;

/// Offset added to the particle's own coordinates when sampling toward the light.
const LIGHT_SAMPLE_OFFSET: f32 = 0.001;

#[derive(Clone, Copy, Debug)]
pub struct SplitParams {
    pub light_pos: Vec3,
    pub grow_to_light: bool,
    /// Re-samples allowed before the split is abandoned.
    pub max_attempts: usize,
}

/// Grow one new branch from the particle at `index`.
///
/// Returns `None` when the particle already has `child_threshold` links or
/// every sampled direction collided.
pub fn split<R: Rng + ?Sized>(
    store: &mut ParticleStore,
    index: usize,
    params: &SplitParams,
    rng: &mut R,
) -> Result<Option<ParticleId>, SystemError> {
    let particle = store.get(index)?;
    let Some(state) = particle.as_growth() else {
        return Ok(None);
    };
    if particle.connection_count() >= state.child_threshold as usize {
        return Ok(None);
    }

    let id = particle.id();
    let pos = particle.position;
    let size = particle.size;
    let child_state = GrowthState {
        parent: Some(id),
        child_threshold: state.child_threshold,
        branch_length: state.branch_length,
    };
    let reach = size * state.branch_length;

    let mut placed = None;
    for _ in 0..params.max_attempts.max(1) {
        let target = if params.grow_to_light {
            sample_between(rng, pos + Vec3::splat(LIGHT_SAMPLE_OFFSET), params.light_pos)
        } else {
            pos + sample_cube(rng, 1.0)
        };
        let candidate = pos + normalize_or(target - pos, Vec3::Y) * reach;
        if !collision(store, id, candidate, COLLISION_LEVELS)? {
            placed = Some(candidate);
            break;
        }
    }

    let Some(candidate) = placed else {
        log::debug!(
            "particle {} found no free branch position in {} attempts",
            id,
            params.max_attempts
        );
        return Ok(None);
    };

    let child_id = store.spawn(candidate, size, vec![id], VariantState::Growth(child_state));
    store.by_id_mut(id)?.connect(child_id);
    Ok(Some(child_id))
}

/// Does `candidate` hit the subtree rooted `levels` generations above `id`?
pub fn collision(
    store: &ParticleStore,
    id: ParticleId,
    candidate: Vec3,
    levels: usize,
) -> Result<bool, SystemError> {
    let ancestor = ancestor(store, id, levels)?;
    subtree_collision(store, ancestor, candidate)
}

/// Walk up to `levels` parents from `id`, stopping at the root.
pub fn ancestor(store: &ParticleStore, id: ParticleId, levels: usize) -> Result<ParticleId, SystemError> {
    let mut current = id;
    for _ in 0..levels {
        match store.by_id(current)?.as_growth().and_then(|g| g.parent) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    Ok(current)
}

/// Depth-first point-in-sphere test over `root` and all its descendants.
///
/// A particle is hit when the candidate lies within half its size.
pub fn subtree_collision(
    store: &ParticleStore,
    root: ParticleId,
    candidate: Vec3,
) -> Result<bool, SystemError> {
    let mut stack = vec![root];
    let mut visited = HashSet::new();
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let particle = store.by_id(id)?;
        if particle.position.distance(candidate) <= particle.size / 2.0 {
            return Ok(true);
        }
        let parent = particle.as_growth().and_then(|g| g.parent);
        stack.extend(
            particle
                .connections()
                .iter()
                .rev()
                .copied()
                .filter(|&c| Some(c) != parent),
        );
    }
    Ok(false)
}

/// Children of a growth particle, i.e. every link except the parent.
pub fn children(store: &ParticleStore, id: ParticleId) -> Result<Vec<ParticleId>, SystemError> {
    let particle = store.by_id(id)?;
    let parent = particle.as_growth().and_then(|g| g.parent);
    Ok(particle
        .connections()
        .iter()
        .copied()
        .filter(|&c| Some(c) != parent)
        .collect())
}
