use glam::Vec3;
use rand::Rng;

use crate::error::SystemError;
use crate::math::{centroid, normalize_or, plane_normal, plane_side};
use crate::particle::{LinkedState, ParticleId, VariantState};
use crate::store::ParticleStore;

/// Ticks a particle must live before it can freeze.
pub const DEATH_AGE: u32 = 200;
/// Ticks a fed particle keeps digesting.
pub const FEEDING_TICKS: u32 = 10;

/// The icosahedron's twelve vertices, in seeding order.
pub const ICOSAHEDRON_VERTICES: [Vec3; 12] = {
    const X: f32 = 0.525_731_1;
    const Z: f32 = 0.850_650_8;
    const N: f32 = 0.0;
    [
        Vec3::new(-X, N, Z),
        Vec3::new(X, N, Z),
        Vec3::new(-X, N, -Z),
        Vec3::new(X, N, -Z),
        Vec3::new(N, Z, X),
        Vec3::new(N, Z, -X),
        Vec3::new(N, -Z, X),
        Vec3::new(N, -Z, -X),
        Vec3::new(Z, X, N),
        Vec3::new(-Z, X, N),
        Vec3::new(Z, -X, N),
        Vec3::new(-Z, -X, N),
    ]
};

/// The icosahedron's thirty edges as vertex index pairs.
pub const ICOSAHEDRON_EDGES: [(usize, usize); 30] = [
    (0, 1), (0, 4), (0, 6), (0, 9), (0, 11),
    (1, 4), (1, 6), (1, 8), (1, 10),
    (2, 3), (2, 5), (2, 7), (2, 9), (2, 11),
    (3, 5), (3, 7), (3, 8), (3, 10),
    (4, 5), (4, 8), (4, 9),
    (5, 8), (5, 9),
    (6, 7), (6, 10), (6, 11),
    (7, 10), (7, 11),
    (8, 10),
    (9, 11),
];

/// System-wide inputs to one linked force evaluation.
#[derive(Clone, Copy, Debug)]
pub struct ForceParams {
    pub average_distance: Vec3,
    pub particle_centre: Vec3,
    /// Global cohesion divisor (`100 - slider`).
    pub cohesion: i32,
    /// Local cohesion divisor (`100 - slider`).
    pub local_cohesion: i32,
    pub particle_death: bool,
}

/// Accumulate this tick's forces into the velocity of the particle at `index`.
///
/// Returns `true` once the particle has eaten enough to split.
pub fn calculate(
    store: &mut ParticleStore,
    index: usize,
    params: &ForceParams,
) -> Result<bool, SystemError> {
    let particle = store.get(index)?;
    let Some(state) = particle.as_linked() else {
        return Ok(false);
    };
    let id = particle.id();
    let pos = particle.position;
    let size = particle.size;
    let mut vel = particle.velocity;
    let mut state = state.clone();
    let link_positions = store.connection_positions(particle)?;

    // ==== 1. EQUIDISTANCE ====
    // Keep away from the centre until the average radial distance is reached.
    if pos.length_squared() < params.average_distance.length_squared() {
        vel += pos / 100.0;
    } else {
        vel /= 1.5;
    }

    // ==== 2. GLOBAL COHESION ====
    let to_origin = -pos;
    let origin_len = to_origin.length();
    if origin_len >= size * 2.0 {
        vel /= 1.1;
    }
    let cohesion_dist = size + origin_len / 2.0;
    vel += normalize_or(to_origin, Vec3::ZERO) * (cohesion_dist / (params.cohesion.max(1) as f32 * 3.3));

    // ==== 3. LOCAL COHESION ====
    if let Some(link_centre) = centroid(&link_positions) {
        let to_links = link_centre - pos;
        let links_len = to_links.length();
        if links_len >= size * 2.0 {
            vel /= 1.1;
        }
        let local_dist = size + links_len / 2.0;
        vel += normalize_or(to_links, Vec3::ZERO) * (local_dist / params.local_cohesion.max(1) as f32);
    }

    // ==== 4. UNLINKED REPULSION ====
    vel += unlinked_repulsion(store, index)?;

    // ==== 5. FEEDING ====
    if let Some(ticks) = state.feeding {
        let to_centre = params.particle_centre - pos;
        if to_centre.length() <= size * 2.0 {
            vel /= 1.1;
        }
        vel += to_centre / 4.0;
        state.food_level += 1;
        let ticks = ticks + 1;
        state.feeding = if ticks >= FEEDING_TICKS { None } else { Some(ticks) };
    }

    // ==== 6. LIFESPAN ====
    if params.particle_death {
        state.life += 1;
        let touching = link_positions
            .iter()
            .any(|&p| p.distance(pos) <= size * 2.0);
        if state.life >= DEATH_AGE && touching {
            vel = Vec3::ZERO;
        }
    }

    let ready = state.is_ready_to_split();
    let particle = store.get_mut(index)?;
    particle.velocity = vel;
    particle.state = VariantState::Linked(state);
    if ready {
        log::debug!("particle {} reached its food threshold", id);
    }
    Ok(ready)
}

/// Push away from every particle that is not linked and is closer than `2 * size`.
///
/// Candidates are all ids issued since the last reset, minus self and linked
/// ids. Ids that no longer resolve are skipped.
pub fn unlinked_repulsion(store: &ParticleStore, index: usize) -> Result<Vec3, SystemError> {
    let particle = store.get(index)?;
    let pos = particle.position;
    let size = particle.size;
    let mut push = Vec3::ZERO;

    for raw in 0..store.issued_ids() {
        let other_id = ParticleId(raw);
        if other_id == particle.id() || particle.is_connected_to(other_id) {
            continue;
        }
        let Ok(other) = store.by_id(other_id) else {
            continue;
        };
        let away = pos - other.position;
        let len = away.length();
        if len <= size * 2.0 {
            push += normalize_or(away, Vec3::ZERO) * (size - len / 2.0);
        }
    }
    Ok(push)
}

/// Split the particle at `index` in two by a plane through two of its neighbours.
///
/// Neighbour 0 and a random second neighbour `b` span a plane through the
/// origin. Every other neighbour on the positive side moves to the child;
/// the rest stay. Both pivots end up linked to parent and child, and parent
/// and child are linked to each other. The child sits `size` along the plane
/// normal.
///
/// Returns `None` when the particle has fewer than two links.
pub fn split<R: Rng + ?Sized>(
    store: &mut ParticleStore,
    index: usize,
    rng: &mut R,
) -> Result<Option<ParticleId>, SystemError> {
    let parent = store.get(index)?;
    let Some(parent_state) = parent.as_linked() else {
        return Ok(None);
    };
    let connections = parent.connections().to_vec();
    if connections.len() < 2 {
        log::debug!("particle {} has too few links to split", parent.id());
        return Ok(None);
    }

    let parent_id = parent.id();
    let parent_pos = parent.position;
    let size = parent.size;
    let food_threshold = parent_state.food_threshold;
    let link_positions = store.connection_positions(parent)?;

    let a = 0;
    let b = rng.gen_range(1..connections.len());
    let normal = plane_normal(link_positions[a], link_positions[b]);

    let mut keep = Vec::new();
    let mut relink = Vec::new();
    for (i, &neighbour) in connections.iter().enumerate() {
        if i == a || i == b {
            continue;
        }
        if plane_side(normal, link_positions[a], link_positions[i]) <= 0.0 {
            keep.push(neighbour);
        } else {
            relink.push(neighbour);
        }
    }

    let pivot_a = connections[a];
    let pivot_b = connections[b];

    let mut child_links = relink.clone();
    child_links.extend([parent_id, pivot_a, pivot_b]);
    let child_id = store.spawn(
        parent_pos + normal * size,
        size,
        child_links,
        VariantState::Linked(LinkedState::new(food_threshold)),
    );

    for &moved in &relink {
        let neighbour = store.by_id_mut(moved)?;
        neighbour.delete_connection(parent_id);
        neighbour.connect(child_id);
    }
    store.by_id_mut(pivot_a)?.connect(child_id);
    store.by_id_mut(pivot_b)?.connect(child_id);

    keep.extend([pivot_a, pivot_b, child_id]);
    store.by_id_mut(parent_id)?.replace_connections(keep);

    log::debug!(
        "split {} -> {} (moved {} of {} links)",
        parent_id,
        child_id,
        relink.len(),
        connections.len()
    );
    Ok(Some(child_id))
}

/// Push particles near the centre outward by their offset from it.
pub fn bulge(store: &mut ParticleStore, particle_centre: Vec3) {
    for particle in store.iter_mut() {
        if particle.as_linked().is_none() {
            continue;
        }
        let offset = particle.position - particle_centre;
        let reach = particle.size * 2.0;
        if offset.x <= reach || offset.y <= reach || offset.z <= reach {
            particle.velocity += offset;
        }
    }
}
