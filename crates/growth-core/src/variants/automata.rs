use glam::Vec3;
use rand::Rng;

use crate::error::SystemError;
use crate::grid::NeighbourGrid;
use crate::math::{normalize_or, sample_cube};
use crate::particle::VariantState;
use crate::store::ParticleStore;

/// Fewest neighbours a live cell needs to survive.
pub const SURVIVE_MIN: usize = 2;
/// Most neighbours a live cell tolerates.
pub const SURVIVE_MAX: usize = 3;
/// Neighbour count at which a cell gives birth when its timer fires.
pub const BIRTH_NEIGHBOURS: usize = 3;

#[derive(Clone, Copy, Debug)]
pub struct RuleParams {
    /// Neighbourhood radius in multiples of the particle size.
    pub automata_radius: i32,
    /// Ticks between birth attempts.
    pub automata_time: i32,
}

/// Outcome of one automaton tick, applied by the owning system.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleOutcome {
    /// Storage indices of cells that died this tick, ascending.
    pub deaths: Vec<usize>,
    /// Positions and sizes of cells born this tick.
    pub births: Vec<(Vec3, f32)>,
}

pub fn neighbourhood_radius(size: f32, automata_radius: i32) -> f32 {
    size * automata_radius.max(0) as f32
}

/// Survival rule: a live cell stays alive with `SURVIVE_MIN..=SURVIVE_MAX` neighbours.
pub fn survives(neighbours: usize) -> bool {
    (SURVIVE_MIN..=SURVIVE_MAX).contains(&neighbours)
}

/// Evaluate the rule for every cell against one position snapshot.
///
/// Liveness and timers are written back to the store; removals and
/// insertions are returned so the caller can apply them after integration.
pub fn step<R: Rng + ?Sized>(
    store: &mut ParticleStore,
    grid: &mut NeighbourGrid,
    params: &RuleParams,
    rng: &mut R,
) -> Result<RuleOutcome, SystemError> {
    let positions = store.positions();
    let max_radius = store
        .iter()
        .map(|p| neighbourhood_radius(p.size, params.automata_radius))
        .fold(0.0_f32, f32::max);
    grid.build(&positions, max_radius);

    let birth_interval = params.automata_time.max(1) as u32;
    let mut outcome = RuleOutcome::default();

    for index in 0..store.len() {
        let particle = store.get(index)?;
        if particle.as_automata().is_none() {
            continue;
        }
        let radius = neighbourhood_radius(particle.size, params.automata_radius);
        let neighbours = if radius > 0.0 {
            grid.count_within(&positions, index, radius)
        } else {
            0
        };
        let size = particle.size;
        let pos = particle.position;

        let particle = store.get_mut(index)?;
        let Some(cell) = particle.as_automata_mut() else {
            continue;
        };
        cell.alive = cell.alive && survives(neighbours);
        if !cell.alive {
            outcome.deaths.push(index);
            continue;
        }

        cell.timer += 1;
        if cell.timer >= birth_interval {
            cell.timer = 0;
            if neighbours == BIRTH_NEIGHBOURS {
                let dir = normalize_or(sample_cube(rng, 1.0), Vec3::X);
                outcome.births.push((pos + dir * size * 2.0, size));
            }
        }
    }

    Ok(outcome)
}

/// Append the cells described by `births`.
pub fn spawn_births(store: &mut ParticleStore, births: &[(Vec3, f32)]) {
    for &(position, size) in births {
        store.spawn(position, size, Vec::new(), VariantState::Automata(Default::default()));
    }
}
