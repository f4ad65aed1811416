use glam::Vec3;

/// Uniform spatial hash grid for radius neighbour queries.
///
/// Built by counting sort: count per bucket -> prefix sum -> scatter. The
/// cell size is the query radius, so the 3x3x3 block around a cell covers
/// every candidate.
#[derive(Debug, Default)]
pub struct NeighbourGrid {
    cell_size: f32,
    inv_cell_size: f32,
    bucket_count: Vec<u32>,
    bucket_start: Vec<u32>,
    sorted_indices: Vec<u32>,
    particle_buckets: Vec<u32>,
}

impl NeighbourGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from `positions` with cells of edge `cell_size`.
    pub fn build(&mut self, positions: &[Vec3], cell_size: f32) {
        let count = positions.len();
        self.cell_size = cell_size.max(f32::EPSILON);
        self.inv_cell_size = 1.0 / self.cell_size;

        let table_size = (count * 2).next_power_of_two().max(64);
        self.bucket_count.clear();
        self.bucket_count.resize(table_size, 0);
        self.bucket_start.clear();
        self.bucket_start.resize(table_size, 0);
        self.sorted_indices.clear();
        self.sorted_indices.resize(count, 0);
        self.particle_buckets.clear();
        self.particle_buckets.resize(count, 0);

        for (i, &pos) in positions.iter().enumerate() {
            let (cx, cy, cz) = self.cell_coords(pos);
            let h = self.hash_cell(cx, cy, cz);
            self.particle_buckets[i] = h as u32;
            self.bucket_count[h] += 1;
        }

        for k in 1..table_size {
            self.bucket_start[k] = self.bucket_start[k - 1] + self.bucket_count[k - 1];
        }

        self.bucket_count.iter_mut().for_each(|c| *c = 0);
        for i in 0..count {
            let h = self.particle_buckets[i] as usize;
            let slot = self.bucket_start[h] + self.bucket_count[h];
            self.sorted_indices[slot as usize] = i as u32;
            self.bucket_count[h] += 1;
        }
    }

    /// Visit every particle stored in the 27 cells around `pos`.
    ///
    /// Each bucket is visited once even when several cells hash into it, so
    /// the callback never sees an index twice. Distance checks are the
    /// caller's job.
    pub fn for_each_candidate<F: FnMut(usize)>(&self, pos: Vec3, mut callback: F) {
        if self.bucket_count.is_empty() {
            return;
        }
        let (cx, cy, cz) = self.cell_coords(pos);
        let mut seen = [usize::MAX; 27];
        let mut n_seen = 0;
        for dx in -1..=1_i32 {
            for dy in -1..=1_i32 {
                for dz in -1..=1_i32 {
                    let h = self.hash_cell(cx + dx, cy + dy, cz + dz);
                    if seen[..n_seen].contains(&h) {
                        continue;
                    }
                    seen[n_seen] = h;
                    n_seen += 1;

                    let start = self.bucket_start[h] as usize;
                    let end = start + self.bucket_count[h] as usize;
                    for &idx in &self.sorted_indices[start..end] {
                        callback(idx as usize);
                    }
                }
            }
        }
    }

    /// Number of particles other than `index` within `radius` of it.
    ///
    /// `positions` must be the slice the grid was last built from, and
    /// `radius` must not exceed the cell size.
    pub fn count_within(&self, positions: &[Vec3], index: usize, radius: f32) -> usize {
        let Some(&centre) = positions.get(index) else {
            return 0;
        };
        let radius_sq = radius * radius;
        let mut count = 0;
        self.for_each_candidate(centre, |other| {
            if other != index && positions[other].distance_squared(centre) <= radius_sq {
                count += 1;
            }
        });
        count
    }

    #[inline]
    fn hash_cell(&self, cx: i32, cy: i32, cz: i32) -> usize {
        let h = (cx as u32).wrapping_mul(73856093)
            ^ (cy as u32).wrapping_mul(19349663)
            ^ (cz as u32).wrapping_mul(83492791);
        (h as usize) % self.bucket_count.len()
    }

    #[inline]
    fn cell_coords(&self, pos: Vec3) -> (i32, i32, i32) {
        (
            (pos.x * self.inv_cell_size).floor() as i32,
            (pos.y * self.inv_cell_size).floor() as i32,
            (pos.z * self.inv_cell_size).floor() as i32,
        )
    }
}
