use glam::Vec3;
use rand::Rng;

/// Squared magnitude below which a vector is treated as having no direction.
pub const DIRECTION_EPSILON: f32 = 1.0e-12;

/// Normalize `v`, returning `fallback` when `v` is (nearly) zero-length.
pub fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
    let len_sq = v.length_squared();
    if len_sq < DIRECTION_EPSILON || !len_sq.is_finite() {
        fallback
    } else {
        v / len_sq.sqrt()
    }
}

/// Unit normal of the plane spanned by the origin, `a` and `b`.
///
/// Falls back to +Y when `a` and `b` are colinear with the origin.
pub fn plane_normal(a: Vec3, b: Vec3) -> Vec3 {
    normalize_or(a.cross(b), Vec3::Y)
}

/// Signed distance of `point` from the plane through `plane_point` with unit `normal`.
#[inline]
pub fn plane_side(normal: Vec3, plane_point: Vec3, point: Vec3) -> f32 {
    normal.dot(point - plane_point)
}

/// Uniform sample per axis between `from` and `to` (either order).
pub fn sample_between<R: Rng + ?Sized>(rng: &mut R, from: Vec3, to: Vec3) -> Vec3 {
    Vec3::new(
        sample_axis(rng, from.x, to.x),
        sample_axis(rng, from.y, to.y),
        sample_axis(rng, from.z, to.z),
    )
}

/// Uniform sample inside the axis-aligned cube `[-half, half]^3`.
pub fn sample_cube<R: Rng + ?Sized>(rng: &mut R, half: f32) -> Vec3 {
    sample_between(rng, Vec3::splat(-half), Vec3::splat(half))
}

fn sample_axis<R: Rng + ?Sized>(rng: &mut R, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi - lo <= f32::EPSILON {
        lo
    } else {
        rng.gen_range(lo..hi)
    }
}

/// Mean of `points`, or `None` for an empty slice.
pub fn centroid(points: &[Vec3]) -> Option<Vec3> {
    if points.is_empty() {
        return None;
    }
    let sum: Vec3 = points.iter().copied().sum();
    Some(sum / points.len() as f32)
}
