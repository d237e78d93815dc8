//! Gaussian splat injection.
//!
//! Splats are the only forcing in the simulation: a pointer drag or an
//! automatic impulse adds a Gaussian-weighted value (a velocity impulse or
//! a dye color) around a normalized point.

use crate::compute::field::Field;

/// Add `exp(-|p|^2 / radius) * value` around `point`, reading `src` and
/// writing `dst` (the caller swaps afterwards).
///
/// `p` is the offset from `point` in normalized coordinates with its x
/// component scaled by the viewport aspect ratio, so splats stay round on
/// non-square viewports. `radius` is the Gaussian denominator itself; the
/// configured splat radius is divided by 100 before it gets here.
pub fn splat_into(
    src: &Field,
    dst: &mut Field,
    point: (f32, f32),
    value: &[f32],
    radius: f32,
    aspect: f32,
) {
    debug_assert_eq!(value.len(), dst.channels());
    let grid = dst.grid();
    let (du, dv) = grid.texel_size();

    for y in 0..grid.height {
        let v = (y as f32 + 0.5) * dv;
        let py = v - point.1;
        for x in 0..grid.width {
            let u = (x as f32 + 0.5) * du;
            let px = (u - point.0) * aspect;
            let gauss = (-(px * px + py * py) / radius).exp();
            for (c, &add) in value.iter().enumerate() {
                dst.set(x, y, c, src.get(x, y, c) + gauss * add);
            }
        }
    }
}
