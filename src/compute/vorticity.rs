//! Curl measurement and vorticity confinement.
//!
//! Semi-Lagrangian advection smears out small eddies; confinement measures
//! the local rotation (curl), then pushes velocity along the gradient of
//! its magnitude to feed the rotation back in.

use crate::compute::field::Field;

/// Keeps the confinement force normalization finite where the curl
/// magnitude gradient vanishes.
const NORM_EPSILON: f32 = 1e-4;

/// Measure curl from the velocity field.
///
/// `curl = 0.5 * ((R.y - L.y) - (T.x - B.x))` with free-slip velocity
/// sampling at the walls.
pub fn curl_into(velocity: &Field, curl: &mut Field) {
    let grid = curl.grid();
    for y in 0..grid.height {
        for x in 0..grid.width {
            let xi = x as isize;
            let yi = y as isize;
            let l = velocity.velocity_edge(xi - 1, yi);
            let r = velocity.velocity_edge(xi + 1, yi);
            let b = velocity.velocity_edge(xi, yi - 1);
            let t = velocity.velocity_edge(xi, yi + 1);
            curl.set(x, y, 0, 0.5 * ((r[1] - l[1]) - (t[0] - b[0])));
        }
    }
}

/// Apply the confinement force to velocity.
///
/// The force points along the gradient of |curl|, normalized with a small
/// epsilon, scaled by the local curl and `curl_strength`; its y component
/// is negated so the push circulates rather than diverges.
pub fn confine_vorticity(
    velocity: &Field,
    curl: &Field,
    out: &mut Field,
    curl_strength: f32,
    dt: f32,
) {
    let grid = out.grid();
    for y in 0..grid.height {
        for x in 0..grid.width {
            let xi = x as isize;
            let yi = y as isize;
            let l = curl.get_clamped(xi - 1, yi, 0).abs();
            let r = curl.get_clamped(xi + 1, yi, 0).abs();
            let b = curl.get_clamped(xi, yi - 1, 0).abs();
            let t = curl.get_clamped(xi, yi + 1, 0).abs();
            let center = curl.get(x, y, 0);

            let mut fx = 0.5 * (t - b);
            let mut fy = 0.5 * (r - l);
            let inv_len = 1.0 / ((fx * fx + fy * fy).sqrt() + NORM_EPSILON);
            fx *= inv_len * curl_strength * center;
            fy *= inv_len * curl_strength * center;
            fy = -fy;

            out.set(x, y, 0, velocity.get(x, y, 0) + fx * dt);
            out.set(x, y, 1, velocity.get(x, y, 1) + fy * dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::field::Grid;
    use crate::compute::format::{FilterMode, NegotiatedFormat, Precision};

    fn field(grid: Grid, channels: usize) -> Field {
        Field::new(
            grid,
            channels,
            NegotiatedFormat {
                components: channels,
                precision: Precision::Single,
            },
            FilterMode::Linear,
        )
    }

    #[test]
    fn test_curl_of_still_fluid_is_zero() {
        let grid = Grid {
            width: 16,
            height: 16,
        };
        let velocity = field(grid, 2);
        let mut curl = field(grid, 1);
        curl_into(&velocity, &mut curl);

        for &v in curl.data() {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn test_curl_of_rigid_rotation() {
        // v = (-(y - cy), x - cx): constant curl of 2 per unit spacing.
        let grid = Grid {
            width: 16,
            height: 16,
        };
        let mut velocity = field(grid, 2);
        let c = 7.5;
        for y in 0..16 {
            for x in 0..16 {
                velocity.set(x, y, 0, -(y as f32 - c));
                velocity.set(x, y, 1, x as f32 - c);
            }
        }
        let mut curl = field(grid, 1);
        curl_into(&velocity, &mut curl);

        for y in 2..14 {
            for x in 2..14 {
                let v = curl.get(x, y, 0);
                assert!(
                    (v - 2.0).abs() < 1e-5,
                    "interior curl at ({}, {}) should be 2, got {}",
                    x,
                    y,
                    v
                );
            }
        }
    }

    #[test]
    fn test_confinement_leaves_still_fluid_alone() {
        let grid = Grid {
            width: 8,
            height: 8,
        };
        let velocity = field(grid, 2);
        let curl = field(grid, 1);
        let mut out = field(grid, 2);
        confine_vorticity(&velocity, &curl, &mut out, 30.0, 0.016);

        for &v in out.data() {
            assert_eq!(v, 0.0, "zero curl must produce zero force");
        }
    }

    #[test]
    fn test_confinement_is_finite_at_flat_curl() {
        // Uniform nonzero curl: the magnitude gradient vanishes and only
        // the epsilon keeps the normalization finite.
        let grid = Grid {
            width: 8,
            height: 8,
        };
        let mut velocity = field(grid, 2);
        velocity.set(4, 4, 0, 1.0);
        let mut curl = field(grid, 1);
        for i in 0..curl.data().len() {
            curl.data_mut()[i] = 3.0;
        }
        let mut out = field(grid, 2);
        confine_vorticity(&velocity, &curl, &mut out, 30.0, 0.016);

        for &v in out.data() {
            assert!(v.is_finite());
        }
        // Flat gradient: the normalized direction is ~0, velocity passes
        // through essentially unchanged.
        assert!((out.get(4, 4, 0) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_confinement_zero_dt_is_identity() {
        let grid = Grid {
            width: 8,
            height: 8,
        };
        let mut velocity = field(grid, 2);
        velocity.set(3, 3, 0, 0.7);
        velocity.set(3, 3, 1, -0.2);
        let mut curl = field(grid, 1);
        curl.set(3, 3, 0, 5.0);
        curl.set(4, 3, 0, 1.0);
        let mut out = field(grid, 2);
        confine_vorticity(&velocity, &curl, &mut out, 30.0, 0.0);

        assert_eq!(out.get(3, 3, 0), 0.7);
        assert_eq!(out.get(3, 3, 1), -0.2);
    }
}
