//! Divergence, pressure solve, and projection.
//!
//! The incompressibility pass: measure divergence of the post-confinement
//! velocity, solve the pressure Poisson equation with a fixed number of
//! Jacobi iterations, then subtract the pressure gradient from velocity.
//! Pressure is warm-started from the previous frame, damped rather than
//! zeroed.

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::compute::field::{DoubleBuffer, Field};

/// Measure velocity divergence.
///
/// `div = 0.5 * ((R.x - L.x) + (T.y - B.y))` with free-slip velocity
/// sampling at the walls, so outflow through a wall reads as compression
/// against it.
pub fn divergence_into(velocity: &Field, divergence: &mut Field) {
    let grid = divergence.grid();
    for y in 0..grid.height {
        for x in 0..grid.width {
            let xi = x as isize;
            let yi = y as isize;
            let l = velocity.velocity_edge(xi - 1, yi);
            let r = velocity.velocity_edge(xi + 1, yi);
            let b = velocity.velocity_edge(xi, yi - 1);
            let t = velocity.velocity_edge(xi, yi + 1);
            divergence.set(x, y, 0, 0.5 * ((r[0] - l[0]) + (t[1] - b[1])));
        }
    }
}

/// Copy `src` into `dst` scaled by `factor`.
///
/// Used for the pressure warm start: the previous frame's solution, damped,
/// seeds the next Jacobi solve.
pub fn scale_into(src: &Field, dst: &mut Field, factor: f32) {
    for (d, s) in dst.data_mut().iter_mut().zip(src.data().iter()) {
        *d = *s * factor;
    }
}

/// One Jacobi relaxation pass: `p' = (L + R + T + B - div) / 4` with
/// pressure neighbors clamped at the walls.
pub fn jacobi_into(pressure: &Field, divergence: &Field, out: &mut Field) {
    let grid = out.grid();
    let width = grid.width;
    let stride = out.stride();

    let relax_row = |y: usize, row: &mut [f32]| {
        let yi = y as isize;
        for x in 0..width {
            let xi = x as isize;
            let l = pressure.get_clamped(xi - 1, yi, 0);
            let r = pressure.get_clamped(xi + 1, yi, 0);
            let b = pressure.get_clamped(xi, yi - 1, 0);
            let t = pressure.get_clamped(xi, yi + 1, 0);
            let div = divergence.get(x, y, 0);
            row[x * stride] = (l + r + b + t - div) * 0.25;
        }
    };

    #[cfg(not(target_arch = "wasm32"))]
    out.data_mut()
        .par_chunks_mut(width * stride)
        .enumerate()
        .for_each(|(y, row)| relax_row(y, row));

    #[cfg(target_arch = "wasm32")]
    out.data_mut()
        .chunks_mut(width * stride)
        .enumerate()
        .for_each(|(y, row)| relax_row(y, row));
}

/// Run the fixed-iteration Jacobi solve, swapping read/write each pass.
pub fn solve_pressure(pressure: &mut DoubleBuffer, divergence: &Field, iterations: u32) {
    for _ in 0..iterations {
        let (read, write) = pressure.pair_mut();
        jacobi_into(read, divergence, write);
        pressure.swap();
    }
}

/// Project velocity: `v' = v - (R - L, T - B)` of pressure.
pub fn subtract_gradient(pressure: &Field, velocity: &Field, out: &mut Field) {
    let grid = out.grid();
    for y in 0..grid.height {
        for x in 0..grid.width {
            let xi = x as isize;
            let yi = y as isize;
            let l = pressure.get_clamped(xi - 1, yi, 0);
            let r = pressure.get_clamped(xi + 1, yi, 0);
            let b = pressure.get_clamped(xi, yi - 1, 0);
            let t = pressure.get_clamped(xi, yi + 1, 0);
            out.set(x, y, 0, velocity.get(x, y, 0) - (r - l));
            out.set(x, y, 1, velocity.get(x, y, 1) - (t - b));
        }
    }
}
