//! CPU solver - stage orchestration for one simulation step.
//!
//! Runs the fixed stage order over a frame store:
//! curl -> vorticity confinement -> divergence -> pressure warm-start damp
//! -> Jacobi solve -> gradient subtraction -> velocity self-advection ->
//! dye advection. Every stage reads one buffer half and writes the other;
//! nothing mutates in place.

use serde::{Deserialize, Serialize};

use crate::compute::advection::advect_into;
use crate::compute::field::Frames;
use crate::compute::pressure::{divergence_into, scale_into, solve_pressure, subtract_gradient};
use crate::compute::splat::splat_into;
use crate::compute::vorticity::{confine_vorticity, curl_into};
use crate::schema::SimulationConfig;

/// CPU-based stable-fluids solver.
pub struct CpuSolver {
    config: SimulationConfig,
}

impl CpuSolver {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Advance the fields by one step. The stage order is load-bearing:
    /// each stage consumes the previous stage's output.
    pub fn step(&self, frames: &mut Frames, dt: f32) {
        curl_into(frames.velocity.read(), &mut frames.curl);

        {
            let (read, write) = frames.velocity.pair_mut();
            confine_vorticity(read, &frames.curl, write, self.config.curl, dt);
        }
        frames.velocity.swap();

        divergence_into(frames.velocity.read(), &mut frames.divergence);

        {
            let (read, write) = frames.pressure.pair_mut();
            scale_into(read, write, self.config.pressure_dissipation);
        }
        frames.pressure.swap();

        solve_pressure(
            &mut frames.pressure,
            &frames.divergence,
            self.config.pressure_iterations,
        );

        {
            let (read, write) = frames.velocity.pair_mut();
            subtract_gradient(frames.pressure.read(), read, write);
        }
        frames.velocity.swap();

        {
            let (read, write) = frames.velocity.pair_mut();
            advect_into(read, read, write, dt, self.config.velocity_dissipation);
        }
        frames.velocity.swap();

        {
            let (dye_read, dye_write) = frames.dye.pair_mut();
            advect_into(
                frames.velocity.read(),
                dye_read,
                dye_write,
                dt,
                self.config.density_dissipation,
            );
        }
        frames.dye.swap();
    }

    /// Inject one splat: a velocity impulse of `delta` and a dye deposit of
    /// `color`, both centered on `point` in normalized coordinates.
    pub fn splat(&self, frames: &mut Frames, point: (f32, f32), delta: (f32, f32), color: [f32; 3]) {
        let radius = self.config.splat_radius / 100.0;
        let aspect = frames.aspect();

        {
            let (read, write) = frames.velocity.pair_mut();
            splat_into(read, write, point, &[delta.0, delta.1], radius, aspect);
        }
        frames.velocity.swap();

        {
            let (read, write) = frames.dye.pair_mut();
            splat_into(read, write, point, &color, radius, aspect);
        }
        frames.dye.swap();
    }
}

/// Per-frame field statistics for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameStats {
    /// Sum of dye intensity over all cells and channels.
    pub dye_total: f32,
    /// Peak single-channel dye intensity.
    pub dye_max: f32,
    /// Peak velocity magnitude in grid cells per second.
    pub max_speed: f32,
    /// Peak divergence magnitude measured before the last projection.
    pub max_divergence: f32,
}

impl FrameStats {
    pub fn from_frames(frames: &Frames) -> Self {
        let dye = frames.dye.read();
        let mut dye_total = 0.0f32;
        let mut dye_max = 0.0f32;
        let grid = dye.grid();
        for y in 0..grid.height {
            for x in 0..grid.width {
                for c in 0..dye.channels() {
                    let v = dye.get(x, y, c);
                    dye_total += v;
                    dye_max = dye_max.max(v);
                }
            }
        }

        let velocity = frames.velocity.read();
        let mut max_speed = 0.0f32;
        let sim = velocity.grid();
        for y in 0..sim.height {
            for x in 0..sim.width {
                let vx = velocity.get(x, y, 0);
                let vy = velocity.get(x, y, 1);
                max_speed = max_speed.max((vx * vx + vy * vy).sqrt());
            }
        }

        let max_divergence = frames
            .divergence
            .data()
            .iter()
            .map(|v| v.abs())
            .fold(0.0, f32::max);

        Self {
            dye_total,
            dye_max,
            max_speed,
            max_divergence,
        }
    }
}
