//! Simulation loop - per-frame orchestration.
//!
//! One `Simulation` owns everything a running backdrop needs: the
//! negotiated formats, the field store, the solver, the pointer pool, and
//! the composited RGBA frame. There is no stop API; dropping the instance
//! is teardown.

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::color;
use crate::compute::{
    CpuSolver, FormatError, FormatTable, FrameStats, Frames, RenderBackend, composite_into,
};
use crate::input::{PointerPool, Touch};
use crate::schema::{ConfigError, SimulationConfig};

/// Ceiling on the per-tick time step (seconds), bounding stability when
/// the host stalls between frames.
pub const MAX_FRAME_DT: f32 = 0.016;

/// Fatal initialization failures. Nothing here is retried: if setup does
/// not complete, the backdrop simply never renders.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("format negotiation failed: {0}")]
    Format(#[from] FormatError),
    #[error("viewport has zero area")]
    EmptyViewport,
}

/// The running simulation.
pub struct Simulation {
    config: SimulationConfig,
    formats: FormatTable,
    solver: CpuSolver,
    frames: Frames,
    input: PointerPool,
    rng: StdRng,
    viewport: (u32, u32),
    auto_timer: f32,
    frame: Vec<u8>,
    #[cfg(not(target_arch = "wasm32"))]
    last_tick: Option<Instant>,
}

impl Simulation {
    /// Initialize against a backend and fire the opening splat burst.
    pub fn new(
        config: SimulationConfig,
        backend: &dyn RenderBackend,
        viewport: (u32, u32),
    ) -> Result<Self, InitError> {
        Self::build(config, backend, viewport, StdRng::from_entropy())
    }

    /// Deterministic construction for tests and reproducible runs.
    pub fn new_seeded(
        config: SimulationConfig,
        backend: &dyn RenderBackend,
        viewport: (u32, u32),
        seed: u64,
    ) -> Result<Self, InitError> {
        Self::build(config, backend, viewport, StdRng::seed_from_u64(seed))
    }

    fn build(
        config: SimulationConfig,
        backend: &dyn RenderBackend,
        viewport: (u32, u32),
        rng: StdRng,
    ) -> Result<Self, InitError> {
        if viewport.0 == 0 || viewport.1 == 0 {
            log::error!("init: viewport {}x{} has zero area", viewport.0, viewport.1);
            return Err(InitError::EmptyViewport);
        }
        if let Err(e) = config.validate() {
            log::error!("init: {e}");
            return Err(e.into());
        }
        let formats = match FormatTable::negotiate(backend, config.precision) {
            Ok(formats) => formats,
            Err(e) => {
                log::error!("init: {e}");
                return Err(e.into());
            }
        };

        let frames = Frames::new(&config, &formats, viewport);
        let mut frame = Vec::new();
        composite_into(frames.dye.read(), config.back_color, &mut frame);

        let mut sim = Self {
            solver: CpuSolver::new(config.clone()),
            config,
            formats,
            frames,
            input: PointerPool::new(),
            rng,
            viewport,
            auto_timer: 0.0,
            frame,
            #[cfg(not(target_arch = "wasm32"))]
            last_tick: None,
        };

        for _ in 0..sim.config.initial_splats {
            sim.auto_splat();
        }
        log::info!(
            "init: simulation ready, {} opening splats",
            sim.config.initial_splats
        );
        Ok(sim)
    }

    /// One bright splat at a random point with a random impulse.
    fn auto_splat(&mut self) {
        let point = (self.rng.r#gen::<f32>(), self.rng.r#gen::<f32>());
        let dx = 1000.0 * (self.rng.r#gen::<f32>() - 0.5);
        let dy = 1000.0 * (self.rng.r#gen::<f32>() - 0.5);
        let color = color::bright(&mut self.rng);
        self.solver.splat(&mut self.frames, point, (dx, dy), color);
    }

    /// Tell the simulation the drawable surface changed size. The actual
    /// reallocation happens at the top of the next tick.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    /// Advance one tick with an externally supplied time step (seconds).
    /// The step is clamped to [`MAX_FRAME_DT`].
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);

        // Resize is a hard barrier: all fields are discarded, nothing is
        // resampled into the new resolution.
        if self.viewport != self.frames.viewport()
            && self.viewport.0 > 0
            && self.viewport.1 > 0
        {
            log::info!(
                "resize: reallocating fields for {}x{}",
                self.viewport.0,
                self.viewport.1
            );
            self.frames = Frames::new(&self.config, &self.formats, self.viewport);
        }

        // Drain pending pointer motion into splats, once per tick.
        {
            let solver = &self.solver;
            let frames = &mut self.frames;
            let force = self.config.splat_force;
            self.input.drain_moved(|req| {
                solver.splat(
                    frames,
                    (req.x, req.y),
                    (req.dx * force, req.dy * force),
                    req.color,
                );
            });
        }

        self.auto_timer += dt;
        if self.auto_timer > self.config.auto_splat_interval {
            self.auto_splat();
            self.auto_timer = 0.0;
        }

        self.solver.step(&mut self.frames, dt);
        composite_into(self.frames.dye.read(), self.config.back_color, &mut self.frame);
    }

    /// Advance one tick, deriving dt from the wall clock.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn tick(&mut self) {
        let now = Instant::now();
        let dt = match self.last_tick {
            Some(previous) => (now - previous).as_secs_f32(),
            None => MAX_FRAME_DT,
        };
        self.last_tick = Some(now);
        self.advance(dt);
    }

    /// Mouse movement in device pixels.
    pub fn mouse_move(&mut self, x: f32, y: f32) {
        self.input.mouse_move(x, y, self.viewport, &mut self.rng);
    }

    pub fn touch_start(&mut self, touches: &[Touch]) {
        self.input.touch_start(touches, self.viewport, &mut self.rng);
    }

    pub fn touch_move(&mut self, touches: &[Touch]) {
        self.input.touch_move(touches, self.viewport);
    }

    pub fn touch_end(&mut self, ids: &[i64]) {
        self.input.touch_end(ids);
    }

    /// The composited RGBA8 frame, rows top-down, at dye resolution.
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Pixel dimensions of [`Self::frame`].
    pub fn frame_size(&self) -> (usize, usize) {
        let grid = self.frames.dye_grid();
        (grid.width, grid.height)
    }

    pub fn frames(&self) -> &Frames {
        &self.frames
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats::from_frames(&self.frames)
    }
}
