//! inkflow - Interactive stable-fluids ink simulation.
//!
//! This crate renders an animated fluid backdrop: a grid-based
//! incompressible-flow solver ("stable fluids") driven by pointer and touch
//! input, with automatic splats keeping the surface alive when nobody is
//! interacting.
//!
//! # Architecture
//!
//! - `schema`: configuration types and validation
//! - `compute`: format negotiation, field storage, and the numerical
//!   pipeline (curl, vorticity confinement, pressure projection,
//!   advection, splats, compositing)
//! - `input`: pointer/touch aggregation into per-tick splat requests
//! - `color`: ambient and bright splat palettes
//! - `runtime`: the per-frame simulation loop
//!
//! # Example
//!
//! ```rust,no_run
//! use inkflow::{
//!     compute::SoftwareBackend,
//!     runtime::Simulation,
//!     schema::SimulationConfig,
//! };
//!
//! let config = SimulationConfig::default();
//! let mut sim = Simulation::new(config, &SoftwareBackend, (1280, 720))
//!     .expect("backdrop setup");
//!
//! // Host loop: feed input, advance, blit the frame.
//! sim.mouse_move(640.0, 360.0);
//! sim.advance(0.016);
//! let (width, height) = sim.frame_size();
//! println!("frame: {}x{}, {} bytes", width, height, sim.frame().len());
//! ```

pub mod color;
pub mod compute;
pub mod input;
pub mod runtime;
pub mod schema;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use compute::{CpuSolver, FrameStats, SoftwareBackend};
pub use input::{PointerPool, Touch};
pub use runtime::{InitError, Simulation};
pub use schema::SimulationConfig;
