//! Configuration types for the fluid backdrop.

use serde::{Deserialize, Serialize};

use crate::compute::Precision;

fn default_sim_resolution() -> u32 {
    128
}

fn default_dye_resolution() -> u32 {
    512
}

fn default_density_dissipation() -> f32 {
    0.97
}

fn default_velocity_dissipation() -> f32 {
    0.98
}

fn default_pressure_dissipation() -> f32 {
    0.8
}

fn default_pressure_iterations() -> u32 {
    20
}

fn default_curl() -> f32 {
    30.0
}

fn default_splat_radius() -> f32 {
    0.35
}

fn default_splat_force() -> f32 {
    6000.0
}

fn default_back_color() -> [u8; 3] {
    [5, 8, 22]
}

fn default_auto_splat_interval() -> f32 {
    0.3
}

fn default_initial_splats() -> u32 {
    15
}

/// Top-level simulation configuration.
///
/// Fixed for the lifetime of one simulation instance. Every field has a
/// serde default, so partial JSON configs deserialize against the stock
/// values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Base resolution of the velocity/pressure grids (shorter axis).
    #[serde(default = "default_sim_resolution")]
    pub sim_resolution: u32,
    /// Base resolution of the dye grid (shorter axis).
    #[serde(default = "default_dye_resolution")]
    pub dye_resolution: u32,
    /// Per-step dye retention during advection (1.0 = no fade).
    #[serde(default = "default_density_dissipation")]
    pub density_dissipation: f32,
    /// Per-step velocity retention during advection.
    #[serde(default = "default_velocity_dissipation")]
    pub velocity_dissipation: f32,
    /// Warm-start damping applied to the previous frame's pressure before
    /// the Jacobi solve. Not a spatial dissipation; kept separate from the
    /// advection coefficients above.
    #[serde(default = "default_pressure_dissipation")]
    pub pressure_dissipation: f32,
    /// Jacobi iterations per pressure solve.
    #[serde(default = "default_pressure_iterations")]
    pub pressure_iterations: u32,
    /// Vorticity confinement strength.
    #[serde(default = "default_curl")]
    pub curl: f32,
    /// Splat radius; divided by 100 inside the Gaussian.
    #[serde(default = "default_splat_radius")]
    pub splat_radius: f32,
    /// Scale from pointer delta to injected velocity.
    #[serde(default = "default_splat_force")]
    pub splat_force: f32,
    /// Background color the dye composites over.
    #[serde(default = "default_back_color")]
    pub back_color: [u8; 3],
    /// Seconds between automatic splats.
    #[serde(default = "default_auto_splat_interval")]
    pub auto_splat_interval: f32,
    /// Splats fired once at construction.
    #[serde(default = "default_initial_splats")]
    pub initial_splats: u32,
    /// Requested grid storage precision; format negotiation may widen the
    /// channel layout but never the precision.
    #[serde(default)]
    pub precision: Precision,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sim_resolution: default_sim_resolution(),
            dye_resolution: default_dye_resolution(),
            density_dissipation: default_density_dissipation(),
            velocity_dissipation: default_velocity_dissipation(),
            pressure_dissipation: default_pressure_dissipation(),
            pressure_iterations: default_pressure_iterations(),
            curl: default_curl(),
            splat_radius: default_splat_radius(),
            splat_force: default_splat_force(),
            back_color: default_back_color(),
            auto_splat_interval: default_auto_splat_interval(),
            initial_splats: default_initial_splats(),
            precision: Precision::default(),
        }
    }
}

impl SimulationConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sim_resolution == 0 || self.dye_resolution == 0 {
            return Err(ConfigError::InvalidResolution);
        }
        if self.pressure_iterations == 0 {
            return Err(ConfigError::InvalidPressureIterations);
        }
        for (name, value) in [
            ("density_dissipation", self.density_dissipation),
            ("velocity_dissipation", self.velocity_dissipation),
            ("pressure_dissipation", self.pressure_dissipation),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::InvalidDissipation { name, value });
            }
        }
        if !(self.splat_radius > 0.0) {
            return Err(ConfigError::InvalidSplatRadius(self.splat_radius));
        }
        if !(self.auto_splat_interval > 0.0) {
            return Err(ConfigError::InvalidAutoSplatInterval(
                self.auto_splat_interval,
            ));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid resolutions must be non-zero")]
    InvalidResolution,
    #[error("Pressure solver needs at least one iteration")]
    InvalidPressureIterations,
    #[error("Dissipation {name} must be in (0, 1], got {value}")]
    InvalidDissipation { name: &'static str, value: f32 },
    #[error("Splat radius must be positive, got {0}")]
    InvalidSplatRadius(f32),
    #[error("Auto-splat interval must be positive, got {0}")]
    InvalidAutoSplatInterval(f32),
}
