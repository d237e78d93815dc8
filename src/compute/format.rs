//! Grid storage format negotiation.
//!
//! Before any field is allocated, the simulation asks the rendering backend
//! which numeric layouts it can actually render into. A requested channel
//! arity that the backend rejects is escalated to the next wider layout
//! (1 → 2 → 4 components); if even the 4-component layout is rejected, setup
//! fails and the simulation never starts.

use serde::{Deserialize, Serialize};

/// Numeric precision of grid storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    /// 16-bit floating point storage.
    Half,
    /// 32-bit floating point storage.
    Single,
}

impl Default for Precision {
    fn default() -> Self {
        Precision::Half
    }
}

/// Sampling filter used when a field is read at non-integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// A candidate storage layout: component count plus precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridFormat {
    /// Components per cell (1, 2, or 4).
    pub components: usize,
    pub precision: Precision,
}

/// Capability probe for the surface the simulation renders with.
///
/// `probe_render_target` is expected to validate a format by allocating a
/// minimal (4x4) off-screen target and checking that it completes, not by
/// consulting a static table.
pub trait RenderBackend {
    /// Whether an off-screen target of this format can be rendered into.
    fn probe_render_target(&self, format: GridFormat) -> bool;

    /// Whether textures of this precision can be sampled with linear
    /// filtering. When false, fields fall back to nearest-neighbor
    /// sampling; stage semantics are unchanged.
    fn linear_filterable(&self, precision: Precision) -> bool;
}

/// CPU-resident grids. Plain `Vec<f32>` storage imposes no layout
/// restrictions, so every probe succeeds and linear filtering is available
/// at every precision.
#[derive(Debug, Default)]
pub struct SoftwareBackend;

impl RenderBackend for SoftwareBackend {
    fn probe_render_target(&self, format: GridFormat) -> bool {
        matches!(format.components, 1 | 2 | 4)
    }

    fn linear_filterable(&self, _precision: Precision) -> bool {
        true
    }
}

/// A layout the backend has accepted.
///
/// `components` is the allocated width and may exceed the logical channel
/// count of the field that uses it; the surplus components are storage
/// padding only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedFormat {
    pub components: usize,
    pub precision: Precision,
}

/// Negotiation failure. Fatal: initialization aborts.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("backend rejected every layout up to 4 components at {0:?} precision")]
    Exhausted(Precision),
}

/// Validate a layout for the requested arity, escalating 1 → 2 → 4.
pub fn negotiate(
    backend: &dyn RenderBackend,
    components: usize,
    precision: Precision,
) -> Result<NegotiatedFormat, FormatError> {
    debug_assert!(matches!(components, 1 | 2 | 4));

    let mut candidate = components;
    loop {
        let format = GridFormat {
            components: candidate,
            precision,
        };
        if backend.probe_render_target(format) {
            if candidate != components {
                log::debug!(
                    "format: {components}-component layout unsupported, escalated to {candidate}"
                );
            }
            return Ok(NegotiatedFormat {
                components: candidate,
                precision,
            });
        }
        candidate = match candidate {
            1 => 2,
            2 => 4,
            _ => return Err(FormatError::Exhausted(precision)),
        };
    }
}

/// The negotiated layouts a field store allocates from, plus the filter
/// mode shared by every field.
#[derive(Debug, Clone, Copy)]
pub struct FormatTable {
    /// Scalar fields: pressure, divergence, curl.
    pub r: NegotiatedFormat,
    /// Velocity.
    pub rg: NegotiatedFormat,
    /// Dye.
    pub rgba: NegotiatedFormat,
    pub filter: FilterMode,
}

impl FormatTable {
    /// Run negotiation for every layout the simulation needs.
    pub fn negotiate(
        backend: &dyn RenderBackend,
        precision: Precision,
    ) -> Result<Self, FormatError> {
        let r = negotiate(backend, 1, precision)?;
        let rg = negotiate(backend, 2, precision)?;
        let rgba = negotiate(backend, 4, precision)?;
        let filter = if backend.linear_filterable(precision) {
            FilterMode::Linear
        } else {
            FilterMode::Nearest
        };
        log::debug!(
            "format: negotiated r={}/rg={}/rgba={} components, {:?} filtering",
            r.components,
            rg.components,
            rgba.components,
            filter
        );
        Ok(Self {
            r,
            rg,
            rgba,
            filter,
        })
    }
}
