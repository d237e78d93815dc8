//! Field storage - grids, double buffering, and the frame field store.
//!
//! All fields are flat `Vec<f32>` grids in row-major order with row 0 at the
//! bottom, matching the normalized coordinate convention (y grows upward).
//! A cell holds `stride` components of which the first `channels` are
//! meaningful; the stride comes from format negotiation and may be wider
//! than the logical channel count.

use crate::compute::format::{FilterMode, FormatTable, NegotiatedFormat};
use crate::schema::SimulationConfig;

/// Grid geometry: cell dimensions plus derived texel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
}

impl Grid {
    /// Size a grid from a base resolution and the viewport aspect ratio.
    ///
    /// The shorter viewport axis gets `base` cells, the longer axis gets
    /// `round(base * aspect)`, with orientation following the viewport.
    pub fn from_resolution(base: u32, viewport: (u32, u32)) -> Self {
        let (vw, vh) = viewport;
        let mut aspect = vw as f32 / vh as f32;
        if aspect < 1.0 {
            aspect = 1.0 / aspect;
        }

        let min = base as usize;
        let max = (base as f32 * aspect).round() as usize;

        if vw > vh {
            Self {
                width: max,
                height: min,
            }
        } else {
            Self {
                width: min,
                height: max,
            }
        }
    }

    /// Reciprocal cell size: converts normalized offsets to cell offsets.
    #[inline]
    pub fn texel_size(&self) -> (f32, f32) {
        (1.0 / self.width as f32, 1.0 / self.height as f32)
    }

    /// Total cell count.
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// A single 2D grid of `channels` logical components per cell.
#[derive(Debug, Clone)]
pub struct Field {
    grid: Grid,
    channels: usize,
    stride: usize,
    filter: FilterMode,
    data: Vec<f32>,
}

impl Field {
    /// Allocate a zeroed field in the negotiated layout.
    pub fn new(grid: Grid, channels: usize, format: NegotiatedFormat, filter: FilterMode) -> Self {
        debug_assert!(channels <= format.components);
        Self {
            grid,
            channels,
            stride: format.components,
            filter,
            data: vec![0.0; grid.len() * format.components],
        }
    }

    #[inline]
    pub fn grid(&self) -> Grid {
        self.grid
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Flat component index of `(x, y, c)`.
    #[inline]
    pub fn idx(&self, x: usize, y: usize, c: usize) -> usize {
        (y * self.grid.width + x) * self.stride + c
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, c: usize) -> f32 {
        self.data[self.idx(x, y, c)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, c: usize, value: f32) {
        let i = self.idx(x, y, c);
        self.data[i] = value;
    }

    /// Cell read with indices clamped to the grid (edge extension).
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize, c: usize) -> f32 {
        let cx = x.clamp(0, self.grid.width as isize - 1) as usize;
        let cy = y.clamp(0, self.grid.height as isize - 1) as usize;
        self.get(cx, cy, c)
    }

    /// Velocity read with free-slip walls: an off-grid index clamps to the
    /// edge cell and negates the wall-normal component, so the wall admits
    /// tangential flow but no penetration.
    #[inline]
    pub fn velocity_edge(&self, x: isize, y: isize) -> [f32; 2] {
        debug_assert!(self.channels >= 2);
        let cx = x.clamp(0, self.grid.width as isize - 1);
        let cy = y.clamp(0, self.grid.height as isize - 1);
        let mut vx = self.get(cx as usize, cy as usize, 0);
        let mut vy = self.get(cx as usize, cy as usize, 1);
        if cx != x {
            vx = -vx;
        }
        if cy != y {
            vy = -vy;
        }
        [vx, vy]
    }

    /// Sample one channel at normalized coordinates using this field's
    /// filter mode. Coordinates outside [0,1]^2 clamp to the edge.
    #[inline]
    pub fn sample(&self, u: f32, v: f32, c: usize) -> f32 {
        match self.filter {
            FilterMode::Linear => self.sample_linear(u, v, c),
            FilterMode::Nearest => self.sample_nearest(u, v, c),
        }
    }

    /// Bilinear sample with texel centers at `(x + 0.5) / width`.
    pub fn sample_linear(&self, u: f32, v: f32, c: usize) -> f32 {
        let px = u * self.grid.width as f32 - 0.5;
        let py = v * self.grid.height as f32 - 0.5;
        let x0 = px.floor();
        let y0 = py.floor();
        let fx = px - x0;
        let fy = py - y0;
        let x0 = x0 as isize;
        let y0 = y0 as isize;

        let bottom = lerp(
            self.get_clamped(x0, y0, c),
            self.get_clamped(x0 + 1, y0, c),
            fx,
        );
        let top = lerp(
            self.get_clamped(x0, y0 + 1, c),
            self.get_clamped(x0 + 1, y0 + 1, c),
            fx,
        );
        lerp(bottom, top, fy)
    }

    pub fn sample_nearest(&self, u: f32, v: f32, c: usize) -> f32 {
        let x = (u * self.grid.width as f32).floor() as isize;
        let y = (v * self.grid.height as f32).floor() as isize;
        self.get_clamped(x, y, c)
    }

    /// Zero every component.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }
}

/// A read/write pair of identically shaped fields, exchanged by pointer
/// swap. The two fields are always distinct instances; a stage reads the
/// read half and writes the write half, then the caller swaps.
#[derive(Debug)]
pub struct DoubleBuffer {
    read: Field,
    write: Field,
}

impl DoubleBuffer {
    pub fn new(grid: Grid, channels: usize, format: NegotiatedFormat, filter: FilterMode) -> Self {
        Self {
            read: Field::new(grid, channels, format, filter),
            write: Field::new(grid, channels, format, filter),
        }
    }

    #[inline]
    pub fn read(&self) -> &Field {
        &self.read
    }

    /// Split borrow for a stage pass: immutable read half, mutable write half.
    #[inline]
    pub fn pair_mut(&mut self) -> (&Field, &mut Field) {
        (&self.read, &mut self.write)
    }

    /// Exchange the read and write roles without copying data.
    #[inline]
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.read, &mut self.write);
    }
}

/// All fields of one simulation instance, sized for one viewport.
///
/// Recreated wholesale whenever the viewport changes; prior contents are
/// discarded, never resampled.
#[derive(Debug)]
pub struct Frames {
    pub velocity: DoubleBuffer,
    pub dye: DoubleBuffer,
    pub pressure: DoubleBuffer,
    pub divergence: Field,
    pub curl: Field,
    viewport: (u32, u32),
}

impl Frames {
    pub fn new(config: &SimulationConfig, formats: &FormatTable, viewport: (u32, u32)) -> Self {
        let sim_grid = Grid::from_resolution(config.sim_resolution, viewport);
        let dye_grid = Grid::from_resolution(config.dye_resolution, viewport);

        log::info!(
            "frames: sim {}x{}, dye {}x{} for viewport {}x{}",
            sim_grid.width,
            sim_grid.height,
            dye_grid.width,
            dye_grid.height,
            viewport.0,
            viewport.1
        );

        // Pressure, divergence and curl are solver intermediates and are
        // always sampled at cell centers.
        Self {
            velocity: DoubleBuffer::new(sim_grid, 2, formats.rg, formats.filter),
            dye: DoubleBuffer::new(dye_grid, 3, formats.rgba, formats.filter),
            pressure: DoubleBuffer::new(sim_grid, 1, formats.r, FilterMode::Nearest),
            divergence: Field::new(sim_grid, 1, formats.r, FilterMode::Nearest),
            curl: Field::new(sim_grid, 1, formats.r, FilterMode::Nearest),
            viewport,
        }
    }

    /// Viewport these fields were sized for.
    #[inline]
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Viewport aspect ratio (width / height), used by splat injection.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1 as f32
    }

    #[inline]
    pub fn sim_grid(&self) -> Grid {
        self.velocity.read().grid()
    }

    #[inline]
    pub fn dye_grid(&self) -> Grid {
        self.dye.read().grid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::format::{FormatTable, Precision, SoftwareBackend};

    fn fmt(components: usize) -> NegotiatedFormat {
        NegotiatedFormat {
            components,
            precision: Precision::Single,
        }
    }

    #[test]
    fn test_grid_sizing_landscape() {
        // 1024x512 viewport: aspect 2, longer side horizontal.
        let grid = Grid::from_resolution(128, (1024, 512));
        assert_eq!(grid.width, 256);
        assert_eq!(grid.height, 128);
    }

    #[test]
    fn test_grid_sizing_portrait() {
        let grid = Grid::from_resolution(128, (512, 1024));
        assert_eq!(grid.width, 128);
        assert_eq!(grid.height, 256);
    }

    #[test]
    fn test_grid_sizing_square() {
        let grid = Grid::from_resolution(128, (800, 800));
        assert_eq!(grid.width, 128);
        assert_eq!(grid.height, 128);
    }

    #[test]
    fn test_texel_size() {
        let grid = Grid {
            width: 256,
            height: 128,
        };
        let (tx, ty) = grid.texel_size();
        assert!((tx - 1.0 / 256.0).abs() < 1e-9);
        assert!((ty - 1.0 / 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_stride_wider_than_channels() {
        // Velocity forced into a 4-component layout still reads/writes
        // two logical channels correctly.
        let grid = Grid {
            width: 4,
            height: 4,
        };
        let mut field = Field::new(grid, 2, fmt(4), FilterMode::Linear);
        assert_eq!(field.stride(), 4);
        assert_eq!(field.channels(), 2);
        assert_eq!(field.data().len(), 4 * 4 * 4);

        field.set(2, 1, 0, 3.0);
        field.set(2, 1, 1, -5.0);
        assert_eq!(field.get(2, 1, 0), 3.0);
        assert_eq!(field.get(2, 1, 1), -5.0);
        assert_eq!(field.get(2, 0, 0), 0.0);
        assert_eq!(field.get(2, 2, 0), 0.0);
    }

    #[test]
    fn test_bilinear_exact_at_texel_centers() {
        let grid = Grid {
            width: 8,
            height: 8,
        };
        let mut field = Field::new(grid, 1, fmt(1), FilterMode::Linear);
        for y in 0..8 {
            for x in 0..8 {
                field.set(x, y, 0, (x * 10 + y) as f32);
            }
        }

        for y in 0..8 {
            for x in 0..8 {
                let u = (x as f32 + 0.5) / 8.0;
                let v = (y as f32 + 0.5) / 8.0;
                let sampled = field.sample_linear(u, v, 0);
                let expected = (x * 10 + y) as f32;
                assert!(
                    (sampled - expected).abs() < 1e-5,
                    "center sample at ({}, {}): {} vs {}",
                    x,
                    y,
                    sampled,
                    expected
                );
            }
        }
    }

    #[test]
    fn test_bilinear_midpoint() {
        let grid = Grid {
            width: 2,
            height: 1,
        };
        let mut field = Field::new(grid, 1, fmt(1), FilterMode::Linear);
        field.set(0, 0, 0, 1.0);
        field.set(1, 0, 0, 3.0);

        // Halfway between the two texel centers.
        let sampled = field.sample_linear(0.5, 0.5, 0);
        assert!((sampled - 2.0).abs() < 1e-6, "got {}", sampled);
    }

    #[test]
    fn test_sample_clamps_outside_unit_square() {
        let grid = Grid {
            width: 4,
            height: 4,
        };
        let mut field = Field::new(grid, 1, fmt(1), FilterMode::Linear);
        field.set(0, 0, 0, 7.0);
        assert_eq!(field.sample_linear(-1.0, -1.0, 0), 7.0);
    }

    #[test]
    fn test_velocity_edge_negation() {
        let grid = Grid {
            width: 4,
            height: 4,
        };
        let mut field = Field::new(grid, 2, fmt(2), FilterMode::Linear);
        field.set(0, 2, 0, 1.0);
        field.set(0, 2, 1, 2.0);

        // Off the left wall: x component flips, y passes through.
        let [vx, vy] = field.velocity_edge(-1, 2);
        assert_eq!(vx, -1.0);
        assert_eq!(vy, 2.0);

        // In bounds: untouched.
        let [vx, vy] = field.velocity_edge(0, 2);
        assert_eq!(vx, 1.0);
        assert_eq!(vy, 2.0);

        // Off the bottom wall: y component flips.
        field.set(1, 0, 0, 0.5);
        field.set(1, 0, 1, -0.25);
        let [vx, vy] = field.velocity_edge(1, -1);
        assert_eq!(vx, 0.5);
        assert_eq!(vy, 0.25);
    }

    #[test]
    fn test_double_buffer_swap() {
        let grid = Grid {
            width: 2,
            height: 2,
        };
        let mut buffer = DoubleBuffer::new(grid, 1, fmt(1), FilterMode::Nearest);

        {
            let (_read, write) = buffer.pair_mut();
            write.set(0, 0, 0, 42.0);
        }
        assert_eq!(buffer.read().get(0, 0, 0), 0.0, "write side not yet visible");

        buffer.swap();
        assert_eq!(buffer.read().get(0, 0, 0), 42.0, "swap exposes written data");

        buffer.swap();
        assert_eq!(buffer.read().get(0, 0, 0), 0.0, "swap is an exchange, not a copy");
    }

    #[test]
    fn test_frames_allocation() {
        let config = SimulationConfig::default();
        let formats = FormatTable::negotiate(&SoftwareBackend, Precision::Half).unwrap();
        let frames = Frames::new(&config, &formats, (1024, 512));

        assert_eq!(frames.sim_grid().width, 256);
        assert_eq!(frames.sim_grid().height, 128);
        assert_eq!(frames.dye_grid().width, 1024);
        assert_eq!(frames.dye_grid().height, 512);
        assert_eq!(frames.velocity.read().channels(), 2);
        assert_eq!(frames.dye.read().channels(), 3);
        assert_eq!(frames.pressure.read().channels(), 1);
        assert!((frames.aspect() - 2.0).abs() < 1e-6);
    }
}
