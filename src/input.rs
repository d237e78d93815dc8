//! Pointer and touch aggregation.
//!
//! Maps device-pixel input events into a pool of pointer records with
//! normalized coordinates (origin bottom-left). The simulation loop drains
//! every pointer flagged `moved` exactly once per tick; a delta arriving
//! after the drain is picked up on the next tick. The pool assumes a
//! single-threaded host where events and ticks share one execution
//! context; a multi-threaded port needs a queue or a lock around it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color;

/// Identifier of the permanent mouse pointer at slot 0.
pub const MOUSE_ID: i64 = -1;

/// One touch contact in an event batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Touch {
    /// Stable contact identifier assigned by the host.
    pub id: i64,
    /// Device-pixel x.
    pub x: f32,
    /// Device-pixel y, measured from the top as hosts report it.
    pub y: f32,
}

/// One tracked pointer.
#[derive(Debug, Clone)]
pub struct Pointer {
    pub id: i64,
    /// Current position, normalized, y up.
    pub x: f32,
    pub y: f32,
    pub prev_x: f32,
    pub prev_y: f32,
    pub dx: f32,
    pub dy: f32,
    pub down: bool,
    pub moved: bool,
    pub color: [f32; 3],
}

impl Pointer {
    fn new(id: i64) -> Self {
        Self {
            id,
            x: 0.0,
            y: 0.0,
            prev_x: 0.0,
            prev_y: 0.0,
            dx: 0.0,
            dy: 0.0,
            down: false,
            moved: false,
            color: [0.0; 3],
        }
    }

    fn move_to(&mut self, tx: f32, ty: f32) {
        self.prev_x = self.x;
        self.prev_y = self.y;
        self.x = tx;
        self.y = ty;
        self.dx = self.x - self.prev_x;
        self.dy = self.y - self.prev_y;
        self.moved = self.dx.abs() > 0.0 || self.dy.abs() > 0.0;
    }
}

/// A pending splat distilled from one pointer's motion. The delta is the
/// raw normalized movement; the loop applies the force scale.
#[derive(Debug, Clone, Copy)]
pub struct SplatRequest {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub color: [f32; 3],
}

/// Pool of pointer records: the mouse at slot 0, touch contacts after it.
/// Touch slots are matched by identifier and retained after the touch
/// ends; the pool grows but never shrinks.
#[derive(Debug)]
pub struct PointerPool {
    pointers: Vec<Pointer>,
}

impl Default for PointerPool {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(x: f32, y: f32, viewport: (u32, u32)) -> (f32, f32) {
    (x / viewport.0 as f32, 1.0 - y / viewport.1 as f32)
}

impl PointerPool {
    pub fn new() -> Self {
        Self {
            pointers: vec![Pointer::new(MOUSE_ID)],
        }
    }

    pub fn pointers(&self) -> &[Pointer] {
        &self.pointers
    }

    /// Mouse movement: update position and regenerate the ambient color.
    pub fn mouse_move(&mut self, x: f32, y: f32, viewport: (u32, u32), rng: &mut impl Rng) {
        let (tx, ty) = normalize(x, y, viewport);
        let mouse = &mut self.pointers[0];
        mouse.move_to(tx, ty);
        mouse.color = color::ambient(rng);
    }

    /// New touch contacts: match by identifier, else claim a retained
    /// ended slot, else grow the pool. Position is seeded so the first
    /// move produces a sane delta.
    pub fn touch_start(&mut self, touches: &[Touch], viewport: (u32, u32), rng: &mut impl Rng) {
        for touch in touches {
            let (tx, ty) = normalize(touch.x, touch.y, viewport);

            let slot = match self.find_touch(touch.id) {
                Some(i) => i,
                None => match self.pointers.iter().skip(1).position(|p| !p.down) {
                    Some(free) => free + 1,
                    None => {
                        self.pointers.push(Pointer::new(touch.id));
                        self.pointers.len() - 1
                    }
                },
            };

            let pointer = &mut self.pointers[slot];
            pointer.id = touch.id;
            pointer.down = true;
            pointer.moved = false;
            pointer.x = tx;
            pointer.y = ty;
            pointer.prev_x = tx;
            pointer.prev_y = ty;
            pointer.dx = 0.0;
            pointer.dy = 0.0;
            pointer.color = color::ambient(rng);
        }
    }

    /// Touch movement: only pointers currently down are updated.
    pub fn touch_move(&mut self, touches: &[Touch], viewport: (u32, u32)) {
        for touch in touches {
            let (tx, ty) = normalize(touch.x, touch.y, viewport);
            if let Some(i) = self.find_touch(touch.id) {
                let pointer = &mut self.pointers[i];
                if pointer.down {
                    pointer.move_to(tx, ty);
                }
            }
        }
    }

    /// Ended contacts are marked up but keep their slot.
    pub fn touch_end(&mut self, ids: &[i64]) {
        for &id in ids {
            if let Some(i) = self.find_touch(id) {
                self.pointers[i].down = false;
            }
        }
    }

    /// Emit a splat request for every moved pointer and clear the flags.
    /// Read-then-reset is one pass: each delta is consumed exactly once.
    pub fn drain_moved(&mut self, mut f: impl FnMut(SplatRequest)) {
        for pointer in &mut self.pointers {
            if pointer.moved {
                pointer.moved = false;
                f(SplatRequest {
                    x: pointer.x,
                    y: pointer.y,
                    dx: pointer.dx,
                    dy: pointer.dy,
                    color: pointer.color,
                });
            }
        }
    }

    fn find_touch(&self, id: i64) -> Option<usize> {
        self.pointers
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, p)| p.id == id)
            .map(|(i, _)| i)
    }
}
