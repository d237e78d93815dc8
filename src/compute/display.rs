//! Frame compositing.
//!
//! Fills the background color, then blends the dye over it with source
//! factor ONE and destination factor ONE_MINUS_SRC_ALPHA, where the dye's
//! alpha is the maximum of its color channels. Output is a tightly packed
//! RGBA8 buffer at dye resolution, rows top-down for direct blitting
//! (field rows run bottom-up).

use crate::compute::field::Field;

/// Composite `dye` over `back_color` into `out` (resized to fit).
pub fn composite_into(dye: &Field, back_color: [u8; 3], out: &mut Vec<u8>) {
    let grid = dye.grid();
    out.resize(grid.len() * 4, 0);

    let back = [
        back_color[0] as f32 / 255.0,
        back_color[1] as f32 / 255.0,
        back_color[2] as f32 / 255.0,
    ];

    for row in 0..grid.height {
        let y = grid.height - 1 - row;
        for x in 0..grid.width {
            let r = dye.get(x, y, 0);
            let g = dye.get(x, y, 1);
            let b = dye.get(x, y, 2);
            let alpha = r.max(g).max(b).clamp(0.0, 1.0);

            let o = (row * grid.width + x) * 4;
            out[o] = to_byte(r + back[0] * (1.0 - alpha));
            out[o + 1] = to_byte(g + back[1] * (1.0 - alpha));
            out[o + 2] = to_byte(b + back[2] * (1.0 - alpha));
            out[o + 3] = 255;
        }
    }
}

#[inline]
fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
