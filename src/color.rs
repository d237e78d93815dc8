//! Splat color generation.
//!
//! Two palettes, both randomized in HSL and scaled down by an intensity
//! factor: a muted ambient palette for pointer-driven ink and a brighter
//! one for automatic and opening splats.

use rand::Rng;

/// Low-intensity color for pointer splats.
pub fn ambient(rng: &mut impl Rng) -> [f32; 3] {
    let h = rng.r#gen::<f32>();
    let s = rng.gen_range(0.3..0.5);
    let l = rng.gen_range(0.4..0.6);
    let intensity = rng.gen_range(0.15..0.25);
    scale(hsl_to_rgb(h, s, l), intensity)
}

/// High-intensity color for automatic and opening splats.
pub fn bright(rng: &mut impl Rng) -> [f32; 3] {
    let h = rng.r#gen::<f32>();
    let s = rng.gen_range(0.6..0.9);
    let l = rng.gen_range(0.5..0.7);
    let intensity = rng.gen_range(0.4..0.6);
    scale(hsl_to_rgb(h, s, l), intensity)
}

fn scale(rgb: [f32; 3], factor: f32) -> [f32; 3] {
    [rgb[0] * factor, rgb[1] * factor, rgb[2] * factor]
}

/// Standard HSL to RGB conversion; all inputs and outputs in [0, 1].
fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h * 6.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match hp {
        hp if hp < 1.0 => (c, x, 0.0),
        hp if hp < 2.0 => (x, c, 0.0),
        hp if hp < 3.0 => (0.0, c, x),
        hp if hp < 4.0 => (0.0, x, c),
        hp if hp < 5.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r + m, g + m, b + m]
}
