//! Deterministic lattice value noise.

use glam::Vec3;

fn hash3(x: i32, y: i32, z: i32, seed: u32) -> f32 {
    let mut n = (x as u32).wrapping_mul(374_761_393)
        ^ (y as u32).wrapping_mul(668_265_263)
        ^ (z as u32).wrapping_mul(2_147_483_647)
        ^ seed.wrapping_mul(0x9E37_79B9);
    n = (n ^ (n >> 13)).wrapping_mul(1_274_126_177);
    n ^= n >> 16;
    ((n & 0x00FF_FFFF) as f32) / 16_777_215.0
}

#[inline]
fn smooth(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Smoothly interpolated noise in [-1, 1].
pub fn value_noise(p: Vec3, seed: u32) -> f32 {
    let base = p.floor();
    let frac = p - base;
    let (x0, y0, z0) = (base.x as i32, base.y as i32, base.z as i32);
    let (u, v, w) = (smooth(frac.x), smooth(frac.y), smooth(frac.z));

    let corner = |dx: i32, dy: i32, dz: i32| hash3(x0 + dx, y0 + dy, z0 + dz, seed);
    let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;

    let x00 = lerp(corner(0, 0, 0), corner(1, 0, 0), u);
    let x10 = lerp(corner(0, 1, 0), corner(1, 1, 0), u);
    let x01 = lerp(corner(0, 0, 1), corner(1, 0, 1), u);
    let x11 = lerp(corner(0, 1, 1), corner(1, 1, 1), u);
    let y0 = lerp(x00, x10, v);
    let y1 = lerp(x01, x11, v);
    lerp(y0, y1, w) * 2.0 - 1.0
}

/// Two octaves of [`value_noise`] drifting with `time`, in [-1, 1].
pub fn terrain(p: Vec3, time: f32) -> f32 {
    let drift = Vec3::new(time * 0.5, -time * 0.4, time * 0.3);
    let low = value_noise(p * 1.6 + drift, 17);
    let high = value_noise(p * 3.4 - drift * 1.3, 0xA53A_9B17);
    (low * 0.65 + high * 0.35).clamp(-1.0, 1.0)
}
