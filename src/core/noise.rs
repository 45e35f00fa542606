//! Hash and gradient noise.
//!
//! Jenkins lookup3 hashing feeds Perlin gradient noise in one to four
//! dimensions, with a fractal octave accumulator on top. The amplitude
//! scale factors keep the signed output close to [-1, 1] per dimension.

use crate::core::geometry::{Vector2f, Vector3f, Vector4f};
use crate::core::pbrt::*;

#[inline(always)]
fn rot(x: u32, k: u32) -> u32 {
    (x << k) | (x >> (32 - k))
}

#[inline(always)]
fn bit_mix(mut a: u32, mut b: u32, mut c: u32) -> (u32, u32, u32) {
    a = a.wrapping_sub(c);
    a ^= rot(c, 4);
    c = c.wrapping_add(b);
    b = b.wrapping_sub(a);
    b ^= rot(a, 6);
    a = a.wrapping_add(c);
    c = c.wrapping_sub(b);
    c ^= rot(b, 8);
    b = b.wrapping_add(a);
    a = a.wrapping_sub(c);
    a ^= rot(c, 16);
    c = c.wrapping_add(b);
    b = b.wrapping_sub(a);
    b ^= rot(a, 19);
    a = a.wrapping_add(c);
    c = c.wrapping_sub(b);
    c ^= rot(b, 4);
    b = b.wrapping_add(a);
    (a, b, c)
}

#[inline(always)]
fn bit_final(mut a: u32, mut b: u32, mut c: u32) -> u32 {
    c ^= b;
    c = c.wrapping_sub(rot(b, 14));
    a ^= c;
    a = a.wrapping_sub(rot(c, 11));
    b ^= a;
    b = b.wrapping_sub(rot(a, 25));
    c ^= b;
    c = c.wrapping_sub(rot(b, 16));
    a ^= c;
    a = a.wrapping_sub(rot(c, 4));
    b ^= a;
    b = b.wrapping_sub(rot(a, 14));
    c ^= b;
    c = c.wrapping_sub(rot(b, 24));
    c
}

/// Jenkins lookup3 hash of one integer.
pub fn hash_u32(kx: u32) -> u32 {
    let a = 0xdeadbeef_u32.wrapping_add(1 << 2).wrapping_add(13);
    bit_final(a.wrapping_add(kx), a, a)
}

/// Jenkins lookup3 hash of two integers.
pub fn hash_u32_2(kx: u32, ky: u32) -> u32 {
    let init = 0xdeadbeef_u32.wrapping_add(2 << 2).wrapping_add(13);
    bit_final(init.wrapping_add(kx), init.wrapping_add(ky), init)
}

/// Jenkins lookup3 hash of three integers.
pub fn hash_u32_3(kx: u32, ky: u32, kz: u32) -> u32 {
    let init = 0xdeadbeef_u32.wrapping_add(3 << 2).wrapping_add(13);
    bit_final(
        init.wrapping_add(kx),
        init.wrapping_add(ky),
        init.wrapping_add(kz),
    )
}

/// Jenkins lookup3 hash of four integers.
pub fn hash_u32_4(kx: u32, ky: u32, kz: u32, kw: u32) -> u32 {
    let init = 0xdeadbeef_u32.wrapping_add(4 << 2).wrapping_add(13);
    let (a, b, c) = bit_mix(
        init.wrapping_add(kx),
        init.wrapping_add(ky),
        init.wrapping_add(kz),
    );
    bit_final(a.wrapping_add(kw), b, c)
}

/// Hashes a float to a uniform value in [0, 1].
pub fn hash_float_to_float(k: Float) -> Float {
    hash_u32(k.to_bits()) as Float / u32::MAX as Float
}

/// Hashes two floats to a uniform value in [0, 1].
pub fn hash_float2_to_float(k: Vector2f) -> Float {
    hash_u32_2(k.x.to_bits(), k.y.to_bits()) as Float / u32::MAX as Float
}

#[inline]
fn quick_floor(x: Float) -> i32 {
    (x as i32) - if x < 0.0 { 1 } else { 0 }
}

#[inline]
fn floor_frac(x: Float) -> (i32, Float) {
    let i = quick_floor(x);
    (i, x - i as Float)
}

#[inline]
fn fade(t: Float) -> Float {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn negate_if(val: Float, condition: u32) -> Float {
    if condition != 0 {
        -val
    } else {
        val
    }
}

fn grad1(hash: u32, x: Float) -> Float {
    let h = hash & 15;
    let g = 1.0 + (h & 7) as Float;
    negate_if(g, h & 8) * x
}

fn grad2(hash: u32, x: Float, y: Float) -> Float {
    let h = hash & 7;
    let u = if h < 4 { x } else { y };
    let v = 2.0 * if h < 4 { y } else { x };
    negate_if(u, h & 1) + negate_if(v, h & 2)
}

fn grad3(hash: u32, x: Float, y: Float, z: Float) -> Float {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let vt = if h == 12 || h == 14 { x } else { z };
    let v = if h < 4 { y } else { vt };
    negate_if(u, h & 1) + negate_if(v, h & 2)
}

fn grad4(hash: u32, x: Float, y: Float, z: Float, w: Float) -> Float {
    let h = hash & 31;
    let u = if h < 24 { x } else { y };
    let v = if h < 16 { y } else { z };
    let s = if h < 8 { z } else { w };
    negate_if(u, h & 1) + negate_if(v, h & 2) + negate_if(s, h & 4)
}

#[inline]
fn bi_mix(v0: Float, v1: Float, v2: Float, v3: Float, x: Float, y: Float) -> Float {
    let x1 = 1.0 - x;
    (1.0 - y) * (v0 * x1 + v1 * x) + y * (v2 * x1 + v3 * x)
}

#[allow(clippy::too_many_arguments)]
#[inline]
fn tri_mix(
    v0: Float,
    v1: Float,
    v2: Float,
    v3: Float,
    v4: Float,
    v5: Float,
    v6: Float,
    v7: Float,
    x: Float,
    y: Float,
    z: Float,
) -> Float {
    let x1 = 1.0 - x;
    let y1 = 1.0 - y;
    let z1 = 1.0 - z;
    z1 * (y1 * (v0 * x1 + v1 * x) + y * (v2 * x1 + v3 * x))
        + z * (y1 * (v4 * x1 + v5 * x) + y * (v6 * x1 + v7 * x))
}

fn perlin_1d(x: Float) -> Float {
    let (ix, fx) = floor_frac(x);
    let u = fade(fx);
    lerp(
        u,
        grad1(hash_u32(ix as u32), fx),
        grad1(hash_u32((ix + 1) as u32), fx - 1.0),
    )
}

fn perlin_2d(x: Float, y: Float) -> Float {
    let (ix, fx) = floor_frac(x);
    let (iy, fy) = floor_frac(y);

    let u = fade(fx);
    let v = fade(fy);

    bi_mix(
        grad2(hash_u32_2(ix as u32, iy as u32), fx, fy),
        grad2(hash_u32_2((ix + 1) as u32, iy as u32), fx - 1.0, fy),
        grad2(hash_u32_2(ix as u32, (iy + 1) as u32), fx, fy - 1.0),
        grad2(hash_u32_2((ix + 1) as u32, (iy + 1) as u32), fx - 1.0, fy - 1.0),
        u,
        v,
    )
}

fn perlin_3d(x: Float, y: Float, z: Float) -> Float {
    let (ix, fx) = floor_frac(x);
    let (iy, fy) = floor_frac(y);
    let (iz, fz) = floor_frac(z);

    let u = fade(fx);
    let v = fade(fy);
    let w = fade(fz);

    let (x0, y0, z0) = (ix as u32, iy as u32, iz as u32);
    let (x1, y1, z1) = ((ix + 1) as u32, (iy + 1) as u32, (iz + 1) as u32);

    tri_mix(
        grad3(hash_u32_3(x0, y0, z0), fx, fy, fz),
        grad3(hash_u32_3(x1, y0, z0), fx - 1.0, fy, fz),
        grad3(hash_u32_3(x0, y1, z0), fx, fy - 1.0, fz),
        grad3(hash_u32_3(x1, y1, z0), fx - 1.0, fy - 1.0, fz),
        grad3(hash_u32_3(x0, y0, z1), fx, fy, fz - 1.0),
        grad3(hash_u32_3(x1, y0, z1), fx - 1.0, fy, fz - 1.0),
        grad3(hash_u32_3(x0, y1, z1), fx, fy - 1.0, fz - 1.0),
        grad3(hash_u32_3(x1, y1, z1), fx - 1.0, fy - 1.0, fz - 1.0),
        u,
        v,
        w,
    )
}

fn perlin_4d(x: Float, y: Float, z: Float, w: Float) -> Float {
    let (ix, fx) = floor_frac(x);
    let (iy, fy) = floor_frac(y);
    let (iz, fz) = floor_frac(z);
    let (iw, fw) = floor_frac(w);

    let u = fade(fx);
    let v = fade(fy);
    let t = fade(fz);
    let s = fade(fw);

    let (x0, y0, z0, w0) = (ix as u32, iy as u32, iz as u32, iw as u32);
    let (x1, y1, z1, w1) = (
        (ix + 1) as u32,
        (iy + 1) as u32,
        (iz + 1) as u32,
        (iw + 1) as u32,
    );

    let lo = tri_mix(
        grad4(hash_u32_4(x0, y0, z0, w0), fx, fy, fz, fw),
        grad4(hash_u32_4(x1, y0, z0, w0), fx - 1.0, fy, fz, fw),
        grad4(hash_u32_4(x0, y1, z0, w0), fx, fy - 1.0, fz, fw),
        grad4(hash_u32_4(x1, y1, z0, w0), fx - 1.0, fy - 1.0, fz, fw),
        grad4(hash_u32_4(x0, y0, z1, w0), fx, fy, fz - 1.0, fw),
        grad4(hash_u32_4(x1, y0, z1, w0), fx - 1.0, fy, fz - 1.0, fw),
        grad4(hash_u32_4(x0, y1, z1, w0), fx, fy - 1.0, fz - 1.0, fw),
        grad4(hash_u32_4(x1, y1, z1, w0), fx - 1.0, fy - 1.0, fz - 1.0, fw),
        u,
        v,
        t,
    );
    let hi = tri_mix(
        grad4(hash_u32_4(x0, y0, z0, w1), fx, fy, fz, fw - 1.0),
        grad4(hash_u32_4(x1, y0, z0, w1), fx - 1.0, fy, fz, fw - 1.0),
        grad4(hash_u32_4(x0, y1, z0, w1), fx, fy - 1.0, fz, fw - 1.0),
        grad4(hash_u32_4(x1, y1, z0, w1), fx - 1.0, fy - 1.0, fz, fw - 1.0),
        grad4(hash_u32_4(x0, y0, z1, w1), fx, fy, fz - 1.0, fw - 1.0),
        grad4(hash_u32_4(x1, y0, z1, w1), fx - 1.0, fy, fz - 1.0, fw - 1.0),
        grad4(hash_u32_4(x0, y1, z1, w1), fx, fy - 1.0, fz - 1.0, fw - 1.0),
        grad4(hash_u32_4(x1, y1, z1, w1), fx - 1.0, fy - 1.0, fz - 1.0, fw - 1.0),
        u,
        v,
        t,
    );
    lerp(s, lo, hi)
}

#[inline]
fn ensure_finite(v: Float) -> Float {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Signed 1-D noise in roughly [-1, 1].
pub fn snoise_1d(p: Float) -> Float {
    0.2500 * ensure_finite(perlin_1d(p))
}

/// Signed 2-D noise in roughly [-1, 1].
pub fn snoise_2d(p: Vector2f) -> Float {
    0.6616 * ensure_finite(perlin_2d(p.x, p.y))
}

/// Signed 3-D noise in roughly [-1, 1].
pub fn snoise_3d(p: Vector3f) -> Float {
    0.9820 * ensure_finite(perlin_3d(p.x, p.y, p.z))
}

/// Signed 4-D noise in roughly [-1, 1].
pub fn snoise_4d(p: Vector4f) -> Float {
    0.8344 * ensure_finite(perlin_4d(p.x, p.y, p.z, p.w))
}

/// Unsigned 1-D noise in roughly [0, 1].
pub fn noise_1d(p: Float) -> Float {
    0.5 * snoise_1d(p) + 0.5
}

/// Unsigned 2-D noise in roughly [0, 1].
pub fn noise_2d(p: Vector2f) -> Float {
    0.5 * snoise_2d(p) + 0.5
}

/// Unsigned 3-D noise in roughly [0, 1].
pub fn noise_3d(p: Vector3f) -> Float {
    0.5 * snoise_3d(p) + 0.5
}

/// Unsigned 4-D noise in roughly [0, 1].
pub fn noise_4d(p: Vector4f) -> Float {
    0.5 * snoise_4d(p) + 0.5
}

/// Accumulates octaves of unsigned noise. `octaves` may be fractional; the
/// remainder blends one extra octave in. `roughness` scales the amplitude
/// from one octave to the next.
///
/// * `noise`     - Unsigned noise at a point, parameterized by frequency.
/// * `octaves`   - Octave count in [0, 15].
/// * `roughness` - Per-octave amplitude falloff in [0, 1].
pub fn fractal_noise<N: Fn(Float) -> Float>(noise: N, octaves: Float, roughness: Float) -> Float {
    let octaves = clamp(octaves, 0.0, 15.0);
    let n = octaves as i32;

    let mut fscale = 1.0;
    let mut amp = 1.0;
    let mut maxamp = 0.0;
    let mut sum = 0.0;
    for _ in 0..=n {
        sum += noise(fscale) * amp;
        maxamp += amp;
        amp *= clamp(roughness, 0.0, 1.0);
        fscale *= 2.0;
    }

    let rmd = octaves - octaves.floor();
    if rmd != 0.0 {
        let sum2 = sum + noise(fscale) * amp;
        lerp(rmd, sum / maxamp, sum2 / (maxamp + amp))
    } else {
        sum / maxamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_deterministic() {
        assert_eq!(hash_u32(17), hash_u32(17));
        assert_ne!(hash_u32(17), hash_u32(18));
        assert_ne!(hash_u32_2(1, 2), hash_u32_2(2, 1));
    }

    #[test]
    fn float_hash_is_uniform_range() {
        for i in 0..128 {
            let v = hash_float_to_float(i as Float * 0.37);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn snoise_is_bounded() {
        for i in 0..512 {
            let p = Vector3f::new(i as Float * 0.13, i as Float * 0.07, i as Float * 0.19);
            let v = snoise_3d(p);
            assert!(v.abs() <= 1.2, "value {v} at {p:?}");
        }
    }

    #[test]
    fn noise_is_reproducible() {
        let p = Vector2f::new(3.7, -1.2);
        assert_eq!(noise_2d(p), noise_2d(p));
    }

    #[test]
    fn fractal_octaves_average_stays_unsigned() {
        let p = Vector3f::new(0.4, 1.3, 2.2);
        let v = fractal_noise(|s| noise_3d(p * s), 3.5, 0.5);
        assert!((0.0..=1.0).contains(&v));
    }
}
