// src/water/noise.rs
// Deterministic 512x512 RGBA noise shared by every pass instance
// Linear congruential bytes so the texture is identical across runs and platforms
// RELEVANT FILES: src/water/pass.rs, src/shaders/water.frag

use once_cell::sync::Lazy;

pub const NOISE_SIZE: u32 = 512;
pub const NOISE_SEED: u32 = 12345;

static NOISE_RGBA: Lazy<Vec<u8>> = Lazy::new(|| generate_noise(NOISE_SIZE, NOISE_SEED));

/// Shared noise buffer (RGBA8, `NOISE_SIZE` squared).
pub fn noise_rgba() -> &'static [u8] {
    &NOISE_RGBA
}

/// LCG bytes: `seed = seed * 1664525 + 1013904223`, byte = top 8 bits.
pub fn generate_noise(size: u32, seed: u32) -> Vec<u8> {
    let len = (size as usize) * (size as usize) * 4;
    let mut state = seed;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        state = state.wrapping_mul(1664525).wrapping_add(1013904223);
        out.push((state >> 24) as u8);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_deterministic() {
        let a = generate_noise(NOISE_SIZE, NOISE_SEED);
        let b = generate_noise(NOISE_SIZE, NOISE_SEED);
        assert_eq!(a, b);
        assert_eq!(noise_rgba(), a.as_slice());
        assert_eq!(a.len(), 512 * 512 * 4);
    }

    #[test]
    fn first_bytes_follow_the_lcg() {
        let n = generate_noise(1, NOISE_SEED);
        let s1 = 12345u32.wrapping_mul(1664525).wrapping_add(1013904223);
        let s2 = s1.wrapping_mul(1664525).wrapping_add(1013904223);
        assert_eq!(n[0], (s1 >> 24) as u8);
        assert_eq!(n[1], (s2 >> 24) as u8);
    }

    #[test]
    fn channels_are_well_spread() {
        let n = noise_rgba();
        for c in 0..4 {
            let mean: f64 = n.iter().skip(c).step_by(4).map(|&v| v as f64).sum::<f64>()
                / (NOISE_SIZE * NOISE_SIZE) as f64;
            assert!((mean - 127.5).abs() < 4.0, "channel {c} mean {mean}");
        }
    }
}
