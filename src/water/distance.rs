// src/water/distance.rs
// Exact squared Euclidean distance transform over binary seed grids
// Backs the signed distance field and the morphological expand/erode of SurfaceModel
// RELEVANT FILES: src/water/surface.rs, tests/test_water_surface_model.rs

/// Stand-in for "no seed reachable" in the squared-distance domain.
pub const FAR: f64 = 1.0e20;

/// Squared distance from every cell to the nearest `true` cell.
///
/// Felzenszwalb & Huttenlocher two-pass lower-envelope algorithm: one 1D
/// transform per column, then one per row over the column results. Grids
/// without any seed return [`FAR`] everywhere.
pub fn squared_edt(seeds: &[bool], width: usize, height: usize) -> Vec<f64> {
    debug_assert_eq!(seeds.len(), width * height);
    let mut grid: Vec<f64> = seeds.iter().map(|&s| if s { 0.0 } else { FAR }).collect();
    if width == 0 || height == 0 {
        return grid;
    }

    let n = width.max(height);
    let mut f = vec![0.0f64; n];
    let mut d = vec![0.0f64; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];

    // Columns
    for x in 0..width {
        for y in 0..height {
            f[y] = grid[y * width + x];
        }
        transform_1d(&f[..height], &mut d[..height], &mut v, &mut z);
        for y in 0..height {
            grid[y * width + x] = d[y];
        }
    }

    // Rows
    for y in 0..height {
        let row = &mut grid[y * width..(y + 1) * width];
        f[..width].copy_from_slice(row);
        transform_1d(&f[..width], &mut d[..width], &mut v, &mut z);
        row.copy_from_slice(&d[..width]);
    }

    grid
}

/// Euclidean distance (pixels) from every cell to the nearest `true` cell.
pub fn distance_to(seeds: &[bool], width: usize, height: usize) -> Vec<f32> {
    squared_edt(seeds, width, height)
        .into_iter()
        .map(|d2| if d2 >= FAR { f32::INFINITY } else { d2.sqrt() as f32 })
        .collect()
}

fn transform_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }

    let mut k = 0usize;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        let fq = f[q] + (q * q) as f64;
        let intersect = |p: usize| (fq - (f[p] + (p * p) as f64)) / (2.0 * (q - p) as f64);
        let mut s = intersect(v[k]);
        // z[0] is -inf, so the envelope never pops below its first parabola
        while s <= z[k] {
            k -= 1;
            s = intersect(v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let p = v[k];
        let dq = q as f64 - p as f64;
        *out = dq * dq + f[p];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(seeds: &[bool], w: usize, h: usize) -> Vec<f64> {
        let mut out = vec![FAR; w * h];
        for y in 0..h {
            for x in 0..w {
                for sy in 0..h {
                    for sx in 0..w {
                        if seeds[sy * w + sx] {
                            let dx = x as f64 - sx as f64;
                            let dy = y as f64 - sy as f64;
                            let d2 = dx * dx + dy * dy;
                            if d2 < out[y * w + x] {
                                out[y * w + x] = d2;
                            }
                        }
                    }
                }
            }
        }
        out
    }

    #[test]
    fn matches_brute_force_on_scattered_seeds() {
        let (w, h) = (23, 17);
        let mut seeds = vec![false; w * h];
        let mut state = 7u32;
        for cell in seeds.iter_mut() {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            *cell = (state >> 24) < 20;
        }
        let fast = squared_edt(&seeds, w, h);
        let slow = brute_force(&seeds, w, h);
        for (a, b) in fast.iter().zip(slow.iter()) {
            assert!((a - b).abs() < 1e-6, "edt mismatch: {} vs {}", a, b);
        }
    }

    #[test]
    fn empty_grid_is_far_everywhere() {
        let seeds = vec![false; 16];
        let d = distance_to(&seeds, 4, 4);
        assert!(d.iter().all(|v| v.is_infinite()));
    }

    #[test]
    fn single_seed_gives_radial_distance() {
        let (w, h) = (9, 9);
        let mut seeds = vec![false; w * h];
        seeds[4 * w + 4] = true;
        let d = distance_to(&seeds, w, h);
        assert_eq!(d[4 * w + 4], 0.0);
        assert!((d[4 * w + 8] - 4.0).abs() < 1e-6);
        assert!((d[0] - (32.0f32).sqrt()).abs() < 1e-5);
    }
}
