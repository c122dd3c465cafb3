use surface_gridder::Region;

/// Deterministic low-discrepancy samples of `f` over `region`.
pub fn scattered(n: usize, region: &Region, f: impl Fn(f64, f64) -> f64) -> Vec<[f64; 3]> {
    const PHI1: f64 = 0.754_877_666_246_692_7;
    const PHI2: f64 = 0.569_840_290_998_053_3;
    (1..=n)
        .map(|k| {
            let u = (0.5 + k as f64 * PHI1).fract();
            let v = (0.5 + k as f64 * PHI2).fract();
            let x = region.x_min + u * region.width();
            let y = region.y_min + v * region.height();
            [x, y, f(x, y)]
        })
        .collect()
}

/// Samples exactly on the nodes `(i, j)` of a lattice anchored at
/// `(x_min, y_min)` with spacing `inc`.
pub fn on_nodes(
    nodes: &[(usize, usize)],
    x_min: f64,
    y_min: f64,
    inc: f64,
    f: impl Fn(f64, f64) -> f64,
) -> Vec<[f64; 3]> {
    nodes
        .iter()
        .map(|&(i, j)| {
            let x = x_min + i as f64 * inc;
            let y = y_min + j as f64 * inc;
            [x, y, f(x, y)]
        })
        .collect()
}

/// A profile that steps from 0 to `height` along x, repeated on every row
/// `0..=n_rows_minus_one`. Data sit on columns 2, 4, 8 and 10.
pub fn step_profile(n_rows_minus_one: usize, height: f64) -> Vec<[f64; 3]> {
    let mut out = Vec::new();
    for j in 0..=n_rows_minus_one {
        for (x, z) in [(2.0, 0.0), (4.0, 0.0), (8.0, height), (10.0, height)] {
            out.push([x, j as f64, z]);
        }
    }
    out
}

pub fn grid_min(values: &[f32]) -> f32 {
    values.iter().copied().fold(f32::INFINITY, f32::min)
}
