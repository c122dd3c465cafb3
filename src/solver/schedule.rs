//! Coarse-to-fine spacing cascade and grid-size suggestions.
//!
//! Every spacing visited divides both `n_columns - 1` and `n_rows - 1`: the
//! cascade starts from their greatest common divisor and drops one prime
//! factor (the largest left) per level. Sizes whose interval counts share
//! many small factors therefore converge much faster, which is what
//! [`suggest_dimensions`] searches for.
use log::warn;
use serde::Serialize;

use crate::types::Region;

/// Greatest common divisor by Euclid's method.
pub fn gcd(a: usize, b: usize) -> usize {
    let (mut u, mut v) = (a.max(b), a.min(b));
    while v > 0 {
        let r = u % v;
        u = v;
        v = r;
    }
    u
}

/// Prime factors of `n` in ascending order, with multiplicity.
pub fn prime_factors(n: usize) -> Vec<usize> {
    let mut factors = Vec::new();
    let mut rest = n;
    let mut p = 2;
    while p * p <= rest {
        while rest % p == 0 {
            factors.push(p);
            rest /= p;
        }
        p += if p == 2 { 1 } else { 2 };
    }
    if rest > 1 {
        factors.push(rest);
    }
    factors
}

/// Spacings visited by the multigrid loop, coarsest first and ending at 1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSchedule {
    spacings: Vec<usize>,
    common_divisor: usize,
}

impl GridSchedule {
    /// Build the cascade for a lattice of `n_columns × n_rows` nodes. The
    /// coarsest level keeps at least 4 nodes along each axis.
    pub fn new(n_columns: usize, n_rows: usize) -> Self {
        let common_divisor = gcd(n_columns - 1, n_rows - 1);
        if common_divisor == 1 {
            warn!(
                "grid dimensions {n_columns} x {n_rows} are mutually prime; convergence is very unlikely"
            );
        }
        let mut factors = prime_factors(common_divisor);
        let blocks = |grid: usize| ((n_columns - 1) / grid + 1, (n_rows - 1) / grid + 1);

        let mut grid = common_divisor.max(1);
        while grid > 1 {
            let (bx, by) = blocks(grid);
            if bx >= 4 && by >= 4 {
                break;
            }
            match factors.pop() {
                Some(f) => grid /= f,
                None => break,
            }
        }

        let mut spacings = vec![grid];
        while let Some(f) = factors.pop() {
            if grid == 1 {
                break;
            }
            grid /= f;
            spacings.push(grid);
        }
        Self {
            spacings,
            common_divisor,
        }
    }

    pub fn spacings(&self) -> &[usize] {
        &self.spacings
    }

    pub fn coarsest(&self) -> usize {
        self.spacings[0]
    }

    /// `true` when the two interval counts share no factor.
    pub fn is_relatively_prime(&self) -> bool {
        self.common_divisor == 1
    }
}

/// Relative cost of solving on `nx × ny` intervals.
///
/// Conjectured proportional to `Σ nxg · nyg · L` over the levels, where `L`
/// is how far constraints must propagate at that level: the full extent on
/// the coarsest level and the division factor after that.
pub fn guess_surface_time(nx: usize, ny: usize) -> f64 {
    let mut divisor = gcd(nx, ny);
    let mut factors = Vec::new();
    let (mut nxg, mut nyg) = (nx, ny);
    if divisor > 1 {
        factors = prime_factors(divisor);
        nxg = nx / divisor;
        nyg = ny / divisor;
        if nxg < 3 || nyg < 3 {
            if let Some(f) = factors.pop() {
                divisor /= f;
                nxg *= f;
                nyg *= f;
            }
        }
    }
    let length = nxg.max(nyg) as f64;
    let mut total = nxg as f64 * (nyg as f64 * length);
    while divisor > 1 {
        let Some(f) = factors.pop() else { break };
        divisor /= f;
        nxg *= f;
        nyg *= f;
        total += nxg as f64 * (nyg as f64 * f as f64);
    }
    total
}

/// A candidate lattice size expected to solve faster than the requested one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeSuggestion {
    pub x_intervals: usize,
    pub y_intervals: usize,
    /// Estimated run-time ratio, requested over suggested.
    pub speedup: f64,
}

impl SizeSuggestion {
    /// Grow `region` (currently `current` intervals of `inc`) to this size,
    /// splitting the extra intervals between both sides with the odd one
    /// going east or north.
    pub fn expanded_region(&self, region: &Region, inc: [f64; 2], current: (usize, usize)) -> Region {
        let grow = |lo: f64, hi: f64, extra: usize, step: f64| {
            let half = (extra / 2) as f64 * step;
            let odd = (extra % 2) as f64 * step;
            (lo - half, hi + half + odd)
        };
        let (x_min, x_max) = grow(
            region.x_min,
            region.x_max,
            self.x_intervals.saturating_sub(current.0),
            inc[0],
        );
        let (y_min, y_max) = grow(
            region.y_min,
            region.y_max,
            self.y_intervals.saturating_sub(current.1),
            inc[1],
        );
        Region::new(x_min, x_max, y_min, y_max)
    }
}

/// Candidates of the form `2^a · 3^b · 5^c` (with `a ≥ 1`) in `[n, 2n]`.
fn composite_sizes(n: usize) -> Vec<usize> {
    let stop = 2 * n;
    let mut sizes = Vec::new();
    let mut n2 = 2;
    while n2 <= stop {
        let mut n3 = 1;
        while n3 <= stop {
            let mut n5 = 1;
            while n5 <= stop {
                let size = n2 * n3 * n5;
                if (n..=stop).contains(&size) {
                    sizes.push(size);
                }
                n5 *= 5;
            }
            n3 *= 3;
        }
        n2 *= 2;
    }
    sizes
}

/// Up to ten interval counts near `(nx, ny)` that should converge faster,
/// best first. `nx`/`ny` are interval counts, one less than node counts.
pub fn suggest_dimensions(nx: usize, ny: usize) -> Vec<SizeSuggestion> {
    let users_time = guess_surface_time(nx, ny);
    let xs = composite_sizes(nx);
    let ys = composite_sizes(ny);

    let score = |x: usize| -> Vec<SizeSuggestion> {
        ys.iter()
            .filter_map(|&y| {
                let time = guess_surface_time(x, y);
                (time < users_time).then(|| SizeSuggestion {
                    x_intervals: x,
                    y_intervals: y,
                    speedup: users_time / time,
                })
            })
            .collect()
    };

    #[cfg(feature = "parallel")]
    let mut suggestions: Vec<SizeSuggestion> = {
        use rayon::prelude::*;
        xs.par_iter().flat_map_iter(|&x| score(x)).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let mut suggestions: Vec<SizeSuggestion> = xs.iter().flat_map(|&x| score(x)).collect();

    suggestions.sort_by(|a, b| b.speedup.total_cmp(&a.speedup));
    suggestions.truncate(10);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcd_and_factors() {
        assert_eq!(gcd(100, 60), 20);
        assert_eq!(gcd(9, 11), 1);
        assert_eq!(gcd(0, 7), 7);
        assert_eq!(prime_factors(360), vec![2, 2, 2, 3, 3, 5]);
        assert_eq!(prime_factors(97), vec![97]);
        assert!(prime_factors(1).is_empty());
    }

    #[test]
    fn cascade_drops_largest_factor_first() {
        let schedule = GridSchedule::new(101, 101);
        assert_eq!(schedule.spacings(), &[20, 4, 2, 1]);
        assert!(!schedule.is_relatively_prime());

        let prime = GridSchedule::new(10, 12);
        assert_eq!(prime.spacings(), &[1]);
        assert!(prime.is_relatively_prime());
    }

    #[test]
    fn every_spacing_divides_both_interval_counts() {
        for (nc, nr) in [(101, 61), (49, 25), (13, 7), (121, 121), (31, 46), (5, 5)] {
            let schedule = GridSchedule::new(nc, nr);
            let spacings = schedule.spacings();
            assert_eq!(spacings.last(), Some(&1), "{nc}x{nr}");
            assert!(spacings.windows(2).all(|w| w[0] > w[1]), "{spacings:?}");
            for &g in spacings {
                assert_eq!((nc - 1) % g, 0, "{nc}x{nr} spacing {g}");
                assert_eq!((nr - 1) % g, 0, "{nc}x{nr} spacing {g}");
            }
            let g = schedule.coarsest();
            assert!(g == 1 || ((nc - 1) / g + 1 >= 4 && (nr - 1) / g + 1 >= 4));
        }
    }

    #[test]
    fn suggestions_beat_a_prime_size() {
        let suggestions = suggest_dimensions(97, 89);
        assert!(!suggestions.is_empty());
        assert!(suggestions.len() <= 10);
        assert!(suggestions.windows(2).all(|w| w[0].speedup >= w[1].speedup));
        for s in &suggestions {
            assert!(s.speedup > 1.0);
            assert!((97..=194).contains(&s.x_intervals));
            assert!((89..=178).contains(&s.y_intervals));
            assert_eq!(s.x_intervals % 2, 0);
        }
    }

    #[test]
    fn expanded_region_keeps_the_increment_grid() {
        let s = SizeSuggestion {
            x_intervals: 100,
            y_intervals: 90,
            speedup: 2.0,
        };
        let grown = s.expanded_region(&Region::new(0.0, 97.0, 10.0, 99.0), [1.0, 1.0], (97, 89));
        assert_eq!(grown, Region::new(-1.0, 99.0, 10.0, 100.0));
    }
}
