//! Gauss-Seidel relaxation with over-relaxation at one grid spacing.
//!
//! Each sweep first rebuilds the ghost border, then visits the coarse nodes
//! column by column (west to east, south to north within a column). Nodes in
//! one of the four quadrant states consume the next entry of the Briggs list,
//! which is why the classifier emits it in that same order.
use log::{debug, trace};
use serde::Serialize;

use crate::bounds::WorkingBounds;
use crate::grid::{edge_case, NodeStatus};

use super::boundary::BoundaryConditions;
use super::classify::QUADRANT_STENCIL;
use super::coefficients::StencilCoefficients;
use super::workspace::Workspace;

/// Which pass of a level is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IterationMode {
    /// Right after the bilinear forecast, with the coarse nodes held fixed.
    Interpolate,
    /// After the data have been reclassified at this spacing.
    Data,
}

impl IterationMode {
    pub fn letter(self) -> char {
        match self {
            IterationMode::Interpolate => 'I',
            IterationMode::Data => 'D',
        }
    }
}

/// Outcome of one call to [`Relaxation::iterate`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationRecord {
    pub grid: usize,
    pub mode: IterationMode,
    pub iterations: usize,
    /// Largest change of the last sweep, in z units.
    pub max_change: f64,
    /// Threshold the sweep was held against, in z units.
    pub limit: f64,
    /// Sweeps run so far over the whole solve.
    pub total_iterations: u64,
}

impl IterationRecord {
    pub fn converged(&self) -> bool {
        self.max_change <= self.limit
    }
}

/// Everything a sweep needs besides the mutable workspace.
pub struct Relaxation<'a> {
    pub coefficients: &'a StencilCoefficients,
    pub boundary: &'a BoundaryConditions,
    pub bounds: &'a WorkingBounds,
    /// Over-relaxation factor applied to the stencil value.
    pub relax_new: f64,
    /// RMS scale turning working changes back into z units.
    pub z_scale: f64,
}

impl Relaxation<'_> {
    /// One sweep over the current level. Returns the largest change, in
    /// working units.
    pub(crate) fn sweep(&self, ws: &mut Workspace) -> f64 {
        let Workspace {
            layout,
            grid,
            briggs,
            level,
            offsets,
            ..
        } = ws;
        self.boundary.apply(grid, layout, level, offsets);

        let relax_old = 1.0 - self.relax_new;
        let unconstrained = &self.coefficients.unconstrained;
        let constrained = &self.coefficients.constrained;
        let a0_const_2 = self.coefficients.a0_const_2;
        let mut next_briggs = briggs.iter();
        let mut max_change = 0.0f64;

        for bi in 0..level.block_nx {
            let x_case = edge_case(bi, level.block_nx - 1 - bi);
            for bj in 0..level.block_ny {
                let idx = level.node_index(layout, bi, bj);
                let status = grid.status(idx);
                if status.is_constrained() {
                    continue;
                }
                let y_case = edge_case(bj, level.block_ny - 1 - bj);
                let off = offsets.for_edges(x_case, y_case);

                let quadrant = status.quadrant();
                let entry = quadrant.and_then(|_| next_briggs.next());
                let value = match (quadrant, entry) {
                    (Some(q), Some(bc)) => {
                        let b = &bc.b;
                        let busum: f64 = QUADRANT_STENCIL[q]
                            .iter()
                            .zip(b.iter())
                            .map(|(&k, &bk)| bk * grid.near(idx, off[k]))
                            .sum();
                        let stencil: f64 = off
                            .iter()
                            .zip(constrained.iter())
                            .map(|(&o, &c)| c * grid.near(idx, o))
                            .sum();
                        (stencil + a0_const_2 * (busum + b[5])) * b[4]
                    }
                    _ => off
                        .iter()
                        .zip(unconstrained.iter())
                        .map(|(&o, &c)| c * grid.near(idx, o))
                        .sum(),
                };

                let old = f64::from(grid.at(idx));
                let relaxed = self.bounds.clamp(idx, old * relax_old + value * self.relax_new);
                let change = (relaxed - old).abs();
                grid.put(idx, relaxed as f32);
                if change > max_change {
                    max_change = change;
                }
            }
        }
        max_change
    }

    /// Sweep until the largest change in z units drops to `limit / grid` or
    /// `max_iterations * grid` sweeps have run. Running out of sweeps is not
    /// an error.
    pub(crate) fn iterate(
        &self,
        ws: &mut Workspace,
        mode: IterationMode,
        limit: f64,
        max_iterations: usize,
        total_iterations: &mut u64,
    ) -> IterationRecord {
        let grid = ws.spacing();
        let current_limit = limit / grid as f64;
        let cap = max_iterations * grid;
        let mut iterations = 0;
        let mut max_change;
        loop {
            max_change = self.sweep(ws) * self.z_scale;
            iterations += 1;
            *total_iterations += 1;
            trace!(
                "{grid:4} {} {iterations:8} {max_change:.6e} {current_limit:.6e} {total_iterations:10}",
                mode.letter()
            );
            if max_change <= current_limit || iterations >= cap {
                break;
            }
        }
        debug!(
            "{grid:4} {} {iterations:8} {max_change:.6e} {current_limit:.6e} {total_iterations:10}",
            mode.letter()
        );
        IterationRecord {
            grid,
            mode,
            iterations,
            max_change,
            limit: current_limit,
            total_iterations: *total_iterations,
        }
    }
}

/// Nodes whose status is not [`NodeStatus::Constrained`] at the current level.
pub(crate) fn free_nodes(ws: &Workspace) -> usize {
    let level = &ws.level;
    let mut count = 0;
    for bi in 0..level.block_nx {
        for bj in 0..level.block_ny {
            if ws.grid.status(level.node_index(&ws.layout, bi, bj)) != NodeStatus::Constrained {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::classify::{bin_points, NearestPointClassifier};
    use crate::types::{DataPoint, Lattice, Region, Registration};

    fn workspace(points: Vec<DataPoint>) -> Workspace {
        let lattice = Lattice::new(Region::new(0.0, 8.0, 0.0, 8.0), [1.0, 1.0], Registration::Node)
            .expect("lattice");
        Workspace::new(&lattice, points, 1)
    }

    fn classify(ws: &mut Workspace, coefficients: &StencilCoefficients, bounds: &WorkingBounds) {
        bin_points(&mut ws.points, &ws.region, &ws.level);
        let classifier = NearestPointClassifier {
            layout: &ws.layout,
            level: &ws.level,
            region: &ws.region,
            coefficients,
            trend_gradient: [0.0, 0.0],
            bounds,
        };
        ws.briggs = classifier.classify(&mut ws.grid, &ws.points);
    }

    fn sample_points() -> Vec<DataPoint> {
        vec![
            DataPoint::new(1.0, 1.0, 1.0),
            DataPoint::new(7.0, 2.0, -1.0),
            DataPoint::new(4.3, 4.4, 0.5),
            DataPoint::new(2.0, 7.0, -0.5),
            DataPoint::new(6.8, 6.3, 1.5),
        ]
    }

    #[test]
    fn sweeps_trend_towards_convergence() {
        let coefficients = StencilCoefficients::new(0.0, 1.0);
        let boundary = BoundaryConditions::new(0.0, 1.0, &coefficients, false);
        let bounds = WorkingBounds::open();
        let mut ws = workspace(sample_points());
        classify(&mut ws, &coefficients, &bounds);
        assert_eq!(ws.briggs.len(), 2);

        let relax = Relaxation {
            coefficients: &coefficients,
            boundary: &boundary,
            bounds: &bounds,
            relax_new: 1.4,
            z_scale: 1.0,
        };
        let changes: Vec<f64> = (0..400).map(|_| relax.sweep(&mut ws)).collect();
        assert!(changes.iter().all(|c| c.is_finite() && *c >= 0.0));
        let first = changes[0];
        let last = changes[changes.len() - 1];
        assert!(last < 0.05 * first, "first {first}, last {last}");
        // constrained nodes never move
        assert_eq!(ws.grid.get(1, 1), 1.0);
        assert_eq!(ws.grid.get(2, 7), -0.5);
    }

    #[test]
    fn iterate_stops_at_limit_or_cap() {
        let coefficients = StencilCoefficients::new(0.5, 1.0);
        let boundary = BoundaryConditions::new(0.5, 1.0, &coefficients, false);
        let bounds = WorkingBounds::open();
        let mut ws = workspace(sample_points());
        classify(&mut ws, &coefficients, &bounds);
        let relax = Relaxation {
            coefficients: &coefficients,
            boundary: &boundary,
            bounds: &bounds,
            relax_new: 1.4,
            z_scale: 1.0,
        };

        let mut total = 0;
        let capped = relax.iterate(&mut ws, IterationMode::Interpolate, 0.0, 3, &mut total);
        assert_eq!(capped.iterations, 3);
        assert_eq!(total, 3);

        let record = relax.iterate(&mut ws, IterationMode::Data, 1e-3, 5000, &mut total);
        assert!(record.converged(), "{record:?}");
        assert!(record.iterations < 5000);
        assert_eq!(record.total_iterations, 3 + record.iterations as u64);
        assert_eq!(record.mode.letter(), 'D');
    }

    #[test]
    fn fully_pinned_level_needs_one_sweep() {
        let coefficients = StencilCoefficients::new(0.0, 1.0);
        let boundary = BoundaryConditions::new(0.0, 1.0, &coefficients, false);
        let bounds = WorkingBounds::open();
        let lattice = Lattice::new(Region::new(0.0, 4.0, 0.0, 4.0), [1.0, 1.0], Registration::Node)
            .expect("lattice");
        let points = (0..25)
            .map(|k| DataPoint::new((k / 5) as f64, (k % 5) as f64, k as f64 * 0.1))
            .collect();
        let mut ws = Workspace::new(&lattice, points, 1);
        classify(&mut ws, &coefficients, &bounds);
        assert_eq!(free_nodes(&ws), 0);
        let relax = Relaxation {
            coefficients: &coefficients,
            boundary: &boundary,
            bounds: &bounds,
            relax_new: 1.4,
            z_scale: 2.0,
        };
        let mut total = 0;
        let record = relax.iterate(&mut ws, IterationMode::Data, 1e-6, 50, &mut total);
        assert_eq!(record.iterations, 1);
        assert_eq!(record.max_change, 0.0);
    }
}
