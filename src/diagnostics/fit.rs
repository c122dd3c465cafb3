//! Misfit of the final surface at the data and its total curvature.
use log::info;
use serde::Serialize;

use crate::grid::NodeStatus;
use crate::solver::boundary::BoundaryConditions;
use crate::solver::workspace::Workspace;

/// How well the solved surface honours the samples it was not pinned to.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitStatistics {
    /// Samples left after pruning.
    pub n_points: usize,
    pub n_nodes: usize,
    /// Samples whose node is not pinned, i.e. those the misfit is taken over.
    pub n_checked: usize,
    /// Mean of `estimate - z` in z units.
    pub mean_error: f64,
    /// RMS of `estimate - z` in z units.
    pub rms_error: f64,
    /// Sum of squared five-point Laplacians of the normalised solution.
    pub curvature: f64,
}

impl FitStatistics {
    /// Evaluate a third-order Taylor expansion about each sample's node and
    /// compare it with the sample. Must run at the final spacing.
    pub(crate) fn measure(ws: &mut Workspace, boundary: &BoundaryConditions, z_scale: f64) -> Self {
        boundary.apply(&mut ws.grid, &ws.layout, &ws.level, &ws.offsets);
        let o = *ws.offsets.case(12);
        let grid = &ws.grid;
        let u = |idx: usize, k: usize| grid.near(idx, o[k]);

        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let mut n_checked = 0usize;
        for p in &ws.points {
            let (i, j) = ws.level.block_of(p.cell);
            let idx = ws.layout.index(i, j);
            if grid.status(idx) == NodeStatus::Constrained {
                continue;
            }
            let dx = (p.x - (ws.region.x_min + i as f64 * ws.inc[0])) / ws.inc[0];
            let dy = (p.y - (ws.region.y_min + j as f64 * ws.inc[1])) / ws.inc[1];
            let u0 = grid.near(idx, 0);

            let du_dx = 0.5 * (u(idx, 6) - u(idx, 5));
            let du_dy = 0.5 * (u(idx, 2) - u(idx, 9));
            let d2u_dx2 = u(idx, 6) + u(idx, 5) - 2.0 * u0;
            let d2u_dy2 = u(idx, 2) + u(idx, 9) - 2.0 * u0;
            let d2u_dxdy = 0.25 * (u(idx, 3) - u(idx, 1) - u(idx, 10) + u(idx, 8));
            let d3u_dx3 = 0.5 * (u(idx, 7) - 2.0 * u(idx, 6) + 2.0 * u(idx, 5) - u(idx, 4));
            let d3u_dy3 = 0.5 * (u(idx, 0) - 2.0 * u(idx, 2) + 2.0 * u(idx, 9) - u(idx, 11));
            let d3u_dx2dy = 0.5
                * ((u(idx, 3) + u(idx, 1) - 2.0 * u(idx, 2)) - (u(idx, 10) + u(idx, 8) - 2.0 * u(idx, 9)));
            let d3u_dxdy2 = 0.5
                * ((u(idx, 3) + u(idx, 10) - 2.0 * u(idx, 6)) - (u(idx, 1) + u(idx, 8) - 2.0 * u(idx, 5)));

            let estimate = u0
                + dx * (du_dx + dx * (0.5 * d2u_dx2 + dx * (d3u_dx3 / 6.0)))
                + dy * (du_dy + dy * (0.5 * d2u_dy2 + dy * (d3u_dy3 / 6.0)))
                + dx * dy * d2u_dxdy
                + 0.5 * dx * dx * dy * d3u_dx2dy
                + 0.5 * dx * dy * dy * d3u_dxdy2;
            let err = (estimate - p.z) * z_scale;
            sum += err;
            sum_sq += err * err;
            n_checked += 1;
        }

        let mut curvature = 0.0;
        for i in 0..ws.layout.n_columns {
            for j in 0..ws.layout.n_rows {
                let idx = ws.layout.index(i, j);
                let c = u(idx, 6) + u(idx, 5) + u(idx, 2) + u(idx, 9) - 4.0 * grid.near(idx, 0);
                curvature += c * c;
            }
        }

        let (mean_error, rms_error) = if n_checked > 0 {
            let n = n_checked as f64;
            (sum / n, (sum_sq / n).sqrt())
        } else {
            (0.0, 0.0)
        };
        let stats = Self {
            n_points: ws.points.len(),
            n_nodes: ws.layout.n_columns * ws.layout.n_rows,
            n_checked,
            mean_error,
            rms_error,
            curvature,
        };
        info!(
            "fit: {} data, {} nodes, mean error {:.6e}, rms error {:.6e}, curvature {:.6e}",
            stats.n_points, stats.n_nodes, stats.mean_error, stats.rms_error, stats.curvature
        );
        stats
    }
}
