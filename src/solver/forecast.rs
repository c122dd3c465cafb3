//! Starting values for a level: Gaussian seeding of the coarsest lattice and
//! the bilinear forecast that carries a solution down to a finer spacing.
use log::{debug, warn};

use crate::grid::{GridLayout, NodeStatus, PaddedGrid};

use super::workspace::Workspace;

/// Seed every coarse node with a Gaussian-weighted mean (`exp(-4.5 r²/R²)`)
/// of the samples in cells within `radius`. Nodes with no sample in range
/// get `fallback`. Returns how many nodes fell back.
///
/// Samples must be binned at the current level.
pub(crate) fn seed_from_radius(ws: &mut Workspace, radius: f64, fallback: f64) -> usize {
    let level = ws.level;
    let irad = (radius / level.grid_xinc).ceil() as usize;
    let jrad = (radius / level.grid_yinc).ceil() as usize;
    let rfact = -4.5 / (radius * radius);
    let mut empty = 0;

    for bi in 0..level.block_nx {
        let x0 = ws.region.x_min + bi as f64 * level.grid_xinc;
        let imin = bi.saturating_sub(irad);
        let imax = (bi + irad).min(level.block_nx - 1);
        for bj in 0..level.block_ny {
            let y0 = ws.region.y_min + bj as f64 * level.grid_yinc;
            let jmin = bj.saturating_sub(jrad);
            let jmax = (bj + jrad).min(level.block_ny - 1);

            let mut sum_w = 0.0;
            let mut sum_zw = 0.0;
            for ki in imin..=imax {
                let first = level.cell(ki, jmin);
                let last = level.cell(ki, jmax);
                let start = ws.points.partition_point(|p| p.cell < first);
                for p in ws.points[start..].iter().take_while(|p| p.cell <= last) {
                    let r2 = (p.x - x0).powi(2) + (p.y - y0).powi(2);
                    let w = (rfact * r2).exp();
                    sum_w += w;
                    sum_zw += w * p.z;
                }
            }

            let value = if sum_w == 0.0 {
                debug!("no data inside search radius at {x0} {y0}");
                empty += 1;
                fallback
            } else {
                sum_zw / sum_w
            };
            ws.grid.put(level.node_index(&ws.layout, bi, bj), value as f32);
        }
    }
    if empty > 0 {
        warn!("{empty} coarse nodes had no data inside the search radius {radius}; seeded with the mean");
    }
    empty
}

/// Fill the nodes that appear when the spacing drops from `old_grid` to
/// `new_grid` by bilinear interpolation of the coarse solution.
///
/// New nodes become unconstrained and the old coarse nodes constrained, so
/// the following interpolation pass relaxes only the new ones.
pub(crate) fn fill_in_forecast(grid: &mut PaddedGrid, layout: &GridLayout, old_grid: usize, new_grid: usize) {
    let old_size = 1.0 / old_grid as f64;
    let my = layout.my;
    let sw = layout.sw_corner();

    for i in (0..layout.n_columns - 1).step_by(old_grid) {
        for j in (0..layout.n_rows - 1).step_by(old_grid) {
            let index_0 = sw + i * my + j;
            let index_1 = index_0 + old_grid * my;
            let index_2 = index_1 + old_grid;
            let index_3 = index_0 + old_grid;

            let a0 = f64::from(grid.at(index_0));
            let a1 = f64::from(grid.at(index_1)) - a0;
            let a2 = f64::from(grid.at(index_3)) - a0;
            let a3 = f64::from(grid.at(index_2)) - a0 - a1 - a2;

            for ii in (i..i + old_grid).step_by(new_grid) {
                let delta_x = (ii - i) as f64 * old_size;
                let along_south = a0 + a1 * delta_x;
                let along_north = a2 + a3 * delta_x;
                for jj in (j..j + old_grid).step_by(new_grid) {
                    let index_new = sw + ii * my + jj;
                    if index_new == index_0 {
                        continue;
                    }
                    let delta_y = (jj - j) as f64 * old_size;
                    grid.put(index_new, (along_south + delta_y * along_north) as f32);
                    grid.set_status(index_new, NodeStatus::Unconstrained);
                }
            }
            grid.set_status(index_0, NodeStatus::Constrained);
        }
    }

    let se = layout.se_corner();
    for j in (0..layout.n_rows - 1).step_by(old_grid) {
        let index_0 = se + j;
        let index_3 = index_0 + old_grid;
        let base = grid.at(index_0);
        let rise = f64::from(grid.at(index_3) - base);
        for jj in (j..j + old_grid).step_by(new_grid) {
            let delta_y = (jj - j) as f64 * old_size;
            grid.put(se + jj, base + (delta_y * rise) as f32);
            grid.set_status(se + jj, NodeStatus::Unconstrained);
        }
        grid.set_status(index_0, NodeStatus::Constrained);
    }

    let nw = layout.nw_corner();
    for i in (0..layout.n_columns - 1).step_by(old_grid) {
        let index_0 = nw + i * my;
        let index_1 = index_0 + old_grid * my;
        let base = grid.at(index_0);
        let rise = f64::from(grid.at(index_1) - base);
        for ii in (i..i + old_grid).step_by(new_grid) {
            let delta_x = (ii - i) as f64 * old_size;
            grid.put(nw + ii * my, base + (delta_x * rise) as f32);
            grid.set_status(nw + ii * my, NodeStatus::Unconstrained);
        }
        grid.set_status(index_0, NodeStatus::Constrained);
    }

    grid.set_status(layout.ne_corner(), NodeStatus::Constrained);
}
