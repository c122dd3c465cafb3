//! Ghost-node synthesis for the two-node border.
//!
//! Must run before every relaxation sweep: the stencil of a node within two
//! coarse steps of an edge reads border slots, and those depend on the
//! current edge values.
//!
//! Order of updates, each using only values written before it:
//! 1. first ring south/north from `(1-T) d²u/dn² + T du/dn = 0`;
//! 2. first ring west/east, natural or periodic;
//! 3. the four outer corners from `d²u/dxdy = 0`;
//! 4. second ring south/north from `d(∇²u)/dn = 0`;
//! 5. second ring west/east, natural or periodic.
use crate::grid::{edge_case, GridLayout, LevelGeometry, OffsetTable, PaddedGrid};

use super::coefficients::StencilCoefficients;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryConditions {
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
    eps_p2: f64,
    eps_m2: f64,
    two_plus_ep2: f64,
    two_plus_em2: f64,
    periodic: bool,
}

impl BoundaryConditions {
    /// Conditions for boundary tension `tension` and aspect ratio `epsilon`.
    pub fn new(tension: f64, epsilon: f64, coeffs: &StencilCoefficients, periodic: bool) -> Self {
        let loose = 1.0 - tension;
        let y_denom = 2.0 * epsilon * loose + tension;
        Self {
            x0: 4.0 * loose / (2.0 - tension),
            x1: (3.0 * tension - 2.0) / (2.0 - tension),
            y0: 4.0 * epsilon * loose / y_denom,
            y1: (tension - 2.0 * epsilon * loose) / y_denom,
            eps_p2: coeffs.eps_p2,
            eps_m2: coeffs.eps_m2,
            two_plus_ep2: coeffs.two_plus_ep2,
            two_plus_em2: coeffs.two_plus_em2,
            periodic,
        }
    }

    pub fn is_periodic(&self) -> bool {
        self.periodic
    }

    /// Rewrite the border around the nodes of the current level.
    pub fn apply(
        &self,
        grid: &mut PaddedGrid,
        layout: &GridLayout,
        level: &LevelGeometry,
        offsets: &OffsetTable,
    ) {
        let g = level.grid as isize;
        let my = layout.my as isize;
        let east = level.grid_east as isize;
        let sw = layout.sw_corner();
        let se = layout.se_corner();
        let nw = layout.nw_corner();
        let ne = layout.ne_corner();

        for bi in 0..level.block_nx {
            let col = bi * level.grid * layout.my;
            let s = sw + col;
            grid.put_near(s, -1, self.y0 * grid.near(s, 0) + self.y1 * grid.near(s, g));
            let n = nw + col;
            grid.put_near(n, 1, self.y0 * grid.near(n, 0) + self.y1 * grid.near(n, -g));
        }

        let west_case = offsets.case(0);
        let east_case = offsets.case(20);
        for bj in 0..level.block_ny {
            let row = bj * level.grid;
            let w = sw + row;
            let e = se + row;
            if self.periodic {
                grid.put_near(w, west_case[5], grid.near(e, east_case[5]));
                grid.put_near(e, east_case[6], grid.near(w, west_case[6]));
                let mean = 0.5 * (grid.near(w, 0) + grid.near(e, 0));
                grid.put_near(w, 0, mean);
                grid.put_near(e, 0, mean);
            } else {
                grid.put_near(w, -my, self.x1 * grid.near(w, east) + self.x0 * grid.near(w, 0));
                grid.put_near(e, my, self.x1 * grid.near(e, -east) + self.x0 * grid.near(e, 0));
            }
        }

        let v = grid.near(sw, east - 1) + grid.near(sw, -my + g) - grid.near(sw, east + g);
        grid.put_near(sw, -my - 1, v);
        let v = grid.near(nw, east + 1) + grid.near(nw, -my - g) - grid.near(nw, east - g);
        grid.put_near(nw, -my + 1, v);
        let v = grid.near(se, -east - 1) + grid.near(se, my + g) - grid.near(se, -east + g);
        grid.put_near(se, my - 1, v);
        let v = grid.near(ne, -east + 1) + grid.near(ne, my - g) - grid.near(ne, -east - g);
        grid.put_near(ne, my + 1, v);

        for bi in 0..level.block_nx {
            let x_case = edge_case(bi, level.block_nx - 1 - bi);
            let col = bi * level.grid * layout.my;

            let s = sw + col;
            let o = offsets.case(x_case * 5);
            let v = grid.near(s, o[0])
                + self.eps_m2 * (grid.near(s, o[1]) + grid.near(s, o[3]) - grid.near(s, o[8]) - grid.near(s, o[10]))
                + self.two_plus_em2 * (grid.near(s, o[9]) - grid.near(s, o[2]));
            grid.put_near(s, o[11], v);

            let n = nw + col;
            let o = offsets.case(x_case * 5 + 4);
            let v = grid.near(n, o[11])
                - self.eps_m2 * (grid.near(n, o[1]) + grid.near(n, o[3]) - grid.near(n, o[8]) - grid.near(n, o[10]))
                - self.two_plus_em2 * (grid.near(n, o[9]) - grid.near(n, o[2]));
            grid.put_near(n, o[0], v);
        }

        for bj in 0..level.block_ny {
            let y_case = edge_case(bj, level.block_ny - 1 - bj);
            let row = bj * level.grid;
            let w = sw + row;
            let e = se + row;
            let ow = offsets.case(y_case);
            let oe = offsets.case(20 + y_case);
            if self.periodic {
                grid.put_near(w, ow[4], grid.near(e, oe[4]));
                grid.put_near(e, oe[7], grid.near(w, ow[7]));
            } else {
                let v = grid.near(w, ow[7])
                    + self.eps_p2 * (grid.near(w, ow[3]) + grid.near(w, ow[10]) - grid.near(w, ow[1]) - grid.near(w, ow[8]))
                    + self.two_plus_ep2 * (grid.near(w, ow[5]) - grid.near(w, ow[6]));
                grid.put_near(w, ow[4], v);
                let v = grid.near(e, oe[4])
                    - self.eps_p2 * (grid.near(e, oe[3]) + grid.near(e, oe[10]) - grid.near(e, oe[1]) - grid.near(e, oe[8]))
                    - self.two_plus_ep2 * (grid.near(e, oe[5]) - grid.near(e, oe[6]));
                grid.put_near(e, oe[7], v);
            }
        }
    }
}
