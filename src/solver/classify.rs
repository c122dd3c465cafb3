//! Binning samples into coarse cells and classifying the nodes they touch.
//!
//! After [`bin_points`] the samples are ordered by cell and, within a cell,
//! by distance to the cell's node. [`NearestPointClassifier`] walks that
//! order once: the first sample of each cell either pins the node
//! (`Constrained`) or contributes Briggs coefficients for one of the four
//! quadrants. The coefficient list comes out in ascending cell order, which
//! is the order the relaxation sweep visits quadrant nodes.
use crate::bounds::WorkingBounds;
use crate::grid::{GridLayout, LevelGeometry, NodeStatus, PaddedGrid};
use crate::types::{DataPoint, Region, OUTSIDE};

use super::coefficients::StencilCoefficients;

/// Normalised offset under which a sample is treated as sitting on its node.
pub const CLOSENESS: f64 = 0.05;

/// Stencil neighbours that carry the Briggs terms, per quadrant. Row 0 is unused.
pub const QUADRANT_STENCIL: [[usize; 4]; 5] = [
    [0, 0, 0, 0],
    [10, 9, 5, 1],
    [8, 9, 6, 3],
    [1, 2, 6, 10],
    [3, 2, 5, 8],
];

/// Correction weights tying one off-lattice sample to its nearest node.
///
/// `b[0..4]` weight the quadrant neighbours, `b[4]` is the reciprocal of the
/// central weight and `b[5]` the sample's own contribution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BriggsCoefficients {
    pub b: [f64; 6],
}

impl BriggsCoefficients {
    /// Coefficients for absolute normalised offsets `(dx, dy)` and data value `z`.
    pub fn new(dx: f64, dy: f64, z: f64, coeffs: &StencilCoefficients) -> Self {
        let dxpdy = dx + dy;
        let xys = 1.0 + dxpdy;
        let btemp = 2.0 * coeffs.one_plus_e2 / (dxpdy * xys);
        let e2 = coeffs.briggs_e2;
        let b0 = 1.0 - 0.5 * (dx + dx * dx) * btemp;
        let b3 = 0.5 * (e2 - (dy + dy * dy) * btemp);
        let b1 = (e2 * xys - 4.0 * dy) / xys;
        let b2 = 2.0 * (dy - dx + 1.0) / xys;
        let b4 = 1.0 / (coeffs.a0_const_1 + coeffs.a0_const_2 * (b0 + b1 + b2 + b3 + btemp));
        Self {
            b: [b0, b1, b2, b3, b4, btemp * z],
        }
    }
}

/// Assign every point its cell at `level`, order by `(cell, distance to the
/// cell's node)` and drop the points that fall off the coarse lattice.
/// Returns how many were dropped.
pub fn bin_points(points: &mut Vec<DataPoint>, region: &Region, level: &LevelGeometry) -> usize {
    for p in points.iter_mut() {
        let i = ((p.x - region.x_min) / level.grid_xinc + 0.5).floor();
        let j = ((p.y - region.y_min) / level.grid_yinc + 0.5).floor();
        p.cell = if i < 0.0 || j < 0.0 || i as usize >= level.block_nx || j as usize >= level.block_ny {
            OUTSIDE
        } else {
            level.cell(i as usize, j as usize)
        };
    }
    let dist2 = |p: &DataPoint| -> f64 {
        if p.is_outside() {
            return 0.0;
        }
        let (bi, bj) = level.block_of(p.cell);
        let dx = p.x - (region.x_min + bi as f64 * level.grid_xinc);
        let dy = p.y - (region.y_min + bj as f64 * level.grid_yinc);
        dx * dx + dy * dy
    };
    points.sort_by(|a, b| a.cell.cmp(&b.cell).then_with(|| dist2(a).total_cmp(&dist2(b))));
    let kept = points.partition_point(|p| !p.is_outside());
    let dropped = points.len() - kept;
    points.truncate(kept);
    dropped
}

/// Per-level context for the nearest-point classification.
pub struct NearestPointClassifier<'a> {
    pub layout: &'a GridLayout,
    pub level: &'a LevelGeometry,
    pub region: &'a Region,
    pub coefficients: &'a StencilCoefficients,
    /// Plane gradient per final node, in working units.
    pub trend_gradient: [f64; 2],
    pub bounds: &'a WorkingBounds,
}

impl NearestPointClassifier<'_> {
    /// Reset the coarse nodes, pin or tag the ones with nearby data and
    /// return the Briggs coefficients of the tagged nodes in sweep order.
    ///
    /// `points` must come from [`bin_points`] at the same level.
    pub fn classify(&self, grid: &mut PaddedGrid, points: &[DataPoint]) -> Vec<BriggsCoefficients> {
        let level = self.level;
        for bi in 0..level.block_nx {
            for bj in 0..level.block_ny {
                grid.set_status(level.node_index(self.layout, bi, bj), NodeStatus::Unconstrained);
            }
        }

        let mut briggs = Vec::with_capacity(points.len());
        let mut last_cell = OUTSIDE;
        for p in points {
            if p.cell == last_cell || p.is_outside() {
                continue;
            }
            last_cell = p.cell;
            let (bi, bj) = level.block_of(p.cell);
            let idx = level.node_index(self.layout, bi, bj);
            let dx = (p.x - (self.region.x_min + bi as f64 * level.grid_xinc)) / level.grid_xinc;
            let dy = (p.y - (self.region.y_min + bj as f64 * level.grid_yinc)) / level.grid_yinc;

            if dx.abs() < CLOSENESS && dy.abs() < CLOSENESS {
                let step = level.grid as f64;
                let shift = step * (self.trend_gradient[0] * dx + self.trend_gradient[1] * dy);
                let z = self.bounds.clamp(idx, p.z + shift);
                grid.set_status(idx, NodeStatus::Constrained);
                grid.put(idx, z as f32);
            } else {
                grid.set_status(idx, NodeStatus::from_offset(dx, dy));
                briggs.push(BriggsCoefficients::new(dx.abs(), dy.abs(), p.z, self.coefficients));
            }
        }
        briggs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        layout: GridLayout,
        level: LevelGeometry,
        region: Region,
        coefficients: StencilCoefficients,
        bounds: WorkingBounds,
    }

    impl Fixture {
        fn new(grid: usize) -> Self {
            let layout = GridLayout::new(9, 9);
            Self {
                layout,
                level: LevelGeometry::new(&layout, [1.0, 1.0], grid),
                region: Region::new(0.0, 8.0, 0.0, 8.0),
                coefficients: StencilCoefficients::new(0.0, 1.0),
                bounds: WorkingBounds::open(),
            }
        }

        fn classifier(&self) -> NearestPointClassifier<'_> {
            NearestPointClassifier {
                layout: &self.layout,
                level: &self.level,
                region: &self.region,
                coefficients: &self.coefficients,
                trend_gradient: [0.0, 0.0],
                bounds: &self.bounds,
            }
        }
    }

    fn sample_points() -> Vec<DataPoint> {
        vec![
            DataPoint::new(2.02, 3.99, 1.5),
            DataPoint::new(4.6, 4.3, -0.5),
            DataPoint::new(4.1, 3.9, 2.0),
            DataPoint::new(7.2, 0.4, 0.25),
            DataPoint::new(12.0, 4.0, 9.0),
            DataPoint::new(0.7, 6.6, 1.0),
        ]
    }

    #[test]
    fn binning_orders_by_cell_then_distance() {
        let fx = Fixture::new(2);
        let mut points = sample_points();
        let dropped = bin_points(&mut points, &fx.region, &fx.level);
        assert_eq!(dropped, 1);
        assert!(points.windows(2).all(|w| w[0].cell <= w[1].cell));
        let same_cell: Vec<f64> = points
            .iter()
            .filter(|p| p.cell == fx.level.cell(2, 2))
            .map(|p| p.z)
            .collect();
        assert_eq!(same_cell, vec![2.0, -0.5]);
    }

    #[test]
    fn classification_pins_close_points_and_tags_quadrants() {
        let fx = Fixture::new(2);
        let mut points = sample_points();
        bin_points(&mut points, &fx.region, &fx.level);
        let mut grid = PaddedGrid::new(fx.layout);
        let briggs = fx.classifier().classify(&mut grid, &points);

        let pinned = fx.layout.index(2, 4);
        assert_eq!(grid.status(pinned), NodeStatus::Constrained);
        assert_eq!(grid.at(pinned), 1.5);
        // (4.1, 3.9) is nearest to node (4, 4) and sits south-east of it
        assert_eq!(grid.status(fx.layout.index(4, 4)), NodeStatus::Quadrant4);
        // (7.2, 0.4) sits north-west of node (8, 0)
        assert_eq!(grid.status(fx.layout.index(8, 0)), NodeStatus::Quadrant2);
        assert_eq!(grid.status(fx.layout.index(0, 6)), NodeStatus::Quadrant1);
        assert_eq!(briggs.len(), 3);
    }

    #[test]
    fn classification_is_idempotent() {
        let fx = Fixture::new(2);
        let mut points = sample_points();
        bin_points(&mut points, &fx.region, &fx.level);
        let mut first = PaddedGrid::new(fx.layout);
        let briggs_first = fx.classifier().classify(&mut first, &points);

        let mut again = points.clone();
        bin_points(&mut again, &fx.region, &fx.level);
        assert_eq!(again, points);
        let mut second = first.clone();
        let briggs_second = fx.classifier().classify(&mut second, &again);

        assert_eq!(briggs_first, briggs_second);
        for bi in 0..fx.level.block_nx {
            for bj in 0..fx.level.block_ny {
                let idx = fx.level.node_index(&fx.layout, bi, bj);
                assert_eq!(first.status(idx), second.status(idx));
                assert_eq!(first.at(idx), second.at(idx));
            }
        }
    }

    #[test]
    fn pinned_value_respects_lower_bound() {
        let mut fx = Fixture::new(1);
        let mut low = vec![f32::NAN; fx.layout.len()];
        low[fx.layout.index(2, 4)] = 3.0;
        fx.bounds = WorkingBounds::from_parts(Some(low), None);
        let mut points = vec![DataPoint::new(2.0, 4.0, 1.0)];
        bin_points(&mut points, &fx.region, &fx.level);
        let mut grid = PaddedGrid::new(fx.layout);
        fx.classifier().classify(&mut grid, &points);
        assert_eq!(grid.get(2, 4), 3.0);
    }
}
