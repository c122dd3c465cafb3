use crate::grid::LevelGeometry;
use crate::solver::classify::bin_points;
use crate::types::{DataPoint, Region};
use log::warn;

/// Keep only the sample nearest to each final-resolution node.
///
/// Points are binned at `level` (spacing 1), sorted by node and distance,
/// and every later sample sharing a node is dropped. Returns the number of
/// discarded samples.
pub fn discard_unusable(points: &mut Vec<DataPoint>, region: &Region, level: &LevelGeometry) -> usize {
    let before = points.len();
    bin_points(points, region, level);
    points.dedup_by_key(|p| p.cell);
    let discarded = before - points.len();
    if discarded > 0 {
        warn!(
            "{discarded} unusable points were supplied and will be ignored; \
             pre-process the data with a block mean, median or mode"
        );
    }
    discarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridLayout;

    #[test]
    fn nearest_sample_survives() {
        let region = Region::new(0.0, 3.0, 0.0, 3.0);
        let level = LevelGeometry::new(&GridLayout::new(4, 4), [1.0, 1.0], 1);
        let mut points = vec![
            DataPoint::new(1.3, 1.0, 10.0),
            DataPoint::new(2.0, 2.0, 5.0),
            DataPoint::new(0.9, 1.1, 20.0),
            DataPoint::new(1.0, 0.6, 30.0),
        ];
        let discarded = discard_unusable(&mut points, &region, &level);
        assert_eq!(discarded, 2);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].z, 20.0);
        assert_eq!(points[1].z, 5.0);
    }
}
