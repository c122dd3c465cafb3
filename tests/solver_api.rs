mod common;

use common::synthetic_data::{on_nodes, scattered};
use surface_gridder::solver::IterationMode;
use surface_gridder::{
    BoundSide, BoundSpec, Breakline, Region, Registration, SurfaceError, SurfaceInput,
    SurfaceParams, SurfaceSolver,
};

fn default_solver() -> SurfaceSolver {
    SurfaceSolver::new(SurfaceParams::default()).expect("default parameters are valid")
}

fn bumpy(x: f64, y: f64) -> f64 {
    (x / 9.0).sin() + (y / 6.0).cos() + 0.01 * x
}

#[test]
fn every_level_divides_both_interval_counts() {
    let region = Region::new(0.0, 100.0, 0.0, 60.0);
    let samples = scattered(200, &region, bumpy);
    let input = SurfaceInput::new(region, [1.0, 1.0], &samples);
    let report = default_solver().solve_with_report(&input).expect("solve");
    let trace = &report.trace;

    assert_eq!(trace.spacings, vec![20, 4, 2, 1]);
    assert!(!trace.mutually_prime);
    for &g in &trace.spacings {
        assert_eq!(100 % g, 0);
        assert_eq!(60 % g, 0);
    }

    // one data pass on the coarsest level, then an I/D pair per finer level
    assert_eq!(trace.levels.len(), 2 * trace.spacings.len() - 1);
    assert_eq!(trace.levels[0].mode, IterationMode::Data);
    for pair in trace.levels[1..].chunks(2) {
        assert_eq!(pair[0].mode, IterationMode::Interpolate);
        assert_eq!(pair[1].mode, IterationMode::Data);
        assert_eq!(pair[0].grid, pair[1].grid);
    }
    let swept: usize = trace.levels.iter().map(|r| r.iterations).sum();
    assert_eq!(trace.total_iterations, swept as u64);
    assert_eq!(trace.levels.last().map(|r| r.total_iterations), Some(trace.total_iterations));
    for rec in &trace.levels {
        assert!(rec.iterations <= 500 * rec.grid);
        assert!(rec.converged() || rec.iterations == 500 * rec.grid);
    }
}

#[test]
fn mutually_prime_dimensions_still_solve() {
    let region = Region::new(0.0, 9.0, 0.0, 11.0);
    let samples = scattered(40, &region, bumpy);
    let input = SurfaceInput::new(region, [1.0, 1.0], &samples);
    let report = default_solver().solve_with_report(&input).expect("solve");
    assert!(report.trace.mutually_prime);
    assert_eq!(report.trace.spacings, vec![1]);
    assert_eq!(report.trace.levels.len(), 1);
    assert!(report.grid.values.iter().all(|v| v.is_finite()));
}

#[test]
fn output_is_scanline_north_first() {
    let region = Region::new(0.0, 6.0, 0.0, 4.0);
    let samples = on_nodes(&[(0, 0), (6, 0), (0, 4), (6, 4), (3, 2)], 0.0, 0.0, 1.0, |x, y| {
        x + 10.0 * y
    });
    let input = SurfaceInput::new(region, [1.0, 1.0], &samples);
    let grid = default_solver().solve(&input).expect("solve");

    assert_eq!((grid.n_columns, grid.n_rows), (7, 5));
    assert_eq!(grid.values.len(), 35);
    // the south-west sample is the first value of the last row
    assert!((grid.get(0, 4) - 0.0).abs() < 1e-4);
    assert!((grid.get(0, 0) - 40.0).abs() < 1e-4);
    assert!((grid.get(6, 0) - 46.0).abs() < 1e-4);
    assert_eq!(grid.get(3, 2), grid.value_at_node(3, 2));
}

#[test]
fn pixel_registration_drops_the_extra_row_and_column() {
    let region = Region::new(0.0, 10.0, 0.0, 8.0);
    let nodes = [(0, 0), (9, 0), (0, 7), (9, 7), (4, 3), (6, 5), (2, 6)];
    let samples = on_nodes(&nodes, 0.5, 0.5, 1.0, bumpy);
    let input = SurfaceInput::new(region, [1.0, 1.0], &samples).with_registration(Registration::Pixel);
    let report = default_solver().solve_with_report(&input).expect("solve");
    let grid = &report.grid;

    assert_eq!((grid.n_columns, grid.n_rows), (10, 8));
    assert_eq!(grid.region, region);
    assert_eq!(grid.registration, Registration::Pixel);
    assert_eq!((report.trace.lattice.n_columns, report.trace.lattice.n_rows), (11, 9));
    for (&(i, j), s) in nodes.iter().zip(&samples) {
        assert_eq!(grid.node_coordinates(i, j), (s[0], s[1]));
        assert!((f64::from(grid.value_at_node(i, j)) - s[2]).abs() < 1e-4, "({i}, {j})");
    }
}

#[test]
fn breaklines_pin_the_nodes_they_cross() {
    let region = Region::new(0.0, 16.0, 0.0, 16.0);
    let samples = scattered(30, &region, |_, y| if y < 8.0 { 0.0 } else { 1.0 });
    let ridge = [Breakline::new(vec![[0.0, 8.0, 5.0], [16.0, 8.0, 5.0]])];
    let input = SurfaceInput::new(region, [1.0, 1.0], &samples).with_breaklines(&ridge);
    let report = default_solver().solve_with_report(&input).expect("solve");

    assert_eq!(report.trace.input.n_breakline_samples, 17);
    for i in 0..17 {
        assert!((report.grid.value_at_node(i, 8) - 5.0).abs() < 1e-3, "column {i}");
    }
}

#[test]
fn periodic_edges_are_identical() {
    let region = Region::new(0.0, 360.0, -60.0, 60.0);
    let samples = scattered(40, &region, |x, y| x.to_radians().cos() + y / 60.0);
    let params = SurfaceParams {
        periodic: true,
        ..Default::default()
    };
    let input = SurfaceInput::new(region, [30.0, 30.0], &samples);
    let report = SurfaceSolver::new(params)
        .expect("valid")
        .solve_with_report(&input)
        .expect("solve");
    let grid = &report.grid;

    assert_eq!((grid.n_columns, grid.n_rows), (13, 5));
    assert_eq!(report.trace.plane.c1, 0.0);
    for row in 0..grid.n_rows {
        assert_eq!(grid.get(0, row), grid.get(12, row), "row {row}");
    }
}

#[test]
fn seeding_reports_empty_coarse_nodes() {
    let region = Region::new(0.0, 40.0, 0.0, 40.0);
    // all samples in the south-west quarter
    let quarter = Region::new(0.0, 12.0, 0.0, 12.0);
    let samples = scattered(60, &quarter, bumpy);
    let params = SurfaceParams {
        search_radius: 10.0,
        ..Default::default()
    };
    let input = SurfaceInput::new(region, [1.0, 1.0], &samples);
    let report = SurfaceSolver::new(params)
        .expect("valid")
        .solve_with_report(&input)
        .expect("solve");
    assert!(report.trace.seeded_with_mean > 0);
    assert!(report.grid.values.iter().all(|v| v.is_finite()));
}

#[test]
fn report_serialises_to_json() {
    let region = Region::new(0.0, 20.0, 0.0, 20.0);
    let samples = scattered(80, &region, bumpy);
    let input = SurfaceInput::new(region, [1.0, 1.0], &samples);
    let report = default_solver().solve_with_report(&input).expect("solve");

    let value = serde_json::to_value(&report).expect("serialise");
    assert_eq!(value["grid"]["nColumns"], 21);
    assert_eq!(value["grid"]["values"].as_array().map(Vec::len), Some(441));
    assert_eq!(value["trace"]["planar"], false);
    assert_eq!(
        value["trace"]["levels"].as_array().map(Vec::len),
        Some(report.trace.levels.len())
    );
    assert!(value["trace"]["fit"]["rmsError"].is_number());
    assert!(value["trace"]["timings"]["totalMs"].is_number());
}

#[test]
fn solve_and_report_agree() {
    let region = Region::new(0.0, 12.0, 0.0, 12.0);
    let samples = scattered(40, &region, bumpy);
    let input = SurfaceInput::new(region, [1.0, 1.0], &samples);
    let solver = default_solver();
    let grid = solver.solve(&input).expect("solve");
    let report = solver.solve_with_report(&input).expect("solve");
    assert_eq!(grid, report.grid);
}

#[test]
fn too_small_grid_is_rejected() {
    let samples = [[0.5, 0.5, 1.0]];
    let input = SurfaceInput::new(Region::new(0.0, 2.0, 0.0, 5.0), [1.0, 1.0], &samples);
    let err = default_solver().solve(&input).expect_err("3 columns");
    assert!(matches!(
        err,
        SurfaceError::GridTooSmall {
            n_columns: 3,
            n_rows: 6
        }
    ));
}

#[test]
fn no_usable_data_is_rejected() {
    let region = Region::new(0.0, 10.0, 0.0, 10.0);
    let outside = [[50.0, 50.0, 1.0], [-20.0, 3.0, 2.0]];
    let err = default_solver()
        .solve(&SurfaceInput::new(region, [1.0, 1.0], &outside))
        .expect_err("all outside");
    assert!(matches!(err, SurfaceError::NoData));

    let missing = [[1.0, 1.0, f64::NAN], [2.0, 2.0, f64::NAN]];
    let err = default_solver()
        .solve(&SurfaceInput::new(region, [1.0, 1.0], &missing))
        .expect_err("all NaN");
    assert!(matches!(err, SurfaceError::NoData));
}

#[test]
fn mis_sized_limit_grid_is_rejected() {
    let region = Region::new(0.0, 10.0, 0.0, 10.0);
    let samples = scattered(20, &region, bumpy);
    let params = SurfaceParams {
        upper: BoundSpec::Grid(vec![5.0; 120]),
        ..Default::default()
    };
    let err = SurfaceSolver::new(params)
        .expect("valid")
        .solve(&SurfaceInput::new(region, [1.0, 1.0], &samples))
        .expect_err("shape mismatch");
    assert!(matches!(
        err,
        SurfaceError::BoundGridShape {
            side: BoundSide::Upper,
            expected: 121,
            found: 120
        }
    ));
}

#[test]
fn invalid_parameters_are_rejected_up_front() {
    let err = SurfaceSolver::new(SurfaceParams {
        over_relaxation: 2.5,
        ..Default::default()
    })
    .expect_err("over-relaxation out of range");
    assert!(matches!(
        err,
        SurfaceError::InvalidParameter {
            name: "over_relaxation",
            ..
        }
    ));

    let err = SurfaceSolver::new(SurfaceParams {
        max_iterations: 0,
        ..Default::default()
    })
    .expect_err("no iterations");
    assert!(matches!(err, SurfaceError::InvalidParameter { name: "max_iterations", .. }));
}

#[test]
fn crossed_limits_are_rejected() {
    let err = SurfaceSolver::new(SurfaceParams {
        lower: BoundSpec::Value(5.0),
        upper: BoundSpec::Value(1.0),
        ..Default::default()
    })
    .expect_err("lower above upper");
    assert!(matches!(err, SurfaceError::InvalidParameter { name: "bounds", .. }));
}

#[test]
fn periodic_needs_a_full_turn() {
    let region = Region::new(0.0, 180.0, 0.0, 90.0);
    let samples = scattered(20, &region, bumpy);
    let err = SurfaceSolver::new(SurfaceParams {
        periodic: true,
        ..Default::default()
    })
    .expect("valid")
    .solve(&SurfaceInput::new(region, [10.0, 10.0], &samples))
    .expect_err("half a turn");
    assert!(matches!(err, SurfaceError::InvalidParameter { name: "periodic", .. }));
}

#[test]
fn increment_must_divide_the_region() {
    let samples = [[1.0, 1.0, 1.0]];
    let err = default_solver()
        .solve(&SurfaceInput::new(Region::new(0.0, 10.0, 0.0, 10.0), [3.0, 1.0], &samples))
        .expect_err("10 / 3");
    assert!(matches!(err, SurfaceError::InvalidRegion(_)));
}
