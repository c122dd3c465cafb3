//! The multigrid driver.
//!
//! Stages
//! - Input: build the lattice, collect samples and breakline samples at the
//!   final spacing, resolve the limit surfaces and drop all but the nearest
//!   sample per final node.
//! - Detrend: remove the least-squares plane and divide by the RMS. Planar
//!   data stop here and the plane is emitted as is.
//! - Coarsest level: bin, optionally seed from a search radius, classify and
//!   relax with the data.
//! - Each finer level: bilinear forecast, relax the new nodes only (`I`),
//!   reclassify, relax with the data (`D`).
//! - Output: fit statistics, restore the trend, clamp to the limits and emit
//!   in scanline order.
use std::time::Instant;

use log::{debug, info};

use super::boundary::BoundaryConditions;
use super::classify::NearestPointClassifier;
use super::coefficients::StencilCoefficients;
use super::forecast::{fill_in_forecast, seed_from_radius};
use super::params::SurfaceParams;
use super::relax::{free_nodes, IterationMode, IterationRecord, Relaxation};
use super::schedule::GridSchedule;
use super::workspace::Workspace;
use crate::bounds::{BoundGrids, WorkingBounds};
use crate::diagnostics::{
    elapsed_ms, FitStatistics, LatticeDescriptor, SolveReport, SolveTrace, TimingBreakdown,
};
use crate::error::{SurfaceError, SurfaceResult};
use crate::grid::{GridLayout, LevelGeometry};
use crate::preprocess::{densify, discard_unusable, PlaneTrend, PointCollector, ZScale};
use crate::types::{Lattice, SurfaceGrid, SurfaceInput};

/// Continuous-curvature gridding in tension.
///
/// ```no_run
/// use surface_gridder::{Region, SurfaceInput, SurfaceParams, SurfaceSolver};
///
/// # fn example(samples: &[[f64; 3]]) -> Result<(), surface_gridder::SurfaceError> {
/// let solver = SurfaceSolver::new(SurfaceParams::default())?;
/// let input = SurfaceInput::new(Region::new(0.0, 10.0, 0.0, 10.0), [0.5, 0.5], samples);
/// let grid = solver.solve(&input)?;
/// println!("{} x {} nodes", grid.n_columns, grid.n_rows);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct SurfaceSolver {
    params: SurfaceParams,
}

impl SurfaceSolver {
    /// Validate `params` and build a solver.
    pub fn new(params: SurfaceParams) -> SurfaceResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &SurfaceParams {
        &self.params
    }

    /// Grid `input` and return the surface.
    pub fn solve(&self, input: &SurfaceInput<'_>) -> SurfaceResult<SurfaceGrid> {
        self.solve_with_report(input).map(|report| report.grid)
    }

    /// Grid `input` and return the surface with a trace of every stage.
    pub fn solve_with_report(&self, input: &SurfaceInput<'_>) -> SurfaceResult<SolveReport> {
        let total_start = Instant::now();
        let params = &self.params;
        let mut timings = TimingBreakdown::default();

        let lattice = Lattice::new(input.region, input.increments, input.registration)?;
        if lattice.n_columns < 4 || lattice.n_rows < 4 {
            return Err(SurfaceError::GridTooSmall {
                n_columns: lattice.n_columns,
                n_rows: lattice.n_rows,
            });
        }
        if params.periodic && !input.region.spans_360() {
            return Err(SurfaceError::invalid(
                "periodic",
                format!("x range {} does not span 360 degrees", input.region.width()),
            ));
        }
        let epsilon = params.aspect_ratio.resolve(&input.region);
        if !(epsilon > 0.0 && epsilon.is_finite()) {
            return Err(SurfaceError::invalid(
                "aspect_ratio",
                format!("resolved to {epsilon} for this region"),
            ));
        }
        info!(
            "gridding {} x {} nodes over {}/{}/{}/{} ({:?} registration)",
            lattice.n_columns,
            lattice.n_rows,
            input.region.x_min,
            input.region.x_max,
            input.region.y_min,
            input.region.y_max,
            lattice.registration
        );
        let schedule = GridSchedule::new(lattice.n_columns, lattice.n_rows);
        let layout = GridLayout::from_lattice(&lattice);
        let final_level = LevelGeometry::new(&layout, lattice.inc, 1);

        let stage = Instant::now();
        let mut collector = PointCollector::new(&lattice, final_level, params.periodic);
        collector.extend_samples(input.points);
        if !input.breaklines.is_empty() {
            collector.extend_breakline_samples(&densify(input.breaklines, lattice.inc));
        }
        let (mut points, mut summary) = collector.finish();
        if points.is_empty() {
            return Err(SurfaceError::NoData);
        }
        let bound_grids = BoundGrids::resolve(
            &params.lower,
            &params.upper,
            lattice.output_dims(),
            (summary.z_min, summary.z_max),
        )?;
        let discarded = discard_unusable(&mut points, &lattice.region, &final_level);
        summary.n_discarded_duplicates = discarded;
        timings.lap("input", stage);

        let stage = Instant::now();
        let plane = PlaneTrend::fit(&points, &lattice, params.periodic);
        plane.remove(&mut points, &lattice);
        debug!("plane: c0 {:.6e} c1 {:.6e} c2 {:.6e}", plane.c0, plane.c1, plane.c2);
        let scale = ZScale::measure(&points);
        timings.lap("detrend", stage);

        let descriptor = LatticeDescriptor {
            n_columns: lattice.n_columns,
            n_rows: lattice.n_rows,
            solved_region: lattice.region,
            increments: lattice.inc,
            registration: lattice.registration,
            periodic: params.periodic,
            aspect_ratio: epsilon,
        };

        let Some(scale) = scale else {
            let stage = Instant::now();
            let grid = emit(&lattice, &bound_grids, params.periodic, |i, j| {
                plane.evaluate(i as f64, j as f64)
            });
            timings.lap("output", stage);
            timings.total_ms = elapsed_ms(total_start);
            return Ok(SolveReport {
                grid,
                trace: SolveTrace {
                    lattice: descriptor,
                    input: summary,
                    discarded_unusable: discarded,
                    plane,
                    z_scale: ZScale::unit().rms(),
                    convergence_limit: 0.0,
                    planar: true,
                    mutually_prime: schedule.is_relatively_prime(),
                    spacings: Vec::new(),
                    levels: Vec::new(),
                    total_iterations: 0,
                    seeded_with_mean: 0,
                    fit: None,
                    timings,
                },
            });
        };

        let rms = scale.rms();
        scale.rescale(&mut points);
        let limit = params.convergence.resolve(rms);
        debug!("z scale {rms:.6e}, convergence limit {limit:.6e}");
        let working_bounds = if bound_grids.is_active() {
            bound_grids.to_working(&lattice, &layout, &plane, &scale)
        } else {
            WorkingBounds::open()
        };
        let coefficients = StencilCoefficients::new(params.tension.interior, epsilon);
        let boundary =
            BoundaryConditions::new(params.tension.boundary, epsilon, &coefficients, params.periodic);
        let relax = Relaxation {
            coefficients: &coefficients,
            boundary: &boundary,
            bounds: &working_bounds,
            relax_new: params.over_relaxation,
            z_scale: rms,
        };
        let nearest = LevelClassifier {
            coefficients: &coefficients,
            trend_gradient: [plane.c1 / rms, plane.c2 / rms],
            bounds: &working_bounds,
        };

        let stage = Instant::now();
        let mut ws = Workspace::new(&lattice, points, schedule.coarsest());
        ws.rebin();
        let mut seeded_with_mean = 0;
        if params.search_radius > 0.0 {
            let mean = ws.points.iter().map(|p| p.z).sum::<f64>() / ws.points.len() as f64;
            seeded_with_mean = seed_from_radius(&mut ws, params.search_radius, mean);
        }
        debug!("grid  mode  iteration  max change  limit  total");

        let mut levels: Vec<IterationRecord> = Vec::with_capacity(2 * schedule.spacings().len());
        let mut total_iterations = 0u64;
        nearest.classify(&mut ws);
        levels.push(relax.iterate(
            &mut ws,
            IterationMode::Data,
            limit,
            params.max_iterations,
            &mut total_iterations,
        ));

        for pair in schedule.spacings().windows(2) {
            let (old_grid, new_grid) = (pair[0], pair[1]);
            ws.set_spacing(new_grid);
            ws.rebin();
            fill_in_forecast(&mut ws.grid, &ws.layout, old_grid, new_grid);
            debug!("grid {new_grid}: {} nodes free after forecast", free_nodes(&ws));
            levels.push(relax.iterate(
                &mut ws,
                IterationMode::Interpolate,
                limit,
                params.max_iterations,
                &mut total_iterations,
            ));
            nearest.classify(&mut ws);
            levels.push(relax.iterate(
                &mut ws,
                IterationMode::Data,
                limit,
                params.max_iterations,
                &mut total_iterations,
            ));
        }
        timings.lap("relax", stage);
        let unconverged = levels.iter().filter(|r| !r.converged()).count();
        if unconverged > 0 {
            info!("{unconverged} relaxation passes stopped at the iteration cap");
        }

        let stage = Instant::now();
        let fit = FitStatistics::measure(&mut ws, &boundary, rms);
        let grid = emit(&lattice, &bound_grids, params.periodic, |i, j| {
            scale.restore(f64::from(ws.grid.get(i, j))) + plane.evaluate(i as f64, j as f64)
        });
        timings.lap("output", stage);
        timings.total_ms = elapsed_ms(total_start);
        info!(
            "solved in {total_iterations} sweeps over {} levels ({:.1} ms)",
            schedule.spacings().len(),
            timings.total_ms
        );

        Ok(SolveReport {
            grid,
            trace: SolveTrace {
                lattice: descriptor,
                input: summary,
                discarded_unusable: discarded,
                plane,
                z_scale: rms,
                convergence_limit: limit,
                planar: false,
                mutually_prime: schedule.is_relatively_prime(),
                spacings: schedule.spacings().to_vec(),
                levels,
                total_iterations,
                seeded_with_mean,
                fit: Some(fit),
                timings,
            },
        })
    }
}

/// Level-independent inputs of the nearest-point classification.
struct LevelClassifier<'a> {
    coefficients: &'a StencilCoefficients,
    trend_gradient: [f64; 2],
    bounds: &'a WorkingBounds,
}

impl LevelClassifier<'_> {
    fn classify(&self, ws: &mut Workspace) {
        let classifier = NearestPointClassifier {
            layout: &ws.layout,
            level: &ws.level,
            region: &ws.region,
            coefficients: self.coefficients,
            trend_gradient: self.trend_gradient,
            bounds: self.bounds,
        };
        ws.briggs = classifier.classify(&mut ws.grid, &ws.points);
    }
}

/// Lay out node values in scanline order, clamp to the limits and tie the
/// periodic edges together.
fn emit(
    lattice: &Lattice,
    bounds: &BoundGrids,
    periodic: bool,
    value: impl Fn(usize, usize) -> f64,
) -> SurfaceGrid {
    let (n_columns, n_rows) = lattice.output_dims();
    let mut values = vec![0.0f32; n_columns * n_rows];
    for row in 0..n_rows {
        let j = n_rows - 1 - row;
        for i in 0..n_columns {
            let k = row * n_columns + i;
            values[k] = bounds.clamp_output(k, value(i, j) as f32);
        }
    }
    if periodic {
        for row in values.chunks_exact_mut(n_columns) {
            let mean = 0.5 * (row[0] + row[n_columns - 1]);
            row[0] = mean;
            row[n_columns - 1] = mean;
        }
    }
    SurfaceGrid {
        n_columns,
        n_rows,
        region: lattice.requested,
        increments: lattice.inc,
        registration: lattice.registration,
        values,
    }
}
