use surface_gridder::config::surface;
use surface_gridder::io::{read_breaklines, read_xyz_table, save_grid_preview, write_json_file};
use surface_gridder::{SolveReport, SurfaceInput, SurfaceSolver};
use std::env;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = surface::load_config(Path::new(&config_path))?;

    let samples = read_xyz_table(&config.input_path)?;
    let breaklines = match &config.breaklines_path {
        Some(path) => read_breaklines(path)?,
        None => Vec::new(),
    };

    let solver = SurfaceSolver::new(config.params.clone()).map_err(|e| e.to_string())?;
    let input = SurfaceInput::new(config.region, config.increments, &samples)
        .with_registration(config.registration)
        .with_breaklines(&breaklines);
    let report = solver.solve_with_report(&input).map_err(|e| e.to_string())?;

    print_text_summary(&report);

    if let Some(path) = &config.output.json_out {
        write_json_file(path, &report.grid)?;
        println!("\nGrid written to {}", path.display());
    }
    if let Some(path) = &config.output.report_out {
        write_json_file(path, &report)?;
        println!("Report written to {}", path.display());
    }
    if let Some(path) = &config.output.preview_png {
        save_grid_preview(&report.grid, path)?;
        println!("Preview written to {}", path.display());
    }
    Ok(())
}

fn print_text_summary(report: &SolveReport) {
    let grid = &report.grid;
    let trace = &report.trace;
    println!("Surface summary");
    println!(
        "  nodes: {}x{} ({:?} registration)",
        grid.n_columns, grid.n_rows, grid.registration
    );
    match grid.min_max() {
        Some((lo, hi)) => println!("  z range: [{lo:.6}, {hi:.6}]"),
        None => println!("  z range: empty"),
    }
    let input = &trace.input;
    println!(
        "  input: raw={} accepted={} rejected={} breakline_samples={} discarded={}",
        input.n_raw,
        input.n_accepted,
        input.n_rejected,
        input.n_breakline_samples,
        trace.discarded_unusable
    );
    println!(
        "  plane: c0={:.6e} c1={:.6e} c2={:.6e}",
        trace.plane.c0, trace.plane.c1, trace.plane.c2
    );

    if trace.planar {
        println!("\nData lie on a plane; emitted the trend without relaxation");
    } else {
        println!(
            "\nRelaxation: spacings={:?} limit={:.3e} total_sweeps={}",
            trace.spacings, trace.convergence_limit, trace.total_iterations
        );
        if trace.mutually_prime {
            println!("  dimensions are mutually prime; only the final spacing ran");
        }
        for rec in &trace.levels {
            println!(
                "  grid={:<4} {} iterations={:<6} max_change={:.3e}{}",
                rec.grid,
                rec.mode.letter(),
                rec.iterations,
                rec.max_change,
                if rec.converged() { "" } else { "  (cap reached)" }
            );
        }
    }

    if let Some(fit) = &trace.fit {
        println!(
            "\nFit: checked={}/{} mean_error={:.3e} rms_error={:.3e} curvature={:.3e}",
            fit.n_checked, fit.n_points, fit.mean_error, fit.rms_error, fit.curvature
        );
    }

    let stage = |label: &str| {
        trace
            .timings
            .stage_ms(label)
            .map(|ms| format!("{ms:.3}"))
            .unwrap_or_else(|| "-".to_string())
    };
    println!(
        "\nTimings (ms): input={} detrend={} relax={} output={} total={:.3}",
        stage("input"),
        stage("detrend"),
        stage("relax"),
        stage("output"),
        trace.timings.total_ms
    );
}

fn usage() -> String {
    "Usage: surface_demo <config.json>".to_string()
}
