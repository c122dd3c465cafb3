use surface_gridder::solver::{guess_surface_time, GridSchedule};
use surface_gridder::{suggest_dimensions, Region};
use std::env;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

/// `grid_sizes <n_columns> <n_rows>` or
/// `grid_sizes <x_min> <x_max> <y_min> <y_max> <x_inc> [<y_inc>]`.
fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().skip(1).collect();
    let numbers = args
        .iter()
        .map(|a| a.parse::<f64>().map_err(|e| format!("Bad argument '{a}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;

    let (n_columns, n_rows, region_inc) = match numbers.as_slice() {
        &[nc, nr] => (nc as usize, nr as usize, None),
        &[x_min, x_max, y_min, y_max, x_inc] | &[x_min, x_max, y_min, y_max, x_inc, _]
            if x_inc > 0.0 =>
        {
            let y_inc = numbers.get(5).copied().unwrap_or(x_inc);
            if y_inc <= 0.0 {
                return Err(usage());
            }
            let region = Region::new(x_min, x_max, y_min, y_max);
            let nc = (region.width() / x_inc).round() as usize + 1;
            let nr = (region.height() / y_inc).round() as usize + 1;
            (nc, nr, Some((region, [x_inc, y_inc])))
        }
        _ => return Err(usage()),
    };
    if n_columns < 4 || n_rows < 4 {
        return Err(format!("Need at least 4 nodes per axis, got {n_columns}x{n_rows}"));
    }

    let (nx, ny) = (n_columns - 1, n_rows - 1);
    let schedule = GridSchedule::new(n_columns, n_rows);
    println!(
        "Requested {n_columns}x{n_rows} nodes: spacings={:?} relative_cost={:.0}",
        schedule.spacings(),
        guess_surface_time(nx, ny)
    );

    let suggestions = suggest_dimensions(nx, ny);
    if suggestions.is_empty() {
        println!("No faster size found within a factor of two");
        return Ok(());
    }
    println!("\nFaster sizes (intervals):");
    for s in &suggestions {
        match &region_inc {
            Some((region, inc)) => {
                let grown = s.expanded_region(region, *inc, (nx, ny));
                println!(
                    "  {:>5} x {:<5} speedup={:>6.2}  region={}/{}/{}/{}",
                    s.x_intervals,
                    s.y_intervals,
                    s.speedup,
                    grown.x_min,
                    grown.x_max,
                    grown.y_min,
                    grown.y_max
                );
            }
            None => println!(
                "  {:>5} x {:<5} speedup={:>6.2}",
                s.x_intervals, s.y_intervals, s.speedup
            ),
        }
    }
    Ok(())
}

fn usage() -> String {
    "Usage: grid_sizes <n_columns> <n_rows> | grid_sizes <x_min> <x_max> <y_min> <y_max> <x_inc> [<y_inc>]"
        .to_string()
}
