//! I/O helpers for the demo tools.
//!
//! - `read_xyz_table`: whitespace- or comma-separated `x y z` records.
//! - `read_breaklines`: the same records split into polylines by `>` lines.
//! - `write_json_file`: pretty-print a serializable value to disk.
//! - `save_grid_preview`: min/max-stretched grayscale PNG of a grid.
use crate::types::{Breakline, SurfaceGrid};
use image::{GrayImage, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Read `x y z` samples from a text file. Blank lines and lines starting
/// with `#` are skipped; columns beyond the third are ignored.
pub fn read_xyz_table(path: &Path) -> Result<Vec<[f64; 3]>, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    parse_xyz(&text).map_err(|e| format!("{}: {e}", path.display()))
}

/// Parse `x y z` records from `text`.
pub fn parse_xyz(text: &str) -> Result<Vec<[f64; 3]>, String> {
    let mut out = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('>') {
            continue;
        }
        out.push(parse_record(line, line_no + 1)?);
    }
    Ok(out)
}

/// Read polylines separated by `>` header lines.
pub fn read_breaklines(path: &Path) -> Result<Vec<Breakline>, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    parse_breaklines(&text).map_err(|e| format!("{}: {e}", path.display()))
}

/// Parse polylines from `text`; every `>` line starts a new one.
pub fn parse_breaklines(text: &str) -> Result<Vec<Breakline>, String> {
    let mut lines = Vec::new();
    let mut current = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.starts_with('>') {
            if !current.is_empty() {
                lines.push(Breakline::new(std::mem::take(&mut current)));
            }
            continue;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        current.push(parse_record(line, line_no + 1)?);
    }
    if !current.is_empty() {
        lines.push(Breakline::new(current));
    }
    Ok(lines)
}

fn parse_record(line: &str, line_no: usize) -> Result<[f64; 3], String> {
    let mut fields = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|f| !f.is_empty());
    let mut record = [0.0; 3];
    for (slot, name) in record.iter_mut().zip(["x", "y", "z"]) {
        let field = fields
            .next()
            .ok_or_else(|| format!("line {line_no}: missing {name} column"))?;
        *slot = if field.eq_ignore_ascii_case("nan") {
            f64::NAN
        } else {
            field
                .parse()
                .map_err(|e| format!("line {line_no}: bad {name} value '{field}': {e}"))?
        };
    }
    Ok(record)
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

/// Write the grid as an 8-bit grayscale PNG, north up, stretched between
/// its minimum (black) and maximum (white). NaN nodes are black.
pub fn save_grid_preview(grid: &SurfaceGrid, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let (lo, hi) = grid.min_max().unwrap_or((0.0, 0.0));
    let span = if hi > lo { hi - lo } else { 1.0 };
    let mut out = GrayImage::new(grid.n_columns as u32, grid.n_rows as u32);
    for row in 0..grid.n_rows {
        for col in 0..grid.n_columns {
            let v = grid.get(col, row);
            let level = if v.is_nan() {
                0.0
            } else {
                ((v - lo) / span * 255.0).clamp(0.0, 255.0)
            };
            out.put_pixel(col as u32, row as u32, Luma([level as u8]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
