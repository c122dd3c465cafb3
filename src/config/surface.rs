use crate::types::{Region, Registration};
use crate::SurfaceParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OutputConfig {
    /// The emitted grid as JSON.
    pub json_out: Option<PathBuf>,
    /// The full solve report (grid and trace) as JSON.
    pub report_out: Option<PathBuf>,
    /// Grayscale PNG preview of the grid.
    pub preview_png: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SurfaceToolConfig {
    /// Text table of `x y z` samples.
    pub input_path: PathBuf,
    /// Polylines separated by `>` lines, added as extra samples.
    #[serde(default)]
    pub breaklines_path: Option<PathBuf>,
    pub region: Region,
    pub increments: [f64; 2],
    #[serde(default)]
    pub registration: Registration,
    #[serde(default)]
    pub params: SurfaceParams,
    #[serde(default)]
    pub output: OutputConfig,
}

pub fn load_config(path: &Path) -> Result<SurfaceToolConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    parse_config(&contents).map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

fn parse_config(contents: &str) -> Result<SurfaceToolConfig, serde_json::Error> {
    serde_json::from_str(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::BoundSpec;
    use crate::solver::{AspectRatio, ConvergenceLimit};

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = parse_config(
            r#"{
                "input_path": "data/samples.xyz",
                "region": { "xMin": 0.0, "xMax": 10.0, "yMin": -5.0, "yMax": 5.0 },
                "increments": [0.5, 0.5]
            }"#,
        )
        .expect("parse");
        assert_eq!(cfg.registration, Registration::Node);
        assert_eq!(cfg.params, SurfaceParams::default());
        assert!(cfg.breaklines_path.is_none());
        assert!(cfg.output.json_out.is_none());
    }

    #[test]
    fn full_config_round_trips_params() {
        let cfg = parse_config(
            r#"{
                "input_path": "in.xyz",
                "breaklines_path": "ridges.txt",
                "region": { "xMin": 0.0, "xMax": 360.0, "yMin": -60.0, "yMax": 60.0 },
                "increments": [2.0, 2.0],
                "registration": "pixel",
                "params": {
                    "aspect_ratio": "mid_latitude",
                    "convergence": { "relative": 0.001 },
                    "max_iterations": 250,
                    "tension": { "interior": 0.35 },
                    "lower": "data_extreme",
                    "upper": { "value": 1200.0 },
                    "periodic": true
                },
                "output": { "json_out": "out/grid.json", "preview_png": "out/grid.png" }
            }"#,
        )
        .expect("parse");
        assert_eq!(cfg.registration, Registration::Pixel);
        assert_eq!(cfg.params.aspect_ratio, AspectRatio::MidLatitude);
        assert_eq!(cfg.params.convergence, ConvergenceLimit::Relative(0.001));
        assert_eq!(cfg.params.max_iterations, 250);
        assert_eq!(cfg.params.tension.interior, 0.35);
        assert_eq!(cfg.params.tension.boundary, 0.0);
        assert_eq!(cfg.params.lower, BoundSpec::DataExtreme);
        assert_eq!(cfg.params.upper, BoundSpec::Value(1200.0));
        assert!(cfg.params.periodic);
        assert_eq!(cfg.output.preview_png, Some(PathBuf::from("out/grid.png")));
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let err = load_config(Path::new("/nonexistent/surface.json")).expect_err("missing");
        assert!(err.starts_with("Failed to read config /nonexistent/surface.json"), "{err}");
    }
}
