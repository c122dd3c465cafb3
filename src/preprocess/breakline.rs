use crate::types::Breakline;

/// Resample every breakline at roughly one grid increment.
///
/// Each segment is split into `round(max(|dx|/inc_x, |dy|/inc_y)) + 1`
/// evenly spaced samples with linearly interpolated z; shared vertices are
/// emitted once. Lines with a single vertex contribute that vertex.
pub fn densify(lines: &[Breakline], inc: [f64; 2]) -> Vec<[f64; 3]> {
    let mut out = Vec::new();
    for line in lines {
        let vertices = &line.vertices;
        match vertices.len() {
            0 => continue,
            1 => {
                out.push(vertices[0]);
                continue;
            }
            _ => {}
        }
        for pair in vertices.windows(2) {
            let [x0, y0, z0] = pair[0];
            let [x1, y1, z1] = pair[1];
            let (dx, dy, dz) = (x1 - x0, y1 - y0, z1 - z0);
            let n_int = ((dx.abs() / inc[0]).max(dy.abs() / inc[1]).round() as usize + 1).max(2);
            let steps = (n_int - 1) as f64;
            out.reserve(n_int - 1);
            for n in 0..n_int - 1 {
                let t = n as f64 / steps;
                out.push([x0 + t * dx, y0 + t * dy, z0 + t * dz]);
            }
        }
        if let Some(last) = vertices.last() {
            out.push(*last);
        }
    }
    out
}
