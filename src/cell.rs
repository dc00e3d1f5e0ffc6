//! Simulation-cell construction from the two encodings trajectory formats
//! use: per-axis bounding rows (LAMMPS `BOX BOUNDS`) and lengths-plus-angles
//! (molfile timesteps).

use crate::error::TrajError;

/// Builds a cell matrix from three `BOX BOUNDS` rows.
///
/// Each row carries `lo hi` for one axis, optionally followed by a tilt
/// factor. Two numbers per row produce an orthogonal cell with `hi - lo` on
/// the diagonal; three numbers per row additionally place the tilt factors
/// at `(1,0) = xy`, `(2,0) = xz`, and `(2,1) = yz`. Any other row width, or
/// rows of mixed widths, is an error.
pub fn cell_from_bounds(rows: &[Vec<f64>; 3]) -> Result<[[f64; 3]; 3], TrajError> {
    let width = rows[0].len();
    if !(width == 2 || width == 3) || rows.iter().any(|r| r.len() != width) {
        return Err(TrajError::Format(
            "box bounds rows must carry 2 numbers (lo hi) or 3 (lo hi tilt)".to_string(),
        ));
    }

    let mut cell = [[0.0; 3]; 3];
    for (axis, row) in rows.iter().enumerate() {
        cell[axis][axis] = row[1] - row[0];
    }
    if width == 3 {
        cell[1][0] = rows[0][2]; // xy
        cell[2][0] = rows[1][2]; // xz
        cell[2][1] = rows[2][2]; // yz
    }
    Ok(cell)
}

/// Builds a cell matrix from three edge lengths and three angles in degrees.
///
/// This is the construction molfile plugins report timestep geometry in:
/// the first vector lies along x with length `a`, the second uses gamma,
/// the third uses alpha and beta.
pub fn cell_from_lengths_angles(
    a: f64,
    b: f64,
    c: f64,
    alpha: f64,
    beta: f64,
    gamma: f64,
) -> [[f64; 3]; 3] {
    let deg2rad = std::f64::consts::PI / 180.0;
    [
        [a, 0.0, 0.0],
        [b * (deg2rad * gamma).cos(), b, 0.0],
        [c * (deg2rad * beta).cos(), c * (deg2rad * alpha).cos(), c],
    ]
}
