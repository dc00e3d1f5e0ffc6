use crate::error::TrajError;

/// Parses a line of whitespace-separated values into a vector of a specific type.
///
/// This generic helper function takes a string slice, splits it by whitespace,
/// and attempts to parse each substring into the target type `T`. The type `T`
/// must implement `std::str::FromStr`.
///
/// # Arguments
///
/// * `line` - A string slice representing a single line of data.
/// * `n` - The exact number of values expected on the line.
///
/// # Errors
///
/// * `TrajError::InvalidVectorLength` if the number of parsed values is not equal to `n`.
/// * Propagates any error from the `parse()` method of the target type `T`.
///
/// # Example
///
/// ```
/// use readtrj_core::parser::parse_line_of_n;
/// let line = "10.5 20.0 30.5";
/// let values: Vec<f64> = parse_line_of_n(line, 3).unwrap();
/// assert_eq!(values, vec![10.5, 20.0, 30.5]);
///
/// let result = parse_line_of_n::<i32>(line, 2);
/// assert!(result.is_err());
/// ```
pub fn parse_line_of_n<T: std::str::FromStr>(line: &str, n: usize) -> Result<Vec<T>, TrajError>
where
    TrajError: From<<T as std::str::FromStr>::Err>,
{
    let values: Vec<T> = line
        .split_whitespace()
        .map(|s| s.parse::<T>())
        .collect::<Result<_, _>>()?;

    if values.len() == n {
        Ok(values)
    } else {
        Err(TrajError::InvalidVectorLength {
            expected: n,
            found: values.len(),
        })
    }
}

/// Fast-path variant of [`parse_line_of_n`] for `f64` atom-data lines.
///
/// Atom lines dominate parsing time for large dumps, so this variant uses
/// `fast-float2` instead of the standard library float parser.
pub fn parse_line_of_n_f64(line: &str, n: usize) -> Result<Vec<f64>, TrajError> {
    let values: Vec<f64> = line
        .split_whitespace()
        .map(fast_float2::parse::<f64, _>)
        .collect::<Result<_, _>>()?;

    if values.len() == n {
        Ok(values)
    } else {
        Err(TrajError::InvalidVectorLength {
            expected: n,
            found: values.len(),
        })
    }
}

/// Parses all whitespace-separated floats on a line, whatever their count.
pub fn parse_floats(line: &str) -> Result<Vec<f64>, TrajError> {
    line.split_whitespace()
        .map(|s| fast_float2::parse::<f64, _>(s).map_err(TrajError::from))
        .collect()
}

/// A recognized `ITEM:` header line of a LAMMPS dump file.
#[derive(Debug, PartialEq)]
pub enum Item<'a> {
    Timestep,
    NumberOfAtoms,
    /// The remainder of the line: tilt-factor flags and/or boundary styles
    /// (e.g. `xy xz yz pp pp pp`). The cell shape is decided by the bounds
    /// rows themselves, so readers may ignore this.
    BoxBounds(&'a str),
    /// The whitespace-separated column names of the atom-data lines.
    Atoms(&'a str),
}

/// Recognizes one `ITEM:` header line, returning `None` for anything else.
///
/// # Example
///
/// ```
/// use readtrj_core::parser::{parse_item_line, Item};
/// assert_eq!(parse_item_line("ITEM: TIMESTEP"), Some(Item::Timestep));
/// assert_eq!(
///     parse_item_line("ITEM: ATOMS id type x y z"),
///     Some(Item::Atoms("id type x y z"))
/// );
/// assert_eq!(parse_item_line("81000"), None);
/// ```
pub fn parse_item_line(line: &str) -> Option<Item<'_>> {
    let rest = line.strip_prefix("ITEM:")?.trim_start();
    if rest.starts_with("TIMESTEP") {
        Some(Item::Timestep)
    } else if rest.starts_with("NUMBER OF ATOMS") {
        Some(Item::NumberOfAtoms)
    } else if let Some(flags) = rest.strip_prefix("BOX BOUNDS") {
        Some(Item::BoxBounds(flags.trim()))
    } else if let Some(cols) = rest.strip_prefix("ATOMS") {
        Some(Item::Atoms(cols.trim()))
    } else {
        None
    }
}

/// Which columns of an atom-data line carry the identifier, coordinates, and
/// (optionally) velocities, plus whether coordinates are scaled-fractional.
///
/// Detected once per trajectory from the first frame's `ITEM: ATOMS` column
/// list and fixed for the reader's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnLayout {
    /// Column index of the atom identifier.
    pub id: usize,
    /// Column indices of the chosen coordinate triple.
    pub coords: [usize; 3],
    /// Whether the chosen triple is scaled-fractional (`xs ys zs`) and must
    /// be post-multiplied by the cell's diagonal extents.
    pub scaled: bool,
    /// Column indices of `vx vy vz` when present.
    pub velocities: Option<[usize; 3]>,
}

impl ColumnLayout {
    /// Detects the column layout from an `ITEM: ATOMS` column-name list.
    ///
    /// Coordinate triples are chosen by priority: unwrapped `xu yu zu`, then
    /// wrapped `x y z`, then scaled `xs ys zs`. An `id` column together with
    /// one complete triple is mandatory.
    ///
    /// # Example
    ///
    /// ```
    /// use readtrj_core::parser::ColumnLayout;
    /// let cols: Vec<String> = ["id", "type", "x", "y", "z", "vx", "vy", "vz"]
    ///     .iter().map(|s| s.to_string()).collect();
    /// let layout = ColumnLayout::detect(&cols).unwrap();
    /// assert_eq!(layout.id, 0);
    /// assert_eq!(layout.coords, [2, 3, 4]);
    /// assert!(!layout.scaled);
    /// assert_eq!(layout.velocities, Some([5, 6, 7]));
    /// ```
    pub fn detect(columns: &[String]) -> Result<Self, TrajError> {
        let find = |name: &str| columns.iter().position(|c| c == name);
        let find_triple = |names: [&str; 3]| -> Option<[usize; 3]> {
            Some([find(names[0])?, find(names[1])?, find(names[2])?])
        };

        let id = find("id");
        let (coords, scaled) = if let Some(triple) = find_triple(["xu", "yu", "zu"]) {
            (Some(triple), false)
        } else if let Some(triple) = find_triple(["x", "y", "z"]) {
            (Some(triple), false)
        } else if let Some(triple) = find_triple(["xs", "ys", "zs"]) {
            (Some(triple), true)
        } else {
            (None, false)
        };

        let (Some(id), Some(coords)) = (id, coords) else {
            return Err(TrajError::Format(
                "dump file must contain at least atom-id, x, y, and z coordinates to be useful"
                    .to_string(),
            ));
        };

        Ok(ColumnLayout {
            id,
            coords,
            scaled,
            velocities: find_triple(["vx", "vy", "vz"]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_line_of_n_success() {
        let line = "1.0 2.5 -3.0";
        let values = parse_line_of_n::<f64>(line, 3).unwrap();
        assert_eq!(values, vec![1.0, 2.5, -3.0]);
    }

    #[test]
    fn test_parse_line_of_n_too_short() {
        let result = parse_line_of_n::<f64>("1.0 2.5", 3);
        assert!(matches!(
            result.unwrap_err(),
            TrajError::InvalidVectorLength {
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_parse_line_of_n_invalid_float() {
        let result = parse_line_of_n::<f64>("1.0 abc -3.0", 3);
        assert!(matches!(
            result.unwrap_err(),
            TrajError::InvalidNumberFormat(_)
        ));
    }

    #[test]
    fn test_parse_line_of_n_f64_matches_generic() {
        let line = "247 1 3.69544 2.56202 3.27701 0.00433856 -0.00099307 -0.00486166";
        let fast = parse_line_of_n_f64(line, 8).unwrap();
        let std = parse_line_of_n::<f64>(line, 8).unwrap();
        assert_eq!(fast, std);
    }

    #[test]
    fn test_parse_line_of_n_f64_wrong_count() {
        let result = parse_line_of_n_f64("1.0 2.0 3.0", 5);
        assert!(matches!(
            result.unwrap_err(),
            TrajError::InvalidVectorLength {
                expected: 5,
                found: 3
            }
        ));
    }

    #[test]
    fn test_parse_floats_any_count() {
        assert_eq!(parse_floats("0.0 10.0").unwrap(), vec![0.0, 10.0]);
        assert_eq!(parse_floats("0.0 10.0 1.5").unwrap(), vec![0.0, 10.0, 1.5]);
        assert!(parse_floats("0.0 ten").is_err());
    }

    #[test]
    fn test_item_line_recognition() {
        assert_eq!(parse_item_line("ITEM: TIMESTEP"), Some(Item::Timestep));
        assert_eq!(
            parse_item_line("ITEM: NUMBER OF ATOMS"),
            Some(Item::NumberOfAtoms)
        );
        assert_eq!(
            parse_item_line("ITEM: BOX BOUNDS pp pp pp"),
            Some(Item::BoxBounds("pp pp pp"))
        );
        assert_eq!(
            parse_item_line("ITEM: BOX BOUNDS xy xz yz pp pp pp"),
            Some(Item::BoxBounds("xy xz yz pp pp pp"))
        );
        assert_eq!(
            parse_item_line("ITEM: ATOMS id type x y z"),
            Some(Item::Atoms("id type x y z"))
        );
        assert_eq!(parse_item_line("ITEM: ENERGY"), None);
        assert_eq!(parse_item_line("1536"), None);
    }

    #[test]
    fn test_layout_prefers_unwrapped_coordinates() {
        let layout =
            ColumnLayout::detect(&cols(&["id", "x", "y", "z", "xu", "yu", "zu"])).unwrap();
        assert_eq!(layout.coords, [4, 5, 6]);
        assert!(!layout.scaled);
    }

    #[test]
    fn test_layout_wrapped_over_scaled() {
        let layout =
            ColumnLayout::detect(&cols(&["id", "xs", "ys", "zs", "x", "y", "z"])).unwrap();
        assert_eq!(layout.coords, [4, 5, 6]);
        assert!(!layout.scaled);
    }

    #[test]
    fn test_layout_scaled_fallback() {
        let layout = ColumnLayout::detect(&cols(&["id", "type", "xs", "ys", "zs"])).unwrap();
        assert_eq!(layout.coords, [2, 3, 4]);
        assert!(layout.scaled);
        assert_eq!(layout.velocities, None);
    }

    #[test]
    fn test_layout_requires_id() {
        let result = ColumnLayout::detect(&cols(&["type", "x", "y", "z"]));
        assert!(matches!(result.unwrap_err(), TrajError::Format(_)));
    }

    #[test]
    fn test_layout_requires_full_triple() {
        let result = ColumnLayout::detect(&cols(&["id", "x", "y"]));
        assert!(matches!(result.unwrap_err(), TrajError::Format(_)));

        // A partial scaled triple must not satisfy the wrapped lookup.
        let result = ColumnLayout::detect(&cols(&["id", "xs", "ys", "z"]));
        assert!(matches!(result.unwrap_err(), TrajError::Format(_)));
    }

    #[test]
    fn test_layout_reordered_columns() {
        let layout = ColumnLayout::detect(&cols(&["z", "y", "x", "type", "id"])).unwrap();
        assert_eq!(layout.id, 4);
        assert_eq!(layout.coords, [2, 1, 0]);
    }
}
