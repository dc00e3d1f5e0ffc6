//! Streaming reader for LAMMPS text dump files (`.lammpstrj`).
//!
//! Frames are parsed one at a time from any [`BufRead`] source; nothing
//! beyond the current frame is held in memory. The first frame fixes the
//! reader-wide invariants: atom count, column layout, velocity presence,
//! the canonical atom order, and (for scaled-fractional dumps) the box
//! extents that fractional coordinates are multiplied by. Canonical order is the sorted-identifier
//! order of the first frame; later frames scatter each atom directly at
//! `id - 1`, which assumes the identifier set is `1..=N`. Dumps of a
//! sub-group with gaps in their identifiers are caught by the id range
//! check rather than silently misplaced.

use crate::cell::cell_from_bounds;
use crate::error::TrajError;
use crate::parser::{parse_floats, parse_item_line, parse_line_of_n_f64, ColumnLayout, Item};
use crate::reader::TrajectoryReader;
use crate::types::{Frame, ReaderConfig};
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Fresh,
    Active,
    Exhausted,
    Failed,
    Closed,
}

/// Header of one dump frame, in raw (unconverted) units.
struct RawHeader {
    step: i64,
    natoms: usize,
    cell: [[f64; 3]; 3],
    columns: Vec<String>,
}

/// Reader for LAMMPS trajectory dumps.
///
/// ```
/// use std::io::Cursor;
/// use readtrj_core::lammpstrj::LammpstrjReader;
/// use readtrj_core::reader::TrajectoryReader;
/// use readtrj_core::types::ReaderConfig;
///
/// let dump = "\
/// ITEM: TIMESTEP
/// 0
/// ITEM: NUMBER OF ATOMS
/// 1
/// ITEM: BOX BOUNDS pp pp pp
/// 0.0 10.0
/// 0.0 10.0
/// 0.0 10.0
/// ITEM: ATOMS id x y z
/// 1 5.0 0.0 0.0
/// ";
/// let mut reader = LammpstrjReader::new(Cursor::new(dump.as_bytes()), ReaderConfig::default());
/// let frame = reader.next_frame().unwrap().unwrap();
/// assert_eq!(frame.natoms, 1);
/// assert!((frame.positions[0][0] - 0.5).abs() < 1e-12); // Angstrom -> nm
/// assert!(reader.next_frame().unwrap().is_none());
/// ```
pub struct LammpstrjReader<R: BufRead> {
    source: Option<R>,
    line: String,
    state: State,
    x_factor: f64,
    t_factor: f64,
    v_factor: f64,
    index: usize,
    natoms: usize,
    columns: Vec<String>,
    layout: Option<ColumnLayout>,
    pos_scale: [f64; 3],
    frame: Frame,
}

fn next_line<'a, R: BufRead>(
    src: &mut R,
    buf: &'a mut String,
) -> Result<Option<&'a str>, TrajError> {
    buf.clear();
    if src.read_line(buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim_end_matches(['\r', '\n'])))
}

/// Writes one parsed atom row into the frame buffers at its canonical slot.
fn scatter_row(
    frame: &mut Frame,
    layout: ColumnLayout,
    row: &[f64],
    dest: usize,
    pos_scale: [f64; 3],
    v_factor: f64,
) {
    for (k, &col) in layout.coords.iter().enumerate() {
        frame.positions[dest][k] = row[col] * pos_scale[k];
    }
    if let (Some(vcols), Some(velocities)) = (layout.velocities, frame.velocities.as_mut()) {
        for (k, &col) in vcols.iter().enumerate() {
            velocities[dest][k] = row[col] * v_factor;
        }
    }
}

impl LammpstrjReader<Box<dyn BufRead>> {
    /// Opens a dump file, transparently decompressing `.gz` and `.bz2`
    /// variants based on the filename suffix.
    pub fn open(path: impl AsRef<Path>, config: ReaderConfig) -> Result<Self, TrajError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let source: Box<dyn BufRead> = match path.extension().and_then(|e| e.to_str()) {
            Some("gz") => Box::new(BufReader::new(GzDecoder::new(file))),
            Some("bz2") => Box::new(BufReader::new(BzDecoder::new(file))),
            _ => Box::new(BufReader::new(file)),
        };
        Ok(Self::new(source, config))
    }
}

impl<R: BufRead> LammpstrjReader<R> {
    /// Creates a reader over an already-open line source.
    pub fn new(source: R, config: ReaderConfig) -> Self {
        LammpstrjReader {
            source: Some(source),
            line: String::new(),
            state: State::Fresh,
            x_factor: config.length_scale,
            t_factor: config.time_scale,
            v_factor: config.velocity_scale(),
            index: 0,
            natoms: 0,
            columns: Vec::new(),
            layout: None,
            pos_scale: [0.0; 3],
            frame: Frame::with_capacity(0, false),
        }
    }

    /// Reads header items in any order until `ITEM: ATOMS`, skipping blank
    /// lines. `Ok(None)` means the source ended cleanly before a new frame
    /// began; EOF after any item of a frame is a truncation error.
    fn read_frame_header(&mut self, src: &mut R) -> Result<Option<RawHeader>, TrajError> {
        let mut step: Option<i64> = None;
        let mut natoms: Option<usize> = None;
        let mut cell: Option<[[f64; 3]; 3]> = None;
        let mut in_frame = false;

        loop {
            let Some(line) = next_line(src, &mut self.line)? else {
                return if in_frame {
                    Err(TrajError::Truncated("frame header"))
                } else {
                    Ok(None)
                };
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let Some(item) = parse_item_line(trimmed) else {
                return Err(TrajError::Format(format!(
                    "failed to parse frame header line: {trimmed:?}"
                )));
            };
            in_frame = true;
            match item {
                Item::Timestep => {
                    let value = next_line(src, &mut self.line)?
                        .ok_or(TrajError::Truncated("TIMESTEP value"))?;
                    step = Some(value.trim().parse::<i64>()?);
                }
                Item::NumberOfAtoms => {
                    let value = next_line(src, &mut self.line)?
                        .ok_or(TrajError::Truncated("NUMBER OF ATOMS value"))?;
                    natoms = Some(value.trim().parse::<usize>()?);
                }
                Item::BoxBounds(..) => {
                    let mut rows: [Vec<f64>; 3] = [Vec::new(), Vec::new(), Vec::new()];
                    for row in rows.iter_mut() {
                        let line = next_line(src, &mut self.line)?
                            .ok_or(TrajError::Truncated("box bounds"))?;
                        *row = parse_floats(line)?;
                    }
                    cell = Some(cell_from_bounds(&rows)?);
                }
                Item::Atoms(cols) => {
                    let columns: Vec<String> =
                        cols.split_whitespace().map(str::to_string).collect();
                    let (Some(step), Some(natoms), Some(cell)) = (step, natoms, cell) else {
                        return Err(TrajError::Format(
                            "ATOMS section before TIMESTEP, NUMBER OF ATOMS, and BOX BOUNDS"
                                .to_string(),
                        ));
                    };
                    return Ok(Some(RawHeader {
                        step,
                        natoms,
                        cell,
                        columns,
                    }));
                }
            }
        }
    }

    /// Applies unit conversion to the per-frame header data.
    fn emit_header(&mut self, header: &RawHeader) {
        for i in 0..3 {
            for j in 0..3 {
                self.frame.cell[i][j] = header.cell[i][j] * self.x_factor;
            }
        }
        self.frame.time = Some(header.step as f64 * self.t_factor);
    }

    /// Per-axis factor taking a raw coordinate to a converted absolute one.
    /// Scaled-fractional coordinates pick up the raw cell extents here.
    /// Computed once from frame 1 and reused for the whole trajectory, so a
    /// box that changes between frames does not rescale later coordinates.
    fn position_scale(&self, raw_cell: &[[f64; 3]; 3], scaled: bool) -> [f64; 3] {
        if scaled {
            [
                raw_cell[0][0] * self.x_factor,
                raw_cell[1][1] * self.x_factor,
                raw_cell[2][2] * self.x_factor,
            ]
        } else {
            [self.x_factor; 3]
        }
    }

    /// First frame: establishes atom count, column layout, velocity
    /// presence, and the canonical (sorted-identifier) atom order.
    fn read_first(&mut self, src: &mut R) -> Result<bool, TrajError> {
        let Some(header) = self.read_frame_header(src)? else {
            return Ok(false);
        };
        let layout = ColumnLayout::detect(&header.columns)?;
        let n = header.natoms;
        let ncols = header.columns.len();

        let mut data: Vec<Vec<f64>> = Vec::with_capacity(n);
        for _ in 0..n {
            let line =
                next_line(src, &mut self.line)?.ok_or(TrajError::Truncated("atom data"))?;
            data.push(parse_line_of_n_f64(line, ncols)?);
        }

        // Rank each file identifier among the sorted identifiers; the rank
        // is the atom's canonical row for the rest of the trajectory.
        let ids: Vec<i64> = data.iter().map(|row| row[layout.id] as i64).collect();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&i| ids[i]);
        let mut dest = vec![0usize; n];
        for (rank, &row_idx) in order.iter().enumerate() {
            dest[row_idx] = rank;
        }

        self.frame = Frame::with_capacity(n, layout.velocities.is_some());
        self.emit_header(&header);
        self.pos_scale = self.position_scale(&header.cell, layout.scaled);
        for (row, &d) in data.iter().zip(dest.iter()) {
            scatter_row(&mut self.frame, layout, row, d, self.pos_scale, self.v_factor);
        }

        self.natoms = n;
        self.columns = header.columns;
        self.layout = Some(layout);
        Ok(true)
    }

    /// Later frames: the schema must match frame 1, and each atom scatters
    /// directly at `id - 1` (no re-sorting; see the module docs).
    fn read_next(&mut self, src: &mut R) -> Result<bool, TrajError> {
        let Some(layout) = self.layout else {
            // Only reachable after read_first has run; kept as a guard.
            return Ok(false);
        };
        let Some(header) = self.read_frame_header(src)? else {
            return Ok(false);
        };
        if header.natoms != self.natoms {
            return Err(TrajError::Consistency {
                what: "atom count",
                expected: self.natoms.to_string(),
                found: header.natoms.to_string(),
            });
        }
        if header.columns != self.columns {
            return Err(TrajError::Consistency {
                what: "atom column layout",
                expected: self.columns.join(" "),
                found: header.columns.join(" "),
            });
        }

        self.emit_header(&header);
        let ncols = self.columns.len();
        for _ in 0..self.natoms {
            let line =
                next_line(src, &mut self.line)?.ok_or(TrajError::Truncated("atom data"))?;
            let row = parse_line_of_n_f64(line, ncols)?;
            let id = row[layout.id] as i64;
            if id < 1 || id as usize > self.natoms {
                return Err(TrajError::Format(format!(
                    "atom id {id} outside 1..={}",
                    self.natoms
                )));
            }
            scatter_row(
                &mut self.frame,
                layout,
                &row,
                (id - 1) as usize,
                self.pos_scale,
                self.v_factor,
            );
        }
        Ok(true)
    }
}

impl<R: BufRead> TrajectoryReader for LammpstrjReader<R> {
    fn available() -> bool {
        // Pure-text parser, no external prerequisites.
        true
    }

    fn next_frame(&mut self) -> Result<Option<&Frame>, TrajError> {
        match self.state {
            State::Fresh | State::Active => {}
            State::Exhausted | State::Failed | State::Closed => return Ok(None),
        }
        let Some(mut src) = self.source.take() else {
            return Ok(None);
        };
        let result = if self.state == State::Fresh {
            self.read_first(&mut src)
        } else {
            self.read_next(&mut src)
        };
        match result {
            Ok(true) => {
                self.source = Some(src);
                self.state = State::Active;
                self.index += 1;
                self.frame.index = self.index;
                Ok(Some(&self.frame))
            }
            Ok(false) => {
                // Dropping the source releases the file handle at EOF.
                self.state = State::Exhausted;
                Ok(None)
            }
            Err(e) => {
                self.state = State::Failed;
                Err(e)
            }
        }
    }

    fn close(&mut self) {
        self.source = None;
        if matches!(self.state, State::Fresh | State::Active) {
            self.state = State::Closed;
        }
    }
}

/// Reads every frame of a dump file into owned [`Frame`]s.
///
/// Uncompressed files are memory-mapped so the OS page cache backs the
/// parse; compressed files stream through the regular decompressing path.
pub fn read_all_frames(
    path: impl AsRef<Path>,
    config: ReaderConfig,
) -> Result<Vec<Frame>, TrajError> {
    let path = path.as_ref();
    if matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("gz") | Some("bz2")
    ) {
        return LammpstrjReader::open(path, config)?.frames().collect();
    }
    let file = File::open(path)?;
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    LammpstrjReader::new(std::io::Cursor::new(&mmap[..]), config)
        .frames()
        .collect()
}
