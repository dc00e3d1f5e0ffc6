//! Adapter from the libgmx XTC call set to the [`TrajectoryReader`]
//! contract.
//!
//! libgmx ships with Gromacs and decodes xdr-compressed XTC trajectories;
//! the binding mechanics live outside this crate, behind the
//! [`XtcLibrary`] trait. XTC data is already in nm/ps, so no unit
//! conversion is applied.

use crate::error::TrajError;
use crate::reader::TrajectoryReader;
use crate::types::Frame;
use std::path::Path;

/// Everything the first-frame call of libgmx reports, buffers included.
#[derive(Debug, Clone, PartialEq)]
pub struct XtcFirstFrame {
    pub natoms: usize,
    pub step: i64,
    pub time: f32,
    pub cell: [[f32; 3]; 3],
    pub coords: Vec<[f32; 3]>,
}

/// Outcome of reading a subsequent XTC frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum XtcRead {
    Frame { step: i64, time: f32 },
    /// No more frames.
    End,
    /// The frame decoded but its integrity flag was not set.
    Corrupt,
}

/// The libgmx call set used for XTC reading.
pub trait XtcLibrary {
    fn open(&mut self, path: &Path) -> Result<(), TrajError>;

    /// Reads the first frame, allocating coordinate storage.
    fn read_first(&mut self) -> Result<XtcFirstFrame, TrajError>;

    /// Reads a subsequent frame into the buffers allocated by `read_first`.
    fn read_next(&mut self, cell: &mut [[f32; 3]; 3], coords: &mut [[f32; 3]]) -> XtcRead;

    fn close(&mut self);
}

/// Reader backed by libgmx XTC calls. Velocities are never present.
pub struct XtcReader<L: XtcLibrary> {
    library: Option<L>,
    first_called: bool,
    cell: [[f32; 3]; 3],
    coords: Vec<[f32; 3]>,
    frame: Frame,
    index: usize,
}

impl<L: XtcLibrary> XtcReader<L> {
    /// Opens an XTC file through `library`; `None` means libgmx was not
    /// found, and construction fails with
    /// [`TrajError::UnavailableBackend`] before any I/O.
    pub fn new(library: Option<L>, path: impl AsRef<Path>) -> Result<Self, TrajError> {
        let Some(mut library) = library else {
            return Err(TrajError::UnavailableBackend("libgmx"));
        };
        library.open(path.as_ref())?;
        Ok(XtcReader {
            library: Some(library),
            first_called: false,
            cell: [[0.0; 3]; 3],
            coords: Vec::new(),
            frame: Frame::with_capacity(0, false),
            index: 0,
        })
    }

    fn emit(&mut self, time: f32) -> Result<Option<&Frame>, TrajError> {
        for i in 0..3 {
            for j in 0..3 {
                self.frame.cell[i][j] = self.cell[i][j] as f64;
            }
        }
        for (out, raw) in self.frame.positions.iter_mut().zip(self.coords.iter()) {
            for k in 0..3 {
                out[k] = raw[k] as f64;
            }
        }
        self.frame.time = Some(time as f64);
        self.index += 1;
        self.frame.index = self.index;
        Ok(Some(&self.frame))
    }
}

impl<L: XtcLibrary> TrajectoryReader for XtcReader<L> {
    fn available() -> bool {
        // TODO: probe libgromacs >= 5; the read_first/read_next signatures
        // changed there and the old symbol set would misreport.
        false
    }

    fn next_frame(&mut self) -> Result<Option<&Frame>, TrajError> {
        let Some(library) = self.library.as_mut() else {
            return Ok(None);
        };
        if !self.first_called {
            self.first_called = true;
            match library.read_first() {
                Ok(first) => {
                    self.cell = first.cell;
                    self.coords = first.coords;
                    self.frame = Frame::with_capacity(first.natoms, false);
                    return self.emit(first.time);
                }
                Err(e) => {
                    self.close();
                    return Err(e);
                }
            }
        }
        match library.read_next(&mut self.cell, &mut self.coords) {
            XtcRead::Frame { time, .. } => self.emit(time),
            XtcRead::End => {
                self.close();
                Ok(None)
            }
            XtcRead::Corrupt => {
                // Fatal: release the library; later calls report exhaustion.
                self.close();
                Err(TrajError::Format("corrupt frame in xtc file".to_string()))
            }
        }
    }

    fn close(&mut self) {
        if let Some(mut library) = self.library.take() {
            library.close();
        }
    }
}
