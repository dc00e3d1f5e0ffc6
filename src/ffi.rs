use crate::lammpstrj::LammpstrjReader;
use crate::reader::TrajectoryReader;
use crate::types::ReaderConfig;
use std::ffi::{c_char, c_int, CStr};
use std::io::BufRead;
use std::ptr;

//=============================================================================
// C-Compatible Structs & Handles
//=============================================================================

type DynLammpstrjReader = LammpstrjReader<Box<dyn BufRead>>;

/// An opaque handle to a Rust LAMMPS trajectory reader.
/// The C/C++ side needs to treat this as a void pointer
#[repr(C)]
pub struct RTJTrajectory {
    _private: [u8; 0],
}

/// A transparent, borrowed view of the current frame.
///
/// The `positions` and `velocities` pointers alias the reader's internal
/// buffers: they stay valid only until the next `rtj_next_frame` or
/// `rtj_free` call on the same handle. Copy out whatever must outlive that.
#[repr(C)]
pub struct CFrameView {
    /// 1-based frame sequence number.
    pub index: usize,
    pub natoms: usize,
    /// Cell row vectors, converted units.
    pub cell: [[f64; 3]; 3],
    pub time: f64,
    pub has_time: bool,
    /// `3 * natoms` doubles, xyz per atom, canonical atom order.
    pub positions: *const f64,
    /// NULL when the trajectory carries no velocities.
    pub velocities: *const f64,
}

//=============================================================================
// Reader Lifecycle
//=============================================================================

/// Opens a LAMMPS dump file (plain, .gz, or .bz2).
/// The caller OWNS the returned pointer and MUST call `rtj_free`.
/// Returns NULL on invalid arguments or if the file cannot be opened.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rtj_open_lammpstrj(
    filename_c: *const c_char,
    length_scale: f64,
    time_scale: f64,
) -> *mut RTJTrajectory {
    if filename_c.is_null() {
        return ptr::null_mut();
    }
    let filename = match unsafe { CStr::from_ptr(filename_c).to_str() } {
        Ok(s) => s,
        Err(_) => return ptr::null_mut(),
    };
    let config = ReaderConfig {
        length_scale,
        time_scale,
        plugin_name: None,
    };
    match LammpstrjReader::open(filename, config) {
        Ok(reader) => Box::into_raw(Box::new(reader)) as *mut RTJTrajectory,
        Err(_) => ptr::null_mut(),
    }
}

/// Advances the reader and fills `view` with the next frame.
/// Returns 1 on a frame, 0 on clean exhaustion, -1 on a fatal error.
/// After 0 or -1 the handle stays valid (and must still be freed), but no
/// further frames will be produced.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rtj_next_frame(
    traj: *mut RTJTrajectory,
    view: *mut CFrameView,
) -> c_int {
    if traj.is_null() || view.is_null() {
        return -1;
    }
    let reader = unsafe { &mut *(traj as *mut DynLammpstrjReader) };
    match reader.next_frame() {
        Ok(Some(frame)) => {
            let out = unsafe { &mut *view };
            out.index = frame.index;
            out.natoms = frame.natoms;
            out.cell = frame.cell;
            out.time = frame.time.unwrap_or(0.0);
            out.has_time = frame.time.is_some();
            out.positions = frame.positions.as_ptr() as *const f64;
            out.velocities = frame
                .velocities
                .as_ref()
                .map_or(ptr::null(), |v| v.as_ptr() as *const f64);
            1
        }
        Ok(None) => 0,
        Err(_) => -1,
    }
}

/// Releases the reader's file handle early. Idempotent; the handle itself
/// must still be freed with `rtj_free`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rtj_close(traj: *mut RTJTrajectory) {
    if !traj.is_null() {
        let reader = unsafe { &mut *(traj as *mut DynLammpstrjReader) };
        reader.close();
    }
}

/// Frees the memory for an `RTJTrajectory` handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn rtj_free(traj: *mut RTJTrajectory) {
    if !traj.is_null() {
        let _ = unsafe { Box::from_raw(traj as *mut DynLammpstrjReader) };
    }
}
