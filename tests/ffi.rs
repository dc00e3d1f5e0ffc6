mod common;

use readtrj_core::ffi::{rtj_close, rtj_free, rtj_next_frame, rtj_open_lammpstrj, CFrameView};
use std::ffi::CString;
use std::ptr;

fn empty_view() -> CFrameView {
    CFrameView {
        index: 0,
        natoms: 0,
        cell: [[0.0; 3]; 3],
        time: 0.0,
        has_time: false,
        positions: ptr::null(),
        velocities: ptr::null(),
    }
}

#[test]
fn test_c_api_roundtrip() {
    let path = CString::new(test_case!("nvt_4frame.lammpstrj")).unwrap();
    unsafe {
        let traj = rtj_open_lammpstrj(path.as_ptr(), 0.1, 1.0);
        assert!(!traj.is_null());

        let mut view = empty_view();
        let mut count = 0usize;
        while rtj_next_frame(traj, &mut view) == 1 {
            count += 1;
            assert_eq!(view.index, count);
            assert_eq!(view.natoms, 24);
            assert!(view.has_time);
            assert!(!view.positions.is_null());
            assert!(!view.velocities.is_null());
            if count == 1 {
                // Atom 1 at (1.0, 0.5, 0.25) Angstrom -> nm.
                let x = *view.positions;
                assert!((x - 0.1).abs() < 1e-6);
            }
        }
        assert_eq!(count, 4);
        // Exhausted, not an error.
        assert_eq!(rtj_next_frame(traj, &mut view), 0);

        rtj_close(traj);
        rtj_close(traj);
        rtj_free(traj);
    }
}

#[test]
fn test_c_api_null_and_missing_inputs() {
    unsafe {
        assert!(rtj_open_lammpstrj(ptr::null(), 0.1, 1.0).is_null());

        let missing = CString::new(test_case!("does_not_exist.lammpstrj")).unwrap();
        assert!(rtj_open_lammpstrj(missing.as_ptr(), 0.1, 1.0).is_null());

        let mut view = empty_view();
        assert_eq!(rtj_next_frame(ptr::null_mut(), &mut view), -1);
    }
}
