//=============================================================================
// Data Structures - The shape of a trajectory frame
//=============================================================================

/// One time-step snapshot of a molecular-dynamics trajectory.
///
/// A `Frame` borrowed from a reader aliases the reader's internal buffers:
/// the next call to `next_frame` overwrites positions, velocities, and cell
/// in place. Callers that need to retain a frame across iterations must
/// `clone()` it first (the borrow checker enforces this; the owned
/// [`Frames`](crate::reader::Frames) adapter clones on the caller's behalf).
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// 1-based sequence number assigned by the reader, independent of any
    /// step number found in the file.
    pub index: usize,
    /// Number of particles; constant across all frames of one trajectory.
    pub natoms: usize,
    /// Simulation cell as three row vectors, in converted length units.
    /// Orthogonal cells have zero off-diagonal terms; triclinic cells carry
    /// the tilt factors in the lower triangle.
    pub cell: [[f64; 3]; 3],
    /// Particle positions in canonical atom order, in converted length units.
    pub positions: Vec<[f64; 3]>,
    /// Particle velocities, present only if the source format and file
    /// provide them. Whether this is `Some` is a fixed property of the
    /// reader instance, not a per-frame fluctuation.
    pub velocities: Option<Vec<[f64; 3]>>,
    /// Simulation time in converted time units, if the source reports one.
    pub time: Option<f64>,
}

impl Frame {
    /// Creates a zeroed frame with buffers sized for `natoms` particles.
    pub(crate) fn with_capacity(natoms: usize, with_velocities: bool) -> Self {
        Frame {
            index: 0,
            natoms,
            cell: [[0.0; 3]; 3],
            positions: vec![[0.0; 3]; natoms],
            velocities: with_velocities.then(|| vec![[0.0; 3]; natoms]),
            time: None,
        }
    }

    /// Returns `true` if this frame carries velocity data.
    pub fn has_velocities(&self) -> bool {
        self.velocities.is_some()
    }
}

/// Unit-conversion and backend configuration fixed at reader construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderConfig {
    /// Multiplies all lengths (positions and cell vectors). The default of
    /// 0.1 converts Angstrom sources to nm.
    pub length_scale: f64,
    /// Multiplies simulation time.
    pub time_scale: f64,
    /// Explicit backend override for plugin-backed readers; passed to the
    /// plugin as the format hint when set.
    pub plugin_name: Option<String>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            length_scale: 0.1,
            time_scale: 1.0,
            plugin_name: None,
        }
    }
}

impl ReaderConfig {
    /// Factor applied to raw velocities: `length_scale / time_scale`.
    pub fn velocity_scale(&self) -> f64 {
        self.length_scale / self.time_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_converts_angstrom_to_nm() {
        let config = ReaderConfig::default();
        assert_eq!(config.length_scale, 0.1);
        assert_eq!(config.time_scale, 1.0);
        assert_eq!(config.velocity_scale(), 0.1);
        assert_eq!(config.plugin_name, None);
    }

    #[test]
    fn test_frame_with_capacity() {
        let frame = Frame::with_capacity(4, true);
        assert_eq!(frame.natoms, 4);
        assert_eq!(frame.positions.len(), 4);
        assert_eq!(frame.velocities.as_ref().map(|v| v.len()), Some(4));
        assert!(frame.has_velocities());

        let frame = Frame::with_capacity(2, false);
        assert!(!frame.has_velocities());
    }
}
