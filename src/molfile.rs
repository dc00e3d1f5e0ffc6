//! Adapter from the VMD molfile plugin capability set to the
//! [`TrajectoryReader`] contract.
//!
//! The molfile ABI itself (dynamic loading, C struct layout, plugin
//! discovery) is an external collaborator; this module only fixes the
//! boundary shape as the [`MolfilePlugin`] trait and the adaptation rules
//! around it. Plugins traffic in single-precision floats, so the adapter
//! keeps f32 staging buffers and widens into the emitted [`Frame`].

use crate::cell::cell_from_lengths_angles;
use crate::error::TrajError;
use crate::reader::TrajectoryReader;
use crate::types::{Frame, ReaderConfig};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Per-trajectory metadata a plugin may report before the first timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestepMetadata {
    pub has_velocities: bool,
}

/// Geometry and time of one successfully read timestep.
///
/// Molfile reports the cell as edge lengths plus angles in degrees; the
/// adapter rebuilds the matrix with
/// [`cell_from_lengths_angles`](crate::cell::cell_from_lengths_angles).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestepInfo {
    pub lengths: [f32; 3],
    pub angles: [f32; 3],
    pub physical_time: f64,
}

/// Outcome of a `read_next_timestep` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimestepRead {
    Frame(TimestepInfo),
    /// No more timesteps in the file.
    End,
    /// The plugin failed mid-read. Adapters treat this the same as `End`
    /// after closing the plugin, mirroring exhaustion across backends.
    Error,
}

/// The capability set a molfile plugin exposes, as seen from this crate.
///
/// `open` and `read_next_timestep` are mandatory; the other reads are
/// optional capabilities, modeled by returning `None` when the plugin does
/// not offer them.
pub trait MolfilePlugin {
    /// Opens the trajectory, returning the atom count.
    fn open(&mut self, path: &Path, format_hint: &str) -> Result<usize, TrajError>;

    /// Fixes the atom-to-coordinate mapping for formats that need it.
    /// `None` means the plugin does not offer this capability.
    fn read_structure(&mut self) -> Option<Result<(), TrajError>> {
        None
    }

    /// Reports per-trajectory timestep metadata (velocity presence).
    /// `None` means the plugin does not offer this capability.
    fn read_timestep_metadata(&mut self) -> Option<Result<TimestepMetadata, TrajError>> {
        None
    }

    /// Reads the next timestep into the supplied buffers. `velocities` is
    /// `Some` only when metadata reported velocities.
    fn read_next_timestep(
        &mut self,
        positions: &mut [[f32; 3]],
        velocities: Option<&mut [[f32; 3]]>,
    ) -> TimestepRead;

    fn close(&mut self);
}

/// Location of the molfile plugin installation, probed once per process
/// from `MOLFILE_PLUGIN_DIR`.
pub fn plugin_dir() -> Option<&'static Path> {
    static DIR: OnceLock<Option<PathBuf>> = OnceLock::new();
    DIR.get_or_init(|| {
        std::env::var_os("MOLFILE_PLUGIN_DIR")
            .map(PathBuf::from)
            .filter(|p| p.is_dir())
    })
    .as_deref()
}

/// Reader backed by a molfile plugin.
pub struct MolfileReader<P: MolfilePlugin> {
    plugin: Option<P>,
    coords: Vec<[f32; 3]>,
    vels: Option<Vec<[f32; 3]>>,
    frame: Frame,
    index: usize,
    x_factor: f64,
    t_factor: f64,
    v_factor: f64,
}

impl<P: MolfilePlugin> MolfileReader<P> {
    /// Opens a trajectory through `plugin`.
    ///
    /// `plugin` is `None` when the host has no usable plugin; construction
    /// then fails with [`TrajError::UnavailableBackend`] before any I/O.
    /// The format hint passed to the plugin is `config.plugin_name` when
    /// set, the filename suffix otherwise.
    ///
    /// Adaptation rules applied here, before the first timestep read:
    /// `read_structure` is invoked exactly once when offered and its
    /// failure is fatal; `read_timestep_metadata`, when offered and
    /// reporting velocities, causes the velocity buffer to be allocated
    /// up front.
    pub fn new(
        plugin: Option<P>,
        path: impl AsRef<Path>,
        config: ReaderConfig,
    ) -> Result<Self, TrajError> {
        let Some(mut plugin) = plugin else {
            return Err(TrajError::UnavailableBackend("molfile plugin"));
        };
        let path = path.as_ref();
        let suffix = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        let hint = config.plugin_name.clone().unwrap_or(suffix);

        let natoms = plugin.open(path, &hint)?;

        if let Some(result) = plugin.read_structure() {
            result?;
        }

        let has_velocities = match plugin.read_timestep_metadata() {
            Some(result) => result?.has_velocities,
            None => false,
        };

        Ok(MolfileReader {
            plugin: Some(plugin),
            coords: vec![[0.0; 3]; natoms],
            vels: has_velocities.then(|| vec![[0.0; 3]; natoms]),
            frame: Frame::with_capacity(natoms, has_velocities),
            index: 0,
            x_factor: config.length_scale,
            t_factor: config.time_scale,
            v_factor: config.velocity_scale(),
        })
    }
}

impl<P: MolfilePlugin> TrajectoryReader for MolfileReader<P> {
    fn available() -> bool {
        plugin_dir().is_some()
    }

    fn next_frame(&mut self) -> Result<Option<&Frame>, TrajError> {
        let Some(plugin) = self.plugin.as_mut() else {
            return Ok(None);
        };
        match plugin.read_next_timestep(&mut self.coords, self.vels.as_deref_mut()) {
            TimestepRead::Frame(info) => {
                let cell = cell_from_lengths_angles(
                    info.lengths[0] as f64,
                    info.lengths[1] as f64,
                    info.lengths[2] as f64,
                    info.angles[0] as f64,
                    info.angles[1] as f64,
                    info.angles[2] as f64,
                );
                for i in 0..3 {
                    for j in 0..3 {
                        self.frame.cell[i][j] = cell[i][j] * self.x_factor;
                    }
                }
                for (out, raw) in self.frame.positions.iter_mut().zip(self.coords.iter()) {
                    for k in 0..3 {
                        out[k] = raw[k] as f64 * self.x_factor;
                    }
                }
                if let (Some(out_v), Some(raw_v)) =
                    (self.frame.velocities.as_mut(), self.vels.as_ref())
                {
                    for (out, raw) in out_v.iter_mut().zip(raw_v.iter()) {
                        for k in 0..3 {
                            out[k] = raw[k] as f64 * self.v_factor;
                        }
                    }
                }
                self.frame.time = Some(info.physical_time * self.t_factor);
                self.index += 1;
                self.frame.index = self.index;
                Ok(Some(&self.frame))
            }
            TimestepRead::End | TimestepRead::Error => {
                self.close();
                Ok(None)
            }
        }
    }

    fn close(&mut self) {
        if let Some(mut plugin) = self.plugin.take() {
            plugin.close();
        }
    }
}
