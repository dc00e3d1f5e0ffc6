//=============================================================================
// The Reader Interface - one iteration contract over every backend
//=============================================================================

use crate::error::TrajError;
use crate::types::Frame;

/// The capability contract every trajectory backend satisfies.
///
/// A reader is a single-step, non-rewindable producer of a finite sequence
/// of [`Frame`]s, driven by one logical thread of control. Iteration is
/// pull-based: the reader performs no work between `next_frame` calls.
///
/// The three outcomes of `next_frame` are first-class:
///
/// * `Ok(Some(frame))` - the next frame, borrowed from the reader. The
///   backing buffers are reused in place, so the data is only valid until
///   the following call; clone the frame to retain it.
/// * `Ok(None)` - clean exhaustion. Safe to call again; subsequent calls
///   keep returning `Ok(None)`.
/// * `Err(_)` - a fatal condition. The error is reported once, iteration is
///   over, and `close` remains safe.
pub trait TrajectoryReader {
    /// Reports whether this backend's runtime prerequisites are present on
    /// the host. Statically answerable, performs no I/O; meant for
    /// capability discovery, not error signaling.
    fn available() -> bool
    where
        Self: Sized;

    /// Advances to the next frame. See the trait-level contract.
    fn next_frame(&mut self) -> Result<Option<&Frame>, TrajError>;

    /// Releases all resources held by the reader. Idempotent; safe after
    /// exhaustion, after errors, and when iteration is abandoned early.
    fn close(&mut self);

    /// Wraps the reader in an [`Iterator`] that yields owned frames.
    fn frames(self) -> Frames<Self>
    where
        Self: Sized,
    {
        Frames {
            reader: self,
            done: false,
        }
    }
}

/// Owned-frame iterator adapter over any [`TrajectoryReader`].
///
/// Each item is cloned out of the reader's reusable buffers, so collected
/// frames are independent snapshots. A fatal error is yielded once, after
/// which the iterator is fused.
pub struct Frames<R: TrajectoryReader> {
    reader: R,
    done: bool,
}

impl<R: TrajectoryReader> Iterator for Frames<R> {
    type Item = Result<Frame, TrajError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame.clone())),
            Ok(None) => {
                self.done = true;
                self.reader.close();
                None
            }
            Err(e) => {
                self.done = true;
                self.reader.close();
                Some(Err(e))
            }
        }
    }
}
