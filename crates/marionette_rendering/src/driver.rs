//! Forwards a stream of parameter maps into a coordinator.
//!
//! Upstream systems (face tracking, lip sync, animation curves) produce one
//! map per update on their own thread. The driver stages each map as one
//! batch; it never touches the frame lock.
//!
//! ```text
//! tracker ──ParameterMap──► channel ──► ParameterDriver ──► stage
//!                                        (own thread)         │
//!                                                render_frame ◄┘
//! ```

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;
use marionette_core::ParameterMap;

use crate::coordinator::FrameCoordinator;
use crate::engine::CharacterEngine;

/// Anything that accepts parameter batches for a later frame.
pub trait ParameterSink: Send + Sync {
    /// Stages every entry of `params` as one batch.
    fn stage_parameters(&self, params: &ParameterMap);
}

impl<E: CharacterEngine> ParameterSink for FrameCoordinator<E> {
    fn stage_parameters(&self, params: &ParameterMap) {
        self.set_parameters(params.iter().map(|(id, value)| (id.as_str(), *value)));
    }
}

/// Stages every map received on `rx` until all senders are dropped.
///
/// Empty maps are forwarded too. Returns the number of maps forwarded.
pub fn drive_parameters<S: ParameterSink + ?Sized>(rx: &Receiver<ParameterMap>, sink: &S) -> usize {
    let mut forwarded = 0;
    for params in rx {
        sink.stage_parameters(&params);
        forwarded += 1;
    }
    forwarded
}

/// A background thread running [`drive_parameters`].
#[derive(Debug)]
pub struct ParameterDriver {
    handle: JoinHandle<usize>,
}

impl ParameterDriver {
    /// Spawns the driver thread.
    ///
    /// The thread exits once every sender for `rx` is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the thread.
    pub fn spawn<S>(rx: Receiver<ParameterMap>, sink: Arc<S>) -> io::Result<Self>
    where
        S: ParameterSink + ?Sized + 'static,
    {
        let handle = std::thread::Builder::new()
            .name("marionette-params".to_string())
            .spawn(move || {
                let forwarded = drive_parameters(&rx, &*sink);
                tracing::debug!("Parameter driver finished after {} maps", forwarded);
                forwarded
            })?;
        Ok(Self { handle })
    }

    /// Returns true once the driver thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the thread and returns the number of maps forwarded.
    ///
    /// Returns `None` if the sink panicked.
    #[must_use]
    pub fn join(self) -> Option<usize> {
        self.handle.join().ok()
    }
}
