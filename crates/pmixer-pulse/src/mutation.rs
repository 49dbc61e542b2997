//! Volume and mute changes by sink index.

use futures::channel::oneshot;
use pmixer_core::{ChannelVolumes, Mutation};
use tracing::{debug, warn};

use crate::backend::{Backend, OperationState, SuccessCallback};
use crate::connection::Connection;
use crate::error::PulseResult;

impl<B: Backend> Connection<B> {
    /// Replace the per-channel volume of the sink at `index`.
    ///
    /// The volume is sent as given; computing and clamping it is the
    /// caller's job. A rejection by the server is only logged.
    ///
    /// # Errors
    /// Returns an error if the main loop or the connection fails while
    /// waiting.
    pub fn set_volume(&mut self, index: u32, volume: &ChannelVolumes) -> PulseResult<()> {
        debug!(index, volume = %volume.average(), "Setting sink volume");
        let (callback, rx) = success_channel();
        let op = self.backend.set_sink_volume_by_index(index, volume, callback);
        let state = self.await_operation(op)?;
        self.check_success("set volume", index, state, rx);
        Ok(())
    }

    /// Set the mute flag of the sink at `index`.
    ///
    /// # Errors
    /// Returns an error if the main loop or the connection fails while
    /// waiting.
    pub fn set_mute(&mut self, index: u32, muted: bool) -> PulseResult<()> {
        debug!(index, muted, "Setting sink mute");
        let (callback, rx) = success_channel();
        let op = self.backend.set_sink_mute_by_index(index, muted, callback);
        let state = self.await_operation(op)?;
        self.check_success("set mute", index, state, rx);
        Ok(())
    }

    /// Issue one planned mutation.
    ///
    /// # Errors
    /// Same as [`Connection::set_volume`] and [`Connection::set_mute`].
    pub fn apply(&mut self, mutation: &Mutation) -> PulseResult<()> {
        match mutation {
            Mutation::SetVolume { index, volume } => self.set_volume(*index, volume),
            Mutation::SetMute { index, muted } => self.set_mute(*index, *muted),
        }
    }

    fn check_success(
        &self,
        what: &str,
        index: u32,
        state: OperationState,
        mut rx: oneshot::Receiver<bool>,
    ) {
        if !self.warn_on_rejection {
            return;
        }
        match rx.try_recv() {
            Ok(Some(true)) => {}
            Ok(Some(false)) => warn!(index, "Server rejected {what}"),
            Ok(None) | Err(_) => warn!(index, ?state, "No confirmation for {what}"),
        }
    }
}

fn success_channel() -> (SuccessCallback, oneshot::Receiver<bool>) {
    let (tx, rx) = oneshot::channel();
    let mut tx = Some(tx);
    let callback: SuccessCallback = Box::new(move |success: bool| {
        if let Some(tx) = tx.take() {
            let _ = tx.send(success);
        }
    });
    (callback, rx)
}
