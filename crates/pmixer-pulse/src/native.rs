//! [`Backend`] implementation over libpulse's standard main loop.

use std::cell::RefCell;
use std::rc::Rc;

use libpulse_binding::callbacks::ListResult;
use libpulse_binding::context::introspect::{ServerInfo, SinkInfo};
use libpulse_binding::context::{Context, FlagSet as ContextFlagSet, State as PaContextState};
use libpulse_binding::mainloop::standard::{IterateResult, Mainloop};
use libpulse_binding::operation::{Operation, State as PaOperationState};
use libpulse_binding::volume::{ChannelVolumes as PaChannelVolumes, Volume as PaVolume};
use pmixer_core::{ChannelVolumes, Volume};
use tracing::{debug, warn};

use crate::backend::{
    Backend, ContextState, ListItem, OperationState, PendingOperation, ServerInfoCallback,
    SinkInfoCallback, SinkRecord, StateObserver, SuccessCallback,
};
use crate::error::{PulseError, PulseResult};

/// Operation handle returned by [`NativeBackend`]. Dropping it unrefs the
/// underlying `pa_operation`.
pub enum NativeOperation {
    ServerInfo(Operation<dyn FnMut(&ServerInfo)>),
    SinkInfo(Operation<dyn FnMut(ListResult<&SinkInfo>)>),
    Success(Operation<dyn FnMut(bool)>),
}

impl PendingOperation for NativeOperation {
    fn state(&self) -> OperationState {
        let state = match self {
            Self::ServerInfo(op) => op.get_state(),
            Self::SinkInfo(op) => op.get_state(),
            Self::Success(op) => op.get_state(),
        };
        match state {
            PaOperationState::Running => OperationState::Running,
            PaOperationState::Done => OperationState::Done,
            PaOperationState::Cancelled => OperationState::Cancelled,
        }
    }
}

/// PulseAudio client on a single-threaded standard main loop.
pub struct NativeBackend {
    // Declared before the main loop so it is released first.
    context: Rc<RefCell<Context>>,
    mainloop: Mainloop,
}

impl NativeBackend {
    /// Create the main loop and a context announcing itself as `client_name`.
    ///
    /// # Errors
    /// Returns an error if libpulse cannot allocate either object.
    pub fn new(client_name: &str) -> PulseResult<Self> {
        let mainloop = Mainloop::new()
            .ok_or_else(|| PulseError::MainLoopError("Failed to create main loop".to_string()))?;

        let context = Context::new(&mainloop, client_name)
            .ok_or_else(|| PulseError::ConnectionFailed("Failed to create context".to_string()))?;

        debug!(client_name, "PulseAudio context created");

        Ok(Self {
            context: Rc::new(RefCell::new(context)),
            mainloop,
        })
    }
}

impl Backend for NativeBackend {
    type Operation = NativeOperation;

    fn connect(&mut self, server: Option<&str>, observer: StateObserver) -> PulseResult<()> {
        let observer = Rc::new(RefCell::new(observer));

        // Later transitions happen inside `iterate`, where the context is not
        // borrowed. Teardown clears the callback before disconnecting.
        let weak = Rc::downgrade(&self.context);
        let notify = Rc::clone(&observer);
        self.context
            .borrow_mut()
            .set_state_callback(Some(Box::new(move || {
                let Some(context) = weak.upgrade() else {
                    return;
                };
                // Transitions made inside `Context::connect` find the context
                // borrowed; the state they left behind is reported below.
                let Ok(context) = context.try_borrow() else {
                    return;
                };
                let state = context_state(context.get_state());
                if let Ok(mut observer) = notify.try_borrow_mut() {
                    (*observer)(state);
                }
            })));

        let started = self
            .context
            .borrow_mut()
            .connect(server, ContextFlagSet::NOFLAGS, None);
        if let Err(e) = started {
            self.context.borrow_mut().set_state_callback(None);
            return Err(PulseError::ConnectionFailed(format!("Failed to connect: {e}")));
        }

        let state = context_state(self.context.borrow().get_state());
        (*observer.borrow_mut())(state);
        Ok(())
    }

    fn iterate(&mut self) -> PulseResult<()> {
        match self.mainloop.iterate(true) {
            IterateResult::Success(_) => Ok(()),
            IterateResult::Quit(retval) => Err(PulseError::MainLoopError(format!(
                "Main loop quit with {}",
                retval.0
            ))),
            IterateResult::Err(e) => Err(PulseError::MainLoopError(format!("{e}"))),
        }
    }

    fn server_info(&mut self, mut callback: ServerInfoCallback) -> NativeOperation {
        let op = self
            .context
            .borrow()
            .introspect()
            .get_server_info(move |info| {
                callback(info.default_sink_name.as_ref().map(ToString::to_string));
            });
        NativeOperation::ServerInfo(op)
    }

    fn sink_info_by_name(&mut self, name: &str, mut callback: SinkInfoCallback) -> NativeOperation {
        let op = self
            .context
            .borrow()
            .introspect()
            .get_sink_info_by_name(name, move |result| match result {
                ListResult::Item(info) => match sink_record(info) {
                    Ok(record) => callback(ListItem::Item(record)),
                    Err(e) => {
                        warn!(error = %e, "Malformed sink record");
                        callback(ListItem::Invalid(e));
                    }
                },
                ListResult::End => callback(ListItem::End),
                ListResult::Error => callback(ListItem::Error),
            });
        NativeOperation::SinkInfo(op)
    }

    fn set_sink_volume_by_index(
        &mut self,
        index: u32,
        volume: &ChannelVolumes,
        callback: SuccessCallback,
    ) -> NativeOperation {
        let volume = pa_volumes(volume);
        let mut introspect = self.context.borrow().introspect();
        NativeOperation::Success(introspect.set_sink_volume_by_index(index, &volume, Some(callback)))
    }

    fn set_sink_mute_by_index(
        &mut self,
        index: u32,
        muted: bool,
        callback: SuccessCallback,
    ) -> NativeOperation {
        let mut introspect = self.context.borrow().introspect();
        NativeOperation::Success(introspect.set_sink_mute_by_index(index, muted, Some(callback)))
    }

    fn disconnect(&mut self) {
        let mut context = self.context.borrow_mut();
        context.set_state_callback(None);
        context.disconnect();
        debug!("PulseAudio context disconnected");
    }
}

#[allow(unreachable_patterns)]
fn context_state(state: PaContextState) -> ContextState {
    match state {
        PaContextState::Unconnected => ContextState::Unconnected,
        PaContextState::Connecting => ContextState::Connecting,
        PaContextState::Authorizing => ContextState::Authorizing,
        PaContextState::SettingName => ContextState::SettingName,
        PaContextState::Ready => ContextState::Ready,
        PaContextState::Failed => ContextState::Failed,
        PaContextState::Terminated => ContextState::Terminated,
        other => ContextState::Unrecognized(other as u32),
    }
}

fn sink_record(info: &SinkInfo) -> pmixer_core::Result<SinkRecord> {
    Ok(SinkRecord {
        index: info.index,
        name: info.name.as_deref().unwrap_or_default().to_string(),
        muted: info.mute,
        volume: channel_volumes(&info.volume)?,
    })
}

fn channel_volumes(pa: &PaChannelVolumes) -> pmixer_core::Result<ChannelVolumes> {
    ChannelVolumes::new(pa.get().iter().map(|v| Volume(v.0)).collect())
}

#[allow(clippy::cast_possible_truncation)]
fn pa_volumes(volume: &ChannelVolumes) -> PaChannelVolumes {
    let mut pa = PaChannelVolumes::default();
    // Channel count is bounded by CHANNELS_MAX, the server's own limit.
    pa.set_len(volume.len() as u8);
    for (slot, value) in pa.get_mut().iter_mut().zip(volume.values()) {
        *slot = PaVolume(value.0);
    }
    pa
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_volume_scale_matches_libpulse() {
        assert_eq!(Volume::MUTED.0, PaVolume::MUTED.0);
        assert_eq!(Volume::NORMAL.0, PaVolume::NORMAL.0);
        assert_eq!(Volume::MAX.0, PaVolume::MAX.0);
    }

    #[test]
    fn test_volumes_round_trip() {
        let volume = ChannelVolumes::new(vec![
            Volume::MUTED,
            Volume(0x8000),
            Volume::NORMAL,
            Volume::UI_MAX,
        ])
        .unwrap();

        let pa = pa_volumes(&volume);
        assert_eq!(pa.len(), 4);
        assert_eq!(
            pa.get().iter().map(|v| v.0).collect::<Vec<_>>(),
            vec![0, 0x8000, 0x1_0000, 99_957]
        );
        assert_eq!(channel_volumes(&pa).unwrap(), volume);
    }

    #[test]
    fn test_out_of_range_channel_is_rejected() {
        let mut pa = PaChannelVolumes::default();
        pa.set_len(2);
        pa.get_mut()[1] = PaVolume(u32::MAX);

        assert_matches!(
            channel_volumes(&pa),
            Err(pmixer_core::Error::InvalidVolume(u32::MAX))
        );
    }

    #[test]
    fn test_context_states() {
        let cases = [
            (PaContextState::Unconnected, ContextState::Unconnected),
            (PaContextState::Connecting, ContextState::Connecting),
            (PaContextState::Authorizing, ContextState::Authorizing),
            (PaContextState::SettingName, ContextState::SettingName),
            (PaContextState::Ready, ContextState::Ready),
            (PaContextState::Failed, ContextState::Failed),
            (PaContextState::Terminated, ContextState::Terminated),
        ];
        for (pa, expected) in cases {
            assert_eq!(context_state(pa), expected);
        }
    }
}
