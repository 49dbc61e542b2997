//! Default device resolution.
//!
//! Each lookup issues one request, waits for it through the pump, and then
//! reads the answer its callback left in a one-shot channel.

use futures::channel::oneshot;
use pmixer_core::DeviceSnapshot;
use tracing::{debug, info, warn};

use crate::backend::{Backend, ListItem, OperationState, SinkRecord};
use crate::connection::Connection;
use crate::error::{PulseError, PulseResult};

/// Outcome of a sink-info list, as seen by its callback.
enum SinkReply {
    Listed(Option<SinkRecord>),
    Failed,
    Invalid(pmixer_core::Error),
}

impl<B: Backend> Connection<B> {
    /// Ask the server for the name of its default sink.
    ///
    /// # Errors
    /// Returns [`PulseError::DefaultDeviceUnknown`] if the server gave no
    /// (or an empty) answer.
    pub fn default_device_name(&mut self) -> PulseResult<String> {
        let (tx, mut rx) = oneshot::channel();
        let mut tx = Some(tx);

        let op = self.backend.server_info(Box::new(move |name: Option<String>| {
            if let Some(tx) = tx.take() {
                let _ = tx.send(name);
            }
        }));
        let state = self.await_operation(op)?;

        match rx.try_recv() {
            Ok(Some(Some(name))) if !name.is_empty() => {
                info!(name = %name, "Default sink name");
                Ok(name)
            }
            Ok(Some(_)) => Err(PulseError::DefaultDeviceUnknown(
                "server reported no default sink".to_string(),
            )),
            Ok(None) | Err(_) => Err(PulseError::DefaultDeviceUnknown(format!(
                "server info request ended {state:?} without an answer"
            ))),
        }
    }

    /// Fetch the attributes of the sink called `name`.
    ///
    /// The callback may see several records before the end of the list; the
    /// last one wins. A failed lookup gets a single error callback and no end
    /// of list.
    ///
    /// # Errors
    /// Returns [`PulseError::DeviceUnresolved`] if no record arrived, and
    /// [`PulseError::InvalidRecord`] if the server sent one that could not be
    /// converted.
    pub fn device_by_name(&mut self, name: &str) -> PulseResult<DeviceSnapshot> {
        let (tx, mut rx) = oneshot::channel();
        let mut tx = Some(tx);
        let mut latest: Option<SinkRecord> = None;

        let op = self.backend.sink_info_by_name(
            name,
            Box::new(move |item: ListItem<SinkRecord>| {
                let reply = match item {
                    ListItem::Item(record) => {
                        latest = Some(record);
                        return;
                    }
                    ListItem::End => SinkReply::Listed(latest.take()),
                    ListItem::Error => SinkReply::Failed,
                    ListItem::Invalid(e) => SinkReply::Invalid(e),
                };
                if let Some(tx) = tx.take() {
                    let _ = tx.send(reply);
                }
            }),
        );
        let state = self.await_operation(op)?;

        let unresolved = |reason: &str| PulseError::DeviceUnresolved {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        match rx.try_recv() {
            Ok(Some(SinkReply::Listed(Some(record)))) => {
                debug!(index = record.index, channels = record.volume.len(), "Sink resolved");
                Ok(DeviceSnapshot {
                    index: record.index,
                    name: record.name,
                    muted: record.muted,
                    volume: record.volume,
                })
            }
            Ok(Some(SinkReply::Listed(None))) => Err(unresolved("no matching sink")),
            Ok(Some(SinkReply::Failed)) => {
                warn!(name, "Sink info request reported an error");
                Err(unresolved("server reported an error"))
            }
            Ok(Some(SinkReply::Invalid(e))) => Err(PulseError::InvalidRecord(e)),
            Ok(None) | Err(_) if state == OperationState::Cancelled => {
                Err(unresolved("request cancelled"))
            }
            Ok(None) | Err(_) => Err(unresolved("request ended without a reply")),
        }
    }

    /// Resolve the server's default sink into a snapshot.
    ///
    /// # Errors
    /// Fails if either the name lookup or the attribute lookup fails; the
    /// error names the step.
    pub fn default_device(&mut self) -> PulseResult<DeviceSnapshot> {
        let name = self.default_device_name()?;
        let device = self.device_by_name(&name)?;
        info!(
            index = device.index,
            volume = %device.volume.average(),
            muted = device.muted,
            "Got default sink"
        );
        Ok(device)
    }
}
