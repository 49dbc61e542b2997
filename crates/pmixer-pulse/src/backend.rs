//! The asynchronous protocol surface the blocking layers are built on.
//!
//! [`Backend`] is the seam between the synchronous adapter and the audio
//! server's client library. Requests return a [`PendingOperation`] right away;
//! their callbacks run later, from inside [`Backend::iterate`].

use pmixer_core::ChannelVolumes;

/// Connection state reported by the server's context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Unconnected,
    Connecting,
    Authorizing,
    SettingName,
    Ready,
    Failed,
    Terminated,
    /// A value the client library reported that this client does not know
    Unrecognized(u32),
}

/// Lifecycle of one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Running,
    Done,
    Cancelled,
}

impl OperationState {
    /// Whether the operation has stopped running.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Handle to one in-flight request.
///
/// Dropping the handle releases it; owning it by value makes the release
/// happen exactly once.
pub trait PendingOperation {
    /// Current lifecycle state.
    fn state(&self) -> OperationState;
}

/// One invocation of a list-style callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem<T> {
    /// A data record
    Item(T),
    /// End of the list; carries no data
    End,
    /// The server reported an error for the request. No `End` follows.
    Error,
    /// A record arrived that could not be converted
    Invalid(pmixer_core::Error),
}

/// Sink attributes as delivered by a sink-info callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkRecord {
    pub index: u32,
    pub name: String,
    pub muted: bool,
    pub volume: ChannelVolumes,
}

/// Observer invoked on every context state change.
pub type StateObserver = Box<dyn FnMut(ContextState)>;
/// Receives the default sink name from a server-info reply.
pub type ServerInfoCallback = Box<dyn FnMut(Option<String>)>;
/// Receives each sink record, then [`ListItem::End`], or a single
/// [`ListItem::Error`].
pub type SinkInfoCallback = Box<dyn FnMut(ListItem<SinkRecord>)>;
/// Receives the server's success flag for a mutation.
pub type SuccessCallback = Box<dyn FnMut(bool)>;

/// Asynchronous, callback-based client of the audio server.
pub trait Backend {
    /// Handle type returned by every request.
    type Operation: PendingOperation;

    /// Register `observer`, then start connecting. State changes are
    /// delivered to it during [`Backend::iterate`]; ones made while the
    /// connection starts may arrive before this returns.
    ///
    /// # Errors
    /// Returns an error if the connection attempt cannot be started.
    fn connect(&mut self, server: Option<&str>, observer: StateObserver) -> crate::PulseResult<()>;

    /// Run one main loop iteration, blocking until at least one event is
    /// available, and dispatch it.
    ///
    /// # Errors
    /// Returns an error if the main loop quit or failed.
    fn iterate(&mut self) -> crate::PulseResult<()>;

    /// Request server information.
    fn server_info(&mut self, callback: ServerInfoCallback) -> Self::Operation;

    /// Request the attributes of the sink called `name`.
    fn sink_info_by_name(&mut self, name: &str, callback: SinkInfoCallback) -> Self::Operation;

    /// Set the per-channel volume of the sink at `index`.
    fn set_sink_volume_by_index(
        &mut self,
        index: u32,
        volume: &ChannelVolumes,
        callback: SuccessCallback,
    ) -> Self::Operation;

    /// Set the mute flag of the sink at `index`.
    fn set_sink_mute_by_index(
        &mut self,
        index: u32,
        muted: bool,
        callback: SuccessCallback,
    ) -> Self::Operation;

    /// Close the connection.
    fn disconnect(&mut self);
}
