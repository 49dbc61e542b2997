//! Connection manager: drives the context to a terminal state.

use std::sync::mpsc;

use tracing::{debug, error, info};

use crate::backend::{Backend, ContextState};
use crate::error::{PulseError, PulseResult};

/// Client-side view of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not yet ready; the only non-terminal state
    #[default]
    Connecting,
    /// Ready for requests
    Connected,
    /// The connection failed or can no longer become ready
    Error,
}

/// A connection to the audio server and the main loop that serves it.
///
/// All requests go through this type, one at a time: every blocking call
/// takes `&mut self`, so a second operation cannot be issued while one is
/// still being awaited.
pub struct Connection<B: Backend> {
    pub(crate) backend: B,
    state: ConnectionState,
    state_rx: Option<mpsc::Receiver<ContextState>>,
    pub(crate) warn_on_rejection: bool,
}

impl<B: Backend> Connection<B> {
    /// Wrap a backend that has not connected yet.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: ConnectionState::Connecting,
            state_rx: None,
            warn_on_rejection: true,
        }
    }

    /// Log a warning when the server rejects a volume or mute change.
    #[must_use]
    pub fn warn_on_rejection(mut self, enabled: bool) -> Self {
        self.warn_on_rejection = enabled;
        self
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Connect to `server` (or the default server) and block until the
    /// connection is ready or has failed.
    ///
    /// # Errors
    /// Returns [`PulseError::ConnectionFailed`] if the context fails, is
    /// terminated, or reports a state this client does not recognize, and
    /// [`PulseError::MainLoopError`] if the main loop stops first.
    pub fn connect(&mut self, server: Option<&str>) -> PulseResult<()> {
        let (tx, rx) = mpsc::channel();
        self.state = ConnectionState::Connecting;
        self.state_rx = Some(rx);

        info!(server = server.unwrap_or("default"), "Connecting to PulseAudio");
        let started = self.backend.connect(
            server,
            Box::new(move |state: ContextState| {
                let _ = tx.send(state);
            }),
        );
        if let Err(e) = started {
            self.state = ConnectionState::Error;
            return Err(e);
        }

        // The backend may report states before `connect` returns.
        self.apply_state_changes()?;
        while self.state == ConnectionState::Connecting {
            if let Err(e) = self.backend.iterate() {
                self.state = ConnectionState::Error;
                return Err(e);
            }
            self.apply_state_changes()?;
        }

        info!("Connected to PulseAudio");
        Ok(())
    }

    /// Fold every state notification received so far into the connection
    /// state.
    pub(crate) fn apply_state_changes(&mut self) -> PulseResult<()> {
        let Some(rx) = &self.state_rx else {
            return Ok(());
        };
        let changes: Vec<ContextState> = rx.try_iter().collect();

        for change in changes {
            debug!(state = ?change, "Context state changed");
            match change {
                ContextState::Ready => self.state = ConnectionState::Connected,
                ContextState::Failed => {
                    self.state = ConnectionState::Error;
                    return Err(PulseError::ConnectionFailed("Context failed".to_string()));
                }
                ContextState::Terminated => {
                    self.state = ConnectionState::Error;
                    return Err(PulseError::ConnectionFailed(
                        "Context terminated".to_string(),
                    ));
                }
                ContextState::Unconnected
                | ContextState::Connecting
                | ContextState::Authorizing
                | ContextState::SettingName => {}
                ContextState::Unrecognized(raw) => {
                    error!(raw, "Context in unexpected state");
                    self.state = ConnectionState::Error;
                    return Err(PulseError::ConnectionFailed(format!(
                        "Context in unexpected state {raw}"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl<B: Backend> Drop for Connection<B> {
    fn drop(&mut self) {
        if self.state == ConnectionState::Connected {
            self.backend.disconnect();
        } else {
            debug!(state = ?self.state, "Dropping connection that is not ready");
        }
    }
}
