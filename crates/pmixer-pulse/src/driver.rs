//! Command driver: one run from connection to teardown.

use pmixer_core::{Command, DeviceSnapshot, Mutation, VolumeLimits};
use tracing::{debug, info};

use crate::backend::Backend;
use crate::connection::Connection;
use crate::error::PulseResult;

/// Settings for a single run.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Server to connect to; `None` uses the library default
    pub server: Option<String>,
    /// Step and ceiling for volume changes
    pub limits: VolumeLimits,
    /// Log when the server rejects a mutation
    pub warn_on_rejection: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server: None,
            limits: VolumeLimits::default(),
            warn_on_rejection: true,
        }
    }
}

/// What a run observed and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The default device as resolved before any change
    pub snapshot: DeviceSnapshot,
    /// The mutation issued, if the command made one
    pub applied: Option<Mutation>,
}

/// Connect, resolve the default device, and apply `command` to it.
///
/// Every step runs exactly once. The first failure ends the run before any
/// mutation is issued; the connection is torn down on every path.
///
/// # Errors
/// Returns the first connection or resolution error encountered.
pub fn run<B: Backend>(backend: B, settings: &ClientSettings, command: Command) -> PulseResult<Report> {
    let mut conn = Connection::new(backend).warn_on_rejection(settings.warn_on_rejection);
    conn.connect(settings.server.as_deref())?;

    let snapshot = conn.default_device()?;

    let applied = command.plan(&snapshot, &settings.limits);
    match &applied {
        Some(mutation) => {
            info!(%command, index = mutation.index(), "Applying command");
            conn.apply(mutation)?;
        }
        None => debug!(%command, "Command makes no change"),
    }

    Ok(Report { snapshot, applied })
}
