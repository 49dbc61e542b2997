//! Blocking operation pump.

use tracing::trace;

use crate::backend::{Backend, OperationState, PendingOperation};
use crate::connection::Connection;
use crate::error::PulseResult;

impl<B: Backend> Connection<B> {
    /// Iterate the main loop until `op` is no longer running.
    ///
    /// Takes the handle by value and releases it before returning, on every
    /// path. There is no timeout: a request the server never answers blocks
    /// forever.
    ///
    /// # Errors
    /// Returns an error if the main loop stops or the connection fails while
    /// the operation is still running.
    pub fn await_operation(&mut self, op: B::Operation) -> PulseResult<OperationState> {
        let mut iterations = 0u32;
        loop {
            let state = op.state();
            if state.is_terminal() {
                trace!(?state, iterations, "Operation finished");
                return Ok(state);
            }
            self.backend.iterate()?;
            self.apply_state_changes()?;
            iterations = iterations.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ContextState;
    use crate::error::PulseError;
    use crate::testing::FakeServer;
    use assert_matches::assert_matches;

    fn connected(server: FakeServer) -> Connection<FakeServer> {
        let mut conn = Connection::new(server);
        conn.connect(None).unwrap();
        conn
    }

    #[test]
    fn test_waits_for_completion_and_releases() {
        let server = FakeServer::new();
        let log = server.log();
        let mut conn = connected(server);

        let op = conn.backend.server_info(Box::new(|_: Option<String>| {}));
        assert_eq!(op.state(), OperationState::Running);

        assert_eq!(conn.await_operation(op).unwrap(), OperationState::Done);
        assert_eq!(log.borrow().created, 1);
        assert_eq!(log.borrow().released, 1);
    }

    #[test]
    fn test_cancelled_operation_is_terminal() {
        let server = FakeServer::new().cancelling_requests();
        let log = server.log();
        let mut conn = connected(server);

        let op = conn.backend.server_info(Box::new(|_: Option<String>| panic!("cancelled request must not answer")));
        assert_eq!(conn.await_operation(op).unwrap(), OperationState::Cancelled);
        assert_eq!(log.borrow().released, 1);
    }

    #[test]
    fn test_context_failure_while_waiting() {
        let server = FakeServer::new().failing_after_connect();
        let log = server.log();
        let mut conn = connected(server);

        let op = conn.backend.server_info(Box::new(|_: Option<String>| {}));
        assert_matches!(conn.await_operation(op), Err(PulseError::ConnectionFailed(_)));
        assert_eq!(log.borrow().released, 1);
        assert_eq!(conn.state(), crate::ConnectionState::Error);
    }

    #[test]
    fn test_stopped_loop_releases_handle() {
        let server = FakeServer::new().with_states(&[ContextState::Ready]).stalling_requests();
        let log = server.log();
        let mut conn = connected(server);

        let op = conn.backend.server_info(Box::new(|_: Option<String>| {}));
        assert_matches!(conn.await_operation(op), Err(PulseError::MainLoopError(_)));
        assert_eq!(log.borrow().created, 1);
        assert_eq!(log.borrow().released, 1);
    }
}
