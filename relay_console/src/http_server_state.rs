use std::sync::Arc;

use relay_chess::error::RelayError;
use relay_chess::server::RelayServer;
use relay_chess::session_store::SessionStore;
use tide::StatusCode;


pub type HttpServerState<S> = Arc<RelayServer<S>>;

pub fn new_state<S: SessionStore>(store: S) -> HttpServerState<S> {
    Arc::new(RelayServer::new(Arc::new(store)))
}

pub fn relay_error_status(err: &RelayError) -> StatusCode {
    match err {
        RelayError::RoleConflict(_) | RelayError::SyncError { .. } => StatusCode::Conflict,
        RelayError::Persistence(_) => StatusCode::InternalServerError,
    }
}
