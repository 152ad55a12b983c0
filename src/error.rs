use std::fmt;

use crate::marker::MarkerSet;
use crate::move_record::MoveId;


#[derive(Clone, PartialEq, Eq, Debug)]
pub enum StoreError {
    // The storage backend itself failed (connection lost, constraint violated, etc.).
    Backend(String),
    // Other clients kept changing the markers while we were trying to commit a transition.
    Contention,
    // The store contains something the protocol can never produce.
    Corrupted(String),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RelayError {
    // Neither side can be handed out: a game is already fully assigned or in progress.
    RoleConflict(MarkerSet),
    // The client claims to have seen a move that doesn't exist.
    SyncError { last_seen: i64, max_id: MoveId },
    Persistence(StoreError),
}

// Transport-level input problems. These never reach the relay core.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RequestError {
    NoRequest,
    Ambiguous(Vec<&'static str>),
    MissingParameter(&'static str),
    NotAnInteger { param: &'static str, value: String },
    InvalidPlayer(i64),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Backend(msg) => write!(f, "storage failure: {msg}"),
            StoreError::Contention => write!(f, "too much contention on session markers"),
            StoreError::Corrupted(msg) => write!(f, "corrupted session store: {msg}"),
        }
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::RoleConflict(markers) => {
                write!(f, "Both white and black already assigned (markers: {markers:?})")
            }
            RelayError::SyncError { last_seen, max_id } => write!(
                f,
                "Move synchronization error: last seen move {last_seen}, latest move {max_id}"
            ),
            RelayError::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::NoRequest => write!(f, "Not passed in expected data"),
            RequestError::Ambiguous(params) => {
                write!(f, "Ambiguous request, conflicting parameters: {}", params.join(", "))
            }
            RequestError::MissingParameter(param) => write!(f, "Missing parameter '{param}'"),
            RequestError::NotAnInteger { param, value } => {
                write!(f, "Parameter '{param}' must be an integer, got '{value}'")
            }
            RequestError::InvalidPlayer(n) => write!(f, "Player must be 1 or 2, got {n}"),
        }
    }
}

impl std::error::Error for StoreError {}
impl std::error::Error for RelayError {}
impl std::error::Error for RequestError {}

impl From<StoreError> for RelayError {
    fn from(err: StoreError) -> Self { RelayError::Persistence(err) }
}
