#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod error;
pub mod event;
pub mod force;
pub mod marker;
pub mod move_record;
pub mod move_relay;
pub mod network;
pub mod role_assignment;
pub mod server;
pub mod session_store;
pub mod test_util;

pub use error::{RelayError, RequestError, StoreError};
pub use event::{RelayRequest, RelayResponse};
pub use force::Force;
pub use marker::{Marker, MarkerSet};
pub use move_record::{BoardMove, MoveId, MoveRecord, PlayerMove};
pub use move_relay::{FetchOutcome, MoveRelay};
pub use role_assignment::{Readiness, RoleAssignment};
pub use server::RelayServer;
pub use session_store::{InMemorySessionStore, MarkerStore, MoveLog, SessionStore};
