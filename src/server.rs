use std::sync::Arc;

use rand::rngs::StdRng;

use crate::error::RelayError;
use crate::event::{RelayRequest, RelayResponse};
use crate::move_relay::{FetchOutcome, MoveRelay};
use crate::role_assignment::RoleAssignment;
use crate::session_store::SessionStore;


// Stateless request dispatcher: everything that outlives a request lives in the store.
pub struct RelayServer<S> {
    roles: RoleAssignment<S>,
    moves: MoveRelay<S>,
}

impl<S: SessionStore> RelayServer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            roles: RoleAssignment::new(Arc::clone(&store)),
            moves: MoveRelay::new(store),
        }
    }

    pub fn with_rng(store: Arc<S>, rng: StdRng) -> Self {
        Self {
            roles: RoleAssignment::with_rng(Arc::clone(&store), rng),
            moves: MoveRelay::new(store),
        }
    }

    pub fn roles(&self) -> &RoleAssignment<S> { &self.roles }
    pub fn moves(&self) -> &MoveRelay<S> { &self.moves }

    pub async fn handle(&self, request: RelayRequest) -> Result<RelayResponse, RelayError> {
        match request {
            RelayRequest::NewGame => self.roles.request_new_game().await.map(RelayResponse::Assigned),
            RelayRequest::ReadyToStart => {
                self.roles.check_ready_to_start().await.map(RelayResponse::Readiness)
            }
            RelayRequest::SubmitMove { player, board_move } => {
                self.moves.submit_move(player, board_move).await.map(RelayResponse::MoveStored)
            }
            RelayRequest::FetchMove { last_seen } => {
                Ok(match self.moves.fetch_opponent_move(last_seen).await? {
                    FetchOutcome::Move(record) => RelayResponse::OpponentMove(record.player_move),
                    FetchOutcome::Wait => RelayResponse::Wait,
                })
            }
        }
    }
}
