// Test utilities shared between unit tests and the integration tests in "tests".

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::server::RelayServer;
use crate::session_store::InMemorySessionStore;


// In theory random tests verify properties that should always hold, but let's fix
// the seed to avoid sporadic failures.
pub fn deterministic_rng() -> StdRng { StdRng::from_seed([0; 32]) }

pub fn seeded_rng(seed: u64) -> StdRng { StdRng::seed_from_u64(seed) }

pub fn in_memory_server() -> (Arc<InMemorySessionStore>, RelayServer<InMemorySessionStore>) {
    let store = Arc::new(InMemorySessionStore::new());
    let server = RelayServer::with_rng(Arc::clone(&store), deterministic_rng());
    (store, server)
}
