use itertools::Itertools;
use log::{error, info, warn};
use relay_chess::error::RelayError;
use relay_chess::event::RelayRequest;
use relay_chess::network;
use relay_chess::session_store::{InMemorySessionStore, MarkerStore, SessionStore};
use tide::StatusCode;

use crate::database::SqlxDatabase;
use crate::http_server_state::*;
use crate::server_config::{DatabaseOptions, ServerConfig};


async fn handle_relay_request<S: SessionStore + 'static>(
    req: tide::Request<HttpServerState<S>>,
) -> tide::Result {
    let peer = req.peer_addr().unwrap_or("unknown").to_owned();
    let request = RelayRequest::from_query_pairs(req.url().query_pairs().collect_vec())
        .map_err(|err| {
            warn!("Rejected request from {}: {}", peer, err);
            tide::Error::from_str(StatusCode::BadRequest, err.to_string())
        })?;
    match req.state().handle(request).await {
        Ok(response) => {
            let mut resp = tide::Response::new(StatusCode::Ok);
            resp.set_content_type(tide::http::mime::PLAIN);
            resp.set_body(response.to_body());
            Ok(resp)
        }
        Err(err) => {
            match &err {
                RelayError::Persistence(_) => error!("{:?} from {} failed: {}", request, peer, err),
                _ => warn!("{:?} from {} failed: {}", request, peer, err),
            }
            Err(tide::Error::from_str(relay_error_status(&err), err.to_string()))
        }
    }
}

fn new_app<S: SessionStore + 'static>(
    route: &str, state: HttpServerState<S>,
) -> tide::Server<HttpServerState<S>> {
    let mut app = tide::with_state(state);

    app.with(tide::utils::After(|mut res: tide::Response| async {
        if let Some(err) = res.error() {
            let msg = format!("Error: {}", err);
            res.set_status(err.status());
            res.set_body(msg);
        }
        Ok(res)
    }));

    app.at(route).get(handle_relay_request);
    app
}

fn run_tide<S: SessionStore + 'static>(config: ServerConfig, state: HttpServerState<S>) {
    let app = new_app(&config.route, state);
    let address = format!("{}:{}", config.listen_address, config.port);
    info!(
        "Serving the relay at {}",
        network::server_url(&config.listen_address, config.port, &config.route)
    );
    async_std::task::block_on(async { app.listen(address).await })
        .expect("Failed to start the tide server");
}

pub fn run(config: ServerConfig) {
    ctrlc::set_handler(|| {
        info!("Terminating");
        std::process::exit(0);
    })
    .expect("Error setting Ctrl-C handler");

    match config.database_options.clone() {
        DatabaseOptions::InMemory => {
            warn!("Using in-memory storage: games will not survive a restart");
            run_tide(config, new_state(InMemorySessionStore::new()))
        }
        DatabaseOptions::Sqlite(address) => {
            let db = SqlxDatabase::<sqlx::Sqlite>::new(&address)
                .unwrap_or_else(|err| panic!("Cannot connect to SQLite DB {address}: {err}"));
            async_std::task::block_on(db.create_tables()).expect("Cannot create tables");
            run_tide(config, new_state(db))
        }
        DatabaseOptions::Postgres(address) => {
            let db = SqlxDatabase::<sqlx::Postgres>::new(&address)
                .unwrap_or_else(|err| panic!("Cannot connect to Postgres DB {address}: {err}"));
            async_std::task::block_on(db.create_tables()).expect("Cannot create tables");
            run_tide(config, new_state(db))
        }
    }
}

// Drops all session markers so that a new game can be requested. Move history is kept.
pub fn reset(config: ServerConfig) -> anyhow::Result<()> {
    match config.database_options {
        DatabaseOptions::InMemory => {
            warn!("In-memory storage is reset by restarting the server; nothing to do");
            return Ok(());
        }
        DatabaseOptions::Sqlite(address) => {
            let db = SqlxDatabase::<sqlx::Sqlite>::new(&address)?;
            async_std::task::block_on(async {
                db.create_tables().await?;
                db.clean().await.map_err(anyhow::Error::from)
            })?;
        }
        DatabaseOptions::Postgres(address) => {
            let db = SqlxDatabase::<sqlx::Postgres>::new(&address)?;
            async_std::task::block_on(async {
                db.create_tables().await?;
                db.clean().await.map_err(anyhow::Error::from)
            })?;
        }
    }
    info!("Session markers cleared");
    Ok(())
}
