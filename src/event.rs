use std::collections::HashMap;

use itertools::Itertools;

use crate::error::RequestError;
use crate::force::Force;
use crate::move_record::{BoardMove, MoveId, PlayerMove};
use crate::role_assignment::Readiness;


pub const NEW_GAME_PARAM: &str = "newGame";
pub const READY_TO_START_PARAM: &str = "readyToStart";
pub const FETCH_ID_PARAM: &str = "id";
pub const PLAYER_PARAM: &str = "player";
pub const MOVE_PARAMS: [&str; 4] = ["row1", "col1", "row2", "col2"];

const KNOWN_PARAMS: [&str; 8] = [
    NEW_GAME_PARAM,
    READY_TO_START_PARAM,
    FETCH_ID_PARAM,
    PLAYER_PARAM,
    MOVE_PARAMS[0],
    MOVE_PARAMS[1],
    MOVE_PARAMS[2],
    MOVE_PARAMS[3],
];

const WAIT_BODY: &str = "WAIT";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RelayRequest {
    NewGame,
    ReadyToStart,
    SubmitMove { player: Force, board_move: BoardMove },
    FetchMove { last_seen: i64 },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RelayResponse {
    Assigned(Force),
    Readiness(Readiness),
    MoveStored(MoveId),
    OpponentMove(PlayerMove),
    Wait,
}

impl RelayRequest {
    // Decodes query parameters. Exactly one request shape must be present: flag presence
    // alone is enough for `newGame` and `readyToStart`, the value is ignored.
    pub fn from_query_pairs<K, V>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, RequestError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = HashMap::new();
        for (key, value) in pairs {
            // Unknown parameters are ignored, but a known one given twice has no single meaning.
            let Some(&param) = KNOWN_PARAMS.iter().find(|&&p| p == key.as_ref()) else {
                continue;
            };
            if params.insert(param, value.as_ref().to_owned()).is_some() {
                return Err(RequestError::Ambiguous(vec![param, param]));
            }
        }
        let has = |name: &str| params.contains_key(name);
        let has_move_params = has(PLAYER_PARAM) || MOVE_PARAMS.iter().any(|p| has(p));
        let shapes = [
            (NEW_GAME_PARAM, has(NEW_GAME_PARAM)),
            (READY_TO_START_PARAM, has(READY_TO_START_PARAM)),
            (FETCH_ID_PARAM, has(FETCH_ID_PARAM)),
            (PLAYER_PARAM, has_move_params),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect_vec();
        match shapes.as_slice() {
            [] => Err(RequestError::NoRequest),
            [NEW_GAME_PARAM] => Ok(RelayRequest::NewGame),
            [READY_TO_START_PARAM] => Ok(RelayRequest::ReadyToStart),
            [FETCH_ID_PARAM] => Ok(RelayRequest::FetchMove {
                last_seen: parse_int(&params, FETCH_ID_PARAM)?,
            }),
            [PLAYER_PARAM] => {
                let player_number = parse_int(&params, PLAYER_PARAM)?;
                let player = Force::from_player_number(player_number)
                    .ok_or(RequestError::InvalidPlayer(player_number))?;
                let [row1, col1, row2, col2] = MOVE_PARAMS;
                Ok(RelayRequest::SubmitMove {
                    player,
                    board_move: BoardMove::new(
                        parse_int(&params, row1)?,
                        parse_int(&params, col1)?,
                        parse_int(&params, row2)?,
                        parse_int(&params, col2)?,
                    ),
                })
            }
            _ => Err(RequestError::Ambiguous(shapes)),
        }
    }

    // Inverse of `from_query_pairs`, used by the client.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            RelayRequest::NewGame => vec![(NEW_GAME_PARAM, String::new())],
            RelayRequest::ReadyToStart => vec![(READY_TO_START_PARAM, String::new())],
            RelayRequest::FetchMove { last_seen } => vec![(FETCH_ID_PARAM, last_seen.to_string())],
            RelayRequest::SubmitMove { player, board_move } => {
                let BoardMove { row1, col1, row2, col2 } = *board_move;
                let [row1_param, col1_param, row2_param, col2_param] = MOVE_PARAMS;
                vec![
                    (PLAYER_PARAM, player.player_number().to_string()),
                    (row1_param, row1.to_string()),
                    (col1_param, col1.to_string()),
                    (row2_param, row2.to_string()),
                    (col2_param, col2.to_string()),
                ]
            }
        }
    }
}

fn parse_int(params: &HashMap<&str, String>, param: &'static str) -> Result<i64, RequestError> {
    let value = params.get(param).ok_or(RequestError::MissingParameter(param))?;
    value.trim().parse().map_err(|_| RequestError::NotAnInteger { param, value: value.clone() })
}

impl RelayResponse {
    pub fn to_body(&self) -> String {
        match self {
            RelayResponse::Assigned(force) => force.as_str().to_owned(),
            RelayResponse::Readiness(readiness) => readiness.as_str().to_owned(),
            RelayResponse::MoveStored(id) => id.to_string(),
            RelayResponse::OpponentMove(player_move) => player_move.to_string(),
            RelayResponse::Wait => WAIT_BODY.to_owned(),
        }
    }
}

pub fn is_wait_body(body: &str) -> bool { body.trim() == WAIT_BODY }
