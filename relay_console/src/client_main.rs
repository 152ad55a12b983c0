// Improvement potential: Render the board. The relay doesn't know the rules, so this needs
//   a local chess engine to replay the moves.

use std::io::{self, BufRead};
use std::thread;
use std::time::Duration;

use anyhow::{Context, bail};
use itertools::Itertools;
use log::{debug, info};
use relay_chess::event::{RelayRequest, is_wait_body};
use relay_chess::force::Force;
use relay_chess::move_record::{BoardMove, PlayerMove};
use relay_chess::role_assignment::Readiness;


pub struct ClientConfig {
    pub server_url: String,
    pub poll_interval: Duration,
}

struct RelayClient {
    http: reqwest::blocking::Client,
    server_url: String,
}

impl RelayClient {
    fn send(&self, request: RelayRequest) -> anyhow::Result<String> {
        let response = self
            .http
            .get(&self.server_url)
            .query(&request.to_query_pairs())
            .send()
            .with_context(|| format!("Cannot reach {}", self.server_url))?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            bail!("Server refused {:?} ({}): {}", request, status, body.trim());
        }
        debug!("{:?} -> {}", request, body.trim());
        Ok(body.trim().to_owned())
    }
}

// Accepts "row1 col1 row2 col2", with spaces and/or commas between the numbers.
pub fn parse_board_move(line: &str) -> Result<BoardMove, String> {
    let (row1, col1, row2, col2) = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().map_err(|_| format!("'{s}' is not a number")))
        .collect_tuple()
        .ok_or_else(|| "expected four numbers: row1 col1 row2 col2".to_owned())?;
    Ok(BoardMove::new(row1?, col1?, row2?, col2?))
}

// Returns `None` on end of input.
fn read_board_move(stdin: &mut impl BufRead) -> anyhow::Result<Option<BoardMove>> {
    loop {
        println!("Your move (row1 col1 row2 col2):");
        let mut buffer = String::new();
        if stdin.read_line(&mut buffer)? == 0 {
            return Ok(None);
        }
        match parse_board_move(&buffer) {
            Ok(board_move) => return Ok(Some(board_move)),
            Err(err) => println!("Invalid move: {}", err),
        }
    }
}

pub fn run(config: ClientConfig) -> anyhow::Result<()> {
    let client = RelayClient {
        http: reqwest::blocking::Client::new(),
        server_url: config.server_url,
    };

    let my_force = Force::try_from_str(&client.send(RelayRequest::NewGame)?)
        .map_err(anyhow::Error::msg)?;
    println!("You play {}.", my_force.as_str());

    if client.send(RelayRequest::ReadyToStart)? != Readiness::Go.as_str() {
        println!("Waiting for the opponent to join...");
        while client.send(RelayRequest::ReadyToStart)? != Readiness::Go.as_str() {
            thread::sleep(config.poll_interval);
        }
    }
    println!("Game started.");

    let mut stdin = io::stdin().lock();
    // Id of our own latest move: the opponent's reply is the first move after it.
    let mut last_seen = 0;
    let mut my_turn = my_force == Force::White;
    loop {
        if my_turn {
            let Some(board_move) = read_board_move(&mut stdin)? else {
                info!("End of input, leaving the game");
                return Ok(());
            };
            let request = RelayRequest::SubmitMove { player: my_force, board_move };
            let body = client.send(request)?;
            last_seen = body
                .parse()
                .with_context(|| format!("Server returned '{body}' instead of a move id"))?;
        } else {
            println!("Waiting for the opponent's move...");
            let player_move = loop {
                let body = client.send(RelayRequest::FetchMove { last_seen })?;
                if !is_wait_body(&body) {
                    break PlayerMove::from_wire(&body).map_err(anyhow::Error::msg)?;
                }
                thread::sleep(config.poll_interval);
            };
            if player_move.player == my_force {
                bail!("Expected a move by {}, got our own: {}", my_force.opponent().as_str(), player_move);
            }
            let BoardMove { row1, col1, row2, col2 } = player_move.board_move;
            println!("Opponent moved ({}, {}) -> ({}, {}).", row1, col1, row2, col2);
        }
        my_turn = !my_turn;
    }
}
