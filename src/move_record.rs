use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::force::Force;


// Assigned by the move log on insertion. Real ids start at 1; zero is what clients send
// before they've seen anything.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
pub struct MoveId(pub i64);

impl MoveId {
    pub const NONE: MoveId = MoveId(0);
}

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

// Raw coordinates. The relay doesn't know the board, so there are no bounds checks.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct BoardMove {
    pub row1: i64,
    pub col1: i64,
    pub row2: i64,
    pub col2: i64,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct PlayerMove {
    pub player: Force,
    pub board_move: BoardMove,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct MoveRecord {
    pub id: MoveId,
    pub player_move: PlayerMove,
}

impl BoardMove {
    pub fn new(row1: i64, col1: i64, row2: i64, col2: i64) -> Self {
        Self { row1, col1, row2, col2 }
    }
}

impl PlayerMove {
    pub fn new(player: Force, board_move: BoardMove) -> Self { Self { player, board_move } }

    // Parses the `player,row1,col1,row2,col2` wire format.
    pub fn from_wire(s: &str) -> Result<Self, String> {
        let (player, row1, col1, row2, col2) = s
            .trim()
            .split(',')
            .map(|field| {
                field
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| format!("'{field}' is not an integer in move '{s}'"))
            })
            .collect_tuple()
            .ok_or_else(|| format!("expected 5 comma-separated fields in move '{s}'"))?;
        let player = Force::from_player_number(player?)
            .ok_or_else(|| format!("invalid player number in move '{s}'"))?;
        Ok(PlayerMove::new(player, BoardMove::new(row1?, col1?, row2?, col2?)))
    }
}

// The wire format: comma-delimited, so multi-digit coordinates are unambiguous.
impl fmt::Display for PlayerMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let BoardMove { row1, col1, row2, col2 } = self.board_move;
        write!(f, "{},{},{},{},{}", self.player.player_number(), row1, col1, row2, col2)
    }
}
