use enum_map::Enum;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::EnumIter;


#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Enum, EnumIter, Serialize, Deserialize,
)]
pub enum Force {
    White,
    Black,
}

impl Force {
    pub fn opponent(self) -> Force {
        match self {
            Force::White => Force::Black,
            Force::Black => Force::White,
        }
    }

    // Player numbers as stored in the move log: white moves first and is player 1.
    pub fn player_number(self) -> i64 {
        match self {
            Force::White => 1,
            Force::Black => 2,
        }
    }
    pub fn from_player_number(n: i64) -> Option<Force> {
        match n {
            1 => Some(Force::White),
            2 => Some(Force::Black),
            _ => None,
        }
    }

    // Don't use `Display` because this is the wire format, not for human consumption.
    pub fn as_str(self) -> &'static str {
        match self {
            Force::White => "white",
            Force::Black => "black",
        }
    }
    pub fn try_from_str(s: &str) -> Result<Self, String> {
        match s {
            "white" => Ok(Force::White),
            "black" => Ok(Force::Black),
            _ => Err(format!("failed to parse '{s}' as Force")),
        }
    }

    pub fn random(rng: &mut impl Rng) -> Force {
        if rng.random_bool(0.5) { Force::White } else { Force::Black }
    }
}
