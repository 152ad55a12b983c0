use std::fmt;

use enum_map::{Enum, EnumMap};
use itertools::Itertools;
use strum::{EnumIter, IntoEnumIterator};

use crate::force::Force;


// Shared session flags. Note the somewhat inverted meaning of "taken": when a fresh game is
// requested both "taken" markers are raised, and each one is lowered again when a client
// claims that side. A raised "taken" marker therefore means "reserved, waiting for a client".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Enum, EnumIter)]
pub enum Marker {
    WhiteTaken,
    BlackTaken,
    WhiteAwaitingFirstMove,
    BlackAwaitingFirstMove,
}

impl Marker {
    pub fn taken(force: Force) -> Marker {
        match force {
            Force::White => Marker::WhiteTaken,
            Force::Black => Marker::BlackTaken,
        }
    }
    pub fn awaiting_first_move(force: Force) -> Marker {
        match force {
            Force::White => Marker::WhiteAwaitingFirstMove,
            Force::Black => Marker::BlackAwaitingFirstMove,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Marker::WhiteTaken => "white_taken",
            Marker::BlackTaken => "black_taken",
            Marker::WhiteAwaitingFirstMove => "white_awaiting_first_move",
            Marker::BlackAwaitingFirstMove => "black_awaiting_first_move",
        }
    }

    // Stable across releases: persisted in the database.
    pub fn bit(self) -> i64 {
        match self {
            Marker::WhiteTaken => 1 << 0,
            Marker::BlackTaken => 1 << 1,
            Marker::WhiteAwaitingFirstMove => 1 << 2,
            Marker::BlackAwaitingFirstMove => 1 << 3,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MarkerSet {
    flags: EnumMap<Marker, bool>,
}

impl MarkerSet {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, marker: Marker) -> Self {
        self.insert(marker);
        self
    }
    pub fn without(mut self, marker: Marker) -> Self {
        self.remove(marker);
        self
    }

    pub fn contains(&self, marker: Marker) -> bool { self.flags[marker] }
    pub fn insert(&mut self, marker: Marker) { self.flags[marker] = true; }
    pub fn remove(&mut self, marker: Marker) { self.flags[marker] = false; }
    pub fn is_empty(&self) -> bool { self.flags.values().all(|&f| !f) }

    pub fn iter(&self) -> impl Iterator<Item = Marker> + '_ {
        Marker::iter().filter(|&m| self.contains(m))
    }

    pub fn to_bits(&self) -> i64 { self.iter().map(Marker::bit).fold(0, |acc, b| acc | b) }

    // Unknown bits are rejected rather than dropped: they mean the store was written by
    // something that doesn't speak this protocol.
    pub fn try_from_bits(bits: i64) -> Result<Self, String> {
        let known = Marker::iter().map(Marker::bit).fold(0, |acc, b| acc | b);
        if bits & !known != 0 {
            return Err(format!("unknown marker bits in {bits:#x}"));
        }
        let mut set = MarkerSet::new();
        for marker in Marker::iter() {
            if bits & marker.bit() != 0 {
                set.insert(marker);
            }
        }
        Ok(set)
    }
}

impl fmt::Debug for MarkerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.iter().map(Marker::name).join(", "))
    }
}
