// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::{HistoryError, Result};
use num_enum::TryFromPrimitive;
use std::fmt::{Display, Formatter};

/// Symbolic state of a single bit.
/// The discriminants follow the tag layout of gtkwave derived loaders
/// which is why `One` does not directly follow `Zero`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, TryFromPrimitive)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum BitState {
    Zero = 0,
    X = 1,
    Z = 2,
    One = 3,
    H = 4,
    U = 5,
    W = 6,
    L = 7,
    Dash = 8,
}

/// indexed by tag
const BIT_STATE_LOOKUP: [char; 9] = ['0', 'x', 'z', '1', 'h', 'u', 'w', 'l', '-'];

impl BitState {
    pub const ALL: [BitState; 9] = [
        BitState::Zero,
        BitState::X,
        BitState::Z,
        BitState::One,
        BitState::H,
        BitState::U,
        BitState::W,
        BitState::L,
        BitState::Dash,
    ];

    #[inline]
    pub fn to_char(self) -> char {
        BIT_STATE_LOOKUP[self as usize]
    }

    pub fn from_char(c: char) -> Result<Self> {
        let state = match c {
            '0' => BitState::Zero,
            '1' => BitState::One,
            'x' | 'X' => BitState::X,
            'z' | 'Z' => BitState::Z,
            'h' | 'H' => BitState::H,
            'u' | 'U' => BitState::U,
            'w' | 'W' => BitState::W,
            'l' | 'L' => BitState::L,
            '-' => BitState::Dash,
            other => return Err(HistoryError::InvalidBitChar(other)),
        };
        Ok(state)
    }

    /// Decodes a raw tag as found in a loader's per-bit byte buffer.
    pub fn from_tag(tag: u8) -> Result<Self> {
        Ok(Self::try_from_primitive(tag)?)
    }

    #[inline]
    pub fn is_binary(self) -> bool {
        matches!(self, BitState::Zero | BitState::One)
    }

    /// Minimal number of states required to represent this bit.
    #[inline]
    pub fn states(self) -> States {
        match self {
            BitState::Zero | BitState::One => States::Two,
            BitState::X | BitState::Z => States::Four,
            _ => States::Nine,
        }
    }
}

impl Display for BitState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Parses a bit string like `"01xz"`, MSB first.
pub fn parse_bit_string(value: &str) -> Result<Vec<BitState>> {
    value.chars().map(BitState::from_char).collect()
}

/// Renders states MSB first using the lower-case characters of [`BitState::to_char`].
pub fn to_bit_string(states: &[BitState]) -> String {
    states.iter().map(|s| s.to_char()).collect()
}

/// Number of states a vector needs per bit.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum States {
    #[default]
    Two = 0,
    Four = 1,
    Nine = 2,
}

impl States {
    pub fn join(a: Self, b: Self) -> Self {
        std::cmp::max(a, b)
    }
}

/// Returns the smallest state set that can represent all bits.
pub fn check_states(states: &[BitState]) -> States {
    let mut out = States::Two;
    for s in states.iter() {
        out = States::join(out, s.states());
        if out == States::Nine {
            break;
        }
    }
    out
}
