// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>
//
// Point-in-time value queries against a signal history.

use crate::bits::{check_states, to_bit_string, BitState, States};
use crate::history::{HistoryEntry, HistoryValue, Real, Time};
use crate::signal::Signal;
use crate::QueryOptions;
use std::fmt::{Display, Formatter};

/// How non-binary bits inside of a bit-vector are decoded.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum UnknownBits {
    /// Every bit that is not a strong `1` contributes a `0`.
    #[default]
    TreatAsZero,
    /// Any bit that is not `0` or `1` turns the result into [`QueryResult::PartiallyUnknown`].
    Propagate,
}

/// Decoded value of a signal at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// No defined value at or before the query time.
    Unknown,
    Scalar(BitState),
    /// Bit-vector of at most 64 bits.
    Vector(u64),
    /// Decimal representation of a bit-vector wider than 64 bits.
    WideVector(String),
    /// Bit string of a vector that contains non-binary bits.
    PartiallyUnknown(String),
    Real(Real),
}

impl QueryResult {
    pub fn is_unknown(&self) -> bool {
        matches!(self, QueryResult::Unknown)
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            QueryResult::Vector(value) => Some(*value),
            QueryResult::Scalar(BitState::Zero) => Some(0),
            QueryResult::Scalar(BitState::One) => Some(1),
            _ => None,
        }
    }
}

impl Display for QueryResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryResult::Unknown => write!(f, "X"),
            QueryResult::Scalar(state) => write!(f, "{}", state.to_char()),
            QueryResult::Vector(value) => write!(f, "{value}"),
            QueryResult::WideVector(value) => write!(f, "{value}"),
            QueryResult::PartiallyUnknown(bits) => write!(f, "{bits}"),
            QueryResult::Real(value) => write!(f, "{value}"),
        }
    }
}

/// Answers "what was the value of signal S at time T" queries. Never modifies the history.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryEngine {
    options: QueryOptions,
}

impl QueryEngine {
    pub fn new(options: QueryOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Returns the value of `signal` at `time`, decoded according to the signal width.
    pub fn query(&self, signal: &Signal, time: Time) -> QueryResult {
        let entry = signal.history().find_at(time);
        if signal.is_scalar() {
            decode_scalar(entry)
        } else {
            decode_vector(entry, signal.width(), self.options.unknown_bits)
        }
    }
}

/// Decodes the value of a 1-bit signal.
pub fn decode_scalar(entry: Option<&HistoryEntry>) -> QueryResult {
    let Some(entry) = entry else {
        return QueryResult::Unknown;
    };
    match &entry.value {
        HistoryValue::Scalar(state) => QueryResult::Scalar(*state),
        HistoryValue::Vector(states) => match states.first() {
            Some(state) => QueryResult::Scalar(*state),
            None => QueryResult::Unknown,
        },
        HistoryValue::Real(value) => QueryResult::Real(*value),
    }
}

/// Decodes exactly `width` bits, MSB first, into an unsigned integer.
/// Negative entry times mark invalid entries. A payload with less than `width` bits
/// results in [`QueryResult::Unknown`].
pub fn decode_vector(
    entry: Option<&HistoryEntry>,
    width: u64,
    unknown_bits: UnknownBits,
) -> QueryResult {
    let entry = match entry {
        Some(entry) if entry.time >= 0 => entry,
        _ => return QueryResult::Unknown,
    };
    let states: &[BitState] = match &entry.value {
        HistoryValue::Real(value) => return QueryResult::Real(*value),
        HistoryValue::Scalar(state) => std::slice::from_ref(state),
        HistoryValue::Vector(states) => &states[..],
    };
    let Ok(width) = usize::try_from(width) else {
        return QueryResult::Unknown;
    };
    if width == 0 || states.len() < width {
        return QueryResult::Unknown;
    }
    let states = &states[..width];

    if unknown_bits == UnknownBits::Propagate && check_states(states) != States::Two {
        return QueryResult::PartiallyUnknown(to_bit_string(states));
    }

    if width <= u64::BITS as usize {
        let mut value = 0u64;
        for (ii, state) in states.iter().enumerate() {
            if *state == BitState::One {
                value |= 1u64 << (width - 1 - ii);
            }
        }
        QueryResult::Vector(value)
    } else {
        QueryResult::WideVector(to_decimal_string(states))
    }
}

/// Arbitrary width unsigned conversion, only `1` bits count.
fn to_decimal_string(states: &[BitState]) -> String {
    // little endian decimal digits
    let mut digits: Vec<u8> = vec![0];
    for state in states.iter() {
        let mut carry = (*state == BitState::One) as u8;
        for digit in digits.iter_mut() {
            let d = *digit * 2 + carry;
            *digit = d % 10;
            carry = d / 10;
        }
        if carry > 0 {
            digits.push(carry);
        }
    }
    digits.iter().rev().map(|d| (b'0' + d) as char).collect()
}
