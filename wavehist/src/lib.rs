// Copyright 2023-2024 The Regents of the University of California
// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

mod bits;
mod history;
mod query;
mod signal;
pub mod signal_utils;
mod trace;

/// Cargo.toml version of this library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Copy, Clone)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct QueryOptions {
    /// Indicates that queries over several signals should use multiple threads.
    pub multi_thread: bool,
    /// Decoding of `x`, `z` and friends inside of bit-vectors.
    pub unknown_bits: UnknownBits,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            multi_thread: true,
            unknown_bits: UnknownBits::TreatAsZero,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("change at {time} comes before the last recorded change at {last}")]
    NonMonotonicTime { last: Time, time: Time },
    #[error("expected a value with {expected} bits, got {actual}")]
    WidthMismatch { expected: u64, actual: u64 },
    #[error("unknown signal {0:?}")]
    UnknownSignal(SignalRef),
    #[error("invalid bit state tag")]
    InvalidBitState(#[from] num_enum::TryFromPrimitiveError<BitState>),
    #[error("invalid bit state character: {0:?}")]
    InvalidBitChar(char),
}

pub type Result<T> = std::result::Result<T, HistoryError>;

pub use bits::{check_states, parse_bit_string, to_bit_string, BitState, States};
pub use history::{
    HistoryChain, HistoryEntry, HistoryIter, HistoryOffset, HistoryValue, Real, Time,
};
pub use query::{decode_scalar, decode_vector, QueryEngine, QueryResult, UnknownBits};
pub use signal::{Signal, SignalRef};
pub use trace::{TimeRange, Timescale, TimescaleUnit, Trace, TraceBuilder};
