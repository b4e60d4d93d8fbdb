// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>
//
// The in-memory trace that a loader fills in and that queries are answered from.

use crate::history::{HistoryValue, Time};
use crate::query::{QueryEngine, QueryResult};
use crate::signal::{Signal, SignalRef};
use crate::{signal_utils, HistoryError, QueryOptions, Result};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct Timescale {
    pub factor: u32,
    pub unit: TimescaleUnit,
}

impl Timescale {
    pub fn new(factor: u32, unit: TimescaleUnit) -> Self {
        Timescale { factor, unit }
    }
}

impl Display for Timescale {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.factor, self.unit.suffix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum TimescaleUnit {
    FemtoSeconds,
    PicoSeconds,
    NanoSeconds,
    MicroSeconds,
    MilliSeconds,
    Seconds,
    Unknown,
}

impl TimescaleUnit {
    /// Power of ten of the unit in seconds, `None` if the loader did not know the unit.
    pub fn to_exponent(&self) -> Option<i8> {
        match self {
            TimescaleUnit::FemtoSeconds => Some(-15),
            TimescaleUnit::PicoSeconds => Some(-12),
            TimescaleUnit::NanoSeconds => Some(-9),
            TimescaleUnit::MicroSeconds => Some(-6),
            TimescaleUnit::MilliSeconds => Some(-3),
            TimescaleUnit::Seconds => Some(0),
            TimescaleUnit::Unknown => None,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            TimescaleUnit::FemtoSeconds => "fs",
            TimescaleUnit::PicoSeconds => "ps",
            TimescaleUnit::NanoSeconds => "ns",
            TimescaleUnit::MicroSeconds => "us",
            TimescaleUnit::MilliSeconds => "ms",
            TimescaleUnit::Seconds => "s",
            TimescaleUnit::Unknown => "?",
        }
    }
}

/// Earliest and latest recorded change over all signals.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeRange {
    pub start: Time,
    pub end: Time,
}

/// A fully imported trace. Histories cannot be modified anymore, which makes concurrent
/// queries safe.
pub struct Trace {
    signals: Vec<Signal>,
    lookup: FxHashMap<String, SignalRef>,
    time_range: Option<TimeRange>,
    timescale: Option<Timescale>,
    engine: QueryEngine,
}

impl Debug for Trace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trace({} signals, {:?})",
            self.signals.len(),
            self.time_range
        )
    }
}

impl Index<SignalRef> for Trace {
    type Output = Signal;

    fn index(&self, index: SignalRef) -> &Self::Output {
        &self.signals[index.index()]
    }
}

impl Trace {
    /// Finds a signal by its name. Vectors can also be found by their name with
    /// bit range, e.g., `tb.cycle[7:0]`.
    pub fn lookup<N: AsRef<str>>(&self, name: N) -> Option<SignalRef> {
        self.lookup.get(name.as_ref()).copied()
    }

    pub fn get(&self, signal: SignalRef) -> Option<&Signal> {
        self.signals.get(signal.index())
    }

    /// Number of signals.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn signals(&self) -> impl ExactSizeIterator<Item = &Signal> {
        self.signals.iter()
    }

    pub fn signal_refs(&self) -> impl ExactSizeIterator<Item = SignalRef> + '_ {
        (0..self.signals.len()).map(|ii| SignalRef::from_index(ii).unwrap())
    }

    /// Returns `None` if no signal has any change.
    pub fn time_range(&self) -> Option<TimeRange> {
        self.time_range
    }

    pub fn timescale(&self) -> Option<Timescale> {
        self.timescale
    }

    pub fn options(&self) -> &QueryOptions {
        self.engine.options()
    }

    pub fn set_options(&mut self, options: QueryOptions) {
        self.engine = QueryEngine::new(options);
    }

    /// Value of `signal` at `time`.
    pub fn query(&self, signal: SignalRef, time: Time) -> QueryResult {
        self.engine.query(&self[signal], time)
    }

    /// Values of several signals at the same point in time.
    pub fn query_many(&self, signals: &[SignalRef], time: Time) -> Vec<QueryResult> {
        if self.options().multi_thread {
            signals
                .par_iter()
                .map(|s| self.query(*s, time))
                .collect::<Vec<_>>()
        } else {
            signals
                .iter()
                .map(|s| self.query(*s, time))
                .collect::<Vec<_>>()
        }
    }

    /// All times at which at least one of `signals` changes, sorted and without duplicates.
    pub fn change_times(&self, signals: &[SignalRef]) -> Vec<Time> {
        signal_utils::all_changes(signals.iter().map(|s| self[*s].history()))
    }

    pub fn size_in_memory(&self) -> usize {
        let base = std::mem::size_of::<Self>();
        let signals = self
            .signals
            .iter()
            .map(|s| s.history().size_in_memory() + s.name().len())
            .sum::<usize>();
        let lookup = self
            .lookup
            .keys()
            .map(|k| k.len() + std::mem::size_of::<(String, SignalRef)>())
            .sum::<usize>();
        base + signals + lookup
    }

    pub fn print_statistics(&self) {
        let changes = self
            .signals
            .iter()
            .map(|s| s.history().len())
            .sum::<usize>();
        println!(
            "[wavehist] {} signals with {} changes in total.",
            self.signals.len(),
            changes
        );
        if let Some(max) = self.signals.iter().max_by_key(|s| s.history().len()) {
            println!(
                "[wavehist] {} has the longest history with {} changes.",
                max.name(),
                max.history().len()
            );
        }
        println!("[wavehist] size in memory: {} bytes", self.size_in_memory());
    }
}

/// Used by loaders to create a [`Trace`]. Changes must be added in time order for every signal.
#[derive(Default)]
pub struct TraceBuilder {
    signals: Vec<Signal>,
    lookup: FxHashMap<String, SignalRef>,
    timescale: Option<Timescale>,
    options: QueryOptions,
}

impl TraceBuilder {
    pub fn new(options: QueryOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn set_timescale(&mut self, timescale: Timescale) {
        self.timescale = Some(timescale);
    }

    pub fn add_signal(&mut self, name: impl Into<String>, msi: i32, lsi: i32) -> SignalRef {
        let signal_ref =
            SignalRef::from_index(self.signals.len()).expect("too many signals for a SignalRef");
        let signal = Signal::new(name, msi, lsi);
        let full_name = signal.full_name();
        if full_name != signal.name() {
            self.register_name(full_name, signal_ref);
        }
        self.register_name(signal.name().to_string(), signal_ref);
        self.signals.push(signal);
        signal_ref
    }

    fn register_name(&mut self, name: String, signal_ref: SignalRef) {
        match self.lookup.entry(name) {
            Entry::Occupied(prev) => log::warn!(
                "{} is already used by {:?}, lookup will return the first signal",
                prev.key(),
                prev.get()
            ),
            Entry::Vacant(slot) => {
                slot.insert(signal_ref);
            }
        }
    }

    /// Records a change. Vector values must either match the signal width or be empty.
    pub fn add_change(&mut self, signal: SignalRef, time: Time, value: HistoryValue) -> Result<()> {
        let s = self
            .signals
            .get_mut(signal.index())
            .ok_or(HistoryError::UnknownSignal(signal))?;
        if let Some(bits) = value.bits() {
            let is_absent = matches!(&value, HistoryValue::Vector(states) if states.is_empty());
            if bits as u64 != s.width() && !is_absent {
                return Err(HistoryError::WidthMismatch {
                    expected: s.width(),
                    actual: bits as u64,
                });
            }
        }
        s.history_mut().push(time, value).inspect_err(|e| {
            log::warn!("rejected change of {}: {e}", s.name());
        })
    }

    pub fn finish(self) -> Trace {
        let time_range = compute_time_range(&self.signals);
        log::debug!(
            "finished trace with {} signals, time range {time_range:?}",
            self.signals.len()
        );
        Trace {
            signals: self.signals,
            lookup: self.lookup,
            time_range,
            timescale: self.timescale,
            engine: QueryEngine::new(self.options),
        }
    }
}

fn compute_time_range(signals: &[Signal]) -> Option<TimeRange> {
    let start = signals
        .iter()
        .filter_map(|s| s.history().first_time())
        .min()?;
    let end = signals
        .iter()
        .filter_map(|s| s.history().last_time())
        .max()?;
    Some(TimeRange { start, end })
}
