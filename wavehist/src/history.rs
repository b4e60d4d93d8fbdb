// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::bits::{to_bit_string, BitState};
use crate::{HistoryError, Result};
use std::fmt::{Debug, Display, Formatter};

pub type Real = f64;
/// Simulation time. Signed since loaders use negative times as sentinels.
pub type Time = i64;

/// The value recorded by a single transition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum HistoryValue {
    Scalar(BitState),
    /// Per-bit states, MSB first. An empty payload means that no vector data is available.
    Vector(Box<[BitState]>),
    Real(Real),
}

impl HistoryValue {
    pub fn vector(states: impl Into<Box<[BitState]>>) -> Self {
        HistoryValue::Vector(states.into())
    }

    /// Encodes the lower `bits` bits of `value` as a binary vector.
    pub fn from_unsigned(value: u64, bits: u32) -> Self {
        let states: Vec<_> = (0..bits)
            .rev()
            .map(|ii| {
                if ii < u64::BITS && (value >> ii) & 1 == 1 {
                    BitState::One
                } else {
                    BitState::Zero
                }
            })
            .collect();
        HistoryValue::vector(states)
    }

    /// Returns the number of bits. Returns None for reals.
    pub fn bits(&self) -> Option<usize> {
        match self {
            HistoryValue::Scalar(_) => Some(1),
            HistoryValue::Vector(states) => Some(states.len()),
            HistoryValue::Real(_) => None,
        }
    }

    /// Per-bit view of a bit-vector or scalar value. Returns None for reals.
    pub fn states(&self) -> Option<&[BitState]> {
        match self {
            HistoryValue::Scalar(state) => Some(std::slice::from_ref(state)),
            HistoryValue::Vector(states) => Some(&states[..]),
            HistoryValue::Real(_) => None,
        }
    }
}

impl Display for HistoryValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryValue::Scalar(state) => write!(f, "{state}"),
            HistoryValue::Vector(states) => write!(f, "{}", to_bit_string(states)),
            HistoryValue::Real(value) => write!(f, "{value}"),
        }
    }
}

/// One value change.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryEntry {
    pub time: Time,
    pub value: HistoryValue,
}

impl HistoryEntry {
    pub fn new(time: Time, value: HistoryValue) -> Self {
        Self { time, value }
    }
}

/// Append-only list of value changes of a single signal, sorted by time.
/// Deserialized chains go through [`HistoryChain::try_from`] and are checked for time order.
#[derive(Default, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde1",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<HistoryEntry>", into = "Vec<HistoryEntry>")
)]
pub struct HistoryChain {
    entries: Vec<HistoryEntry>,
}

impl Debug for HistoryChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.first_time(), self.last_time()) {
            (Some(first), Some(last)) => write!(
                f,
                "HistoryChain({} changes, {first}..={last})",
                self.entries.len()
            ),
            _ => write!(f, "HistoryChain(empty)"),
        }
    }
}

impl HistoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Adds a change to the end of the chain.
    /// Entries must arrive in non-decreasing time order, we never re-sort.
    pub fn append(&mut self, entry: HistoryEntry) -> Result<()> {
        if let Some(last) = self.last_time() {
            if entry.time < last {
                return Err(HistoryError::NonMonotonicTime {
                    last,
                    time: entry.time,
                });
            }
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn push(&mut self, time: Time, value: HistoryValue) -> Result<()> {
        self.append(HistoryEntry::new(time, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn first_time(&self) -> Option<Time> {
        self.entries.first().map(|e| e.time)
    }

    pub fn last_time(&self) -> Option<Time> {
        self.entries.last().map(|e| e.time)
    }

    pub fn iter(&self) -> HistoryIter<'_> {
        HistoryIter::new(self)
    }

    /// Returns the entry that is in effect at `time`, i.e., the last entry at or before `time`.
    pub fn find_at(&self, time: Time) -> Option<&HistoryEntry> {
        self.find_index(time).map(|ii| &self.entries[ii])
    }

    /// Index of the last entry with `entry.time <= time`.
    pub fn find_index(&self, time: Time) -> Option<usize> {
        self.offset_at(time).map(|o| o.last())
    }

    /// Forward scan that stops at the first entry after `time`.
    /// Linear in the number of entries, mostly useful as a reference for [`Self::find_at`].
    pub fn find_at_linear(&self, time: Time) -> Option<&HistoryEntry> {
        let mut result = None;
        for entry in self.entries.iter() {
            if entry.time > time {
                break;
            }
            result = Some(entry);
        }
        result
    }

    /// Returns the offset of the nearest change at or before `time`.
    /// Returns `None` if there is no change at or before `time`.
    pub fn offset_at(&self, time: Time) -> Option<HistoryOffset> {
        match self.entries.first() {
            None => None,
            Some(first) if first.time > time => None,
            _ => Some(find_offset(&self.entries, time)),
        }
    }

    pub fn size_in_memory(&self) -> usize {
        let base = std::mem::size_of::<Self>();
        let entries = self.entries.capacity() * std::mem::size_of::<HistoryEntry>();
        let vectors = self
            .entries
            .iter()
            .map(|e| match &e.value {
                HistoryValue::Vector(states) => states.len() * std::mem::size_of::<BitState>(),
                _ => 0,
            })
            .sum::<usize>();
        base + entries + vectors
    }
}

impl TryFrom<Vec<HistoryEntry>> for HistoryChain {
    type Error = HistoryError;

    fn try_from(entries: Vec<HistoryEntry>) -> Result<Self> {
        let mut chain = Self::with_capacity(entries.len());
        for entry in entries {
            chain.append(entry)?;
        }
        Ok(chain)
    }
}

impl From<HistoryChain> for Vec<HistoryEntry> {
    fn from(chain: HistoryChain) -> Self {
        chain.entries
    }
}

impl<'a> IntoIterator for &'a HistoryChain {
    type Item = &'a HistoryEntry;
    type IntoIter = HistoryIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct HistoryIter<'a> {
    chain: &'a HistoryChain,
    offset: usize,
}

impl<'a> HistoryIter<'a> {
    fn new(chain: &'a HistoryChain) -> Self {
        Self { chain, offset: 0 }
    }
}

impl<'a> Iterator for HistoryIter<'a> {
    type Item = &'a HistoryEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.chain.entries.get(self.offset)?;
        self.offset += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.chain.entries.len() - self.offset;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HistoryIter<'_> {}

#[derive(Debug, Eq, PartialEq, Clone)]
pub struct HistoryOffset {
    /// Index of the first entry at the time requested (or earlier).
    pub start: usize,
    /// Number of entries that share the same time. This is usually 1.
    /// Greater when there are delta cycles.
    pub elements: usize,
    /// Indicates that the offset exactly matches the time requested.
    /// If false, then we are matching an earlier time step.
    pub time_match: bool,
    /// Time of the next change.
    pub next_time: Option<Time>,
}

impl HistoryOffset {
    /// Index of the entry that wins when several entries share a time.
    #[inline]
    pub fn last(&self) -> usize {
        self.start + self.elements - 1
    }
}

/// Finds the entries with the largest time that is the same or less than the needle.
/// `entries` must be non-empty, sorted, and its first time must not be larger than the needle.
fn find_offset(entries: &[HistoryEntry], needle: Time) -> HistoryOffset {
    debug_assert!(!entries.is_empty(), "empty history");

    let res = binary_search(entries, needle);
    let res_time = entries[res].time;

    // find start
    let mut start = res;
    while start > 0 && entries[start - 1].time == res_time {
        start -= 1;
    }
    // find number of elements
    let mut elements = 1;
    while start + elements < entries.len() && entries[start + elements].time == res_time {
        elements += 1;
    }

    let next_time = entries.get(start + elements).map(|e| e.time);

    HistoryOffset {
        start,
        elements,
        time_match: res_time == needle,
        next_time,
    }
}

#[inline]
fn binary_search(entries: &[HistoryEntry], needle: Time) -> usize {
    debug_assert!(entries[0].time <= needle);
    let mut lower_idx = 0usize;
    let mut upper_idx = entries.len() - 1;
    while lower_idx <= upper_idx {
        let mid_idx = lower_idx + ((upper_idx - lower_idx) / 2);

        match entries[mid_idx].time.cmp(&needle) {
            std::cmp::Ordering::Less => {
                lower_idx = mid_idx + 1;
            }
            std::cmp::Ordering::Equal => {
                return mid_idx;
            }
            std::cmp::Ordering::Greater => {
                // entries[0] <= needle, thus mid_idx > 0
                upper_idx = mid_idx - 1;
            }
        }
    }
    lower_idx - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scalar(c: char) -> HistoryValue {
        HistoryValue::Scalar(BitState::from_char(c).unwrap())
    }

    fn chain_of(changes: &[(Time, char)]) -> HistoryChain {
        let mut chain = HistoryChain::new();
        for (time, c) in changes.iter() {
            chain.push(*time, scalar(*c)).unwrap();
        }
        chain
    }

    #[test]
    fn test_append_rejects_earlier_time() {
        let mut chain = chain_of(&[(0, '0'), (5, '1')]);
        let err = chain.push(4, scalar('0')).unwrap_err();
        assert!(matches!(err, HistoryError::NonMonotonicTime { last: 5, time: 4 }));
        assert_eq!(chain.len(), 2);
        // ties are fine
        chain.push(5, scalar('x')).unwrap();
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_try_from_entries() {
        let sorted = vec![
            HistoryEntry::new(0, scalar('0')),
            HistoryEntry::new(3, scalar('1')),
            HistoryEntry::new(3, scalar('x')),
        ];
        let chain = HistoryChain::try_from(sorted.clone()).unwrap();
        assert_eq!(chain.find_at(4).unwrap().value, scalar('x'));
        let entries: Vec<HistoryEntry> = chain.into();
        assert_eq!(entries, sorted);

        let unsorted = vec![
            HistoryEntry::new(3, scalar('1')),
            HistoryEntry::new(0, scalar('0')),
        ];
        assert!(matches!(
            HistoryChain::try_from(unsorted),
            Err(HistoryError::NonMonotonicTime { last: 3, time: 0 })
        ));
    }

    #[test]
    fn test_find_at() {
        let chain = chain_of(&[(0, '0'), (2, '1'), (6, '0')]);
        assert_eq!(chain.find_at(-1), None);
        assert_eq!(chain.find_index(0), Some(0));
        assert_eq!(chain.find_index(1), Some(0));
        assert_eq!(chain.find_index(2), Some(1));
        assert_eq!(chain.find_index(5), Some(1));
        assert_eq!(chain.find_index(6), Some(2));
        assert_eq!(chain.find_index(Time::MAX), Some(2));
    }

    #[test]
    fn test_empty_chain() {
        let chain = HistoryChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.find_at(0), None);
        assert_eq!(chain.find_at(Time::MIN), None);
        assert_eq!(chain.offset_at(Time::MAX), None);
        assert_eq!(chain.iter().count(), 0);
    }

    #[test]
    fn test_delta_cycles() {
        let chain = chain_of(&[(0, '0'), (3, '1'), (3, 'x'), (3, 'z'), (7, '1')]);
        let offset = chain.offset_at(3).unwrap();
        assert_eq!(
            offset,
            HistoryOffset {
                start: 1,
                elements: 3,
                time_match: true,
                next_time: Some(7),
            }
        );
        assert_eq!(chain.find_at(3).unwrap().value, scalar('z'));
        assert_eq!(chain.find_at(6).unwrap().value, scalar('z'));

        let offset = chain.offset_at(100).unwrap();
        assert!(!offset.time_match);
        assert_eq!(offset.next_time, None);
        assert_eq!(offset.last(), 4);
    }

    #[test]
    fn test_iter_is_restartable() {
        let chain = chain_of(&[(0, '0'), (1, '1'), (2, '0')]);
        assert_eq!(chain.iter().len(), 3);
        let times: Vec<_> = chain.iter().map(|e| e.time).collect();
        let again: Vec<_> = (&chain).into_iter().map(|e| e.time).collect();
        assert_eq!(times, [0, 1, 2]);
        assert_eq!(times, again);
    }

    #[test]
    fn test_from_unsigned() {
        assert_eq!(HistoryValue::from_unsigned(7, 8).to_string(), "00000111");
        assert_eq!(HistoryValue::from_unsigned(0b101, 2).to_string(), "01");
        assert_eq!(HistoryValue::from_unsigned(1, 0).bits(), Some(0));
    }

    fn sorted_times() -> impl Strategy<Value = Vec<Time>> {
        prop::collection::vec(-50i64..50, 0..40).prop_map(|mut t| {
            t.sort();
            t
        })
    }

    proptest! {
        #[test]
        fn binary_search_matches_linear_scan(times in sorted_times(), needle in -60i64..60) {
            let mut chain = HistoryChain::new();
            for (ii, time) in times.iter().enumerate() {
                chain.push(*time, HistoryValue::from_unsigned(ii as u64, 8)).unwrap();
            }
            let fast = chain.find_at(needle);
            let slow = chain.find_at_linear(needle);
            prop_assert_eq!(fast.map(|e| e as *const _), slow.map(|e| e as *const _));
        }
    }
}
