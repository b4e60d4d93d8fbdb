// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use crate::{HistoryChain, HistoryEntry, Time};

#[derive(Debug)]
struct ChangesWithIdx<'a> {
    arr: &'a [HistoryEntry],
    idx: usize,
}

impl PartialEq for ChangesWithIdx<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.get_item() == other.get_item()
    }
}

impl Eq for ChangesWithIdx<'_> {}

impl PartialOrd for ChangesWithIdx<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChangesWithIdx<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.get_item().cmp(&other.get_item())
    }
}

impl<'a> ChangesWithIdx<'a> {
    fn new(arr: &'a [HistoryEntry], idx: usize) -> Self {
        Self { arr, idx }
    }

    fn get_item(&self) -> Time {
        self.arr[self.idx].time
    }
}

/// Sorted union of all times at which any of the histories changes. Every time is reported once.
pub fn all_changes<'a>(histories: impl IntoIterator<Item = &'a HistoryChain>) -> Vec<Time> {
    merge_times(histories.into_iter().map(|h| h.entries()).collect())
}

fn merge_times(arrays: Vec<&[HistoryEntry]>) -> Vec<Time> {
    let mut sorted: Vec<Time> = vec![];

    let mut heap = BinaryHeap::with_capacity(arrays.len());
    for arr in arrays.into_iter().filter(|a| !a.is_empty()) {
        heap.push(Reverse(ChangesWithIdx::new(arr, 0)));
    }

    while let Some(Reverse(mut it)) = heap.pop() {
        let time = it.get_item();
        if sorted.last() != Some(&time) {
            sorted.push(time);
        }
        it.idx += 1;
        if it.idx < it.arr.len() {
            heap.push(Reverse(it))
        }
    }

    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BitState, HistoryValue};

    fn chain(times: &[Time]) -> HistoryChain {
        let mut c = HistoryChain::new();
        for t in times {
            c.push(*t, HistoryValue::Scalar(BitState::One)).unwrap();
        }
        c
    }

    #[test]
    fn test_all_changes() {
        let a = chain(&[0, 5, 10, 15]);
        let b = chain(&[0, 7, 7, 10, 30]);
        let c = chain(&[]);
        let d = chain(&[-3]);
        assert_eq!(all_changes([&a, &b, &c, &d]), [-3, 0, 5, 7, 10, 15, 30]);
        assert!(all_changes([&c]).is_empty());
        assert!(all_changes(std::iter::empty::<&HistoryChain>()).is_empty());
    }
}
