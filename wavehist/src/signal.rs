// Copyright 2024-2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::history::HistoryChain;
use std::num::NonZeroU32;

/// Signal identifier in a [`crate::Trace`].
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalRef(NonZeroU32);

impl SignalRef {
    #[inline]
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index)
            .ok()
            .and_then(|ii| ii.checked_add(1))
            .and_then(NonZeroU32::new)
            .map(Self)
    }

    #[inline]
    pub fn index(&self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// A named signal together with its complete value history.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct Signal {
    name: String,
    msi: i32,
    lsi: i32,
    history: HistoryChain,
}

impl Signal {
    pub fn new(name: impl Into<String>, msi: i32, lsi: i32) -> Self {
        Self::with_history(name, msi, lsi, HistoryChain::new())
    }

    pub fn with_history(
        name: impl Into<String>,
        msi: i32,
        lsi: i32,
        history: HistoryChain,
    ) -> Self {
        Self {
            name: name.into(),
            msi,
            lsi,
            history,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name including the bit range for vectors, e.g., `tb.cycle[7:0]`.
    pub fn full_name(&self) -> String {
        if self.is_scalar() {
            self.name.clone()
        } else {
            format!("{}[{}:{}]", self.name, self.msi, self.lsi)
        }
    }

    pub fn msi(&self) -> i32 {
        self.msi
    }

    pub fn lsi(&self) -> i32 {
        self.lsi
    }

    /// Number of bits. `u64` since `i32::MIN..=i32::MAX` spans 2^32 bits.
    #[inline]
    pub fn width(&self) -> u64 {
        (self.msi as i64 - self.lsi as i64).unsigned_abs() + 1
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.width() == 1
    }

    pub fn history(&self) -> &HistoryChain {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut HistoryChain {
        &mut self.history
    }
}
