// Copyright 2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

#![allow(dead_code)]

use wavehist::*;

/// Builds a history from `(time, bits)` pairs where `bits` is a bit string, MSB first.
pub fn history_of(changes: &[(Time, &str)]) -> HistoryChain {
    let mut chain = HistoryChain::with_capacity(changes.len());
    for (time, bits) in changes.iter() {
        chain.push(*time, value_of(bits)).unwrap();
    }
    chain
}

pub fn value_of(bits: &str) -> HistoryValue {
    let states = parse_bit_string(bits).unwrap();
    if states.len() == 1 {
        HistoryValue::Scalar(states[0])
    } else {
        HistoryValue::vector(states)
    }
}

pub fn signal_of(name: &str, msi: i32, lsi: i32, changes: &[(Time, &str)]) -> Signal {
    Signal::with_history(name, msi, lsi, history_of(changes))
}

/// The testbench from the `read_signal` tool: `clk` toggles every 5 time steps and
/// `cycle` counts rising edges.
pub fn testbench(end: Time) -> (Trace, SignalRef, SignalRef) {
    let mut b = TraceBuilder::default();
    b.set_timescale(Timescale::new(1, TimescaleUnit::NanoSeconds));
    let clk = b.add_signal("tb.clk", 0, 0);
    let cycle = b.add_signal("tb.cycle", 7, 0);
    b.add_change(cycle, 0, HistoryValue::from_unsigned(0, 8))
        .unwrap();
    let mut count = 0u64;
    for time in (0..=end).step_by(5) {
        let rising = (time / 5) % 2 == 1;
        let state = if rising {
            BitState::One
        } else {
            BitState::Zero
        };
        b.add_change(clk, time, HistoryValue::Scalar(state))
            .unwrap();
        if rising {
            count += 1;
            b.add_change(cycle, time, HistoryValue::from_unsigned(count, 8))
                .unwrap();
        }
    }
    (b.finish(), clk, cycle)
}
