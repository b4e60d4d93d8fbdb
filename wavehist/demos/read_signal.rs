// Copyright 2025 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use clap::Parser;
use wavehist::*;

#[derive(Parser, Debug)]
#[command(name = "read_signal")]
#[command(version)]
#[command(about = "Prints the values of a clock and a cycle counter over time.", long_about = None)]
struct Args {
    /// last simulation time of the generated testbench trace
    #[arg(long, default_value_t = 30)]
    end: Time,
    /// distance between two printed rows
    #[arg(long, default_value_t = 5)]
    step: usize,
    /// print one row per change instead of one row every `step` time units
    #[arg(long)]
    changes: bool,
    /// print vectors with x or z bits as bit strings instead of treating those bits as 0
    #[arg(long)]
    propagate_unknown: bool,
    #[arg(long)]
    single_thread: bool,
    /// times at which to print individual values
    #[arg(long, value_delimiter = ',', default_values_t = [7, 20])]
    at: Vec<Time>,
}

/// In-memory stand-in for an imported `tb` testbench.
fn load_testbench(end: Time, options: QueryOptions) -> Result<Trace> {
    let mut b = TraceBuilder::new(options);
    b.set_timescale(Timescale::new(1, TimescaleUnit::NanoSeconds));
    let clk = b.add_signal("tb.clk", 0, 0);
    let cycle = b.add_signal("tb.cycle", 7, 0);
    let rst = b.add_signal("tb.rst", 0, 0);
    b.add_change(rst, 0, HistoryValue::Scalar(BitState::One))?;
    b.add_change(rst, 12, HistoryValue::Scalar(BitState::Zero))?;
    b.add_change(
        cycle,
        0,
        HistoryValue::vector(parse_bit_string("xxxxxxxx")?),
    )?;
    let mut count = 0u64;
    for time in (0..=end).step_by(5) {
        let rising = (time / 5) % 2 == 1;
        let state = if rising {
            BitState::One
        } else {
            BitState::Zero
        };
        b.add_change(clk, time, HistoryValue::Scalar(state))?;
        if rising && time > 12 {
            count += 1;
            b.add_change(cycle, time, HistoryValue::from_unsigned(count, 8))?;
        } else if rising {
            b.add_change(cycle, time, HistoryValue::from_unsigned(0, 8))?;
        }
    }
    Ok(b.finish())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let options = QueryOptions {
        multi_thread: !args.single_thread,
        unknown_bits: if args.propagate_unknown {
            UnknownBits::Propagate
        } else {
            UnknownBits::TreatAsZero
        },
    };
    let trace = load_testbench(args.end, options)?;

    if let Some(range) = trace.time_range() {
        println!("Time range: {} to {}", range.start, range.end);
    }
    if let Some(timescale) = trace.timescale() {
        match timescale.unit.to_exponent() {
            Some(exponent) => println!(
                "Time scale: {timescale} ({}e{exponent} s)",
                timescale.factor
            ),
            None => println!("Time scale: {timescale}"),
        }
    }
    println!();

    println!("Available signals:");
    println!("Total: {} signals", trace.len());
    for (ii, signal) in trace.signals().enumerate().take(20) {
        println!("  [{ii}] {}", signal.full_name());
    }
    println!();

    let (Some(clk), Some(cycle)) = (trace.lookup("tb.clk"), trace.lookup("tb.cycle[7:0]")) else {
        eprintln!("Error: Could not find signals");
        std::process::exit(1);
    };

    println!("Signal Info:");
    println!("  clk:   {} transitions", trace[clk].history().len());
    println!(
        "  cycle: {} transitions, width={} bits [{}:{}]",
        trace[cycle].history().len(),
        trace[cycle].width(),
        trace[cycle].msi(),
        trace[cycle].lsi()
    );
    println!();

    println!("Signal Values:");
    println!("Time | clk | cycle");
    println!("-----|-----|------");
    let times: Vec<Time> = if args.changes {
        trace.change_times(&[clk, cycle])
    } else {
        (0..=args.end).step_by(args.step.max(1)).collect()
    };
    for time in times {
        let values = trace.query_many(&[clk, cycle], time);
        println!("{time:4} |  {}  |  {}", values[0], values[1]);
    }
    println!();

    for time in args.at {
        println!("At time {time}:");
        println!("  tb.clk = {}", trace.query(clk, time));
        println!("  tb.cycle = {}", trace.query(cycle, time));
    }

    if log::log_enabled!(log::Level::Debug) {
        trace.print_statistics();
    }
    Ok(())
}
