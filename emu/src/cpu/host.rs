//! # Execution Thread & Telemetry
//!
//! The host hands the [`Cpu`] to [`start_cpu`] together with the
//! dispatch loop (owned by the decoder crate) and a channel for host
//! events. The `Cpu` moves into a dedicated execution thread; when the
//! dispatcher returns, for whatever reason, the host event loop receives
//! [`HostEvent::Quit`] and can tear the machine down.
//!
//! A telemetry thread samples the performance counters once per second
//! and logs the deltas for as long as the execution thread lives.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::cpu::counters::{Counter, PerfCounters, COUNTER_SLOTS};
use crate::cpu::Cpu;

/// Messages the core sends to the host event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The execution thread exited, or the core hit a fatal error.
    Quit,
}

/// Record the stop condition and launch the execution thread.
///
/// `cycle_limit <= 0` means "run forever"; the dispatcher is expected to
/// consult [`Cpu::stop_at_cycle`] and return when it is reached. The
/// returned handle yields the `Cpu` back once the dispatcher finishes,
/// which is mostly useful to tests and to save-state capture.
pub fn start_cpu<D>(
    mut cpu: Cpu,
    cycle_limit: i64,
    dispatch: D,
    events: Sender<HostEvent>,
) -> thread::JoinHandle<Cpu>
where
    D: FnOnce(&mut Cpu) + Send + 'static,
{
    cpu.set_stop_at_cycle(if cycle_limit > 0 { cycle_limit } else { -1 });
    cpu.attach_host_events(events.clone());

    let running = Arc::new(AtomicBool::new(true));
    spawn_speed_timer(cpu.counters(), Arc::clone(&running));

    thread::Builder::new()
        .name("cpu-exec".into())
        .spawn(move || {
            dispatch(&mut cpu);

            running.store(false, Ordering::Relaxed);
            let _ = events.send(HostEvent::Quit);
            cpu
        })
        .expect("spawn cpu execution thread")
}

fn spawn_speed_timer(counters: Arc<PerfCounters>, running: Arc<AtomicBool>) {
    thread::Builder::new()
        .name("cpu-telemetry".into())
        .spawn(move || {
            let mut previous = counters.sample();
            while running.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_secs(1));
                let current = counters.sample();
                tracing::info!("{}", speed_report(&previous, &current));
                previous = current;
            }
        })
        .expect("spawn cpu telemetry thread");
}

/// Render one telemetry sample as the per-second rate line.
fn speed_report(previous: &[u64; COUNTER_SLOTS], current: &[u64; COUNTER_SLOTS]) -> String {
    use std::fmt::Write;

    let delta = |c: Counter| current[c as usize].wrapping_sub(previous[c as usize]);

    let mut line = String::new();

    #[cfg(feature = "count-cycles")]
    let _ = write!(line, "{} cycles/sec, ", delta(Counter::Cycles));

    let _ = write!(
        line,
        "{} ins/sec, {} ins decodes/sec, {} slow mmu translates/sec",
        delta(Counter::Instructions),
        delta(Counter::Decodes),
        delta(Counter::SlowMmuTranslates)
    );

    #[cfg(feature = "count-class-ops")]
    let _ = write!(
        line,
        "\n\tSC {} NOP {} L {} S {} DP {} MUL {} B {} MISC {}, exceptions {}",
        delta(Counter::SkippedCondition),
        delta(Counter::Nop),
        delta(Counter::Load),
        delta(Counter::Store),
        delta(Counter::DataProcessing),
        delta(Counter::Mul),
        delta(Counter::Branch),
        delta(Counter::Misc),
        delta(Counter::Exceptions)
    );

    line
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn dispatcher_runs_on_its_own_thread_and_signals_quit() {
        let cpu = Cpu::new(None);
        let (tx, rx) = mpsc::channel();

        let handle = start_cpu(
            cpu,
            0,
            |cpu| {
                cpu.counters().inc(Counter::Instructions);
                cpu.registers.set_register_at(0, 42);
            },
            tx,
        );

        let cpu = handle.join().unwrap();
        assert_eq!(rx.recv().unwrap(), HostEvent::Quit);
        assert_eq!(cpu.registers.register_at(0), 42);
        assert_eq!(cpu.counters().get(Counter::Instructions), 1);
    }

    #[test]
    fn cycle_limit_is_recorded() {
        let (tx, _rx) = mpsc::channel();
        let handle = start_cpu(Cpu::new(None), 1_000_000, |_| {}, tx);
        assert_eq!(handle.join().unwrap().stop_at_cycle(), 1_000_000);

        let (tx, _rx) = mpsc::channel();
        let handle = start_cpu(Cpu::new(None), 0, |_| {}, tx);
        assert_eq!(handle.join().unwrap().stop_at_cycle(), -1);

        let (tx, _rx) = mpsc::channel();
        let handle = start_cpu(Cpu::new(None), -5, |_| {}, tx);
        assert_eq!(handle.join().unwrap().stop_at_cycle(), -1);
    }

    #[test]
    fn speed_report_shows_per_second_deltas() {
        let counters = PerfCounters::new();
        let previous = counters.sample();
        for _ in 0..5 {
            counters.inc(Counter::Instructions);
        }
        counters.inc(Counter::Decodes);
        let current = counters.sample();

        let line = speed_report(&previous, &current);
        assert!(line.contains("5 ins/sec"));
        assert!(line.contains("1 ins decodes/sec"));
        assert!(line.contains("0 slow mmu translates/sec"));
    }
}
