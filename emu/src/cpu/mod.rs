//! # ARM CPU core
//!
//! The architectural model of an ARMv4..ARMv6 processor as seen by the
//! rest of the virtual machine. Two things live here:
//!
//! 1. The **state machine**: sixteen general registers, CPSR/SPSR, the
//!    per-mode banked registers, and the precomputed condition table.
//! 2. The **exception protocol**: a pending-exception bitmap that device
//!    threads mutate atomically and the execution thread drains between
//!    instructions through [`Cpu::process_pending_exceptions`].
//!
//! ## Exception model
//!
//! | Exception          | Mode       | Vector | Cause                        |
//! |--------------------|------------|--------|------------------------------|
//! | Reset              | Supervisor | 0x00   | Power on or `signal_reset`   |
//! | Undefined          | Undefined  | 0x04   | Unknown instruction          |
//! | Software Interrupt | Supervisor | 0x08   | SWI instruction              |
//! | Prefetch Abort     | Abort      | 0x0C   | Failed instruction fetch     |
//! | Data Abort         | Abort      | 0x10   | Failed data access           |
//! | IRQ                | IRQ        | 0x18   | Device interrupt line        |
//! | FIQ                | FIQ        | 0x1C   | Fast device interrupt line   |
//!
//! The decoder/dispatcher (a separate crate) drives execution: it keeps
//! [`Cpu::pc`] on the current instruction, polls
//! [`Cpu::process_pending_exceptions`] between instructions, and treats a
//! `true` return as "architectural state changed, refetch from r15".
//!
//! ## Module Structure
//!
//! - [`core`](self::core) - the [`Cpu`] aggregate and mode switching
//! - [`exception`] - pending bitmap, signal interface, delivery driver
//! - [`condition`] - condition codes and the 16x16 pass table
//! - [`psr`] - CPSR/SPSR field access
//! - [`registers`] / [`register_bank`] - live and banked register files
//! - [`identity`] - CPU-type names to ISA/core/capabilities
//! - [`coprocessor`] - installed coprocessor slots
//! - [`counters`] - relaxed performance counters for telemetry
//! - [`host`] - execution-thread startup, telemetry timer, quit events

pub mod condition;
pub mod coprocessor;
pub mod core;
pub mod counters;
pub mod cpu_modes;
pub mod exception;
pub mod host;
pub mod identity;
pub mod psr;
pub mod register_bank;
pub mod registers;

pub use self::core::Cpu;
pub use self::exception::{Exception, ExceptionLines};
pub use self::host::HostEvent;
