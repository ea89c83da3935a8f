//! # Tangerine CPU Core
//!
//! This crate contains the ARM (v4-v6) CPU core of the Tangerine virtual
//! machine: the architectural state machine and the exception-delivery
//! protocol. The micro-op decoder, the MMU, coprocessor implementations
//! and the host UI live elsewhere and reach this crate through the
//! interfaces exported from [`cpu`].
//!
//! ## Module Overview
//!
//! | Module                  | Description                                   |
//! |-------------------------|-----------------------------------------------|
//! | [`cpu::core`]           | The [`cpu::Cpu`] aggregate (start here)       |
//! | [`cpu::exception`]      | Pending-exception bitmap and delivery         |
//! | [`cpu::condition`]      | Condition codes and the precomputed table     |
//! | [`cpu::psr`]            | CPSR/SPSR field access                        |
//! | [`cpu::register_bank`]  | Banked r13/r14/SPSR per mode                  |
//! | [`cpu::identity`]       | CPU-type name table (ISA, core, capabilities) |
//! | [`cpu::host`]           | Execution-thread startup and telemetry        |
//!
//! ## Quick Start
//!
//! ```ignore
//! use emu::cpu::{host, Cpu};
//!
//! let cpu = Cpu::new(Some("arm926ejs"));
//! let lines = cpu.exception_lines(); // hand clones to device models
//! let (tx, rx) = std::sync::mpsc::channel();
//! let exec = host::start_cpu(cpu, 0, |cpu| dispatch_loop(cpu), tx);
//! ```
//!
//! ## Threading
//!
//! Exactly one execution thread owns the `Cpu`. Device models raise and
//! lower interrupt lines from their own threads through
//! [`cpu::exception::ExceptionLines`]; the only cross-thread state is
//! the atomic pending-exception bitmap.

mod bitwise;

pub mod cpu;
