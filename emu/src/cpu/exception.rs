//! # Exception Delivery
//!
//! Two halves live here:
//!
//! - [`ExceptionLines`], the thread-safe signal interface. Device
//!   models, the MMU and the decoder raise exceptions by setting bits in
//!   a shared atomic bitmap; raisers use release stores so that a raise
//!   that returned is visible to the next poll on the execution thread.
//! - The delivery driver, [`Cpu::process_pending_exceptions`], called by
//!   the dispatcher between instructions. It scans the pending bits in
//!   architectural priority order and performs at most one exception
//!   entry per call.
//!
//! IRQ and FIQ are level-triggered: the controller never clears their
//! bits, the owning device lowers the line on acknowledge. While masked
//! by CPSR.I/CPSR.F they simply stay pending. Everything else is
//! edge-triggered and acknowledged by delivery.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::cpu::core::Cpu;
use crate::cpu::counters::Counter;
use crate::cpu::cpu_modes::Mode;
use crate::cpu::psr::{Psr, PSR_FIQ_DISABLE, PSR_IRQ_DISABLE};

/// An exception kind, in architectural priority order (highest first).
/// The discriminant doubles as the pending-bitmap bit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    Reset = 0,
    Undefined = 1,
    SoftwareInterrupt = 2,
    PrefetchAbort = 3,
    DataAbort = 4,
    Fiq = 5,
    Irq = 6,
}

impl Exception {
    #[must_use]
    pub const fn bit(self) -> u32 {
        1 << self as u32
    }
}

/// Pending bits a reset leaves alone: interrupt lines are owned by the
/// devices asserting them and must survive into the post-reset world.
const RESET_KEEPS: u32 = Exception::Fiq.bit() | Exception::Irq.bit();

/// Thread-safe handle to the pending-exception bitmap.
///
/// Cloning is cheap; hand one clone to every device model. The `Cpu`
/// keeps its own clone and drains the bitmap on the execution thread.
#[derive(Clone, Default)]
pub struct ExceptionLines {
    pending: Arc<AtomicU32>,
}

impl ExceptionLines {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn raise(&self, ex: Exception) {
        self.pending.fetch_or(ex.bit(), Ordering::Release);
    }

    pub fn raise_irq(&self) {
        tracing::trace!("raise_irq");
        self.raise(Exception::Irq);
    }

    pub fn lower_irq(&self) {
        tracing::trace!("lower_irq");
        self.pending.fetch_and(!Exception::Irq.bit(), Ordering::Release);
    }

    pub fn raise_fiq(&self) {
        tracing::trace!("raise_fiq");
        self.raise(Exception::Fiq);
    }

    pub fn lower_fiq(&self) {
        tracing::trace!("lower_fiq");
        self.pending.fetch_and(!Exception::Fiq.bit(), Ordering::Release);
    }

    pub fn signal_undefined(&self) {
        self.raise(Exception::Undefined);
    }

    pub fn signal_swi(&self) {
        self.raise(Exception::SoftwareInterrupt);
    }

    /// `addr` is diagnostic only; the return address is derived from the
    /// execution thread's instruction pointer at delivery time.
    pub fn signal_prefetch_abort(&self, addr: u32) {
        tracing::debug!("prefetch abort at {addr:#010X}");
        self.raise(Exception::PrefetchAbort);
    }

    pub fn signal_data_abort(&self, addr: u32) {
        tracing::debug!("data abort at {addr:#010X}");
        self.raise(Exception::DataAbort);
    }

    pub fn signal_reset(&self) {
        self.raise(Exception::Reset);
    }

    /// Raw view of the bitmap for display; no ordering guarantees.
    #[must_use]
    pub fn pending(&self) -> u32 {
        self.pending.load(Ordering::Relaxed)
    }

    /// The one acquire load per delivery poll.
    pub(crate) fn snapshot(&self) -> u32 {
        self.pending.load(Ordering::Acquire)
    }

    pub(crate) fn clear(&self, bits: u32) {
        self.pending.fetch_and(!bits, Ordering::Release);
    }

    pub(crate) fn retain(&self, bits: u32) {
        self.pending.fetch_and(bits, Ordering::Release);
    }
}

/// How the banked r14 of the target mode is computed on entry.
#[derive(Clone, Copy)]
enum ReturnAddress {
    /// Address of the instruction following the one delivered against
    /// (instruction-size dependent).
    NextInstruction,
    /// Fixed offset from the delivered-against instruction.
    Offset(u32),
}

#[derive(Clone, Copy)]
enum Gate {
    Always,
    IrqEnabled,
    FiqEnabled,
}

/// One row of the delivery table: everything that differs between
/// exception kinds. The driver below applies rows in table order.
struct DeliveryRow {
    kind: Exception,
    target: Mode,
    vector: u32,
    lr: ReturnAddress,
    sets_fiq_mask: bool,
    gate: Gate,
    /// Pending bits acknowledged by this entry. Empty for the
    /// level-triggered interrupt lines.
    clears: u32,
}

#[rustfmt::skip]
const DELIVERY_ORDER: [DeliveryRow; 7] = [
    // Reset is special-cased by the driver: forced CPSR, no banked r14.
    DeliveryRow { kind: Exception::Reset,             target: Mode::Supervisor, vector: 0x00, lr: ReturnAddress::Offset(0),        sets_fiq_mask: true,  gate: Gate::Always,     clears: !RESET_KEEPS },
    DeliveryRow { kind: Exception::Undefined,         target: Mode::Undefined,  vector: 0x04, lr: ReturnAddress::NextInstruction,  sets_fiq_mask: false, gate: Gate::Always,     clears: Exception::Undefined.bit() },
    DeliveryRow { kind: Exception::SoftwareInterrupt, target: Mode::Supervisor, vector: 0x08, lr: ReturnAddress::NextInstruction,  sets_fiq_mask: false, gate: Gate::Always,     clears: Exception::SoftwareInterrupt.bit() },
    DeliveryRow { kind: Exception::PrefetchAbort,     target: Mode::Abort,      vector: 0x0C, lr: ReturnAddress::Offset(4),        sets_fiq_mask: false, gate: Gate::Always,     clears: Exception::PrefetchAbort.bit() },
    DeliveryRow { kind: Exception::DataAbort,         target: Mode::Abort,      vector: 0x10, lr: ReturnAddress::Offset(8),        sets_fiq_mask: false, gate: Gate::Always,     clears: Exception::DataAbort.bit() },
    DeliveryRow { kind: Exception::Fiq,               target: Mode::Fiq,        vector: 0x1C, lr: ReturnAddress::Offset(4),        sets_fiq_mask: true,  gate: Gate::FiqEnabled, clears: 0 },
    DeliveryRow { kind: Exception::Irq,               target: Mode::Irq,        vector: 0x18, lr: ReturnAddress::Offset(4),        sets_fiq_mask: false, gate: Gate::IrqEnabled, clears: 0 },
];

impl Cpu {
    /// Deliver the highest-priority deliverable pending exception, if
    /// any. Returns `true` when one was delivered: PC, CPSR and the
    /// operating mode may all have changed, so the caller must drop any
    /// decode state derived from the old PC.
    ///
    /// An interrupt masked by CPSR stays pending and does not block
    /// lower-priority kinds from being considered.
    pub fn process_pending_exceptions(&mut self) -> bool {
        let pending = self.exceptions.snapshot();
        if pending == 0 {
            return false;
        }

        tracing::trace!("process_pending_exceptions: pending ex {pending:#04X}");

        for row in &DELIVERY_ORDER {
            if pending & row.kind.bit() == 0 {
                continue;
            }
            match row.gate {
                Gate::IrqEnabled if self.cpsr.irq_disable() => continue,
                Gate::FiqEnabled if self.cpsr.fiq_disable() => continue,
                _ => {}
            }

            self.enter_exception(row);
            return true;
        }

        false
    }

    fn enter_exception(&mut self, row: &DeliveryRow) {
        if row.kind == Exception::Reset {
            // Forced state: both interrupt masks up, mode field cleared
            // so the switch below saves no outgoing bank.
            self.cpsr = Psr::from_raw(PSR_IRQ_DISABLE | PSR_FIQ_DISABLE);
            self.registers.set_program_counter(0x0);
            self.curr_cp = None;
            self.swap_mode(Mode::Supervisor);
            self.exceptions.retain(RESET_KEEPS);

            tracing::debug!("EX: cpu reset");
            self.counters.inc(Counter::Exceptions);
            return;
        }

        let thumb = self.cpsr.state_bit();
        let return_addr = match row.lr {
            ReturnAddress::NextInstruction => self.pc.wrapping_add(if thumb { 2 } else { 4 }),
            ReturnAddress::Offset(n) => self.pc.wrapping_add(n),
        };

        // Written to the bank; the mode switch below makes them live.
        let bank = self.register_bank.by_mode_mut(row.target);
        bank.r14 = return_addr;
        bank.spsr = self.cpsr;

        self.registers.set_program_counter(row.vector);

        if thumb {
            // Coprocessor accessibility is re-resolved after a state
            // change; drop the cached slot.
            self.curr_cp = None;
        }
        self.cpsr.set_state_bit(false);
        self.cpsr.set_irq_disable(true);
        if row.sets_fiq_mask {
            self.cpsr.set_fiq_disable(true);
        }
        self.swap_mode(row.target);

        if row.clears != 0 {
            self.exceptions.clear(row.clears);
        }

        match row.kind {
            Exception::Undefined => {
                tracing::debug!("EX: undefined instruction at {:#010X}", self.pc);
            }
            Exception::SoftwareInterrupt => tracing::trace!("EX: swi"),
            Exception::PrefetchAbort => tracing::debug!("EX: prefetch abort"),
            Exception::DataAbort => tracing::debug!("EX: data abort"),
            Exception::Fiq => tracing::trace!("EX: FIQ"),
            Exception::Irq => tracing::trace!("EX: IRQ"),
            Exception::Reset => unreachable!(),
        }
        self.counters.inc(Counter::Exceptions);
    }
}
