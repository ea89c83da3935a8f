//! # The CPU Aggregate
//!
//! [`Cpu`] owns every piece of architectural state: the live register
//! file, CPSR/SPSR, the banked registers, the condition table, the
//! coprocessor slots and the identity resolved at construction. It is a
//! plain value: the host creates one, wires device models to its
//! [`ExceptionLines`], and moves it into the execution thread (see
//! [`host::start_cpu`](super::host::start_cpu)). Nothing in here is
//! shared across threads except the pending bitmap and the counters,
//! both of which are internally atomic.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::cpu::condition::{Condition, ConditionTable};
use crate::cpu::coprocessor::{Coprocessor, COPROCESSOR_SLOTS};
use crate::cpu::counters::{Counter, PerfCounters};
use crate::cpu::cpu_modes::Mode;
use crate::cpu::exception::ExceptionLines;
use crate::cpu::host::HostEvent;
use crate::cpu::identity::CpuIdentity;
use crate::cpu::psr::{Psr, PSR_MODE_MASK};
use crate::cpu::register_bank::RegisterBank;
use crate::cpu::registers::{Registers, REG_LR, REG_SP};

pub struct Cpu {
    pub registers: Registers,
    pub cpsr: Psr,
    /// Live SPSR of the current mode. Meaningless in User/System; use
    /// [`Cpu::read_spsr`] / [`Cpu::write_spsr`] for architectural
    /// accesses.
    pub spsr: Psr,
    pub register_bank: RegisterBank,

    /// Address of the instruction currently executing. The decoder
    /// keeps this in step with dispatch; r15 runs ahead of it.
    pub pc: u32,

    identity: CpuIdentity,
    condition_table: ConditionTable,
    pub(crate) exceptions: ExceptionLines,

    coprocessors: [Option<Box<dyn Coprocessor>>; COPROCESSOR_SLOTS],
    /// Slot of the last coprocessor fetched; dropped whenever an
    /// architectural transition could change accessibility.
    pub(crate) curr_cp: Option<usize>,

    pub(crate) counters: Arc<PerfCounters>,

    /// Cycle count the dispatcher should stop at; -1 runs forever.
    pub(crate) stop_at_cycle: i64,

    host_events: Option<Sender<HostEvent>>,
}

impl Cpu {
    /// Build a CPU of the named type. Unknown or absent names fall back
    /// to a plain ARMv4/ARM7 without CP15 or MMU. The host is expected
    /// to consult [`Cpu::identity`] afterwards to install CP15 (slot 15)
    /// and to configure its MMU.
    #[must_use]
    pub fn new(cpu_type: Option<&str>) -> Self {
        let identity = match cpu_type {
            None => CpuIdentity::default(),
            Some(name) => CpuIdentity::lookup(name).unwrap_or_else(|| {
                tracing::warn!("unknown cpu type {name:?}, defaulting to ARMv4/ARM7");
                CpuIdentity::default()
            }),
        };
        tracing::debug!("cpu identity: {identity:?}");

        Self {
            registers: Registers::default(),
            cpsr: Psr::default(),
            spsr: Psr::default(),
            register_bank: RegisterBank::default(),
            pc: 0,
            identity,
            condition_table: ConditionTable::build(),
            exceptions: ExceptionLines::new(),
            coprocessors: std::array::from_fn(|_| None),
            curr_cp: None,
            counters: Arc::new(PerfCounters::new()),
            stop_at_cycle: -1,
            host_events: None,
        }
    }

    #[must_use]
    pub fn identity(&self) -> CpuIdentity {
        self.identity
    }

    /// A clone of the signal interface, for device models and the MMU.
    #[must_use]
    pub fn exception_lines(&self) -> ExceptionLines {
        self.exceptions.clone()
    }

    /// Schedule a reset. Takes effect on the next exception poll of the
    /// execution thread; never tears state down synchronously.
    pub fn schedule_reset(&self) {
        self.exceptions.signal_reset();
    }

    #[must_use]
    pub fn counters(&self) -> Arc<PerfCounters> {
        Arc::clone(&self.counters)
    }

    #[must_use]
    pub fn stop_at_cycle(&self) -> i64 {
        self.stop_at_cycle
    }

    pub(crate) fn set_stop_at_cycle(&mut self, cycle: i64) {
        self.stop_at_cycle = cycle;
    }

    pub(crate) fn attach_host_events(&mut self, events: Sender<HostEvent>) {
        self.host_events = Some(events);
    }

    /// Condition test against the current CPSR flags.
    #[must_use]
    pub fn condition_passes(&self, cond: Condition) -> bool {
        self.condition_table
            .passes(self.cpsr.condition_flags(), cond)
    }

    #[must_use]
    pub fn condition_table(&self) -> &ConditionTable {
        &self.condition_table
    }

    fn in_user_or_system(&self) -> bool {
        let m = self.cpsr.mode_raw();
        m == Mode::User as u32 || m == Mode::System as u32
    }

    /// Architectural SPSR read: User/System have no SPSR, reads there
    /// return the CPSR.
    #[must_use]
    pub fn read_spsr(&self) -> Psr {
        if self.in_user_or_system() {
            self.cpsr
        } else {
            self.spsr
        }
    }

    /// Architectural SPSR write: ignored in User/System.
    pub fn write_spsr(&mut self, value: Psr) {
        if !self.in_user_or_system() {
            self.spsr = value;
        }
    }

    /// Switch the operating mode, swapping banked registers.
    ///
    /// The raw code may be a reserved encoding; those select no bank
    /// and only rewrite the CPSR mode field. Same-mode switches are a
    /// no-op.
    pub fn swap_mode_raw(&mut self, new_mode: u32) {
        let new_mode = new_mode & PSR_MODE_MASK;
        let old_mode = self.cpsr.mode_raw();

        tracing::debug!("mode change: {old_mode:#07b} to {new_mode:#07b}");

        if old_mode == new_mode {
            return;
        }

        #[cfg(feature = "fiq-banked-high-regs")]
        self.swap_fiq_high(old_mode, new_mode);

        if let Some(slot) = RegisterBank::slot_for(old_mode) {
            let outgoing = self.register_bank.slot_mut(slot);
            outgoing.r13 = self.registers.register_at(REG_SP);
            outgoing.r14 = self.registers.register_at(REG_LR);
            outgoing.spsr = self.spsr;
        }
        if let Some(slot) = RegisterBank::slot_for(new_mode) {
            let incoming = *self.register_bank.slot(slot);
            self.registers.set_register_at(REG_SP, incoming.r13);
            self.registers.set_register_at(REG_LR, incoming.r14);
            self.spsr = incoming.spsr;
        }

        self.cpsr.set_mode_raw(new_mode);
    }

    pub fn swap_mode(&mut self, new_mode: Mode) {
        self.swap_mode_raw(new_mode as u32);
    }

    #[cfg(feature = "fiq-banked-high-regs")]
    fn swap_fiq_high(&mut self, old_mode: u32, new_mode: u32) {
        let fiq = Mode::Fiq as u32;
        if old_mode == fiq {
            for i in 0..5 {
                self.register_bank.fiq_high[i] = self.registers.register_at(8 + i);
                self.registers
                    .set_register_at(8 + i, self.register_bank.shared_high[i]);
            }
        } else if new_mode == fiq {
            for i in 0..5 {
                self.register_bank.shared_high[i] = self.registers.register_at(8 + i);
                self.registers
                    .set_register_at(8 + i, self.register_bank.fiq_high[i]);
            }
        }
    }

    /// Install (or replace) a coprocessor handle. Indices outside 0..=15
    /// are a programming error and take the fatal path.
    pub fn install_coprocessor(&mut self, cp_num: usize, coproc: Box<dyn Coprocessor>) {
        if cp_num >= COPROCESSOR_SLOTS {
            self.panic(&format!("install_coprocessor: bad cp num {cp_num}"));
        }
        self.coprocessors[cp_num] = Some(coproc);
    }

    /// Fetch the coprocessor in `cp_num`, remembering the slot so the
    /// decoder can keep hitting it cheaply until the next invalidation.
    pub fn coprocessor_at(&mut self, cp_num: usize) -> Option<&mut dyn Coprocessor> {
        if cp_num >= COPROCESSOR_SLOTS {
            return None;
        }
        match self.coprocessors[cp_num] {
            Some(ref mut cp) => {
                self.curr_cp = Some(cp_num);
                Some(cp.as_mut())
            }
            None => None,
        }
    }

    /// Slot of the last coprocessor fetched, if still valid.
    #[must_use]
    pub fn cached_coprocessor(&self) -> Option<usize> {
        self.curr_cp
    }

    /// Human-readable snapshot of the architectural state.
    #[must_use]
    pub fn dump(&self) -> String {
        use std::fmt::Write;

        let flag = |set: bool, letter: char| if set { letter } else { ' ' };
        let r = |i: usize| self.registers.register_at(i);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "cpu_dump: ins {}",
            self.counters.get(Counter::Instructions)
        );
        let _ = writeln!(
            out,
            "r0:   {:#010x} r1:   {:#010x} r2:   {:#010x} r3:   {:#010x}",
            r(0),
            r(1),
            r(2),
            r(3)
        );
        let _ = writeln!(
            out,
            "r4:   {:#010x} r5:   {:#010x} r6:   {:#010x} r7:   {:#010x}",
            r(4),
            r(5),
            r(6),
            r(7)
        );
        let _ = writeln!(
            out,
            "r8:   {:#010x} r9:   {:#010x} r10:  {:#010x} r11:  {:#010x}",
            r(8),
            r(9),
            r(10),
            r(11)
        );
        let _ = writeln!(
            out,
            "r12:  {:#010x} sp:   {:#010x} lr:   {:#010x} r15:  {:#010x} pc:   {:#010x}",
            r(12),
            r(REG_SP),
            r(REG_LR),
            r(15),
            self.pc
        );
        let _ = writeln!(
            out,
            "cpsr: {:#010x} ({} {}{}{}{}) spsr: {:#010x}",
            u32::from(self.cpsr),
            flag(self.cpsr.state_bit(), 'T'),
            flag(self.cpsr.sign_flag(), 'N'),
            flag(self.cpsr.zero_flag(), 'Z'),
            flag(self.cpsr.carry_flag(), 'C'),
            flag(self.cpsr.overflow_flag(), 'O'),
            u32::from(self.spsr)
        );
        out
    }

    /// Fatal error path for programming errors inside the emulator:
    /// dump the state, ask the host event loop to quit, then panic.
    pub fn panic(&self, msg: &str) -> ! {
        tracing::error!("panic: {msg}");
        for line in self.dump().lines() {
            tracing::error!("{line}");
        }
        if let Some(events) = &self.host_events {
            let _ = events.send(HostEvent::Quit);
        }
        panic!("{msg}");
    }
}
