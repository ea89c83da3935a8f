//! # Banked Registers
//!
//! Each exception mode owns private copies of r13 (its stack), r14 (the
//! return address written on entry) and a SPSR slot (the CPSR saved on
//! entry). User and System share one bank; FIQ optionally also banks
//! r8-r12 (see the `fiq-banked-high-regs` feature).
//!
//! ```text
//! Register │ User/Sys │  FIQ   │  IRQ   │  SVC   │ Abort  │ Undef  │
//! ─────────┼──────────┼────────┼────────┼────────┼────────┼────────┤
//!   R13/SP │   R13    │R13_fiq │R13_irq │R13_svc │R13_abt │R13_und │
//!   R14/LR │   R14    │R14_fiq │R14_irq │R14_svc │R14_abt │R14_und │
//!   SPSR   │   ---    │SPSR_fiq│SPSR_irq│SPSR_svc│SPSR_abt│SPSR_und│
//! ```
//!
//! The bank for the *currently active* mode holds stale values: the live
//! copies sit in the register file and in `Cpu::spsr`, and are swapped
//! back into the bank on the next mode change.

use serde::{Deserialize, Serialize};

use crate::cpu::cpu_modes::Mode;
use crate::cpu::psr::{Psr, PSR_MODE_MASK};

/// One mode's saved r13/r14/SPSR.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankedRegs {
    pub r13: u32,
    pub r14: u32,
    pub spsr: Psr,
}

/// Storage for the banked registers of all modes, one slot per register
/// set. User and System resolve to the same slot.
#[derive(Default, Serialize, Deserialize)]
pub struct RegisterBank {
    banks: [BankedRegs; 6],

    /// r8-r12 as seen by FIQ mode.
    #[cfg(feature = "fiq-banked-high-regs")]
    pub(crate) fiq_high: [u32; 5],

    /// r8-r12 as seen by every other mode, saved while FIQ is active.
    #[cfg(feature = "fiq-banked-high-regs")]
    pub(crate) shared_high: [u32; 5],
}

impl RegisterBank {
    /// Map a raw 5-bit mode code to its bank slot. Reserved codes map to
    /// no bank at all: a transition through one saves and restores
    /// nothing, which the reset path relies on.
    #[must_use]
    pub fn slot_for(mode_bits: u32) -> Option<usize> {
        match mode_bits & PSR_MODE_MASK {
            m if m == Mode::User as u32 || m == Mode::System as u32 => Some(0),
            m if m == Mode::Fiq as u32 => Some(1),
            m if m == Mode::Irq as u32 => Some(2),
            m if m == Mode::Supervisor as u32 => Some(3),
            m if m == Mode::Abort as u32 => Some(4),
            m if m == Mode::Undefined as u32 => Some(5),
            _ => None,
        }
    }

    #[must_use]
    pub fn slot(&self, index: usize) -> &BankedRegs {
        &self.banks[index]
    }

    pub fn slot_mut(&mut self, index: usize) -> &mut BankedRegs {
        &mut self.banks[index]
    }

    /// The bank belonging to a (valid) mode.
    #[must_use]
    pub fn by_mode(&self, mode: Mode) -> &BankedRegs {
        // Every Mode variant has a slot.
        &self.banks[Self::slot_for(mode as u32).unwrap()]
    }

    pub fn by_mode_mut(&mut self, mode: Mode) -> &mut BankedRegs {
        &mut self.banks[Self::slot_for(mode as u32).unwrap()]
    }
}
