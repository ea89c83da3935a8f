//! # CPU Operating Modes
//!
//! ARM processors of this generation have seven operating modes. User is
//! the only unprivileged one; five are entered by exceptions; System is
//! a privileged mode that shares the User register bank.
//!
//! ```text
//! ┌─────────────┬──────────┬───────────────────────────────────────────┐
//! │    Mode     │  Binary  │                  Purpose                  │
//! ├─────────────┼──────────┼───────────────────────────────────────────┤
//! │ User        │  10000   │ Normal program execution (unprivileged)   │
//! │ FIQ         │  10001   │ Fast interrupt handling                   │
//! │ IRQ         │  10010   │ General interrupt handling                │
//! │ Supervisor  │  10011   │ Reset and software interrupts             │
//! │ Abort       │  10111   │ Memory access failures                    │
//! │ Undefined   │  11011   │ Undefined instruction handling            │
//! │ System      │  11111   │ Privileged mode sharing User registers    │
//! └─────────────┴──────────┴───────────────────────────────────────────┘
//! ```
//!
//! The remaining 5-bit encodings are reserved. They can still transit
//! through the CPSR mode field (reset writes a cleared field before
//! entering Supervisor), which is why mode switching works on raw codes
//! and maps reserved ones to no register bank.

use serde::{Deserialize, Serialize};

/// The CPU operating mode, stored in bits 0-4 of the CPSR/SPSR.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Mode {
    /// Normal program execution (unprivileged).
    User = 0b10000,

    /// Fast Interrupt Request mode. With `fiq-banked-high-regs` it also
    /// owns private copies of r8-r12.
    Fiq = 0b10001,

    /// Interrupt Request mode.
    Irq = 0b10010,

    /// Supervisor mode; target of Reset and SWI.
    Supervisor = 0b10011,

    /// Abort mode; target of prefetch and data aborts.
    Abort = 0b10111,

    /// Undefined instruction mode.
    Undefined = 0b11011,

    /// Privileged mode on the User register bank.
    System = 0b11111,
}

impl From<Mode> for u32 {
    fn from(m: Mode) -> Self {
        m as Self
    }
}

impl TryFrom<u32> for Mode {
    type Error = String;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        match n {
            0b10000 => Ok(Self::User),
            0b10001 => Ok(Self::Fiq),
            0b10010 => Ok(Self::Irq),
            0b10011 => Ok(Self::Supervisor),
            0b10111 => Ok(Self::Abort),
            0b11011 => Ok(Self::Undefined),
            0b11111 => Ok(Self::System),
            _ => Err(format!("reserved mode bits {n:#07b}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_codes_round_trip() {
        for mode in [
            Mode::User,
            Mode::Fiq,
            Mode::Irq,
            Mode::Supervisor,
            Mode::Abort,
            Mode::Undefined,
            Mode::System,
        ] {
            assert_eq!(Mode::try_from(u32::from(mode)), Ok(mode));
        }
    }

    #[test]
    fn reserved_codes_are_rejected() {
        assert!(Mode::try_from(0b00000).is_err());
        assert!(Mode::try_from(0b10100).is_err());
        assert!(Mode::try_from(0b11110).is_err());
    }
}
