//! # Register File
//!
//! The sixteen general-purpose registers visible at any one time. Which
//! physical r13/r14 (and, for FIQ, r8-r12) sit behind these slots
//! depends on the operating mode; see
//! [`register_bank`](super::register_bank).
//!
//! r15 is the program counter in the architectural sense. The core also
//! keeps a separate mirror of the current instruction address
//! ([`Cpu::pc`](super::Cpu)), maintained by the decoder, because r15
//! runs ahead of execution and exception return addresses are computed
//! from the instruction actually being delivered against.

use serde::{Deserialize, Serialize};

/// Stack Pointer register index (by convention).
pub const REG_SP: usize = 0xD;

/// Link Register index (return address for subroutines).
pub const REG_LR: usize = 0xE;

/// Program Counter register index.
pub const REG_PC: usize = 0xF;

#[derive(Default, Serialize, Deserialize)]
pub struct Registers([u32; 16]);

impl Registers {
    #[must_use]
    pub const fn program_counter(&self) -> u32 {
        self.0[REG_PC]
    }

    pub const fn set_program_counter(&mut self, new_value: u32) {
        self.0[REG_PC] = new_value;
    }

    pub fn set_register_at(&mut self, reg: usize, new_value: u32) {
        assert!(reg <= 15, "Invalid register index: {reg} ({reg:#X})");
        self.0[reg] = new_value;
    }

    #[must_use]
    pub const fn register_at(&self, reg: usize) -> u32 {
        self.0[reg]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_counter_is_r15() {
        let mut regs = Registers::default();
        regs.set_program_counter(0x0800_0000);
        assert_eq!(regs.register_at(REG_PC), 0x0800_0000);
        assert_eq!(regs.program_counter(), 0x0800_0000);
    }

    #[test]
    #[should_panic(expected = "Invalid register index")]
    fn out_of_range_write_panics() {
        let mut regs = Registers::default();
        regs.set_register_at(16, 0);
    }
}
