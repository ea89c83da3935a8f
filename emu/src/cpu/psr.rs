//! # Program Status Registers (CPSR and SPSR)
//!
//! ```text
//! 31 30 29 28 27 26      8 7 6 5 4   0
//! ┌──┬──┬──┬──┬──┬────────┬─┬─┬─┬─────┐
//! │N │Z │C │V │Q │Reserved│I│F│T│Mode │
//! └──┴──┴──┴──┴──┴────────┴─┴─┴─┴─────┘
//! ```
//!
//! - **Flags (28-31)**: tested through [`condition`](super::condition)
//! - **Q (27)**: sticky saturation, ARMv5TE and up; ignored on v4
//! - **I/F bits (6-7)**: IRQ/FIQ disable (1 means masked)
//! - **T bit (5)**: ARM (0) or Thumb (1) state
//! - **Mode (0-4)**: see [`cpu_modes`](super::cpu_modes)
//!
//! Each exception mode has a **SPSR** slot in the register bank that
//! receives the CPSR on exception entry.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::cpu_modes::Mode;

/// Mask selecting the five mode bits.
pub const PSR_MODE_MASK: u32 = 0b11111;

/// Raw I bit, as OR-able mask.
pub const PSR_IRQ_DISABLE: u32 = 1 << 7;

/// Raw F bit, as OR-able mask.
pub const PSR_FIQ_DISABLE: u32 = 1 << 6;

/// Program Status Register (CPSR or SPSR).
#[derive(Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Psr(u32);

impl Psr {
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// N => Bit 31, (0=Not Signed, 1=Signed)
    #[must_use]
    pub fn sign_flag(self) -> bool {
        self.0.get_bit(31)
    }

    /// Z => Bit 30, (0=Not Zero, 1=Zero)
    #[must_use]
    pub fn zero_flag(self) -> bool {
        self.0.get_bit(30)
    }

    /// C => Bit 29, (0=Borrow/No Carry, 1=Carry/No Borrow)
    #[must_use]
    pub fn carry_flag(self) -> bool {
        self.0.get_bit(29)
    }

    /// V => Bit 28, (0=No Overflow, 1=Overflow)
    #[must_use]
    pub fn overflow_flag(self) -> bool {
        self.0.get_bit(28)
    }

    /// Q => Bit 27, (1=Sticky Overflow, ARMv5TE and up only)
    #[must_use]
    pub fn sticky_overflow(self) -> bool {
        self.0.get_bit(27)
    }

    /// The NZCV nibble, suitable as index into the condition table.
    #[must_use]
    pub fn condition_flags(self) -> u8 {
        (self.0 >> 28) as u8 & 0xF
    }

    /// I => Bit 7, (0=Enable, 1=Disable)
    #[must_use]
    pub fn irq_disable(self) -> bool {
        self.0.get_bit(7)
    }

    /// F => Bit 6, (0=Enable, 1=Disable)
    #[must_use]
    pub fn fiq_disable(self) -> bool {
        self.0.get_bit(6)
    }

    /// T => Bit 5, (0=ARM, 1=THUMB)
    #[must_use]
    pub fn state_bit(self) -> bool {
        self.0.get_bit(5)
    }

    /// M4-M0 => Bits 4-0, as the raw five-bit code. May be a reserved
    /// encoding, e.g. right after a reset or after a careless MSR.
    #[must_use]
    pub const fn mode_raw(self) -> u32 {
        self.0 & PSR_MODE_MASK
    }

    /// The operating mode, when the mode bits hold a valid encoding.
    pub fn mode(self) -> Result<Mode, String> {
        Mode::try_from(self.mode_raw())
    }

    pub fn set_sign_flag(&mut self, value: bool) {
        self.0.set_bit(31, value);
    }

    pub fn set_zero_flag(&mut self, value: bool) {
        self.0.set_bit(30, value);
    }

    pub fn set_carry_flag(&mut self, value: bool) {
        self.0.set_bit(29, value);
    }

    pub fn set_overflow_flag(&mut self, value: bool) {
        self.0.set_bit(28, value);
    }

    /// Set by QADD, QSUB and friends on saturation; cleared only via MSR.
    pub fn set_sticky_overflow(&mut self, value: bool) {
        self.0.set_bit(27, value);
    }

    /// The interrupt bit I masks IRQ delivery while set. Changed by
    /// exception entry and, in privileged modes, by MSR.
    pub fn set_irq_disable(&mut self, value: bool) {
        self.0.set_bit(7, value);
    }

    /// The interrupt bit F masks FIQ delivery while set.
    pub fn set_fiq_disable(&mut self, value: bool) {
        self.0.set_bit(6, value);
    }

    /// The T bit selects Thumb state. Exception entry always clears it.
    pub fn set_state_bit(&mut self, value: bool) {
        self.0.set_bit(5, value);
    }

    pub const fn set_mode_raw(&mut self, m: u32) {
        self.0 &= !PSR_MODE_MASK;
        self.0 |= m & PSR_MODE_MASK;
    }

    pub const fn set_mode(&mut self, m: Mode) {
        self.set_mode_raw(m as u32);
    }

    /// MSR-style write: replace only the bits selected by `mask`.
    pub fn update_masked(&mut self, value: u32, mask: u32) {
        self.0 = (self.0 & !mask) | (value & mask);
    }
}

impl From<Mode> for Psr {
    fn from(m: Mode) -> Self {
        let mut s = Self(0);
        s.set_mode(m);
        s
    }
}

impl From<Psr> for u32 {
    fn from(p: Psr) -> Self {
        p.0
    }
}

impl std::fmt::Debug for Psr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Psr({:#010X})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_flags() {
        let mut cpsr = Psr::default();
        cpsr.set_sign_flag(true);
        assert!(cpsr.sign_flag());

        cpsr.set_zero_flag(true);
        assert!(cpsr.zero_flag());

        cpsr.set_carry_flag(true);
        assert!(cpsr.carry_flag());

        cpsr.set_overflow_flag(true);
        assert!(cpsr.overflow_flag());

        cpsr.set_sticky_overflow(true);
        assert!(cpsr.sticky_overflow());
    }

    #[test]
    fn condition_flags_nibble() {
        let mut cpsr = Psr::default();
        cpsr.set_sign_flag(true);
        cpsr.set_overflow_flag(true);
        assert_eq!(cpsr.condition_flags(), 0b1001);

        let cpsr = Psr::from_raw(0xF000_0000);
        assert_eq!(cpsr.condition_flags(), 0b1111);
    }

    #[test]
    fn check_interrupt_masks() {
        let mut cpsr = Psr::default();
        cpsr.set_irq_disable(true);
        assert!(cpsr.irq_disable());

        cpsr.set_fiq_disable(true);
        assert!(cpsr.fiq_disable());
        assert_eq!(u32::from(cpsr), PSR_IRQ_DISABLE | PSR_FIQ_DISABLE);
    }

    #[test]
    fn check_state_bit() {
        let mut cpsr = Psr::default();
        cpsr.set_state_bit(true);
        assert!(cpsr.state_bit());
    }

    #[test]
    fn mode_round_trip() {
        let mut cpsr = Psr::default();
        cpsr.set_mode(Mode::Supervisor);
        assert_eq!(cpsr.mode_raw(), 0b10011);
        assert_eq!(cpsr.mode(), Ok(Mode::Supervisor));

        // Mode writes must not disturb the rest of the word.
        cpsr.set_irq_disable(true);
        cpsr.set_mode(Mode::User);
        assert!(cpsr.irq_disable());
        assert_eq!(cpsr.mode(), Ok(Mode::User));
    }

    #[test]
    fn reserved_mode_is_reported() {
        let cpsr = Psr::from_raw(PSR_IRQ_DISABLE | PSR_FIQ_DISABLE);
        assert_eq!(cpsr.mode_raw(), 0);
        assert!(cpsr.mode().is_err());
    }

    #[test]
    fn masked_update() {
        let mut cpsr = Psr::from_raw(0x6000_0010);
        cpsr.update_masked(0x9000_001F, 0xF000_0000);
        assert_eq!(u32::from(cpsr), 0x9000_0010);
    }
}
