//! # Condition Codes
//!
//! In ARM state every instruction carries a 4-bit condition field (bits
//! 31:28) that is tested against the CPSR flags before execution. The
//! test is hot: it runs once per dispatched instruction. Instead of
//! re-deriving the boolean formula each time, [`ConditionTable`] holds a
//! precomputed 16x16 truth table: one 16-bit entry per NZCV pattern, one
//! bit per condition code.

/// A condition field value, straight out of bits 31:28 of an ARM
/// instruction.
///
/// Codes 0..=13 are flag predicates (equality, carry, signed and
/// unsigned orderings; see [`ConditionTable`] for the formulas). `AL`
/// (0b1110) always passes. `NV` (0b1111) also passes here: from ARMv5
/// on that encoding selects the unconditional instruction space, which
/// is the decoder's business, not the flag test's.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[rustfmt::skip]
pub enum Condition {
    EQ, NE, CS, CC, MI, PL, VS, VC,
    HI, LS, GE, LT, GT, LE, AL, NV,
}

impl Condition {
    /// The sixteen codes in encoding order; `ALL[n]` has encoding `n`.
    #[rustfmt::skip]
    pub const ALL: [Self; 16] = [
        Self::EQ, Self::NE, Self::CS, Self::CC, Self::MI, Self::PL, Self::VS, Self::VC,
        Self::HI, Self::LS, Self::GE, Self::LT, Self::GT, Self::LE, Self::AL, Self::NV,
    ];

    /// Assembler mnemonic. `AL` renders empty, since the suffix is
    /// omitted in listings, and the reserved form renders `_NEVER`.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        const MNEMONICS: [&str; 16] = [
            "EQ", "NE", "CS", "CC", "MI", "PL", "VS", "VC",
            "HI", "LS", "GE", "LT", "GT", "LE", "", "_NEVER",
        ];
        MNEMONICS[self as usize]
    }
}

impl From<u8> for Condition {
    fn from(value: u8) -> Self {
        debug_assert!(value < 16);
        Self::ALL[usize::from(value & 0xF)]
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Precomputed pass table for conditional execution.
///
/// Entry `i` covers the flag pattern NZCV = `i` (N is bit 3 of the
/// index, V is bit 0); bit `c` of the entry is set iff condition code
/// `c` passes under that pattern. Immutable after construction.
pub struct ConditionTable([u16; 16]);

impl ConditionTable {
    pub fn build() -> Self {
        let mut table = [0_u16; 16];

        for (flags, entry) in table.iter_mut().enumerate() {
            for cond in Condition::ALL {
                if Self::evaluate(flags as u8, cond) {
                    *entry |= 1 << cond as u16;
                }
            }
            tracing::debug!("condition_table[{flags}] = {entry:#06X}");
        }

        Self(table)
    }

    /// Direct transcription of the condition formulas. Used once per
    /// table slot at build time; `passes` is the hot path.
    fn evaluate(flags: u8, cond: Condition) -> bool {
        let n = flags & 0b1000 != 0;
        let z = flags & 0b0100 != 0;
        let c = flags & 0b0010 != 0;
        let v = flags & 0b0001 != 0;

        use Condition::*;
        match cond {
            EQ => z,
            NE => !z,
            CS => c,
            CC => !c,
            MI => n,
            PL => !n,
            VS => v,
            VC => !v,
            HI => c && !z,
            LS => !c || z,
            GE => n == v,
            LT => n != v,
            GT => !z && n == v,
            LE => z || n != v,
            AL | NV => true,
        }
    }

    /// Constant-time condition test. `flags` is the NZCV nibble as read
    /// from CPSR bits 31:28.
    #[must_use]
    pub fn passes(&self, flags: u8, cond: Condition) -> bool {
        debug_assert!(flags < 16);

        self.0[flags as usize] & (1 << cond as u16) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_round_trip() {
        for (code, &cond) in Condition::ALL.iter().enumerate() {
            assert_eq!(cond as usize, code);
            assert_eq!(Condition::from(code as u8), cond);
        }
        assert_eq!(Condition::from(0xE), Condition::AL);
    }

    #[test]
    fn table_matches_direct_evaluation() {
        let table = ConditionTable::build();

        for flags in 0..16_u8 {
            for cond in Condition::ALL {
                assert_eq!(
                    table.passes(flags, cond),
                    ConditionTable::evaluate(flags, cond),
                    "flags {flags:#06b} cond {cond:?}"
                );
            }
        }
    }

    #[test]
    fn signed_comparisons() {
        let table = ConditionTable::build();

        // N=1 Z=0 C=0 V=1: N equals V, so GE passes and LT fails.
        assert!(table.passes(0b1001, Condition::GE));
        assert!(!table.passes(0b1001, Condition::LT));

        // N=1 Z=0 C=0 V=0: N differs from V.
        assert!(!table.passes(0b1000, Condition::GE));
        assert!(table.passes(0b1000, Condition::LT));

        assert!(table.passes(0b0000, Condition::GE));
    }

    #[test]
    fn unsigned_comparisons() {
        let table = ConditionTable::build();

        // HI wants C set and Z clear.
        assert!(table.passes(0b0010, Condition::HI));
        assert!(!table.passes(0b0110, Condition::HI));
        assert!(!table.passes(0b0000, Condition::HI));

        // LS is the complement of HI.
        assert!(!table.passes(0b0010, Condition::LS));
        assert!(table.passes(0b0100, Condition::LS));
    }

    #[test]
    fn always_and_special_pass_everywhere() {
        let table = ConditionTable::build();

        for flags in 0..16_u8 {
            assert!(table.passes(flags, Condition::AL));
            assert!(table.passes(flags, Condition::NV));
        }
    }

    #[test]
    fn mnemonics_follow_the_encoding() {
        assert_eq!(Condition::GT.to_string(), "GT");
        assert_eq!(Condition::AL.to_string(), "");
        assert_eq!(Condition::NV.to_string(), "_NEVER");
        assert_eq!(Condition::from(0xB).mnemonic(), "LT");
    }
}
