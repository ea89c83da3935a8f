//! # CPU Identity
//!
//! A CPU type name given at initialization selects the instruction-set
//! level, the core generation, and whether CP15 and an MMU are present.
//! The table is looked up once and the result is immutable afterwards.

/// Instruction-set architecture level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionSet {
    V4,
    V5,
    V5e,
    V6,
}

/// Core generation the type name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreGeneration {
    Arm7,
    Arm9,
    Arm9e,
}

/// Capabilities resolved from the CPU type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuIdentity {
    pub isa: InstructionSet,
    pub core: CoreGeneration,
    pub with_cp15: bool,
    pub with_mmu: bool,
}

impl Default for CpuIdentity {
    /// The fallback when no (or an unknown) type name is given.
    fn default() -> Self {
        Self {
            isa: InstructionSet::V4,
            core: CoreGeneration::Arm7,
            with_cp15: false,
            with_mmu: false,
        }
    }
}

const fn identity(
    isa: InstructionSet,
    core: CoreGeneration,
    with_cp15: bool,
    with_mmu: bool,
) -> CpuIdentity {
    CpuIdentity {
        isa,
        core,
        with_cp15,
        with_mmu,
    }
}

#[rustfmt::skip]
const CPU_TYPES: [(&str, CpuIdentity); 11] = [
    ("armv4",     identity(InstructionSet::V4,  CoreGeneration::Arm7,  false, false)),
    ("armv5",     identity(InstructionSet::V5,  CoreGeneration::Arm9,  true,  true)),
    ("armv5e",    identity(InstructionSet::V5e, CoreGeneration::Arm9,  true,  true)),
    // No ARM11 model yet; v6 runs on the ARM9 core model.
    ("armv6",     identity(InstructionSet::V6,  CoreGeneration::Arm9,  true,  true)),

    ("arm7tdmi",  identity(InstructionSet::V4,  CoreGeneration::Arm7,  false, false)),
    ("arm7",      identity(InstructionSet::V4,  CoreGeneration::Arm7,  false, false)),
    ("arm9tdmi",  identity(InstructionSet::V4,  CoreGeneration::Arm9,  true,  true)),
    ("arm9",      identity(InstructionSet::V4,  CoreGeneration::Arm9,  true,  true)),
    ("arm9e",     identity(InstructionSet::V5e, CoreGeneration::Arm9e, true,  true)),
    ("arm926ejs", identity(InstructionSet::V5e, CoreGeneration::Arm9e, true,  true)),
    ("arm926",    identity(InstructionSet::V5e, CoreGeneration::Arm9e, true,  true)),
];

impl CpuIdentity {
    /// Case-insensitive lookup of a CPU type name.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        CPU_TYPES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, id)| id)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(
            CpuIdentity::lookup("ARM926EJS"),
            CpuIdentity::lookup("arm926ejs")
        );
        assert!(CpuIdentity::lookup("Arm7TDMI").is_some());
    }

    #[test]
    fn unknown_names_yield_none() {
        assert_eq!(CpuIdentity::lookup("cortex-a53"), None);
        assert_eq!(CpuIdentity::lookup(""), None);
    }

    #[test]
    fn capability_table() {
        let arm7 = CpuIdentity::lookup("arm7tdmi").unwrap();
        assert_eq!(arm7.isa, InstructionSet::V4);
        assert_eq!(arm7.core, CoreGeneration::Arm7);
        assert!(!arm7.with_cp15);
        assert!(!arm7.with_mmu);

        let arm9tdmi = CpuIdentity::lookup("arm9tdmi").unwrap();
        assert_eq!(arm9tdmi.isa, InstructionSet::V4);
        assert_eq!(arm9tdmi.core, CoreGeneration::Arm9);
        assert!(arm9tdmi.with_cp15);
        assert!(arm9tdmi.with_mmu);

        let arm926 = CpuIdentity::lookup("arm926").unwrap();
        assert_eq!(arm926.isa, InstructionSet::V5e);
        assert_eq!(arm926.core, CoreGeneration::Arm9e);

        let armv6 = CpuIdentity::lookup("armv6").unwrap();
        assert_eq!(armv6.isa, InstructionSet::V6);
        assert_eq!(armv6.core, CoreGeneration::Arm9);
    }

    #[test]
    fn default_is_v4_arm7_without_cp15() {
        let id = CpuIdentity::default();
        assert_eq!(id.isa, InstructionSet::V4);
        assert_eq!(id.core, CoreGeneration::Arm7);
        assert!(!id.with_cp15);
        assert!(!id.with_mmu);
    }
}
