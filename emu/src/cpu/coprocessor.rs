//! # Coprocessor Slots
//!
//! Up to sixteen coprocessors can be attached to the core. The core
//! itself never interprets coprocessor instructions; the decoder routes
//! MRC/MCR, CDP and LDC/STC traffic to whatever handle is installed in
//! the addressed slot. CP15 (system control) is just a handle installed
//! at slot 15 by the host when the CPU identity calls for it.

/// Operations the instruction stream can direct at an installed
/// coprocessor. Implementations live outside this crate.
pub trait Coprocessor: Send {
    /// MCR: move a core register value into coprocessor register
    /// `crn`/`crm` with the given opcode fields.
    fn write_reg(&mut self, opcode: u32, crn: u32, crm: u32, value: u32);

    /// MRC: read coprocessor register `crn`/`crm` back into the core.
    fn read_reg(&mut self, opcode: u32, crn: u32, crm: u32) -> u32;

    /// CDP: coprocessor-internal data operation.
    fn data_op(&mut self, opcode: u32, crd: u32, crn: u32, crm: u32);

    /// LDC/STC: one word of a coprocessor/memory transfer against
    /// coprocessor register `crd`. The core owns the bus access: on a
    /// load it passes the word just fetched and ignores the return
    /// value, on a store the returned word is what goes out to memory.
    fn mem_transfer(&mut self, crd: u32, load: bool, word: u32) -> u32;
}

/// Number of addressable coprocessor slots.
pub const COPROCESSOR_SLOTS: usize = 16;

#[cfg(test)]
pub(crate) mod testing {
    use super::Coprocessor;

    /// Records traffic so tests can assert which slot was driven.
    #[derive(Default)]
    pub struct RecordingCoprocessor {
        pub writes: Vec<(u32, u32, u32, u32)>,
        pub loaded: Vec<u32>,
        pub read_value: u32,
    }

    impl Coprocessor for RecordingCoprocessor {
        fn write_reg(&mut self, opcode: u32, crn: u32, crm: u32, value: u32) {
            self.writes.push((opcode, crn, crm, value));
        }

        fn read_reg(&mut self, _opcode: u32, _crn: u32, _crm: u32) -> u32 {
            self.read_value
        }

        fn data_op(&mut self, _opcode: u32, _crd: u32, _crn: u32, _crm: u32) {}

        fn mem_transfer(&mut self, _crd: u32, load: bool, word: u32) -> u32 {
            if load {
                self.loaded.push(word);
                0
            } else {
                self.read_value
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingCoprocessor;
    use super::Coprocessor;

    #[test]
    fn register_traffic_is_recorded() {
        let mut cp = RecordingCoprocessor {
            read_value: 7,
            ..Default::default()
        };

        cp.write_reg(0, 1, 2, 0xAB);
        assert_eq!(cp.writes, vec![(0, 1, 2, 0xAB)]);
        assert_eq!(cp.read_reg(0, 1, 2), 7);
    }

    #[test]
    fn memory_transfers_move_words_both_ways() {
        let mut cp = RecordingCoprocessor {
            read_value: 0xC0DE,
            ..Default::default()
        };

        // Store path: the coprocessor supplies the outgoing word.
        assert_eq!(cp.mem_transfer(1, false, 0), 0xC0DE);

        // Load path: the coprocessor consumes the fetched word.
        cp.mem_transfer(1, true, 0x55AA);
        assert_eq!(cp.loaded, vec![0x55AA]);
    }
}
