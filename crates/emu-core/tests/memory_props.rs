//! Property tests for the reference memory and clock.

use emu_core::{Clock, CycleCounter, Cycles, Memory, MemoryError, Ram};
use proptest::prelude::*;

proptest! {
    #[test]
    fn word_write_then_read_round_trips(address in 0u16..0xFFFF, value: u16) {
        let mut ram = Ram::default();
        ram.write_word(address, value).unwrap();
        prop_assert_eq!(ram.read_word(address), value);
        prop_assert_eq!(ram.read(address), value as u8);
        prop_assert_eq!(ram.read(address + 1), (value >> 8) as u8);
    }

    #[test]
    fn writes_beyond_size_always_fail(size in 1usize..0x8000, offset in 0u16..0x100, value: u8) {
        let mut ram = Ram::new(size);
        let address = size as u16 + offset;
        prop_assert_eq!(
            ram.write(address, value),
            Err(MemoryError::AddressOutOfRange { address, size })
        );
    }

    #[test]
    fn counter_total_is_exact_sum(costs in proptest::collection::vec(0u64..3000, 0..200)) {
        let mut clock = CycleCounter::new();
        for &c in &costs {
            clock.increment(Cycles::from_hundredths(c));
        }
        prop_assert_eq!(clock.elapsed().hundredths(), costs.iter().sum::<u64>());
    }
}
