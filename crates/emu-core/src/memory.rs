//! Memory port.

use thiserror::Error;

/// A failed memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// The write target lies beyond the backing store.
    #[error("address {address:#06X} is outside the {size}-byte address space")]
    AddressOutOfRange { address: u16, size: usize },
}

/// Byte-addressable storage seen by a CPU.
///
/// Reads never fail: hardware always puts something on the data bus.
/// Writes may fail when the target lies beyond the backing store. Words are
/// little-endian in both directions; the byte at `address` is the low byte.
pub trait Memory {
    /// Read a byte.
    fn read(&self, address: u16) -> u8;

    /// Write a byte.
    fn write(&mut self, address: u16, value: u8) -> Result<(), MemoryError>;

    /// Number of bytes backing this port.
    fn size(&self) -> usize;

    /// Read a little-endian word. The high byte address wraps at 0xFFFF.
    fn read_word(&self, address: u16) -> u16 {
        let lo = self.read(address);
        let hi = self.read(address.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    /// Write a little-endian word, low byte first.
    ///
    /// Both target bytes are checked before either is written.
    fn write_word(&mut self, address: u16, value: u16) -> Result<(), MemoryError> {
        let hi_address = address.wrapping_add(1);
        let size = self.size();
        for a in [address, hi_address] {
            if usize::from(a) >= size {
                return Err(MemoryError::AddressOutOfRange { address: a, size });
            }
        }
        let [lo, hi] = value.to_le_bytes();
        self.write(address, lo)?;
        self.write(hi_address, hi)
    }
}

/// Flat RAM of up to 64K.
#[derive(Debug, Clone)]
pub struct Ram {
    data: Vec<u8>,
}

impl Ram {
    /// Largest store a 16-bit address bus can reach.
    pub const FULL: usize = 0x1_0000;

    /// Zeroed RAM of `size` bytes, clamped to `1..=64K`.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size.clamp(1, Self::FULL)],
        }
    }

    /// Copy an image into RAM starting at `address`.
    ///
    /// Nothing is written unless the whole image fits.
    pub fn load(&mut self, address: u16, image: &[u8]) -> Result<(), MemoryError> {
        let start = usize::from(address);
        let end = start + image.len();
        if end > self.data.len() {
            let last = end.saturating_sub(1).min(usize::from(u16::MAX));
            return Err(MemoryError::AddressOutOfRange {
                address: last as u16,
                size: self.data.len(),
            });
        }
        self.data[start..end].copy_from_slice(image);
        log::debug!("loaded {} bytes at {address:#06X}", image.len());
        Ok(())
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new(Self::FULL)
    }
}

impl Memory for Ram {
    fn read(&self, address: u16) -> u8 {
        self.data[usize::from(address) % self.data.len()]
    }

    fn write(&mut self, address: u16, value: u8) -> Result<(), MemoryError> {
        let size = self.data.len();
        let slot = self
            .data
            .get_mut(usize::from(address))
            .ok_or(MemoryError::AddressOutOfRange { address, size })?;
        *slot = value;
        Ok(())
    }

    fn size(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_round_trip_is_little_endian() {
        let mut ram = Ram::new(1024);
        ram.write_word(0x0100, 0x1234).unwrap();
        assert_eq!(ram.read(0x0100), 0x34);
        assert_eq!(ram.read(0x0101), 0x12);
        assert_eq!(ram.read_word(0x0100), 0x1234);
    }

    #[test]
    fn write_past_end_fails() {
        let mut ram = Ram::new(1024);
        assert_eq!(
            ram.write(1024, 1),
            Err(MemoryError::AddressOutOfRange { address: 1024, size: 1024 })
        );
    }

    #[test]
    fn straddling_word_write_leaves_memory_untouched() {
        let mut ram = Ram::new(1024);
        let err = ram.write_word(1023, 0xBEEF).unwrap_err();
        assert_eq!(err, MemoryError::AddressOutOfRange { address: 1024, size: 1024 });
        assert_eq!(ram.read(1023), 0);
    }

    #[test]
    fn reads_wrap_at_backing_size() {
        let mut ram = Ram::new(1024);
        ram.write(5, 0xAA).unwrap();
        assert_eq!(ram.read(1024 + 5), 0xAA);
    }

    #[test]
    fn full_ram_word_wraps_at_top() {
        let mut ram = Ram::default();
        ram.write(0xFFFF, 0x34).unwrap();
        ram.write(0x0000, 0x12).unwrap();
        assert_eq!(ram.read_word(0xFFFF), 0x1234);
    }

    #[test]
    fn load_copies_image() {
        let mut ram = Ram::new(16);
        ram.load(4, &[1, 2, 3]).unwrap();
        assert_eq!(&ram.as_slice()[3..8], &[0, 1, 2, 3, 0]);
    }

    #[test]
    fn oversized_load_is_rejected() {
        let mut ram = Ram::new(16);
        assert!(ram.load(14, &[1, 2, 3]).is_err());
        assert!(ram.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn size_is_clamped() {
        assert_eq!(Ram::new(0).size(), 1);
        assert_eq!(Ram::new(1 << 20).size(), Ram::FULL);
    }
}
