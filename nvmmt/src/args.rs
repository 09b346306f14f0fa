// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

use nvmmt_common::{is_plausible_pointer, join_words};

use crate::memory::GuestMemory;

/// A copy of a little endian parameter block taken from the traced process: an ioctl argument
/// block, or the parameters of a method call.
///
/// Every accessor is bounds checked; fields past the end of the block read as `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArgBlock {
    bytes: Vec<u8>,
}

impl ArgBlock {
    pub fn new(bytes: Vec<u8>) -> Self {
        ArgBlock { bytes }
    }

    pub fn from_words(words: &[u32]) -> Self {
        ArgBlock {
            bytes: words.iter().flat_map(|w| w.to_le_bytes()).collect(),
        }
    }

    /// Copies `len` bytes at `addr`. A null, sentinel or unreadable address gives an empty
    /// block.
    pub fn fetch(memory: &dyn GuestMemory, addr: u64, len: usize) -> Self {
        if !is_plausible_pointer(addr) {
            return ArgBlock::default();
        }

        ArgBlock::new(memory.read_bytes(addr, len).unwrap_or_default())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn u32_at(&self, offset: usize) -> Option<u32> {
        let bytes = self.bytes.get(offset..offset.checked_add(4)?)?;
        Some(u32::from_le_bytes(bytes.try_into().ok()?))
    }

    pub fn u64_at(&self, offset: usize) -> Option<u64> {
        let bytes = self.bytes.get(offset..offset.checked_add(8)?)?;
        Some(u64::from_le_bytes(bytes.try_into().ok()?))
    }

    /// The `index`th 32 bit word.
    pub fn word(&self, index: usize) -> Option<u32> {
        self.u32_at(index.checked_mul(4)?)
    }

    /// Joins words `lo` and `hi` into `(hi << 32) | lo`.
    pub fn pair(&self, lo: usize, hi: usize) -> Option<u64> {
        Some(join_words(self.word(hi)?, self.word(lo)?))
    }

    /// A pointer stored in words `lo` and `lo + 1`.
    pub fn ptr(&self, lo: usize) -> Option<u64> {
        self.pair(lo, lo + 1)
    }

    pub fn words(&self) -> impl Iterator<Item = u32> + '_ {
        self.bytes
            .chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn word_accessors() {
        let args = ArgBlock::from_words(&[0xc1d0_0046, 0x5c00_0001, 0xbe88_a948, 0x0000_7fff]);

        assert_eq!(args.word(0), Some(0xc1d0_0046));
        assert_eq!(args.word(3), Some(0x7fff));
        assert_eq!(args.word(4), None);
        assert_eq!(args.pair(2, 3), Some(0x7fff_be88_a948));
        assert_eq!(args.ptr(2), Some(0x7fff_be88_a948));
        assert_eq!(args.pair(3, 4), None);
    }

    #[test]
    fn unaligned_offsets() {
        let args = ArgBlock::new(vec![0, 1, 2, 3, 4, 5, 6, 7, 8]);

        assert_eq!(args.u32_at(1), Some(0x0403_0201));
        assert_eq!(args.u64_at(1), Some(0x0807_0605_0403_0201));
        assert_eq!(args.u64_at(2), None);
        assert_eq!(args.u32_at(usize::MAX - 1), None);
    }

    #[test]
    fn trailing_bytes_are_not_a_word() {
        let args = ArgBlock::new(vec![1, 0, 0, 0, 2, 0]);
        assert_eq!(args.words().collect::<Vec<_>>(), vec![1]);
        assert_eq!(args.word(1), None);
    }
}
