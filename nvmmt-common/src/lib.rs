// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

//! Layouts and constants of the proprietary NVIDIA kernel driver interface, as far as they
//! have been reverse engineered, plus the vocabulary of the binary trace format.

#![no_std]

pub mod nvrm_ioctl;
pub mod nvrm_mthd;
pub mod object_types;
pub mod wire;

/// Path of the control device node.
pub const CONTROL_DEVICE_PATH: &str = "/dev/nvidiactl";

/// Every other device node of the driver (`/dev/nvidia0`, `/dev/nvidia-uvm`, ...) starts with
/// this prefix.
pub const CARD_DEVICE_PREFIX: &str = "/dev/nvidia";

/// Handles in the `0xbeefXXXX` range are driver-generated placeholders, never real addresses.
pub const SENTINEL_HANDLE_MASK: u64 = 0xffff_0000;
pub const SENTINEL_HANDLE_VALUE: u64 = 0xbeef_0000;

/// Whether `addr` is usable as a pointer into the traced process.
///
/// Only bits 16 to 31 are compared, so a 64 bit pointer with `0xbeef` there is treated as
/// absent too.
pub const fn is_plausible_pointer(addr: u64) -> bool {
    addr != 0 && (addr & SENTINEL_HANDLE_MASK) != SENTINEL_HANDLE_VALUE
}

/// Joins two 32 bit argument words into a 64 bit value, `hi` being the most significant.
pub const fn join_words(hi: u32, lo: u32) -> u64 {
    ((hi as u64) << 32) | lo as u64
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sentinel_handles_are_not_pointers() {
        assert!(!is_plausible_pointer(0));
        assert!(!is_plausible_pointer(0xbeef_0003));
        assert!(!is_plausible_pointer(0x1_beef_0028));
        assert!(is_plausible_pointer(0xbe88_a948));
        assert!(!is_plausible_pointer(0x7f12_beef_1000));
        assert!(is_plausible_pointer(0x7f12_3456_1000));
    }

    #[test]
    fn words_join_high_then_low() {
        assert_eq!(join_words(0x0000_7fff, 0xbe88_a948), 0x7fff_be88_a948);
        assert_eq!(join_words(0, 0x1000), 0x1000);
    }
}
