// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

//! Vocabulary of the binary trace.
//!
//! A record is the class byte, a tag byte, the tag's fields and `END_OF_RECORD`. Integers are
//! little endian, strings and buffers are a u32 length followed by the bytes.

/// Class byte of every record emitted for the driver.
pub const RECORD_CLASS: u8 = b'n';

pub const END_OF_RECORD: u8 = b'\n';

pub const TAG_ALLOCATE_MAP: u8 = b'a';
pub const TAG_BIND: u8 = b'b';
pub const TAG_CREATE_OBJECT: u8 = b'c';
pub const TAG_DESTROY_OBJECT: u8 = b'd';
pub const TAG_DEALLOCATE_MAP: u8 = b'e';
pub const TAG_GPU_MAP: u8 = b'G';
pub const TAG_GPU_UNMAP: u8 = b'H';
pub const TAG_IOCTL_PRE: u8 = b'i';
pub const TAG_IOCTL_POST: u8 = b'j';
pub const TAG_MARK: u8 = b'k';
pub const TAG_CALL_METHOD: u8 = b'l';
pub const TAG_MMAP: u8 = b'm';
pub const TAG_MEMORY_DUMP: u8 = b'o';
pub const TAG_CREATE_MAPPED_OBJECT: u8 = b'p';
pub const TAG_CREATE_DRIVER_OBJECT: u8 = b'r';
pub const TAG_CREATE_DMA_OBJECT: u8 = b't';
pub const TAG_CREATE_DEVICE_OBJECT: u8 = b'v';
pub const TAG_CREATE_CONTEXT_OBJECT: u8 = b'x';
pub const TAG_CALL_METHOD_DATA: u8 = b'1';
pub const TAG_IOCTL_4D: u8 = b'4';
