// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

//! Request codes of the driver's escape ioctls.
//!
//! All of them are `_IOWR('F', nr, size)`. The argument blocks are arrays of 32 bit words; the
//! comments name the words the tracer looks at.

/// Type byte shared by every escape ioctl.
pub const NV_IOCTL_MAGIC: u32 = 0x46;

/// Returns the type byte of a request code.
pub const fn ioctl_type(request: u32) -> u32 {
    (request >> 8) & 0xff
}

/// Returns the escape number of a request code.
pub const fn ioctl_nr(request: u32) -> u32 {
    request & 0xff
}

/// Returns the size of the argument block encoded in the request code.
pub const fn ioctl_size(request: u32) -> u32 {
    (request & 0x3fff_0000) >> 16
}

/// Whether the request code belongs to the driver's escape range.
pub const fn is_escape(request: u32) -> bool {
    ioctl_type(request) == NV_IOCTL_MAGIC
}

/// Issued on the control node without an argument block.
pub const NVRM_IOCTL_UNK_30000001: u32 = 0x3000_0001;

/// Issued on the control node with a 24 byte argument block.
pub const NVRM_IOCTL_UNK_00000001: u32 = 0x0000_0001;
pub const NVRM_IOCTL_UNK_00000001_SIZE: u32 = 24;

/// Initialize; word 0 returns the context object.
pub const NVRM_IOCTL_CREATE_CTX: u32 = 0xc00c_4622;

/// Creates the device object; word 1 is the object, word 4 points at 0x3c bytes of arguments.
pub const NVRM_IOCTL_CREATE_DEV_OBJ: u32 = 0xc020_4623;
pub const NVRM_IOCTL_CREATE_DEV_OBJ_ARGS_LEN: u32 = 0x3c;

/// Creates an object that is mapped right away; words 1/2 are the handles, word 3 the class,
/// words 6/7 the returned mmap offset.
pub const NVRM_IOCTL_CREATE_VSPACE: u32 = 0xc030_4627;

/// Destroys an object; words 1/2 are the handles.
pub const NVRM_IOCTL_DESTROY: u32 = 0xc010_4629;

/// Calls a method on an object; word 1 is the object, word 2 the method, words 4/5 point at the
/// parameters and words 6/7 hold their size.
pub const NVRM_IOCTL_CALL: u32 = 0xc020_462a;

/// Creates a gpu object; words 1/2 are the handles, word 3 the class, words 4/5 point at the
/// constructor arguments.
pub const NVRM_IOCTL_CREATE: u32 = 0xc020_462b;

/// Creates a driver object; words 1/2 are the handles, word 3 the class.
pub const NVRM_IOCTL_CREATE_DRV_OBJ: u32 = 0xc014_462d;

/// Queries the driver; word 2 is the query, word 4 points at the buffer, word 6 its size.
pub const NVRM_IOCTL_QUERY: u32 = 0xc020_4637;

/// Reads a configuration parameter; word 4 points at the buffer, word 6 its size.
pub const NVRM_IOCTL_CONFIG: u32 = 0xc020_4638;

/// Issued after opening a card node; words 6/7 point at a string.
pub const NVRM_IOCTL_UNK4D: u32 = 0xc040_464d;

/// Allocates a host mapping for an existing object; words 1/2 are the handles, words 8/9 the
/// returned mmap offset.
pub const NVRM_IOCTL_HOST_MAP: u32 = 0xc030_464e;

/// Releases a host mapping; words 1/2 are the handles, words 4/5 the mmap offset.
pub const NVRM_IOCTL_HOST_UNMAP: u32 = 0xc020_464f;

/// Creates a DMA object; word 1 is the object, word 2 the type, word 5 the parent.
pub const NVRM_IOCTL_CREATE_DMA: u32 = 0xc030_4654;

/// Maps memory into a GPU address space; words 10/11 return the GPU address, word 6 the length.
pub const NVRM_IOCTL_VSPACE_MAP: u32 = 0xc038_4657;

/// Unmaps memory from a GPU address space; words 6/7 are the GPU address.
pub const NVRM_IOCTL_VSPACE_UNMAP: u32 = 0xc028_4658;

/// Binds two objects; words 1/2.
pub const NVRM_IOCTL_BIND: u32 = 0xc010_4659;

/// Copies memory to the GPU.
pub const NVRM_IOCTL_COPY_TO_GPU: u32 = 0xc028_465e;

/// `NVRM_IOCTL_QUERY` query code that lists the supported object classes.
pub const NVRM_QUERY_OBJECT_CLASSES: u32 = 0x14c;
