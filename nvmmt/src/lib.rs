// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

//! Decodes the ioctls a process issues to the proprietary NVIDIA driver and writes a trace of
//! the objects, mappings and method calls it sees.
//!
//! The crate is driven by an instrumentation host: it owns a [`Session`] and calls its hooks
//! around the `open`, `close`, `mmap` and `ioctl` system calls of the traced process. The trace
//! is written either as text, one line per event, or in the binary record format described in
//! [`nvmmt_common::wire`], which [`decode::RecordReader`] reads back.

pub mod args;
pub mod config;
pub mod decode;
pub mod fds;
mod format_helpers;
pub mod formatting;
mod ioctls;
pub mod memory;
mod methods;
pub mod records;
pub mod regions;
pub mod session;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use formatting::{OutputMode, TraceWriter};
pub use memory::{GuestMemory, ProcessMemory};
pub use records::TraceRecord;
pub use session::{MmapArgs, Session, SharedSession};
