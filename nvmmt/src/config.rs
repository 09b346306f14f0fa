// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

use std::path::PathBuf;

use crate::formatting::OutputMode;

pub const DEFAULT_MARKER_PATH: &str = "/sys/kernel/debug/tracing/trace_marker";

/// Upper bound for a single memory dump, whatever size the driver claims.
pub const DEFAULT_MAX_DUMP_LEN: u32 = 0x0100_0000;

/// Options of a trace session, normally filled in from the host's command line.
#[derive(Clone, Debug)]
pub struct Config {
    /// Classify driver file descriptors on open; nothing is decoded without it.
    pub trace_ioctls: bool,
    /// Write a mark to the kernel trace marker around every decoded ioctl, so the trace can be
    /// lined up with mmiotrace.
    pub trace_marks: bool,
    pub output: OutputMode,
    pub marker_path: PathBuf,
    pub max_dump_len: u32,
    /// Process id written into marks.
    pub pid: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            trace_ioctls: true,
            trace_marks: false,
            output: OutputMode::default(),
            marker_path: PathBuf::from(DEFAULT_MARKER_PATH),
            max_dump_len: DEFAULT_MAX_DUMP_LEN,
            pid: std::process::id(),
        }
    }
}
