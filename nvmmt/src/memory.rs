// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

use std::io::{self, IoSliceMut};

use log::debug;
use nix::{
    sys::uio::{process_vm_readv, RemoteIoVec},
    unistd::Pid,
};

/// Strings are read in chunks that never cross a page boundary, so a string that ends right
/// before an unmapped page can still be read.
const PAGE_SIZE: u64 = 4096;

/// Read access to the address space of the traced process.
pub trait GuestMemory {
    /// Fills `buf` with the bytes at `addr`, failing unless all of them could be read.
    fn read_into(&self, addr: u64, buf: &mut [u8]) -> io::Result<()>;

    /// Reads `len` bytes at `addr`; an unreadable range is reported as `None`.
    fn read_bytes(&self, addr: u64, len: usize) -> Option<Vec<u8>> {
        let mut buf = vec![0; len];
        match self.read_into(addr, &mut buf) {
            Ok(()) => Some(buf),
            Err(e) => {
                debug!("Cannot read {len} bytes at {addr:#x}: {e}");
                None
            }
        }
    }

    /// Reads a NUL terminated string of at most `max_len` bytes, terminator excluded.
    fn read_cstring(&self, addr: u64, max_len: usize) -> Option<Vec<u8>> {
        let mut out = Vec::new();
        let mut cursor = addr;

        while out.len() < max_len {
            let to_page_end = (PAGE_SIZE - cursor % PAGE_SIZE) as usize;
            let chunk_len = to_page_end.min(max_len - out.len());
            let chunk = self.read_bytes(cursor, chunk_len)?;

            if let Some(nul) = chunk.iter().position(|&b| b == 0) {
                out.extend_from_slice(&chunk[..nul]);
                return Some(out);
            }

            out.extend_from_slice(&chunk);
            cursor = cursor.checked_add(chunk_len as u64)?;
        }

        Some(out)
    }
}

/// Memory of a live process, read with `process_vm_readv`.
#[derive(Clone, Copy, Debug)]
pub struct ProcessMemory {
    pid: Pid,
}

impl ProcessMemory {
    pub fn new(pid: u32) -> Self {
        ProcessMemory {
            pid: Pid::from_raw(pid as i32),
        }
    }

    /// The calling process, for hosts that run inside the traced program.
    pub fn current() -> Self {
        ProcessMemory {
            pid: nix::unistd::getpid(),
        }
    }
}

impl GuestMemory for ProcessMemory {
    fn read_into(&self, addr: u64, buf: &mut [u8]) -> io::Result<()> {
        if buf.is_empty() {
            return Ok(());
        }

        let base = usize::try_from(addr)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "address out of range"))?;
        let len = buf.len();
        let remote = [RemoteIoVec { base, len }];

        let read = process_vm_readv(self.pid, &mut [IoSliceMut::new(buf)], &remote)
            .map_err(io::Error::from)?;

        if read < len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("short read at {addr:#x}: {read} of {len} bytes"),
            ));
        }

        Ok(())
    }
}
