// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

use std::os::fd::RawFd;

use log::{trace, warn};

/// One region of a card node the driver handed out, from the ioctl that allocates its mmap
/// offset until it is released.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappingRecord {
    /// Descriptor the region was mapped through; `None` until the mmap lands.
    pub fd: Option<RawFd>,
    pub start: u64,
    pub end: u64,
    /// Offset the driver returned for this mapping, the key mmap is correlated on.
    pub offset: u64,
    /// Serial number, assigned once when the record is created.
    pub id: u32,
    /// Handles of the object the mapping was allocated for.
    pub data1: u32,
    pub data2: u32,
}

impl MappingRecord {
    /// A record for an offset the driver allocated that has not been mapped yet.
    pub fn unmapped(offset: u64, id: u32) -> Self {
        MappingRecord {
            fd: None,
            start: 0,
            end: 0,
            offset,
            id,
            data1: 0,
            data2: 0,
        }
    }

    pub fn size(&self) -> u64 {
        self.end.wrapping_sub(self.start)
    }

    pub fn is_mapped(&self) -> bool {
        self.fd.is_some()
    }

    pub fn handles(&self) -> (u32, u32) {
        (self.data1, self.data2)
    }
}

/// The live mapping records.
///
/// Removal hands the record back, so nothing can keep referring to a released region.
#[derive(Debug, Default)]
pub struct RegionTable {
    regions: Vec<MappingRecord>,
    next_id: u32,
}

impl RegionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next serial number.
    pub fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Inserts `record`, replacing a live record with the same offset.
    pub fn add(&mut self, record: MappingRecord) -> &mut MappingRecord {
        if let Some(old) = self.remove_by_offset(record.offset) {
            warn!(
                "Replacing region {} at offset {:#x} that was never released",
                old.id, old.offset
            );
        }

        trace!("Tracking region {} at offset {:#x}", record.id, record.offset);

        let index = self.regions.len();
        self.regions.push(record);
        &mut self.regions[index]
    }

    pub fn find_by_offset(&self, offset: u64) -> Option<&MappingRecord> {
        self.regions.iter().find(|r| r.offset == offset)
    }

    pub fn find_by_offset_mut(&mut self, offset: u64) -> Option<&mut MappingRecord> {
        self.regions.iter_mut().find(|r| r.offset == offset)
    }

    pub fn find_by_handle_pair(&self, data1: u32, data2: u32) -> Option<&MappingRecord> {
        self.regions
            .iter()
            .find(|r| r.handles() == (data1, data2))
    }

    /// Finds the record an mmap of `fd` at `offset` completes: one mapped through the same
    /// descriptor, or one not mapped yet.
    pub fn find_by_fd_and_offset(&self, fd: RawFd, offset: u64) -> Option<&MappingRecord> {
        self.position_by_fd_and_offset(fd, offset)
            .map(|i| &self.regions[i])
    }

    pub fn remove_by_offset(&mut self, offset: u64) -> Option<MappingRecord> {
        let index = self.regions.iter().position(|r| r.offset == offset)?;
        Some(self.regions.swap_remove(index))
    }

    pub fn remove_by_handle_pair(&mut self, data1: u32, data2: u32) -> Option<MappingRecord> {
        let index = self
            .regions
            .iter()
            .position(|r| r.handles() == (data1, data2))?;
        Some(self.regions.swap_remove(index))
    }

    pub fn remove_by_fd_and_offset(&mut self, fd: RawFd, offset: u64) -> Option<MappingRecord> {
        let index = self.position_by_fd_and_offset(fd, offset)?;
        Some(self.regions.swap_remove(index))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappingRecord> {
        self.regions.iter()
    }

    fn position_by_fd_and_offset(&self, fd: RawFd, offset: u64) -> Option<usize> {
        self.regions
            .iter()
            .position(|r| r.offset == offset && (r.fd.is_none() || r.fd == Some(fd)))
    }
}
