// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

use std::{
    fs::{File, OpenOptions},
    io::Write,
    os::fd::RawFd,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use anyhow::Result;
use log::{debug, trace, warn};
use nvmmt_common::{is_plausible_pointer, nvrm_ioctl::*};

use crate::{
    args::ArgBlock,
    config::Config,
    fds::{DeviceClass, FdClassifier},
    format_helpers::push_hex_words,
    formatting::TraceWriter,
    ioctls::{self, Action},
    memory::GuestMemory,
    message,
    methods::{self, Extent, Location, MethodLayout, TrailingArray},
    records::TraceRecord,
    regions::{MappingRecord, RegionTable},
};

/// Longest string read for an ioctl 0x4d.
const MAX_ESCAPE_STRING_LEN: usize = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Pre,
    Post,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::Pre => "pre",
            Phase::Post => "post",
        }
    }

    fn mark_suffix(self) -> &'static str {
        match self {
            Phase::Pre => "PRE",
            Phase::Post => "POST",
        }
    }
}

/// Arguments of an mmap call, as the host saw them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MmapArgs {
    pub addr: u64,
    pub length: u64,
    pub prot: i32,
    pub flags: i32,
    pub fd: RawFd,
    pub offset: u64,
}

/// `MAP_FAILED`, or a raw `-errno` from the kernel.
fn mmap_failed(result: u64) -> bool {
    let raw = result as i64;
    result == libc::MAP_FAILED as u64 || (-4095..0).contains(&raw)
}

/// Tracer state for one traced process.
///
/// The host calls the hooks from the thread doing the system call, `pre_ioctl` and
/// `post_ioctl` for the same call back to back. A multi-threaded host shares a
/// [`SharedSession`] instead.
pub struct Session {
    config: Config,
    memory: Box<dyn GuestMemory + Send>,
    writer: TraceWriter,
    fds: FdClassifier,
    regions: RegionTable,
    marker: Option<File>,
    mark_count: u32,
}

impl Session {
    /// Sets up a session writing records and messages to `text` and, in binary mode, records
    /// to `binary`.
    ///
    /// When marks are enabled the marker file is opened here; if that fails marks stay off for
    /// the whole session.
    pub fn new(
        mut config: Config,
        memory: Box<dyn GuestMemory + Send>,
        text: Box<dyn Write + Send>,
        binary: Box<dyn Write + Send>,
    ) -> Self {
        let marker = if config.trace_marks {
            match OpenOptions::new().write(true).open(&config.marker_path) {
                Ok(file) => Some(file),
                Err(e) => {
                    warn!(
                        "Cannot open marker file {}: {e}",
                        config.marker_path.display()
                    );
                    None
                }
            }
        } else {
            None
        };
        config.trace_marks = marker.is_some();

        let writer = TraceWriter::new(config.output, text, binary);

        Session {
            config,
            memory,
            writer,
            fds: FdClassifier::new(),
            regions: RegionTable::new(),
            marker,
            mark_count: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fds(&self) -> &FdClassifier {
        &self.fds
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Closes the marker file and flushes the trace.
    pub fn fini(&mut self) -> Result<()> {
        self.marker = None;
        self.writer.flush()
    }

    /// Called after `open` returned `result` for `path`.
    pub fn post_open(&mut self, path: &Path, result: i64) -> Option<DeviceClass> {
        if !self.config.trace_ioctls {
            return None;
        }

        let fd = RawFd::try_from(result).ok().filter(|fd| *fd >= 0)?;
        self.fds.on_open(fd, path)
    }

    pub fn post_close(&mut self, fd: RawFd) {
        self.fds.on_close(fd);
    }

    /// Called after `mmap` returned `result`; `offset_unit` scales the offset argument (4096
    /// for `mmap2`).
    ///
    /// Returns whether the mapping completed one the driver handed out.
    pub fn post_mmap(&mut self, args: &MmapArgs, result: u64, offset_unit: u64) -> Result<bool> {
        if !self.config.trace_ioctls || !self.fds.is_card(args.fd) || mmap_failed(result) {
            return Ok(false);
        }

        let offset = args.offset.wrapping_mul(offset_unit);
        let Some(old) = self.regions.remove_by_fd_and_offset(args.fd, offset) else {
            trace!("mmap of fd {} at offset {offset:#x} is not tracked", args.fd);
            return Ok(false);
        };

        let region = self.regions.add(MappingRecord {
            fd: Some(args.fd),
            start: result,
            end: result.wrapping_add(args.length),
            ..old
        });

        let record = TraceRecord::Mmap {
            offset: region.offset,
            id: region.id,
            start: region.start,
            len: region.size(),
            data1: region.data1 as u64,
            data2: region.data2 as u64,
        };
        self.writer.emit(&record)?;

        Ok(true)
    }

    /// Called before the ioctl runs; `argp` points at the argument block.
    pub fn pre_ioctl(&mut self, fd: RawFd, request: u32, argp: u64) -> Result<()> {
        self.ioctl(Phase::Pre, fd, request, argp)
    }

    /// Called after the ioctl returned, with the argument block updated by the driver.
    pub fn post_ioctl(&mut self, fd: RawFd, request: u32, argp: u64) -> Result<()> {
        self.ioctl(Phase::Post, fd, request, argp)
    }

    fn ioctl(&mut self, phase: Phase, fd: RawFd, request: u32, argp: u64) -> Result<()> {
        if !self.fds.is_tracked(fd) {
            return Ok(());
        }

        self.mark(phase)?;

        let args = self.summarize(phase, fd, request, argp)?;

        let Some(decoder) = ioctls::find_decoder(request) else {
            trace!("No decoder for ioctl {request:#x}");
            return Ok(());
        };

        let decode = match phase {
            Phase::Pre => decoder.pre,
            Phase::Post => decoder.post,
        };
        let Some(decode) = decode else {
            return Ok(());
        };

        match decode(&args) {
            Some(actions) => {
                for action in actions {
                    self.run(action)?;
                }
            }
            None => debug!(
                "Argument block of {} ioctl is too short ({} bytes)",
                decoder.name,
                args.len()
            ),
        }

        Ok(())
    }

    fn mark(&mut self, phase: Phase) -> Result<()> {
        let Some(marker) = self.marker.as_mut() else {
            return Ok(());
        };

        let text = format!(
            "VG-{}-{}-{}\n",
            self.config.pid,
            self.mark_count,
            phase.mark_suffix()
        );
        if phase == Phase::Post {
            self.mark_count = self.mark_count.wrapping_add(1);
        }

        if let Err(e) = marker.write_all(text.as_bytes()) {
            warn!("Cannot write trace mark: {e}");
        }

        self.writer.emit(&TraceRecord::Mark { text })
    }

    /// Writes the line every ioctl on a driver node gets and returns its argument block.
    fn summarize(&mut self, phase: Phase, fd: RawFd, request: u32, argp: u64) -> Result<ArgBlock> {
        if is_escape(request) {
            let args = ArgBlock::fetch(&*self.memory, argp, ioctl_size(request) as usize);
            let data = args.as_bytes().to_vec();
            let record = match phase {
                Phase::Pre => TraceRecord::IoctlPre {
                    fd,
                    id: request,
                    data,
                },
                Phase::Post => TraceRecord::IoctlPost {
                    fd,
                    id: request,
                    data,
                },
            };
            self.writer.emit(&record)?;
            return Ok(args);
        }

        match request {
            NVRM_IOCTL_UNK_30000001 => {
                message!(
                    self.writer,
                    "{}_ioctl: fd:{fd},           (full:0x{request:x})",
                    phase.name()
                );
                Ok(ArgBlock::default())
            }
            NVRM_IOCTL_UNK_00000001 => {
                let args = ArgBlock::fetch(
                    &*self.memory,
                    argp,
                    NVRM_IOCTL_UNK_00000001_SIZE as usize,
                );
                let mut line = format!(
                    "{}_ioctl: fd:{fd},           (full:0x{request:x}) data: ",
                    phase.name()
                );
                push_hex_words(&mut line, args.as_bytes());
                self.writer.message(&line)?;
                Ok(args)
            }
            _ => {
                message!(
                    self.writer,
                    "{}_ioctl, fd: {fd}, wrong id:0x{request:x}",
                    phase.name()
                );
                Ok(ArgBlock::default())
            }
        }
    }

    fn run(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Emit(record) => self.writer.emit(&record),
            Action::Dump { label, addr, len } => self.dump(label, addr, len),
            Action::MethodCall {
                label,
                mthd,
                params,
                size,
            } => self.dump_method_call(label, mthd, params, size),
            Action::Escape4dString { ptr } => {
                let text = self
                    .read_string(ptr)
                    .unwrap_or_else(|| {
                        debug!("Cannot read ioctl 0x4d string at {ptr:#x}");
                        String::new()
                    });
                self.writer.emit(&TraceRecord::Ioctl4d { text })
            }
            Action::TrackMapping { offset, obj1, obj2 } => {
                self.track_mapping(offset, obj1, obj2);
                Ok(())
            }
            Action::ReleaseByOffset { offset, obj1, obj2 } => {
                match self.regions.remove_by_offset(offset) {
                    Some(region) => {
                        debug!("Released region {} at offset {offset:#x}", region.id);
                        self.writer.emit(&TraceRecord::DeallocateMap {
                            obj1,
                            obj2,
                            addr: offset,
                        })
                    }
                    None => Ok(()),
                }
            }
            Action::ReleaseByHandles { obj1, obj2 } => {
                match self.regions.remove_by_handle_pair(obj1, obj2) {
                    // Emitted even for a region that was never mapped, with address 0.
                    Some(region) => {
                        debug!("Released region {} of {obj1:#x}:{obj2:#x}", region.id);
                        self.writer.emit(&TraceRecord::DeallocateMap {
                            obj1,
                            obj2,
                            addr: region.start,
                        })
                    }
                    None => Ok(()),
                }
            }
            Action::ObjectClasses { list } => self.dump_object_classes(list),
        }
    }

    fn track_mapping(&mut self, offset: u64, obj1: u32, obj2: u32) {
        if self.regions.find_by_offset(offset).is_none() {
            let id = self.regions.next_id();
            self.regions.add(MappingRecord::unmapped(offset, id));
        }

        if let Some(region) = self.regions.find_by_offset_mut(offset) {
            region.data1 = obj1;
            region.data2 = obj2;
        }
    }

    /// Copies guest memory for a dump, `None` for absent or unreadable addresses.
    fn read_guest(&self, addr: u64, len: u64) -> Option<Vec<u8>> {
        if !is_plausible_pointer(addr) {
            return None;
        }

        let max = self.config.max_dump_len as u64;
        if len > max {
            debug!("Truncating dump of {len:#x} bytes at {addr:#x}");
        }

        self.memory.read_bytes(addr, len.min(max) as usize)
    }

    fn read_string(&self, ptr: u64) -> Option<String> {
        if !is_plausible_pointer(ptr) {
            return None;
        }

        let bytes = self.memory.read_cstring(ptr, MAX_ESCAPE_STRING_LEN)?;
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn dump(&mut self, label: &str, addr: u64, len: u64) -> Result<()> {
        let data = self.read_guest(addr, len);
        self.emit_dump(label, addr, data)
    }

    fn emit_dump(&mut self, label: &str, addr: u64, data: Option<Vec<u8>>) -> Result<()> {
        let record = match data {
            Some(data) => TraceRecord::Dump {
                addr,
                label: label.to_string(),
                data,
            },
            None => TraceRecord::absent_dump(addr),
        };
        self.writer.emit(&record)
    }

    /// Dumps the parameters of a method call, then the arrays they point at for the methods
    /// whose layout is known.
    fn dump_method_call(&mut self, label: &str, mthd: u32, addr: u64, size: u64) -> Result<()> {
        let data = self.read_guest(addr, size);
        let params = data.clone().map(ArgBlock::new);
        self.emit_dump(label, addr, data)?;

        let (Some(params), Some(method)) = (params, methods::find_method(mthd)) else {
            return Ok(());
        };

        match method.layout {
            MethodLayout::Arrays(arrays) => {
                for array in arrays {
                    self.dump_trailing_array(array, addr, &params)?;
                }
                Ok(())
            }
            MethodLayout::RegisterTransactions { count_at, ptr_at } => {
                self.dump_register_transactions(addr, &params, count_at, ptr_at)
            }
        }
    }

    fn dump_trailing_array(
        &mut self,
        array: &TrailingArray,
        addr: u64,
        params: &ArgBlock,
    ) -> Result<()> {
        let len = match array.extent {
            Extent::Counted { count_at, stride } => match params.u32_at(count_at) {
                Some(count) => count as u64 * stride,
                None => return Ok(()),
            },
            Extent::Fixed(len) => len,
        };

        let at = match array.at {
            Location::Pointer(ptr_at) => match params.u64_at(ptr_at) {
                Some(0) | None => return Ok(()),
                Some(ptr) => ptr,
            },
            Location::Inline(offset) => addr.wrapping_add(offset as u64),
        };

        self.dump(array.label, at, len)
    }

    fn dump_register_transactions(
        &mut self,
        addr: u64,
        params: &ArgBlock,
        count_at: usize,
        ptr_at: usize,
    ) -> Result<()> {
        let (Some(cnt), Some(ptr)) = (params.u32_at(count_at), params.u64_at(ptr_at)) else {
            return Ok(());
        };

        if self.writer.is_binary() {
            let data = if ptr != 0 {
                self.read_guest(ptr, cnt as u64 * methods::REGISTER_TX_SIZE)
                    .unwrap_or_default()
            } else {
                Vec::new()
            };
            return self
                .writer
                .emit(&TraceRecord::MethodData { cnt, ptr, data });
        }

        self.dump(
            methods::REGISTER_TX_PARAMS_LABEL,
            addr,
            methods::REGISTER_TX_PARAMS_SIZE,
        )?;

        if ptr == 0 {
            return Ok(());
        }

        let max = self.config.max_dump_len as u64 / methods::REGISTER_TX_SIZE;
        for k in 0..(cnt as u64).min(max) {
            self.dump(
                methods::REGISTER_TX_LABEL,
                ptr.wrapping_add(k * methods::REGISTER_TX_SIZE),
                methods::REGISTER_TX_SIZE,
            )?;
        }

        Ok(())
    }

    /// The class list query returns `{ count, _, list }`; `list` is a 32 bit pointer to
    /// `count` class ids.
    fn dump_object_classes(&mut self, reply: u64) -> Result<()> {
        let Some(header) = self.read_guest(reply, 12).map(ArgBlock::new) else {
            return Ok(());
        };
        let (Some(count), Some(list)) = (header.word(0), header.word(2)) else {
            return Ok(());
        };

        if list == 0 {
            return Ok(());
        }

        self.dump("out2 ", list as u64, count as u64 * 4)
    }
}

/// A [`Session`] for hosts that call the hooks from several threads. Every hook holds the lock
/// for its whole run, so region bookkeeping never interleaves.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        SharedSession {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn post_open(&self, path: &Path, result: i64) -> Option<DeviceClass> {
        self.lock().post_open(path, result)
    }

    pub fn post_close(&self, fd: RawFd) {
        self.lock().post_close(fd)
    }

    pub fn post_mmap(&self, args: &MmapArgs, result: u64, offset_unit: u64) -> Result<bool> {
        self.lock().post_mmap(args, result, offset_unit)
    }

    pub fn pre_ioctl(&self, fd: RawFd, request: u32, argp: u64) -> Result<()> {
        self.lock().pre_ioctl(fd, request, argp)
    }

    pub fn post_ioctl(&self, fd: RawFd, request: u32, argp: u64) -> Result<()> {
        self.lock().post_ioctl(fd, request, argp)
    }

    pub fn fini(&self) -> Result<()> {
        self.lock().fini()
    }
}
