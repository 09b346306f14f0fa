// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

use bytes::{BufMut as _, BytesMut};
use nvmmt_common::wire::*;

/// Every event the tracer writes, in either output mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceRecord {
    IoctlPre {
        fd: i32,
        id: u32,
        data: Vec<u8>,
    },
    IoctlPost {
        fd: i32,
        id: u32,
        data: Vec<u8>,
    },
    /// Text written to the kernel trace marker, newline included.
    Mark {
        text: String,
    },
    /// Memory of the traced process. An absent dump, for a null or sentinel address, has an
    /// empty label and no data.
    Dump {
        addr: u64,
        label: String,
        data: Vec<u8>,
    },
    CreateDevice {
        obj: u32,
    },
    CallMethod {
        obj: u32,
        mthd: u32,
    },
    Ioctl4d {
        text: String,
    },
    DestroyObject {
        obj1: u32,
        obj2: u32,
    },
    CreateObject {
        obj1: u32,
        obj2: u32,
        class: u32,
        name: String,
    },
    CreateDriverObject {
        obj1: u32,
        obj2: u32,
        class: u64,
    },
    CreateContext {
        obj: u32,
    },
    AllocateMap {
        obj1: u32,
        obj2: u32,
        offset: u64,
    },
    DeallocateMap {
        obj1: u32,
        obj2: u32,
        addr: u64,
    },
    CreateMappedObject {
        obj1: u32,
        obj2: u32,
        class: u32,
        offset: u64,
    },
    GpuMap {
        vspace: u32,
        dev: u32,
        obj: u32,
        addr: u64,
        len: u32,
    },
    GpuUnmap {
        vspace: u32,
        dev: u32,
        obj: u32,
        addr: u64,
    },
    CreateDma {
        obj: u32,
        class: u32,
        parent: u32,
    },
    Bind {
        obj1: u32,
        obj2: u32,
    },
    Mmap {
        offset: u64,
        id: u32,
        start: u64,
        len: u64,
        data1: u64,
        data2: u64,
    },
    /// Register transactions of method 0x20800122, `cnt` entries of 32 bytes at `ptr`.
    MethodData {
        cnt: u32,
        ptr: u64,
        data: Vec<u8>,
    },
}

impl TraceRecord {
    pub fn absent_dump(addr: u64) -> Self {
        TraceRecord::Dump {
            addr,
            label: String::new(),
            data: Vec::new(),
        }
    }

    pub fn tag(&self) -> u8 {
        match self {
            TraceRecord::IoctlPre { .. } => TAG_IOCTL_PRE,
            TraceRecord::IoctlPost { .. } => TAG_IOCTL_POST,
            TraceRecord::Mark { .. } => TAG_MARK,
            TraceRecord::Dump { .. } => TAG_MEMORY_DUMP,
            TraceRecord::CreateDevice { .. } => TAG_CREATE_DEVICE_OBJECT,
            TraceRecord::CallMethod { .. } => TAG_CALL_METHOD,
            TraceRecord::Ioctl4d { .. } => TAG_IOCTL_4D,
            TraceRecord::DestroyObject { .. } => TAG_DESTROY_OBJECT,
            TraceRecord::CreateObject { .. } => TAG_CREATE_OBJECT,
            TraceRecord::CreateDriverObject { .. } => TAG_CREATE_DRIVER_OBJECT,
            TraceRecord::CreateContext { .. } => TAG_CREATE_CONTEXT_OBJECT,
            TraceRecord::AllocateMap { .. } => TAG_ALLOCATE_MAP,
            TraceRecord::DeallocateMap { .. } => TAG_DEALLOCATE_MAP,
            TraceRecord::CreateMappedObject { .. } => TAG_CREATE_MAPPED_OBJECT,
            TraceRecord::GpuMap { .. } => TAG_GPU_MAP,
            TraceRecord::GpuUnmap { .. } => TAG_GPU_UNMAP,
            TraceRecord::CreateDma { .. } => TAG_CREATE_DMA_OBJECT,
            TraceRecord::Bind { .. } => TAG_BIND,
            TraceRecord::Mmap { .. } => TAG_MMAP,
            TraceRecord::MethodData { .. } => TAG_CALL_METHOD_DATA,
        }
    }

    /// Appends the binary form of the record to `buf`.
    pub fn encode(&self, buf: &mut BytesMut) {
        let w = BinWriter::begin(buf, self.tag());

        match self {
            TraceRecord::IoctlPre { fd, id, data } | TraceRecord::IoctlPost { fd, id, data } => {
                w.u32(*fd as u32).u32(*id).buffer(data)
            }
            TraceRecord::Mark { text } | TraceRecord::Ioctl4d { text } => w.str(text),
            TraceRecord::Dump { addr, label, data } => w.u64(*addr).str(label).buffer(data),
            TraceRecord::CreateDevice { obj } | TraceRecord::CreateContext { obj } => w.u32(*obj),
            TraceRecord::CallMethod { obj, mthd } => w.u32(*obj).u32(*mthd),
            TraceRecord::DestroyObject { obj1, obj2 } | TraceRecord::Bind { obj1, obj2 } => {
                w.u32(*obj1).u32(*obj2)
            }
            TraceRecord::CreateObject {
                obj1,
                obj2,
                class,
                name,
            } => w.u32(*obj1).u32(*obj2).u32(*class).str(name),
            TraceRecord::CreateDriverObject { obj1, obj2, class } => {
                w.u32(*obj1).u32(*obj2).u64(*class)
            }
            TraceRecord::AllocateMap { obj1, obj2, offset } => {
                w.u32(*obj1).u32(*obj2).u64(*offset)
            }
            TraceRecord::DeallocateMap { obj1, obj2, addr } => w.u32(*obj1).u32(*obj2).u64(*addr),
            TraceRecord::CreateMappedObject {
                obj1,
                obj2,
                class,
                offset,
            } => w.u32(*obj1).u32(*obj2).u32(*class).u64(*offset),
            TraceRecord::GpuMap {
                vspace,
                dev,
                obj,
                addr,
                len,
            } => w.u32(*vspace).u32(*dev).u32(*obj).u64(*addr).u32(*len),
            TraceRecord::GpuUnmap {
                vspace,
                dev,
                obj,
                addr,
            } => w.u32(*vspace).u32(*dev).u32(*obj).u64(*addr),
            TraceRecord::CreateDma { obj, class, parent } => w.u32(*obj).u32(*class).u32(*parent),
            TraceRecord::Mmap {
                offset,
                id,
                start,
                len,
                data1,
                data2,
            } => w
                .u64(*offset)
                .u32(*id)
                .u64(*start)
                .u64(*len)
                .u64(*data1)
                .u64(*data2),
            TraceRecord::MethodData { cnt, ptr, data } => w.u32(*cnt).u64(*ptr).buffer(data),
        }
        .end();
    }
}

/// Writes the fields of one record.
struct BinWriter<'b> {
    buf: &'b mut BytesMut,
}

impl<'b> BinWriter<'b> {
    fn begin(buf: &'b mut BytesMut, tag: u8) -> Self {
        buf.put_u8(RECORD_CLASS);
        buf.put_u8(tag);
        BinWriter { buf }
    }

    fn u32(self, value: u32) -> Self {
        self.buf.put_u32_le(value);
        self
    }

    fn u64(self, value: u64) -> Self {
        self.buf.put_u64_le(value);
        self
    }

    fn buffer(self, bytes: &[u8]) -> Self {
        self.buf.put_u32_le(bytes.len() as u32);
        self.buf.put_slice(bytes);
        self
    }

    fn str(self, s: &str) -> Self {
        self.buffer(s.as_bytes())
    }

    fn end(self) {
        self.buf.put_u8(END_OF_RECORD);
    }
}
