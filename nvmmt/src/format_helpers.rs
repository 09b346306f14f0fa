// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

use std::fmt::Write as _;

use nvmmt_common::nvrm_ioctl::ioctl_nr;

use crate::records::TraceRecord;

/// Longest line of hex words or bytes the text output produces.
pub const LINE_LIMIT: usize = 4095;

/// Appends `0x%08x ` for every whole little endian word of `bytes`, stopping before the line
/// would reach [`LINE_LIMIT`].
pub fn push_hex_words(line: &mut String, bytes: &[u8]) {
    for word in bytes.chunks_exact(4) {
        if line.len() + 11 >= LINE_LIMIT {
            break;
        }
        let word = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
        let _ = write!(line, "0x{word:08x} ");
    }
}

/// Appends `0x%02x ` for every byte, with the same bound as [`push_hex_words`].
pub fn push_hex_bytes(line: &mut String, bytes: &[u8]) {
    for byte in bytes {
        if line.len() + 5 >= LINE_LIMIT {
            break;
        }
        let _ = write!(line, "0x{byte:02x} ");
    }
}

/// Words when the length is a multiple of four, single bytes otherwise.
pub fn format_dump(bytes: &[u8]) -> String {
    let mut line = String::new();
    if bytes.len() % 4 == 0 {
        push_hex_words(&mut line, bytes);
    } else {
        push_hex_bytes(&mut line, bytes);
    }
    line
}

fn ioctl_line(phase: &str, fd: i32, id: u32, data: &[u8]) -> String {
    let mut line = format!(
        "{phase}_ioctl: fd:{fd}, id:0x{:02x} (full:0x{id:x}), data: ",
        ioctl_nr(id)
    );
    push_hex_words(&mut line, data);
    line
}

/// Renders the text form of a record; absent dumps have none.
pub fn format_record(record: &TraceRecord) -> Option<String> {
    let line = match record {
        TraceRecord::IoctlPre { fd, id, data } => ioctl_line("pre", *fd, *id, data),
        TraceRecord::IoctlPost { fd, id, data } => ioctl_line("post", *fd, *id, data),
        TraceRecord::Mark { text } => format!("MARK: {}", text.trim_end_matches('\n')),
        TraceRecord::Dump { label, data, .. } => {
            if label.is_empty() && data.is_empty() {
                return None;
            }
            format!("{label}{}", format_dump(data))
        }
        TraceRecord::CreateDevice { obj } => format!("create device object 0x{obj:08x}"),
        TraceRecord::CallMethod { obj, mthd } => format!("call method 0x{obj:08x}:0x{mthd:08x}"),
        TraceRecord::Ioctl4d { text } => format!("in {text}"),
        TraceRecord::DestroyObject { obj1, obj2 } => {
            format!("destroy object 0x{obj1:08x}:0x{obj2:08x}")
        }
        TraceRecord::CreateObject {
            obj1,
            obj2,
            class,
            name,
        } => format!("create gpu object 0x{obj1:08x}:0x{obj2:08x} type 0x{class:04x} ({name})"),
        TraceRecord::CreateDriverObject { obj1, obj2, class } => {
            format!("create driver object 0x{obj1:08x}:0x{obj2:08x} type 0x{class:04x}")
        }
        TraceRecord::CreateContext { obj } => format!("created context object 0x{obj:08x}"),
        TraceRecord::AllocateMap { obj1, obj2, offset } => {
            format!("allocate map 0x{obj1:08x}:0x{obj2:08x} 0x{offset:08x}")
        }
        TraceRecord::DeallocateMap { obj1, obj2, addr } => {
            format!("deallocate map 0x{obj1:08x}:0x{obj2:08x} 0x{addr:08x}")
        }
        TraceRecord::CreateMappedObject {
            obj1,
            obj2,
            class,
            offset,
        } => format!(
            "create mapped object 0x{obj1:08x}:0x{obj2:08x} type=0x{class:08x} 0x{offset:08x}"
        ),
        TraceRecord::GpuMap {
            vspace,
            dev,
            obj,
            addr,
            len,
        } => format!(
            "gpu map 0x{vspace:08x}:0x{dev:08x}:0x{obj:08x}, addr 0x{addr:08x}, len 0x{len:08x}"
        ),
        TraceRecord::GpuUnmap {
            vspace,
            dev,
            obj,
            addr,
        } => format!("gpu unmap 0x{vspace:08x}:0x{dev:08x}:0x{obj:08x} addr 0x{addr:08x}"),
        TraceRecord::CreateDma { obj, class, parent } => format!(
            "create dma object 0x{obj:08x}, type 0x{class:08x}, parent 0x{parent:08x}"
        ),
        TraceRecord::Bind { obj1, obj2 } => format!("bind 0x{obj1:08x} 0x{obj2:08x}"),
        TraceRecord::Mmap {
            offset,
            id,
            start,
            len,
            data1,
            data2,
        } => format!(
            "got new mmap for 0x{data1:08x}:0x{data2:08x} at 0x{start:x}, len: 0x{len:08x}, offset: 0x{offset:x}, serial: {id}"
        ),
        TraceRecord::MethodData { cnt, ptr, data } => {
            let mut line = format!("call method data, {cnt} transactions at 0x{ptr:x}: ");
            push_hex_words(&mut line, data);
            line
        }
    };

    Some(line)
}
