// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

use std::{fs, path::PathBuf};

use bytes::BytesMut;
use nvmmt::TraceRecord;

pub fn encode(records: &[TraceRecord]) -> Vec<u8> {
    let mut buf = BytesMut::new();
    for record in records {
        record.encode(&mut buf);
    }
    buf.to_vec()
}

/// Writes `records` to a trace file unique to this test process.
pub fn write_trace(name: &str, records: &[TraceRecord]) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "nvmmt-decode-{}-{name}.bin",
        std::process::id()
    ));
    fs::write(&path, encode(records)).unwrap();
    path
}

/// A card mapping being allocated, mapped and released.
pub fn mapping_session() -> Vec<TraceRecord> {
    vec![
        TraceRecord::Mark {
            text: "VG-7-0-PRE\n".to_string(),
        },
        TraceRecord::CreateObject {
            obj1: 0xc1d0_0046,
            obj2: 0x5c00_0010,
            class: 0x5097,
            name: "NV50_3D".to_string(),
        },
        TraceRecord::absent_dump(0),
        TraceRecord::AllocateMap {
            obj1: 0xc1d0_0046,
            obj2: 0x5c00_0060,
            offset: 0x3000,
        },
        TraceRecord::Mmap {
            offset: 0x3000,
            id: 0,
            start: 0x7f00_1234_0000,
            len: 0x1000,
            data1: 0xc1d0_0046,
            data2: 0x5c00_0060,
        },
        TraceRecord::DeallocateMap {
            obj1: 0xc1d0_0046,
            obj2: 0x5c00_0060,
            addr: 0x3000,
        },
    ]
}
