// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

use std::fs;

use assert_cmd::Command;
use indoc::indoc;
use nvmmt::TraceRecord;
use predicates::prelude::*;

mod common;
use common::{encode, mapping_session, write_trace};

fn decoder() -> Command {
    Command::cargo_bin("nvmmt-decode").unwrap()
}

#[test]
fn renders_text() {
    let path = write_trace("text", &mapping_session());

    decoder().arg(&path).assert().success().stdout(indoc! {"
        MARK: VG-7-0-PRE
        create gpu object 0xc1d00046:0x5c000010 type 0x5097 (NV50_3D)
        allocate map 0xc1d00046:0x5c000060 0x00003000
        got new mmap for 0xc1d00046:0x5c000060 at 0x7f0012340000, len: 0x00001000, offset: 0x3000, serial: 0
        deallocate map 0xc1d00046:0x5c000060 0x00003000
    "});

    fs::remove_file(path).unwrap();
}

#[test]
fn filters_by_tag() {
    let path = write_trace("filter", &mapping_session());

    decoder()
        .args(["-t", "a,e"])
        .arg(&path)
        .assert()
        .success()
        .stdout(indoc! {"
            allocate map 0xc1d00046:0x5c000060 0x00003000
            deallocate map 0xc1d00046:0x5c000060 0x00003000
        "});

    fs::remove_file(path).unwrap();
}

#[test]
fn reads_standard_input() {
    decoder()
        .write_stdin(encode(&[TraceRecord::Bind {
            obj1: 0x5c00_0050,
            obj2: 0x5c00_0051,
        }]))
        .assert()
        .success()
        .stdout("bind 0x5c000050 0x5c000051\n");
}

#[test]
fn binary_output_keeps_selected_records() {
    let session = mapping_session();

    decoder()
        .args(["--format", "binary", "--tag", "m"])
        .write_stdin(encode(&session))
        .assert()
        .success()
        .stdout(encode(&session[4..5]));
}

#[test]
fn malformed_trace_fails() {
    let mut data = encode(&mapping_session()[..2]);
    data.extend_from_slice(b"nZ\n");

    decoder()
        .write_stdin(data)
        .assert()
        .failure()
        .stdout(predicate::str::contains("create gpu object"))
        .stderr(predicate::str::contains("unknown record tag 'Z'"));
}

#[test]
fn missing_input_fails() {
    decoder()
        .arg("/nonexistent/nvmmt.bin")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot read /nonexistent/nvmmt.bin"));
}
