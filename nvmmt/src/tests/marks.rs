// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

use std::{fs, path::PathBuf};

use indoc::indoc;
use nvmmt_common::nvrm_ioctl::*;

use super::Harness;
use crate::{config::Config, formatting::OutputMode, records::TraceRecord};

fn marker_file(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("nvmmt-{}-{name}", std::process::id()));
    fs::write(&path, b"").unwrap();
    path
}

fn marks_config(marker_path: PathBuf, output: OutputMode) -> Config {
    Config {
        trace_marks: true,
        marker_path,
        output,
        pid: 42,
        ..Config::default()
    }
}

#[test]
fn marks_bracket_each_ioctl() {
    let path = marker_file("bracket");
    let mut h = Harness::with_config(marks_config(path.clone(), OutputMode::Text)).open_devices();

    h.ioctl(NVRM_IOCTL_CREATE_CTX, &[0xc1d0_0046, 0, 0]);
    h.ioctl(NVRM_IOCTL_CREATE_CTX, &[0xc1d0_0047, 0, 0]);
    h.session.fini().unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        indoc! {"
            VG-42-0-PRE
            VG-42-0-POST
            VG-42-1-PRE
            VG-42-1-POST
        "}
    );

    let marks: Vec<String> = h
        .text
        .contents_str()
        .lines()
        .filter(|l| l.starts_with("MARK: "))
        .map(str::to_string)
        .collect();
    assert_eq!(
        marks,
        vec![
            "MARK: VG-42-0-PRE",
            "MARK: VG-42-0-POST",
            "MARK: VG-42-1-PRE",
            "MARK: VG-42-1-POST",
        ]
    );
    assert!(h
        .text
        .contents_str()
        .starts_with("MARK: VG-42-0-PRE\npre_ioctl: fd:3, id:0x22"));

    fs::remove_file(path).unwrap();
}

#[test]
fn marks_are_records_in_binary_mode() {
    let path = marker_file("binary");
    let mut h = Harness::with_config(marks_config(path.clone(), OutputMode::Binary)).open_devices();

    h.post(NVRM_IOCTL_BIND, &[0, 1, 2, 0]);

    assert_eq!(
        h.decoded_records(),
        vec![
            TraceRecord::Mark {
                text: "VG-42-0-POST\n".to_string(),
            },
            TraceRecord::Bind { obj1: 1, obj2: 2 },
        ]
    );
    assert!(h.text.contents().is_empty());

    fs::remove_file(path).unwrap();
}

#[test]
fn untracked_ioctls_are_not_marked() {
    let path = marker_file("untracked");
    let mut h = Harness::with_config(marks_config(path.clone(), OutputMode::Text));

    h.pre(NVRM_IOCTL_BIND, &[0, 1, 2, 0]);
    h.session.fini().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "");
    fs::remove_file(path).unwrap();
}

#[test]
fn missing_marker_file_disables_marks() {
    let config = marks_config(
        PathBuf::from("/nonexistent/nvmmt/trace_marker"),
        OutputMode::Text,
    );
    let mut h = Harness::with_config(config).open_devices();

    assert!(!h.session.config().trace_marks);

    h.post(NVRM_IOCTL_BIND, &[0, 1, 2, 0]);
    assert!(!h.text.contents_str().contains("MARK:"));
}
