// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

use std::{
    collections::BTreeMap,
    io::{self, Write},
    os::fd::RawFd,
    path::Path,
    sync::{Arc, Mutex},
};

use crate::{
    config::Config, decode::RecordReader, formatting::OutputMode, memory::GuestMemory,
    records::TraceRecord, session::Session,
};

mod marks;

pub(crate) const CTL_FD: RawFd = 3;
pub(crate) const CARD_FD: RawFd = 4;

/// Where tests put ioctl argument blocks.
pub(crate) const ARGS: u64 = 0x0010_0000;

#[macro_export]
macro_rules! ioctl_test {
    ($name:ident, $init:block, $expected:expr) => {
        #[test]
        fn $name() {
            let mut harness: $crate::tests::Harness = $init;
            harness.session.fini().unwrap();

            assert_eq!(harness.text.contents_str(), $expected);
        }
    };
}

/// A shared in-memory sink.
#[derive(Clone, Default)]
pub(crate) struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }

    pub fn contents_str(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

const PAGE: u64 = 4096;

/// Guest memory made of the pages tests wrote to; everything else faults.
#[derive(Clone, Default)]
pub(crate) struct SparseMemory {
    pages: Arc<Mutex<BTreeMap<u64, Vec<u8>>>>,
}

impl SparseMemory {
    pub fn write(&self, addr: u64, bytes: &[u8]) {
        let mut pages = self.pages.lock().unwrap();
        for (i, byte) in bytes.iter().enumerate() {
            let at = addr + i as u64;
            let page = pages
                .entry(at / PAGE)
                .or_insert_with(|| vec![0; PAGE as usize]);
            page[(at % PAGE) as usize] = *byte;
        }
    }

    pub fn write_words(&self, addr: u64, words: &[u32]) {
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        self.write(addr, &bytes);
    }
}

impl GuestMemory for SparseMemory {
    fn read_into(&self, addr: u64, buf: &mut [u8]) -> io::Result<()> {
        let pages = self.pages.lock().unwrap();
        for (i, byte) in buf.iter_mut().enumerate() {
            let at = addr
                .checked_add(i as u64)
                .ok_or_else(|| io::Error::from_raw_os_error(libc::EFAULT))?;
            let page = pages
                .get(&(at / PAGE))
                .ok_or_else(|| io::Error::from_raw_os_error(libc::EFAULT))?;
            *byte = page[(at % PAGE) as usize];
        }
        Ok(())
    }
}

pub(crate) struct Harness {
    pub session: Session,
    pub memory: SparseMemory,
    pub text: Capture,
    pub binary: Capture,
}

impl Harness {
    pub fn new(output: OutputMode) -> Self {
        Self::with_config(Config {
            output,
            ..Config::default()
        })
    }

    pub fn text() -> Self {
        Self::new(OutputMode::Text)
    }

    pub fn binary() -> Self {
        Self::new(OutputMode::Binary)
    }

    pub fn with_config(config: Config) -> Self {
        let memory = SparseMemory::default();
        let text = Capture::default();
        let binary = Capture::default();
        let session = Session::new(
            config,
            Box::new(memory.clone()),
            Box::new(text.clone()),
            Box::new(binary.clone()),
        );

        Harness {
            session,
            memory,
            text,
            binary,
        }
    }

    /// Opens the control node as `CTL_FD` and the first card as `CARD_FD`.
    pub fn open_devices(mut self) -> Self {
        self.session
            .post_open(Path::new("/dev/nvidiactl"), CTL_FD as i64);
        self.session
            .post_open(Path::new("/dev/nvidia0"), CARD_FD as i64);
        self
    }

    pub fn pre(&mut self, request: u32, words: &[u32]) {
        self.memory.write_words(ARGS, words);
        self.session.pre_ioctl(CTL_FD, request, ARGS).unwrap();
    }

    pub fn post(&mut self, request: u32, words: &[u32]) {
        self.memory.write_words(ARGS, words);
        self.session.post_ioctl(CTL_FD, request, ARGS).unwrap();
    }

    /// An ioctl on the control node the driver leaves the block of untouched.
    pub fn ioctl(&mut self, request: u32, words: &[u32]) {
        self.pre(request, words);
        self.post(request, words);
    }

    pub fn records(&self) -> Vec<TraceRecord> {
        RecordReader::new(self.binary.contents())
            .collect::<anyhow::Result<Vec<_>>>()
            .unwrap()
    }

    /// Records other than the per-ioctl summaries.
    pub fn decoded_records(&self) -> Vec<TraceRecord> {
        self.records()
            .into_iter()
            .filter(|r| {
                !matches!(
                    r,
                    TraceRecord::IoctlPre { .. } | TraceRecord::IoctlPost { .. }
                )
            })
            .collect()
    }

    /// Text lines other than the per-ioctl summaries.
    pub fn decoded_lines(&self) -> Vec<String> {
        self.text
            .contents_str()
            .lines()
            .filter(|l| !l.starts_with("pre_ioctl: ") && !l.starts_with("post_ioctl: "))
            .map(str::to_string)
            .collect()
    }
}
