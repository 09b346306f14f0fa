// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

use std::io::{self, Write};

use anyhow::Result;
use bytes::BytesMut;
use clap::ValueEnum;

use crate::{format_helpers::format_record, records::TraceRecord};

/// Write a formatted line to the text stream of a [`TraceWriter`]
#[macro_export]
macro_rules! message {
    ($writer:expr, $($arg:tt)*) => {
        $writer.message(&format!($($arg)*))?
    };
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// One line per event.
    #[default]
    Text,
    /// Binary records, see `nvmmt_common::wire`.
    Binary,
}

/// Where the trace goes.
///
/// Records are written to the binary stream or rendered to the text stream, depending on the
/// mode. Messages always go to the text stream.
pub struct TraceWriter {
    mode: OutputMode,
    text: Box<dyn Write + Send>,
    binary: Box<dyn Write + Send>,
    scratch: BytesMut,
}

impl TraceWriter {
    pub fn new(
        mode: OutputMode,
        text: Box<dyn Write + Send>,
        binary: Box<dyn Write + Send>,
    ) -> Self {
        TraceWriter {
            mode,
            text,
            binary,
            scratch: BytesMut::with_capacity(256),
        }
    }

    pub fn text(text: Box<dyn Write + Send>) -> Self {
        Self::new(OutputMode::Text, text, Box::new(io::sink()))
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn is_binary(&self) -> bool {
        self.mode == OutputMode::Binary
    }

    pub fn emit(&mut self, record: &TraceRecord) -> Result<()> {
        match self.mode {
            OutputMode::Binary => {
                self.scratch.clear();
                record.encode(&mut self.scratch);
                self.binary.write_all(&self.scratch)?;
            }
            OutputMode::Text => {
                if let Some(line) = format_record(record) {
                    self.message(&line)?;
                }
            }
        }

        Ok(())
    }

    pub fn message(&mut self, line: &str) -> Result<()> {
        self.text.write_all(line.as_bytes())?;
        self.text.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.text.flush()?;
        self.binary.flush()?;
        Ok(())
    }
}
