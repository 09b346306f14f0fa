// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

use std::{
    fs,
    io::{self, BufWriter, Read as _},
    path::PathBuf,
};

use anyhow::{Context as _, Result};
use clap::Parser;
use log::debug;
use nvmmt::{decode::RecordReader, OutputMode, TraceWriter};

/// Renders a binary NVIDIA ioctl trace.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Record tag(s) to keep, e.g. 'c' or 'a,e,m' (can be repeated or comma-separated)
    #[arg(short = 't', long = "tag", value_delimiter = ',', action = clap::ArgAction::Append)]
    tags: Vec<char>,

    /// Output format, `text` or `binary` to write the kept records back out
    #[arg(long = "format", value_enum, default_value_t = OutputMode::default())]
    format: OutputMode,

    /// Binary trace to read, standard input if omitted
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let data = match &args.input {
        Some(path) => {
            fs::read(path).with_context(|| format!("Cannot read {}", path.display()))?
        }
        None => {
            let mut data = vec![];
            io::stdin()
                .read_to_end(&mut data)
                .context("Cannot read standard input")?;
            data
        }
    };

    let mut writer = match args.format {
        OutputMode::Text => TraceWriter::text(Box::new(BufWriter::new(io::stdout()))),
        OutputMode::Binary => TraceWriter::new(
            OutputMode::Binary,
            Box::new(io::sink()),
            Box::new(BufWriter::new(io::stdout())),
        ),
    };

    let mut kept = 0usize;
    let mut total = 0usize;
    for record in RecordReader::new(data) {
        let record = record?;
        total += 1;

        if !args.tags.is_empty() && !args.tags.contains(&(record.tag() as char)) {
            continue;
        }

        writer.emit(&record)?;
        kept += 1;
    }

    writer.flush()?;
    debug!("Wrote {kept} of {total} records");

    Ok(())
}
