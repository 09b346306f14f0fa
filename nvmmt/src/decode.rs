// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

//! Reads a binary trace back into [`TraceRecord`]s.

use anyhow::{bail, ensure, Result};
use bytes::{Buf as _, Bytes};
use nvmmt_common::wire::*;

use crate::records::TraceRecord;

pub struct RecordReader {
    buf: Bytes,
    offset: usize,
}

impl RecordReader {
    pub fn new(data: impl Into<Bytes>) -> Self {
        RecordReader {
            buf: data.into(),
            offset: 0,
        }
    }

    /// Byte offset of the next record in the stream.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Parses the next record, `None` at the end of the stream.
    pub fn next_record(&mut self) -> Result<Option<TraceRecord>> {
        if self.buf.is_empty() {
            return Ok(None);
        }

        let start = self.buf.len();
        let result = self.parse_record();

        match result {
            Ok(record) => {
                self.offset += start - self.buf.len();
                Ok(Some(record))
            }
            Err(e) => {
                let at = self.offset;
                // Nothing after a malformed record can be trusted.
                self.buf.clear();
                Err(e.context(format!("malformed record at offset {at}")))
            }
        }
    }

    fn parse_record(&mut self) -> Result<TraceRecord> {
        let class = self.u8()?;
        ensure!(
            class == RECORD_CLASS,
            "unexpected record class {:?}",
            class as char
        );

        let tag = self.u8()?;
        let record = match tag {
            TAG_IOCTL_PRE => TraceRecord::IoctlPre {
                fd: self.u32()? as i32,
                id: self.u32()?,
                data: self.buffer()?,
            },
            TAG_IOCTL_POST => TraceRecord::IoctlPost {
                fd: self.u32()? as i32,
                id: self.u32()?,
                data: self.buffer()?,
            },
            TAG_MARK => TraceRecord::Mark {
                text: self.string()?,
            },
            TAG_MEMORY_DUMP => TraceRecord::Dump {
                addr: self.u64()?,
                label: self.string()?,
                data: self.buffer()?,
            },
            TAG_CREATE_DEVICE_OBJECT => TraceRecord::CreateDevice { obj: self.u32()? },
            TAG_CALL_METHOD => TraceRecord::CallMethod {
                obj: self.u32()?,
                mthd: self.u32()?,
            },
            TAG_IOCTL_4D => TraceRecord::Ioctl4d {
                text: self.string()?,
            },
            TAG_DESTROY_OBJECT => TraceRecord::DestroyObject {
                obj1: self.u32()?,
                obj2: self.u32()?,
            },
            TAG_CREATE_OBJECT => TraceRecord::CreateObject {
                obj1: self.u32()?,
                obj2: self.u32()?,
                class: self.u32()?,
                name: self.string()?,
            },
            TAG_CREATE_DRIVER_OBJECT => TraceRecord::CreateDriverObject {
                obj1: self.u32()?,
                obj2: self.u32()?,
                class: self.u64()?,
            },
            TAG_CREATE_CONTEXT_OBJECT => TraceRecord::CreateContext { obj: self.u32()? },
            TAG_ALLOCATE_MAP => TraceRecord::AllocateMap {
                obj1: self.u32()?,
                obj2: self.u32()?,
                offset: self.u64()?,
            },
            TAG_DEALLOCATE_MAP => TraceRecord::DeallocateMap {
                obj1: self.u32()?,
                obj2: self.u32()?,
                addr: self.u64()?,
            },
            TAG_CREATE_MAPPED_OBJECT => TraceRecord::CreateMappedObject {
                obj1: self.u32()?,
                obj2: self.u32()?,
                class: self.u32()?,
                offset: self.u64()?,
            },
            TAG_GPU_MAP => TraceRecord::GpuMap {
                vspace: self.u32()?,
                dev: self.u32()?,
                obj: self.u32()?,
                addr: self.u64()?,
                len: self.u32()?,
            },
            TAG_GPU_UNMAP => TraceRecord::GpuUnmap {
                vspace: self.u32()?,
                dev: self.u32()?,
                obj: self.u32()?,
                addr: self.u64()?,
            },
            TAG_CREATE_DMA_OBJECT => TraceRecord::CreateDma {
                obj: self.u32()?,
                class: self.u32()?,
                parent: self.u32()?,
            },
            TAG_BIND => TraceRecord::Bind {
                obj1: self.u32()?,
                obj2: self.u32()?,
            },
            TAG_MMAP => TraceRecord::Mmap {
                offset: self.u64()?,
                id: self.u32()?,
                start: self.u64()?,
                len: self.u64()?,
                data1: self.u64()?,
                data2: self.u64()?,
            },
            TAG_CALL_METHOD_DATA => TraceRecord::MethodData {
                cnt: self.u32()?,
                ptr: self.u64()?,
                data: self.buffer()?,
            },
            other => bail!("unknown record tag {:?}", other as char),
        };

        let end = self.u8()?;
        ensure!(
            end == END_OF_RECORD,
            "record {:?} is not terminated, found {end:#04x}",
            tag as char
        );

        Ok(record)
    }

    fn need(&self, len: usize) -> Result<()> {
        ensure!(
            self.buf.remaining() >= len,
            "truncated record, wanted {len} bytes but only {} remain",
            self.buf.remaining()
        );
        Ok(())
    }

    fn u8(&mut self) -> Result<u8> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    fn u32(&mut self) -> Result<u32> {
        self.need(4)?;
        Ok(self.buf.get_u32_le())
    }

    fn u64(&mut self) -> Result<u64> {
        self.need(8)?;
        Ok(self.buf.get_u64_le())
    }

    fn buffer(&mut self) -> Result<Vec<u8>> {
        let len = self.u32()? as usize;
        self.need(len)?;
        Ok(self.buf.split_to(len).to_vec())
    }

    fn string(&mut self) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.buffer()?).into_owned())
    }
}

impl Iterator for RecordReader {
    type Item = Result<TraceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

#[cfg(test)]
mod test {
    use bytes::BytesMut;

    use super::*;

    fn stream(records: &[TraceRecord]) -> BytesMut {
        let mut buf = BytesMut::new();
        for record in records {
            record.encode(&mut buf);
        }
        buf
    }

    #[test]
    fn reads_back_a_session() -> Result<()> {
        let records = vec![
            TraceRecord::Mark {
                text: "VG-42-0-PRE\n".to_string(),
            },
            TraceRecord::IoctlPre {
                fd: 3,
                id: 0xc030_464e,
                data: vec![0; 0x30],
            },
            TraceRecord::AllocateMap {
                obj1: 0xc1d0_0046,
                obj2: 0x5c00_0020,
                offset: 0x1000,
            },
            TraceRecord::absent_dump(0xbeef_0003),
            TraceRecord::Mmap {
                offset: 0x1000,
                id: 0,
                start: 0x7f12_3456_0000,
                len: 0x1000,
                data1: 0xc1d0_0046,
                data2: 0x5c00_0020,
            },
        ];

        let reader = RecordReader::new(stream(&records).freeze());
        let decoded = reader.collect::<Result<Vec<_>>>()?;
        assert_eq!(decoded, records);
        Ok(())
    }

    #[test]
    fn unknown_tag_is_named() {
        let mut reader = RecordReader::new(&b"nZ\n"[..]);
        let err = reader.next_record().unwrap_err();
        assert!(format!("{err:#}").contains("unknown record tag 'Z'"));
        assert!(reader.next().is_none());
    }

    #[test]
    fn truncated_and_unterminated_records() {
        let full = stream(&[TraceRecord::Bind { obj1: 1, obj2: 2 }]);

        let mut truncated = RecordReader::new(full[..full.len() - 3].to_vec());
        assert!(truncated.next_record().is_err());

        let mut bad_end = full.to_vec();
        let last = bad_end.len() - 1;
        bad_end[last] = b'x';
        let err = RecordReader::new(bad_end).next_record().unwrap_err();
        assert!(format!("{err:#}").contains("not terminated"));
    }

    #[test]
    fn foreign_class_is_rejected() {
        let err = RecordReader::new(&b"r\x01"[..]).next_record().unwrap_err();
        assert!(format!("{err:#}").contains("unexpected record class 'r'"));
    }

    #[test]
    fn offsets_advance_per_record() -> Result<()> {
        let data = stream(&[
            TraceRecord::CreateContext { obj: 1 },
            TraceRecord::CreateContext { obj: 2 },
        ]);
        let mut reader = RecordReader::new(data.freeze());

        reader.next_record()?;
        assert_eq!(reader.offset(), 7);
        reader.next_record()?;
        assert_eq!(reader.offset(), 14);
        assert!(reader.next_record()?.is_none());
        Ok(())
    }
}
