// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

//! Decoders for the escape ioctls.
//!
//! A decoder only reads the argument block and describes what the session has to do, so the
//! trace records are emitted in the order the decoder lists them.

use nvmmt_common::{nvrm_ioctl::*, object_types};

use crate::{args::ArgBlock, records::TraceRecord};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Emit(TraceRecord),
    /// Dump `len` bytes of guest memory.
    Dump {
        label: &'static str,
        addr: u64,
        len: u64,
    },
    /// Dump the parameters of a method call and whatever they point at.
    MethodCall {
        label: &'static str,
        mthd: u32,
        params: u64,
        size: u64,
    },
    /// Emit the string an ioctl 0x4d points at.
    Escape4dString { ptr: u64 },
    /// Find or create the region for a driver offset and stamp it with the owner handles.
    TrackMapping { offset: u64, obj1: u32, obj2: u32 },
    ReleaseByOffset { offset: u64, obj1: u32, obj2: u32 },
    ReleaseByHandles { obj1: u32, obj2: u32 },
    /// Dump the list of supported classes a query returned through `list`.
    ObjectClasses { list: u64 },
}

pub(crate) type Decode = fn(&ArgBlock) -> Option<Vec<Action>>;

pub(crate) struct IoctlDecoder {
    pub request: u32,
    pub name: &'static str,
    pub pre: Option<Decode>,
    pub post: Option<Decode>,
}

pub(crate) static IOCTL_DECODERS: &[IoctlDecoder] = &[
    IoctlDecoder {
        request: NVRM_IOCTL_CREATE_CTX,
        name: "create context",
        pre: None,
        post: Some(post_create_ctx),
    },
    IoctlDecoder {
        request: NVRM_IOCTL_CREATE_DEV_OBJ,
        name: "create device object",
        pre: Some(pre_create_dev_obj),
        post: Some(post_create_dev_obj),
    },
    IoctlDecoder {
        request: NVRM_IOCTL_CREATE_VSPACE,
        name: "create mapped object",
        pre: None,
        post: Some(post_create_vspace),
    },
    IoctlDecoder {
        request: NVRM_IOCTL_DESTROY,
        name: "destroy",
        pre: Some(pre_destroy),
        post: Some(post_destroy),
    },
    IoctlDecoder {
        request: NVRM_IOCTL_CALL,
        name: "call method",
        pre: Some(pre_call),
        post: Some(post_call),
    },
    IoctlDecoder {
        request: NVRM_IOCTL_CREATE,
        name: "create gpu object",
        pre: Some(pre_create),
        post: None,
    },
    IoctlDecoder {
        request: NVRM_IOCTL_CREATE_DRV_OBJ,
        name: "create driver object",
        pre: Some(pre_create_drv_obj),
        post: None,
    },
    IoctlDecoder {
        request: NVRM_IOCTL_QUERY,
        name: "query",
        pre: Some(pre_buffer_in),
        post: Some(post_query),
    },
    IoctlDecoder {
        request: NVRM_IOCTL_CONFIG,
        name: "config",
        pre: Some(pre_buffer_in),
        post: Some(post_buffer_out),
    },
    IoctlDecoder {
        request: NVRM_IOCTL_UNK4D,
        name: "unk4d",
        pre: Some(pre_unk4d),
        post: None,
    },
    IoctlDecoder {
        request: NVRM_IOCTL_HOST_MAP,
        name: "host map",
        pre: None,
        post: Some(post_host_map),
    },
    IoctlDecoder {
        request: NVRM_IOCTL_HOST_UNMAP,
        name: "host unmap",
        pre: None,
        post: Some(post_host_unmap),
    },
    IoctlDecoder {
        request: NVRM_IOCTL_CREATE_DMA,
        name: "create dma object",
        pre: None,
        post: Some(post_create_dma),
    },
    IoctlDecoder {
        request: NVRM_IOCTL_VSPACE_MAP,
        name: "gpu map",
        pre: None,
        post: Some(post_vspace_map),
    },
    IoctlDecoder {
        request: NVRM_IOCTL_VSPACE_UNMAP,
        name: "gpu unmap",
        pre: None,
        post: Some(post_vspace_unmap),
    },
    IoctlDecoder {
        request: NVRM_IOCTL_BIND,
        name: "bind",
        pre: None,
        post: Some(post_bind),
    },
    IoctlDecoder {
        request: NVRM_IOCTL_COPY_TO_GPU,
        name: "copy to gpu",
        pre: None,
        post: None,
    },
];

pub(crate) fn find_decoder(request: u32) -> Option<&'static IoctlDecoder> {
    IOCTL_DECODERS.iter().find(|d| d.request == request)
}

fn pre_create_dev_obj(args: &ArgBlock) -> Option<Vec<Action>> {
    Some(vec![
        Action::Emit(TraceRecord::CreateDevice { obj: args.word(1)? }),
        Action::Dump {
            label: "in ",
            addr: args.word(4)? as u64,
            len: NVRM_IOCTL_CREATE_DEV_OBJ_ARGS_LEN as u64,
        },
    ])
}

fn post_create_dev_obj(args: &ArgBlock) -> Option<Vec<Action>> {
    Some(vec![Action::Dump {
        label: "out",
        addr: args.word(4)? as u64,
        len: NVRM_IOCTL_CREATE_DEV_OBJ_ARGS_LEN as u64,
    }])
}

fn pre_buffer_in(args: &ArgBlock) -> Option<Vec<Action>> {
    Some(vec![Action::Dump {
        label: "in ",
        addr: args.word(4)? as u64,
        len: args.word(6)? as u64,
    }])
}

fn post_buffer_out(args: &ArgBlock) -> Option<Vec<Action>> {
    Some(vec![Action::Dump {
        label: "out",
        addr: args.word(4)? as u64,
        len: args.word(6)? as u64,
    }])
}

fn post_query(args: &ArgBlock) -> Option<Vec<Action>> {
    let mut actions = post_buffer_out(args)?;

    if args.word(2)? == NVRM_QUERY_OBJECT_CLASSES {
        actions.push(Action::ObjectClasses {
            list: args.pair(4, 5)?,
        });
    }

    Some(actions)
}

fn pre_call(args: &ArgBlock) -> Option<Vec<Action>> {
    let obj = args.word(1)?;
    let mthd = args.word(2)?;

    Some(vec![
        Action::Emit(TraceRecord::CallMethod { obj, mthd }),
        Action::MethodCall {
            label: "in ",
            mthd,
            params: args.pair(4, 5)?,
            size: args.pair(6, 7)?,
        },
    ])
}

fn post_call(args: &ArgBlock) -> Option<Vec<Action>> {
    Some(vec![Action::MethodCall {
        label: "out ",
        mthd: args.word(2)?,
        params: args.pair(4, 5)?,
        size: args.pair(6, 7)?,
    }])
}

fn pre_unk4d(args: &ArgBlock) -> Option<Vec<Action>> {
    Some(vec![Action::Escape4dString {
        ptr: args.pair(6, 7)?,
    }])
}

fn pre_destroy(args: &ArgBlock) -> Option<Vec<Action>> {
    Some(vec![Action::Emit(TraceRecord::DestroyObject {
        obj1: args.word(1)?,
        obj2: args.word(2)?,
    })])
}

fn post_destroy(args: &ArgBlock) -> Option<Vec<Action>> {
    Some(vec![Action::ReleaseByHandles {
        obj1: args.word(1)?,
        obj2: args.word(2)?,
    }])
}

fn pre_create(args: &ArgBlock) -> Option<Vec<Action>> {
    let class = args.word(3)?;
    let mut actions = vec![Action::Emit(TraceRecord::CreateObject {
        obj1: args.word(1)?,
        obj2: args.word(2)?,
        class,
        name: object_types::object_name(class).to_string(),
    })];

    if args.word(4)? != 0 {
        actions.push(Action::Dump {
            label: "in ",
            addr: args.pair(4, 5)?,
            len: object_types::ctor_args_len(class) as u64,
        });
    }

    Some(actions)
}

fn pre_create_drv_obj(args: &ArgBlock) -> Option<Vec<Action>> {
    Some(vec![Action::Emit(TraceRecord::CreateDriverObject {
        obj1: args.word(1)?,
        obj2: args.word(2)?,
        class: args.word(3)? as u64,
    })])
}

fn post_create_ctx(args: &ArgBlock) -> Option<Vec<Action>> {
    Some(vec![Action::Emit(TraceRecord::CreateContext {
        obj: args.word(0)?,
    })])
}

fn post_host_map(args: &ArgBlock) -> Option<Vec<Action>> {
    let obj1 = args.word(1)?;
    let obj2 = args.word(2)?;
    let offset = args.pair(8, 9)?;

    Some(vec![
        Action::Emit(TraceRecord::AllocateMap { obj1, obj2, offset }),
        Action::TrackMapping { offset, obj1, obj2 },
    ])
}

fn post_host_unmap(args: &ArgBlock) -> Option<Vec<Action>> {
    Some(vec![Action::ReleaseByOffset {
        obj1: args.word(1)?,
        obj2: args.word(2)?,
        offset: args.pair(4, 5)?,
    }])
}

fn post_create_vspace(args: &ArgBlock) -> Option<Vec<Action>> {
    let obj1 = args.word(1)?;
    let obj2 = args.word(2)?;
    let offset = args.pair(6, 7)?;

    let mut actions = vec![Action::Emit(TraceRecord::CreateMappedObject {
        obj1,
        obj2,
        class: args.word(3)?,
        offset,
    })];

    if offset != 0 {
        actions.push(Action::TrackMapping { offset, obj1, obj2 });
    }

    Some(actions)
}

fn post_vspace_map(args: &ArgBlock) -> Option<Vec<Action>> {
    Some(vec![Action::Emit(TraceRecord::GpuMap {
        vspace: args.word(1)?,
        dev: args.word(2)?,
        obj: args.word(3)?,
        addr: args.pair(10, 11)?,
        len: args.word(6)?,
    })])
}

fn post_vspace_unmap(args: &ArgBlock) -> Option<Vec<Action>> {
    Some(vec![Action::Emit(TraceRecord::GpuUnmap {
        vspace: args.word(1)?,
        dev: args.word(2)?,
        obj: args.word(3)?,
        addr: args.pair(6, 7)?,
    })])
}

fn post_create_dma(args: &ArgBlock) -> Option<Vec<Action>> {
    Some(vec![Action::Emit(TraceRecord::CreateDma {
        obj: args.word(1)?,
        class: args.word(2)?,
        parent: args.word(5)?,
    })])
}

fn post_bind(args: &ArgBlock) -> Option<Vec<Action>> {
    Some(vec![Action::Emit(TraceRecord::Bind {
        obj1: args.word(1)?,
        obj2: args.word(2)?,
    })])
}

#[cfg(test)]
mod test {
    use super::*;

    fn decode_pre(request: u32, words: &[u32]) -> Option<Vec<Action>> {
        find_decoder(request)
            .and_then(|d| d.pre)
            .and_then(|pre| pre(&ArgBlock::from_words(words)))
    }

    fn decode_post(request: u32, words: &[u32]) -> Option<Vec<Action>> {
        find_decoder(request)
            .and_then(|d| d.post)
            .and_then(|post| post(&ArgBlock::from_words(words)))
    }

    #[test]
    fn requests_are_unique_escapes() {
        for (i, a) in IOCTL_DECODERS.iter().enumerate() {
            assert!(is_escape(a.request), "{} is not an escape", a.name);
            for b in &IOCTL_DECODERS[i + 1..] {
                assert_ne!(a.request, b.request);
            }
        }
    }

    #[test]
    fn argument_block_size_matches_highest_word() {
        // Every decoder must find its words in the block the request code announces.
        for decoder in IOCTL_DECODERS {
            let words = vec![0x1000; ioctl_size(decoder.request) as usize / 4];
            let args = ArgBlock::from_words(&words);
            if let Some(pre) = decoder.pre {
                assert!(pre(&args).is_some(), "{} pre", decoder.name);
            }
            if let Some(post) = decoder.post {
                assert!(post(&args).is_some(), "{} post", decoder.name);
            }
        }
    }

    #[test]
    fn short_block_decodes_to_nothing() {
        assert_eq!(decode_post(NVRM_IOCTL_HOST_MAP, &[0, 1, 2]), None);
    }

    #[test]
    fn create_without_ctor_args_skips_dump() {
        let actions = decode_pre(
            NVRM_IOCTL_CREATE,
            &[0xc1d0_0046, 0xbeef_0003, 0xbeef_0028, 0x307e, 0, 0, 0, 0],
        );

        assert_eq!(
            actions,
            Some(vec![Action::Emit(TraceRecord::CreateObject {
                obj1: 0xbeef_0003,
                obj2: 0xbeef_0028,
                class: 0x307e,
                name: "NV30_PEEPHOLE".to_string(),
            })])
        );
    }

    #[test]
    fn create_unknown_class_without_ctor_args() {
        let actions = decode_pre(
            NVRM_IOCTL_CREATE,
            &[0xc1d0_0046, 0x5c00_0001, 0x5c00_0012, 0x1234, 0, 0, 0, 0],
        );

        assert_eq!(
            actions,
            Some(vec![Action::Emit(TraceRecord::CreateObject {
                obj1: 0x5c00_0001,
                obj2: 0x5c00_0012,
                class: 0x1234,
                name: "???".to_string(),
            })])
        );
    }

    #[test]
    fn create_known_class_dumps_ctor_args() {
        let actions = decode_pre(
            NVRM_IOCTL_CREATE,
            &[0xc1d0_0046, 0x5c00_0001, 0x5c00_0009, 0x506f, 0xbe88_a888, 0x7fff, 0, 0],
        );

        assert_eq!(
            actions.as_deref().and_then(|a| a.get(1)),
            Some(&Action::Dump {
                label: "in ",
                addr: 0x7fff_be88_a888,
                len: 24,
            })
        );
    }

    #[test]
    fn create_mapped_object_with_zero_offset_is_not_tracked() {
        let actions = decode_post(
            NVRM_IOCTL_CREATE_VSPACE,
            &[0, 0xc1d0_0046, 0x5c00_0030, 0x3e, 0, 0, 0, 0, 0, 0, 0, 0],
        );

        assert_eq!(actions.map(|a| a.len()), Some(1));
    }

    #[test]
    fn query_for_classes_follows_the_list() {
        let actions = decode_post(
            NVRM_IOCTL_QUERY,
            &[0xc1d0_0046, 0xc1d0_0046, 0x14c, 0, 0xbe88_a9c8, 0, 0x10, 0],
        );

        assert_eq!(
            actions,
            Some(vec![
                Action::Dump {
                    label: "out",
                    addr: 0xbe88_a9c8,
                    len: 0x10,
                },
                Action::ObjectClasses { list: 0xbe88_a9c8 },
            ])
        );
    }

    #[test]
    fn copy_to_gpu_is_known_but_silent() {
        let decoder = find_decoder(NVRM_IOCTL_COPY_TO_GPU);
        assert!(decoder.is_some_and(|d| d.pre.is_none() && d.post.is_none()));
    }
}
