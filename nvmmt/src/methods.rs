// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

//! Methods whose parameter blocks point at, or embed, more data worth dumping.

use std::mem::{offset_of, size_of};

use nvmmt_common::nvrm_mthd::*;

/// How many bytes a trailing array has.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Extent {
    /// A u32 count at the given offset, times the element size.
    Counted { count_at: usize, stride: u64 },
    Fixed(u64),
}

/// Where a trailing array lives.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Location {
    /// Behind a 64 bit pointer at the given offset; skipped when the pointer is zero.
    Pointer(usize),
    /// Inside the parameter block itself.
    Inline(usize),
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct TrailingArray {
    pub label: &'static str,
    pub at: Location,
    pub extent: Extent,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum MethodLayout {
    Arrays(&'static [TrailingArray]),
    /// 32 byte register transactions, traced as one call method data record in binary mode.
    RegisterTransactions { count_at: usize, ptr_at: usize },
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct KnownMethod {
    pub mthd: u32,
    pub layout: MethodLayout,
}

pub(crate) const REGISTER_TX_SIZE: u64 = size_of::<SubdeviceUnk20800122Tx>() as u64;
pub(crate) const REGISTER_TX_PARAMS_SIZE: u64 = size_of::<SubdeviceUnk20800122>() as u64;
pub(crate) const REGISTER_TX_PARAMS_LABEL: &str = "UNK20800122: ";
pub(crate) const REGISTER_TX_LABEL: &str = "UNK20800122 tx: ";

const KEY_VALUE_SIZE: u64 = size_of::<KeyValue>() as u64;

const fn pointed(
    label: &'static str,
    ptr_at: usize,
    count_at: usize,
    stride: u64,
) -> TrailingArray {
    TrailingArray {
        label,
        at: Location::Pointer(ptr_at),
        extent: Extent::Counted { count_at, stride },
    }
}

static KNOWN_METHODS: &[KnownMethod] = &[
    KnownMethod {
        mthd: NVRM_MTHD_DEVICE_UNK00800201,
        layout: MethodLayout::Arrays(&[pointed(
            "UNK00800201 ptr ",
            offset_of!(DeviceUnk00800201, ptr),
            offset_of!(DeviceUnk00800201, cnt),
            4,
        )]),
    },
    KnownMethod {
        mthd: NVRM_MTHD_DEVICE_UNK00801102,
        layout: MethodLayout::Arrays(&[pointed(
            "UNK00801102 ptr ",
            offset_of!(DeviceUnk00801102, ptr),
            offset_of!(DeviceUnk00801102, cnt),
            1,
        )]),
    },
    KnownMethod {
        mthd: NVRM_MTHD_DEVICE_UNK00801401,
        layout: MethodLayout::Arrays(&[pointed(
            "UNK00801401 ptr ",
            offset_of!(DeviceUnk00801401, ptr),
            offset_of!(DeviceUnk00801401, cnt),
            1,
        )]),
    },
    KnownMethod {
        mthd: NVRM_MTHD_DEVICE_UNK0080170D,
        layout: MethodLayout::Arrays(&[
            pointed(
                "UNK0080170d ptr1 ",
                offset_of!(DeviceUnk0080170d, ptr1),
                offset_of!(DeviceUnk0080170d, cnt),
                4,
            ),
            pointed(
                "UNK0080170d ptr2 ",
                offset_of!(DeviceUnk0080170d, ptr2),
                offset_of!(DeviceUnk0080170d, cnt),
                4,
            ),
        ]),
    },
    KnownMethod {
        mthd: NVRM_MTHD_SUBDEVICE_UNK20801301,
        layout: MethodLayout::Arrays(&[pointed(
            "UNK20801301 ptr ",
            offset_of!(SubdeviceUnk20801301, ptr),
            offset_of!(SubdeviceUnk20801301, cnt),
            8,
        )]),
    },
    KnownMethod {
        mthd: NVRM_MTHD_SUBDEVICE_UNK20800101,
        layout: MethodLayout::Arrays(&[pointed(
            "UNK20800101 ptr ",
            offset_of!(SubdeviceUnk20800101, ptr),
            offset_of!(SubdeviceUnk20800101, cnt),
            8,
        )]),
    },
    KnownMethod {
        mthd: NVRM_MTHD_SUBDEVICE_GET_FIFO_ENGINES,
        layout: MethodLayout::Arrays(&[pointed(
            "SUBDEVICE_GET_FIFO_ENGINES ptr ",
            offset_of!(SubdeviceGetFifoEngines, ptr),
            offset_of!(SubdeviceGetFifoEngines, cnt),
            4,
        )]),
    },
    KnownMethod {
        mthd: NVRM_MTHD_SUBDEVICE_GET_FIFO_CLASSES,
        layout: MethodLayout::Arrays(&[pointed(
            "SUBDEVICE_GET_FIFO_CLASSES ptr ",
            offset_of!(SubdeviceGetFifoClasses, ptr),
            offset_of!(SubdeviceGetFifoClasses, cnt),
            4,
        )]),
    },
    KnownMethod {
        mthd: NVRM_MTHD_SUBDEVICE_GET_FIFO_JOINABLE_ENGINES,
        layout: MethodLayout::Arrays(&[TrailingArray {
            label: "SUBDEVICE_GET_FIFO_JOINABLE_ENGINES ptr ",
            at: Location::Inline(offset_of!(SubdeviceGetFifoJoinableEngines, res)),
            extent: Extent::Counted {
                count_at: offset_of!(SubdeviceGetFifoJoinableEngines, cnt),
                stride: 4,
            },
        }]),
    },
    KnownMethod {
        mthd: NVRM_MTHD_SUBDEVICE_GET_UUID,
        layout: MethodLayout::Arrays(&[TrailingArray {
            label: "SUBDEVICE_GET_UUID ptr ",
            at: Location::Inline(offset_of!(SubdeviceGetUuid, uuid)),
            extent: Extent::Counted {
                count_at: offset_of!(SubdeviceGetUuid, uuid_len),
                stride: 1,
            },
        }]),
    },
    KnownMethod {
        mthd: NVRM_MTHD_SUBDEVICE_UNK20801201,
        layout: MethodLayout::Arrays(&[pointed(
            "UNK20801201 ptr ",
            offset_of!(SubdeviceUnk20801201, ptr),
            offset_of!(SubdeviceUnk20801201, cnt),
            KEY_VALUE_SIZE,
        )]),
    },
    KnownMethod {
        mthd: NVRM_MTHD_SUBDEVICE_BUS_GET_PARAMS,
        layout: MethodLayout::Arrays(&[pointed(
            "SUBDEVICE_BUS_GET_PARAMS ptr ",
            offset_of!(SubdeviceBusGetParams, ptr),
            offset_of!(SubdeviceBusGetParams, cnt),
            KEY_VALUE_SIZE,
        )]),
    },
    KnownMethod {
        mthd: NVRM_MTHD_SUBDEVICE_UNK20800122,
        layout: MethodLayout::RegisterTransactions {
            count_at: offset_of!(SubdeviceUnk20800122, cnt),
            ptr_at: offset_of!(SubdeviceUnk20800122, ptr),
        },
    },
    KnownMethod {
        mthd: NVRM_MTHD_SUBDEVICE_UNK2080100A,
        layout: MethodLayout::Arrays(&[pointed(
            "UNK2080100a ptr ",
            offset_of!(SubdeviceUnk2080100a, ptr),
            offset_of!(SubdeviceUnk2080100a, cnt),
            16,
        )]),
    },
    KnownMethod {
        mthd: NVRM_MTHD_SUBDEVICE_UNK20802002,
        layout: MethodLayout::Arrays(&[TrailingArray {
            label: "UNK20802002 ptr ",
            at: Location::Pointer(offset_of!(SubdeviceUnk20802002, ptr)),
            extent: Extent::Fixed(NVRM_MTHD_SUBDEVICE_UNK20802002_PTR_LEN as u64),
        }]),
    },
    KnownMethod {
        mthd: NVRM_MTHD_SUBDEVICE_UNK20802016,
        layout: MethodLayout::Arrays(&[pointed(
            "UNK20802016 ptr ",
            offset_of!(SubdeviceUnk20802016, ptr),
            offset_of!(SubdeviceUnk20802016, cnt),
            16,
        )]),
    },
];

/// Looks up a method with trailing data. Methods that are not listed only get their parameter
/// block dumped.
pub(crate) fn find_method(mthd: u32) -> Option<&'static KnownMethod> {
    KNOWN_METHODS.iter().find(|m| m.mthd == mthd)
}
