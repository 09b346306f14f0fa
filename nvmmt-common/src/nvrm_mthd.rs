// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

//! Parameter blocks of the "call method" escape (`NVRM_IOCTL_CALL`), keyed by method id.
//!
//! The layouts are reverse engineered. Fields named `unkXX` are at byte offset `XX`.

use core::mem::size_of;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct KeyValue {
    pub key: u32,
    pub value: u32,
}

// Context methods.

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct ContextUnk00000101 {
    pub unk00: u32,
    pub unk04: u32,
    pub unk08_ptr: u64,
    pub unk10_ptr: u64,
    pub unk18_ptr: u64,
    pub unk20: u32,
    pub unk24: u32,
}
pub const NVRM_MTHD_CONTEXT_UNK00000101: u32 = 0x0000_0101;

/// Same shape as `ContextListDevices`.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct ContextUnk00000201 {
    pub gpu_id: [u32; 32],
}
pub const NVRM_MTHD_CONTEXT_UNK00000201: u32 = 0x0000_0201;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct ContextUnk00000202 {
    pub gpu_id: u32,
    pub unk04: u32,
    pub unk08: u32,
    pub unk0c: u32,
    pub unk10: u32,
    pub unk14: u32,
    pub unk18: u32,
    pub unk1c_gpu_id: u32,
    pub unk20: u32,
    pub unk24: u32,
}
pub const NVRM_MTHD_CONTEXT_UNK00000202: u32 = 0x0000_0202;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct ContextUnk00000301 {
    pub unk00: [u32; 12],
}
pub const NVRM_MTHD_CONTEXT_UNK00000301: u32 = 0x0000_0301;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct ContextListDevices {
    pub gpu_id: [u32; 32],
}
pub const NVRM_MTHD_CONTEXT_LIST_DEVICES: u32 = 0x0000_0214;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct ContextEnableDevice {
    pub gpu_id: u32,
    pub unk04: [u32; 32],
}
pub const NVRM_MTHD_CONTEXT_ENABLE_DEVICE: u32 = 0x0000_0215;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct ContextDisableDevice {
    pub gpu_id: u32,
    pub unk04: [u32; 32],
}
pub const NVRM_MTHD_CONTEXT_DISABLE_DEVICE: u32 = 0x0000_0216;

// Device methods.

/// Called twice: the first call, with `cnt` zero, returns the count.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct DeviceUnk00800201 {
    pub cnt: u32,
    pub unk04: u32,
    /// `cnt` u32s, null when `cnt` is zero.
    pub ptr: u64,
}
pub const NVRM_MTHD_DEVICE_UNK00800201: u32 = 0x0080_0201;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct DeviceUnk00800280 {
    pub unk00: u32,
}
pub const NVRM_MTHD_DEVICE_UNK00800280: u32 = 0x0080_0280;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct DeviceSetPersistenceMode {
    pub mode: u32,
}
pub const NVRM_MTHD_DEVICE_SET_PERSISTENCE_MODE: u32 = 0x0080_0287;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct DeviceGetPersistenceMode {
    pub mode: u32,
}
pub const NVRM_MTHD_DEVICE_GET_PERSISTENCE_MODE: u32 = 0x0080_0288;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct DeviceUnk00801102 {
    pub cnt: u32,
    pub _pad: u32,
    /// `cnt` bytes.
    pub ptr: u64,
}
pub const NVRM_MTHD_DEVICE_UNK00801102: u32 = 0x0080_1102;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct DeviceUnk00801401 {
    pub cnt: u32,
    pub cid: u32,
    /// `cnt` bytes.
    pub ptr: u64,
}
pub const NVRM_MTHD_DEVICE_UNK00801401: u32 = 0x0080_1401;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct DeviceUnk00801701 {
    pub cnt: u32,
    pub _pad: u32,
    pub ptr: u64,
}
pub const NVRM_MTHD_DEVICE_UNK00801701: u32 = 0x0080_1701;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct DeviceUnk0080170d {
    pub cnt: u32,
    pub _pad: u32,
    /// `cnt` u32s.
    pub ptr1: u64,
    /// `cnt` u32s.
    pub ptr2: u64,
}
pub const NVRM_MTHD_DEVICE_UNK0080170D: u32 = 0x0080_170d;

// Subdevice methods.

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceUnk20802016 {
    pub unk00: u32,
    pub unk04: u32,
    pub unk08: u32,
    pub unk0c: u32,
    pub cnt: u32,
    pub unk14: u32,
    /// `cnt` 16 byte entries.
    pub ptr: u64,
}
pub const NVRM_MTHD_SUBDEVICE_UNK20802016: u32 = 0x2080_2016;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceUnk20801301 {
    pub cnt: u32,
    pub _pad: u32,
    /// `cnt` u64s.
    pub ptr: u64,
}
pub const NVRM_MTHD_SUBDEVICE_UNK20801301: u32 = 0x2080_1301;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceUnk20800101 {
    pub cnt: u32,
    pub _pad: u32,
    /// `cnt` u64s.
    pub ptr: u64,
}
pub const NVRM_MTHD_SUBDEVICE_UNK20800101: u32 = 0x2080_0101;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct SubdeviceGetName {
    pub unk00: u32,
    pub name: [u8; 0x80],
}
pub const NVRM_MTHD_SUBDEVICE_GET_NAME: u32 = 0x2080_0110;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceUnk20800119 {
    pub unk00: u32,
}
pub const NVRM_MTHD_SUBDEVICE_UNK20800119: u32 = 0x2080_0119;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceGetFifoEngines {
    pub cnt: u32,
    pub _pad: u32,
    /// `cnt` u32s.
    pub ptr: u64,
}
pub const NVRM_MTHD_SUBDEVICE_GET_FIFO_ENGINES: u32 = 0x2080_0123;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceGetFifoClasses {
    pub eng: u32,
    pub cnt: u32,
    /// `cnt` u32s.
    pub ptr: u64,
}
pub const NVRM_MTHD_SUBDEVICE_GET_FIFO_CLASSES: u32 = 0x2080_0124;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceSetComputeMode {
    pub mode: u32,
    pub unk04: u32,
}
pub const NVRM_MTHD_SUBDEVICE_SET_COMPUTE_MODE: u32 = 0x2080_0130;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceGetComputeMode {
    pub mode: u32,
}
pub const NVRM_MTHD_SUBDEVICE_GET_COMPUTE_MODE: u32 = 0x2080_0131;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceGetGpcMask {
    pub gpc_mask: u32,
}
pub const NVRM_MTHD_SUBDEVICE_GET_GPC_MASK: u32 = 0x2080_0137;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceGetGpcTpMask {
    pub gpc_id: u32,
    pub tp_mask: u32,
}
pub const NVRM_MTHD_SUBDEVICE_GET_GPC_TP_MASK: u32 = 0x2080_0138;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceGetGpuId {
    pub gpu_id: u32,
}
pub const NVRM_MTHD_SUBDEVICE_GET_GPU_ID: u32 = 0x2080_0142;

/// No parameters.
pub const NVRM_MTHD_SUBDEVICE_UNK20800145: u32 = 0x2080_0145;

/// No parameters.
pub const NVRM_MTHD_SUBDEVICE_UNK20800146: u32 = 0x2080_0146;

/// The result array is embedded in the parameter block.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceGetFifoJoinableEngines {
    pub eng: u32,
    pub cls: u32,
    pub cnt: u32,
    pub res: [u32; 0x20],
}
pub const NVRM_MTHD_SUBDEVICE_GET_FIFO_JOINABLE_ENGINES: u32 = 0x2080_0147;

/// The uuid is embedded in the parameter block.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct SubdeviceGetUuid {
    pub unk00: u32,
    pub unk04: u32,
    pub uuid_len: u32,
    pub uuid: [u8; 0x100],
}
pub const NVRM_MTHD_SUBDEVICE_GET_UUID: u32 = 0x2080_014a;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceUnk20800303 {
    pub handle_unk003e: u32,
}
pub const NVRM_MTHD_SUBDEVICE_UNK20800303: u32 = 0x2080_0303;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceGetTime {
    pub time: u64,
}
pub const NVRM_MTHD_SUBDEVICE_GET_TIME: u32 = 0x2080_0403;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceUnk20800512 {
    pub unk00: u32,
    pub unk04: u32,
    pub unk08: u32,
    pub unk0c: u32,
    pub unk10: u32,
    pub unk14: u32,
    pub ptr: u64,
}
pub const NVRM_MTHD_SUBDEVICE_UNK20800512: u32 = 0x2080_0512;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceUnk20800522 {
    pub unk00: u32,
    pub unk04: u32,
    pub unk08: u32,
    pub unk0c: u32,
    pub unk10: u32,
    pub unk14: u32,
    pub ptr: u64,
}
pub const NVRM_MTHD_SUBDEVICE_UNK20800522: u32 = 0x2080_0522;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceUnk20801201 {
    pub cnt: u32,
    pub _pad: u32,
    /// `cnt` `KeyValue`s.
    pub ptr: u64,
}
pub const NVRM_MTHD_SUBDEVICE_UNK20801201: u32 = 0x2080_1201;

/// One register transaction of `SubdeviceUnk20800122`.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceUnk20800122Tx {
    pub dir: u32,
    pub unk04: u32,
    pub unk08: u32,
    pub addr: u32,
    pub unk10: u32,
    pub val: u32,
    pub unk18: u32,
    pub mask: u32,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceUnk20800122 {
    pub unk0: u32,
    pub unk4: u32,
    pub unk8: u32,
    pub unkc: u32,
    pub unk10: u32,
    pub cnt: u32,
    /// `cnt` `SubdeviceUnk20800122Tx`s.
    pub ptr: u64,
}
pub const NVRM_MTHD_SUBDEVICE_UNK20800122: u32 = 0x2080_0122;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceUnk2080100a {
    pub unk0: u32,
    pub cnt: u32,
    /// `cnt` 16 byte entries.
    pub ptr: u64,
}
pub const NVRM_MTHD_SUBDEVICE_UNK2080100A: u32 = 0x2080_100a;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceUnk20802002 {
    pub unk00: u32,
    pub unk04: u32,
    /// Always 72 bytes.
    pub ptr: u64,
    pub unk10: u32,
    pub unk14: u32,
}
pub const NVRM_MTHD_SUBDEVICE_UNK20802002: u32 = 0x2080_2002;
pub const NVRM_MTHD_SUBDEVICE_UNK20802002_PTR_LEN: u32 = 72;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceFbGetParams {
    pub cnt: u32,
    pub _pad: u32,
    /// `cnt` `KeyValue`s.
    pub ptr: u64,
}
pub const NVRM_PARAM_SUBDEVICE_FB_BUS_WIDTH: u32 = 11;
/// 5 for NV50; 8 for NVCF and NVE4.
pub const NVRM_PARAM_SUBDEVICE_FB_UNK13: u32 = 13;
pub const NVRM_PARAM_SUBDEVICE_FB_UNK23: u32 = 23;
pub const NVRM_PARAM_SUBDEVICE_FB_UNK24: u32 = 24;
pub const NVRM_PARAM_SUBDEVICE_FB_PART_COUNT: u32 = 25;
pub const NVRM_PARAM_SUBDEVICE_FB_L2_CACHE_SIZE: u32 = 27;
/// Shares its id with `NVRM_MTHD_SUBDEVICE_UNK20801301`.
pub const NVRM_MTHD_SUBDEVICE_FB_GET_PARAMS: u32 = 0x2080_1301;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceFbGetSurfaceGeometry {
    pub width: u32,
    pub height: u32,
    pub bpp: u32,
    pub pitch: u32,
    pub size: u32,
    pub unk14: u32,
}
pub const NVRM_MTHD_SUBDEVICE_FB_GET_SURFACE_GEOMETRY: u32 = 0x2080_1324;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceGetChipset {
    pub major: u32,
    pub minor: u32,
    pub stepping: u32,
}
pub const NVRM_MTHD_SUBDEVICE_GET_CHIPSET: u32 = 0x2080_1701;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceGetBusId {
    pub main_id: u32,
    pub subsystem_id: u32,
    pub stepping: u32,
    pub real_product_id: u32,
}
pub const NVRM_MTHD_SUBDEVICE_GET_BUS_ID: u32 = 0x2080_1801;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceBusGetParams {
    pub cnt: u32,
    pub _pad: u32,
    /// `cnt` `KeyValue`s.
    pub ptr: u64,
}
pub const NVRM_PARAM_SUBDEVICE_BUS_BUS_ID: u32 = 29;
pub const NVRM_PARAM_SUBDEVICE_BUS_DEV_ID: u32 = 30;
pub const NVRM_PARAM_SUBDEVICE_BUS_DOMAIN_ID: u32 = 60;
pub const NVRM_MTHD_SUBDEVICE_BUS_GET_PARAMS: u32 = 0x2080_1802;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceGetBusInfo {
    pub unk00: u32,
    pub unk04: u32,
    pub unk08: u32,
    pub regs_size_mb: u32,
    pub regs_base: u64,
    pub unk18: u32,
    pub fb_size_mb: u32,
    pub fb_base: u64,
    pub unk28: u32,
    pub ramin_size_mb: u32,
    pub ramin_base: u64,
    pub unk38: u32,
    pub unk3c: u32,
    pub unk40: u64,
    pub unk48: u64,
    pub unk50: u64,
    pub unk58: u64,
    pub unk60: u64,
    pub unk68: u64,
    pub unk70: u64,
    pub unk78: u64,
    pub unk80: u64,
}
pub const NVRM_MTHD_SUBDEVICE_GET_BUS_INFO: u32 = 0x2080_1803;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct SubdeviceGetVmInfo {
    pub total_addr_bits: u32,
    pub pde_addr_bits: u32,
    pub unk00: [u32; 0xa0 / 4],
}
pub const NVRM_MTHD_SUBDEVICE_GET_VM_INFO: u32 = 0x2080_1806;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SubdeviceUnk2080200a {
    pub unk00: u32,
    pub unk04: u32,
}
pub const NVRM_MTHD_SUBDEVICE_UNK2080200A: u32 = 0x2080_200a;

// FIFO methods.

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct FifoIbObjectInfo {
    pub handle: u32,
    pub name: u32,
    pub hwcls: u32,
    pub eng: u32,
}
pub const NVRM_FIFO_ENG_GRAPH: u32 = 1;
pub const NVRM_FIFO_ENG_COPY0: u32 = 2;
pub const NVRM_MTHD_FIFO_IB_OBJECT_INFO: u32 = 0x906f_0101;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct FifoIbActivate {
    pub unk00: u8,
}
pub const NVRM_MTHD_FIFO_IB_ACTIVATE: u32 = 0xa06f_0103;

// Class 0x85b6, purpose unknown.

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct Unk85b6Unk85b60201 {
    pub unk00: u32,
    pub unk04: u32,
}
pub const NVRM_MTHD_UNK85B6_UNK85B60201: u32 = 0x85b6_0201;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct Unk85b6Unk85b60202 {
    pub unk00: u8,
}
pub const NVRM_MTHD_UNK85B6_UNK85B60202: u32 = 0x85b6_0202;

// The driver reads these blocks with the 64 bit ABI.
const _: () = assert!(size_of::<KeyValue>() == 8);
const _: () = assert!(size_of::<DeviceUnk0080170d>() == 24);
const _: () = assert!(size_of::<SubdeviceUnk20802016>() == 32);
const _: () = assert!(size_of::<SubdeviceUnk20800122>() == 32);
const _: () = assert!(size_of::<SubdeviceUnk20800122Tx>() == 32);
const _: () = assert!(size_of::<SubdeviceGetFifoJoinableEngines>() == 12 + 0x80);
const _: () = assert!(size_of::<SubdeviceGetUuid>() == 12 + 0x100);
const _: () = assert!(size_of::<SubdeviceGetBusInfo>() == 0x88);
