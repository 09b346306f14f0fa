// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

//! Object classes the driver is known to instantiate, used to annotate object creation.

/// Name used for classes missing from the table, or present without a name.
pub const UNKNOWN_OBJECT_NAME: &str = "???";

/// Bytes of constructor arguments dumped for classes missing from the table.
pub const UNKNOWN_CTOR_ARGS_LEN: u32 = 0x40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectType {
    pub class: u32,
    pub name: Option<&'static str>,
    /// Number of 32 bit constructor arguments.
    pub cargs: u32,
}

impl ObjectType {
    pub fn display_name(&self) -> &'static str {
        self.name.unwrap_or(UNKNOWN_OBJECT_NAME)
    }

    pub fn ctor_args_len(&self) -> u32 {
        self.cargs * 4
    }
}

const fn obj(class: u32, name: &'static str, cargs: u32) -> ObjectType {
    ObjectType {
        class,
        name: Some(name),
        cargs,
    }
}

pub static OBJECT_TYPES: &[ObjectType] = &[
    obj(0x0000, "NV_CONTEXT_NEW", 0),
    obj(0x0004, "NV_PTIMER", 0),
    obj(0x0041, "NV_CONTEXT", 0),
    obj(0x502d, "NV50_2D", 0),
    obj(0x902d, "NVC0_2D", 0),
    obj(0x5039, "NV50_M2MF", 0),
    obj(0x9039, "NVC0_M2MF", 0),
    obj(0x9068, "NVC0_PEEPHOLE", 0),
    obj(0x406e, "NV40_FIFO_DMA", 6),
    obj(0x506f, "NV50_FIFO_IB", 6),
    obj(0x826f, "NV84_FIFO_IB", 6),
    obj(0x906f, "NVC0_FIFO_IB", 6),
    obj(0x5070, "NV84_DISPLAY", 4),
    obj(0x8270, "NV84_DISPLAY", 4),
    obj(0x8370, "NVA0_DISPLAY", 4),
    obj(0x8870, "NV98_DISPLAY", 4),
    obj(0x8570, "NVA3_DISPLAY", 4),
    ObjectType {
        class: 0x5072,
        name: None,
        cargs: 8,
    },
    obj(0x7476, "NV84_VP", 0),
    obj(0x507a, "NV50_DISPLAY_CURSOR", 0),
    obj(0x827a, "NV84_DISPLAY_CURSOR", 0),
    obj(0x857a, "NVA3_DISPLAY_CURSOR", 0),
    obj(0x507b, "NV50_DISPLAY_OVERLAY", 0),
    obj(0x827b, "NV84_DISPLAY_OVERLAY", 0),
    obj(0x857b, "NVA3_DISPLAY_OVERLAY", 0),
    obj(0x507c, "NV50_DISPLAY_SYNC_FIFO", 8),
    obj(0x827c, "NV84_DISPLAY_SYNC_FIFO", 8),
    obj(0x837c, "NVA0_DISPLAY_SYNC_FIFO", 8),
    obj(0x857c, "NVA3_DISPLAY_SYNC_FIFO", 8),
    obj(0x507d, "NV50_DISPLAY_MASTER_FIFO", 0),
    obj(0x827d, "NV84_DISPLAY_MASTER_FIFO", 0),
    obj(0x837d, "NVA0_DISPLAY_MASTER_FIFO", 0),
    obj(0x887d, "NV98_DISPLAY_MASTER_FIFO", 0),
    obj(0x857d, "NVA3_DISPLAY_MASTER_FIFO", 0),
    obj(0x307e, "NV30_PEEPHOLE", 0),
    obj(0x507e, "NV50_DISPLAY_OVERLAY_FIFO", 8),
    obj(0x827e, "NV84_DISPLAY_OVERLAY_FIFO", 8),
    obj(0x837e, "NVA0_DISPLAY_OVERLAY_FIFO", 8),
    obj(0x857e, "NVA3_DISPLAY_OVERLAY_FIFO", 8),
    obj(0x0080, "NV_DEVICE", 1),
    obj(0x2080, "NV_SUBDEVICE_0", 0),
    obj(0x2081, "NV_SUBDEVICE_1", 0),
    obj(0x2082, "NV_SUBDEVICE_2", 0),
    obj(0x2083, "NV_SUBDEVICE_3", 0),
    obj(0x5097, "NV50_3D", 0),
    obj(0x8297, "NV84_3D", 0),
    obj(0x8397, "NVA0_3D", 0),
    obj(0x8597, "NVA3_3D", 0),
    obj(0x8697, "NVAF_3D", 0),
    obj(0x9097, "NVC0_3D", 0),
    obj(0x74b0, "NV84_BSP", 0),
    obj(0x88b1, "NV98_BSP", 0),
    obj(0x85b1, "NVA3_BSP", 0),
    obj(0x86b1, "NVAF_BSP", 0),
    obj(0x90b1, "NVC0_BSP", 0),
    obj(0x88b2, "NV98_VP", 0),
    obj(0x85b2, "NVA3_VP", 0),
    obj(0x90b2, "NVC0_VP", 0),
    obj(0x88b3, "NV98_PPP", 0),
    obj(0x85b3, "NVA3_PPP", 0),
    obj(0x90b3, "NVC0_PPP", 0),
    obj(0x88b4, "NV98_CRYPT", 0),
    obj(0x85b5, "NVA3_COPY", 0),
    obj(0x90b5, "NVC0_COPY0", 0),
    obj(0x50c0, "NV50_COMPUTE", 0),
    obj(0x85c0, "NVA3_COMPUTE", 0),
    obj(0x90c0, "NVC0_COMPUTE", 0),
    obj(0x74c1, "NV84_CRYPT", 0),
    obj(0x50e0, "NV50_PGRAPH", 0),
    obj(0x50e2, "NV50_PFIFO", 0),
];

/// Looks up a class; `None` for classes that were never catalogued.
pub fn find_object_type(class: u32) -> Option<&'static ObjectType> {
    OBJECT_TYPES.iter().find(|t| t.class == class)
}

/// Human-readable name of a class, `"???"` when unknown.
pub fn object_name(class: u32) -> &'static str {
    find_object_type(class).map_or(UNKNOWN_OBJECT_NAME, ObjectType::display_name)
}

/// Bytes of constructor arguments worth dumping when creating an object of this class.
pub fn ctor_args_len(class: u32) -> u32 {
    find_object_type(class).map_or(UNKNOWN_CTOR_ARGS_LEN, ObjectType::ctor_args_len)
}
