// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gustavo Noronha Silva <gustavo@noronha.dev.br>

use std::{
    collections::HashSet,
    os::{fd::RawFd, unix::ffi::OsStrExt as _},
    path::Path,
};

use log::trace;
use nvmmt_common::{CARD_DEVICE_PREFIX, CONTROL_DEVICE_PATH};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceClass {
    /// `/dev/nvidiactl`
    Control,
    /// Any other `/dev/nvidia*` node.
    Card,
}

impl DeviceClass {
    pub fn from_path(path: &Path) -> Option<Self> {
        let bytes = path.as_os_str().as_bytes();

        if bytes == CONTROL_DEVICE_PATH.as_bytes() {
            Some(DeviceClass::Control)
        } else if bytes.starts_with(CARD_DEVICE_PREFIX.as_bytes()) {
            Some(DeviceClass::Card)
        } else {
            None
        }
    }
}

/// The file descriptors of the traced process that refer to driver nodes.
#[derive(Debug, Default)]
pub struct FdClassifier {
    control: HashSet<RawFd>,
    card: HashSet<RawFd>,
}

impl FdClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successfully opened file, returning its class if it is a driver node.
    pub fn on_open(&mut self, fd: RawFd, path: &Path) -> Option<DeviceClass> {
        let class = DeviceClass::from_path(path)?;

        trace!("fd {fd} is a {class:?} node ({})", path.display());

        // A reused descriptor must never sit in both sets.
        self.on_close(fd);

        match class {
            DeviceClass::Control => self.control.insert(fd),
            DeviceClass::Card => self.card.insert(fd),
        };

        Some(class)
    }

    pub fn on_close(&mut self, fd: RawFd) {
        self.control.remove(&fd);
        self.card.remove(&fd);
    }

    pub fn class_of(&self, fd: RawFd) -> Option<DeviceClass> {
        if self.control.contains(&fd) {
            Some(DeviceClass::Control)
        } else if self.card.contains(&fd) {
            Some(DeviceClass::Card)
        } else {
            None
        }
    }

    pub fn is_tracked(&self, fd: RawFd) -> bool {
        self.class_of(fd).is_some()
    }

    pub fn is_card(&self, fd: RawFd) -> bool {
        self.card.contains(&fd)
    }
}
