// This file is part of fpgamgr, an application to bring up an FPGA through the SoC FPGA manager registers.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// fpgamgr is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// fpgamgr is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

//! Register window abstraction.
//!
//! The FPGA manager is reached through two disjoint physical ranges:
//! - the control/status range holding `stat`, `ctrl` and the GPIO interrupt registers
//! - the data range, a single write-only port feeding the configuration FIFO
//!
//! Everything above this module talks to the hardware exclusively through
//! [`RegisterWindow`], so the register model, state machine and loader can run against
//! the real `/dev/mem` mapping ([`devmem::DevMemWindow`]) or against a simulated device
//! in tests.
//!
//! Every access is addressed by a [`Region`] and a byte offset within it. Implementations
//! must reject misaligned or out-of-range accesses with
//! [`FpgaMgrError::RegisterAccessUnavailable`] instead of touching memory.

use crate::error::FpgaMgrError;
use std::fmt;

pub mod devmem;

/// One of the two address ranges exposed by the FPGA manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Status, control and configuration monitor registers.
    ControlStatus,
    /// Write-only configuration data port.
    Data,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::ControlStatus => write!(f, "control/status region"),
            Region::Data => write!(f, "data region"),
        }
    }
}

/// Byte, halfword and word access to the FPGA manager's register ranges.
///
/// Accesses take `&mut self`: the window is owned by exactly one configuration run and a
/// read of a hardware register is not guaranteed to be side-effect free.
pub trait RegisterWindow {
    fn read_u8(&mut self, region: Region, offset: usize) -> Result<u8, FpgaMgrError>;
    fn read_u16(&mut self, region: Region, offset: usize) -> Result<u16, FpgaMgrError>;
    fn read_u32(&mut self, region: Region, offset: usize) -> Result<u32, FpgaMgrError>;
    fn write_u8(&mut self, region: Region, offset: usize, value: u8) -> Result<(), FpgaMgrError>;
    fn write_u16(&mut self, region: Region, offset: usize, value: u16) -> Result<(), FpgaMgrError>;
    fn write_u32(&mut self, region: Region, offset: usize, value: u32) -> Result<(), FpgaMgrError>;
}

impl<W: RegisterWindow + ?Sized> RegisterWindow for &mut W {
    fn read_u8(&mut self, region: Region, offset: usize) -> Result<u8, FpgaMgrError> {
        (**self).read_u8(region, offset)
    }

    fn read_u16(&mut self, region: Region, offset: usize) -> Result<u16, FpgaMgrError> {
        (**self).read_u16(region, offset)
    }

    fn read_u32(&mut self, region: Region, offset: usize) -> Result<u32, FpgaMgrError> {
        (**self).read_u32(region, offset)
    }

    fn write_u8(&mut self, region: Region, offset: usize, value: u8) -> Result<(), FpgaMgrError> {
        (**self).write_u8(region, offset, value)
    }

    fn write_u16(
        &mut self,
        region: Region,
        offset: usize,
        value: u16,
    ) -> Result<(), FpgaMgrError> {
        (**self).write_u16(region, offset, value)
    }

    fn write_u32(
        &mut self,
        region: Region,
        offset: usize,
        value: u32,
    ) -> Result<(), FpgaMgrError> {
        (**self).write_u32(region, offset, value)
    }
}

/// Check that an access of `width` bytes at `offset` is aligned and inside `extent`.
///
/// Shared by every [`RegisterWindow`] implementation so that the alignment rules are the
/// same for hardware and simulated windows.
///
/// # Returns: `Result<(), FpgaMgrError>`
/// * `Ok(())` - The access may proceed
/// * `Err(FpgaMgrError::RegisterAccessUnavailable)` - Misaligned or outside the mapped extent
pub fn check_access(
    region: Region,
    offset: usize,
    width: usize,
    extent: usize,
) -> Result<(), FpgaMgrError> {
    if offset % width != 0 {
        return Err(FpgaMgrError::RegisterAccessUnavailable {
            target: access_target(region, offset, width),
            reason: format!("offset is not aligned to {width} bytes"),
        });
    }
    match offset.checked_add(width) {
        Some(end) if end <= extent => Ok(()),
        _ => Err(FpgaMgrError::RegisterAccessUnavailable {
            target: access_target(region, offset, width),
            reason: format!("outside the mapped extent of {extent:#x} bytes"),
        }),
    }
}

fn access_target(region: Region, offset: usize, width: usize) -> String {
    format!("{region} access of {width} bytes at offset {offset:#x}")
}
