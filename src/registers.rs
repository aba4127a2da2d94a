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

//! Typed view of the FPGA manager registers.
//!
//! ```text
//! control/status region
//! +0x000  stat            u8   [7:3] msel (RO)   [2:0] mode
//! +0x004  ctrl            u16  [9] cfgwdth [8] axicfgen [7:6] cdratio [2] nconfigpull [0] en
//! +0x840  gpio_intstatus  u16  [1] conf_done
//!
//! data region
//! +0x000  data            u32  configuration FIFO (WO)
//! ```
//!
//! [`RegisterModel`] layers these fields over a [`RegisterWindow`]. Every control write is a
//! read-modify-write: the current register is read, only the target field is replaced and
//! every other bit is written back unchanged.

use crate::error::FpgaMgrError;
use crate::window::{Region, RegisterWindow};
use log::trace;
use std::fmt;

pub const STAT_OFFSET: usize = 0x000;
pub const CTRL_OFFSET: usize = 0x004;
pub const GPIO_INTSTATUS_OFFSET: usize = 0x840;
pub const DATA_OFFSET: usize = 0x000;

const MODE_MASK: u8 = 0b111;
const MSEL_SHIFT: u8 = 3;
const CONF_DONE_BIT: u16 = 1;

/// Lifecycle phase reported in the mode bits of the status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    PoweredOff,
    Reset,
    Configuration,
    Initialization,
    UserMode,
    /// Any encoding the manager does not define (5..=7).
    Undetermined(u8),
}

impl Mode {
    pub fn from_bits(bits: u8) -> Mode {
        match bits & MODE_MASK {
            0 => Mode::PoweredOff,
            1 => Mode::Reset,
            2 => Mode::Configuration,
            3 => Mode::Initialization,
            4 => Mode::UserMode,
            other => Mode::Undetermined(other),
        }
    }

    /// The encoding written to the mode bits. [`Mode::Undetermined`] has none.
    pub fn bits(self) -> Result<u8, FpgaMgrError> {
        match self {
            Mode::PoweredOff => Ok(0),
            Mode::Reset => Ok(1),
            Mode::Configuration => Ok(2),
            Mode::Initialization => Ok(3),
            Mode::UserMode => Ok(4),
            Mode::Undetermined(raw) => Err(FpgaMgrError::InvalidFieldValue {
                field: "mode",
                value: raw,
                max: 4,
            }),
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Mode::PoweredOff => "Powered Off",
            Mode::Reset => "Reset Phase",
            Mode::Configuration => "Configuration Phase",
            Mode::Initialization => "Initialization Phase",
            Mode::UserMode => "User Phase",
            Mode::Undetermined(_) => "Undetermined (error ?)",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Snapshot of the 8-bit `stat` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRegister(pub u8);

impl StatusRegister {
    pub fn mode(self) -> Mode {
        Mode::from_bits(self.0)
    }

    /// Board strapping of the MSEL pins. Read-only.
    pub fn msel(self) -> u8 {
        self.0 >> MSEL_SHIFT
    }
}

/// A named bit-field of the `ctrl` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlField {
    /// Hands the configuration port to the HPS (1) or to the external pins (0).
    CtrlEn,
    /// Holds the FPGA in reset while set.
    NConfigPull,
    /// Clock to data ratio; must agree with the MSEL strapping.
    CdRatio,
    /// Enables DCLK for AXI configuration data transfers.
    AxiCfgEn,
    /// Passive parallel bus width, 16-bit (0) or 32-bit (1).
    CfgWdth,
}

impl ControlField {
    pub const ALL: [ControlField; 5] = [
        ControlField::CtrlEn,
        ControlField::NConfigPull,
        ControlField::CdRatio,
        ControlField::AxiCfgEn,
        ControlField::CfgWdth,
    ];

    pub fn shift(self) -> u16 {
        match self {
            ControlField::CtrlEn => 0,
            ControlField::NConfigPull => 2,
            ControlField::CdRatio => 6,
            ControlField::AxiCfgEn => 8,
            ControlField::CfgWdth => 9,
        }
    }

    pub fn width(self) -> u16 {
        match self {
            ControlField::CdRatio => 2,
            _ => 1,
        }
    }

    /// Largest value the field can hold.
    pub fn max(self) -> u8 {
        ((1u16 << self.width()) - 1) as u8
    }

    /// Field mask in register position.
    pub fn mask(self) -> u16 {
        u16::from(self.max()) << self.shift()
    }

    pub fn name(self) -> &'static str {
        match self {
            ControlField::CtrlEn => "ctrl_en",
            ControlField::NConfigPull => "nconfigpull",
            ControlField::CdRatio => "cdratio",
            ControlField::AxiCfgEn => "axicfgen",
            ControlField::CfgWdth => "cfgwdth",
        }
    }

    /// Reject values wider than the field.
    pub fn validate(self, value: u8) -> Result<(), FpgaMgrError> {
        if value > self.max() {
            return Err(FpgaMgrError::InvalidFieldValue {
                field: self.name(),
                value,
                max: self.max(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ControlField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot of the 16-bit `ctrl` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRegister(pub u16);

impl ControlRegister {
    pub fn field(self, field: ControlField) -> u8 {
        ((self.0 & field.mask()) >> field.shift()) as u8
    }

    /// Copy of this register with `field` replaced by `value` and every other bit kept.
    pub fn with_field(
        self,
        field: ControlField,
        value: u8,
    ) -> Result<ControlRegister, FpgaMgrError> {
        field.validate(value)?;
        let cleared = self.0 & !field.mask();
        Ok(ControlRegister(cleared | (u16::from(value) << field.shift())))
    }

    pub fn ctrl_en(self) -> u8 {
        self.field(ControlField::CtrlEn)
    }

    pub fn nconfigpull(self) -> u8 {
        self.field(ControlField::NConfigPull)
    }

    pub fn cdratio(self) -> u8 {
        self.field(ControlField::CdRatio)
    }

    pub fn axicfgen(self) -> u8 {
        self.field(ControlField::AxiCfgEn)
    }

    pub fn cfgwdth(self) -> u8 {
        self.field(ControlField::CfgWdth)
    }
}

/// Snapshot of the configuration monitor's `gpio_intstatus` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioInterruptStatus(pub u16);

impl GpioInterruptStatus {
    pub fn configuration_done(self) -> bool {
        (self.0 >> CONF_DONE_BIT) & 1 == 1
    }
}

/// Typed register access over an exclusively owned [`RegisterWindow`].
#[derive(Debug)]
pub struct RegisterModel<W> {
    window: W,
}

impl<W: RegisterWindow> RegisterModel<W> {
    pub fn new(window: W) -> RegisterModel<W> {
        RegisterModel { window }
    }

    /// Give the window back, e.g. to inspect a simulated device after a run.
    pub fn into_inner(self) -> W {
        self.window
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn read_status(&mut self) -> Result<StatusRegister, FpgaMgrError> {
        let raw = self.window.read_u8(Region::ControlStatus, STAT_OFFSET)?;
        trace!("stat -> {raw:#04x}");
        Ok(StatusRegister(raw))
    }

    pub fn read_control(&mut self) -> Result<ControlRegister, FpgaMgrError> {
        let raw = self.window.read_u16(Region::ControlStatus, CTRL_OFFSET)?;
        trace!("ctrl -> {raw:#06x}");
        Ok(ControlRegister(raw))
    }

    pub fn read_gpio_interrupt_status(&mut self) -> Result<GpioInterruptStatus, FpgaMgrError> {
        let raw = self
            .window
            .read_u16(Region::ControlStatus, GPIO_INTSTATUS_OFFSET)?;
        trace!("gpio_intstatus -> {raw:#06x}");
        Ok(GpioInterruptStatus(raw))
    }

    /// Read-modify-write a single control field.
    ///
    /// The value is validated before the register is touched, so an out-of-range value
    /// performs no access at all.
    ///
    /// # Returns: `Result<(), FpgaMgrError>`
    /// * `Ok(())` - Field written, all other bits preserved
    /// * `Err(FpgaMgrError::InvalidFieldValue)` - `value` wider than the field
    /// * `Err(FpgaMgrError::RegisterAccessUnavailable)` - Window rejected the access
    pub fn write_control_field(
        &mut self,
        field: ControlField,
        value: u8,
    ) -> Result<(), FpgaMgrError> {
        field.validate(value)?;
        let current = self.read_control()?;
        let updated = current.with_field(field, value)?;
        trace!(
            "ctrl <- {:#06x} ({field} = {value:#x}, was {:#06x})",
            updated.0,
            current.0
        );
        self.window
            .write_u16(Region::ControlStatus, CTRL_OFFSET, updated.0)
    }

    /// Read-modify-write the mode bits of `stat`, keeping the MSEL bits.
    pub fn write_status_mode(&mut self, mode: Mode) -> Result<(), FpgaMgrError> {
        let bits = mode.bits()?;
        let current = self.read_status()?;
        let updated = (current.0 & !MODE_MASK) | bits;
        trace!("stat <- {updated:#04x} (mode = {mode}, was {:#04x})", current.0);
        self.window
            .write_u8(Region::ControlStatus, STAT_OFFSET, updated)
    }

    /// Push one word into the configuration FIFO. No read-back.
    pub fn data_port_write(&mut self, word: u32) -> Result<(), FpgaMgrError> {
        self.window.write_u32(Region::Data, DATA_OFFSET, word)
    }
}
