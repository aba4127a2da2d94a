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

//! Manual register commands for the FPGA CLI.
//!
//! Each command is a single read-modify-write of one field, outside the automated
//! configuration routine. Values wider than the field are rejected by the library with
//! `FpgaMgrError::InvalidFieldValue` before the register is touched.

use fpgamgr::config::ManagerConfig;
use fpgamgr::error::FpgaMgrError;
use fpgamgr::manager::FpgaManager;
use fpgamgr::registers::ControlField;
use fpgamgr::window::RegisterWindow;

/// Single-bit control fields that have their own subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    AxiCfgEn,
    CtrlEn,
    NConfigPull,
}

impl Switch {
    fn field(self) -> ControlField {
        match self {
            Switch::AxiCfgEn => ControlField::AxiCfgEn,
            Switch::CtrlEn => ControlField::CtrlEn,
            Switch::NConfigPull => ControlField::NConfigPull,
        }
    }
}

/// Handler for `axicf`, `ctrl-en` and `nconfigpull`.
pub fn field_handler<W: RegisterWindow>(
    manager: &mut FpgaManager<W>,
    switch: Switch,
    value: u8,
) -> Result<String, FpgaMgrError> {
    match switch {
        Switch::AxiCfgEn => manager.set_axicfgen(value)?,
        Switch::CtrlEn => manager.set_ctrl_en(value)?,
        Switch::NConfigPull => manager.set_nconfigpull(value)?,
    }
    Ok(format!("{} set to {value:#x}", switch.field()))
}

/// Handler for `cdr`: applies the ratio matching the board's MSEL strapping.
pub fn cdr_handler<W: RegisterWindow>(
    manager: &mut FpgaManager<W>,
    config: &ManagerConfig,
) -> Result<String, FpgaMgrError> {
    manager.set_cdratio(config.cdratio)?;
    Ok(format!("cdratio set to {:#x}", config.cdratio))
}

/// Handler for `reset`.
pub fn reset_handler<W: RegisterWindow>(
    manager: &mut FpgaManager<W>,
) -> Result<String, FpgaMgrError> {
    manager.reset()?;
    Ok("FPGA reset".to_string())
}

/// Handler for `on` and `off`.
pub fn power_handler<W: RegisterWindow>(
    manager: &mut FpgaManager<W>,
    on: bool,
) -> Result<String, FpgaMgrError> {
    if on {
        manager.power_on()?;
        Ok("FPGA powered on".to_string())
    } else {
        manager.power_off()?;
        Ok("FPGA powered off".to_string())
    }
}
