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

//! Human readable status snapshot.

use crate::error::FpgaMgrError;
use crate::registers::{Mode, RegisterModel};
use crate::window::RegisterWindow;
use std::fmt;

const RULE: &str = "******************************************************";

/// Every status and control field, captured from a single read of each of
/// `stat`, `ctrl` and `gpio_intstatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub msel: u8,
    pub mode: Mode,
    pub cfgwdth: u8,
    pub cdratio: u8,
    pub axicfgen: u8,
    pub nconfigpull: u8,
    pub configuration_done: bool,
    pub ctrl_en: u8,
}

impl StatusReport {
    /// Capture a snapshot. Only reads; no register is written.
    pub fn capture<W: RegisterWindow>(
        registers: &mut RegisterModel<W>,
    ) -> Result<StatusReport, FpgaMgrError> {
        let status = registers.read_status()?;
        let control = registers.read_control()?;
        let gpio = registers.read_gpio_interrupt_status()?;
        Ok(StatusReport {
            msel: status.msel(),
            mode: status.mode(),
            cfgwdth: control.cfgwdth(),
            cdratio: control.cdratio(),
            axicfgen: control.axicfgen(),
            nconfigpull: control.nconfigpull(),
            configuration_done: gpio.configuration_done(),
            ctrl_en: control.ctrl_en(),
        })
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "MSEL Pin Config..... {:#x}", self.msel)?;
        writeln!(f, "FPGA State.......... {}", self.mode)?;
        writeln!(f, "cfgwdth Register.... {:#x}", self.cfgwdth)?;
        writeln!(f, "cdratio Register.... {:#x}", self.cdratio)?;
        writeln!(f, "axicfgen Register... {:#x}", self.axicfgen)?;
        writeln!(f, "Nconfig pull reg.... {:#x}", self.nconfigpull)?;
        writeln!(f, "CONF DONE........... {:#x}", u8::from(self.configuration_done))?;
        writeln!(f, "Ctrl.en?............ {:#x}", self.ctrl_en)?;
        write!(f, "{RULE}")
    }
}
