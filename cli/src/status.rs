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

//! Status command implementation for the FPGA CLI.

use fpgamgr::error::FpgaMgrError;
use fpgamgr::manager::FpgaManager;
use fpgamgr::window::RegisterWindow;

/// Reads the status, control and configuration monitor registers and returns the
/// formatted report. Nothing is written.
pub fn status_handler<W: RegisterWindow>(
    manager: &mut FpgaManager<W>,
) -> Result<String, FpgaMgrError> {
    Ok(manager.report_status()?.to_string())
}
