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


use fpgamgr::config::{FPGA_MANAGER_BASE, FPGA_MANAGER_DATA_BASE, FPGA_MANAGER_SPAN};
use fpgamgr::window::devmem::DevMemWindow;
use googletest::prelude::*;
use std::path::Path;

#[gtest]
fn missing_memory_device_is_register_access_unavailable() {
    let result = DevMemWindow::open_device(
        Path::new("/nonexistent/fpgamgr/mem"),
        FPGA_MANAGER_BASE,
        FPGA_MANAGER_SPAN,
        FPGA_MANAGER_DATA_BASE,
    );

    assert_that!(
        result,
        err(displays_as(all![
            starts_with("FpgaMgrError::RegisterAccessUnavailable:"),
            contains_substring("/nonexistent/fpgamgr/mem"),
        ]))
    );
}

#[gtest]
fn short_control_span_is_rejected_before_opening_the_device() {
    let result = DevMemWindow::open_device(
        Path::new("/nonexistent/fpgamgr/mem"),
        FPGA_MANAGER_BASE,
        0x800,
        FPGA_MANAGER_DATA_BASE,
    );

    assert_that!(
        result,
        err(displays_as(contains_substring(
            "FpgaMgrError::Argument: Control span 0x800 does not reach gpio_intstatus"
        )))
    );
}
