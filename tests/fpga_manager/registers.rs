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

use crate::common::simulated_device::{Behaviour, BusWrite, SimulatedFpgaManager};
use fpgamgr::error::FpgaMgrError;
use fpgamgr::registers::{
    ControlField, ControlRegister, GpioInterruptStatus, Mode, RegisterModel, StatusRegister,
};
use fpgamgr::window::{Region, check_access};
use googletest::prelude::*;
use rstest::*;

fn model_with_ctrl(ctrl: u16) -> RegisterModel<SimulatedFpgaManager> {
    RegisterModel::new(SimulatedFpgaManager::new(0b01010, Behaviour::Frozen).with_ctrl(ctrl))
}

#[gtest]
#[rstest]
fn write_control_field_only_touches_target_field(
    #[values(0x0000, 0xffff, 0xa5a5, 0x5a5a, 0x0200)] initial: u16,
) {
    for field in ControlField::ALL {
        for value in 0..=field.max() {
            let mut model = model_with_ctrl(initial);
            model
                .write_control_field(field, value)
                .expect("in-range value should be accepted");
            let after = model.read_control().expect("ctrl should be readable");

            expect_that!(after.field(field), eq(value), "{field} = {value}");
            expect_that!(
                after.0 & !field.mask(),
                eq(initial & !field.mask()),
                "{field} = {value} changed other bits of {initial:#06x}"
            );
        }
    }
}

#[gtest]
#[rstest]
#[case::ctrl_en(ControlField::CtrlEn, 2)]
#[case::nconfigpull(ControlField::NConfigPull, 0xff)]
#[case::axicfgen(ControlField::AxiCfgEn, 2)]
#[case::cfgwdth(ControlField::CfgWdth, 7)]
#[case::cdratio(ControlField::CdRatio, 4)]
fn out_of_range_value_is_rejected_without_access(#[case] field: ControlField, #[case] value: u8) {
    let mut model = model_with_ctrl(0x1234);
    let result = model.write_control_field(field, value);

    assert_that!(
        result,
        err(displays_as(contains_substring(
            "FpgaMgrError::InvalidFieldValue:"
        )))
    );
    let device = model.into_inner();
    expect_that!(device.accesses.len(), eq(0));
    expect_that!(device.ctrl, eq(0x1234));
}

#[gtest]
fn control_write_is_a_single_halfword_read_modify_write() {
    let mut model = model_with_ctrl(0x0200);
    model
        .write_control_field(ControlField::AxiCfgEn, 1)
        .expect("write should succeed");
    let device = model.into_inner();

    expect_that!(device.accesses.len(), eq(2));
    expect_that!(device.writes(), eq(&vec![BusWrite::ctrl(0x0300)]));
}

#[gtest]
#[rstest]
#[case::powered_off(0x00, Mode::PoweredOff, "Powered Off")]
#[case::reset(0x01, Mode::Reset, "Reset Phase")]
#[case::configuration(0x02, Mode::Configuration, "Configuration Phase")]
#[case::initialization(0x03, Mode::Initialization, "Initialization Phase")]
#[case::user_mode(0x04, Mode::UserMode, "User Phase")]
#[case::undetermined(0x07, Mode::Undetermined(7), "Undetermined (error ?)")]
#[case::msel_ignored(0x54, Mode::UserMode, "User Phase")]
fn status_mode_decoding(#[case] raw: u8, #[case] mode: Mode, #[case] description: &str) {
    let status = StatusRegister(raw);
    expect_that!(status.mode(), eq(mode));
    expect_that!(status.mode().description(), eq(description));
}

#[gtest]
fn status_msel_decoding() {
    expect_that!(StatusRegister(0b0101_0100).msel(), eq(0b01010));
    expect_that!(StatusRegister(0xff).msel(), eq(0b11111));
}

#[gtest]
fn control_field_accessors() {
    // cfgwdth=1, axicfgen=1, cdratio=2, nconfigpull=1, ctrl_en=1
    let ctrl = ControlRegister(0b11_1000_0101);
    expect_that!(ctrl.cfgwdth(), eq(1));
    expect_that!(ctrl.axicfgen(), eq(1));
    expect_that!(ctrl.cdratio(), eq(2));
    expect_that!(ctrl.nconfigpull(), eq(1));
    expect_that!(ctrl.ctrl_en(), eq(1));
}

#[gtest]
#[rstest]
#[case::clear(0x0000, false)]
#[case::done(0x0002, true)]
#[case::other_bits(0xfffd, false)]
fn configuration_done_flag(#[case] raw: u16, #[case] done: bool) {
    expect_that!(GpioInterruptStatus(raw).configuration_done(), eq(done));
}

#[gtest]
fn write_status_mode_keeps_msel() {
    let device =
        SimulatedFpgaManager::new(0b01010, Behaviour::Frozen).with_mode(Mode::Initialization);
    let mut model = RegisterModel::new(device);
    model
        .write_status_mode(Mode::Reset)
        .expect("mode write should succeed");

    let status = model.read_status().expect("stat should be readable");
    expect_that!(status.mode(), eq(Mode::Reset));
    expect_that!(status.msel(), eq(0b01010));
}

#[gtest]
fn write_status_mode_rejects_undetermined() {
    let mut model = model_with_ctrl(0);
    let result = model.write_status_mode(Mode::Undetermined(6));
    assert_that!(
        result,
        err(displays_as(contains_substring(
            "FpgaMgrError::InvalidFieldValue: 0x6 does not fit in mode (max 0x4)"
        )))
    );
    expect_that!(model.into_inner().accesses.len(), eq(0));
}

#[gtest]
fn data_port_write_targets_data_region() {
    let mut model = model_with_ctrl(0);
    model
        .data_port_write(0xdead_beef)
        .expect("data write should succeed");
    expect_that!(
        model.into_inner().writes(),
        eq(&vec![BusWrite::data(0xdead_beef)])
    );
}

#[gtest]
#[rstest]
#[case::aligned_byte(Region::ControlStatus, 0x0, 1, 0x1000, true)]
#[case::aligned_halfword(Region::ControlStatus, 0x840, 2, 0x1000, true)]
#[case::misaligned_halfword(Region::ControlStatus, 0x5, 2, 0x1000, false)]
#[case::misaligned_word(Region::Data, 0x2, 4, 4, false)]
#[case::last_word(Region::Data, 0x0, 4, 4, true)]
#[case::past_end(Region::Data, 0x4, 4, 4, false)]
#[case::overflow(Region::ControlStatus, usize::MAX - 1, 2, 0x1000, false)]
fn access_checks(
    #[case] region: Region,
    #[case] offset: usize,
    #[case] width: usize,
    #[case] extent: usize,
    #[case] allowed: bool,
) {
    let result: std::result::Result<(), FpgaMgrError> =
        check_access(region, offset, width, extent);
    if allowed {
        expect_that!(result, ok(anything()));
    } else {
        expect_that!(
            result,
            err(displays_as(contains_substring(
                "FpgaMgrError::RegisterAccessUnavailable:"
            )))
        );
    }
}
