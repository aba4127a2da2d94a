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
use crate::common::test_functions::{default_device, manager_for, test_config};
use fpgamgr::config::ManagerConfig;
use fpgamgr::error::FpgaMgrError;
use fpgamgr::manager::FpgaManager;
use fpgamgr::registers::Mode;
use googletest::prelude::*;
use rstest::*;
use std::io::Cursor;

type Setter =
    fn(&mut FpgaManager<SimulatedFpgaManager>, u8) -> std::result::Result<(), FpgaMgrError>;

const EXAMPLE_IMAGE: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0xaa, 0xbb, 0xcc, 0xdd];

#[gtest]
#[rstest]
#[case::instant(0)]
#[case::slow(5)]
fn full_configuration_write_order(#[case] latency: u32) {
    // cfgwdth = 1 must survive the whole sequence.
    let device = default_device(Behaviour::Responsive)
        .with_ctrl(0x0200)
        .with_latency(latency);
    let mut manager = manager_for(device, 10);

    let report = manager
        .run_configuration(&mut Cursor::new(EXAMPLE_IMAGE), "example.rbf")
        .expect("configuration should reach user mode");
    expect_that!(report.mode, eq(Mode::UserMode));
    expect_that!(report.configuration_done, eq(true));

    let device = manager.into_window();
    expect_that!(
        device.writes(),
        eq(&vec![
            BusWrite::ctrl(0x0201), // ctrl_en = 1
            BusWrite::ctrl(0x0205), // nconfigpull = 1
            BusWrite::ctrl(0x02c5), // cdratio = 3
            BusWrite::ctrl(0x02c1), // nconfigpull = 0
            BusWrite::ctrl(0x03c1), // axicfgen = 1
            BusWrite::data(0x0403_0201),
            BusWrite::data(0xddcc_bbaa),
            BusWrite::ctrl(0x02c1), // axicfgen = 0
            BusWrite::ctrl(0x02c0), // ctrl_en = 0
        ])
    );
    expect_that!(device.mode(), eq(Mode::UserMode));
}

#[gtest]
fn frozen_device_times_out_waiting_for_reset() {
    let mut manager = manager_for(default_device(Behaviour::Frozen), 25);
    let result = manager.run_configuration(&mut Cursor::new(EXAMPLE_IMAGE), "example.rbf");

    assert_that!(
        result,
        err(displays_as(contains_substring(
            "FpgaMgrError::ConfigurationTimedOut: Waited 25 polls for 'Reset Phase' but the FPGA stayed in 'Powered Off'"
        )))
    );
    let device = manager.into_window();
    expect_that!(
        device.writes(),
        eq(&vec![BusWrite::ctrl(0x0001), BusWrite::ctrl(0x0005)])
    );
}

#[gtest]
fn unconfigured_device_times_out_waiting_for_user_mode() {
    let mut manager = manager_for(default_device(Behaviour::NeverConfigures), 25);
    let result = manager.run_configuration(&mut Cursor::new(EXAMPLE_IMAGE), "example.rbf");

    assert_that!(
        result,
        err(displays_as(contains_substring(
            "for 'User Phase' but the FPGA stayed in 'Configuration Phase'"
        )))
    );
    let device = manager.into_window();
    // The image was streamed and nothing was rolled back.
    expect_that!(device.data_words().count(), eq(2));
    expect_that!(device.ctrl, eq(0x01c1));
}

#[gtest]
fn timeout_polls_exactly_the_budget() {
    let mut manager = manager_for(default_device(Behaviour::Frozen), 40);
    let result = manager.wait_for_mode(Mode::UserMode);

    assert_that!(result, err(anything()));
    expect_that!(manager.into_window().status_reads(), eq(40));
}

#[gtest]
fn msel_mismatch_aborts_before_any_write() {
    let device = SimulatedFpgaManager::new(0b00100, Behaviour::Responsive);
    let mut manager = manager_for(device, 10);
    let result = manager.run_configuration(&mut Cursor::new(EXAMPLE_IMAGE), "example.rbf");

    assert_that!(
        result,
        err(displays_as(contains_substring(
            "FpgaMgrError::MselMismatch: MSEL pins read 0x04 but the board is configured for 0x0a"
        )))
    );
    expect_that!(manager.into_window().writes().len(), eq(0));
}

#[gtest]
fn msel_check_can_be_disabled() {
    let device = SimulatedFpgaManager::new(0b00100, Behaviour::Responsive);
    let config = ManagerConfig {
        expected_msel: None,
        cdratio: 1,
        ..test_config(10)
    };
    let mut manager = FpgaManager::new(device, &config);
    let report = manager
        .run_configuration(&mut Cursor::new(EXAMPLE_IMAGE), "example.rbf")
        .expect("configuration should reach user mode");

    expect_that!(report.msel, eq(0b00100));
    expect_that!(report.cdratio, eq(1));
}

#[gtest]
fn rejected_tail_fails_the_run() {
    let config = ManagerConfig {
        tail_policy: fpgamgr::loader::TailPolicy::Reject,
        ..test_config(10)
    };
    let mut manager = FpgaManager::new(default_device(Behaviour::Responsive), &config);
    let result = manager.run_configuration(&mut Cursor::new([1u8, 2, 3, 4, 5]), "odd.rbf");

    assert_that!(
        result,
        err(displays_as(contains_substring("FpgaMgrError::MalformedImage:")))
    );
    expect_that!(manager.into_window().data_words().count(), eq(1));
}

#[gtest]
fn standalone_load_skips_the_sequence() {
    let mut manager = manager_for(default_device(Behaviour::Frozen), 10);
    let summary = manager
        .load_bitstream(&mut Cursor::new(EXAMPLE_IMAGE), "example.rbf")
        .expect("load should succeed");

    expect_that!(summary.words_written, eq(2));
    expect_that!(
        manager.into_window().writes(),
        eq(&vec![
            BusWrite::data(0x0403_0201),
            BusWrite::data(0xddcc_bbaa)
        ])
    );
}

#[gtest]
fn reset_writes_reset_mode() {
    let device = default_device(Behaviour::Frozen).with_mode(Mode::UserMode);
    let mut manager = manager_for(device, 10);
    manager.reset().expect("reset should succeed");

    expect_that!(manager.mode(), ok(eq(&Mode::Reset)));
    let device = manager.into_window();
    expect_that!(device.stat >> 3, eq(0b01010));
}

#[gtest]
fn power_off_then_on_follows_the_device() {
    let mut manager = manager_for(default_device(Behaviour::Responsive), 10);

    manager.power_off().expect("power off should succeed");
    expect_that!(manager.mode(), ok(eq(&Mode::Reset)));
    manager.power_on().expect("power on should succeed");
    expect_that!(manager.mode(), ok(eq(&Mode::Configuration)));
    expect_that!(manager.into_window().ctrl, eq(0x0000));
}

#[gtest]
#[rstest]
#[case::axicfgen(FpgaManager::set_axicfgen, 2)]
#[case::ctrl_en(FpgaManager::set_ctrl_en, 3)]
#[case::nconfigpull(FpgaManager::set_nconfigpull, 0x80)]
#[case::cdratio(FpgaManager::set_cdratio, 4)]
fn setters_reject_out_of_range_values(
    #[case] setter: Setter,
    #[case] value: u8,
) {
    let mut manager = manager_for(default_device(Behaviour::Responsive), 10);
    let result = setter(&mut manager, value);

    assert_that!(
        result,
        err(displays_as(contains_substring(
            "FpgaMgrError::InvalidFieldValue:"
        )))
    );
    expect_that!(manager.into_window().accesses.len(), eq(0));
}

#[gtest]
#[rstest]
#[case::axicfgen(FpgaManager::set_axicfgen, 0x0100)]
#[case::ctrl_en(FpgaManager::set_ctrl_en, 0x0001)]
#[case::nconfigpull(FpgaManager::set_nconfigpull, 0x0004)]
fn setters_write_their_bit(
    #[case] setter: Setter,
    #[case] expected_ctrl: u16,
) {
    let mut manager = manager_for(default_device(Behaviour::Frozen), 10);
    setter(&mut manager, 1).expect("setter should succeed");
    expect_that!(
        manager.into_window().writes(),
        eq(&vec![BusWrite::ctrl(expected_ctrl)])
    );
}
