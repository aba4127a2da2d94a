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

use crate::common::simulated_device::{Behaviour, SimulatedFpgaManager};
use fpgamgr::config::{DEFAULT_MSEL, ManagerConfig};
use fpgamgr::manager::FpgaManager;
use fpgamgr::poll::PollPolicy;

/// Config with the default board values and a sleep-free poll budget.
pub fn test_config(max_attempts: u32) -> ManagerConfig {
    ManagerConfig {
        poll: PollPolicy::immediate(max_attempts),
        ..ManagerConfig::default()
    }
}

/// A powered-off device strapped like the default board.
pub fn default_device(behaviour: Behaviour) -> SimulatedFpgaManager {
    SimulatedFpgaManager::new(DEFAULT_MSEL, behaviour)
}

pub fn manager_for(
    device: SimulatedFpgaManager,
    max_attempts: u32,
) -> FpgaManager<SimulatedFpgaManager> {
    FpgaManager::new(device, &test_config(max_attempts))
}

/// Little-endian packing written out by hand, independent of the loader.
pub fn packed(b0: u8, b1: u8, b2: u8, b3: u8) -> u32 {
    (b0 as u32) | ((b1 as u32) << 8) | ((b2 as u32) << 16) | ((b3 as u32) << 24)
}

/// Deterministic, non-repeating test image.
pub fn image_of_len(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + 3) as u8).collect()
}
