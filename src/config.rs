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

//! Board configuration.
//!
//! Hard-coded defaults describe a Cyclone V SoC with MSEL strapped to `0b01010`. They can
//! be overridden by a vendor config at [`VENDOR_CONFIG_PATH`], which is in turn overridden
//! by a user config at [`USER_CONFIG_PATH`]. See [`config_files`] for the file format.

pub mod config_files;

use crate::loader::TailPolicy;
use crate::poll::PollPolicy;
use log::{trace, warn};
use std::path::{Path, PathBuf};

pub static VENDOR_CONFIG_PATH: &str = "/usr/lib/fpgamgr/config.toml";
pub static USER_CONFIG_PATH: &str = "/etc/fpgamgr/config.toml";

/// Physical address of the FPGA manager status register.
pub const FPGA_MANAGER_BASE: usize = 0xff70_6000;
/// Bytes mapped from [`FPGA_MANAGER_BASE`]; covers the configuration monitor registers.
pub const FPGA_MANAGER_SPAN: usize = 0x1000;
/// Physical address of the FPGA manager data port.
pub const FPGA_MANAGER_DATA_BASE: usize = 0xffb9_0000;

/// Clock to data ratio implied by MSEL[4..0] = 01010.
pub const DEFAULT_CDRATIO: u8 = 0x3;
/// MSEL strapping the default ratio belongs to.
pub const DEFAULT_MSEL: u8 = 0b01010;

pub static DEFAULT_IMAGE: &str = "fpga_config_file.rbf";

/// Where the FPGA manager lives in physical memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterAddresses {
    pub control_base: usize,
    pub control_span: usize,
    pub data_base: usize,
}

impl Default for RegisterAddresses {
    fn default() -> Self {
        RegisterAddresses {
            control_base: FPGA_MANAGER_BASE,
            control_span: FPGA_MANAGER_SPAN,
            data_base: FPGA_MANAGER_DATA_BASE,
        }
    }
}

/// Everything the manager and CLI need to know about the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    pub registers: RegisterAddresses,
    /// Ratio written to `ctrl.cdratio` during a configuration run.
    pub cdratio: u8,
    /// MSEL strapping that `cdratio` is valid for; `None` skips the check.
    pub expected_msel: Option<u8>,
    pub poll: PollPolicy,
    /// Image used when the requested one cannot be opened.
    pub default_image: PathBuf,
    pub tail_policy: TailPolicy,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            registers: RegisterAddresses::default(),
            cdratio: DEFAULT_CDRATIO,
            expected_msel: Some(DEFAULT_MSEL),
            poll: PollPolicy::default(),
            default_image: PathBuf::from(DEFAULT_IMAGE),
            tail_policy: TailPolicy::default(),
        }
    }
}

/// User config overrides vendor config and vendor config overrides hardcoded defaults.
///
/// A missing or broken file is logged and skipped, never fatal.
pub fn system_config() -> ManagerConfig {
    let vendor_config = config_files::config_from_file(Path::new(VENDOR_CONFIG_PATH))
        .unwrap_or_else(|e| {
            warn!("Using hardcoded values for vendor config because loading config failed: {e}");
            config_files::TomlConfig::default()
        });
    let user_config = config_files::config_from_file(Path::new(USER_CONFIG_PATH))
        .unwrap_or_else(|e| {
            warn!("Using hardcoded values for user config because loading config failed: {e}");
            config_files::TomlConfig::default()
        });
    trace!("Merging user_config: {user_config:?} with vendor_config {vendor_config:?}");
    let merged = user_config.merge(vendor_config);
    match merged.into_config() {
        Ok(config) => {
            trace!("Resulting config: {config:?}");
            config
        }
        Err(e) => {
            warn!("Using hardcoded defaults because the merged config is invalid: {e}");
            ManagerConfig::default()
        }
    }
}
