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

//! TOML config file format.
//!
//! ```toml
//! [registers]
//! control_base = 0xff706000
//! control_span = 0x1000
//! data_base = 0xffb90000
//!
//! [board]
//! cdratio = 3
//! expected_msel = 0x0a
//! check_msel = true
//!
//! [polling]
//! max_attempts = 100000
//! initial_delay_us = 1
//! max_delay_us = 1000
//!
//! [image]
//! default_image = "fpga_config_file.rbf"
//! tail_policy = "zero-pad"
//! ```
//!
//! Every key is optional. Missing keys are taken from the lower priority file and finally
//! from the hardcoded defaults in [`crate::config`].

use crate::config::{ManagerConfig, RegisterAddresses};
use crate::error::FpgaMgrError;
use crate::loader::TailPolicy;
use crate::poll::PollPolicy;
use crate::registers::ControlField;
use crate::system_io::fs_read;
use log::trace;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MSEL_MAX: u8 = 0b11111;

/// This is the top level struct which holds all sections
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    registers: Option<RegistersToml>,
    board: Option<BoardToml>,
    polling: Option<PollingToml>,
    image: Option<ImageToml>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistersToml {
    control_base: Option<usize>,
    control_span: Option<usize>,
    data_base: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BoardToml {
    cdratio: Option<u8>,
    expected_msel: Option<u8>,
    check_msel: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PollingToml {
    max_attempts: Option<u32>,
    initial_delay_us: Option<u64>,
    max_delay_us: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ImageToml {
    default_image: Option<String>,
    tail_policy: Option<TailPolicy>,
}

/// `Some` sections are merged key by key, with `ours` winning.
fn merge_section<T>(ours: Option<T>, theirs: Option<T>, merge: fn(T, T) -> T) -> Option<T> {
    match (ours, theirs) {
        (Some(a), Some(b)) => Some(merge(a, b)),
        (a, b) => a.or(b),
    }
}

impl TomlConfig {
    /// Merge two configs, keeping values from `self` where both are set.
    pub fn merge(self, other: TomlConfig) -> TomlConfig {
        TomlConfig {
            registers: merge_section(self.registers, other.registers, |a, b| RegistersToml {
                control_base: a.control_base.or(b.control_base),
                control_span: a.control_span.or(b.control_span),
                data_base: a.data_base.or(b.data_base),
            }),
            board: merge_section(self.board, other.board, |a, b| BoardToml {
                cdratio: a.cdratio.or(b.cdratio),
                expected_msel: a.expected_msel.or(b.expected_msel),
                check_msel: a.check_msel.or(b.check_msel),
            }),
            polling: merge_section(self.polling, other.polling, |a, b| PollingToml {
                max_attempts: a.max_attempts.or(b.max_attempts),
                initial_delay_us: a.initial_delay_us.or(b.initial_delay_us),
                max_delay_us: a.max_delay_us.or(b.max_delay_us),
            }),
            image: merge_section(self.image, other.image, |a, b| ImageToml {
                default_image: a.default_image.or(b.default_image),
                tail_policy: a.tail_policy.or(b.tail_policy),
            }),
        }
    }

    /// Fill unset keys from the hardcoded defaults and validate the result.
    ///
    /// # Returns: `Result<ManagerConfig, FpgaMgrError>`
    /// * `Ok(ManagerConfig)` - Complete config
    /// * `Err(FpgaMgrError::InvalidFieldValue)` - `cdratio` or `expected_msel` out of range
    pub fn into_config(self) -> Result<ManagerConfig, FpgaMgrError> {
        let defaults = ManagerConfig::default();
        let registers = self.registers.unwrap_or_default();
        let board = self.board.unwrap_or_default();
        let polling = self.polling.unwrap_or_default();
        let image = self.image.unwrap_or_default();

        let cdratio = board.cdratio.unwrap_or_else(|| {
            trace!("No cdratio provided. Using hardcoded value.");
            defaults.cdratio
        });
        ControlField::CdRatio.validate(cdratio)?;

        let expected_msel = match board.check_msel {
            Some(false) => None,
            _ => board.expected_msel.or(defaults.expected_msel),
        };
        if let Some(msel) = expected_msel.filter(|msel| *msel > MSEL_MAX) {
            return Err(FpgaMgrError::InvalidFieldValue {
                field: "msel",
                value: msel,
                max: MSEL_MAX,
            });
        }

        Ok(ManagerConfig {
            registers: RegisterAddresses {
                control_base: registers
                    .control_base
                    .unwrap_or(defaults.registers.control_base),
                control_span: registers
                    .control_span
                    .unwrap_or(defaults.registers.control_span),
                data_base: registers.data_base.unwrap_or(defaults.registers.data_base),
            },
            cdratio,
            expected_msel,
            poll: PollPolicy {
                max_attempts: polling.max_attempts.unwrap_or(defaults.poll.max_attempts),
                initial_delay: polling
                    .initial_delay_us
                    .map(Duration::from_micros)
                    .unwrap_or(defaults.poll.initial_delay),
                max_delay: polling
                    .max_delay_us
                    .map(Duration::from_micros)
                    .unwrap_or(defaults.poll.max_delay),
            },
            default_image: image
                .default_image
                .map(PathBuf::from)
                .unwrap_or(defaults.default_image),
            tail_policy: image.tail_policy.unwrap_or(defaults.tail_policy),
        })
    }
}

/// Parse config text. `file` is only used for error reporting.
pub fn config_from_str(toml_string: &str, file: &Path) -> Result<TomlConfig, FpgaMgrError> {
    toml::from_str(toml_string).map_err(|e| FpgaMgrError::TomlDe {
        file: file.to_owned(),
        e,
    })
}

/// Read and parse a config file.
///
/// # Returns: `Result<TomlConfig, FpgaMgrError>`
/// * `Ok(TomlConfig)` - Parsed, possibly partial, config
/// * `Err(FpgaMgrError::IORead)` - File missing or unreadable
/// * `Err(FpgaMgrError::TomlDe)` - File is not valid config TOML
pub fn config_from_file(config_path: &Path) -> Result<TomlConfig, FpgaMgrError> {
    let toml_string = fs_read(config_path)?;
    config_from_str(&toml_string, config_path)
}

/// Load a single explicit config file on top of the hardcoded defaults.
pub fn manager_config_from_file(config_path: &Path) -> Result<ManagerConfig, FpgaMgrError> {
    config_from_file(config_path)?.into_config()
}
