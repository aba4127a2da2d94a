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

use crate::registers::Mode;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FpgaMgrError {
    /// The register window could not be established, or refused an access.
    #[error("FpgaMgrError::RegisterAccessUnavailable: {target}: {reason}")]
    RegisterAccessUnavailable { target: String, reason: String },
    #[error("FpgaMgrError::InvalidFieldValue: {value:#x} does not fit in {field} (max {max:#x})")]
    InvalidFieldValue {
        field: &'static str,
        value: u8,
        max: u8,
    },
    #[error(
        "FpgaMgrError::ImageSourceUnavailable: Failed to read configuration image {source_name}: {e}"
    )]
    ImageSourceUnavailable {
        source_name: String,
        e: std::io::Error,
    },
    #[error(
        "FpgaMgrError::MalformedImage: Image length {length} is not a multiple of 4 ({trailing} trailing bytes)"
    )]
    MalformedImage { length: u64, trailing: usize },
    #[error(
        "FpgaMgrError::ConfigurationTimedOut: Waited {attempts} polls for '{}' but the FPGA stayed in '{}'",
        expected.description(),
        observed.description()
    )]
    ConfigurationTimedOut {
        expected: Mode,
        observed: Mode,
        attempts: u32,
    },
    #[error(
        "FpgaMgrError::MselMismatch: MSEL pins read {observed:#04x} but the board is configured for {expected:#04x}"
    )]
    MselMismatch { expected: u8, observed: u8 },
    #[error("FpgaMgrError::IORead: An IO error occurred when reading from {file:?}: {e}")]
    IORead { file: PathBuf, e: std::io::Error },
    #[error("FpgaMgrError::TomlDe: Failed to parse {file:?}: {e}")]
    TomlDe {
        file: PathBuf,
        e: toml::de::Error,
    },
    #[error("FpgaMgrError::Argument: {0}")]
    Argument(String),
}
