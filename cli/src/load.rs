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

//! Load and config command implementation for the FPGA CLI.
//!
//! Both commands open a configuration image and hand it to the manager. `load` runs the
//! complete power-off to user mode routine, `config` only streams the image.
//!
//! Falling back to the board's default image when the requested one cannot be opened is
//! a policy of this CLI; the library never substitutes files on its own.

use fpgamgr::config::ManagerConfig;
use fpgamgr::error::FpgaMgrError;
use fpgamgr::manager::FpgaManager;
use fpgamgr::system_io::fs_open_image;
use fpgamgr::window::RegisterWindow;
use log::warn;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    /// Reset, configure, stream and wait for user mode.
    Full,
    /// Only stream the image into the data port.
    StreamOnly,
}

/// Open `requested`, or the configured default image if that fails or nothing was given.
fn open_image(
    requested: Option<&Path>,
    default_image: &Path,
) -> Result<(File, PathBuf), FpgaMgrError> {
    if let Some(path) = requested {
        match fs_open_image(path) {
            Ok(f) => return Ok((f, path.to_owned())),
            Err(e) => warn!("{e}. Try to load default {default_image:?}..."),
        }
    }
    let f = fs_open_image(default_image)?;
    Ok((f, default_image.to_owned()))
}

/// Argument parser for the load and config commands
pub fn load_handler<W: RegisterWindow>(
    manager: &mut FpgaManager<W>,
    config: &ManagerConfig,
    requested: Option<&Path>,
    kind: LoadKind,
) -> Result<String, FpgaMgrError> {
    let (mut image, path) = open_image(requested, &config.default_image)?;
    let name = path.display().to_string();
    match kind {
        LoadKind::Full => {
            let report = manager.run_configuration(&mut image, &name)?;
            Ok(format!("{name} loaded\n{report}"))
        }
        LoadKind::StreamOnly => {
            let summary = manager.load_bitstream(&mut image, &name)?;
            Ok(format!(
                "{name}: {} word(s) written ({} byte(s) read)",
                summary.words_written, summary.bytes_read
            ))
        }
    }
}
