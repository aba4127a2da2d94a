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

//! Error Wrapping File System I/O Helpers
//!
//! Thin wrappers around the few file operations the loader needs, with trace logging and
//! conversion to [`FpgaMgrError`] carrying the path involved.
//!
//! Includes: reading config files, opening configuration images and opening `/dev/mem`.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use fpgamgr::system_io::{fs_read, fs_open_image};
//! # use std::path::Path;
//! # fn example() -> Result<(), fpgamgr::error::FpgaMgrError> {
//! let config = fs_read(Path::new("/etc/fpgamgr/config.toml"))?;
//! let image = fs_open_image(Path::new("fpga_config_file.rbf"))?;
//! # Ok(())
//! # }
//! ```

use crate::error::FpgaMgrError;
use log::trace;
use std::fs::{File, OpenOptions};
use std::io::Read;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

/// Location of the physical memory device.
pub static DEV_MEM_PATH: &str = "/dev/mem";

/// Read the contents of a file to a String.
///
/// # Arguments
///
/// * `file_path` - Path to the file to read
///
/// # Returns: `Result<String, FpgaMgrError>`
/// * `Ok(String)` - The complete contents of the file
/// * `Err(FpgaMgrError::IORead)` - If the file cannot be read
pub fn fs_read(file_path: &Path) -> Result<String, FpgaMgrError> {
    trace!("Attempting to read from {file_path:?}");
    let mut buf: String = String::new();
    let result = OpenOptions::new()
        .read(true)
        .open(file_path)
        .and_then(|mut f| f.read_to_string(&mut buf));

    match result {
        Ok(_) => {
            trace!("Reading done");
            Ok(buf)
        }
        Err(e) => Err(FpgaMgrError::IORead {
            file: file_path.into(),
            e,
        }),
    }
}

/// Open a configuration image for streaming.
///
/// The image is opened read-only with `O_SYNC` so reads are not served from a stale
/// page cache while the image is being replaced on disk.
///
/// # Arguments
///
/// * `image_path` - Path to the raw binary (`.rbf`) image
///
/// # Returns: `Result<File, FpgaMgrError>`
/// * `Ok(File)` - Handle positioned at the first byte of the image
/// * `Err(FpgaMgrError::ImageSourceUnavailable)` - The image cannot be opened
pub fn fs_open_image(image_path: &Path) -> Result<File, FpgaMgrError> {
    trace!("Attempting to open image {image_path:?}");
    OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_SYNC)
        .open(image_path)
        .map_err(|e| FpgaMgrError::ImageSourceUnavailable {
            source_name: image_path.display().to_string(),
            e,
        })
}

/// Open a physical memory device such as [`DEV_MEM_PATH`] for read/write access with
/// `O_SYNC`, as required for uncached device mappings.
///
/// # Returns: `Result<File, FpgaMgrError>`
/// * `Ok(File)` - Open handle to the memory device
/// * `Err(FpgaMgrError::RegisterAccessUnavailable)` - Missing device or insufficient privileges
pub fn fs_open_dev_mem(device: &Path) -> Result<File, FpgaMgrError> {
    trace!("Attempting to open {device:?}");
    let result = OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_SYNC)
        .open(device);
    match result {
        Ok(f) => {
            trace!("{device:?} opened");
            Ok(f)
        }
        Err(e) => Err(FpgaMgrError::RegisterAccessUnavailable {
            target: format!("{device:?}"),
            reason: e.to_string(),
        }),
    }
}
