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

//! Bitstream streaming into the FPGA manager data port.
//!
//! The image is consumed strictly in source order, four bytes at a time. Each block
//! `[b0, b1, b2, b3]` is packed little-endian, `b0 | b1 << 8 | b2 << 16 | b3 << 24`, and
//! written to the data port as a single word. The data port accepts writes as fast as they
//! are issued, so there is no flow control here.
//!
//! A 4n-byte image produces exactly n words. What happens to a final block of 1 to 3
//! bytes is decided by [`TailPolicy`].

use crate::error::FpgaMgrError;
use crate::registers::RegisterModel;
use crate::window::RegisterWindow;
use log::{debug, info, trace, warn};
use serde::Deserialize;
use std::io::{ErrorKind, Read};

const BLOCK_LEN: usize = 4;

/// Handling of an image whose length is not a multiple of four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TailPolicy {
    /// Zero-fill the missing high bytes of the last word and write it.
    #[default]
    ZeroPad,
    /// Write nothing for the tail and fail with [`FpgaMgrError::MalformedImage`].
    Reject,
}

/// What a completed load pushed into the data port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub words_written: u64,
    pub bytes_read: u64,
    /// Number of zero bytes appended to the final word.
    pub padding: usize,
}

/// Fill `block` from `image`, stopping early only at end-of-stream.
///
/// Returns the number of bytes placed in `block`; anything short of `block.len()` means
/// the image has ended.
fn read_block<R: Read>(
    image: &mut R,
    block: &mut [u8; BLOCK_LEN],
    source_name: &str,
) -> Result<usize, FpgaMgrError> {
    let mut filled = 0;
    while filled < BLOCK_LEN {
        match image.read(&mut block[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(FpgaMgrError::ImageSourceUnavailable {
                    source_name: source_name.to_owned(),
                    e,
                });
            }
        }
    }
    Ok(filled)
}

/// Stream a configuration image into the data port.
///
/// # Arguments
///
/// * `image` - Byte source positioned at the start of the image; only borrowed
/// * `source_name` - Name used in errors and logs (usually the image path)
/// * `registers` - Register model owning the window
/// * `tail` - Policy for a trailing partial block
///
/// # Returns: `Result<LoadSummary, FpgaMgrError>`
/// * `Ok(LoadSummary)` - Image fully written
/// * `Err(FpgaMgrError::ImageSourceUnavailable)` - Reading the image failed
/// * `Err(FpgaMgrError::MalformedImage)` - Trailing partial block under [`TailPolicy::Reject`]
/// * `Err(FpgaMgrError::RegisterAccessUnavailable)` - Data port write rejected
pub fn load<R: Read, W: RegisterWindow>(
    image: &mut R,
    source_name: &str,
    registers: &mut RegisterModel<W>,
    tail: TailPolicy,
) -> Result<LoadSummary, FpgaMgrError> {
    info!("Loading rbf file...");
    let mut summary = LoadSummary {
        words_written: 0,
        bytes_read: 0,
        padding: 0,
    };
    let mut block = [0u8; BLOCK_LEN];

    loop {
        // A fresh block each round: bytes from the previous word never leak into the tail.
        block.fill(0);
        let filled = read_block(image, &mut block, source_name)?;
        summary.bytes_read += filled as u64;

        if filled == 0 {
            break;
        }
        if filled < BLOCK_LEN {
            match tail {
                TailPolicy::ZeroPad => {
                    warn!(
                        "{source_name} ends with {filled} trailing byte(s); zero-padding the last word"
                    );
                    summary.padding = BLOCK_LEN - filled;
                }
                TailPolicy::Reject => {
                    return Err(FpgaMgrError::MalformedImage {
                        length: summary.bytes_read,
                        trailing: filled,
                    });
                }
            }
        }

        let word = u32::from_le_bytes(block);
        trace!("data <- {word:#010x}");
        registers.data_port_write(word)?;
        summary.words_written += 1;

        if filled < BLOCK_LEN {
            break;
        }
    }

    info!("EOF reached.");
    debug!(
        "Wrote {} word(s) from {} byte(s) of {source_name}",
        summary.words_written, summary.bytes_read
    );
    Ok(summary)
}
