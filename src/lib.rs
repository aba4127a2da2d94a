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

//! fpgamgr - bring up an FPGA through the SoC FPGA manager.
//!
//! The FPGA manager of an SoC FPGA (for example the Cyclone V HPS) exposes a status
//! register, a control register, a configuration monitor and a write-only data port. This
//! crate drives those registers to take the FPGA from power-off, through reset and
//! configuration, into user mode, streaming a raw binary bitstream (`.rbf`) into the data
//! port on the way.
//!
//! # Layers
//!
//! - [`window`] - [`RegisterWindow`](window::RegisterWindow) trait over the two physical
//!   ranges, with a `/dev/mem` implementation in [`window::devmem`]
//! - [`registers`] - typed fields and read-modify-write discipline
//! - [`poll`] - bounded wait used by every phase change
//! - [`loader`] - bitstream packing and streaming
//! - [`manager`] - the configuration state machine and manual controls
//! - [`status`] - human readable snapshot
//! - [`config`] - board constants from TOML files
//!
//! # Environment Variables
//!
//! The crate logs through the `log` facade. Binaries built on it (such as `fpgamgr`)
//! honour `RUST_LOG` (`trace`, `debug`, `info`, `warn`, `error` or `off`).

pub mod config;
pub mod error;
pub mod loader;
pub mod manager;
pub mod poll;
pub mod registers;
pub mod status;
pub mod system_io;
pub mod window;
