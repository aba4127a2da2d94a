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

//! FPGA configuration state machine.
//!
//! [`FpgaManager`] owns the register window for its whole lifetime and drives the FPGA
//! from power-off to user mode:
//!
//! ```text
//! ctrl_en = 1 -> nconfigpull = 1 -> wait Reset
//!             -> cdratio = <board> -> nconfigpull = 0 -> wait Configuration
//!             -> axicfgen = 1 -> stream image -> wait UserMode
//!             -> axicfgen = 0 -> ctrl_en = 0
//! ```
//!
//! The hardware is the only source of truth: no state is cached here and every wait
//! re-reads the status register through [`wait_until`]. Waits are bounded by the
//! configured [`PollPolicy`]; a device that never reaches the expected mode produces
//! [`FpgaMgrError::ConfigurationTimedOut`].
//!
//! If a run fails part way, registers are left as they are. In particular `ctrl_en` and
//! `axicfgen` may still be asserted, and the caller decides how to recover.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use fpgamgr::config::ManagerConfig;
//! # use fpgamgr::manager::FpgaManager;
//! # use fpgamgr::system_io::fs_open_image;
//! # use fpgamgr::window::devmem::DevMemWindow;
//! # use std::path::Path;
//! # fn example() -> Result<(), fpgamgr::error::FpgaMgrError> {
//! let config = ManagerConfig::default();
//! let window = DevMemWindow::open(
//!     config.registers.control_base,
//!     config.registers.control_span,
//!     config.registers.data_base,
//! )?;
//! let mut manager = FpgaManager::new(window, &config);
//! let mut image = fs_open_image(Path::new("soc_system.rbf"))?;
//! manager.run_configuration(&mut image, "soc_system.rbf")?;
//! # Ok(())
//! # }
//! ```

use crate::config::ManagerConfig;
use crate::error::FpgaMgrError;
use crate::loader::{self, LoadSummary, TailPolicy};
use crate::poll::{PollOutcome, PollPolicy, wait_until};
use crate::registers::{ControlField, Mode, RegisterModel};
use crate::status::StatusReport;
use crate::window::RegisterWindow;
use log::{debug, info};
use std::io::Read;

/// Drives one FPGA manager through configuration.
#[derive(Debug)]
pub struct FpgaManager<W> {
    registers: RegisterModel<W>,
    cdratio: u8,
    expected_msel: Option<u8>,
    poll: PollPolicy,
    tail_policy: TailPolicy,
}

impl<W: RegisterWindow> FpgaManager<W> {
    /// Take ownership of `window` and apply the board settings from `config`.
    pub fn new(window: W, config: &ManagerConfig) -> FpgaManager<W> {
        FpgaManager {
            registers: RegisterModel::new(window),
            cdratio: config.cdratio,
            expected_msel: config.expected_msel,
            poll: config.poll,
            tail_policy: config.tail_policy,
        }
    }

    /// Release the window.
    pub fn into_window(self) -> W {
        self.registers.into_inner()
    }

    /// Direct register access for callers that need fields not wrapped here.
    pub fn registers(&mut self) -> &mut RegisterModel<W> {
        &mut self.registers
    }

    /// Current mode as reported by the hardware.
    pub fn mode(&mut self) -> Result<Mode, FpgaMgrError> {
        Ok(self.registers.read_status()?.mode())
    }

    /// Snapshot of every status and control field. Never writes.
    pub fn report_status(&mut self) -> Result<StatusReport, FpgaMgrError> {
        StatusReport::capture(&mut self.registers)
    }

    /// Set the clock to data ratio. Must agree with the MSEL strapping of the board.
    pub fn set_cdratio(&mut self, value: u8) -> Result<(), FpgaMgrError> {
        self.registers
            .write_control_field(ControlField::CdRatio, value)?;
        info!("Setting cdratio with {value:#x}.");
        Ok(())
    }

    /// Enable (1) or disable (0) AXI configuration data transfers.
    pub fn set_axicfgen(&mut self, value: u8) -> Result<(), FpgaMgrError> {
        self.registers
            .write_control_field(ControlField::AxiCfgEn, value)?;
        debug!("axicfgen set to {value}");
        Ok(())
    }

    /// Give the configuration port to the HPS (1) or back to the pins/JTAG (0).
    pub fn set_ctrl_en(&mut self, value: u8) -> Result<(), FpgaMgrError> {
        self.registers
            .write_control_field(ControlField::CtrlEn, value)?;
        debug!("ctrl_en set to {value}");
        Ok(())
    }

    /// Hold (1) or release (0) the FPGA reset.
    pub fn set_nconfigpull(&mut self, value: u8) -> Result<(), FpgaMgrError> {
        self.registers
            .write_control_field(ControlField::NConfigPull, value)?;
        debug!("nconfigpull set to {value}");
        Ok(())
    }

    /// Force the mode bits to the reset phase.
    pub fn reset(&mut self) -> Result<(), FpgaMgrError> {
        self.registers.write_status_mode(Mode::Reset)?;
        info!("Resetting FPGA.");
        Ok(())
    }

    pub fn power_off(&mut self) -> Result<(), FpgaMgrError> {
        self.set_nconfigpull(1)?;
        info!("Turning FPGA Off.");
        Ok(())
    }

    pub fn power_on(&mut self) -> Result<(), FpgaMgrError> {
        self.set_nconfigpull(0)?;
        info!("Turning FPGA On.");
        Ok(())
    }

    /// Stream `image` into the data port without any of the surrounding sequence.
    pub fn load_bitstream<R: Read>(
        &mut self,
        image: &mut R,
        source_name: &str,
    ) -> Result<LoadSummary, FpgaMgrError> {
        loader::load(image, source_name, &mut self.registers, self.tail_policy)
    }

    /// Poll the status register until it reports `expected`.
    ///
    /// # Returns: `Result<u32, FpgaMgrError>`
    /// * `Ok(u32)` - Number of status reads it took
    /// * `Err(FpgaMgrError::ConfigurationTimedOut)` - Poll budget exhausted
    pub fn wait_for_mode(&mut self, expected: Mode) -> Result<u32, FpgaMgrError> {
        debug!("Waiting for '{expected}'");
        let mut observed = Mode::Undetermined(0);
        let registers = &mut self.registers;
        let outcome = wait_until(&self.poll, || {
            observed = registers.read_status()?.mode();
            Ok(observed == expected)
        })?;
        match outcome {
            PollOutcome::Satisfied { attempts } => {
                debug!("FPGA reached '{expected}' after {attempts} poll(s)");
                Ok(attempts)
            }
            PollOutcome::Exhausted { attempts } => Err(FpgaMgrError::ConfigurationTimedOut {
                expected,
                observed,
                attempts,
            }),
        }
    }

    fn check_msel(&mut self) -> Result<(), FpgaMgrError> {
        let Some(expected) = self.expected_msel else {
            return Ok(());
        };
        let observed = self.registers.read_status()?.msel();
        if observed != expected {
            return Err(FpgaMgrError::MselMismatch { expected, observed });
        }
        Ok(())
    }

    /// Run the complete power-off to user mode sequence with `image` as the bitstream.
    ///
    /// # Arguments
    ///
    /// * `image` - The configuration image, positioned at its first byte
    /// * `source_name` - Name of the image for logs and errors
    ///
    /// # Returns: `Result<StatusReport, FpgaMgrError>`
    /// * `Ok(StatusReport)` - Final status; the FPGA is in user mode
    /// * `Err(FpgaMgrError::MselMismatch)` - Board strapping differs from the config; nothing written
    /// * `Err(FpgaMgrError::ConfigurationTimedOut)` - A phase was never reached
    /// * `Err(FpgaMgrError::ImageSourceUnavailable)` - The image could not be read
    /// * `Err(FpgaMgrError::MalformedImage)` - Rejected by [`TailPolicy::Reject`]
    pub fn run_configuration<R: Read>(
        &mut self,
        image: &mut R,
        source_name: &str,
    ) -> Result<StatusReport, FpgaMgrError> {
        let initial = self.report_status()?;
        info!("Status before configuration:\n{initial}");
        self.check_msel()?;

        self.set_ctrl_en(1)?;
        self.power_off()?;
        self.wait_for_mode(Mode::Reset)?;

        self.set_cdratio(self.cdratio)?;
        self.power_on()?;
        self.wait_for_mode(Mode::Configuration)?;

        self.set_axicfgen(1)?;
        let summary = self.load_bitstream(image, source_name)?;
        info!(
            "{source_name}: {} word(s) written to the FPGA manager",
            summary.words_written
        );
        self.wait_for_mode(Mode::UserMode)?;

        self.set_axicfgen(0)?;
        self.set_ctrl_en(0)?;

        let report = self.report_status()?;
        info!("Status after configuration:\n{report}");
        Ok(report)
    }
}
