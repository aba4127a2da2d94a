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

//! fpgamgr - command-line FPGA firmware loader.
//!
//! Opens the FPGA manager registers through `/dev/mem` and runs one operation per
//! invocation:
//!
//! ```text
//! fpgamgr status              print FPGA status registers
//! fpgamgr load [IMAGE]        full configuration: reset, configure, stream IMAGE, user mode
//! fpgamgr config [IMAGE]      only stream IMAGE into the data port
//! fpgamgr cdr                 set cdratio to the board's configured ratio
//! fpgamgr reset               put the FPGA into its reset phase
//! fpgamgr off | on            assert / release nconfigpull
//! fpgamgr axicf <0|1>         set axicfgen
//! fpgamgr ctrl-en <0|1>       set ctrl.en
//! fpgamgr nconfigpull <0|1>   set nconfigpull
//! ```
//!
//! When IMAGE is missing or cannot be opened, the configured default image is used.
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (`trace`, `debug`, `info`, `warn`, `error`
//!   or `off`). Defaults to `info`

mod load;
mod set;
mod status;

use crate::load::{LoadKind, load_handler};
use crate::set::{Switch, cdr_handler, field_handler, power_handler, reset_handler};
use crate::status::status_handler;
use clap::{Parser, Subcommand};
use fpgamgr::config::{self, ManagerConfig, config_files::manager_config_from_file};
use fpgamgr::error::FpgaMgrError;
use fpgamgr::manager::FpgaManager;
use fpgamgr::window::devmem::DevMemWindow;
use log::{debug, error};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fpgamgr")]
#[command(bin_name = "fpgamgr")]
#[command(about = "FPGA firmware loader")]
struct Cli {
    #[arg(
        long = "config",
        help = r#"TOML config file describing the board.
When omitted, /etc/fpgamgr/config.toml overrides /usr/lib/fpgamgr/config.toml,
which overrides the built-in Cyclone V defaults.
        "#
    )]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print FPGA status registers
    Status,
    /// Run the complete configuration routine with status messages
    Load { image: Option<PathBuf> },
    /// Stream an image into the FPGA manager data port
    Config { image: Option<PathBuf> },
    /// Set cdratio to the ratio configured for the board
    Cdr,
    /// Reset the FPGA
    Reset,
    /// Power off the FPGA
    Off,
    /// Power on the FPGA
    On,
    /// Set axicfgen
    Axicf { value: u8 },
    /// Set ctrl.en
    #[command(alias = "ctrl_en")]
    CtrlEn { value: u8 },
    /// Set nconfigpull
    Nconfigpull { value: u8 },
}

fn run(cli: Cli, config: &ManagerConfig) -> Result<String, FpgaMgrError> {
    let window = DevMemWindow::open(
        config.registers.control_base,
        config.registers.control_span,
        config.registers.data_base,
    )?;
    let mut manager = FpgaManager::new(window, config);

    match cli.command {
        Commands::Status => status_handler(&mut manager),
        Commands::Load { image } => {
            load_handler(&mut manager, config, image.as_deref(), LoadKind::Full)
        }
        Commands::Config { image } => {
            load_handler(&mut manager, config, image.as_deref(), LoadKind::StreamOnly)
        }
        Commands::Cdr => cdr_handler(&mut manager, config),
        Commands::Reset => reset_handler(&mut manager),
        Commands::Off => power_handler(&mut manager, false),
        Commands::On => power_handler(&mut manager, true),
        Commands::Axicf { value } => field_handler(&mut manager, Switch::AxiCfgEn, value),
        Commands::CtrlEn { value } => field_handler(&mut manager, Switch::CtrlEn, value),
        Commands::Nconfigpull { value } => field_handler(&mut manager, Switch::NConfigPull, value),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    debug!("parsed cli command with {cli:?}");

    let config = match &cli.config {
        Some(path) => manager_config_from_file(path)?,
        None => config::system_config(),
    };
    debug!("using {config:?}");

    match run(cli, &config) {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(e) => {
            error!("{e}");
            Err(e.into())
        }
    }
}
