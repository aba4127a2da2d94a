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

//! `/dev/mem` backed register window.
//!
//! Maps the FPGA manager's control/status range and its data port from physical memory
//! with `mmap(2)` and performs volatile accesses through the mapping. Both mappings and
//! the `/dev/mem` file descriptor are released when the window is dropped, so every exit
//! path, including an error half way through a configuration run, unmaps the hardware.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use fpgamgr::window::devmem::DevMemWindow;
//! # fn example() -> Result<(), fpgamgr::error::FpgaMgrError> {
//! let window = DevMemWindow::open(0xff70_6000, 0x1000, 0xffb9_0000)?;
//! # Ok(())
//! # }
//! ```

use crate::error::FpgaMgrError;
use crate::registers::GPIO_INTSTATUS_OFFSET;
use crate::system_io::{DEV_MEM_PATH, fs_open_dev_mem};
use crate::window::{Region, RegisterWindow, check_access};
use log::trace;
use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::ptr::NonNull;

/// The data port is a single 32-bit register.
const DATA_PORT_SPAN: usize = 4;

/// One physical range mapped into the process.
#[derive(Debug)]
struct Mapping {
    ptr: NonNull<u8>,
    map_base: NonNull<libc::c_void>,
    map_len: usize,
    span: usize,
}

impl Mapping {
    fn new(
        file: &File,
        region: Region,
        base: usize,
        span: usize,
    ) -> Result<Mapping, FpgaMgrError> {
        // SAFETY: sysconf has no preconditions.
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
        let page_offset = base % page_size;
        let map_len = span + page_offset;
        trace!("Mapping {region} at {base:#x} ({span:#x} bytes)");

        // SAFETY: a fresh shared mapping is requested; the kernel validates fd and offset.
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                map_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                (base - page_offset) as libc::off_t,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(FpgaMgrError::RegisterAccessUnavailable {
                target: format!("{region} at {base:#x}"),
                reason: std::io::Error::last_os_error().to_string(),
            });
        }
        let map_base = NonNull::new(ptr).ok_or_else(|| FpgaMgrError::RegisterAccessUnavailable {
            target: format!("{region} at {base:#x}"),
            reason: "mmap returned a null mapping".to_string(),
        })?;
        // SAFETY: page_offset < page_size <= map_len, so the result stays inside the mapping.
        let ptr = unsafe { NonNull::new_unchecked((ptr as *mut u8).add(page_offset)) };
        Ok(Mapping {
            ptr,
            map_base,
            map_len,
            span,
        })
    }

    /// # Safety
    /// `offset` must have been validated with [`check_access`] for `size_of::<T>()`.
    unsafe fn read<T: Copy>(&self, offset: usize) -> T {
        unsafe { std::ptr::read_volatile(self.ptr.as_ptr().add(offset) as *const T) }
    }

    /// # Safety
    /// `offset` must have been validated with [`check_access`] for `size_of::<T>()`.
    unsafe fn write<T: Copy>(&self, offset: usize, value: T) {
        unsafe { std::ptr::write_volatile(self.ptr.as_ptr().add(offset) as *mut T, value) }
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // SAFETY: map_base/map_len are exactly what mmap returned and nothing borrows them.
        unsafe {
            libc::munmap(self.map_base.as_ptr(), self.map_len);
        }
    }
}

/// Register window over the FPGA manager's physical address ranges.
#[derive(Debug)]
pub struct DevMemWindow {
    control: Mapping,
    data: Mapping,
    // Keeps /dev/mem open for as long as the mappings live.
    _dev_mem: File,
}

impl DevMemWindow {
    /// Open [`DEV_MEM_PATH`] and map both FPGA manager ranges.
    pub fn open(
        control_base: usize,
        control_span: usize,
        data_base: usize,
    ) -> Result<DevMemWindow, FpgaMgrError> {
        DevMemWindow::open_device(
            Path::new(DEV_MEM_PATH),
            control_base,
            control_span,
            data_base,
        )
    }

    /// Open `device` and map both FPGA manager ranges from it.
    ///
    /// # Arguments
    ///
    /// * `device` - Physical memory device, normally [`DEV_MEM_PATH`]
    /// * `control_base` - Physical address of the status register
    /// * `control_span` - Bytes to map from `control_base`; must cover the GPIO registers
    /// * `data_base` - Physical address of the configuration data port
    ///
    /// # Returns: `Result<DevMemWindow, FpgaMgrError>`
    /// * `Ok(DevMemWindow)` - Both ranges mapped
    /// * `Err(FpgaMgrError::Argument)` - `control_span` stops short of `gpio_intstatus`
    /// * `Err(FpgaMgrError::RegisterAccessUnavailable)` - `device` could not be opened or a
    ///   range could not be mapped
    pub fn open_device(
        device: &Path,
        control_base: usize,
        control_span: usize,
        data_base: usize,
    ) -> Result<DevMemWindow, FpgaMgrError> {
        let required = GPIO_INTSTATUS_OFFSET + size_of::<u16>();
        if control_span < required {
            return Err(FpgaMgrError::Argument(format!(
                "Control span {control_span:#x} does not reach gpio_intstatus, need at least {required:#x}"
            )));
        }
        let dev_mem = fs_open_dev_mem(device)?;
        let control = Mapping::new(&dev_mem, Region::ControlStatus, control_base, control_span)?;
        let data = Mapping::new(&dev_mem, Region::Data, data_base, DATA_PORT_SPAN)?;
        Ok(DevMemWindow {
            control,
            data,
            _dev_mem: dev_mem,
        })
    }

    fn mapping(&self, region: Region) -> &Mapping {
        match region {
            Region::ControlStatus => &self.control,
            Region::Data => &self.data,
        }
    }

    fn read<T: Copy>(&self, region: Region, offset: usize) -> Result<T, FpgaMgrError> {
        let mapping = self.mapping(region);
        check_access(region, offset, size_of::<T>(), mapping.span)?;
        // SAFETY: validated above.
        Ok(unsafe { mapping.read(offset) })
    }

    fn write<T: Copy>(&self, region: Region, offset: usize, value: T) -> Result<(), FpgaMgrError> {
        let mapping = self.mapping(region);
        check_access(region, offset, size_of::<T>(), mapping.span)?;
        // SAFETY: validated above.
        unsafe { mapping.write(offset, value) };
        Ok(())
    }
}

impl RegisterWindow for DevMemWindow {
    fn read_u8(&mut self, region: Region, offset: usize) -> Result<u8, FpgaMgrError> {
        self.read(region, offset)
    }

    fn read_u16(&mut self, region: Region, offset: usize) -> Result<u16, FpgaMgrError> {
        self.read(region, offset)
    }

    fn read_u32(&mut self, region: Region, offset: usize) -> Result<u32, FpgaMgrError> {
        self.read(region, offset)
    }

    fn write_u8(&mut self, region: Region, offset: usize, value: u8) -> Result<(), FpgaMgrError> {
        self.write(region, offset, value)
    }

    fn write_u16(
        &mut self,
        region: Region,
        offset: usize,
        value: u16,
    ) -> Result<(), FpgaMgrError> {
        self.write(region, offset, value)
    }

    fn write_u32(
        &mut self,
        region: Region,
        offset: usize,
        value: u32,
    ) -> Result<(), FpgaMgrError> {
        self.write(region, offset, value)
    }
}
