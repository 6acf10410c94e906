// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! [`I2cBus`] on top of Linux `i2c-dev`.
//!
//! Each transaction selects the target address with `I2C_SLAVE` and then
//! issues a single `I2C_SMBUS` ioctl, all while holding the lock on the
//! device file, so a `LinuxI2cBus` can be shared freely between threads.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::libc;
use parking_lot::Mutex;

use crate::{check_address, Functionality, I2cBus, PortIndex, ResponseCode};

mod ioctl {
    use nix::libc;

    const I2C_SLAVE: u16 = 0x0703;
    const I2C_FUNCS: u16 = 0x0705;
    const I2C_SMBUS: u16 = 0x0720;

    pub const I2C_SMBUS_READ: u8 = 1;
    pub const I2C_SMBUS_BYTE_DATA: u32 = 2;
    pub const I2C_SMBUS_I2C_BLOCK_DATA: u32 = 8;

    /// Largest payload a single SMBus block transfer can carry.
    pub const I2C_SMBUS_BLOCK_MAX: usize = 32;

    #[repr(C)]
    pub union I2cSmbusData {
        pub byte: u8,
        pub word: u16,
        // One length byte, up to 32 data bytes, one spare for PEC.
        pub block: [u8; I2C_SMBUS_BLOCK_MAX + 2],
    }

    #[repr(C)]
    pub struct I2cSmbusIoctlData {
        pub read_write: u8,
        pub command: u8,
        pub size: u32,
        pub data: *mut I2cSmbusData,
    }

    nix::ioctl_write_int_bad!(i2c_slave, I2C_SLAVE);
    nix::ioctl_read_bad!(i2c_funcs, I2C_FUNCS, libc::c_ulong);
    nix::ioctl_write_ptr_bad!(i2c_smbus, I2C_SMBUS, I2cSmbusIoctlData);
}

use ioctl::*;

pub use ioctl::I2C_SMBUS_BLOCK_MAX;

/// Maps the errno an `i2c-dev` ioctl failed with onto a [`ResponseCode`].
pub fn response_code(errno: Errno) -> ResponseCode {
    match errno {
        Errno::ENXIO | Errno::EREMOTEIO => ResponseCode::NoDevice,
        Errno::EAGAIN | Errno::EBUSY => ResponseCode::ControllerBusy,
        Errno::ETIMEDOUT => ResponseCode::BusLocked,
        Errno::EOPNOTSUPP => ResponseCode::OperationNotSupported,
        Errno::EINVAL => ResponseCode::BadArg,
        Errno::EPROTO | Errno::EBADMSG => ResponseCode::BadResponse,
        _ => ResponseCode::BusError,
    }
}

pub struct LinuxI2cBus {
    port: PortIndex,
    path: PathBuf,
    funcs: Functionality,
    file: Mutex<File>,
}

impl LinuxI2cBus {
    /// Opens `/dev/i2c-{port}`.
    pub fn open(port: u8) -> io::Result<Self> {
        Self::open_path(PortIndex(port), format!("/dev/i2c-{port}"))
    }

    /// Opens an `i2c-dev` node at an explicit path, reporting it as `port`.
    pub fn open_path(
        port: PortIndex,
        path: impl AsRef<Path>,
    ) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().read(true).write(true).open(&path)?;

        let mut raw: libc::c_ulong = 0;
        // Safety: I2C_FUNCS writes a single unsigned long through the
        // pointer, which refers to a live local.
        unsafe { i2c_funcs(file.as_raw_fd(), &mut raw) }
            .map_err(io::Error::from)?;

        Ok(Self {
            port,
            path,
            funcs: Functionality::from_bits_retain(raw as u32),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn smbus_read(
        &self,
        address: u8,
        command: u8,
        size: u32,
        data: &mut I2cSmbusData,
    ) -> Result<(), ResponseCode> {
        check_address(address)?;

        let file = self.file.lock();
        let fd = file.as_raw_fd();

        // Safety: I2C_SLAVE takes its argument by value.
        unsafe { i2c_slave(fd, libc::c_int::from(address)) }
            .map_err(response_code)?;

        let args = I2cSmbusIoctlData {
            read_write: I2C_SMBUS_READ,
            command,
            size,
            data,
        };

        // Safety: `args` and the union it points at both outlive the call,
        // and the union is large enough for any SMBus transfer.
        unsafe { i2c_smbus(fd, &args) }.map_err(response_code)?;
        Ok(())
    }
}

impl I2cBus for LinuxI2cBus {
    fn port(&self) -> PortIndex {
        self.port
    }

    fn functionality(&self) -> Functionality {
        self.funcs
    }

    fn read_byte_data(&self, address: u8, reg: u8) -> Result<u8, ResponseCode> {
        let mut data = I2cSmbusData { word: 0 };
        self.smbus_read(address, reg, I2C_SMBUS_BYTE_DATA, &mut data)?;

        // Safety: every bit pattern is a valid u8.
        Ok(unsafe { data.byte })
    }

    fn read_i2c_block_data(
        &self,
        address: u8,
        cmd: u8,
        buf: &mut [u8],
    ) -> Result<usize, ResponseCode> {
        if buf.is_empty() || buf.len() > I2C_SMBUS_BLOCK_MAX {
            return Err(ResponseCode::BadArg);
        }

        let mut data = I2cSmbusData {
            block: [0; I2C_SMBUS_BLOCK_MAX + 2],
        };

        // The kernel takes the requested length from the first block byte
        // and writes the transferred length back into it.
        //
        // Safety: we only ever use the `block` member from here on.
        let block = unsafe { &mut data.block };
        block[0] = buf.len() as u8;

        self.smbus_read(address, cmd, I2C_SMBUS_I2C_BLOCK_DATA, &mut data)?;

        // Safety: as above.
        let block = unsafe { &data.block };
        let count = usize::from(block[0]).min(buf.len());
        buf[..count].copy_from_slice(&block[1..=count]);
        Ok(count)
    }
}
