// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client API for I2C buses
//!
//! This API allows for access to I2C devices.  The actual bus communication
//! happens behind the [`I2cBus`] trait; drivers hold an [`I2cDevice`], which
//! pairs a bus with the 7-bit address of one device on it, and issue SMBus
//! style transactions through it.
//!
//! # I2C devices
//!
//! An I2C device is uniquely identified by a 2-tuple:
//!
//! - The port (bus) the device hangs off of
//! - The address of the device itself
//!
//! On Linux, [`linux::LinuxI2cBus`] implements [`I2cBus`] on top of the
//! kernel's `i2c-dev` character devices.

use core::fmt;

use bitflags::bitflags;

#[cfg(target_os = "linux")]
pub mod linux;

/// The response code returned from an I2C bus.  These response codes are
/// pretty specific, not because the caller is expected to necessarily handle
/// them differently, but to give upstack software some modicum of context
/// surrounding the error.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ResponseCode {
    /// Bad response from bus
    BadResponse = 1,
    /// Bad argument sent to bus
    BadArg = 2,
    /// Indicated I2C device is invalid (the device did not acknowledge)
    NoDevice = 3,
    /// Device address is reserved
    ReservedAddress = 5,
    /// Indicated port is invalid
    BadPort = 6,
    /// Device does not have indicated register
    NoRegister = 8,
    /// I2C bus locked up and was reset
    BusLocked = 19,
    /// I2C controller appeared to be busy
    ControllerBusy = 21,
    /// I2C bus error
    BusError = 22,
    /// Requested operation is not supported
    OperationNotSupported = 25,
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ResponseCode::BadResponse => "bad response from bus",
            ResponseCode::BadArg => "bad argument",
            ResponseCode::NoDevice => "no device at address",
            ResponseCode::ReservedAddress => "address is reserved",
            ResponseCode::BadPort => "invalid port",
            ResponseCode::NoRegister => "no such register",
            ResponseCode::BusLocked => "bus locked up",
            ResponseCode::ControllerBusy => "controller busy",
            ResponseCode::BusError => "bus error",
            ResponseCode::OperationNotSupported => "operation not supported",
        };
        f.write_str(msg)
    }
}

#[cfg(not(target_os = "none"))]
impl std::error::Error for ResponseCode {}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[allow(clippy::unusual_byte_groupings)]
pub enum ReservedAddress {
    GeneralCall = 0b0000_000,
    CBUSAddress = 0b0000_001,
    FutureBus = 0b0000_010,
    FuturePurposes = 0b0000_011,
    HighSpeedReserved00 = 0b0000_100,
    HighSpeedReserved01 = 0b0000_101,
    HighSpeedReserved10 = 0b0000_110,
    HighSpeedReserved11 = 0b0000_111,
    TenBit00 = 0b1111_100,
    TenBit01 = 0b1111_101,
    TenBit10 = 0b1111_110,
    TenBit11 = 0b1111_111,
}

impl ReservedAddress {
    /// Returns the reserved range `address` falls in, if any.  Addresses
    /// wider than 7 bits are not reserved, they are simply invalid; see
    /// [`check_address`].
    pub fn classify(address: u8) -> Option<Self> {
        use ReservedAddress::*;

        Some(match address {
            0b0000_000 => GeneralCall,
            0b0000_001 => CBUSAddress,
            0b0000_010 => FutureBus,
            0b0000_011 => FuturePurposes,
            0b0000_100 => HighSpeedReserved00,
            0b0000_101 => HighSpeedReserved01,
            0b0000_110 => HighSpeedReserved10,
            0b0000_111 => HighSpeedReserved11,
            0b1111_100 => TenBit00,
            0b1111_101 => TenBit01,
            0b1111_110 => TenBit10,
            0b1111_111 => TenBit11,
            _ => return None,
        })
    }
}

/// Checks that `address` is a 7-bit address that a device can actually
/// occupy.
pub fn check_address(address: u8) -> Result<(), ResponseCode> {
    if address > 0x7f {
        Err(ResponseCode::BadArg)
    } else if ReservedAddress::classify(address).is_some() {
        Err(ResponseCode::ReservedAddress)
    } else {
        Ok(())
    }
}

///
/// The port index for a given I2C bus.  On Linux this is the `N` in
/// `/dev/i2c-N`.
///
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PortIndex(pub u8);

bitflags! {
    /// Transfer types an I2C adapter supports.  The values match the
    /// `I2C_FUNC_*` bits the Linux kernel reports, so that an adapter's
    /// functionality word can be taken as-is.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct Functionality: u32 {
        const I2C = 0x0000_0001;
        const SMBUS_QUICK = 0x0001_0000;
        const SMBUS_READ_BYTE = 0x0002_0000;
        const SMBUS_READ_BYTE_DATA = 0x0008_0000;
        const SMBUS_READ_WORD_DATA = 0x0020_0000;
        const SMBUS_READ_BLOCK_DATA = 0x0100_0000;
        const SMBUS_READ_I2C_BLOCK = 0x0400_0000;
    }
}

/// A bus that can carry SMBus-style transactions.
///
/// Implementations are expected to serialize transactions themselves: a
/// single bus is routinely shared by several devices (and several threads),
/// so every method takes `&self`.
pub trait I2cBus {
    /// The port this bus is reached through.
    fn port(&self) -> PortIndex;

    /// The transfer types the underlying adapter supports.
    fn functionality(&self) -> Functionality;

    /// Performs an SMBus read-byte-data: writes `reg` to the device at
    /// `address` and reads back a single byte.
    fn read_byte_data(&self, address: u8, reg: u8) -> Result<u8, ResponseCode>;

    /// Performs an I2C block read: writes `cmd` to the device at `address`
    /// and reads up to `buf.len()` bytes back, returning how many bytes were
    /// actually transferred.  Unlike an SMBus block read, the device does not
    /// send a leading byte count.
    fn read_i2c_block_data(
        &self,
        address: u8,
        cmd: u8,
        buf: &mut [u8],
    ) -> Result<usize, ResponseCode>;
}

impl<B: I2cBus + ?Sized> I2cBus for &B {
    fn port(&self) -> PortIndex {
        (**self).port()
    }

    fn functionality(&self) -> Functionality {
        (**self).functionality()
    }

    fn read_byte_data(&self, address: u8, reg: u8) -> Result<u8, ResponseCode> {
        (**self).read_byte_data(address, reg)
    }

    fn read_i2c_block_data(
        &self,
        address: u8,
        cmd: u8,
        buf: &mut [u8],
    ) -> Result<usize, ResponseCode> {
        (**self).read_i2c_block_data(address, cmd, buf)
    }
}

#[cfg(not(target_os = "none"))]
impl<B: I2cBus + ?Sized> I2cBus for std::sync::Arc<B> {
    fn port(&self) -> PortIndex {
        (**self).port()
    }

    fn functionality(&self) -> Functionality {
        (**self).functionality()
    }

    fn read_byte_data(&self, address: u8, reg: u8) -> Result<u8, ResponseCode> {
        (**self).read_byte_data(address, reg)
    }

    fn read_i2c_block_data(
        &self,
        address: u8,
        cmd: u8,
        buf: &mut [u8],
    ) -> Result<usize, ResponseCode> {
        (**self).read_i2c_block_data(address, cmd, buf)
    }
}

///
/// The 2-tuple that uniquely identifies an I2C device, along with the bus
/// used to reach it.
///
#[derive(Copy, Clone, Debug)]
pub struct I2cDevice<B> {
    pub bus: B,
    pub address: u8,
}

impl<B: I2cBus> fmt::Display for I2cDevice<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i2c-{} {:#x}", self.bus.port().0, self.address)
    }
}

impl<B: I2cBus> I2cDevice<B> {
    ///
    /// Return a new [`I2cDevice`], given the bus and the address of the
    /// device on it.  This performs no bus traffic.
    ///
    pub fn new(bus: B, address: u8) -> Self {
        Self { bus, address }
    }

    /// Returns the functionality of the adapter this device sits behind.
    pub fn functionality(&self) -> Functionality {
        self.bus.functionality()
    }

    ///
    /// Reads an 8-bit register.
    ///
    /// ## Error handling
    ///
    /// On failure, a [`ResponseCode`] will indicate more detail.
    ///
    pub fn read_reg(&self, reg: u8) -> Result<u8, ResponseCode> {
        self.bus.read_byte_data(self.address, reg)
    }

    ///
    /// Like [`I2cDevice::read_reg`], but reads as many bytes as the device
    /// will send (up to the length of `buf`) into a specified slice,
    /// returning the number of bytes read.  Callers that need an exact
    /// length must check the returned count themselves.
    ///
    pub fn read_reg_into(
        &self,
        reg: u8,
        buf: &mut [u8],
    ) -> Result<usize, ResponseCode> {
        self.bus.read_i2c_block_data(self.address, reg, buf)
    }
}
