// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Access to the platform CPLD.

use drv_i2c_api::{I2cBus, I2cDevice, ResponseCode};

/// I2C address of the CPLD holding the PSU status register.
pub const CPLD_ADDRESS: u8 = 0x60;

/// PSU presence/power-good register.
pub const PSU_STATUS_REG: u8 = 0x2;

pub trait Cpld {
    /// Reads register `reg` of the CPLD at `address`.
    fn read(&self, address: u8, reg: u8) -> Result<u8, ResponseCode>;
}

impl<C: Cpld + ?Sized> Cpld for &C {
    fn read(&self, address: u8, reg: u8) -> Result<u8, ResponseCode> {
        (**self).read(address, reg)
    }
}

/// A CPLD reached with plain SMBus byte reads.
#[derive(Copy, Clone, Debug)]
pub struct I2cCpld<B> {
    bus: B,
}

impl<B: I2cBus> I2cCpld<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }
}

impl<B: I2cBus> Cpld for I2cCpld<B> {
    fn read(&self, address: u8, reg: u8) -> Result<u8, ResponseCode> {
        I2cDevice::new(&self.bus, address).read_reg(reg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeBus;

    #[test]
    fn reads_status_register() {
        let bus = FakeBus::new();
        bus.set_cpld_status(Ok(0x21));

        let cpld = I2cCpld::new(&bus);
        assert_eq!(cpld.read(CPLD_ADDRESS, PSU_STATUS_REG), Ok(0x21));
        assert_eq!(bus.cpld_reads(), 1);
    }

    #[test]
    fn passes_errors_through() {
        let bus = FakeBus::new();
        bus.set_cpld_status(Err(ResponseCode::BusLocked));

        let cpld = I2cCpld::new(&bus);
        assert_eq!(
            cpld.read(CPLD_ADDRESS, PSU_STATUS_REG),
            Err(ResponseCode::BusLocked)
        );
    }

    #[test]
    fn other_registers_are_not_there() {
        let bus = FakeBus::new();
        let cpld = I2cCpld::new(&bus);
        assert_eq!(
            cpld.read(CPLD_ADDRESS, 0x3),
            Err(ResponseCode::NoRegister)
        );
        assert_eq!(
            cpld.read(0x61, PSU_STATUS_REG),
            Err(ResponseCode::NoDevice)
        );
    }
}
