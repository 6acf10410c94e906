// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binding and unbinding of PSUs.

use drv_i2c_api::{I2cBus, I2cDevice};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::Config;
use crate::cpld::Cpld;
use crate::psu::Psu;
use crate::Error;

/// The PSUs bound on a bus, at most one per address.
pub struct PsuSet<B, C, K> {
    psus: Vec<Psu<B, C, K>>,
}

impl<B, C, K> Default for PsuSet<B, C, K> {
    fn default() -> Self {
        Self { psus: Vec::new() }
    }
}

impl<B: I2cBus, C: Cpld, K: Clock> PsuSet<B, C, K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probes each of `addresses` on `bus`, keeping the ones that bind.
    /// Addresses that fail to bind are logged and skipped.
    pub fn scan(
        bus: B,
        cpld: C,
        clock: K,
        config: Config,
        addresses: &[u8],
    ) -> Self
    where
        B: Clone,
        C: Clone,
        K: Clone,
    {
        let mut set = Self::new();

        for &address in addresses {
            let device = I2cDevice::new(bus.clone(), address);
            if let Err(err) =
                set.bind(device, cpld.clone(), clock.clone(), config)
            {
                warn!(address, %err, "PSU did not bind");
            }
        }

        set
    }

    pub fn bind(
        &mut self,
        device: I2cDevice<B>,
        cpld: C,
        clock: K,
        config: Config,
    ) -> Result<&Psu<B, C, K>, Error> {
        let address = device.address;
        if self.get(address).is_some() {
            return Err(Error::AlreadyBound { address });
        }

        let psu = Psu::probe(device, cpld, clock, config)?;
        self.psus.push(psu);
        Ok(&self.psus[self.psus.len() - 1])
    }

    pub fn remove(&mut self, address: u8) -> Option<Psu<B, C, K>> {
        let index = self
            .psus
            .iter()
            .position(|psu| psu.address().address() == address)?;

        let psu = self.psus.remove(index);
        info!(device = %psu.device(), "removed");
        Some(psu)
    }

    pub fn get(&self, address: u8) -> Option<&Psu<B, C, K>> {
        self.psus
            .iter()
            .find(|psu| psu.address().address() == address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Psu<B, C, K>> {
        self.psus.iter()
    }

    pub fn len(&self) -> usize {
        self.psus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.psus.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{Slot, SCANNED_ADDRESSES};
    use crate::cpld::I2cCpld;
    use crate::fakes::{FakeBus, FakeClock};
    use drv_i2c_api::Functionality;

    type TestSet<'a> = PsuSet<&'a FakeBus, I2cCpld<&'a FakeBus>, FakeClock>;

    fn scan<'a>(bus: &'a FakeBus, addresses: &[u8]) -> TestSet<'a> {
        PsuSet::scan(
            bus,
            I2cCpld::new(bus),
            FakeClock::new(),
            Config::default(),
            addresses,
        )
    }

    #[test]
    fn scan_binds_both_slots() {
        let bus = FakeBus::new();
        let set = scan(&bus, &SCANNED_ADDRESSES);

        assert_eq!(set.len(), 2);
        let slots: Vec<_> = set.iter().map(|psu| psu.slot()).collect();
        assert_eq!(slots, vec![Slot::Psu1, Slot::Psu2]);
    }

    #[test]
    fn scan_skips_what_does_not_bind() {
        let bus = FakeBus::new();
        let set = scan(&bus, &[0x50, 0x51, 0x50]);

        assert_eq!(set.len(), 1);
        assert!(set.get(0x50).is_some());
        assert!(set.get(0x51).is_none());
    }

    #[test]
    fn scan_on_adapter_without_block_reads() {
        let bus =
            FakeBus::with_functionality(Functionality::SMBUS_READ_BYTE_DATA);
        let set = scan(&bus, &SCANNED_ADDRESSES);
        assert!(set.is_empty());
    }

    #[test]
    fn one_psu_per_address() {
        let bus = FakeBus::new();
        let clock = FakeClock::new();
        let mut set: TestSet<'_> = PsuSet::new();

        let psu = set
            .bind(
                I2cDevice::new(&bus, 0x3b),
                I2cCpld::new(&bus),
                clock.clone(),
                Config::default(),
            )
            .unwrap();
        assert_eq!(psu.slot(), Slot::Psu2);

        let again = set
            .bind(
                I2cDevice::new(&bus, 0x3b),
                I2cCpld::new(&bus),
                clock.clone(),
                Config::default(),
            )
            .err();
        assert_eq!(again, Some(Error::AlreadyBound { address: 0x3b }));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_then_rebind() {
        let bus = FakeBus::new();
        let mut set = scan(&bus, &SCANNED_ADDRESSES);

        let psu = set.remove(0x50).unwrap();
        assert_eq!(psu.address().address(), 0x50);
        assert_eq!(set.len(), 1);
        assert!(set.remove(0x50).is_none());

        set.bind(
            I2cDevice::new(&bus, 0x50),
            I2cCpld::new(&bus),
            FakeClock::new(),
            Config::default(),
        )
        .unwrap();
        assert_eq!(set.len(), 2);
    }
}
