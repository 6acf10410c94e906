// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoding of the CPLD PSU status register.

use bitflags::bitflags;

use crate::address::Slot;

bitflags! {
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct StatusBits: u8 {
        /// PSU 1 absent (active-low presence)
        const PSU1_PRESENT_L = 1 << 0;
        const PSU1_POWER_GOOD = 1 << 1;
        /// PSU 2 absent (active-low presence)
        const PSU2_PRESENT_L = 1 << 4;
        const PSU2_POWER_GOOD = 1 << 5;
    }
}

impl Slot {
    fn present_l(self) -> StatusBits {
        match self {
            Slot::Psu1 => StatusBits::PSU1_PRESENT_L,
            Slot::Psu2 => StatusBits::PSU2_PRESENT_L,
        }
    }

    fn power_good(self) -> StatusBits {
        match self {
            Slot::Psu1 => StatusBits::PSU1_POWER_GOOD,
            Slot::Psu2 => StatusBits::PSU2_POWER_GOOD,
        }
    }
}

/// Raw status byte as last read from the CPLD.  Defaults to zero before the
/// first successful read, which decodes as "present, power not good" for
/// both slots.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PsuStatus(pub u8);

impl PsuStatus {
    pub fn bits(self) -> StatusBits {
        StatusBits::from_bits_retain(self.0)
    }

    pub fn present(self, slot: Slot) -> bool {
        !self.bits().contains(slot.present_l())
    }

    pub fn power_good(self, slot: Slot) -> bool {
        self.bits().contains(slot.power_good())
    }
}
