// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping from bus address to PSU slot and supply variant.
//!
//! | Address | Slot | Variant                  |
//! |---------|------|--------------------------|
//! | `0x50`  | 1    | DC (UM400D01x)           |
//! | `0x53`  | 2    | DC (UM400D01x)           |
//! | `0x38`  | 1    | AC (CPR-4011-4Mxx)       |
//! | `0x3b`  | 2    | AC (CPR-4011-4Mxx)       |

use core::fmt;

use num_derive::FromPrimitive;

use crate::model::MODEL_NAME_LEN;
use crate::Error;

/// Addresses probed when scanning a bus for supplies.  The AC addresses are
/// never scanned; they only show up when bound explicitly.
pub const SCANNED_ADDRESSES: [u8; 2] = [0x50, 0x53];

/// PSU slot, numbered as on the chassis.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum Slot {
    Psu1 = 1,
    Psu2 = 2,
}

impl Slot {
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "psu{}", self.index())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Variant {
    /// CPR-4011-4Mxx AC supply
    Ac,
    /// UM400D01x DC supply
    Dc,
}

/// The block read that yields a supply's model name.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ModelNameCommand {
    pub cmd: u8,
    pub len: usize,
}

impl Variant {
    pub fn model_name_command(self) -> ModelNameCommand {
        match self {
            Variant::Ac => ModelNameCommand {
                cmd: 0x26,
                len: MODEL_NAME_LEN,
            },
            Variant::Dc => ModelNameCommand {
                cmd: 0x50,
                len: MODEL_NAME_LEN,
            },
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PsuAddress {
    address: u8,
    slot: Slot,
    variant: Variant,
}

impl PsuAddress {
    pub fn address(self) -> u8 {
        self.address
    }

    pub fn slot(self) -> Slot {
        self.slot
    }

    pub fn variant(self) -> Variant {
        self.variant
    }
}

impl TryFrom<u8> for PsuAddress {
    type Error = Error;

    fn try_from(address: u8) -> Result<Self, Error> {
        let (slot, variant) = match address {
            0x50 => (Slot::Psu1, Variant::Dc),
            0x53 => (Slot::Psu2, Variant::Dc),
            0x38 => (Slot::Psu1, Variant::Ac),
            0x3b => (Slot::Psu2, Variant::Ac),
            _ => return Err(Error::UnknownAddress { address }),
        };

        Ok(Self {
            address,
            slot,
            variant,
        })
    }
}
