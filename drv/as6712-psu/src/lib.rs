// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Driver for the power supplies of the Accton AS6712-32X switch
//!
//! Each of the two PSU slots is represented by a [`Psu`], which answers three
//! questions: is the supply present, is its power good, and what is its model
//! name.  Presence and power-good come from a status register in the platform
//! CPLD (one byte covering both slots); the model name comes from an I2C block
//! read against the supply itself.
//!
//! # Caching
//!
//! Every query goes through a refresh that is gated on time: if the cached
//! data is younger than the refresh interval (1.5 seconds by default), it is
//! returned as is.  Otherwise the CPLD register is re-read and, if the supply
//! is present, its model name is read again (with retries, see [`block`]).
//! The refresh runs under a per-PSU lock, so concurrent readers of the same
//! PSU observe either the old snapshot or the new one, never a mix.
//!
//! Queries never fail.  A failed CPLD read keeps the previous status byte; a
//! failed model-name read leaves the name empty.  Either way the cache is
//! marked fresh, and the failure is only visible in the logs and in the
//! [`Counters`].
//!
//! # Status register layout
//!
//! ```text
//!   7   6   5   4   3   2   1   0
//! +---+---+---+---+---+---+---+---+
//! |   |   |PG2|PR2|   |   |PG1|PR1|
//! +---+---+---+---+---+---+---+---+
//! ```
//!
//! `PRn` is the active-low presence bit for slot `n`; `PGn` is the
//! active-high power-good bit.

use core::fmt;

use drv_i2c_api::ResponseCode;

pub mod address;
pub mod attr;
pub mod block;
pub mod clock;
pub mod config;
pub mod cpld;
pub mod model;
pub mod psu;
pub mod set;
pub mod status;

#[cfg(test)]
mod fakes;

pub use address::{PsuAddress, Slot, Variant, SCANNED_ADDRESSES};
pub use attr::{Attribute, ATTRIBUTES};
pub use block::RetryPolicy;
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use cpld::{Cpld, I2cCpld};
pub use model::ModelName;
pub use psu::{Counters, Psu, Snapshot};
pub use set::PsuSet;
pub use status::PsuStatus;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The address does not belong to either PSU slot.
    UnknownAddress { address: u8 },
    /// The adapter the PSU sits behind cannot do I2C block reads.
    Unsupported { address: u8 },
    /// A PSU is already bound at this address.
    AlreadyBound { address: u8 },
    /// The bus reported an error on the read of `cmd`.
    BadRead { cmd: u8, code: ResponseCode },
    /// The read of `cmd` came back with the wrong number of bytes.
    ShortRead {
        cmd: u8,
        expected: usize,
        actual: usize,
    },
    /// No attribute by that name.
    NoSuchAttribute,
}

impl From<Error> for ResponseCode {
    fn from(err: Error) -> Self {
        match err {
            Error::BadRead { code, .. } => code,
            Error::ShortRead { .. } => ResponseCode::BadResponse,
            Error::UnknownAddress { .. } | Error::AlreadyBound { .. } => {
                ResponseCode::NoDevice
            }
            Error::Unsupported { .. } => ResponseCode::OperationNotSupported,
            Error::NoSuchAttribute => ResponseCode::BadArg,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownAddress { address } => {
                write!(f, "{address:#x} is not a PSU address")
            }
            Error::Unsupported { address } => write!(
                f,
                "adapter for {address:#x} does not support I2C block reads"
            ),
            Error::AlreadyBound { address } => {
                write!(f, "a PSU is already bound at {address:#x}")
            }
            Error::BadRead { cmd, code } => {
                write!(f, "read of {cmd:#x} failed: {code}")
            }
            Error::ShortRead {
                cmd,
                expected,
                actual,
            } => write!(
                f,
                "read of {cmd:#x} returned {actual} bytes, expected {expected}"
            ),
            Error::NoSuchAttribute => f.write_str("no such attribute"),
        }
    }
}

impl std::error::Error for Error {}
