// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Block reads with bounded retry.
//!
//! The supplies sit on a busy bus and will occasionally NAK a transfer or cut
//! it short.  A block read is therefore attempted a fixed number of times,
//! with a fixed delay after each failed attempt.  An attempt only counts as
//! successful if the transfer completes *and* returns exactly the number of
//! bytes asked for.

use drv_i2c_api::{I2cBus, I2cDevice};
use serde::Deserialize;
use tracing::debug;

use crate::clock::Clock;
use crate::Error;

#[derive(Copy, Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct RetryPolicy {
    /// Total attempts, including the first.  Zero is treated as one.
    pub attempts: u32,
    /// Delay after each failed attempt, in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay_ms: 10,
        }
    }
}

/// Reads exactly `buf.len()` bytes from command `cmd` of `device`, retrying
/// as `policy` allows.  On failure, returns the error of the last attempt.
pub fn read_block<B: I2cBus, K: Clock>(
    device: &I2cDevice<B>,
    clock: &K,
    policy: &RetryPolicy,
    cmd: u8,
    buf: &mut [u8],
) -> Result<(), Error> {
    let expected = buf.len();
    let mut attempts_remaining = policy.attempts.max(1);

    loop {
        let err = match device.read_reg_into(cmd, buf) {
            Ok(actual) if actual == expected => return Ok(()),
            Ok(actual) => Error::ShortRead {
                cmd,
                expected,
                actual,
            },
            Err(code) => Error::BadRead { cmd, code },
        };

        attempts_remaining -= 1;
        debug!(%device, cmd, ?err, attempts_remaining, "block read failed");
        clock.sleep_for(policy.delay_ms);

        if attempts_remaining == 0 {
            return Err(err);
        }
    }
}
