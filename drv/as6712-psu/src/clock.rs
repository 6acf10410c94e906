// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::thread;
use std::time::{Duration, Instant};

/// Time source for cache expiry and retry backoff.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed epoch.  Never goes backwards.
    fn now(&self) -> u64;

    /// Blocks the calling thread for `ms` milliseconds.
    fn sleep_for(&self, ms: u64);
}

impl<K: Clock + ?Sized> Clock for &K {
    fn now(&self) -> u64 {
        (**self).now()
    }

    fn sleep_for(&self, ms: u64) {
        (**self).sleep_for(ms)
    }
}

/// Monotonic clock counting from its own creation.
#[derive(Copy, Clone, Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn sleep_for(&self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }
}
