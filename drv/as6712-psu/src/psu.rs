// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The cached view of a single PSU.

use drv_i2c_api::{Functionality, I2cBus, I2cDevice};
use parking_lot::Mutex;
use tracing::{debug, info, trace};

use crate::address::{PsuAddress, Slot};
use crate::attr::Attribute;
use crate::block;
use crate::clock::Clock;
use crate::config::Config;
use crate::cpld::Cpld;
use crate::model::{ModelName, MODEL_NAME_LEN};
use crate::status::PsuStatus;
use crate::Error;

/// Running totals of what the cache has been up to.  Purely diagnostic.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Counters {
    pub refreshes: u32,
    pub cache_hits: u32,
    pub status_read_failures: u32,
    pub model_name_read_failures: u32,
}

/// Everything known about a PSU as of its last refresh.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Snapshot {
    pub slot: Slot,
    pub status: PsuStatus,
    pub model_name: ModelName,
    /// When the refresh that produced this snapshot finished.
    pub last_updated: u64,
}

impl Snapshot {
    pub fn present(&self) -> bool {
        self.status.present(self.slot)
    }

    pub fn power_good(&self) -> bool {
        self.status.power_good(self.slot)
    }
}

#[derive(Default)]
struct State {
    status: PsuStatus,
    model_name: ModelName,
    last_updated: u64,
    valid: bool,
    counters: Counters,
}

pub struct Psu<B, C, K> {
    device: I2cDevice<B>,
    address: PsuAddress,
    cpld: C,
    clock: K,
    config: Config,
    state: Mutex<State>,
}

impl<B: I2cBus, C: Cpld, K: Clock> Psu<B, C, K> {
    /// Binds a PSU at `device`.  No data is read until the first query.
    pub fn probe(
        device: I2cDevice<B>,
        cpld: C,
        clock: K,
        config: Config,
    ) -> Result<Self, Error> {
        let address = PsuAddress::try_from(device.address)?;

        if !device
            .functionality()
            .contains(Functionality::SMBUS_READ_I2C_BLOCK)
        {
            return Err(Error::Unsupported {
                address: device.address,
            });
        }

        info!(
            %device,
            slot = %address.slot(),
            variant = ?address.variant(),
            "chip found"
        );

        Ok(Self {
            device,
            address,
            cpld,
            clock,
            config,
            state: Mutex::new(State::default()),
        })
    }

    pub fn address(&self) -> PsuAddress {
        self.address
    }

    pub fn slot(&self) -> Slot {
        self.address.slot()
    }

    pub fn device(&self) -> &I2cDevice<B> {
        &self.device
    }

    pub fn present(&self) -> bool {
        self.update().present()
    }

    pub fn power_good(&self) -> bool {
        self.update().power_good()
    }

    pub fn model_name(&self) -> ModelName {
        self.update().model_name
    }

    /// Returns the whole record, refreshed if stale.  Use this rather than
    /// the individual accessors when several values must agree with each
    /// other.
    pub fn snapshot(&self) -> Snapshot {
        self.update()
    }

    /// Renders `attr` the way a sysfs read would.
    pub fn show(&self, attr: Attribute) -> String {
        attr.show(&self.update())
    }

    pub fn counters(&self) -> Counters {
        self.state.lock().counters
    }

    fn update(&self) -> Snapshot {
        let mut state = self.state.lock();
        let now = self.clock.now();

        if state.valid
            && now.saturating_sub(state.last_updated)
                <= self.config.refresh_interval_ms
        {
            state.counters.cache_hits =
                state.counters.cache_hits.wrapping_add(1);
            trace!(device = %self.device, "cache hit");
        } else {
            self.refresh(&mut state);
        }

        Snapshot {
            slot: self.slot(),
            status: state.status,
            model_name: state.model_name,
            last_updated: state.last_updated,
        }
    }

    fn refresh(&self, state: &mut State) {
        debug!(device = %self.device, "starting update");

        match self
            .cpld
            .read(self.config.cpld_address, self.config.status_register)
        {
            Ok(status) => state.status = PsuStatus(status),
            Err(code) => {
                // Keep whatever we had; the slot bits are still our best
                // guess.
                state.counters.status_read_failures =
                    state.counters.status_read_failures.wrapping_add(1);
                debug!(
                    cpld = self.config.cpld_address,
                    reg = self.config.status_register,
                    ?code,
                    "status register read failed"
                );
            }
        }

        state.model_name = ModelName::EMPTY;

        if state.status.present(self.slot()) {
            let command = self.address.variant().model_name_command();
            let mut buf = [0u8; MODEL_NAME_LEN];
            let buf = &mut buf[..command.len];

            match block::read_block(
                &self.device,
                &self.clock,
                &self.config.retry,
                command.cmd,
                buf,
            ) {
                Ok(()) => state.model_name = ModelName::from_block(buf),
                Err(err) => {
                    state.counters.model_name_read_failures = state
                        .counters
                        .model_name_read_failures
                        .wrapping_add(1);
                    debug!(
                        device = %self.device,
                        ?err,
                        "unable to read model name"
                    );
                }
            }
        }

        state.last_updated = self.clock.now();
        state.valid = true;
        state.counters.refreshes = state.counters.refreshes.wrapping_add(1);
    }
}
