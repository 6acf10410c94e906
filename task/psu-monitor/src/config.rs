// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use anyhow::{Context, Result};
use drv_as6712_psu::{Config, SCANNED_ADDRESSES};
use serde::Deserialize;

/// Where to find the PSUs, plus the driver tunables.
///
/// ```toml
/// bus = 1
/// cpld-bus = 0
/// addresses = [0x50, 0x53]
///
/// [driver]
/// refresh-interval-ms = 1500
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct MonitorConfig {
    /// The `N` in `/dev/i2c-N` the supplies hang off of.
    pub bus: u8,
    /// Bus of the status CPLD, if it isn't `bus`.
    pub cpld_bus: Option<u8>,
    #[serde(default = "default_addresses")]
    pub addresses: Vec<u8>,
    #[serde(default)]
    pub driver: Config,
}

fn default_addresses() -> Vec<u8> {
    SCANNED_ADDRESSES.to_vec()
}

impl MonitorConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        Self::parse(&text)
            .with_context(|| format!("could not parse {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn cpld_bus(&self) -> u8 {
        self.cpld_bus.unwrap_or(self.bus)
    }
}
