// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::Deserialize;

use crate::block::RetryPolicy;
use crate::cpld::{CPLD_ADDRESS, PSU_STATUS_REG};

/// Driver tunables.  The defaults are what the platform expects; every
/// field can be overridden on its own from a TOML table such as:
///
/// ```toml
/// refresh-interval-ms = 1500
/// cpld-address = 0x60
/// status-register = 0x2
///
/// [retry]
/// attempts = 5
/// delay-ms = 10
/// ```
#[derive(Copy, Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct Config {
    /// Cached data older than this is re-read on the next query.
    pub refresh_interval_ms: u64,
    pub cpld_address: u8,
    pub status_register: u8,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 1500,
            cpld_address: CPLD_ADDRESS,
            status_register: PSU_STATUS_REG,
            retry: RetryPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.refresh_interval_ms, 1500);
        assert_eq!(config.cpld_address, 0x60);
        assert_eq!(config.status_register, 0x2);
        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.delay_ms, 10);
    }

    #[test]
    fn partial_override() {
        let config: Config = toml::from_str(
            r#"
            refresh-interval-ms = 250

            [retry]
            attempts = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.refresh_interval_ms, 250);
        assert_eq!(config.cpld_address, CPLD_ADDRESS);
        assert_eq!(
            config.retry,
            RetryPolicy {
                attempts: 2,
                delay_ms: 10
            }
        );
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(toml::from_str::<Config>("refresh-ms = 1").is_err());
        assert!(toml::from_str::<Config>("[retry]\nbackoff = 1").is_err());
    }
}
