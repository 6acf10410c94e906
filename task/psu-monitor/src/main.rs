// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reports the state of the AS6712-32X power supplies.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use drv_as6712_psu::{Attribute, Clock, Cpld, Psu, PsuSet, ATTRIBUTES};
use drv_i2c_api::I2cBus;
use tracing::debug;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod config;

use config::MonitorConfig;

#[derive(Debug, Parser)]
#[clap(max_term_width = 80, about = "AS6712-32X PSU status")]
struct Args {
    /// Monitor configuration (TOML)
    #[clap(short, long, default_value = "/etc/psu-monitor.toml")]
    config: PathBuf,
    #[clap(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Print attributes once
    Show {
        /// Only report the PSU at this address
        #[clap(long, parse(try_from_str = parse_address))]
        address: Option<u8>,
        /// Attribute to print (psu_present, psu_model_name, psu_power_good);
        /// all of them if omitted
        attr: Option<String>,
    },
    /// Print every attribute of every PSU, over and over
    Watch {
        #[clap(long, default_value_t = 1000)]
        interval_ms: u64,
    },
}

fn parse_address(s: &str) -> Result<u8, std::num::ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("RUST_LOG")
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = MonitorConfig::from_file(&args.config)?;

    run(&config, args.cmd)
}

#[cfg(target_os = "linux")]
fn run(config: &MonitorConfig, cmd: Cmd) -> Result<()> {
    use std::sync::Arc;

    use anyhow::Context;
    use drv_as6712_psu::{I2cCpld, SystemClock};
    use drv_i2c_api::linux::LinuxI2cBus;

    let open = |port: u8| {
        LinuxI2cBus::open(port)
            .map(Arc::new)
            .with_context(|| format!("could not open /dev/i2c-{port}"))
    };

    let bus = open(config.bus)?;
    let cpld_bus = if config.cpld_bus() == config.bus {
        bus.clone()
    } else {
        open(config.cpld_bus())?
    };

    let clock = SystemClock::new();
    let psus = PsuSet::scan(
        bus,
        I2cCpld::new(cpld_bus),
        &clock,
        config.driver,
        &config.addresses,
    );

    if psus.is_empty() {
        bail!("no PSUs bound on i2c-{}", config.bus);
    }

    match cmd {
        Cmd::Show { address, attr } => {
            let attr = attr.map(|a| a.parse::<Attribute>()).transpose()?;
            show(&psus, address, attr)
        }
        Cmd::Watch { interval_ms } => loop {
            show(&psus, None, None)?;
            thread::sleep(Duration::from_millis(interval_ms));
        },
    }
}

#[cfg(not(target_os = "linux"))]
fn run(_config: &MonitorConfig, _cmd: Cmd) -> Result<()> {
    bail!("i2c-dev is only available on Linux");
}

fn show<B: I2cBus, C: Cpld, K: Clock>(
    psus: &PsuSet<B, C, K>,
    address: Option<u8>,
    attr: Option<Attribute>,
) -> Result<()> {
    let selected: Vec<&Psu<B, C, K>> = match address {
        Some(address) => match psus.get(address) {
            Some(psu) => vec![psu],
            None => bail!("no PSU bound at {address:#x}"),
        },
        None => psus.iter().collect(),
    };

    for psu in selected {
        // One snapshot per PSU so the attributes printed agree.
        let snap = psu.snapshot();
        let attrs = match attr {
            Some(attr) => vec![attr],
            None => ATTRIBUTES.iter().map(|e| e.attr).collect(),
        };

        for attr in attrs {
            print!("{} {}: {}", psu.slot(), attr, attr.show(&snap));
        }

        debug!(device = %psu.device(), counters = ?psu.counters(), "shown");
    }

    Ok(())
}
