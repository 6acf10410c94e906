// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only attributes, by name.

use core::fmt;
use core::str::FromStr;

use crate::psu::Snapshot;
use crate::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Attribute {
    Present,
    ModelName,
    PowerGood,
}

pub struct AttributeEntry {
    pub name: &'static str,
    pub attr: Attribute,
    show: fn(&Snapshot) -> String,
}

pub static ATTRIBUTES: [AttributeEntry; 3] = [
    AttributeEntry {
        name: "psu_present",
        attr: Attribute::Present,
        show: show_present,
    },
    AttributeEntry {
        name: "psu_model_name",
        attr: Attribute::ModelName,
        show: show_model_name,
    },
    AttributeEntry {
        name: "psu_power_good",
        attr: Attribute::PowerGood,
        show: show_power_good,
    },
];

fn show_present(snap: &Snapshot) -> String {
    format!("{}\n", u8::from(snap.present()))
}

fn show_model_name(snap: &Snapshot) -> String {
    format!("{}\n", snap.model_name)
}

fn show_power_good(snap: &Snapshot) -> String {
    format!("{}\n", u8::from(snap.power_good()))
}

impl Attribute {
    fn entry(self) -> &'static AttributeEntry {
        // Every variant has exactly one row.
        match self {
            Attribute::Present => &ATTRIBUTES[0],
            Attribute::ModelName => &ATTRIBUTES[1],
            Attribute::PowerGood => &ATTRIBUTES[2],
        }
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ATTRIBUTES.iter().find(|e| e.name == name).map(|e| e.attr)
    }

    /// Renders this attribute from `snap`, newline-terminated.
    pub fn show(self, snap: &Snapshot) -> String {
        (self.entry().show)(snap)
    }
}

impl FromStr for Attribute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::from_name(s).ok_or(Error::NoSuchAttribute)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Slot;
    use crate::model::ModelName;
    use crate::status::PsuStatus;

    fn snap(status: u8, name: &[u8]) -> Snapshot {
        Snapshot {
            slot: Slot::Psu1,
            status: PsuStatus(status),
            model_name: ModelName::from_block(name),
            last_updated: 0,
        }
    }

    #[test]
    fn table_is_consistent() {
        for entry in &ATTRIBUTES {
            assert_eq!(entry.attr.name(), entry.name);
            assert_eq!(Attribute::from_name(entry.name), Some(entry.attr));
        }
    }

    #[test]
    fn names() {
        assert_eq!("psu_present".parse::<Attribute>(), Ok(Attribute::Present));
        assert_eq!(
            "psu_power_good".parse::<Attribute>(),
            Ok(Attribute::PowerGood)
        );
        assert_eq!(
            "psu_model_name".parse::<Attribute>(),
            Ok(Attribute::ModelName)
        );
        assert_eq!(
            "psu_serial".parse::<Attribute>(),
            Err(Error::NoSuchAttribute)
        );
        assert_eq!(Attribute::PowerGood.to_string(), "psu_power_good");
    }

    #[test]
    fn rendering() {
        let present = snap(0b0000_0000, b"UM400D01-01G1");
        assert_eq!(Attribute::Present.show(&present), "1\n");
        assert_eq!(Attribute::PowerGood.show(&present), "0\n");
        assert_eq!(Attribute::ModelName.show(&present), "UM400D01-01G1\n");

        let absent = snap(0b0000_0011, b"");
        assert_eq!(Attribute::Present.show(&absent), "0\n");
        assert_eq!(Attribute::PowerGood.show(&absent), "1\n");
        assert_eq!(Attribute::ModelName.show(&absent), "\n");
    }
}
