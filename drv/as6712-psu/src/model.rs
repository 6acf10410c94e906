// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed-capacity model name.

use core::fmt;

/// Number of bytes in a model name, as read off the supply.
pub const MODEL_NAME_LEN: usize = 13;

/// A supply's model name.  Holds at most [`MODEL_NAME_LEN`] bytes of UTF-8
/// and never allocates, so it can be copied out of the cache freely.
#[derive(Copy, Clone, Default, Eq, PartialEq)]
pub struct ModelName {
    buf: [u8; MODEL_NAME_LEN],
    len: usize,
}

impl ModelName {
    pub const EMPTY: Self = Self {
        buf: [0; MODEL_NAME_LEN],
        len: 0,
    };

    /// Builds a model name from the raw bytes of a block read.
    ///
    /// Only the first [`MODEL_NAME_LEN`] bytes are considered.  The name
    /// ends at the first NUL, anything that isn't valid UTF-8 is dropped
    /// along with everything after it, and trailing padding is trimmed.
    pub fn from_block(raw: &[u8]) -> Self {
        let raw = &raw[..raw.len().min(MODEL_NAME_LEN)];
        let raw = match raw.iter().position(|&b| b == 0) {
            Some(nul) => &raw[..nul],
            None => raw,
        };
        let text = match core::str::from_utf8(raw) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&raw[..e.valid_up_to()])
                .unwrap_or_default(),
        };
        let text = text.trim_end();

        let mut buf = [0; MODEL_NAME_LEN];
        buf[..text.len()].copy_from_slice(text.as_bytes());
        Self {
            buf,
            len: text.len(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn as_str(&self) -> &str {
        // Only ever built from a validated `&str`.
        core::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl PartialEq<&str> for ModelName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_length_name() {
        let name = ModelName::from_block(b"UM400D01-01G1");
        assert_eq!(name, "UM400D01-01G1");
        assert_eq!(name.len(), MODEL_NAME_LEN);
    }

    #[test]
    fn stops_at_nul() {
        let name = ModelName::from_block(b"CPR-4011\0\xff\xff\xff\xff");
        assert_eq!(name, "CPR-4011");
    }

    #[test]
    fn trims_padding() {
        let name = ModelName::from_block(b"UM400D01     ");
        assert_eq!(name, "UM400D01");
    }

    #[test]
    fn drops_invalid_utf8() {
        let name = ModelName::from_block(b"UM400\xffD01-01");
        assert_eq!(name, "UM400");
    }

    #[test]
    fn ignores_bytes_past_capacity() {
        let name = ModelName::from_block(b"CPR-4011-4M11XYZ");
        assert_eq!(name, "CPR-4011-4M11");
    }

    #[test]
    fn empty() {
        assert!(ModelName::from_block(b"").is_empty());
        assert!(ModelName::from_block(b"\0UM400D01").is_empty());
        assert_eq!(ModelName::default(), ModelName::EMPTY);
        assert_eq!(format!("{:?}", ModelName::EMPTY), "\"\"");
    }
}
