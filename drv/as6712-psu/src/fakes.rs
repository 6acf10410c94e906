// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bus and clock fakes for testing!

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use drv_i2c_api::{Functionality, I2cBus, PortIndex, ResponseCode};
use parking_lot::Mutex;

use crate::clock::Clock;
use crate::cpld::{CPLD_ADDRESS, PSU_STATUS_REG};

#[derive(Clone, Debug)]
pub enum BlockReply {
    /// Transfer these bytes (possibly fewer than asked for).
    Data(Vec<u8>),
    Fail(ResponseCode),
}

/// A bus with the status CPLD at its usual address and a scriptable answer
/// for every block read, whatever the address.
pub struct FakeBus {
    funcs: Functionality,
    cpld_status: Mutex<Result<u8, ResponseCode>>,
    cpld_reads: AtomicUsize,
    script: Mutex<VecDeque<BlockReply>>,
    default_block: Mutex<BlockReply>,
    block_reads: Mutex<Vec<(u8, u8, usize)>>,
}

impl FakeBus {
    pub fn new() -> Self {
        Self::with_functionality(
            Functionality::SMBUS_READ_BYTE_DATA
                | Functionality::SMBUS_READ_I2C_BLOCK,
        )
    }

    pub fn with_functionality(funcs: Functionality) -> Self {
        Self {
            funcs,
            cpld_status: Mutex::new(Ok(0)),
            cpld_reads: AtomicUsize::new(0),
            script: Mutex::new(VecDeque::new()),
            default_block: Mutex::new(BlockReply::Data(
                b"UM400D01-01G1".to_vec(),
            )),
            block_reads: Mutex::new(Vec::new()),
        }
    }

    pub fn set_cpld_status(&self, status: Result<u8, ResponseCode>) {
        *self.cpld_status.lock() = status;
    }

    pub fn cpld_reads(&self) -> usize {
        self.cpld_reads.load(Ordering::SeqCst)
    }

    /// Queues a reply for the next block read; once the queue runs dry,
    /// block reads get the default reply.
    pub fn push_block(&self, reply: BlockReply) {
        self.script.lock().push_back(reply);
    }

    pub fn set_default_block(&self, reply: BlockReply) {
        *self.default_block.lock() = reply;
    }

    /// Every block read so far, as `(address, cmd, len)`.
    pub fn block_reads(&self) -> Vec<(u8, u8, usize)> {
        self.block_reads.lock().clone()
    }
}

impl I2cBus for FakeBus {
    fn port(&self) -> PortIndex {
        PortIndex(0)
    }

    fn functionality(&self) -> Functionality {
        self.funcs
    }

    fn read_byte_data(&self, address: u8, reg: u8) -> Result<u8, ResponseCode> {
        match (address, reg) {
            (CPLD_ADDRESS, PSU_STATUS_REG) => {
                self.cpld_reads.fetch_add(1, Ordering::SeqCst);
                *self.cpld_status.lock()
            }
            (CPLD_ADDRESS, _) => Err(ResponseCode::NoRegister),
            _ => Err(ResponseCode::NoDevice),
        }
    }

    fn read_i2c_block_data(
        &self,
        address: u8,
        cmd: u8,
        buf: &mut [u8],
    ) -> Result<usize, ResponseCode> {
        self.block_reads.lock().push((address, cmd, buf.len()));

        let reply = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.default_block.lock().clone());

        match reply {
            BlockReply::Data(bytes) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            BlockReply::Fail(code) => Err(code),
        }
    }
}

/// A clock that only moves when told to, or when slept on.  Clones share the
/// same time.
#[derive(Clone, Default)]
pub struct FakeClock {
    now: Arc<AtomicU64>,
    sleeps: Arc<Mutex<Vec<u64>>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn sleeps(&self) -> Vec<u64> {
        self.sleeps.lock().clone()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn sleep_for(&self, ms: u64) {
        self.sleeps.lock().push(ms);
        self.advance(ms);
    }
}
