#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use regxact::{
    BankId, Client, ClientConfig, CompletionEvent, RegisterError, RegisterIo, ScratchRegisters,
};
use tokio::sync::broadcast::Receiver;

pub const DONE: i64 = 100;
pub const FAILED: i64 = 101;

/// Scratch banks where every access to `fail_bank` fails with `code`.
pub struct FaultyRegisters {
    pub inner: ScratchRegisters,
    pub fail_bank: BankId,
    pub code: i32,
}

impl FaultyRegisters {
    pub fn new(sizes: &[usize], fail_bank: BankId, code: i32) -> Self {
        Self {
            inner: ScratchRegisters::new(sizes),
            fail_bank,
            code,
        }
    }
}

impl RegisterIo for FaultyRegisters {
    fn read(&self, bank: BankId, offset: u64, width: usize) -> Result<u64, RegisterError> {
        if bank == self.fail_bank {
            return Err(RegisterError::Device { code: self.code });
        }
        self.inner.read(bank, offset, width)
    }

    fn write(
        &self,
        bank: BankId,
        offset: u64,
        value: u64,
        width: usize,
    ) -> Result<(), RegisterError> {
        if bank == self.fail_bank {
            return Err(RegisterError::Device { code: self.code });
        }
        self.inner.write(bank, offset, value, width)
    }
}

/// Scratch banks where any read of `panic_bank` panics.
pub struct PanickingRegisters {
    pub inner: ScratchRegisters,
    pub panic_bank: BankId,
}

impl RegisterIo for PanickingRegisters {
    fn read(&self, bank: BankId, offset: u64, width: usize) -> Result<u64, RegisterError> {
        assert_ne!(bank, self.panic_bank, "bank {bank} is wedged");
        self.inner.read(bank, offset, width)
    }

    fn write(
        &self,
        bank: BankId,
        offset: u64,
        value: u64,
        width: usize,
    ) -> Result<(), RegisterError> {
        self.inner.write(bank, offset, value, width)
    }
}

pub fn scratch_client(cfg: ClientConfig) -> (Arc<ScratchRegisters>, Arc<Client>) {
    let regs = Arc::new(ScratchRegisters::new(&[0x100, 0x100]));
    let client = Client::builder(cfg, regs.clone()).build();
    (regs, client)
}

pub async fn next_event(rx: &mut Receiver<CompletionEvent>) -> CompletionEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no completion event within 5s")
        .expect("bus closed")
}

pub async fn assert_quiet(rx: &mut Receiver<CompletionEvent>) {
    let res = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
    assert!(res.is_err(), "unexpected completion event: {res:?}");
}
