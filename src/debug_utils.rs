use embedded_hal::i2c::{Error, ErrorKind, NoAcknowledgeSource, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyError {
    InvalidTest,
    Nack,
}

impl Error for DummyError {
    fn kind(&self) -> ErrorKind {
        match &self {
            DummyError::InvalidTest => ErrorKind::Other,
            DummyError::Nack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
        }
    }
}

/// Replies with a canned response and records what was written.
pub struct DummyBus<'a> {
    pub response: &'a [u8],
    pub written: Vec<Vec<u8>>,
    pub reads: usize,
    pub address: Option<u8>,
    pub fail: bool,
}

impl<'a> DummyBus<'a> {
    pub fn new(response: &'a [u8]) -> Self {
        Self {
            response,
            written: Vec::new(),
            reads: 0,
            address: None,
            fail: false,
        }
    }

    /// NACKs every transaction.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }
}

impl embedded_hal::i2c::ErrorType for DummyBus<'_> {
    type Error = DummyError;
}

impl embedded_hal::i2c::I2c for DummyBus<'_> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation],
    ) -> Result<(), Self::Error> {
        if self.fail {
            return Err(DummyError::Nack);
        }
        self.address = Some(address);

        match operations {
            [Operation::Read(response)] => {
                if response.len() != self.response.len() {
                    return Err(DummyError::InvalidTest);
                }

                response.copy_from_slice(self.response);
                self.reads += 1;

                Ok(())
            }
            [Operation::Write(data)] => {
                self.written.push(data.to_vec());
                Ok(())
            }
            // Commands never use combined transactions
            _ => Err(DummyError::InvalidTest),
        }
    }
}

impl embedded_hal_async::i2c::I2c for DummyBus<'_> {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        embedded_hal::i2c::I2c::transaction(self, address, operations)
    }
}

/// Returns immediately, keeping a tally of the requested waits.
#[derive(Debug, Default)]
pub struct DummyDelay {
    total_ns: u64,
}

impl DummyDelay {
    pub fn total_us(&self) -> u64 {
        self.total_ns / 1_000
    }
}

impl embedded_hal::delay::DelayNs for DummyDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.total_ns += u64::from(us) * 1_000;
    }
}

impl embedded_hal_async::delay::DelayNs for DummyDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }

    async fn delay_us(&mut self, us: u32) {
        self.total_ns += u64::from(us) * 1_000;
    }
}
