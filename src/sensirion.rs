use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use heapless::Vec;
use thiserror::Error;

use crate::crc::{Crc8, SENSIRION};

pub type Cmd = [u8; 2];

/// Largest checked payload of any command (the serial number).
pub const MAX_PAYLOAD: usize = 32;
/// Largest frame on the wire, payload plus one CRC byte per word.
pub const MAX_FRAME: usize = MAX_PAYLOAD / 2 * 3;

pub type Payload = Vec<u8, MAX_PAYLOAD>;
pub type Frame = Vec<u8, MAX_FRAME>;

#[derive(Clone, Copy, Hash, Debug, PartialEq, Eq, PartialOrd, Ord, Error)]
pub enum Error<I2cError> {
    #[error("invalid response")]
    InvalidResponse,
    #[error("invalid CRC at byte {offset}")]
    InvalidCrc { offset: usize },
    #[error("expected {expected} response bytes, got {actual}")]
    Framing { expected: usize, actual: usize },
    #[error("value cannot be encoded")]
    Encoding,
    #[error(transparent)]
    I2c(#[from] I2cError),
}

impl<E> embedded_hal::i2c::Error for Error<E>
where
    E: embedded_hal::i2c::Error,
{
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        match self {
            Self::I2c(err) => err.kind(),
            _ => embedded_hal::i2c::ErrorKind::Other,
        }
    }
}

/// Timing constraints of a single command, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Timing {
    /// Wait between the end of the write and the start of the read.
    pub read_delay_us: u32,
    /// Longest clock stretching the device may apply.
    pub timeout_us: u32,
    /// Busy window after the command before the next one may be sent.
    pub post_processing_us: u32,
}

impl Timing {
    pub const fn read(read_delay_us: u32) -> Self {
        Self {
            read_delay_us,
            timeout_us: 0,
            post_processing_us: 0,
        }
    }

    pub const fn settle(post_processing_us: u32) -> Self {
        Self {
            read_delay_us: 0,
            timeout_us: 0,
            post_processing_us,
        }
    }
}

/// A single device operation: its wire layout and how to decode the reply.
pub trait Command {
    type Response;

    /// Sent as two raw bytes ahead of the payload, without a CRC.
    const ID: Option<Cmd>;
    /// Bytes to read including CRCs. `None` skips the read phase.
    const RX_LENGTH: Option<usize>;
    const TIMING: Timing;
    /// Data bytes covered by each CRC byte.
    const GROUP_SIZE: usize = 2;
    const CRC: Crc8 = SENSIRION;

    /// Payload to send after the id. `Some` of an empty payload still sends
    /// a write header when there is no id.
    fn tx_data<E>(&self) -> Result<Option<Payload>, Error<E>> {
        Ok(Some(Payload::new()))
    }

    /// Decodes the response payload after the CRCs were checked and removed.
    fn interpret<E>(&self, checked: &[u8]) -> Result<Self::Response, Error<E>>;
}

/// Everything the transport needs to run one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub write: Option<Frame>,
    pub read_length: Option<usize>,
    pub timing: Timing,
}

/// Appends `data` to `out`, one CRC byte after every `group` bytes.
pub fn add_crc<E>(
    crc: &Crc8,
    group: usize,
    data: &[u8],
    out: &mut Frame,
) -> Result<(), Error<E>> {
    if group == 0 || data.len() % group != 0 {
        return Err(Error::Encoding);
    }

    for chunk in data.chunks_exact(group) {
        out.extend_from_slice(chunk).map_err(|_| Error::<E>::Encoding)?;
        out.push(crc.compute(chunk)).map_err(|_| Error::<E>::Encoding)?;
    }

    Ok(())
}

/// Verifies the CRC of every group in `rx` and returns the data bytes alone.
pub fn strip_crc<E>(crc: &Crc8, group: usize, rx: &[u8]) -> Result<Payload, Error<E>> {
    let stride = group + 1;
    if group == 0 || rx.len() % stride != 0 {
        return Err(Error::Framing {
            expected: rx.len().next_multiple_of(stride.max(1)),
            actual: rx.len(),
        });
    }

    let mut checked = Payload::new();
    for (index, chunk) in rx.chunks_exact(stride).enumerate() {
        let (data, received) = chunk.split_at(group);
        if !crc.verify(data, received[0]) {
            let offset = index * stride;
            log::warn!(
                "CRC mismatch at byte {}: received {:#04x}, computed {:#04x}",
                offset,
                received[0],
                crc.compute(data)
            );
            return Err(Error::InvalidCrc { offset });
        }
        checked.extend_from_slice(data).map_err(|_| Error::<E>::Framing {
            expected: MAX_FRAME,
            actual: rx.len(),
        })?;
    }

    Ok(checked)
}

pub fn encode<C: Command, E>(cmd: &C) -> Result<Request, Error<E>> {
    let data = cmd.tx_data::<E>()?;

    let write = if C::ID.is_none() && data.is_none() {
        None
    } else {
        let mut frame = Frame::new();
        if let Some(id) = C::ID {
            frame.extend_from_slice(&id).map_err(|_| Error::<E>::Encoding)?;
        }
        if let Some(data) = data {
            add_crc::<E>(&C::CRC, C::GROUP_SIZE, &data, &mut frame)?;
        }
        Some(frame)
    };

    Ok(Request {
        write,
        read_length: C::RX_LENGTH,
        timing: C::TIMING,
    })
}

pub fn decode<C: Command, E>(cmd: &C, rx: &[u8]) -> Result<C::Response, Error<E>> {
    let expected = C::RX_LENGTH.unwrap_or(0);
    if rx.len() != expected {
        log::debug!("expected {} response bytes, got {}", expected, rx.len());
        return Err(Error::Framing {
            expected,
            actual: rx.len(),
        });
    }

    let checked = strip_crc::<E>(&C::CRC, C::GROUP_SIZE, rx)?;
    cmd.interpret(&checked)
}

fn id_of<C: Command>() -> u16 {
    C::ID.map(u16::from_be_bytes).unwrap_or_default()
}

pub struct Sensor<I2C, D> {
    i2c: I2C,
    delay: D,
    addr: u8,
}

impl<I2C, D> Sensor<I2C, D> {
    pub fn new(i2c: I2C, delay: D, addr: u8) -> Self {
        Self { i2c, delay, addr }
    }

    pub fn addr(&self) -> u8 {
        self.addr
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C: I2c, D: DelayNs> Sensor<I2C, D> {
    /// Runs one command and waits out its post-processing time, whether it
    /// succeeded or not.
    pub fn execute<C: Command>(&mut self, cmd: &C) -> Result<C::Response, Error<I2C::Error>> {
        let request = encode::<C, I2C::Error>(cmd)?;
        log::trace!(
            "command {:#06x}: write {:?} bytes, read {:?} bytes",
            id_of::<C>(),
            request.write.as_ref().map(|w| w.len()),
            request.read_length
        );

        let response = self.transceive(cmd, &request);
        if request.timing.post_processing_us > 0 {
            self.delay.delay_us(request.timing.post_processing_us);
        }
        response
    }

    fn transceive<C: Command>(
        &mut self,
        cmd: &C,
        request: &Request,
    ) -> Result<C::Response, Error<I2C::Error>> {
        if let Some(write) = &request.write {
            self.i2c.write(self.addr, write)?;
        }

        let Some(len) = request.read_length else {
            return cmd.interpret(&[]);
        };

        if request.timing.read_delay_us > 0 {
            self.delay.delay_us(request.timing.read_delay_us);
        }

        let mut buf = [0u8; MAX_FRAME];
        let rx = buf.get_mut(..len).ok_or(Error::<I2C::Error>::Framing {
            expected: len,
            actual: MAX_FRAME,
        })?;
        self.i2c.read(self.addr, rx)?;

        decode(cmd, rx)
    }
}

pub struct AsyncSensor<I2C, D> {
    i2c: I2C,
    delay: D,
    addr: u8,
}

impl<I2C, D> AsyncSensor<I2C, D> {
    pub fn new(i2c: I2C, delay: D, addr: u8) -> Self {
        Self { i2c, delay, addr }
    }

    pub fn addr(&self) -> u8 {
        self.addr
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C, D> AsyncSensor<I2C, D>
where
    I2C: embedded_hal_async::i2c::I2c,
    D: embedded_hal_async::delay::DelayNs,
{
    pub async fn execute<C: Command>(
        &mut self,
        cmd: &C,
    ) -> Result<C::Response, Error<I2C::Error>> {
        let request = encode::<C, I2C::Error>(cmd)?;
        log::trace!(
            "command {:#06x}: write {:?} bytes, read {:?} bytes",
            id_of::<C>(),
            request.write.as_ref().map(|w| w.len()),
            request.read_length
        );

        let response = self.transceive(cmd, &request).await;
        if request.timing.post_processing_us > 0 {
            self.delay.delay_us(request.timing.post_processing_us).await;
        }
        response
    }

    async fn transceive<C: Command>(
        &mut self,
        cmd: &C,
        request: &Request,
    ) -> Result<C::Response, Error<I2C::Error>> {
        if let Some(write) = &request.write {
            self.i2c.write(self.addr, write).await?;
        }

        let Some(len) = request.read_length else {
            return cmd.interpret(&[]);
        };

        if request.timing.read_delay_us > 0 {
            self.delay.delay_us(request.timing.read_delay_us).await;
        }

        let mut buf = [0u8; MAX_FRAME];
        let rx = buf.get_mut(..len).ok_or(Error::<I2C::Error>::Framing {
            expected: len,
            actual: MAX_FRAME,
        })?;
        self.i2c.read(self.addr, rx).await?;

        decode(cmd, rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_utils::{DummyBus, DummyDelay, DummyError};

    struct ReadWord;

    impl Command for ReadWord {
        type Response = u16;
        const ID: Option<Cmd> = Some([0x12, 0x34]);
        const RX_LENGTH: Option<usize> = Some(3);
        const TIMING: Timing = Timing::read(1_000);

        fn interpret<E>(&self, checked: &[u8]) -> Result<u16, Error<E>> {
            match checked {
                [msb, lsb] => Ok(u16::from_be_bytes([*msb, *lsb])),
                _ => Err(Error::InvalidResponse),
            }
        }
    }

    struct WriteBytes(&'static [u8]);

    impl Command for WriteBytes {
        type Response = ();
        const ID: Option<Cmd> = None;
        const RX_LENGTH: Option<usize> = None;
        const TIMING: Timing = Timing::settle(50_000);
        const GROUP_SIZE: usize = 1;

        fn tx_data<E>(&self) -> Result<Option<Payload>, Error<E>> {
            Payload::from_slice(self.0).map(Some).map_err(|_| Error::Encoding)
        }

        fn interpret<E>(&self, _checked: &[u8]) -> Result<(), Error<E>> {
            Ok(())
        }
    }

    struct Silent;

    impl Command for Silent {
        type Response = ();
        const ID: Option<Cmd> = None;
        const RX_LENGTH: Option<usize> = Some(0);
        const TIMING: Timing = Timing::read(0);

        fn tx_data<E>(&self) -> Result<Option<Payload>, Error<E>> {
            Ok(None)
        }

        fn interpret<E>(&self, _checked: &[u8]) -> Result<(), Error<E>> {
            Ok(())
        }
    }

    #[test]
    fn test_check_crc() {
        assert_eq!(
            strip_crc::<DummyError>(&SENSIRION, 2, &[0xbe, 0xef, 0x92]).as_deref(),
            Ok(&[0xbe, 0xef][..])
        );
        assert_eq!(
            strip_crc::<DummyError>(&SENSIRION, 2, &[0xbe, 0x01, 0x92]),
            Err(Error::InvalidCrc { offset: 0 })
        );
    }

    #[test]
    fn test_strip_crc_reports_failing_group() {
        let rx = [0x00, 0x00, 0x81, 0xbe, 0xef, 0x92, 0x00, 0x00, 0x80];
        assert_eq!(
            strip_crc::<DummyError>(&SENSIRION, 2, &rx),
            Err(Error::InvalidCrc { offset: 6 })
        );
    }

    #[test]
    fn test_strip_crc_partial_group() {
        assert_eq!(
            strip_crc::<DummyError>(&SENSIRION, 2, &[0xbe, 0xef, 0x92, 0x00]),
            Err(Error::Framing {
                expected: 6,
                actual: 4
            })
        );
    }

    #[test]
    fn test_add_crc_single_byte_groups() {
        let mut frame = Frame::new();
        add_crc::<DummyError>(&SENSIRION, 1, &[0x00, 0xbe], &mut frame).unwrap();
        let expected = [0x00, SENSIRION.compute(&[0x00]), 0xbe, SENSIRION.compute(&[0xbe])];
        assert_eq!(frame.as_slice(), &expected);
        assert_eq!(expected[1], 0xac);
    }

    #[test]
    fn test_add_crc_rejects_partial_group() {
        let mut frame = Frame::new();
        assert_eq!(
            add_crc::<DummyError>(&SENSIRION, 2, &[0x01, 0x02, 0x03], &mut frame),
            Err(Error::Encoding)
        );
    }

    #[test]
    fn test_encode() {
        let request = encode::<_, DummyError>(&ReadWord).unwrap();
        assert_eq!(request.write.as_deref(), Some(&[0x12, 0x34][..]));
        assert_eq!(request.read_length, Some(3));
        assert_eq!(request.timing.read_delay_us, 1_000);

        let request = encode::<_, DummyError>(&WriteBytes(&[0xbe])).unwrap();
        assert_eq!(request.write.as_deref(), Some(&[0xbe, 0x0c][..]));
        assert_eq!(request.write.unwrap()[1], SENSIRION.compute(&[0xbe]));

        let request = encode::<_, DummyError>(&WriteBytes(&[])).unwrap();
        assert_eq!(request.write.as_deref(), Some(&[][..]));

        let request = encode::<_, DummyError>(&Silent).unwrap();
        assert_eq!(request.write, None);
        assert_eq!(request.read_length, Some(0));
    }

    #[test]
    fn test_decode_length_mismatch() {
        assert_eq!(
            decode::<_, DummyError>(&ReadWord, &[0xbe, 0xef]),
            Err(Error::Framing {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(
            decode::<_, DummyError>(&ReadWord, &[0xbe, 0xef, 0x92, 0x00, 0x00, 0x81]),
            Err(Error::Framing {
                expected: 3,
                actual: 6
            })
        );
        assert_eq!(decode::<_, DummyError>(&ReadWord, &[0xbe, 0xef, 0x92]), Ok(0xbeef));
    }

    #[test]
    fn test_execute() {
        let bus = DummyBus::new(&[0xbe, 0xef, 0x92]);
        let mut sensor = Sensor::new(bus, DummyDelay::default(), 0x6a);

        assert_eq!(sensor.execute(&ReadWord), Ok(0xbeef));

        let (bus, delay) = sensor.release();
        assert_eq!(bus.written, [vec![0x12, 0x34]]);
        assert_eq!(bus.reads, 1);
        assert_eq!(delay.total_us(), 1_000);
    }

    #[test]
    fn test_execute_crc_error() {
        let bus = DummyBus::new(&[0xbe, 0xef, 0x93]);
        let mut sensor = Sensor::new(bus, DummyDelay::default(), 0x6a);

        assert_eq!(
            sensor.execute(&ReadWord),
            Err(Error::InvalidCrc { offset: 0 })
        );
    }

    #[test]
    fn test_execute_bus_error() {
        let bus = DummyBus::failing();
        let mut sensor = Sensor::new(bus, DummyDelay::default(), 0x6a);

        assert_eq!(
            sensor.execute(&WriteBytes(&[0x01])),
            Err(Error::I2c(DummyError::Nack))
        );
        // The busy window is observed even when the bus failed.
        let (_, delay) = sensor.release();
        assert_eq!(delay.total_us(), 50_000);
    }

    #[test]
    fn test_execute_write_only() {
        let bus = DummyBus::new(&[]);
        let mut sensor = Sensor::new(bus, DummyDelay::default(), 0x6a);

        assert_eq!(sensor.execute(&WriteBytes(&[0xbe, 0xef])), Ok(()));

        let (bus, delay) = sensor.release();
        assert_eq!(bus.written, [vec![0xbe, 0x0c, 0xef, 0x43]]);
        assert_eq!(bus.reads, 0);
        assert_eq!(delay.total_us(), 50_000);
    }

    #[test]
    fn test_execute_empty_read() {
        let bus = DummyBus::new(&[]);
        let mut sensor = Sensor::new(bus, DummyDelay::default(), 0x6a);

        assert_eq!(sensor.execute(&Silent), Ok(()));

        let (bus, _) = sensor.release();
        assert!(bus.written.is_empty());
        assert_eq!(bus.reads, 1);
    }

    #[test]
    fn test_execute_async() {
        let bus = DummyBus::new(&[0xbe, 0xef, 0x92]);
        let mut sensor = AsyncSensor::new(bus, DummyDelay::default(), 0x6a);

        assert_eq!(
            embassy_futures::block_on(sensor.execute(&ReadWord)),
            Ok(0xbeef)
        );

        let (bus, delay) = sensor.release();
        assert_eq!(bus.written, [vec![0x12, 0x34]]);
        assert_eq!(delay.total_us(), 1_000);
    }

    #[test]
    fn test_error_kind() {
        use embedded_hal::i2c::{Error as _, ErrorKind, NoAcknowledgeSource};

        assert_eq!(
            Error::I2c(DummyError::Nack).kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown)
        );
        assert_eq!(
            Error::<DummyError>::InvalidCrc { offset: 3 }.kind(),
            ErrorKind::Other
        );
    }
}
