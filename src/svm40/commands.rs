use crate::sensirion::{Cmd, Command, Error, Payload, Timing};

use super::types::*;
use super::units;

// Basic commands
pub const START_CONTINUOUS_MEASUREMENT: Cmd = [0x00, 0x10];
pub const STOP_MEASUREMENT: Cmd = [0x01, 0x04];
pub const READ_MEASURED_VALUES: Cmd = [0x03, 0xa6];
pub const READ_MEASURED_VALUES_RAW: Cmd = [0x03, 0xb0];

// Customer engine parameters
pub const TEMPERATURE_OFFSET: Cmd = [0x60, 0x14];
pub const VOC_TUNING_PARAMETERS: Cmd = [0x60, 0x83];
pub const VOC_STATE: Cmd = [0x61, 0x81];
pub const STORE_NV_DATA: Cmd = [0x60, 0x02];

// Device information
pub const GET_SERIAL_NUMBER: Cmd = [0xd0, 0x33];
pub const GET_VERSION: Cmd = [0xd1, 0x00];
pub const DEVICE_RESET: Cmd = [0xd3, 0x04];

const READ_DELAY_US: u32 = 1_000;

fn words<const N: usize, E>(checked: &[u8]) -> Result<[i16; N], Error<E>> {
    if checked.len() != N * 2 {
        return Err(Error::InvalidResponse);
    }

    let mut words = [0i16; N];
    for (word, bytes) in words.iter_mut().zip(checked.chunks_exact(2)) {
        *word = i16::from_be_bytes([bytes[0], bytes[1]]);
    }
    Ok(words)
}

fn payload<E>(data: &[u8]) -> Result<Option<Payload>, Error<E>> {
    Payload::from_slice(data)
        .map(Some)
        .map_err(|_| Error::Encoding)
}

macro_rules! fire_and_forget {
    ($name:ident, $id:expr, $post_processing_us:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name;

        impl Command for $name {
            type Response = ();
            const ID: Option<Cmd> = Some($id);
            const RX_LENGTH: Option<usize> = None;
            const TIMING: Timing = Timing::settle($post_processing_us);

            fn interpret<E>(&self, _checked: &[u8]) -> Result<(), Error<E>> {
                Ok(())
            }
        }
    };
}

fire_and_forget!(DeviceReset, DEVICE_RESET, 100_000);
fire_and_forget!(StartContinuousMeasurement, START_CONTINUOUS_MEASUREMENT, 1_000);
fire_and_forget!(StopMeasurement, STOP_MEASUREMENT, 50_000);
fire_and_forget!(StoreNvData, STORE_NV_DATA, 500_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetSerialNumber;

impl Command for GetSerialNumber {
    type Response = SerialNumber;
    const ID: Option<Cmd> = Some(GET_SERIAL_NUMBER);
    const RX_LENGTH: Option<usize> = Some(39);
    const TIMING: Timing = Timing::read(READ_DELAY_US);

    fn interpret<E>(&self, checked: &[u8]) -> Result<SerialNumber, Error<E>> {
        let end = checked
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |last| last + 1);
        let text =
            core::str::from_utf8(&checked[..end]).map_err(|_| Error::<E>::InvalidResponse)?;

        SerialNumber::try_from(text).map_err(|_| Error::InvalidResponse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetVersion;

impl Command for GetVersion {
    type Response = Version;
    const ID: Option<Cmd> = Some(GET_VERSION);
    const RX_LENGTH: Option<usize> = Some(12);
    const TIMING: Timing = Timing::read(READ_DELAY_US);

    fn interpret<E>(&self, checked: &[u8]) -> Result<Version, Error<E>> {
        // Last byte is reserved.
        let &[fw_major, fw_minor, fw_debug, hw_major, hw_minor, proto_major, proto_minor, _] =
            checked
        else {
            return Err(Error::InvalidResponse);
        };

        Ok(Version {
            firmware: FirmwareVersion {
                major: fw_major,
                minor: fw_minor,
                debug: fw_debug != 0,
            },
            hardware: HardwareVersion {
                major: hw_major,
                minor: hw_minor,
            },
            protocol: ProtocolVersion {
                major: proto_major,
                minor: proto_minor,
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadMeasuredValues;

impl Command for ReadMeasuredValues {
    type Response = Measurement;
    const ID: Option<Cmd> = Some(READ_MEASURED_VALUES);
    const RX_LENGTH: Option<usize> = Some(9);
    const TIMING: Timing = Timing::read(READ_DELAY_US);

    fn interpret<E>(&self, checked: &[u8]) -> Result<Measurement, Error<E>> {
        let [air_quality, humidity, temperature] = words::<3, E>(checked)?;

        Ok(Measurement {
            air_quality: AirQuality::from_ticks(air_quality),
            humidity: Humidity::from_ticks(humidity),
            temperature: Temperature::from_ticks(temperature),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadMeasuredValuesRaw;

impl Command for ReadMeasuredValuesRaw {
    type Response = RawMeasurement;
    const ID: Option<Cmd> = Some(READ_MEASURED_VALUES_RAW);
    const RX_LENGTH: Option<usize> = Some(18);
    const TIMING: Timing = Timing::read(READ_DELAY_US);

    fn interpret<E>(&self, checked: &[u8]) -> Result<RawMeasurement, Error<E>> {
        let [air_quality, humidity, temperature, raw_voc, raw_humidity, raw_temperature] =
            words::<6, E>(checked)?;

        Ok(RawMeasurement {
            air_quality: AirQuality::from_ticks(air_quality),
            humidity: Humidity::from_ticks(humidity),
            temperature: Temperature::from_ticks(temperature),
            raw_voc_ticks: raw_voc,
            raw_humidity: Humidity::from_ticks(raw_humidity),
            raw_temperature: Temperature::from_ticks(raw_temperature),
        })
    }
}

/// Reads the T-offset of the RHT compensation, in °C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetTemperatureOffset;

impl Command for GetTemperatureOffset {
    type Response = f32;
    const ID: Option<Cmd> = Some(TEMPERATURE_OFFSET);
    const RX_LENGTH: Option<usize> = Some(3);
    const TIMING: Timing = Timing::read(READ_DELAY_US);

    fn interpret<E>(&self, checked: &[u8]) -> Result<f32, Error<E>> {
        let [ticks] = words::<1, E>(checked)?;
        Ok(units::temperature_offset_from_ticks(ticks))
    }
}

/// Sets the T-offset of the RHT compensation, in °C. Volatile until [`StoreNvData`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SetTemperatureOffset(pub f32);

impl Command for SetTemperatureOffset {
    type Response = ();
    const ID: Option<Cmd> = Some(TEMPERATURE_OFFSET);
    const RX_LENGTH: Option<usize> = None;
    const TIMING: Timing = Timing::settle(1_000);

    fn tx_data<E>(&self) -> Result<Option<Payload>, Error<E>> {
        let ticks = units::temperature_offset_to_ticks(self.0).ok_or(Error::<E>::Encoding)?;
        payload(&ticks.to_be_bytes())
    }

    fn interpret<E>(&self, _checked: &[u8]) -> Result<(), Error<E>> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetVocTuningParameters;

impl Command for GetVocTuningParameters {
    type Response = VocTuningParameters;
    const ID: Option<Cmd> = Some(VOC_TUNING_PARAMETERS);
    const RX_LENGTH: Option<usize> = Some(12);
    const TIMING: Timing = Timing::read(READ_DELAY_US);

    fn interpret<E>(&self, checked: &[u8]) -> Result<VocTuningParameters, Error<E>> {
        let [
            voc_index_offset,
            learning_time_hours,
            gating_max_duration_minutes,
            std_initial,
        ] = words::<4, E>(checked)?;

        Ok(VocTuningParameters {
            voc_index_offset,
            learning_time_hours,
            gating_max_duration_minutes,
            std_initial,
        })
    }
}

/// Only accepted in idle mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetVocTuningParameters(pub VocTuningParameters);

impl Command for SetVocTuningParameters {
    type Response = ();
    const ID: Option<Cmd> = Some(VOC_TUNING_PARAMETERS);
    const RX_LENGTH: Option<usize> = None;
    const TIMING: Timing = Timing::settle(1_000);

    fn tx_data<E>(&self) -> Result<Option<Payload>, Error<E>> {
        let p = &self.0;
        let mut data = [0u8; 8];
        for (bytes, word) in data.chunks_exact_mut(2).zip([
            p.voc_index_offset,
            p.learning_time_hours,
            p.gating_max_duration_minutes,
            p.std_initial,
        ]) {
            bytes.copy_from_slice(&word.to_be_bytes());
        }
        payload(&data)
    }

    fn interpret<E>(&self, _checked: &[u8]) -> Result<(), Error<E>> {
        Ok(())
    }
}

/// Only accepted in measurement mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GetVocState;

impl Command for GetVocState {
    type Response = VocState;
    const ID: Option<Cmd> = Some(VOC_STATE);
    const RX_LENGTH: Option<usize> = Some(12);
    const TIMING: Timing = Timing::read(READ_DELAY_US);

    fn interpret<E>(&self, checked: &[u8]) -> Result<VocState, Error<E>> {
        checked
            .try_into()
            .map(VocState)
            .map_err(|_| Error::InvalidResponse)
    }
}

/// Only accepted in idle mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetVocState(pub VocState);

impl Command for SetVocState {
    type Response = ();
    const ID: Option<Cmd> = Some(VOC_STATE);
    const RX_LENGTH: Option<usize> = None;
    const TIMING: Timing = Timing::settle(1_000);

    fn tx_data<E>(&self) -> Result<Option<Payload>, Error<E>> {
        payload(&self.0.0)
    }

    fn interpret<E>(&self, _checked: &[u8]) -> Result<(), Error<E>> {
        Ok(())
    }
}
