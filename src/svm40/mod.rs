use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::sensirion::*;

pub mod commands;
pub mod types;
pub mod units;

pub use types::*;

pub const ADDR: u8 = 0x6a;

/// SVM40 evaluation module: VOC index, humidity and temperature.
pub struct Svm40<I2C, D> {
    sensor: Sensor<I2C, D>,
}

impl<I2C, D> Svm40<I2C, D> {
    pub fn release(self) -> (I2C, D) {
        self.sensor.release()
    }
}

impl<I2C: I2c, D: DelayNs> Svm40<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, ADDR)
    }

    pub fn with_address(i2c: I2C, delay: D, addr: u8) -> Self {
        Self {
            sensor: Sensor::new(i2c, delay, addr),
        }
    }

    /// Reboots the firmware, similar to a power cycle.
    pub fn device_reset(&mut self) -> Result<(), Error<I2C::Error>> {
        self.sensor.execute(&commands::DeviceReset)
    }

    pub fn get_serial_number(&mut self) -> Result<SerialNumber, Error<I2C::Error>> {
        self.sensor.execute(&commands::GetSerialNumber)
    }

    /// Firmware, hardware and protocol version.
    pub fn get_version(&mut self) -> Result<Version, Error<I2C::Error>> {
        self.sensor.execute(&commands::GetVersion)
    }

    /// Starts continuous measurement in polling mode. Only available in idle mode.
    pub fn start_measurement(&mut self) -> Result<(), Error<I2C::Error>> {
        self.sensor.execute(&commands::StartContinuousMeasurement)
    }

    /// Leaves measurement mode and returns to idle mode.
    pub fn stop_measurement(&mut self) -> Result<(), Error<I2C::Error>> {
        self.sensor.execute(&commands::StopMeasurement)
    }

    /// Reads the latest results. The firmware updates them every second, the
    /// first one is available 1 s after starting. Earlier reads return zeros.
    pub fn read_measured_values(&mut self) -> Result<Measurement, Error<I2C::Error>> {
        self.sensor.execute(&commands::ReadMeasuredValues)
    }

    /// Like [`Self::read_measured_values`], with the uncompensated values added.
    pub fn read_measured_values_raw(&mut self) -> Result<RawMeasurement, Error<I2C::Error>> {
        self.sensor.execute(&commands::ReadMeasuredValuesRaw)
    }

    /// Temperature offset for RHT measurements, in °C.
    pub fn get_compensation_temperature_offset(&mut self) -> Result<f32, Error<I2C::Error>> {
        self.sensor.execute(&commands::GetTemperatureOffset)
    }

    /// Not persisted across a reset unless followed by [`Self::store_nv_data`].
    pub fn set_compensation_temperature_offset(
        &mut self,
        t_offset: f32,
    ) -> Result<(), Error<I2C::Error>> {
        self.sensor
            .execute(&commands::SetTemperatureOffset(t_offset))
    }

    pub fn get_voc_tuning_parameters(&mut self) -> Result<VocTuningParameters, Error<I2C::Error>> {
        self.sensor.execute(&commands::GetVocTuningParameters)
    }

    /// Only available in idle mode. Not persisted unless followed by [`Self::store_nv_data`].
    pub fn set_voc_tuning_parameters(
        &mut self,
        params: VocTuningParameters,
    ) -> Result<(), Error<I2C::Error>> {
        self.sensor
            .execute(&commands::SetVocTuningParameters(params))
    }

    /// Stores all customer engine parameters in non-volatile memory.
    pub fn store_nv_data(&mut self) -> Result<(), Error<I2C::Error>> {
        self.sensor.execute(&commands::StoreNvData)
    }

    /// Only available in measurement mode, after at least 3 hours of operation.
    pub fn get_voc_state(&mut self) -> Result<VocState, Error<I2C::Error>> {
        self.sensor.execute(&commands::GetVocState)
    }

    /// Restores a state read with [`Self::get_voc_state`]. Only available in
    /// idle mode, and not meant for interruptions longer than 10 minutes.
    pub fn set_voc_state(&mut self, state: VocState) -> Result<(), Error<I2C::Error>> {
        self.sensor.execute(&commands::SetVocState(state))
    }
}

pub struct Svm40Async<I2C, D> {
    sensor: AsyncSensor<I2C, D>,
}

impl<I2C, D> Svm40Async<I2C, D> {
    pub fn release(self) -> (I2C, D) {
        self.sensor.release()
    }
}

impl<I2C, D> Svm40Async<I2C, D>
where
    I2C: embedded_hal_async::i2c::I2c,
    D: embedded_hal_async::delay::DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, ADDR)
    }

    pub fn with_address(i2c: I2C, delay: D, addr: u8) -> Self {
        Self {
            sensor: AsyncSensor::new(i2c, delay, addr),
        }
    }

    pub async fn device_reset(&mut self) -> Result<(), Error<I2C::Error>> {
        self.sensor.execute(&commands::DeviceReset).await
    }

    pub async fn get_serial_number(&mut self) -> Result<SerialNumber, Error<I2C::Error>> {
        self.sensor.execute(&commands::GetSerialNumber).await
    }

    pub async fn get_version(&mut self) -> Result<Version, Error<I2C::Error>> {
        self.sensor.execute(&commands::GetVersion).await
    }

    pub async fn start_measurement(&mut self) -> Result<(), Error<I2C::Error>> {
        self.sensor
            .execute(&commands::StartContinuousMeasurement)
            .await
    }

    pub async fn stop_measurement(&mut self) -> Result<(), Error<I2C::Error>> {
        self.sensor.execute(&commands::StopMeasurement).await
    }

    pub async fn read_measured_values(&mut self) -> Result<Measurement, Error<I2C::Error>> {
        self.sensor.execute(&commands::ReadMeasuredValues).await
    }

    pub async fn read_measured_values_raw(
        &mut self,
    ) -> Result<RawMeasurement, Error<I2C::Error>> {
        self.sensor.execute(&commands::ReadMeasuredValuesRaw).await
    }

    pub async fn get_compensation_temperature_offset(
        &mut self,
    ) -> Result<f32, Error<I2C::Error>> {
        self.sensor.execute(&commands::GetTemperatureOffset).await
    }

    pub async fn set_compensation_temperature_offset(
        &mut self,
        t_offset: f32,
    ) -> Result<(), Error<I2C::Error>> {
        self.sensor
            .execute(&commands::SetTemperatureOffset(t_offset))
            .await
    }

    pub async fn get_voc_tuning_parameters(
        &mut self,
    ) -> Result<VocTuningParameters, Error<I2C::Error>> {
        self.sensor.execute(&commands::GetVocTuningParameters).await
    }

    pub async fn set_voc_tuning_parameters(
        &mut self,
        params: VocTuningParameters,
    ) -> Result<(), Error<I2C::Error>> {
        self.sensor
            .execute(&commands::SetVocTuningParameters(params))
            .await
    }

    pub async fn store_nv_data(&mut self) -> Result<(), Error<I2C::Error>> {
        self.sensor.execute(&commands::StoreNvData).await
    }

    pub async fn get_voc_state(&mut self) -> Result<VocState, Error<I2C::Error>> {
        self.sensor.execute(&commands::GetVocState).await
    }

    pub async fn set_voc_state(&mut self, state: VocState) -> Result<(), Error<I2C::Error>> {
        self.sensor.execute(&commands::SetVocState(state)).await
    }
}
