use core::fmt;

use super::units;

/// Serial number as reported by the device, an ASCII string of up to 26 characters.
pub type SerialNumber = heapless::String<26>;

/// VOC index reading. `ticks` is the value as received from the device.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AirQuality {
    pub ticks: i16,
    pub voc_index: f32,
}

impl AirQuality {
    pub fn from_ticks(ticks: i16) -> Self {
        Self {
            ticks,
            voc_index: units::voc_index(ticks),
        }
    }
}

impl fmt::Display for AirQuality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "VOC index = {:.1}", self.voc_index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Humidity {
    pub ticks: i16,
    pub percent_rh: f32,
}

impl Humidity {
    pub fn from_ticks(ticks: i16) -> Self {
        Self {
            ticks,
            percent_rh: units::percent_rh(ticks),
        }
    }
}

impl fmt::Display for Humidity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.1} %RH", self.percent_rh)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Temperature {
    pub ticks: i16,
    pub degrees_celsius: f32,
    pub degrees_fahrenheit: f32,
}

impl Temperature {
    pub fn from_ticks(ticks: i16) -> Self {
        let degrees_celsius = units::degrees_celsius(ticks);
        Self {
            ticks,
            degrees_celsius,
            degrees_fahrenheit: units::celsius_to_fahrenheit(degrees_celsius),
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.1} °C", self.degrees_celsius)
    }
}

/// Compensated output of the sensor module.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurement {
    pub air_quality: AirQuality,
    pub humidity: Humidity,
    pub temperature: Temperature,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}, {}, {}", self.air_quality, self.humidity, self.temperature)
    }
}

/// Compensated output plus the values before algorithm compensation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawMeasurement {
    pub air_quality: AirQuality,
    pub humidity: Humidity,
    pub temperature: Temperature,
    /// Raw SGP signal, not converted.
    pub raw_voc_ticks: i16,
    pub raw_humidity: Humidity,
    pub raw_temperature: Temperature,
}

impl RawMeasurement {
    pub fn measurement(&self) -> Measurement {
        Measurement {
            air_quality: self.air_quality,
            humidity: self.humidity,
            temperature: self.temperature,
        }
    }
}

impl fmt::Display for RawMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} [raw] voc ticks={}, humidity={}, temperature={}",
            self.measurement(),
            self.raw_voc_ticks,
            self.raw_humidity,
            self.raw_temperature
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    /// Set for non-release builds.
    pub debug: bool,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if self.debug {
            f.write_str("-debug")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct HardwareVersion {
    pub major: u8,
    pub minor: u8,
}

impl fmt::Display for HardwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Version {
    pub firmware: FirmwareVersion,
    pub hardware: HardwareVersion,
    pub protocol: ProtocolVersion,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Firmware {}, Hardware {}, Protocol {}",
            self.firmware, self.hardware, self.protocol
        )
    }
}

/// Parameters customizing the VOC algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VocTuningParameters {
    /// VOC index representing typical (average) conditions.
    pub voc_index_offset: i16,
    /// Time constant of the long-term estimator. Past events are forgotten
    /// after about twice the learning time.
    pub learning_time_hours: i16,
    /// Maximum duration of gating (freeze of the estimator during high VOC
    /// index signal). Zero disables gating.
    pub gating_max_duration_minutes: i16,
    /// Initial estimate for the standard deviation.
    pub std_initial: i16,
}

impl Default for VocTuningParameters {
    fn default() -> Self {
        Self {
            voc_index_offset: 100,
            learning_time_hours: 12,
            gating_max_duration_minutes: 180,
            std_initial: 50,
        }
    }
}

/// Opaque VOC algorithm state, restored as read to skip the initial learning phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VocState(pub [u8; 8]);
