//! Fixed-point scaling between device ticks and physical units.

/// Largest temperature offset magnitude the device accepts, in °C.
pub const TEMPERATURE_OFFSET_LIMIT: f32 = 30.0;

const VOC_INDEX_SCALE: f32 = 10.0;
const HUMIDITY_SCALE: f32 = 100.0;
const TEMPERATURE_SCALE: f32 = 200.0;

pub fn voc_index(ticks: i16) -> f32 {
    f32::from(ticks) / VOC_INDEX_SCALE
}

pub fn percent_rh(ticks: i16) -> f32 {
    f32::from(ticks) / HUMIDITY_SCALE
}

pub fn degrees_celsius(ticks: i16) -> f32 {
    f32::from(ticks) / TEMPERATURE_SCALE
}

pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn temperature_offset_from_ticks(ticks: i16) -> f32 {
    f32::from(ticks) / TEMPERATURE_SCALE
}

/// Scales an offset in °C to device ticks, rounding half away from zero.
/// Returns `None` outside of ±[`TEMPERATURE_OFFSET_LIMIT`] or for NaN.
pub fn temperature_offset_to_ticks(celsius: f32) -> Option<i16> {
    if !(-TEMPERATURE_OFFSET_LIMIT..=TEMPERATURE_OFFSET_LIMIT).contains(&celsius) {
        return None;
    }

    let scaled = celsius * TEMPERATURE_SCALE;
    let rounded = if scaled < 0.0 {
        scaled - 0.5
    } else {
        scaled + 0.5
    };

    // |rounded| <= 6000.5, the cast truncates toward zero.
    Some(rounded as i16)
}
