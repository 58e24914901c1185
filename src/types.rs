use core::fmt;

/// SEN5x sensor data.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sen5xData {
    /// Mass Concentration PM1.0 [μg/m³]
    pub pm1_0: f32,
    /// Mass Concentration PM2.5 [μg/m³]
    pub pm2_5: f32,
    /// Mass Concentration PM4.0 [μg/m³]
    pub pm4_0: f32,
    /// Mass Concentration PM10 [μg/m³]
    pub pm10_0: f32,
    /// Compensated Ambient Humidity [%RH]
    pub humidity: f32,
    /// Compensated Ambient Temperature [°C]
    pub temperature: f32,
    /// VOC Index
    pub voc_index: f32,
    /// NOx Index
    pub nox_index: f32,
}

/// SEN5x sensor raw data.
///
/// Unsigned fields read `0xFFFF` and signed fields read `0x7FFF` while the
/// device has no value for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sen5xDataRaw {
    /// Mass Concentration PM1.0 [μg/m³] [×10]
    pub pm1_0: u16,
    /// Mass Concentration PM2.5 [μg/m³] [×10]
    pub pm2_5: u16,
    /// Mass Concentration PM4.0 [μg/m³] [×10]
    pub pm4_0: u16,
    /// Mass Concentration PM10.0 [μg/m³] [×10]
    pub pm10_0: u16,
    /// Compensated Ambient Humidity [%RH] [×100]
    pub humidity: i16,
    /// Compensated Ambient Temperature [°C] [×200]
    pub temperature: i16,
    /// VOC Index [×10]
    pub voc_index: i16,
    /// NOx Index [×10]
    pub nox_index: i16,
}

impl Sen5xDataRaw {
    /// Decodes the eight words of a "read measured values" reply.
    ///
    /// `buf` holds the reply including CRC bytes, already validated.
    pub(crate) fn from_words(buf: &[u8; 24]) -> Self {
        let word = |i| crate::word(buf, i);
        Self {
            pm1_0: word(0),
            pm2_5: word(1),
            pm4_0: word(2),
            pm10_0: word(3),
            humidity: word(4) as i16,
            temperature: word(5) as i16,
            voc_index: word(6) as i16,
            nox_index: word(7) as i16,
        }
    }
}

fn scale_unsigned(raw: u16, factor: f32) -> f32 {
    if raw == u16::MAX {
        f32::NAN
    } else {
        f32::from(raw) / factor
    }
}

fn scale_signed(raw: i16, factor: f32) -> f32 {
    if raw == i16::MAX {
        f32::NAN
    } else {
        f32::from(raw) / factor
    }
}

impl From<Sen5xDataRaw> for Sen5xData {
    fn from(raw: Sen5xDataRaw) -> Self {
        Self {
            pm1_0: scale_unsigned(raw.pm1_0, 10.0),
            pm2_5: scale_unsigned(raw.pm2_5, 10.0),
            pm4_0: scale_unsigned(raw.pm4_0, 10.0),
            pm10_0: scale_unsigned(raw.pm10_0, 10.0),
            humidity: scale_signed(raw.humidity, 100.0),
            temperature: scale_signed(raw.temperature, 200.0),
            voc_index: scale_signed(raw.voc_index, 10.0),
            nox_index: scale_signed(raw.nox_index, 10.0),
        }
    }
}

/// NUL-terminated ASCII string reported by the device (serial number,
/// product name).
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceString {
    bytes: [u8; 32],
    len: usize,
}

impl DeviceString {
    /// Takes the 32 payload bytes of a 16-word reply. Returns `None` if the
    /// text up to the first NUL is not valid UTF-8.
    pub fn from_bytes(bytes: [u8; 32]) -> Option<Self> {
        let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        core::str::from_utf8(&bytes[..len]).ok()?;
        Some(Self { bytes, len })
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
    }
}

impl fmt::Display for DeviceString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for DeviceString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

/// SEN5x device status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceStatus(pub u32);

impl DeviceStatus {
    const SPEED_WARNING: u32 = 1 << 21;
    const FAN_CLEANING: u32 = 1 << 19;
    const GAS_SENSOR_ERROR: u32 = 1 << 7;
    const RHT_ERROR: u32 = 1 << 6;
    const LASER_FAILURE: u32 = 1 << 5;
    const FAN_FAILURE: u32 = 1 << 4;

    /// Fan speed is more than 10% off its target.
    pub fn fan_speed_warning(&self) -> bool {
        self.0 & Self::SPEED_WARNING != 0
    }

    pub fn fan_cleaning_active(&self) -> bool {
        self.0 & Self::FAN_CLEANING != 0
    }

    /// SGP sensor error (SEN54/SEN55 only).
    pub fn gas_sensor_error(&self) -> bool {
        self.0 & Self::GAS_SENSOR_ERROR != 0
    }

    /// SHT sensor communication error.
    pub fn rht_error(&self) -> bool {
        self.0 & Self::RHT_ERROR != 0
    }

    pub fn laser_failure(&self) -> bool {
        self.0 & Self::LASER_FAILURE != 0
    }

    /// Fan is mechanically blocked or broken.
    pub fn fan_failure(&self) -> bool {
        self.0 & Self::FAN_FAILURE != 0
    }

    /// Any of the error bits is set. Warnings and fan cleaning do not count.
    pub fn has_error(&self) -> bool {
        self.0 & (Self::GAS_SENSOR_ERROR | Self::RHT_ERROR | Self::LASER_FAILURE | Self::FAN_FAILURE)
            != 0
    }
}

/// Temperature compensation parameters.
///
/// The compensated temperature is
/// `T = T_raw + offset + slope * T_raw`, smoothed with `time_constant`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureCompensation {
    /// Temperature offset [°C]
    pub offset: f32,
    /// Normalized temperature offset slope
    pub slope: f32,
    /// Time constant [s], 0 applies changes immediately
    pub time_constant: u16,
}

impl TemperatureCompensation {
    const OFFSET_SCALE: f32 = 200.0;
    const SLOPE_SCALE: f32 = 10_000.0;

    /// Constant offset only, as set by "set temperature offset simple".
    pub fn offset_only(offset: f32) -> Self {
        Self {
            offset,
            slope: 0.0,
            time_constant: 0,
        }
    }

    /// Encodes the parameters, `None` if offset or slope is `NaN` or does
    /// not fit the device's signed 16-bit fields (offset ±163.8 °C, slope
    /// ±3.27).
    pub(crate) fn to_words(self) -> Option<[u16; 3]> {
        Some([
            scale_to_word(self.offset, Self::OFFSET_SCALE)?,
            scale_to_word(self.slope, Self::SLOPE_SCALE)?,
            self.time_constant,
        ])
    }

    pub(crate) fn from_words(words: [u16; 3]) -> Self {
        Self {
            offset: f32::from(words[0] as i16) / Self::OFFSET_SCALE,
            slope: f32::from(words[1] as i16) / Self::SLOPE_SCALE,
            time_constant: words[2],
        }
    }
}

fn scale_to_word(value: f32, factor: f32) -> Option<u16> {
    let scaled = value * factor;
    if scaled >= f32::from(i16::MIN) && scaled <= f32::from(i16::MAX) {
        Some(scaled as i16 as u16)
    } else {
        None
    }
}

/// Measurement mode of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasurementMode {
    Idle,
    /// All values, fan and laser running.
    Measuring,
    /// Humidity, temperature and gas indices only, fan and laser off.
    RhtGasOnly,
}

/// Humidity/temperature acceleration mode, the response speed of the RHT
/// compensation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RhtAccelerationMode {
    Low,
    High,
    Medium,
}

impl RhtAccelerationMode {
    pub(crate) fn to_word(self) -> u16 {
        match self {
            Self::Low => 0,
            Self::High => 1,
            Self::Medium => 2,
        }
    }

    /// Unknown values are reported as `Low`, the power-on default.
    pub(crate) fn from_word(word: u16) -> Self {
        match word {
            1 => Self::High,
            2 => Self::Medium,
            _ => Self::Low,
        }
    }
}
