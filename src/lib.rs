//! Support crate for a cellular SEN5x air-quality node.
//!
//! * [`board`]: pin map of the ESP32-S3 modem board (modem UART, control
//!   lines, SD card SPI bus).
//! * [`modem`]: reset and power-key sequencing for the modem.
//! * [`Sen5x`]: `embedded-hal` driver for the Sensirion SEN5x environmental
//!   sensor node.
//! * [`monitor`]: best-effort wrapper that brings the sensor up and polls it,
//!   logging failures instead of returning them.
//! * [`stats`]: averaging helper.
//!
//! ```ignore
//! let sensor = Sen5x::new(&mut i2c, delay);
//! let mut monitor = Monitor::new(sensor);
//! monitor.begin();
//! if let Some(data) = monitor.get_readings() {
//!     log::info!("PM2.5: {} µg/m³", data.pm2_5);
//! }
//! ```
#![cfg_attr(not(test), no_std)]

pub mod board;
mod commands;
mod crc;
mod error;
pub mod modem;
pub mod monitor;
pub mod stats;
mod types;

use commands::Command;
use embedded_hal::{delay::DelayNs, i2c::I2c};
use sensirion_i2c::i2c;

pub use error::Error;
pub use monitor::{AirQualitySensor, InitReport, InitStep, Monitor};
pub use types::{
    DeviceStatus, DeviceString, MeasurementMode, RhtAccelerationMode, Sen5xData, Sen5xDataRaw,
    TemperatureCompensation,
};

const SEN5X_I2C_ADDRESS: u8 = 0x69;

/// Longest parameter write: command plus three words with CRC.
const MAX_WRITE_LEN: usize = 2 + 3 * 3;

/// SEN5x sensor instance. Use related methods to take measurements.
#[derive(Debug)]
pub struct Sen5x<I2C, D> {
    i2c: I2C,
    delay: D,
    mode: MeasurementMode,
}

impl<I2C, D, E> Sen5x<I2C, D>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
{
    /// Creates a driver. Pass `&mut bus` to keep ownership of the bus.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Sen5x {
            i2c,
            delay,
            mode: MeasurementMode::Idle,
        }
    }

    /// Start periodic measurement of all values. The first result is
    /// available after about one second.
    pub fn start_measurement(&mut self) -> Result<(), Error<E>> {
        self.write_command(Command::StartMeasurement)?;
        self.mode = MeasurementMode::Measuring;
        Ok(())
    }

    /// Start measurement without the PM sensor (fan and laser off).
    pub fn start_measurement_rht_gas_only(&mut self) -> Result<(), Error<E>> {
        self.write_command(Command::StartMeasurementRhtGasOnly)?;
        self.mode = MeasurementMode::RhtGasOnly;
        Ok(())
    }

    /// Stop measurement and return to idle mode.
    pub fn stop_measurement(&mut self) -> Result<(), Error<E>> {
        self.write_command(Command::StopMeasurement)?;
        self.mode = MeasurementMode::Idle;
        Ok(())
    }

    /// Whether new measurement values are ready to be read.
    pub fn data_ready(&mut self) -> Result<bool, Error<E>> {
        let mut buf = [0; 3];
        self.delayed_read(Command::ReadDataReady, &mut buf)?;
        Ok(buf[1] != 0)
    }

    /// Read the latest measured values without conversion.
    pub fn read_measured_values_raw(&mut self) -> Result<Sen5xDataRaw, Error<E>> {
        let mut buf = [0; 24];
        self.delayed_read(Command::ReadMeasuredValues, &mut buf)?;
        Ok(Sen5xDataRaw::from_words(&buf))
    }

    /// Read the latest measured values. Values the device does not know yet
    /// are `NaN`.
    pub fn read_measured_values(&mut self) -> Result<Sen5xData, Error<E>> {
        self.read_measured_values_raw().map(Sen5xData::from)
    }

    pub fn temperature_compensation(&mut self) -> Result<TemperatureCompensation, Error<E>> {
        let mut buf = [0; 9];
        self.delayed_read(Command::TemperatureCompensation, &mut buf)?;
        Ok(TemperatureCompensation::from_words([
            word(&buf, 0),
            word(&buf, 1),
            word(&buf, 2),
        ]))
    }

    /// Set the temperature compensation parameters. Applied to temperature
    /// and humidity readings; lost on device reset. Values that do not fit
    /// the device fields give [`Error::OutOfRange`] without touching the bus.
    pub fn set_temperature_compensation(
        &mut self,
        params: TemperatureCompensation,
    ) -> Result<(), Error<E>> {
        let words = params.to_words().ok_or(Error::OutOfRange)?;
        self.write_command_with_words(Command::TemperatureCompensation, &words)
    }

    /// Set a constant temperature offset in °C, clearing slope and time
    /// constant.
    pub fn set_temperature_offset_simple(&mut self, offset: f32) -> Result<(), Error<E>> {
        self.set_temperature_compensation(TemperatureCompensation::offset_only(offset))
    }

    pub fn warm_start(&mut self) -> Result<u16, Error<E>> {
        let mut buf = [0; 3];
        self.delayed_read(Command::WarmStart, &mut buf)?;
        Ok(word(&buf, 0))
    }

    /// Set the warm start parameter (0 cold, 65535 warm). Idle mode only.
    pub fn set_warm_start(&mut self, warm_start: u16) -> Result<(), Error<E>> {
        if self.is_measuring() {
            return Err(Error::NotAllowed);
        }
        self.write_command_with_words(Command::WarmStart, &[warm_start])
    }

    pub fn rht_acceleration_mode(&mut self) -> Result<RhtAccelerationMode, Error<E>> {
        let mut buf = [0; 3];
        self.delayed_read(Command::RhtAccelerationMode, &mut buf)?;
        Ok(RhtAccelerationMode::from_word(word(&buf, 0)))
    }

    /// Idle mode only.
    pub fn set_rht_acceleration_mode(&mut self, mode: RhtAccelerationMode) -> Result<(), Error<E>> {
        if self.is_measuring() {
            return Err(Error::NotAllowed);
        }
        self.write_command_with_words(Command::RhtAccelerationMode, &[mode.to_word()])
    }

    /// Run the fan at maximum speed for 10 seconds. Full measurement mode
    /// only, the fan is off in RHT/gas-only mode. No values are produced
    /// while cleaning.
    pub fn start_fan_cleaning(&mut self) -> Result<(), Error<E>> {
        if self.mode != MeasurementMode::Measuring {
            return Err(Error::NotAllowed);
        }
        self.write_command(Command::StartFanCleaning)
    }

    /// Automatic fan cleaning interval in seconds, 0 when disabled.
    pub fn auto_cleaning_interval(&mut self) -> Result<u32, Error<E>> {
        let mut buf = [0; 6];
        self.delayed_read(Command::AutoCleaningInterval, &mut buf)?;
        Ok((u32::from(word(&buf, 0)) << 16) | u32::from(word(&buf, 1)))
    }

    pub fn set_auto_cleaning_interval(&mut self, seconds: u32) -> Result<(), Error<E>> {
        let words = [(seconds >> 16) as u16, seconds as u16];
        self.write_command_with_words(Command::AutoCleaningInterval, &words)
    }

    /// Product name, e.g. `"SEN55"`.
    pub fn product_name(&mut self) -> Result<DeviceString, Error<E>> {
        self.read_string(Command::ProductName)
    }

    pub fn serial_number(&mut self) -> Result<DeviceString, Error<E>> {
        self.read_string(Command::SerialNumber)
    }

    pub fn firmware_version(&mut self) -> Result<u8, Error<E>> {
        let mut buf = [0; 3];
        self.delayed_read(Command::FirmwareVersion, &mut buf)?;
        Ok(buf[0])
    }

    pub fn device_status(&mut self) -> Result<DeviceStatus, Error<E>> {
        self.read_status(Command::ReadDeviceStatus)
    }

    /// Read the device status and clear all flags.
    pub fn read_and_clear_device_status(&mut self) -> Result<DeviceStatus, Error<E>> {
        self.read_status(Command::ReadAndClearDeviceStatus)
    }

    /// Reset the device. Same effect as a power cycle; the device returns to
    /// idle mode.
    pub fn device_reset(&mut self) -> Result<(), Error<E>> {
        self.write_command(Command::DeviceReset)?;
        self.mode = MeasurementMode::Idle;
        Ok(())
    }

    /// Mode the driver last put the device into.
    pub fn mode(&self) -> MeasurementMode {
        self.mode
    }

    /// Whether the device is in either measurement mode.
    pub fn is_measuring(&self) -> bool {
        self.mode != MeasurementMode::Idle
    }

    /// Destroys the driver and returns the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_string(&mut self, cmd: Command) -> Result<DeviceString, Error<E>> {
        let mut buf = [0; 48];
        self.delayed_read(cmd, &mut buf)?;

        let mut bytes = [0; 32];
        for (pair, chunk) in bytes.chunks_exact_mut(2).zip(buf.chunks_exact(3)) {
            pair.copy_from_slice(&chunk[..2]);
        }
        DeviceString::from_bytes(bytes).ok_or(Error::InvalidString)
    }

    fn read_status(&mut self, cmd: Command) -> Result<DeviceStatus, Error<E>> {
        let mut buf = [0; 6];
        self.delayed_read(cmd, &mut buf)?;
        Ok(DeviceStatus(
            (u32::from(word(&buf, 0)) << 16) | u32::from(word(&buf, 1)),
        ))
    }

    /// Command for reading values from the sensor.
    fn delayed_read(&mut self, cmd: Command, data: &mut [u8]) -> Result<(), Error<E>> {
        self.write_command(cmd)?;
        i2c::read_words_with_crc(&mut self.i2c, SEN5X_I2C_ADDRESS, data)?;
        Ok(())
    }

    /// Writes commands without additional arguments.
    fn write_command(&mut self, cmd: Command) -> Result<(), Error<E>> {
        let (command, delay) = cmd.as_tuple();
        log::debug!("SEN5x command {:#06x}", command);
        i2c::write_command_u16(&mut self.i2c, SEN5X_I2C_ADDRESS, command).map_err(Error::I2c)?;
        self.delay.delay_ms(delay);
        Ok(())
    }

    /// Writes commands followed by CRC-protected argument words.
    fn write_command_with_words(&mut self, cmd: Command, words: &[u16]) -> Result<(), Error<E>> {
        let (command, delay) = cmd.as_tuple();
        log::debug!("SEN5x command {:#06x} with {} words", command, words.len());

        let mut buf = [0; MAX_WRITE_LEN];
        buf[..2].copy_from_slice(&command.to_be_bytes());
        let len = 2 + crc::encode_words(words, &mut buf[2..]);
        self.i2c
            .write(SEN5X_I2C_ADDRESS, &buf[..len])
            .map_err(Error::I2c)?;
        self.delay.delay_ms(delay);
        Ok(())
    }
}

/// Big-endian word `index` of a CRC-framed reply.
fn word(buf: &[u8], index: usize) -> u16 {
    u16::from_be_bytes([buf[index * 3], buf[index * 3 + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    const ADDR: u8 = SEN5X_I2C_ADDRESS;

    fn framed(words: &[u16]) -> Vec<u8> {
        let mut buf = vec![0; words.len() * 3];
        crc::encode_words(words, &mut buf);
        buf
    }

    fn string_reply(text: &[u8]) -> Vec<u8> {
        let mut bytes = [0u8; 32];
        bytes[..text.len()].copy_from_slice(text);
        let words: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        framed(&words)
    }

    #[test]
    fn test_start_and_stop_measurement() {
        let expectations = [
            Transaction::write(ADDR, vec![0x00, 0x21]),
            Transaction::write(ADDR, vec![0x01, 0x04]),
        ];
        let mut mock = I2cMock::new(&expectations);
        let mut sensor = Sen5x::new(mock.clone(), NoopDelay);
        sensor.start_measurement().unwrap();
        assert_eq!(sensor.mode(), MeasurementMode::Measuring);
        sensor.stop_measurement().unwrap();
        assert!(!sensor.is_measuring());
        mock.done();
    }

    #[test]
    fn test_read_measured_values() {
        let expectations = [
            Transaction::write(ADDR, vec![0x03, 0xC4]),
            Transaction::read(
                ADDR,
                framed(&[55, 70, 81, 90, 5000, 4700, 1250, 0x7FFF]),
            ),
        ];
        let mut mock = I2cMock::new(&expectations);
        let mut sensor = Sen5x::new(mock.clone(), NoopDelay);
        let data = sensor.read_measured_values().unwrap();
        assert_eq!(data.pm1_0, 5.5);
        assert_eq!(data.pm2_5, 7.0);
        assert_eq!(data.pm4_0, 8.1);
        assert_eq!(data.pm10_0, 9.0);
        assert_eq!(data.humidity, 50.0);
        assert_eq!(data.temperature, 23.5);
        assert_eq!(data.voc_index, 125.0);
        assert!(data.nox_index.is_nan());
        mock.done();
    }

    #[test]
    fn test_crc_mismatch() {
        let mut reply = framed(&[0x0001]);
        reply[2] ^= 0xFF;
        let expectations = [
            Transaction::write(ADDR, vec![0x02, 0x02]),
            Transaction::read(ADDR, reply),
        ];
        let mut mock = I2cMock::new(&expectations);
        let mut sensor = Sen5x::new(mock.clone(), NoopDelay);
        assert!(matches!(sensor.data_ready(), Err(Error::Crc)));
        mock.done();
    }

    #[test]
    fn test_data_ready() {
        let expectations = [
            Transaction::write(ADDR, vec![0x02, 0x02]),
            Transaction::read(ADDR, framed(&[0x0001])),
            Transaction::write(ADDR, vec![0x02, 0x02]),
            Transaction::read(ADDR, framed(&[0x0000])),
        ];
        let mut mock = I2cMock::new(&expectations);
        let mut sensor = Sen5x::new(mock.clone(), NoopDelay);
        assert!(sensor.data_ready().unwrap());
        assert!(!sensor.data_ready().unwrap());
        mock.done();
    }

    #[test]
    fn test_serial_number() {
        let expectations = [
            Transaction::write(ADDR, vec![0xD0, 0x33]),
            Transaction::read(ADDR, string_reply(b"F5A1B2C3D4E5F607")),
        ];
        let mut mock = I2cMock::new(&expectations);
        let mut sensor = Sen5x::new(mock.clone(), NoopDelay);
        let serial = sensor.serial_number().unwrap();
        assert_eq!(serial.as_str(), "F5A1B2C3D4E5F607");
        mock.done();
    }

    #[test]
    fn test_product_name_and_firmware() {
        let expectations = [
            Transaction::write(ADDR, vec![0xD0, 0x14]),
            Transaction::read(ADDR, string_reply(b"SEN55")),
            Transaction::write(ADDR, vec![0xD1, 0x00]),
            Transaction::read(ADDR, framed(&[0x0200])),
        ];
        let mut mock = I2cMock::new(&expectations);
        let mut sensor = Sen5x::new(mock.clone(), NoopDelay);
        assert_eq!(sensor.product_name().unwrap().as_str(), "SEN55");
        assert_eq!(sensor.firmware_version().unwrap(), 2);
        mock.done();
    }

    #[test]
    fn test_set_temperature_offset_simple() {
        let mut write = vec![0x60, 0xB2];
        write.extend(framed(&[400, 0, 0]));
        let expectations = [Transaction::write(ADDR, write)];
        let mut mock = I2cMock::new(&expectations);
        let mut sensor = Sen5x::new(mock.clone(), NoopDelay);
        sensor.set_temperature_offset_simple(2.0).unwrap();
        mock.done();
    }

    #[test]
    fn test_read_temperature_compensation() {
        let expectations = [
            Transaction::write(ADDR, vec![0x60, 0xB2]),
            Transaction::read(ADDR, framed(&[(-200i16) as u16, 0, 10])),
        ];
        let mut mock = I2cMock::new(&expectations);
        let mut sensor = Sen5x::new(mock.clone(), NoopDelay);
        let params = sensor.temperature_compensation().unwrap();
        assert_eq!(params.offset, -1.0);
        assert_eq!(params.slope, 0.0);
        assert_eq!(params.time_constant, 10);
        mock.done();
    }

    #[test]
    fn test_auto_cleaning_interval() {
        let mut write = vec![0x80, 0x04];
        write.extend(framed(&[0x0009, 0x3A80]));
        let expectations = [
            Transaction::write(ADDR, write),
            Transaction::write(ADDR, vec![0x80, 0x04]),
            Transaction::read(ADDR, framed(&[0x0009, 0x3A80])),
        ];
        let mut mock = I2cMock::new(&expectations);
        let mut sensor = Sen5x::new(mock.clone(), NoopDelay);
        sensor.set_auto_cleaning_interval(604_800).unwrap();
        assert_eq!(sensor.auto_cleaning_interval().unwrap(), 604_800);
        mock.done();
    }

    #[test]
    fn test_device_status() {
        let expectations = [
            Transaction::write(ADDR, vec![0xD2, 0x10]),
            Transaction::read(ADDR, framed(&[0x0020, 0x0010])),
        ];
        let mut mock = I2cMock::new(&expectations);
        let mut sensor = Sen5x::new(mock.clone(), NoopDelay);
        let status = sensor.read_and_clear_device_status().unwrap();
        assert!(status.fan_speed_warning());
        assert!(status.fan_failure());
        mock.done();
    }

    #[test]
    fn test_mode_restrictions() {
        let expectations = [
            Transaction::write(ADDR, vec![0x00, 0x21]),
            Transaction::write(ADDR, vec![0x56, 0x07]),
            Transaction::write(ADDR, vec![0xD3, 0x04]),
        ];
        let mut mock = I2cMock::new(&expectations);
        let mut sensor = Sen5x::new(mock.clone(), NoopDelay);

        assert!(matches!(sensor.start_fan_cleaning(), Err(Error::NotAllowed)));
        sensor.start_measurement().unwrap();
        assert!(matches!(sensor.set_warm_start(0), Err(Error::NotAllowed)));
        assert!(matches!(
            sensor.set_rht_acceleration_mode(RhtAccelerationMode::High),
            Err(Error::NotAllowed)
        ));
        sensor.start_fan_cleaning().unwrap();
        sensor.device_reset().unwrap();
        assert!(!sensor.is_measuring());
        mock.done();
    }

    #[test]
    fn test_fan_cleaning_needs_full_measurement() {
        let expectations = [
            Transaction::write(ADDR, vec![0x00, 0x37]),
            Transaction::write(ADDR, vec![0x01, 0x04]),
        ];
        let mut mock = I2cMock::new(&expectations);
        let mut sensor = Sen5x::new(mock.clone(), NoopDelay);

        sensor.start_measurement_rht_gas_only().unwrap();
        assert_eq!(sensor.mode(), MeasurementMode::RhtGasOnly);
        assert!(sensor.is_measuring());
        assert!(matches!(sensor.start_fan_cleaning(), Err(Error::NotAllowed)));
        assert!(matches!(sensor.set_warm_start(0), Err(Error::NotAllowed)));
        sensor.stop_measurement().unwrap();
        assert_eq!(sensor.mode(), MeasurementMode::Idle);
        mock.done();
    }

    #[test]
    fn test_out_of_range_compensation_is_not_sent() {
        let mut mock = I2cMock::new(&[]);
        let mut sensor = Sen5x::new(mock.clone(), NoopDelay);
        assert!(matches!(
            sensor.set_temperature_offset_simple(200.0),
            Err(Error::OutOfRange)
        ));
        assert!(matches!(
            sensor.set_temperature_offset_simple(f32::NAN),
            Err(Error::OutOfRange)
        ));
        mock.done();
    }

    #[test]
    fn test_bus_error_propagates() {
        let expectations =
            [Transaction::write(ADDR, vec![0xD3, 0x04]).with_error(ErrorKind::Other)];
        let mut mock = I2cMock::new(&expectations);
        let mut sensor = Sen5x::new(mock.clone(), NoopDelay);
        assert!(matches!(
            sensor.device_reset(),
            Err(Error::I2c(ErrorKind::Other))
        ));
        mock.done();
    }
}
