//! Best-effort sensor bring-up and polling.
//!
//! [`Monitor`] runs the fixed initialization sequence and reads
//! measurements, writing every failure to the log instead of returning it.
//! Initialization never stops early: each step runs whether or not the one
//! before it succeeded. The returned [`InitReport`] says which steps failed.

use core::fmt::Debug;

use embedded_hal::{delay::DelayNs, i2c::I2c};
use log::{error, info};

use crate::{DeviceString, Error, Sen5x, Sen5xData};

/// Temperature offset written during [`Monitor::begin`], in °C.
pub const TEMPERATURE_OFFSET: f32 = 0.0;

/// Driver operations the monitor relies on.
pub trait AirQualitySensor {
    type Error: Debug;

    fn device_reset(&mut self) -> Result<(), Self::Error>;
    fn serial_number(&mut self) -> Result<DeviceString, Self::Error>;
    fn set_temperature_offset_simple(&mut self, offset: f32) -> Result<(), Self::Error>;
    fn start_measurement(&mut self) -> Result<(), Self::Error>;
    fn read_measured_values(&mut self) -> Result<Sen5xData, Self::Error>;
}

impl<I2C, D, E> AirQualitySensor for Sen5x<I2C, D>
where
    I2C: I2c<Error = E>,
    E: Debug,
    D: DelayNs,
{
    type Error = Error<E>;

    fn device_reset(&mut self) -> Result<(), Self::Error> {
        Sen5x::device_reset(self)
    }

    fn serial_number(&mut self) -> Result<DeviceString, Self::Error> {
        Sen5x::serial_number(self)
    }

    fn set_temperature_offset_simple(&mut self, offset: f32) -> Result<(), Self::Error> {
        Sen5x::set_temperature_offset_simple(self, offset)
    }

    fn start_measurement(&mut self) -> Result<(), Self::Error> {
        Sen5x::start_measurement(self)
    }

    fn read_measured_values(&mut self) -> Result<Sen5xData, Self::Error> {
        Sen5x::read_measured_values(self)
    }
}

/// Steps of [`Monitor::begin`], in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitStep {
    DeviceReset,
    SerialNumber,
    TemperatureOffset,
    StartMeasurement,
}

impl InitStep {
    pub const ALL: [InitStep; 4] = [
        InitStep::DeviceReset,
        InitStep::SerialNumber,
        InitStep::TemperatureOffset,
        InitStep::StartMeasurement,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Outcome of [`Monitor::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InitReport {
    failed: [bool; 4],
    serial_number: Option<DeviceString>,
}

impl InitReport {
    /// Every step succeeded.
    pub fn is_ok(&self) -> bool {
        !self.failed.contains(&true)
    }

    pub fn failed(&self, step: InitStep) -> bool {
        self.failed[step.index()]
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = InitStep> + '_ {
        InitStep::ALL
            .into_iter()
            .filter(move |step| self.failed(*step))
    }

    /// Serial number read during initialization.
    pub fn serial_number(&self) -> Option<&DeviceString> {
        self.serial_number.as_ref()
    }

    fn record<T, E: Debug>(&mut self, step: InitStep, result: &Result<T, E>) {
        if let Err(e) = result {
            error!("SEN5x {:?} failed: {:?}", step, e);
            self.failed[step.index()] = true;
        }
    }
}

/// Air-quality sensor wrapper.
pub struct Monitor<S> {
    sensor: S,
}

impl<S: AirQualitySensor> Monitor<S> {
    pub fn new(sensor: S) -> Self {
        Self { sensor }
    }

    /// Reset the sensor, log its serial number, clear the temperature offset
    /// and start measuring.
    pub fn begin(&mut self) -> InitReport {
        let mut report = InitReport::default();

        let result = self.sensor.device_reset();
        report.record(InitStep::DeviceReset, &result);
        if result.is_ok() {
            info!("SEN5x reset");
        }

        let result = self.sensor.serial_number();
        report.record(InitStep::SerialNumber, &result);
        if let Ok(serial) = result {
            info!("SEN5x serial number: {}", serial);
            report.serial_number = Some(serial);
        }

        let result = self.sensor.set_temperature_offset_simple(TEMPERATURE_OFFSET);
        report.record(InitStep::TemperatureOffset, &result);
        if result.is_ok() {
            info!("SEN5x temperature offset set to {} °C", TEMPERATURE_OFFSET);
        }

        let result = self.sensor.start_measurement();
        report.record(InitStep::StartMeasurement, &result);
        if result.is_ok() {
            info!("SEN5x measurement started");
        }

        report
    }

    /// Read the latest measurement. Returns `None` after logging the error
    /// if the read failed.
    pub fn get_readings(&mut self) -> Option<Sen5xData> {
        match self.sensor.read_measured_values() {
            Ok(data) => Some(data),
            Err(e) => {
                error!("SEN5x read failed: {:?}", e);
                None
            }
        }
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Returns the wrapped driver.
    pub fn release(self) -> S {
        self.sensor
    }
}
