/// SEN5x I2C commands with their execution times.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    StartMeasurement,
    StartMeasurementRhtGasOnly,
    StopMeasurement,
    ReadDataReady,
    ReadMeasuredValues,
    TemperatureCompensation,
    WarmStart,
    RhtAccelerationMode,
    StartFanCleaning,
    AutoCleaningInterval,
    ProductName,
    SerialNumber,
    FirmwareVersion,
    ReadDeviceStatus,
    ReadAndClearDeviceStatus,
    DeviceReset,
}

impl Command {
    /// Command code and the time in ms the device needs before the next
    /// transfer.
    pub(crate) fn as_tuple(self) -> (u16, u32) {
        match self {
            Self::StartMeasurement => (0x0021, 50),
            Self::StartMeasurementRhtGasOnly => (0x0037, 50),
            Self::StopMeasurement => (0x0104, 200),
            Self::ReadDataReady => (0x0202, 20),
            Self::ReadMeasuredValues => (0x03C4, 20),
            Self::TemperatureCompensation => (0x60B2, 20),
            Self::WarmStart => (0x60C6, 20),
            Self::RhtAccelerationMode => (0x60F7, 20),
            Self::StartFanCleaning => (0x5607, 20),
            Self::AutoCleaningInterval => (0x8004, 20),
            Self::ProductName => (0xD014, 20),
            Self::SerialNumber => (0xD033, 20),
            Self::FirmwareVersion => (0xD100, 20),
            Self::ReadDeviceStatus => (0xD206, 20),
            Self::ReadAndClearDeviceStatus => (0xD210, 20),
            Self::DeviceReset => (0xD304, 100),
        }
    }
}
