#[cfg(not(feature = "thiserror"))]
use core::fmt;

use embedded_hal::i2c::I2c;
use sensirion_i2c::i2c;

/// SEN5x errors
#[derive(Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
pub enum Error<E> {
    /// I2C bus error
    #[cfg_attr(feature = "thiserror", error("I2C bus error: {0:?}"))]
    I2c(E),
    /// CRC checksum validation failed
    #[cfg_attr(feature = "thiserror", error("CRC checksum mismatch"))]
    Crc,
    /// Command not allowed in the current measurement mode
    #[cfg_attr(feature = "thiserror", error("command not allowed in current mode"))]
    NotAllowed,
    /// Parameter cannot be encoded for the device
    #[cfg_attr(feature = "thiserror", error("parameter out of range"))]
    OutOfRange,
    /// Device string is not valid UTF-8
    #[cfg_attr(feature = "thiserror", error("device returned a malformed string"))]
    InvalidString,
}

impl<E, I> From<i2c::Error<I>> for Error<E>
where
    I: I2c<Error = E>,
{
    fn from(err: i2c::Error<I>) -> Self {
        match err {
            i2c::Error::Crc => Error::Crc,
            i2c::Error::I2cWrite(e) => Error::I2c(e),
            i2c::Error::I2cRead(e) => Error::I2c(e),
        }
    }
}

#[cfg(not(feature = "thiserror"))]
impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "I2C bus error: {:?}", e),
            Error::Crc => f.write_str("CRC checksum mismatch"),
            Error::NotAllowed => f.write_str("command not allowed in current mode"),
            Error::OutOfRange => f.write_str("parameter out of range"),
            Error::InvalidString => f.write_str("device returned a malformed string"),
        }
    }
}
