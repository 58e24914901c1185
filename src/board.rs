//! Pin map of the ESP32-S3 board with the A76xx cellular modem and SD card
//! slot.
//!
//! Plain GPIO numbers, consumed by the HAL initialization code of the
//! firmware. Nothing here touches hardware.

use embedded_hal::digital::PinState;

/// Modem UART baud rate.
pub const MODEM_BAUDRATE: u32 = 115_200;
pub const MODEM_DTR_PIN: u8 = 7;
pub const MODEM_TX_PIN: u8 = 17;
pub const MODEM_RX_PIN: u8 = 18;
/// Modem boot pin, must follow the power-on sequence in [`crate::modem`].
pub const BOARD_PWRKEY_PIN: u8 = 15;
pub const BOARD_BAT_ADC_PIN: u8 = 4;
pub const MODEM_RING_PIN: u8 = 6;
pub const MODEM_RESET_PIN: u8 = 16;
pub const BOARD_MISO_PIN: u8 = 47;
pub const BOARD_MOSI_PIN: u8 = 14;
pub const BOARD_SCK_PIN: u8 = 21;
pub const BOARD_SD_CS_PIN: u8 = 13;

/// Level that holds the modem in reset.
pub const MODEM_RESET_LEVEL: PinState = PinState::Low;

/// Hardware UART the modem is wired to.
pub const MODEM_SERIAL: UartPort = UartPort::Uart1;

/// ESP32-S3 hardware UART peripherals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartPort {
    Uart0,
    Uart1,
    Uart2,
}

/// Modem wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModemPins {
    pub uart: UartPort,
    pub baudrate: u32,
    pub tx: u8,
    pub rx: u8,
    pub dtr: u8,
    pub ring: u8,
    pub reset: u8,
    pub pwrkey: u8,
}

/// SD card SPI wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SdCardPins {
    pub sck: u8,
    pub miso: u8,
    pub mosi: u8,
    pub cs: u8,
}

pub const MODEM: ModemPins = ModemPins {
    uart: MODEM_SERIAL,
    baudrate: MODEM_BAUDRATE,
    tx: MODEM_TX_PIN,
    rx: MODEM_RX_PIN,
    dtr: MODEM_DTR_PIN,
    ring: MODEM_RING_PIN,
    reset: MODEM_RESET_PIN,
    pwrkey: BOARD_PWRKEY_PIN,
};

pub const SD_CARD: SdCardPins = SdCardPins {
    sck: BOARD_SCK_PIN,
    miso: BOARD_MISO_PIN,
    mosi: BOARD_MOSI_PIN,
    cs: BOARD_SD_CS_PIN,
};
