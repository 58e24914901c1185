//! Modem power and reset sequencing over the board control lines.
//!
//! Only the GPIO side of bringing the modem up lives here. The AT command
//! channel on [`MODEM_SERIAL`](crate::board::MODEM_SERIAL) is left to the
//! firmware.

use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::board::MODEM_RESET_LEVEL;

const RESET_SETTLE_MS: u32 = 100;
const RESET_HOLD_MS: u32 = 2600;
const PWRKEY_PULSE_MS: u32 = 100;
const DTR_WAKE_MS: u32 = 50;

/// Modem control errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModemError<E> {
    /// Driving a control line failed
    Pin(E),
}

/// Reset, power-key and DTR lines of the modem.
pub struct ModemControl<RST, PWR, DTR> {
    reset: RST,
    pwrkey: PWR,
    dtr: DTR,
}

impl<RST, PWR, DTR, E> ModemControl<RST, PWR, DTR>
where
    RST: OutputPin<Error = E>,
    PWR: OutputPin<Error = E>,
    DTR: OutputPin<Error = E>,
{
    /// Takes the pins wired to `MODEM_RESET_PIN`, `BOARD_PWRKEY_PIN` and
    /// `MODEM_DTR_PIN`, already configured as outputs.
    pub fn new(reset: RST, pwrkey: PWR, dtr: DTR) -> Self {
        Self { reset, pwrkey, dtr }
    }

    /// Pulse the reset line to its active level.
    pub fn hard_reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), ModemError<E>> {
        log::info!("Modem: hard reset");
        self.reset
            .set_state(!MODEM_RESET_LEVEL)
            .map_err(ModemError::Pin)?;
        delay.delay_ms(RESET_SETTLE_MS);
        self.reset
            .set_state(MODEM_RESET_LEVEL)
            .map_err(ModemError::Pin)?;
        delay.delay_ms(RESET_HOLD_MS);
        self.reset
            .set_state(!MODEM_RESET_LEVEL)
            .map_err(ModemError::Pin)
    }

    /// Toggle PWRKEY to boot the modem.
    pub fn power_on<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), ModemError<E>> {
        log::info!("Modem: power key pulse");
        self.pwrkey.set_low().map_err(ModemError::Pin)?;
        delay.delay_ms(PWRKEY_PULSE_MS);
        self.pwrkey.set_high().map_err(ModemError::Pin)?;
        delay.delay_ms(PWRKEY_PULSE_MS);
        self.pwrkey.set_low().map_err(ModemError::Pin)
    }

    /// Pull DTR low so the modem stays out of sleep.
    pub fn wake<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), ModemError<E>> {
        self.dtr.set_low().map_err(ModemError::Pin)?;
        delay.delay_ms(DTR_WAKE_MS);
        Ok(())
    }

    /// Full start-up: reset, power key, wake.
    pub fn start<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), ModemError<E>> {
        self.hard_reset(delay)?;
        self.power_on(delay)?;
        self.wake(delay)
    }

    /// Returns the pins.
    pub fn release(self) -> (RST, PWR, DTR) {
        (self.reset, self.pwrkey, self.dtr)
    }
}
