//! Display interface using SPI
//!
//! Command/data framing: every write selects the chip, drives DC (low for a
//! command byte, high for parameters and pixels), transmits, and deselects.
//! The controller latches commands statelessly, so nothing here checks that
//! data follows the right command; the addressing and fill code pair them.
use core::convert::Infallible;

use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::st7789::bus::{BusTransport, SpiPort, TxDma, WordWidth};
use crate::st7789::error::{DisplayError, Error};
use crate::st7789::transfer::Payload;

const RESET_LOW_MS: u32 = 1;
const RESET_RECOVERY_MS: u32 = 120;

/// Stand-in for panels whose CS is tied low
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCs;

impl embedded_hal::digital::ErrorType for NoCs {
    type Error = Infallible;
}

impl OutputPin for NoCs {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// The connection to one ST7789
pub struct DisplayInterface<PORT, DMA, DC, CS, RST, DELAY> {
    /// SPI peripheral, optional DMA channel and their cached modes
    pub bus: BusTransport<PORT, DMA>,
    /// Data/Command Control Pin (High for data, Low for command)
    dc: DC,
    /// Chip select, active low
    cs: CS,
    /// Reset, active low
    rst: RST,
    pub delay: DELAY,
}

impl<PORT, DMA, DC, CS, RST, DELAY> DisplayInterface<PORT, DMA, DC, CS, RST, DELAY> {
    pub fn new(bus: BusTransport<PORT, DMA>, dc: DC, cs: CS, rst: RST, delay: DELAY) -> Self {
        DisplayInterface {
            bus,
            dc,
            cs,
            rst,
            delay,
        }
    }

    /// Give the peripherals and pins back
    pub fn release(self) -> (BusTransport<PORT, DMA>, DC, CS, RST, DELAY) {
        (self.bus, self.dc, self.cs, self.rst, self.delay)
    }
}

impl<PORT, DMA, DC, CS, RST, DELAY> DisplayInterface<PORT, DMA, DC, CS, RST, DELAY>
where
    PORT: SpiPort,
    DMA: TxDma,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// Hardware reset pulse, then the power-on settle time the controller needs
    pub fn reset(&mut self) -> Result<(), Error> {
        self.deselect()?;
        self.rst.set_low().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(RESET_LOW_MS);
        self.rst.set_high().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(RESET_RECOVERY_MS);
        Ok(())
    }

    fn select(&mut self) -> Result<(), Error> {
        self.cs.set_low().map_err(|_| DisplayError::CSError)?;
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), Error> {
        self.cs.set_high().map_err(|_| DisplayError::CSError)?;
        Ok(())
    }

    fn dc_command(&mut self) -> Result<(), Error> {
        self.dc.set_low().map_err(|_| DisplayError::DCError)?;
        Ok(())
    }

    /// High for data; left high afterwards, the next command pulls it low
    pub(crate) fn dc_data(&mut self) -> Result<(), Error> {
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        Ok(())
    }

    /// Select, run `body`, and always deselect; the first error wins
    fn framed(&mut self, body: impl FnOnce(&mut Self) -> Result<(), Error>) -> Result<(), Error> {
        self.select()?;
        let result = body(self);
        let released = self.deselect();
        result.and(released)
    }

    /// Basic function for sending commands
    pub fn cmd(&mut self, command: u8) -> Result<(), Error> {
        self.bus.set_word_width(WordWidth::Bits8)?;
        self.framed(|this| {
            this.dc_command()?;
            this.bus.transmit(Payload::Bytes(&[command])).inspect_err(|e| {
                log::error!("Command 0x{:02X} not sent: {}", command, e);
            })
        })
    }

    /// One 8-bit parameter
    pub fn small_data(&mut self, value: u8) -> Result<(), Error> {
        self.bus.set_word_width(WordWidth::Bits8)?;
        self.framed(|this| {
            this.dc_data()?;
            this.bus.transmit(Payload::Bytes(&[value]))
        })
    }

    /// Parameters or pixels, any length; chunking is left to the transfer engine
    ///
    /// The bus is reprogrammed for the payload before the chip is selected.
    pub fn data(&mut self, payload: Payload<'_>) -> Result<(), Error> {
        if payload.is_empty() {
            return Ok(());
        }
        self.bus.prepare(&payload)?;
        self.framed(|this| {
            this.dc_data()?;
            this.bus.transmit(payload)
        })
    }

    /// Basic function for sending a command and the data belonging to it.
    pub fn cmd_with_data(&mut self, command: u8, data: &[u8]) -> Result<(), Error> {
        self.cmd(command)?;
        self.data(Payload::Bytes(data))
    }
}
