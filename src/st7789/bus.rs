//! Bus mode controller
//!
//! The SPI peripheral and the optional TX DMA channel are stateful: frame size,
//! memory increment and data alignment all have to be reprogrammed (and the
//! peripheral reinitialised) before they change. [`BusTransport`] owns both and
//! caches what was last programmed so a repeated request costs nothing.
//!
//! [`TxDma`] is a seam for hosts with a directly programmable TX DMA channel
//! (STM32-class parts). The ESP32-S3 board binary has none: ESP-IDF runs DMA
//! inside its SPI driver, so it uses [`NoDma`] and [`SpiDevicePort`]. In this
//! crate the DMA and fixed-source fill paths only run against the test mocks.

use core::convert::Infallible;
use core::fmt::Debug;

use embedded_hal::spi::SpiDevice;

use crate::st7789::config::WaitPolicy;
use crate::st7789::error::Error;
use crate::st7789::DMA_MIN_TRANSFER;

/// SPI frame size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordWidth {
    /// Commands, parameters and byte payloads
    Bits8,
    /// RGB565 pixel streams
    Bits16,
}

/// TX DMA channel settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmaMode {
    /// Advance the source address after every unit; off to repeat one word
    pub increment: bool,
    /// Peripheral and memory data alignment
    pub width: WordWidth,
}

impl DmaMode {
    pub const fn streaming(width: WordWidth) -> Self {
        Self {
            increment: true,
            width,
        }
    }

    pub const fn fixed(width: WordWidth) -> Self {
        Self {
            increment: false,
            width,
        }
    }
}

/// One blocking SPI write, at most [`crate::st7789::MAX_TRANSFER`] units
#[derive(Debug, Clone, Copy)]
pub enum Chunk<'a> {
    Bytes(&'a [u8]),
    /// Shifted out most significant byte first
    Words(&'a [u16]),
}

impl Chunk<'_> {
    /// Length in bus units
    pub fn len(&self) -> usize {
        match self {
            Chunk::Bytes(b) => b.len(),
            Chunk::Words(w) => w.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source of one DMA transfer
#[derive(Debug, Clone, Copy)]
pub enum DmaSource<'a> {
    Bytes(&'a [u8]),
    Words(&'a [u16]),
    /// The same word `count` times, read from a fixed address
    Fixed { word: u16, count: u16 },
}

impl DmaSource<'_> {
    pub fn len(&self) -> usize {
        match self {
            DmaSource::Bytes(b) => b.len(),
            DmaSource::Words(w) => w.len(),
            DmaSource::Fixed { count, .. } => usize::from(*count),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Blocking, write-only SPI peripheral with a programmable frame size
pub trait SpiPort {
    type Error: Debug;

    /// Reprogram the data size field and reinitialise the peripheral
    fn set_word_width(&mut self, width: WordWidth) -> Result<(), Self::Error>;

    /// Transmit and wait for completion, no timeout
    fn write(&mut self, chunk: Chunk<'_>) -> Result<(), Self::Error>;
}

/// TX DMA channel feeding the SPI peripheral
pub trait TxDma {
    type Error: Debug;

    /// Disable the channel, reprogram increment and alignment, reinitialise
    fn configure(&mut self, mode: DmaMode) -> Result<(), Self::Error>;

    /// Kick off a transfer; the source stays borrowed until [`TxDma::is_ready`] reports true
    fn start(&mut self, source: DmaSource<'_>) -> Result<(), Self::Error>;

    /// Channel state register reads ready
    fn is_ready(&mut self) -> Result<bool, Self::Error>;

    /// Stop an in-flight transfer
    fn abort(&mut self) -> Result<(), Self::Error>;
}

/// DMA disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDma;

impl TxDma for NoDma {
    type Error = Infallible;

    fn configure(&mut self, _mode: DmaMode) -> Result<(), Self::Error> {
        Ok(())
    }

    fn start(&mut self, _source: DmaSource<'_>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn is_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }

    fn abort(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// [`SpiPort`] over any `embedded_hal` SPI device with 8-bit frames
///
/// There is no frame size to reprogram: 16-bit words are serialised big-endian
/// through a small stack buffer, which is what the panel expects anyway.
pub struct SpiDevicePort<SPI> {
    spi: SPI,
}

impl<SPI> SpiDevicePort<SPI> {
    pub fn new(spi: SPI) -> Self {
        SpiDevicePort { spi }
    }

    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice> SpiPort for SpiDevicePort<SPI> {
    type Error = SPI::Error;

    fn set_word_width(&mut self, _width: WordWidth) -> Result<(), Self::Error> {
        Ok(())
    }

    fn write(&mut self, chunk: Chunk<'_>) -> Result<(), Self::Error> {
        match chunk {
            Chunk::Bytes(bytes) => self.spi.write(bytes),
            Chunk::Words(words) => {
                const BATCH: usize = 64;
                let mut buffer = [0u8; BATCH * 2];
                for batch in words.chunks(BATCH) {
                    for (pair, word) in buffer.chunks_exact_mut(2).zip(batch) {
                        pair.copy_from_slice(&word.to_be_bytes());
                    }
                    self.spi.write(&buffer[..batch.len() * 2])?;
                }
                Ok(())
            }
        }
    }
}

/// SPI peripheral plus optional DMA channel, with the last programmed state cached
pub struct BusTransport<PORT, DMA> {
    pub(crate) port: PORT,
    pub(crate) dma: Option<DMA>,
    width: Option<WordWidth>,
    dma_mode: Option<DmaMode>,
    pub(crate) dma_threshold: usize,
    pub(crate) dma_wait: WaitPolicy,
}

impl<PORT> BusTransport<PORT, NoDma> {
    /// Blocking transfers only
    pub fn without_dma(port: PORT) -> Self {
        BusTransport::new(port, None)
    }
}

impl<PORT, DMA> BusTransport<PORT, DMA> {
    /// Blocking transfers below the DMA threshold, DMA at or above it
    pub fn with_dma(port: PORT, dma: DMA) -> Self {
        BusTransport::new(port, Some(dma))
    }

    pub fn new(port: PORT, dma: Option<DMA>) -> Self {
        BusTransport {
            port,
            dma,
            width: None,
            dma_mode: None,
            dma_threshold: DMA_MIN_TRANSFER,
            dma_wait: WaitPolicy::Spin,
        }
    }

    /// Frame size last programmed, `None` before the first transfer
    pub fn word_width(&self) -> Option<WordWidth> {
        self.width
    }

    pub fn dma_mode(&self) -> Option<DmaMode> {
        self.dma_mode
    }

    pub fn has_dma(&self) -> bool {
        self.dma.is_some()
    }

    /// A transfer of `units` goes through DMA
    pub(crate) fn uses_dma(&self, units: usize) -> bool {
        self.dma.is_some() && units >= self.dma_threshold
    }

    pub fn release(self) -> (PORT, Option<DMA>) {
        (self.port, self.dma)
    }
}

impl<PORT, DMA> BusTransport<PORT, DMA>
where
    PORT: SpiPort,
    DMA: TxDma,
{
    /// Reprogram the SPI frame size unless it is already `width`
    pub fn set_word_width(&mut self, width: WordWidth) -> Result<(), Error> {
        if self.width == Some(width) {
            return Ok(());
        }

        log::debug!("SPI frame size -> {:?}", width);
        self.port.set_word_width(width).map_err(|e| {
            log::error!("SPI reinit for {:?} failed: {:?}", width, e);
            Error::Reconfigure
        })?;
        self.width = Some(width);
        Ok(())
    }

    /// Set the frame size and, with DMA present, the channel mode to match
    pub fn set_dma_mode(&mut self, mode: DmaMode) -> Result<(), Error> {
        self.set_word_width(mode.width)?;

        let Some(dma) = self.dma.as_mut() else {
            return Ok(());
        };
        if self.dma_mode == Some(mode) {
            return Ok(());
        }

        log::debug!("DMA mode -> {:?}", mode);
        dma.configure(mode).map_err(|e| {
            log::error!("DMA reinit for {:?} failed: {:?}", mode, e);
            Error::Reconfigure
        })?;
        self.dma_mode = Some(mode);
        Ok(())
    }
}
