//! ST7789 RGB565 TFT Display Driver
//!
//! Used on the 1.14" 135x240 and 1.3" 240x240 IPS modules driven over a
//! write-only SPI bus with a separate data/command line.
//!
//! The hard part of this driver is the transfer engine, not the register map:
//! the SPI frame size flips between 8 bit (commands, parameters) and 16 bit
//! (pixel streams), an optional DMA channel has its own memory-increment and
//! alignment state, and a single transfer may not exceed 65535 units.
//!
//! ### Usage
//! 1. wrap your SPI peripheral in a [`bus::BusTransport`], either directly through
//!    a [`bus::SpiPort`] implementation or via [`bus::SpiDevicePort`]
//! 1. build a [`interface::DisplayInterface`] with the DC, CS and RST pins
//! 1. create the driver with [`driver::St7789::new`], which runs the power-up sequence
//! 1. draw through [`graphics::RasterSink`] (fills, lines, bitmaps, pixels) or
//!    through `embedded_graphics` since the driver is a `DrawTarget`
//!
//! ```ignore
//! let bus = BusTransport::without_dma(SpiDevicePort::new(spi));
//! let interface = DisplayInterface::new(bus, dc, NoCs, rst, delay);
//! let mut display = St7789::new(interface, Config::default())?;
//! display.fill_rect(0, 0, 9, 9, Rgb565::WHITE)?;
//! ```
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod bus;
pub mod cmd;
pub mod config;
pub mod driver;
pub mod error;
pub mod flag;
pub mod geometry;
pub mod graphics;
pub mod interface;
pub mod pins;
pub mod shared;
pub mod transfer;

#[cfg(test)]
pub(crate) mod mock;

pub use bus::{BusTransport, NoDma, SpiDevicePort, SpiPort, TxDma};
pub use config::{Config, FrameRate, Porch, WaitPolicy};
pub use driver::St7789;
pub use error::Error;
pub use geometry::{DisplayRotation, Geometry, PanelVariant};
pub use graphics::{Bitmap, LineStatus, RasterSink};
pub use interface::{DisplayInterface, NoCs};
pub use shared::SharedDisplay;

/// Panel variant the board is built for
pub const VARIANT: PanelVariant = PanelVariant::Panel135x240;

/// Rotation programmed at power-up
pub const ROTATION: DisplayRotation = DisplayRotation::Rotate270;

/// Transfers shorter than this many units go out as blocking writes.
/// Below it the DMA setup costs more than it saves.
pub const DMA_MIN_TRANSFER: usize = 16;

/// Largest single transfer; the peripheral count register is 16 bits wide
pub const MAX_TRANSFER: usize = 65535;

/// Length of the stack buffer used for non-DMA solid fills
pub const FILL_BUFFER_LEN: usize = 64;
