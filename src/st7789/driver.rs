//! ST7789 Display Driver Implementation
//!
//! ## Architecture
//!
//! ### Initialization
//! - `new()` - Reset pulse and the full register programming sequence, run once
//! - `from_interface()` - Wrap an interface without touching the hardware
//!
//! ### Addressing
//! - `set_address_window()` - CASET/RASET with the panel shift applied, then RAMWR
//! - `set_rotation()` - MADCTL, re-selecting the geometry for the new rotation
//!
//! ### Accelerated drawing
//! - `fill_pixels()` - Stream `count` copies of one colour into the current window
//! - `fill_area()` - Open a window and hand back a pixel-run writer
//! - `fill_rect()` - Solid rectangle
//! - `draw_line()` - Horizontal and vertical lines only, others report `Unsupported`
//! - `draw_image()` - Blit a 16 bpp bitmap
//! - `draw_pixel()` - Single pixel for everything that isn't accelerated
//!
//! ## Transfer sizes
//!
//! Solid fills never materialise a full-size buffer. With DMA the colour is
//! read from one fixed address for the whole run; without it, a 64 entry stack
//! buffer is streamed repeatedly.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::st7789::bus::{SpiPort, TxDma, WordWidth};
use crate::st7789::cmd::Cmd;
use crate::st7789::config::Config;
use crate::st7789::error::Error;
use crate::st7789::flag::Flag;
use crate::st7789::geometry::{AddressWindow, DisplayRotation, Geometry};
use crate::st7789::graphics::{Bitmap, LineStatus};
use crate::st7789::interface::DisplayInterface;
use crate::st7789::transfer::Payload;
use crate::st7789::FILL_BUFFER_LEN;

/// ST7789 TFT Display Driver
///
/// ## Type Parameters
///
/// - `PORT` - SPI peripheral with a programmable frame size
/// - `DMA` - TX DMA channel, [`crate::st7789::NoDma`] when there is none
/// - `DC` - Data/Command output pin
/// - `CS` - Chip select output pin, [`crate::st7789::NoCs`] when tied low
/// - `RST` - Reset output pin
/// - `DELAY` - Delay provider for timing
pub struct St7789<PORT, DMA, DC, CS, RST, DELAY> {
    /// The display interface
    pub interface: DisplayInterface<PORT, DMA, DC, CS, RST, DELAY>,
    config: Config,
    geometry: Geometry,
}

impl<PORT, DMA, DC, CS, RST, DELAY> St7789<PORT, DMA, DC, CS, RST, DELAY> {
    /// Create a new instance from an existing interface without initialization
    pub fn from_interface(
        mut interface: DisplayInterface<PORT, DMA, DC, CS, RST, DELAY>,
        config: Config,
    ) -> Self {
        interface.bus.dma_threshold = config.dma_threshold;
        interface.bus.dma_wait = config.dma_wait;
        St7789 {
            interface,
            config,
            geometry: Geometry::for_panel(config.variant, config.rotation),
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn width(&self) -> u16 {
        self.geometry.width
    }

    pub fn height(&self) -> u16 {
        self.geometry.height
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn release(self) -> DisplayInterface<PORT, DMA, DC, CS, RST, DELAY> {
        self.interface
    }
}

impl<PORT, DMA, DC, CS, RST, DELAY> St7789<PORT, DMA, DC, CS, RST, DELAY>
where
    PORT: SpiPort,
    DMA: TxDma,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// Create and initialize the display driver
    pub fn new(
        interface: DisplayInterface<PORT, DMA, DC, CS, RST, DELAY>,
        config: Config,
    ) -> Result<Self, Error> {
        let mut st7789 = Self::from_interface(interface, config);
        st7789.init()?;
        Ok(st7789)
    }

    fn init(&mut self) -> Result<(), Error> {
        log::info!(
            "Initializing ST7789 {:?} at {:?} (DMA {})",
            self.config.variant,
            self.config.rotation,
            if self.interface.bus.has_dma() { "on" } else { "off" }
        );

        self.interface.reset()?;

        self.interface.cmd(Cmd::COLOR_MODE)?;
        self.interface.small_data(Flag::COLOR_MODE_16BIT)?;
        self.interface
            .cmd_with_data(Cmd::PORCH_CONTROL, &self.config.porch.params())?;
        self.set_rotation(self.config.rotation)?;

        // Internal LCD voltage generator
        self.cmd_param(Cmd::GATE_CONTROL, Flag::GATE_CONTROL_DEFAULT)?;
        self.cmd_param(Cmd::VCOM_SETTING, Flag::VCOM_0V725)?;
        self.cmd_param(Cmd::LCM_CONTROL, Flag::LCM_CONTROL_DEFAULT)?;
        self.cmd_param(Cmd::VDV_VRH_ENABLE, Flag::VDV_VRH_FROM_COMMAND)?;
        self.cmd_param(Cmd::VRH_SET, Flag::VRH_4V45)?;
        self.cmd_param(Cmd::VDV_SET, Flag::VDV_DEFAULT)?;
        self.cmd_param(Cmd::FRAME_RATE_CONTROL, self.config.frame_rate.param())?;
        self.cmd_param(Cmd::POWER_CONTROL, Flag::POWER_CONTROL_AVDD_AVCL)?;
        self.interface.small_data(Flag::POWER_CONTROL_VDS)?;

        self.interface
            .cmd_with_data(Cmd::POSITIVE_GAMMA, &Flag::POSITIVE_GAMMA)?;
        self.interface
            .cmd_with_data(Cmd::NEGATIVE_GAMMA, &Flag::NEGATIVE_GAMMA)?;

        self.invert_colors(self.config.invert)?;
        // Sleep out has to come before normal display on
        self.interface.cmd(Cmd::SLEEP_OUT)?;
        self.interface.cmd(Cmd::NORMAL_ON)?;

        // Clear frame memory while the panel is still dark
        self.clear_screen(self.config.background)?;
        self.interface.cmd(Cmd::DISPLAY_ON)?;

        log::info!("ST7789 ready, {}x{}", self.width(), self.height());
        Ok(())
    }

    fn cmd_param(&mut self, command: u8, value: u8) -> Result<(), Error> {
        self.interface.cmd(command)?;
        self.interface.small_data(value)
    }

    /// Program the scan direction and switch to the matching geometry
    pub fn set_rotation(&mut self, rotation: DisplayRotation) -> Result<(), Error> {
        self.cmd_param(Cmd::MEMORY_ACCESS_CONTROL, rotation.madctl())?;
        self.config.rotation = rotation;
        self.geometry = Geometry::for_panel(self.config.variant, rotation);
        log::debug!(
            "Rotation {:?}: {}x{} shifted by ({}, {})",
            rotation,
            self.geometry.width,
            self.geometry.height,
            self.geometry.x_shift,
            self.geometry.y_shift
        );
        Ok(())
    }

    /// Select the frame memory window for the inclusive rectangle and start a memory write
    pub fn set_address_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Result<AddressWindow, Error> {
        let window = self.geometry.window(x0, y0, x1, y1)?;
        self.interface
            .cmd_with_data(Cmd::COLUMN_ADDRESS_SET, &window.column_bytes())?;
        self.interface
            .cmd_with_data(Cmd::ROW_ADDRESS_SET, &window.row_bytes())?;
        self.interface.cmd(Cmd::MEMORY_WRITE)?;
        Ok(window)
    }

    /// Fill the whole visible panel with `color`
    pub fn clear_screen(&mut self, color: Rgb565) -> Result<(), Error> {
        let (w, h) = (self.width(), self.height());
        self.set_address_window(0, 0, w - 1, h - 1)?;
        self.fill_pixels(self.geometry.pixel_count(), color)
    }

    /// Set one pixel; coordinates off the panel are ignored without bus traffic
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Rgb565) -> Result<(), Error> {
        if !self.geometry.contains(x, y) {
            return Ok(());
        }
        let (x, y) = (x as u16, y as u16);
        self.set_address_window(x, y, x, y)?;
        self.interface
            .data(Payload::Bytes(&color.into_storage().to_be_bytes()))
    }

    /// Stream `count` pixels of `color` into the window opened last
    pub fn fill_pixels(&mut self, count: u32, color: Rgb565) -> Result<(), Error> {
        self.interface.data(Payload::Repeat {
            word: color.into_storage(),
            count,
        })
    }

    /// Stream literal RGB565 pixels into the window opened last
    pub fn write_pixels(&mut self, pixels: &[u16]) -> Result<(), Error> {
        self.interface.data(Payload::Words(pixels))
    }

    /// Stream colours from an iterator through the stack buffer
    pub fn write_pixel_iter<I>(&mut self, colors: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Rgb565>,
    {
        let mut block = [0u16; FILL_BUFFER_LEN];
        let mut n = 0;
        for color in colors {
            block[n] = color.into_storage();
            n += 1;
            if n == FILL_BUFFER_LEN {
                self.write_pixels(&block)?;
                n = 0;
            }
        }
        self.write_pixels(&block[..n])
    }

    /// Open a window and return a writer for pixel runs inside it
    pub fn fill_area(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Result<AreaFill<'_, PORT, DMA, DC, CS, RST, DELAY>, Error> {
        let window = self.set_address_window(x0, y0, x1, y1)?;
        self.interface.bus.set_word_width(WordWidth::Bits16)?;
        self.interface.dc_data()?;
        Ok(AreaFill {
            remaining: window.pixel_count(),
            display: self,
        })
    }

    /// Solid rectangle, corners inclusive and in any order
    pub fn fill_rect(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        color: Rgb565,
    ) -> Result<(), Error> {
        let (x0, x1) = (x0.min(x1), x0.max(x1));
        let (y0, y1) = (y0.min(y1), y0.max(y1));
        let window = self.set_address_window(x0, y0, x1, y1)?;
        self.fill_pixels(window.pixel_count(), color)
    }

    /// Axis-aligned lines are filled as one-pixel rectangles; anything else is
    /// left to a software line routine
    pub fn draw_line(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        color: Rgb565,
    ) -> Result<LineStatus, Error> {
        if x0 != x1 && y0 != y1 {
            return Ok(LineStatus::Unsupported);
        }
        self.fill_rect(x0, y0, x1, y1, color)?;
        Ok(LineStatus::Drawn)
    }

    /// Blit a 16 bpp bitmap with its top left corner at (x, y)
    ///
    /// The whole bitmap has to fit; nothing is clipped and nothing is sent
    /// when it doesn't.
    pub fn draw_image(&mut self, x: u16, y: u16, bitmap: &Bitmap<'_>) -> Result<(), Error> {
        if bitmap.width == 0 || bitmap.height == 0 {
            log::debug!("Skipping empty bitmap at ({}, {})", x, y);
            return Ok(());
        }

        let x1 = u32::from(x) + u32::from(bitmap.width) - 1;
        let y1 = u32::from(y) + u32::from(bitmap.height) - 1;
        if x1 >= u32::from(self.width()) || y1 >= u32::from(self.height()) {
            log::warn!(
                "Bitmap {}x{} at ({}, {}) does not fit on {}x{} panel",
                bitmap.width,
                bitmap.height,
                x,
                y,
                self.width(),
                self.height()
            );
            return Err(Error::OutOfBounds {
                x0: u32::from(x),
                y0: u32::from(y),
                x1,
                y1,
                width: self.width(),
                height: self.height(),
            });
        }
        if bitmap.bpp != Bitmap::BPP_RGB565 {
            log::warn!("Bitmap depth {} bpp is not supported", bitmap.bpp);
            return Err(Error::UnsupportedFormat { bpp: bitmap.bpp });
        }
        let expected = bitmap.pixel_count();
        if bitmap.pixels.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: bitmap.pixels.len(),
            });
        }

        self.set_address_window(x, y, x1 as u16, y1 as u16)?;
        self.write_pixels(bitmap.pixels)
    }

    /// INVON / INVOFF
    pub fn invert_colors(&mut self, invert: bool) -> Result<(), Error> {
        self.interface.cmd(if invert {
            Cmd::INVERSION_ON
        } else {
            Cmd::INVERSION_OFF
        })
    }

    /// Enable the tearing effect output (V-blank only) or turn it off
    pub fn tear_effect(&mut self, enable: bool) -> Result<(), Error> {
        if enable {
            self.cmd_param(Cmd::TEARING_ON, 0x00)
        } else {
            self.interface.cmd(Cmd::TEARING_OFF)
        }
    }
}

/// Pixel-run writer for a window opened by [`St7789::fill_area`]
pub struct AreaFill<'a, PORT, DMA, DC, CS, RST, DELAY> {
    display: &'a mut St7789<PORT, DMA, DC, CS, RST, DELAY>,
    remaining: u32,
}

impl<PORT, DMA, DC, CS, RST, DELAY> AreaFill<'_, PORT, DMA, DC, CS, RST, DELAY>
where
    PORT: SpiPort,
    DMA: TxDma,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// `count` pixels of one colour
    pub fn fill(&mut self, count: u32, color: Rgb565) -> Result<(), Error> {
        self.display.fill_pixels(count, color)?;
        self.remaining = self.remaining.saturating_sub(count);
        Ok(())
    }

    pub fn write(&mut self, pixels: &[u16]) -> Result<(), Error> {
        self.display.write_pixels(pixels)?;
        self.remaining = self.remaining.saturating_sub(pixels.len() as u32);
        Ok(())
    }

    /// Pixels left before the window is full
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}
