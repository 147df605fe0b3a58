//! Drawing surfaces on top of the driver
//!
//! [`RasterSink`] is the set of accelerated operations a graphics library can
//! hand off to the controller. The driver is also an `embedded_graphics`
//! [`DrawTarget`], where solid fills and contiguous colour runs go through the
//! address window instead of pixel by pixel.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PointsIter, Rectangle};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::st7789::bus::{SpiPort, TxDma};
use crate::st7789::driver::St7789;
use crate::st7789::error::Error;

/// Raw image in controller pixel order, row by row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitmap<'a> {
    pub width: u16,
    pub height: u16,
    /// Bits per pixel; only [`Bitmap::BPP_RGB565`] can be blitted
    pub bpp: u8,
    pub pixels: &'a [u16],
}

impl<'a> Bitmap<'a> {
    pub const BPP_RGB565: u8 = 16;

    /// 16 bpp RGB565 bitmap
    pub const fn new(width: u16, height: u16, pixels: &'a [u16]) -> Self {
        Bitmap {
            width,
            height,
            bpp: Self::BPP_RGB565,
            pixels,
        }
    }

    pub fn pixel_count(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

/// Outcome of an accelerated line request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Drawn,
    /// Not axis-aligned; the caller draws it in software
    Unsupported,
}

/// Hardware-accelerated drawing hooks
///
/// Coordinates are in rotated panel space, corners inclusive.
pub trait RasterSink {
    type Error;

    /// Pixels off the panel are dropped silently
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb565) -> Result<(), Self::Error>;

    fn fill_rect(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, color: Rgb565)
        -> Result<(), Self::Error>;

    fn draw_line(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        color: Rgb565,
    ) -> Result<LineStatus, Self::Error>;

    fn draw_bitmap(&mut self, x: u16, y: u16, bitmap: &Bitmap<'_>) -> Result<(), Self::Error>;
}

impl<PORT, DMA, DC, CS, RST, DELAY> RasterSink for St7789<PORT, DMA, DC, CS, RST, DELAY>
where
    PORT: SpiPort,
    DMA: TxDma,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    type Error = Error;

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb565) -> Result<(), Error> {
        self.draw_pixel(x, y, color)
    }

    fn fill_rect(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        color: Rgb565,
    ) -> Result<(), Error> {
        St7789::fill_rect(self, x0, y0, x1, y1, color)
    }

    fn draw_line(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        color: Rgb565,
    ) -> Result<LineStatus, Error> {
        St7789::draw_line(self, x0, y0, x1, y1, color)
    }

    fn draw_bitmap(&mut self, x: u16, y: u16, bitmap: &Bitmap<'_>) -> Result<(), Error> {
        self.draw_image(x, y, bitmap)
    }
}

impl<PORT, DMA, DC, CS, RST, DELAY> OriginDimensions for St7789<PORT, DMA, DC, CS, RST, DELAY> {
    fn size(&self) -> Size {
        Size::new(u32::from(self.width()), u32::from(self.height()))
    }
}

impl<PORT, DMA, DC, CS, RST, DELAY> DrawTarget for St7789<PORT, DMA, DC, CS, RST, DELAY>
where
    PORT: SpiPort,
    DMA: TxDma,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    type Color = Rgb565;
    type Error = Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Pixel<Rgb565>>,
    {
        for Pixel(point, color) in pixels {
            self.draw_pixel(point.x, point.y, color)?;
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Rgb565>,
    {
        let drawable = area.intersection(&self.bounding_box());
        if drawable != *area {
            // Partly off panel: only the visible pixels, one at a time
            return self.draw_iter(
                area.points()
                    .zip(colors)
                    .filter(|(point, _)| drawable.contains(*point))
                    .map(|(point, color)| Pixel(point, color)),
            );
        }
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        self.set_address_window(
            area.top_left.x as u16,
            area.top_left.y as u16,
            bottom_right.x as u16,
            bottom_right.y as u16,
        )?;
        let count = area.size.width as usize * area.size.height as usize;
        self.write_pixel_iter(colors.into_iter().take(count))
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Rgb565) -> Result<(), Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        St7789::fill_rect(
            self,
            area.top_left.x as u16,
            area.top_left.y as u16,
            bottom_right.x as u16,
            bottom_right.y as u16,
            color,
        )
    }

    fn clear(&mut self, color: Rgb565) -> Result<(), Error> {
        self.clear_screen(color)
    }
}
