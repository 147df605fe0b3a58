//! One display, several drawing threads
//!
//! Every hook locks the whole driver for the duration of the call, so address
//! window setup and the pixel stream that follows it can't interleave with
//! another caller's.

use std::sync::{Arc, Mutex, MutexGuard};

use embedded_graphics::pixelcolor::Rgb565;

use crate::st7789::graphics::{Bitmap, LineStatus, RasterSink};

/// Cloneable handle to a display behind a mutex
pub struct SharedDisplay<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for SharedDisplay<S> {
    fn clone(&self) -> Self {
        SharedDisplay {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> SharedDisplay<S> {
    pub fn new(display: S) -> Self {
        SharedDisplay {
            inner: Arc::new(Mutex::new(display)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, S> {
        // A panic mid-draw leaves at worst a half-painted window; the
        // controller state is rewritten by the next window anyway
        self.inner.lock().unwrap_or_else(|poisoned| {
            log::warn!("Display lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Run `f` with exclusive access, e.g. for [`crate::st7789::St7789::fill_area`]
    pub fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.lock())
    }
}

impl<S: RasterSink> RasterSink for SharedDisplay<S> {
    type Error = S::Error;

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb565) -> Result<(), S::Error> {
        self.lock().set_pixel(x, y, color)
    }

    fn fill_rect(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        color: Rgb565,
    ) -> Result<(), S::Error> {
        self.lock().fill_rect(x0, y0, x1, y1, color)
    }

    fn draw_line(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        color: Rgb565,
    ) -> Result<LineStatus, S::Error> {
        self.lock().draw_line(x0, y0, x1, y1, color)
    }

    fn draw_bitmap(&mut self, x: u16, y: u16, bitmap: &Bitmap<'_>) -> Result<(), S::Error> {
        self.lock().draw_bitmap(x, y, bitmap)
    }
}
