//! ST7789 panel driver with a chunked/DMA transfer engine and acceleration
//! hooks for embedded graphics libraries.
//!
//! See [`st7789`] for the driver and [`st7789::driver::St7789`] for the entry point.

pub mod st7789;
