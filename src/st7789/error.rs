//! Error type shared by every layer of the driver

pub use display_interface::DisplayError;

/// Everything that can go wrong between a draw call and the wire
///
/// Pin and bus write faults keep the `display_interface` vocabulary
/// (`DCError`, `CSError`, `RSError`, `BusWriteError`) so the driver slots into
/// code that already speaks it. Bounds and format rejections are reported
/// before any byte is sent.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A control pin or the SPI peripheral refused an operation
    #[error("display interface error: {0:?}")]
    Interface(DisplayError),

    /// Reprogramming the SPI frame size or the DMA channel failed
    #[error("peripheral reconfiguration failed")]
    Reconfigure,

    /// The DMA ready flag never came up within the configured poll budget
    #[error("DMA transfer did not complete after {polls} polls")]
    DmaTimeout { polls: u32 },

    /// The requested area does not fit on the panel
    #[error("area ({x0}, {y0})..=({x1}, {y1}) lies outside the {width}x{height} panel")]
    OutOfBounds {
        x0: u32,
        y0: u32,
        x1: u32,
        y1: u32,
        width: u16,
        height: u16,
    },

    /// Only 16 bpp RGB565 bitmaps can be blitted
    #[error("unsupported bitmap depth: {bpp} bpp (only 16 bpp RGB565 is supported)")]
    UnsupportedFormat { bpp: u8 },

    /// Bitmap pixel buffer does not match its declared dimensions
    #[error("buffer size mismatch: expected {expected} pixels, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },
}

impl From<DisplayError> for Error {
    fn from(err: DisplayError) -> Self {
        Error::Interface(err)
    }
}
