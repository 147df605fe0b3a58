//! Panel geometry and address window computation
//!
//! The ST7789 frame memory is 240x320. Smaller glass is mounted somewhere
//! inside that array, so every logical coordinate is shifted by a fixed,
//! per-rotation offset before it reaches CASET/RASET.

use crate::st7789::error::Error;
use crate::st7789::flag::Flag;

/// Physical panel mounted on the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelVariant {
    /// 1.14" 135x240
    Panel135x240,
    /// 1.3" 240x240
    Panel240x240,
}

/// Scan direction programmed through MADCTL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayRotation {
    /// Portrait, MX | MY
    Rotate0,
    /// Landscape, MY | MV
    Rotate90,
    /// Portrait, no mirroring
    Rotate180,
    /// Landscape, MX | MV
    Rotate270,
}

impl DisplayRotation {
    /// Rotation for a 0-3 index as used in board configuration
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(DisplayRotation::Rotate0),
            1 => Some(DisplayRotation::Rotate90),
            2 => Some(DisplayRotation::Rotate180),
            3 => Some(DisplayRotation::Rotate270),
            _ => None,
        }
    }

    /// MADCTL parameter for this rotation
    pub const fn madctl(self) -> u8 {
        match self {
            DisplayRotation::Rotate0 => Flag::MADCTL_MX | Flag::MADCTL_MY | Flag::MADCTL_RGB,
            DisplayRotation::Rotate90 => Flag::MADCTL_MY | Flag::MADCTL_MV | Flag::MADCTL_RGB,
            DisplayRotation::Rotate180 => Flag::MADCTL_RGB,
            DisplayRotation::Rotate270 => Flag::MADCTL_MX | Flag::MADCTL_MV | Flag::MADCTL_RGB,
        }
    }

    /// Rows and columns are exchanged
    pub const fn is_landscape(self) -> bool {
        matches!(
            self,
            DisplayRotation::Rotate90 | DisplayRotation::Rotate270
        )
    }
}

/// Visible size and frame memory offset for one (variant, rotation) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u16,
    pub height: u16,
    pub x_shift: u16,
    pub y_shift: u16,
}

impl Geometry {
    /// Look up the geometry; the table is the only place shifts are defined
    pub const fn for_panel(variant: PanelVariant, rotation: DisplayRotation) -> Self {
        use DisplayRotation::*;
        use PanelVariant::*;

        let (width, height, x_shift, y_shift) = match (variant, rotation) {
            (Panel135x240, Rotate0) => (135, 240, 53, 40),
            (Panel135x240, Rotate90) => (240, 135, 40, 52),
            (Panel135x240, Rotate180) => (135, 240, 52, 40),
            (Panel135x240, Rotate270) => (240, 135, 40, 53),
            (Panel240x240, Rotate0) => (240, 240, 0, 80),
            (Panel240x240, Rotate90) => (240, 240, 80, 0),
            (Panel240x240, Rotate180) => (240, 240, 0, 0),
            (Panel240x240, Rotate270) => (240, 240, 0, 0),
        };

        Geometry {
            width,
            height,
            x_shift,
            y_shift,
        }
    }

    /// Number of visible pixels
    pub const fn pixel_count(&self) -> u32 {
        self.width as u32 * self.height as u32
    }

    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    /// Window for the inclusive rectangle (x0, y0)..=(x1, y1)
    ///
    /// Corners must already be ordered and both must be on the panel.
    pub fn window(&self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<AddressWindow, Error> {
        if x0 > x1 || y0 > y1 || x1 >= self.width || y1 >= self.height {
            log::warn!(
                "Rejecting window ({}, {})..=({}, {}) on {}x{} panel",
                x0,
                y0,
                x1,
                y1,
                self.width,
                self.height
            );
            return Err(Error::OutOfBounds {
                x0: u32::from(x0),
                y0: u32::from(y0),
                x1: u32::from(x1),
                y1: u32::from(y1),
                width: self.width,
                height: self.height,
            });
        }

        Ok(AddressWindow {
            x_start: x0 + self.x_shift,
            x_end: x1 + self.x_shift,
            y_start: y0 + self.y_shift,
            y_end: y1 + self.y_shift,
        })
    }
}

/// Frame memory rectangle, already shifted, as written to CASET/RASET
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressWindow {
    pub x_start: u16,
    pub x_end: u16,
    pub y_start: u16,
    pub y_end: u16,
}

impl AddressWindow {
    /// CASET parameters, big-endian start then end
    pub const fn column_bytes(&self) -> [u8; 4] {
        be_pair(self.x_start, self.x_end)
    }

    /// RASET parameters, big-endian start then end
    pub const fn row_bytes(&self) -> [u8; 4] {
        be_pair(self.y_start, self.y_end)
    }

    pub const fn pixel_count(&self) -> u32 {
        (self.x_end - self.x_start + 1) as u32 * (self.y_end - self.y_start + 1) as u32
    }
}

const fn be_pair(start: u16, end: u16) -> [u8; 4] {
    let [s_hi, s_lo] = start.to_be_bytes();
    let [e_hi, e_lo] = end.to_be_bytes();
    [s_hi, s_lo, e_hi, e_lo]
}
