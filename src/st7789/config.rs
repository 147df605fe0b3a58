//! Runtime configuration, seeded from the build-time constants in the parent module

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::st7789::flag::Flag;
use crate::st7789::geometry::{DisplayRotation, PanelVariant};
use crate::st7789::{DMA_MIN_TRANSFER, ROTATION, VARIANT};

/// How long to busy-poll the DMA ready flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitPolicy {
    /// Poll until the channel reports ready, however long that takes
    #[default]
    Spin,
    /// Give up after this many polls, abort the channel and report a timeout
    Bounded { polls: u32 },
}

/// Porch timing preset (0xB2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Porch {
    #[default]
    Standard,
    /// Shortest porches; refreshes about 7% faster but not every panel copes
    Minimum,
}

impl Porch {
    pub const fn params(self) -> [u8; 5] {
        match self {
            Porch::Standard => Flag::PORCH_STANDARD,
            Porch::Minimum => Flag::PORCH_MINIMUM,
        }
    }
}

/// Normal-mode frame rate preset (0xC6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameRate {
    #[default]
    Hz60,
    Hz111,
}

impl FrameRate {
    pub const fn param(self) -> u8 {
        match self {
            FrameRate::Hz60 => Flag::FRAME_RATE_60HZ,
            FrameRate::Hz111 => Flag::FRAME_RATE_111HZ,
        }
    }
}

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub variant: PanelVariant,
    pub rotation: DisplayRotation,
    /// Minimum transfer length, in bus units, that is handed to DMA
    pub dma_threshold: usize,
    pub dma_wait: WaitPolicy,
    pub porch: Porch,
    pub frame_rate: FrameRate,
    /// IPS panels need inversion on to show true colours
    pub invert: bool,
    /// Colour written over the whole frame memory before the display is switched on
    pub background: Rgb565,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variant: VARIANT,
            rotation: ROTATION,
            dma_threshold: DMA_MIN_TRANSFER,
            dma_wait: WaitPolicy::Spin,
            porch: Porch::Standard,
            frame_rate: FrameRate::Hz60,
            invert: true,
            background: Rgb565::BLACK,
        }
    }
}

impl Config {
    pub const fn with_variant(mut self, variant: PanelVariant) -> Self {
        self.variant = variant;
        self
    }

    pub const fn with_rotation(mut self, rotation: DisplayRotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub const fn with_dma_threshold(mut self, units: usize) -> Self {
        self.dma_threshold = units;
        self
    }

    pub const fn with_dma_wait(mut self, wait: WaitPolicy) -> Self {
        self.dma_wait = wait;
        self
    }

    pub const fn with_porch(mut self, porch: Porch) -> Self {
        self.porch = porch;
        self
    }

    pub const fn with_frame_rate(mut self, frame_rate: FrameRate) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub const fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub const fn with_background(mut self, background: Rgb565) -> Self {
        self.background = background;
        self
    }
}
