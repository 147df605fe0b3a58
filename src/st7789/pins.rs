//! Pin definitions for the ST7789 module on the ESP32-S3 board

/// GPIO assignments used by the board binary
pub struct Pins;

impl Pins {
    /// SPI Clock pin
    pub const SCK: u8 = 12;
    /// SPI Master Out Slave In
    pub const MOSI: u8 = 11;
    /// Chip Select pin, driven by the driver rather than the SPI peripheral
    pub const CS: u8 = 10;
    /// Data/Command control pin (High for data, Low for command)
    pub const DC: u8 = 13;
    /// Reset pin for display
    pub const RST: u8 = 14;
    /// Backlight enable
    pub const BLK: u8 = 15;
}
