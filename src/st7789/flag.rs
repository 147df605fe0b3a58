/// Parameter values written after the commands in [`crate::st7789::cmd::Cmd`].
///
/// Tuning values are the ones the 1.14" and 1.3" IPS modules ship with.
pub struct Flag;

#[allow(missing_docs)]
impl Flag {
    // Memory Data Access Control (0x36)
    // MAP:   D7  D6  D5  D4  D3  D2  D1  D0
    // param: MY  MX  MV  ML  RGB MH  -   -
    pub const MADCTL_MY: u8 = 0x80; // Page address order, bottom to top
    pub const MADCTL_MX: u8 = 0x40; // Column address order, right to left
    pub const MADCTL_MV: u8 = 0x20; // Page/column exchange
    pub const MADCTL_ML: u8 = 0x10; // Line refresh bottom to top
    pub const MADCTL_BGR: u8 = 0x08;
    pub const MADCTL_RGB: u8 = 0x00;

    // Interface Pixel Format (0x3A)
    pub const COLOR_MODE_16BIT: u8 = 0x55; // RGB565
    pub const COLOR_MODE_18BIT: u8 = 0x66; // RGB666

    // Porch Control (0xB2)
    pub const PORCH_STANDARD: [u8; 5] = [0x0C, 0x0C, 0x00, 0x33, 0x33];
    pub const PORCH_MINIMUM: [u8; 5] = [0x01, 0x01, 0x00, 0x11, 0x11]; // ~7% faster refresh

    // Voltage generator
    pub const GATE_CONTROL_DEFAULT: u8 = 0x35;
    pub const VCOM_0V725: u8 = 0x19; // default 0x20 is 0.75V
    pub const LCM_CONTROL_DEFAULT: u8 = 0x2C;
    pub const VDV_VRH_FROM_COMMAND: u8 = 0x01;
    pub const VRH_4V45: u8 = 0x12; // default 0x0B is 4.1V
    pub const VDV_DEFAULT: u8 = 0x20;
    pub const POWER_CONTROL_AVDD_AVCL: u8 = 0xA4;
    pub const POWER_CONTROL_VDS: u8 = 0xA1;

    // Frame Rate Control in normal mode (0xC6)
    pub const FRAME_RATE_60HZ: u8 = 0x0F;
    pub const FRAME_RATE_111HZ: u8 = 0x01;

    pub const POSITIVE_GAMMA: [u8; 14] = [
        0xD0, 0x04, 0x0D, 0x11, 0x13, 0x2B, 0x3F, 0x54, 0x4C, 0x18, 0x0D, 0x0B, 0x1F, 0x23,
    ];
    pub const NEGATIVE_GAMMA: [u8; 14] = [
        0xD0, 0x04, 0x0C, 0x11, 0x13, 0x2C, 0x3F, 0x44, 0x51, 0x2F, 0x1F, 0x1F, 0x20, 0x23,
    ];
}
