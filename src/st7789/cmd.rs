/// ST7789 command opcodes, sent with DC low.
pub struct Cmd;

#[allow(missing_docs)]
impl Cmd {
    // System
    pub const NOP: u8 = 0x00;
    pub const SW_RESET: u8 = 0x01;
    pub const READ_DISPLAY_ID: u8 = 0x04;
    pub const READ_DISPLAY_STATUS: u8 = 0x09;

    // Power and mode
    pub const SLEEP_IN: u8 = 0x10;
    pub const SLEEP_OUT: u8 = 0x11;
    pub const PARTIAL_ON: u8 = 0x12;
    pub const NORMAL_ON: u8 = 0x13;
    pub const INVERSION_OFF: u8 = 0x20;
    pub const INVERSION_ON: u8 = 0x21;
    pub const DISPLAY_OFF: u8 = 0x28;
    pub const DISPLAY_ON: u8 = 0x29;

    // Addressing
    pub const COLUMN_ADDRESS_SET: u8 = 0x2A;
    pub const ROW_ADDRESS_SET: u8 = 0x2B;
    pub const MEMORY_WRITE: u8 = 0x2C;
    pub const MEMORY_READ: u8 = 0x2E;
    pub const PARTIAL_AREA: u8 = 0x30;
    pub const TEARING_OFF: u8 = 0x34;
    pub const TEARING_ON: u8 = 0x35;
    pub const MEMORY_ACCESS_CONTROL: u8 = 0x36;
    pub const COLOR_MODE: u8 = 0x3A;

    // Panel tuning
    pub const PORCH_CONTROL: u8 = 0xB2;
    pub const GATE_CONTROL: u8 = 0xB7;
    pub const VCOM_SETTING: u8 = 0xBB;
    pub const LCM_CONTROL: u8 = 0xC0;
    pub const VDV_VRH_ENABLE: u8 = 0xC2;
    pub const VRH_SET: u8 = 0xC3;
    pub const VDV_SET: u8 = 0xC4;
    pub const FRAME_RATE_CONTROL: u8 = 0xC6;
    pub const POWER_CONTROL: u8 = 0xD0;
    pub const POSITIVE_GAMMA: u8 = 0xE0;
    pub const NEGATIVE_GAMMA: u8 = 0xE1;

    // Identification
    pub const READ_ID1: u8 = 0xDA;
    pub const READ_ID2: u8 = 0xDB;
    pub const READ_ID3: u8 = 0xDC;
    pub const READ_ID4: u8 = 0xDD;
}
