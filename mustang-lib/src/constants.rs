// Protocol constants for the Mustang amplifier family

/// Fender USB vendor id
pub const USB_VID: u16 = 0x1ed8;

/// Mustang I and II
pub const SMALL_AMPS_USB_PID: u16 = 0x0004;
/// Mustang III, IV and V
pub const BIG_AMPS_USB_PID: u16 = 0x0005;
/// Mustang I and II, v2 firmware
pub const SMALL_AMPS_V2_USB_PID: u16 = 0x0014;
/// Mustang III, IV and V, v2 firmware
pub const BIG_AMPS_V2_USB_PID: u16 = 0x0016;
pub const MINI_USB_PID: u16 = 0x0010;
pub const FLOOR_USB_PID: u16 = 0x0012;

/// Product ids tried in order when opening a device
pub const PRODUCT_IDS: [u16; 6] = [
    SMALL_AMPS_USB_PID,
    BIG_AMPS_USB_PID,
    SMALL_AMPS_V2_USB_PID,
    BIG_AMPS_V2_USB_PID,
    MINI_USB_PID,
    FLOOR_USB_PID,
];

pub const ENDPOINT_OUT: u8 = 0x01;
pub const ENDPOINT_IN: u8 = 0x81;

/// Every transfer in either direction is one 64-byte packet
pub const PACKET_SIZE: usize = 64;

/// Packets describing one stored bank (name, amp, four effects, USB gain)
pub const BANK_PACKETS: usize = 7;

/// Upper bound on packets kept from the initial "dump everything" reply
pub const MAX_INITIAL_PACKETS: usize = 296;

/// More reads than this during the initial dump means the large catalog
pub const LARGE_CATALOG_THRESHOLD: usize = 143;

/// Preset-list prefix length for amps with 100 presets
pub const LARGE_CATALOG_PACKETS: usize = 200;

/// Preset-list prefix length for amps with 24 presets
pub const SMALL_CATALOG_PACKETS: usize = 48;

/// Length of a preset name as stored in a preset-list packet
pub const PRESET_NAME_SIZE: usize = 32;

/// Length of a name written back to the amp
pub const SAVE_NAME_SIZE: usize = 22;

/// Number of effect DSPs and logical effect slots
pub const EFFECT_SLOTS: usize = 4;

/// Effect slot bytes 0-7 place a pedal (4-7 after the amp). A DSP reporting
/// a slot byte from here up holds no effect; the amp itself sends 0xff.
pub const WIRE_SLOTS: u8 = 8;
