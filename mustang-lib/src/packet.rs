//! Fixed-size packet exchanged with the amplifier.
//!
//! Every transfer is exactly [`PACKET_SIZE`] bytes. Fields live at fixed
//! offsets; [`offset`] names them so call sites never index raw positions.
//! Packets are built by value: start from a template, then chain `with_*`
//! setters. Nothing is mutated in place once a packet is handed out.

use crate::constants::PACKET_SIZE;
use std::fmt;

/// Byte offsets of the named packet fields.
pub mod offset {
    pub const COMMAND: usize = 0;
    pub const SUB_COMMAND: usize = 1;
    pub const DSP: usize = 2;
    pub const KNOB_PAGE: usize = 3;
    pub const SAVE_SLOT: usize = 4;
    /// Set on "write" style commands, cleared in save-effect packets.
    pub const WRITE_FLAG: usize = 6;
    pub const WRITE_FLAG2: usize = 7;

    /// Effect id, amplifier model id, or the first name character.
    pub const MODEL: usize = 16;
    pub const NAME: usize = 16;
    pub const EFFECT_SLOT: usize = 18;
    pub const FLAGS: usize = 19;

    pub const KNOB1: usize = 32;

    pub const GAIN: usize = 32;
    pub const VOLUME: usize = 33;
    pub const GAIN2: usize = 34;
    pub const MASTER_VOL: usize = 35;
    pub const TREBLE: usize = 36;
    pub const MIDDLE: usize = 37;
    pub const BASS: usize = 38;
    pub const PRESENCE: usize = 39;
    pub const DEPTH: usize = 41;
    pub const BIAS: usize = 42;
    pub const CHANNEL: [usize; 4] = [44, 45, 46, 50];
    pub const NOISE_GATE: usize = 47;
    pub const THRESHOLD: usize = 48;
    pub const CABINET: usize = 49;
    pub const SAG: usize = 51;
    pub const BRIGHTNESS: usize = 52;
    pub const AMP_TRAILER: usize = 54;

    /// USB gain lives in the model position of its own page.
    pub const USB_GAIN: usize = 16;
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Packet([u8; PACKET_SIZE]);

impl Packet {
    pub const fn zeroed() -> Self {
        Packet([0; PACKET_SIZE])
    }

    /// A zeroed packet carrying only the two command bytes.
    pub const fn command(command: u8, sub_command: u8) -> Self {
        let mut bytes = [0; PACKET_SIZE];
        bytes[offset::COMMAND] = command;
        bytes[offset::SUB_COMMAND] = sub_command;
        Packet(bytes)
    }

    /// Copy a received buffer into a packet. Short buffers are zero padded,
    /// anything past [`PACKET_SIZE`] is dropped.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut packet = [0; PACKET_SIZE];
        let len = bytes.len().min(PACKET_SIZE);
        packet[..len].copy_from_slice(&bytes[..len]);
        Packet(packet)
    }

    pub fn as_bytes(&self) -> &[u8; PACKET_SIZE] {
        &self.0
    }

    pub fn byte(&self, offset: usize) -> u8 {
        self.0[offset]
    }

    pub fn with_byte(mut self, offset: usize, value: u8) -> Self {
        self.0[offset] = value;
        self
    }

    pub fn dsp(&self) -> u8 {
        self.0[offset::DSP]
    }

    pub fn with_dsp(self, dsp: u8) -> Self {
        self.with_byte(offset::DSP, dsp)
    }

    pub fn knob_page(&self) -> u8 {
        self.0[offset::KNOB_PAGE]
    }

    pub fn with_knob_page(self, page: u8) -> Self {
        self.with_byte(offset::KNOB_PAGE, page)
    }

    pub fn save_slot(&self) -> u8 {
        self.0[offset::SAVE_SLOT]
    }

    pub fn with_save_slot(self, slot: u8) -> Self {
        self.with_byte(offset::SAVE_SLOT, slot)
    }

    pub fn model(&self) -> u8 {
        self.0[offset::MODEL]
    }

    pub fn with_model(self, id: u8) -> Self {
        self.with_byte(offset::MODEL, id)
    }

    /// Raw effect slot: 0-3 pre-amp, 4-7 post-amp, 0xff unassigned.
    pub fn effect_slot(&self) -> u8 {
        self.0[offset::EFFECT_SLOT]
    }

    pub fn with_effect_slot(self, slot: u8) -> Self {
        self.with_byte(offset::EFFECT_SLOT, slot)
    }

    pub fn flags(&self) -> [u8; 3] {
        [
            self.0[offset::FLAGS],
            self.0[offset::FLAGS + 1],
            self.0[offset::FLAGS + 2],
        ]
    }

    pub fn with_flags(mut self, flags: [u8; 3]) -> Self {
        self.0[offset::FLAGS..offset::FLAGS + 3].copy_from_slice(&flags);
        self
    }

    pub fn knobs(&self) -> [u8; 6] {
        let mut knobs = [0; 6];
        knobs.copy_from_slice(&self.0[offset::KNOB1..offset::KNOB1 + 6]);
        knobs
    }

    pub fn with_knobs(mut self, knobs: [u8; 6]) -> Self {
        self.0[offset::KNOB1..offset::KNOB1 + 6].copy_from_slice(&knobs);
        self
    }

    /// Write `name` into the name region, truncated to `len` bytes and NUL
    /// padded, followed by one terminating NUL.
    pub fn with_name(mut self, name: &str, len: usize) -> Self {
        let region = &mut self.0[offset::NAME..=offset::NAME + len];
        region.fill(0);
        let bytes = name.as_bytes();
        let take = bytes.len().min(len);
        region[..take].copy_from_slice(&bytes[..take]);
        self
    }

    /// NUL-terminated name stored in `len` bytes at the name offset.
    pub fn name(&self, len: usize) -> String {
        let region = &self.0[offset::NAME..offset::NAME + len];
        let end = region.iter().position(|&b| b == 0).unwrap_or(len);
        String::from_utf8_lossy(&region[..end]).to_string()
    }

    /// Zero the effect id and every knob, keeping DSP and slot identity.
    pub fn without_effect(self) -> Self {
        self.with_model(0).with_knobs([0; 6])
    }
}

impl Default for Packet {
    fn default() -> Self {
        Packet::zeroed()
    }
}

impl From<[u8; PACKET_SIZE]> for Packet {
    fn from(bytes: [u8; PACKET_SIZE]) -> Self {
        Packet(bytes)
    }
}

impl AsRef<[u8]> for Packet {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Packet({})", hex::encode(self.0))
    }
}
