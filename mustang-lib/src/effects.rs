//! Effect pedals and the per-type encoding table.
//!
//! [`EffectType::layout`] is the single source of truth for how each pedal is
//! laid out on the wire. The encoder reads it forwards and the decoder
//! inverts it through [`EffectType::from_ids`].

use crate::constants::EFFECT_SLOTS;
use crate::error::{MustangError, Result};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::Display;

/// Physical effect processor inside the amp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Dsp {
    Stompbox = 0x06,
    Modulation = 0x07,
    Delay = 0x08,
    Reverb = 0x09,
}

impl Dsp {
    pub const ALL: [Dsp; EFFECT_SLOTS] = [Dsp::Stompbox, Dsp::Modulation, Dsp::Delay, Dsp::Reverb];

    /// Position in the session's DSP table.
    pub fn index(self) -> usize {
        u8::from(self) as usize - 0x06
    }
}

/// Which knob page a save or tagged apply commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum KnobPage {
    Single = 0x01,
    Dual = 0x02,
}

/// Upper bound imposed on one knob by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnobClamp {
    pub knob: usize,
    pub max: u8,
}

/// Wire layout of one effect type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectLayout {
    pub dsp: Dsp,
    pub id: u8,
    /// Bytes 19 and 20 of the effect packet.
    pub flags: [u8; 2],
    pub knob_page: KnobPage,
    /// Knobs carried on the wire; the rest are sent as zero.
    pub knob_count: usize,
    pub clamp: Option<KnobClamp>,
}

/// Flag bytes 19 and 20 of an effect packet that has no special flags.
pub const DEFAULT_FLAGS: [u8; 2] = [0x00, 0x08];

const fn stomp(id: u8, flag: u8) -> EffectLayout {
    EffectLayout {
        dsp: Dsp::Stompbox,
        id,
        flags: [flag, 0x08],
        knob_page: KnobPage::Dual,
        knob_count: 5,
        clamp: None,
    }
}

const fn modulation(id: u8) -> EffectLayout {
    EffectLayout {
        dsp: Dsp::Modulation,
        id,
        flags: [0x01, 0x01],
        knob_page: KnobPage::Single,
        knob_count: 5,
        clamp: None,
    }
}

const fn delay(id: u8, knob_count: usize) -> EffectLayout {
    EffectLayout {
        dsp: Dsp::Delay,
        id,
        flags: [0x02, 0x01],
        knob_page: KnobPage::Dual,
        knob_count,
        clamp: None,
    }
}

const fn reverb(id: u8) -> EffectLayout {
    EffectLayout {
        dsp: Dsp::Reverb,
        id,
        flags: DEFAULT_FLAGS,
        knob_page: KnobPage::Dual,
        knob_count: 5,
        clamp: None,
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EffectType {
    #[default]
    Empty = 0,

    Overdrive,
    Wah,
    TouchWah,
    Fuzz,
    FuzzTouchWah,
    SimpleComp,
    Compressor,

    SineChorus,
    TriangleChorus,
    SineFlanger,
    TriangleFlanger,
    Vibratone,
    VintageTremolo,
    SineTremolo,
    RingModulator,
    StepFilter,
    Phaser,
    PitchShifter,

    MonoDelay,
    MonoEchoFilter,
    StereoEchoFilter,
    MultitapDelay,
    PingPongDelay,
    DuckingDelay,
    ReverseDelay,
    TapeDelay,
    StereoTapeDelay,

    SmallHallReverb,
    LargeHallReverb,
    SmallRoomReverb,
    LargeRoomReverb,
    SmallPlateReverb,
    LargePlateReverb,
    AmbientReverb,
    ArenaReverb,
    Fender63SpringReverb,
    Fender65SpringReverb,
}

impl EffectType {
    pub const ALL: [EffectType; 38] = [
        EffectType::Empty,
        EffectType::Overdrive,
        EffectType::Wah,
        EffectType::TouchWah,
        EffectType::Fuzz,
        EffectType::FuzzTouchWah,
        EffectType::SimpleComp,
        EffectType::Compressor,
        EffectType::SineChorus,
        EffectType::TriangleChorus,
        EffectType::SineFlanger,
        EffectType::TriangleFlanger,
        EffectType::Vibratone,
        EffectType::VintageTremolo,
        EffectType::SineTremolo,
        EffectType::RingModulator,
        EffectType::StepFilter,
        EffectType::Phaser,
        EffectType::PitchShifter,
        EffectType::MonoDelay,
        EffectType::MonoEchoFilter,
        EffectType::StereoEchoFilter,
        EffectType::MultitapDelay,
        EffectType::PingPongDelay,
        EffectType::DuckingDelay,
        EffectType::ReverseDelay,
        EffectType::TapeDelay,
        EffectType::StereoTapeDelay,
        EffectType::SmallHallReverb,
        EffectType::LargeHallReverb,
        EffectType::SmallRoomReverb,
        EffectType::LargeRoomReverb,
        EffectType::SmallPlateReverb,
        EffectType::LargePlateReverb,
        EffectType::AmbientReverb,
        EffectType::ArenaReverb,
        EffectType::Fender63SpringReverb,
        EffectType::Fender65SpringReverb,
    ];

    /// Lowest effect type the save path accepts.
    pub const MIN_SAVEABLE: EffectType = EffectType::SineChorus;

    /// Wire layout for this type, `None` for [`EffectType::Empty`].
    pub const fn layout(self) -> Option<EffectLayout> {
        use EffectType::*;
        let layout = match self {
            Empty => return None,

            Overdrive => stomp(0x3c, 0x00),
            Wah => stomp(0x49, 0x01),
            TouchWah => stomp(0x4a, 0x01),
            Fuzz => stomp(0x1a, 0x00),
            FuzzTouchWah => stomp(0x1c, 0x00),
            SimpleComp => EffectLayout {
                knob_count: 1,
                clamp: Some(KnobClamp { knob: 0, max: 0x03 }),
                ..stomp(0x88, 0x08)
            },
            Compressor => stomp(0x07, 0x00),

            SineChorus => modulation(0x12),
            TriangleChorus => modulation(0x13),
            SineFlanger => modulation(0x18),
            TriangleFlanger => modulation(0x19),
            Vibratone => modulation(0x2d),
            VintageTremolo => modulation(0x40),
            SineTremolo => modulation(0x41),
            RingModulator => EffectLayout {
                flags: [0x01, 0x08],
                clamp: Some(KnobClamp { knob: 3, max: 0x01 }),
                ..modulation(0x22)
            },
            StepFilter => modulation(0x29),
            Phaser => EffectLayout {
                clamp: Some(KnobClamp { knob: 4, max: 0x01 }),
                ..modulation(0x4f)
            },
            PitchShifter => EffectLayout {
                flags: [0x01, 0x08],
                ..modulation(0x1f)
            },

            MonoDelay => delay(0x16, 5),
            MonoEchoFilter => delay(0x43, 6),
            StereoEchoFilter => delay(0x48, 6),
            MultitapDelay => delay(0x44, 5),
            PingPongDelay => delay(0x45, 5),
            DuckingDelay => delay(0x15, 5),
            ReverseDelay => delay(0x46, 5),
            TapeDelay => delay(0x2b, 6),
            StereoTapeDelay => delay(0x2a, 6),

            SmallHallReverb => reverb(0x24),
            LargeHallReverb => reverb(0x3a),
            SmallRoomReverb => reverb(0x26),
            LargeRoomReverb => reverb(0x3b),
            SmallPlateReverb => reverb(0x4e),
            LargePlateReverb => reverb(0x4b),
            AmbientReverb => reverb(0x4c),
            ArenaReverb => reverb(0x4d),
            Fender63SpringReverb => reverb(0x21),
            Fender65SpringReverb => reverb(0x0b),
        };
        Some(layout)
    }

    /// Inverse of [`EffectType::layout`]: the type a DSP reports for an id.
    pub fn from_ids(dsp: Dsp, id: u8) -> Option<EffectType> {
        if id == 0 {
            return Some(EffectType::Empty);
        }
        EffectType::ALL
            .into_iter()
            .find(|effect| effect.layout().is_some_and(|layout| layout.dsp == dsp && layout.id == id))
    }

    pub fn is_empty(self) -> bool {
        self == EffectType::Empty
    }

    /// Whether the save path may persist this type.
    pub fn is_saveable(self) -> bool {
        u8::from(self) >= u8::from(EffectType::MIN_SAVEABLE)
    }

    /// Whether the pedal uses a sixth knob.
    pub fn has_extra_knob(self) -> bool {
        self.layout().is_some_and(|layout| layout.knob_count == 6)
    }

    pub fn knob_page(self) -> KnobPage {
        self.layout().map_or(KnobPage::Dual, |layout| layout.knob_page)
    }
}

impl FromStr for EffectType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        EffectType::ALL
            .into_iter()
            .find(|effect| effect.to_string() == s)
            .ok_or_else(|| format!("unknown effect type '{s}'"))
    }
}

/// One pedal as seen by the user: type, logical slot and knob positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EffectSettings {
    /// Logical slot, 0-3.
    pub slot: u8,
    pub effect: EffectType,
    pub knobs: [u8; 6],
    /// Place the pedal after the amplifier rather than before it.
    #[serde(default)]
    pub post_amp: bool,
}

impl EffectSettings {
    pub fn new(slot: u8, effect: EffectType, knobs: [u8; 6]) -> Self {
        Self {
            slot,
            effect,
            knobs,
            post_amp: false,
        }
    }

    /// Settings that clear `slot` when sent through the live path.
    pub fn empty(slot: u8) -> Self {
        Self {
            slot,
            ..Self::default()
        }
    }

    pub fn post_amp(self) -> Self {
        Self { post_amp: true, ..self }
    }

    /// Fail with [`MustangError::InvalidSlot`] unless the logical slot is 0-3.
    pub fn check_slot(&self) -> Result<()> {
        if usize::from(self.slot) < EFFECT_SLOTS {
            Ok(())
        } else {
            Err(MustangError::InvalidSlot(self.slot))
        }
    }

    /// Slot number as written on the wire: post-amp pedals sit at 4-7.
    /// Only meaningful once [`EffectSettings::check_slot`] passed.
    pub fn wire_slot(&self) -> u8 {
        if self.post_amp { self.slot.saturating_add(4) } else { self.slot }
    }
}
