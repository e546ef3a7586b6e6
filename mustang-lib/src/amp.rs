use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::Display;

/// Amplifier model emulated by the preamp DSP.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AmpModel {
    #[default]
    Fender57Deluxe = 0,
    Fender59Bassman,
    Fender57Champ,
    Fender65DeluxeReverb,
    Fender65Princeton,
    Fender65TwinReverb,
    FenderSuperSonic,
    British60s,
    British70s,
    British80s,
    American90s,
    Metal2000,
}

/// Model-specific bytes of the amplifier packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmpModelLayout {
    pub id: u8,
    /// Written to every channel byte.
    pub channel: u8,
    pub trailer: u8,
}

impl AmpModel {
    pub const ALL: [AmpModel; 12] = [
        AmpModel::Fender57Deluxe,
        AmpModel::Fender59Bassman,
        AmpModel::Fender57Champ,
        AmpModel::Fender65DeluxeReverb,
        AmpModel::Fender65Princeton,
        AmpModel::Fender65TwinReverb,
        AmpModel::FenderSuperSonic,
        AmpModel::British60s,
        AmpModel::British70s,
        AmpModel::British80s,
        AmpModel::American90s,
        AmpModel::Metal2000,
    ];

    pub const fn layout(self) -> AmpModelLayout {
        use AmpModel::*;
        let (id, channel, trailer) = match self {
            Fender57Deluxe => (0x67, 0x01, 0x53),
            Fender59Bassman => (0x64, 0x02, 0x6a),
            Fender57Champ => (0x7c, 0x0c, 0x00),
            Fender65DeluxeReverb => (0x53, 0x03, 0x6b),
            Fender65Princeton => (0x6a, 0x04, 0x61),
            Fender65TwinReverb => (0x75, 0x05, 0x72),
            FenderSuperSonic => (0x72, 0x06, 0x79),
            British60s => (0x61, 0x07, 0x5e),
            British70s => (0x79, 0x0b, 0x7c),
            British80s => (0x5e, 0x09, 0x5d),
            American90s => (0x5d, 0x0a, 0x6d),
            Metal2000 => (0x6d, 0x08, 0x75),
        };
        AmpModelLayout { id, channel, trailer }
    }

    pub fn from_id(id: u8) -> Option<AmpModel> {
        AmpModel::ALL.into_iter().find(|model| model.layout().id == id)
    }
}

impl FromStr for AmpModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AmpModel::ALL
            .into_iter()
            .find(|model| model.to_string() == s)
            .ok_or_else(|| format!("unknown amp model '{s}'"))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Cabinet {
    #[default]
    Off = 0x00,
    Cab57Dlx,
    CabBassman,
    Cab65Dlx,
    Cab65Prn,
    CabChamp,
    Cab4x12M,
    Cab2x12C,
    Cab4x12G,
    Cab65Twn,
    Cab4x12V,
    CabSs212,
    CabSs112,
}

/// Amplifier-wide parameters of a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AmpSettings {
    pub model: AmpModel,
    pub gain: u8,
    pub volume: u8,
    pub treble: u8,
    pub middle: u8,
    pub bass: u8,
    pub cabinet: Cabinet,
    /// 0-4 fixed gate levels, 5 custom (threshold and depth apply).
    pub noise_gate: u8,
    pub master_vol: u8,
    pub gain2: u8,
    pub presence: u8,
    pub threshold: u8,
    pub depth: u8,
    pub bias: u8,
    pub sag: u8,
    pub brightness: bool,
    pub usb_gain: u8,
}

impl AmpSettings {
    /// Noise gate setting that enables threshold and depth.
    pub const CUSTOM_NOISE_GATE: u8 = 0x05;
}
