use crate::amp::AmpSettings;
use crate::constants::EFFECT_SLOTS;
use crate::effects::EffectSettings;
use serde::{Deserialize, Serialize};

/// A fully decoded bank: name, amplifier and the four effect slots.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalChain {
    pub name: String,
    pub amp: AmpSettings,
    pub effects: [EffectSettings; EFFECT_SLOTS],
}

/// What the amp reports right after the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InitialData {
    pub chain: SignalChain,
    pub presets: Vec<String>,
}

/// Parts of a bank to decode after loading it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BankParts {
    pub name: bool,
    pub amp: bool,
    pub effects: bool,
}

impl BankParts {
    pub const NONE: BankParts = BankParts {
        name: false,
        amp: false,
        effects: false,
    };

    pub const ALL: BankParts = BankParts {
        name: true,
        amp: true,
        effects: true,
    };

    pub fn any(&self) -> bool {
        self.name || self.amp || self.effects
    }
}

/// A loaded bank with only the requested parts decoded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartialBank {
    pub name: Option<String>,
    pub amp: Option<AmpSettings>,
    pub effects: Option<[EffectSettings; EFFECT_SLOTS]>,
}

impl PartialBank {
    /// Combine into a [`SignalChain`], defaulting any part not decoded.
    pub fn into_chain(self) -> SignalChain {
        SignalChain {
            name: self.name.unwrap_or_default(),
            amp: self.amp.unwrap_or_default(),
            effects: self
                .effects
                .unwrap_or_else(|| std::array::from_fn(|slot| EffectSettings::empty(slot as u8))),
        }
    }
}
