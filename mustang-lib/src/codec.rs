//! Pure conversions between packets and domain structures.
//!
//! Nothing here performs I/O or touches session state. Encoders build each
//! packet fresh from a template; decoders read a seven-packet bank block
//! (name, amplifier, four effect DSPs, USB gain) or a preset-list stream.

use crate::amp::{AmpModel, AmpSettings, Cabinet};
use crate::constants::{
    BANK_PACKETS, EFFECT_SLOTS, LARGE_CATALOG_PACKETS, LARGE_CATALOG_THRESHOLD, PRESET_NAME_SIZE, SAVE_NAME_SIZE,
    SMALL_CATALOG_PACKETS, WIRE_SLOTS,
};
use crate::dsp::DspSlots;
use crate::effects::{Dsp, EffectSettings, EffectType, KnobPage};
use crate::error::{MustangError, Result};
use crate::packet::{Packet, offset};
use tracing::warn;

/// The seven packets the amp sends for one bank.
pub type BankBlock = [Packet; BANK_PACKETS];

const SET: [u8; 2] = [0x1c, 0x03];
const STORE: [u8; 2] = [0x1c, 0x01];

const AMP_DSP: u8 = 0x05;
const USB_GAIN_DSP: u8 = 0x0d;

/// Byte 2 selectors of the `STORE` family.
const LOAD_SLOT_SELECTOR: u8 = 0x01;
const NAME_SELECTOR: u8 = 0x03;
const SAVE_EFFECTS_SELECTOR: u8 = 0x04;

/// Flag byte 21 of every effect packet.
const EFFECT_TRAILING_FLAG: u8 = 0x01;

const BANK_NAME: usize = 0;
const BANK_AMP: usize = 1;
const BANK_USB_GAIN: usize = 6;

const MAX_NOISE_GATE: u8 = 0x05;
const MAX_THRESHOLD: u8 = 0x09;
const MAX_SAG: u8 = 0x02;

fn write_template(command: [u8; 2]) -> Packet {
    Packet::command(command[0], command[1])
        .with_byte(offset::WRITE_FLAG, 0x01)
        .with_byte(offset::WRITE_FLAG2, 0x01)
}

fn effect_template() -> Packet {
    write_template(SET).with_flags([0x00, 0x08, EFFECT_TRAILING_FLAG])
}

pub fn decode_name(data: &BankBlock) -> String {
    data[BANK_NAME].name(PRESET_NAME_SIZE)
}

pub fn decode_amplifier(data: &BankBlock) -> AmpSettings {
    let amp = &data[BANK_AMP];
    let model = AmpModel::from_id(amp.model()).unwrap_or_else(|| {
        warn!(id = amp.model(), "Unknown amplifier model id, using default");
        AmpModel::default()
    });

    AmpSettings {
        model,
        gain: amp.byte(offset::GAIN),
        volume: amp.byte(offset::VOLUME),
        treble: amp.byte(offset::TREBLE),
        middle: amp.byte(offset::MIDDLE),
        bass: amp.byte(offset::BASS),
        cabinet: Cabinet::try_from(amp.byte(offset::CABINET)).unwrap_or_default(),
        noise_gate: amp.byte(offset::NOISE_GATE),
        master_vol: amp.byte(offset::MASTER_VOL),
        gain2: amp.byte(offset::GAIN2),
        presence: amp.byte(offset::PRESENCE),
        threshold: amp.byte(offset::THRESHOLD),
        depth: amp.byte(offset::DEPTH),
        bias: amp.byte(offset::BIAS),
        sag: amp.byte(offset::SAG),
        brightness: amp.byte(offset::BRIGHTNESS) != 0,
        usb_gain: data[BANK_USB_GAIN].byte(offset::USB_GAIN),
    }
}

/// Decode the four logical effect slots of a bank.
///
/// Also returns the DSP table as the bank reports it: `prior` overlaid with
/// one snapshot per effect DSP found in `data`. The caller decides whether
/// to adopt it.
pub fn decode_effects(prior: &DspSlots, data: &BankBlock) -> ([EffectSettings; EFFECT_SLOTS], DspSlots) {
    let dsp_packets = || data.iter().filter(|packet| Dsp::try_from(packet.dsp()).is_ok());

    let mut effects = [EffectSettings::default(); EFFECT_SLOTS];
    for (slot, settings) in (0u8..).zip(effects.iter_mut()) {
        let holder = dsp_packets().find(|packet| packet.effect_slot() < WIRE_SLOTS && packet.effect_slot() % 4 == slot);
        *settings = match holder {
            Some(packet) => decode_effect_packet(slot, packet),
            None => EffectSettings::empty(slot),
        };
    }

    // a DSP reporting a slot byte past the wire range is released
    let mut slots = prior.clone();
    for packet in dsp_packets() {
        let flags = packet.flags();
        slots.assign(
            effect_template()
                .with_dsp(packet.dsp())
                .with_effect_slot(packet.effect_slot())
                .with_flags([flags[0], flags[1], EFFECT_TRAILING_FLAG]),
        );
    }

    (effects, slots)
}

fn decode_effect_packet(slot: u8, packet: &Packet) -> EffectSettings {
    let effect = Dsp::try_from(packet.dsp())
        .ok()
        .and_then(|dsp| EffectType::from_ids(dsp, packet.model()))
        .unwrap_or_else(|| {
            warn!(dsp = packet.dsp(), id = packet.model(), "Unknown effect id, treating slot as empty");
            EffectType::Empty
        });

    EffectSettings {
        slot,
        effect,
        knobs: packet.knobs(),
        post_amp: packet.effect_slot() > 3,
    }
}

/// Preset names from a preset-list stream: one 32-byte name in every
/// second packet.
pub fn decode_preset_list(data: &[Packet]) -> Vec<String> {
    data.iter().step_by(2).map(|packet| packet.name(PRESET_NAME_SIZE)).collect()
}

/// Length of the preset-list prefix of an initial dump that took `reads`
/// reads (terminating zero-length read included).
pub fn catalog_packets(reads: usize) -> usize {
    if reads > LARGE_CATALOG_THRESHOLD {
        LARGE_CATALOG_PACKETS
    } else {
        SMALL_CATALOG_PACKETS
    }
}

pub fn encode_amplifier(amp: &AmpSettings) -> Packet {
    let layout = amp.model.layout();
    let noise_gate = if amp.noise_gate > MAX_NOISE_GATE { 0 } else { amp.noise_gate };

    let mut packet = write_template(SET)
        .with_dsp(AMP_DSP)
        .with_model(layout.id)
        .with_byte(offset::AMP_TRAILER, layout.trailer)
        .with_byte(offset::GAIN, amp.gain)
        .with_byte(offset::VOLUME, amp.volume)
        .with_byte(offset::TREBLE, amp.treble)
        .with_byte(offset::MIDDLE, amp.middle)
        .with_byte(offset::BASS, amp.bass)
        .with_byte(offset::CABINET, amp.cabinet.into())
        .with_byte(offset::NOISE_GATE, noise_gate)
        .with_byte(offset::MASTER_VOL, amp.master_vol)
        .with_byte(offset::GAIN2, amp.gain2)
        .with_byte(offset::PRESENCE, amp.presence)
        .with_byte(offset::BIAS, amp.bias)
        .with_byte(offset::SAG, if amp.sag > MAX_SAG { 0x01 } else { amp.sag })
        .with_byte(offset::BRIGHTNESS, amp.brightness.into());

    for channel in offset::CHANNEL {
        packet = packet.with_byte(channel, layout.channel);
    }

    // threshold and depth only mean something with the custom gate
    if amp.noise_gate == AmpSettings::CUSTOM_NOISE_GATE {
        let threshold = if amp.threshold > MAX_THRESHOLD { 0 } else { amp.threshold };
        packet = packet
            .with_byte(offset::THRESHOLD, threshold)
            .with_byte(offset::DEPTH, amp.depth);
    }

    packet
}

pub fn encode_amplifier_usb_gain(amp: &AmpSettings) -> Packet {
    write_template(SET)
        .with_dsp(USB_GAIN_DSP)
        .with_byte(offset::USB_GAIN, amp.usb_gain)
}

/// Name packet for bank `slot`. Names longer than 22 bytes are truncated.
pub fn encode_name(slot: u8, name: &str) -> Packet {
    write_template(STORE)
        .with_byte(offset::DSP, NAME_SELECTOR)
        .with_save_slot(slot)
        .with_name(name, SAVE_NAME_SIZE)
}

/// Live effect packet. [`EffectType::Empty`] yields a packet addressing no
/// DSP; callers clear slots with [`encode_clear_effect`] instead.
pub fn encode_effect(effect: &EffectSettings) -> Packet {
    let packet = effect_template().with_effect_slot(effect.wire_slot());
    let Some(layout) = effect.effect.layout() else {
        return packet;
    };

    let mut knobs = [0; 6];
    knobs[..layout.knob_count].copy_from_slice(&effect.knobs[..layout.knob_count]);
    if let Some(clamp) = layout.clamp {
        knobs[clamp.knob] = knobs[clamp.knob].min(clamp.max);
    }

    packet
        .with_dsp(layout.dsp.into())
        .with_model(layout.id)
        .with_flags([layout.flags[0], layout.flags[1], EFFECT_TRAILING_FLAG])
        .with_knobs(knobs)
}

pub fn encode_clear_effect() -> Packet {
    effect_template()
}

pub fn encode_apply() -> Packet {
    Packet::command(SET[0], SET[1])
}

/// Apply command tagged with the knob page of `effect`.
pub fn encode_apply_for(effect: &EffectSettings) -> Packet {
    encode_apply().with_knob_page(effect.effect.knob_page().into())
}

/// Every packet of a save-effects transaction, in send order: the name
/// packet, one packet per persisted effect, then the tagged apply.
///
/// More than two effects persists only the first. A first effect on the
/// single knob page also persists alone. Every effect that would be sent
/// must be saveable and sit in slot 0-3, otherwise nothing is built.
pub fn encode_save_name_and_effects(slot: u8, name: &str, effects: &[EffectSettings]) -> Result<Vec<Packet>> {
    let first = effects.first().ok_or(MustangError::NoEffects)?;
    let mut count = if effects.len() > 2 { 1 } else { effects.len() };

    for effect in &effects[..count] {
        effect.check_slot()?;
        if !effect.effect.is_saveable() {
            return Err(MustangError::InvalidEffect(effect.effect));
        }
    }

    let page = first.effect.knob_page();
    if page == KnobPage::Single {
        count = 1;
    }

    let mut packets = Vec::with_capacity(count + 2);
    packets.push(
        write_template(STORE)
            .with_byte(offset::DSP, SAVE_EFFECTS_SELECTOR)
            .with_knob_page(page.into())
            .with_save_slot(slot)
            .with_name(name, SAVE_NAME_SIZE),
    );
    packets.extend(effects[..count].iter().map(|effect| {
        encode_effect(effect)
            .with_knob_page(page.into())
            .with_save_slot(slot)
            .with_byte(offset::WRITE_FLAG, 0x00)
    }));
    packets.push(encode_apply().with_knob_page(page.into()));

    Ok(packets)
}

pub fn encode_load_slot(slot: u8) -> Packet {
    Packet::command(STORE[0], STORE[1])
        .with_byte(offset::DSP, LOAD_SLOT_SELECTOR)
        .with_save_slot(slot)
        .with_byte(offset::WRITE_FLAG, 0x01)
}

/// Ask the amp to dump its preset list and current bank.
pub fn encode_load() -> Packet {
    Packet::command(0xff, 0xc1)
}

/// Handshake that makes the amp answer later requests.
pub fn encode_init() -> [Packet; 2] {
    [Packet::command(0x00, 0xc3), Packet::command(0x1a, 0x03)]
}
