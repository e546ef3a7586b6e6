//! Stateful conversation with one amplifier.
//!
//! Every operation is a strict sequence of write-one, read-one exchanges.
//! Multi-packet replies are read until the transport returns an empty
//! buffer. The session also owns the DSP table, which must be consulted
//! before an effect is placed into a slot another DSP already serves.

use crate::amp::AmpSettings;
use crate::bank::{BankParts, InitialData, PartialBank, SignalChain};
use crate::codec::{self, BankBlock};
use crate::constants::{BANK_PACKETS, ENDPOINT_IN, ENDPOINT_OUT, MAX_INITIAL_PACKETS, PACKET_SIZE, PRODUCT_IDS, USB_VID};
use crate::dsp::DspSlots;
use crate::effects::{Dsp, EffectSettings};
use crate::error::{MustangError, Result};
use crate::packet::Packet;
use crate::transport::Transport;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Open,
}

/// A connection to one amplifier. Dropping the session stops it.
pub struct Session<T: Transport> {
    transport: T,
    state: SessionState,
    slots: DspSlots,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: SessionState::Closed,
            slots: DspSlots::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn dsp_slots(&self) -> &DspSlots {
        &self.slots
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Open the device if needed, perform the handshake and read the preset
    /// list together with the currently selected bank.
    pub fn start(&mut self) -> Result<InitialData> {
        if !self.transport.is_open() {
            self.transport.open(USB_VID, &PRODUCT_IDS)?;
        }
        self.slots = DspSlots::new();
        self.state = SessionState::Open;

        info!("--- Starting Handshake ---");
        let result = codec::encode_init()
            .iter()
            .try_for_each(|packet| self.exchange(packet).map(drop))
            .and_then(|()| self.load_initial_data());

        if result.is_err() {
            self.stop();
        }
        result
    }

    /// Close the transport. Safe to call more than once.
    pub fn stop(&mut self) {
        if self.state == SessionState::Open {
            info!("Stopping session.");
        }
        self.state = SessionState::Closed;
        self.slots = DspSlots::new();
        self.transport.close();
    }

    fn load_initial_data(&mut self) -> Result<InitialData> {
        info!("--- Initial Data Dump ---");
        let mut received = Vec::with_capacity(MAX_INITIAL_PACKETS);
        let mut reads = 0;
        let mut written = self.send(&codec::encode_load())?;
        while written != 0 {
            let reply = self.receive()?;
            written = reply.len();
            reads += 1;
            if received.len() < MAX_INITIAL_PACKETS {
                received.push(Packet::from_slice(&reply));
            } else if !reply.is_empty() {
                warn!(reads, "Initial dump longer than expected, dropping packet");
            }
        }

        let catalog = codec::catalog_packets(reads);
        info!(reads, presets = catalog / 2, "Initial dump complete");

        // the bank block follows the catalog even when the amp sent fewer
        received.resize(catalog + BANK_PACKETS, Packet::zeroed());
        let presets = codec::decode_preset_list(&received[..catalog]);

        let mut block = [Packet::zeroed(); BANK_PACKETS];
        block.copy_from_slice(&received[catalog..catalog + BANK_PACKETS]);
        let chain = self.decode_bank(&block, BankParts::ALL).into_chain();

        Ok(InitialData { chain, presets })
    }

    /// Place `effect` into its slot, clearing whichever DSP held that slot.
    /// An [`EffectType::Empty`](crate::effects::EffectType::Empty) effect only
    /// clears.
    pub fn set_effect(&mut self, effect: &EffectSettings) -> Result<()> {
        self.ensure_open()?;
        effect.check_slot()?;

        let clear = match self.slots.take_occupant(effect.slot) {
            Some((dsp, snapshot)) => {
                debug!(%dsp, slot = effect.slot, "Clearing previous effect");
                snapshot.clear_packet()
            }
            None => codec::encode_clear_effect(),
        };
        self.exchange(&clear)?;
        self.exchange(&codec::encode_apply())?;

        if effect.effect.is_empty() {
            info!(slot = effect.slot, "Effect slot cleared");
            return Ok(());
        }

        let packet = codec::encode_effect(effect);
        self.exchange(&packet)?;
        self.exchange(&codec::encode_apply())?;

        if let Some(dsp) = self.slots.assign(packet) {
            info!(%dsp, slot = effect.slot, effect = %effect.effect, "Effect set");
        }
        Ok(())
    }

    pub fn set_amplifier(&mut self, amp: &AmpSettings) -> Result<()> {
        self.ensure_open()?;
        self.exchange(&codec::encode_amplifier(amp))?;
        self.exchange(&codec::encode_apply())?;
        self.exchange(&codec::encode_amplifier_usb_gain(amp))?;
        self.exchange(&codec::encode_apply())?;
        info!(model = %amp.model, "Amplifier set");
        Ok(())
    }

    /// Store the current settings under `name` in bank `slot`, then reload
    /// that bank.
    pub fn save_on_amp(&mut self, name: &str, slot: u8) -> Result<()> {
        self.ensure_open()?;
        self.exchange(&codec::encode_name(slot, name))?;
        info!(slot, name, "Bank saved");
        self.load_memory_bank(slot, BankParts::NONE)?;
        Ok(())
    }

    /// Select bank `slot` and decode the requested parts of it.
    pub fn load_memory_bank(&mut self, slot: u8, parts: BankParts) -> Result<PartialBank> {
        self.ensure_open()?;

        let mut block = [Packet::zeroed(); BANK_PACKETS];
        let mut count = 0;
        let mut written = self.send(&codec::encode_load_slot(slot))?;
        while written != 0 {
            let reply = self.receive()?;
            written = reply.len();
            if count < BANK_PACKETS {
                block[count] = Packet::from_slice(&reply);
            }
            count += 1;
        }
        info!(slot, packets = count, "Bank loaded");

        if !parts.any() {
            return Ok(PartialBank::default());
        }
        Ok(self.decode_bank(&block, parts))
    }

    /// Load bank `slot` with every part decoded.
    pub fn load_bank(&mut self, slot: u8) -> Result<SignalChain> {
        Ok(self.load_memory_bank(slot, BankParts::ALL)?.into_chain())
    }

    /// Persist up to two effects with bank `slot`.
    ///
    /// Nothing is sent when the effects are rejected.
    pub fn save_effects(&mut self, slot: u8, name: &str, effects: &[EffectSettings]) -> Result<()> {
        self.ensure_open()?;
        let packets = codec::encode_save_name_and_effects(slot, name, effects)?;
        for packet in &packets {
            self.exchange(packet)?;
        }
        info!(slot, name, effects = packets.len() - 2, "Effects saved");
        Ok(())
    }

    fn decode_bank(&mut self, block: &BankBlock, parts: BankParts) -> PartialBank {
        let effects = parts.effects.then(|| {
            let (effects, slots) = codec::decode_effects(&self.slots, block);
            self.slots = slots;
            for (dsp, snapshot) in self.slots.iter() {
                debug!(%dsp, slot = snapshot.wire_slot(), "DSP assignment");
            }
            effects
        });

        PartialBank {
            name: parts.name.then(|| codec::decode_name(block)),
            amp: parts.amp.then(|| codec::decode_amplifier(block)),
            effects,
        }
    }

    /// DSP currently serving logical `slot`, if any.
    pub fn occupant(&self, slot: u8) -> Option<Dsp> {
        self.slots.occupant(slot)
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            SessionState::Open => Ok(()),
            SessionState::Closed => Err(MustangError::SessionClosed),
        }
    }

    fn send(&mut self, packet: &Packet) -> Result<usize> {
        let written = self.transport.write(ENDPOINT_OUT, packet.as_ref())?;
        if written != 0 && written != PACKET_SIZE {
            return Err(MustangError::ShortWrite {
                expected: PACKET_SIZE,
                actual: written,
            });
        }
        Ok(written)
    }

    fn receive(&mut self) -> Result<Vec<u8>> {
        self.transport.read(ENDPOINT_IN, PACKET_SIZE)
    }

    /// One request and its single reply.
    fn exchange(&mut self, packet: &Packet) -> Result<Vec<u8>> {
        self.send(packet)?;
        self.receive()
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.stop();
    }
}
