//! Which effect slot each DSP currently serves.
//!
//! The amp only learns that a slot changed hands when the DSP previously
//! holding it is explicitly cleared, so the session remembers the last
//! packet it sent to every DSP. At most one DSP holds a given logical slot.

use crate::constants::{EFFECT_SLOTS, WIRE_SLOTS};
use crate::effects::Dsp;
use crate::packet::Packet;

/// The last effect packet sent to (or reported by) one DSP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DspSnapshot(Packet);

impl DspSnapshot {
    pub fn packet(&self) -> &Packet {
        &self.0
    }

    /// Slot as stored on the wire, 0-7.
    pub fn wire_slot(&self) -> u8 {
        self.0.effect_slot()
    }

    /// Whether this DSP serves logical slot `slot` (pre- or post-amp).
    pub fn holds(&self, slot: u8) -> bool {
        let stored = self.wire_slot();
        stored == slot || stored == slot.wrapping_add(4)
    }

    /// The packet that removes this DSP's effect while keeping its slot and
    /// DSP identity.
    pub fn clear_packet(&self) -> Packet {
        self.0.without_effect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DspSlots {
    entries: [Option<DspSnapshot>; EFFECT_SLOTS],
}

impl DspSlots {
    /// A table with every DSP unassigned.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, dsp: Dsp) -> Option<&DspSnapshot> {
        self.entries[dsp.index()].as_ref()
    }

    /// DSP currently serving logical slot `slot`.
    pub fn occupant(&self, slot: u8) -> Option<Dsp> {
        Dsp::ALL
            .into_iter()
            .find(|&dsp| self.get(dsp).is_some_and(|snapshot| snapshot.holds(slot)))
    }

    /// Mark `dsp` unassigned, returning what it held.
    pub fn release(&mut self, dsp: Dsp) -> Option<DspSnapshot> {
        self.entries[dsp.index()].take()
    }

    /// Release whichever DSP serves logical slot `slot`.
    pub fn take_occupant(&mut self, slot: u8) -> Option<(Dsp, DspSnapshot)> {
        let dsp = self.occupant(slot)?;
        self.release(dsp).map(|snapshot| (dsp, snapshot))
    }

    /// Record `packet` as the latest state of the DSP it addresses. Any other
    /// DSP claiming the same logical slot is released. A slot byte of 8 or
    /// more marks the DSP unassigned. Returns `None` when the packet does not
    /// address an effect DSP.
    pub fn assign(&mut self, packet: Packet) -> Option<Dsp> {
        let dsp = Dsp::try_from(packet.dsp()).ok()?;
        if packet.effect_slot() >= WIRE_SLOTS {
            self.release(dsp);
            return Some(dsp);
        }
        let logical = packet.effect_slot() % 4;
        for other in Dsp::ALL {
            if other != dsp && self.get(other).is_some_and(|snapshot| snapshot.holds(logical)) {
                self.release(other);
            }
        }
        self.entries[dsp.index()] = Some(DspSnapshot(packet));
        Some(dsp)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dsp, &DspSnapshot)> {
        Dsp::ALL
            .into_iter()
            .filter_map(move |dsp| self.get(dsp).map(|snapshot| (dsp, snapshot)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }
}
