//! Protocol library for Fender Mustang amplifiers over USB.
//!
//! - [`packet`] - the 64-byte packet and its named fields
//! - [`codec`] - pure encoders and decoders for amp, effect, name and command packets
//! - [`session`] - handshake, bank loads, live changes and saves against a [`Transport`]
//! - [`transport`] - the transport seam and its `nusb` implementation

pub mod amp;
pub mod bank;
pub mod codec;
pub mod constants;
pub mod dsp;
pub mod effects;
pub mod error;
pub mod packet;
pub mod session;
pub mod transport;


pub use amp::{AmpModel, AmpSettings, Cabinet};
pub use bank::{BankParts, InitialData, PartialBank, SignalChain};
pub use effects::{Dsp, EffectSettings, EffectType, KnobPage};
pub use error::{MustangError, Result};
pub use packet::Packet;
pub use session::{Session, SessionState};
pub use transport::{Transport, TransportConfig, UsbTransport};
