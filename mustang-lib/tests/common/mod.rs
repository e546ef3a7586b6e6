//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use mustang_lib::codec;
#[allow(unused_imports)]
pub use mustang_lib::constants::{ENDPOINT_IN, ENDPOINT_OUT, PACKET_SIZE, USB_VID};
#[allow(unused_imports)]
pub use mustang_lib::{
    AmpModel, AmpSettings, BankParts, Cabinet, Dsp, EffectSettings, EffectType, MustangError, Packet, Session,
    SessionState, Transport,
};

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Everything the fake amp saw, shared with the test after the session
/// takes ownership of the transport.
#[derive(Debug, Default)]
pub struct MockState {
    pub open: bool,
    pub opens: usize,
    pub closes: usize,
    pub reads: usize,
    pub written: Vec<Packet>,
    pub replies: VecDeque<Vec<u8>>,
    /// Fail the write with this index (counted from zero).
    pub fail_write_at: Option<usize>,
    pub device_present: bool,
}

/// Scripted transport: writes are recorded, reads pop queued replies and
/// return an empty buffer once the queue runs dry.
#[derive(Debug, Clone)]
pub struct MockTransport {
    state: Rc<RefCell<MockState>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState {
                device_present: true,
                ..MockState::default()
            })),
        }
    }

    /// A transport whose device is never found.
    pub fn unplugged() -> Self {
        let mock = Self::new();
        mock.state.borrow_mut().device_present = false;
        mock
    }

    pub fn reply(&self, bytes: impl AsRef<[u8]>) -> &Self {
        self.state.borrow_mut().replies.push_back(bytes.as_ref().to_vec());
        self
    }

    pub fn reply_packets<'a>(&self, packets: impl IntoIterator<Item = &'a Packet>) -> &Self {
        for packet in packets {
            self.reply(packet);
        }
        self
    }

    /// Queue a zero-length read, ending a multi-packet reply early.
    pub fn end_of_reply(&self) -> &Self {
        self.reply([0u8; 0])
    }

    pub fn fail_write_at(&self, index: usize) {
        self.state.borrow_mut().fail_write_at = Some(index);
    }

    pub fn written(&self) -> Vec<Packet> {
        self.state.borrow().written.clone()
    }

    /// Writes recorded after the first `skip`.
    pub fn written_after(&self, skip: usize) -> Vec<Packet> {
        self.state.borrow().written[skip..].to_vec()
    }

    pub fn write_count(&self) -> usize {
        self.state.borrow().written.len()
    }

    pub fn state(&self) -> std::cell::Ref<'_, MockState> {
        self.state.borrow()
    }
}

impl Transport for MockTransport {
    fn open(&mut self, vendor_id: u16, product_ids: &[u16]) -> mustang_lib::Result<()> {
        let mut state = self.state.borrow_mut();
        assert_eq!(vendor_id, USB_VID);
        assert!(!product_ids.is_empty());
        if !state.device_present {
            return Err(MustangError::DeviceNotFound);
        }
        state.open = true;
        state.opens += 1;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.borrow().open
    }

    fn close(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.open {
            state.closes += 1;
        }
        state.open = false;
    }

    fn write(&mut self, endpoint: u8, data: &[u8]) -> mustang_lib::Result<usize> {
        let mut state = self.state.borrow_mut();
        assert_eq!(endpoint, ENDPOINT_OUT);
        assert_eq!(data.len(), PACKET_SIZE);
        if !state.open {
            return Err(MustangError::TransportClosed);
        }
        if state.fail_write_at == Some(state.written.len()) {
            return Err(MustangError::TransportClosed);
        }
        state.written.push(Packet::from_slice(data));
        Ok(data.len())
    }

    fn read(&mut self, endpoint: u8, max_len: usize) -> mustang_lib::Result<Vec<u8>> {
        let mut state = self.state.borrow_mut();
        assert_eq!(endpoint, ENDPOINT_IN);
        assert_eq!(max_len, PACKET_SIZE);
        state.reads += 1;
        Ok(state.replies.pop_front().unwrap_or_default())
    }
}

/// Number of packets the handshake writes before the initial dump request.
#[allow(dead_code)]
pub const HANDSHAKE_PACKETS: usize = 2;

/// Writes made by a successful `start`: handshake plus the dump request.
#[allow(dead_code)]
pub const START_PACKETS: usize = HANDSHAKE_PACKETS + 1;

/// A preset-list packet carrying `name`.
#[allow(dead_code)]
pub fn name_packet(name: &str) -> Packet {
    Packet::zeroed().with_name(name, 32)
}

/// The seven packets of a stored bank.
#[allow(dead_code)]
pub fn bank_packets(name: &str, amp: &AmpSettings, effects: &[EffectSettings]) -> Vec<Packet> {
    let mut packets = vec![name_packet(name), codec::encode_amplifier(amp)];
    packets.extend(effects.iter().map(codec::encode_effect));
    packets.resize(6, Packet::zeroed());
    packets.push(codec::encode_amplifier_usb_gain(amp));
    packets
}

/// An initial dump: `catalog` preset-list packets followed by a bank.
#[allow(dead_code)]
pub fn initial_dump(catalog: usize, bank: &[Packet]) -> Vec<Packet> {
    let mut packets: Vec<Packet> = (0..catalog)
        .map(|i| {
            if i % 2 == 0 {
                name_packet(&format!("Preset {}", i / 2))
            } else {
                Packet::zeroed()
            }
        })
        .collect();
    packets.extend_from_slice(bank);
    packets
}

/// Queue the handshake acknowledgements and `dump` as the amp's answers.
#[allow(dead_code)]
pub fn script_start(mock: &MockTransport, dump: &[Packet]) {
    for _ in 0..HANDSHAKE_PACKETS {
        mock.reply([0u8; PACKET_SIZE]);
    }
    mock.reply_packets(dump).end_of_reply();
}

/// A session that completed `start` against an amp with an empty bank.
#[allow(dead_code)]
pub fn started_session() -> (Session<MockTransport>, MockTransport) {
    let mock = MockTransport::new();
    script_start(&mock, &[]);
    let mut session = Session::new(mock.clone());
    session.start().expect("start should succeed");
    (session, mock)
}
