//! Session lifecycle, live effect changes and amplifier updates

mod common;

use common::*;

#[test]
fn test_start_sends_handshake_then_load() {
    let (session, mock) = started_session();
    assert_eq!(session.state(), SessionState::Open);

    let [init0, init1] = codec::encode_init();
    assert_eq!(mock.written(), vec![init0, init1, codec::encode_load()]);
    assert_eq!(mock.state().opens, 1);
}

#[test]
fn test_start_reuses_open_transport() {
    let mock = MockTransport::new();
    let mut transport = mock.clone();
    transport.open(USB_VID, &[0x0004]).unwrap();
    script_start(&mock, &[]);

    let mut session = Session::new(transport);
    session.start().unwrap();
    assert_eq!(mock.state().opens, 1);
}

#[test]
fn test_start_without_device_fails() {
    let mut session = Session::new(MockTransport::unplugged());
    assert!(matches!(session.start(), Err(MustangError::DeviceNotFound)));
    assert_eq!(session.state(), SessionState::Closed);
}

#[test]
fn test_start_failure_closes_transport() {
    let mock = MockTransport::new();
    mock.fail_write_at(1);
    let mut session = Session::new(mock.clone());

    assert!(session.start().is_err());
    assert_eq!(session.state(), SessionState::Closed);
    assert!(!mock.state().open);
    assert_eq!(mock.state().closes, 1);
}

#[test]
fn test_operations_fail_before_start() {
    let mock = MockTransport::new();
    let mut session = Session::new(mock.clone());

    assert!(matches!(
        session.set_effect(&EffectSettings::new(0, EffectType::SineChorus, [0; 6])),
        Err(MustangError::SessionClosed)
    ));
    assert!(matches!(
        session.set_amplifier(&AmpSettings::default()),
        Err(MustangError::SessionClosed)
    ));
    assert!(matches!(session.save_on_amp("x", 0), Err(MustangError::SessionClosed)));
    assert!(matches!(
        session.load_memory_bank(0, BankParts::ALL),
        Err(MustangError::SessionClosed)
    ));
    assert!(matches!(
        session.save_effects(0, "x", &[EffectSettings::new(0, EffectType::MonoDelay, [0; 6])]),
        Err(MustangError::SessionClosed)
    ));
    assert_eq!(mock.write_count(), 0);
}

#[test]
fn test_stop_is_idempotent() {
    let (mut session, mock) = started_session();

    session.stop();
    session.stop();
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(mock.state().closes, 1);
    assert!(session.dsp_slots().is_empty());

    let before = mock.write_count();
    assert!(matches!(session.load_bank(3), Err(MustangError::SessionClosed)));
    assert_eq!(mock.write_count(), before);
}

#[test]
fn test_drop_closes_transport() {
    let (session, mock) = started_session();
    assert!(mock.state().open);

    drop(session);
    assert!(!mock.state().open);
    assert_eq!(mock.state().closes, 1);
}

#[test]
fn test_restart_after_stop() {
    let (mut session, mock) = started_session();
    session.stop();

    script_start(&mock, &[]);
    session.start().unwrap();
    assert_eq!(session.state(), SessionState::Open);
    assert_eq!(mock.state().opens, 2);
}

#[test]
fn test_set_effect_into_free_slot() {
    let (mut session, mock) = started_session();
    let chorus = EffectSettings::new(1, EffectType::SineChorus, [10, 20, 30, 40, 50, 0]);

    session.set_effect(&chorus).unwrap();

    let sent = mock.written_after(START_PACKETS);
    assert_eq!(
        sent,
        vec![
            codec::encode_clear_effect(),
            codec::encode_apply(),
            codec::encode_effect(&chorus),
            codec::encode_apply(),
        ]
    );
    assert_eq!(session.occupant(1), Some(Dsp::Modulation));
}

#[test]
fn test_set_effect_clears_previous_dsp_first() {
    let (mut session, mock) = started_session();
    let chorus = EffectSettings::new(2, EffectType::SineChorus, [1, 2, 3, 4, 5, 0]);
    let delay = EffectSettings::new(2, EffectType::MonoDelay, [6, 7, 8, 9, 10, 0]);

    session.set_effect(&chorus).unwrap();
    let before = mock.write_count();
    session.set_effect(&delay).unwrap();

    let sent = mock.written_after(before);
    assert_eq!(sent.len(), 4);

    let clear = sent[0];
    assert_eq!(clear.dsp(), u8::from(Dsp::Modulation));
    assert_eq!(clear.effect_slot(), 2);
    assert_eq!(clear.model(), 0);
    assert_eq!(clear.knobs(), [0; 6]);
    assert_eq!(sent[1], codec::encode_apply());
    assert_eq!(sent[2], codec::encode_effect(&delay));
    assert_eq!(sent[3], codec::encode_apply());

    assert_eq!(session.occupant(2), Some(Dsp::Delay));
    assert!(session.dsp_slots().get(Dsp::Modulation).is_none());
}

#[test]
fn test_set_effect_post_amp_clears_same_logical_slot() {
    let (mut session, mock) = started_session();
    session
        .set_effect(&EffectSettings::new(0, EffectType::Overdrive, [0; 6]))
        .unwrap();

    let before = mock.write_count();
    let reverb = EffectSettings::new(0, EffectType::SmallHallReverb, [0; 6]).post_amp();
    session.set_effect(&reverb).unwrap();

    let sent = mock.written_after(before);
    assert_eq!(sent[0].dsp(), u8::from(Dsp::Stompbox));
    assert_eq!(sent[2].effect_slot(), 4);
    assert_eq!(session.occupant(0), Some(Dsp::Reverb));
    assert!(session.dsp_slots().get(Dsp::Stompbox).is_none());
}

#[test]
fn test_same_dsp_moves_to_another_slot() {
    let (mut session, _mock) = started_session();
    session
        .set_effect(&EffectSettings::new(0, EffectType::MonoDelay, [0; 6]))
        .unwrap();
    session
        .set_effect(&EffectSettings::new(3, EffectType::TapeDelay, [0; 6]))
        .unwrap();

    assert_eq!(session.occupant(0), None);
    assert_eq!(session.occupant(3), Some(Dsp::Delay));
}

#[test]
fn test_set_empty_effect_clears_slot() {
    let (mut session, mock) = started_session();
    session
        .set_effect(&EffectSettings::new(3, EffectType::ArenaReverb, [0; 6]))
        .unwrap();

    let before = mock.write_count();
    session.set_effect(&EffectSettings::empty(3)).unwrap();

    let sent = mock.written_after(before);
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].dsp(), u8::from(Dsp::Reverb));
    assert_eq!(sent[0].model(), 0);
    assert_eq!(sent[1], codec::encode_apply());
    assert_eq!(session.occupant(3), None);
    assert!(session.dsp_slots().is_empty());
}

#[test]
fn test_set_empty_effect_is_idempotent() {
    let (mut session, _mock) = started_session();
    session
        .set_effect(&EffectSettings::new(1, EffectType::Vibratone, [0; 6]))
        .unwrap();
    session
        .set_effect(&EffectSettings::new(2, EffectType::MonoDelay, [0; 6]))
        .unwrap();

    session.set_effect(&EffectSettings::empty(1)).unwrap();
    let once = session.dsp_slots().clone();
    session.set_effect(&EffectSettings::empty(1)).unwrap();

    assert_eq!(session.dsp_slots(), &once);
    assert_eq!(session.occupant(2), Some(Dsp::Delay));
}

#[test]
fn test_set_effect_transport_error_propagates() {
    let (mut session, mock) = started_session();
    mock.fail_write_at(START_PACKETS + 2);

    let result = session.set_effect(&EffectSettings::new(0, EffectType::Fuzz, [0; 6]));
    assert!(matches!(result, Err(MustangError::TransportClosed)));
    // the effect never reached the amp, so no DSP claims the slot
    assert_eq!(session.occupant(0), None);
}

#[test]
fn test_set_amplifier_sends_four_packets() {
    let (mut session, mock) = started_session();
    let amp = AmpSettings {
        model: AmpModel::Metal2000,
        gain: 200,
        cabinet: Cabinet::Cab4x12V,
        usb_gain: 77,
        ..AmpSettings::default()
    };

    session.set_amplifier(&amp).unwrap();

    assert_eq!(
        mock.written_after(START_PACKETS),
        vec![
            codec::encode_amplifier(&amp),
            codec::encode_apply(),
            codec::encode_amplifier_usb_gain(&amp),
            codec::encode_apply(),
        ]
    );
}

#[test]
fn test_set_amplifier_keeps_dsp_table() {
    let (mut session, _mock) = started_session();
    session
        .set_effect(&EffectSettings::new(0, EffectType::Wah, [0; 6]))
        .unwrap();
    session.set_amplifier(&AmpSettings::default()).unwrap();
    assert_eq!(session.occupant(0), Some(Dsp::Stompbox));
}

#[test]
fn test_set_effect_rejects_slot_out_of_range() {
    let (mut session, mock) = started_session();
    session
        .set_effect(&EffectSettings::new(1, EffectType::Phaser, [0; 6]))
        .unwrap();
    let table = session.dsp_slots().clone();
    let before = mock.write_count();

    for slot in [4, 9] {
        let result = session.set_effect(&EffectSettings::new(slot, EffectType::Phaser, [0; 6]));
        assert!(matches!(result, Err(MustangError::InvalidSlot(s)) if s == slot));
    }

    assert_eq!(mock.write_count(), before);
    assert_eq!(session.dsp_slots(), &table);
    assert_eq!(session.occupant(1), Some(Dsp::Modulation));
}
