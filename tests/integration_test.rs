//! Integration tests for the complete sample-stream decode pipeline
//!
//! Every test synthesizes a demodulated stream (encode → render to samples,
//! 10 samples per bit unless stated otherwise), drives it through a
//! [`Decoder`] one sample at a time and checks the emitted events.

use std::cell::RefCell;
use std::rc::Rc;

use rustyeczas::time::EPOCH_2000_UNIX_OFFSET;
use rustyeczas::{
    frame, sim, Decoder, FrameEncoder, ProcessingError, TimeData, TimeFrame, TimeZoneOffset,
    TransmitterState,
};

const SPB: u8 = 10;

/// Everything a decoder run can report, in emission order.
#[derive(Debug, Clone, PartialEq)]
enum Event {
    Raw(TimeFrame, u32),
    Rs(TimeFrame, u32),
    Crc(TimeFrame, u32),
    Time(TimeData, u32),
    Error(ProcessingError),
}

fn recording_decoder(samples_per_bit: u8) -> (Decoder, Rc<RefCell<Vec<Event>>>) {
    let mut decoder = Decoder::new(samples_per_bit);
    let events = Rc::new(RefCell::new(Vec::new()));

    let log = events.clone();
    decoder.on_raw_frame(move |frame, n| log.borrow_mut().push(Event::Raw(*frame, n)));
    let log = events.clone();
    decoder.on_rs_frame(move |frame, n| log.borrow_mut().push(Event::Rs(*frame, n)));
    let log = events.clone();
    decoder.on_crc_frame(move |frame, n| log.borrow_mut().push(Event::Crc(*frame, n)));
    let log = events.clone();
    decoder.on_time_data(move |time, n| log.borrow_mut().push(Event::Time(*time, n)));
    let log = events.clone();
    decoder.on_processing_error(move |error| log.borrow_mut().push(Event::Error(error)));

    (decoder, events)
}

fn run(decoder: &mut Decoder, samples: &[i16]) {
    for &sample in samples {
        decoder.process_sample(sample);
    }
}

fn test_time(utc_seconds_since_2000: u64) -> TimeData {
    TimeData {
        utc_seconds_since_2000,
        unix_seconds: utc_seconds_since_2000 + EPOCH_2000_UNIX_OFFSET,
        offset: TimeZoneOffset::OffsetPlus1h,
        time_zone_change_announced: true,
        leap_second_announced: true,
        leap_second_positive: false,
        transmitter_state: TransmitterState::PlannedMaintenance1Week,
    }
}

fn stream_with_frame(frame: &TimeFrame, lead_in: usize, tail: usize) -> Vec<i16> {
    let mut samples = sim::idle_samples(lead_in);
    samples.extend(sim::frame_samples(frame, SPB as usize, sim::DEFAULT_AMPLITUDE));
    samples.extend(sim::idle_samples(tail));
    samples
}

fn stage_names(events: &[Event]) -> Vec<&'static str> {
    events
        .iter()
        .map(|event| match event {
            Event::Raw(..) => "raw",
            Event::Rs(..) => "rs",
            Event::Crc(..) => "crc",
            Event::Time(..) => "time",
            Event::Error(..) => "error",
        })
        .collect()
}

#[test]
fn test_clean_zero_payload_frame() {
    // T = 0: start of the 2000 epoch, all flags clear
    let encoder = FrameEncoder::new();
    let time = TimeData {
        utc_seconds_since_2000: 0,
        unix_seconds: EPOCH_2000_UNIX_OFFSET,
        offset: TimeZoneOffset::OffsetPlus0h,
        time_zone_change_announced: false,
        leap_second_announced: false,
        leap_second_positive: false,
        transmitter_state: TransmitterState::NormalOperation,
    };
    let frame = encoder.encode(&time);

    let (mut decoder, events) = recording_decoder(SPB);
    run(&mut decoder, &stream_with_frame(&frame, 50, 200));

    let events = events.borrow();
    assert_eq!(stage_names(&events), ["raw", "rs", "crc", "time"]);
    match &events[3] {
        Event::Time(decoded, first_sample) => {
            assert_eq!(*decoded, time);
            assert_eq!(decoded.unix_seconds, 946_684_800);
            assert_eq!(*first_sample, 50);
        }
        other => panic!("expected a time event, got {other:?}"),
    }
    assert_eq!(decoder.false_detections(), 0);
}

#[test]
fn test_single_symbol_error_corrected_by_rs() {
    let encoder = FrameEncoder::new();
    let time = test_time(768_831_264);
    let clean = encoder.encode(&time);

    // Corrupt one 4-bit symbol inside the message window (the middle
    // nibble of byte 4)
    let mut corrupted = clean;
    corrupted[4] ^= 0x1E;
    eprintln!("corrupting byte 4: {:02X} -> {:02X}", clean[4], corrupted[4]);

    let (mut decoder, events) = recording_decoder(SPB);
    run(&mut decoder, &stream_with_frame(&corrupted, 37, 200));

    let events = events.borrow();
    assert_eq!(stage_names(&events), ["raw", "rs", "crc", "time"]);
    assert_eq!(events[0], Event::Raw(corrupted, 37));
    // The RS stage must deliver the repaired frame
    assert_eq!(events[1], Event::Rs(clean, 37));
    assert_eq!(events[2], Event::Crc(clean, 37));
    match &events[3] {
        Event::Time(decoded, _) => assert_eq!(*decoded, time),
        other => panic!("expected a time event, got {other:?}"),
    }
}

#[test]
fn test_sk1_flip_repaired_by_crc() {
    let encoder = FrameEncoder::new();
    let time = test_time(768_831_264);
    let clean = encoder.encode(&time);

    // Flip SK1 after frame assembly: outside the RS window, caught by CRC
    let mut corrupted = clean;
    corrupted[7] ^= 0x01;

    let (mut decoder, events) = recording_decoder(SPB);
    run(&mut decoder, &stream_with_frame(&corrupted, 37, 200));

    let events = events.borrow();
    assert_eq!(stage_names(&events), ["raw", "rs", "crc", "time"]);
    // RS sees no symbol errors, so its frame still carries the flip
    assert_eq!(events[1], Event::Rs(corrupted, 37));
    // The CRC stage restores SK1
    assert_eq!(events[2], Event::Crc(clean, 37));
    match &events[3] {
        Event::Time(decoded, _) => {
            assert_eq!(
                decoded.transmitter_state,
                TransmitterState::PlannedMaintenance1Week
            );
        }
        other => panic!("expected a time event, got {other:?}"),
    }
}

#[test]
fn test_four_symbol_errors_fail_rs() {
    let encoder = FrameEncoder::new();
    let clean = encoder.encode(&test_time(768_831_264));

    // Four corrupted symbols exceed t = 3
    let mut codeword = frame::extract_rs_codeword(&clean);
    for symbol in codeword[..4].iter_mut() {
        *symbol ^= 0x1;
    }
    let mut corrupted = clean;
    frame::apply_rs_codeword(&mut corrupted, &codeword);

    let (mut decoder, events) = recording_decoder(SPB);
    run(&mut decoder, &stream_with_frame(&corrupted, 37, 400));

    let events = events.borrow();
    let stages = stage_names(&events);
    assert!(stages.starts_with(&["raw", "error"]), "got {stages:?}");
    assert!(events.contains(&Event::Error(ProcessingError::RsCorrectionFailed)));
    assert!(
        !stages.contains(&"time"),
        "an unrecoverable frame must not produce time data"
    );
}

#[test]
fn test_unrepairable_crc_drops_frame() {
    let encoder = FrameEncoder::new();
    let clean = encoder.encode(&test_time(768_831_264));

    // Corrupt the CRC byte itself; RS does not cover it and no SK1 flip
    // can explain the mismatch
    let mut corrupted = clean;
    corrupted[11] ^= 0xA5;

    let (mut decoder, events) = recording_decoder(SPB);
    run(&mut decoder, &stream_with_frame(&corrupted, 37, 400));

    let events = events.borrow();
    let stages = stage_names(&events);
    assert_eq!(stages, ["raw", "rs", "error"]);
    assert_eq!(
        events[2],
        Event::Error(ProcessingError::CrcCorrectionFailed)
    );
}

#[test]
fn test_pure_noise_produces_no_events() {
    let (mut decoder, events) = recording_decoder(SPB);

    // Uniform in-band noise, deterministic
    let mut samples = vec![0i16; 10_000];
    sim::add_uniform_noise(&mut samples, 15_000, 42);
    run(&mut decoder, &samples);

    assert!(events.borrow().is_empty());
}

#[test]
fn test_two_back_to_back_frames() {
    let encoder = FrameEncoder::new();
    let first_time = test_time(768_831_264);
    // 96 s later: the next distinct on-air counter value
    let second_time = test_time(768_831_264 + 96);

    let gap = sim::inter_frame_gap(SPB as usize, 3);
    let mut samples = sim::idle_samples(23);
    samples.extend(sim::frame_samples(
        &encoder.encode(&first_time),
        SPB as usize,
        sim::DEFAULT_AMPLITUDE,
    ));
    samples.extend(sim::idle_samples(gap));
    samples.extend(sim::frame_samples(
        &encoder.encode(&second_time),
        SPB as usize,
        sim::DEFAULT_AMPLITUDE,
    ));
    samples.extend(sim::idle_samples(1_200));

    let (mut decoder, events) = recording_decoder(SPB);
    run(&mut decoder, &samples);

    let events = events.borrow();
    let times: Vec<(TimeData, u32)> = events
        .iter()
        .filter_map(|event| match event {
            Event::Time(time, n) => Some((*time, *n)),
            _ => None,
        })
        .collect();

    assert_eq!(times.len(), 2, "expected exactly two time messages");
    assert_eq!(times[0].0, first_time);
    assert_eq!(times[1].0, second_time);
    // Absolute sample numbers of each frame's first sample
    assert_eq!(times[0].1, 23);
    assert_eq!(times[1].1, 23 + 960 + gap as u32);
}

#[test]
fn test_in_band_noise_overlay_still_decodes() {
    let encoder = FrameEncoder::new();
    let time = test_time(768_831_264);
    let mut samples = stream_with_frame(&encoder.encode(&time), 37, 200);
    // 7000 keeps quiet periods inside the hysteresis and transitions outside
    sim::add_uniform_noise(&mut samples, 7_000, 1);

    let (mut decoder, events) = recording_decoder(SPB);
    run(&mut decoder, &samples);

    let events = events.borrow();
    assert_eq!(stage_names(&events), ["raw", "rs", "crc", "time"]);
    match &events[3] {
        Event::Time(decoded, _) => assert_eq!(*decoded, time),
        other => panic!("expected a time event, got {other:?}"),
    }
}

#[test]
fn test_single_sample_per_bit() {
    let encoder = FrameEncoder::new();
    let time = test_time(96);
    let frame = encoder.encode(&time);

    let mut samples = sim::idle_samples(11);
    samples.extend(sim::frame_samples(&frame, 1, sim::DEFAULT_AMPLITUDE));
    samples.extend(sim::idle_samples(400));

    let (mut decoder, events) = recording_decoder(1);
    run(&mut decoder, &samples);

    let events = events.borrow();
    assert_eq!(stage_names(&events), ["raw", "rs", "crc", "time"]);
    match &events[3] {
        Event::Time(decoded, n) => {
            assert_eq!(decoded.utc_seconds_since_2000, 96);
            assert_eq!(*n, 11);
        }
        other => panic!("expected a time event, got {other:?}"),
    }
}

#[test]
fn test_widest_usable_oversampling_stays_in_bounds() {
    // 63 samples per bit: a sync word still fits the buffer, a full frame
    // never does. The decoder must neither crash nor emit anything.
    let encoder = FrameEncoder::new();
    let frame = encoder.encode(&test_time(96));

    let mut samples = sim::idle_samples(11);
    samples.extend(sim::frame_samples(&frame, 63, sim::DEFAULT_AMPLITUDE));
    samples.extend(sim::idle_samples(4_000));

    let (mut decoder, events) = recording_decoder(63);
    run(&mut decoder, &samples);

    assert!(events.borrow().is_empty());
}

#[test]
fn test_frame_straddling_end_of_input_is_not_emitted() {
    let encoder = FrameEncoder::new();
    let frame = encoder.encode(&test_time(768_831_264));
    let full = stream_with_frame(&frame, 40, 0);

    // Stop 10 bit periods short of the frame end
    let truncated = &full[..full.len() - 100];
    let (mut decoder, events) = recording_decoder(SPB);
    run(&mut decoder, truncated);
    assert!(events.borrow().is_empty(), "incomplete frame must stay buffered");

    // Delivering the remainder completes the frame
    run(&mut decoder, &full[full.len() - 100..]);
    run(&mut decoder, &sim::idle_samples(200));
    assert_eq!(stage_names(&events.borrow()), ["raw", "rs", "crc", "time"]);
}

#[test]
fn test_decoded_fields_cover_all_wire_codes() {
    for code in 0..4u8 {
        let encoder = FrameEncoder::new();
        let time = TimeData {
            utc_seconds_since_2000: 96 * u64::from(code + 1),
            unix_seconds: 96 * u64::from(code + 1) + EPOCH_2000_UNIX_OFFSET,
            offset: TimeZoneOffset::from_wire(code),
            time_zone_change_announced: code & 1 != 0,
            leap_second_announced: code & 2 != 0,
            leap_second_positive: code == 3,
            transmitter_state: TransmitterState::from_wire(code),
        };

        let (mut decoder, events) = recording_decoder(SPB);
        run(
            &mut decoder,
            &stream_with_frame(&encoder.encode(&time), 29, 200),
        );

        let events = events.borrow();
        match events.last() {
            Some(Event::Time(decoded, _)) => assert_eq!(*decoded, time, "wire code {code}"),
            other => panic!("wire code {code}: expected time data, got {other:?}"),
        }
    }
}
