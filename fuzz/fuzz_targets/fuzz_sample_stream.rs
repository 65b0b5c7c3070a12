//! Fuzz target: debouncer + payload encoder
//!
//! Decodes arbitrary bytes into a stream of classification samples, feeds
//! them through the debouncer, and encodes each one into a beacon payload.
//! Asserts the streak never reaches its threshold unreported and that every
//! payload keeps its preamble and fits the service-data budget.
//!
//! cargo fuzz run fuzz_sample_stream

#![no_main]

use libfuzzer_sys::fuzz_target;
use mlbeacon::advertising::payload::{PAYLOAD_CAP, PREAMBLE, TEXT_CAP, encode, frame_advertisement};
use mlbeacon::decision::debouncer::Debouncer;
use mlbeacon::decision::sample::ClassificationSample;

fuzz_target!(|data: &[u8]| {
    let Some((&threshold, rest)) = data.split_first() else {
        return;
    };
    let threshold = u16::from(threshold % 8) + 1;
    let mut debouncer = Debouncer::new(0.1, 0.8, threshold);

    // Each sample: label length, label bytes, value, anomaly, three timings.
    let mut input = rest;
    while let Some((&len, tail)) = input.split_first() {
        let len = usize::from(len % 40).min(tail.len());
        let (raw_label, tail) = tail.split_at(len);
        if tail.len() < 5 {
            break;
        }
        let value = f32::from(tail[0]) / 255.0;
        let anomaly = f32::from(tail[1]) / 127.5 - 1.0;
        let (t1, t2, t3) = (u32::from(tail[2]), u32::from(tail[3]) << 8, u32::from(tail[4]) << 16);
        input = &tail[5..];

        let label = core::str::from_utf8(raw_label).ok();
        let sample = ClassificationSample::new(label, value, anomaly);

        let _ = debouncer.observe(&sample);
        assert!(debouncer.state().streak < threshold);

        let payload = encode(sample.label.as_deref(), t1, t2, t3);
        assert!(payload.len() <= PREAMBLE.len() + TEXT_CAP);
        assert_eq!(&payload[..PREAMBLE.len()], &PREAMBLE[..]);

        let adv = frame_advertisement(&payload);
        assert!(adv.len() <= PAYLOAD_CAP);
    }
});
