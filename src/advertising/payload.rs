//! Beacon payload encoder.
//!
//! The payload is Eddystone-URL style service data:
//!
//! ```text
//!  ┌──────┬──────┬──────┬──────────┬────────┬───────────────────────────┐
//!  │ 0xAA │ 0xFE │ 0x10 │ tx power │ scheme │ "<label>;<t1>;<t2>;<t3>"  │
//!  │ UUID (LE)   │ URL  │   0x00   │  0x00  │ cut at TEXT_CAP bytes     │
//!  └──────┴──────┴──────┴──────────┴────────┴───────────────────────────┘
//! ```
//!
//! [`frame_advertisement`] wraps it into raw legacy advertising data.

use core::fmt::{self, Write};

/// Service data header: UUID 0xFEAA, URL frame, 0 dBm, scheme 0.
pub const PREAMBLE: [u8; 5] = [0xaa, 0xfe, 0x10, 0x00, 0x00];

/// Bytes of text carried after the preamble.
pub const TEXT_CAP: usize = 17;

/// Legacy advertising data limit.
pub const PAYLOAD_CAP: usize = 31;

/// Encoded service data.
pub type Payload = heapless::Vec<u8, PAYLOAD_CAP>;

/// Appends bytes up to `limit`, silently discarding the rest.
struct Truncating<'a> {
    buf: &'a mut Payload,
    limit: usize,
}

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.limit.saturating_sub(self.buf.len());
        let take = s.len().min(room);
        // `limit` never exceeds PAYLOAD_CAP.
        let _ = self.buf.extend_from_slice(&s.as_bytes()[..take]);
        Ok(())
    }
}

fn with_text(args: fmt::Arguments<'_>) -> Payload {
    let mut buf = Payload::new();
    let _ = buf.extend_from_slice(&PREAMBLE);
    let mut w = Truncating {
        buf: &mut buf,
        limit: PREAMBLE.len() + TEXT_CAP,
    };
    let _ = w.write_fmt(args);
    buf
}

/// Encode a label and the three latency fields.  A missing label becomes
/// an empty field.
pub fn encode(label: Option<&str>, t1: u32, t2: u32, t3: u32) -> Payload {
    with_text(format_args!("{};{};{};{}", label.unwrap_or(""), t1, t2, t3))
}

/// What the beacon carries before the first classification.
pub fn initial_payload() -> Payload {
    with_text(format_args!("idle;0;0;-1"))
}

// ── Raw advertising data ──────────────────────────────────────

const AD_FLAGS: u8 = 0x01;
const AD_UUID16_COMPLETE: u8 = 0x03;
const AD_SERVICE_DATA16: u8 = 0x16;
/// LE General Discoverable, BR/EDR not supported.
const FLAGS_VALUE: u8 = 0x06;

/// Frame service data into advertising data: Flags, complete 16-bit UUID
/// list, Service Data.  Service data beyond what fits is dropped.
pub fn frame_advertisement(service_data: &[u8]) -> Payload {
    let mut adv = Payload::new();
    let _ = adv.extend_from_slice(&[0x02, AD_FLAGS, FLAGS_VALUE]);
    let _ = adv.extend_from_slice(&[0x03, AD_UUID16_COMPLETE, PREAMBLE[0], PREAMBLE[1]]);

    let room = PAYLOAD_CAP - adv.len() - 2;
    let data = &service_data[..service_data.len().min(room)];
    // `data.len() + 1` ≤ 23 so the length byte never overflows.
    let _ = adv.extend_from_slice(&[data.len() as u8 + 1, AD_SERVICE_DATA16]);
    let _ = adv.extend_from_slice(data);
    adv
}
