//! Frame contents exchanged with the air-data computer.
//!
//! The RS-422 framing itself (sync bytes, escaping, checksum) lives below
//! [`crate::ports::AdcLink`]; this module gives meaning to the payloads.
//! Data frames carry whole ARINC 429 words, little-endian, which flow into
//! the air-data receive group exactly as if they had arrived on a
//! transceiver FIFO (minus the parity flag, which the link checksum covers).

use crate::rx::RxGroup;

// Payload type identifiers, first byte of every frame.
pub const FRAME_COMPUTED_DATA: u8 = 0x41;
pub const FRAME_ADC_STATUS: u8 = 0x53;
pub const FRAME_VERSION_REQUEST: u8 = 0x56;
pub const FRAME_SW_VERSION_REPLY: u8 = 0x76;
pub const FRAME_HW_VERSION_REPLY: u8 = 0x68;
pub const FRAME_BRIDGE_REPLY: u8 = 0x42;

pub const VERSION_REQUEST_LEN: usize = 7;
pub const SW_VERSION_REPLY_LEN: usize = 0x19;
pub const HW_VERSION_REPLY_LEN: usize = 9;
pub const BRIDGE_REPLY_LEN: usize = 6;

/// Version-request subsystem selectors.
pub const VERSION_TARGET_ADC: u8 = 0x01;
pub const VERSION_TARGET_PITOT_AOA: u8 = 0x02;

/// Data frames carry at most this many ARINC words.
pub const MAX_WORDS_PER_FRAME: usize = 16;

/// Largest payload either direction; sized for the computed-data frame.
pub const MAX_FRAME_LEN: usize = 2 + 4 * MAX_WORDS_PER_FRAME;

/// Feeds one received payload into the air-data group. Computed-data and
/// status frames are `[id, count, count*4 word bytes]`; anything malformed
/// is dropped whole. Version replies are not handled here; they only
/// matter during the startup gather.
pub fn ingest_frame(payload: &[u8], group: &mut RxGroup, now_ms: u32) {
    let Some((&id, rest)) = payload.split_first() else {
        return;
    };
    match id {
        FRAME_COMPUTED_DATA | FRAME_ADC_STATUS => {
            let Some((&count, words)) = rest.split_first() else {
                log::debug!("air-data frame {id:#04X} truncated");
                return;
            };
            let count = count as usize;
            if count > MAX_WORDS_PER_FRAME || words.len() != count * 4 {
                log::debug!(
                    "air-data frame {id:#04X} malformed: count {count}, {} payload bytes",
                    words.len()
                );
                return;
            }
            for chunk in words.chunks_exact(4) {
                let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                group.process_received(word, now_ms);
            }
        }
        FRAME_SW_VERSION_REPLY | FRAME_HW_VERSION_REPLY => {
            // Late version reply outside the startup gather window.
        }
        _ => log::debug!("unknown air-data frame id {id:#04X}"),
    }
}

/// The fixed-length version request for one subsystem.
pub fn version_request(target: u8) -> [u8; VERSION_REQUEST_LEN] {
    [FRAME_VERSION_REQUEST, target, 0, 0, 0, 0, 0]
}

/// Picks the version bytes out of a reply addressed to `target`, if that is
/// what the payload is.
pub fn parse_version_reply<'p>(payload: &'p [u8], target: u8) -> Option<&'p [u8]> {
    match payload.first()? {
        &FRAME_SW_VERSION_REPLY
            if payload.len() == SW_VERSION_REPLY_LEN && payload[1] == target =>
        {
            Some(&payload[2..18])
        }
        &FRAME_HW_VERSION_REPLY
            if payload.len() == HW_VERSION_REPLY_LEN && payload[1] == target =>
        {
            Some(&payload[2..9])
        }
        _ => None,
    }
}

/// The periodic reply to the air-data computer: the current baro-correction
/// word (so it can compute corrected altitude) and a bridge status byte.
pub fn compose_reply(baro_word: u32, status: u8) -> [u8; BRIDGE_REPLY_LEN] {
    let b = baro_word.to_le_bytes();
    [FRAME_BRIDGE_REPLY, status, b[0], b[1], b[2], b[3]]
}
