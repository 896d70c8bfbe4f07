//! Encoding and decoding of 32-bit ARINC 429 words.
//!
//! Word layout, bit 0 = first bit on the wire:
//!
//! ```text
//! | 31     | 30..29 | 28..10      | 9..8 | 7..0  |
//! | parity | SSM    | data field  | SDI  | label |
//! ```
//!
//! Parity is generated and checked by the transceiver hardware; on receive
//! it reports a failed check by setting bit 31, and transmitted words leave
//! here with bit 31 clear. For BNR the sign bit always sits at bit 28 and
//! the data is right-aligned against it, so a field of `n` significant bits
//! occupies bits `28-n .. 28`. Fields wider than 18 significant bits grow
//! down into the SDI bits, which then carry data rather than an SDI.

use thiserror::Error;

use crate::config::LabelConfig;
use crate::label::MessageType;

/// Receive FIFO hardware flags a parity failure in this bit.
pub const PARITY_ERROR_BIT: u32 = 1 << 31;

pub const SSM_SHIFT: u32 = 29;
pub const SSM_MASK: u32 = 0x6000_0000;
pub const SDI_SHIFT: u32 = 8;
pub const SDI_MASK: u32 = 0x0000_0300;
pub const DATA_SHIFT: u32 = 10;

/// Data-field masks by significant-bit span. Up to 18 significant bits the
/// field stays above the SDI; 19 and 20 take one and both SDI bits.
const BNR_FIELD_MASK_18: u32 = 0x1FFF_FC00;
const BNR_FIELD_MASK_19: u32 = 0x1FFF_FE00;
const BNR_FIELD_MASK_20: u32 = 0x1FFF_FF00;

const BCD_DATA_FIELD_MASK: u32 = 0x1FFF_FC00;

/// Sign/Status Matrix values for BNR words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BnrSsm {
    FailureWarning = 0,
    NoComputedData = 1,
    FunctionalTest = 2,
    NormalOperation = 3,
}

impl BnrSsm {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => BnrSsm::FailureWarning,
            1 => BnrSsm::NoComputedData,
            2 => BnrSsm::FunctionalTest,
            _ => BnrSsm::NormalOperation,
        }
    }

    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Sign/Status Matrix values for BCD words. The matrix doubles as the sign,
/// so it is carried through decode untouched rather than folded into the
/// engineering value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BcdSsm {
    Plus = 0,
    NoComputedData = 1,
    FunctionalTest = 2,
    Minus = 3,
}

impl BcdSsm {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => BcdSsm::Plus,
            1 => BcdSsm::NoComputedData,
            2 => BcdSsm::FunctionalTest,
            _ => BcdSsm::Minus,
        }
    }

    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Codec failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// The configuration does not fit the requested operation.
    #[error("configuration does not fit the requested operation")]
    InvalidArgument,

    /// The wire word is malformed for the configured type.
    #[error("malformed message for configured type")]
    InvalidMessage,

    /// The outgoing data cannot be represented (e.g. negative BCD).
    #[error("message data not representable")]
    InvalidMsgData,

    /// Internal invariant breach.
    #[error("internal codec error")]
    Internal,
}

/// Whether an encoded word carries the requested value or a clipped one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Sent,
    /// The value exceeded the field and was clipped to the extreme
    /// representable value.
    DataClipped,
}

/// The typed result of decoding one word.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RxFields {
    pub raw_word: u32,
    /// Sign/status matrix, raw 2 bits.
    pub sm: u8,
    /// Source/destination identifier; zero when the data field covers it.
    pub sdi: u8,
    pub eng_float: f64,
    /// `eng_float` rounded half away from zero, clamped to `i32`.
    pub eng_int: i32,
    /// Discrete bits, masked to the configured width.
    pub discrete_bits: u32,
}

/// An outgoing message before encoding.
#[derive(Debug, Clone, Copy)]
pub struct TxMsg<'a> {
    pub config: &'a LabelConfig,
    pub sm: u8,
    pub sdi: u8,
    pub eng_value: f64,
    pub discrete_bits: u32,
}

pub const fn ssm_bits(word: u32) -> u8 {
    ((word >> SSM_SHIFT) & 0x3) as u8
}

const fn sdi_bits(word: u32) -> u8 {
    ((word >> SDI_SHIFT) & 0x3) as u8
}

fn round_half_away(value: f64) -> i32 {
    // f64::round rounds halves away from zero, which is the convention the
    // engineering integers use.
    let rounded = value.round();
    if rounded >= i32::MAX as f64 {
        i32::MAX
    } else if rounded <= i32::MIN as f64 {
        i32::MIN
    } else {
        rounded as i32
    }
}

fn masked_discretes(word: u32, num_bits: u8) -> u32 {
    if num_bits == 0 {
        0
    } else {
        (word >> DATA_SHIFT) & ((1u32 << num_bits) - 1)
    }
}

/// Decodes a BNR word: right-aligns the sign-plus-data field, sign-extends
/// and scales by the resolution.
pub fn decode_bnr(cfg: &LabelConfig, word: u32) -> Result<RxFields, CodecError> {
    if cfg.msg_type != MessageType::Bnr {
        return Err(CodecError::InvalidArgument);
    }
    let n = cfg.num_sig_bits as u32;
    if n == 0 || n > 20 {
        return Err(CodecError::InvalidArgument);
    }

    let width = n + 1; // data plus the sign at bit 28
    let field_mask = (1u32 << width) - 1;
    let raw = (word >> (28 - n)) & field_mask;
    let signed = if raw & (1u32 << n) != 0 {
        (raw | !field_mask) as i32
    } else {
        raw as i32
    };

    let eng_float = signed as f64 * cfg.resolution;
    Ok(RxFields {
        raw_word: word,
        sm: ssm_bits(word),
        // Past 18 significant bits the SDI slots carry data.
        sdi: if n > 18 { 0 } else { sdi_bits(word) },
        eng_float,
        eng_int: round_half_away(eng_float),
        discrete_bits: masked_discretes(word, cfg.num_discrete_bits),
    })
}

/// Decodes a BCD word. Digits sit above any discrete bits, least
/// significant digit first; a digit above 9 fails the whole word.
pub fn decode_bcd(cfg: &LabelConfig, word: u32) -> Result<RxFields, CodecError> {
    if cfg.msg_type != MessageType::Bcd {
        return Err(CodecError::InvalidArgument);
    }
    let nd = cfg.num_sig_digits as u32;
    let ndb = cfg.num_discrete_bits as u32;
    if nd == 0 || nd > 5 || 4 * nd - 1 + ndb > 19 {
        return Err(CodecError::InvalidMessage);
    }

    let mut value: u32 = 0;
    let mut scale: u32 = 1;
    for i in 0..nd {
        let offset = DATA_SHIFT + ndb + 4 * i;
        // The top digit may be squeezed to 3 bits against the SSM.
        let width = (29 - offset).min(4);
        let digit = (word >> offset) & ((1u32 << width) - 1);
        if digit > 9 {
            return Err(CodecError::InvalidMessage);
        }
        value += digit * scale;
        scale *= 10;
    }

    let eng_float = value as f64 * cfg.resolution;
    Ok(RxFields {
        raw_word: word,
        sm: ssm_bits(word),
        sdi: sdi_bits(word),
        eng_float,
        eng_int: round_half_away(eng_float),
        discrete_bits: masked_discretes(word, cfg.num_discrete_bits),
    })
}

/// Decodes a discrete word: the bit field only, engineering fields zeroed.
pub fn decode_discrete(cfg: &LabelConfig, word: u32) -> Result<RxFields, CodecError> {
    if cfg.msg_type != MessageType::Discrete {
        return Err(CodecError::InvalidArgument);
    }
    if cfg.num_discrete_bits == 0 || cfg.num_discrete_bits > 19 {
        return Err(CodecError::InvalidArgument);
    }
    Ok(RxFields {
        raw_word: word,
        sm: ssm_bits(word),
        sdi: sdi_bits(word),
        eng_float: 0.0,
        eng_int: 0,
        discrete_bits: masked_discretes(word, cfg.num_discrete_bits),
    })
}

/// Dispatches to the decoder for the configured message type.
pub fn decode(cfg: &LabelConfig, word: u32) -> Result<RxFields, CodecError> {
    match cfg.msg_type {
        MessageType::Bnr => decode_bnr(cfg, word),
        MessageType::Bcd => decode_bcd(cfg, word),
        MessageType::Discrete => decode_discrete(cfg, word),
    }
}

/// Encodes a BNR word. A value outside the field is clipped to the extreme
/// representable raw value and reported as [`TxStatus::DataClipped`].
pub fn encode_bnr(tx: &TxMsg<'_>) -> Result<(u32, TxStatus), CodecError> {
    let cfg = tx.config;
    if cfg.msg_type != MessageType::Bnr {
        return Err(CodecError::InvalidArgument);
    }
    let n = cfg.num_sig_bits as u32;
    if n == 0 || n > 20 || !(cfg.resolution > 0.0) {
        return Err(CodecError::InvalidArgument);
    }
    if !tx.eng_value.is_finite() {
        return Err(CodecError::InvalidMsgData);
    }

    // Widened intermediate so the round and clamp cannot themselves wrap.
    let scaled = (tx.eng_value / cfg.resolution).round();
    let raw64 = if scaled >= i32::MAX as f64 {
        i32::MAX as i64
    } else if scaled <= i32::MIN as f64 {
        i32::MIN as i64
    } else {
        scaled as i64
    };

    let max_raw = (1i64 << n) - 1;
    let min_raw = -(1i64 << n);
    let (raw, status) = if raw64 > max_raw {
        (max_raw, TxStatus::DataClipped)
    } else if raw64 < min_raw {
        (min_raw, TxStatus::DataClipped)
    } else {
        (raw64, TxStatus::Sent)
    };

    let field_mask = match n {
        19 => BNR_FIELD_MASK_19,
        20 => BNR_FIELD_MASK_20,
        _ => BNR_FIELD_MASK_18,
    };

    let mut word = ((raw as u32) << (28 - n)) & field_mask;
    word |= tx.config.label.wire() as u32;
    if cfg.num_discrete_bits > 0 {
        word |= (tx.discrete_bits & ((1u32 << cfg.num_discrete_bits) - 1)) << DATA_SHIFT;
    }
    if n <= 18 {
        word |= ((tx.sdi & 0x3) as u32) << SDI_SHIFT;
    }
    word |= ((tx.sm & 0x3) as u32) << SSM_SHIFT;
    Ok((word, status))
}

/// Encodes a BCD word. The engineering value must be non-negative; sign is
/// the caller's business through the SSM. A value with too many digits is
/// clipped to the largest representable pattern.
pub fn encode_bcd(tx: &TxMsg<'_>) -> Result<(u32, TxStatus), CodecError> {
    let cfg = tx.config;
    if cfg.msg_type != MessageType::Bcd {
        return Err(CodecError::InvalidArgument);
    }
    let nd = cfg.num_sig_digits as u32;
    let ndb = cfg.num_discrete_bits as u32;
    if nd == 0 || nd > 5 || 4 * nd - 1 + ndb > 19 || !(cfg.resolution > 0.0) {
        return Err(CodecError::InvalidArgument);
    }
    if !tx.eng_value.is_finite() || tx.eng_value < 0.0 {
        return Err(CodecError::InvalidMsgData);
    }

    let units = (tx.eng_value / cfg.resolution).round() as i64;

    // The most significant character may have fewer than 4 bits when the
    // digits fill the whole field.
    let msc_offset = DATA_SHIFT + ndb + 4 * (nd - 1);
    let msc_width = (29 - msc_offset).min(4);
    let msc_max = ((1u32 << msc_width) - 1).min(9) as i64;
    let mut max_value = msc_max;
    for _ in 1..nd {
        max_value = max_value * 10 + 9;
    }

    let (mut value, status) = if units > max_value {
        (max_value, TxStatus::DataClipped)
    } else {
        (units, TxStatus::Sent)
    };

    let mut data = 0u32;
    for i in 0..nd {
        let digit = (value % 10) as u32;
        value /= 10;
        data |= digit << (DATA_SHIFT + ndb + 4 * i);
    }

    let mut word = data & BCD_DATA_FIELD_MASK;
    word |= cfg.label.wire() as u32;
    if ndb > 0 {
        word |= (tx.discrete_bits & ((1u32 << ndb) - 1)) << DATA_SHIFT;
    }
    word |= ((tx.sdi & 0x3) as u32) << SDI_SHIFT;
    word |= ((tx.sm & 0x3) as u32) << SSM_SHIFT;
    Ok((word, status))
}

/// Encodes a discrete word. The bits are left-justified in the data field,
/// padding on the least-significant side.
pub fn encode_discrete(tx: &TxMsg<'_>) -> Result<(u32, TxStatus), CodecError> {
    let cfg = tx.config;
    if cfg.msg_type != MessageType::Discrete {
        return Err(CodecError::InvalidArgument);
    }
    let n = cfg.num_discrete_bits as u32;
    if n == 0 || n > 19 {
        return Err(CodecError::InvalidArgument);
    }

    let bits = tx.discrete_bits & ((1u32 << n) - 1);
    let mut word = bits << (29 - n);
    word |= cfg.label.wire() as u32;
    word |= ((tx.sdi & 0x3) as u32) << SDI_SHIFT;
    word |= ((tx.sm & 0x3) as u32) << SSM_SHIFT;
    Ok((word, TxStatus::Sent))
}

/// Dispatches to the encoder for the configured message type.
pub fn encode(tx: &TxMsg<'_>) -> Result<(u32, TxStatus), CodecError> {
    match tx.config.msg_type {
        MessageType::Bnr => encode_bnr(tx),
        MessageType::Bcd => encode_bcd(tx),
        MessageType::Discrete => encode_discrete(tx),
    }
}

/// Maps an engineering value to its validity SSM against the configured
/// range. Labels with no range always read as normal.
pub fn check_bnr_validity(eng_value: f64, cfg: &LabelConfig) -> BnrSsm {
    if let Some(min) = cfg.min_valid_value {
        if eng_value < min {
            return BnrSsm::FailureWarning;
        }
    }
    if let Some(max) = cfg.max_valid_value {
        if eng_value > max {
            return BnrSsm::FailureWarning;
        }
    }
    BnrSsm::NormalOperation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelConfig;

    fn bnr_cfg(bits: u8, resolution: f64) -> LabelConfig {
        LabelConfig::bnr(0o320, bits, resolution, 10, 60)
    }

    fn tx<'a>(cfg: &'a LabelConfig, eng: f64, sm: u8, sdi: u8) -> TxMsg<'a> {
        TxMsg {
            config: cfg,
            sm,
            sdi,
            eng_value: eng,
            discrete_bits: 0,
        }
    }

    #[test]
    fn bnr_round_trip_every_width() {
        for bits in 1..=20u8 {
            let cfg = bnr_cfg(bits, 0.25);
            let max = ((1i64 << bits) - 1) as f64 * 0.25;
            for eng in [0.0, 0.25, -0.25, max, -max, max / 3.0] {
                let (word, status) =
                    encode_bnr(&tx(&cfg, eng, BnrSsm::NormalOperation.bits(), 0)).unwrap();
                assert_eq!(status, TxStatus::Sent, "bits={bits} eng={eng}");
                let fields = decode_bnr(&cfg, word).unwrap();
                assert!(
                    (fields.eng_float - eng).abs() <= 0.125,
                    "bits={bits} eng={eng} got {}",
                    fields.eng_float
                );
            }
        }
    }

    #[test]
    fn bnr_sign_extension_every_width() {
        for bits in 1..=20u8 {
            let cfg = bnr_cfg(bits, 1.0);
            let (word, _) = encode_bnr(&tx(&cfg, -1.0, 0, 0)).unwrap();
            let fields = decode_bnr(&cfg, word).unwrap();
            assert_eq!(fields.eng_int, -1, "bits={bits}");
        }
    }

    #[test]
    fn bnr_overflow_clips_positive() {
        let cfg = bnr_cfg(12, 0.0439453125);
        let (word, status) = encode_bnr(&tx(&cfg, 1.0e6, 3, 0)).unwrap();
        assert_eq!(status, TxStatus::DataClipped);
        let fields = decode_bnr(&cfg, word).unwrap();
        assert_eq!(fields.eng_int, round_half_away(4095.0 * 0.0439453125));
        assert_eq!(fields.eng_float, 4095.0 * 0.0439453125);
    }

    #[test]
    fn bnr_overflow_clips_negative() {
        let cfg = bnr_cfg(12, 0.0439453125);
        let (word, status) = encode_bnr(&tx(&cfg, -1.0e6, 3, 0)).unwrap();
        assert_eq!(status, TxStatus::DataClipped);
        let fields = decode_bnr(&cfg, word).unwrap();
        assert_eq!(fields.eng_float, -4096.0 * 0.0439453125);
    }

    #[test]
    fn bnr_slip_angle_bit_slice() {
        // 12 significant bits at 0.04395 deg/lsb; -45 deg is raw -1024.
        let cfg = LabelConfig::bnr(0o250, 12, 0.0439453125, 20, 100);
        let (word, status) =
            encode_bnr(&tx(&cfg, -45.0, BnrSsm::NormalOperation.bits(), 1)).unwrap();
        assert_eq!(status, TxStatus::Sent);
        let raw = (word >> 16) & 0x1FFF;
        let signed = (raw | !0x1FFFu32) as i32; // sign bit is set for -1024
        assert_eq!(signed, -1024);
        assert_eq!((word >> SDI_SHIFT) & 0x3, 1);
        assert_eq!(ssm_bits(word), 3);
        assert_eq!(word & 0xFF, 0o250u32.reverse_bits() >> 24);
    }

    #[test]
    fn bnr_wide_fields_swallow_sdi() {
        let cfg = bnr_cfg(20, 1.0);
        let (word, _) = encode_bnr(&tx(&cfg, 1.0, 3, 3)).unwrap();
        // The SDI argument must not land in bits 8..9.
        assert_eq!(word & SDI_MASK, (1 << 8) & SDI_MASK);
        let fields = decode_bnr(&cfg, word).unwrap();
        assert_eq!(fields.sdi, 0);
        assert_eq!(fields.eng_int, 1);
    }

    #[test]
    fn bnr_discrete_bits_ride_along() {
        let cfg = bnr_cfg(12, 1.0).with_discretes(3);
        let mut msg = tx(&cfg, 100.0, 3, 0);
        msg.discrete_bits = 0b101;
        let (word, _) = encode_bnr(&msg).unwrap();
        let fields = decode_bnr(&cfg, word).unwrap();
        assert_eq!(fields.discrete_bits, 0b101);
        assert_eq!(fields.eng_int, 100);
    }

    #[test]
    fn bnr_validity_range() {
        let cfg = bnr_cfg(12, 1.0).with_valid_range(-3.0, 5.0);
        assert_eq!(check_bnr_validity(0.0, &cfg), BnrSsm::NormalOperation);
        assert_eq!(check_bnr_validity(5.0, &cfg), BnrSsm::NormalOperation);
        assert_eq!(check_bnr_validity(5.1, &cfg), BnrSsm::FailureWarning);
        assert_eq!(check_bnr_validity(-3.1, &cfg), BnrSsm::FailureWarning);
    }

    #[test]
    fn bcd_round_trip_baro() {
        let cfg = LabelConfig::bcd(0o235, 5, 0.001, 62, 500);
        let (word, status) = encode_bcd(&tx(&cfg, 29.921, BcdSsm::Plus.bits(), 0)).unwrap();
        assert_eq!(status, TxStatus::Sent);
        // Digits 2 9 9 2 1, least significant at bit 10.
        assert_eq!((word >> 10) & 0xF, 1);
        assert_eq!((word >> 14) & 0xF, 2);
        assert_eq!((word >> 18) & 0xF, 9);
        assert_eq!((word >> 22) & 0xF, 9);
        assert_eq!((word >> 26) & 0x7, 2);
        let fields = decode_bcd(&cfg, word).unwrap();
        assert!((fields.eng_float - 29.921).abs() < 1e-9);
        assert_eq!(fields.sm, BcdSsm::Plus.bits());
    }

    #[test]
    fn bcd_minus_ssm_is_preserved() {
        let cfg = LabelConfig::bcd(0o235, 5, 0.001, 62, 500);
        let (word, _) = encode_bcd(&tx(&cfg, 1.5, BcdSsm::Minus.bits(), 0)).unwrap();
        let fields = decode_bcd(&cfg, word).unwrap();
        assert_eq!(BcdSsm::from_bits(fields.sm), BcdSsm::Minus);
        // Magnitude only; the sign stays in the matrix.
        assert!(fields.eng_float > 0.0);
    }

    #[test]
    fn bcd_negative_engineering_rejected() {
        let cfg = LabelConfig::bcd(0o235, 5, 0.001, 62, 500);
        assert_eq!(
            encode_bcd(&tx(&cfg, -1.0, 0, 0)),
            Err(CodecError::InvalidMsgData)
        );
    }

    #[test]
    fn bcd_msc_overflow_clips() {
        let cfg = LabelConfig::bcd(0o235, 5, 0.001, 62, 500);
        // 85.0 has an 8 in the 3-bit top character; clips to 79999 units.
        let (word, status) = encode_bcd(&tx(&cfg, 85.0, 0, 0)).unwrap();
        assert_eq!(status, TxStatus::DataClipped);
        let fields = decode_bcd(&cfg, word).unwrap();
        assert!((fields.eng_float - 79.999).abs() < 1e-9);
    }

    #[test]
    fn bcd_four_digit_field_keeps_four_bit_msc() {
        let cfg = LabelConfig::bcd(0o377, 4, 1.0, 100, 1000);
        let (word, status) = encode_bcd(&tx(&cfg, 9999.0, 0, 0)).unwrap();
        assert_eq!(status, TxStatus::Sent);
        let fields = decode_bcd(&cfg, word).unwrap();
        assert_eq!(fields.eng_int, 9999);
    }

    #[test]
    fn bcd_bad_digit_fails_decode() {
        let cfg = LabelConfig::bcd(0o235, 5, 0.001, 62, 500);
        // 0xA in the second digit position.
        let word = 0xA << 14;
        assert_eq!(decode_bcd(&cfg, word), Err(CodecError::InvalidMessage));
    }

    #[test]
    fn discrete_encode_is_left_justified() {
        let cfg = LabelConfig::discrete(0o271, 8, 20, 200);
        let mut msg = tx(&cfg, 0.0, 3, 0);
        msg.discrete_bits = 0xA5;
        let (word, _) = encode_discrete(&msg).unwrap();
        assert_eq!((word >> 21) & 0xFF, 0xA5);
    }

    #[test]
    fn discrete_decode_is_right_aligned() {
        let cfg = LabelConfig::discrete(0o271, 8, 20, 200);
        let word = 0xA5u32 << 10;
        let fields = decode_discrete(&cfg, word).unwrap();
        assert_eq!(fields.discrete_bits, 0xA5);
        assert_eq!(fields.eng_float, 0.0);
        assert_eq!(fields.eng_int, 0);
    }

    #[test]
    fn type_mismatch_is_invalid_argument() {
        let bnr = bnr_cfg(12, 1.0);
        assert_eq!(decode_bcd(&bnr, 0), Err(CodecError::InvalidArgument));
        assert_eq!(decode_discrete(&bnr, 0), Err(CodecError::InvalidArgument));
        let bcd = LabelConfig::bcd(0o235, 5, 0.001, 62, 500);
        assert_eq!(decode_bnr(&bcd, 0), Err(CodecError::InvalidArgument));
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_half_away(2.5), 3);
        assert_eq!(round_half_away(-2.5), -3);
        assert_eq!(round_half_away(2.4), 2);
        assert_eq!(round_half_away(1.0e12), i32::MAX);
        assert_eq!(round_half_away(-1.0e12), i32::MIN);
    }
}
