//! The derived-word engine.
//!
//! Every outgoing word the bridge originates is composed here from the
//! receive slots: differentiated turn rate, filtered slip angle, the
//! re-scaled attitude set, the corrected accelerations, the baro-correction
//! echo and the three status words. The calculators never fail; anything
//! wrong with the inputs (stale, babbling, failed source, failed bus)
//! surfaces as a failure SSM in the word that goes out anyway.

use bitflags::bitflags;

use crate::codec::{self, BcdSsm, BnrSsm, TxMsg, TxStatus};
use crate::config::{BridgeConfig, LabelConfig};
use crate::filter::{Differentiator, LowPass, Spool, SpoolPhase};
use crate::label::Label;
use crate::rx::{RxGroup, RxSlot};
use crate::tables::{
    L_AHRS_STATUS, L_BARO_CORRECTION, L_FLIGHT_PATH_ACCEL, L_LAT_ACCEL, L_MAG_HEADING,
    L_MSU_DISCRETES, L_NORMAL_ACCEL, L_PITCH, L_ROLL, TX_BARO_CORRECTION, TX_LAT_ACCEL,
    TX_MAG_HEADING, TX_NORMAL_ACCEL, TX_PITCH, TX_ROLL, TX_SLIP_ANGLE, TX_TURN_RATE,
};

/// MSU failure, as flagged in the raw label 271 word.
const MSU_FAIL_BIT: u32 = 1 << 11;
/// MSU calibration in progress, as flagged in the raw label 270 word.
const MSU_CALIBRATING_BIT: u32 = 1 << 11;

/// SDI and SSM positions mirrored from 271 into the 272 status word.
pub const AHRS_STATUS_SDI_SSM_MASK: u32 = 0x6000_0300;

/// ORed into a status word's base when its inputs are unavailable.
pub const GROUP_FAILURE_SSM_MASK: u32 = 0x6000_0000;

// Status-word bases carry their own wire-order label in the low byte.
const STATUS_272_BASE: u32 = 0x0000_005D;
const STATUS_274_BASE: u32 = 0x0000_003D;
const STATUS_275_BASE: u32 = 0x0000_40BD;

bitflags! {
    /// Event bits of status word 272.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status272: u32 {
        const HEADING_INVALID  = 1 << 10;
        const ATTITUDE_INVALID = 1 << 11;
        const ADC_TIMEOUT      = 1 << 25;
    }
}

bitflags! {
    /// Event bits of status word 274.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status274: u32 {
        const MSU_CALIBRATING = 1 << 11;
        const ADC_TIMEOUT     = 1 << 13;
        const MSU_FAIL        = 1 << 28;
    }
}

bitflags! {
    /// Event bits of status word 275.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status275: u32 {
        const MSU_FAIL          = 1 << 23;
        const FLIGHT_PATH_VALID = 1 << 25;
    }
}

/// A minimal failure-marked word for a config whose encode cannot proceed.
fn failure_word(cfg: &LabelConfig) -> u32 {
    (cfg.label.wire() as u32) | ((BnrSsm::FailureWarning.bits() as u32) << codec::SSM_SHIFT)
}

fn emit_bnr(cfg: &'static LabelConfig, eng_value: f64, sm: BnrSsm, sdi: u8) -> u32 {
    let tx = TxMsg {
        config: cfg,
        sm: sm.bits(),
        sdi,
        eng_value,
        discrete_bits: 0,
    };
    match codec::encode_bnr(&tx) {
        Ok((word, TxStatus::DataClipped)) => {
            log::debug!("label {}: value {eng_value} clipped", cfg.label);
            word
        }
        Ok((word, _)) => word,
        Err(err) => {
            log::error!("label {}: encode failed: {err}", cfg.label);
            failure_word(cfg)
        }
    }
}

/// Keeps a slot only if it is usable as a calculator operand: fresh, not
/// babbling, and reported normal by its source.
fn usable_bnr(slot: Option<RxSlot>) -> Option<RxSlot> {
    slot.filter(|s| {
        s.is_fresh && s.is_not_babbling && s.sm == BnrSsm::NormalOperation.bits()
    })
}

pub struct WordEngine {
    turn_diff: Differentiator,
    turn_spool: Spool,
    az_filter: LowPass,
    slip_spool: Spool,
}

impl WordEngine {
    pub fn new(cfg: &BridgeConfig) -> Self {
        WordEngine {
            turn_diff: Differentiator::new(&cfg.differentiator),
            turn_spool: Spool::new(),
            az_filter: LowPass::new(&cfg.lowpass),
            slip_spool: Spool::new(),
        }
    }

    /// Label 340: magnetic heading differentiated into a turn rate.
    pub fn turn_rate(&mut self, ahrs: &RxGroup, now_ms: u32) -> u32 {
        let Some(heading) = usable_bnr(ahrs.latest(L_MAG_HEADING, now_ms)) else {
            self.turn_spool.invalid();
            return emit_bnr(&TX_TURN_RATE, 0.0, BnrSsm::FailureWarning, 0);
        };

        match self.turn_spool.valid() {
            SpoolPhase::Preload => {
                self.turn_diff.reset();
                self.turn_diff.preload(heading.eng_float);
                emit_bnr(&TX_TURN_RATE, 0.0, BnrSsm::FailureWarning, 0)
            }
            SpoolPhase::Spooling => {
                let rate = self.turn_diff.run(heading.eng_float);
                emit_bnr(&TX_TURN_RATE, rate, BnrSsm::FailureWarning, 0)
            }
            SpoolPhase::Good => {
                let rate = self.turn_diff.run(heading.eng_float);
                let sm = codec::check_bnr_validity(rate, &TX_TURN_RATE);
                emit_bnr(&TX_TURN_RATE, rate, sm, 0)
            }
        }
    }

    /// Label 250: slip angle from the lateral and (filtered) normal
    /// accelerations.
    pub fn slip_angle(&mut self, ahrs: &RxGroup, now_ms: u32) -> u32 {
        let lat = usable_bnr(ahrs.latest(L_LAT_ACCEL, now_ms));
        let norm = usable_bnr(ahrs.latest(L_NORMAL_ACCEL, now_ms));
        let (Some(lat), Some(norm)) = (lat, norm) else {
            self.slip_spool.invalid();
            self.az_filter.reset();
            return emit_bnr(&TX_SLIP_ANGLE, 0.0, BnrSsm::FailureWarning, 0);
        };

        match self.slip_spool.valid() {
            SpoolPhase::Preload => {
                self.az_filter.reset();
                self.az_filter.preload(norm.eng_float);
                emit_bnr(&TX_SLIP_ANGLE, 0.0, BnrSsm::FailureWarning, 0)
            }
            phase => {
                let filtered_az = self.az_filter.run(norm.eng_float);
                let slip = (-lat.eng_float).atan2(filtered_az + 1.0).to_degrees();
                let sm = match phase {
                    SpoolPhase::Good => codec::check_bnr_validity(slip, &TX_SLIP_ANGLE),
                    _ => BnrSsm::FailureWarning,
                };
                emit_bnr(&TX_SLIP_ANGLE, slip, sm, 0)
            }
        }
    }

    fn msu_failed(ahrs: &RxGroup, now_ms: u32) -> bool {
        ahrs.latest(L_AHRS_STATUS, now_ms)
            .map_or(false, |s| s.raw_word & MSU_FAIL_BIT != 0)
    }

    /// Label 320 re-originated at the display's scaling. An MSU failure
    /// reported on 271 forces the heading invalid regardless of its own SSM.
    pub fn new_mag_heading(&self, ahrs: &RxGroup, now_ms: u32) -> u32 {
        let Some(heading) = ahrs.latest(L_MAG_HEADING, now_ms) else {
            return emit_bnr(&TX_MAG_HEADING, 0.0, BnrSsm::FailureWarning, 0);
        };
        if !heading.is_fresh || !heading.is_not_babbling {
            return emit_bnr(&TX_MAG_HEADING, 0.0, BnrSsm::FailureWarning, 0);
        }
        let sm = if Self::msu_failed(ahrs, now_ms) {
            BnrSsm::FailureWarning
        } else {
            BnrSsm::from_bits(heading.sm)
        };
        emit_bnr(&TX_MAG_HEADING, heading.eng_float, sm, heading.sdi)
    }

    fn copy_through(
        &self,
        ahrs: &RxGroup,
        now_ms: u32,
        label: Label,
        out: &'static LabelConfig,
    ) -> u32 {
        let Some(slot) = ahrs.latest(label, now_ms) else {
            return emit_bnr(out, 0.0, BnrSsm::FailureWarning, 0);
        };
        if !slot.is_fresh || !slot.is_not_babbling {
            return emit_bnr(out, 0.0, BnrSsm::FailureWarning, 0);
        }
        emit_bnr(out, slot.eng_float, BnrSsm::from_bits(slot.sm), slot.sdi)
    }

    /// Label 324 re-originated: engineering value copied, SSM inherited.
    pub fn new_pitch(&self, ahrs: &RxGroup, now_ms: u32) -> u32 {
        self.copy_through(ahrs, now_ms, L_PITCH, &TX_PITCH)
    }

    /// Label 325 re-originated.
    pub fn new_roll(&self, ahrs: &RxGroup, now_ms: u32) -> u32 {
        self.copy_through(ahrs, now_ms, L_ROLL, &TX_ROLL)
    }

    /// Label 332 with the sign convention flipped for the display.
    pub fn body_lat_accel(&self, ahrs: &RxGroup, now_ms: u32) -> u32 {
        let Some(slot) = ahrs.latest(L_LAT_ACCEL, now_ms) else {
            return emit_bnr(&TX_LAT_ACCEL, 0.0, BnrSsm::FailureWarning, 0);
        };
        if !slot.is_fresh || !slot.is_not_babbling {
            return emit_bnr(&TX_LAT_ACCEL, 0.0, BnrSsm::FailureWarning, 0);
        }
        emit_bnr(
            &TX_LAT_ACCEL,
            -slot.eng_float,
            BnrSsm::from_bits(slot.sm),
            slot.sdi,
        )
    }

    /// Label 333 shifted from sensed to indicated load factor and
    /// re-validated against the -3..+5 g range.
    pub fn normal_accel(&self, ahrs: &RxGroup, now_ms: u32) -> u32 {
        let Some(slot) = ahrs.latest(L_NORMAL_ACCEL, now_ms) else {
            return emit_bnr(&TX_NORMAL_ACCEL, 0.0, BnrSsm::FailureWarning, 0);
        };
        if !slot.is_fresh || !slot.is_not_babbling {
            return emit_bnr(&TX_NORMAL_ACCEL, 0.0, BnrSsm::FailureWarning, 0);
        }
        let eng = slot.eng_float + 1.0;
        let sm = if slot.sm == BnrSsm::NormalOperation.bits() {
            codec::check_bnr_validity(eng, &TX_NORMAL_ACCEL)
        } else {
            BnrSsm::from_bits(slot.sm)
        };
        emit_bnr(&TX_NORMAL_ACCEL, eng, sm, slot.sdi)
    }

    /// Label 235 re-originated from the display's own baro setting. Only a
    /// positive, fresh setting passes through; anything else goes out as
    /// no-computed-data with a zeroed field.
    pub fn baro_correction(&self, pfd: &RxGroup, now_ms: u32) -> u32 {
        let slot = pfd.latest(L_BARO_CORRECTION, now_ms);
        let usable = slot.map_or(false, |s| {
            s.is_fresh && s.is_not_babbling && s.sm == BcdSsm::Plus.bits()
        });

        let (eng, sm, sdi) = match (usable, slot) {
            (true, Some(s)) => (s.eng_float, BcdSsm::Plus, s.sdi),
            _ => (0.0, BcdSsm::NoComputedData, 0),
        };
        let tx = TxMsg {
            config: &TX_BARO_CORRECTION,
            sm: sm.bits(),
            sdi,
            eng_value: eng,
            discrete_bits: 0,
        };
        match codec::encode_bcd(&tx) {
            Ok((word, _)) => word,
            Err(err) => {
                log::error!("label 235: encode failed: {err}");
                failure_word(&TX_BARO_CORRECTION)
            }
        }
    }

    /// Status word 272: AHRS health summary. SDI and SSM bits mirror the
    /// raw 271 word as last stored, fresh or not.
    pub fn ahrs_status_272(&self, ahrs: &RxGroup, adc_timeout: bool, now_ms: u32) -> u32 {
        let mut word = STATUS_272_BASE;
        let Some(status) = ahrs.latest(L_AHRS_STATUS, now_ms).filter(RxSlot::has_data) else {
            return word | GROUP_FAILURE_SSM_MASK;
        };
        word |= status.raw_word & AHRS_STATUS_SDI_SSM_MASK;
        if adc_timeout {
            word |= Status272::ADC_TIMEOUT.bits();
        }
        if status.raw_word & MSU_FAIL_BIT != 0 {
            word |= (Status272::HEADING_INVALID | Status272::ATTITUDE_INVALID).bits();
        }
        word
    }

    /// Status word 274: MSU and air-data summary.
    pub fn ahrs_status_274(&self, ahrs: &RxGroup, adc_timeout: bool, now_ms: u32) -> u32 {
        let mut word = STATUS_274_BASE;
        let status = ahrs.latest(L_AHRS_STATUS, now_ms).filter(RxSlot::has_data);
        let msu = ahrs.latest(L_MSU_DISCRETES, now_ms).filter(RxSlot::has_data);
        let (Some(status), Some(msu)) = (status, msu) else {
            return word | GROUP_FAILURE_SSM_MASK;
        };
        if status.raw_word & MSU_FAIL_BIT != 0 {
            word |= Status274::MSU_FAIL.bits();
        }
        if msu.raw_word & MSU_CALIBRATING_BIT != 0 {
            word |= Status274::MSU_CALIBRATING.bits();
        }
        if adc_timeout {
            word |= Status274::ADC_TIMEOUT.bits();
        }
        word
    }

    /// Status word 275: MSU failure plus flight-path-acceleration validity.
    pub fn ahrs_status_275(&self, ahrs: &RxGroup, now_ms: u32) -> u32 {
        let mut word = STATUS_275_BASE;
        let Some(status) = ahrs.latest(L_AHRS_STATUS, now_ms).filter(RxSlot::has_data) else {
            return word | GROUP_FAILURE_SSM_MASK;
        };
        if status.raw_word & MSU_FAIL_BIT != 0 {
            word |= Status275::MSU_FAIL.bits();
        }
        let fpa_normal = ahrs
            .latest(L_FLIGHT_PATH_ACCEL, now_ms)
            .map_or(false, |s| s.sm == BnrSsm::NormalOperation.bits());
        if fpa_normal {
            word |= Status275::FLIGHT_PATH_VALID.bits();
        }
        word
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::label::Label;
    use crate::rx::RxGroup;
    use crate::tables::AHRS_RX;

    fn ahrs_group() -> RxGroup {
        RxGroup::new(&AHRS_RX, 10).unwrap()
    }

    fn engine() -> WordEngine {
        WordEngine::new(&BridgeConfig::default())
    }

    /// Feeds one BNR word into the group using the group's own config.
    fn feed_bnr(g: &mut RxGroup, octal: u8, eng: f64, sm: BnrSsm, now: u32) {
        let cfg = AHRS_RX
            .iter()
            .find(|c| c.label == Label::from_octal(octal))
            .unwrap();
        let tx = TxMsg {
            config: cfg,
            sm: sm.bits(),
            sdi: 0,
            eng_value: eng,
            discrete_bits: 0,
        };
        let word = codec::encode_bnr(&tx).unwrap().0;
        assert_eq!(
            g.process_received(word, now),
            crate::rx::ReadStatus::Success
        );
    }

    fn feed_discrete(g: &mut RxGroup, octal: u8, bits: u32, sm: u8, now: u32) {
        let cfg = AHRS_RX
            .iter()
            .find(|c| c.label == Label::from_octal(octal))
            .unwrap();
        let tx = TxMsg {
            config: cfg,
            sm,
            sdi: 0,
            eng_value: 0.0,
            discrete_bits: bits,
        };
        let word = codec::encode_discrete(&tx).unwrap().0;
        assert_eq!(
            g.process_received(word, now),
            crate::rx::ReadStatus::Success
        );
    }

    fn eng_of(word: u32, cfg: &LabelConfig) -> f64 {
        codec::decode_bnr(cfg, word).unwrap().eng_float
    }

    #[test]
    fn turn_rate_spools_then_tracks_the_ramp() {
        let mut g = ahrs_group();
        let mut e = engine();
        let mut heading = 100.0;
        let mut now = 1000;

        // Eleven valid samples at 50 Hz stepping +0.1 deg each.
        let mut last = 0;
        for i in 0..11 {
            feed_bnr(&mut g, 0o320, heading, BnrSsm::NormalOperation, now);
            last = e.turn_rate(&g, now);
            if i < 10 {
                assert_eq!(
                    codec::ssm_bits(last),
                    BnrSsm::FailureWarning.bits(),
                    "sample {i} should still be spooling"
                );
            }
            heading += 0.1;
            now += 20;
        }
        assert_eq!(codec::ssm_bits(last), BnrSsm::NormalOperation.bits());
        assert!(
            (eng_of(last, &TX_TURN_RATE) - 5.0).abs() < 0.02,
            "turn rate {}",
            eng_of(last, &TX_TURN_RATE)
        );
    }

    #[test]
    fn turn_rate_restarts_after_stale_input() {
        let mut g = ahrs_group();
        let mut e = engine();
        let mut now = 1000;
        for _ in 0..12 {
            feed_bnr(&mut g, 0o320, 50.0, BnrSsm::NormalOperation, now);
            e.turn_rate(&g, now);
            now += 20;
        }
        // Let the heading go stale; the spool must restart from zero.
        now += 500;
        let word = e.turn_rate(&g, now);
        assert_eq!(codec::ssm_bits(word), BnrSsm::FailureWarning.bits());

        feed_bnr(&mut g, 0o320, 50.0, BnrSsm::NormalOperation, now);
        let word = e.turn_rate(&g, now);
        assert_eq!(codec::ssm_bits(word), BnrSsm::FailureWarning.bits());
        assert_eq!(eng_of(word, &TX_TURN_RATE), 0.0); // preload cycle
    }

    #[test]
    fn slip_angle_needs_both_accelerations() {
        let mut g = ahrs_group();
        let mut e = engine();
        feed_bnr(&mut g, 0o332, 0.1, BnrSsm::NormalOperation, 1000);
        // 333 missing: failure out, spool reset.
        let word = e.slip_angle(&g, 1000);
        assert_eq!(codec::ssm_bits(word), BnrSsm::FailureWarning.bits());
    }

    #[test]
    fn slip_angle_settles_to_the_arctangent() {
        let mut g = ahrs_group();
        let mut e = engine();
        let mut now = 1000;
        let mut last = 0;
        // Steady 0.05 g lateral, level flight normal acceleration of zero.
        for _ in 0..30 {
            feed_bnr(&mut g, 0o332, 0.05, BnrSsm::NormalOperation, now);
            feed_bnr(&mut g, 0o333, 0.0, BnrSsm::NormalOperation, now);
            last = e.slip_angle(&g, now);
            now += 20;
        }
        assert_eq!(codec::ssm_bits(last), BnrSsm::NormalOperation.bits());
        let expected = (-0.05f64).atan2(1.0).to_degrees();
        assert!((eng_of(last, &TX_SLIP_ANGLE) - expected).abs() < 0.05);
    }

    #[test]
    fn mag_heading_follows_msu_failure() {
        let mut g = ahrs_group();
        let e = engine();
        feed_bnr(&mut g, 0o320, 123.0, BnrSsm::NormalOperation, 1000);
        feed_bnr(&mut g, 0o320, 123.0, BnrSsm::NormalOperation, 1015);

        let word = e.new_mag_heading(&g, 1020);
        assert_eq!(codec::ssm_bits(word), BnrSsm::NormalOperation.bits());
        assert!((eng_of(word, &TX_MAG_HEADING) - 123.0).abs() < 0.09);

        // 271 reports an MSU failure; the heading goes out failed.
        feed_discrete(&mut g, 0o271, MSU_FAIL_BIT >> 10, 0, 1020);
        let word = e.new_mag_heading(&g, 1020);
        assert_eq!(codec::ssm_bits(word), BnrSsm::FailureWarning.bits());
    }

    #[test]
    fn normal_accel_shifts_and_revalidates() {
        let mut g = ahrs_group();
        let e = engine();
        feed_bnr(&mut g, 0o333, 0.5, BnrSsm::NormalOperation, 1000);
        feed_bnr(&mut g, 0o333, 0.5, BnrSsm::NormalOperation, 1015);
        let word = e.normal_accel(&g, 1020);
        assert_eq!(codec::ssm_bits(word), BnrSsm::NormalOperation.bits());
        assert!((eng_of(word, &TX_NORMAL_ACCEL) - 1.5).abs() < 0.01);
    }

    #[test]
    fn lat_accel_negates_the_sign() {
        let mut g = ahrs_group();
        let e = engine();
        feed_bnr(&mut g, 0o332, 0.25, BnrSsm::NormalOperation, 1000);
        feed_bnr(&mut g, 0o332, 0.25, BnrSsm::NormalOperation, 1015);
        let word = e.body_lat_accel(&g, 1020);
        assert!((eng_of(word, &TX_LAT_ACCEL) + 0.25).abs() < 0.01);
    }

    #[test]
    fn status_272_mirrors_271_and_flags_events() {
        let mut g = ahrs_group();
        let e = engine();

        // No 271 ever received: base word with the failure mask.
        assert_eq!(
            e.ahrs_status_272(&g, false, 0),
            STATUS_272_BASE | GROUP_FAILURE_SSM_MASK
        );

        // Valid 271, MSU-fail clear, ADC alive: base plus mirrored bits only.
        feed_discrete(&mut g, 0o271, 0, 0, 1000);
        let raw = g.latest(L_AHRS_STATUS, 1000).unwrap().raw_word;
        assert_eq!(
            e.ahrs_status_272(&g, false, 1000),
            STATUS_272_BASE | (raw & AHRS_STATUS_SDI_SSM_MASK)
        );

        // MSU-fail set and the air-data bus timed out.
        feed_discrete(&mut g, 0o271, MSU_FAIL_BIT >> 10, 3, 1010);
        let word = e.ahrs_status_272(&g, true, 1010);
        assert_ne!(word & Status272::HEADING_INVALID.bits(), 0);
        assert_ne!(word & Status272::ATTITUDE_INVALID.bits(), 0);
        assert_ne!(word & Status272::ADC_TIMEOUT.bits(), 0);
        assert_eq!(word & 0xFF, STATUS_272_BASE & 0xFF);
    }

    #[test]
    fn status_274_composes_all_three_sources() {
        let mut g = ahrs_group();
        let e = engine();
        feed_discrete(&mut g, 0o271, MSU_FAIL_BIT >> 10, 0, 1000);
        feed_discrete(&mut g, 0o270, MSU_CALIBRATING_BIT >> 10, 0, 1000);
        let word = e.ahrs_status_274(&g, true, 1000);
        assert_ne!(word & Status274::MSU_FAIL.bits(), 0);
        assert_ne!(word & Status274::MSU_CALIBRATING.bits(), 0);
        assert_ne!(word & Status274::ADC_TIMEOUT.bits(), 0);
        assert_eq!(word & 0xFF, STATUS_274_BASE & 0xFF);
    }

    #[test]
    fn status_275_tracks_flight_path_validity() {
        let mut g = ahrs_group();
        let e = engine();
        feed_discrete(&mut g, 0o271, 0, 0, 1000);
        let word = e.ahrs_status_275(&g, 1000);
        assert_eq!(word & Status275::FLIGHT_PATH_VALID.bits(), 0);

        feed_bnr(&mut g, 0o323, 0.1, BnrSsm::NormalOperation, 1000);
        let word = e.ahrs_status_275(&g, 1000);
        assert_ne!(word & Status275::FLIGHT_PATH_VALID.bits(), 0);
        assert_eq!(word & 0xFF, STATUS_275_BASE & 0xFF);
    }

    #[test]
    fn baro_correction_passes_plus_and_zeroes_otherwise() {
        use crate::tables::PFD_RX;
        let mut pfd = RxGroup::new(&PFD_RX, 10).unwrap();
        let e = engine();

        // Nothing received yet: no-computed-data, zero field.
        let word = e.baro_correction(&pfd, 0);
        assert_eq!(codec::ssm_bits(word), BcdSsm::NoComputedData.bits());
        let fields = codec::decode_bcd(&TX_BARO_CORRECTION, word).unwrap();
        assert_eq!(fields.eng_int, 0);

        let tx = TxMsg {
            config: &PFD_RX[0],
            sm: BcdSsm::Plus.bits(),
            sdi: 0,
            eng_value: 29.921,
            discrete_bits: 0,
        };
        let rx_word = codec::encode_bcd(&tx).unwrap().0;
        pfd.process_received(rx_word, 1000);
        pfd.process_received(rx_word, 1070);

        let word = e.baro_correction(&pfd, 1100);
        assert_eq!(codec::ssm_bits(word), BcdSsm::Plus.bits());
        let fields = codec::decode_bcd(&TX_BARO_CORRECTION, word).unwrap();
        assert!((fields.eng_float - 29.921).abs() < 1e-9);
    }
}
