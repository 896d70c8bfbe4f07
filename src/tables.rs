//! The label tables this unit is personalized with.
//!
//! Three receive sources and the set of labels the bridge originates.
//! Resolutions follow the usual ARINC 429 assignments for each parameter;
//! intervals are the transmit contracts of the attached equipment.

use crate::config::LabelConfig;
use crate::label::Label;

// Input labels referenced by the derived-word calculators.
pub const L_MSU_DISCRETES: Label = Label::from_octal(0o270);
pub const L_AHRS_STATUS: Label = Label::from_octal(0o271);
pub const L_MAG_HEADING: Label = Label::from_octal(0o320);
pub const L_FLIGHT_PATH_ACCEL: Label = Label::from_octal(0o323);
pub const L_PITCH: Label = Label::from_octal(0o324);
pub const L_ROLL: Label = Label::from_octal(0o325);
pub const L_LAT_ACCEL: Label = Label::from_octal(0o332);
pub const L_NORMAL_ACCEL: Label = Label::from_octal(0o333);
pub const L_BARO_CORRECTION: Label = Label::from_octal(0o235);

/// Labels received from the attitude/heading reference on transceiver A.
pub static AHRS_RX: [LabelConfig; 12] = [
    LabelConfig::discrete(0o270, 19, 20, 200),
    LabelConfig::discrete(0o271, 19, 20, 200),
    LabelConfig::bnr(0o320, 15, 0.0054931640625, 10, 60), // magnetic heading, deg
    LabelConfig::bnr(0o323, 12, 0.001953125, 10, 60),     // flight path accel, g
    LabelConfig::bnr(0o324, 14, 0.010986328125, 10, 60),  // pitch, deg
    LabelConfig::bnr(0o325, 14, 0.010986328125, 10, 60),  // roll, deg
    LabelConfig::bnr(0o326, 13, 0.015625, 10, 60),        // body pitch rate, deg/s
    LabelConfig::bnr(0o327, 13, 0.015625, 10, 60),        // body roll rate, deg/s
    LabelConfig::bnr(0o330, 13, 0.015625, 10, 60),        // body yaw rate, deg/s
    LabelConfig::bnr(0o331, 12, 0.001953125, 10, 60),     // longitudinal accel, g
    LabelConfig::bnr(0o332, 12, 0.001953125, 10, 60),     // lateral accel, g
    LabelConfig::bnr(0o333, 12, 0.001953125, 10, 60),     // normal accel, g
];

/// Labels received from the flight display on transceiver B.
pub static PFD_RX: [LabelConfig; 1] = [
    LabelConfig::bcd(0o235, 5, 0.001, 62, 500), // baro correction, inHg
];

/// Labels carried in frames from the air-data computer.
pub static ADC_RX: [LabelConfig; 16] = [
    LabelConfig::bnr(0o200, 14, 0.0625, 20, 120),  // max allowable airspeed, kt
    LabelConfig::bnr(0o203, 17, 1.0, 20, 120),     // pressure altitude, ft
    LabelConfig::bnr(0o204, 17, 1.0, 20, 120),     // baro corrected altitude, ft
    LabelConfig::bnr(0o205, 16, 0.0000625, 20, 120), // mach
    LabelConfig::bnr(0o206, 14, 0.0625, 20, 120),  // computed airspeed, kt
    LabelConfig::bnr(0o210, 15, 0.0625, 20, 120),  // true airspeed, kt
    LabelConfig::bnr(0o211, 11, 0.25, 20, 120),    // total air temperature, degC
    LabelConfig::bnr(0o212, 11, 16.0, 20, 120),    // altitude rate, ft/min
    LabelConfig::bnr(0o213, 11, 0.25, 20, 120),    // static air temperature, degC
    LabelConfig::bnr(0o215, 14, 0.03125, 20, 120), // impact pressure, mb
    LabelConfig::bnr(0o217, 14, 0.0625, 20, 120),  // static pressure, mb
    LabelConfig::bnr(0o221, 12, 0.0439453125, 20, 120), // angle of attack, deg
    LabelConfig::bcd(0o235, 5, 0.001, 62, 500),    // baro correction echo, inHg
    LabelConfig::bnr(0o242, 14, 0.0625, 20, 120),  // total pressure, mb
    LabelConfig::discrete(0o271, 19, 20, 200),     // air-data status discretes
    LabelConfig::bcd(0o377, 3, 1.0, 100, 1000),    // equipment identity
];

/// AHRS rate labels retransmitted verbatim to the display at 50 Hz.
pub static AHRS_PASSTHROUGH_TO_PFD: [u8; 4] = [0o326, 0o327, 0o330, 0o331];

/// Air-data labels retransmitted to the AHRS at 50 Hz.
pub static ADC_PASSTHROUGH_TO_AHRS: [u8; 3] = [0o206, 0o210, 0o221];

/// Air-data labels retransmitted to the display in the slow block. The
/// baro correction is not in this set; the bridge re-originates label 235
/// itself from the display's own setting.
pub static ADC_PASSTHROUGH_TO_PFD: [u8; 15] = [
    0o200, 0o203, 0o204, 0o205, 0o206, 0o210, 0o211, 0o212, 0o213, 0o215, 0o217, 0o221,
    0o242, 0o271, 0o377,
];

// Words the bridge originates.

pub static TX_TURN_RATE: LabelConfig =
    LabelConfig::bnr(0o340, 13, 0.015625, 20, 100).with_valid_range(-64.0, 64.0);

pub static TX_SLIP_ANGLE: LabelConfig = LabelConfig::bnr(0o250, 12, 0.0439453125, 20, 100);

pub static TX_MAG_HEADING: LabelConfig = LabelConfig::bnr(0o320, 12, 0.087890625, 20, 100);

pub static TX_PITCH: LabelConfig = LabelConfig::bnr(0o324, 13, 0.02197265625, 20, 100);

pub static TX_ROLL: LabelConfig = LabelConfig::bnr(0o325, 12, 0.087890625, 20, 100);

pub static TX_LAT_ACCEL: LabelConfig = LabelConfig::bnr(0o332, 12, 0.001953125, 20, 100);

pub static TX_NORMAL_ACCEL: LabelConfig =
    LabelConfig::bnr(0o333, 12, 0.001953125, 20, 100).with_valid_range(-3.0, 5.0);

pub static TX_BARO_CORRECTION: LabelConfig = LabelConfig::bcd(0o235, 5, 0.001, 50, 250);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rx::RxGroup;

    #[test]
    fn all_tables_build_into_groups() {
        RxGroup::new(&AHRS_RX, 10).unwrap();
        RxGroup::new(&PFD_RX, 10).unwrap();
        RxGroup::new(&ADC_RX, 10).unwrap();
    }

    #[test]
    fn tx_configs_are_valid() {
        for cfg in [
            &TX_TURN_RATE,
            &TX_SLIP_ANGLE,
            &TX_MAG_HEADING,
            &TX_PITCH,
            &TX_ROLL,
            &TX_LAT_ACCEL,
            &TX_NORMAL_ACCEL,
            &TX_BARO_CORRECTION,
        ] {
            cfg.validate().unwrap();
        }
    }

    #[test]
    fn passthrough_sets_are_configured_in_their_groups() {
        let ahrs = RxGroup::new(&AHRS_RX, 10).unwrap();
        for &octal in &AHRS_PASSTHROUGH_TO_PFD {
            assert!(ahrs.contains(Label::from_octal(octal)), "label {octal:o}");
        }
        let adc = RxGroup::new(&ADC_RX, 10).unwrap();
        for &octal in ADC_PASSTHROUGH_TO_AHRS
            .iter()
            .chain(&ADC_PASSTHROUGH_TO_PFD)
        {
            assert!(adc.contains(Label::from_octal(octal)), "label {octal:o}");
        }
    }
}
