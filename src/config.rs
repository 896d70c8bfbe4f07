//! Per-label and bridge-wide configuration.
//!
//! [`LabelConfig`] is the immutable description of one label: how its data
//! field is encoded, its engineering resolution, and the transmit-interval
//! contract used for babble and freshness checks. Label tables are built as
//! `static` arrays (see [`crate::tables`]) and validated once when a receive
//! group is constructed.
//!
//! [`BridgeConfig`] is the read-only configuration record the unit is
//! personalized with: filter coefficients, differentiator parameters and
//! hardware init constants. It deserializes from JSON so a bench setup can
//! override the shipped defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::label::{Label, MessageType};

/// Hard capacity of one receive group.
pub const MAX_GROUP_LABELS: usize = 64;

/// Configuration problems. All of these are fatal at construction time;
/// none can occur once a group is built.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// BNR significant bits must be 1..=20.
    #[error("label {label}: BNR significant bits out of range: {bits}")]
    BnrSigBits { label: Label, bits: u8 },

    /// BCD significant digits must be 1..=5.
    #[error("label {label}: BCD significant digits out of range: {digits}")]
    BcdSigDigits { label: Label, digits: u8 },

    /// Discrete bit count must be 1..=19 (and 0..=19 as a side field).
    #[error("label {label}: discrete bit count out of range: {bits}")]
    DiscreteBits { label: Label, bits: u8 },

    /// BCD digits plus discretes do not fit the 19-bit data field.
    #[error("label {label}: BCD digits and discretes overflow the data field")]
    BcdFieldOverflow { label: Label },

    /// Transmit interval bounds are inverted.
    #[error("label {label}: min transmit interval {min} ms exceeds max {max} ms")]
    IntervalOrder { label: Label, min: u32, max: u32 },

    /// The same label appears twice in one group.
    #[error("duplicate label {0} in receive group")]
    DuplicateLabel(Label),

    /// More labels than a group can hold.
    #[error("receive group holds {0} labels, limit is {MAX_GROUP_LABELS}")]
    GroupTooLarge(usize),
}

/// Immutable description of one configured label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Wire-order label this entry matches.
    pub label: Label,
    pub msg_type: MessageType,
    /// BNR: significant data bits, sign excluded. 1..=20.
    pub num_sig_bits: u8,
    /// BCD: significant digits. 1..=5.
    pub num_sig_digits: u8,
    /// Engineering units per least-significant data bit (or digit).
    pub resolution: f64,
    /// Discrete bits carried in the low end of the data field.
    pub num_discrete_bits: u8,
    /// Engineering range for BNR validity checking.
    pub min_valid_value: Option<f64>,
    pub max_valid_value: Option<f64>,
    /// A source transmitting faster than this is babbling.
    pub min_transmit_interval_ms: u32,
    /// A word older than this is stale.
    pub max_transmit_interval_ms: u32,
}

impl LabelConfig {
    /// A BNR label with no valid-range restriction and no discretes.
    pub const fn bnr(
        octal: u8,
        num_sig_bits: u8,
        resolution: f64,
        min_interval_ms: u32,
        max_interval_ms: u32,
    ) -> Self {
        LabelConfig {
            label: Label::from_octal(octal),
            msg_type: MessageType::Bnr,
            num_sig_bits,
            num_sig_digits: 0,
            resolution,
            num_discrete_bits: 0,
            min_valid_value: None,
            max_valid_value: None,
            min_transmit_interval_ms: min_interval_ms,
            max_transmit_interval_ms: max_interval_ms,
        }
    }

    /// A BCD label.
    pub const fn bcd(
        octal: u8,
        num_sig_digits: u8,
        resolution: f64,
        min_interval_ms: u32,
        max_interval_ms: u32,
    ) -> Self {
        LabelConfig {
            label: Label::from_octal(octal),
            msg_type: MessageType::Bcd,
            num_sig_bits: 0,
            num_sig_digits,
            resolution,
            num_discrete_bits: 0,
            min_valid_value: None,
            max_valid_value: None,
            min_transmit_interval_ms: min_interval_ms,
            max_transmit_interval_ms: max_interval_ms,
        }
    }

    /// A discrete label.
    pub const fn discrete(
        octal: u8,
        num_discrete_bits: u8,
        min_interval_ms: u32,
        max_interval_ms: u32,
    ) -> Self {
        LabelConfig {
            label: Label::from_octal(octal),
            msg_type: MessageType::Discrete,
            num_sig_bits: 0,
            num_sig_digits: 0,
            resolution: 0.0,
            num_discrete_bits,
            min_valid_value: None,
            max_valid_value: None,
            min_transmit_interval_ms: min_interval_ms,
            max_transmit_interval_ms: max_interval_ms,
        }
    }

    /// Adds an engineering validity range (BNR).
    pub const fn with_valid_range(mut self, min: f64, max: f64) -> Self {
        self.min_valid_value = Some(min);
        self.max_valid_value = Some(max);
        self
    }

    /// Adds discrete bits to a BNR or BCD label.
    pub const fn with_discretes(mut self, num_discrete_bits: u8) -> Self {
        self.num_discrete_bits = num_discrete_bits;
        self
    }

    /// Checks the structural invariants. Called once per entry when a
    /// receive group is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.msg_type {
            MessageType::Bnr => {
                if self.num_sig_bits == 0 || self.num_sig_bits > 20 {
                    return Err(ConfigError::BnrSigBits {
                        label: self.label,
                        bits: self.num_sig_bits,
                    });
                }
                if self.num_discrete_bits > 19 {
                    return Err(ConfigError::DiscreteBits {
                        label: self.label,
                        bits: self.num_discrete_bits,
                    });
                }
            }
            MessageType::Bcd => {
                if self.num_sig_digits == 0 || self.num_sig_digits > 5 {
                    return Err(ConfigError::BcdSigDigits {
                        label: self.label,
                        digits: self.num_sig_digits,
                    });
                }
                let field_bits =
                    4 * self.num_sig_digits as u32 - 1 + self.num_discrete_bits as u32;
                if field_bits > 19 {
                    return Err(ConfigError::BcdFieldOverflow { label: self.label });
                }
            }
            MessageType::Discrete => {
                if self.num_discrete_bits == 0 || self.num_discrete_bits > 19 {
                    return Err(ConfigError::DiscreteBits {
                        label: self.label,
                        bits: self.num_discrete_bits,
                    });
                }
            }
        }
        if self.min_transmit_interval_ms > self.max_transmit_interval_ms {
            return Err(ConfigError::IntervalOrder {
                label: self.label,
                min: self.min_transmit_interval_ms,
                max: self.max_transmit_interval_ms,
            });
        }
        Ok(())
    }
}

/// First-order low-pass coefficients: `y[n] = k1*y[n-1] + k2*x[n]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LowPassConfig {
    pub k1: f64,
    pub k2: f64,
}

impl Default for LowPassConfig {
    fn default() -> Self {
        LowPassConfig {
            k1: 0.7777678,
            k2: 0.2222322,
        }
    }
}

/// Rate-limited differentiator parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifferentiatorConfig {
    pub k1: f64,
    pub sample_rate_hz: f64,
    /// Output clamp, engineering units per second.
    pub upper_limit: f64,
    pub lower_limit: f64,
    /// Input-step window; a step outside it is treated as a wrap, not a rate.
    pub upper_delta: f64,
    pub lower_delta: f64,
}

impl Default for DifferentiatorConfig {
    fn default() -> Self {
        DifferentiatorConfig {
            k1: 0.99,
            sample_rate_hz: 50.0,
            upper_limit: 180.0,
            lower_limit: -180.0,
            upper_delta: 360.0,
            lower_delta: -360.0,
        }
    }
}

/// Hardware init constants applied by the board layer at power-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HwInitConfig {
    /// System tick timer period, microseconds.
    pub tick_timer_period_us: u32,
    /// UART baud-rate selector for the air-data link.
    pub uart_baud_selector: u16,
    /// Program-memory CRC polynomial.
    pub crc_key: u32,
    /// Control-register image for the AHRS-side transceiver.
    pub ctrl_register_ahrs: u16,
    /// Control-register image for the display-side transceiver.
    pub ctrl_register_pfd: u16,
}

impl Default for HwInitConfig {
    fn default() -> Self {
        HwInitConfig {
            tick_timer_period_us: 1_000,
            uart_baud_selector: 0x0002,
            crc_key: 0x04C1_1DB7,
            ctrl_register_ahrs: 0x0025,
            ctrl_register_pfd: 0x0025,
        }
    }
}

/// The read-only configuration record for one bridge unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub lowpass: LowPassConfig,
    pub differentiator: DifferentiatorConfig,
    pub hw: HwInitConfig,
    /// Silent 10 ms ticks tolerated before a bus is declared failed.
    pub max_bus_failure_counts: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            lowpass: LowPassConfig::default(),
            differentiator: DifferentiatorConfig::default(),
            hw: HwInitConfig::default(),
            max_bus_failure_counts: 10,
        }
    }
}

impl BridgeConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
