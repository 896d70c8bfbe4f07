//! # arinc-bridge
//!
//! The message-processing core of an avionics I/O bridge that sits between
//! three buses: an attitude/heading reference (AHRS) on one ARINC 429
//! transceiver, a primary flight display on a second, and an air-data
//! computer reached over a framed RS-422 link.
//!
//! Provides:
//! - Bit-exact encoding and decoding of 32-bit ARINC 429 words (BNR, BCD,
//!   Discrete) with clipping on overflow
//! - Per-label receive slots with freshness and babble timekeeping and
//!   bus-failure detection
//! - Derived-word calculators: a rate-limited turn-rate differentiator, a
//!   filtered slip angle, re-originated attitude words and the AHRS status
//!   words, all with spool-up and graceful degradation
//! - A 100 Hz cooperative scheduler dispatching the transmit blocks at
//!   50/20/~17/10 Hz with interleaved receive drains
//! - Startup built-in tests (loopback, control-register and label-filter
//!   readback) behind narrow hardware port traits
//!
//! No allocation happens after construction and the core never blocks;
//! the board layer owns the interrupt handlers and calls [`Bridge::tick`]
//! from its super-loop.
//!
//! ## Example
//!
//! ```rust
//! use arinc_bridge::codec::{self, BnrSsm, TxMsg};
//! use arinc_bridge::tables::TX_TURN_RATE;
//!
//! // Encode a 3 deg/s turn rate on label 340...
//! let tx = TxMsg {
//!     config: &TX_TURN_RATE,
//!     sm: BnrSsm::NormalOperation.bits(),
//!     sdi: 0,
//!     eng_value: 3.0,
//!     discrete_bits: 0,
//! };
//! let (word, _) = codec::encode_bnr(&tx).unwrap();
//!
//! // ...and read it back, exact to within half a resolution step.
//! let fields = codec::decode_bnr(&TX_TURN_RATE, word).unwrap();
//! assert!((fields.eng_float - 3.0).abs() <= 0.015625 / 2.0);
//! assert_eq!(fields.sm, BnrSsm::NormalOperation.bits());
//! ```

pub mod adc;
pub mod boot;
pub mod codec;
pub mod config;
pub mod filter;
pub mod label;
pub mod ports;
pub mod rx;
pub mod sched;
pub mod tables;
pub mod version;
pub mod words;

pub use boot::{BootInputs, BootReport, Mode};
pub use codec::{BcdSsm, BnrSsm, CodecError, RxFields, TxMsg, TxStatus};
pub use config::{BridgeConfig, ConfigError, LabelConfig};
pub use label::{Label, MessageType};
pub use rx::{ReadStatus, RxGroup, RxSlot};
pub use sched::{Bridge, Bus};
