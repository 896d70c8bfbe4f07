//! The receive pipeline: label dispatch, slot state and bus timekeeping.
//!
//! Each receive source (AHRS, display, air-data) owns an [`RxGroup`]: an
//! ordered table of configured labels, each with one live [`RxSlot`]. Words
//! are dispatched by wire-order label, decoded per the slot's type, and the
//! slot timestamps maintain the two per-label timing judgements:
//!
//! * *babbling* — the source transmitted faster than its contracted minimum
//!   interval (judged when the word arrives);
//! * *freshness* — the newest good word is younger than the contracted
//!   maximum interval (judged every time the slot is read, never cached).

use crate::codec::{self, CodecError, PARITY_ERROR_BIT};
use crate::config::{ConfigError, LabelConfig, MAX_GROUP_LABELS};
use crate::label::Label;

/// Hardware receive FIFO depth; one drain never reads more than this.
pub const FIFO_DEPTH: usize = 32;

/// Outcome of feeding one word to a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    Success,
    /// The label is not configured for this group.
    NoMatchingLabel,
    /// The word matched a label but failed its type-specific decode; the
    /// slot is untouched.
    Decode(CodecError),
}

/// Live state for one configured label.
#[derive(Debug, Clone, Copy, Default)]
pub struct RxSlot {
    pub raw_word: u32,
    pub sm: u8,
    pub sdi: u8,
    pub eng_float: f64,
    pub eng_int: i32,
    pub discrete_bits: u32,
    /// Timestamp of the last successful decode.
    pub last_good_ms: u32,
    /// Gap before the last good word met the minimum interval.
    pub is_not_babbling: bool,
    /// Recomputed from the clock on every read; meaningless inside the
    /// stored slot itself.
    pub is_fresh: bool,
    seen: bool,
}

impl RxSlot {
    /// Whether any word has ever decoded successfully into this slot.
    pub fn has_data(&self) -> bool {
        self.seen
    }
}

struct Entry {
    cfg: &'static LabelConfig,
    slot: RxSlot,
}

/// The receive state for one bus.
pub struct RxGroup {
    entries: Vec<Entry>,
    max_bus_failure_counts: u32,
    current_counts: u32,
    has_bus_failed: bool,
    parity_discards: u32,
}

impl RxGroup {
    /// Builds a group over a static label table. Every config is validated
    /// and duplicate labels are rejected; after this nothing allocates.
    pub fn new(
        configs: &'static [LabelConfig],
        max_bus_failure_counts: u32,
    ) -> Result<Self, ConfigError> {
        if configs.len() > MAX_GROUP_LABELS {
            return Err(ConfigError::GroupTooLarge(configs.len()));
        }
        let mut entries = Vec::with_capacity(configs.len());
        for cfg in configs {
            cfg.validate()?;
            if configs.iter().filter(|c| c.label == cfg.label).count() > 1 {
                return Err(ConfigError::DuplicateLabel(cfg.label));
            }
            entries.push(Entry {
                cfg,
                slot: RxSlot::default(),
            });
        }
        Ok(RxGroup {
            entries,
            max_bus_failure_counts,
            current_counts: 0,
            has_bus_failed: false,
            parity_discards: 0,
        })
    }

    fn find(&self, label: Label) -> Option<usize> {
        // Linear scan; groups are small and built once.
        self.entries.iter().position(|e| e.cfg.label == label)
    }

    pub fn contains(&self, label: Label) -> bool {
        self.find(label).is_some()
    }

    /// Dispatches one received word. On success the slot is overwritten,
    /// its babble judgement refreshed, its timestamp advanced, and the
    /// bus-failure count cleared.
    pub fn process_received(&mut self, word: u32, now_ms: u32) -> ReadStatus {
        let label = Label::from_word(word);
        let Some(idx) = self.find(label) else {
            return ReadStatus::NoMatchingLabel;
        };
        let entry = &mut self.entries[idx];

        let fields = match codec::decode(entry.cfg, word) {
            Ok(fields) => fields,
            Err(err) => {
                log::debug!("label {label}: dropped word {word:#010X}: {err}");
                return ReadStatus::Decode(err);
            }
        };

        let slot = &mut entry.slot;
        // Judged against the previous good receipt, before the timestamp
        // moves.
        slot.is_not_babbling = now_ms.wrapping_sub(slot.last_good_ms)
            >= entry.cfg.min_transmit_interval_ms;
        slot.raw_word = fields.raw_word;
        slot.sm = fields.sm;
        slot.sdi = fields.sdi;
        slot.eng_float = fields.eng_float;
        slot.eng_int = fields.eng_int;
        slot.discrete_bits = fields.discrete_bits;
        slot.last_good_ms = now_ms;
        slot.seen = true;

        self.current_counts = 0;
        ReadStatus::Success
    }

    /// Copies out the slot for `label` with its freshness judged against
    /// `now_ms`.
    pub fn latest(&self, label: Label, now_ms: u32) -> Option<RxSlot> {
        let idx = self.find(label)?;
        let entry = &self.entries[idx];
        let mut slot = entry.slot;
        slot.is_fresh = slot.seen
            && now_ms.wrapping_sub(slot.last_good_ms) <= entry.cfg.max_transmit_interval_ms;
        Some(slot)
    }

    /// The raw word for `label`, only if it is fresh and its source is not
    /// babbling. This is the pass-through retransmission gate.
    pub fn latest_word(&self, label: Label, now_ms: u32) -> Option<u32> {
        let slot = self.latest(label, now_ms)?;
        (slot.is_fresh && slot.is_not_babbling).then_some(slot.raw_word)
    }

    /// Drains up to one FIFO's worth of words from a receiver. `pop`
    /// returns `None` when the hardware has nothing ready. Words flagged by
    /// the hardware parity check are counted and discarded.
    pub fn drain(&mut self, now_ms: u32, mut pop: impl FnMut() -> Option<u32>) {
        for _ in 0..FIFO_DEPTH {
            let Some(word) = pop() else {
                break;
            };
            if word & PARITY_ERROR_BIT != 0 {
                self.parity_discards = self.parity_discards.wrapping_add(1);
                log::debug!("parity-flagged word {word:#010X} discarded");
                continue;
            }
            self.process_received(word, now_ms);
        }
    }

    /// Called once per 10 ms scheduler tick. Counts silent ticks and
    /// reports whether the bus has been silent long enough to be failed.
    pub fn tick_bus_failure(&mut self) -> bool {
        self.current_counts = self.current_counts.saturating_add(1);
        let failed = self.current_counts >= self.max_bus_failure_counts;
        if failed && !self.has_bus_failed {
            log::warn!("bus silent for {} ticks, declaring failure", self.current_counts);
        }
        self.has_bus_failed = failed;
        failed
    }

    pub fn has_bus_failed(&self) -> bool {
        self.has_bus_failed
    }

    /// Words dropped so far because the hardware flagged a parity error.
    pub fn parity_discards(&self) -> u32 {
        self.parity_discards
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wire-order labels for the hardware recognition memory, first 16
    /// entries, zero-padded.
    pub fn filter_labels(&self) -> [u8; 16] {
        let mut labels = [0u8; 16];
        for (dst, entry) in labels.iter_mut().zip(&self.entries) {
            *dst = entry.cfg.label.wire();
        }
        labels
    }
}
