//! The 100 Hz cooperative schedule.
//!
//! The board layer calls [`Bridge::tick`] once for every observed-and-
//! cleared 100 Hz timer flag. Each tick drains both transceivers and the
//! air-data link first, advances the bus-failure counters, then runs
//! whichever sub-rate blocks are due. The AHRS receiver is drained again
//! between blocks so its 32-word FIFO cannot overflow behind a slow block.
//!
//! Sub-rate blocks fire on a free-running tick counter (wrapped at the
//! 60-tick frame, the cycle of all four divisors):
//!
//! | every | phase | block |
//! |-------|-------|-------|
//! | 2     | 0     | AHRS-derived words and fast pass-throughs |
//! | 5     | 2     | status words 272/274/275, air-data reply |
//! | 12    | 2     | air-data forward to the display |
//! | 10    | 3     | next software-version word |

use enum_map::{Enum, EnumMap};

use crate::adc;
use crate::boot::{self, BootInputs, BootReport, Mode};
use crate::codec::{self, BcdSsm};
use crate::config::{BridgeConfig, ConfigError};
use crate::label::Label;
use crate::ports::{AdcLink, Clock, FaultPin, Straps, Transceiver};
use crate::rx::RxGroup;
use crate::tables::{
    ADC_PASSTHROUGH_TO_AHRS, ADC_PASSTHROUGH_TO_PFD, ADC_RX, AHRS_PASSTHROUGH_TO_PFD, AHRS_RX,
    PFD_RX,
};
use crate::version::{self, VersionGenerator};
use crate::words::WordEngine;

/// The three receive sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum Bus {
    Ahrs,
    Pfd,
    Adc,
}

/// One frame of the schedule: the cycle of all four divisors.
const SCHEDULE_FRAME_TICKS: u32 = 60;

const AHRS_WORDS_DIVISOR: u32 = 2;
const AHRS_WORDS_PHASE: u32 = 0;
const STATUS_DIVISOR: u32 = 5;
const STATUS_PHASE: u32 = 2;
const ADC_FORWARD_DIVISOR: u32 = 12;
const ADC_FORWARD_PHASE: u32 = 2;
const VERSION_DIVISOR: u32 = 10;
const VERSION_PHASE: u32 = 3;

/// Frames accepted from the air-data link in one tick.
const MAX_FRAMES_PER_TICK: usize = 4;

fn due(count: u32, divisor: u32, phase: u32) -> bool {
    count % divisor == phase
}

/// The I/O processor: all owned state plus the five hardware ports.
pub struct Bridge<C, A, B, L, F> {
    clock: C,
    ahrs_txvr: A,
    pfd_txvr: B,
    adc_link: L,
    fault_pin: F,
    cfg: BridgeConfig,
    groups: EnumMap<Bus, RxGroup>,
    engine: WordEngine,
    version: VersionGenerator,
    mode: Mode,
    boot: BootReport,
    tick_count: u32,
}

impl<C, A, B, L, F> Bridge<C, A, B, L, F>
where
    C: Clock,
    A: Transceiver,
    B: Transceiver,
    L: AdcLink,
    F: FaultPin,
{
    /// Brings the unit up: reads the straps, builds the receive groups,
    /// runs the startup self-tests and (when healthy and in normal mode)
    /// gathers the remote software versions. The returned bridge is ready
    /// for [`Bridge::tick`].
    pub fn new<S: Straps>(
        clock: C,
        mut ahrs_txvr: A,
        mut pfd_txvr: B,
        mut adc_link: L,
        fault_pin: F,
        straps: &mut S,
        cfg: BridgeConfig,
        inputs: BootInputs,
    ) -> Result<Self, ConfigError> {
        let mode = Mode::from_straps(straps.read_straps());

        let ahrs_group = RxGroup::new(&AHRS_RX, cfg.max_bus_failure_counts)?;
        let pfd_group = RxGroup::new(&PFD_RX, cfg.max_bus_failure_counts)?;
        let adc_group = RxGroup::new(&ADC_RX, cfg.max_bus_failure_counts)?;

        let boot = boot::run_self_tests(
            &mut ahrs_txvr,
            &mut pfd_txvr,
            &ahrs_group.filter_labels(),
            &pfd_group.filter_labels(),
            &cfg,
            &inputs,
        );

        let mut version = VersionGenerator::new();
        version.populate_local(inputs.program_crc);
        if !boot.fault_latched() && mode == Mode::Normal {
            version::gather_remote_versions(&mut version, &mut adc_link, &clock);
        }

        Ok(Bridge {
            engine: WordEngine::new(&cfg),
            clock,
            ahrs_txvr,
            pfd_txvr,
            adc_link,
            fault_pin,
            cfg,
            groups: EnumMap::from_array([ahrs_group, pfd_group, adc_group]),
            version,
            mode,
            boot,
            tick_count: 0,
        })
    }

    /// One 100 Hz tick. With a latched boot fault or in maintenance mode
    /// this is an idle spin and the fault output stays low.
    pub fn tick(&mut self) {
        if self.boot.fault_latched() || self.mode == Mode::Maintenance {
            return;
        }
        self.fault_pin.set_fault_output(true);
        let now = self.clock.now_ms();

        self.drain_ahrs(now);
        self.drain_pfd(now);
        self.poll_adc(now);

        for (_, group) in self.groups.iter_mut() {
            group.tick_bus_failure();
        }

        let count = self.tick_count;
        if due(count, AHRS_WORDS_DIVISOR, AHRS_WORDS_PHASE) {
            self.ahrs_words_task(now);
        }
        self.drain_ahrs(now);
        if due(count, STATUS_DIVISOR, STATUS_PHASE) {
            self.status_task(now);
        }
        self.drain_ahrs(now);
        if due(count, ADC_FORWARD_DIVISOR, ADC_FORWARD_PHASE) {
            self.adc_forward_task(now);
        }
        self.drain_ahrs(now);
        if due(count, VERSION_DIVISOR, VERSION_PHASE) {
            self.version_task();
        }

        self.tick_count = (self.tick_count + 1) % SCHEDULE_FRAME_TICKS;
        self.fault_pin.set_fault_output(false);
    }

    fn drain_ahrs(&mut self, now: u32) {
        let txvr = &mut self.ahrs_txvr;
        self.groups[Bus::Ahrs].drain(now, || {
            txvr.data_ready_rx1().then(|| txvr.read_rx1())
        });
    }

    fn drain_pfd(&mut self, now: u32) {
        let txvr = &mut self.pfd_txvr;
        self.groups[Bus::Pfd].drain(now, || {
            txvr.data_ready_rx1().then(|| txvr.read_rx1())
        });
    }

    fn poll_adc(&mut self, now: u32) {
        let mut buf = [0u8; adc::MAX_FRAME_LEN];
        for _ in 0..MAX_FRAMES_PER_TICK {
            let Some(len) = self.adc_link.poll_frame(&mut buf) else {
                break;
            };
            adc::ingest_frame(&buf[..len], &mut self.groups[Bus::Adc], now);
        }
    }

    /// The 50 Hz block: every word derived from the AHRS, the verbatim rate
    /// pass-throughs to the display, and the airspeed set to the AHRS.
    fn ahrs_words_task(&mut self, now: u32) {
        let ahrs = &self.groups[Bus::Ahrs];
        let engine = &mut self.engine;
        let derived = [
            engine.turn_rate(ahrs, now),
            engine.slip_angle(ahrs, now),
            engine.new_mag_heading(ahrs, now),
            engine.new_pitch(ahrs, now),
            engine.new_roll(ahrs, now),
            engine.body_lat_accel(ahrs, now),
            engine.normal_accel(ahrs, now),
        ];
        for word in derived {
            self.pfd_txvr.transmit(word);
        }

        for &octal in &AHRS_PASSTHROUGH_TO_PFD {
            if let Some(word) = self.groups[Bus::Ahrs].latest_word(Label::from_octal(octal), now)
            {
                self.pfd_txvr.transmit(word);
            }
        }
        for &octal in &ADC_PASSTHROUGH_TO_AHRS {
            if let Some(word) = self.groups[Bus::Adc].latest_word(Label::from_octal(octal), now)
            {
                self.ahrs_txvr.transmit(word);
            }
        }
    }

    /// The 20 Hz block: status words to the display and the serial reply to
    /// the air-data computer.
    fn status_task(&mut self, now: u32) {
        let adc_timeout = self.groups[Bus::Adc].has_bus_failed();
        let ahrs = &self.groups[Bus::Ahrs];
        let words = [
            self.engine.ahrs_status_272(ahrs, adc_timeout, now),
            self.engine.ahrs_status_274(ahrs, adc_timeout, now),
            self.engine.ahrs_status_275(ahrs, now),
        ];
        for word in words {
            self.pfd_txvr.transmit(word);
        }

        let baro = self.engine.baro_correction(&self.groups[Bus::Pfd], now);
        let status = self.link_status_byte();
        self.adc_link.send_frame(&adc::compose_reply(baro, status));
    }

    /// The slow block: air-data words forwarded to the display, gated on a
    /// valid baro correction. The bridge's own 235 leads the set.
    fn adc_forward_task(&mut self, now: u32) {
        let baro = self.engine.baro_correction(&self.groups[Bus::Pfd], now);
        self.pfd_txvr.transmit(baro);
        if codec::ssm_bits(baro) != BcdSsm::Plus.bits() {
            return;
        }
        for &octal in &ADC_PASSTHROUGH_TO_PFD {
            if let Some(word) = self.groups[Bus::Adc].latest_word(Label::from_octal(octal), now)
            {
                self.pfd_txvr.transmit(word);
            }
        }
    }

    fn version_task(&mut self) {
        let word = self.version.next_word();
        self.pfd_txvr.transmit(word);
    }

    fn link_status_byte(&self) -> u8 {
        let mut status = 0;
        if self.groups[Bus::Ahrs].has_bus_failed() {
            status |= 0x01;
        }
        if self.groups[Bus::Pfd].has_bus_failed() {
            status |= 0x02;
        }
        if self.groups[Bus::Adc].has_bus_failed() {
            status |= 0x04;
        }
        status
    }

    pub fn boot_report(&self) -> &BootReport {
        &self.boot
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.cfg
    }

    pub fn group(&self, bus: Bus) -> &RxGroup {
        &self.groups[bus]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_rates_over_one_second() {
        let fires = |divisor, phase| {
            (0..100u32)
                .filter(|tick| due(tick % SCHEDULE_FRAME_TICKS, divisor, phase))
                .count()
        };
        assert_eq!(fires(AHRS_WORDS_DIVISOR, AHRS_WORDS_PHASE), 50);
        assert_eq!(fires(STATUS_DIVISOR, STATUS_PHASE), 20);
        assert_eq!(fires(VERSION_DIVISOR, VERSION_PHASE), 10);
        // The forward block lands between 16 and 17 Hz.
        let forward = fires(ADC_FORWARD_DIVISOR, ADC_FORWARD_PHASE);
        assert!((8..=9).contains(&forward), "{forward} firings in 100 ticks");
    }

    #[test]
    fn odd_phases_dodge_each_other() {
        // The status and version blocks never land on the same tick.
        for tick in 0..SCHEDULE_FRAME_TICKS {
            assert!(
                !(due(tick, STATUS_DIVISOR, STATUS_PHASE)
                    && due(tick, VERSION_DIVISOR, VERSION_PHASE)),
                "tick {tick}"
            );
        }
    }
}
