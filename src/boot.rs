//! Startup built-in tests and mode selection.
//!
//! Power-on RAM and program-CRC checks run in the board layer before this
//! crate is entered; their verdicts arrive in [`BootInputs`]. This module
//! adds the transceiver checks: control-register readback, wrap-around
//! loopback and label-filter readback. Any failure latches the boot fault,
//! which holds the scheduler in an idle spin with the fault output low.

use crate::config::BridgeConfig;
use crate::ports::Transceiver;

pub const LOOPBACK_TX_PATTERN: u32 = 0xA5A5_A500;
pub const LOOPBACK_RX1_EXPECT: u32 = 0xA5A5_A500;
pub const LOOPBACK_RX2_EXPECT: u32 = 0xDA5A_5AFF;
/// Send/readback cycles before the loopback test gives up.
pub const LOOPBACK_TRIES: usize = 50;
/// Write/readback cycles before the label filter gives up.
pub const LABEL_FILTER_TRIES: usize = 3;

/// Operating mode selected by the configuration straps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Ground-maintenance mode; the periodic schedule does not run.
    Maintenance,
}

impl Mode {
    pub fn from_straps(straps: u8) -> Self {
        if straps & 0x01 != 0 {
            Mode::Maintenance
        } else {
            Mode::Normal
        }
    }
}

/// Verdicts handed in from the board layer, plus the program identity.
#[derive(Debug, Clone, Copy)]
pub struct BootInputs {
    pub ram_ok: bool,
    pub program_crc_ok: bool,
    /// CRC of the program image, for the software-version table.
    pub program_crc: u32,
}

impl BootInputs {
    /// All external checks passed; convenient for benches and tests.
    pub fn passing(program_crc: u32) -> Self {
        BootInputs {
            ram_ok: true,
            program_crc_ok: true,
            program_crc,
        }
    }
}

/// Results of every startup check. Any `false` latches the fault.
#[derive(Debug, Clone, Copy, Default)]
pub struct BootReport {
    pub ram_ok: bool,
    pub program_crc_ok: bool,
    pub ctrl_ahrs_ok: bool,
    pub ctrl_pfd_ok: bool,
    pub loopback_ahrs_ok: bool,
    pub loopback_pfd_ok: bool,
    pub label_filter_ahrs_ok: bool,
    pub label_filter_pfd_ok: bool,
}

impl BootReport {
    pub fn fault_latched(&self) -> bool {
        !(self.ram_ok
            && self.program_crc_ok
            && self.ctrl_ahrs_ok
            && self.ctrl_pfd_ok
            && self.loopback_ahrs_ok
            && self.loopback_pfd_ok
            && self.label_filter_ahrs_ok
            && self.label_filter_pfd_ok)
    }
}

/// Wrap-around self-test of one transceiver: route the transmitter into
/// both receivers, send the known pattern, and look for the two expected
/// readbacks within the retry budget.
pub fn loopback_test<T: Transceiver>(txvr: &mut T) -> bool {
    txvr.set_self_test(true);
    txvr.flush_fifos();

    let mut pass = false;
    for _ in 0..LOOPBACK_TRIES {
        txvr.transmit(LOOPBACK_TX_PATTERN);
        if !(txvr.data_ready_rx1() && txvr.data_ready_rx2()) {
            continue;
        }
        if txvr.read_rx1() == LOOPBACK_RX1_EXPECT && txvr.read_rx2() == LOOPBACK_RX2_EXPECT {
            pass = true;
            break;
        }
    }

    txvr.set_self_test(false);
    txvr.flush_fifos();
    pass
}

/// Programs the hardware label-recognition memory and verifies it by
/// readback. After the retry budget the recognition bit is cleared so the
/// receivers fall back to accepting every label.
pub fn setup_label_filter<T: Transceiver>(txvr: &mut T, labels: &[u8; 16]) -> bool {
    for _ in 0..LABEL_FILTER_TRIES {
        txvr.write_label_filter(labels);
        if txvr.read_label_filter() == *labels {
            txvr.set_label_recognition(true);
            return true;
        }
    }
    txvr.set_label_recognition(false);
    false
}

/// Runs every startup check against both transceivers.
pub fn run_self_tests<A, B>(
    ahrs: &mut A,
    pfd: &mut B,
    ahrs_filter: &[u8; 16],
    pfd_filter: &[u8; 16],
    cfg: &BridgeConfig,
    inputs: &BootInputs,
) -> BootReport
where
    A: Transceiver,
    B: Transceiver,
{
    let report = BootReport {
        ram_ok: inputs.ram_ok,
        program_crc_ok: inputs.program_crc_ok,
        ctrl_ahrs_ok: ahrs.load_ctrl_register(cfg.hw.ctrl_register_ahrs),
        ctrl_pfd_ok: pfd.load_ctrl_register(cfg.hw.ctrl_register_pfd),
        loopback_ahrs_ok: loopback_test(ahrs),
        loopback_pfd_ok: loopback_test(pfd),
        label_filter_ahrs_ok: setup_label_filter(ahrs, ahrs_filter),
        label_filter_pfd_ok: setup_label_filter(pfd, pfd_filter),
    };
    if report.fault_latched() {
        log::error!("boot fault latched: {report:?}");
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A transceiver whose loopback starts answering after a configurable
    /// number of transmit attempts, and whose filter memory drops writes a
    /// configurable number of times.
    struct FlakyTxvr {
        self_test: bool,
        answer_after: usize,
        transmits: usize,
        loopback_ready: bool,
        filter_mem: [u8; 16],
        filter_drops: usize,
        recognition: Option<bool>,
    }

    impl FlakyTxvr {
        fn new(answer_after: usize, filter_drops: usize) -> Self {
            FlakyTxvr {
                self_test: false,
                answer_after,
                transmits: 0,
                loopback_ready: false,
                filter_mem: [0xFF; 16],
                filter_drops,
                recognition: None,
            }
        }
    }

    impl Transceiver for FlakyTxvr {
        fn data_ready_rx1(&mut self) -> bool {
            self.loopback_ready
        }
        fn data_ready_rx2(&mut self) -> bool {
            self.loopback_ready
        }
        fn read_rx1(&mut self) -> u32 {
            self.loopback_ready = false;
            LOOPBACK_RX1_EXPECT
        }
        fn read_rx2(&mut self) -> u32 {
            LOOPBACK_RX2_EXPECT
        }
        fn transmit(&mut self, _word: u32) {
            if self.self_test {
                self.transmits += 1;
                if self.transmits >= self.answer_after {
                    self.loopback_ready = true;
                }
            }
        }
        fn load_ctrl_register(&mut self, _value: u16) -> bool {
            true
        }
        fn set_self_test(&mut self, enabled: bool) {
            self.self_test = enabled;
        }
        fn flush_fifos(&mut self) {
            self.loopback_ready = false;
        }
        fn write_label_filter(&mut self, labels: &[u8; 16]) {
            if self.filter_drops > 0 {
                self.filter_drops -= 1;
            } else {
                self.filter_mem = *labels;
            }
        }
        fn read_label_filter(&mut self) -> [u8; 16] {
            self.filter_mem
        }
        fn set_label_recognition(&mut self, enabled: bool) {
            self.recognition = Some(enabled);
        }
    }

    #[test]
    fn loopback_retries_until_the_fifo_answers() {
        let mut t = FlakyTxvr::new(5, 0);
        assert!(loopback_test(&mut t));
        assert!(!t.self_test);
    }

    #[test]
    fn loopback_gives_up_after_the_budget() {
        let mut t = FlakyTxvr::new(LOOPBACK_TRIES + 1, 0);
        assert!(!loopback_test(&mut t));
    }

    #[test]
    fn label_filter_retries_then_succeeds() {
        let labels = [0x0B; 16];
        let mut t = FlakyTxvr::new(1, 2);
        assert!(setup_label_filter(&mut t, &labels));
        assert_eq!(t.recognition, Some(true));
    }

    #[test]
    fn label_filter_failure_clears_recognition() {
        let labels = [0x0B; 16];
        let mut t = FlakyTxvr::new(1, LABEL_FILTER_TRIES);
        assert!(!setup_label_filter(&mut t, &labels));
        assert_eq!(t.recognition, Some(false));
    }

    #[test]
    fn any_failed_check_latches_the_fault() {
        let mut a = FlakyTxvr::new(1, 0);
        let mut b = FlakyTxvr::new(1, 0);
        let filter = [0u8; 16];
        let cfg = BridgeConfig::default();

        let report = run_self_tests(
            &mut a,
            &mut b,
            &filter,
            &filter,
            &cfg,
            &BootInputs::passing(0),
        );
        assert!(!report.fault_latched());

        let inputs = BootInputs {
            ram_ok: true,
            program_crc_ok: false,
            program_crc: 0,
        };
        let mut a = FlakyTxvr::new(1, 0);
        let mut b = FlakyTxvr::new(1, 0);
        let report = run_self_tests(&mut a, &mut b, &filter, &filter, &cfg, &inputs);
        assert!(report.fault_latched());
    }

    #[test]
    fn strap_bit_zero_selects_maintenance() {
        assert_eq!(Mode::from_straps(0x00), Mode::Normal);
        assert_eq!(Mode::from_straps(0x01), Mode::Maintenance);
        assert_eq!(Mode::from_straps(0x03), Mode::Maintenance);
    }
}
