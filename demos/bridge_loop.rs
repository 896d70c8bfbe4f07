//! Runs the whole bridge against simulated hardware: a scripted AHRS
//! feeding heading and acceleration words, a quiet display, and an
//! air-data computer that answers the startup version gather. Prints the
//! derived turn-rate words as the differentiator spools up and locks on.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use arinc_bridge::adc;
use arinc_bridge::boot::{LOOPBACK_RX1_EXPECT, LOOPBACK_RX2_EXPECT};
use arinc_bridge::codec::{self, BnrSsm, TxMsg};
use arinc_bridge::label::Label;
use arinc_bridge::ports::{AdcLink, Clock, FaultPin, Straps, Transceiver};
use arinc_bridge::tables::{AHRS_RX, TX_TURN_RATE};
use arinc_bridge::{BootInputs, Bridge, BridgeConfig};

#[derive(Clone)]
struct SimClock(Rc<Cell<u32>>);

impl Clock for SimClock {
    fn now_ms(&self) -> u32 {
        // Creep a millisecond per observation so bounded waits terminate.
        let now = self.0.get();
        self.0.set(now.wrapping_add(1));
        now
    }
}

#[derive(Default)]
struct TxvrState {
    rx1: VecDeque<u32>,
    sent: Vec<u32>,
    self_test: bool,
    loopback: VecDeque<u32>,
    filter: [u8; 16],
}

#[derive(Clone, Default)]
struct SimTxvr(Rc<RefCell<TxvrState>>);

impl Transceiver for SimTxvr {
    fn data_ready_rx1(&mut self) -> bool {
        let s = self.0.borrow();
        if s.self_test {
            !s.loopback.is_empty()
        } else {
            !s.rx1.is_empty()
        }
    }
    fn data_ready_rx2(&mut self) -> bool {
        let s = self.0.borrow();
        s.self_test && !s.loopback.is_empty()
    }
    fn read_rx1(&mut self) -> u32 {
        let mut s = self.0.borrow_mut();
        if s.self_test {
            LOOPBACK_RX1_EXPECT
        } else {
            s.rx1.pop_front().unwrap_or(0)
        }
    }
    fn read_rx2(&mut self) -> u32 {
        self.0.borrow_mut().loopback.pop_front();
        LOOPBACK_RX2_EXPECT
    }
    fn transmit(&mut self, word: u32) {
        let mut s = self.0.borrow_mut();
        if s.self_test {
            s.loopback.push_back(word);
        } else {
            s.sent.push(word);
        }
    }
    fn load_ctrl_register(&mut self, _value: u16) -> bool {
        true
    }
    fn set_self_test(&mut self, enabled: bool) {
        self.0.borrow_mut().self_test = enabled;
    }
    fn flush_fifos(&mut self) {
        let mut s = self.0.borrow_mut();
        s.loopback.clear();
        s.rx1.clear();
    }
    fn write_label_filter(&mut self, labels: &[u8; 16]) {
        self.0.borrow_mut().filter = *labels;
    }
    fn read_label_filter(&mut self) -> [u8; 16] {
        self.0.borrow().filter
    }
    fn set_label_recognition(&mut self, _enabled: bool) {}
}

#[derive(Default)]
struct LinkState {
    inbound: VecDeque<Vec<u8>>,
}

#[derive(Clone, Default)]
struct SimLink(Rc<RefCell<LinkState>>);

impl AdcLink for SimLink {
    fn poll_frame(&mut self, buf: &mut [u8]) -> Option<usize> {
        let frame = self.0.borrow_mut().inbound.pop_front()?;
        buf[..frame.len()].copy_from_slice(&frame);
        Some(frame.len())
    }
    fn send_frame(&mut self, payload: &[u8]) {
        // Answer version requests like a live air-data computer would.
        if payload.first() == Some(&adc::FRAME_VERSION_REQUEST) {
            let mut reply = vec![adc::FRAME_SW_VERSION_REPLY, payload[1]];
            reply.extend_from_slice(b"SIM v1.0 2026jan");
            reply.resize(adc::SW_VERSION_REPLY_LEN, 0);
            self.0.borrow_mut().inbound.push_back(reply);
        }
    }
}

struct SimPin;
impl FaultPin for SimPin {
    fn set_fault_output(&mut self, _high: bool) {}
}

struct SimStraps;
impl Straps for SimStraps {
    fn read_straps(&mut self) -> u8 {
        0
    }
}

fn ahrs_word(octal: u8, eng: f64) -> u32 {
    let cfg = AHRS_RX
        .iter()
        .find(|c| c.label == Label::from_octal(octal))
        .unwrap();
    let tx = TxMsg {
        config: cfg,
        sm: BnrSsm::NormalOperation.bits(),
        sdi: 0,
        eng_value: eng,
        discrete_bits: 0,
    };
    codec::encode_bnr(&tx).unwrap().0
}

fn main() {
    let clock = SimClock(Rc::new(Cell::new(0)));
    let ahrs = SimTxvr::default();
    let pfd = SimTxvr::default();
    let link = SimLink::default();

    let mut bridge = Bridge::new(
        clock.clone(),
        ahrs.clone(),
        pfd.clone(),
        link.clone(),
        SimPin,
        &mut SimStraps,
        BridgeConfig::default(),
        BootInputs::passing(0xDEAD_BEEF),
    )
    .expect("label tables are valid");

    println!("boot fault latched: {}", bridge.boot_report().fault_latched());

    // One second of ticks; the heading creeps +0.1 deg every 20 ms, a
    // standard-rate-ish 5 deg/s turn.
    let turn_rate_label = Label::from_octal(0o340);
    let mut heading = 90.0;
    for tick in 0u32..100 {
        // Pin each tick 10 ms after the last, whatever the boot sequence
        // left on the clock.
        clock.0.set(tick * 10 + 10_000);
        if tick % 2 == 0 {
            heading += 0.1;
            let mut s = ahrs.0.borrow_mut();
            s.rx1.push_back(ahrs_word(0o320, heading));
            s.rx1.push_back(ahrs_word(0o332, 0.01));
            s.rx1.push_back(ahrs_word(0o333, 0.0));
        }
        bridge.tick();

        for word in pfd.0.borrow_mut().sent.drain(..) {
            if Label::from_word(word) == turn_rate_label {
                let fields = codec::decode_bnr(&TX_TURN_RATE, word).unwrap();
                println!(
                    "tick {tick:3}: turn rate {:+7.3} deg/s  ssm {:?}",
                    fields.eng_float,
                    BnrSsm::from_bits(fields.sm)
                );
            }
        }
    }
}
