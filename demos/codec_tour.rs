//! A quick tour of the word codec: encode a handful of representative
//! parameters, print the raw words, and decode them back.

use arinc_bridge::codec::{self, BcdSsm, BnrSsm, TxMsg};
use arinc_bridge::tables::{
    TX_BARO_CORRECTION, TX_MAG_HEADING, TX_NORMAL_ACCEL, TX_SLIP_ANGLE, TX_TURN_RATE,
};

fn main() {
    let bnr_examples = [
        ("Turn rate +3.0 deg/s", &TX_TURN_RATE, 3.0),
        ("Slip angle -4.5 deg", &TX_SLIP_ANGLE, -4.5),
        ("Magnetic heading 271.5 deg", &TX_MAG_HEADING, 271.5),
        ("Normal accel 1.02 g", &TX_NORMAL_ACCEL, 1.02),
    ];

    for (desc, cfg, eng) in bnr_examples {
        let tx = TxMsg {
            config: cfg,
            sm: BnrSsm::NormalOperation.bits(),
            sdi: 0,
            eng_value: eng,
            discrete_bits: 0,
        };
        match codec::encode_bnr(&tx) {
            Ok((word, status)) => {
                let back = codec::decode_bnr(cfg, word).unwrap();
                println!(
                    "{desc:28} [{}] -> {word:08X} ({status:?}) -> {:+.4}",
                    cfg.label, back.eng_float
                );
            }
            Err(e) => println!("{desc}: {e}"),
        }
    }

    let baro = TxMsg {
        config: &TX_BARO_CORRECTION,
        sm: BcdSsm::Plus.bits(),
        sdi: 0,
        eng_value: 29.921,
        discrete_bits: 0,
    };
    let (word, _) = codec::encode_bcd(&baro).unwrap();
    let back = codec::decode_bcd(&TX_BARO_CORRECTION, word).unwrap();
    println!(
        "Baro correction 29.921 inHg  [{}] -> {word:08X} -> {:.3}",
        TX_BARO_CORRECTION.label, back.eng_float
    );
}
