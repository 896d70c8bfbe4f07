// src/bin/word_dump.rs
//
// Decodes raw ARINC 429 words against the bridge's label tables.
// Reads a JSON array of hex words from stdin, writes decoded fields as
// JSON to stdout:
//
//   echo '["0x2000200B"]' | word_dump

use std::io::{self, Read};

use serde::Serialize;

use arinc_bridge::codec;
use arinc_bridge::config::LabelConfig;
use arinc_bridge::label::Label;
use arinc_bridge::tables::{ADC_RX, AHRS_RX, PFD_RX};

#[derive(Serialize)]
struct Decoded {
    word: String,
    label: String,
    bus: &'static str,
    msg_type: String,
    eng_float: f64,
    eng_int: i32,
    discrete_bits: String,
    sm: u8,
    sdi: u8,
}

fn find_config(label: Label) -> Option<(&'static str, &'static LabelConfig)> {
    let tables: [(&'static str, &'static [LabelConfig]); 3] = [
        ("ahrs", &AHRS_RX),
        ("pfd", &PFD_RX),
        ("adc", &ADC_RX),
    ];
    for (bus, table) in tables {
        if let Some(cfg) = table.iter().find(|c| c.label == label) {
            return Some((bus, cfg));
        }
    }
    None
}

fn main() -> io::Result<()> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let words: Vec<String> = serde_json::from_str(&input)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let mut decoded = Vec::new();
    for text in words {
        let raw = match u32::from_str_radix(text.trim_start_matches("0x"), 16) {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!("bad word {text:?}: {e}");
                continue;
            }
        };
        let label = Label::from_word(raw);
        let Some((bus, cfg)) = find_config(label) else {
            eprintln!("word {text}: label {label} not in any table");
            continue;
        };
        match codec::decode(cfg, raw) {
            Ok(fields) => decoded.push(Decoded {
                word: format!("{raw:08X}"),
                label: label.to_string(),
                bus,
                msg_type: format!("{:?}", cfg.msg_type),
                eng_float: fields.eng_float,
                eng_int: fields.eng_int,
                discrete_bits: format!("{:05X}", fields.discrete_bits),
                sm: fields.sm,
                sdi: fields.sdi,
            }),
            Err(e) => eprintln!("word {text}: {e}"),
        }
    }

    println!("{}", serde_json::to_string_pretty(&decoded).unwrap());
    Ok(())
}
