//! Print the bit layout of every message in a DBC file
//!
//! Draws one 8x8 grid per message, marking each bit with the signal that owns
//! it, its MSB and LSB, the way a frame viewer highlights signals.
//!
//! Usage:
//!   cargo run --example bit_layout -- <file.dbc> [<message name>]

use can_signal_decoder::{Decoder, MessageDefinition};
use std::env;
use std::path::PathBuf;

/// Label for one DBC bit index: signal letter, upper-case on MSB, '.' when free
fn bit_label(message: &MessageDefinition, bit_index: u32) -> String {
    // Both DBC conventions name byte i, bit j (from the LSB) as 8 * i + j
    for (i, signal) in message.signals().iter().enumerate() {
        if let Some(desc) = signal.bit_description(bit_index) {
            let letter = (b'a' + (i % 26) as u8) as char;
            return if desc.is_msb {
                letter.to_ascii_uppercase().to_string()
            } else if desc.is_lsb {
                format!("{}", letter)
            } else {
                "-".to_string()
            };
        }
    }
    ".".to_string()
}

fn print_layout(message: &MessageDefinition) {
    println!("\n{} (0x{:X}, {} bytes)", message.name(), message.id(), message.size());
    println!("       7 6 5 4 3 2 1 0");
    for byte in 0..message.size() as u32 {
        let row: Vec<String> = (0..8)
            .rev()
            .map(|bit| bit_label(message, byte * 8 + bit))
            .collect();
        println!("  [{}]  {}", byte, row.join(" "));
    }
    for (i, signal) in message.signals().iter().enumerate() {
        println!("  {}: {}", (b'a' + (i % 26) as u8) as char, signal.text());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file.dbc> [<message name>]", args[0]);
        std::process::exit(1);
    }

    let mut decoder = Decoder::new();
    decoder.add_dbc(&PathBuf::from(&args[1]))?;

    let db = decoder.database();
    match args.get(2) {
        Some(name) => match db.get_message_by_name(name) {
            Some(message) => print_layout(message),
            None => eprintln!("No message named '{}'", name),
        },
        None => db.messages().for_each(print_layout),
    }

    Ok(())
}
