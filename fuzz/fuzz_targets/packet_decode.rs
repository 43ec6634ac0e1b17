//! Fuzz target for Packet::decode
//!
//! Feeds arbitrary WebSocket text through the Engine.IO / Socket.IO decoder
//! and, for event packets, through the payload decoder.
//!
//! The decoder should NEVER panic. Invalid input returns an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use parley_proto::{Inbound, Outbound, Packet, SocketPacket};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(packet) = Packet::decode(text) else {
        return;
    };

    // Anything that decodes must encode again
    let encoded = packet.encode().expect("decoded packet encodes");
    assert!(Packet::decode(&encoded).is_ok(), "re-encoded packet rejected: {encoded}");

    if let Packet::Message(SocketPacket::Event { name, data }) = packet {
        let _ = Inbound::from_event(&name, data.clone());
        let _ = Outbound::from_event(&name, data);
    }
});
