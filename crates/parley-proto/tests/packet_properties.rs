//! Property-based tests for packet encoding/decoding
//!
//! Decoding runs on text received from the network, so it must reject
//! garbage with an error rather than panic. Events the client emits must
//! survive the trip through the packet codec unchanged.

#![allow(clippy::expect_used)]

use parley_proto::{Outbound, OutgoingMessage, Packet, SocketPacket};
use proptest::prelude::*;

/// Strategy for generating arbitrary client events
fn arbitrary_outbound() -> impl Strategy<Value = Outbound> {
    prop_oneof![
        any::<String>().prop_map(Outbound::Login),
        any::<String>().prop_map(Outbound::Logoff),
        (any::<String>(), any::<String>(), any::<String>()).prop_map(|(from, to, message)| {
            Outbound::Message(OutgoingMessage { from, to, message })
        }),
    ]
}

#[test]
fn prop_decode_never_panics() {
    proptest!(|(text in any::<String>())| {
        let _ = Packet::decode(&text);
    });
}

#[test]
fn prop_decode_never_panics_on_event_prefix() {
    proptest!(|(body in any::<String>())| {
        let _ = Packet::decode(&format!("42{body}"));
    });
}

#[test]
fn prop_outbound_survives_packet_codec() {
    proptest!(|(outbound in arbitrary_outbound())| {
        let text = outbound.clone().into_packet().expect("encodable").encode().expect("encodable");
        let decoded = Packet::decode(&text).expect("decodable");

        let Packet::Message(SocketPacket::Event { name, data }) = decoded else {
            return Err(TestCaseError::fail(format!("not an event packet: {text}")));
        };

        // PROPERTY: Event name and payload are preserved
        prop_assert_eq!(name.as_str(), outbound.event_name());
        prop_assert_eq!(Outbound::from_event(&name, data).expect("valid payload"), Some(outbound));
    });
}
