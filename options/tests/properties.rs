use std::collections::BTreeMap;

use proptest::prelude::*;

use dhcp_options::{
    cons_options, parse_option_buffer, store_options, BindingScope, Context, DataString,
    EncodeParams, OptionCache, OptionState, Packet, StoreLimits, Universes,
};
use dhcp_protocol::{OperationCode, RawPacket};

fn configure(universes: &Universes, values: &BTreeMap<u32, Vec<u8>>) -> OptionState {
    let dhcp = universes.dhcp();
    let cfg = OptionState::new();
    for (&code, value) in values {
        cfg.save(dhcp, OptionCache::new(dhcp.option(code), DataString::from(value.clone())));
    }
    cfg
}

/// Splits a stored buffer into `(code, length)` headers.
fn headers(buffer: &[u8]) -> Vec<(u8, u8)> {
    let mut headers = Vec::new();
    let mut offset = 0;
    while offset + 1 < buffer.len() {
        let (code, length) = (buffer[offset], buffer[offset + 1]);
        if code == 0 || code == 255 {
            offset += 1;
            continue;
        }
        headers.push((code, length));
        offset += 2 + usize::from(length);
    }
    headers
}

proptest! {
    #[test]
    fn stored_options_decode_to_the_same_values(
        values in prop::collection::btree_map(128u32..224, prop::collection::vec(any::<u8>(), 1..40), 1..7)
    ) {
        let universes = Universes::new();
        let dhcp = universes.dhcp();
        let cfg = configure(&universes, &values);
        let ctx = Context::new(&universes).cfg_options(&cfg);
        let priority: Vec<u32> = values.keys().cloned().collect();

        let stored = store_options(&ctx, &BindingScope::new(), &priority, &StoreLimits::new(307), false, None);
        let decoded = OptionState::new();
        parse_option_buffer(&universes, &decoded, &stored, dhcp).unwrap();

        for (&code, value) in &values {
            let cache = decoded.lookup(dhcp, code).unwrap();
            prop_assert_eq!(cache.data.as_bytes(), &value[..]);
        }
        prop_assert_eq!(decoded.caches(dhcp).len(), values.len());
    }

    #[test]
    fn long_values_split_into_full_chunks(length in 1usize..1200) {
        let universes = Universes::new();
        let dhcp = universes.dhcp();
        let value: Vec<u8> = (0..length).map(|i| i as u8).collect();
        let mut values = BTreeMap::new();
        values.insert(77, value.clone());
        let cfg = configure(&universes, &values);
        let ctx = Context::new(&universes).cfg_options(&cfg);

        let stored = store_options(&ctx, &BindingScope::new(), &[77], &StoreLimits::new(1400), false, None);
        let chunks = headers(&stored);
        prop_assert_eq!(chunks.len(), (length + 254) / 255);
        for &(code, size) in &chunks[..chunks.len() - 1] {
            prop_assert_eq!(code, 77);
            prop_assert_eq!(size, 255);
        }

        let decoded = OptionState::new();
        parse_option_buffer(&universes, &decoded, &stored, dhcp).unwrap();
        let found = decoded.lookup(dhcp, 77).unwrap();
        prop_assert_eq!(found.data.as_bytes(), &value[..]);
    }

    #[test]
    fn duplicate_priorities_store_once(
        codes in prop::collection::vec(128u32..136, 1..20)
    ) {
        let universes = Universes::new();
        let values: BTreeMap<u32, Vec<u8>> = (128u32..136).map(|code| (code, vec![code as u8; 3])).collect();
        let cfg = configure(&universes, &values);
        let ctx = Context::new(&universes).cfg_options(&cfg);

        let stored = store_options(&ctx, &BindingScope::new(), &codes, &StoreLimits::new(307), false, None);
        let seen: Vec<u8> = headers(&stored).into_iter().map(|(code, _)| code).collect();
        let mut expected: Vec<u8> = Vec::new();
        for &code in &codes {
            if !expected.contains(&(code as u8)) {
                expected.push(code as u8);
            }
        }
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn overloaded_replies_decode_without_surprises(
        values in prop::collection::btree_map(128u32..224, prop::collection::vec(any::<u8>(), 1..120), 1..12)
    ) {
        let universes = Universes::new();
        let dhcp = universes.dhcp();
        let cfg = configure(&universes, &values);
        let ctx = Context::new(&universes).cfg_options(&cfg);

        let mut reply = RawPacket::new(OperationCode::BootReply);
        cons_options(&ctx, &BindingScope::new(), &EncodeParams::default(), &mut reply);
        let mut bytes = vec![0u8; reply.len()];
        let length = reply.to_bytes(&mut bytes).unwrap();
        let received = Packet::from_bytes(&universes, &bytes[..length]).unwrap();

        for cache in received.options.caches(dhcp) {
            if cache.code() == 52 {
                continue;
            }
            let sent = values.get(&cache.code());
            prop_assert!(sent.is_some());
            prop_assert_eq!(cache.data.as_bytes(), &sent.unwrap()[..]);
        }
    }

    #[test]
    fn decoding_arbitrary_bytes_never_panics(data in prop::collection::vec(any::<u8>(), 0..700)) {
        let universes = Universes::new();
        let _ = Packet::from_bytes(&universes, &data);

        let mut raw = RawPacket::new(OperationCode::BootRequest);
        raw.options = vec![0x63, 0x82, 0x53, 0x63];
        raw.options.extend_from_slice(&data);
        let mut bytes = vec![0u8; raw.len()];
        let length = raw.to_bytes(&mut bytes).unwrap();
        let _ = Packet::from_bytes(&universes, &bytes[..length]);
    }
}
