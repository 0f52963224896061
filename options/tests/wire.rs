use std::rc::Rc;

use dhcp_options::{
    codec::parse_options, cons_options, execute_statements, BindingScope, Context, DataString,
    EncodeParams, Expression, OptionCache, OptionOp, OptionState, Packet, Statement, Universes,
};
use dhcp_protocol::{MessageType, OperationCode, RawPacket, DHCP_FIXED_NON_UDP, MAGIC_COOKIE};

fn request(options: &[u8]) -> Packet {
    let mut raw = RawPacket::new(OperationCode::BootRequest);
    raw.options = options.to_vec();
    let mut bytes = vec![0u8; raw.len()];
    let length = raw.to_bytes(&mut bytes).unwrap();
    bytes.truncate(length);
    Packet::from_bytes(&Universes::new(), &bytes).unwrap()
}

#[test]
fn offer_options_survive_a_round_trip() {
    let _ = env_logger::try_init();
    let universes = Universes::new();
    let wire = [
        0x63, 0x82, 0x53, 0x63, 0x35, 0x01, 0x02, 0x33, 0x04, 0x00, 0x00, 0x0e, 0x10, 0xff,
    ];
    let mut incoming = Packet::from_raw({
        let mut raw = RawPacket::new(OperationCode::BootReply);
        raw.options = wire.to_vec();
        raw
    });
    parse_options(&universes, &mut incoming).unwrap();

    let ctx = Context::new(&universes).cfg_options(&incoming.options);
    let params = EncodeParams::default().parameter_request_list(&[53, 51]);
    let mut outgoing = RawPacket::new(OperationCode::BootReply);
    let length = cons_options(&ctx, &BindingScope::new(), &params, &mut outgoing);

    assert_eq!(outgoing.options, wire.to_vec());
    assert_eq!(length, DHCP_FIXED_NON_UDP + wire.len());
}

#[test]
fn configuration_answers_a_discover() {
    let _ = env_logger::try_init();
    let universes = Universes::new();
    let dhcp = universes.dhcp();
    let discover = request(&[0x63, 0x82, 0x53, 0x63, 53, 1, 1, 55, 2, 1, 12, 255]);
    assert!(discover.options_valid);
    assert_eq!(discover.message_type(&universes), MessageType::DhcpDiscover);

    let cfg = OptionState::new();
    cfg.save(dhcp, OptionCache::new(dhcp.option(53), DataString::from(&[2u8][..])));
    let supersede = |code: u32, value: &[u8]| Statement::Option {
        op: OptionOp::Supersede,
        cache: OptionCache::new(dhcp.option(code), DataString::from(value)),
    };
    let config = vec![
        supersede(3, &[10, 0, 0, 1]),
        Statement::If {
            condition: Rc::new(Expression::Equal(
                Rc::new(Expression::Option(dhcp.option(53))),
                Expression::make_const_data(&[1], false),
            )),
            then: vec![supersede(1, &[255, 255, 255, 0]), supersede(12, b"pxe-host")],
            else_: vec![],
        },
    ];

    let ctx = Context::new(&universes).packet(&discover).cfg_options(&cfg);
    let scope = BindingScope::new();
    let mut result = None;
    assert!(execute_statements(&mut result, &ctx, &scope, &config));
    assert!(result.is_none());

    let mut offer = RawPacket::new(OperationCode::BootReply);
    cons_options(&ctx, &scope, &EncodeParams::default(), &mut offer);

    let mut expected = MAGIC_COOKIE.to_vec();
    expected.extend_from_slice(&[53, 1, 2, 1, 4, 255, 255, 255, 0, 12, 8]);
    expected.extend_from_slice(b"pxe-host");
    expected.push(255);
    assert_eq!(offer.options, expected);
}

#[test]
fn overloaded_reply_decodes_to_the_configured_values() {
    let _ = env_logger::try_init();
    let universes = Universes::new();
    let dhcp = universes.dhcp();
    let cfg = OptionState::new();
    for code in 200..210u32 {
        let value = vec![code as u8; 40];
        cfg.save(dhcp, OptionCache::new(dhcp.option(code), DataString::from(value)));
    }
    let ctx = Context::new(&universes).cfg_options(&cfg);

    let mut reply = RawPacket::new(OperationCode::BootReply);
    cons_options(&ctx, &BindingScope::new(), &EncodeParams::default(), &mut reply);
    assert_eq!(&reply.options[4..7], &[52, 1, 1]);

    let mut bytes = vec![0u8; reply.len()];
    let length = reply.to_bytes(&mut bytes).unwrap();
    let received = Packet::from_bytes(&universes, &bytes[..length]).unwrap();

    let mut decoded = 0;
    for code in 200..210u32 {
        if let Some(cache) = received.options.lookup(dhcp, code) {
            assert_eq!(cache.data.as_bytes(), &[code as u8; 40][..]);
            decoded += 1;
        }
    }
    assert_eq!(decoded, 10);
    assert!(received.options.lookup(dhcp, 52).is_some());
}

#[test]
fn bootp_requests_carry_no_options() {
    let universes = Universes::new();
    let mut raw = RawPacket::new(OperationCode::BootRequest);
    raw.options = vec![0; 64];
    let mut bytes = vec![0u8; raw.len()];
    let length = raw.to_bytes(&mut bytes).unwrap();

    let packet = Packet::from_bytes(&universes, &bytes[..length]).unwrap();
    assert!(!packet.options_valid);
    assert_eq!(packet.message_type(&universes), MessageType::Undefined);
    assert!(packet.options.caches(universes.dhcp()).is_empty());
}

#[test]
fn malformed_options_fail_the_packet() {
    let universes = Universes::new();
    let mut raw = RawPacket::new(OperationCode::BootRequest);
    raw.options = vec![0x63, 0x82, 0x53, 0x63, 53, 1, 1, 12, 40, b'x', 255];
    let mut bytes = vec![0u8; raw.len()];
    let length = raw.to_bytes(&mut bytes).unwrap();

    assert!(Packet::from_bytes(&universes, &bytes[..length]).is_err());
}
