//! Options area decoding.

use bytes::Bytes;
use dhcp_protocol::{OptionTag, Overload};

use super::{DHO_END, DHO_PAD};
use crate::{
    context::Packet,
    data::DataString,
    error::{Error, Result},
    state::{OptionCache, OptionState},
    universe::{Encoding, OptionDef, Universe, UniverseId, Universes},
};

/// Decodes the options of a received packet.
///
/// A packet without the magic cookie is a BOOTP packet: it is accepted and
/// carries no options. After the options area, the overload option directs
/// decoding into `file` and then `sname`.
///
/// # Errors
/// If any of the areas is malformed. Nothing is kept from a malformed area.
pub fn parse_options(universes: &Universes, packet: &mut Packet) -> Result<()> {
    packet.options_valid = false;
    if !packet.raw.has_magic_cookie() {
        debug!("no magic cookie, BOOTP packet");
        return Ok(());
    }

    let dhcp = universes.dhcp();
    parse_option_buffer(universes, &packet.options, packet.raw.options_area(), dhcp)?;

    let overload = packet
        .options
        .lookup(dhcp, OptionTag::Overload.into())
        .and_then(|cache| cache.data.as_bytes().first().cloned())
        .map(Overload::from)
        .unwrap_or_default();
    if overload.file() {
        debug!("options overloaded into file");
        parse_option_buffer(universes, &packet.options, &packet.raw.boot_filename, dhcp)?;
    }
    if overload.sname() {
        debug!("options overloaded into sname");
        parse_option_buffer(universes, &packet.options, &packet.raw.server_name, dhcp)?;
    }

    packet.options_valid = true;
    Ok(())
}

/// Decodes one buffer of options of `universe` into `options`.
///
/// Repeated codes concatenate in hashed spaces and stay separate in linked
/// ones, also across calls. The buffer is decoded completely before anything
/// is stored.
///
/// # Errors
/// If an option runs past the end of the buffer.
pub fn parse_option_buffer(
    universes: &Universes,
    options: &OptionState,
    buffer: &[u8],
    universe: &Universe,
) -> Result<()> {
    let staged = staging_for(options);
    decode(universes, &staged, &Bytes::copy_from_slice(buffer), universe)?;
    options.merge(universes, staged);
    Ok(())
}

/// Decodes the payload of an encapsulating option into the space it names.
///
/// `uname` names the space when the format leaves it open. Returns whether
/// the payload decoded; on failure nothing is stored.
pub fn parse_encapsulated_suboptions(
    universes: &Universes,
    options: &OptionState,
    option: &OptionDef,
    payload: &[u8],
    uname: Option<&str>,
) -> bool {
    let shared = Bytes::copy_from_slice(payload);
    decode_suboptions(universes, options, option, &shared, uname)
}

fn decode_suboptions(
    universes: &Universes,
    options: &OptionState,
    option: &OptionDef,
    payload: &Bytes,
    uname: Option<&str>,
) -> bool {
    let space = match option.format.encapsulation() {
        Some("") => match uname {
            Some(name) => name,
            None => return false,
        },
        Some(space) => space,
        None => return false,
    };
    let universe = match universes.find(space) {
        Some(universe) => universe,
        None => {
            debug!("{}: no option space {}", option.name, space);
            return false;
        }
    };

    let staged = staging_for(options);
    match decode(universes, &staged, payload, universe) {
        Ok(()) => {
            options.merge(universes, staged);
            true
        }
        Err(error) => {
            debug!("{}: keeping raw value: {}", option.name, error);
            false
        }
    }
}

fn staging_for(options: &OptionState) -> OptionState {
    let mut staged = OptionState::new();
    staged.set_site(options.site_universe(), options.site_code_min());
    staged
}

fn decode(
    universes: &Universes,
    options: &OptionState,
    buffer: &Bytes,
    universe: &Universe,
) -> Result<()> {
    match universe.encoding() {
        Encoding::Fqdn => fqdn_universe_decode(options, buffer, universe),
        Encoding::Standard | Encoding::Nwip => decode_tlv(universes, options, buffer, universe),
    }
}

fn decode_tlv(
    universes: &Universes,
    options: &OptionState,
    buffer: &Bytes,
    universe: &Universe,
) -> Result<()> {
    let header = universe.tag_size() + universe.length_size();
    let mut offset = 0;

    while offset < buffer.len() {
        if universe.has_pad_end() {
            match buffer[offset] {
                DHO_PAD => {
                    offset += 1;
                    continue;
                }
                DHO_END => break,
                _ => {}
            }
        }
        if offset + header > buffer.len() {
            error!("{} option header at {} runs past the buffer", universe.name(), offset);
            return Err(Error::Truncated { offset });
        }

        let code = universe.get_tag(&buffer[offset..]);
        let length = universe.get_length(&buffer[offset + universe.tag_size()..]);
        let target = if universe.id() == UniverseId::DHCP {
            options.universe_for_code(universes, code)
        } else {
            universe
        };
        let option = target.option(code);

        let start = offset + header;
        if start + length > buffer.len() {
            error!("option {} ({}) larger than buffer.", option.name, length);
            return Err(Error::BogusLength {
                name: option.name.clone(),
                code,
                offset,
                length,
            });
        }

        let payload = buffer.slice(start..start + length);
        let nested = option.format.is_encapsulation_only()
            && decode_suboptions(universes, options, &option, &payload, None);
        if !nested {
            let data = if option.format.is_text() {
                DataString::terminated(&payload)
            } else {
                DataString::from_buffer(payload)
            };
            options.save_fragment(target, OptionCache::new(option, data));
        }
        offset = start + length;
    }
    Ok(())
}

// Client FQDN sub-option codes.
const FQDN_NO_CLIENT_UPDATE: u32 = 1;
const FQDN_SERVER_UPDATE: u32 = 2;
const FQDN_ENCODED: u32 = 3;
const FQDN_RCODE1: u32 = 4;
const FQDN_RCODE2: u32 = 5;
const FQDN_HOSTNAME: u32 = 6;
const FQDN_DOMAINNAME: u32 = 7;
const FQDN_FQDN: u32 = 8;

/// Splits an RFC 4702 payload into the `fqdn` sub-options.
fn fqdn_universe_decode(options: &OptionState, buffer: &Bytes, universe: &Universe) -> Result<()> {
    if buffer.len() < 3 {
        error!("fqdn option is only {} bytes", buffer.len());
        return Err(Error::BadEncapsulation {
            space: universe.name().to_owned(),
            name: "fqdn".to_owned(),
        });
    }

    let flags = buffer[0];
    let save = |code: u32, data: DataString| {
        options.save(universe, OptionCache::new(universe.option(code), data));
    };
    save(FQDN_NO_CLIENT_UPDATE, DataString::from(vec![(flags & 2 != 0) as u8]));
    save(FQDN_SERVER_UPDATE, DataString::from(vec![(flags & 1 != 0) as u8]));
    save(FQDN_ENCODED, DataString::from(vec![(flags & 4 != 0) as u8]));
    save(FQDN_RCODE1, DataString::from(buffer.slice(1..2).to_vec()));
    save(FQDN_RCODE2, DataString::from(buffer.slice(2..3).to_vec()));

    let name = &buffer[3..];
    let (labels, qualified) = if flags & 4 != 0 {
        decode_labels(name).ok_or_else(|| Error::BadEncapsulation {
            space: universe.name().to_owned(),
            name: "fqdn".to_owned(),
        })?
    } else {
        let end = name.iter().position(|&b| b == 0).unwrap_or_else(|| name.len());
        let text = &name[..end];
        let qualified = text.last() == Some(&b'.');
        let labels = text
            .split(|&b| b == b'.')
            .filter(|label| !label.is_empty())
            .map(<[u8]>::to_vec)
            .collect();
        (labels, qualified)
    };

    if let Some(host) = labels.first() {
        save(FQDN_HOSTNAME, DataString::terminated(host));
    }
    if labels.len() > 1 {
        save(FQDN_DOMAINNAME, DataString::terminated(&labels[1..].join(&b'.')));
    }
    if !labels.is_empty() {
        let mut fqdn = labels.join(&b'.');
        if qualified {
            fqdn.push(b'.');
        }
        save(FQDN_FQDN, DataString::terminated(&fqdn));
    }
    Ok(())
}

/// Reads DNS wire labels. Returns them and whether a root label ended them.
fn decode_labels(mut name: &[u8]) -> Option<(Vec<Vec<u8>>, bool)> {
    let mut labels = Vec::new();
    while let Some((&length, rest)) = name.split_first() {
        let length = length as usize;
        if length == 0 {
            return Some((labels, true));
        }
        if length > 63 || length > rest.len() {
            return None;
        }
        labels.push(rest[..length].to_vec());
        name = &rest[length..];
    }
    Some((labels, false))
}

#[cfg(test)]
mod tests {
    use dhcp_protocol::{OperationCode, RawPacket};

    use super::*;

    fn packet(options: &[u8]) -> Packet {
        let mut raw = RawPacket::new(OperationCode::BootRequest);
        raw.options = options.to_vec();
        Packet::from_raw(raw)
    }

    #[test]
    fn decodes_offer_options() {
        let universes = Universes::new();
        let mut packet = packet(&[
            0x63, 0x82, 0x53, 0x63, 0x35, 0x01, 0x02, 0x33, 0x04, 0x00, 0x00, 0x0e, 0x10, 0xff,
        ]);
        parse_options(&universes, &mut packet).unwrap();

        let dhcp = universes.dhcp();
        assert!(packet.options_valid);
        assert_eq!(packet.options.lookup(dhcp, 53).unwrap().data.as_bytes(), &[2]);
        assert_eq!(
            packet.options.lookup(dhcp, 51).unwrap().data.as_bytes(),
            &[0, 0, 0x0e, 0x10]
        );
        assert_eq!(packet.options.caches(dhcp).len(), 2);
    }

    #[test]
    fn pads_are_skipped_and_end_stops() {
        let universes = Universes::new();
        let options = OptionState::new();
        let buffer = [0, 0, 12, 2, b'a', b'b', 255, 12, 200];
        parse_option_buffer(&universes, &options, &buffer, universes.dhcp()).unwrap();
        assert_eq!(options.lookup(universes.dhcp(), 12).unwrap().data.as_bytes(), b"ab");
    }

    #[test]
    fn overlong_option_rejects_the_whole_buffer() {
        let universes = Universes::new();
        let options = OptionState::new();
        let buffer = [53, 1, 5, 12, 10, b'x'];
        let result = parse_option_buffer(&universes, &options, &buffer, universes.dhcp());
        assert!(matches!(result, Err(Error::BogusLength { code: 12, .. })));
        assert!(options.lookup(universes.dhcp(), 53).is_none());
    }

    #[test]
    fn missing_length_byte_is_bogus() {
        let universes = Universes::new();
        let options = OptionState::new();
        assert!(parse_option_buffer(&universes, &options, &[1], universes.dhcp()).is_err());
    }

    #[test]
    fn repeated_codes_concatenate() {
        let universes = Universes::new();
        let options = OptionState::new();
        let buffer = [60, 2, b'a', b'b', 1, 4, 255, 255, 255, 0, 60, 1, b'c'];
        parse_option_buffer(&universes, &options, &buffer, universes.dhcp()).unwrap();
        assert_eq!(options.lookup(universes.dhcp(), 60).unwrap().data.as_bytes(), b"abc");
    }

    #[test]
    fn agent_options_decode_into_their_space() {
        let universes = Universes::new();
        let options = OptionState::new();
        let buffer = [82, 8, 1, 2, 0xaa, 0xbb, 2, 2, 0xcc, 0xdd];
        parse_option_buffer(&universes, &options, &buffer, universes.dhcp()).unwrap();

        assert!(options.lookup(universes.dhcp(), 82).is_none());
        let agent = universes.get(UniverseId::AGENT);
        assert_eq!(options.lookup(agent, 1).unwrap().data.as_bytes(), &[0xaa, 0xbb]);
        assert_eq!(options.lookup(agent, 2).unwrap().data.as_bytes(), &[0xcc, 0xdd]);
    }

    #[test]
    fn broken_agent_options_are_kept_raw() {
        let universes = Universes::new();
        let options = OptionState::new();
        let buffer = [82, 3, 1, 5, 0xaa];
        parse_option_buffer(&universes, &options, &buffer, universes.dhcp()).unwrap();

        assert_eq!(options.lookup(universes.dhcp(), 82).unwrap().data.as_bytes(), &[1, 5, 0xaa]);
        assert!(!options.has_space(UniverseId::AGENT));
    }

    #[test]
    fn overload_follows_into_file_then_sname() {
        let universes = Universes::new();
        let mut packet = packet(&[0x63, 0x82, 0x53, 0x63, 52, 1, 3, 12, 2, b'a', b'b', 255]);
        packet.raw.boot_filename[..5].copy_from_slice(&[12, 1, b'c', 15, 0]);
        packet.raw.server_name[..4].copy_from_slice(&[12, 2, b'd', b'e']);
        parse_options(&universes, &mut packet).unwrap();

        let dhcp = universes.dhcp();
        assert_eq!(packet.options.lookup(dhcp, 12).unwrap().data.as_bytes(), b"abcde");
        assert_eq!(packet.options.lookup(dhcp, 15).unwrap().data.as_bytes(), b"");
    }

    #[test]
    fn bootp_packets_have_no_options() {
        let universes = Universes::new();
        let mut packet = packet(&[1, 2, 3, 4, 53, 1, 1]);
        parse_options(&universes, &mut packet).unwrap();
        assert!(!packet.options_valid);
        assert!(packet.options.caches(universes.dhcp()).is_empty());
    }

    #[test]
    fn fqdn_text_name() {
        let universes = Universes::new();
        let options = OptionState::new();
        let mut buffer = vec![81, 0, 0x01, 0, 0];
        buffer.extend_from_slice(b"host.example.org");
        buffer[1] = (buffer.len() - 2) as u8;
        parse_option_buffer(&universes, &options, &buffer, universes.dhcp()).unwrap();

        let fqdn = universes.get(UniverseId::FQDN);
        let text = |code| options.lookup(fqdn, code).unwrap().data.to_text();
        assert_eq!(text(FQDN_HOSTNAME), "host");
        assert_eq!(text(FQDN_DOMAINNAME), "example.org");
        assert_eq!(text(FQDN_FQDN), "host.example.org");
        assert_eq!(options.lookup(fqdn, FQDN_SERVER_UPDATE).unwrap().data.as_bytes(), &[1]);
        assert_eq!(options.lookup(fqdn, FQDN_ENCODED).unwrap().data.as_bytes(), &[0]);
    }

    #[test]
    fn fqdn_encoded_name() {
        let universes = Universes::new();
        let options = OptionState::new();
        let mut buffer = vec![81, 0, 0x04, 0, 0];
        buffer.extend_from_slice(b"\x04host\x07example\x03org\x00");
        buffer[1] = (buffer.len() - 2) as u8;
        parse_option_buffer(&universes, &options, &buffer, universes.dhcp()).unwrap();

        let fqdn = universes.get(UniverseId::FQDN);
        assert_eq!(options.lookup(fqdn, FQDN_FQDN).unwrap().data.to_text(), "host.example.org.");
        assert_eq!(options.lookup(fqdn, FQDN_ENCODED).unwrap().data.as_bytes(), &[1]);
    }

    #[test]
    fn vendor_options_need_a_space_name() {
        let mut universes = Universes::new();
        let vendor = universes
            .define_space("acme", crate::universe::UniverseKind::Hashed, 1, 1)
            .unwrap();
        let option = universes.dhcp().option(43);
        let options = OptionState::new();

        assert!(!parse_encapsulated_suboptions(&universes, &options, &option, &[1, 1, 9], None));
        assert!(parse_encapsulated_suboptions(
            &universes,
            &options,
            &option,
            &[1, 1, 9],
            Some("acme")
        ));
        assert_eq!(options.lookup(universes.get(vendor), 1).unwrap().data.as_bytes(), &[9]);
    }
}
