//! Options area encoding.

use std::collections::HashSet;

use bytes::BufMut;
use dhcp_protocol::{
    OptionTag, Overload, RawPacket, BOOTP_MIN_LEN, DHCP_FIXED_LEN, DHCP_FIXED_NON_UDP,
    DHCP_MAX_OPTION_LEN, DHCP_MIN_OPTION_LEN, MAGIC_COOKIE, SIZE_BOOT_FILENAME, SIZE_SERVER_NAME,
};

use super::{DHO_END, DHO_PAD};
use crate::{
    context::Context,
    data::DataString,
    scope::Scope,
    state::OptionState,
    tree::eval::evaluate_option_cache,
    universe::{Encoding, Universe, UniverseId},
};

/// Longest priority list `cons_options` builds.
pub const PRIORITY_COUNT: usize = 300;

/// Options always sent first when configured.
const MANDATORY: [u32; 6] = [53, 54, 51, 56, 50, 81];

/// Sent after the mandatory ones when the client asked for nothing.
const PREFERRED: [u32; 4] = [1, 3, 6, 12];

const AGENT_OPTIONS: u32 = 82;
const VENDOR_ENCAPSULATED_OPTIONS: u32 = 43;
const SUBNET_SELECTION: u32 = 118;

/// Reply encoding parameters.
#[derive(Debug, Clone)]
pub struct EncodeParams {
    /// The largest datagram the reply may take, before the client's own limit.
    pub max_message_size: Option<usize>,
    /// Header fields that may carry options.
    pub overload: Overload,
    /// NUL-terminate text options.
    pub terminate: bool,
    /// The reply is a BOOTP reply, sized after the request.
    pub bootp: bool,
    /// Codes requested, in order, overriding the request's own list.
    pub parameter_request_list: Option<Vec<u8>>,
    /// The space of `vendor-encapsulated-options`.
    pub vendor_space: Option<String>,
}

impl Default for EncodeParams {
    fn default() -> Self {
        EncodeParams {
            max_message_size: None,
            overload: Overload::Both,
            terminate: false,
            bootp: false,
            parameter_request_list: None,
            vendor_space: None,
        }
    }
}

impl EncodeParams {
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = Some(size);
        self
    }

    pub fn overload(mut self, overload: Overload) -> Self {
        self.overload = overload;
        self
    }

    pub fn terminate(mut self, terminate: bool) -> Self {
        self.terminate = terminate;
        self
    }

    pub fn bootp(mut self, bootp: bool) -> Self {
        self.bootp = bootp;
        self
    }

    pub fn parameter_request_list(mut self, codes: &[u8]) -> Self {
        self.parameter_request_list = Some(codes.to_vec());
        self
    }

    pub fn vendor_space(mut self, name: &str) -> Self {
        self.vendor_space = Some(name.to_owned());
        self
    }
}

/// Where `store_options` may write.
///
/// No option chunk straddles a cutoff; the bytes before a cutoff a chunk
/// cannot use are padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    pub buflen: usize,
    pub first_cutoff: Option<usize>,
    pub second_cutoff: Option<usize>,
}

impl StoreLimits {
    pub fn new(buflen: usize) -> Self {
        StoreLimits {
            buflen,
            first_cutoff: None,
            second_cutoff: None,
        }
    }

    pub fn with_cutoffs(buflen: usize, first: usize, second: Option<usize>) -> Self {
        StoreLimits {
            buflen,
            first_cutoff: Some(first),
            second_cutoff: second,
        }
    }

    /// The first cutoff after `offset`.
    fn next_cutoff(&self, offset: usize) -> Option<usize> {
        self.first_cutoff
            .into_iter()
            .chain(self.second_cutoff)
            .find(|&cutoff| offset < cutoff)
    }
}

/// Builds the options of a reply into `outpacket`.
///
/// The options area gets the cookie, the options of the priority list, the
/// relay agent information and END. Options that do not fit spill into
/// `file` and `sname` as far as `params.overload` allows. Returns the length
/// of the message without IP and UDP headers.
pub fn cons_options(
    ctx: &Context,
    scope: &Scope,
    params: &EncodeParams,
    outpacket: &mut RawPacket,
) -> usize {
    let main_buffer_size = main_buffer_size(ctx, scope, params);
    let priority = priority_list(ctx, scope, params);
    let vendor_space = params.vendor_space.as_deref();

    let agent = store_options(
        ctx,
        scope,
        &[AGENT_OPTIONS],
        &StoreLimits::new(DHCP_MAX_OPTION_LEN - MAGIC_COOKIE.len() - 1),
        false,
        None,
    );

    let capacity = main_buffer_size.saturating_sub(MAGIC_COOKIE.len() + 1 + agent.len());
    let (plain, complete) = store_options_report(
        ctx,
        scope,
        &priority,
        &StoreLimits::new(capacity),
        params.terminate,
        vendor_space,
    );

    let mut main = plain;
    let mut file = Vec::new();
    let mut sname = Vec::new();
    if !complete && params.overload != Overload::Undefined && capacity > 3 {
        let region = capacity - 3;
        let file_room = if params.overload.file() { SIZE_BOOT_FILENAME - 1 } else { 0 };
        let sname_room = if params.overload.sname() { SIZE_SERVER_NAME - 1 } else { 0 };
        let second = if file_room > 0 && sname_room > 0 {
            Some(region + file_room)
        } else {
            None
        };
        let limits = StoreLimits::with_cutoffs(region + file_room + sname_room, region, second);
        let (stream, _) =
            store_options_report(ctx, scope, &priority, &limits, params.terminate, vendor_space);

        if stream.len() > region {
            let (head, rest) = stream.split_at(region);
            let (file_part, sname_part) = rest.split_at(rest.len().min(file_room));
            main = head.to_vec();
            file = file_part.to_vec();
            sname = sname_part.to_vec();
        }
    }

    let mut options = Vec::with_capacity(main_buffer_size);
    options.put_slice(&MAGIC_COOKIE);
    let overload = Overload::from_fields(!file.is_empty(), !sname.is_empty());
    if overload != Overload::Undefined {
        debug!("overloading options into {}", overload);
        options.put_u8(OptionTag::Overload.into());
        options.put_u8(1);
        options.put_u8(overload as u8);
    }
    options.put_slice(&main);
    options.put_slice(&agent);
    options.put_u8(DHO_END);
    if params.bootp && options.len() < BOOTP_MIN_LEN - DHCP_FIXED_NON_UDP {
        options.resize(BOOTP_MIN_LEN - DHCP_FIXED_NON_UDP, DHO_PAD);
    }

    if overload.file() {
        outpacket.boot_filename = close_region(&file, SIZE_BOOT_FILENAME);
    }
    if overload.sname() {
        outpacket.server_name = close_region(&sname, SIZE_SERVER_NAME);
    }
    outpacket.options = options;
    outpacket.len()
}

fn close_region(part: &[u8], size: usize) -> Vec<u8> {
    let mut region = Vec::with_capacity(size);
    region.put_slice(part);
    region.put_u8(DHO_END);
    region.resize(size, DHO_PAD);
    region
}

/// The options area size, cookie included.
fn main_buffer_size(ctx: &Context, scope: &Scope, params: &EncodeParams) -> usize {
    let mut mms = params.max_message_size;
    let requested = ctx
        .packet
        .and_then(|packet| packet.options.lookup(ctx.universes.dhcp(), 57))
        .and_then(|cache| evaluate_option_cache(ctx, scope, &cache).ok());
    if let Some(value) = requested {
        if let [high, low, ..] = *value.as_bytes() {
            let size = usize::from(u16::from_be_bytes([high, low]));
            if mms.map_or(true, |mms| size < mms) {
                mms = Some(size);
            }
        }
    }

    let size = match mms {
        Some(mms) => mms.saturating_sub(DHCP_FIXED_LEN).max(DHCP_MIN_OPTION_LEN),
        None if params.bootp => ctx
            .packet
            .map_or(0, |packet| packet.bytes.len().saturating_sub(DHCP_FIXED_NON_UDP))
            .max(BOOTP_MIN_LEN - DHCP_FIXED_NON_UDP),
        None => DHCP_MIN_OPTION_LEN,
    };
    size.min(DHCP_MAX_OPTION_LEN)
}

/// The order options are offered in.
fn priority_list(ctx: &Context, scope: &Scope, params: &EncodeParams) -> Vec<u32> {
    let dhcp = ctx.universes.dhcp();
    let mut list: Vec<u32> = MANDATORY.to_vec();

    let prl = params.parameter_request_list.clone().or_else(|| {
        ctx.packet
            .and_then(|packet| packet.options.lookup(dhcp, OptionTag::ParameterList.into()))
            .and_then(|cache| evaluate_option_cache(ctx, scope, &cache).ok())
            .map(|value| value.as_bytes().to_vec())
    });

    match prl {
        Some(ref prl) if !prl.is_empty() => {
            if ctx
                .cfg_options
                .and_then(|cfg| cfg.lookup(dhcp, SUBNET_SELECTION))
                .is_some()
            {
                list.push(SUBNET_SELECTION);
            }
            let room = PRIORITY_COUNT.saturating_sub(list.len());
            list.extend(
                prl.iter()
                    .take(room)
                    .map(|&code| u32::from(code))
                    .filter(|&code| code != AGENT_OPTIONS),
            );
        }
        _ => {
            list.extend_from_slice(&PREFERRED);
            if let Some(cfg) = ctx.cfg_options {
                configured_codes(ctx, cfg, &mut list);
            }
            list.push(VENDOR_ENCAPSULATED_OPTIONS);
        }
    }
    list.truncate(PRIORITY_COUNT);
    list
}

/// Everything configured: plain `dhcp` codes, site codes, then the options
/// carrying configured sub-option spaces.
fn configured_codes(ctx: &Context, cfg: &OptionState, list: &mut Vec<u32>) {
    let site_code_min = cfg.site_code_min();
    if site_code_min > 0 {
        list.extend(
            cfg.caches(ctx.universes.dhcp())
                .iter()
                .map(|cache| cache.code())
                .filter(|&code| code < site_code_min && code != AGENT_OPTIONS),
        );
    }
    list.extend(
        cfg.caches(ctx.universes.get(cfg.site_universe()))
            .iter()
            .map(|cache| cache.code())
            .filter(|&code| code >= site_code_min && code != AGENT_OPTIONS),
    );
    for universe in ctx.universes.iter() {
        if !cfg.has_space(universe.id()) {
            continue;
        }
        if let Some((UniverseId::DHCP, code)) = universe.anchor() {
            if code != AGENT_OPTIONS {
                list.push(code);
            }
        }
    }
}

/// Serializes the options of `priority` found in `ctx.cfg_options`.
///
/// Duplicate codes are stored once, at their first position. An option
/// without a value, or whose expression fails, is skipped; one that does not
/// fit is skipped whole. Values over 255 bytes are split into consecutive
/// options of the same code.
pub fn store_options(
    ctx: &Context,
    scope: &Scope,
    priority: &[u32],
    limits: &StoreLimits,
    terminate: bool,
    vendor_space: Option<&str>,
) -> Vec<u8> {
    store_options_report(ctx, scope, priority, limits, terminate, vendor_space).0
}

/// Like `store_options`, also telling whether every option fit.
fn store_options_report(
    ctx: &Context,
    scope: &Scope,
    priority: &[u32],
    limits: &StoreLimits,
    terminate: bool,
    vendor_space: Option<&str>,
) -> (Vec<u8>, bool) {
    let mut buffer = Vec::with_capacity(limits.buflen);
    let mut complete = true;
    let mut seen = HashSet::new();

    for &code in priority {
        if !seen.insert(code) {
            continue;
        }
        let universe = match ctx.cfg_options {
            Some(cfg) => cfg.universe_for_code(ctx.universes, code),
            None => ctx.universes.dhcp(),
        };
        let cache = ctx.cfg_options.and_then(|cfg| cfg.lookup(universe, code));
        let encapsulation = encapsulation_for(ctx, scope, universe, code, cache.is_some(), vendor_space);
        if cache.is_none() && encapsulation.is_none() {
            continue;
        }

        let mut value = DataString::new();
        if let Some(cache) = cache {
            match evaluate_option_cache(ctx, scope, &cache) {
                Ok(data) if !data.is_empty() => value = data,
                Ok(_) => continue,
                Err(error) => {
                    debug!("{}: not sent: {}", cache.option.name, error);
                    continue;
                }
            }
        }
        if let Some(encapsulation) = encapsulation {
            value = value.concat(&encapsulation);
        }

        let mut payload = value.as_bytes().to_vec();
        if terminate && universe.option(code).format.is_text() {
            payload.push(0);
        }
        if !store_chunks(&mut buffer, code as u8, &payload, limits) {
            warn!("{}: no room for {} bytes", universe.option(code).name, payload.len());
            complete = false;
        }
    }
    (buffer, complete)
}

/// The serialized sub-option space an option carries, if it carries one.
///
/// A configured value of an `E` option wins over the space; an `e` option
/// sends both.
fn encapsulation_for(
    ctx: &Context,
    scope: &Scope,
    universe: &Universe,
    code: u32,
    configured: bool,
    vendor_space: Option<&str>,
) -> Option<DataString> {
    let option = universe.known_option(code)?;
    let space = option.format.encapsulation()?;
    if configured && !option.format.is_implicit_encapsulation() {
        return None;
    }
    let name = if space.is_empty() { vendor_space? } else { space };
    option_space_encapsulate(ctx, scope, name)
}

/// Writes `payload` as options of `code`, rolling back if it does not fit.
fn store_chunks(buffer: &mut Vec<u8>, code: u8, payload: &[u8], limits: &StoreLimits) -> bool {
    let start = buffer.len();
    let mut rest = payload;
    while !rest.is_empty() {
        let offset = buffer.len();
        let mut length = rest.len().min(255);
        if let Some(cutoff) = limits.next_cutoff(offset) {
            let room = cutoff - offset;
            if room < 3 {
                buffer.resize(cutoff, DHO_PAD);
                continue;
            }
            length = length.min(room - 2);
        }
        if offset + 2 + length > limits.buflen {
            buffer.truncate(start);
            return false;
        }
        buffer.put_u8(code);
        buffer.put_u8(length as u8);
        buffer.put_slice(&rest[..length]);
        rest = &rest[length..];
    }
    true
}

/// Serializes the options configured in the space called `name`.
///
/// Returns `None` when the space is unknown or has nothing to send, except
/// for `nwip`, which then still announces that NetWare/IP is not in use.
pub fn option_space_encapsulate(ctx: &Context, scope: &Scope, name: &str) -> Option<DataString> {
    let universe = match ctx.universes.find(name) {
        Some(universe) => universe,
        None => {
            debug!("encapsulate: no option space {}", name);
            return None;
        }
    };
    match universe.encoding() {
        Encoding::Standard => standard_encapsulate(ctx, scope, universe),
        Encoding::Nwip => standard_encapsulate(ctx, scope, universe)
            .or_else(|| Some(DataString::from(vec![NWIP_NOT_IN_USE, 0]))),
        Encoding::Fqdn => fqdn_encapsulate(ctx, scope, universe),
    }
}

/// `nwip` sub-option saying NetWare/IP is not configured.
const NWIP_NOT_IN_USE: u8 = 1;

fn standard_encapsulate(ctx: &Context, scope: &Scope, universe: &Universe) -> Option<DataString> {
    let cfg = ctx.cfg_options?;
    let mut buffer = Vec::new();
    let mut stored = false;
    for cache in cfg.caches(universe) {
        let value = match evaluate_option_cache(ctx, scope, &cache) {
            Ok(value) => value,
            Err(error) => {
                debug!("{}.{}: not sent: {}", universe.name(), cache.option.name, error);
                continue;
            }
        };
        store_suboption(universe, &mut buffer, cache.code(), value.as_bytes());
        stored = true;
    }
    if stored {
        Some(DataString::from(buffer))
    } else {
        None
    }
}

fn store_suboption(universe: &Universe, buffer: &mut Vec<u8>, code: u32, value: &[u8]) {
    if value.is_empty() {
        universe.store_tag(buffer, code);
        universe.store_length(buffer, 0);
        return;
    }
    for chunk in value.chunks(universe.max_length()) {
        universe.store_tag(buffer, code);
        universe.store_length(buffer, chunk.len());
        buffer.put_slice(chunk);
    }
}

/// Rebuilds an RFC 4702 payload from the `fqdn` sub-options.
fn fqdn_encapsulate(ctx: &Context, scope: &Scope, universe: &Universe) -> Option<DataString> {
    let cfg = ctx.cfg_options?;
    if !cfg.has_space(universe.id()) {
        return None;
    }
    let value = |code: u32| {
        cfg.lookup(universe, code)
            .and_then(|cache| evaluate_option_cache(ctx, scope, &cache).ok())
            .filter(|value| !value.is_empty())
    };
    let flag = |code: u32| value(code).map_or(false, |value| value.as_bytes()[0] != 0);
    let byte = |code: u32| value(code).map_or(0, |value| value.as_bytes()[0]);

    let mut flags = 0u8;
    if flag(2) {
        flags |= 1;
    }
    if flag(1) {
        flags |= 2;
    }
    let encoded = flag(3);
    if encoded {
        flags |= 4;
    }

    let name = match value(8) {
        Some(fqdn) => fqdn.to_text(),
        None => match (value(6), value(7)) {
            (Some(host), Some(domain)) => format!("{}.{}", host.to_text(), domain.to_text()),
            (Some(host), None) => host.to_text(),
            _ => String::new(),
        },
    };

    let mut buffer = vec![flags, byte(4), byte(5)];
    if encoded {
        for label in name.split('.').filter(|label| !label.is_empty()) {
            buffer.put_u8(label.len() as u8);
            buffer.put_slice(label.as_bytes());
        }
        if name.ends_with('.') {
            buffer.put_u8(0);
        }
    } else {
        buffer.put_slice(name.as_bytes());
    }
    Some(DataString::from(buffer))
}

#[cfg(test)]
mod tests {
    use dhcp_protocol::OperationCode;

    use super::*;
    use crate::{
        codec::parse_options,
        context::Packet,
        scope::BindingScope,
        state::OptionCache,
        tree::Expression,
        universe::Universes,
    };

    fn configure(universes: &Universes, cfg: &OptionState, universe: UniverseId, code: u32, value: &[u8]) {
        let universe = universes.get(universe);
        cfg.save(universe, OptionCache::new(universe.option(code), DataString::from(value)));
    }

    #[test]
    fn priority_order_and_dedupe() {
        let universes = Universes::new();
        let cfg = OptionState::new();
        configure(&universes, &cfg, UniverseId::DHCP, 51, &[0, 0, 0x0e, 0x10]);
        configure(&universes, &cfg, UniverseId::DHCP, 53, &[2]);
        let ctx = Context::new(&universes).cfg_options(&cfg);

        let stored = store_options(
            &ctx,
            &BindingScope::new(),
            &[53, 51, 53, 7],
            &StoreLimits::new(64),
            false,
            None,
        );
        assert_eq!(stored, vec![0x35, 0x01, 0x02, 0x33, 0x04, 0x00, 0x00, 0x0e, 0x10]);
    }

    #[test]
    fn long_values_are_chunked() {
        let universes = Universes::new();
        let cfg = OptionState::new();
        configure(&universes, &cfg, UniverseId::DHCP, 77, &[7u8; 300]);
        let ctx = Context::new(&universes).cfg_options(&cfg);

        let stored = store_options(&ctx, &BindingScope::new(), &[77], &StoreLimits::new(400), false, None);
        assert_eq!(stored.len(), 304);
        assert_eq!(&stored[..2], &[77, 255]);
        assert_eq!(&stored[257..259], &[77, 45]);
    }

    #[test]
    fn options_that_do_not_fit_are_skipped_whole() {
        let universes = Universes::new();
        let cfg = OptionState::new();
        configure(&universes, &cfg, UniverseId::DHCP, 12, b"a-rather-long-host-name");
        configure(&universes, &cfg, UniverseId::DHCP, 53, &[5]);
        let ctx = Context::new(&universes).cfg_options(&cfg);

        let stored = store_options(&ctx, &BindingScope::new(), &[12, 53], &StoreLimits::new(10), false, None);
        assert_eq!(stored, vec![53, 1, 5]);
    }

    #[test]
    fn chunks_never_straddle_cutoffs() {
        let universes = Universes::new();
        let cfg = OptionState::new();
        configure(&universes, &cfg, UniverseId::DHCP, 77, &[1u8; 40]);
        configure(&universes, &cfg, UniverseId::DHCP, 78, &[2u8; 9]);
        let ctx = Context::new(&universes).cfg_options(&cfg);

        let limits = StoreLimits::with_cutoffs(100, 30, Some(50));
        let stored = store_options(&ctx, &BindingScope::new(), &[77, 78], &limits, false, None);

        assert_eq!(&stored[..2], &[77, 28]);
        assert_eq!(&stored[30..32], &[77, 12]);
        assert_eq!(&stored[44..46], &[78, 4]);
        assert_eq!(&stored[50..52], &[78, 5]);
    }

    #[test]
    fn terminate_adds_a_nul_to_text() {
        let universes = Universes::new();
        let cfg = OptionState::new();
        configure(&universes, &cfg, UniverseId::DHCP, 12, b"host");
        let ctx = Context::new(&universes).cfg_options(&cfg);

        let stored = store_options(&ctx, &BindingScope::new(), &[12], &StoreLimits::new(64), true, None);
        assert_eq!(stored, b"\x0c\x05host\x00".to_vec());
    }

    #[test]
    fn agent_options_go_last() {
        let universes = Universes::new();
        let cfg = OptionState::new();
        configure(&universes, &cfg, UniverseId::AGENT, 1, &[0xaa]);
        configure(&universes, &cfg, UniverseId::DHCP, 53, &[5]);
        configure(&universes, &cfg, UniverseId::DHCP, 3, &[10, 0, 0, 1]);
        let ctx = Context::new(&universes).cfg_options(&cfg);

        let mut packet = RawPacket::new(OperationCode::BootReply);
        let length = cons_options(&ctx, &BindingScope::new(), &EncodeParams::default(), &mut packet);
        assert_eq!(
            packet.options,
            vec![0x63, 0x82, 0x53, 0x63, 53, 1, 5, 3, 4, 10, 0, 0, 1, 82, 3, 1, 1, 0xaa, 255]
        );
        assert_eq!(length, DHCP_FIXED_NON_UDP + 19);
    }

    #[test]
    fn agent_options_are_not_reordered_by_the_request_list() {
        let universes = Universes::new();
        let cfg = OptionState::new();
        configure(&universes, &cfg, UniverseId::AGENT, 2, &[0xbb]);
        configure(&universes, &cfg, UniverseId::DHCP, 6, &[10, 0, 0, 2]);
        let ctx = Context::new(&universes).cfg_options(&cfg);

        let params = EncodeParams::default().parameter_request_list(&[82, 6]);
        let mut packet = RawPacket::new(OperationCode::BootReply);
        cons_options(&ctx, &BindingScope::new(), &params, &mut packet);
        assert_eq!(&packet.options[4..], &[6, 4, 10, 0, 0, 2, 82, 3, 2, 1, 0xbb, 255]);
    }

    #[test]
    fn overflow_spills_into_file_and_sname() {
        let universes = Universes::new();
        let cfg = OptionState::new();
        for code in 128..135 {
            configure(&universes, &cfg, UniverseId::DHCP, code, &[code as u8; 60]);
        }
        let ctx = Context::new(&universes).cfg_options(&cfg);

        let mut raw = RawPacket::new(OperationCode::BootReply);
        let length = cons_options(&ctx, &BindingScope::new(), &EncodeParams::default(), &mut raw);
        assert_eq!(length, DHCP_FIXED_NON_UDP + raw.options.len());
        assert!(raw.options.len() <= DHCP_MIN_OPTION_LEN);
        assert_eq!(&raw.options[4..7], &[52, 1, 3]);

        let mut packet = Packet::from_raw(raw);
        parse_options(&universes, &mut packet).unwrap();
        for code in 128..135 {
            let value = packet.options.lookup(universes.dhcp(), code).unwrap();
            assert_eq!(value.data.as_bytes(), &[code as u8; 60][..]);
        }
    }

    #[test]
    fn without_overload_the_surplus_is_dropped() {
        let universes = Universes::new();
        let cfg = OptionState::new();
        for code in 128..136 {
            configure(&universes, &cfg, UniverseId::DHCP, code, &[1; 60]);
        }
        let ctx = Context::new(&universes).cfg_options(&cfg);

        let params = EncodeParams::default().overload(Overload::Undefined);
        let mut raw = RawPacket::new(OperationCode::BootReply);
        cons_options(&ctx, &BindingScope::new(), &params, &mut raw);
        assert!(raw.options.len() <= DHCP_MIN_OPTION_LEN);
        assert_ne!(raw.options[4], 52);
        assert!(raw.boot_filename.iter().all(|&b| b == 0));
    }

    #[test]
    fn client_max_message_size_wins_when_smaller() {
        let universes = Universes::new();
        let mut request = RawPacket::new(OperationCode::BootRequest);
        request.options = vec![0x63, 0x82, 0x53, 0x63, 57, 2, 0x02, 0x40, 255];
        let mut packet = Packet::from_raw(request);
        parse_options(&universes, &mut packet).unwrap();

        let cfg = OptionState::new();
        for code in 128..140 {
            configure(&universes, &cfg, UniverseId::DHCP, code, &[1; 60]);
        }
        let ctx = Context::new(&universes).packet(&packet).cfg_options(&cfg);
        let params = EncodeParams::default()
            .max_message_size(1500)
            .overload(Overload::Undefined)
            .parameter_request_list(&(128..140).collect::<Vec<u8>>());
        let mut raw = RawPacket::new(OperationCode::BootReply);
        cons_options(&ctx, &BindingScope::new(), &params, &mut raw);
        assert!(raw.options.len() <= DHCP_MIN_OPTION_LEN);
    }

    #[test]
    fn bootp_replies_are_padded() {
        let universes = Universes::new();
        let cfg = OptionState::new();
        configure(&universes, &cfg, UniverseId::DHCP, 1, &[255, 255, 255, 0]);
        let ctx = Context::new(&universes).cfg_options(&cfg);

        let params = EncodeParams::default().bootp(true);
        let mut raw = RawPacket::new(OperationCode::BootReply);
        let length = cons_options(&ctx, &BindingScope::new(), &params, &mut raw);
        assert_eq!(length, BOOTP_MIN_LEN);
        assert_eq!(&raw.options[4..11], &[1, 4, 255, 255, 255, 0, 255]);
    }

    #[test]
    fn expressions_are_evaluated_when_stored() {
        let universes = Universes::new();
        let cfg = OptionState::new();
        let dhcp = universes.dhcp();
        cfg.save(
            dhcp,
            OptionCache::with_expression(dhcp.option(15), Expression::make_const_data(b"example.org", false)),
        );
        let ctx = Context::new(&universes).cfg_options(&cfg);

        let stored = store_options(&ctx, &BindingScope::new(), &[15], &StoreLimits::new(64), false, None);
        assert_eq!(stored, b"\x0f\x0bexample.org".to_vec());
    }

    #[test]
    fn empty_nwip_space_still_says_so() {
        let universes = Universes::new();
        let cfg = OptionState::new();
        let ctx = Context::new(&universes).cfg_options(&cfg);
        let encapsulated = option_space_encapsulate(&ctx, &BindingScope::new(), "nwip").unwrap();
        assert_eq!(encapsulated.as_bytes(), &[1, 0]);
        assert!(option_space_encapsulate(&ctx, &BindingScope::new(), "agent").is_none());
    }

    #[test]
    fn fqdn_is_rebuilt_from_suboptions() {
        let universes = Universes::new();
        let cfg = OptionState::new();
        configure(&universes, &cfg, UniverseId::FQDN, 2, &[1]);
        configure(&universes, &cfg, UniverseId::FQDN, 3, &[1]);
        configure(&universes, &cfg, UniverseId::FQDN, 8, b"host.example.org.");
        let ctx = Context::new(&universes).cfg_options(&cfg);

        let encapsulated = option_space_encapsulate(&ctx, &BindingScope::new(), "fqdn").unwrap();
        assert_eq!(
            encapsulated.as_bytes(),
            &b"\x05\x00\x00\x04host\x07example\x03org\x00"[..]
        );
    }

    #[test]
    fn vendor_space_fills_option_43() {
        let mut universes = Universes::new();
        let acme = universes
            .define_space("acme", crate::universe::UniverseKind::Hashed, 1, 1)
            .unwrap();
        let cfg = OptionState::new();
        configure(&universes, &cfg, acme, 4, b"xyz");
        let ctx = Context::new(&universes).cfg_options(&cfg);

        let without = store_options(&ctx, &BindingScope::new(), &[43], &StoreLimits::new(64), false, None);
        assert!(without.is_empty());
        let with = store_options(&ctx, &BindingScope::new(), &[43], &StoreLimits::new(64), false, Some("acme"));
        assert_eq!(with, vec![43, 5, 4, 3, b'x', b'y', b'z']);
    }
}
