//! What expressions and statements are evaluated against.

use std::{cell::RefCell, net::Ipv4Addr, rc::Rc};

use bitflags::bitflags;
use chrono::prelude::*;
use dhcp_protocol::{HardwareType, MessageType, OptionTag, RawPacket};
use eui48::MacAddress;

use crate::{
    codec,
    error::Result,
    execute::Statement,
    state::OptionState,
    tree::dns::{DnsUpdater, HostCache},
    universe::Universes,
};

/// A received message with its decoded options.
#[derive(Debug)]
pub struct Packet {
    pub raw: RawPacket,
    /// The message as received, for `packet` expressions.
    pub bytes: Vec<u8>,
    pub options: OptionState,
    /// False for BOOTP messages without a magic cookie.
    pub options_valid: bool,
    /// Whether the client matched a host declaration.
    pub known: bool,
    classes: RefCell<Vec<String>>,
}

impl Packet {
    /// Parses the fixed header and decodes the options.
    ///
    /// # Errors
    /// If the header is truncated or an options area is malformed.
    pub fn from_bytes(universes: &Universes, src: &[u8]) -> Result<Self> {
        let raw = RawPacket::from_bytes(src)?;
        let mut packet = Packet::from_raw(raw);
        packet.bytes = src.to_vec();
        codec::parse_options(universes, &mut packet)?;
        Ok(packet)
    }

    /// Wraps a header without decoding anything.
    pub fn from_raw(raw: RawPacket) -> Self {
        let mut bytes = vec![0u8; raw.len()];
        let bytes = match raw.to_bytes(&mut bytes) {
            Ok(length) => {
                bytes.truncate(length);
                bytes
            }
            Err(_) => Vec::new(),
        };
        Packet {
            raw,
            bytes,
            options: OptionState::new(),
            options_valid: false,
            known: false,
            classes: RefCell::new(Vec::new()),
        }
    }

    /// The DHCP message type, `Undefined` for BOOTP messages.
    pub fn message_type(&self, universes: &Universes) -> MessageType {
        self.options
            .lookup(universes.dhcp(), OptionTag::DhcpMessageType.into())
            .and_then(|cache| cache.data.as_bytes().first().cloned())
            .map_or(MessageType::Undefined, MessageType::from)
    }

    /// Adds the packet to a class.
    pub fn classify(&self, class: &str) {
        let mut classes = self.classes.borrow_mut();
        if !classes.iter().any(|known| known.eq_ignore_ascii_case(class)) {
            debug!("packet classified into {}", class);
            classes.push(class.to_owned());
        }
    }

    pub fn is_member(&self, class: &str) -> bool {
        self.classes
            .borrow()
            .iter()
            .any(|known| known.eq_ignore_ascii_case(class))
    }

    pub fn classes(&self) -> Vec<String> {
        self.classes.borrow().clone()
    }
}

bitflags! {
    /// Lease events a statement body can be attached to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OnEvents: u8 {
        const EXPIRY = 0b0001;
        const COMMIT = 0b0010;
        const RELEASE = 0b0100;
        const TRANSMISSION = 0b1000;
    }
}

/// Statement bodies to run when lease events happen.
#[derive(Debug, Default, Clone)]
pub struct LeaseHooks {
    pub on_expiry: Option<Rc<Vec<Statement>>>,
    pub on_commit: Option<Rc<Vec<Statement>>>,
    pub on_release: Option<Rc<Vec<Statement>>>,
    pub on_transmission: Option<Rc<Vec<Statement>>>,
}

/// An address lease as the evaluator sees it.
#[derive(Debug)]
pub struct Lease {
    address: Ipv4Addr,
    starts: i64,
    ends: i64,
    is_static: bool,
    host: Option<String>,
    hooks: RefCell<LeaseHooks>,
}

impl Lease {
    /// A lease of `address` running from now for `lease_time` seconds.
    pub fn new(address: Ipv4Addr, lease_time: u32) -> Self {
        let starts = Utc::now().timestamp();
        Lease::with_times(address, starts, starts + i64::from(lease_time))
    }

    pub fn with_times(address: Ipv4Addr, starts: i64, ends: i64) -> Self {
        Lease {
            address,
            starts,
            ends,
            is_static: false,
            host: None,
            hooks: RefCell::new(LeaseHooks::default()),
        }
    }

    /// Marks the lease as a fixed-address assignment.
    pub fn set_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Names the host declaration the lease belongs to.
    pub fn set_host(mut self, host: &str) -> Self {
        self.host = Some(host.to_owned());
        self
    }

    /// `IPv4` lease address.
    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub fn starts(&self) -> i64 {
        self.starts
    }

    pub fn ends(&self) -> i64 {
        self.ends
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Seconds left at `now`, `None` once the lease has ended.
    pub fn remaining(&self, now: i64) -> Option<u64> {
        if self.ends < now {
            None
        } else {
            Some((self.ends - now) as u64)
        }
    }

    /// Attaches `body` to every event in `events`, replacing what was there.
    pub fn set_hooks(&self, events: OnEvents, body: Rc<Vec<Statement>>) {
        let mut hooks = self.hooks.borrow_mut();
        if events.contains(OnEvents::EXPIRY) {
            hooks.on_expiry = Some(body.clone());
        }
        if events.contains(OnEvents::COMMIT) {
            hooks.on_commit = Some(body.clone());
        }
        if events.contains(OnEvents::RELEASE) {
            hooks.on_release = Some(body.clone());
        }
        if events.contains(OnEvents::TRANSMISSION) {
            hooks.on_transmission = Some(body);
        }
    }

    /// The body attached to a single event.
    pub fn hook(&self, event: OnEvents) -> Option<Rc<Vec<Statement>>> {
        let hooks = self.hooks.borrow();
        if event == OnEvents::EXPIRY {
            hooks.on_expiry.clone()
        } else if event == OnEvents::COMMIT {
            hooks.on_commit.clone()
        } else if event == OnEvents::RELEASE {
            hooks.on_release.clone()
        } else if event == OnEvents::TRANSMISSION {
            hooks.on_transmission.clone()
        } else {
            None
        }
    }
}

/// The client protocol states, numbered as `client-state` reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhcpState {
    Rebooting = 1,
    Init,
    Selecting,
    Requesting,
    Bound,
    Renewing,
    Rebinding,
}

/// The client side of a conversation.
#[derive(Debug, Clone)]
pub struct ClientState {
    pub state: DhcpState,
    pub hardware_type: HardwareType,
    pub hardware_address: MacAddress,
}

impl ClientState {
    pub fn new(state: DhcpState, hardware_address: MacAddress) -> Self {
        ClientState {
            state,
            hardware_type: HardwareType::Ethernet,
            hardware_address,
        }
    }
}

/// Everything an evaluation may look at.
///
/// Built once per message and passed down unchanged; only the scope narrows.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub universes: &'a Universes,
    pub packet: Option<&'a Packet>,
    pub lease: Option<&'a Lease>,
    pub client_state: Option<&'a ClientState>,
    /// Options of the incoming message.
    pub in_options: Option<&'a OptionState>,
    /// Options being configured for the reply.
    pub cfg_options: Option<&'a OptionState>,
    pub hosts: Option<&'a HostCache>,
    pub updater: Option<&'a dyn DnsUpdater>,
    /// Seconds since the epoch.
    pub now: i64,
}

impl<'a> Context<'a> {
    pub fn new(universes: &'a Universes) -> Self {
        Context {
            universes,
            packet: None,
            lease: None,
            client_state: None,
            in_options: None,
            cfg_options: None,
            hosts: None,
            updater: None,
            now: Utc::now().timestamp(),
        }
    }

    /// Sets the packet and takes its options as the incoming ones.
    pub fn packet(mut self, packet: &'a Packet) -> Self {
        self.packet = Some(packet);
        self.in_options = Some(&packet.options);
        self
    }

    pub fn lease(mut self, lease: &'a Lease) -> Self {
        self.lease = Some(lease);
        self
    }

    pub fn client_state(mut self, client_state: &'a ClientState) -> Self {
        self.client_state = Some(client_state);
        self
    }

    pub fn in_options(mut self, options: &'a OptionState) -> Self {
        self.in_options = Some(options);
        self
    }

    pub fn cfg_options(mut self, options: &'a OptionState) -> Self {
        self.cfg_options = Some(options);
        self
    }

    pub fn hosts(mut self, hosts: &'a HostCache) -> Self {
        self.hosts = Some(hosts);
        self
    }

    pub fn updater(mut self, updater: &'a dyn DnsUpdater) -> Self {
        self.updater = Some(updater);
        self
    }

    /// Pins the clock.
    pub fn at(mut self, now: i64) -> Self {
        self.now = now;
        self
    }
}
