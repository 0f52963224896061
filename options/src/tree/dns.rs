//! Name resolution and dynamic DNS update records.

use std::{
    cell::RefCell,
    collections::HashMap,
    fmt, io,
    net::{IpAddr, Ipv4Addr, ToSocketAddrs},
};

use crate::{
    data::DataString,
    error::{EvalError, EvalResult},
};

/// Seconds a successful lookup stays cached.
pub const HOST_CACHE_TTL: i64 = 3600;

/// Seconds a failed lookup stays cached.
pub const HOST_CACHE_NEGATIVE_TTL: i64 = 60;

/// Resolves host names to IPv4 addresses.
pub trait Resolver {
    fn resolve(&self, hostname: &str) -> io::Result<Vec<Ipv4Addr>>;
}

/// The system resolver. Blocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve(&self, hostname: &str) -> io::Result<Vec<Ipv4Addr>> {
        let mut addresses = Vec::new();
        for address in (hostname, 0).to_socket_addrs()? {
            if let IpAddr::V4(address) = address.ip() {
                if !addresses.contains(&address) {
                    addresses.push(address);
                }
            }
        }
        Ok(addresses)
    }
}

struct HostEntry {
    data: Option<DataString>,
    timeout: i64,
}

/// Host lookups cached by name.
///
/// A hit is served until its timeout passes. Failures are cached too, so a
/// dead name is retried at most once per negative TTL.
pub struct HostCache {
    resolver: Box<dyn Resolver>,
    entries: RefCell<HashMap<String, HostEntry>>,
    ttl: i64,
    negative_ttl: i64,
}

impl HostCache {
    pub fn new(resolver: Box<dyn Resolver>) -> Self {
        HostCache {
            resolver,
            entries: RefCell::new(HashMap::new()),
            ttl: HOST_CACHE_TTL,
            negative_ttl: HOST_CACHE_NEGATIVE_TTL,
        }
    }

    /// Overrides the positive and negative TTLs.
    pub fn with_ttl(mut self, ttl: i64, negative_ttl: i64) -> Self {
        self.ttl = ttl;
        self.negative_ttl = negative_ttl;
        self
    }

    /// The addresses of `hostname` concatenated as 4-byte groups.
    pub fn lookup(&self, hostname: &str, now: i64) -> EvalResult<DataString> {
        if let Some(entry) = self.entries.borrow().get(hostname) {
            if now <= entry.timeout {
                trace!("host-lookup {}: cached", hostname);
                return entry
                    .data
                    .clone()
                    .ok_or_else(|| EvalError::HostUnknown(hostname.to_owned()));
            }
        }

        let resolved = match self.resolver.resolve(hostname) {
            Ok(addresses) if !addresses.is_empty() => Some(
                addresses
                    .iter()
                    .flat_map(|address| address.octets().to_vec())
                    .collect::<Vec<u8>>(),
            ),
            Ok(_) => None,
            Err(error) => {
                debug!("host-lookup {}: {}", hostname, error);
                None
            }
        };

        let (data, timeout) = match resolved {
            Some(bytes) => (Some(DataString::from(bytes)), now + self.ttl),
            None => {
                error!("{}: host unknown.", hostname);
                (None, now + self.negative_ttl)
            }
        };
        self.entries.borrow_mut().insert(
            hostname.to_owned(),
            HostEntry {
                data: data.clone(),
                timeout,
            },
        );
        data.ok_or_else(|| EvalError::HostUnknown(hostname.to_owned()))
    }
}

impl Default for HostCache {
    fn default() -> Self {
        HostCache::new(Box::new(SystemResolver))
    }
}

impl fmt::Debug for HostCache {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "HostCache({} entries)", self.entries.borrow().len())
    }
}

/// RFC 2136 section a record goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Prerequisite,
    Update,
}

/// What a record asks of the zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Add,
    Delete,
    /// The RRset exists.
    Exists,
    /// The RRset does not exist.
    NotExists,
}

/// One record of a dynamic DNS update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRecord {
    pub section: Section,
    pub op: UpdateOp,
    pub name: String,
    pub class: u16,
    pub rtype: u16,
    pub ttl: u64,
    pub data: Option<String>,
}

impl UpdateRecord {
    /// Renders record data the way the zone expects it: four bytes become a
    /// dotted quad, anything else is taken as text.
    pub fn format_data(data: &DataString) -> String {
        let bytes = data.as_bytes();
        if bytes.len() == 4 {
            Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]).to_string()
        } else {
            data.to_text()
        }
    }
}

impl fmt::Display for UpdateRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let op = match self.op {
            UpdateOp::Add => "add",
            UpdateOp::Delete => "delete",
            UpdateOp::Exists => "exists",
            UpdateOp::NotExists => "not exists",
        };
        write!(f, "{} {} {} {}", op, self.name, self.class, self.rtype)?;
        if let Some(ref data) = self.data {
            write!(f, " {}", data)?;
        }
        if self.op == UpdateOp::Add {
            write!(f, " ttl {}", self.ttl)?;
        }
        Ok(())
    }
}

/// Sends dynamic DNS updates.
pub trait DnsUpdater {
    /// Submits one transaction and returns its DNS result code.
    fn update(&self, records: &[UpdateRecord]) -> u64;
}
