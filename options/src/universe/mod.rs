//! Option spaces.
//!
//! A universe names a set of option codes together with the rules for
//! storing and serializing them. The `dhcp` space is the top level; other
//! spaces travel encapsulated inside one of its options.

mod tables;

use std::{collections::HashMap, fmt, rc::Rc};

use bytes::BufMut;

use crate::{
    error::{Error, Result},
    format::Format,
};

/// Index of a universe in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniverseId(pub usize);

impl UniverseId {
    pub const DHCP: UniverseId = UniverseId(0);
    pub const AGENT: UniverseId = UniverseId(1);
    pub const FQDN: UniverseId = UniverseId(2);
    pub const NWIP: UniverseId = UniverseId(3);
}

/// How a universe keeps its options in an option store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniverseKind {
    /// Keyed by code, a save replaces.
    Hashed,
    /// Insertion ordered, same-code duplicates allowed.
    Linked,
}

/// Serialization rules of a universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Plain tag/length/value.
    Standard,
    /// RFC 4702 client FQDN: flags, two rcodes and a name.
    Fqdn,
    /// NetWare/IP: an empty space still says so with a sub-option.
    Nwip,
}

/// An option descriptor.
#[derive(Clone, PartialEq, Eq)]
pub struct OptionDef {
    pub name: String,
    pub format: Format,
    pub universe: UniverseId,
    pub code: u32,
}

impl fmt::Debug for OptionDef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({})", self.name, self.code)
    }
}

/// An option space.
#[derive(Debug)]
pub struct Universe {
    name: String,
    id: UniverseId,
    kind: UniverseKind,
    encoding: Encoding,
    tag_size: usize,
    length_size: usize,
    options: HashMap<u32, Rc<OptionDef>>,
    names: HashMap<String, u32>,
    anchor: Option<(UniverseId, u32)>,
}

impl Universe {
    fn new(
        name: &str,
        id: UniverseId,
        kind: UniverseKind,
        tag_size: usize,
        length_size: usize,
    ) -> Result<Self> {
        for size in &[tag_size, length_size] {
            if ![1, 2, 4].contains(size) {
                return Err(Error::BadFieldWidth(*size));
            }
        }
        Ok(Universe {
            name: name.to_owned(),
            id,
            kind,
            encoding: Encoding::Standard,
            tag_size,
            length_size,
            options: HashMap::new(),
            names: HashMap::new(),
            anchor: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> UniverseId {
        self.id
    }

    pub fn kind(&self) -> UniverseKind {
        self.kind
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn tag_size(&self) -> usize {
        self.tag_size
    }

    pub fn length_size(&self) -> usize {
        self.length_size
    }

    /// Whether PAD and END have their special meaning in this space.
    pub fn has_pad_end(&self) -> bool {
        self.tag_size == 1
    }

    /// The largest value a single length field can describe.
    pub fn max_length(&self) -> usize {
        match self.length_size {
            1 => 0xff,
            2 => 0xffff,
            _ => u32::max_value() as usize,
        }
    }

    /// The option in the parent space that carries this one, if any.
    pub fn anchor(&self) -> Option<(UniverseId, u32)> {
        self.anchor
    }

    /// The descriptor for `code`.
    ///
    /// Codes the space does not know get a synthesized `unknown-N` descriptor
    /// with opaque format.
    pub fn option(&self, code: u32) -> Rc<OptionDef> {
        match self.options.get(&code) {
            Some(option) => option.clone(),
            None => Rc::new(OptionDef {
                name: format!("unknown-{}", code),
                format: Format::parse("X"),
                universe: self.id,
                code,
            }),
        }
    }

    /// The descriptor for `code` if the space defines it.
    pub fn known_option(&self, code: u32) -> Option<Rc<OptionDef>> {
        self.options.get(&code).cloned()
    }

    pub fn option_by_name(&self, name: &str) -> Option<Rc<OptionDef>> {
        self.names
            .get(&name.to_ascii_lowercase())
            .and_then(|code| self.options.get(code))
            .cloned()
    }

    /// Defined codes in ascending order.
    pub fn codes(&self) -> Vec<u32> {
        let mut codes: Vec<u32> = self.options.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// Serializes an option code in this space's tag width.
    pub fn store_tag<B: BufMut>(&self, buf: &mut B, code: u32) {
        match self.tag_size {
            1 => buf.put_u8(code as u8),
            2 => buf.put_u16(code as u16),
            _ => buf.put_u32(code),
        }
    }

    /// Serializes a length in this space's length width.
    pub fn store_length<B: BufMut>(&self, buf: &mut B, length: usize) {
        match self.length_size {
            1 => buf.put_u8(length as u8),
            2 => buf.put_u16(length as u16),
            _ => buf.put_u32(length as u32),
        }
    }

    /// Reads a tag from the start of `buf`, which must hold `tag_size` bytes.
    pub fn get_tag(&self, buf: &[u8]) -> u32 {
        read_be(&buf[..self.tag_size])
    }

    /// Reads a length from the start of `buf`, which must hold `length_size` bytes.
    pub fn get_length(&self, buf: &[u8]) -> usize {
        read_be(&buf[..self.length_size]) as usize
    }

    fn insert(&mut self, code: u32, name: &str, format: &str) -> Rc<OptionDef> {
        let option = Rc::new(OptionDef {
            name: name.to_owned(),
            format: Format::parse(format),
            universe: self.id,
            code,
        });
        if let Some(previous) = self.options.insert(code, option.clone()) {
            self.names.remove(&previous.name.to_ascii_lowercase());
        }
        self.names.insert(name.to_ascii_lowercase(), code);
        option
    }
}

fn read_be(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b))
}

/// The registry of option spaces.
#[derive(Debug)]
pub struct Universes {
    spaces: Vec<Universe>,
    by_name: HashMap<String, UniverseId>,
}

impl Universes {
    /// A registry holding the `dhcp`, `agent`, `fqdn` and `nwip` spaces.
    pub fn new() -> Self {
        let mut universes = Universes {
            spaces: Vec::new(),
            by_name: HashMap::new(),
        };
        universes.install("dhcp", UniverseKind::Hashed, Encoding::Standard, tables::DHCP_OPTIONS);
        universes.install("agent", UniverseKind::Linked, Encoding::Standard, tables::AGENT_OPTIONS);
        universes.install("fqdn", UniverseKind::Linked, Encoding::Fqdn, tables::FQDN_OPTIONS);
        universes.install("nwip", UniverseKind::Hashed, Encoding::Nwip, tables::NWIP_OPTIONS);

        universes.set_encapsulation(UniverseId::AGENT, UniverseId::DHCP, 82);
        universes.set_encapsulation(UniverseId::FQDN, UniverseId::DHCP, 81);
        universes.set_encapsulation(UniverseId::NWIP, UniverseId::DHCP, 63);
        universes
    }

    fn install(
        &mut self,
        name: &str,
        kind: UniverseKind,
        encoding: Encoding,
        table: &[(u32, &str, &str)],
    ) {
        let id = UniverseId(self.spaces.len());
        let mut universe = Universe {
            name: name.to_owned(),
            id,
            kind,
            encoding,
            tag_size: 1,
            length_size: 1,
            options: HashMap::new(),
            names: HashMap::new(),
            anchor: None,
        };
        for (code, option, format) in table {
            universe.insert(*code, option, format);
        }
        self.by_name.insert(name.to_owned(), id);
        self.spaces.push(universe);
    }

    /// Looks up a universe by id.
    ///
    /// # Panics
    /// If the id was not handed out by this registry.
    pub fn get(&self, id: UniverseId) -> &Universe {
        &self.spaces[id.0]
    }

    pub fn find(&self, name: &str) -> Option<&Universe> {
        self.by_name.get(name).map(|id| self.get(*id))
    }

    pub fn dhcp(&self) -> &Universe {
        self.get(UniverseId::DHCP)
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Universe> {
        self.spaces.iter()
    }

    /// Adds a vendor or site option space.
    pub fn define_space(
        &mut self,
        name: &str,
        kind: UniverseKind,
        tag_size: usize,
        length_size: usize,
    ) -> Result<UniverseId> {
        if self.by_name.contains_key(name) {
            return Err(Error::DuplicateSpace(name.to_owned()));
        }
        let id = UniverseId(self.spaces.len());
        let universe = Universe::new(name, id, kind, tag_size, length_size)?;
        debug!("defined option space {} ({:?}, tag {}, length {})", name, kind, tag_size, length_size);
        self.by_name.insert(name.to_owned(), id);
        self.spaces.push(universe);
        Ok(id)
    }

    /// Defines or redefines an option in a space.
    pub fn define_option(
        &mut self,
        id: UniverseId,
        code: u32,
        name: &str,
        format: &str,
    ) -> Rc<OptionDef> {
        self.spaces[id.0].insert(code, name, format)
    }

    /// Declares that `child` travels inside option `code` of `parent`.
    pub fn set_encapsulation(&mut self, child: UniverseId, parent: UniverseId, code: u32) {
        self.spaces[child.0].anchor = Some((parent, code));
    }

    /// Resolves `space.option`, or a bare name in the `dhcp` space.
    pub fn lookup_option(&self, name: &str) -> Option<Rc<OptionDef>> {
        match name.find('.') {
            Some(dot) => self.find(&name[..dot])?.option_by_name(&name[dot + 1..]),
            None => self.dhcp().option_by_name(name),
        }
    }
}

impl Default for Universes {
    fn default() -> Self {
        Universes::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_spaces_are_registered() {
        let universes = Universes::new();
        assert_eq!(universes.dhcp().name(), "dhcp");
        assert_eq!(universes.find("agent").map(Universe::kind), Some(UniverseKind::Linked));
        assert_eq!(universes.get(UniverseId::FQDN).anchor(), Some((UniverseId::DHCP, 81)));

        let routers = universes.lookup_option("routers").unwrap();
        assert_eq!(routers.code, 3);
        let circuit = universes.lookup_option("agent.circuit-id").unwrap();
        assert_eq!((circuit.universe, circuit.code), (UniverseId::AGENT, 1));
    }

    #[test]
    fn unknown_codes_are_synthesized() {
        let universes = Universes::new();
        let option = universes.dhcp().option(200);
        assert_eq!(option.name, "unknown-200");
        assert_eq!(option.format.as_str(), "X");
        assert!(universes.dhcp().known_option(200).is_none());
    }

    #[test]
    fn wide_spaces_serialize_tags_and_lengths() {
        let mut universes = Universes::new();
        let id = universes
            .define_space("vendor", UniverseKind::Hashed, 2, 2)
            .unwrap();
        let universe = universes.get(id);
        let mut buf = Vec::new();
        universe.store_tag(&mut buf, 0x0102);
        universe.store_length(&mut buf, 300);
        assert_eq!(buf, vec![1, 2, 1, 44]);
        assert_eq!(universe.get_tag(&buf), 0x0102);
        assert_eq!(universe.get_length(&buf[2..]), 300);
        assert!(!universe.has_pad_end());
        assert_eq!(universe.max_length(), 0xffff);
    }

    #[test]
    fn vendor_options_are_defined_and_anchored() {
        let mut universes = Universes::new();
        let id = universes
            .define_space("acme", UniverseKind::Hashed, 1, 1)
            .unwrap();
        universes.define_option(id, 1, "boot-server", "I");
        universes.define_option(id, 1, "tftp-server", "I");
        universes.set_encapsulation(id, UniverseId::DHCP, 43);

        let option = universes.lookup_option("acme.tftp-server").unwrap();
        assert_eq!((option.universe, option.code), (id, 1));
        assert!(universes.lookup_option("acme.boot-server").is_none());
        assert_eq!(universes.get(id).anchor(), Some((UniverseId::DHCP, 43)));
    }

    #[test]
    fn bad_widths_and_duplicates_are_refused() {
        let mut universes = Universes::new();
        assert!(universes.define_space("odd", UniverseKind::Hashed, 3, 1).is_err());
        assert!(universes.define_space("dhcp", UniverseKind::Hashed, 1, 1).is_err());
    }
}
