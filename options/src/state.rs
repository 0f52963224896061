//! Option caches and the per-message option store.

use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    data::DataString,
    format::pretty_print,
    tree::Expression,
    universe::{OptionDef, Universe, UniverseId, UniverseKind, Universes},
};

/// Buckets of a hashed option space store.
pub const OPTION_HASH_SIZE: usize = 17;

/// A stored option value.
///
/// `data` is the literal value. When it is empty and `expression` is set, the
/// value is computed on demand.
#[derive(Debug)]
pub struct OptionCache {
    pub option: Rc<OptionDef>,
    pub data: DataString,
    pub expression: Option<Rc<Expression>>,
}

impl OptionCache {
    /// A literal value.
    pub fn new(option: Rc<OptionDef>, data: DataString) -> Rc<Self> {
        Rc::new(OptionCache {
            option,
            data,
            expression: None,
        })
    }

    /// A value computed from `expression`.
    pub fn with_expression(option: Rc<OptionDef>, expression: Rc<Expression>) -> Rc<Self> {
        Rc::new(OptionCache {
            option,
            data: DataString::new(),
            expression: Some(expression),
        })
    }

    /// The value as an expression, turning literal data into a constant.
    pub fn as_expression(&self) -> Rc<Expression> {
        match self.expression {
            Some(ref expression) if self.data.is_empty() => expression.clone(),
            _ => Rc::new(Expression::ConstData(self.data.clone())),
        }
    }

    pub fn code(&self) -> u32 {
        self.option.code
    }
}

/// A literal cache holding a copy of `data`.
pub fn make_const_option_cache(option: Rc<OptionDef>, data: &[u8]) -> Rc<OptionCache> {
    OptionCache::new(option, DataString::from(data))
}

impl fmt::Display for OptionCache {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.data.is_empty() && self.expression.is_some() {
            write!(f, "{} = <expression>", self.option.name)
        } else {
            write!(
                f,
                "{} = {}",
                self.option.name,
                pretty_print(&self.option.format, self.data.as_bytes())
            )
        }
    }
}

/// How an option statement combines a new value with what is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionOp {
    /// Store only if nothing is stored yet.
    Default,
    /// Replace.
    Supersede,
    /// Replace, and ask for it to be sent.
    Send,
    /// Stored value followed by the new one.
    Append,
    /// New value followed by the stored one.
    Prepend,
}

#[derive(Debug, Clone)]
enum Store {
    Hashed(Vec<Vec<Rc<OptionCache>>>),
    Linked(Vec<Rc<OptionCache>>),
}

impl Store {
    fn new(kind: UniverseKind) -> Self {
        match kind {
            UniverseKind::Hashed => Store::Hashed(vec![Vec::new(); OPTION_HASH_SIZE]),
            UniverseKind::Linked => Store::Linked(Vec::new()),
        }
    }

    fn lookup(&self, code: u32) -> Option<Rc<OptionCache>> {
        match self {
            Store::Hashed(buckets) => buckets[bucket(code)]
                .iter()
                .find(|cache| cache.code() == code)
                .cloned(),
            Store::Linked(chain) => chain.iter().find(|cache| cache.code() == code).cloned(),
        }
    }

    fn save(&mut self, cache: Rc<OptionCache>) {
        match self {
            Store::Hashed(buckets) => {
                let bucket = &mut buckets[bucket(cache.code())];
                match bucket.iter_mut().find(|stored| stored.code() == cache.code()) {
                    Some(stored) => *stored = cache,
                    None => bucket.push(cache),
                }
            }
            Store::Linked(chain) => chain.push(cache),
        }
    }

    fn delete(&mut self, code: u32) {
        match self {
            Store::Hashed(buckets) => buckets[bucket(code)].retain(|cache| cache.code() != code),
            Store::Linked(chain) => chain.retain(|cache| cache.code() != code),
        }
    }

    fn caches(&self) -> Vec<Rc<OptionCache>> {
        match self {
            Store::Hashed(buckets) => buckets.iter().flatten().cloned().collect(),
            Store::Linked(chain) => chain.clone(),
        }
    }
}

fn bucket(code: u32) -> usize {
    code as usize % OPTION_HASH_SIZE
}

/// Option caches of one message or configuration scope, per option space.
///
/// Lookups hand out shared references, so no borrow outlives a call and the
/// store may be changed while its values are being evaluated.
#[derive(Debug, Clone)]
pub struct OptionState {
    stores: RefCell<Vec<Option<Store>>>,
    site_universe: UniverseId,
    site_code_min: u32,
}

impl OptionState {
    pub fn new() -> Self {
        OptionState {
            stores: RefCell::new(Vec::new()),
            site_universe: UniverseId::DHCP,
            site_code_min: 0,
        }
    }

    /// Routes `dhcp` codes from `code_min` upwards to the `universe` site space.
    pub fn set_site(&mut self, universe: UniverseId, code_min: u32) {
        self.site_universe = universe;
        self.site_code_min = code_min;
    }

    pub fn site_universe(&self) -> UniverseId {
        self.site_universe
    }

    pub fn site_code_min(&self) -> u32 {
        self.site_code_min
    }

    /// The universe a top-level wire code belongs to.
    pub fn universe_for_code<'a>(&self, universes: &'a Universes, code: u32) -> &'a Universe {
        if self.site_code_min > 0 && code >= self.site_code_min {
            universes.get(self.site_universe)
        } else {
            universes.dhcp()
        }
    }

    /// Number of universe slots allocated so far.
    pub fn universe_count(&self) -> usize {
        self.stores.borrow().len()
    }

    /// Whether anything was ever stored for the universe.
    pub fn has_space(&self, universe: UniverseId) -> bool {
        self.stores
            .borrow()
            .get(universe.0)
            .map_or(false, Option::is_some)
    }

    /// The first cache stored under `code`.
    pub fn lookup(&self, universe: &Universe, code: u32) -> Option<Rc<OptionCache>> {
        self.stores
            .borrow()
            .get(universe.id().0)
            .and_then(Option::as_ref)
            .and_then(|store| store.lookup(code))
    }

    /// Stores a cache. Hashed spaces replace a cache with the same code,
    /// linked spaces keep both.
    pub fn save(&self, universe: &Universe, cache: Rc<OptionCache>) {
        let mut stores = self.stores.borrow_mut();
        let index = universe.id().0;
        if stores.len() <= index {
            stores.resize(index + 1, None);
        }
        stores[index]
            .get_or_insert_with(|| Store::new(universe.kind()))
            .save(cache);
    }

    /// Stores a cache, dropping every cache with the same code first.
    pub fn replace(&self, universe: &Universe, cache: Rc<OptionCache>) {
        self.delete(universe, cache.code());
        self.save(universe, cache);
    }

    /// Removes every cache stored under `code`.
    pub fn delete(&self, universe: &Universe, code: u32) {
        if let Some(Some(store)) = self.stores.borrow_mut().get_mut(universe.id().0) {
            store.delete(code);
        }
    }

    /// A snapshot of the caches of a universe in iteration order.
    pub fn caches(&self, universe: &Universe) -> Vec<Rc<OptionCache>> {
        self.stores
            .borrow()
            .get(universe.id().0)
            .and_then(Option::as_ref)
            .map(Store::caches)
            .unwrap_or_default()
    }

    /// Calls `f` for every cache of a universe.
    ///
    /// `f` may modify the store; it sees the caches present when the walk began.
    pub fn foreach<F>(&self, universe: &Universe, mut f: F)
    where
        F: FnMut(&Rc<OptionCache>),
    {
        for cache in self.caches(universe) {
            f(&cache);
        }
    }

    /// Installs `cache` according to an option statement.
    pub fn set_option(&self, universe: &Universe, cache: Rc<OptionCache>, op: OptionOp) {
        match op {
            OptionOp::Default => {
                if self.lookup(universe, cache.code()).is_none() {
                    self.save(universe, cache);
                }
            }
            OptionOp::Supersede | OptionOp::Send => self.replace(universe, cache),
            OptionOp::Append | OptionOp::Prepend => {
                let stored = match self.lookup(universe, cache.code()) {
                    Some(stored) => stored,
                    None => {
                        self.save(universe, cache);
                        return;
                    }
                };
                let (old, new) = (stored.as_expression(), cache.as_expression());
                let expression = if op == OptionOp::Append {
                    Expression::make_concat(Some(old), Some(new))
                } else {
                    Expression::make_concat(Some(new), Some(old))
                };
                if let Some(expression) = expression {
                    self.replace(
                        universe,
                        OptionCache::with_expression(stored.option.clone(), expression),
                    );
                }
            }
        }
    }

    /// Merges decoded caches: hashed spaces concatenate with a stored value
    /// of the same code, linked spaces append.
    pub(crate) fn merge(&self, universes: &Universes, other: OptionState) {
        for (index, store) in other.stores.into_inner().into_iter().enumerate() {
            let store = match store {
                Some(store) => store,
                None => continue,
            };
            let universe = universes.get(UniverseId(index));
            for cache in store.caches() {
                self.save_fragment(universe, cache);
            }
        }
    }

    /// Stores a decoded option fragment.
    pub(crate) fn save_fragment(&self, universe: &Universe, cache: Rc<OptionCache>) {
        if universe.kind() == UniverseKind::Hashed {
            if let Some(stored) = self.lookup(universe, cache.code()) {
                let data = stored.data.concat(&cache.data);
                self.save(universe, OptionCache::new(stored.option.clone(), data));
                return;
            }
        }
        self.save(universe, cache);
    }
}

impl Default for OptionState {
    fn default() -> Self {
        OptionState::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(universes: &Universes, universe: UniverseId, code: u32, value: &str) -> Rc<OptionCache> {
        OptionCache::new(universes.get(universe).option(code), DataString::from(value))
    }

    #[test]
    fn const_caches_copy_their_data() {
        let universes = Universes::new();
        let mut bytes = vec![192, 168, 0, 1];
        let cache = make_const_option_cache(universes.dhcp().option(3), &bytes);
        bytes[0] = 10;
        assert_eq!(cache.data.as_bytes(), &[192, 168, 0, 1]);
        assert_eq!(cache.to_string(), "routers = 192.168.0.1");
    }

    #[test]
    fn hashed_save_replaces() {
        let universes = Universes::new();
        let dhcp = universes.dhcp();
        let state = OptionState::new();
        state.save(dhcp, cache(&universes, UniverseId::DHCP, 12, "one"));
        state.save(dhcp, cache(&universes, UniverseId::DHCP, 29, "other"));
        state.save(dhcp, cache(&universes, UniverseId::DHCP, 12, "two"));

        assert_eq!(state.lookup(dhcp, 12).unwrap().data.as_bytes(), b"two");
        assert_eq!(state.caches(dhcp).len(), 2);

        state.delete(dhcp, 12);
        assert!(state.lookup(dhcp, 12).is_none());
        assert!(state.lookup(dhcp, 29).is_some());
    }

    #[test]
    fn linked_save_keeps_duplicates_in_order() {
        let universes = Universes::new();
        let agent = universes.get(UniverseId::AGENT);
        let state = OptionState::new();
        state.save(agent, cache(&universes, UniverseId::AGENT, 2, "b"));
        state.save(agent, cache(&universes, UniverseId::AGENT, 1, "a"));
        state.save(agent, cache(&universes, UniverseId::AGENT, 2, "c"));

        let values: Vec<_> = state
            .caches(agent)
            .iter()
            .map(|cache| cache.data.to_text())
            .collect();
        assert_eq!(values, vec!["b", "a", "c"]);
        assert_eq!(state.lookup(agent, 2).unwrap().data.as_bytes(), b"b");
    }

    #[test]
    fn default_does_not_overwrite() {
        let universes = Universes::new();
        let dhcp = universes.dhcp();
        let state = OptionState::new();
        state.set_option(dhcp, cache(&universes, UniverseId::DHCP, 15, "a.org"), OptionOp::Default);
        state.set_option(dhcp, cache(&universes, UniverseId::DHCP, 15, "b.org"), OptionOp::Default);
        assert_eq!(state.lookup(dhcp, 15).unwrap().data.as_bytes(), b"a.org");

        state.set_option(dhcp, cache(&universes, UniverseId::DHCP, 15, "c.org"), OptionOp::Supersede);
        assert_eq!(state.lookup(dhcp, 15).unwrap().data.as_bytes(), b"c.org");
    }

    #[test]
    fn foreach_tolerates_changes() {
        let universes = Universes::new();
        let dhcp = universes.dhcp();
        let state = OptionState::new();
        state.save(dhcp, cache(&universes, UniverseId::DHCP, 1, "x"));
        state.save(dhcp, cache(&universes, UniverseId::DHCP, 2, "y"));

        let mut seen = 0;
        state.foreach(dhcp, |cache| {
            seen += 1;
            state.delete(dhcp, cache.code());
        });
        assert_eq!(seen, 2);
        assert!(state.caches(dhcp).is_empty());
        assert!(state.has_space(UniverseId::DHCP));
        assert!(!state.has_space(UniverseId::NWIP));
    }

    #[test]
    fn fragments_concatenate_in_hashed_spaces() {
        let universes = Universes::new();
        let dhcp = universes.dhcp();
        let state = OptionState::new();
        state.save_fragment(dhcp, cache(&universes, UniverseId::DHCP, 77, "ab"));
        state.save_fragment(dhcp, cache(&universes, UniverseId::DHCP, 77, "cd"));
        assert_eq!(state.lookup(dhcp, 77).unwrap().data.as_bytes(), b"abcd");
    }

    #[test]
    fn site_codes_route_to_the_site_space() {
        let mut universes = Universes::new();
        let site = universes
            .define_space("site", UniverseKind::Hashed, 1, 1)
            .unwrap();
        let mut state = OptionState::new();
        assert_eq!(state.universe_for_code(&universes, 230).id(), UniverseId::DHCP);
        state.set_site(site, 224);
        assert_eq!(state.universe_for_code(&universes, 230).id(), site);
        assert_eq!(state.universe_for_code(&universes, 12).id(), UniverseId::DHCP);
    }
}
