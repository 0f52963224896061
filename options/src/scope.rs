//! Lexical scopes of the configuration language.

use std::{cell::RefCell, fmt, rc::Rc};

use crate::{data::DataString, execute::Statement, tree::UpdateRecord};

/// A value a variable can hold.
#[derive(Debug, Clone)]
pub enum BindingValue {
    Boolean(bool),
    Numeric(u64),
    Data(DataString),
    Dns(Rc<UpdateRecord>),
    Function(Rc<Fundef>),
}

impl BindingValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            BindingValue::Boolean(..) => "boolean",
            BindingValue::Numeric(..) => "numeric",
            BindingValue::Data(..) => "data",
            BindingValue::Dns(..) => "dns",
            BindingValue::Function(..) => "function",
        }
    }
}

impl PartialEq for BindingValue {
    fn eq(&self, other: &Self) -> bool {
        use self::BindingValue::*;
        match (self, other) {
            (Boolean(a), Boolean(b)) => a == b,
            (Numeric(a), Numeric(b)) => a == b,
            (Data(a), Data(b)) => a == b,
            (Dns(a), Dns(b)) => a == b,
            (Function(a), Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A user-defined function.
#[derive(Debug)]
pub struct Fundef {
    pub args: Vec<String>,
    pub statements: Vec<Statement>,
}

/// A named cell. An unset cell keeps its name.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub value: Option<BindingValue>,
}

/// A scope shared by everything that runs inside it.
pub type Scope = Rc<BindingScope>;

/// One frame of the lexical chain.
#[derive(Default)]
pub struct BindingScope {
    outer: Option<Scope>,
    bindings: RefCell<Vec<Binding>>,
}

impl BindingScope {
    /// An outermost scope.
    pub fn new() -> Scope {
        Rc::new(BindingScope::default())
    }

    /// A scope nested inside `outer`.
    pub fn with_outer(outer: &Scope) -> Scope {
        Rc::new(BindingScope {
            outer: Some(outer.clone()),
            bindings: RefCell::new(Vec::new()),
        })
    }

    pub fn outer(&self) -> Option<&Scope> {
        self.outer.as_ref()
    }

    /// Whether this frame itself binds `name`.
    fn position(&self, name: &str) -> Option<usize> {
        self.bindings
            .borrow()
            .iter()
            .rposition(|binding| binding.name.eq_ignore_ascii_case(name))
    }

    /// The innermost frame binding `name`, set or not.
    pub fn find_binding<'a>(self: &'a Rc<Self>, name: &str) -> Option<&'a Scope> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if current.position(name).is_some() {
                return Some(current);
            }
            scope = current.outer.as_ref();
        }
        None
    }

    /// The value of the innermost binding of `name`. An unset binding hides
    /// outer ones.
    pub fn find_value(self: &Rc<Self>, name: &str) -> Option<BindingValue> {
        let scope = self.find_binding(name)?;
        let index = scope.position(name)?;
        let bindings = scope.bindings.borrow();
        bindings[index].value.clone()
    }

    /// Adds a binding to this frame, shadowing any outer one.
    pub fn create_binding(&self, name: &str, value: Option<BindingValue>) {
        self.bindings.borrow_mut().push(Binding {
            name: name.to_owned(),
            value,
        });
    }

    /// Assigns to the innermost binding of `name`, creating it in this frame
    /// if no frame binds it.
    pub fn set(self: &Rc<Self>, name: &str, value: Option<BindingValue>) {
        match self.find_binding(name) {
            Some(scope) => {
                if let Some(index) = scope.position(name) {
                    scope.bindings.borrow_mut()[index].value = value;
                }
            }
            None => self.create_binding(name, value),
        }
    }

    /// Clears the innermost binding of `name`. Returns whether one existed.
    pub fn unset(self: &Rc<Self>, name: &str) -> bool {
        match self.find_binding(name) {
            Some(scope) => {
                if let Some(index) = scope.position(name) {
                    scope.bindings.borrow_mut()[index].value = None;
                }
                true
            }
            None => false,
        }
    }

    /// Binds a data value, overwriting the binding if it is in this frame.
    pub fn bind_ds_value(&self, name: &str, value: DataString) {
        match self.position(name) {
            Some(index) => {
                self.bindings.borrow_mut()[index].value = Some(BindingValue::Data(value))
            }
            None => self.create_binding(name, Some(BindingValue::Data(value))),
        }
    }

    /// The data value bound to `name`, if it is one.
    pub fn find_bound_string(self: &Rc<Self>, name: &str) -> Option<DataString> {
        match self.find_value(name)? {
            BindingValue::Data(data) => Some(data),
            _ => None,
        }
    }

    /// The bindings of this frame, newest last.
    pub fn bindings(&self) -> Vec<Binding> {
        self.bindings.borrow().clone()
    }
}

impl fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<String> = self
            .bindings
            .borrow()
            .iter()
            .map(|binding| binding.name.clone())
            .collect();
        f.debug_struct("BindingScope")
            .field("bindings", &names)
            .field("outer", &self.outer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward() {
        let global = BindingScope::new();
        global.create_binding("x", Some(BindingValue::Numeric(1)));
        let inner = BindingScope::with_outer(&global);
        assert_eq!(inner.find_value("x"), Some(BindingValue::Numeric(1)));
        assert_eq!(inner.find_value("X"), Some(BindingValue::Numeric(1)));
        assert_eq!(inner.find_value("y"), None);
    }

    #[test]
    fn inner_bindings_shadow() {
        let global = BindingScope::new();
        global.create_binding("x", Some(BindingValue::Numeric(1)));
        let inner = BindingScope::with_outer(&global);
        inner.create_binding("x", Some(BindingValue::Numeric(2)));
        assert_eq!(inner.find_value("x"), Some(BindingValue::Numeric(2)));
        assert_eq!(global.find_value("x"), Some(BindingValue::Numeric(1)));
    }

    #[test]
    fn set_updates_the_binding_where_it_lives() {
        let global = BindingScope::new();
        global.create_binding("x", Some(BindingValue::Numeric(1)));
        let inner = BindingScope::with_outer(&global);
        inner.set("x", Some(BindingValue::Numeric(5)));
        assert_eq!(global.find_value("x"), Some(BindingValue::Numeric(5)));

        inner.set("fresh", Some(BindingValue::Boolean(true)));
        assert!(global.find_value("fresh").is_none());
        assert_eq!(inner.find_value("fresh"), Some(BindingValue::Boolean(true)));
    }

    #[test]
    fn unset_keeps_the_name_and_hides_outer_values() {
        let global = BindingScope::new();
        global.create_binding("x", Some(BindingValue::Numeric(1)));
        let inner = BindingScope::with_outer(&global);
        inner.create_binding("x", Some(BindingValue::Numeric(2)));

        assert!(inner.unset("x"));
        assert!(inner.find_binding("x").is_some());
        assert_eq!(inner.find_value("x"), None);
        assert!(!inner.unset("nothing"));
    }

    #[test]
    fn bound_strings() {
        let scope = BindingScope::new();
        scope.bind_ds_value("name", DataString::from("one"));
        scope.bind_ds_value("name", DataString::from("two"));
        assert_eq!(scope.bindings().len(), 1);
        assert_eq!(scope.find_bound_string("name"), Some(DataString::from("two")));

        scope.create_binding("count", Some(BindingValue::Numeric(3)));
        assert_eq!(scope.find_bound_string("count"), None);
    }
}
