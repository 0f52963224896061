//! Configuration expressions.
//!
//! Every operator belongs to one of four kinds, and only the evaluator entry
//! point of that kind accepts it. Variable references and function calls
//! take the kind of whatever they produce at run time.

pub mod convert;
pub mod dns;
pub mod eval;

use std::rc::Rc;

use crate::{data::DataString, scope::Fundef, universe::OptionDef};

pub use self::dns::{UpdateOp, UpdateRecord};

/// The evaluator an expression belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKind {
    Boolean,
    Numeric,
    Data,
    Dns,
    /// Resolved at run time: variable references and function calls.
    Any,
    Function,
}

/// An expression tree node.
#[derive(Debug, Clone)]
pub enum Expression {
    // boolean
    /// Whether the packet was classified into the named class.
    Check(String),
    Equal(Rc<Expression>, Rc<Expression>),
    NotEqual(Rc<Expression>, Rc<Expression>),
    And(Rc<Expression>, Rc<Expression>),
    Or(Rc<Expression>, Rc<Expression>),
    Not(Rc<Expression>),
    /// Whether the incoming packet carries the option.
    Exists(Rc<OptionDef>),
    /// Whether the client has a host declaration.
    Known,
    /// Whether the lease is static.
    Static,
    VariableExists(String),

    // numeric
    ExtractInt8(Rc<Expression>),
    ExtractInt16(Rc<Expression>),
    ExtractInt32(Rc<Expression>),
    ConstInt(u64),
    /// Seconds until the lease ends.
    LeaseTime,
    /// Submits the updates and yields the result code.
    DnsTransaction(Vec<Rc<Expression>>),
    Add(Rc<Expression>, Rc<Expression>),
    Subtract(Rc<Expression>, Rc<Expression>),
    Multiply(Rc<Expression>, Rc<Expression>),
    Divide(Rc<Expression>, Rc<Expression>),
    Remainder(Rc<Expression>, Rc<Expression>),
    BinaryAnd(Rc<Expression>, Rc<Expression>),
    BinaryOr(Rc<Expression>, Rc<Expression>),
    BinaryXor(Rc<Expression>, Rc<Expression>),
    ClientState,

    // data
    Substring {
        expr: Rc<Expression>,
        offset: Rc<Expression>,
        length: Rc<Expression>,
    },
    Suffix {
        expr: Rc<Expression>,
        length: Rc<Expression>,
    },
    /// An option of the incoming packet.
    Option(Rc<OptionDef>),
    /// An option of the configuration being built.
    ConfigOption(Rc<OptionDef>),
    Hardware,
    Packet {
        offset: Rc<Expression>,
        length: Rc<Expression>,
    },
    /// The configured options of a space, serialized.
    Encapsulate(String),
    ConstData(DataString),
    HostLookup(String),
    Concat(Rc<Expression>, Rc<Expression>),
    EncodeInt8(Rc<Expression>),
    EncodeInt16(Rc<Expression>),
    EncodeInt32(Rc<Expression>),
    BinaryToAscii {
        base: Rc<Expression>,
        width: Rc<Expression>,
        separator: Rc<Expression>,
        buffer: Rc<Expression>,
    },
    Reverse {
        width: Rc<Expression>,
        buffer: Rc<Expression>,
    },
    LeasedAddress,
    PickFirstValue(Vec<Rc<Expression>>),
    HostDeclName,
    Null,
    Filename,
    Sname,

    // dns
    NsAdd {
        rrclass: u16,
        rrtype: u16,
        rrname: Rc<Expression>,
        rrdata: Rc<Expression>,
        ttl: Rc<Expression>,
    },
    NsDelete {
        rrclass: u16,
        rrtype: u16,
        rrname: Rc<Expression>,
        rrdata: Option<Rc<Expression>>,
    },
    NsExists {
        rrclass: u16,
        rrtype: u16,
        rrname: Rc<Expression>,
        rrdata: Option<Rc<Expression>>,
    },
    NsNotExists {
        rrclass: u16,
        rrtype: u16,
        rrname: Rc<Expression>,
        rrdata: Option<Rc<Expression>>,
    },

    // any
    VariableReference(String),
    Funcall {
        name: String,
        args: Vec<Rc<Expression>>,
    },
    Function(Rc<Fundef>),
}

impl Expression {
    /// The kind of the operator.
    pub fn kind(&self) -> ExpressionKind {
        use self::Expression::*;
        match self {
            Check(..) | Equal(..) | NotEqual(..) | And(..) | Or(..) | Not(..) | Exists(..)
            | Known | Static | VariableExists(..) => ExpressionKind::Boolean,

            ExtractInt8(..) | ExtractInt16(..) | ExtractInt32(..) | ConstInt(..) | LeaseTime
            | DnsTransaction(..) | Add(..) | Subtract(..) | Multiply(..) | Divide(..)
            | Remainder(..) | BinaryAnd(..) | BinaryOr(..) | BinaryXor(..) | ClientState => {
                ExpressionKind::Numeric
            }

            Substring { .. } | Suffix { .. } | Option(..) | ConfigOption(..) | Hardware
            | Packet { .. } | Encapsulate(..) | ConstData(..) | HostLookup(..) | Concat(..)
            | EncodeInt8(..) | EncodeInt16(..) | EncodeInt32(..) | BinaryToAscii { .. }
            | Reverse { .. } | LeasedAddress | PickFirstValue(..) | HostDeclName | Null
            | Filename | Sname => ExpressionKind::Data,

            NsAdd { .. } | NsDelete { .. } | NsExists { .. } | NsNotExists { .. } => {
                ExpressionKind::Dns
            }

            VariableReference(..) | Funcall { .. } => ExpressionKind::Any,
            Function(..) => ExpressionKind::Function,
        }
    }

    /// The operator name used in diagnostics.
    pub fn op_name(&self) -> &'static str {
        use self::Expression::*;
        match self {
            Check(..) => "check",
            Equal(..) => "equal",
            NotEqual(..) => "not-equal",
            And(..) => "and",
            Or(..) => "or",
            Not(..) => "not",
            Exists(..) => "exists",
            Known => "known",
            Static => "static",
            VariableExists(..) => "variable-exists",
            ExtractInt8(..) => "extract-int8",
            ExtractInt16(..) => "extract-int16",
            ExtractInt32(..) => "extract-int32",
            ConstInt(..) => "const-int",
            LeaseTime => "lease-time",
            DnsTransaction(..) => "dns-transaction",
            Add(..) => "add",
            Subtract(..) => "subtract",
            Multiply(..) => "multiply",
            Divide(..) => "divide",
            Remainder(..) => "remainder",
            BinaryAnd(..) => "binary-and",
            BinaryOr(..) => "binary-or",
            BinaryXor(..) => "binary-xor",
            ClientState => "client-state",
            Substring { .. } => "substring",
            Suffix { .. } => "suffix",
            Option(..) => "option",
            ConfigOption(..) => "config-option",
            Hardware => "hardware",
            Packet { .. } => "packet",
            Encapsulate(..) => "encapsulate",
            ConstData(..) => "const-data",
            HostLookup(..) => "host-lookup",
            Concat(..) => "concat",
            EncodeInt8(..) => "encode-int8",
            EncodeInt16(..) => "encode-int16",
            EncodeInt32(..) => "encode-int32",
            BinaryToAscii { .. } => "binary-to-ascii",
            Reverse { .. } => "reverse",
            LeasedAddress => "leased-address",
            PickFirstValue(..) => "pick-first-value",
            HostDeclName => "host-decl-name",
            Null => "null",
            Filename => "filename",
            Sname => "sname",
            NsAdd { .. } => "ns-add",
            NsDelete { .. } => "ns-delete",
            NsExists { .. } => "ns-exists",
            NsNotExists { .. } => "ns-not-exists",
            VariableReference(..) => "variable-reference",
            Funcall { .. } => "funcall",
            Function(..) => "function",
        }
    }

    fn accepted_by(&self, kind: ExpressionKind) -> bool {
        let own = self.kind();
        own == kind || own == ExpressionKind::Any
    }

    pub fn is_boolean_expression(&self) -> bool {
        self.accepted_by(ExpressionKind::Boolean)
    }

    pub fn is_numeric_expression(&self) -> bool {
        self.accepted_by(ExpressionKind::Numeric)
    }

    pub fn is_data_expression(&self) -> bool {
        self.accepted_by(ExpressionKind::Data)
    }

    pub fn is_dns_expression(&self) -> bool {
        self.accepted_by(ExpressionKind::Dns)
    }

    /// A constant data expression, optionally NUL terminated.
    pub fn make_const_data(data: &[u8], terminated: bool) -> Rc<Expression> {
        let data = if terminated {
            DataString::terminated(data)
        } else {
            DataString::from(data)
        };
        Rc::new(Expression::ConstData(data))
    }

    pub fn make_const_int(value: u64) -> Rc<Expression> {
        Rc::new(Expression::ConstInt(value))
    }

    /// Joins two data expressions. A missing side yields the other one.
    pub fn make_concat(
        left: Option<Rc<Expression>>,
        right: Option<Rc<Expression>>,
    ) -> Option<Rc<Expression>> {
        match (left, right) {
            (Some(left), Some(right)) => Some(Rc::new(Expression::Concat(left, right))),
            (left, None) => left,
            (None, right) => right,
        }
    }

    pub fn make_substring(
        expr: Rc<Expression>,
        offset: Rc<Expression>,
        length: Rc<Expression>,
    ) -> Rc<Expression> {
        Rc::new(Expression::Substring {
            expr,
            offset,
            length,
        })
    }

    /// The first `limit` bytes of `expr`.
    pub fn make_limit(expr: Rc<Expression>, limit: u64) -> Rc<Expression> {
        Expression::make_substring(
            expr,
            Expression::make_const_int(0),
            Expression::make_const_int(limit),
        )
    }

    pub fn make_encapsulation(space: &str) -> Rc<Expression> {
        Rc::new(Expression::Encapsulate(space.to_owned()))
    }

    pub fn make_host_lookup(hostname: &str) -> Rc<Expression> {
        Rc::new(Expression::HostLookup(hostname.to_owned()))
    }
}
