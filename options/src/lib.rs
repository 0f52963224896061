//! The DHCP option and configuration core.
//!
//! Decodes option areas into option stores, evaluates the configuration
//! expression language against a message context, executes configuration
//! statements, and packs option stores back onto the wire.

#[macro_use]
extern crate log;

#[macro_use]
mod macros;

pub mod codec;
pub mod context;
pub mod data;
pub mod error;
pub mod execute;
pub mod format;
pub mod scope;
pub mod state;
pub mod tree;
pub mod universe;

pub use self::{
    codec::{
        cons_options, option_space_encapsulate, parse_option_buffer, parse_options, store_options,
        EncodeParams, StoreLimits,
    },
    context::{ClientState, Context, DhcpState, Lease, OnEvents, Packet},
    data::DataString,
    error::{Error, EvalError, EvalResult, Result},
    execute::{execute_statements, LogPriority, Statement},
    scope::{BindingScope, BindingValue, Fundef, Scope},
    state::{make_const_option_cache, OptionCache, OptionOp, OptionState},
    tree::{
        dns::{DnsUpdater, HostCache, Resolver, UpdateRecord},
        eval::{
            evaluate_boolean_expression, evaluate_boolean_option_cache, evaluate_data_expression,
            evaluate_dns_expression, evaluate_expression, evaluate_numeric_expression,
            evaluate_option_cache,
        },
        Expression, ExpressionKind,
    },
    universe::{OptionDef, Universe, UniverseId, UniverseKind, Universes},
};
