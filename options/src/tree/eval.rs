//! The expression evaluator.
//!
//! There is one entry point per expression kind. Each accepts the operators
//! of its kind plus variable references and function calls, whose kind is
//! only known once they produce a value. Failures are recoverable: callers
//! treat an `Err` as "no value".

use std::{convert::TryFrom, rc::Rc};

use bytes::{Buf, BufMut};

use super::{
    convert,
    dns::{Section, UpdateOp, UpdateRecord},
    Expression, ExpressionKind,
};
use crate::{
    codec::option_space_encapsulate,
    context::Context,
    data::DataString,
    error::{EvalError, EvalResult},
    execute::execute_statements,
    scope::{BindingScope, BindingValue, Scope},
    state::{OptionCache, OptionState},
    universe::OptionDef,
};

/// Evaluates an expression of any kind into a binding value.
pub fn evaluate_expression(
    ctx: &Context,
    scope: &Scope,
    expr: &Expression,
) -> EvalResult<BindingValue> {
    match expr {
        Expression::VariableReference(name) => scope
            .find_value(name)
            .ok_or_else(|| EvalError::UnknownVariable(name.clone())),
        Expression::Funcall { name, args } => call_function(ctx, scope, name, args),
        Expression::Function(fundef) => Ok(BindingValue::Function(fundef.clone())),
        _ => match expr.kind() {
            ExpressionKind::Boolean => {
                evaluate_boolean_expression(ctx, scope, expr).map(BindingValue::Boolean)
            }
            ExpressionKind::Numeric => {
                evaluate_numeric_expression(ctx, scope, expr).map(BindingValue::Numeric)
            }
            ExpressionKind::Data => {
                evaluate_data_expression(ctx, scope, expr).map(BindingValue::Data)
            }
            ExpressionKind::Dns => evaluate_dns_expression(ctx, scope, expr).map(BindingValue::Dns),
            ExpressionKind::Any | ExpressionKind::Function => Err(EvalError::NoValue),
        },
    }
}

fn call_function(
    ctx: &Context,
    scope: &Scope,
    name: &str,
    args: &[Rc<Expression>],
) -> EvalResult<BindingValue> {
    let fundef = match scope.find_value(name) {
        Some(BindingValue::Function(fundef)) => fundef,
        Some(_) => {
            error!("{}: not a function.", name);
            return Err(EvalError::NotAFunction(name.to_owned()));
        }
        None => {
            error!("{}: no such function.", name);
            return Err(EvalError::NoSuchFunction(name.to_owned()));
        }
    };
    if args.len() != fundef.args.len() {
        let which = if args.len() > fundef.args.len() { "many" } else { "few" };
        error!("{}: too {} arguments.", name, which);
        return Err(EvalError::ArgumentCount {
            name: name.to_owned(),
            which,
        });
    }

    let frame = BindingScope::with_outer(scope);
    for (formal, arg) in fundef.args.iter().zip(args) {
        frame.create_binding(formal, evaluate_expression(ctx, scope, arg).ok());
    }

    let mut result = None;
    execute_statements(&mut result, ctx, &frame, &fundef.statements);
    result.ok_or_else(|| EvalError::NoReturnValue(name.to_owned()))
}

fn type_mismatch(entry: &'static str, value: &BindingValue) -> EvalError {
    error!("binding type {} in evaluate_{}_expression.", value.type_name(), entry);
    EvalError::TypeMismatch {
        entry,
        found: value.type_name(),
    }
}

/// Evaluates a boolean expression.
pub fn evaluate_boolean_expression(ctx: &Context, scope: &Scope, expr: &Expression) -> EvalResult<bool> {
    let result = boolean(ctx, scope, expr);
    trace_eval!(expr.op_name(), result);
    result
}

fn boolean(ctx: &Context, scope: &Scope, expr: &Expression) -> EvalResult<bool> {
    match expr {
        Expression::Check(class) => Ok(ctx.packet.map_or(false, |packet| packet.is_member(class))),
        Expression::Equal(left, right) | Expression::NotEqual(left, right) => {
            let left = evaluate_expression(ctx, scope, left);
            let right = evaluate_expression(ctx, scope, right);
            let equal = match (left, right) {
                (Ok(left), Ok(right)) => left == right,
                (Err(_), Err(_)) => true,
                _ => false,
            };
            Ok(equal == matches!(expr, Expression::Equal(..)))
        }
        Expression::And(left, right) => {
            if !evaluate_boolean_expression(ctx, scope, left)? {
                return Ok(false);
            }
            evaluate_boolean_expression(ctx, scope, right)
        }
        Expression::Or(left, right) => {
            let left = evaluate_boolean_expression(ctx, scope, left);
            if let Ok(true) = left {
                return Ok(true);
            }
            match (left, evaluate_boolean_expression(ctx, scope, right)) {
                (Err(error), Err(_)) => Err(error),
                (_, right) => Ok(right.unwrap_or(false)),
            }
        }
        Expression::Not(operand) => evaluate_boolean_expression(ctx, scope, operand).map(|value| !value),
        Expression::Exists(option) => {
            let options = ctx.in_options.ok_or(EvalError::Unavailable("incoming options"))?;
            Ok(lookup(ctx, options, option).is_some())
        }
        Expression::Known => ctx
            .packet
            .map(|packet| packet.known)
            .ok_or(EvalError::Unavailable("packet")),
        Expression::Static => Ok(ctx.lease.map_or(false, |lease| lease.is_static())),
        Expression::VariableExists(name) => Ok(scope.find_value(name).is_some()),
        Expression::VariableReference(..) | Expression::Funcall { .. } => {
            match evaluate_expression(ctx, scope, expr)? {
                BindingValue::Boolean(value) => Ok(value),
                other => Err(type_mismatch("boolean", &other)),
            }
        }
        _ => wrong_kind!("boolean", expr),
    }
}

/// Evaluates a numeric expression. Arithmetic wraps around at 64 bits.
pub fn evaluate_numeric_expression(ctx: &Context, scope: &Scope, expr: &Expression) -> EvalResult<u64> {
    let result = numeric(ctx, scope, expr);
    trace_eval!(expr.op_name(), result);
    result
}

fn operands(
    ctx: &Context,
    scope: &Scope,
    left: &Expression,
    right: &Expression,
) -> EvalResult<(u64, u64)> {
    let left = evaluate_numeric_expression(ctx, scope, left)?;
    let right = evaluate_numeric_expression(ctx, scope, right)?;
    Ok((left, right))
}

fn numeric(ctx: &Context, scope: &Scope, expr: &Expression) -> EvalResult<u64> {
    match expr {
        Expression::ExtractInt8(data) => extract_int(ctx, scope, data, "extract-int8", 1),
        Expression::ExtractInt16(data) => extract_int(ctx, scope, data, "extract-int16", 2),
        Expression::ExtractInt32(data) => extract_int(ctx, scope, data, "extract-int32", 4),
        Expression::ConstInt(value) => Ok(*value),
        Expression::LeaseTime => {
            let lease = ctx.lease.ok_or(EvalError::Unavailable("lease"))?;
            lease.remaining(ctx.now).ok_or_else(|| {
                error!("lease_time: lease ends at {} when it is now {}", lease.ends(), ctx.now);
                EvalError::LeaseExpired
            })
        }
        Expression::DnsTransaction(updates) => {
            let updater = ctx.updater.ok_or(EvalError::Unavailable("dns updater"))?;
            let records = updates
                .iter()
                .map(|update| evaluate_dns_expression(ctx, scope, update).map(|record| (*record).clone()))
                .collect::<EvalResult<Vec<UpdateRecord>>>()?;
            Ok(updater.update(&records))
        }
        Expression::Add(left, right) => operands(ctx, scope, left, right).map(|(l, r)| l.wrapping_add(r)),
        Expression::Subtract(left, right) => operands(ctx, scope, left, right).map(|(l, r)| l.wrapping_sub(r)),
        Expression::Multiply(left, right) => operands(ctx, scope, left, right).map(|(l, r)| l.wrapping_mul(r)),
        Expression::Divide(left, right) => {
            let (left, right) = operands(ctx, scope, left, right)?;
            left.checked_div(right).ok_or(EvalError::DivisionByZero)
        }
        Expression::Remainder(left, right) => {
            let (left, right) = operands(ctx, scope, left, right)?;
            left.checked_rem(right).ok_or(EvalError::DivisionByZero)
        }
        Expression::BinaryAnd(left, right) => operands(ctx, scope, left, right).map(|(l, r)| l & r),
        Expression::BinaryOr(left, right) => operands(ctx, scope, left, right).map(|(l, r)| l | r),
        Expression::BinaryXor(left, right) => operands(ctx, scope, left, right).map(|(l, r)| l ^ r),
        Expression::ClientState => ctx
            .client_state
            .map(|client| client.state as u64)
            .ok_or(EvalError::Unavailable("client state")),
        Expression::VariableReference(..) | Expression::Funcall { .. } => {
            match evaluate_expression(ctx, scope, expr)? {
                BindingValue::Numeric(value) => Ok(value),
                other => Err(type_mismatch("numeric", &other)),
            }
        }
        _ => wrong_kind!("numeric", expr),
    }
}

fn extract_int(
    ctx: &Context,
    scope: &Scope,
    data: &Expression,
    name: &'static str,
    size: usize,
) -> EvalResult<u64> {
    let data = evaluate_data_expression(ctx, scope, data)?;
    let mut bytes = data.as_bytes();
    if bytes.len() < size {
        return Err(EvalError::TooShort {
            name,
            needed: size,
            available: bytes.len(),
        });
    }
    Ok(match size {
        1 => u64::from(bytes.get_u8()),
        2 => u64::from(bytes.get_u16()),
        _ => u64::from(bytes.get_u32()),
    })
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::max_value())
}

/// Evaluates a data expression.
pub fn evaluate_data_expression(ctx: &Context, scope: &Scope, expr: &Expression) -> EvalResult<DataString> {
    let result = data(ctx, scope, expr);
    trace_eval!(expr.op_name(), result);
    result
}

fn data(ctx: &Context, scope: &Scope, expr: &Expression) -> EvalResult<DataString> {
    match expr {
        Expression::Substring { expr, offset, length } => {
            let value = evaluate_data_expression(ctx, scope, expr)?;
            let offset = evaluate_numeric_expression(ctx, scope, offset)?;
            let length = evaluate_numeric_expression(ctx, scope, length)?;
            Ok(value.substring(to_usize(offset), to_usize(length)))
        }
        Expression::Suffix { expr, length } => {
            let value = evaluate_data_expression(ctx, scope, expr)?;
            let length = evaluate_numeric_expression(ctx, scope, length)?;
            Ok(value.suffix(to_usize(length)))
        }
        Expression::Option(option) => {
            let options = ctx.in_options.ok_or(EvalError::Unavailable("incoming options"))?;
            let cache = lookup(ctx, options, option).ok_or(EvalError::NoValue)?;
            evaluate_option_cache(ctx, scope, &cache)
        }
        Expression::ConfigOption(option) => {
            let options = ctx.cfg_options.ok_or(EvalError::Unavailable("configured options"))?;
            let cache = lookup(ctx, options, option).ok_or(EvalError::NoValue)?;
            evaluate_option_cache(ctx, scope, &cache)
        }
        Expression::Hardware => hardware(ctx),
        Expression::Packet { offset, length } => {
            let packet = ctx.packet.ok_or(EvalError::Unavailable("packet"))?;
            let offset = to_usize(evaluate_numeric_expression(ctx, scope, offset)?);
            let length = to_usize(evaluate_numeric_expression(ctx, scope, length)?);
            let bytes = &packet.bytes;
            if offset >= bytes.len() {
                return Ok(DataString::new());
            }
            let end = offset + length.min(bytes.len() - offset);
            Ok(DataString::from(&bytes[offset..end]))
        }
        Expression::Encapsulate(space) => {
            option_space_encapsulate(ctx, scope, space).ok_or(EvalError::NoValue)
        }
        Expression::ConstData(value) => Ok(value.clone()),
        Expression::HostLookup(hostname) => {
            let hosts = ctx.hosts.ok_or(EvalError::Unavailable("host cache"))?;
            hosts.lookup(hostname, ctx.now)
        }
        Expression::Concat(left, right) => {
            let left = evaluate_data_expression(ctx, scope, left)?;
            let right = evaluate_data_expression(ctx, scope, right)?;
            Ok(left.concat(&right))
        }
        Expression::EncodeInt8(value) => {
            let value = evaluate_numeric_expression(ctx, scope, value)?;
            Ok(DataString::from(vec![value as u8]))
        }
        Expression::EncodeInt16(value) => {
            let value = evaluate_numeric_expression(ctx, scope, value)?;
            let mut buf = Vec::with_capacity(2);
            buf.put_u16(value as u16);
            Ok(DataString::from(buf))
        }
        Expression::EncodeInt32(value) => {
            let value = evaluate_numeric_expression(ctx, scope, value)?;
            let mut buf = Vec::with_capacity(4);
            buf.put_u32(value as u32);
            Ok(DataString::from(buf))
        }
        Expression::BinaryToAscii {
            base,
            width,
            separator,
            buffer,
        } => {
            let base = evaluate_numeric_expression(ctx, scope, base)?;
            let width = evaluate_numeric_expression(ctx, scope, width)?;
            let separator = evaluate_data_expression(ctx, scope, separator)?;
            let buffer = evaluate_data_expression(ctx, scope, buffer)?;
            let (base, width) = match (u32::try_from(base), u32::try_from(width)) {
                (Ok(base), Ok(width)) => (base, width),
                _ => return Err(EvalError::BadWidth { name: "binary-to-ascii", width }),
            };
            convert::binary_to_ascii(buffer.as_bytes(), base, width, separator.as_bytes())
                .map(|text| DataString::terminated(&text))
                .ok_or(EvalError::BadWidth {
                    name: "binary-to-ascii",
                    width: u64::from(width),
                })
        }
        Expression::Reverse { width, buffer } => {
            let width = evaluate_numeric_expression(ctx, scope, width)?;
            let buffer = evaluate_data_expression(ctx, scope, buffer)?;
            convert::reverse(buffer.as_bytes(), to_usize(width))
                .map(DataString::from)
                .ok_or(EvalError::BadWidth { name: "reverse", width })
        }
        Expression::LeasedAddress => {
            let lease = ctx.lease.ok_or_else(|| {
                error!("data: leased_address: not available");
                EvalError::Unavailable("lease")
            })?;
            Ok(DataString::from(&lease.address().octets()[..]))
        }
        Expression::PickFirstValue(candidates) => candidates
            .iter()
            .find_map(|candidate| evaluate_data_expression(ctx, scope, candidate).ok())
            .ok_or(EvalError::NoValue),
        Expression::HostDeclName => ctx
            .lease
            .and_then(|lease| lease.host())
            .map(|host| DataString::terminated(host.as_bytes()))
            .ok_or(EvalError::Unavailable("host declaration")),
        Expression::Null => Err(EvalError::NoValue),
        Expression::Filename => {
            let packet = ctx.packet.ok_or(EvalError::Unavailable("packet"))?;
            header_text(&packet.raw.boot_filename)
        }
        Expression::Sname => {
            let packet = ctx.packet.ok_or(EvalError::Unavailable("packet"))?;
            header_text(&packet.raw.server_name)
        }
        Expression::VariableReference(..) | Expression::Funcall { .. } => {
            match evaluate_expression(ctx, scope, expr)? {
                BindingValue::Data(value) => Ok(value),
                other => Err(type_mismatch("data", &other)),
            }
        }
        _ => wrong_kind!("data", expr),
    }
}

fn hardware(ctx: &Context) -> EvalResult<DataString> {
    if let Some(client) = ctx.client_state {
        let mut buf = Vec::with_capacity(7);
        buf.put_u8(client.hardware_type.into());
        buf.put_slice(client.hardware_address.as_bytes());
        return Ok(DataString::from(buf));
    }
    let packet = ctx.packet.ok_or_else(|| {
        error!("data: hardware: raw packet not available");
        EvalError::Unavailable("packet")
    })?;
    let raw = &packet.raw;
    let length = raw.hardware_address_length as usize;
    if length > raw.client_hardware_address.len() {
        error!("data: hardware: invalid hlen ({})", length);
        return Err(EvalError::BadWidth {
            name: "hardware",
            width: length as u64,
        });
    }
    let mut buf = Vec::with_capacity(length + 1);
    buf.put_u8(raw.hardware_type.into());
    buf.put_slice(&raw.client_hardware_address[..length]);
    Ok(DataString::from(buf))
}

fn header_text(field: &[u8]) -> EvalResult<DataString> {
    let length = field.iter().position(|&b| b == 0).unwrap_or_else(|| field.len());
    if length == 0 {
        return Err(EvalError::NoValue);
    }
    Ok(DataString::terminated(&field[..length]))
}

/// Evaluates a DNS update expression into a record.
pub fn evaluate_dns_expression(
    ctx: &Context,
    scope: &Scope,
    expr: &Expression,
) -> EvalResult<Rc<UpdateRecord>> {
    let result = dns(ctx, scope, expr);
    trace_eval!(expr.op_name(), result);
    result
}

fn dns(ctx: &Context, scope: &Scope, expr: &Expression) -> EvalResult<Rc<UpdateRecord>> {
    let optional_data = |rrdata: &Option<Rc<Expression>>| -> EvalResult<Option<String>> {
        match rrdata {
            Some(rrdata) => {
                let data = evaluate_data_expression(ctx, scope, rrdata)?;
                Ok(Some(UpdateRecord::format_data(&data)))
            }
            None => Ok(None),
        }
    };

    let (section, op, rrclass, rrtype, rrname, data, ttl) = match expr {
        Expression::NsAdd {
            rrclass,
            rrtype,
            rrname,
            rrdata,
            ttl,
        } => {
            let data = evaluate_data_expression(ctx, scope, rrdata)?;
            let ttl = evaluate_numeric_expression(ctx, scope, ttl)?;
            let data = Some(UpdateRecord::format_data(&data));
            (Section::Update, UpdateOp::Add, rrclass, rrtype, rrname, data, ttl)
        }
        Expression::NsDelete {
            rrclass,
            rrtype,
            rrname,
            rrdata,
        } => {
            let data = optional_data(rrdata)?;
            (Section::Update, UpdateOp::Delete, rrclass, rrtype, rrname, data, 0)
        }
        Expression::NsExists {
            rrclass,
            rrtype,
            rrname,
            rrdata,
        } => {
            let data = optional_data(rrdata)?;
            (Section::Prerequisite, UpdateOp::Exists, rrclass, rrtype, rrname, data, 0)
        }
        Expression::NsNotExists {
            rrclass,
            rrtype,
            rrname,
            rrdata,
        } => {
            let data = optional_data(rrdata)?;
            (Section::Prerequisite, UpdateOp::NotExists, rrclass, rrtype, rrname, data, 0)
        }
        Expression::VariableReference(..) | Expression::Funcall { .. } => {
            return match evaluate_expression(ctx, scope, expr)? {
                BindingValue::Dns(record) => Ok(record),
                other => Err(type_mismatch("dns", &other)),
            };
        }
        _ => wrong_kind!("dns", expr),
    };

    let name = evaluate_data_expression(ctx, scope, rrname)?;
    Ok(Rc::new(UpdateRecord {
        section,
        op,
        name: name.to_text(),
        class: *rrclass,
        rtype: *rrtype,
        ttl,
        data,
    }))
}

fn lookup(ctx: &Context, options: &OptionState, option: &OptionDef) -> Option<Rc<OptionCache>> {
    options.lookup(ctx.universes.get(option.universe), option.code)
}

/// The value of a stored option: its literal data, or else its expression
/// evaluated now.
pub fn evaluate_option_cache(ctx: &Context, scope: &Scope, cache: &OptionCache) -> EvalResult<DataString> {
    if !cache.data.is_empty() {
        return Ok(cache.data.clone());
    }
    match cache.expression {
        Some(ref expression) => evaluate_data_expression(ctx, scope, expression),
        None => Err(EvalError::NoValue),
    }
}

/// Reads a flag option. Returns the flag and whether the option asks to be
/// ignored, which a first byte of 2 does.
///
/// A missing option, or one without a value, is false.
pub fn evaluate_boolean_option_cache(
    ctx: &Context,
    scope: &Scope,
    cache: Option<&OptionCache>,
) -> (bool, bool) {
    let value = match cache {
        Some(cache) if ctx.in_options.is_some() => evaluate_option_cache(ctx, scope, cache),
        _ => return (false, false),
    };
    match value.as_ref().map(DataString::as_bytes) {
        Ok([2, ..]) => (false, true),
        Ok([flag, ..]) => (*flag != 0, false),
        _ => (false, false),
    }
}
