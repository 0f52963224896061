//! The statement executor.

use std::rc::Rc;

use crate::{
    context::{Context, OnEvents},
    scope::{BindingScope, BindingValue, Fundef, Scope},
    state::{OptionCache, OptionOp},
    tree::{
        eval::{
            evaluate_boolean_expression, evaluate_data_expression, evaluate_expression,
            evaluate_numeric_expression,
        },
        Expression,
    },
};

/// Severity of a `log` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogPriority {
    /// Logs, then aborts.
    Fatal,
    Error,
    Debug,
    Info,
}

/// An executable statement.
#[derive(Debug, Clone)]
pub enum Statement {
    If {
        condition: Rc<Expression>,
        then: Vec<Statement>,
        else_: Vec<Statement>,
    },
    Switch {
        expr: Rc<Expression>,
        body: Vec<Statement>,
    },
    /// A label inside a switch body.
    Case(Rc<Expression>),
    /// The fallback label inside a switch body.
    Default,
    Let {
        name: String,
        value: Option<Rc<Expression>>,
        body: Vec<Statement>,
    },
    Set {
        name: String,
        expr: Rc<Expression>,
    },
    Unset(String),
    Define {
        name: String,
        function: Rc<Fundef>,
    },
    Log {
        priority: LogPriority,
        expr: Rc<Expression>,
    },
    /// Attaches a body to lease events.
    On {
        events: OnEvents,
        body: Rc<Vec<Statement>>,
    },
    /// Classifies the packet.
    Add(String),
    Break,
    Return(Rc<Expression>),
    Eval(Rc<Expression>),
    Statements(Vec<Statement>),
    /// `default`, `supersede`, `send`, `append` or `prepend`.
    Option {
        op: OptionOp,
        cache: Rc<OptionCache>,
    },
}

impl Statement {
    pub fn make_let(name: &str, value: Option<Rc<Expression>>, body: Vec<Statement>) -> Self {
        Statement::Let {
            name: name.to_owned(),
            value,
            body,
        }
    }
}

enum Flow {
    Done,
    Returned,
    Failed,
}

/// Runs `statements` in order.
///
/// A `return` whose value evaluates stores it in `result` and ends the run
/// along with every enclosing body; `break` ends only the list it is in.
/// Option statements write to `ctx.cfg_options`. Returns false if a
/// statement could not be carried out.
pub fn execute_statements(
    result: &mut Option<BindingValue>,
    ctx: &Context,
    scope: &Scope,
    statements: &[Statement],
) -> bool {
    match run(result, ctx, scope, statements) {
        Flow::Done | Flow::Returned => true,
        Flow::Failed => false,
    }
}

fn run(
    result: &mut Option<BindingValue>,
    ctx: &Context,
    scope: &Scope,
    statements: &[Statement],
) -> Flow {
    for statement in statements {
        let flow = match statement {
            Statement::If {
                condition,
                then,
                else_,
            } => {
                let taken = evaluate_boolean_expression(ctx, scope, condition).unwrap_or(false);
                trace!("if: {}", taken);
                run(result, ctx, scope, if taken { then } else { else_ })
            }
            Statement::Switch { expr, body } => {
                match find_matching_case(ctx, scope, expr, body) {
                    Some(index) => run(result, ctx, scope, &body[index..]),
                    None => Flow::Done,
                }
            }
            Statement::Case(..) | Statement::Default => Flow::Done,
            Statement::Let { .. } => execute_let(result, ctx, scope, statement),
            Statement::Set { name, expr } => {
                scope.set(name, evaluate_expression(ctx, scope, expr).ok());
                Flow::Done
            }
            Statement::Unset(name) => {
                if !scope.unset(name) {
                    debug!("unset {}: no such variable", name);
                }
                Flow::Done
            }
            Statement::Define { name, function } => {
                scope.set(name, Some(BindingValue::Function(function.clone())));
                Flow::Done
            }
            Statement::Log { priority, expr } => {
                if let Ok(message) = evaluate_data_expression(ctx, scope, expr) {
                    let message = message.to_text();
                    match priority {
                        LogPriority::Fatal => fatal!("{}", message),
                        LogPriority::Error => error!("{}", message),
                        LogPriority::Debug => debug!("{}", message),
                        LogPriority::Info => info!("{}", message),
                    }
                }
                Flow::Done
            }
            Statement::On { events, body } => {
                if let Some(lease) = ctx.lease {
                    lease.set_hooks(*events, body.clone());
                }
                Flow::Done
            }
            Statement::Add(class) => {
                if let Some(packet) = ctx.packet {
                    packet.classify(class);
                }
                Flow::Done
            }
            Statement::Break => return Flow::Done,
            Statement::Return(expr) => match evaluate_expression(ctx, scope, expr) {
                Ok(value) => {
                    *result = Some(value);
                    Flow::Returned
                }
                Err(error) => {
                    debug!("return: {}", error);
                    Flow::Done
                }
            },
            Statement::Eval(expr) => {
                if let Err(error) = evaluate_expression(ctx, scope, expr) {
                    debug!("eval: {}", error);
                }
                Flow::Done
            }
            Statement::Statements(block) => run(result, ctx, scope, block),
            Statement::Option { op, cache } => {
                let options = match ctx.cfg_options {
                    Some(options) => options,
                    None => {
                        error!("{}: no option state to store into", cache.option.name);
                        return Flow::Failed;
                    }
                };
                let universe = ctx.universes.get(cache.option.universe);
                options.set_option(universe, cache.clone(), *op);
                Flow::Done
            }
        };
        match flow {
            Flow::Done => {}
            Flow::Returned | Flow::Failed => return flow,
        }
    }
    Flow::Done
}

/// Binds a chain of directly nested `let`s in one new scope, then runs the
/// innermost body in it. Every value is evaluated in the enclosing scope.
fn execute_let(
    result: &mut Option<BindingValue>,
    ctx: &Context,
    scope: &Scope,
    statement: &Statement,
) -> Flow {
    let frame = BindingScope::with_outer(scope);
    let mut current = statement;
    while let Statement::Let { name, value, body } = current {
        let value = value
            .as_ref()
            .and_then(|value| evaluate_expression(ctx, scope, value).ok());
        frame.create_binding(name, value);
        match body.as_slice() {
            [inner @ Statement::Let { .. }] => current = inner,
            _ => return run(result, ctx, &frame, body),
        }
    }
    Flow::Done
}

/// The index in `body` where execution of a switch starts.
///
/// That is just after the first `case` equal to `expr`, or failing that just
/// after the first `default`, wherever it is.
fn find_matching_case(
    ctx: &Context,
    scope: &Scope,
    expr: &Expression,
    body: &[Statement],
) -> Option<usize> {
    let cases = body.iter().enumerate().filter_map(|(index, statement)| match statement {
        Statement::Case(case) => Some((index, case)),
        _ => None,
    });

    let matched = if expr.is_data_expression() {
        evaluate_data_expression(ctx, scope, expr).ok().and_then(|value| {
            cases.clone().find(|(_, case)| {
                evaluate_data_expression(ctx, scope, case).map_or(false, |case| case == value)
            })
        })
    } else {
        evaluate_numeric_expression(ctx, scope, expr).ok().and_then(|value| {
            cases.clone().find(|(_, case)| {
                evaluate_numeric_expression(ctx, scope, case).map_or(false, |case| case == value)
            })
        })
    };
    if let Some((index, _)) = matched {
        return Some(index + 1);
    }

    body.iter()
        .position(|statement| matches!(statement, Statement::Default))
        .map(|index| index + 1)
}
