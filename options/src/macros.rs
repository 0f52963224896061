//! Macros shared by the evaluator and the executor.

/// Logs at `error` and aborts, the `log fatal` contract.
macro_rules! fatal (
    ($($arg:tt)+) => ({
        error!($($arg)+);
        panic!($($arg)+);
    });
);

/// Reports an expression of the wrong kind handed to an evaluator entry point.
macro_rules! wrong_kind (
    ($entry:expr, $expr:expr) => ({
        let op = $expr.op_name();
        error!("{} opcode in evaluate_{}_expression", op, $entry);
        return Err($crate::error::EvalError::WrongKind { entry: $entry, op });
    });
);

/// Traces one evaluation step, the `DEBUG_EXPRESSIONS` output.
macro_rules! trace_eval (
    ($op:expr, $result:expr) => ({
        trace!("{}: {:?}", $op, $result);
    });
);
