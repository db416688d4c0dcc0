//! Built-in functions installed into the global environment. The set
//! mirrors what the semantic analyzer registers, so a program that
//! passes the checker never hits a missing builtin at runtime.

use std::io::{self, BufRead, Write};

use crate::{
    diagnostics::{Diagnostic, DiagnosticKind, RavunError, Result},
    environment::EnvironmentRef,
    value::{NativeFunction, Value, ValueKind},
};

pub fn install(env: &EnvironmentRef) {
    let mut scope = env.borrow_mut();
    scope.define("print".into(), native("print", 1, io_print), false);
    scope.define("println".into(), native("println", 1, io_println), false);
    scope.define(
        "to_string".into(),
        native("to_string", 1, core_to_string),
        false,
    );
    scope.define(
        "read_line".into(),
        native("read_line", 0, io_read_line),
        false,
    );
    scope.define("read_int".into(), native("read_int", 0, io_read_int), false);
}

fn native(name: &'static str, arity: usize, handler: fn(&[Value]) -> Result<Value>) -> Value {
    Value::from(ValueKind::NativeFunction(NativeFunction {
        name,
        arity,
        handler,
    }))
}

fn io_print(args: &[Value]) -> Result<Value> {
    print!("{}", args[0]);
    io::stdout().flush().map_err(RavunError::from)?;
    Ok(Value::unit())
}

fn io_println(args: &[Value]) -> Result<Value> {
    println!("{}", args[0]);
    Ok(Value::unit())
}

fn core_to_string(args: &[Value]) -> Result<Value> {
    Ok(Value::from(args[0].to_string()))
}

fn io_read_line(_args: &[Value]) -> Result<Value> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Value::from(line))
}

fn io_read_int(args: &[Value]) -> Result<Value> {
    let line = io_read_line(args)?;
    let text = match &*line.0 {
        ValueKind::Str(s) => s.trim().to_string(),
        _ => String::new(),
    };
    text.parse::<i64>().map(Value::from).map_err(|_| {
        RavunError::from(Diagnostic::new(
            DiagnosticKind::Runtime,
            format!("`read_int` could not parse `{text}` as int"),
        ))
    })
}
