use std::{fmt, rc::Rc};

use crate::{
    ast::Stmt,
    diagnostics::{Diagnostic, DiagnosticKind, RavunError, SourceSpan},
    environment::EnvironmentRef,
};

/// A runtime value. Cheap to clone; composite values share their
/// contents through the `Rc`.
#[derive(Clone)]
pub struct Value(pub Rc<ValueKind>);

#[derive(Clone)]
pub enum ValueKind {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Value>),
    Range(i64, i64),
    Function(UserFunction),
    NativeFunction(NativeFunction),
}

impl Value {
    pub fn unit() -> Self {
        ValueKind::Unit.into()
    }

    pub fn array(items: Vec<Value>) -> Self {
        ValueKind::Array(items).into()
    }

    pub fn range(start: i64, end: i64) -> Self {
        ValueKind::Range(start, end).into()
    }

    pub fn type_name(&self) -> &'static str {
        match &*self.0 {
            ValueKind::Unit => "void",
            ValueKind::Bool(_) => "bool",
            ValueKind::Int(_) => "int",
            ValueKind::Float(_) => "float",
            ValueKind::Str(_) => "string",
            ValueKind::Array(_) => "array",
            ValueKind::Range(..) => "range",
            ValueKind::Function(_) | ValueKind::NativeFunction(_) => "function",
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(&*self.0, ValueKind::Int(_))
    }

    /// The boolean inside, or a runtime diagnostic at `span`. Conditions
    /// are strict; there is no truthiness.
    pub fn as_bool(&self, span: SourceSpan) -> Result<bool, RavunError> {
        if let ValueKind::Bool(b) = &*self.0 {
            return Ok(*b);
        }
        Err(RavunError::from(
            Diagnostic::new(
                DiagnosticKind::Runtime,
                format!("expected bool, found {}", self.type_name()),
            )
            .with_span(span),
        ))
    }
}

impl From<ValueKind> for Value {
    fn from(kind: ValueKind) -> Self {
        Self(Rc::new(kind))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        ValueKind::Bool(value).into()
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        ValueKind::Int(value).into()
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        ValueKind::Float(value).into()
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        ValueKind::Str(value).into()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        ValueKind::Str(value.to_string()).into()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ValueKind::Unit => f.write_str("void"),
            ValueKind::Bool(b) => write!(f, "{b}"),
            ValueKind::Int(n) => write!(f, "{n}"),
            ValueKind::Float(n) => write!(f, "{n}"),
            ValueKind::Str(s) => f.write_str(s),
            ValueKind::Array(items) => {
                let rendered: Vec<String> = items.iter().map(Value::to_string).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            ValueKind::Range(start, end) => write!(f, "{start}..{end}"),
            ValueKind::Function(fun) => write!(f, "<fn {}>", fun.name),
            ValueKind::NativeFunction(fun) => write!(f, "<native fn {}>", fun.name),
        }
    }
}

// Debug only differs from Display for strings, which keep their quotes.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ValueKind::Str(s) => write!(f, "{s:?}"),
            ValueKind::Array(items) => f.debug_list().entries(items.iter()).finish(),
            _ => fmt::Display::fmt(self, f),
        }
    }
}

/// A function declared in Ravun source, closing over the environment it
/// was defined in.
#[derive(Clone)]
pub struct UserFunction {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub env: EnvironmentRef,
}

#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub handler: fn(&[Value]) -> Result<Value, RavunError>,
}

impl NativeFunction {
    pub fn invoke(&self, args: &[Value]) -> Result<Value, RavunError> {
        if args.len() != self.arity {
            return Err(RavunError::from(Diagnostic::new(
                DiagnosticKind::Runtime,
                format!(
                    "`{}` takes {} argument(s), received {}",
                    self.name,
                    self.arity,
                    args.len()
                ),
            )));
        }
        (self.handler)(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_composites() {
        let value = Value::array(vec![Value::from(1), Value::from("two"), Value::range(0, 3)]);
        assert_eq!(value.to_string(), "[1, two, 0..3]");
        assert_eq!(format!("{value:?}"), "[1, \"two\", 0..3]");
    }

    #[test]
    fn as_bool_is_strict() {
        assert!(Value::from(true).as_bool(SourceSpan::new(0, 0)).unwrap());
        assert!(Value::from(1).as_bool(SourceSpan::new(0, 0)).is_err());
    }
}
