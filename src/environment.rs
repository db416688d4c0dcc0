use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;

use crate::{
    diagnostics::{Diagnostic, DiagnosticKind, RavunError, SourceSpan},
    value::Value,
};

pub type EnvironmentRef = Rc<RefCell<Environment>>;

/// A lexical scope at runtime. Scopes form a chain through `enclosing`;
/// lookups and assignments walk outward until a slot is found.
#[derive(Debug, Default)]
pub struct Environment {
    enclosing: Option<EnvironmentRef>,
    slots: IndexMap<String, Slot>,
}

#[derive(Debug)]
struct Slot {
    value: Value,
    mutable: bool,
}

impl Environment {
    pub fn global() -> EnvironmentRef {
        Rc::new(RefCell::new(Environment::default()))
    }

    pub fn nested(enclosing: &EnvironmentRef) -> EnvironmentRef {
        Rc::new(RefCell::new(Environment {
            enclosing: Some(Rc::clone(enclosing)),
            slots: IndexMap::new(),
        }))
    }

    /// Create or shadow a slot in this scope.
    pub fn define(&mut self, name: String, value: Value, mutable: bool) {
        self.slots.insert(name, Slot { value, mutable });
    }

    pub fn lookup(env: &EnvironmentRef, name: &str, span: SourceSpan) -> Result<Value, RavunError> {
        let mut current = Rc::clone(env);
        loop {
            let enclosing = {
                let scope = current.borrow();
                if let Some(slot) = scope.slots.get(name) {
                    return Ok(slot.value.clone());
                }
                scope.enclosing.clone()
            };
            match enclosing {
                Some(parent) => current = parent,
                None => return Err(undefined(name, span)),
            }
        }
    }

    pub fn assign(
        env: &EnvironmentRef,
        name: &str,
        value: Value,
        span: SourceSpan,
    ) -> Result<(), RavunError> {
        let mut current = Rc::clone(env);
        loop {
            let enclosing = {
                let mut scope = current.borrow_mut();
                if let Some(slot) = scope.slots.get_mut(name) {
                    if !slot.mutable {
                        return Err(RavunError::from(
                            Diagnostic::new(
                                DiagnosticKind::Runtime,
                                format!("cannot assign to immutable binding `{name}`"),
                            )
                            .with_span(span),
                        ));
                    }
                    slot.value = value;
                    return Ok(());
                }
                scope.enclosing.clone()
            };
            match enclosing {
                Some(parent) => current = parent,
                None => return Err(undefined(name, span)),
            }
        }
    }
}

fn undefined(name: &str, span: SourceSpan) -> RavunError {
    RavunError::from(
        Diagnostic::new(
            DiagnosticKind::Runtime,
            format!("undefined variable `{name}`"),
        )
        .with_span(span),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> SourceSpan {
        SourceSpan::new(0, 0)
    }

    #[test]
    fn lookup_walks_the_chain() {
        let global = Environment::global();
        global
            .borrow_mut()
            .define("x".into(), Value::from(1), false);
        let inner = Environment::nested(&global);
        let found = Environment::lookup(&inner, "x", span()).unwrap();
        assert!(found.is_int());
    }

    #[test]
    fn assignment_respects_mutability() {
        let env = Environment::global();
        env.borrow_mut().define("a".into(), Value::from(1), true);
        env.borrow_mut().define("b".into(), Value::from(2), false);
        assert!(Environment::assign(&env, "a", Value::from(10), span()).is_ok());
        assert!(Environment::assign(&env, "b", Value::from(10), span()).is_err());
        assert!(Environment::assign(&env, "c", Value::from(10), span()).is_err());
    }
}
