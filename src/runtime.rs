use std::rc::Rc;

use crate::{
    ast::{AssignOp, BinaryOp, Expr, ExprKind, Literal, Program, Stmt, StmtKind, UnaryOp},
    diagnostics::{Diagnostic, DiagnosticKind, RavunError, Result, SourceSpan},
    environment::{Environment, EnvironmentRef},
    parser,
    value::{UserFunction, Value, ValueKind},
};

pub struct Interpreter {
    env: EnvironmentRef,
}

impl Interpreter {
    pub fn new() -> Self {
        let env = Environment::global();
        let interpreter = Self { env };
        crate::stdlib::install(&interpreter.env);
        interpreter
    }

    /// Parse and execute a snippet, returning the value of its last
    /// expression statement. Used by the REPL and `eval`; does not call
    /// `main`.
    pub fn eval_source(&mut self, source: &str) -> Result<Value> {
        let program = parser::parse_program(source).map_err(RavunError::Compile)?;
        self.eval_program(&program)
    }

    pub fn eval_program(&mut self, program: &Program) -> Result<Value> {
        let mut last_value: Option<Value> = None;
        for stmt in &program.items {
            match self.execute_statement(stmt)? {
                FlowControl::Next => {}
                FlowControl::NextValue(value) => {
                    last_value = Some(value);
                }
                FlowControl::Return(value) => return Ok(value),
            }
        }
        Ok(last_value.unwrap_or_else(Value::unit))
    }

    /// Execute a full program: top-level statements run in order, then
    /// `main` is called if the program defined one.
    pub fn run_program(&mut self, program: &Program) -> Result<Value> {
        let value = self.eval_program(program)?;
        let main = Environment::lookup(&self.env, "main", SourceSpan::new(0, 0)).ok();
        if let Some(main) = main {
            if let ValueKind::Function(_) = &*main.0 {
                log::debug!("calling main()");
                return self.call(main, Vec::new(), SourceSpan::new(0, 0));
            }
        }
        Ok(value)
    }

    fn execute_statement(&mut self, stmt: &Stmt) -> Result<FlowControl> {
        match &stmt.kind {
            StmtKind::Let {
                name,
                mutable,
                initializer,
                ..
            } => {
                let value = self.evaluate(initializer)?;
                self.env.borrow_mut().define(name.clone(), value, *mutable);
                Ok(FlowControl::Next)
            }
            StmtKind::Function(decl) => {
                self.define_function(decl);
                Ok(FlowControl::Next)
            }
            // Struct layouts only matter to the checker.
            StmtKind::Struct { .. } => Ok(FlowControl::Next),
            StmtKind::Impl { methods, .. } => {
                let child = Environment::nested(&self.env);
                let prev = std::mem::replace(&mut self.env, child);
                for method in methods {
                    self.define_function(method);
                }
                self.env = prev;
                Ok(FlowControl::Next)
            }
            StmtKind::Module { items, .. } => {
                let child = Environment::nested(&self.env);
                let prev = std::mem::replace(&mut self.env, child);
                let mut result = Ok(FlowControl::Next);
                for item in items {
                    match self.execute_statement(item) {
                        Ok(FlowControl::Next | FlowControl::NextValue(_)) => {}
                        other => {
                            result = other;
                            break;
                        }
                    }
                }
                self.env = prev;
                result
            }
            StmtKind::Expr(expr) => {
                let value = self.evaluate(expr)?;
                Ok(FlowControl::NextValue(value))
            }
            StmtKind::Block(statements) => self.execute_block(statements),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let chosen = if self.condition(condition)? {
                    Some(then_branch)
                } else {
                    else_branch.as_ref()
                };
                match chosen {
                    Some(branch) => self.execute_block(branch),
                    None => Ok(FlowControl::Next),
                }
            }
            StmtKind::While { condition, body } => {
                while self.condition(condition)? {
                    match self.execute_block(body)? {
                        FlowControl::Next | FlowControl::NextValue(_) => {}
                        FlowControl::Return(value) => return Ok(FlowControl::Return(value)),
                    }
                }
                Ok(FlowControl::Next)
            }
            StmtKind::For {
                binding,
                iterable,
                body,
            } => {
                let iterable_value = self.evaluate(iterable)?;
                for item in self.iterate(iterable_value, iterable.span)? {
                    let child = Environment::nested(&self.env);
                    child.borrow_mut().define(binding.clone(), item, false);
                    let prev = std::mem::replace(&mut self.env, child);
                    let flow = self.execute_block(body);
                    self.env = prev;
                    match flow? {
                        FlowControl::Next | FlowControl::NextValue(_) => {}
                        FlowControl::Return(value) => return Ok(FlowControl::Return(value)),
                    }
                }
                Ok(FlowControl::Next)
            }
            StmtKind::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::unit(),
                };
                Ok(FlowControl::Return(value))
            }
        }
    }

    fn define_function(&mut self, decl: &crate::ast::FunctionDecl) {
        let params = decl.params.iter().map(|p| p.name.clone()).collect();
        let function = UserFunction {
            name: decl.name.clone(),
            params,
            body: decl.body.clone(),
            env: Rc::clone(&self.env),
        };
        self.env.borrow_mut().define(
            decl.name.clone(),
            Value::from(ValueKind::Function(function)),
            false,
        );
    }

    fn condition(&mut self, expr: &Expr) -> Result<bool> {
        let value = self.evaluate(expr)?;
        value.as_bool(expr.span)
    }

    fn execute_block(&mut self, statements: &[Stmt]) -> Result<FlowControl> {
        let child = Environment::nested(&self.env);
        let prev = std::mem::replace(&mut self.env, child);
        let mut last_value: Option<Value> = None;
        for stmt in statements {
            let flow = match self.execute_statement(stmt) {
                Ok(flow) => flow,
                Err(err) => {
                    self.env = prev;
                    return Err(err);
                }
            };
            match flow {
                FlowControl::Next => {}
                FlowControl::NextValue(value) => {
                    last_value = Some(value);
                }
                other => {
                    self.env = prev;
                    return Ok(other);
                }
            }
        }
        self.env = prev;
        if let Some(value) = last_value {
            Ok(FlowControl::NextValue(value))
        } else {
            Ok(FlowControl::Next)
        }
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(literal(lit)),
            ExprKind::Variable(name) => Environment::lookup(&self.env, name, expr.span),
            ExprKind::Binary { op, left, right } => match op {
                // && and || evaluate their right side lazily.
                BinaryOp::And => {
                    if !self.condition(left)? {
                        return Ok(Value::from(false));
                    }
                    Ok(Value::from(self.condition(right)?))
                }
                BinaryOp::Or => {
                    if self.condition(left)? {
                        return Ok(Value::from(true));
                    }
                    Ok(Value::from(self.condition(right)?))
                }
                _ => {
                    let left_value = self.evaluate(left)?;
                    let right_value = self.evaluate(right)?;
                    binary(*op, left_value, right_value, expr.span)
                }
            },
            ExprKind::Unary { op, expr: right } => {
                let value = self.evaluate(right)?;
                unary(*op, value, right.span)
            }
            ExprKind::Assign { op, target, value } => {
                let mut new_value = self.evaluate(value)?;
                if let Some(op) = arithmetic_of(*op) {
                    let current = self.evaluate(target)?;
                    new_value = binary(op, current, new_value, value.span)?;
                }
                match &target.kind {
                    ExprKind::Variable(name) => {
                        Environment::assign(&self.env, name, new_value.clone(), target.span)?;
                        Ok(new_value)
                    }
                    ExprKind::Index {
                        target: owner,
                        index,
                    } => {
                        self.assign_index(owner, index, new_value.clone())?;
                        Ok(new_value)
                    }
                    _ => Err(RavunError::from(
                        Diagnostic::new(DiagnosticKind::Runtime, "invalid assignment target")
                            .with_span(target.span),
                    )),
                }
            }
            ExprKind::Call { name, args } => {
                let callee = Environment::lookup(&self.env, name, expr.span)?;
                let mut eval_args = Vec::new();
                for arg in args {
                    eval_args.push(self.evaluate(arg)?);
                }
                self.call(callee, eval_args, expr.span)
            }
            ExprKind::ArrayLiteral(elements) => {
                let mut values = Vec::new();
                for element in elements {
                    values.push(self.evaluate(element)?);
                }
                Ok(Value::array(values))
            }
            ExprKind::Range { start, end } => {
                let start_value = self.expect_int(start)?;
                let end_value = self.expect_int(end)?;
                Ok(Value::range(start_value, end_value))
            }
            ExprKind::Group(inner) => self.evaluate(inner),
            ExprKind::Index { target, index } => {
                let target_value = self.evaluate(target)?;
                let index_value = self.evaluate(index)?;
                index_value_of(target_value, index_value, expr.span)
            }
        }
    }

    fn expect_int(&mut self, expr: &Expr) -> Result<i64> {
        let value = self.evaluate(expr)?;
        match &*value.0 {
            ValueKind::Int(n) => Ok(*n),
            _ => Err(RavunError::from(
                Diagnostic::new(
                    DiagnosticKind::Runtime,
                    format!("expected int, found {}", value.type_name()),
                )
                .with_span(expr.span),
            )),
        }
    }

    fn call(&mut self, callee: Value, args: Vec<Value>, span: SourceSpan) -> Result<Value> {
        match &*callee.0 {
            ValueKind::NativeFunction(fun) => fun.invoke(&args),
            ValueKind::Function(fun) => {
                if args.len() != fun.params.len() {
                    return Err(RavunError::from(
                        Diagnostic::new(
                            DiagnosticKind::Runtime,
                            format!(
                                "function `{}` expected {} arguments but received {}",
                                fun.name,
                                fun.params.len(),
                                args.len()
                            ),
                        )
                        .with_span(span),
                    ));
                }
                let new_env = Environment::nested(&fun.env);
                for (name, value) in fun.params.iter().zip(args) {
                    new_env.borrow_mut().define(name.clone(), value, false);
                }
                let body = fun.body.clone();
                let prev = std::mem::replace(&mut self.env, new_env);
                let mut result = Value::unit();
                for stmt in &body {
                    match self.execute_statement(stmt) {
                        Ok(FlowControl::Next) => {}
                        Ok(FlowControl::NextValue(value)) => {
                            result = value;
                        }
                        Ok(FlowControl::Return(value)) => {
                            result = value;
                            break;
                        }
                        Err(err) => {
                            self.env = prev;
                            return Err(err);
                        }
                    }
                }
                self.env = prev;
                Ok(result)
            }
            _ => Err(RavunError::from(
                Diagnostic::new(DiagnosticKind::Runtime, "value is not callable").with_span(span),
            )),
        }
    }

    fn assign_index(&mut self, target: &Expr, index: &Expr, value: Value) -> Result<()> {
        let target_value = self.evaluate(target)?;
        match &*target_value.0 {
            ValueKind::Array(elements) => {
                let idx = self.expect_int(index)?;
                if idx < 0 || idx as usize >= elements.len() {
                    return Err(RavunError::from(
                        Diagnostic::new(
                            DiagnosticKind::Runtime,
                            format!("index {idx} out of bounds"),
                        )
                        .with_span(index.span),
                    ));
                }
                let mut new_elements = elements.clone();
                new_elements[idx as usize] = value;
                self.write_back(target, Value::array(new_elements))
            }
            _ => Err(RavunError::from(
                Diagnostic::new(
                    DiagnosticKind::Runtime,
                    "index assignment expects array target",
                )
                .with_span(target.span),
            )),
        }
    }

    // Arrays are immutable values behind Rc, so an element write clones
    // the array and re-binds it up the index chain.
    fn write_back(&mut self, target: &Expr, new_value: Value) -> Result<()> {
        match &target.kind {
            ExprKind::Variable(name) => {
                Environment::assign(&self.env, name, new_value, target.span)
            }
            ExprKind::Index {
                target: owner,
                index,
            } => {
                let owner_value = self.evaluate(owner)?;
                match &*owner_value.0 {
                    ValueKind::Array(elements) => {
                        let idx = self.expect_int(index)?;
                        if idx < 0 || idx as usize >= elements.len() {
                            return Err(RavunError::from(
                                Diagnostic::new(
                                    DiagnosticKind::Runtime,
                                    format!("index {idx} out of bounds"),
                                )
                                .with_span(index.span),
                            ));
                        }
                        let mut new_array = elements.clone();
                        new_array[idx as usize] = new_value;
                        self.write_back(owner, Value::array(new_array))
                    }
                    _ => Err(RavunError::from(
                        Diagnostic::new(
                            DiagnosticKind::Runtime,
                            "index assignment expects array target",
                        )
                        .with_span(target.span),
                    )),
                }
            }
            _ => Err(RavunError::from(
                Diagnostic::new(
                    DiagnosticKind::Runtime,
                    "cannot assign to computed expression",
                )
                .with_span(target.span),
            )),
        }
    }

    fn iterate(&self, value: Value, span: SourceSpan) -> Result<Vec<Value>> {
        match &*value.0 {
            ValueKind::Range(start, end) => Ok((*start..*end).map(Value::from).collect()),
            ValueKind::Array(values) => Ok(values.clone()),
            ValueKind::Str(text) => {
                Ok(text.chars().map(|c| Value::from(c.to_string())).collect())
            }
            _ => Err(RavunError::from(
                Diagnostic::new(
                    DiagnosticKind::Runtime,
                    format!("cannot iterate over {}", value.type_name()),
                )
                .with_span(span),
            )),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn literal(literal: &Literal) -> Value {
    match literal {
        Literal::Int(n) => Value::from(*n),
        Literal::Float(n) => Value::from(*n),
        Literal::Bool(b) => Value::from(*b),
        Literal::Str(s) => Value::from(s.clone()),
    }
}

fn arithmetic_of(op: AssignOp) -> Option<BinaryOp> {
    match op {
        AssignOp::Set => None,
        AssignOp::Add => Some(BinaryOp::Add),
        AssignOp::Sub => Some(BinaryOp::Sub),
        AssignOp::Mul => Some(BinaryOp::Mul),
        AssignOp::Div => Some(BinaryOp::Div),
    }
}

fn binary(op: BinaryOp, left: Value, right: Value, span: SourceSpan) -> Result<Value> {
    use BinaryOp::*;
    match op {
        Add => {
            if let (ValueKind::Str(a), ValueKind::Str(b)) = (&*left.0, &*right.0) {
                return Ok(Value::from(format!("{a}{b}")));
            }
            numeric(left, right, span, i64::checked_add, |a, b| a + b)
        }
        Sub => numeric(left, right, span, i64::checked_sub, |a, b| a - b),
        Mul => numeric(left, right, span, i64::checked_mul, |a, b| a * b),
        Div => numeric(left, right, span, i64::checked_div, |a, b| a / b),
        Mod => numeric(left, right, span, i64::checked_rem, |a, b| a % b),
        Pow => power(left, right, span),
        Equal => Ok(Value::from(equal(&left, &right))),
        NotEqual => Ok(Value::from(!equal(&left, &right))),
        Less => comparison(left, right, span, |o| o == std::cmp::Ordering::Less),
        LessEqual => comparison(left, right, span, |o| o != std::cmp::Ordering::Greater),
        Greater => comparison(left, right, span, |o| o == std::cmp::Ordering::Greater),
        GreaterEqual => comparison(left, right, span, |o| o != std::cmp::Ordering::Less),
        And | Or => unreachable!("short-circuit operators are handled by the evaluator"),
    }
}

fn unary(op: UnaryOp, value: Value, span: SourceSpan) -> Result<Value> {
    match op {
        UnaryOp::Negate => match &*value.0 {
            ValueKind::Int(n) => n.checked_neg().map(Value::from).ok_or_else(|| {
                RavunError::from(
                    Diagnostic::new(DiagnosticKind::Runtime, "integer arithmetic error")
                        .with_span(span)
                        .with_note("overflow"),
                )
            }),
            ValueKind::Float(n) => Ok(Value::from(-n)),
            _ => Err(RavunError::from(
                Diagnostic::new(DiagnosticKind::Runtime, "unary `-` expects a numeric value")
                    .with_span(span),
            )),
        },
        UnaryOp::Not => Ok(Value::from(!value.as_bool(span)?)),
    }
}

/// int op int stays int; any float operand promotes both sides.
fn numeric<I, F>(left: Value, right: Value, span: SourceSpan, int_op: I, float_op: F) -> Result<Value>
where
    I: Fn(i64, i64) -> Option<i64>,
    F: Fn(f64, f64) -> f64,
{
    match (&*left.0, &*right.0) {
        (ValueKind::Int(a), ValueKind::Int(b)) => {
            int_op(*a, *b).map(Value::from).ok_or_else(|| {
                RavunError::from(
                    Diagnostic::new(DiagnosticKind::Runtime, "integer arithmetic error")
                        .with_span(span)
                        .with_note(if *b == 0 {
                            "division by zero".to_string()
                        } else {
                            "overflow".to_string()
                        }),
                )
            })
        }
        (ValueKind::Int(a), ValueKind::Float(b)) => Ok(Value::from(float_op(*a as f64, *b))),
        (ValueKind::Float(a), ValueKind::Int(b)) => Ok(Value::from(float_op(*a, *b as f64))),
        (ValueKind::Float(a), ValueKind::Float(b)) => Ok(Value::from(float_op(*a, *b))),
        _ => Err(RavunError::from(
            Diagnostic::new(
                DiagnosticKind::Runtime,
                format!(
                    "cannot apply arithmetic to {} and {}",
                    left.type_name(),
                    right.type_name()
                ),
            )
            .with_span(span),
        )),
    }
}

fn power(left: Value, right: Value, span: SourceSpan) -> Result<Value> {
    match (&*left.0, &*right.0) {
        (ValueKind::Int(base), ValueKind::Int(exp)) if *exp >= 0 => {
            let exp = u32::try_from(*exp).ok().and_then(|e| base.checked_pow(e));
            exp.map(Value::from).ok_or_else(|| {
                RavunError::from(
                    Diagnostic::new(DiagnosticKind::Runtime, "integer arithmetic error")
                        .with_span(span)
                        .with_note("overflow"),
                )
            })
        }
        // int ^ int stays int, so negative exponents are rejected rather
        // than promoted to float.
        (ValueKind::Int(_), ValueKind::Int(_)) => Err(RavunError::from(
            Diagnostic::new(DiagnosticKind::Runtime, "integer arithmetic error")
                .with_span(span)
                .with_note("negative exponent"),
        )),
        (ValueKind::Int(a), ValueKind::Float(b)) => Ok(Value::from((*a as f64).powf(*b))),
        (ValueKind::Float(a), ValueKind::Int(b)) => Ok(Value::from(a.powf(*b as f64))),
        (ValueKind::Float(a), ValueKind::Float(b)) => Ok(Value::from(a.powf(*b))),
        _ => Err(RavunError::from(
            Diagnostic::new(
                DiagnosticKind::Runtime,
                format!(
                    "cannot apply `^` to {} and {}",
                    left.type_name(),
                    right.type_name()
                ),
            )
            .with_span(span),
        )),
    }
}

fn comparison<F>(left: Value, right: Value, span: SourceSpan, check: F) -> Result<Value>
where
    F: Fn(std::cmp::Ordering) -> bool,
{
    let ordering = match (&*left.0, &*right.0) {
        (ValueKind::Int(a), ValueKind::Int(b)) => a.cmp(b),
        (ValueKind::Str(a), ValueKind::Str(b)) => a.cmp(b),
        (ValueKind::Int(a), ValueKind::Float(b)) => {
            (*a as f64).partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
        }
        (ValueKind::Float(a), ValueKind::Int(b)) => a
            .partial_cmp(&(*b as f64))
            .unwrap_or(std::cmp::Ordering::Equal),
        (ValueKind::Float(a), ValueKind::Float(b)) => {
            a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
        }
        _ => {
            return Err(RavunError::from(
                Diagnostic::new(
                    DiagnosticKind::Runtime,
                    format!(
                        "cannot compare {} and {}",
                        left.type_name(),
                        right.type_name()
                    ),
                )
                .with_span(span),
            ));
        }
    };
    Ok(Value::from(check(ordering)))
}

fn equal(left: &Value, right: &Value) -> bool {
    match (&*left.0, &*right.0) {
        (ValueKind::Unit, ValueKind::Unit) => true,
        (ValueKind::Bool(a), ValueKind::Bool(b)) => a == b,
        (ValueKind::Int(a), ValueKind::Int(b)) => a == b,
        (ValueKind::Int(a), ValueKind::Float(b)) | (ValueKind::Float(b), ValueKind::Int(a)) => {
            (*a as f64 - *b).abs() < f64::EPSILON
        }
        (ValueKind::Float(a), ValueKind::Float(b)) => (*a - *b).abs() < f64::EPSILON,
        (ValueKind::Str(a), ValueKind::Str(b)) => a == b,
        (ValueKind::Range(a, b), ValueKind::Range(c, d)) => a == c && b == d,
        (ValueKind::Array(a), ValueKind::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(l, r)| equal(l, r))
        }
        _ => false,
    }
}

fn index_value_of(target: Value, index: Value, span: SourceSpan) -> Result<Value> {
    match (&*target.0, &*index.0) {
        (ValueKind::Array(values), ValueKind::Int(idx)) => {
            usize::try_from(*idx)
                .ok()
                .and_then(|idx| values.get(idx).cloned())
                .ok_or_else(|| {
                    RavunError::from(
                        Diagnostic::new(
                            DiagnosticKind::Runtime,
                            format!("index {idx} out of bounds"),
                        )
                        .with_span(span),
                    )
                })
        }
        (ValueKind::Str(text), ValueKind::Int(idx)) => usize::try_from(*idx)
            .ok()
            .and_then(|idx| text.chars().nth(idx))
            .map(|ch| Value::from(ch.to_string()))
            .ok_or_else(|| {
                RavunError::from(
                    Diagnostic::new(
                        DiagnosticKind::Runtime,
                        format!("index {idx} out of bounds"),
                    )
                    .with_span(span),
                )
            }),
        _ => Err(RavunError::from(
            Diagnostic::new(
                DiagnosticKind::Runtime,
                "indexing expects an array or string target with an int index",
            )
            .with_span(span),
        )),
    }
}

enum FlowControl {
    Next,
    NextValue(Value),
    Return(Value),
}
