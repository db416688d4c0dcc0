//! Static checks that run between parsing and execution: name resolution,
//! type checking, mutability enforcement, and unused-binding warnings.

use crate::{
    ast::{
        AssignOp, BinaryOp, Expr, ExprKind, FunctionDecl, Literal, Program, Stmt, StmtKind,
        TypeExpr, UnaryOp,
    },
    diagnostics::{Diagnostic, DiagnosticKind, SourceSpan},
    symbols::{Scope, ScopeKind, Symbol, SymbolKind, SymbolTable},
    types::Type,
};

/// Analyze a whole program. The result holds every diagnostic found;
/// callers decide whether warnings alone are acceptable.
pub fn analyze(program: &Program) -> Vec<Diagnostic> {
    let mut analyzer = SemanticAnalyzer::new();
    analyzer.run(program);
    analyzer.diagnostics
}

struct SemanticAnalyzer {
    table: SymbolTable,
    diagnostics: Vec<Diagnostic>,
    // Declared return types of the functions currently being analyzed.
    return_types: Vec<Type>,
}

impl SemanticAnalyzer {
    fn new() -> Self {
        let mut analyzer = Self {
            table: SymbolTable::new(),
            diagnostics: Vec::new(),
            return_types: Vec::new(),
        };
        analyzer.install_builtins();
        analyzer
    }

    fn install_builtins(&mut self) {
        let builtins = [
            ("print", vec![Type::Any], Type::Void),
            ("println", vec![Type::Any], Type::Void),
            ("to_string", vec![Type::Any], Type::Str),
            ("read_line", vec![], Type::Str),
            ("read_int", vec![], Type::Int),
        ];
        for (name, params, ret) in builtins {
            let defined = self.table.define(Symbol {
                name: name.to_string(),
                ty: Type::Function(params, Box::new(ret)),
                kind: SymbolKind::Function,
                mutable: false,
                used: true,
                span: None,
            });
            debug_assert!(defined.is_ok());
        }
    }

    fn run(&mut self, program: &Program) {
        for stmt in &program.items {
            self.visit_stmt(stmt);
        }
        if let Some(symbol) = self.table.resolve("main") {
            if symbol.kind != SymbolKind::Function {
                let diag =
                    Diagnostic::new(DiagnosticKind::Semantic, "`main` must be a function");
                self.diagnostics
                    .push(match symbol.span {
                        Some(span) => diag.with_span(span),
                        None => diag,
                    });
            }
            self.table.mark_used("main");
        }
        for symbol in self.table.global_unused() {
            self.warn_unused(&symbol);
        }
    }

    fn error(&mut self, span: SourceSpan, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::new(DiagnosticKind::Semantic, message).with_span(span));
    }

    fn report_unused(&mut self, scope: &Scope) {
        let unused: Vec<Symbol> = scope.unused().cloned().collect();
        for symbol in &unused {
            self.warn_unused(symbol);
        }
    }

    fn warn_unused(&mut self, symbol: &Symbol) {
        let what = match symbol.kind {
            SymbolKind::Parameter => "parameter",
            _ => "variable",
        };
        let diag = Diagnostic::warning(
            DiagnosticKind::Semantic,
            format!("unused {what} `{}`", symbol.name),
        );
        self.diagnostics.push(match symbol.span {
            Some(span) => diag.with_span(span),
            None => diag,
        });
    }

    fn resolve_annotation(&mut self, annotation: &TypeExpr) -> Type {
        match Type::from_name(&annotation.name) {
            Some(Type::Struct(name)) if !self.table.struct_exists(&name) => {
                self.error(annotation.span, format!("unknown type `{name}`"));
                Type::Unknown
            }
            Some(ty) => ty,
            None => {
                self.error(
                    annotation.span,
                    format!("unknown type `{}`", annotation.name),
                );
                Type::Unknown
            }
        }
    }

    fn visit_block(&mut self, kind: ScopeKind, body: &[Stmt]) {
        self.table.enter_scope(kind);
        for stmt in body {
            self.visit_stmt(stmt);
        }
        let scope = self.table.exit_scope();
        self.report_unused(&scope);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Let {
                name,
                mutable,
                annotation,
                initializer,
            } => {
                let init_ty = self.visit_expr(initializer);
                let declared = match annotation {
                    Some(annotation) => {
                        let declared = self.resolve_annotation(annotation);
                        if !init_ty.is_compatible_with(&declared) {
                            self.error(
                                initializer.span,
                                format!(
                                    "cannot initialize `{name}` of type `{declared}` with `{init_ty}`"
                                ),
                            );
                        }
                        declared
                    }
                    None => init_ty,
                };
                let result = self.table.define(Symbol {
                    name: name.clone(),
                    ty: declared,
                    kind: SymbolKind::Variable,
                    mutable: *mutable,
                    used: false,
                    span: Some(stmt.span),
                });
                if result.is_err() {
                    self.error(
                        stmt.span,
                        format!("`{name}` is already defined in this scope"),
                    );
                }
            }
            StmtKind::Function(decl) => self.visit_function(decl),
            StmtKind::Struct { name, fields } => {
                for field in fields {
                    self.resolve_annotation(&field.annotation);
                }
                if !self.table.define_struct(name, fields.clone()) {
                    self.error(stmt.span, format!("struct `{name}` is already defined"));
                }
            }
            StmtKind::Impl { target, methods } => {
                if !self.table.struct_exists(target) {
                    self.error(stmt.span, format!("cannot impl unknown type `{target}`"));
                }
                self.table.enter_scope(ScopeKind::Impl);
                for method in methods {
                    self.visit_function(method);
                }
                let scope = self.table.exit_scope();
                self.report_unused(&scope);
            }
            StmtKind::Module { items, .. } => {
                self.visit_block(ScopeKind::Module, items);
            }
            StmtKind::Expr(expr) => {
                self.visit_expr(expr);
            }
            StmtKind::Block(items) => self.visit_block(ScopeKind::Block, items),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_condition(condition, "if");
                self.visit_block(ScopeKind::Block, then_branch);
                if let Some(branch) = else_branch {
                    self.visit_block(ScopeKind::Block, branch);
                }
            }
            StmtKind::While { condition, body } => {
                self.check_condition(condition, "while");
                self.visit_block(ScopeKind::Loop, body);
            }
            StmtKind::For {
                binding,
                iterable,
                body,
            } => {
                let iterable_ty = self.visit_expr(iterable);
                let element = match iterable_ty.element() {
                    Some(element) => element,
                    None => {
                        self.error(
                            iterable.span,
                            format!("cannot iterate over `{iterable_ty}`"),
                        );
                        Type::Unknown
                    }
                };
                self.table.enter_scope(ScopeKind::Loop);
                let defined = self.table.define(Symbol {
                    name: binding.clone(),
                    ty: element,
                    kind: SymbolKind::Variable,
                    mutable: false,
                    used: false,
                    span: Some(stmt.span),
                });
                debug_assert!(defined.is_ok());
                for item in body {
                    self.visit_stmt(item);
                }
                let scope = self.table.exit_scope();
                self.report_unused(&scope);
            }
            StmtKind::Return(value) => {
                if !self.table.in_function() {
                    self.error(stmt.span, "`return` outside of a function");
                    if let Some(expr) = value {
                        self.visit_expr(expr);
                    }
                    return;
                }
                let value_ty = match value {
                    Some(expr) => self.visit_expr(expr),
                    None => Type::Void,
                };
                if let Some(expected) = self.return_types.last().cloned() {
                    if !value_ty.is_compatible_with(&expected) {
                        self.error(
                            stmt.span,
                            format!("expected return type `{expected}`, found `{value_ty}`"),
                        );
                    }
                }
            }
        }
    }

    fn visit_function(&mut self, decl: &FunctionDecl) {
        let param_types: Vec<Type> = decl
            .params
            .iter()
            .map(|param| self.resolve_annotation(&param.annotation))
            .collect();
        let return_type = decl
            .return_type
            .as_ref()
            .map(|annotation| self.resolve_annotation(annotation))
            .unwrap_or(Type::Void);

        // The symbol exists before the body is analyzed so recursive
        // calls resolve.
        let result = self.table.define(Symbol {
            name: decl.name.clone(),
            ty: Type::Function(param_types.clone(), Box::new(return_type.clone())),
            kind: SymbolKind::Function,
            mutable: false,
            used: decl.name == "main",
            span: Some(decl.span),
        });
        if result.is_err() {
            self.error(
                decl.span,
                format!("`{}` is already defined in this scope", decl.name),
            );
        }

        self.table.enter_scope(ScopeKind::Function);
        for (param, ty) in decl.params.iter().zip(param_types) {
            let defined = self.table.define(Symbol {
                name: param.name.clone(),
                ty,
                kind: SymbolKind::Parameter,
                mutable: false,
                used: false,
                span: Some(param.span),
            });
            if defined.is_err() {
                self.error(
                    param.span,
                    format!("duplicate parameter `{}`", param.name),
                );
            }
        }
        self.return_types.push(return_type);
        for stmt in &decl.body {
            self.visit_stmt(stmt);
        }
        self.return_types.pop();
        let scope = self.table.exit_scope();
        self.report_unused(&scope);
    }

    fn check_condition(&mut self, condition: &Expr, construct: &str) {
        let ty = self.visit_expr(condition);
        if !ty.is_compatible_with(&Type::Bool) {
            self.error(
                condition.span,
                format!("`{construct}` condition must be `bool`, found `{ty}`"),
            );
        }
    }

    fn visit_expr(&mut self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::Literal(literal) => match literal {
                Literal::Int(_) => Type::Int,
                Literal::Float(_) => Type::Float,
                Literal::Bool(_) => Type::Bool,
                Literal::Str(_) => Type::Str,
            },
            ExprKind::Variable(name) => match self.table.resolve(name) {
                Some(symbol) => {
                    let ty = symbol.ty.clone();
                    self.table.mark_used(name);
                    ty
                }
                None => {
                    self.error(expr.span, format!("undefined variable `{name}`"));
                    Type::Unknown
                }
            },
            ExprKind::Binary { op, left, right } => {
                let left_ty = self.visit_expr(left);
                let right_ty = self.visit_expr(right);
                self.binary_type(*op, &left_ty, &right_ty, expr.span)
            }
            ExprKind::Unary { op, expr: operand } => {
                let ty = self.visit_expr(operand);
                match op {
                    UnaryOp::Negate => {
                        if !ty.is_numeric() {
                            self.error(operand.span, format!("cannot negate `{ty}`"));
                            Type::Unknown
                        } else {
                            ty
                        }
                    }
                    UnaryOp::Not => {
                        if !ty.is_compatible_with(&Type::Bool) {
                            self.error(operand.span, format!("`!` requires `bool`, found `{ty}`"));
                        }
                        Type::Bool
                    }
                }
            }
            ExprKind::Assign { op, target, value } => self.visit_assign(*op, target, value),
            ExprKind::Call { name, args } => self.visit_call(name, args, expr.span),
            ExprKind::ArrayLiteral(elements) => {
                let mut element_ty: Option<Type> = None;
                for element in elements {
                    let ty = self.visit_expr(element);
                    match &element_ty {
                        None => element_ty = Some(ty),
                        Some(current) if ty.is_compatible_with(current) => {}
                        Some(current) if current.is_compatible_with(&ty) => {
                            element_ty = Some(ty);
                        }
                        Some(current) => {
                            self.error(
                                element.span,
                                format!("array element `{ty}` does not match `{current}`"),
                            );
                        }
                    }
                }
                Type::Array(
                    Box::new(element_ty.unwrap_or(Type::Any)),
                    Some(elements.len()),
                )
            }
            ExprKind::Range { start, end } => {
                for bound in [start, end] {
                    let ty = self.visit_expr(bound);
                    if !ty.is_compatible_with(&Type::Int) {
                        self.error(bound.span, format!("range bounds must be `int`, found `{ty}`"));
                    }
                }
                Type::Range
            }
            ExprKind::Group(inner) => self.visit_expr(inner),
            ExprKind::Index { target, index } => {
                let target_ty = self.visit_expr(target);
                let index_ty = self.visit_expr(index);
                if !index_ty.is_compatible_with(&Type::Int) {
                    self.error(index.span, format!("index must be `int`, found `{index_ty}`"));
                }
                match &target_ty {
                    Type::Array(element, _) => (**element).clone(),
                    Type::Str => Type::Str,
                    Type::Any | Type::Unknown => Type::Any,
                    other => {
                        self.error(target.span, format!("cannot index `{other}`"));
                        Type::Unknown
                    }
                }
            }
        }
    }

    fn binary_type(&mut self, op: BinaryOp, left: &Type, right: &Type, span: SourceSpan) -> Type {
        match op {
            BinaryOp::Add
            | BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Mod
            | BinaryOp::Pow => match Type::arithmetic(op, left, right) {
                Ok(ty) => ty,
                Err(message) => {
                    self.error(span, message);
                    Type::Unknown
                }
            },
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::Less
            | BinaryOp::LessEqual
            | BinaryOp::Greater
            | BinaryOp::GreaterEqual => match Type::comparison(op, left, right) {
                Ok(ty) => ty,
                Err(message) => {
                    self.error(span, message);
                    Type::Bool
                }
            },
            BinaryOp::And | BinaryOp::Or => {
                if !left.is_compatible_with(&Type::Bool) || !right.is_compatible_with(&Type::Bool)
                {
                    self.error(span, "logical operators require `bool` operands");
                }
                Type::Bool
            }
        }
    }

    fn visit_assign(&mut self, op: AssignOp, target: &Expr, value: &Expr) -> Type {
        let value_ty = self.visit_expr(value);
        let target_ty = match &target.kind {
            ExprKind::Variable(name) => match self.table.resolve(name) {
                Some(symbol) => {
                    let (mutable, kind, ty) = (symbol.mutable, symbol.kind, symbol.ty.clone());
                    if !mutable {
                        self.error(
                            target.span,
                            format!("cannot assign to immutable variable `{name}`"),
                        );
                    }
                    if kind != SymbolKind::Variable && kind != SymbolKind::Parameter {
                        self.error(target.span, format!("`{name}` is not assignable"));
                    }
                    ty
                }
                None => {
                    self.error(target.span, format!("undefined variable `{name}`"));
                    Type::Unknown
                }
            },
            ExprKind::Index { .. } => {
                if let Some(name) = root_variable(target) {
                    if let Some(symbol) = self.table.resolve(name) {
                        if !symbol.mutable {
                            self.error(
                                target.span,
                                format!("cannot assign through immutable variable `{name}`"),
                            );
                        }
                    }
                }
                self.visit_expr(target)
            }
            _ => {
                self.error(target.span, "invalid assignment target");
                Type::Unknown
            }
        };
        let stored_ty = match op {
            AssignOp::Set => value_ty.clone(),
            AssignOp::Add => self.compound_type(BinaryOp::Add, &target_ty, &value_ty, value.span),
            AssignOp::Sub => self.compound_type(BinaryOp::Sub, &target_ty, &value_ty, value.span),
            AssignOp::Mul => self.compound_type(BinaryOp::Mul, &target_ty, &value_ty, value.span),
            AssignOp::Div => self.compound_type(BinaryOp::Div, &target_ty, &value_ty, value.span),
        };
        if !stored_ty.is_compatible_with(&target_ty) {
            self.error(
                value.span,
                format!("cannot assign `{stored_ty}` to target of type `{target_ty}`"),
            );
        }
        target_ty
    }

    fn compound_type(
        &mut self,
        op: BinaryOp,
        target: &Type,
        value: &Type,
        span: SourceSpan,
    ) -> Type {
        match Type::arithmetic(op, target, value) {
            Ok(ty) => ty,
            Err(message) => {
                self.error(span, message);
                Type::Unknown
            }
        }
    }

    fn visit_call(&mut self, name: &str, args: &[Expr], span: SourceSpan) -> Type {
        let signature = match self.table.resolve(name) {
            Some(symbol) => {
                if symbol.kind != SymbolKind::Function {
                    let ty = symbol.ty.clone();
                    self.error(span, format!("`{name}` is not a function"));
                    Some(ty)
                } else {
                    Some(symbol.ty.clone())
                }
            }
            None => {
                self.error(span, format!("undefined function `{name}`"));
                None
            }
        };
        self.table.mark_used(name);
        let (params, ret) = match signature {
            Some(Type::Function(params, ret)) => (params, *ret),
            _ => {
                for arg in args {
                    self.visit_expr(arg);
                }
                return Type::Unknown;
            }
        };
        if args.len() != params.len() {
            self.error(
                span,
                format!(
                    "`{name}` expects {} argument(s), found {}",
                    params.len(),
                    args.len()
                ),
            );
        }
        for (arg, expected) in args.iter().zip(&params) {
            let arg_ty = self.visit_expr(arg);
            if !arg_ty.is_compatible_with(expected) {
                self.error(
                    arg.span,
                    format!("expected `{expected}`, found `{arg_ty}`"),
                );
            }
        }
        for arg in args.iter().skip(params.len()) {
            self.visit_expr(arg);
        }
        ret
    }
}

/// The variable an index chain ultimately writes into, if any.
fn root_variable(expr: &Expr) -> Option<&str> {
    match &expr.kind {
        ExprKind::Variable(name) => Some(name),
        ExprKind::Index { target, .. } => root_variable(target),
        ExprKind::Group(inner) => root_variable(inner),
        _ => None,
    }
}
