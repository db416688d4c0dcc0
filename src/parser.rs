use crate::{
    ast::{
        AssignOp, BinaryOp, Expr, ExprKind, Field, FunctionDecl, Literal, Param, Program, Stmt,
        StmtKind, TypeExpr, UnaryOp,
    },
    diagnostics::{Diagnostic, DiagnosticKind, SourceSpan},
    lexer::{Keyword, Lexer, Token, TokenKind},
};

/// Parse a whole source text, collecting every diagnostic instead of
/// stopping at the first. Recovery skips to the next statement boundary.
pub fn parse_program(source: &str) -> Result<Program, Vec<Diagnostic>> {
    let tokens = match Lexer::new(source).tokenize() {
        Ok(tokens) => tokens,
        Err(diag) => return Err(vec![diag]),
    };
    let mut parser = Parser::new(tokens);
    let mut items = Vec::new();
    let mut diagnostics = Vec::new();
    while !parser.check(TokenKind::Eof) {
        match parser.parse_statement() {
            Ok(stmt) => items.push(stmt),
            Err(diag) => {
                diagnostics.push(diag);
                parser.synchronize();
            }
        }
    }
    if diagnostics.is_empty() {
        Ok(Program { items })
    } else {
        Err(diagnostics)
    }
}

struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Skip to the next statement boundary after a parse error.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            if self.matches(TokenKind::Semicolon) {
                return;
            }
            if let Some(Token {
                kind: TokenKind::Keyword(keyword),
                ..
            }) = self.peek()
            {
                match keyword {
                    Keyword::Let
                    | Keyword::Fn
                    | Keyword::Struct
                    | Keyword::Impl
                    | Keyword::Mod
                    | Keyword::If
                    | Keyword::While
                    | Keyword::For
                    | Keyword::Return => return,
                    _ => {}
                }
            }
            self.advance();
        }
    }

    fn parse_block_items(&mut self, terminator: TokenKind) -> Result<Vec<Stmt>, Diagnostic> {
        let mut items = Vec::new();
        while !self.check(terminator.clone()) && !self.check(TokenKind::Eof) {
            items.push(self.parse_statement()?);
        }
        self.consume(terminator, "expected `}` to close block")?;
        Ok(items)
    }

    fn parse_block(&mut self) -> Result<(Vec<Stmt>, SourceSpan), Diagnostic> {
        let lbrace = self.consume(TokenKind::LBrace, "expected `{` to start block")?;
        let start = lbrace.span.start;
        let items = self.parse_block_items(TokenKind::RBrace)?;
        let end = self.previous().span.end;
        Ok((items, SourceSpan { start, end }))
    }

    fn parse_statement(&mut self) -> Result<Stmt, Diagnostic> {
        if let Some(token) = self.peek() {
            match &token.kind {
                TokenKind::Keyword(Keyword::Let) => return self.parse_let(),
                TokenKind::Keyword(Keyword::Fn) => {
                    let decl = self.parse_function()?;
                    let span = decl.span;
                    return Ok(Stmt {
                        kind: StmtKind::Function(decl),
                        span,
                    });
                }
                TokenKind::Keyword(Keyword::Struct) => return self.parse_struct(),
                TokenKind::Keyword(Keyword::Impl) => return self.parse_impl(),
                TokenKind::Keyword(Keyword::Mod) => return self.parse_module(),
                TokenKind::Keyword(Keyword::If) => return self.parse_if(),
                TokenKind::Keyword(Keyword::While) => return self.parse_while(),
                TokenKind::Keyword(Keyword::For) => return self.parse_for(),
                TokenKind::Keyword(Keyword::Return) => return self.parse_return(),
                TokenKind::Keyword(
                    reserved @ (Keyword::Const
                    | Keyword::Pub
                    | Keyword::Async
                    | Keyword::Parallel
                    | Keyword::Match),
                ) => {
                    let message = format!(
                        "keyword `{}` is reserved and not yet supported",
                        format!("{reserved:?}").to_lowercase()
                    );
                    return Err(self.error(token, &message));
                }
                TokenKind::LBrace => {
                    let (items, span) = self.parse_block()?;
                    return Ok(Stmt {
                        kind: StmtKind::Block(items),
                        span,
                    });
                }
                _ => {}
            }
        }
        self.parse_expression_statement()
    }

    fn parse_let(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.consume_keyword(Keyword::Let)?.span.start;
        let mutable = self.matches_keyword(Keyword::Mut);
        let name_token = self.consume_identifier("expected variable name after `let`")?;
        let annotation = if self.matches(TokenKind::Colon) {
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        self.consume(TokenKind::Assign, "expected `=` in variable declaration")?;
        let initializer = self.parse_expression()?;
        let semi = self.consume(
            TokenKind::Semicolon,
            "expected `;` after variable declaration",
        )?;
        Ok(Stmt {
            span: SourceSpan {
                start,
                end: semi.span.end,
            },
            kind: StmtKind::Let {
                name: name_token.lexeme.clone(),
                mutable,
                annotation,
                initializer,
            },
        })
    }

    fn parse_function(&mut self) -> Result<FunctionDecl, Diagnostic> {
        let start_token = self.consume_keyword(Keyword::Fn)?;
        let name_token = self.consume_identifier("expected function name")?;
        self.consume(TokenKind::LParen, "expected `(` after function name")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let param_name = self.consume_identifier("expected parameter name")?;
                self.consume(TokenKind::Colon, "expected `:` after parameter name")?;
                let annotation = self.parse_type_expr()?;
                params.push(Param {
                    name: param_name.lexeme.clone(),
                    annotation,
                    span: param_name.span,
                });
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RParen, "expected `)` after parameters")?;
        let return_type = if self.matches(TokenKind::Arrow) {
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        let (body, body_span) = self.parse_block()?;
        Ok(FunctionDecl {
            name: name_token.lexeme.clone(),
            params,
            return_type,
            body,
            span: SourceSpan {
                start: start_token.span.start,
                end: body_span.end,
            },
        })
    }

    fn parse_struct(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.consume_keyword(Keyword::Struct)?.span.start;
        let name_token = self.consume_identifier("expected struct name")?;
        self.consume(TokenKind::LBrace, "expected `{` after struct name")?;
        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            let field_name = self.consume_identifier("expected field name")?;
            self.consume(TokenKind::Colon, "expected `:` after field name")?;
            let annotation = self.parse_type_expr()?;
            fields.push(Field {
                name: field_name.lexeme.clone(),
                annotation,
                span: field_name.span,
            });
            if !self.matches(TokenKind::Comma) {
                break;
            }
        }
        let rbrace = self.consume(TokenKind::RBrace, "expected `}` after struct fields")?;
        Ok(Stmt {
            span: SourceSpan {
                start,
                end: rbrace.span.end,
            },
            kind: StmtKind::Struct {
                name: name_token.lexeme.clone(),
                fields,
            },
        })
    }

    fn parse_impl(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.consume_keyword(Keyword::Impl)?.span.start;
        let target = self.consume_identifier("expected type name after `impl`")?;
        self.consume(TokenKind::LBrace, "expected `{` after impl target")?;
        let mut methods = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            if !self.check(TokenKind::Keyword(Keyword::Fn)) {
                let token = self.peek().cloned();
                return Err(match token {
                    Some(tok) => self.error(&tok, "expected `fn` inside impl block"),
                    None => self.error_eof("expected `fn` inside impl block"),
                });
            }
            methods.push(self.parse_function()?);
        }
        let rbrace = self.consume(TokenKind::RBrace, "expected `}` after impl block")?;
        Ok(Stmt {
            span: SourceSpan {
                start,
                end: rbrace.span.end,
            },
            kind: StmtKind::Impl {
                target: target.lexeme.clone(),
                methods,
            },
        })
    }

    fn parse_module(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.consume_keyword(Keyword::Mod)?.span.start;
        let name_token = self.consume_identifier("expected module name")?;
        self.consume(TokenKind::LBrace, "expected `{` after module name")?;
        let items = self.parse_block_items(TokenKind::RBrace)?;
        let end = self.previous().span.end;
        Ok(Stmt {
            span: SourceSpan { start, end },
            kind: StmtKind::Module {
                name: name_token.lexeme.clone(),
                items,
            },
        })
    }

    fn parse_if(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.consume_keyword(Keyword::If)?.span.start;
        let condition = self.parse_expression()?;
        let (then_branch, then_span) = self.parse_block()?;
        let else_branch = if self.matches_keyword(Keyword::Else) {
            if self.check(TokenKind::Keyword(Keyword::If)) {
                Some(vec![self.parse_if()?])
            } else {
                let (branch, _) = self.parse_block()?;
                Some(branch)
            }
        } else {
            None
        };
        let end = else_branch
            .as_ref()
            .and_then(|branch| branch.last().map(|stmt| stmt.span.end))
            .unwrap_or(then_span.end);
        Ok(Stmt {
            span: SourceSpan { start, end },
            kind: StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.consume_keyword(Keyword::While)?.span.start;
        let condition = self.parse_expression()?;
        let (body, span) = self.parse_block()?;
        Ok(Stmt {
            span: SourceSpan {
                start,
                end: span.end,
            },
            kind: StmtKind::While { condition, body },
        })
    }

    fn parse_for(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.consume_keyword(Keyword::For)?.span.start;
        let binding = self.consume_identifier("expected loop binding after `for`")?;
        self.consume_keyword(Keyword::In)?;
        let iterable = self.parse_expression()?;
        let (body, span) = self.parse_block()?;
        Ok(Stmt {
            span: SourceSpan {
                start,
                end: span.end,
            },
            kind: StmtKind::For {
                binding: binding.lexeme.clone(),
                iterable,
                body,
            },
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, Diagnostic> {
        let token = self.consume_keyword(Keyword::Return)?;
        let expr = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let semi = self.consume(TokenKind::Semicolon, "expected `;` after return")?;
        Ok(Stmt {
            span: SourceSpan {
                start: token.span.start,
                end: semi.span.end,
            },
            kind: StmtKind::Return(expr),
        })
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt, Diagnostic> {
        let expr = self.parse_expression()?;
        let semi = self.consume(TokenKind::Semicolon, "expected `;` after expression")?;
        Ok(Stmt {
            span: SourceSpan {
                start: expr.span.start,
                end: semi.span.end,
            },
            kind: StmtKind::Expr(expr),
        })
    }

    fn parse_expression(&mut self) -> Result<Expr, Diagnostic> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, Diagnostic> {
        let expr = self.parse_or()?;
        let op = if self.matches(TokenKind::Assign) {
            Some(AssignOp::Set)
        } else if self.matches(TokenKind::PlusAssign) {
            Some(AssignOp::Add)
        } else if self.matches(TokenKind::MinusAssign) {
            Some(AssignOp::Sub)
        } else if self.matches(TokenKind::StarAssign) {
            Some(AssignOp::Mul)
        } else if self.matches(TokenKind::SlashAssign) {
            Some(AssignOp::Div)
        } else {
            None
        };
        if let Some(op) = op {
            let operator = self.previous().span;
            let value = self.parse_assignment()?;
            match expr.kind {
                ExprKind::Variable(_) | ExprKind::Index { .. } => Ok(Expr {
                    span: SourceSpan {
                        start: expr.span.start,
                        end: value.span.end,
                    },
                    kind: ExprKind::Assign {
                        op,
                        target: Box::new(expr),
                        value: Box::new(value),
                    },
                }),
                _ => Err(
                    Diagnostic::new(DiagnosticKind::Parser, "invalid assignment target")
                        .with_span(operator),
                ),
            }
        } else {
            Ok(expr)
        }
    }

    fn parse_or(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_and()?;
        while self.matches(TokenKind::PipePipe) {
            let right = self.parse_and()?;
            expr = binary(BinaryOp::Or, expr, right);
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_equality()?;
        while self.matches(TokenKind::AmpAmp) {
            let right = self.parse_equality()?;
            expr = binary(BinaryOp::And, expr, right);
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_comparison()?;
        loop {
            let op = if self.matches(TokenKind::EqualEqual) {
                BinaryOp::Equal
            } else if self.matches(TokenKind::BangEqual) {
                BinaryOp::NotEqual
            } else {
                break;
            };
            let right = self.parse_comparison()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_range()?;
        loop {
            let op = if self.matches(TokenKind::LessEqual) {
                BinaryOp::LessEqual
            } else if self.matches(TokenKind::GreaterEqual) {
                BinaryOp::GreaterEqual
            } else if self.matches(TokenKind::Less) {
                BinaryOp::Less
            } else if self.matches(TokenKind::Greater) {
                BinaryOp::Greater
            } else {
                break;
            };
            let right = self.parse_range()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_range(&mut self) -> Result<Expr, Diagnostic> {
        let expr = self.parse_term()?;
        if self.matches(TokenKind::DotDot) {
            let end = self.parse_term()?;
            return Ok(Expr {
                span: SourceSpan {
                    start: expr.span.start,
                    end: end.span.end,
                },
                kind: ExprKind::Range {
                    start: Box::new(expr),
                    end: Box::new(end),
                },
            });
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_factor()?;
        loop {
            let op = if self.matches(TokenKind::Plus) {
                BinaryOp::Add
            } else if self.matches(TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.parse_factor()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_factor(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = if self.matches(TokenKind::Star) {
                BinaryOp::Mul
            } else if self.matches(TokenKind::Slash) {
                BinaryOp::Div
            } else if self.matches(TokenKind::Percent) {
                BinaryOp::Mod
            } else {
                break;
            };
            let right = self.parse_unary()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, Diagnostic> {
        let op = if self.matches(TokenKind::Minus) {
            Some(UnaryOp::Negate)
        } else if self.matches(TokenKind::Bang) {
            Some(UnaryOp::Not)
        } else {
            None
        };
        if let Some(op) = op {
            let operator = self.previous().span;
            let right = self.parse_unary()?;
            return Ok(Expr {
                span: SourceSpan {
                    start: operator.start,
                    end: right.span.end,
                },
                kind: ExprKind::Unary {
                    op,
                    expr: Box::new(right),
                },
            });
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_postfix()?;
        while self.matches(TokenKind::Caret) {
            let right = self.parse_postfix()?;
            expr = binary(BinaryOp::Pow, expr, right);
        }
        Ok(expr)
    }

    fn parse_postfix(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.matches(TokenKind::LParen) {
                let name = match &expr.kind {
                    ExprKind::Variable(name) => name.clone(),
                    _ => {
                        return Err(Diagnostic::new(
                            DiagnosticKind::Parser,
                            "only named functions can be called",
                        )
                        .with_span(expr.span))
                    }
                };
                let mut args = Vec::new();
                if !self.check(TokenKind::RParen) {
                    loop {
                        args.push(self.parse_expression()?);
                        if !self.matches(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let paren = self.consume(TokenKind::RParen, "expected `)` after arguments")?;
                expr = Expr {
                    span: SourceSpan {
                        start: expr.span.start,
                        end: paren.span.end,
                    },
                    kind: ExprKind::Call { name, args },
                };
            } else if self.matches(TokenKind::LBracket) {
                let index = self.parse_expression()?;
                let bracket = self.consume(TokenKind::RBracket, "expected `]` after index")?;
                expr = Expr {
                    span: SourceSpan {
                        start: expr.span.start,
                        end: bracket.span.end,
                    },
                    kind: ExprKind::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    },
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, Diagnostic> {
        if let Some(token) = self.peek() {
            match &token.kind {
                TokenKind::Keyword(Keyword::True) => {
                    let tok = self.advance();
                    Ok(Expr {
                        span: tok.span,
                        kind: ExprKind::Literal(Literal::Bool(true)),
                    })
                }
                TokenKind::Keyword(Keyword::False) => {
                    let tok = self.advance();
                    Ok(Expr {
                        span: tok.span,
                        kind: ExprKind::Literal(Literal::Bool(false)),
                    })
                }
                TokenKind::Int => {
                    let tok = self.advance();
                    let value = tok.lexeme.parse().map_err(|_| {
                        Diagnostic::new(DiagnosticKind::Parser, "integer literal out of range")
                            .with_span(tok.span)
                    })?;
                    Ok(Expr {
                        span: tok.span,
                        kind: ExprKind::Literal(Literal::Int(value)),
                    })
                }
                TokenKind::Float => {
                    let tok = self.advance();
                    let value = tok.lexeme.parse().map_err(|_| {
                        Diagnostic::new(DiagnosticKind::Parser, "malformed float literal")
                            .with_span(tok.span)
                    })?;
                    Ok(Expr {
                        span: tok.span,
                        kind: ExprKind::Literal(Literal::Float(value)),
                    })
                }
                TokenKind::Str => {
                    let tok = self.advance();
                    Ok(Expr {
                        span: tok.span,
                        kind: ExprKind::Literal(Literal::Str(tok.lexeme.clone())),
                    })
                }
                TokenKind::Identifier => {
                    let tok = self.advance();
                    Ok(Expr {
                        span: tok.span,
                        kind: ExprKind::Variable(tok.lexeme.clone()),
                    })
                }
                TokenKind::LParen => {
                    let lparen = self.advance();
                    let inner = self.parse_expression()?;
                    let rparen =
                        self.consume(TokenKind::RParen, "expected `)` after expression")?;
                    Ok(Expr {
                        span: SourceSpan {
                            start: lparen.span.start,
                            end: rparen.span.end,
                        },
                        kind: ExprKind::Group(Box::new(inner)),
                    })
                }
                TokenKind::LBracket => {
                    let lbracket = self.advance();
                    let mut elements = Vec::new();
                    if !self.check(TokenKind::RBracket) {
                        loop {
                            elements.push(self.parse_expression()?);
                            if !self.matches(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    let rbracket =
                        self.consume(TokenKind::RBracket, "expected `]` after array literal")?;
                    Ok(Expr {
                        span: SourceSpan {
                            start: lbracket.span.start,
                            end: rbracket.span.end,
                        },
                        kind: ExprKind::ArrayLiteral(elements),
                    })
                }
                _ => Err(self.error(token, "unexpected token in expression")),
            }
        } else {
            Err(self.error_eof("unexpected end of expression"))
        }
    }

    /// Annotations are a type name plus an optional array suffix, so
    /// `int`, `int[]`, and `int[4]` each come back as a single name.
    fn parse_type_expr(&mut self) -> Result<TypeExpr, Diagnostic> {
        let ident = self.consume_identifier("expected type name")?;
        let mut name = ident.lexeme.clone();
        let mut end = ident.span.end;
        if self.matches(TokenKind::LBracket) {
            name.push('[');
            if self.check(TokenKind::Int) {
                let size = self.advance();
                name.push_str(&size.lexeme);
            }
            let rbracket = self.consume(TokenKind::RBracket, "expected `]` in array type")?;
            name.push(']');
            end = rbracket.span.end;
        }
        Ok(TypeExpr {
            name,
            span: SourceSpan {
                start: ident.span.start,
                end,
            },
        })
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn matches_keyword(&mut self, keyword: Keyword) -> bool {
        if let Some(Token {
            kind: TokenKind::Keyword(k),
            ..
        }) = self.peek()
        {
            if *k == keyword {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, Diagnostic> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self
                .peek()
                .map(|tok| self.error(tok, message))
                .unwrap_or_else(|| self.error_eof(message)))
        }
    }

    fn consume_keyword(&mut self, keyword: Keyword) -> Result<Token, Diagnostic> {
        if let Some(token) = self.peek() {
            if token.kind == TokenKind::Keyword(keyword) {
                Ok(self.advance())
            } else {
                let message = format!(
                    "expected keyword `{}`",
                    format!("{keyword:?}").to_lowercase()
                );
                Err(self.error(token, &message))
            }
        } else {
            Err(self.error_eof("unexpected end of input"))
        }
    }

    fn consume_identifier(&mut self, message: &str) -> Result<Token, Diagnostic> {
        if self.check(TokenKind::Identifier) {
            Ok(self.advance())
        } else {
            Err(self
                .peek()
                .map(|tok| self.error(tok, message))
                .unwrap_or_else(|| self.error_eof(message)))
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        if let Some(token) = self.peek() {
            token.kind == kind
        } else {
            false
        }
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().map(|t| &t.kind), Some(TokenKind::Eof) | None)
    }

    fn error(&self, token: &Token, message: &str) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::Parser, message.to_string()).with_span(token.span)
    }

    fn error_eof(&self, message: &str) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::Parser, message.to_string())
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr {
        span: SourceSpan {
            start: left.span.start,
            end: right.span.end,
        },
        kind: ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
    }
}
