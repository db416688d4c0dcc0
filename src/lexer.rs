use crate::diagnostics::{Diagnostic, DiagnosticKind, SourceSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Let,
    Mut,
    Const,
    Fn,
    Return,
    If,
    Else,
    For,
    While,
    In,
    Struct,
    Impl,
    Mod,
    Pub,
    Async,
    Parallel,
    Match,
    True,
    False,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier,
    Int,
    Float,
    Str,
    Keyword(Keyword),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    DotDot,
    Colon,
    Semicolon,
    Arrow,
    Assign,
    Plus,
    PlusAssign,
    Minus,
    MinusAssign,
    Star,
    StarAssign,
    Slash,
    SlashAssign,
    Percent,
    Caret,
    AmpAmp,
    PipePipe,
    Bang,
    BangEqual,
    EqualEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Unknown,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: SourceSpan,
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current: usize,
    peeked: Option<(usize, char)>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices(),
            current: 0,
            peeked: None,
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let next = if let Some((idx, ch)) = self.peeked.take() {
            Some((idx, ch))
        } else {
            self.chars.next()
        };
        if let Some((idx, ch)) = next {
            self.current = idx + ch.len_utf8();
            Some((idx, ch))
        } else {
            None
        }
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        if self.peeked.is_none() {
            self.peeked = self.chars.next();
        }
        self.peeked
    }

    fn match_next(&mut self, expected: char) -> bool {
        if let Some((idx, ch)) = self.peek() {
            if ch == expected {
                self.peeked = None;
                self.current = idx + ch.len_utf8();
                true
            } else {
                false
            }
        } else {
            false
        }
    }

    fn collect_while<F>(&mut self, start: usize, mut predicate: F) -> String
    where
        F: FnMut(char) -> bool,
    {
        let mut end = self.current;
        while let Some((idx, ch)) = self.peek() {
            if predicate(ch) {
                self.bump();
                end = idx + ch.len_utf8();
            } else {
                break;
            }
        }
        self.source[start..end].to_string()
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            let mut progressed = false;

            while let Some((_, ch)) = self.peek() {
                if ch.is_whitespace() {
                    self.bump();
                    progressed = true;
                } else {
                    break;
                }
            }

            let mut handled_comment = false;
            if let Some((start, '/')) = self.peek() {
                if let Some((_, next)) = self.chars.clone().next() {
                    if next == '/' {
                        self.bump();
                        self.bump();
                        while let Some((_, ch)) = self.peek() {
                            if ch == '\n' {
                                break;
                            }
                            self.bump();
                        }
                        handled_comment = true;
                    } else if next == '*' {
                        self.bump();
                        self.bump();
                        while let Some((_, ch)) = self.bump() {
                            if ch == '*' {
                                if let Some((_, '/')) = self.peek() {
                                    self.bump();
                                    break;
                                }
                            }
                        }
                        handled_comment = true;
                    }
                }
                if !handled_comment {
                    self.peeked = Some((start, '/'));
                }
            }

            if handled_comment {
                progressed = true;
            }

            if !progressed {
                break;
            }
        }
    }

    fn identifier_or_keyword(&mut self, start: usize) -> Token {
        self.collect_while(start, |ch| ch.is_alphanumeric() || ch == '_');
        let end = self.current;
        let lexeme = self.source[start..end].to_string();
        let kind = keyword_for(&lexeme).unwrap_or(TokenKind::Identifier);
        Token {
            kind,
            lexeme,
            span: SourceSpan { start, end },
        }
    }

    fn number_literal(&mut self, start: usize) -> Token {
        let mut end = self.current;
        let mut is_float = false;
        while let Some((idx, ch)) = self.peek() {
            match ch {
                '0'..='9' => {
                    self.bump();
                    end = idx + ch.len_utf8();
                }
                // A dot only continues the number when a digit follows,
                // so `0..10` stays two ints around a range operator.
                '.' if !is_float => {
                    let mut ahead = self.chars.clone();
                    if !matches!(ahead.next(), Some((_, '0'..='9'))) {
                        break;
                    }
                    is_float = true;
                    self.bump();
                    end = idx + 1;
                }
                _ => break,
            }
        }
        let lexeme = self.source[start..end].to_string();
        Token {
            kind: if is_float {
                TokenKind::Float
            } else {
                TokenKind::Int
            },
            lexeme,
            span: SourceSpan { start, end },
        }
    }

    fn string_literal(&mut self, start: usize) -> Result<Token, Diagnostic> {
        let mut end = self.current;
        let mut value = String::new();
        while let Some((idx, ch)) = self.bump() {
            end = idx + ch.len_utf8();
            match ch {
                '"' => {
                    return Ok(Token {
                        kind: TokenKind::Str,
                        lexeme: value,
                        span: SourceSpan { start, end },
                    });
                }
                '\\' => {
                    if let Some((_, esc)) = self.bump() {
                        end = idx + 1 + esc.len_utf8();
                        match esc {
                            'n' => value.push('\n'),
                            'r' => value.push('\r'),
                            't' => value.push('\t'),
                            '"' => value.push('"'),
                            '\\' => value.push('\\'),
                            other => {
                                value.push('\\');
                                value.push(other);
                            }
                        }
                    } else {
                        break;
                    }
                }
                _ => value.push(ch),
            }
        }
        Err(
            Diagnostic::new(DiagnosticKind::Lexer, "unterminated string literal")
                .with_span(SourceSpan { start, end }),
        )
    }

    fn simple_token(&mut self, start: usize, kind: TokenKind) -> Token {
        let end = self.current;
        Token {
            kind,
            lexeme: self.source[start..end].to_string(),
            span: SourceSpan { start, end },
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, Diagnostic> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            let (start, ch) = match self.bump() {
                Some(pair) => pair,
                None => {
                    tokens.push(Token {
                        kind: TokenKind::Eof,
                        lexeme: String::new(),
                        span: SourceSpan {
                            start: self.current,
                            end: self.current,
                        },
                    });
                    break;
                }
            };

            let token = match ch {
                'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(start),
                '0'..='9' => self.number_literal(start),
                '"' => self.string_literal(start)?,
                '(' => self.simple_token(start, TokenKind::LParen),
                ')' => self.simple_token(start, TokenKind::RParen),
                '{' => self.simple_token(start, TokenKind::LBrace),
                '}' => self.simple_token(start, TokenKind::RBrace),
                '[' => self.simple_token(start, TokenKind::LBracket),
                ']' => self.simple_token(start, TokenKind::RBracket),
                ',' => self.simple_token(start, TokenKind::Comma),
                '.' => {
                    if self.match_next('.') {
                        self.simple_token(start, TokenKind::DotDot)
                    } else {
                        self.simple_token(start, TokenKind::Dot)
                    }
                }
                ';' => self.simple_token(start, TokenKind::Semicolon),
                ':' => self.simple_token(start, TokenKind::Colon),
                '+' => {
                    if self.match_next('=') {
                        self.simple_token(start, TokenKind::PlusAssign)
                    } else {
                        self.simple_token(start, TokenKind::Plus)
                    }
                }
                '-' => {
                    if self.match_next('>') {
                        self.simple_token(start, TokenKind::Arrow)
                    } else if self.match_next('=') {
                        self.simple_token(start, TokenKind::MinusAssign)
                    } else {
                        self.simple_token(start, TokenKind::Minus)
                    }
                }
                '*' => {
                    if self.match_next('=') {
                        self.simple_token(start, TokenKind::StarAssign)
                    } else {
                        self.simple_token(start, TokenKind::Star)
                    }
                }
                '/' => {
                    if self.match_next('=') {
                        self.simple_token(start, TokenKind::SlashAssign)
                    } else {
                        self.simple_token(start, TokenKind::Slash)
                    }
                }
                '%' => self.simple_token(start, TokenKind::Percent),
                '^' => self.simple_token(start, TokenKind::Caret),
                '=' => {
                    if self.match_next('=') {
                        self.simple_token(start, TokenKind::EqualEqual)
                    } else {
                        self.simple_token(start, TokenKind::Assign)
                    }
                }
                '!' => {
                    if self.match_next('=') {
                        self.simple_token(start, TokenKind::BangEqual)
                    } else {
                        self.simple_token(start, TokenKind::Bang)
                    }
                }
                '&' => {
                    if self.match_next('&') {
                        self.simple_token(start, TokenKind::AmpAmp)
                    } else {
                        self.simple_token(start, TokenKind::Unknown)
                    }
                }
                '|' => {
                    if self.match_next('|') {
                        self.simple_token(start, TokenKind::PipePipe)
                    } else {
                        self.simple_token(start, TokenKind::Unknown)
                    }
                }
                '<' => {
                    if self.match_next('=') {
                        self.simple_token(start, TokenKind::LessEqual)
                    } else {
                        self.simple_token(start, TokenKind::Less)
                    }
                }
                '>' => {
                    if self.match_next('=') {
                        self.simple_token(start, TokenKind::GreaterEqual)
                    } else {
                        self.simple_token(start, TokenKind::Greater)
                    }
                }
                _ => self.simple_token(start, TokenKind::Unknown),
            };
            tokens.push(token);
        }
        Ok(tokens)
    }
}

fn keyword_for(ident: &str) -> Option<TokenKind> {
    use self::Keyword as Kw;
    let keyword = match ident {
        "let" => Kw::Let,
        "mut" => Kw::Mut,
        "const" => Kw::Const,
        "fn" => Kw::Fn,
        "return" => Kw::Return,
        "if" => Kw::If,
        "else" => Kw::Else,
        "for" => Kw::For,
        "while" => Kw::While,
        "in" => Kw::In,
        "struct" => Kw::Struct,
        "impl" => Kw::Impl,
        "mod" => Kw::Mod,
        "pub" => Kw::Pub,
        "async" => Kw::Async,
        "parallel" => Kw::Parallel,
        "match" => Kw::Match,
        "true" => Kw::True,
        "false" => Kw::False,
        _ => return None,
    };
    Some(TokenKind::Keyword(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .expect("lexing should succeed")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn range_is_not_a_float() {
        assert_eq!(
            kinds("0..10"),
            vec![
                TokenKind::Int,
                TokenKind::DotDot,
                TokenKind::Int,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn float_requires_digit_after_dot() {
        assert_eq!(kinds("3.14"), vec![TokenKind::Float, TokenKind::Eof]);
        assert_eq!(
            kinds("3.foo"),
            vec![
                TokenKind::Int,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn compound_operators() {
        assert_eq!(
            kinds("+= -= *= /= && || != ^"),
            vec![
                TokenKind::PlusAssign,
                TokenKind::MinusAssign,
                TokenKind::StarAssign,
                TokenKind::SlashAssign,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::BangEqual,
                TokenKind::Caret,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn string_escapes() {
        let tokens = Lexer::new(r#""a\nb\"c""#).tokenize().unwrap();
        assert_eq!(tokens[0].lexeme, "a\nb\"c");
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = Lexer::new("\"oops").tokenize().unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("let // trailing\n/* block */ x"),
            vec![
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }
}
