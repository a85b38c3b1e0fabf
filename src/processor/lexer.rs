//! Hand-written lexer for mclang source.
//!
//! Produces a flat token stream terminated by `Eof`. The first character
//! that cannot start a token aborts lexing; nothing after it is produced.
//
//  Lexical items:
//
//      Ident    ::= [A-Za-z_]+              (no digits; keywords split out)
//      Int      ::= [0-9]+                  (at most 2^31, so -2^31 can be spelled)
//      Float    ::= [0-9]* '.' [0-9]*       (at most one '.')
//      Str      ::= '"' ( '\"' | '\\' | [^"] )* '"'
//      Symbols  ::= + - * / = == != ! ( ) { } ,
//      Whitespace and comments (# until end-of-line) are discarded.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use super::error::{CompileError, CompileResult};
use super::position::{Position, Span};

/// Largest integer literal: the magnitude of `i32::MIN`. Whether a literal
/// fits once its sign is applied is checked during lowering.
pub const MAX_INT_MAGNITUDE: i64 = i32::MAX as i64 + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Func,
    If,
    Not,
}

impl Keyword {
    fn lookup(ident: &str) -> Option<Keyword> {
        match ident {
            "func" => Some(Keyword::Func),
            "if" => Some(Keyword::If),
            "not" => Some(Keyword::Not),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Keyword(Keyword),
    Int(i64),
    Float(f64),
    Str(String),
    Plus,
    Minus,
    Star,
    Slash,
    Eq,
    EqEq,
    NotEq,
    Bang,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "IDENTIFIER:{name}"),
            TokenKind::Keyword(kw) => write!(f, "KEYWORD:{kw:?}"),
            TokenKind::Int(v) => write!(f, "INT:{v}"),
            TokenKind::Float(v) => write!(f, "FLOAT:{v:?}"),
            TokenKind::Str(s) => write!(f, "STRING:{s:?}"),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::Eq => f.write_str("="),
            TokenKind::EqEq => f.write_str("=="),
            TokenKind::NotEq => f.write_str("!="),
            TokenKind::Bang => f.write_str("!"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Eof => f.write_str("EOF"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Clone)]
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    pos: Position,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
            pos: Position::default(),
            finished: false,
        }
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos.advance(c);
        Some(c)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.pos)
    }

    fn consume_while<F: Fn(char) -> bool>(&mut self, pred: F, buf: &mut String) {
        while let Some(c) = self.peek_char() {
            if pred(c) {
                buf.push(c);
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek_char() {
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.next_char();
                }
                '#' => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.next_char();
                    }
                }
                _ => break,
            }
        }
    }

    fn read_identifier(&mut self, first: char) -> TokenKind {
        let mut id = String::new();
        id.push(first);
        self.consume_while(|c| c.is_ascii_alphabetic() || c == '_', &mut id);
        match Keyword::lookup(&id) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Ident(id),
        }
    }

    /// Digits with at most one '.'; a second '.' ends the number unconsumed.
    fn read_number(&mut self, first: char, start: Position) -> CompileResult<TokenKind> {
        let mut num = String::new();
        num.push(first);
        let mut dots = 0;
        while let Some(c) = self.peek_char() {
            if c == '.' {
                if dots >= 1 {
                    break;
                }
                dots += 1;
            } else if !c.is_ascii_digit() {
                break;
            }
            num.push(c);
            self.next_char();
        }

        if dots == 0 {
            match num.parse::<i64>() {
                Ok(v) if v <= MAX_INT_MAGNITUDE => Ok(TokenKind::Int(v)),
                _ => Err(CompileError::syntax(
                    self.span_from(start),
                    "integer literal out of range",
                )),
            }
        } else {
            num.parse::<f64>().map(TokenKind::Float).map_err(|_| {
                CompileError::syntax(self.span_from(start), format!("invalid float {num}"))
            })
        }
    }

    fn read_string(&mut self, start: Position) -> CompileResult<TokenKind> {
        let mut txt = String::new();
        while let Some(c) = self.next_char() {
            match c {
                '"' => return Ok(TokenKind::Str(txt)),
                '\\' => match self.next_char() {
                    Some(escaped @ ('"' | '\\')) => txt.push(escaped),
                    Some('n') => txt.push('\n'),
                    Some(other) => {
                        txt.push('\\');
                        txt.push(other);
                    }
                    None => break,
                },
                c => txt.push(c),
            }
        }
        let quote = Span::new(start, Position::new(start.index + 1, start.line, start.column + 1));
        Err(CompileError::syntax(quote, "unterminated string literal"))
    }

    /// `first` already consumed; pick the two-char form if `=` follows.
    fn read_with_eq(&mut self, single: TokenKind, double: TokenKind) -> TokenKind {
        if self.peek_char() == Some('=') {
            self.next_char();
            double
        } else {
            single
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = CompileResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        self.skip_trivia();
        let start = self.pos;

        let ch = match self.next_char() {
            Some(c) => c,
            None => {
                self.finished = true;
                return Some(Ok(Token::new(TokenKind::Eof, self.span_from(start))));
            }
        };

        let kind_res = match ch {
            '+' => Ok(TokenKind::Plus),
            '-' => Ok(TokenKind::Minus),
            '*' => Ok(TokenKind::Star),
            '/' => Ok(TokenKind::Slash),
            '(' => Ok(TokenKind::LParen),
            ')' => Ok(TokenKind::RParen),
            '{' => Ok(TokenKind::LBrace),
            '}' => Ok(TokenKind::RBrace),
            ',' => Ok(TokenKind::Comma),
            '=' => Ok(self.read_with_eq(TokenKind::Eq, TokenKind::EqEq)),
            '!' => Ok(self.read_with_eq(TokenKind::Bang, TokenKind::NotEq)),
            '"' => self.read_string(start),
            c if c.is_ascii_digit() => self.read_number(c, start),
            c if c.is_ascii_alphabetic() || c == '_' => Ok(self.read_identifier(c)),
            c => Err(CompileError::illegal_char(self.span_from(start), c)),
        };

        let res = kind_res.map(|kind| Token::new(kind, self.span_from(start)));
        if res.is_err() {
            self.finished = true;
        }
        Some(res)
    }
}

/// Lex the whole source, stopping at the first error.
pub fn tokenize(src: &str) -> CompileResult<Vec<Token>> {
    let tokens: CompileResult<Vec<Token>> = Lexer::new(src).collect();
    let tokens = tokens?;
    crate::token_log!(Bright Black "Lexed ", tokens.len(), " tokens");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::error::ErrorKind;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_tokenisation() {
        let test_cases = vec![
            (
                "x = 1 + 2.5",
                vec![
                    TokenKind::Ident("x".into()),
                    TokenKind::Eq,
                    TokenKind::Int(1),
                    TokenKind::Plus,
                    TokenKind::Float(2.5),
                    TokenKind::Eof,
                ],
            ),
            (
                "func main() { print(\"hi\", a) }",
                vec![
                    TokenKind::Keyword(Keyword::Func),
                    TokenKind::Ident("main".into()),
                    TokenKind::LParen,
                    TokenKind::RParen,
                    TokenKind::LBrace,
                    TokenKind::Ident("print".into()),
                    TokenKind::LParen,
                    TokenKind::Str("hi".into()),
                    TokenKind::Comma,
                    TokenKind::Ident("a".into()),
                    TokenKind::RParen,
                    TokenKind::RBrace,
                    TokenKind::Eof,
                ],
            ),
            (
                "if not a == b != c ! d",
                vec![
                    TokenKind::Keyword(Keyword::If),
                    TokenKind::Keyword(Keyword::Not),
                    TokenKind::Ident("a".into()),
                    TokenKind::EqEq,
                    TokenKind::Ident("b".into()),
                    TokenKind::NotEq,
                    TokenKind::Ident("c".into()),
                    TokenKind::Bang,
                    TokenKind::Ident("d".into()),
                    TokenKind::Eof,
                ],
            ),
        ];

        for (src, expected) in test_cases {
            assert_eq!(kinds(src), expected, "source: {src}");
        }
    }

    #[test]
    fn test_comments_and_whitespace_are_skipped() {
        let src = "# leading comment\n  x = 1 # trailing\n\ty = 2 # no newline at end";
        assert_eq!(
            kinds(src),
            vec![
                TokenKind::Ident("x".into()),
                TokenKind::Eq,
                TokenKind::Int(1),
                TokenKind::Ident("y".into()),
                TokenKind::Eq,
                TokenKind::Int(2),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers_stop_at_digits() {
        assert_eq!(
            kinds("ab1"),
            vec![
                TokenKind::Ident("ab".into()),
                TokenKind::Int(1),
                TokenKind::Eof
            ]
        );
        assert_eq!(
            kinds("iffy funcs"),
            vec![
                TokenKind::Ident("iffy".into()),
                TokenKind::Ident("funcs".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_second_dot_is_illegal() {
        let mut lexer = Lexer::new("1.2.3");

        let first = lexer.next().unwrap().unwrap();
        assert_eq!(first.kind, TokenKind::Float(1.2));
        assert_eq!(first.span.start.index, 0);
        assert_eq!(first.span.end.index, 3);

        let err = lexer.next().unwrap().unwrap_err();
        assert_eq!(err.kind, ErrorKind::IllegalCharacter);
        assert_eq!(err.detail.as_deref(), Some("\".\""));
        assert_eq!(err.span.start.index, 3);

        assert!(lexer.next().is_none(), "lexing stops after an error");

        let whole = tokenize("1.2.3").unwrap_err();
        assert_eq!(whole, err);
    }

    #[test]
    fn test_illegal_character_aborts() {
        let err = tokenize("x = 1\ny = 2 $ 3").unwrap_err();
        assert_eq!(err.kind, ErrorKind::IllegalCharacter);
        assert_eq!(err.span.start.line, 1);
        assert_eq!(err.span.start.column, 6);
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("print(\"oops)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidSyntax);
        assert_eq!(err.span.start.index, 6);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""a\"b\\c""#),
            vec![TokenKind::Str("a\"b\\c".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_integer_out_of_range() {
        let err = tokenize("x = 99999999999").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidSyntax);
        assert_eq!(err.span.start.index, 4);

        let err = tokenize("x = 2147483649").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidSyntax);
    }

    #[test]
    fn test_integer_magnitude_bounds() {
        let test_cases = vec![
            ("2147483647", 2_147_483_647),
            ("2147483648", 2_147_483_648),
            ("0", 0),
            ("007", 7),
        ];

        for (input, expected) in test_cases {
            assert_eq!(
                kinds(input),
                vec![TokenKind::Int(expected), TokenKind::Eof],
                "input: {input}"
            );
        }
    }

    #[test]
    fn test_spans_are_non_empty_and_increasing() {
        let tokens = tokenize("func main() {\n  x = 10 == 2\n}").unwrap();
        let mut last_end = 0;
        for tok in &tokens {
            assert!(tok.span.start.index >= last_end);
            if tok.kind != TokenKind::Eof {
                assert!(!tok.span.is_empty(), "empty span for {:?}", tok.kind);
            }
            last_end = tok.span.end.index;
        }
        let eq = tokens.iter().find(|t| t.kind == TokenKind::EqEq).unwrap();
        assert_eq!(eq.span.end.index - eq.span.start.index, 2);
        assert_eq!(eq.span.start.line, 1);
    }

    #[test]
    fn test_lexing_is_deterministic() {
        let src = "func tick() { if not a != 3 { b = b * (2 - c) } }";
        assert_eq!(tokenize(src).unwrap(), tokenize(src).unwrap());
    }
}
