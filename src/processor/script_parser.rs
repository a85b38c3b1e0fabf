//! Recursive-descent parser that turns the token stream into an AST.
//!
//! ```text
//!     program    := action* EOF
//!     action     := 'func' IDENT '(' ')' codeBlock
//!                 | 'if' expr codeBlock
//!                 | IDENT ( '(' callArgs? ')' | '=' expr )
//!     codeBlock  := '{' action* '}'
//!     expr       := ('not' | '!') expr | compExpr
//!     compExpr   := arithExpr (('=='|'!=') arithExpr)*
//!     arithExpr  := term (('+'|'-') term)*
//!     term       := factor (('*'|'/') factor)*
//!     factor     := INT | FLOAT | STRING | IDENT | '-' expr | '(' expr ')'
//! ```
//!
//! One token of lookahead, no backtracking, and no recovery: the first
//! error ends the parse.

use super::ast::{BinOp, Block, Node, Number, UnaryOp};
use super::error::{CompileError, CompileResult};
use super::lexer::{Keyword, Token, TokenKind};
use super::position::Span;

/// Callees that take an argument list and are handled by the generator.
pub const BUILTIN_FUNCTIONS: &[&str] = &["print"];

/// Maximum nesting of expressions and blocks before giving up.
pub const MAX_NESTING_DEPTH: usize = 128;

const COMPARISON_OPS: &[(TokenKind, BinOp)] =
    &[(TokenKind::EqEq, BinOp::Eq), (TokenKind::NotEq, BinOp::NotEq)];
const ARITH_OPS: &[(TokenKind, BinOp)] =
    &[(TokenKind::Plus, BinOp::Add), (TokenKind::Minus, BinOp::Sub)];
const TERM_OPS: &[(TokenKind, BinOp)] =
    &[(TokenKind::Star, BinOp::Mul), (TokenKind::Slash, BinOp::Div)];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_FUNCTIONS.contains(&name)
}

/// Parse a complete token stream into the top-level program block.
pub fn parse(tokens: Vec<Token>) -> CompileResult<Block> {
    let program = Parser::new(tokens).parse_program()?;
    crate::ast_log!(Bright Black "Parsed ", program.body.len(), " top-level actions");
    Ok(program)
}

struct Parser {
    tokens: Vec<Token>,
    idx: usize,
    depth: usize,
}

impl Parser {
    fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, Span::new(end, end)));
        }
        Self {
            tokens,
            idx: 0,
            depth: 0,
        }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.idx]
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.idx + 1 < self.tokens.len() {
            self.idx += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> CompileResult<Token> {
        if self.at(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(message))
        }
    }

    fn error_here(&self, message: &str) -> CompileError {
        CompileError::syntax(self.current().span, message)
    }

    fn enter(&mut self) -> CompileResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(CompileError::too_deep(self.current().span, MAX_NESTING_DEPTH));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn parse_program(&mut self) -> CompileResult<Block> {
        let mut body = Vec::<Node>::new();
        while !self.at(&TokenKind::Eof) {
            body.push(self.parse_action()?);
        }

        let span = match (body.first(), body.last()) {
            (Some(first), Some(last)) => first.span().to(last.span()),
            _ => self.current().span,
        };
        Ok(Block { body, span })
    }

    fn parse_block(&mut self) -> CompileResult<Block> {
        self.enter()?;
        let block = self.parse_block_inner();
        self.leave();
        block
    }

    fn parse_block_inner(&mut self) -> CompileResult<Block> {
        let open = self.expect(TokenKind::LBrace, "Expected {")?;

        let mut body = Vec::<Node>::new();
        while !self.at(&TokenKind::RBrace) {
            body.push(self.parse_action()?);
        }
        let close = self.advance();

        Ok(Block {
            body,
            span: open.span.to(close.span),
        })
    }

    fn parse_action(&mut self) -> CompileResult<Node> {
        let token = self.current().clone();
        match &token.kind {
            TokenKind::Keyword(Keyword::Func) => self.parse_function(),
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Ident(name) => {
                self.advance();
                if self.at(&TokenKind::LParen) {
                    self.parse_call(name.clone(), token.span)
                } else {
                    self.parse_assign(name.clone(), token.span)
                }
            }
            _ => Err(self.error_here("Expected func or if or identifier")),
        }
    }

    fn parse_function(&mut self) -> CompileResult<Node> {
        let func = self.advance();

        let name = match &self.current().kind {
            TokenKind::Ident(name) => name.clone(),
            _ => return Err(self.error_here("Expected identifier")),
        };
        self.advance();

        self.expect(TokenKind::LParen, "Expected (")?;
        self.expect(TokenKind::RParen, "Expected )")?;

        let body = self.parse_block()?;
        let span = func.span.to(body.span);
        Ok(Node::FunctionDecl { name, body, span })
    }

    fn parse_if(&mut self) -> CompileResult<Node> {
        let keyword = self.advance();
        let condition = self.parse_expr()?;
        let body = self.parse_block()?;
        let span = keyword.span.to(body.span);
        Ok(Node::If {
            condition: Box::new(condition),
            body,
            span,
        })
    }

    /// Current token is the `(` after `callee`.
    fn parse_call(&mut self, callee: String, callee_span: Span) -> CompileResult<Node> {
        self.advance();

        let mut args = Vec::<Node>::new();
        if is_builtin(&callee) {
            while !self.at(&TokenKind::RParen) {
                args.push(self.parse_expr()?);

                if !(self.at(&TokenKind::Comma) || self.at(&TokenKind::RParen)) {
                    return Err(self.error_here("Expected , or )"));
                }
                if self.at(&TokenKind::Comma) {
                    self.advance();
                }
            }
        } else if !self.at(&TokenKind::RParen) {
            return Err(self.error_here("Expected )"));
        }

        let close = self.advance();
        Ok(Node::Call {
            callee,
            args,
            span: callee_span.to(close.span),
        })
    }

    /// Current token follows the assigned identifier.
    fn parse_assign(&mut self, name: String, name_span: Span) -> CompileResult<Node> {
        self.expect(TokenKind::Eq, "Expected =")?;
        let value = self.parse_expr()?;
        let span = name_span.to(value.span());
        Ok(Node::VarAssign {
            name,
            value: Box::new(value),
            span,
        })
    }

    fn parse_expr(&mut self) -> CompileResult<Node> {
        self.enter()?;
        let expr = self.parse_expr_inner();
        self.leave();
        expr
    }

    fn parse_expr_inner(&mut self) -> CompileResult<Node> {
        if self.at(&TokenKind::Keyword(Keyword::Not)) || self.at(&TokenKind::Bang) {
            let op = self.advance();
            let operand = self.parse_expr()?;
            let span = op.span.to(operand.span());
            return Ok(Node::UnaryOp {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> CompileResult<Node> {
        self.bin_op(Self::parse_arith, COMPARISON_OPS)
    }

    fn parse_arith(&mut self) -> CompileResult<Node> {
        self.bin_op(Self::parse_term, ARITH_OPS)
    }

    fn parse_term(&mut self) -> CompileResult<Node> {
        self.bin_op(Self::parse_factor, TERM_OPS)
    }

    /// Left-deep fold of `operand (op operand)*`. String operands are
    /// rejected once both sides are parsed, right side checked first.
    ///
    /// Every fold adds a level to the tree, so each one counts against the
    /// nesting limit until the chain is complete.
    fn bin_op(
        &mut self,
        operand: fn(&mut Self) -> CompileResult<Node>,
        ops: &[(TokenKind, BinOp)],
    ) -> CompileResult<Node> {
        let mut folds = 0;
        let res = self.bin_op_inner(operand, ops, &mut folds);
        self.depth = self.depth.saturating_sub(folds);
        res
    }

    fn bin_op_inner(
        &mut self,
        operand: fn(&mut Self) -> CompileResult<Node>,
        ops: &[(TokenKind, BinOp)],
        folds: &mut usize,
    ) -> CompileResult<Node> {
        let mut left = operand(self)?;

        while let Some(op) = ops
            .iter()
            .find(|(kind, _)| self.at(kind))
            .map(|(_, op)| *op)
        {
            *folds += 1;
            self.enter()?;
            self.advance();
            let right = operand(self)?;

            if right.is_string() {
                return Err(CompileError::syntax(
                    right.span(),
                    "Operations with strings are not supported",
                ));
            }
            if left.is_string() {
                return Err(CompileError::syntax(
                    left.span(),
                    "Operations with strings are not supported",
                ));
            }

            let span = left.span().to(right.span());
            left = Node::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    fn parse_factor(&mut self) -> CompileResult<Node> {
        let token = self.current().clone();
        let node = match token.kind {
            TokenKind::Int(v) => {
                self.advance();
                Node::Number {
                    value: Number::Int(v),
                    span: token.span,
                }
            }
            TokenKind::Float(v) => {
                self.advance();
                Node::Number {
                    value: Number::Float(v),
                    span: token.span,
                }
            }
            TokenKind::Str(value) => {
                self.advance();
                Node::String {
                    value,
                    span: token.span,
                }
            }
            TokenKind::Ident(name) => {
                self.advance();
                Node::VarAccess {
                    name,
                    span: token.span,
                }
            }
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_expr()?;
                let span = token.span.to(operand.span());
                Node::UnaryOp {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                    span,
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen, "Expected )")?;
                expr
            }
            _ => {
                return Err(self.error_here("Expected int or float or string or identifier or ("));
            }
        };
        Ok(node)
    }
}
