//! Syntax tree for one mclang source unit *before* it is lowered to commands.

use std::fmt;

use super::position::Span;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Lexed magnitude with any folded sign; range-checked when lowered.
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn negated(self) -> Number {
        match self {
            Number::Int(v) => Number::Int(-v),
            Number::Float(v) => Number::Float(-v),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{v}"),
            Number::Float(v) => write!(f, "{v:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-expr`
    Neg,
    /// `not expr` / `!expr`
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
}

impl BinOp {
    pub fn is_comparison(self) -> bool {
        matches!(self, BinOp::Eq | BinOp::NotEq)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
        }
    }
}

/// `{ action* }`, or the whole program at top level.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub body: Vec<Node>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// `42`, `1.5`
    Number { value: Number, span: Span },

    /// `"text"` – only meaningful as a `print` argument.
    String { value: String, span: Span },

    /// `x`
    VarAccess { name: String, span: Span },

    /// `x = expr`
    VarAssign {
        name: String,
        value: Box<Node>,
        span: Span,
    },

    /// `-expr`, `not expr`
    UnaryOp {
        op: UnaryOp,
        operand: Box<Node>,
        span: Span,
    },

    /// `left op right`, folded left-deep.
    BinOp {
        left: Box<Node>,
        op: BinOp,
        right: Box<Node>,
        span: Span,
    },

    /// `name()` for user functions, `print(a, ...)` for builtins.
    Call {
        callee: String,
        args: Vec<Node>,
        span: Span,
    },

    /// `if cond { … }`
    If {
        condition: Box<Node>,
        body: Block,
        span: Span,
    },

    CodeBlock(Block),

    /// `func name() { … }`
    FunctionDecl { name: String, body: Block, span: Span },
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Number { span, .. }
            | Node::String { span, .. }
            | Node::VarAccess { span, .. }
            | Node::VarAssign { span, .. }
            | Node::UnaryOp { span, .. }
            | Node::BinOp { span, .. }
            | Node::Call { span, .. }
            | Node::If { span, .. }
            | Node::FunctionDecl { span, .. } => *span,
            Node::CodeBlock(block) => block.span,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Node::String { .. })
    }

    /// Direct children, left to right.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Number { .. } | Node::String { .. } | Node::VarAccess { .. } => Vec::new(),
            Node::VarAssign { value, .. } => vec![&**value],
            Node::UnaryOp { operand, .. } => vec![&**operand],
            Node::BinOp { left, right, .. } => vec![&**left, &**right],
            Node::Call { args, .. } => args.iter().collect(),
            Node::If {
                condition, body, ..
            } => {
                let mut out: Vec<&Node> = vec![&**condition];
                out.extend(body.body.iter());
                out
            }
            Node::CodeBlock(block) | Node::FunctionDecl { body: block, .. } => {
                block.body.iter().collect()
            }
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, node) in self.body.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{node}")?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Number { value, .. } => write!(f, "{value}"),
            Node::String { value, .. } => write!(f, "{value:?}"),
            Node::VarAccess { name, .. } => f.write_str(name),
            Node::VarAssign { name, value, .. } => write!(f, "{name} = {value}"),
            Node::UnaryOp { op, operand, .. } => match op {
                UnaryOp::Neg => write!(f, "(-{operand})"),
                UnaryOp::Not => write!(f, "(not {operand})"),
            },
            Node::BinOp {
                left, op, right, ..
            } => write!(f, "({left} {} {right})", op.symbol()),
            Node::Call { callee, args, .. } => {
                write!(f, "{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Node::If {
                condition, body, ..
            } => write!(f, "if {condition} {body}"),
            Node::CodeBlock(block) => write!(f, "{block}"),
            Node::FunctionDecl { name, body, .. } => write!(f, "func {name}() {body}"),
        }
    }
}
