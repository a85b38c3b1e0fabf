//! Structured compile errors shared by every stage of the pipeline.
//!
//! All stages are fail-fast: the first `CompileError` produced anywhere
//! aborts the compile, so there is never more than one to report.

use std::fmt;

use thiserror::Error;

use super::position::{SourceFile, Span};

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    IllegalCharacter,
    InvalidSyntax,
    UnsupportedConstruct,
    NestingTooDeep,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::IllegalCharacter => "Illegal Character",
            ErrorKind::InvalidSyntax => "Invalid Syntax",
            ErrorKind::UnsupportedConstruct => "Unsupported Construct",
            ErrorKind::NestingTooDeep => "Nesting Too Deep",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}{} (line {}, column {})", detail_suffix(.detail), line_of(.span), column_of(.span))]
pub struct CompileError {
    pub kind: ErrorKind,
    pub span: Span,
    pub detail: Option<String>,
}

fn line_of(span: &Span) -> usize {
    span.start.line + 1
}

fn column_of(span: &Span) -> usize {
    span.start.column + 1
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {d}"),
        None => String::new(),
    }
}

impl CompileError {
    pub fn new(kind: ErrorKind, span: Span, detail: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            detail: Some(detail.into()),
        }
    }

    pub fn illegal_char(span: Span, ch: char) -> Self {
        Self::new(ErrorKind::IllegalCharacter, span, format!("\"{ch}\""))
    }

    pub fn syntax(span: Span, detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSyntax, span, detail)
    }

    pub fn unsupported(span: Span, detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedConstruct, span, detail)
    }

    pub fn too_deep(span: Span, limit: usize) -> Self {
        Self::new(
            ErrorKind::NestingTooDeep,
            span,
            format!("nesting exceeds {limit} levels"),
        )
    }

    /// Excerpt of the offending line followed by the message.
    pub fn render(&self, source: &SourceFile) -> String {
        let line = self.span.start.line;
        format!(
            "At {}, line {}:\n{}\n{}{}",
            source.name,
            line + 1,
            source.line(line),
            self.kind,
            detail_suffix(&self.detail)
        )
    }
}
