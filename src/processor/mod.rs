//! The functional core: source text in, command artifacts out.
//!
//! text → `lexer` → tokens → `script_parser` → AST → `codegen` → artifacts.
//! Nothing in here touches the filesystem.
pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod position;
pub mod script_parser;

use anyhow::{Result, anyhow};

use crate::model::{PackInfo, PackManifest, ProcessedProject, RawProject};
use ast::Block;
use codegen::{Artifact, Artifacts, TEMP_OBJECTIVE, VARS_OBJECTIVE};
use error::CompileResult;
use position::SourceFile;

/// Name of the artifact the game runs once on (re)load.
pub const LOAD_FUNCTION: &str = "load";
/// Name of the artifact the game runs every tick.
pub const TICK_FUNCTION: &str = "tick";

/// Result of compiling one source unit.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub program: Block,
    pub artifacts: Artifacts,
}

/// Lex, parse and lower `source`, failing on the first error.
pub fn compile(source: &SourceFile, namespace: &str) -> CompileResult<Compiled> {
    let tokens = lexer::tokenize(&source.text)?;
    let program = script_parser::parse(tokens)?;
    crate::ast_log!(#program);
    let artifacts = codegen::generate(&program, namespace)?;
    Ok(Compiled { program, artifacts })
}

/// Objective declarations every pack runs before anything else.
pub fn bootstrap_lines() -> Vec<String> {
    vec![
        format!("scoreboard objectives add {VARS_OBJECTIVE} dummy {{\"text\": \"MCLang Variables\"}}"),
        format!("scoreboard objectives add {TEMP_OBJECTIVE} dummy {{\"text\": \"MCLang Temp\"}}"),
    ]
}

/// Runs every processing pass and returns a read-only structure for writers.
pub fn run(raw: &RawProject) -> Result<ProcessedProject> {
    let mut artifacts = match &raw.source {
        Some(source) => {
            compile(source, &raw.namespace)
                .map_err(|e| anyhow!("{}", e.render(source)))?
                .artifacts
        }
        None => Artifacts::new(),
    };

    let load = artifacts
        .entry(LOAD_FUNCTION.to_string())
        .or_insert_with(|| Artifact {
            name: LOAD_FUNCTION.to_string(),
            lines: Vec::new(),
        });
    let mut lines = bootstrap_lines();
    lines.append(&mut load.lines);
    load.lines = lines;

    Ok(ProcessedProject {
        namespace: raw.namespace.clone(),
        manifest: PackManifest {
            pack: PackInfo {
                pack_format: raw.pack_format(),
                description: raw.description.clone(),
            },
        },
        artifacts,
    })
}
