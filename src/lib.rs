pub mod cli;
pub mod loader;
pub mod logging;
pub mod model;
pub mod processor;
pub mod writer;

use std::path::Path;

use anyhow::{Context, anyhow};
use clap::Parser;
use saying::say;

use crate::model::ProcessedProject;
use crate::processor::position::SourceFile;

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    match args.command {
        cli::Command::Build { project } => {
            let processed = build(&project)?;
            say!(
                Green "Built ",
                Green processed.artifacts.len(),
                Green " functions into ",
                Green project.join("build").display().to_string()
            );
        }
        cli::Command::Check { file, namespace } => check(&file, &namespace)?,
    }

    Ok(())
}

/// Load, compile and write a whole project.
pub fn build(project_dir: &Path) -> anyhow::Result<ProcessedProject> {
    // 1. ── Load ───────────────────────────────────────────────────────
    let raw_project = loader::load(project_dir)
        .with_context(|| format!("Loading project {}", project_dir.display()))?;
    let layout = raw_project.layout();

    writer::functions::prepare(&layout)
        .with_context(|| format!("Preparing {}", layout.function_dir().display()))?;

    // 2. ── Process ────────────────────────────────────────────────────
    let processed = processor::run(&raw_project).with_context(|| "Compiling main.mclang")?;

    // 3. ── Write outputs ──────────────────────────────────────────────
    writer::meta::emit(&processed, &layout).with_context(|| "Writing pack metadata")?;
    writer::functions::emit(&processed, &layout).with_context(|| "Writing functions")?;

    Ok(processed)
}

/// Compile one file and print every artifact, writing nothing.
pub fn check(file: &Path, namespace: &str) -> anyhow::Result<()> {
    loader::validate_namespace(namespace)?;
    let text =
        std::fs::read_to_string(file).with_context(|| format!("Reading {}", file.display()))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    let source = SourceFile::new(name, text);

    let compiled =
        processor::compile(&source, namespace).map_err(|e| anyhow!("{}", e.render(&source)))?;

    for artifact in compiled.artifacts.values() {
        say!(Bright Black format!("# {namespace}:{}", artifact.name));
        println!("{}", artifact.text());
    }

    Ok(())
}
