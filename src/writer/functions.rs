//! One `.mcfunction` file per artifact.

use crate::model::{PackLayout, ProcessedProject};
use std::fs;
use std::io;
use std::path::Path;

pub const EXTENSION: &str = "mcfunction";

/// Create the function directory and drop `.mcfunction` files left by a previous build.
pub fn prepare(layout: &PackLayout) -> io::Result<()> {
    let dir = layout.function_dir();
    fs::create_dir_all(&dir)?;
    remove_stale(&dir)
}

fn remove_stale(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == EXTENSION) {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

pub fn emit(project: &ProcessedProject, layout: &PackLayout) -> io::Result<()> {
    let dir = layout.function_dir();
    fs::create_dir_all(&dir)?;
    for artifact in project.artifacts.values() {
        let path = dir.join(format!("{}.{EXTENSION}", artifact.name));
        let mut text = artifact.text();
        if !text.is_empty() {
            text.push('\n');
        }
        fs::write(&path, text)?;
    }
    Ok(())
}
