//! `pack.mcmeta` and the `load`/`tick` function tags.

use crate::model::{FunctionTag, PackLayout, ProcessedProject};
use crate::processor::{LOAD_FUNCTION, TICK_FUNCTION};
use std::fs;
use std::io;
use std::path::Path;

pub fn emit(project: &ProcessedProject, layout: &PackLayout) -> io::Result<()> {
    fs::create_dir_all(&layout.build_dir)?;
    write_json(&layout.manifest_path(), &project.manifest)?;

    let tag_dir = layout.tag_dir();
    fs::create_dir_all(&tag_dir)?;
    for name in [LOAD_FUNCTION, TICK_FUNCTION] {
        write_json(
            &tag_dir.join(format!("{name}.json")),
            &function_tag(project, name),
        )?;
    }
    Ok(())
}

/// Tag pointing at `<namespace>:<name>`, empty when the pack has no such function.
pub fn function_tag(project: &ProcessedProject, name: &str) -> FunctionTag {
    let values = if project.has_function(name) {
        vec![format!("{}:{name}", project.namespace)]
    } else {
        Vec::new()
    };
    FunctionTag { values }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)
}
