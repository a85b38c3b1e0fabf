use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::model::{GameVersion, ProjectConfig, RawProject};
use crate::processor::position::SourceFile;

pub const CONFIG_FILE: &str = "config.toml";
pub const MAIN_FILE: &str = "main.mclang";

/// Read `<project>/src/config.toml` and, if present, `<project>/src/main.mclang`.
///
/// The namespace defaults to the project directory name and must only use
/// characters the game accepts in a namespace: `a-z 0-9 _ - .`
pub fn load(project_dir: &Path) -> Result<RawProject> {
    let src_dir = project_dir.join("src");
    let config_path = src_dir.join(CONFIG_FILE);

    let text = fs::read_to_string(&config_path)
        .with_context(|| format!("Reading {}", config_path.display()))?;
    let config = parse_config(&text)
        .with_context(|| format!("Parsing {}", config_path.display()))?;
    let version = GameVersion::parse(&config.pack.version)?;

    let namespace = match config.pack.namespace {
        Some(ns) => ns,
        None => default_namespace(project_dir)?,
    };
    validate_namespace(&namespace)?;

    let main_path = src_dir.join(MAIN_FILE);
    let source = if main_path.is_file() {
        let text = fs::read_to_string(&main_path)
            .with_context(|| format!("Reading {}", main_path.display()))?;
        Some(SourceFile::new(MAIN_FILE, text))
    } else {
        None
    };

    Ok(RawProject {
        root: project_dir.to_path_buf(),
        namespace,
        version,
        description: config.pack.description,
        source,
    })
}

pub fn parse_config(text: &str) -> Result<ProjectConfig> {
    Ok(toml::from_str(text)?)
}

fn default_namespace(project_dir: &Path) -> Result<String> {
    let dir = fs::canonicalize(project_dir)
        .with_context(|| format!("Resolving {}", project_dir.display()))?;
    match dir.file_name().and_then(|n| n.to_str()) {
        Some(name) => Ok(name.to_string()),
        None => bail!(
            "cannot derive a namespace from {}, set `namespace` in [pack]",
            dir.display()
        ),
    }
}

pub fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        bail!("namespace must not be empty");
    }
    if let Some(bad) = namespace
        .chars()
        .find(|c| !matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.'))
    {
        bail!("namespace `{namespace}` contains invalid character '{bad}'");
    }
    Ok(())
}
