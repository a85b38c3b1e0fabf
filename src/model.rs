use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::processor::codegen::Artifacts;
use crate::processor::position::SourceFile;

/// `(newest version of the previous format, format)`; a game version newer
/// than the key uses the format. Anything not newer than the last key is 4.
pub const PACK_FORMATS: &[((u32, u32, u32), u32)] = &[
    ((1, 21, 3), 61),
    ((1, 21, 1), 57),
    ((1, 20, 6), 48),
    ((1, 20, 4), 41),
    ((1, 20, 2), 26),
    ((1, 20, 1), 18),
    ((1, 19, 4), 15),
    ((1, 19, 3), 12),
    ((1, 18, 2), 10),
    ((1, 18, 1), 9),
    ((1, 17, 1), 8),
    ((1, 16, 5), 7),
    ((1, 16, 1), 6),
    ((1, 14, 4), 5),
];
pub const OLDEST_PACK_FORMAT: u32 = 4;

/// From this format on the game reads `function/` instead of `functions/`.
pub const SINGULAR_FUNCTION_DIR_FORMAT: u32 = 48;

/// `src/config.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub pack: PackConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackConfig {
    /// Game version, e.g. `"1.20.4"`.
    pub version: String,
    pub description: String,
    /// Defaults to the project directory name.
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GameVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl GameVersion {
    /// `"1.20"` or `"1.20.4"`; every part must be an integer.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || anyhow!("Invalid version number (example: 1.12), got `{text}`");
        if !text.contains('.') {
            return Err(invalid());
        }

        let parts = text
            .split('.')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<Vec<u32>, _>>()
            .map_err(|_| invalid())?;

        match parts.as_slice() {
            [major, minor] => Ok(Self {
                major: *major,
                minor: *minor,
                patch: 0,
            }),
            [major, minor, patch] => Ok(Self {
                major: *major,
                minor: *minor,
                patch: *patch,
            }),
            _ => Err(invalid()),
        }
    }

    pub fn pack_format(&self) -> u32 {
        let this = (self.major, self.minor, self.patch);
        PACK_FORMATS
            .iter()
            .find(|(newest_previous, _)| this > *newest_previous)
            .map(|(_, format)| *format)
            .unwrap_or(OLDEST_PACK_FORMAT)
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Immediately-after-load representation of a project.
#[derive(Debug, Clone)]
pub struct RawProject {
    pub root: PathBuf,
    pub namespace: String,
    pub version: GameVersion,
    pub description: String,
    /// `None` when the project has no `src/main.mclang`.
    pub source: Option<SourceFile>,
}

impl RawProject {
    pub fn pack_format(&self) -> u32 {
        self.version.pack_format()
    }

    pub fn layout(&self) -> PackLayout {
        PackLayout::new(&self.root.join("build"), &self.namespace, self.pack_format())
    }
}

/// Where every output file of a built pack lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackLayout {
    pub build_dir: PathBuf,
    pub namespace: String,
    function_dir_name: &'static str,
}

impl PackLayout {
    pub fn new(build_dir: &Path, namespace: &str, pack_format: u32) -> Self {
        let function_dir_name = if pack_format >= SINGULAR_FUNCTION_DIR_FORMAT {
            "function"
        } else {
            "functions"
        };
        Self {
            build_dir: build_dir.to_path_buf(),
            namespace: namespace.to_string(),
            function_dir_name,
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.build_dir.join("pack.mcmeta")
    }

    /// `data/minecraft/tags/function[s]`
    pub fn tag_dir(&self) -> PathBuf {
        self.build_dir
            .join("data")
            .join("minecraft")
            .join("tags")
            .join(self.function_dir_name)
    }

    /// `data/<namespace>/function[s]`
    pub fn function_dir(&self) -> PathBuf {
        self.build_dir
            .join("data")
            .join(&self.namespace)
            .join(self.function_dir_name)
    }
}

/// Fully processed output handed to `writer`.
#[derive(Debug, Clone)]
pub struct ProcessedProject {
    pub namespace: String,
    pub manifest: PackManifest,
    pub artifacts: Artifacts,
}

impl ProcessedProject {
    pub fn has_function(&self, name: &str) -> bool {
        self.artifacts.contains_key(name)
    }
}

/// `pack.mcmeta`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackManifest {
    pub pack: PackInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackInfo {
    pub pack_format: u32,
    pub description: String,
}

/// `data/minecraft/tags/function[s]/<tag>.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionTag {
    pub values: Vec<String>,
}
