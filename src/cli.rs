use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build `<project>/src` into a datapack under `<project>/build`
    Build {
        /// Project directory
        project: PathBuf,
    },
    /// Compile a single .mclang file and print the generated functions
    Check {
        /// Source file
        file: PathBuf,
        /// Namespace used in generated `function` calls
        #[arg(long, default_value = "main")]
        namespace: String,
    },
}
