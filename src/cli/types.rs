//! CLI type definitions.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "kmsconfig")]
#[command(about = "Resolve a value from KMS-backed configuration", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the config folder
    #[arg(short, long, default_value = "./config")]
    pub path: PathBuf,

    /// Node key to resolve, in the format 'section.node'
    #[arg(short, long)]
    pub node: String,
}
