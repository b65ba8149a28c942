// ABOUTME: Command-line arguments for vshell.
// ABOUTME: Three required positionals plus optional config and workdir flags.

use std::path::PathBuf;

use clap::Parser;

/// Toy shell over an extracted tar archive, logging every command to XML.
#[derive(Debug, Clone, Parser)]
#[command(name = "vshell", version)]
pub struct Cli {
    /// Name shown in the prompt and recorded in the log.
    pub username: String,
    /// Tar archive to extract and explore.
    pub archive: PathBuf,
    /// XML file that receives one <action> per command.
    pub log: PathBuf,
    /// Config file to use instead of ~/.vshell/config.toml.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Keep the extracted directory after exiting.
    #[arg(long)]
    pub keep_workdir: bool,
}
