use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::export::ExportSection;

#[derive(Parser, Debug)]
#[command(name = "notegenius")]
#[command(about = "Meeting recordings and notes to summaries and action items", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Run the local API service (default)
    Serve(ServeCliArgs),
    /// Process one audio file or set of meeting notes and print the result
    Process(ProcessCliArgs),
    /// Print the effective configuration
    Config,
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug, Default)]
pub struct ServeCliArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(ClapArgs, Debug)]
#[command(group(
    clap::ArgGroup::new("input")
        .required(true)
        .args(["file", "text", "text_file"]),
))]
pub struct ProcessCliArgs {
    /// Audio recording to process (MP3 or WAV, up to 25MB)
    pub file: Option<PathBuf>,
    /// Meeting notes passed inline
    #[arg(long)]
    pub text: Option<String>,
    /// Read meeting notes from a file
    #[arg(long)]
    pub text_file: Option<PathBuf>,
    /// Copy a section of the result to the clipboard
    #[arg(long, value_enum)]
    pub copy: Option<ExportSection>,
    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}
