use std::path::PathBuf;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

use crate::ops::ExistPolicy;

/// Top-level CLI definition for the `filekit` binary.
#[derive(Parser, Debug)]
#[command(name = "filekit", version, about = "Small file-system helpers")]
pub struct Cli {
    /// Configuration file (defaults to `<config dir>/filekit/config.toml` when present).
    #[arg(long = "config", global = true)]
    pub config: Option<Utf8PathBuf>,
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ensure a directory exists and print the status code.
    Mkdir { path: PathBuf },
    /// Ensure the parent directory of a path exists and print the status code.
    Mkparent { path: PathBuf },
    /// Create an empty file unless it already exists.
    Touch(TouchArgs),
    /// Copy an exact number of bytes between files (`-` means stdin/stdout).
    CopyRange(CopyRangeArgs),
    /// Copy a file or directory tree.
    Cp(TransferArgs),
    /// Move a file or directory tree.
    Mv(TransferArgs),
    /// Delete a file or directory tree.
    Rm { path: PathBuf },
    /// Print a text file.
    Cat { path: PathBuf },
    /// Write text to a file.
    Write(WriteArgs),
    /// Check a file name for forbidden characters.
    CheckName { name: String },
}

#[derive(Args, Debug)]
pub struct TouchArgs {
    pub path: PathBuf,
    /// Initial contents, written only when the file is newly created.
    #[arg(long = "init")]
    pub init: Option<String>,
}

#[derive(Args, Debug)]
pub struct CopyRangeArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    #[arg(short = 'n', long = "length")]
    pub length: u64,
    /// Bytes to skip in the input before copying (files only).
    #[arg(long = "skip", default_value_t = 0)]
    pub skip: u64,
    #[arg(long = "buffer-size")]
    pub buffer_size: Option<usize>,
}

#[derive(Args, Debug)]
pub struct TransferArgs {
    pub src: PathBuf,
    pub dst: PathBuf,
    #[arg(long = "policy", value_enum)]
    pub policy: Option<ExistPolicy>,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    pub path: PathBuf,
    pub text: String,
    #[arg(long = "policy", value_enum)]
    pub policy: Option<ExistPolicy>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_copy_range() {
        let cli = Cli::try_parse_from([
            "filekit", "copy-range", "in.bin", "-", "--length", "10", "--buffer-size", "4",
        ])
        .unwrap();
        match cli.command {
            Command::CopyRange(args) => {
                assert_eq!(args.length, 10);
                assert_eq!(args.buffer_size, Some(4));
                assert_eq!(args.skip, 0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_policy_value() {
        let cli = Cli::try_parse_from(["filekit", "cp", "a", "b", "--policy", "skip"]).unwrap();
        match cli.command {
            Command::Cp(args) => assert_eq!(args.policy, Some(ExistPolicy::Skip)),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
