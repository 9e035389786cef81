use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use crate::cli::{Cli, Command, CopyRangeArgs, TouchArgs, TransferArgs, WriteArgs};
use crate::config::{self, FilekitConfig};
use crate::error::{EnsureParentError, OpsError, StatusCode, status};
use crate::{copy, ops, paths};

const STDIO_PATH: &str = "-";

pub fn run(cli: Cli) -> Result<ExitCode> {
    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Mkdir { path } => Ok(report(&paths::ensure_directory(&path))),
        Command::Mkparent { path } => Ok(report(&paths::ensure_parent_directory(&path))),
        Command::Touch(args) => Ok(handle_touch(args)),
        Command::CopyRange(args) => handle_copy_range(&config, args),
        Command::Cp(args) => handle_transfer(&config, args, ops::copy_path),
        Command::Mv(args) => handle_transfer(&config, args, ops::move_path),
        Command::Rm { path } => {
            ops::delete(&path).with_context(|| format!("deleting {}", path.display()))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Cat { path } => {
            let text = ops::read_text(&path)?;
            print!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Write(args) => handle_write(&config, args),
        Command::CheckName { name } => {
            if ops::is_file_name_valid(&name) {
                println!("valid");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("invalid");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

/// Print the status code of a helper and turn it into the process exit code.
fn report<T, E>(result: &Result<T, E>) -> ExitCode
where
    E: StatusCode + std::error::Error,
{
    if let Err(err) = result {
        tracing::warn!(code = err.code(), error = %err, "operation failed");
    }
    let code = status(result);
    println!("{code}");
    if code == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn handle_touch(args: TouchArgs) -> ExitCode {
    match args.init {
        Some(text) => report(&paths::create_file_if_absent_with(&args.path, |file| {
            file.write_all(text.as_bytes())
        })),
        None => report(&paths::create_file_if_absent(&args.path)),
    }
}

fn handle_copy_range(config: &FilekitConfig, args: CopyRangeArgs) -> Result<ExitCode> {
    let buffer_size = args.buffer_size.unwrap_or_else(|| config.buffer_size());
    let mut input = open_input(&args.input, args.skip)?;

    let copied = if args.output == Path::new(STDIO_PATH) {
        let mut stdout = io::stdout().lock();
        let copied = copy::copy_exact(&mut input, &mut stdout, args.length, buffer_size)?;
        stdout.flush().context("flushing stdout")?;
        copied
    } else {
        match paths::ensure_parent_directory(&args.output) {
            Ok(()) | Err(EnsureParentError::NoParent(_)) => {}
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("preparing {}", args.output.display())));
            }
        }
        let mut output = File::create(&args.output)
            .with_context(|| format!("creating {}", args.output.display()))?;
        copy::copy_exact(&mut input, &mut output, args.length, buffer_size)?
    };

    tracing::info!(copied, buffer_size, "copy-range complete");
    Ok(ExitCode::SUCCESS)
}

fn open_input(path: &Path, skip: u64) -> Result<Box<dyn Read>> {
    if path == Path::new(STDIO_PATH) {
        let mut stdin = io::stdin().lock();
        io::copy(&mut (&mut stdin).take(skip), &mut io::sink()).context("skipping stdin")?;
        return Ok(Box::new(stdin));
    }

    let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    if skip > 0 {
        file.seek(SeekFrom::Start(skip))
            .with_context(|| format!("seeking {} to {}", path.display(), skip))?;
    }
    Ok(Box::new(file))
}

fn handle_transfer(
    config: &FilekitConfig,
    args: TransferArgs,
    op: fn(&Path, &Path, ops::ExistPolicy) -> Result<(), OpsError>,
) -> Result<ExitCode> {
    let policy = args.policy.unwrap_or_else(|| config.exist_policy());
    op(&args.src, &args.dst, policy).with_context(|| {
        format!(
            "{} -> {} (policy {})",
            args.src.display(),
            args.dst.display(),
            policy.as_str()
        )
    })?;
    Ok(ExitCode::SUCCESS)
}

fn handle_write(config: &FilekitConfig, args: WriteArgs) -> Result<ExitCode> {
    let policy = args.policy.unwrap_or_else(|| config.exist_policy());
    ops::write_text(&args.path, &args.text, policy)
        .with_context(|| format!("writing {}", args.path.display()))?;
    Ok(ExitCode::SUCCESS)
}
