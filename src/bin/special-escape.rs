//! Escapes utf-8 localisation files so EU4 and CK2 can display them.
//!
//! Accepts either a single file or a directory, which is walked for `yml`,
//! `csv`, and `txt` files.

use clap::Parser;
use pdx_escape::{Direction, Transcoder, Variant};
use std::{error, ffi::OsString, path::PathBuf, process::ExitCode};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "special-escape")]
#[command(about = "Special escape encoder for EU4 and CK2 localisation files")]
#[command(version)]
struct Cli {
    /// Source file or directory
    src: PathBuf,

    /// Output file or directory. Defaults to `<source>.encode`
    #[arg(short, long, value_name = "X")]
    out: Option<PathBuf>,

    /// Game type: eu4 or ck2
    #[arg(short = 't', long = "type", default_value = "eu4", value_parser = parse_variant)]
    variant: Variant,

    /// Source files are utf-8 with a byte order mark
    #[arg(long)]
    bom: bool,

    /// Restore escaped files into utf-8 text instead
    #[arg(long)]
    decode: bool,

    /// Print a json report of every transcoded file
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_variant(s: &str) -> Result<Variant, pdx_escape::Error> {
    s.parse()
}

/// Accepts the single dash long flags of the original script (`-out`,
/// `-type`, and their `=` forms) by rewriting them to their `--` spelling.
fn legacy_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let rewritten = arg.to_str().and_then(|x| {
                ["-out", "-type"].iter().find_map(|flag| {
                    let rest = x.strip_prefix(flag)?;
                    if rest.is_empty() || rest.starts_with('=') {
                        Some(OsString::from(format!("-{}{}", flag, rest)))
                    } else {
                        None
                    }
                })
            });
            rewritten.unwrap_or(arg)
        })
        .collect()
}

fn run(cli: &Cli) -> Result<(), Box<dyn error::Error>> {
    let direction = if cli.decode {
        Direction::Decode
    } else {
        Direction::Encode
    };

    let reports = Transcoder::new(cli.variant)
        .strip_bom(cli.bom)
        .direction(direction)
        .run(&cli.src, cli.out.as_deref())?;

    if cli.json {
        let stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(stdout, &reports)?;
        println!();
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(legacy_args(std::env::args_os()));

    let default = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("special-escape: {}", e);
            ExitCode::FAILURE
        }
    }
}
