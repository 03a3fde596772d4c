//! midireverse CLI: reverse Standard MIDI Files so they play backward.
//!
//! Usage:
//!   midireverse                         reverse every .mid file here (asks first)
//!   midireverse --confirm               same, without asking
//!   midireverse <file|dir> [output_dir] reverse one file or a whole directory

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::LevelFilter;
use mr_master::Plan;

#[derive(Parser, Debug)]
#[command(name = "midireverse", version, about = "Reverse MIDI files with correct channel state")]
struct Cli {
    /// Reverse every MIDI file in the current directory without asking
    #[arg(short = 'y', long, conflicts_with = "input")]
    confirm: bool,

    /// Log per-file details
    #[arg(short, long)]
    verbose: bool,

    /// MIDI file or directory of MIDI files
    input: Option<PathBuf>,

    /// Where reversed files go (default: a `reverse` directory)
    output_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = env::current_dir().context("failed to read current directory")?;
    let input = match &cli.input {
        Some(path) => path.clone(),
        None if cli.confirm => cwd.clone(),
        None => {
            print!(
                "Reverse all .mid files in the current folder? \
                 Output files will be put in the {} folder. [y/N] ",
                mr_master::OUTPUT_DIR_NAME
            );
            io::stdout().flush()?;
            if !confirmed(io::stdin().lock())? {
                println!();
                Cli::command().print_help()?;
                return Ok(());
            }
            cwd.clone()
        }
    };

    let plan = Plan::resolve(&input, cli.output_dir.as_deref(), &cwd)?;
    let summary = mr_master::run(&plan)
        .with_context(|| format!("cannot write to {}", plan.output_dir.display()))?;

    println!("Files saved: {}, errors: {}", summary.saved, summary.errors);
    Ok(())
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

/// Read one answer line; "y" or "yes" in any case confirms.
fn confirmed(mut input: impl BufRead) -> io::Result<bool> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_means_prompt() {
        let cli = Cli::try_parse_from(["midireverse"]).unwrap();
        assert!(!cli.confirm);
        assert!(cli.input.is_none());
    }

    #[test]
    fn confirm_flag_forms() {
        assert!(Cli::try_parse_from(["midireverse", "--confirm"]).unwrap().confirm);
        assert!(Cli::try_parse_from(["midireverse", "-y"]).unwrap().confirm);
    }

    #[test]
    fn input_and_output_dir() {
        let cli = Cli::try_parse_from(["midireverse", "song.mid", "out"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("song.mid")));
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn confirm_with_input_is_rejected() {
        assert!(Cli::try_parse_from(["midireverse", "--confirm", "song.mid"]).is_err());
    }

    #[test]
    fn too_many_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["midireverse", "a", "b", "c"]).is_err());
    }

    #[test]
    fn confirmation_answers() {
        for answer in ["y\n", "Y\n", "yes\n", " YES \r\n"] {
            assert!(confirmed(answer.as_bytes()).unwrap(), "{:?}", answer);
        }
        for answer in ["n\n", "\n", "", "yep\n"] {
            assert!(!confirmed(answer.as_bytes()).unwrap(), "{:?}", answer);
        }
    }
}
