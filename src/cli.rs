//! CLI argument parsing and invocation mode resolution.
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::{ffi::OsString, path::PathBuf};

use crate::{FastlaneError, Result, config::Target};

/// Tag, push and announce a fastlane release of the current branch.
///
/// Without flags the current branch is tagged as
/// `fastlane-<user>-<branch>`, the tag is pushed and jenkins is notified.
#[derive(Parser, Debug, Default)]
#[command(
    name = "fastlane-release",
    about,
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
pub struct Args {
    #[arg(short, long)]
    /// Print the tag and push commands instead of running them.
    pub dry_run: bool,

    #[arg(short, long)]
    /// Print this help and exit.
    pub help: bool,

    #[arg(short = 'v', long)]
    /// Print the tool version and check it against the required version.
    pub version: bool,

    #[arg(short, long, value_name = "NAME")]
    /// Create NAME from the production branch, push it and exit.
    pub branch: Option<String>,

    #[arg(short, long)]
    /// Use the test jenkins and test version config.
    pub test_jenkins: bool,

    #[arg(short, long)]
    /// Skip the required version check.
    pub force: bool,

    #[arg(long, value_name = "PATH")]
    /// Config file to load instead of ./fastlane.toml.
    pub config: Option<PathBuf>,

    #[arg(long)]
    /// Enable debug logging.
    pub debug: bool,
}

/// What a single invocation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    CreateBranch(String),
    ShowHelp,
    PrintVersion,
    Release { dry_run: bool },
}

/// Typed view of the flags that drive a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub mode: Mode,
    pub target: Target,
    pub force: bool,
}

impl Invocation {
    /// Resolve the mode from parsed flags.
    ///
    /// `--help` and `--branch` exit early, so when both are present the one
    /// given first wins. Either beats `--version`, which beats a release.
    pub fn resolve(
        args: &Args,
        help_index: Option<usize>,
        branch_index: Option<usize>,
    ) -> Self {
        let help_first = match (help_index, branch_index) {
            (Some(help), Some(branch)) => help < branch,
            _ => true,
        };

        let mode = match (&args.branch, args.help) {
            (Some(name), true) if !help_first => {
                Mode::CreateBranch(name.clone())
            }
            (_, true) => Mode::ShowHelp,
            (Some(name), false) => Mode::CreateBranch(name.clone()),
            (None, false) if args.version => Mode::PrintVersion,
            (None, false) => Mode::Release {
                dry_run: args.dry_run,
            },
        };

        let target = if args.test_jenkins {
            Target::Test
        } else {
            Target::Production
        };

        Self {
            mode,
            target,
            force: args.force,
        }
    }
}

impl Args {
    /// Parse process arguments.
    pub fn parse_invocation() -> Result<(Self, Invocation)> {
        Self::parse_invocation_from(std::env::args_os())
    }

    /// Parse arguments from an iterator, first item being the binary name.
    pub fn parse_invocation_from<I, T>(itr: I) -> Result<(Self, Invocation)>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command()
            .try_get_matches_from(itr)
            .map_err(|e| FastlaneError::InvalidArgs(e.to_string()))?;
        let args = Self::from_arg_matches(&matches)
            .map_err(|e| FastlaneError::InvalidArgs(e.to_string()))?;
        let invocation = Invocation::resolve(
            &args,
            flag_index(&matches, "help"),
            flag_index(&matches, "branch"),
        );
        Ok((args, invocation))
    }
}

fn flag_index(matches: &ArgMatches, id: &str) -> Option<usize> {
    matches.indices_of(id).and_then(|mut indices| indices.next())
}

/// Print usage text to stdout.
pub fn print_help() -> Result<()> {
    Args::command().print_help()?;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Invocation {
        let mut full = vec!["fastlane-release"];
        full.extend_from_slice(argv);
        Args::parse_invocation_from(full).unwrap().1
    }

    #[test]
    fn defaults_to_production_release() {
        let invocation = parse(&[]);
        assert_eq!(invocation.mode, Mode::Release { dry_run: false });
        assert_eq!(invocation.target, Target::Production);
        assert!(!invocation.force);
    }

    #[test]
    fn parses_release_flags() {
        let invocation = parse(&["-d", "-t", "-f"]);
        assert_eq!(invocation.mode, Mode::Release { dry_run: true });
        assert_eq!(invocation.target, Target::Test);
        assert!(invocation.force);

        let invocation = parse(&["--dry-run", "--test-jenkins", "--force"]);
        assert_eq!(invocation.mode, Mode::Release { dry_run: true });
        assert_eq!(invocation.target, Target::Test);
    }

    #[test]
    fn version_beats_dry_run() {
        assert_eq!(parse(&["-d", "-v"]).mode, Mode::PrintVersion);
        assert_eq!(parse(&["--version", "-t"]).target, Target::Test);
    }

    #[test]
    fn branch_and_help_exit_early() {
        assert_eq!(
            parse(&["-v", "-b", "TICKET-1"]).mode,
            Mode::CreateBranch("TICKET-1".into())
        );
        assert_eq!(parse(&["-d", "-h"]).mode, Mode::ShowHelp);
    }

    #[test]
    fn first_of_help_and_branch_wins() {
        assert_eq!(parse(&["-h", "-b", "TICKET-1"]).mode, Mode::ShowHelp);
        assert_eq!(
            parse(&["--branch", "TICKET-1", "--help"]).mode,
            Mode::CreateBranch("TICKET-1".into())
        );
    }

    #[test]
    fn repeated_branch_is_last_wins() {
        assert_eq!(
            parse(&["-b", "one", "-b", "two"]).mode,
            Mode::CreateBranch("two".into())
        );
    }

    #[test]
    fn rejects_unknown_flags() {
        let result =
            Args::parse_invocation_from(["fastlane-release", "--nope"]);
        assert!(matches!(result, Err(FastlaneError::InvalidArgs(_))));
    }

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }
}
