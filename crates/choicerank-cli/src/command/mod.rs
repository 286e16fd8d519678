use clap::{Parser, Subcommand};

use self::{compare_groups::CompareGroupsArg, rank_choices::RankChoicesArg};
use crate::logging;

mod compare_groups;
mod rank_choices;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log filter, e.g. `debug` or `choicerank_analysis=debug` (overrides `RUST_LOG`)
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Which experiment to analyze
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Analyze the ranking experiment: rank sums, drift and proportions
    RankChoices(#[clap(flatten)] RankChoicesArg),
    /// Analyze the slider experiment: responses by revealed opinion
    CompareGroups(#[clap(flatten)] CompareGroupsArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    logging::init(args.log_level.as_deref())?;
    match args.mode {
        Mode::RankChoices(arg) => rank_choices::run(&arg)?,
        Mode::CompareGroups(arg) => compare_groups::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_log_level_after_subcommand() {
        let args = CommandArgs::try_parse_from([
            "choicerank",
            "rank-choices",
            "in.csv",
            "out",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(matches!(args.mode, Mode::RankChoices(_)));
    }
}
