use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stockshot", version, about = "Reorganize product photographs for marketplace listings", arg_required_else_help = true)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory new output roots are created in (default: `output.directory`).
    #[arg(long, global = true, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Plan and report, but write nothing.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// More log output (repeat for more).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the leaf directories under a tree.
    Leaves {
        #[arg(value_name = "ROOT")]
        root: PathBuf,
    },

    /// Split every leaf into one folder per colour.
    #[command(alias = "color")]
    Colour {
        #[arg(value_name = "ROOT")]
        root: PathBuf,
        /// JSON colour plan.
        #[arg(short, long, value_name = "PATH")]
        plan: PathBuf,
    },

    /// Rename images to position tags through per-base permutations.
    Order {
        #[arg(value_name = "ROOT")]
        root: PathBuf,
        /// JSON order plan.
        #[arg(short, long, value_name = "PATH")]
        plan: PathBuf,
    },

    /// Copy images into a new tree named by identifier, keyed by folder names.
    Identify {
        #[arg(value_name = "ROOT")]
        root: PathBuf,
        /// Identifier table (default: `identifiers.table`).
        #[arg(short, long, value_name = "PATH")]
        table: Option<PathBuf>,
    },

    /// Rename `<key>.<VARIANT>.<ext>` images to their identifiers in place.
    Rekey {
        #[arg(value_name = "ROOT")]
        root: PathBuf,
        /// Identifier table (default: `identifiers.table`).
        #[arg(short, long, value_name = "PATH")]
        table: Option<PathBuf>,
    },

    /// Copy `<leaf>/<colour>.jpg` front images into a tree as `MAIN.jpg`.
    Front {
        #[arg(value_name = "FRONTS")]
        fronts: PathBuf,
        #[arg(value_name = "ROOT")]
        root: PathBuf,
    },

    /// Pack a tree into size-bounded zip archives next to it.
    Pack {
        #[arg(value_name = "TREE")]
        tree: PathBuf,
        /// Largest summed file size per archive, in bytes.
        #[arg(long, value_name = "BYTES")]
        cap: Option<u64>,
        /// `stored`, `deflated` or `bzip2`.
        #[arg(long, value_name = "METHOD")]
        compression: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["stockshot", "colour", "In", "--plan", "plan.json", "--dry-run", "-vv"]).unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Colour { ref plan, .. } if plan == &PathBuf::from("plan.json")));
    }

    #[rstest]
    #[case(&["stockshot", "color", "In", "-p", "p.json"])]
    #[case(&["stockshot", "order", "In", "-p", "p.json"])]
    #[case(&["stockshot", "identify", "In"])]
    #[case(&["stockshot", "rekey", "In", "--table", "t.csv"])]
    #[case(&["stockshot", "front", "Fronts", "In"])]
    #[case(&["stockshot", "pack", "Out", "--cap", "1024", "--compression", "stored"])]
    #[case(&["stockshot", "--output", "Elsewhere", "leaves", "In"])]
    fn test_parses(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_ok());
    }

    #[rstest]
    #[case(&["stockshot", "colour", "In"])]
    #[case(&["stockshot", "front", "Fronts"])]
    #[case(&["stockshot", "pack", "Out", "--cap", "lots"])]
    fn test_rejects(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }
}
