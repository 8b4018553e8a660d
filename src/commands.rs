//! Subcommand dispatch.

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use stockshot_archive::Compression;
use stockshot_catalog::IdentifierTable;
use stockshot_config::Config;
use stockshot_library::pack::Packing;
use stockshot_library::{ColourPlan, Context, OrderPlan, RunId, Stage, Summary, default_concurrency};
use stockshot_library::{colour, front, identify, pack, position};

/// Builds the stage context from configuration.
pub fn context(config: &Config, dry_run: bool) -> Context {
    Context {
        filter: config.image_filter(),
        dry_run,
        offset: config.positions.offset,
        min_width: config.positions.min_width,
        concurrency: config.positions.concurrency.unwrap_or_else(default_concurrency),
        carry_extras: config.positions.carry_extras,
        key_depth: config.identifiers.key_depth,
    }
}

/// The run id a packed tree belongs to: its directory name without the
/// identifier suffix.
pub fn archive_prefix(tree: &Path, suffix: &str) -> String {
    let name = tree.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "archive".to_string());
    match name.strip_suffix(suffix) {
        Some(stripped) if !suffix.is_empty() && !stripped.is_empty() => stripped.to_string(),
        _ => name,
    }
}

fn load_table(path: &Path) -> Result<IdentifierTable> {
    IdentifierTable::load(path).or_raise(|| ErrorKind::Table(path.to_path_buf()))
}

/// Prints a summary and, when it wrote anything, where to.
fn print(summary: &Summary, dry_run: bool) {
    println!("{summary}");
    if let Some(output) = &summary.output {
        match dry_run {
            true => println!("Would write to {}", output.display()),
            false => println!("Output: {}", output.display()),
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    if let Some(output) = cli.output {
        config.output.directory = output;
    }
    let ctx = context(&config, cli.dry_run);
    let run_id = RunId::now();
    let fresh_root = |suffix: &str| run_id.output_root(&config.output.directory, suffix);
    tracing::debug!(%run_id, dry_run = cli.dry_run, "Starting");

    let summary = match cli.command {
        Command::Leaves { root } => return leaves(&root, &ctx).await,
        Command::Colour { root, plan } => {
            let plan = ColourPlan::load(&plan).await.or_raise(|| ErrorKind::Plan(plan.clone()))?;
            colour::run(&root, &plan, &fresh_root(""), &ctx).await.or_raise(|| ErrorKind::Stage(Stage::Colour))?
        },
        Command::Order { root, plan } => {
            let plan = OrderPlan::load(&plan).await.or_raise(|| ErrorKind::Plan(plan.clone()))?;
            position::run(&root, &plan, &fresh_root(""), &ctx).await.or_raise(|| ErrorKind::Stage(Stage::Position))?
        },
        Command::Identify { root, table } => {
            let table = load_table(table.as_deref().unwrap_or(&config.identifiers.table))?;
            let output = fresh_root(&config.output.identifier_suffix);
            identify::copy(&root, &table, &output, &ctx).await.or_raise(|| ErrorKind::Stage(Stage::Identify))?
        },
        Command::Rekey { root, table } => {
            let table = load_table(table.as_deref().unwrap_or(&config.identifiers.table))?;
            identify::rename(&root, &table, &ctx).await.or_raise(|| ErrorKind::Stage(Stage::Rekey))?
        },
        Command::Front { fronts, root } => {
            front::run(&fronts, &root, &ctx).await.or_raise(|| ErrorKind::Stage(Stage::Front))?
        },
        Command::Pack { tree, cap, compression } => {
            let compression = match compression {
                Some(c) => c.parse::<Compression>().or_raise(|| ErrorKind::Argument(format!("--compression {c}")))?,
                None => config.archive.compression,
            };
            let cap = cap.unwrap_or(config.archive.cap_bytes);
            if cap == 0 {
                exn::bail!(ErrorKind::Argument("--cap must be greater than zero".to_string()));
            }
            let dest = tree.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
            let name = archive_prefix(&tree, &config.output.identifier_suffix);
            pack::run(&tree, &dest, &name, Packing { cap, compression }, &ctx)
                .await
                .or_raise(|| ErrorKind::Stage(Stage::Pack))?
        },
    };
    print(&summary, cli.dry_run);
    Ok(())
}

async fn leaves(root: &Path, ctx: &Context) -> Result<()> {
    let leaves = stockshot_storage::discover(root, &ctx.filter).await.or_raise(|| ErrorKind::Argument(root.display().to_string()))?;
    for leaf in &leaves {
        let key = leaf.key();
        println!("{}\t{}", if key.is_empty() { "." } else { key.as_str() }, leaf.len());
    }
    println!("{} leaves", leaves.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Outputs/20250304-093015_identified", "_identified", "20250304-093015")]
    #[case("Outputs/20250304-093015", "_identified", "20250304-093015")]
    #[case("Outputs/_identified", "_identified", "_identified")]
    #[case("Final", "", "Final")]
    fn test_archive_prefix(#[case] tree: &str, #[case] suffix: &str, #[case] expected: &str) {
        assert_eq!(archive_prefix(Path::new(tree), suffix), expected);
    }

    #[test]
    fn context_follows_config() {
        let mut config = Config::default();
        config.positions.offset = 1;
        config.positions.concurrency = Some(3);
        config.identifiers.key_depth = 5;
        let ctx = context(&config, true);
        assert!(ctx.dry_run);
        assert_eq!((ctx.offset, ctx.concurrency, ctx.key_depth), (1, 3, 5));
        assert_eq!(context(&Config::default(), false).concurrency, default_concurrency());
    }
}
