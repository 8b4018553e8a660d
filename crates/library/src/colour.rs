//! Colour assignment.
//!
//! Every leaf is split into one folder per colour: the leaf's images are
//! dealt round-robin across its colour sequence, in natural order. One image
//! per leaf may be nominated as a *clone*; it skips the deal and is copied
//! into every colour instead.
//!
//! ```text
//! Brand/Case/01.jpg ┐                      Brand/Case/Black/01.jpg
//! Brand/Case/02.jpg ├─ [Black, Brown] ──▶  Brand/Case/Brown/02.jpg
//! Brand/Case/03.jpg ┘                      Brand/Case/Black/03.jpg
//! ```
//!
//! Images are copied, never moved, into a new output root that mirrors the
//! input tree.

use crate::error::{ErrorKind, Result};
use crate::output::create_output_root;
use crate::plan::{ColourPlan, clean_colours, normalize_key};
use crate::{Context, SkipReason, Stage, Summary};
use exn::ResultExt;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use stockshot_storage::{ImageFile, Leaf, copy_new, discover, natural_cmp};
use tracing::instrument;

/// Assigns colours to a leaf's images.
///
/// Images other than `clone` get `colours[i % k]` where `i` is their position
/// among the non-clone images. The clone image (matched by file name) is
/// returned once per colour, flagged as a clone. The result keeps the leaf's
/// natural order, and is empty when there are no colours.
pub fn assign(leaf: &Leaf, colours: &[String], clone: Option<&str>) -> Vec<ImageFile> {
    if colours.is_empty() {
        return Vec::new();
    }
    let mut position = 0;
    let mut assigned = Vec::with_capacity(leaf.len() + colours.len());
    for image in &leaf.images {
        if clone.is_some_and(|c| image.name() == c) {
            assigned.extend(colours.iter().map(|colour| image.clone().with_colour(colour).as_clone()));
        } else {
            assigned.push(image.clone().with_colour(&colours[position % colours.len()]));
            position += 1;
        }
    }
    assigned
}

/// Runs the colour stage over every leaf under `root`, writing into `output`.
///
/// Leaves without a colour sequence are skipped with a warning. Plan entries
/// that don't name a discovered leaf are reported and otherwise ignored.
///
/// # Errors
/// [`ErrorKind::Discovery`] when `root` can't be walked and
/// [`ErrorKind::OutputExists`] when `output` already exists; in both cases
/// nothing has been written.
#[instrument(skip_all, fields(root = %root.display(), output = %output.display()))]
pub async fn run(root: &Path, plan: &ColourPlan, output: &Path, ctx: &Context) -> Result<Summary> {
    let leaves = discover(root, &ctx.filter).await.or_raise(|| ErrorKind::Discovery)?;
    let mut summary = Summary::new(Stage::Colour).with_output(output);

    let mut colours = HashMap::new();
    for (key, sequence) in &plan.colours {
        match normalize_key(key) {
            Ok(key) => _ = colours.insert(key, clean_colours(sequence)),
            Err(e) => summary.failed(key.clone(), e),
        }
    }
    let mut clones = HashMap::new();
    for (key, name) in &plan.clones {
        match normalize_key(key) {
            Ok(key) => _ = clones.insert(key, name.trim()),
            Err(e) => summary.failed(key.clone(), e),
        }
    }

    let known: HashSet<String> = leaves.iter().map(Leaf::key).collect();
    let mut unknown: Vec<&String> = colours.keys().filter(|k| !known.contains(*k)).collect();
    unknown.sort_by(|a, b| natural_cmp(a, b));
    for key in unknown {
        summary.skipped(&root.join(key), SkipReason::NotALeaf);
    }

    create_output_root(output, ctx.dry_run).await?;
    for leaf in &leaves {
        let key = leaf.key();
        match colours.get(&key) {
            Some(sequence) if !sequence.is_empty() => {
                colour_leaf(leaf, sequence, clones.get(&key).copied(), output, ctx, &mut summary).await;
            },
            _ => summary.skipped(&leaf.path, SkipReason::NoColours),
        }
    }
    Ok(summary)
}

#[instrument(skip_all, fields(leaf = %leaf.key(), colours = colours.len()))]
async fn colour_leaf(
    leaf: &Leaf,
    colours: &[String],
    clone: Option<&str>,
    output: &Path,
    ctx: &Context,
    summary: &mut Summary,
) {
    let clone = clone.filter(|c| !c.is_empty());
    if let Some(name) = clone
        && !leaf.images.iter().any(|i| i.name() == name)
    {
        tracing::warn!(clone = name, "Clone image not found in leaf; dealing every image round-robin");
    }
    let target = output.join(&leaf.relative);
    for image in assign(leaf, colours, clone) {
        let Some(colour) = &image.colour else {
            continue;
        };
        let to = target.join(colour).join(image.name());
        if ctx.dry_run {
            summary.planned(&image.path, &to);
            continue;
        }
        match copy_new(&image.path, &to).await {
            Ok(_) => summary.copied(&image.path, &to),
            Err(e) if e.is_collision() => summary.skipped(&to, SkipReason::Collision),
            Err(e) => {
                summary.failed(leaf.key(), &*e);
                return;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Outcome;
    use crate::testing::{touch, tree};
    use std::path::PathBuf;

    fn leaf(count: usize) -> Leaf {
        Leaf {
            path: PathBuf::from("/in/Brand/Case"),
            relative: PathBuf::from("Brand/Case"),
            images: (0..count).map(|i| ImageFile::new(format!("/in/Brand/Case/{:02}.jpg", i + 1), i)).collect(),
        }
    }

    fn colours(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn bucket_sizes(assigned: &[ImageFile], colours: &[String]) -> Vec<usize> {
        colours.iter().map(|c| assigned.iter().filter(|i| i.colour.as_ref() == Some(c)).count()).collect()
    }

    #[test]
    fn round_robin_is_balanced() {
        for (m, k) in [(7, 3), (6, 3), (1, 4), (10, 1)] {
            let palette = colours(&["A", "B", "C", "D"][..k]);
            let assigned = assign(&leaf(m), &palette, None);
            assert_eq!(assigned.len(), m);
            for size in bucket_sizes(&assigned, &palette) {
                assert!(size == m / k || size == m.div_ceil(k), "m={m} k={k} size={size}");
            }
            let mut indexes: Vec<_> = assigned.iter().map(|i| i.index).collect();
            indexes.dedup();
            assert_eq!(indexes, (0..m).collect::<Vec<_>>());
        }
    }

    #[test]
    fn round_robin_follows_natural_order() {
        let assigned = assign(&leaf(4), &colours(&["Black", "Brown"]), None);
        let got: Vec<_> = assigned.iter().map(|i| (i.name(), i.colour.clone().unwrap())).collect();
        assert_eq!(
            got,
            vec![
                ("01.jpg".to_string(), "Black".to_string()),
                ("02.jpg".to_string(), "Brown".to_string()),
                ("03.jpg".to_string(), "Black".to_string()),
                ("04.jpg".to_string(), "Brown".to_string()),
            ]
        );
    }

    #[test]
    fn clone_goes_everywhere() {
        let palette = colours(&["Black", "Brown", "Navy"]);
        let assigned = assign(&leaf(5), &palette, Some("03.jpg"));
        let clones: Vec<_> = assigned.iter().filter(|i| i.clone).collect();
        assert_eq!(clones.len(), 3);
        assert!(clones.iter().all(|i| i.name() == "03.jpg"));
        let normal: Vec<_> = assigned.iter().filter(|i| !i.clone).map(|i| i.colour.clone().unwrap()).collect();
        assert_eq!(normal, vec!["Black", "Brown", "Navy", "Black"]);
    }

    #[test]
    fn unknown_clone_is_plain_round_robin() {
        let palette = colours(&["Black", "Brown"]);
        assert_eq!(assign(&leaf(3), &palette, Some("missing.jpg")), assign(&leaf(3), &palette, None));
    }

    #[test]
    fn no_colours_no_assignments() {
        assert!(assign(&leaf(3), &[], None).is_empty());
    }

    #[tokio::test]
    async fn test_run_copies_into_colour_folders() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("in");
        for n in 1..=5 {
            touch(&input, &format!("Brand/Case/IMG_{n}.jpg"));
        }
        touch(&input, "Brand/Wallet/01.jpg");
        touch(&input, "Brand/Case/notes.txt");
        let plan = ColourPlan::from_json(
            r#"{ "colours": { "Brand/Case": ["Black", " Brown", "Black"], "Brand/Gone": ["Red"] },
                 "clones": { "Brand/Case": "IMG_5.jpg" } }"#,
        )
        .unwrap();
        let output = temp.path().join("out");
        let before = tree(&input);

        let summary = run(&input, &plan, &output, &Context::default()).await.unwrap();

        assert_eq!(
            tree(&output),
            vec![
                "Brand/Case/Black/IMG_1.jpg",
                "Brand/Case/Black/IMG_3.jpg",
                "Brand/Case/Black/IMG_5.jpg",
                "Brand/Case/Brown/IMG_2.jpg",
                "Brand/Case/Brown/IMG_4.jpg",
                "Brand/Case/Brown/IMG_5.jpg",
            ]
        );
        assert_eq!(std::fs::read(output.join("Brand/Case/Brown/IMG_2.jpg")).unwrap(), b"Brand/Case/IMG_2.jpg");
        assert_eq!(tree(&input), before);
        assert_eq!(summary.copied_count(), 6);
        assert_eq!(summary.skipped_for(&SkipReason::NoColours), 1);
        assert_eq!(summary.skipped_for(&SkipReason::NotALeaf), 1);
        assert_eq!(summary.output.as_deref(), Some(output.as_path()));
    }

    #[tokio::test]
    async fn test_run_rejects_escaping_keys() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("in");
        touch(&input, "Case/01.jpg");
        let plan = ColourPlan::from_json(r#"{ "colours": { "../Case": ["Black"], "Case": ["Black"] } }"#).unwrap();
        let summary = run(&input, &plan, &temp.path().join("out"), &Context::default()).await.unwrap();
        assert_eq!(summary.failed_count(), 1);
        assert_eq!(summary.copied_count(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("in");
        touch(&input, "Case/01.jpg");
        touch(&input, "Case/02.jpg");
        let plan = ColourPlan::from_json(r#"{ "colours": { "Case": ["Black", "Brown"] } }"#).unwrap();
        let output = temp.path().join("out");
        let summary = run(&input, &plan, &output, &Context::default().dry_run(true)).await.unwrap();
        assert!(!output.exists());
        assert_eq!(summary.planned_count(), 2);
        assert!(summary.outcomes.iter().any(|o| matches!(o, Outcome::Planned { to, .. } if to == &output.join("Case/Brown/02.jpg"))));
    }

    #[tokio::test]
    async fn test_missing_root_aborts() {
        let temp = tempfile::tempdir().unwrap();
        let output = temp.path().join("out");
        let err = run(&temp.path().join("nope"), &ColourPlan::default(), &output, &Context::default()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Discovery));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_existing_output_aborts() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("in");
        touch(&input, "Case/01.jpg");
        let output = temp.path().join("out");
        std::fs::create_dir(&output).unwrap();
        let err = run(&input, &ColourPlan::default(), &output, &Context::default()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::OutputExists(_)));
    }
}
