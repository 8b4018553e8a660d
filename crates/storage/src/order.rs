//! Natural (numeric-aware) ordering.
//!
//! A name is split into alternating runs of text and ASCII digits, always
//! starting and ending with a (possibly empty) text run:
//!
//! ```text
//! "img10.jpg" → ["img", 10, ".jpg"]
//! "02.jpg"    → ["", 2, ".jpg"]
//! ```
//!
//! Runs are compared pairwise: text case-insensitively, digits by numeric
//! value. Because both sequences alternate in the same way, a text run is
//! only ever compared to another text run. When every shared run is equal,
//! the name with fewer runs sorts first.

use crate::path::to_posix;
use std::cmp::Ordering;
use std::path::Path;

/// Compares two names in natural order.
///
/// Names that are equal under natural comparison but differ in bytes (`a01`
/// and `a1`, or `IMG` and `img`) are tie-broken on their raw bytes so that the
/// ordering is total and sorting is deterministic.
///
/// ```
/// use std::cmp::Ordering;
/// use stockshot_storage::natural_cmp;
///
/// assert_eq!(natural_cmp("img2", "img10"), Ordering::Less);
/// assert_eq!(natural_cmp("img9b", "img10"), Ordering::Less);
/// assert_eq!(natural_cmp("Black", "brown"), Ordering::Less);
/// ```
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Runs::new(a);
    let mut right = Runs::new(b);
    loop {
        let ordering = match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(Run::Digits(x)), Some(Run::Digits(y))) => cmp_digits(x, y),
            (Some(Run::Text(x)), Some(Run::Text(y))) => cmp_text(x, y),
            // Unreachable given the alternation invariant, but a total order
            // still needs an answer: numbers before text.
            (Some(Run::Digits(_)), Some(Run::Text(_))) => Ordering::Less,
            (Some(Run::Text(_)), Some(Run::Digits(_))) => Ordering::Greater,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}

/// Compares two relative paths in natural order of their POSIX rendering.
pub fn natural_cmp_paths(a: impl AsRef<Path>, b: impl AsRef<Path>) -> Ordering {
    natural_cmp(&to_posix(a), &to_posix(b))
}

/// Compares file names (the last component) in natural order.
pub(crate) fn natural_cmp_file_names(a: &Path, b: &Path) -> Ordering {
    let a = a.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    let b = b.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    natural_cmp(&a, &b)
}

#[derive(Debug, PartialEq, Eq)]
enum Run<'a> {
    Text(&'a str),
    Digits(&'a str),
}

/// Iterator over the alternating text/digit runs of a name.
struct Runs<'a> {
    rest: &'a str,
    expect_text: bool,
    done: bool,
}
impl<'a> Runs<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s, expect_text: true, done: false }
    }
}
impl<'a> Iterator for Runs<'a> {
    type Item = Run<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let split = if self.expect_text {
            self.rest.find(|c: char| c.is_ascii_digit()).unwrap_or(self.rest.len())
        } else {
            self.rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(self.rest.len())
        };
        let (run, rest) = self.rest.split_at(split);
        self.rest = rest;
        let run = if self.expect_text {
            // A trailing text run (possibly empty) always closes the sequence.
            if rest.is_empty() {
                self.done = true;
            }
            Run::Text(run)
        } else {
            Run::Digits(run)
        };
        self.expect_text = !self.expect_text;
        Some(run)
    }
}

/// Numeric comparison of two ASCII digit runs of any length.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.chars().flat_map(char::to_lowercase).cmp(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn runs_alternate_starting_with_text() {
        let runs: Vec<_> = Runs::new("img10.jpg").collect();
        assert_eq!(runs, vec![Run::Text("img"), Run::Digits("10"), Run::Text(".jpg")]);
        let runs: Vec<_> = Runs::new("02").collect();
        assert_eq!(runs, vec![Run::Text(""), Run::Digits("02"), Run::Text("")]);
        let runs: Vec<_> = Runs::new("").collect();
        assert_eq!(runs, vec![Run::Text("")]);
    }

    #[rstest]
    #[case("img2", "img10")]
    #[case("img9b", "img10")]
    #[case("img2.jpg", "img10.jpg")]
    #[case("IMG_0001.JPG", "img_0002.jpg")]
    #[case("02.jpg", "MAIN.jpg")]
    #[case("img", "img2")]
    #[case("PT02.jpg", "PT10.jpg")]
    #[case("a01", "a1")]
    #[case("Black", "brown")]
    #[case("x99999999999999999999", "x100000000000000000000")]
    fn test_natural_less(#[case] a: &str, #[case] b: &str) {
        assert_eq!(natural_cmp(a, b), Ordering::Less);
        assert_eq!(natural_cmp(b, a), Ordering::Greater);
    }

    #[test]
    fn natural_order_disagrees_with_lexicographic() {
        assert_eq!("img10".cmp("img2"), Ordering::Less);
        assert_eq!(natural_cmp("img10", "img2"), Ordering::Greater);
        assert_eq!("img10".cmp("img9b"), Ordering::Less);
        assert_eq!(natural_cmp("img10", "img9b"), Ordering::Greater);
    }

    #[test]
    fn sorting_is_numeric() {
        let mut names = vec!["img10.jpg", "img2.jpg", "img1.jpg", "IMG3.jpg", "img20.jpg"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["img1.jpg", "img2.jpg", "IMG3.jpg", "img10.jpg", "img20.jpg"]);
    }

    #[test]
    fn equal_names_are_equal() {
        assert_eq!(natural_cmp("PT02.jpg", "PT02.jpg"), Ordering::Equal);
    }

    #[test]
    fn paths_compare_on_posix_form() {
        assert_eq!(natural_cmp_paths("Brand/Model 9", "Brand/Model 10"), Ordering::Less);
        assert_eq!(natural_cmp_paths("Brand/Model 10/Black", "Brand/Model 9/Brown"), Ordering::Greater);
    }
}
