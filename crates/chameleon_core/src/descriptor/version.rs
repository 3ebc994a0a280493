//! Version ordering for component folders.
//!
//! # Responsibility
//! - Provide a total order over free-form version strings such as `1.0`,
//!   `2.0rc1` or `1.5-beta`.
//!
//! # Invariants
//! - Numeric runs compare numerically, never lexically (`1.10 > 1.9`).
//! - Any character other than a letter, digit or `#` separates runs and
//!   carries no weight (`1-0 == 1.0 == 1_0 == 1~0`).
//! - Words rank by prefix, `dev < alpha < beta < rc < number < pl`, so
//!   `patch` ranks as `pl` and `development` as `dev`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

static VERSION_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+|[A-Za-z#]+").expect("valid version run regex"));

/// Rank of a numeric run when compared against words.
const NUMBER_RANK: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VersionRun<'a> {
    Number(&'a str),
    Word(&'a str),
}

impl VersionRun<'_> {
    fn rank(self) -> u8 {
        match self {
            Self::Number(_) => NUMBER_RANK,
            Self::Word(word) => word_rank(word),
        }
    }
}

/// Special forms in match order; a word takes the rank of the first form it
/// starts with.
const SPECIAL_FORMS: [(&str, u8); 10] = [
    ("dev", 1),
    ("alpha", 2),
    ("a", 2),
    ("beta", 3),
    ("b", 3),
    ("RC", 4),
    ("rc", 4),
    ("#", NUMBER_RANK),
    ("pl", 6),
    ("p", 6),
];

fn word_rank(word: &str) -> u8 {
    SPECIAL_FORMS
        .iter()
        .find(|(form, _)| word.starts_with(*form))
        .map(|(_, rank)| *rank)
        .unwrap_or(0)
}

fn runs(version: &str) -> Vec<VersionRun<'_>> {
    VERSION_RUN_RE
        .find_iter(version.trim())
        .map(|m| {
            let text = m.as_str();
            if text.as_bytes()[0].is_ascii_digit() {
                VersionRun::Number(text)
            } else {
                VersionRun::Word(text)
            }
        })
        .collect()
}

fn compare_numbers(left: &str, right: &str) -> Ordering {
    let left = left.trim_start_matches('0');
    let right = right.trim_start_matches('0');
    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

fn compare_runs(left: VersionRun<'_>, right: VersionRun<'_>) -> Ordering {
    match (left, right) {
        (VersionRun::Number(l), VersionRun::Number(r)) => compare_numbers(l, r),
        _ => left.rank().cmp(&right.rank()),
    }
}

/// Compares two version strings.
///
/// When one side runs out of runs, a remaining number on the other side wins;
/// a remaining word is compared against the number rank, so `1.0 > 1.0alpha`
/// while `1.0 < 1.0pl1`.
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    let left_runs = runs(left);
    let right_runs = runs(right);

    let mut index = 0;
    loop {
        match (left_runs.get(index), right_runs.get(index)) {
            (None, None) => return Ordering::Equal,
            (Some(l), Some(r)) => {
                let ord = compare_runs(*l, *r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (None, Some(r)) => {
                return match r {
                    VersionRun::Number(_) => Ordering::Less,
                    VersionRun::Word(_) => NUMBER_RANK.cmp(&r.rank()),
                };
            }
            (Some(l), None) => {
                return match l {
                    VersionRun::Number(_) => Ordering::Greater,
                    VersionRun::Word(_) => l.rank().cmp(&NUMBER_RANK),
                };
            }
        }
        index += 1;
    }
}
