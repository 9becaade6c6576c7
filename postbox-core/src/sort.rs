//! Sort keys and comparators.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PostboxError, Result};
use crate::normalize::NormalizedCard;

/// Order of the result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    IdDesc,
    IdAsc,
    DateDesc,
    DateAsc,
    DurationDesc,
    DurationAsc,
    /// Country, then region, by code point. Not locale collation, so the
    /// order is the same on every platform.
    Area,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        Self::IdDesc,
        Self::IdAsc,
        Self::DateDesc,
        Self::DateAsc,
        Self::DurationDesc,
        Self::DurationAsc,
        Self::Area,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdDesc => "id_desc",
            Self::IdAsc => "id_asc",
            Self::DateDesc => "date_desc",
            Self::DateAsc => "date_asc",
            Self::DurationDesc => "duration_desc",
            Self::DurationAsc => "duration_asc",
            Self::Area => "area",
        }
    }

    /// Compare two normalized records under this key.
    pub fn compare(&self, a: &NormalizedCard<'_>, b: &NormalizedCard<'_>) -> Ordering {
        match self {
            Self::IdDesc => natural_cmp(id_of(b), id_of(a)),
            Self::IdAsc => natural_cmp(id_of(a), id_of(b)),
            Self::DateDesc => b.effective_date.cmp(&a.effective_date),
            Self::DateAsc => a.effective_date.cmp(&b.effective_date),
            Self::DurationDesc => b.duration_days.cmp(&a.duration_days),
            Self::DurationAsc => a.duration_days.cmp(&b.duration_days),
            Self::Area => a.country.cmp(b.country).then_with(|| {
                a.region
                    .unwrap_or_default()
                    .cmp(b.region.unwrap_or_default())
            }),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = PostboxError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s.trim())
            .ok_or_else(|| PostboxError::InvalidSortKey(s.to_string()))
    }
}

fn id_of<'a>(card: &NormalizedCard<'a>) -> &'a str {
    card.card.id.as_deref().unwrap_or_default()
}

/// Numeric-aware string comparison: runs of ASCII digits compare by value,
/// everything else compares case-insensitively, so `P2 < P10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_run = take_digits(&mut left);
                let r_run = take_digits(&mut right);
                let ordering = compare_digit_runs(&l_run, &r_run);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                let ordering = l.to_lowercase().cmp(r.to_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
                left.next();
                right.next();
            }
        }
    }

    // Equal ignoring case and leading zeros; fall back to a total order.
    a.cmp(b)
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        run.push(c);
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
