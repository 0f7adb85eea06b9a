use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::Record;
use crate::certificate::CertificateMeta;

/// Shown as the year range of an empty collection.
pub const EMPTY_YEAR_RANGE: &str = "—";

/// Headline numbers of a collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    /// Distinct department values, every `otro` counted once.
    pub departments: usize,
    pub year_range: String,
}

/// Number of records sharing a display label.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

pub fn summarize<T: Record>(records: &[T]) -> Summary {
    Summary {
        total: total_count(records),
        departments: distinct_department_count(records),
        year_range: year_range(records),
    }
}

#[inline]
pub fn total_count<T: Record>(records: &[T]) -> usize {
    records.len()
}

/// Counts distinct department values.
///
/// Free-text departments are not told apart here, while
/// [`group_by_department`] gives each of them its own bar.
pub fn distinct_department_count<T: Record>(records: &[T]) -> usize {
    records
        .iter()
        .map(|r| r.meta().department)
        .collect::<HashSet<_>>()
        .len()
}

/// `"<min>–<max>"` over the years of the records.
pub fn year_range<T: Record>(records: &[T]) -> String {
    let mut years = records.iter().map(|r| r.meta().year);
    match years.next() {
        Some(first) => {
            let (min, max) = years.fold((first, first), |(min, max), y| (min.min(y), max.max(y)));
            format!("{min}–{max}")
        }
        None => EMPTY_YEAR_RANGE.to_owned(),
    }
}

pub fn group_by_department<T: Record>(records: &[T]) -> Vec<LabelCount> {
    group_by(records, CertificateMeta::department_label)
}

pub fn group_by_type<T: Record>(records: &[T]) -> Vec<LabelCount> {
    group_by(records, CertificateMeta::kind_label)
}

/// Counts records per label, most frequent first.
/// Equal counts keep the order their labels first appeared in.
fn group_by<T: Record>(records: &[T], label: fn(&CertificateMeta) -> &str) -> Vec<LabelCount> {
    let mut counts: Vec<LabelCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let key = label(record.meta());
        match index.get(key) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(key, counts.len());
                counts.push(LabelCount {
                    label: key.to_owned(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
