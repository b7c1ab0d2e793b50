use std::{collections::HashMap, sync::Arc};

use serde::Serialize;

use crate::storage::entities::LogEntry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: Arc<str>,
    pub count: u64,
}

/// Number of entries per label, in the order labels were first encountered.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FoodCounts {
    counts: Vec<LabelCount>,
}

impl FoodCounts {
    pub fn get(&self, label: &str) -> u64 {
        self.counts
            .iter()
            .find(|v| &*v.label == label)
            .map_or(0, |v| v.count)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelCount> {
        self.counts.iter()
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|v| v.count).sum()
    }

    /// Returns at most `limit` labels with the highest counts. The sort is stable, so among
    /// labels with equal counts the one encountered first wins.
    pub fn top(&self, limit: usize) -> Vec<LabelCount> {
        let mut counts = self.counts.clone();
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(limit);
        counts
    }
}

pub fn count_labels<'a>(entries: impl IntoIterator<Item = &'a LogEntry>) -> FoodCounts {
    let mut positions = HashMap::<Arc<str>, usize>::new();
    let mut counts = Vec::<LabelCount>::new();
    for entry in entries {
        let position = *positions.entry(entry.label.clone()).or_insert_with(|| {
            counts.push(LabelCount {
                label: entry.label.clone(),
                count: 0,
            });
            counts.len() - 1
        });
        counts[position].count += 1;
    }
    FoodCounts { counts }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate};

    use super::count_labels;
    use crate::storage::entities::LogEntry;

    fn entries(labels: &[&str]) -> Vec<LogEntry> {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        labels
            .iter()
            .enumerate()
            .map(|(index, label)| LogEntry {
                date,
                weekday: date.weekday(),
                label: (*label).into(),
                filename: format!("{index}.jpg"),
            })
            .collect()
    }

    #[test]
    fn test_counts_first_seen_order() {
        let counts = count_labels(&entries(&["rice", "kimchi", "rice", "apple"]));
        let labels = counts.iter().map(|v| &*v.label).collect::<Vec<_>>();
        assert_eq!(labels, vec!["rice", "kimchi", "apple"]);
        assert_eq!(counts.get("rice"), 2);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_top_ties_keep_first_seen() {
        let log = entries(&[
            "a", "b", "c", "d", "e", "f", "f", "e", "d", "g", "g", "g",
        ]);
        let top = count_labels(&log).top(5);
        let top = top
            .iter()
            .map(|v| (&*v.label, v.count))
            .collect::<Vec<_>>();
        assert_eq!(
            top,
            vec![("g", 3), ("d", 2), ("e", 2), ("f", 2), ("a", 1)]
        );
    }

    #[test]
    fn test_top_never_omits_a_larger_label() {
        let log = entries(&["a", "b", "b", "c", "c", "c", "d", "e", "f", "f", "g"]);
        let counts = count_labels(&log);
        let top = counts.top(5);
        assert_eq!(top.len(), 5);
        assert!(top.windows(2).all(|v| v[0].count >= v[1].count));
        let smallest = top.last().unwrap().count;
        for label in counts.iter() {
            if !top.iter().any(|v| v.label == label.label) {
                assert!(label.count <= smallest);
            }
        }
    }

    #[test]
    fn test_top_short_log() {
        let counts = count_labels(&entries(&["a", "b"]));
        assert_eq!(counts.top(5).len(), 2);
        assert!(count_labels(&entries(&[])).top(5).is_empty());
    }
}
