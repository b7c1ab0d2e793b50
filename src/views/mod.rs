//! Derived, read-only reshapings of the food log used for charting. Everything here is a pure
//! function of the entries it is given.

pub mod analysis;
pub mod pivot;

use std::fmt::Display;

use chrono::{Datelike, NaiveDate, Weekday};
use clap::ValueEnum;
use serde::Serialize;
use tracing::trace;

use crate::{storage::entities::LogEntry, utils::time::YearMonth};

use analysis::{count_labels, LabelCount};
use pivot::PivotTable;

/// Number of labels in the ranked view.
pub const TOP_LABELS: usize = 5;

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new_opt(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if start <= end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// The range spanning the earliest and the latest entry.
    pub fn observed<'a>(entries: impl IntoIterator<Item = &'a LogEntry>) -> Option<Self> {
        entries.into_iter().fold(None, |range, entry| {
            Some(match range {
                None => Self {
                    start: entry.date,
                    end: entry.date,
                },
                Some(Self { start, end }) => Self {
                    start: start.min(entry.date),
                    end: end.max(entry.date),
                },
            })
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Which set of charts is produced.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum ViewLayout {
    /// Ranked bars, monthly trend lines, and bars per date and per weekday.
    #[default]
    Trend,
    /// Ranked bars with a pie of the same labels, and bars per date and per weekday. No monthly
    /// view.
    Pie,
}

impl Display for ViewLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewLayout::Trend => write!(f, "trend"),
            ViewLayout::Pie => write!(f, "pie"),
        }
    }
}

/// Row order of the weekday view. Neither option sorts weekday names alphabetically
/// ("Friday" before "Monday"), which is what a plain group-by over the persisted names gives.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum WeekdayOrder {
    /// Weekdays in the order they first appear in the log.
    #[default]
    FirstSeen,
    /// Monday to Sunday.
    Calendar,
}

impl Display for WeekdayOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeekdayOrder::FirstSeen => write!(f, "first-seen"),
            WeekdayOrder::Calendar => write!(f, "calendar"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewConfig {
    pub layout: ViewLayout,
    pub weekday_order: WeekdayOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Views {
    /// Range the entries were filtered by.
    pub range: DateRange,
    /// Number of entries inside `range`.
    pub total: u64,
    pub top_labels: Vec<LabelCount>,
    pub by_date_label: PivotTable<NaiveDate>,
    pub by_weekday_label: PivotTable<Weekday>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_month_label: Option<PivotTable<YearMonth>>,
}

/// Builds every view for the entries that fall into `range`, or into the observed range of the
/// log when no range is given. Returns [None] when there is nothing to chart.
pub fn build_views(
    entries: &[LogEntry],
    range: Option<DateRange>,
    config: &ViewConfig,
) -> Option<Views> {
    let range = match range {
        Some(range) => range,
        None => DateRange::observed(entries)?,
    };

    let filtered = entries
        .iter()
        .filter(|v| range.contains(v.date))
        .collect::<Vec<_>>();
    trace!(
        "{} of {} entries fall into {range:?}",
        filtered.len(),
        entries.len()
    );
    if filtered.is_empty() {
        return None;
    }

    let top_labels = count_labels(filtered.iter().copied()).top(TOP_LABELS);

    let by_date_label =
        PivotTable::from_entries(filtered.iter().copied(), |v| v.date).sorted_by(Ord::cmp);

    let by_weekday_label = PivotTable::from_entries(filtered.iter().copied(), |v| v.weekday);
    let by_weekday_label = match config.weekday_order {
        WeekdayOrder::FirstSeen => by_weekday_label,
        WeekdayOrder::Calendar => by_weekday_label
            .sorted_by(|a, b| a.num_days_from_monday().cmp(&b.num_days_from_monday())),
    };

    let by_month_label = match config.layout {
        ViewLayout::Trend => Some(
            PivotTable::from_entries(filtered.iter().copied(), |v| YearMonth::from(v.date))
                .sorted_by(Ord::cmp),
        ),
        ViewLayout::Pie => None,
    };

    Some(Views {
        range,
        total: filtered.len() as u64,
        top_labels,
        by_date_label,
        by_weekday_label,
        by_month_label,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate, Weekday};

    use super::{build_views, DateRange, ViewConfig, ViewLayout, WeekdayOrder};
    use crate::{storage::entities::LogEntry, utils::time::YearMonth};

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn entry(month: u32, day: u32, label: &str) -> LogEntry {
        let date = date(month, day);
        LogEntry {
            date,
            weekday: date.weekday(),
            label: label.into(),
            filename: format!("{label}-{month}-{day}.jpg"),
        }
    }

    fn sample_log() -> Vec<LogEntry> {
        vec![
            entry(3, 1, "kimchi"),
            entry(3, 1, "kimchi"),
            entry(3, 2, "rice"),
        ]
    }

    #[test]
    fn test_example_scenario() {
        let views = build_views(&sample_log(), None, &ViewConfig::default()).unwrap();

        let top = views
            .top_labels
            .iter()
            .map(|v| (&*v.label, v.count))
            .collect::<Vec<_>>();
        assert_eq!(top, vec![("kimchi", 2), ("rice", 1)]);

        let by_date = views
            .by_date_label
            .iter()
            .map(|(date, counts)| (*date, counts.to_vec()))
            .collect::<Vec<_>>();
        assert_eq!(
            by_date,
            vec![(date(3, 1), vec![2, 0]), (date(3, 2), vec![0, 1])]
        );
        assert_eq!(views.range, DateRange::new_opt(date(3, 1), date(3, 2)).unwrap());
        assert_eq!(views.total, 3);
    }

    #[test]
    fn test_empty_log() {
        assert!(build_views(&[], None, &ViewConfig::default()).is_none());
    }

    #[test]
    fn test_filter_is_inclusive() {
        let log = vec![
            entry(2, 28, "apple"),
            entry(3, 1, "kimchi"),
            entry(3, 5, "rice"),
            entry(3, 6, "ramen"),
        ];
        let range = DateRange::new_opt(date(3, 1), date(3, 5));
        let views = build_views(&log, range, &ViewConfig::default()).unwrap();

        assert_eq!(views.total, 2);
        assert!(views
            .by_date_label
            .rows()
            .iter()
            .all(|v| range.unwrap().contains(*v)));
        let columns = views
            .by_date_label
            .columns()
            .iter()
            .map(|v| &**v)
            .collect::<Vec<_>>();
        assert_eq!(columns, vec!["kimchi", "rice"]);
        assert!(views.top_labels.iter().all(|v| &*v.label != "apple"));
    }

    #[test]
    fn test_filter_without_rows() {
        let range = DateRange::new_opt(date(4, 1), date(4, 30));
        assert!(build_views(&sample_log(), range, &ViewConfig::default()).is_none());
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        assert!(DateRange::new_opt(date(3, 2), date(3, 1)).is_none());
        assert!(DateRange::new_opt(date(3, 2), date(3, 2)).is_some());
    }

    #[test]
    fn test_build_views_is_pure() {
        let log = sample_log();
        let before = log.clone();
        let first = build_views(&log, None, &ViewConfig::default());
        let second = build_views(&log, None, &ViewConfig::default());
        assert_eq!(first, second);
        assert_eq!(log, before);
    }

    #[test]
    fn test_weekday_order() {
        // Sunday, then Monday, then Saturday
        let log = vec![
            entry(3, 3, "kimchi"),
            entry(3, 4, "rice"),
            entry(3, 9, "kimchi"),
        ];
        let first_seen = build_views(&log, None, &ViewConfig::default()).unwrap();
        assert_eq!(
            first_seen.by_weekday_label.rows(),
            &[Weekday::Sun, Weekday::Mon, Weekday::Sat]
        );

        let calendar = build_views(
            &log,
            None,
            &ViewConfig {
                weekday_order: WeekdayOrder::Calendar,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            calendar.by_weekday_label.rows(),
            &[Weekday::Mon, Weekday::Sat, Weekday::Sun]
        );
        assert_eq!(calendar.by_weekday_label.get(&Weekday::Sun, "kimchi"), Some(1));
        assert_eq!(calendar.by_weekday_label.get(&Weekday::Sun, "rice"), Some(0));
    }

    #[test]
    fn test_layouts() {
        let log = vec![
            entry(1, 31, "kimchi"),
            entry(2, 1, "kimchi"),
            entry(2, 14, "rice"),
        ];
        let trend = build_views(&log, None, &ViewConfig::default()).unwrap();
        let monthly = trend.by_month_label.unwrap();
        let january = YearMonth::from(date(1, 1));
        let february = YearMonth::from(date(2, 1));
        assert_eq!(monthly.rows(), &[january, february]);
        assert_eq!(monthly.get(&january, "kimchi"), Some(1));
        assert_eq!(monthly.get(&february, "kimchi"), Some(1));
        assert_eq!(monthly.get(&february, "rice"), Some(1));
        assert_eq!(monthly.get(&january, "rice"), Some(0));

        let pie = build_views(
            &log,
            None,
            &ViewConfig {
                layout: ViewLayout::Pie,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(pie.by_month_label.is_none());
        assert_eq!(pie.by_date_label, trend.by_date_label);
    }

    #[test]
    fn test_json_shape() -> anyhow::Result<()> {
        let views = build_views(&sample_log(), None, &ViewConfig::default()).unwrap();
        let json = serde_json::to_value(&views)?;
        assert_eq!(json["range"]["start"], "2024-03-01");
        assert_eq!(json["top_labels"][0]["label"], "kimchi");
        assert_eq!(json["by_month_label"]["rows"][0]["key"], "2024-03");
        assert_eq!(json["by_weekday_label"]["rows"][0]["key"], "Friday");
        Ok(())
    }
}
