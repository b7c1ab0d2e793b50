pub mod chart;

use std::fmt::Display;

use anyhow::Result;
use clap::ValueEnum;

use crate::views::Views;

use chart::ChartStyle;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Charts drawn in the terminal.
    Text,
    /// Views as JSON, for other front ends.
    Json,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_views(views: &Views, format: OutputFormat, color: bool) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(views, &ChartStyle::new(color))),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(views)?),
    }
    Ok(())
}

/// Draws every view in the order a reader goes through them: what was eaten most, how it changed,
/// and then the day by day and weekday breakdowns. Without a monthly view the top foods are also
/// drawn as a pie.
pub fn render_text(views: &Views, style: &ChartStyle) -> String {
    let mut output = format!(
        "{} to {}, {} photos\n\n",
        views.range.start, views.range.end, views.total
    );

    output += &style.ranked_bars("Top foods", &views.top_labels);
    output.push('\n');

    match &views.by_month_label {
        Some(monthly) => output += &style.trend_lines("Monthly consumption", monthly),
        None => output += &style.pie("Share of top foods", &views.top_labels),
    }
    output.push('\n');

    output += &style.grouped_bars("Consumption by date", &views.by_date_label);
    output.push('\n');
    output += &style.grouped_bars("Consumption by weekday", &views.by_weekday_label);
    output
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate};

    use super::{chart::ChartStyle, render_text};
    use crate::{
        storage::entities::LogEntry,
        views::{build_views, ViewConfig, ViewLayout},
    };

    fn log() -> Vec<LogEntry> {
        [(1, "kimchi"), (1, "kimchi"), (2, "rice")]
            .into_iter()
            .map(|(day, label)| {
                let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
                LogEntry {
                    date,
                    weekday: date.weekday(),
                    label: label.into(),
                    filename: format!("{label}.jpg"),
                }
            })
            .collect()
    }

    #[test]
    fn test_trend_layout_sections() {
        let views = build_views(&log(), None, &ViewConfig::default()).unwrap();
        let text = render_text(&views, &ChartStyle::new(false));
        assert!(text.starts_with("2024-03-01 to 2024-03-02, 3 photos\n"));
        assert!(text.contains("Top foods"));
        assert!(text.contains("Monthly consumption"));
        assert!(!text.contains("Share of top foods"));
        assert!(text.contains("Consumption by date"));
        assert!(text.contains("Friday"));
    }

    #[test]
    fn test_pie_layout_sections() {
        let config = ViewConfig {
            layout: ViewLayout::Pie,
            ..Default::default()
        };
        let views = build_views(&log(), None, &config).unwrap();
        let text = render_text(&views, &ChartStyle::new(false));
        assert!(text.contains("Share of top foods"));
        assert!(text.contains("66.7%"));
        assert!(!text.contains("Monthly consumption"));
    }
}
