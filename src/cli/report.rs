use std::{
    fmt::Display,
    io::{stdout, IsTerminal},
};

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{Parser, ValueEnum};
use tracing::debug;

use crate::{
    storage::entities::LogEntry,
    views::{build_views, DateRange, ViewConfig, ViewLayout, WeekdayOrder, Views},
};

use super::{
    output::{print_views, OutputFormat},
    FoodSession,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct ReportCommand {
    #[arg(
        long = "start",
        short,
        help = "First day of the range. Examples are \"yesterday\", \"last monday\", \"15/03/2025\". Defaults to the first recorded day"
    )]
    start_date: Option<String>,
    #[arg(
        long = "end",
        short,
        help = "Last day of the range, inclusive. Defaults to the last recorded day"
    )]
    end_date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, default_value_t = ViewLayout::Trend, help = "Charts to show. Trend includes monthly lines, pie shows the share of top foods instead")]
    layout: ViewLayout,
    #[arg(long, default_value_t = WeekdayOrder::FirstSeen, help = "Order of weekdays in the weekday chart")]
    weekday_order: WeekdayOrder,
    #[arg(short, long, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Command to process `report` command. Report is intended to show what was eaten between
/// `start_date` and `end_date`.
pub fn process_report_command(session: &FoodSession, command: ReportCommand) -> Result<()> {
    let format = command.format;
    let Some(views) = report_views(session, &command)? else {
        return Ok(());
    };

    print_views(&views, format, stdout().is_terminal())
}

/// Views for `command`, with relative dates resolved against the session clock.
fn report_views(session: &FoodSession, command: &ReportCommand) -> Result<Option<Views>> {
    let entries = session.log().entries();
    let range = parse_range(
        entries,
        command.start_date.as_deref(),
        command.end_date.as_deref(),
        command.date_style,
        session.clock().time(),
    )?;

    let config = ViewConfig {
        layout: command.layout,
        weekday_order: command.weekday_order,
    };

    let views = build_views(entries, range, &config);
    if views.is_none() {
        debug!("Nothing to show for {range:?}");
    }
    Ok(views)
}

/// Also provides sensible defaults for `report` command. A missing side of the range is taken
/// from the log itself. Only a range where both sides were given can be reversed; a single date
/// outside of the log just selects nothing.
fn parse_range(
    entries: &[LogEntry],
    start_date: Option<&str>,
    end_date: Option<&str>,
    date_style: DateStyle,
    now: DateTime<Local>,
) -> Result<Option<DateRange>> {
    let parse = |value: &str, name: &str| -> Result<NaiveDate> {
        parse_date_string(value, now, date_style.into())
            .map(|v| v.date_naive())
            .map_err(|e| anyhow!("Failed to validate {name} date {value:?}: {e}"))
    };
    let start = start_date.map(|v| parse(v, "start")).transpose()?;
    let end = end_date.map(|v| parse(v, "end")).transpose()?;

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            bail!("Start of the range {start} is after its end {end}");
        }
    }
    if start.is_none() && end.is_none() {
        return Ok(None);
    }

    let Some(observed) = DateRange::observed(entries) else {
        return Ok(None);
    };
    let start = start.unwrap_or(observed.start);
    let end = end.unwrap_or(observed.end);

    // A defaulted side can land on the wrong side of the given one. The range then selects nothing.
    Ok(Some(
        DateRange::new_opt(start, end).unwrap_or(DateRange { start, end: start }),
    ))
}
