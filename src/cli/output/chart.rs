use ansi_term::{Colour, Style};

use crate::{
    utils::percentage::count_percentage,
    views::{
        analysis::LabelCount,
        pivot::{PivotTable, RowKey},
    },
};

const PALETTE: [Colour; 6] = [
    Colour::Red,
    Colour::Green,
    Colour::Yellow,
    Colour::Blue,
    Colour::Purple,
    Colour::Cyan,
];

const BAR: char = '█';
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const DEFAULT_WIDTH: usize = 40;

/// Renders views as plain text charts. Colours are only used when writing to a terminal.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    color: bool,
    width: usize,
}

impl ChartStyle {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            width: DEFAULT_WIDTH,
        }
    }

    fn paint(&self, series: usize, text: &str) -> String {
        if self.color {
            PALETTE[series % PALETTE.len()].paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, title: &str) -> String {
        if self.color {
            format!("{}\n", Style::new().bold().underline().paint(title))
        } else {
            format!("{title}\n")
        }
    }

    /// Bar length for `value` when `max` fills the whole width. Anything above zero is visible.
    fn bar_len(&self, value: u64, max: u64) -> usize {
        if value == 0 || max == 0 {
            return 0;
        }
        ((value as f64 / max as f64 * self.width as f64).round() as usize).max(1)
    }

    fn bar(&self, series: usize, value: u64, max: u64) -> String {
        let bar = BAR.to_string().repeat(self.bar_len(value, max));
        self.paint(series, &bar)
    }

    pub fn ranked_bars(&self, title: &str, counts: &[LabelCount]) -> String {
        let mut output = self.heading(title);
        let max = counts.iter().map(|v| v.count).max().unwrap_or(0);
        let label_width = label_width(counts.iter().map(|v| &*v.label));
        for (series, count) in counts.iter().enumerate() {
            output += &format!(
                "{} {} {}\n",
                pad(&count.label, label_width),
                self.bar(series, count.count, max),
                count.count
            );
        }
        output
    }

    /// One segmented bar where every label takes space proportional to its share, followed by a
    /// legend with percentages.
    /// Splits the width between labels by their share. Leftover cells go to the largest
    /// remainders, earlier labels first, so the segments always add up to the width.
    fn segments(&self, counts: &[LabelCount], total: u64) -> Vec<usize> {
        if total == 0 {
            return vec![0; counts.len()];
        }
        let width = self.width as u64;
        let mut cells = counts
            .iter()
            .map(|v| (v.count * width / total) as usize)
            .collect::<Vec<_>>();

        let mut by_remainder = (0..counts.len()).collect::<Vec<_>>();
        by_remainder.sort_by_key(|&i| std::cmp::Reverse(counts[i].count * width % total));
        let leftover = self.width - cells.iter().sum::<usize>();
        for i in by_remainder.into_iter().take(leftover) {
            cells[i] += 1;
        }
        cells
    }

    pub fn pie(&self, title: &str, counts: &[LabelCount]) -> String {
        let mut output = self.heading(title);
        let total = counts.iter().map(|v| v.count).sum::<u64>();
        let label_width = label_width(counts.iter().map(|v| &*v.label));

        for (series, cells) in self.segments(counts, total).into_iter().enumerate() {
            output += &self.paint(series, &BAR.to_string().repeat(cells));
        }
        output.push('\n');

        for (series, count) in counts.iter().enumerate() {
            output += &format!(
                "{} {} {}\n",
                self.paint(series, &BAR.to_string()),
                pad(&count.label, label_width),
                count_percentage(count.count, total)
            );
        }
        output
    }

    /// One line per label with a sparkline across rows, so the trend of each food can be read
    /// left to right.
    pub fn trend_lines<K: RowKey>(&self, title: &str, table: &PivotTable<K>) -> String {
        let mut output = self.heading(title);
        let (Some(first), Some(last)) = (table.rows().first(), table.rows().last()) else {
            return output;
        };
        let max = table.max_cell();
        let label_width = label_width(table.columns().iter().map(|v| &**v));

        output += &format!(
            "{} {} .. {}\n",
            pad("", label_width),
            first.key_name(),
            last.key_name()
        );
        for (series, label) in table.columns().iter().enumerate() {
            let values = table.iter().map(|(_, counts)| counts[series]).collect::<Vec<_>>();
            let line = values.iter().map(|v| spark(*v, max)).collect::<String>();
            let numbers = values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            output += &format!(
                "{} {} {}\n",
                pad(label, label_width),
                self.paint(series, &line),
                numbers
            );
        }
        output
    }

    /// Bars for every label, grouped under every row key. Labels missing from a row show up
    /// with a count of 0.
    pub fn grouped_bars<K: RowKey>(&self, title: &str, table: &PivotTable<K>) -> String {
        let mut output = self.heading(title);
        let max = table.max_cell();
        let label_width = label_width(table.columns().iter().map(|v| &**v));
        for (key, counts) in table.iter() {
            output += &format!("{}\n", key.key_name());
            for (series, (label, count)) in table.columns().iter().zip(counts).enumerate() {
                output += &format!(
                    "  {} {} {}\n",
                    pad(label, label_width),
                    self.bar(series, *count, max),
                    count
                );
            }
        }
        output
    }
}

fn spark(value: u64, max: u64) -> char {
    if max == 0 {
        return SPARKS[0];
    }
    let index = (value as f64 / max as f64 * (SPARKS.len() - 1) as f64).round() as usize;
    SPARKS[index.min(SPARKS.len() - 1)]
}

fn label_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels.map(|v| v.chars().count()).max().unwrap_or(0)
}

/// `format!("{:<w}")` pads by bytes for some inputs, this pads by characters.
fn pad(label: &str, width: usize) -> String {
    let missing = width.saturating_sub(label.chars().count());
    format!("{label}{}", " ".repeat(missing))
}
