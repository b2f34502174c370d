use std::fmt::Write;
use std::ops::Range;

use crate::models::BacktestRequest;
use crate::theme::{ChartPalette, Rgb, ThemeContext, ThemeMode, ANSI_RESET};
use crate::view::{Classification, PricePoint, ViewModel};

const RULE_WIDTH: usize = 70;
const CHART_WIDTH: usize = 60;
const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Renders a `ViewModel` as a terminal report.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    palette: ChartPalette,
    color: bool,
}

impl ReportRenderer {
    pub fn new(theme: &ThemeContext, color: bool) -> Self {
        Self {
            palette: theme.palette(),
            color,
        }
    }

    /// No escapes; for files and pipes.
    pub fn plain() -> Self {
        Self {
            palette: ChartPalette::for_mode(ThemeMode::Light),
            color: false,
        }
    }

    fn paint(&self, text: &str, color: Rgb) -> String {
        if self.color && !text.is_empty() {
            format!("{}{}{}", color.ansi_fg(), text, ANSI_RESET)
        } else {
            text.to_string()
        }
    }

    fn banner(&self, text: &str) -> String {
        if self.color {
            format!(
                "{}{}{:<width$}{}",
                self.palette.tooltip_background.ansi_bg(),
                self.palette.text.ansi_fg(),
                text,
                ANSI_RESET,
                width = RULE_WIDTH
            )
        } else {
            text.to_string()
        }
    }

    fn field(&self, name: &str) -> String {
        // pad before painting so escapes do not skew the columns
        self.paint(&format!("{:<13}", format!("{}:", name)), self.palette.label)
    }

    fn paint_class(&self, text: &str, class: Classification) -> String {
        match class {
            Classification::Neutral => text.to_string(),
            _ => self.paint(text, self.palette.value_color(class)),
        }
    }

    pub fn render(&self, request: Option<&BacktestRequest>, view: &ViewModel) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write_report(&mut out, request, view);
        out
    }

    fn write_report(
        &self,
        out: &mut String,
        request: Option<&BacktestRequest>,
        view: &ViewModel,
    ) -> std::fmt::Result {
        let rule = self.paint(&"=".repeat(RULE_WIDTH), self.palette.tooltip_border);
        writeln!(out, "{}", rule)?;
        writeln!(out, "{}", self.banner("  BACKTEST REPORT"))?;
        writeln!(out, "{}", rule)?;
        if let Some(req) = request {
            writeln!(out, "  {}{}", self.field("Ticker"), req.ticker)?;
            writeln!(
                out,
                "  {}{} ({})",
                self.field("Strategy"),
                req.strategy.label(),
                req.params
            )?;
            writeln!(
                out,
                "  {}{} to {} ({} days)",
                self.field("Period"),
                req.period.start,
                req.period.end,
                req.period.days()
            )?;
            writeln!(out, "  {}${:.2}", self.field("Capital"), req.initial_capital)?;
        }

        self.write_section(out, "EQUITY CURVE")?;
        if view.equity.is_empty() {
            writeln!(out, "  No equity data")?;
        } else {
            let values: Vec<f64> = view.equity.iter().map(|p| p.value).collect();
            let line = sparkline(&values, CHART_WIDTH);
            writeln!(out, "  {}", self.paint(&line, self.palette.equity_line))?;
            writeln!(out, "  {}{}", self.field("Axis"), view.equity_ticks.join(" | "))?;
            if let (Some(first), Some(last)) = (view.equity.first(), view.equity.last()) {
                writeln!(out, "  {}{} .. {}", self.field("Range"), first.label, last.label)?;
            }
        }

        self.write_section(out, "PRICE & SIGNALS")?;
        if view.price.is_empty() {
            writeln!(out, "  No price data")?;
        } else {
            let values: Vec<f64> = view.price.iter().map(|p| p.price).collect();
            writeln!(out, "  {}", sparkline(&values, CHART_WIDTH))?;
            let markers = marker_line(&view.price, CHART_WIDTH);
            writeln!(out, "  {}", self.colour_markers(&markers))?;
            writeln!(
                out,
                "  {}{}   Sells: {}",
                self.field("Buys"),
                view.overlay.buys.len(),
                view.overlay.sells.len()
            )?;
        }

        self.write_section(out, "METRICS")?;
        match &view.metrics {
            None => writeln!(out, "  Run a backtest to see metrics")?,
            Some(rows) => {
                for row in rows {
                    writeln!(
                        out,
                        "  {} {}",
                        self.paint(&format!("{:<14}", format!("{}:", row.label)), self.palette.label),
                        self.paint_class(&row.display, row.class)
                    )?;
                }
            }
        }

        self.write_section(out, "TRADES")?;
        if view.trades.is_empty() {
            writeln!(out, "  No trades")?;
        } else {
            writeln!(
                out,
                "  {:<6} {:<20} {:>10} {:<20} {:>10} {:>9}",
                "Type", "Entry Date", "Entry", "Exit Date", "Exit", "Return %"
            )?;
            for t in &view.trades {
                // pad before painting so escapes do not skew the columns
                let ret = format!("{:>9}", t.ret);
                writeln!(
                    out,
                    "  {:<6} {:<20} {:>10} {:<20} {:>10} {}",
                    t.kind,
                    t.entry_date,
                    t.entry_price,
                    t.exit_date,
                    t.exit_price,
                    self.paint_class(&ret, t.ret_class)
                )?;
            }
        }

        writeln!(out, "{}", rule)
    }

    fn write_section(&self, out: &mut String, title: &str) -> std::fmt::Result {
        writeln!(out)?;
        writeln!(out, "  {}", title)?;
        writeln!(out, "  {}", self.paint(&"─".repeat(35), self.palette.tooltip_border))
    }

    fn colour_markers(&self, markers: &str) -> String {
        if !self.color {
            return markers.to_string();
        }
        markers
            .chars()
            .map(|c| match c {
                '▲' => self.paint("▲", self.palette.buy),
                '▼' => self.paint("▼", self.palette.sell),
                other => other.to_string(),
            })
            .collect()
    }
}

/// Split `len` points into at most `width` contiguous buckets.
fn buckets(len: usize, width: usize) -> Vec<Range<usize>> {
    if len == 0 || width == 0 {
        return Vec::new();
    }
    let cols = len.min(width);
    (0..cols)
        .map(|j| (j * len / cols)..((j + 1) * len / cols))
        .collect()
}

/// One block character per bucket, scaled between the series min and max.
pub fn sparkline(values: &[f64], width: usize) -> String {
    let (lo, hi) = match crate::view::series::value_range(values.iter().copied()) {
        Some(r) => r,
        None => return String::new(),
    };
    let span = hi - lo;
    buckets(values.len(), width)
        .into_iter()
        .map(|r| {
            let v = values[r.end - 1];
            let level = if span > 0.0 {
                (((v - lo) / span) * (SPARK.len() - 1) as f64).round() as usize
            } else {
                SPARK.len() / 2
            };
            SPARK[level.min(SPARK.len() - 1)]
        })
        .collect()
}

/// `▲` under buckets with a buy, `▼` with a sell, `◆` with both.
pub fn marker_line(points: &[PricePoint], width: usize) -> String {
    buckets(points.len(), width)
        .into_iter()
        .map(|r| {
            let slice = &points[r];
            let buy = slice.iter().any(|p| p.signal == 1);
            let sell = slice.iter().any(|p| p.signal == -1);
            match (buy, sell) {
                (true, true) => '◆',
                (true, false) => '▲',
                (false, true) => '▼',
                (false, false) => ' ',
            }
        })
        .collect::<String>()
        .trim_end()
        .to_string()
}
