//! # Sales Reports
//!
//! A report covers the orders placed in a window ending now:
//!
//! - [`TimeFrame::LastWeek`]: the last 7 days
//! - [`TimeFrame::LastMonth`]: back one calendar month (Mar 31 → Feb 28/29)
//! - [`TimeFrame::LastYear`]: back one calendar year
//!
//! Windows are computed in the caller's time zone (the CLI uses local time) and
//! include both ends.
//!
//! Line items are grouped by product id and their quantities summed. Each row
//! gets a bar length proportional to its total, with the best seller filling
//! the whole bar width. Rows are ranked by descending total, ties by id, so the
//! first N rows are the top-N ranking.

use crate::config::DepotConfig;
use crate::error::DepotError;
use crate::store::inventory::Inventory;
use crate::store::order_book::OrderBook;
use chrono::{DateTime, Days, Duration, Months, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFrame {
    LastWeek,
    LastMonth,
    LastYear,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 3] = [TimeFrame::LastWeek, TimeFrame::LastMonth, TimeFrame::LastYear];

    pub fn label(&self) -> &'static str {
        match self {
            TimeFrame::LastWeek => "last week",
            TimeFrame::LastMonth => "last month",
            TimeFrame::LastYear => "last year",
        }
    }

    pub fn window_start<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let now = now.clone();
        match self {
            TimeFrame::LastWeek => now
                .clone()
                .checked_sub_days(Days::new(7))
                .unwrap_or_else(|| now - Duration::days(7)),
            TimeFrame::LastMonth => now
                .clone()
                .checked_sub_months(Months::new(1))
                .unwrap_or_else(|| now - Duration::days(30)),
            TimeFrame::LastYear => now
                .clone()
                .checked_sub_months(Months::new(12))
                .unwrap_or_else(|| now - Duration::days(365)),
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeFrame {
    type Err = DepotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" | "last week" | "last-week" | "7d" => Ok(TimeFrame::LastWeek),
            "month" | "last month" | "last-month" => Ok(TimeFrame::LastMonth),
            "year" | "last year" | "last-year" => Ok(TimeFrame::LastYear),
            other => Err(DepotError::InvalidInput(format!(
                "unknown time frame '{}' (expected week, month or year)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub bar_width: usize,
    pub top_n: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::from_config(&DepotConfig::default())
    }
}

impl ReportOptions {
    pub fn from_config(config: &DepotConfig) -> Self {
        Self {
            bar_width: config.report_bar_width,
            top_n: config.report_top_n,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesRow {
    pub product_id: String,
    /// Current product name, or the id when the product no longer exists.
    pub name: String,
    pub quantity: u64,
    pub bar_len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReport {
    pub timeframe: TimeFrame,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub order_count: usize,
    pub total_units: u64,
    pub rows: Vec<SalesRow>,
    pub top_n: usize,
}

impl SalesReport {
    pub fn build<Tz: TimeZone>(
        orders: &OrderBook,
        inventory: &Inventory,
        timeframe: TimeFrame,
        now: &DateTime<Tz>,
        options: ReportOptions,
    ) -> Self {
        let start = timeframe.window_start(now).with_timezone(&Utc);
        let end = now.with_timezone(&Utc);
        let in_window = orders.in_window(start, end);

        let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
        for order in &in_window {
            for line in &order.lines {
                *totals.entry(line.product_id.as_str()).or_insert(0) += u64::from(line.quantity);
            }
        }

        let max = totals.values().copied().max().unwrap_or(0);
        let mut rows: Vec<SalesRow> = totals
            .into_iter()
            .map(|(id, quantity)| SalesRow {
                product_id: id.to_string(),
                name: inventory
                    .find(id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| id.to_string()),
                quantity,
                bar_len: scale(quantity, max, options.bar_width),
            })
            .collect();
        // BTreeMap iteration already orders by id; stable sort keeps that for ties
        rows.sort_by(|a, b| b.quantity.cmp(&a.quantity));

        let total_units = rows.iter().map(|r| r.quantity).sum();

        Self {
            timeframe,
            start,
            end,
            order_count: in_window.len(),
            total_units,
            rows,
            top_n: options.top_n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// The best sellers, at most `top_n` of them.
    pub fn top(&self) -> &[SalesRow] {
        &self.rows[..self.rows.len().min(self.top_n)]
    }

    pub fn average_units_per_order(&self) -> Option<f64> {
        if self.order_count == 0 {
            None
        } else {
            Some(self.total_units as f64 / self.order_count as f64)
        }
    }
}

fn scale(quantity: u64, max: u64, width: usize) -> usize {
    if max == 0 {
        return 0;
    }
    ((quantity as f64 / max as f64) * width as f64) as usize
}
