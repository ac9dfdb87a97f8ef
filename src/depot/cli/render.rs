//! # Rendering
//!
//! Turns command results into terminal text. Every `render_*` function returns
//! a `String` so the one-shot commands and the interactive menu share them and
//! tests can check them directly. Colors come from `colored`, which drops them
//! when the output is not a terminal or `NO_COLOR` is set.

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use depot::api::{CmdMessage, Invoice, MessageLevel, OrderView};
use depot::config::{DepotConfig, KEYS};
use depot::model::Product;
use depot::report::SalesReport;
use std::fmt::Write;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ID_WIDTH: usize = 10;
const NAME_WIDTH: usize = 30;
const QTY_WIDTH: usize = 8;
const PRICE_WIDTH: usize = 10;
const CHART_LABEL_WIDTH: usize = 20;

pub(super) fn render_messages(messages: &[CmdMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        let line = match message.level {
            MessageLevel::Info => message.content.dimmed(),
            MessageLevel::Success => message.content.green(),
            MessageLevel::Warning => message.content.yellow(),
            MessageLevel::Error => message.content.red(),
        };
        let _ = writeln!(out, "{}", line);
    }
    out
}

pub(super) fn print_messages(messages: &[CmdMessage]) {
    print!("{}", render_messages(messages));
}

pub(super) fn render_products(products: &[Product]) -> String {
    if products.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    let header = format!(
        "{}{}{:>qw$}{:>pw$}",
        pad_to_width("ID", ID_WIDTH),
        pad_to_width("Name", NAME_WIDTH),
        "Qty",
        "Price",
        qw = QTY_WIDTH,
        pw = PRICE_WIDTH
    );
    let _ = writeln!(out, "{}", header.bold());
    for product in products {
        let qty = format!("{:>w$}", product.quantity, w = QTY_WIDTH);
        let qty = if product.quantity == 0 {
            qty.red()
        } else {
            qty.normal()
        };
        let _ = writeln!(
            out,
            "{}{}{}{:>pw$.2}",
            pad_to_width(&truncate_to_width(&product.id, ID_WIDTH - 1), ID_WIDTH),
            pad_to_width(&truncate_to_width(&product.name, NAME_WIDTH - 1), NAME_WIDTH),
            qty,
            product.price,
            pw = PRICE_WIDTH
        );
    }
    out
}

pub(super) fn render_orders(orders: &[OrderView], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    for order in orders {
        let _ = writeln!(
            out,
            "{} {}  {}",
            order.id.yellow(),
            format!("({} units)", order.total_units).dimmed(),
            format_time_ago(order.created_at, now).dimmed()
        );
        for line in &order.lines {
            let name = line.name.as_deref().unwrap_or("N/A");
            let price = line
                .unit_price
                .map(|p| format!("{:.2}", p))
                .unwrap_or_else(|| "N/A".to_string());
            let _ = writeln!(
                out,
                "    {} {} x{} @ {}",
                pad_to_width(&line.product_id, ID_WIDTH),
                truncate_to_width(name, NAME_WIDTH),
                line.quantity,
                price
            );
        }
    }
    out
}

pub(super) fn render_invoice(invoice: &Invoice) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        format!("Invoice for order {}", invoice.order_id).bold(),
        invoice
            .created_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .dimmed()
    );
    for line in &invoice.lines {
        let _ = writeln!(
            out,
            "  {}{:>4} x {:>8.2} = {:>10.2}",
            pad_to_width(&truncate_to_width(&line.name, NAME_WIDTH - 1), NAME_WIDTH),
            line.quantity,
            line.unit_price,
            line.line_total
        );
    }
    let _ = writeln!(
        out,
        "  {}{:>27.2}",
        pad_to_width("Total", NAME_WIDTH).bold(),
        invoice.total
    );
    out
}

pub(super) fn render_report(report: &SalesReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        format!("Sales report: {}", report.timeframe).bold(),
        format!(
            "({} to {})",
            report.start.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            report.end.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        )
        .dimmed()
    );
    if report.is_empty() {
        return out;
    }

    out.push('\n');
    for row in &report.rows {
        let _ = writeln!(
            out,
            "{} | {} {}",
            pad_to_width(
                &truncate_to_width(&row.name, CHART_LABEL_WIDTH - 1),
                CHART_LABEL_WIDTH
            ),
            "*".repeat(row.bar_len).cyan(),
            row.quantity
        );
    }

    out.push('\n');
    let _ = writeln!(out, "Total units sold:  {}", report.total_units);
    let _ = writeln!(out, "Orders:            {}", report.order_count);
    if let Some(avg) = report.average_units_per_order() {
        let _ = writeln!(out, "Units per order:   {:.2}", avg);
    }

    out.push('\n');
    let _ = writeln!(out, "{}", format!("Top {}", report.top_n).bold());
    for (i, row) in report.top().iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} ({}) {}",
            i + 1,
            row.name,
            row.product_id,
            row.quantity
        );
    }
    out
}

pub(super) fn render_config(config: &DepotConfig) -> String {
    let mut out = String::new();
    for key in KEYS {
        let value = config.get(key).unwrap_or_default();
        let _ = writeln!(out, "{} = {}", key, value);
    }
    out
}

fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

fn format_time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(timestamp);
    Formatter::new().convert(duration.to_std().unwrap_or_default())
}
