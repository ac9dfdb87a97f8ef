//! # Record Formats
//!
//! The data files are plain delimited text, one record per line:
//!
//! ```text
//! inventory:    P1,Widget,10,2.5
//! orders:       O1,1731520409|P1,3|P2,1
//! credentials:  alice,5e8d1a
//! ```
//!
//! There is no escaping. Text fields containing `,` or `|` are rejected before
//! they reach a file (see [`crate::model::validate_field`]).
//!
//! Parsing never fails as a whole: a malformed line is skipped and reported in
//! [`Parsed::skipped`] so the rest of the file still loads.
//!
//! Older order files come in two other shapes, both accepted on read:
//! - `O1,1731520409|P1,3,P2,1` (all pairs after a single pipe)
//! - `O1,1731520409|P1|P2` (bare ids, one unit each)
//!
//! Orders are always written in the canonical pipe-per-line form.

use crate::model::{Credential, Order, OrderLine, Product};
use chrono::{DateTime, Utc};
use std::fmt;

/// A line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based line number in the source text
    pub line_no: usize,
    pub content: String,
    pub reason: String,
}

impl fmt::Display for MalformedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({})", self.line_no, self.reason, self.content)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub skipped: Vec<MalformedLine>,
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

fn parse_lines<T>(text: &str, parse: impl Fn(&str) -> Result<T, String>) -> Parsed<T> {
    let mut parsed = Parsed::default();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match parse(line) {
            Ok(record) => parsed.records.push(record),
            Err(reason) => parsed.skipped.push(MalformedLine {
                line_no: i + 1,
                content: line.to_string(),
                reason,
            }),
        }
    }
    parsed
}

// --- Products ---

pub fn format_product(product: &Product) -> String {
    format!(
        "{},{},{},{}",
        product.id, product.name, product.quantity, product.price
    )
}

pub fn parse_product(line: &str) -> Result<Product, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 4 {
        return Err(format!("expected 4 fields, found {}", fields.len()));
    }
    if fields[0].is_empty() {
        return Err("empty product id".to_string());
    }
    if fields[1].is_empty() {
        return Err("empty product name".to_string());
    }
    let quantity = fields[2]
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity '{}'", fields[2]))?;
    let price = fields[3]
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
        .ok_or_else(|| format!("invalid price '{}'", fields[3]))?;
    Ok(Product::new(fields[0], fields[1], quantity, price))
}

pub fn format_products(products: &[Product]) -> String {
    join_lines(products.iter().map(format_product))
}

pub fn parse_products(text: &str) -> Parsed<Product> {
    parse_lines(text, parse_product)
}

// --- Orders ---

pub fn format_order(order: &Order) -> String {
    let mut out = format!("{},{}", order.id, order.created_at.timestamp());
    for line in &order.lines {
        out.push_str(&format!("|{},{}", line.product_id, line.quantity));
    }
    out
}

pub fn parse_order(line: &str) -> Result<Order, String> {
    let mut segments = line.split('|');
    let header = segments.next().unwrap_or_default();
    let (id, epoch) = header
        .split_once(',')
        .ok_or_else(|| "missing order timestamp".to_string())?;
    let id = id.trim();
    if id.is_empty() {
        return Err("empty order id".to_string());
    }
    let seconds = epoch
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid timestamp '{}'", epoch.trim()))?;
    let created_at: DateTime<Utc> = DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| format!("timestamp out of range '{}'", seconds))?;

    let mut order = Order::new(id, created_at);
    for segment in segments {
        let tokens: Vec<&str> = segment.split(',').map(str::trim).collect();
        match tokens.as_slice() {
            [""] => continue,
            [product_id] => order.lines.push(OrderLine::new(*product_id, 1)),
            pairs if pairs.len() % 2 == 0 => {
                for pair in pairs.chunks(2) {
                    order.lines.push(parse_order_line(pair[0], pair[1])?);
                }
            }
            _ => return Err(format!("unpaired product segment '{}'", segment)),
        }
    }
    Ok(order)
}

fn parse_order_line(product_id: &str, quantity: &str) -> Result<OrderLine, String> {
    if product_id.is_empty() {
        return Err("empty product reference".to_string());
    }
    let quantity = quantity
        .parse::<u32>()
        .ok()
        .filter(|q| *q > 0)
        .ok_or_else(|| format!("invalid line quantity '{}'", quantity))?;
    Ok(OrderLine::new(product_id, quantity))
}

pub fn format_orders(orders: &[Order]) -> String {
    join_lines(orders.iter().map(format_order))
}

pub fn parse_orders(text: &str) -> Parsed<Order> {
    parse_lines(text, parse_order)
}

// --- Credentials ---

pub fn format_credential(credential: &Credential) -> String {
    format!("{},{}", credential.username, credential.checksum)
}

pub fn parse_credential(line: &str) -> Result<Credential, String> {
    let (username, checksum) = line
        .split_once(',')
        .ok_or_else(|| "expected username,checksum".to_string())?;
    let username = username.trim();
    let checksum = checksum.trim();
    if username.is_empty() || checksum.is_empty() {
        return Err("empty username or checksum".to_string());
    }
    Ok(Credential {
        username: username.to_string(),
        checksum: checksum.to_string(),
    })
}

pub fn parse_credentials(text: &str) -> Parsed<Credential> {
    parse_lines(text, parse_credential)
}

fn join_lines(lines: impl Iterator<Item = String>) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
