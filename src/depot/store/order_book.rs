use crate::model::Order;
use chrono::{DateTime, Utc};

/// Orders in creation order. Orders are never edited or removed once placed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBook {
    orders: Vec<Order>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    pub fn list(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Suggests `O<n>` with `n` one past the highest numeric suffix in use.
    /// Once `u64::MAX` is taken the lowest free number is used instead.
    pub fn next_order_id(&self) -> String {
        let highest = self
            .orders
            .iter()
            .filter_map(|o| o.id.strip_prefix('O')?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let next = highest
            .checked_add(1)
            .or_else(|| (1..=u64::MAX).find(|n| self.find(&format!("O{}", n)).is_none()))
            .unwrap_or(highest);
        format!("O{}", next)
    }

    /// Orders with `start <= created_at <= end`.
    pub fn in_window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|o| o.created_at >= start && o.created_at <= end)
            .collect()
    }

    pub(crate) fn push(&mut self, order: Order) {
        self.orders.push(order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn next_id_starts_at_one() {
        assert_eq!(OrderBook::new().next_order_id(), "O1");
    }

    #[test]
    fn next_id_skips_past_highest() {
        let book = OrderBook::from_records(vec![
            Order::new("O2", at(0)),
            Order::new("O7", at(0)),
            Order::new("legacy", at(0)),
        ]);
        assert_eq!(book.next_order_id(), "O8");
    }

    #[test]
    fn next_id_after_largest_number_reuses_a_free_one() {
        let book = OrderBook::from_records(vec![
            Order::new("O1", at(0)),
            Order::new(format!("O{}", u64::MAX), at(0)),
        ]);
        assert_eq!(book.next_order_id(), "O2");
    }

    #[test]
    fn window_is_inclusive() {
        let book = OrderBook::from_records(vec![
            Order::new("O1", at(100)),
            Order::new("O2", at(200)),
            Order::new("O3", at(300)),
        ]);
        let ids: Vec<_> = book
            .in_window(at(200), at(300))
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, vec!["O2", "O3"]);
    }
}
