use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::report::{ReportOptions, SalesReport, TimeFrame};
use crate::store::warehouse::Warehouse;
use crate::store::StorageBackend;
use chrono::{DateTime, TimeZone};

pub fn run<B: StorageBackend, Tz: TimeZone>(
    warehouse: &Warehouse<B>,
    timeframe: TimeFrame,
    now: &DateTime<Tz>,
    options: ReportOptions,
) -> Result<CmdResult> {
    let report = SalesReport::build(
        warehouse.orders(),
        warehouse.inventory(),
        timeframe,
        now,
        options,
    );

    let mut result = CmdResult::default();
    if report.is_empty() {
        result.add_message(CmdMessage::info(format!("No orders in the {}.", timeframe)));
    }
    Ok(result.with_report(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::WarehouseFixture;
    use chrono::{Duration, Local, Utc};

    #[test]
    fn reports_recent_orders() {
        let now = Utc::now();
        let wh = WarehouseFixture::new()
            .with_products(2)
            .with_order_at(now - Duration::days(2), &[("P1", 3), ("P2", 1)])
            .with_order_at(now - Duration::days(40), &[("P2", 8)])
            .build();

        let week = run(&wh, TimeFrame::LastWeek, &now, ReportOptions::default()).unwrap();
        let report = week.report.unwrap();
        assert_eq!(report.order_count, 1);
        assert_eq!(report.total_units, 4);
        assert!(week.messages.is_empty());

        let year = run(&wh, TimeFrame::LastYear, &now, ReportOptions::default()).unwrap();
        let report = year.report.unwrap();
        assert_eq!(report.rows[0].product_id, "P2");
        assert_eq!(report.rows[0].quantity, 9);
    }

    #[test]
    fn empty_window_has_message() {
        let wh = WarehouseFixture::new().with_products(1).build();
        let result = run(&wh, TimeFrame::LastMonth, &Local::now(), ReportOptions::default()).unwrap();
        assert!(result.report.unwrap().rows.is_empty());
        assert_eq!(result.messages[0].content, "No orders in the last month.");
    }
}
